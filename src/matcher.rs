//! The matching coordinator.
//!
//! A [`Matcher`] is driven by a dedicated searcher thread. It sleeps on a
//! request mailbox until the reader reports new items or the caller swaps
//! the query, snapshots the untaken tail of the item pool, shards the
//! matching work across a worker pool (one scratch slab per worker), and
//! publishes a ranked snapshot through the output mailbox. A query change
//! bumps a generation counter; in-flight passes notice it between items,
//! drop their partial output, and the pass restarts from the whole pool.

use std::cell::RefCell;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, LazyLock, Mutex, MutexGuard};

use rayon::ThreadPool;
use rayon::prelude::*;
use thread_local::ThreadLocal;

use crate::Query;
use crate::algo::MatchResult;
use crate::eventbox::{Event, EventBox};
use crate::item::{Item, ItemPool, MatchedItem, RankBuilder};
use crate::slab::Slab;

static NUM_THREADS: LazyLock<usize> = LazyLock::new(|| {
    std::thread::available_parallelism()
        .ok()
        .map(|inner| inner.get())
        .unwrap_or(0)
});

static OPT_MATCHER_THREAD_POOL: LazyLock<Option<ThreadPool>> =
    LazyLock::new(|| rayon::ThreadPoolBuilder::new().num_threads(*NUM_THREADS).build().ok());

const CHUNK_SIZE: usize = 8192;

/// Payload carried by engine events.
#[derive(Debug, Clone)]
pub enum Value {
    /// No payload.
    Empty,
    /// An item-count (pool length or processed count).
    Count(usize),
    /// A published result snapshot.
    Snapshot(Arc<SearchSnapshot>),
}

/// The outcome of one finished search pass.
#[derive(Debug)]
pub struct SearchSnapshot {
    /// Every item appended up to this count is reflected in `items`.
    pub watermark: usize,
    /// The query the pass ran with.
    pub query: Arc<Query>,
    /// Matches ordered by descending score, ties broken by item index.
    pub items: Vec<MatchedItem>,
}

/// Owns the query state and turns pool snapshots into ranked results.
pub struct Matcher {
    pool: Arc<ItemPool>,
    req_box: Arc<EventBox<Value>>,
    out_box: Arc<EventBox<Value>>,
    query: Mutex<Arc<Query>>,
    generation: AtomicUsize,
    with_pos: bool,
    slab_caps: (usize, usize),
    slabs: ThreadLocal<RefCell<Slab>>,
    merged: Mutex<Vec<MatchedItem>>,
    latest: Mutex<Option<Arc<SearchSnapshot>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

impl Matcher {
    pub fn new(
        pool: Arc<ItemPool>,
        req_box: Arc<EventBox<Value>>,
        out_box: Arc<EventBox<Value>>,
        with_pos: bool,
        slab_caps: (usize, usize),
    ) -> Self {
        Matcher {
            pool,
            req_box,
            out_box,
            query: Mutex::new(Arc::new(Query::empty())),
            generation: AtomicUsize::new(0),
            with_pos,
            slab_caps,
            slabs: ThreadLocal::new(),
            merged: Mutex::new(Vec::new()),
            latest: Mutex::new(None),
        }
    }

    /// Swap the query. The generation bump makes any in-flight pass stale;
    /// the caller follows up with a `SearchNew` event to trigger the rerun.
    pub fn set_query(&self, query: Query) {
        *lock(&self.query) = Arc::new(query);
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    /// The most recently published snapshot, if any.
    pub fn latest(&self) -> Option<Arc<SearchSnapshot>> {
        lock(&self.latest).clone()
    }

    /// The searcher loop; runs on a dedicated thread until `Close`.
    pub fn run(&self) {
        loop {
            let mut read_new = false;
            let mut search_new = false;
            let mut closed = false;
            self.req_box.wait(|events| {
                for (event, _) in events.drain(..) {
                    match event {
                        Event::ReadNew => read_new = true,
                        Event::SearchNew => search_new = true,
                        Event::Close => closed = true,
                        _ => {}
                    }
                }
            });
            if closed {
                debug!("searcher: close requested");
                self.out_box.set(Event::Close, Value::Empty);
                break;
            }

            if search_new {
                self.pool.reset();
                lock(&self.merged).clear();
            }
            if search_new || read_new {
                self.process();
            }
        }
    }

    /// One search pass over the untaken tail of the pool.
    fn process(&self) {
        let generation = self.generation.load(Ordering::SeqCst);
        let query = lock(&self.query).clone();
        let items = self.pool.take();
        let watermark = self.pool.num_taken();
        trace!(
            "searcher: pass start, {} new items, watermark {}, query {:?}",
            items.len(),
            watermark,
            query
        );

        let rank_builder = RankBuilder::new(!query.forward);
        let report_progress = items.len() > CHUNK_SIZE;
        let processed = AtomicUsize::new(0);

        let run_pass = || {
            items
                .par_chunks(CHUNK_SIZE)
                .map(|chunk| {
                    let mut matched = Vec::new();
                    for item in chunk {
                        // Cooperative cancellation between items
                        if self.generation.load(Ordering::Relaxed) != generation {
                            return None;
                        }
                        if let Some(m) = self.match_item(&query, item, &rank_builder) {
                            matched.push(m);
                        }
                    }
                    let done = processed.fetch_add(chunk.len(), Ordering::Relaxed) + chunk.len();
                    if report_progress {
                        self.out_box.set(Event::SearchProgress, Value::Count(done));
                    }
                    Some(matched)
                })
                .collect::<Option<Vec<_>>>()
        };

        let chunks = match OPT_MATCHER_THREAD_POOL.as_ref() {
            Some(pool) => pool.install(run_pass),
            None => run_pass(),
        };

        let Some(chunks) = chunks else {
            trace!("searcher: pass cancelled");
            return;
        };
        if self.generation.load(Ordering::SeqCst) != generation {
            trace!("searcher: pass stale, discarding");
            return;
        }

        let mut merged = lock(&self.merged);
        merged.extend(chunks.into_iter().flatten());
        merged.sort_unstable();
        trace!("searcher: pass done, {} matches total", merged.len());

        let snapshot = Arc::new(SearchSnapshot {
            watermark,
            query: query.clone(),
            items: merged.clone(),
        });
        *lock(&self.latest) = Some(snapshot.clone());
        self.out_box.set(Event::SearchFin, Value::Snapshot(snapshot));
    }

    fn match_item(
        &self,
        query: &Query,
        item: &Arc<Item>,
        rank_builder: &RankBuilder,
    ) -> Option<MatchedItem> {
        // An empty query matches everything with a neutral score and stays
        // off the slab entirely.
        if query.pattern().is_empty() {
            return Some(MatchedItem {
                item: item.clone(),
                rank: rank_builder.build_rank(0, item.index),
                result: MatchResult::empty(self.with_pos),
            });
        }

        let (cap16, cap32) = self.slab_caps;
        let mut slab = self
            .slabs
            .get_or(|| RefCell::new(Slab::with_capacity(cap16, cap32)))
            .borrow_mut();
        let result = query.algorithm.run(
            query.case_sensitive,
            query.normalize,
            query.forward,
            &item.text,
            query.pattern(),
            self.with_pos,
            Some(&mut slab),
        )?;
        let rank = rank_builder.build_rank(result.score, item.index);
        Some(MatchedItem {
            item: item.clone(),
            rank,
            result,
        })
    }
}
