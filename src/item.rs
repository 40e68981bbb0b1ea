//! The append-only item store and the ranked records a search pass
//! produces.

use std::cmp::Ordering as CmpOrd;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::algo::MatchResult;
use crate::chars::Chars;

/// One line of input together with the index the reader assigned to it.
/// Indices are strictly increasing and break ranking ties.
#[derive(Debug, Clone)]
pub struct Item {
    pub index: u32,
    pub text: Chars,
}

//------------------------------------------------------------------------------

/// Append-only store of items shared between the reader and the searcher.
///
/// The reader only pushes; past entries are never mutated. The searcher
/// consumes the untaken tail with [`take`](ItemPool::take) and rewinds with
/// [`reset`](ItemPool::reset) when the query changes.
pub struct ItemPool {
    items: Mutex<Vec<Arc<Item>>>,
    length: AtomicUsize,
    taken: AtomicUsize,
}

impl Default for ItemPool {
    fn default() -> Self {
        Self::new()
    }
}

impl ItemPool {
    pub fn new() -> Self {
        ItemPool {
            items: Mutex::new(Vec::new()),
            length: AtomicUsize::new(0),
            taken: AtomicUsize::new(0),
        }
    }

    /// Number of items appended so far.
    pub fn len(&self) -> usize {
        self.length.load(Ordering::SeqCst)
    }

    /// True when no items have been appended.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of items handed out by [`take`](ItemPool::take).
    pub fn num_taken(&self) -> usize {
        self.taken.load(Ordering::SeqCst)
    }

    /// Append one line; returns the pool length after the append.
    pub fn append(&self, text: Chars) -> usize {
        let mut items = self.items.lock().unwrap_or_else(|e| e.into_inner());
        let index = items.len() as u32;
        items.push(Arc::new(Item { index, text }));
        let len = items.len();
        self.length.store(len, Ordering::SeqCst);
        len
    }

    /// Append a batch of lines; returns the pool length after the append.
    pub fn append_batch(&self, batch: impl IntoIterator<Item = Chars>) -> usize {
        let mut items = self.items.lock().unwrap_or_else(|e| e.into_inner());
        for text in batch {
            let index = items.len() as u32;
            items.push(Arc::new(Item { index, text }));
        }
        let len = items.len();
        self.length.store(len, Ordering::SeqCst);
        len
    }

    /// Snapshot the untaken tail and advance the taken watermark past it.
    pub fn take(&self) -> Vec<Arc<Item>> {
        let items = self.items.lock().unwrap_or_else(|e| e.into_inner());
        let taken = self.taken.load(Ordering::SeqCst);
        let snapshot: Vec<Arc<Item>> = items[taken..].to_vec();
        self.taken.store(items.len(), Ordering::SeqCst);
        snapshot
    }

    /// Rewind the taken watermark so the next [`take`](ItemPool::take)
    /// re-delivers everything; used when the query changes.
    pub fn reset(&self) {
        self.taken.store(0, Ordering::SeqCst);
    }

    /// Drop all items, e.g. when the input command is re-run.
    pub fn clear(&self) {
        let mut items = self.items.lock().unwrap_or_else(|e| e.into_inner());
        items.clear();
        self.length.store(0, Ordering::SeqCst);
        self.taken.store(0, Ordering::SeqCst);
    }
}

//------------------------------------------------------------------------------

/// Rank tuple an item is sorted by; built so that ascending order of the
/// tuple is the publication order.
pub type Rank = [i32; 2];

/// Builds rank tuples: descending score first, then item index, ascending
/// in normal mode and descending in reverse mode.
#[derive(Debug, Clone, Copy, Default)]
pub struct RankBuilder {
    pub reverse: bool,
}

impl RankBuilder {
    pub fn new(reverse: bool) -> Self {
        RankBuilder { reverse }
    }

    pub fn build_rank(&self, score: i32, index: u32) -> Rank {
        let index = index as i32;
        [-score, if self.reverse { -index } else { index }]
    }
}

/// An item that matched the current query, ready for publication.
#[derive(Debug, Clone)]
pub struct MatchedItem {
    pub item: Arc<Item>,
    pub rank: Rank,
    pub result: MatchResult,
}

impl PartialEq for MatchedItem {
    fn eq(&self, other: &Self) -> bool {
        self.rank.eq(&other.rank)
    }
}

impl Eq for MatchedItem {}

impl PartialOrd for MatchedItem {
    fn partial_cmp(&self, other: &Self) -> Option<CmpOrd> {
        Some(self.cmp(other))
    }
}

impl Ord for MatchedItem {
    fn cmp(&self, other: &Self) -> CmpOrd {
        self.rank.cmp(&other.rank)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_take_reset() {
        let pool = ItemPool::new();
        assert_eq!(pool.append(Chars::from("one")), 1);
        assert_eq!(pool.append_batch(["two".into(), "three".into()]), 3);
        assert_eq!(pool.len(), 3);

        let first = pool.take();
        assert_eq!(first.len(), 3);
        assert_eq!(first[2].index, 2);
        assert_eq!(pool.num_taken(), 3);
        assert!(pool.take().is_empty());

        pool.append(Chars::from("four"));
        let tail = pool.take();
        assert_eq!(tail.len(), 1);
        assert_eq!(tail[0].index, 3);

        pool.reset();
        assert_eq!(pool.take().len(), 4);
    }

    #[test]
    fn rank_orders_by_score_then_index() {
        let fwd = RankBuilder::new(false);
        let mut ranks = vec![
            fwd.build_rank(10, 3),
            fwd.build_rank(20, 5),
            fwd.build_rank(10, 1),
        ];
        ranks.sort_unstable();
        assert_eq!(ranks, vec![[-20, 5], [-10, 1], [-10, 3]]);

        let rev = RankBuilder::new(true);
        let mut ranks = vec![rev.build_rank(10, 3), rev.build_rank(10, 5)];
        ranks.sort_unstable();
        assert_eq!(ranks, vec![[-10, -5], [-10, -3]]);
    }
}
