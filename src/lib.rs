//! Sift is the match-and-rank core of an interactive fuzzy finder.
//!
//! It ingests an unbounded stream of lines into an append-only store,
//! scores every line against the current query with one of six matching
//! algorithms, and publishes ranked result snapshots with match positions
//! for highlighting. The enclosing program owns the terminal, the option
//! parsing, and the line producer; sift owns everything between a line
//! arriving and a ranked, highlightable result going out.
//!
//! # Examples
//!
//! ```
//! use sift::prelude::*;
//!
//! let sift = Sift::builder().build();
//! sift.set_query("itm", QueryFlags::default()).unwrap();
//! sift.append_batch(["src/item.rs".into(), "src/main.rs".into()]).unwrap();
//!
//! let snapshot = loop {
//!     let Value::Snapshot(snapshot) = sift.events().wait_for(Event::SearchFin) else {
//!         continue;
//!     };
//!     if snapshot.watermark == 2 {
//!         break snapshot;
//!     }
//! };
//! assert_eq!(snapshot.items[0].item.text.to_string(), "src/item.rs");
//! ```
//!
//! The matcher family is also usable directly, without the engine:
//!
//! ```
//! use sift::algo::Algorithm;
//! use sift::{Chars, Slab};
//!
//! let mut slab = Slab::new();
//! let text = Chars::from("/AutomatorDocument.icns");
//! let pattern: Vec<char> = "rdoc".chars().collect();
//! let result = Algorithm::FuzzyV2
//!     .run(false, false, true, &text, &pattern, true, Some(&mut slab))
//!     .unwrap();
//! assert_eq!((result.begin, result.end), (9, 13));
//! ```

#[macro_use]
extern crate log;

use thiserror::Error;

pub mod algo;
pub mod chars;
pub mod eventbox;
pub mod item;
pub mod matcher;
pub mod prelude;
pub mod scan;
mod sift;
pub mod slab;

pub use crate::algo::{Algorithm, MatchResult};
pub use crate::chars::Chars;
pub use crate::eventbox::{Event, EventBox};
pub use crate::item::{Item, ItemPool, MatchedItem, Rank, RankBuilder};
pub use crate::matcher::{Matcher, SearchSnapshot, Value};
pub use crate::sift::{Sift, SiftBuilder};
pub use crate::slab::Slab;

//------------------------------------------------------------------------------

/// The engine's closed error taxonomy. Matching itself never fails; only
/// the facade can refuse a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The engine was closed; the searcher thread is gone.
    #[error("engine is closed")]
    Closed,
}

//------------------------------------------------------------------------------

/// Per-query switches, combined with the pattern in [`Query`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryFlags {
    /// Match algorithm to run.
    pub algorithm: Algorithm,
    /// Compare code points without case folding.
    pub case_sensitive: bool,
    /// Strip accents from both sides before comparing.
    pub normalize: bool,
    /// Scan direction; reverse biases ties toward trailing occurrences.
    pub forward: bool,
}

impl Default for QueryFlags {
    fn default() -> Self {
        QueryFlags {
            algorithm: Algorithm::default(),
            case_sensitive: false,
            normalize: false,
            forward: true,
        }
    }
}

/// A compiled query: the folded pattern plus its flags.
///
/// Construction enforces the matcher preconditions: the pattern is
/// lowercased unless matching case-sensitively, and accent-folded when
/// normalisation is on.
#[derive(Debug, Clone)]
pub struct Query {
    pattern: Vec<char>,
    /// Match algorithm to run.
    pub algorithm: Algorithm,
    /// Compare code points without case folding.
    pub case_sensitive: bool,
    /// Strip accents from both sides before comparing.
    pub normalize: bool,
    /// Scan direction.
    pub forward: bool,
}

impl Query {
    /// Compile `pattern` under `flags`.
    pub fn new(pattern: &str, flags: QueryFlags) -> Self {
        let mut chars: Vec<char> = pattern.chars().collect();
        if !flags.case_sensitive {
            for c in chars.iter_mut() {
                *c = c.to_lowercase().next().unwrap_or(*c);
            }
        }
        if flags.normalize {
            for c in chars.iter_mut() {
                *c = algo::normalize_rune(*c);
            }
        }
        Query {
            pattern: chars,
            algorithm: flags.algorithm,
            case_sensitive: flags.case_sensitive,
            normalize: flags.normalize,
            forward: flags.forward,
        }
    }

    /// The empty query; matches everything with a neutral score.
    pub fn empty() -> Self {
        Query::new("", QueryFlags::default())
    }

    /// The folded pattern code points.
    pub fn pattern(&self) -> &[char] {
        &self.pattern
    }
}
