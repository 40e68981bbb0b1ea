//! Convenience re-exports of commonly used types.
//!
//! Import everything needed to drive the engine with a single
//! `use sift::prelude::*;` statement.

pub use crate::algo::{Algorithm, MatchResult};
pub use crate::chars::Chars;
pub use crate::eventbox::{Event, EventBox};
pub use crate::item::{Item, ItemPool, MatchedItem};
pub use crate::matcher::{Matcher, SearchSnapshot, Value};
pub use crate::sift::{Sift, SiftBuilder};
pub use crate::slab::Slab;
pub use crate::{EngineError, Query, QueryFlags};
pub use std::sync::Arc;
