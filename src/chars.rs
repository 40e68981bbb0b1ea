//! Encoding-aware view over one line of input.
//!
//! A [`Chars`] keeps the raw bytes when the line is pure ASCII and an eagerly
//! decoded code-point sequence otherwise. All indexing, lengths, and slices
//! are expressed in the live representation's units (bytes for the ASCII
//! form, code points for the decoded form), which keeps the matcher's inner
//! loops free of UTF-8 decoding.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

/// Sentinel for "trim length not computed yet".
const TRIM_LENGTH_UNKNOWN: u32 = u32::MAX;

#[derive(Clone)]
enum Storage {
    /// Every byte is below 0x80; indexed per byte.
    Bytes(Arc<[u8]>),
    /// Decoded code points; invalid sequences were replaced with U+FFFD.
    Runes(Arc<[char]>),
}

/// An immutable line view shared between the reader and every search pass.
///
/// Slicing shares the underlying storage, so a `Chars` is cheap to clone and
/// to slice. The trim length is memoised on first use.
pub struct Chars {
    storage: Storage,
    start: u32,
    end: u32,
    trim_length: AtomicU32,
}

impl Chars {
    /// Build a view from raw bytes. Pure-ASCII input keeps the byte form;
    /// anything else is decoded up front, one replacement code point per
    /// invalid sequence.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        if bytes.iter().all(|&b| b < 0x80) {
            let len = bytes.len();
            Self::with_storage(Storage::Bytes(Arc::from(bytes)), len)
        } else {
            let runes: Vec<char> = String::from_utf8_lossy(&bytes).chars().collect();
            let len = runes.len();
            Self::with_storage(Storage::Runes(Arc::from(runes)), len)
        }
    }

    fn with_storage(storage: Storage, len: usize) -> Self {
        Chars {
            storage,
            start: 0,
            end: len as u32,
            trim_length: AtomicU32::new(TRIM_LENGTH_UNKNOWN),
        }
    }

    /// True when the byte form is live.
    pub fn is_bytes(&self) -> bool {
        matches!(self.storage, Storage::Bytes(_))
    }

    /// The raw bytes of an ASCII-form view, `None` for the decoded form.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match &self.storage {
            Storage::Bytes(bytes) => Some(&bytes[self.start as usize..self.end as usize]),
            Storage::Runes(_) => None,
        }
    }

    /// Number of indexing units in the view.
    pub fn len(&self) -> usize {
        (self.end - self.start) as usize
    }

    /// True when the view is empty.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Code point at `idx`. Constant time in both representations.
    pub fn get(&self, idx: usize) -> char {
        debug_assert!(idx < self.len());
        match &self.storage {
            Storage::Bytes(bytes) => bytes[self.start as usize + idx] as char,
            Storage::Runes(runes) => runes[self.start as usize + idx],
        }
    }

    /// Count of whitespace code points at the front.
    pub fn leading_whitespaces(&self) -> usize {
        (0..self.len())
            .take_while(|&i| self.get(i).is_whitespace())
            .count()
    }

    /// Count of whitespace code points at the back.
    pub fn trailing_whitespaces(&self) -> usize {
        (0..self.len())
            .rev()
            .take_while(|&i| self.get(i).is_whitespace())
            .count()
    }

    /// Code points between the first and last non-whitespace, inclusive.
    /// Computed lazily, then memoised.
    pub fn trim_length(&self) -> usize {
        let cached = self.trim_length.load(Ordering::Relaxed);
        if cached != TRIM_LENGTH_UNKNOWN {
            return cached as usize;
        }

        let len = self.len();
        let mut last = None;
        for i in (0..len).rev() {
            if !self.get(i).is_whitespace() {
                last = Some(i);
                break;
            }
        }
        let trimmed = match last {
            None => 0,
            Some(last) => {
                let mut first = 0;
                for i in 0..len {
                    if !self.get(i).is_whitespace() {
                        first = i;
                        break;
                    }
                }
                last - first + 1
            }
        };
        self.trim_length.store(trimmed as u32, Ordering::Relaxed);
        trimmed
    }

    /// Sub-view over `[lo, hi)` sharing the same storage and representation.
    pub fn slice(&self, lo: usize, hi: usize) -> Chars {
        debug_assert!(lo <= hi && hi <= self.len());
        Chars {
            storage: self.storage.clone(),
            start: self.start + lo as u32,
            end: self.start + hi as u32,
            trim_length: AtomicU32::new(TRIM_LENGTH_UNKNOWN),
        }
    }

    /// Write every code point into `dest[0..len()]`.
    ///
    /// # Panics
    ///
    /// Panics when `dest` is shorter than the view.
    pub fn copy_runes_into(&self, dest: &mut [u32]) {
        assert!(dest.len() >= self.len());
        match &self.storage {
            Storage::Bytes(bytes) => {
                for (d, &b) in dest.iter_mut().zip(&bytes[self.start as usize..self.end as usize]) {
                    *d = b as u32;
                }
            }
            Storage::Runes(runes) => {
                for (d, &r) in dest.iter_mut().zip(&runes[self.start as usize..self.end as usize]) {
                    *d = r as u32;
                }
            }
        }
    }
}

impl Clone for Chars {
    fn clone(&self) -> Self {
        Chars {
            storage: self.storage.clone(),
            start: self.start,
            end: self.end,
            trim_length: AtomicU32::new(self.trim_length.load(Ordering::Relaxed)),
        }
    }
}

impl From<&str> for Chars {
    fn from(s: &str) -> Self {
        Chars::from_bytes(s.as_bytes().to_vec())
    }
}

impl From<String> for Chars {
    fn from(s: String) -> Self {
        Chars::from_bytes(s.into_bytes())
    }
}

impl fmt::Display for Chars {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..self.len() {
            write!(f, "{}", self.get(i))?;
        }
        Ok(())
    }
}

impl fmt::Debug for Chars {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Chars({:?})", self.to_string())
    }
}
