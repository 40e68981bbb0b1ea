//! Byte-scan primitives backing the ASCII fast paths.
//!
//! The hot operation is "find the first (or last) occurrence of either of
//! two bytes": the case-insensitive prefilter searches for a lowercase and
//! an uppercase candidate in one pass instead of two. The fast variants are
//! built on `memchr`, which probes the CPU once and caches the widest
//! available SIMD kernel; the scalar loops below stay in every build as the
//! reference implementation the tests compare against.

use memchr::{memchr, memchr2, memrchr2};

/// Smallest index `i` with `buf[i] == b`, if any.
#[inline]
pub fn index_byte(buf: &[u8], b: u8) -> Option<usize> {
    memchr(b, buf)
}

/// Smallest index `i` with `buf[i] == b1 || buf[i] == b2`, if any.
#[inline]
pub fn index_byte_two(buf: &[u8], b1: u8, b2: u8) -> Option<usize> {
    memchr2(b1, b2, buf)
}

/// Largest index `i` with `buf[i] == b1 || buf[i] == b2`, if any.
#[inline]
pub fn last_index_byte_two(buf: &[u8], b1: u8, b2: u8) -> Option<usize> {
    memrchr2(b1, b2, buf)
}

/// Reference implementation of [`index_byte_two`].
pub fn index_byte_two_scalar(buf: &[u8], b1: u8, b2: u8) -> Option<usize> {
    buf.iter().position(|&b| b == b1 || b == b2)
}

/// Reference implementation of [`last_index_byte_two`].
pub fn last_index_byte_two_scalar(buf: &[u8], b1: u8, b2: u8) -> Option<usize> {
    buf.iter().rposition(|&b| b == b1 || b == b2)
}
