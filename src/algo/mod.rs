//! The matcher family and its shared scoring model.
//!
//! Six algorithms sit behind one signature: two fuzzy matchers (an optimal
//! alignment and a greedy linear scan), an exact-substring matcher, and the
//! anchored prefix / suffix / equality checks. All of them score matched
//! windows with the same additive model: a fixed reward per matched code
//! point, affine gap penalties, and positional bonuses that prefer word
//! starts, camelCase humps, and digit transitions.

pub mod exact;
pub mod fuzzy;
pub mod normalize;

use crate::chars::Chars;
use crate::scan;
use crate::slab::Slab;

pub use exact::{equal_match, exact_match_naive, prefix_match, suffix_match};
pub use fuzzy::{fuzzy_match_v1, fuzzy_match_v2};
pub use normalize::normalize_rune;

pub(crate) type Score = i16;

pub const SCORE_MATCH: Score = 16;
pub const SCORE_GAP_START: Score = -3;
pub const SCORE_GAP_EXTENSION: Score = -1;

/// Bonus for a match right after a non-word character (a word start).
pub const BONUS_BOUNDARY: Score = SCORE_MATCH / 2;

/// Matching a non-word character itself is mildly meaningful.
pub const BONUS_NON_WORD: Score = SCORE_MATCH / 2;

/// camelCase hump or letter-to-digit transition. Slightly below the word
/// boundary bonus; these transitions don't consume a separator character.
pub const BONUS_CAMEL_123: Score = BONUS_BOUNDARY + SCORE_GAP_EXTENSION;

/// Minimum bonus inside a consecutive run; sized so that breaking a run is
/// never free.
pub const BONUS_CONSECUTIVE: Score = -(SCORE_GAP_START + SCORE_GAP_EXTENSION);

/// The first pattern code point carries more intent than the rest, so its
/// positional bonus counts double.
pub const BONUS_FIRST_CHAR_MULTIPLIER: Score = 2;

//------------------------------------------------------------------------------

/// Character class used only for bonus computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    NonWord,
    Lower,
    Upper,
    Letter,
    Number,
}

#[inline]
pub(crate) fn char_class_of_ascii(c: char) -> CharClass {
    if c.is_ascii_lowercase() {
        CharClass::Lower
    } else if c.is_ascii_uppercase() {
        CharClass::Upper
    } else if c.is_ascii_digit() {
        CharClass::Number
    } else {
        CharClass::NonWord
    }
}

#[inline]
pub(crate) fn char_class_of_non_ascii(c: char) -> CharClass {
    if c.is_lowercase() {
        CharClass::Lower
    } else if c.is_uppercase() {
        CharClass::Upper
    } else if c.is_numeric() {
        CharClass::Number
    } else if c.is_alphabetic() {
        CharClass::Letter
    } else {
        CharClass::NonWord
    }
}

/// Class of one code point; range tests for ASCII, category tables beyond.
#[inline]
pub fn char_class_of(c: char) -> CharClass {
    if c.is_ascii() {
        char_class_of_ascii(c)
    } else {
        char_class_of_non_ascii(c)
    }
}

/// Bonus granted for a match whose previous character has class `prev` and
/// whose own class is `class`.
#[inline]
pub(crate) fn bonus_for(prev: CharClass, class: CharClass) -> Score {
    if prev == CharClass::NonWord && class != CharClass::NonWord {
        BONUS_BOUNDARY
    } else if (prev == CharClass::Lower && class == CharClass::Upper)
        || (prev != CharClass::Number && class == CharClass::Number)
    {
        BONUS_CAMEL_123
    } else if class == CharClass::NonWord {
        BONUS_NON_WORD
    } else {
        0
    }
}

/// Bonus at a text position; position 0 is treated as following a non-word
/// character.
#[inline]
pub(crate) fn bonus_at(text: &Chars, idx: usize) -> Score {
    if idx == 0 {
        return BONUS_BOUNDARY;
    }
    bonus_for(char_class_of(text.get(idx - 1)), char_class_of(text.get(idx)))
}

//------------------------------------------------------------------------------

/// Outcome of a successful match: the half-open window in the text's
/// indexing units, the score, and (on request) one text index per pattern
/// code point in ascending order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    pub begin: usize,
    pub end: usize,
    pub score: i32,
    pub positions: Option<Vec<usize>>,
}

impl MatchResult {
    pub(crate) fn empty(with_pos: bool) -> Self {
        MatchResult {
            begin: 0,
            end: 0,
            score: 0,
            positions: with_pos.then(Vec::new),
        }
    }
}

/// The signature every matcher shares.
pub type MatchFn = fn(
    bool,          // case_sensitive
    bool,          // normalize
    bool,          // forward
    &Chars,        // text
    &[char],       // pattern
    bool,          // with_pos
    Option<&mut Slab>,
) -> Option<MatchResult>;

/// The matching algorithm selected by the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Algorithm {
    /// Greedy linear-scan fuzzy matching.
    FuzzyV1,
    /// Optimal-alignment fuzzy matching (default).
    #[default]
    FuzzyV2,
    /// Exact substring.
    Exact,
    /// Anchored at the start.
    Prefix,
    /// Anchored at the end.
    Suffix,
    /// Whole-line equality.
    Equal,
}

impl Algorithm {
    /// Run the selected matcher.
    ///
    /// Callers must hand in a pattern that is already lowercased when
    /// `case_sensitive` is off and already normalised when `normalize` is
    /// on; [`crate::Query`] takes care of both.
    pub fn run(
        self,
        case_sensitive: bool,
        normalize: bool,
        forward: bool,
        text: &Chars,
        pattern: &[char],
        with_pos: bool,
        slab: Option<&mut Slab>,
    ) -> Option<MatchResult> {
        match self {
            Algorithm::FuzzyV1 => {
                fuzzy_match_v1(case_sensitive, normalize, forward, text, pattern, with_pos, slab)
            }
            Algorithm::FuzzyV2 => {
                fuzzy_match_v2(case_sensitive, normalize, forward, text, pattern, with_pos, slab)
            }
            Algorithm::Exact => {
                exact_match_naive(case_sensitive, normalize, forward, text, pattern, with_pos, slab)
            }
            Algorithm::Prefix => {
                prefix_match(case_sensitive, normalize, forward, text, pattern, with_pos, slab)
            }
            Algorithm::Suffix => {
                suffix_match(case_sensitive, normalize, forward, text, pattern, with_pos, slab)
            }
            Algorithm::Equal => {
                equal_match(case_sensitive, normalize, forward, text, pattern, with_pos, slab)
            }
        }
    }
}

//------------------------------------------------------------------------------
// Shared helpers

/// Map a forward iteration index to the actual position for the requested
/// scan direction.
#[inline]
pub(crate) fn index_at(index: usize, max: usize, forward: bool) -> usize {
    if forward { index } else { max - index - 1 }
}

/// Case-fold and optionally normalise one text code point the way every
/// matcher compares it against the pattern.
#[inline]
pub(crate) fn fold_char(mut c: char, case_sensitive: bool, normalize: bool) -> char {
    if !case_sensitive {
        if c.is_ascii_uppercase() {
            c = c.to_ascii_lowercase();
        } else if c.is_uppercase() {
            c = c.to_lowercase().next().unwrap_or(c);
        }
    }
    if normalize {
        c = normalize_rune(c);
    }
    c
}

/// Skip ahead to the next occurrence of ASCII byte `b` (or its uppercase
/// form when folding case), starting at `from`.
fn try_skip(bytes: &[u8], case_sensitive: bool, b: u8, from: usize) -> Option<usize> {
    let tail = &bytes[from..];
    let idx = if !case_sensitive && b.is_ascii_lowercase() {
        scan::index_byte_two(tail, b, b - 32)
    } else {
        scan::index_byte(tail, b)
    }?;
    Some(from + idx)
}

/// Cheap prefilter for byte-form text: verify every pattern byte occurs in
/// order before any scoring work.
///
/// Returns `None` when the pattern cannot match, `Some(0)` when the text is
/// not in byte form (absence can't be proven cheaply), and otherwise the
/// index one before the first pattern byte's landing position so the
/// caller's scan keeps the first-character bonus lookback.
pub(crate) fn ascii_fuzzy_index(text: &Chars, pattern: &[char], case_sensitive: bool) -> Option<usize> {
    let Some(bytes) = text.as_bytes() else {
        return Some(0);
    };
    if pattern.iter().any(|c| !c.is_ascii()) {
        return None;
    }

    let mut first_idx = 0;
    let mut idx = 0;
    for (pidx, &pchar) in pattern.iter().enumerate() {
        idx = try_skip(bytes, case_sensitive, pchar as u8, idx)?;
        if pidx == 0 && idx > 0 {
            first_idx = idx - 1;
        }
        idx += 1;
    }
    Some(first_idx)
}

/// Score a window the greedy way: additive match rewards plus bonuses, with
/// affine gap penalties between matches. Shared by the greedy fuzzy matcher
/// and the anchored matchers.
pub(crate) fn calculate_score(
    case_sensitive: bool,
    normalize: bool,
    text: &Chars,
    pattern: &[char],
    sidx: usize,
    eidx: usize,
    with_pos: bool,
) -> (i32, Option<Vec<usize>>) {
    let mut pidx = 0usize;
    let mut score = 0i32;
    let mut in_gap = false;
    let mut consecutive: i32 = 0;
    let mut first_bonus: Score = 0;
    let mut pos = with_pos.then(|| Vec::with_capacity(pattern.len()));

    let mut prev_class = if sidx > 0 {
        char_class_of(text.get(sidx - 1))
    } else {
        CharClass::NonWord
    };

    for idx in sidx..eidx {
        let raw = text.get(idx);
        let class = char_class_of(raw);
        let c = fold_char(raw, case_sensitive, normalize);

        if pidx < pattern.len() && c == pattern[pidx] {
            if let Some(pos) = pos.as_mut() {
                pos.push(idx);
            }
            score += SCORE_MATCH as i32;
            let mut bonus = bonus_for(prev_class, class);
            if consecutive == 0 {
                first_bonus = bonus;
            } else {
                // Break the consecutive chunk when a stronger boundary shows up
                if bonus >= BONUS_BOUNDARY && bonus > first_bonus {
                    first_bonus = bonus;
                }
                bonus = bonus.max(first_bonus).max(BONUS_CONSECUTIVE);
            }
            if pidx == 0 {
                score += (bonus * BONUS_FIRST_CHAR_MULTIPLIER) as i32;
            } else {
                score += bonus as i32;
            }
            in_gap = false;
            consecutive += 1;
            pidx += 1;
        } else {
            score += if in_gap {
                SCORE_GAP_EXTENSION as i32
            } else {
                SCORE_GAP_START as i32
            };
            in_gap = true;
            consecutive = 0;
            first_bonus = 0;
        }
        prev_class = class;
    }

    (score, pos)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn char_classes() {
        assert_eq!(char_class_of('a'), CharClass::Lower);
        assert_eq!(char_class_of('Z'), CharClass::Upper);
        assert_eq!(char_class_of('5'), CharClass::Number);
        assert_eq!(char_class_of('_'), CharClass::NonWord);
        assert_eq!(char_class_of(' '), CharClass::NonWord);
        assert_eq!(char_class_of('世'), CharClass::Letter);
        assert_eq!(char_class_of('ß'), CharClass::Lower);
        assert_eq!(char_class_of('٣'), CharClass::Number);
    }

    #[test]
    fn bonus_model() {
        assert_eq!(bonus_for(CharClass::NonWord, CharClass::Lower), BONUS_BOUNDARY);
        assert_eq!(bonus_for(CharClass::Lower, CharClass::Upper), BONUS_CAMEL_123);
        assert_eq!(bonus_for(CharClass::Lower, CharClass::Number), BONUS_CAMEL_123);
        assert_eq!(bonus_for(CharClass::Number, CharClass::Number), 0);
        assert_eq!(bonus_for(CharClass::Lower, CharClass::NonWord), BONUS_NON_WORD);
        assert_eq!(bonus_for(CharClass::Lower, CharClass::Lower), 0);

        let text = Chars::from("foo_bar");
        assert_eq!(bonus_at(&text, 0), BONUS_BOUNDARY);
        assert_eq!(bonus_at(&text, 4), BONUS_BOUNDARY);
        assert_eq!(bonus_at(&text, 3), BONUS_NON_WORD);
        assert_eq!(bonus_at(&text, 1), 0);
    }

    #[test]
    fn prefilter_finds_subsequences() {
        let text = Chars::from("fooBarbaz");
        assert_eq!(ascii_fuzzy_index(&text, &['o', 'b', 'z'], false), Some(0));
        assert_eq!(ascii_fuzzy_index(&text, &['f', 'z'], false), Some(0));
        assert_eq!(ascii_fuzzy_index(&text, &['z', 'f'], false), None);
        assert_eq!(ascii_fuzzy_index(&text, &['q'], false), None);
    }

    #[test]
    fn prefilter_case_handling() {
        let text = Chars::from("fooBar");
        // lowercase pattern byte finds the uppercase occurrence when folding
        assert_eq!(ascii_fuzzy_index(&text, &['b'], false), Some(2));
        assert_eq!(ascii_fuzzy_index(&text, &['b'], true), None);
        assert_eq!(ascii_fuzzy_index(&text, &['B'], true), Some(2));
    }

    #[test]
    fn prefilter_gives_up_on_non_ascii() {
        let wide = Chars::from("Só Danço");
        assert_eq!(ascii_fuzzy_index(&wide, &['s', 'o'], false), Some(0));

        let text = Chars::from("plain");
        assert_eq!(ascii_fuzzy_index(&text, &['ó'], false), None);
    }
}
