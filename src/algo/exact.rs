//! Exact-substring and anchored matchers.
//!
//! The exact matcher is a case-folded linear scan with a bonus-based
//! tie-break: among all occurrences it keeps the one whose first code point
//! sits at the most meaningful position, and stops early as soon as an
//! occurrence lands on a word boundary. Prefix, suffix, and equality are
//! plain anchored comparisons with whitespace-trimming rules at the
//! anchored edge.

use super::{
    BONUS_BOUNDARY, BONUS_FIRST_CHAR_MULTIPLIER, MatchResult, Score, SCORE_MATCH,
    ascii_fuzzy_index, bonus_at, calculate_score, fold_char, index_at,
};
use crate::algo::normalize::normalize_rune;
use crate::chars::Chars;
use crate::slab::Slab;

/// Case-folded substring search with best-boundary tie-break.
pub fn exact_match_naive(
    case_sensitive: bool,
    normalize: bool,
    forward: bool,
    text: &Chars,
    pattern: &[char],
    with_pos: bool,
    _slab: Option<&mut Slab>,
) -> Option<MatchResult> {
    if pattern.is_empty() {
        return Some(MatchResult::empty(with_pos));
    }

    let len_runes = text.len();
    let len_pattern = pattern.len();
    if len_runes < len_pattern {
        return None;
    }
    ascii_fuzzy_index(text, pattern, case_sensitive)?;

    // Only the bonus at the occurrence's first code point takes part in the
    // tie-break.
    let mut pidx = 0usize;
    let mut best_pos: Option<usize> = None;
    let mut bonus: Score = 0;
    let mut best_bonus: Score = -1;
    let mut index = 0usize;
    while index < len_runes {
        let index_ = index_at(index, len_runes, forward);
        let c = fold_char(text.get(index_), case_sensitive, normalize);
        let pidx_ = index_at(pidx, len_pattern, forward);
        let pchar = pattern[pidx_];
        if pchar == c {
            if pidx_ == 0 {
                bonus = bonus_at(text, index_);
            }
            pidx += 1;
            if pidx == len_pattern {
                if bonus > best_bonus {
                    best_pos = Some(index);
                    best_bonus = bonus;
                }
                if bonus >= BONUS_BOUNDARY {
                    break;
                }
                index -= pidx - 1;
                pidx = 0;
                bonus = 0;
            }
        } else {
            index -= pidx;
            pidx = 0;
            bonus = 0;
        }
        index += 1;
    }

    let best_pos = best_pos?;
    let (sidx, eidx) = if forward {
        (best_pos + 1 - len_pattern, best_pos + 1)
    } else {
        (len_runes - (best_pos + 1), len_runes - (best_pos + 1 - len_pattern))
    };
    let (score, _) = calculate_score(case_sensitive, normalize, text, pattern, sidx, eidx, false);
    Some(MatchResult {
        begin: sidx,
        end: eidx,
        score,
        positions: with_pos.then(|| (sidx..eidx).collect()),
    })
}

/// Anchored comparison against the start of the line. Leading whitespace is
/// skipped unless the pattern itself starts with whitespace.
pub fn prefix_match(
    case_sensitive: bool,
    normalize: bool,
    _forward: bool,
    text: &Chars,
    pattern: &[char],
    with_pos: bool,
    _slab: Option<&mut Slab>,
) -> Option<MatchResult> {
    if pattern.is_empty() {
        return Some(MatchResult::empty(with_pos));
    }

    let trimmed_len = if pattern[0].is_whitespace() {
        0
    } else {
        text.leading_whitespaces()
    };

    if text.len() - trimmed_len < pattern.len() {
        return None;
    }

    for (index, &pchar) in pattern.iter().enumerate() {
        let c = fold_char(text.get(trimmed_len + index), case_sensitive, normalize);
        if c != pchar {
            return None;
        }
    }

    let (sidx, eidx) = (trimmed_len, trimmed_len + pattern.len());
    let (score, _) = calculate_score(case_sensitive, normalize, text, pattern, sidx, eidx, false);
    Some(MatchResult {
        begin: sidx,
        end: eidx,
        score,
        positions: with_pos.then(|| (sidx..eidx).collect()),
    })
}

/// Anchored comparison against the end of the line. Trailing whitespace is
/// trimmed unless the pattern itself ends with whitespace.
pub fn suffix_match(
    case_sensitive: bool,
    normalize: bool,
    _forward: bool,
    text: &Chars,
    pattern: &[char],
    with_pos: bool,
    _slab: Option<&mut Slab>,
) -> Option<MatchResult> {
    let len_runes = text.len();
    let mut trimmed_len = len_runes;
    if pattern.last().is_none_or(|c| !c.is_whitespace()) {
        trimmed_len -= text.trailing_whitespaces();
    }
    if pattern.is_empty() {
        return Some(MatchResult {
            begin: trimmed_len,
            end: trimmed_len,
            score: 0,
            positions: with_pos.then(Vec::new),
        });
    }

    let diff = trimmed_len.checked_sub(pattern.len())?;
    for (index, &pchar) in pattern.iter().enumerate() {
        let c = fold_char(text.get(index + diff), case_sensitive, normalize);
        if c != pchar {
            return None;
        }
    }

    let (sidx, eidx) = (trimmed_len - pattern.len(), trimmed_len);
    let (score, _) = calculate_score(case_sensitive, normalize, text, pattern, sidx, eidx, false);
    Some(MatchResult {
        begin: sidx,
        end: eidx,
        score,
        positions: with_pos.then(|| (sidx..eidx).collect()),
    })
}

/// Whole-line equality after trimming whitespace at both unanchored edges.
/// The score is fixed: every code point counts as a boundary match, plus the
/// first-character extra.
pub fn equal_match(
    case_sensitive: bool,
    normalize: bool,
    _forward: bool,
    text: &Chars,
    pattern: &[char],
    with_pos: bool,
    _slab: Option<&mut Slab>,
) -> Option<MatchResult> {
    let len_pattern = pattern.len();
    if len_pattern == 0 {
        return None;
    }

    let trimmed_len = if pattern[0].is_whitespace() {
        0
    } else {
        text.leading_whitespaces()
    };
    let trimmed_end_len = if pattern[len_pattern - 1].is_whitespace() {
        0
    } else {
        text.trailing_whitespaces()
    };

    let content_len = text.len().checked_sub(trimmed_len + trimmed_end_len)?;
    if content_len != len_pattern {
        return None;
    }

    let matched = pattern.iter().enumerate().all(|(index, &pchar)| {
        let c = fold_char(text.get(trimmed_len + index), case_sensitive, normalize);
        if normalize {
            normalize_rune(pchar) == c
        } else {
            pchar == c
        }
    });
    if !matched {
        return None;
    }

    let score = (SCORE_MATCH + BONUS_BOUNDARY) as i32 * len_pattern as i32
        + ((BONUS_FIRST_CHAR_MULTIPLIER - 1) * BONUS_BOUNDARY) as i32;
    Some(MatchResult {
        begin: trimmed_len,
        end: trimmed_len + len_pattern,
        score,
        positions: with_pos.then(|| (trimmed_len..trimmed_len + len_pattern).collect()),
    })
}

#[cfg(test)]
mod tests {
    use super::super::{
        BONUS_CAMEL_123, BONUS_CONSECUTIVE, MatchFn,
    };
    use super::super::fuzzy::tests::{assert_match, build_pattern};
    use super::*;

    const M: i32 = SCORE_MATCH as i32;
    const BB: i32 = BONUS_BOUNDARY as i32;
    const BC: i32 = BONUS_CAMEL_123 as i32;
    const CONSEC: i32 = BONUS_CONSECUTIVE as i32;
    const MULT: i32 = BONUS_FIRST_CHAR_MULTIPLIER as i32;

    fn run(
        f: MatchFn,
        case_sensitive: bool,
        forward: bool,
        input: &str,
        pattern: &str,
    ) -> Option<MatchResult> {
        let pattern = build_pattern(pattern, case_sensitive, false);
        let text = Chars::from(input);
        f(case_sensitive, false, forward, &text, &pattern, false, None)
    }

    #[test]
    fn exact_picks_best_boundary_occurrence() {
        // both occurrences are mid-word; the scan keeps the first one seen
        assert_match(exact_match_naive, false, false, true, "foobar foob", "oo", 1, 3, 2 * M + CONSEC);
        // boundary occurrence wins over an earlier mid-word one
        assert_match(
            exact_match_naive,
            false,
            false,
            true,
            "foobar boo",
            "boo",
            7,
            10,
            3 * M + BB * MULT + 2 * BB,
        );
    }

    #[test]
    fn exact_reverse_prefers_trailing_occurrence() {
        assert_match(exact_match_naive, false, false, false, "foobar foob", "oo", 8, 10, 2 * M + CONSEC);
    }

    #[test]
    fn exact_no_match() {
        assert!(run(exact_match_naive, false, true, "foobar", "fooz").is_none());
        assert!(run(exact_match_naive, false, true, "foobar", "oBr").is_none());
        assert!(run(exact_match_naive, true, true, "foobar", "OO").is_none());
        assert!(run(exact_match_naive, false, true, "fo", "foo").is_none());
    }

    #[test]
    fn prefix_basic() {
        assert_match(prefix_match, false, false, true, "fooBarbaz", "foo", 0, 3, 3 * M + BB * MULT + 2 * BB);
        // the run started at a word boundary, so the camel hump inherits that bonus
        assert_match(prefix_match, false, false, true, "fooBarbaz", "foobar", 0, 6, 6 * M + BB * MULT + 5 * BB);
        assert!(run(prefix_match, false, true, "fooBarbaz", "oo").is_none());
        assert!(run(prefix_match, true, true, "fooBarbaz", "Foo").is_none());
    }

    #[test]
    fn prefix_skips_leading_whitespace() {
        assert_match(prefix_match, false, false, true, "  fooBarbaz", "foo", 2, 5, 3 * M + BB * MULT + 2 * BB);
        // a pattern that starts with whitespace anchors at the raw start
        assert_match(prefix_match, false, false, true, " fooBarbaz", " foo", 0, 4, 4 * M + BB * MULT + 3 * BB);
        assert!(run(prefix_match, false, true, "fooBarbaz", " foo").is_none());
    }

    #[test]
    fn suffix_basic() {
        assert_match(suffix_match, false, false, true, "fooBarBaz", "baz", 6, 9, 3 * M + BC * MULT + 2 * BC);
        assert!(run(suffix_match, false, true, "fooBarBaz", "ba").is_none());
    }

    #[test]
    fn suffix_trims_trailing_whitespace() {
        assert_match(suffix_match, false, false, true, "fooBarBaz  ", "baz", 6, 9, 3 * M + BC * MULT + 2 * BC);
        let text = Chars::from("fooBarBaz ");
        let res = suffix_match(false, false, true, &text, &['z', ' '], false, None);
        assert!(res.is_some_and(|r| (r.begin, r.end) == (8, 10)));
    }

    #[test]
    fn suffix_empty_pattern_reports_trimmed_length() {
        let text = Chars::from("foobar ");
        let res = suffix_match(false, false, true, &text, &[], false, None).expect("match");
        assert_eq!((res.begin, res.end, res.score), (6, 6, 0));
    }

    #[test]
    fn equal_basic() {
        let score = (M + BB) * 9 + (MULT - 1) * BB;
        assert_match(equal_match, false, false, true, "fooBarbaz", "fooBarbaz", 0, 9, score);
        assert_match(equal_match, false, false, true, "  fooBarbaz ", "fooBarbaz", 2, 11, score);
        assert!(run(equal_match, false, true, "fooBarbaz", "fooBarbazz").is_none());
        assert!(run(equal_match, false, true, "fooBarbaz", "fooBar").is_none());
        assert!(run(equal_match, true, true, "fooBarbaz", "foobarbaz").is_none());
        assert!(run(equal_match, false, true, "fooBarbaz", "").is_none());
    }

    #[test]
    fn exact_finds_pattern_wherever_it_is_inserted() {
        let base = "lorem ipsum dolor";
        let pattern = build_pattern("qx", false, false);
        for split in 0..=base.len() {
            let line = format!("{}qx{}", &base[..split], &base[split..]);
            let text = Chars::from(line.as_str());
            let res = exact_match_naive(false, false, true, &text, &pattern, false, None)
                .expect("inserted pattern must be found");
            assert_eq!((res.begin, res.end), (split, split + 2), "line {line:?}");
        }
    }

    #[test]
    fn equal_with_normalisation() {
        let pattern = build_pattern("So", false, true);
        let text = Chars::from("Só");
        let res = equal_match(false, true, true, &text, &pattern, false, None).expect("match");
        assert_eq!((res.begin, res.end), (0, 2));
    }
}
