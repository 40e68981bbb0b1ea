//! Fuzzy matchers: optimal alignment and the greedy linear scan.
//!
//! `fuzzy_match_v2` finds the maximum-scoring alignment that consumes every
//! pattern code point in order. It is a constrained Smith-Waterman over a
//! rectangular score matrix whose width is bounded by the first and last
//! plausible match positions, with affine gaps and the positional bonus
//! model from the parent module. `fuzzy_match_v1` is the linear-time greedy
//! shortcut: scan forward to find a window containing the pattern, tighten
//! it from the back, then score the window additively. V2 delegates to v1
//! whenever the score matrix would overrun the slab's 16-bit pool, which
//! caps memory and keeps the worst case linear.

use super::{
    BONUS_BOUNDARY, BONUS_CONSECUTIVE, BONUS_FIRST_CHAR_MULTIPLIER, CharClass, MatchResult, Score,
    SCORE_GAP_EXTENSION, SCORE_GAP_START, SCORE_MATCH, ascii_fuzzy_index, calculate_score,
    char_class_of_ascii, char_class_of_non_ascii, fold_char, index_at,
};
use crate::algo::normalize::normalize_rune;
use crate::chars::Chars;
use crate::slab::{Slab, alloc};

#[inline]
fn char_from_u32(u: u32) -> char {
    char::from_u32(u).unwrap_or(char::REPLACEMENT_CHARACTER)
}

/// Greedy fuzzy matching in a single forward pass plus a backward
/// tightening pass. O(N) time, O(M) space for positions.
pub fn fuzzy_match_v1(
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
    ascii_fuzzy_index(text, pattern, case_sensitive)?;

    let len_runes = text.len();
    let len_pattern = pattern.len();

    let mut pidx = 0usize;
    let mut sidx = None;
    let mut eidx = None;
    for index in 0..len_runes {
        let c = fold_char(
            text.get(index_at(index, len_runes, forward)),
            case_sensitive,
            normalize,
        );
        let pchar = pattern[index_at(pidx, len_pattern, forward)];
        if c == pchar {
            if sidx.is_none() {
                sidx = Some(index);
            }
            pidx += 1;
            if pidx == len_pattern {
                eidx = Some(index + 1);
                break;
            }
        }
    }

    let (mut sidx, mut eidx) = (sidx?, eidx?);

    // Tighten the window from the back so the reported start is the
    // rightmost viable one.
    let mut pidx = len_pattern - 1;
    let mut index = eidx;
    while index > sidx {
        index -= 1;
        let tidx = index_at(index, len_runes, forward);
        let c = fold_char(text.get(tidx), case_sensitive, normalize);
        let pchar = pattern[index_at(pidx, len_pattern, forward)];
        if c == pchar {
            if pidx == 0 {
                sidx = index;
                break;
            }
            pidx -= 1;
        }
    }

    if !forward {
        let (s, e) = (len_runes - eidx, len_runes - sidx);
        sidx = s;
        eidx = e;
    }

    let (score, positions) =
        calculate_score(case_sensitive, normalize, text, pattern, sidx, eidx, with_pos);
    Some(MatchResult {
        begin: sidx,
        end: eidx,
        score,
        positions,
    })
}

/// Optimal fuzzy matching over a bounded score matrix.
pub fn fuzzy_match_v2(
    case_sensitive: bool,
    normalize: bool,
    forward: bool,
    text: &Chars,
    pattern: &[char],
    with_pos: bool,
    slab: Option<&mut Slab>,
) -> Option<MatchResult> {
    let m = pattern.len();
    if m == 0 {
        return Some(MatchResult::empty(with_pos));
    }
    let n = text.len();
    if m > n {
        return None;
    }

    // The matrix would overrun the 16-bit pool; greedy keeps it linear.
    if let Some(cap16) = slab.as_ref().map(|s| s.cap16())
        && n * m > cap16
    {
        return fuzzy_match_v1(case_sensitive, normalize, forward, text, pattern, with_pos, slab);
    }

    // Phase 1. Prove the pattern is a plausible subsequence of ASCII text
    // before paying for any scoring work.
    let idx = ascii_fuzzy_index(text, pattern, case_sensitive)?;

    let (mut pool16, mut pool32): (&mut [i16], &mut [u32]) = match slab {
        Some(s) => s.pools(),
        None => (&mut [], &mut []),
    };

    let mut h0 = alloc(&mut pool16, n);
    let mut c0 = alloc(&mut pool16, n);
    // Bonus at each position
    let mut b = alloc(&mut pool16, n);
    // First text index at which each pattern code point can match
    let mut f = alloc(&mut pool32, m);
    // The folded text
    let mut t = alloc(&mut pool32, n);
    text.copy_runes_into(&mut t);

    // Phase 2. Single left-to-right scan: fold, classify, record bonuses,
    // track first occurrences, and fill row 0 of the matrix.
    let mut max_score: Score = 0;
    let mut max_score_pos = 0usize;
    let mut pidx = 0usize;
    let mut last_idx = 0usize;
    let pchar0 = pattern[0];
    let mut pchar = pattern[0];
    let mut prev_h0: Score = 0;
    let mut prev_class = CharClass::NonWord;
    let mut in_gap = false;

    for off in idx..n {
        let mut ch = char_from_u32(t[off]);
        let class;
        if ch.is_ascii() {
            class = char_class_of_ascii(ch);
            if !case_sensitive && class == CharClass::Upper {
                ch = ch.to_ascii_lowercase();
            }
        } else {
            class = char_class_of_non_ascii(ch);
            if !case_sensitive && class == CharClass::Upper {
                ch = ch.to_lowercase().next().unwrap_or(ch);
            }
            if normalize {
                ch = normalize_rune(ch);
            }
        }
        t[off] = ch as u32;
        let bonus = super::bonus_for(prev_class, class);
        b[off] = bonus;
        prev_class = class;

        if ch == pchar {
            if pidx < m {
                f[pidx] = off as u32;
                pidx += 1;
                pchar = pattern[pidx.min(m - 1)];
            }
            last_idx = off;
        }

        if ch == pchar0 {
            let score = SCORE_MATCH + bonus * BONUS_FIRST_CHAR_MULTIPLIER;
            h0[off] = score;
            c0[off] = 1;
            if m == 1 && (forward && score > max_score || !forward && score >= max_score) {
                max_score = score;
                max_score_pos = off;
                if forward && bonus >= BONUS_BOUNDARY {
                    break;
                }
            }
            in_gap = false;
        } else {
            h0[off] = if in_gap {
                (prev_h0 + SCORE_GAP_EXTENSION).max(0)
            } else {
                (prev_h0 + SCORE_GAP_START).max(0)
            };
            c0[off] = 0;
            in_gap = true;
        }
        prev_h0 = h0[off];
    }
    if pidx != m {
        return None;
    }

    if m == 1 {
        return Some(MatchResult {
            begin: max_score_pos,
            end: max_score_pos + 1,
            score: max_score as i32,
            positions: with_pos.then(|| vec![max_score_pos]),
        });
    }

    // Phase 3. Fill the remaining rows. Each row only spans the columns
    // where its pattern code point can still complete a match.
    let f0 = f[0] as usize;
    let width = last_idx - f0 + 1;
    let mut h = alloc(&mut pool16, width * m);
    h[..width].copy_from_slice(&h0[f0..=last_idx]);

    // Consecutive-run length at each cell
    let mut c = alloc(&mut pool16, width * m);
    c[..width].copy_from_slice(&c0[f0..=last_idx]);

    for pi in 1..m {
        let fcur = f[pi] as usize;
        let pchar = pattern[pi] as u32;
        let row = pi * width;
        let mut in_gap = false;
        h[row + fcur - f0 - 1] = 0;
        for col in fcur..=last_idx {
            let off = col - f0;
            let mut s1: Score = 0;
            let mut consecutive: Score = 0;

            let s2 = if in_gap {
                h[row + off - 1] + SCORE_GAP_EXTENSION
            } else {
                h[row + off - 1] + SCORE_GAP_START
            };

            if pchar == t[col] {
                s1 = h[row - width + off - 1] + SCORE_MATCH;
                let mut bonus = b[col];
                consecutive = c[row - width + off - 1] + 1;
                if consecutive > 1 {
                    let fb = b[col + 1 - consecutive as usize];
                    // A stronger boundary restarts the run
                    if bonus >= BONUS_BOUNDARY && bonus > fb {
                        consecutive = 1;
                    } else {
                        bonus = bonus.max(fb.max(BONUS_CONSECUTIVE));
                    }
                }
                if s1 + bonus < s2 {
                    s1 += b[col];
                    consecutive = 0;
                } else {
                    s1 += bonus;
                }
            }
            c[row + off] = consecutive;

            in_gap = s1 < s2;
            let score = s1.max(s2).max(0);
            if pi == m - 1 && (forward && score > max_score || !forward && score >= max_score) {
                max_score = score;
                max_score_pos = col;
            }
            h[row + off] = score;
        }
    }

    // Phase 4. Backtrace for positions when requested. Ties between the
    // diagonal and the left neighbour go to the match when the current cell
    // continues a run or the cell below could start one.
    let mut begin = f0;
    let mut positions = with_pos.then(|| Vec::with_capacity(m));
    if let Some(pos) = positions.as_mut() {
        let mut i = m - 1;
        let mut j = max_score_pos;
        let mut prefer_match = true;
        loop {
            let ii = i * width;
            let j0 = j - f0;
            let s = h[ii + j0];

            let mut s1: Score = 0;
            let mut s2: Score = 0;
            if i > 0 && j >= f[i] as usize {
                s1 = h[ii - width + j0 - 1];
            }
            if j > f[i] as usize {
                s2 = h[ii + j0 - 1];
            }

            if s > s1 && (s > s2 || (s == s2 && prefer_match)) {
                pos.push(j);
                if i == 0 {
                    break;
                }
                i -= 1;
            }
            prefer_match = c[ii + j0] > 1
                || (ii + width + j0 + 1 < c.len() && c[ii + width + j0 + 1] > 0);
            j -= 1;
        }
        pos.reverse();
        begin = j;
    }

    Some(MatchResult {
        begin,
        end: max_score_pos + 1,
        score: max_score as i32,
        positions,
    })
}
