//! Accent folding for Latin code points.
//!
//! A fixed table maps accented Latin code points in `U+00C0..=U+2184` to
//! their unaccented equivalents; everything outside the range passes
//! through untouched. The table is derived once from canonical Unicode
//! decompositions, extended with the stroked and hooked Latin letters that
//! have no canonical decomposition, and then never mutated.

use std::collections::HashMap;
use std::sync::LazyLock;

use unicode_normalization::char::{decompose_canonical, is_combining_mark};

const RANGE_FIRST: u32 = 0x00C0;
const RANGE_LAST: u32 = 0x2184;

/// Letters whose unaccented form is not reachable through canonical
/// decomposition.
const EXTRAS: &[(char, char)] = &[
    ('\u{00d0}', 'D'), // Ð
    ('\u{00d8}', 'O'), // Ø
    ('\u{00de}', 'T'), // Þ
    ('\u{00df}', 's'), // ß
    ('\u{00f0}', 'd'), // ð
    ('\u{00f8}', 'o'), // ø
    ('\u{00fe}', 't'), // þ
    ('\u{0110}', 'D'), // Đ
    ('\u{0111}', 'd'), // đ
    ('\u{0126}', 'H'), // Ħ
    ('\u{0127}', 'h'), // ħ
    ('\u{0131}', 'i'), // ı
    ('\u{0141}', 'L'), // Ł
    ('\u{0142}', 'l'), // ł
    ('\u{0166}', 'T'), // Ŧ
    ('\u{0167}', 't'), // ŧ
    ('\u{0180}', 'b'), // ƀ
    ('\u{0197}', 'I'), // Ɨ
    ('\u{019f}', 'O'), // Ɵ
    ('\u{0248}', 'J'), // Ɉ
    ('\u{0249}', 'j'), // ɉ
    ('\u{0268}', 'i'), // ɨ
    ('\u{0275}', 'o'), // ɵ
];

static TABLE: LazyLock<HashMap<char, char>> = LazyLock::new(|| {
    let mut table = HashMap::new();
    for cp in RANGE_FIRST..=RANGE_LAST {
        let Some(ch) = char::from_u32(cp) else { continue };
        let mut base = None;
        decompose_canonical(ch, |d| {
            if base.is_none() && !is_combining_mark(d) {
                base = Some(d);
            }
        });
        if let Some(base) = base
            && base != ch
            && base.is_ascii_alphanumeric()
        {
            table.insert(ch, base);
        }
    }
    for &(from, to) in EXTRAS {
        table.insert(from, to);
    }
    table
});

/// Fold one code point through the table; identity outside the table.
#[inline]
pub fn normalize_rune(c: char) -> char {
    let cp = c as u32;
    if !(RANGE_FIRST..=RANGE_LAST).contains(&cp) {
        return c;
    }
    TABLE.get(&c).copied().unwrap_or(c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folds_common_accents() {
        assert_eq!(normalize_rune('á'), 'a');
        assert_eq!(normalize_rune('ó'), 'o');
        assert_eq!(normalize_rune('ç'), 'c');
        assert_eq!(normalize_rune('É'), 'E');
        assert_eq!(normalize_rune('ñ'), 'n');
        assert_eq!(normalize_rune('ü'), 'u');
    }

    #[test]
    fn folds_stroked_letters() {
        assert_eq!(normalize_rune('ø'), 'o');
        assert_eq!(normalize_rune('đ'), 'd');
        assert_eq!(normalize_rune('ł'), 'l');
        assert_eq!(normalize_rune('ı'), 'i');
    }

    #[test]
    fn identity_outside_table() {
        assert_eq!(normalize_rune('a'), 'a');
        assert_eq!(normalize_rune('Z'), 'Z');
        assert_eq!(normalize_rune('7'), '7');
        assert_eq!(normalize_rune('世'), '世');
        assert_eq!(normalize_rune('-'), '-');
    }

    #[test]
    fn commutes_with_ascii_case_folding() {
        for cp in 0u32..=0x017F {
            let Some(c) = char::from_u32(cp) else { continue };
            let lower = c.to_lowercase().next().unwrap_or(c);
            let a = normalize_rune(lower);
            let b = normalize_rune(c).to_lowercase().next().unwrap_or(normalize_rune(c));
            assert_eq!(a, b, "case folding and normalisation disagree on {c:?}");
        }
    }
}
