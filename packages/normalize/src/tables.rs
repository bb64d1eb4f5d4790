//! Fixed lookup tables used by the place-name canonicalizers.
//!
//! Municipality tables cover the Tokyo/Kanagawa service region. Both
//! directions of every expansion must be covered here: a table entry that
//! produced a value which itself matched another entry would break
//! idempotence.

/// Prefecture prefixes stripped from the front of municipality names.
pub const PREFECTURE_PREFIXES: &[&str] = &["東京都", "神奈川県"];

/// City roots that are commonly written without their `市` suffix.
///
/// Matched against the whole (already stripped) name.
pub const BARE_CITY_EXPANSIONS: &[(&str, &str)] = &[("町田", "町田市"), ("藤沢", "藤沢市")];

/// Designated cities whose wards are commonly written as
/// `<root><ward>区` (e.g. `横浜港北区`). The root is replaced by the full
/// city name.
pub const WARD_PARENT_CITIES: &[(&str, &str)] = &[
    ("横浜", "横浜市"),
    ("川崎", "川崎市"),
    ("相模原", "相模原市"),
];

/// Ward suffix that triggers the designated-city expansion.
pub const WARD_SUFFIX: char = '区';

/// Character variants in town names mapped to one canonical form.
///
/// The small-ke forms (`ヶ`, `ヵ`, half-width `ｹ`) collapse to `ケ`, and
/// the archaic possessive `之` collapses to `の`.
pub const TOWN_CHAR_VARIANTS: &[(char, char)] = &[
    ('ヶ', 'ケ'),
    ('ヵ', 'ケ'),
    ('ｹ', 'ケ'),
    ('之', 'の'),
];

/// Block-number suffix stripped from town names.
pub const CHOME_SUFFIX: &str = "丁目";

/// Kanji numerals that may precede [`CHOME_SUFFIX`].
pub const KANJI_NUMERALS: &[char] = &['一', '二', '三', '四', '五', '六', '七', '八', '九', '十'];

/// Returns the canonical form of a town-name character.
#[must_use]
pub fn canonical_town_char(c: char) -> char {
    TOWN_CHAR_VARIANTS
        .iter()
        .find_map(|&(variant, canonical)| (variant == c).then_some(canonical))
        .unwrap_or(c)
}

/// Whether `c` is an Arabic numeral, half- or full-width.
#[must_use]
pub const fn is_arabic_numeral(c: char) -> bool {
    c.is_ascii_digit() || matches!(c, '０'..='９')
}

/// Whether `c` is one of [`KANJI_NUMERALS`].
#[must_use]
pub fn is_kanji_numeral(c: char) -> bool {
    KANJI_NUMERALS.contains(&c)
}
