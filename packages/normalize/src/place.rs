//! Municipality and town name canonicalization.
//!
//! Two spellings of the same administrative unit must always produce the
//! same canonical string. The pipeline is applied identically to the
//! authoritative snapshots and to the free-text postal rows.

use std::sync::LazyLock;

use regex::Regex;

use crate::tables::{
    BARE_CITY_EXPANSIONS, CHOME_SUFFIX, PREFECTURE_PREFIXES, WARD_PARENT_CITIES, WARD_SUFFIX,
    canonical_town_char, is_arabic_numeral, is_kanji_numeral,
};

/// Parenthetical annotations, half- or full-width, matched non-greedily.
static ANNOTATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\(.*?\)|（.*?）").expect("valid regex"));

/// Removes all whitespace (including the ideographic space) and every
/// parenthetical annotation.
fn strip_noise(value: &str) -> String {
    let compact: String = value.chars().filter(|c| !c.is_whitespace()).collect();
    ANNOTATION_RE.replace_all(&compact, "").into_owned()
}

/// Strips every leading prefecture prefix, including repeated ones.
fn strip_prefectures(mut value: &str) -> &str {
    loop {
        let Some(rest) = PREFECTURE_PREFIXES
            .iter()
            .find_map(|prefix| value.strip_prefix(*prefix))
        else {
            return value;
        };
        value = rest;
    }
}

/// Applies the short-name expansions to an otherwise stripped name.
fn expand_short_name(value: &str) -> String {
    if let Some(&(_, expanded)) = BARE_CITY_EXPANSIONS.iter().find(|&&(bare, _)| bare == value) {
        return expanded.to_string();
    }

    for &(root, city) in WARD_PARENT_CITIES {
        if value.starts_with(city) {
            continue;
        }
        let Some(ward) = value.strip_prefix(root) else {
            continue;
        };
        // `<root>区` alone is not a ward of the city.
        if ward.ends_with(WARD_SUFFIX) && ward.chars().count() >= 2 {
            return format!("{city}{ward}");
        }
    }

    value.to_string()
}

/// Canonicalizes a municipality (city/ward) name.
///
/// The pipeline:
/// 1. Remove whitespace (half- and full-width)
/// 2. Remove parenthetical annotations
/// 3. Strip leading prefecture prefixes
/// 4. Expand short names (`町田` → `町田市`, `横浜港北区` → `横浜市港北区`)
#[must_use]
pub fn canonical_municipality(value: &str) -> String {
    let stripped = strip_noise(value);
    expand_short_name(strip_prefectures(&stripped))
}

/// Strips trailing block-number suffixes (`1丁目`, `一丁目`, `１丁目`)
/// until none remain.
fn strip_chome(mut value: &str) -> &str {
    while let Some(head) = value.strip_suffix(CHOME_SUFFIX) {
        let arabic = head.trim_end_matches(is_arabic_numeral);
        let trimmed = if arabic.len() == head.len() {
            head.trim_end_matches(is_kanji_numeral)
        } else {
            arabic
        };
        if trimmed.len() == head.len() {
            break;
        }
        value = trimmed;
    }
    value
}

/// Canonicalizes a town name so that matching ignores chome subdivision.
///
/// The pipeline:
/// 1. Remove whitespace and parenthetical annotations
/// 2. Map character variants (`ヶ`/`ヵ`/`ｹ` → `ケ`, `之` → `の`)
/// 3. Strip trailing `<numerals>丁目` suffixes
#[must_use]
pub fn canonical_town_name(value: &str) -> String {
    let unified: String = strip_noise(value)
        .chars()
        .map(canonical_town_char)
        .collect();
    strip_chome(&unified).to_string()
}
