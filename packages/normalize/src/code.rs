//! Postal code and depot label normalization.

use depot_map_zone_models::Depot;

/// Length of a Japanese postal code in digits.
pub const POSTAL_CODE_LEN: usize = 7;

/// Normalizes a postal code to its 7 digits.
///
/// Every non-digit is dropped (full-width digits count as digits). Input
/// with fewer than 7 digits is treated as absent and yields `""`; extra
/// digits beyond the seventh are truncated.
#[must_use]
pub fn normalize_zip(value: &str) -> String {
    let digits: String = value
        .chars()
        .filter_map(|c| match c {
            '0'..='9' => Some(c),
            '０'..='９' => char::from_u32(u32::from(c) - u32::from('０') + u32::from('0')),
            _ => None,
        })
        .take(POSTAL_CODE_LEN)
        .collect();

    if digits.len() < POSTAL_CODE_LEN {
        return String::new();
    }
    digits
}

/// Formats a postal code as `NNN-NNNN`, or `""` if it does not normalize
/// to 7 digits.
#[must_use]
pub fn format_postal_code(value: &str) -> String {
    let digits = normalize_zip(value);
    if digits.is_empty() {
        return String::new();
    }
    format!("{}-{}", &digits[..3], &digits[3..])
}

/// Order in which depots are tried against a free-text label.
const MATCH_ORDER: [Depot; 3] = [Depot::Sgm, Depot::Fuj, Depot::Yok];

/// Maps a free-text depot label to one of the known depots.
///
/// Accepts the bare code in any case (`"sgm"`), text containing the code
/// (`"相模原デポ SGM"`), or text containing the depot's place-name keyword
/// (`"相模原"`). Depots are tried in SGM, FUJ, YOK order, each by code or
/// keyword, so a label naming two depots resolves to the earlier one.
/// Anything else is unassigned.
#[must_use]
pub fn normalize_depot_code(value: &str) -> Option<Depot> {
    let raw = value.trim();
    if raw.is_empty() {
        return None;
    }

    let upper = raw.to_uppercase();
    if let Ok(depot) = upper.parse::<Depot>() {
        return Some(depot);
    }

    MATCH_ORDER
        .into_iter()
        .find(|depot| upper.contains(depot.code()) || raw.contains(depot.keyword()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_zip_punctuation() {
        assert_eq!(normalize_zip("252-0143"), "2520143");
        assert_eq!(normalize_zip("〒252 0143"), "2520143");
    }

    #[test]
    fn converts_full_width_zip_digits() {
        assert_eq!(normalize_zip("２５２－０１４３"), "2520143");
    }

    #[test]
    fn rejects_short_zip() {
        assert_eq!(normalize_zip("abc12"), "");
        assert_eq!(normalize_zip("252-014"), "");
        assert_eq!(normalize_zip(""), "");
    }

    #[test]
    fn truncates_long_zip() {
        assert_eq!(normalize_zip("25201439"), "2520143");
    }

    #[test]
    fn formats_postal_code() {
        assert_eq!(format_postal_code("2520143"), "252-0143");
        assert_eq!(format_postal_code("252"), "");
    }

    #[test]
    fn accepts_code_name_and_keyword_equally() {
        let code = normalize_depot_code("SGM");
        assert_eq!(code, Some(Depot::Sgm));
        assert_eq!(normalize_depot_code("相模原デポ SGM"), code);
        assert_eq!(normalize_depot_code("相模原"), code);
        assert_eq!(normalize_depot_code(" sgm "), code);
    }

    #[test]
    fn maps_every_display_name_to_its_depot() {
        for depot in Depot::ALL {
            assert_eq!(normalize_depot_code(depot.display_name()), Some(depot));
            assert_eq!(normalize_depot_code(depot.keyword()), Some(depot));
        }
    }

    #[test]
    fn mixed_labels_resolve_in_depot_order() {
        assert_eq!(normalize_depot_code("藤沢デポ SGM"), Some(Depot::Sgm));
        assert_eq!(normalize_depot_code("相模原 FUJ"), Some(Depot::Sgm));
        assert_eq!(normalize_depot_code("横浜港北 FUJ"), Some(Depot::Fuj));
    }

    #[test]
    fn unknown_labels_are_unassigned() {
        assert_eq!(normalize_depot_code(""), None);
        assert_eq!(normalize_depot_code("   "), None);
        assert_eq!(normalize_depot_code("東京デポ"), None);
        assert_eq!(normalize_depot_code("横浜"), None);
    }
}
