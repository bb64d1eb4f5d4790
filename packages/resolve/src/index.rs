//! Reverse lookup from canonical names to area identifiers.
//!
//! Free-text postal rows name their area by city or by service-area
//! label, never by identifier. The index maps the canonical form of every
//! identifier and every area name back to the identifiers it may denote.
//! A key that maps to several identifiers is a real ambiguity and is
//! surfaced as such; the index never picks one.

use std::collections::{BTreeMap, BTreeSet};

use depot_map_normalize::canonical_municipality;
use depot_map_zone_models::MatchStatus;

use crate::snapshot::AssignmentSnapshot;

/// Canonical name → identifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameIndex {
    keys: BTreeMap<String, BTreeSet<String>>,
}

/// Outcome of looking a postal row up in the [`NameIndex`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AreaMatch {
    /// Neither input named a known area.
    NoMatch,
    /// Exactly one area matched.
    Unique(String),
    /// Several areas matched; the caller must not guess.
    Ambiguous(BTreeSet<String>),
}

impl AreaMatch {
    /// The matched identifier, only for a unique match.
    #[must_use]
    pub fn area_id(&self) -> Option<&str> {
        match self {
            Self::Unique(id) => Some(id),
            Self::NoMatch | Self::Ambiguous(_) => None,
        }
    }

    /// `OK`, `NO_MATCH`, or `AMBIGUOUS`.
    #[must_use]
    pub const fn status(&self) -> MatchStatus {
        match self {
            Self::NoMatch => MatchStatus::NoMatch,
            Self::Unique(_) => MatchStatus::Ok,
            Self::Ambiguous(_) => MatchStatus::Ambiguous,
        }
    }
}

impl From<BTreeSet<String>> for AreaMatch {
    fn from(mut ids: BTreeSet<String>) -> Self {
        match ids.len() {
            0 => Self::NoMatch,
            1 => ids.pop_first().map_or(Self::NoMatch, Self::Unique),
            _ => Self::Ambiguous(ids),
        }
    }
}

impl NameIndex {
    /// Indexes every area of `snapshot` under the canonical forms of both
    /// its identifier and its name. Empty keys are not indexed.
    #[must_use]
    pub fn build(snapshot: &AssignmentSnapshot) -> Self {
        let mut keys: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for area in snapshot.iter() {
            for raw in [&area.area_id, &area.area_name] {
                let key = canonical_municipality(raw);
                if key.is_empty() {
                    continue;
                }
                keys.entry(key).or_default().insert(area.area_id.clone());
            }
        }

        let ambiguous = keys.values().filter(|ids| ids.len() > 1).count();
        log::debug!(
            "Built name index: {} keys over {} areas ({ambiguous} ambiguous)",
            keys.len(),
            snapshot.len()
        );

        Self { keys }
    }

    /// Identifiers reachable from the canonical form of either input.
    #[must_use]
    pub fn resolve(&self, city: &str, area_label: &str) -> BTreeSet<String> {
        let mut candidates = BTreeSet::new();
        for raw in [city, area_label] {
            if let Some(ids) = self.keys.get(&canonical_municipality(raw)) {
                candidates.extend(ids.iter().cloned());
            }
        }
        candidates
    }

    /// Like [`resolve`](Self::resolve), classified into an [`AreaMatch`].
    #[must_use]
    pub fn lookup(&self, city: &str, area_label: &str) -> AreaMatch {
        self.resolve(city, area_label).into()
    }

    /// Number of distinct keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the index has no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use depot_map_zone_models::{AreaAssignment, Depot};

    fn area(id: &str, name: &str) -> AreaAssignment {
        AreaAssignment {
            area_id: id.to_string(),
            area_name: name.to_string(),
            depot: Some(Depot::Sgm),
        }
    }

    fn snapshot() -> AssignmentSnapshot {
        [
            area("14109", "横浜市港北区"),
            area("13209", "町田市"),
            area("14205", "藤沢市"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn matches_by_variant_name() {
        let index = NameIndex::build(&snapshot());
        assert_eq!(
            index.lookup("横浜港北区", ""),
            AreaMatch::Unique("14109".to_string())
        );
        assert_eq!(
            index.lookup("", "町田"),
            AreaMatch::Unique("13209".to_string())
        );
    }

    #[test]
    fn matches_by_identifier() {
        let index = NameIndex::build(&snapshot());
        assert_eq!(index.lookup("14205", "").area_id(), Some("14205"));
    }

    #[test]
    fn city_and_label_naming_same_area_is_unique() {
        let index = NameIndex::build(&snapshot());
        let found = index.lookup("藤沢市", "藤沢");
        assert_eq!(found.status(), MatchStatus::Ok);
    }

    #[test]
    fn no_match_for_unknown_names() {
        let index = NameIndex::build(&snapshot());
        let found = index.lookup("大和市", "");
        assert_eq!(found, AreaMatch::NoMatch);
        assert_eq!(found.status(), MatchStatus::NoMatch);
        assert_eq!(found.area_id(), None);
    }

    #[test]
    fn blank_inputs_never_match() {
        let index = NameIndex::build(&snapshot());
        assert!(index.resolve("", "　").is_empty());
    }

    #[test]
    fn shared_names_are_ambiguous() {
        let snapshot: AssignmentSnapshot = [area("A", "中央区"), area("B", "中央区（旧）")]
            .into_iter()
            .collect();
        let index = NameIndex::build(&snapshot);

        let ids = index.resolve("中央区", "");
        assert_eq!(ids, BTreeSet::from(["A".to_string(), "B".to_string()]));

        let found = index.lookup("中央区", "");
        assert_eq!(found.status(), MatchStatus::Ambiguous);
        assert_eq!(found.area_id(), None);
    }

    #[test]
    fn city_and_label_naming_different_areas_is_ambiguous() {
        let index = NameIndex::build(&snapshot());
        assert_eq!(
            index.lookup("町田市", "藤沢市").status(),
            MatchStatus::Ambiguous
        );
    }
}
