//! Tiered depot resolution for fine-grained geographic units.
//!
//! Evidence is collected at two grains. Municipality evidence comes from
//! the authoritative area snapshot; town evidence comes from postal rows
//! whose town names are canonicalized so that chome subdivisions collapse
//! onto the parent town. Resolution prefers town evidence and falls back
//! to the municipality only when the town is unknown. Contradictory
//! evidence at either grain never picks a winner.

use std::collections::{BTreeMap, BTreeSet};

use depot_map_normalize::{canonical_municipality, canonical_town_name, normalize_depot_code};
use depot_map_zone_models::{AssignmentRecord, Depot, MatchStatus, PostalRecord};

/// Service-area label of rows describing special facilities rather than
/// residential towns.
pub const SPECIAL_FACILITY_LABEL: &str = "特定施設・基地等";

/// Town placeholder meaning "any town not listed elsewhere".
pub const UNLISTED_TOWN_SENTINEL: &str = "以下に掲載がない場合";

/// A depot decision and the rule that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDepot {
    /// Resolved depot, `None` for conflicts and missing data.
    pub depot: Option<Depot>,
    /// Which tier decided.
    pub status: MatchStatus,
}

/// Depot evidence at town and municipality grain.
#[derive(Debug, Clone, Default)]
pub struct TieredResolver {
    town_to_depots: BTreeMap<(String, String), BTreeSet<Depot>>,
    muni_to_depots: BTreeMap<String, BTreeSet<Depot>>,
}

impl TieredResolver {
    /// Seeds municipality evidence from raw baseline rows.
    ///
    /// Every row counts, including rows without an area id and rows that
    /// share an id, so a municipality split across rows keeps all of its
    /// depots. Every named municipality gets an entry, including those
    /// with no depot, so that they count as known when inferring
    /// municipalities for town evidence.
    #[must_use]
    pub fn from_baseline(records: &[AssignmentRecord]) -> Self {
        let mut muni_to_depots: BTreeMap<String, BTreeSet<Depot>> = BTreeMap::new();
        for record in records {
            let muni = canonical_municipality(&record.area_name);
            if muni.is_empty() {
                continue;
            }
            let depots = muni_to_depots.entry(muni).or_default();
            if let Some(depot) = normalize_depot_code(&record.depot_label) {
                depots.insert(depot);
            }
        }

        log::info!(
            "Municipality evidence: {} municipalities from {} baseline rows",
            muni_to_depots.len(),
            records.len()
        );

        Self {
            town_to_depots: BTreeMap::new(),
            muni_to_depots,
        }
    }

    /// Adds town evidence from postal rows.
    ///
    /// Rows without a depot, special-facility rows, rows with an empty or
    /// placeholder town, and rows whose municipality cannot be inferred
    /// are skipped.
    #[must_use]
    pub fn with_postal_records(mut self, records: &[PostalRecord]) -> Self {
        let mut used = 0usize;
        for record in records {
            let Some(depot) = normalize_depot_code(&record.depot_label) else {
                continue;
            };
            if record.area_label.trim() == SPECIAL_FACILITY_LABEL {
                continue;
            }
            let town = record.town.trim();
            if town.is_empty() || town == UNLISTED_TOWN_SENTINEL {
                continue;
            }
            let Some(muni) = self.infer_municipality(&record.city, &record.area_label) else {
                log::trace!(
                    "No known municipality for city={:?} area={:?}",
                    record.city,
                    record.area_label
                );
                continue;
            };
            let town_key = canonical_town_name(town);
            if town_key.is_empty() {
                continue;
            }

            self.town_to_depots
                .entry((muni, town_key))
                .or_default()
                .insert(depot);
            used += 1;
        }

        log::info!(
            "Town evidence: {} towns from {used} of {} postal rows",
            self.town_to_depots.len(),
            records.len()
        );
        self
    }

    fn infer_municipality(&self, city: &str, area_label: &str) -> Option<String> {
        [city, area_label]
            .into_iter()
            .map(canonical_municipality)
            .find(|muni| self.knows_municipality(muni))
    }

    /// Canonical names of every municipality seen in the baseline.
    pub fn municipalities(&self) -> impl Iterator<Item = &str> {
        self.muni_to_depots.keys().map(String::as_str)
    }

    /// Whether `municipality` (already canonical) appeared in the baseline.
    #[must_use]
    pub fn knows_municipality(&self, municipality: &str) -> bool {
        self.muni_to_depots.contains_key(municipality)
    }

    /// The municipality's depot, only when exactly one is recorded.
    #[must_use]
    pub fn single_depot(&self, municipality: &str) -> Option<Depot> {
        singleton(self.muni_to_depots.get(municipality)?)
    }

    /// Resolves the depot of a town inside a municipality. Both names are
    /// canonicalized here; the first matching tier wins.
    #[must_use]
    pub fn resolve(&self, municipality: &str, town_name: &str) -> ResolvedDepot {
        let muni = canonical_municipality(municipality);
        let town = canonical_town_name(town_name);

        if let Some(depots) = self.town_to_depots.get(&(muni.clone(), town)) {
            return match singleton(depots) {
                Some(depot) => ResolvedDepot {
                    depot: Some(depot),
                    status: MatchStatus::TownMatch,
                },
                None => ResolvedDepot {
                    depot: None,
                    status: MatchStatus::TownConflict(depots.clone()),
                },
            };
        }

        match self.muni_to_depots.get(&muni) {
            Some(depots) if depots.len() == 1 => ResolvedDepot {
                depot: singleton(depots),
                status: MatchStatus::MuniFallback,
            },
            Some(depots) if depots.len() > 1 => ResolvedDepot {
                depot: None,
                status: MatchStatus::MuniConflict(depots.clone()),
            },
            _ => ResolvedDepot {
                depot: None,
                status: MatchStatus::NoData,
            },
        }
    }
}

fn singleton(depots: &BTreeSet<Depot>) -> Option<Depot> {
    match depots.len() {
        1 => depots.first().copied(),
        _ => None,
    }
}
