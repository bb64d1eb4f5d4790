//! Keyed snapshots of administrative-area assignments.

use std::collections::BTreeMap;

use depot_map_normalize::normalize_depot_code;
use depot_map_zone_models::{AreaAssignment, AssignmentRecord};

/// One load of area assignments, keyed and ordered by `area_id`.
///
/// Duplicate identifiers within a load are resolved last-wins: the final
/// row for an id replaces earlier ones. This is defined behavior; the
/// number of replaced rows is logged at `warn`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignmentSnapshot {
    areas: BTreeMap<String, AreaAssignment>,
}

impl AssignmentSnapshot {
    /// Builds a snapshot from raw records, normalizing each depot label.
    ///
    /// Records with a blank identifier are skipped.
    #[must_use]
    pub fn from_records(records: impl IntoIterator<Item = AssignmentRecord>) -> Self {
        let mut skipped = 0usize;
        let assignments = records.into_iter().filter_map(|record| {
            let area_id = record.area_id.trim();
            if area_id.is_empty() {
                skipped += 1;
                return None;
            }
            Some(AreaAssignment {
                area_id: area_id.to_string(),
                area_name: record.area_name.trim().to_string(),
                depot: normalize_depot_code(&record.depot_label),
            })
        });
        let snapshot: Self = assignments.collect();

        if skipped > 0 {
            log::debug!("Skipped {skipped} assignment row(s) without an area id");
        }
        snapshot
    }

    /// Looks up an area by identifier.
    #[must_use]
    pub fn get(&self, area_id: &str) -> Option<&AreaAssignment> {
        self.areas.get(area_id)
    }

    /// Number of distinct areas.
    #[must_use]
    pub fn len(&self) -> usize {
        self.areas.len()
    }

    /// Whether the snapshot holds no areas.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }

    /// Iterates areas in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &AreaAssignment> {
        self.areas.values()
    }
}

impl FromIterator<AreaAssignment> for AssignmentSnapshot {
    fn from_iter<I: IntoIterator<Item = AreaAssignment>>(iter: I) -> Self {
        let mut areas = BTreeMap::new();
        let mut replaced = 0usize;
        for assignment in iter {
            if areas
                .insert(assignment.area_id.clone(), assignment)
                .is_some()
            {
                replaced += 1;
            }
        }
        if replaced > 0 {
            log::warn!("{replaced} duplicate area id(s) in snapshot; the last row for each id wins");
        }
        Self { areas }
    }
}
