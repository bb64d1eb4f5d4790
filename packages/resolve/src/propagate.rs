//! Pushes area-level depot changes down to postal-code rows.

use std::collections::BTreeMap;

use depot_map_normalize::{format_postal_code, normalize_depot_code, normalize_zip};
use depot_map_zone_models::{AreaAssignment, PostalRecord, ZipReassignmentRow, depot_name};

use crate::index::NameIndex;
use crate::snapshot::AssignmentSnapshot;

/// Every postal row with its outcome, plus the rows whose depot moved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Propagation {
    /// One row per input record, in input order.
    pub all: Vec<ZipReassignmentRow>,
    /// The subset of [`all`](Self::all) with `changed` set.
    pub changed: Vec<ZipReassignmentRow>,
}

/// Applies a change set to postal rows.
#[derive(Debug, Clone, Copy)]
pub struct Reassignment<'a> {
    /// Name lookup for the free-text city and area label.
    pub index: &'a NameIndex,
    /// Snapshot before the edit.
    pub baseline: &'a AssignmentSnapshot,
    /// Snapshot after the edit.
    pub updated: &'a AssignmentSnapshot,
    /// Output of [`detect_changes`](crate::detect_changes).
    pub changes: &'a BTreeMap<String, AreaAssignment>,
}

impl Reassignment<'_> {
    /// Resolves one postal row.
    ///
    /// The `before` depot is what the row itself states. The `after` depot
    /// differs only when the row uniquely matches a changed area.
    #[must_use]
    pub fn apply(&self, record: &PostalRecord) -> ZipReassignmentRow {
        let found = self.index.lookup(&record.city, &record.area_label);
        let area_id = found.area_id().unwrap_or_default();
        if area_id.is_empty() {
            log::debug!(
                "{} {:?}/{:?}: {}",
                format_postal_code(&record.zip_code),
                record.city,
                record.area_label,
                found.status()
            );
        }

        let area_name = self
            .updated
            .get(area_id)
            .or_else(|| self.baseline.get(area_id))
            .map(|area| area.area_name.clone())
            .unwrap_or_default();

        let before = normalize_depot_code(&record.depot_label);
        let after = self
            .changes
            .get(area_id)
            .map_or(before, |change| change.depot);

        ZipReassignmentRow {
            zip_code: normalize_zip(&record.zip_code),
            city: record.city.clone(),
            town: record.town.clone(),
            area_label: record.area_label.clone(),
            area_id: area_id.to_string(),
            area_name,
            match_status: found.status(),
            before_depot_code: before,
            before_depot_name: depot_name(before),
            after_depot_code: after,
            after_depot_name: depot_name(after),
            changed: before != after,
        }
    }

    /// Resolves every row, preserving input order.
    #[must_use]
    pub fn propagate(&self, records: &[PostalRecord]) -> Propagation {
        let all: Vec<ZipReassignmentRow> = records.iter().map(|r| self.apply(r)).collect();
        let changed: Vec<ZipReassignmentRow> = all.iter().filter(|r| r.changed).cloned().collect();

        let unmatched = all.iter().filter(|r| r.area_id.is_empty()).count();
        if unmatched > 0 {
            log::warn!(
                "{unmatched} of {} postal row(s) did not match exactly one area",
                all.len()
            );
        }
        log::info!(
            "Propagated changes: {} of {} postal row(s) changed depot",
            changed.len(),
            all.len()
        );

        Propagation { all, changed }
    }
}
