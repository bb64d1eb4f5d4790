//! End-to-end reconciliation of an assignment edit.

use depot_map_zone_models::{AreaChangeRow, PostalRecord};

use crate::changes::{area_change_rows, detect_changes};
use crate::index::NameIndex;
use crate::propagate::{Propagation, Reassignment};
use crate::snapshot::AssignmentSnapshot;

/// Everything the `zip-changes` pipeline writes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// Area-level changes, sorted by area id.
    pub area_changes: Vec<AreaChangeRow>,
    /// Postal-level outcome.
    pub propagation: Propagation,
}

/// Diffs `baseline` against `updated` and propagates the result to the
/// postal rows.
///
/// Postal rows are matched against the updated snapshot's names, or the
/// baseline's when the updated snapshot is empty.
#[must_use]
pub fn reconcile(
    baseline: &AssignmentSnapshot,
    updated: &AssignmentSnapshot,
    include_clear: bool,
    records: &[PostalRecord],
) -> Reconciliation {
    let changes = detect_changes(baseline, updated, include_clear);

    let index = NameIndex::build(if updated.is_empty() {
        baseline
    } else {
        updated
    });

    let propagation = Reassignment {
        index: &index,
        baseline,
        updated,
        changes: &changes,
    }
    .propagate(records);

    Reconciliation {
        area_changes: area_change_rows(baseline, &changes),
        propagation,
    }
}
