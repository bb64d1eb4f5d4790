//! Area-level change detection between two snapshots.

use std::collections::BTreeMap;

use depot_map_zone_models::{AreaAssignment, AreaChangeRow, depot_name};

use crate::snapshot::AssignmentSnapshot;

/// Areas whose depot differs between `baseline` and `updated`, keyed by id.
///
/// An area absent from the baseline is treated as unassigned there. A
/// change to an empty depot (a clear) is only recorded when
/// `include_clear` is set. The recorded name is the updated name, falling
/// back to the baseline name and then to the identifier.
#[must_use]
pub fn detect_changes(
    baseline: &AssignmentSnapshot,
    updated: &AssignmentSnapshot,
    include_clear: bool,
) -> BTreeMap<String, AreaAssignment> {
    let mut changes = BTreeMap::new();
    let mut clears_skipped = 0usize;

    for area in updated.iter() {
        let before = baseline.get(&area.area_id);
        if before.and_then(|b| b.depot) == area.depot {
            continue;
        }
        if area.depot.is_none() && !include_clear {
            clears_skipped += 1;
            continue;
        }

        let area_name = [
            area.area_name.as_str(),
            before.map_or("", |b| b.area_name.as_str()),
        ]
        .into_iter()
        .find(|name| !name.is_empty())
        .unwrap_or(area.area_id.as_str())
        .to_string();

        changes.insert(
            area.area_id.clone(),
            AreaAssignment {
                area_id: area.area_id.clone(),
                area_name,
                depot: area.depot,
            },
        );
    }

    if clears_skipped > 0 {
        log::info!(
            "Ignored {clears_skipped} cleared assignment(s); pass --include-clear to apply them"
        );
    }
    log::info!(
        "Detected {} area change(s) across {} updated area(s)",
        changes.len(),
        updated.len()
    );

    changes
}

/// Renders detected changes as output rows, sorted by area id.
#[must_use]
pub fn area_change_rows(
    baseline: &AssignmentSnapshot,
    changes: &BTreeMap<String, AreaAssignment>,
) -> Vec<AreaChangeRow> {
    changes
        .values()
        .map(|change| {
            let before = baseline.get(&change.area_id).and_then(|b| b.depot);
            AreaChangeRow {
                area_id: change.area_id.clone(),
                area_name: change.area_name.clone(),
                before_depot_code: before,
                before_depot_name: depot_name(before),
                after_depot_code: change.depot,
                after_depot_name: depot_name(change.depot),
            }
        })
        .collect()
}
