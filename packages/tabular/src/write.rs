//! CSV report writing.

use std::path::Path;

use serde::Serialize;

use crate::TabularError;

/// Columns of `area_changes.csv`.
pub const AREA_CHANGE_COLUMNS: &[&str] = &[
    "area_id",
    "area_name",
    "before_depot_code",
    "before_depot_name",
    "after_depot_code",
    "after_depot_name",
];

/// Columns of `zip_reassignment_all.csv` and `zip_changes_only.csv`.
pub const ZIP_REASSIGNMENT_COLUMNS: &[&str] = &[
    "zip_code",
    "city",
    "town",
    "area_label",
    "area_id",
    "area_name",
    "match_status",
    "before_depot_code",
    "before_depot_name",
    "after_depot_code",
    "after_depot_name",
    "changed",
];

/// Writes `rows` under an explicit header line, creating parent
/// directories as needed. The header is written even when `rows` is
/// empty.
///
/// # Errors
///
/// Returns an error if the file cannot be created or a row fails to
/// serialize.
pub fn write_csv<T: Serialize>(
    path: &Path,
    columns: &[&str],
    rows: &[T],
) -> Result<(), TabularError> {
    let io_error = |e: std::io::Error| TabularError::Io {
        path: path.display().to_string(),
        source: e,
    };
    let csv_error = |e: csv::Error| TabularError::Csv {
        path: path.display().to_string(),
        source: e,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_error)?;
    }

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(csv_error)?;

    writer.write_record(columns).map_err(csv_error)?;
    for row in rows {
        writer.serialize(row).map_err(csv_error)?;
    }
    writer.flush().map_err(io_error)?;

    log::info!("Wrote {} row(s) to {}", rows.len(), path.display());
    Ok(())
}
