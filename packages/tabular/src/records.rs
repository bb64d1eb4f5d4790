//! Typed records from header-aliased CSV files.

use std::path::Path;

use depot_map_zone_models::{AssignmentRecord, PostalRecord};

use crate::TabularError;
use crate::table::{CsvTable, TableRow};

/// Header aliases for the area identifier of an assignment snapshot.
pub const AREA_ID_HEADERS: &[&str] = &["area_id", "area_code", "id", "code", "N03_007"];
/// Header aliases for the area name of an assignment snapshot.
pub const AREA_NAME_HEADERS: &[&str] = &[
    "area_name",
    "municipality",
    "name",
    "名称",
    "市区",
    "市区町村",
];
/// Header aliases for a depot label.
pub const DEPOT_HEADERS: &[&str] = &["depot_code", "depot", "管轄デポ", "担当デポ"];

/// Header aliases for a postal code.
pub const ZIP_HEADERS: &[&str] = &["郵便番号", "zip_code", "zipcode", "zip", "postal_code"];
/// Header aliases for the city of a postal row.
pub const CITY_HEADERS: &[&str] = &["市区", "city", "municipality"];
/// Header aliases for the town of a postal row.
pub const TOWN_HEADERS: &[&str] = &["町", "town", "S_NAME"];
/// Header aliases for the service-area label of a postal row.
pub const AREA_LABEL_HEADERS: &[&str] = &["対応エリア", "area_name", "municipality"];
/// Header aliases for the depot of a postal row; stated-depot columns
/// come first.
pub const POSTAL_DEPOT_HEADERS: &[&str] = &["管轄デポ", "担当デポ", "depot_code", "depot"];

impl From<TableRow<'_>> for AssignmentRecord {
    fn from(row: TableRow<'_>) -> Self {
        Self {
            area_id: row.pick(AREA_ID_HEADERS).to_string(),
            area_name: row.pick(AREA_NAME_HEADERS).to_string(),
            depot_label: row.pick(DEPOT_HEADERS).to_string(),
        }
    }
}

impl From<TableRow<'_>> for PostalRecord {
    fn from(row: TableRow<'_>) -> Self {
        Self {
            zip_code: row.pick(ZIP_HEADERS).to_string(),
            city: row.pick(CITY_HEADERS).to_string(),
            town: row.pick(TOWN_HEADERS).to_string(),
            area_label: row.pick(AREA_LABEL_HEADERS).to_string(),
            depot_label: row.pick(POSTAL_DEPOT_HEADERS).to_string(),
        }
    }
}

/// Loads an area assignment snapshot file.
///
/// # Errors
///
/// Returns an error if the file cannot be read as CSV.
pub fn load_assignment_records(path: &Path) -> Result<Vec<AssignmentRecord>, TabularError> {
    let table = CsvTable::read(path)?;
    let records: Vec<AssignmentRecord> = table.rows().map(AssignmentRecord::from).collect();
    log::info!(
        "Loaded {} assignment row(s) from {}",
        records.len(),
        path.display()
    );
    Ok(records)
}

/// Loads a postal-code assignment file.
///
/// # Errors
///
/// Returns an error if the file cannot be read as CSV.
pub fn load_postal_records(path: &Path) -> Result<Vec<PostalRecord>, TabularError> {
    let table = CsvTable::read(path)?;
    let records: Vec<PostalRecord> = table.rows().map(PostalRecord::from).collect();
    log::info!(
        "Loaded {} postal row(s) from {}",
        records.len(),
        path.display()
    );
    Ok(records)
}
