#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CSV input and output.
//!
//! Input files come from spreadsheets and map exports with inconsistent
//! headers, so every field is looked up through a list of header aliases
//! (case-insensitive, BOM-tolerant). Rows are converted to typed records
//! here; nothing downstream sees raw CSV.

pub mod records;
pub mod table;
pub mod write;

pub use records::{load_assignment_records, load_postal_records};
pub use table::{CsvTable, TableRow, normalize_header};
pub use write::{AREA_CHANGE_COLUMNS, ZIP_REASSIGNMENT_COLUMNS, write_csv};

/// Errors from reading or writing CSV files.
#[derive(Debug, thiserror::Error)]
pub enum TabularError {
    /// The file could not be parsed as CSV.
    #[error("CSV error in {path}: {source}")]
    Csv {
        /// Path to the CSV file.
        path: String,
        /// Underlying CSV error.
        source: csv::Error,
    },

    /// I/O error opening or creating a file.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path that caused the error.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}
