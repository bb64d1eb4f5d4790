//! Header-aliased CSV tables.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use crate::TabularError;

/// Normalizes a header for alias matching: strips any byte-order mark,
/// trims, and lowercases.
#[must_use]
pub fn normalize_header(value: &str) -> String {
    value.replace('\u{feff}', "").trim().to_lowercase()
}

/// A fully-read CSV file with normalized headers.
#[derive(Debug, Clone, Default)]
pub struct CsvTable {
    columns: BTreeMap<String, usize>,
    records: Vec<csv::StringRecord>,
}

impl CsvTable {
    /// Reads a CSV file from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or is not valid
    /// UTF-8 CSV.
    pub fn read(path: &Path) -> Result<Self, TabularError> {
        let file = std::fs::File::open(path).map_err(|e| TabularError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        let table = Self::from_reader(file, &path.display().to_string())?;
        log::debug!("Read {} row(s) from {}", table.len(), path.display());
        Ok(table)
    }

    /// Reads CSV from any reader. `label` names the source in errors.
    ///
    /// Rows may be shorter or longer than the header; missing fields read
    /// as empty strings.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not valid UTF-8 CSV.
    pub fn from_reader(reader: impl Read, label: &str) -> Result<Self, TabularError> {
        let csv_error = |e: csv::Error| TabularError::Csv {
            path: label.to_string(),
            source: e,
        };

        let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

        // Later duplicates of a header shadow earlier ones.
        let columns = reader
            .headers()
            .map_err(csv_error)?
            .iter()
            .enumerate()
            .map(|(i, header)| (normalize_header(header), i))
            .collect();

        let records = reader
            .records()
            .collect::<Result<Vec<_>, _>>()
            .map_err(csv_error)?;

        Ok(Self { columns, records })
    }

    /// Number of data rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table has no data rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterates data rows in file order.
    pub fn rows(&self) -> impl Iterator<Item = TableRow<'_>> {
        self.records.iter().map(|record| TableRow {
            columns: &self.columns,
            record,
        })
    }
}

/// One data row of a [`CsvTable`].
#[derive(Debug, Clone, Copy)]
pub struct TableRow<'a> {
    columns: &'a BTreeMap<String, usize>,
    record: &'a csv::StringRecord,
}

impl<'a> TableRow<'a> {
    /// Trimmed value of the first alias present in the header, or `""`.
    ///
    /// Only header presence decides which alias is used: a present but
    /// empty column does not fall through to later aliases.
    #[must_use]
    pub fn pick(&self, aliases: &[&str]) -> &'a str {
        aliases
            .iter()
            .find_map(|alias| self.columns.get(&normalize_header(alias)))
            .and_then(|&i| self.record.get(i))
            .map_or("", str::trim)
    }
}
