//! Unwrapping of e-Stat KMZ downloads.
//!
//! e-Stat distributes boundary data as a ZIP whose first entry is a KMZ
//! (itself a ZIP) holding the KML document.

use std::io::{Cursor, Read};
use std::path::Path;

use crate::GeometryError;

/// Reads the KML document out of a wrapped KMZ archive.
///
/// The first entry of the outer ZIP is opened as a KMZ and its first
/// `.kml` member (case-insensitive) is returned. Invalid UTF-8 is
/// replaced rather than rejected.
///
/// # Errors
///
/// Returns an error if either archive is unreadable, the outer archive
/// is empty, or the KMZ has no `.kml` member.
pub fn read_wrapped_kml(path: &Path) -> Result<String, GeometryError> {
    let label = path.display().to_string();
    let io_error = |e: std::io::Error| GeometryError::Io {
        path: label.clone(),
        source: e,
    };
    let zip_error = |e: zip::result::ZipError| GeometryError::Zip {
        path: label.clone(),
        source: e,
    };

    let file = std::fs::File::open(path).map_err(io_error)?;
    let mut outer = zip::ZipArchive::new(file).map_err(zip_error)?;
    if outer.is_empty() {
        return Err(GeometryError::EmptyArchive(label));
    }

    let mut kmz_bytes = Vec::new();
    {
        let mut entry = outer.by_index(0).map_err(zip_error)?;
        log::debug!("Opening inner KMZ {} from {label}", entry.name());
        entry.read_to_end(&mut kmz_bytes).map_err(io_error)?;
    }

    let mut kmz = zip::ZipArchive::new(Cursor::new(kmz_bytes)).map_err(zip_error)?;
    for i in 0..kmz.len() {
        let mut entry = kmz.by_index(i).map_err(zip_error)?;
        if !entry.name().to_ascii_lowercase().ends_with(".kml") {
            continue;
        }
        let mut kml = Vec::new();
        entry.read_to_end(&mut kml).map_err(io_error)?;
        log::info!(
            "Read {} ({} bytes) from {label}",
            entry.name(),
            kml.len()
        );
        return Ok(String::from_utf8_lossy(&kml).into_owned());
    }

    Err(GeometryError::MissingKml(label))
}
