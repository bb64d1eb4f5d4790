#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Zone map assembly.
//!
//! Decodes town and municipality polygons from e-Stat KMZ archives and
//! `GeoJSON` files, attaches a depot to every unit through the
//! [`TieredResolver`](depot_map_resolve::TieredResolver), and merges the
//! ranked sources into one `GeoJSON` `FeatureCollection`. Geometry is
//! carried through as decoded; nothing here computes on it.

pub mod config;
pub mod kml;
pub mod kmz;
pub mod merge;
pub mod output;
pub mod sources;

pub use config::load_layers;
pub use merge::{MergedZones, SourceReport, merge_sources};
pub use output::{StatusTally, ZoneSummary, write_feature_collection};
pub use sources::{
    Activation, GeojsonTownSource, KmzTownSource, MunicipalityFallbackSource, SourceInputs,
    ZoneSource, layered_sources,
};

/// Errors from reading polygon sources or writing the zone map.
#[derive(Debug, thiserror::Error)]
pub enum GeometryError {
    /// I/O error reading or writing a file.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path that caused the error.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The file is not a readable ZIP archive.
    #[error("ZIP error in {path}: {source}")]
    Zip {
        /// Path to the archive.
        path: String,
        /// Underlying ZIP error.
        source: zip::result::ZipError,
    },

    /// The KML document is malformed.
    #[error("KML error in {path}: {source}")]
    Xml {
        /// Path to the archive holding the KML.
        path: String,
        /// Underlying XML error.
        source: quick_xml::Error,
    },

    /// A `GeoJSON` file could not be parsed or the output could not be
    /// serialized.
    #[error("JSON error in {path}: {source}")]
    Json {
        /// Path to the `GeoJSON` file.
        path: String,
        /// Underlying JSON error.
        source: serde_json::Error,
    },

    /// The outer ZIP archive has no entries.
    #[error("No entries found in {0}")]
    EmptyArchive(String),

    /// The inner KMZ has no `.kml` member.
    #[error("No KML found in inner KMZ of {0}")]
    MissingKml(String),

    /// The layer configuration is malformed.
    #[error("Invalid layer configuration in {path}: {source}")]
    Config {
        /// Path of the configuration, or `<embedded>`.
        path: String,
        /// Underlying TOML error.
        source: toml::de::Error,
    },
}
