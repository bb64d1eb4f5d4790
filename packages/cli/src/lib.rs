#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Batch pipelines behind the `depot_map` binary.
//!
//! - [`zip_changes`]: turns an edited area assignment export into
//!   postal-code-level reassignment reports.
//! - [`fine_polygons`]: builds the town-level zone map with the current
//!   depot of every unit.

pub mod fine_polygons;
pub mod zip_changes;

use depot_map_geometry::GeometryError;
use depot_map_tabular::TabularError;

/// Errors that abort a pipeline run.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Reading an input CSV or writing a report failed.
    #[error(transparent)]
    Tabular(#[from] TabularError),

    /// Reading polygon sources or writing the zone map failed.
    #[error(transparent)]
    Geometry(#[from] GeometryError),
}
