//! Zone map serialization and run statistics.

use std::collections::BTreeMap;
use std::fmt;
use std::io::{BufWriter, Write};
use std::path::Path;

use depot_map_zone_models::{Depot, ZoneFeature};

use crate::GeometryError;

/// Converts zone features to a `GeoJSON` `FeatureCollection`.
///
/// # Errors
///
/// Returns an error if a feature's properties fail to serialize.
pub fn to_feature_collection(
    features: &[ZoneFeature],
) -> Result<geojson::FeatureCollection, serde_json::Error> {
    let features = features
        .iter()
        .map(|feature| {
            let properties = match serde_json::to_value(&feature.properties)? {
                serde_json::Value::Object(map) => Some(map),
                _ => None,
            };
            Ok::<_, serde_json::Error>(geojson::Feature {
                bbox: None,
                geometry: feature.geometry.clone(),
                id: None,
                properties,
                foreign_members: None,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(geojson::FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    })
}

/// Writes `features` as a `GeoJSON` `FeatureCollection`, creating parent
/// directories as needed. Non-ASCII text is written as UTF-8.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_feature_collection(
    path: &Path,
    features: &[ZoneFeature],
) -> Result<(), GeometryError> {
    let label = path.display().to_string();
    let io_error = |e: std::io::Error| GeometryError::Io {
        path: label.clone(),
        source: e,
    };
    let json_error = |e: serde_json::Error| GeometryError::Json {
        path: label.clone(),
        source: e,
    };

    let collection = to_feature_collection(features).map_err(json_error)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_error)?;
    }
    let file = std::fs::File::create(path).map_err(io_error)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, &collection).map_err(json_error)?;
    writer.flush().map_err(io_error)?;

    log::info!("Wrote {} features to {label}", features.len());
    Ok(())
}

/// Depot coverage of a zone map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ZoneSummary {
    /// Number of features.
    pub total: usize,
    /// Features with a depot.
    pub assigned: usize,
    /// Features per depot; every depot is present.
    pub per_depot: BTreeMap<Depot, usize>,
    /// Features without a depot.
    pub unassigned: usize,
}

impl ZoneSummary {
    /// Counts depot coverage over `features`.
    #[must_use]
    pub fn from_features(features: &[ZoneFeature]) -> Self {
        let mut summary = Self {
            total: features.len(),
            per_depot: Depot::ALL.into_iter().map(|d| (d, 0)).collect(),
            ..Self::default()
        };
        for feature in features {
            match feature.properties.depot_code {
                Some(depot) => {
                    summary.assigned += 1;
                    *summary.per_depot.entry(depot).or_default() += 1;
                }
                None => summary.unassigned += 1,
            }
        }
        summary
    }
}

impl fmt::Display for ZoneSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let per_depot: Vec<String> = self
            .per_depot
            .iter()
            .map(|(depot, count)| format!("{depot}={count}"))
            .collect();
        write!(
            f,
            "features: {}, assigned: {} ({}), unassigned: {}",
            self.total,
            self.assigned,
            per_depot.join(", "),
            self.unassigned
        )
    }
}

/// Feature counts per status family (`TOWN_MATCH`, `MUNI_CONFLICT`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusTally {
    counts: BTreeMap<&'static str, usize>,
}

impl StatusTally {
    /// Tallies the status family of every feature.
    #[must_use]
    pub fn from_features(features: &[ZoneFeature]) -> Self {
        let mut counts = BTreeMap::new();
        for feature in features {
            *counts
                .entry(feature.properties.assign_status.family())
                .or_default() += 1;
        }
        Self { counts }
    }

    /// Count for one family, zero when absent.
    #[must_use]
    pub fn get(&self, family: &str) -> usize {
        self.counts.get(family).copied().unwrap_or(0)
    }

    /// Families and counts in label order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, usize)> + '_ {
        self.counts.iter().map(|(family, count)| (*family, *count))
    }
}
