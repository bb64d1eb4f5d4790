#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Depot, area assignment, and match status types.
//!
//! These types are shared by the normalizer, the resolution engine, and
//! the file adapters. This crate has no I/O and no normalization logic;
//! raw records coming from files carry their labels verbatim and are
//! canonicalized downstream.

pub mod layers;

use std::collections::BTreeSet;
use std::fmt;

use serde::{Serialize, Serializer};
use strum_macros::{AsRefStr, Display, EnumString};

/// One of the three fulfillment depots.
///
/// Variants are declared in code order so the derived [`Ord`] sorts
/// depots the same way their codes sort as strings.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum Depot {
    /// Fujisawa depot.
    Fuj,
    /// Sagamihara depot.
    Sgm,
    /// Yokohama-Kohoku depot.
    Yok,
}

impl Depot {
    /// Every depot, in code order.
    pub const ALL: [Self; 3] = [Self::Fuj, Self::Sgm, Self::Yok];

    /// Three-letter depot code (e.g. `"SGM"`).
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Fuj => "FUJ",
            Self::Sgm => "SGM",
            Self::Yok => "YOK",
        }
    }

    /// Canonical display name used in every output file.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Fuj => "藤沢デポ FUJ",
            Self::Sgm => "相模原デポ SGM",
            Self::Yok => "横浜港北デポ YOK",
        }
    }

    /// Place-name fragment that identifies this depot inside a free-text
    /// label. No fragment is a substring of another depot's fragment.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Fuj => "藤沢",
            Self::Sgm => "相模原",
            Self::Yok => "横浜港北",
        }
    }
}

/// Code of an optional depot, or `""` when unassigned.
#[must_use]
pub const fn depot_code(depot: Option<Depot>) -> &'static str {
    match depot {
        Some(d) => d.code(),
        None => "",
    }
}

/// Display name of an optional depot, or `""` when unassigned.
#[must_use]
pub const fn depot_name(depot: Option<Depot>) -> &'static str {
    match depot {
        Some(d) => d.display_name(),
        None => "",
    }
}

/// Serializes an optional depot as its code, writing `""` for `None`.
///
/// # Errors
///
/// Propagates the serializer's error.
#[allow(clippy::ref_option, clippy::trivially_copy_pass_by_ref)]
pub fn serialize_depot_code<S: Serializer>(
    depot: &Option<Depot>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(depot_code(*depot))
}

/// Serializes a boolean as the `"1"`/`"0"` flag used by the CSV outputs.
///
/// # Errors
///
/// Propagates the serializer's error.
#[allow(clippy::trivially_copy_pass_by_ref)]
pub fn serialize_flag<S: Serializer>(flag: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(if *flag { "1" } else { "0" })
}

/// Why a depot was (or was not) resolved for a record or geographic unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MatchStatus {
    /// Postal row matched exactly one area.
    Ok,
    /// Postal row matched no area.
    NoMatch,
    /// Postal row matched more than one area; no depot is guessed.
    Ambiguous,
    /// Town-level evidence names a single depot.
    TownMatch,
    /// Town-level evidence names two or more depots.
    TownConflict(BTreeSet<Depot>),
    /// No town evidence; the municipality has a single depot.
    MuniFallback,
    /// No town evidence; the municipality spans two or more depots.
    MuniConflict(BTreeSet<Depot>),
    /// No evidence at any level.
    NoData,
    /// Coarse municipality polygon used because no town polygons exist.
    N03Fallback,
}

impl MatchStatus {
    /// Status label without any conflict payload (e.g. `"TOWN_CONFLICT"`).
    #[must_use]
    pub const fn family(&self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::NoMatch => "NO_MATCH",
            Self::Ambiguous => "AMBIGUOUS",
            Self::TownMatch => "TOWN_MATCH",
            Self::TownConflict(_) => "TOWN_CONFLICT",
            Self::MuniFallback => "MUNI_FALLBACK",
            Self::MuniConflict(_) => "MUNI_CONFLICT",
            Self::NoData => "NO_DATA",
            Self::N03Fallback => "N03_FALLBACK",
        }
    }

    /// Whether this status flags contradictory evidence for manual review.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::Ambiguous | Self::TownConflict(_) | Self::MuniConflict(_)
        )
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.family())?;
        if let Self::TownConflict(depots) | Self::MuniConflict(depots) = self {
            let codes: Vec<&str> = depots.iter().map(|d| d.code()).collect();
            write!(f, ":{}", codes.join("/"))?;
        }
        Ok(())
    }
}

impl Serialize for MatchStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Depot assignment of one administrative area in a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AreaAssignment {
    /// Stable area identifier (e.g. the N03 administrative code).
    pub area_id: String,
    /// Display name of the area.
    pub area_name: String,
    /// Assigned depot, `None` when unassigned.
    pub depot: Option<Depot>,
}

/// An area assignment row as read from a snapshot file, before the depot
/// label has been normalized.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignmentRecord {
    /// Raw area identifier.
    pub area_id: String,
    /// Raw area name.
    pub area_name: String,
    /// Raw depot label (code, display name, or free text).
    pub depot_label: String,
}

/// A postal-code-level row as read from the current assignment file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostalRecord {
    /// Raw postal code (any punctuation).
    pub zip_code: String,
    /// Raw city/ward name.
    pub city: String,
    /// Raw town name.
    pub town: String,
    /// Raw service-area label.
    pub area_label: String,
    /// Raw depot label.
    pub depot_label: String,
}

/// A fine-grained geographic unit decoded from a polygon source.
#[derive(Debug, Clone, PartialEq)]
pub struct TownArea {
    /// Source-prefixed identifier (e.g. `"KA14-141090010"`).
    pub area_id: String,
    /// Prefecture name.
    pub pref_name: String,
    /// Canonical municipality name.
    pub municipality: String,
    /// Town name in its display form.
    pub town_name: String,
    /// Raw registry code the identifier was derived from.
    pub source_code: String,
    /// Polygon ring groups; every ring is closed.
    pub polygons: Vec<geojson::PolygonType>,
}

impl TownArea {
    /// Geometry for this unit: a `Polygon` when there is exactly one ring
    /// group, a `MultiPolygon` otherwise. `None` when there are no rings.
    #[must_use]
    pub fn geometry(&self) -> Option<geojson::Geometry> {
        match self.polygons.as_slice() {
            [] => None,
            [single] => Some(geojson::Geometry::new(geojson::Value::Polygon(
                single.clone(),
            ))),
            many => Some(geojson::Geometry::new(geojson::Value::MultiPolygon(
                many.to_vec(),
            ))),
        }
    }
}

/// One line of the area-level change list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AreaChangeRow {
    /// Area identifier.
    pub area_id: String,
    /// Area name (updated name, else baseline name, else the id).
    pub area_name: String,
    /// Depot before the edit.
    #[serde(serialize_with = "serialize_depot_code")]
    pub before_depot_code: Option<Depot>,
    /// Display name of the depot before the edit.
    pub before_depot_name: &'static str,
    /// Depot after the edit.
    #[serde(serialize_with = "serialize_depot_code")]
    pub after_depot_code: Option<Depot>,
    /// Display name of the depot after the edit.
    pub after_depot_name: &'static str,
}

/// One postal row with its before/after depot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ZipReassignmentRow {
    /// Normalized 7-digit postal code, or `""`.
    pub zip_code: String,
    /// City as given in the input row.
    pub city: String,
    /// Town as given in the input row.
    pub town: String,
    /// Service-area label as given in the input row.
    pub area_label: String,
    /// Uniquely matched area, or `""`.
    pub area_id: String,
    /// Name of the matched area, or `""`.
    pub area_name: String,
    /// `OK`, `NO_MATCH`, or `AMBIGUOUS`.
    pub match_status: MatchStatus,
    /// Depot stated by the row itself.
    #[serde(serialize_with = "serialize_depot_code")]
    pub before_depot_code: Option<Depot>,
    /// Display name of the stated depot.
    pub before_depot_name: &'static str,
    /// Depot after applying the area-level changes.
    #[serde(serialize_with = "serialize_depot_code")]
    pub after_depot_code: Option<Depot>,
    /// Display name of the resulting depot.
    pub after_depot_name: &'static str,
    /// Whether the depot differs before and after.
    #[serde(serialize_with = "serialize_flag")]
    pub changed: bool,
}

/// Properties attached to every emitted map feature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ZoneProperties {
    /// Source-prefixed unit identifier.
    pub area_id: String,
    /// Municipality and town concatenated for display.
    pub area_name: String,
    /// Canonical municipality.
    pub municipality: String,
    /// Town name, empty for municipality-level units.
    pub town_name: String,
    /// Prefecture name.
    pub pref_name: String,
    /// Raw registry code.
    pub town_code: String,
    /// Tag of the source that supplied the geometry.
    pub source: String,
    /// Resolved depot.
    #[serde(serialize_with = "serialize_depot_code")]
    pub depot_code: Option<Depot>,
    /// Display name of the resolved depot.
    pub depot_name: &'static str,
    /// How the depot was resolved.
    pub assign_status: MatchStatus,
}

/// A geographic unit ready for serialization.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneFeature {
    /// Feature properties.
    pub properties: ZoneProperties,
    /// Geometry carried through from the source unchanged.
    pub geometry: Option<geojson::Geometry>,
}
