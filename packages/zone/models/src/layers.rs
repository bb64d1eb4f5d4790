//! Schema for the polygon source layering configuration.
//!
//! The layering decides which polygon source is authoritative for which
//! municipality and what identifiers and tags its features carry. It is
//! deserialized from TOML.

use serde::{Deserialize, Serialize};

/// Complete polygon layering configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerConfig {
    /// Canonical name of the city served by the secondary layer instead of
    /// the primary one (e.g. `"町田市"`).
    pub designated_city: String,
    /// Fine town/chome polygons for every other municipality.
    pub primary: TownLayer,
    /// Town polygons for the designated city.
    pub secondary: TownLayer,
    /// Coarse municipality polygons used when the secondary layer is empty.
    pub fallback: FallbackLayer,
}

/// A layer that supplies town-level polygons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TownLayer {
    /// Unique layer identifier, referenced by fallback layers.
    pub id: String,
    /// Prefix joined to the registry code with `-` to form `area_id`.
    pub id_prefix: String,
    /// Value written to the `source` property.
    pub source_tag: String,
    /// Prefecture name used when a feature does not carry one.
    pub default_pref_name: String,
}

/// A layer that supplies municipality-level polygons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackLayer {
    /// Unique layer identifier.
    pub id: String,
    /// Prefix joined to the administrative code with `-` to form `area_id`.
    pub id_prefix: String,
    /// Value written to the `source` property.
    pub source_tag: String,
    /// Administrative codes whose polygons are emitted.
    pub area_codes: Vec<String>,
}
