//! Source layering configuration.
//!
//! The default layering is embedded at compile time from `layers.toml`;
//! a file given on the command line replaces it entirely.

use std::path::Path;

use depot_map_zone_models::layers::LayerConfig;

use crate::GeometryError;

const EMBEDDED_LAYERS: &str = include_str!("../layers.toml");

/// Loads the layering from `path`, or the embedded default when `None`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a valid layer
/// configuration.
pub fn load_layers(path: Option<&Path>) -> Result<LayerConfig, GeometryError> {
    let Some(path) = path else {
        return parse_layers(EMBEDDED_LAYERS, "<embedded>");
    };

    let text = std::fs::read_to_string(path).map_err(|e| GeometryError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    let layers = parse_layers(&text, &path.display().to_string())?;
    log::info!("Using layer configuration from {}", path.display());
    Ok(layers)
}

fn parse_layers(text: &str, label: &str) -> Result<LayerConfig, GeometryError> {
    toml::de::from_str(text).map_err(|e| GeometryError::Config {
        path: label.to_string(),
        source: e,
    })
}
