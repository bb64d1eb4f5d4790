//! Polygon source providers.
//!
//! Each provider decodes one input file into [`ZoneFeature`]s with a depot
//! attached. Providers are consulted in a fixed order by
//! [`merge_sources`](crate::merge_sources); a provider's
//! [`Activation`] decides whether it runs at all.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use depot_map_normalize::canonical_municipality;
use depot_map_resolve::{ResolvedDepot, TieredResolver};
use depot_map_zone_models::layers::{FallbackLayer, LayerConfig, TownLayer};
use depot_map_zone_models::{
    MatchStatus, TownArea, ZoneFeature, ZoneProperties, depot_name,
};
use serde_json::Value;

use crate::GeometryError;
use crate::kml::{Placemark, parse_placemarks};
use crate::kmz::read_wrapped_kml;

/// Property aliases for the municipality of a town feature.
pub const TOWN_MUNICIPALITY_PROPERTIES: &[&str] = &["municipality", "area_name", "N03_004"];
/// Property aliases for the town name of a town feature.
pub const TOWN_NAME_PROPERTIES: &[&str] = &["town_name", "S_NAME", "name"];
/// Property aliases for the identifier of a town feature.
pub const TOWN_ID_PROPERTIES: &[&str] = &["area_id", "town_code", "code"];

/// Property aliases for the administrative code of a municipality feature.
pub const MUNICIPALITY_ID_PROPERTIES: &[&str] = &["area_id", "N03_007"];
/// Property aliases for the name of a municipality feature.
pub const MUNICIPALITY_NAME_PROPERTIES: &[&str] = &["area_name", "municipality", "N03_004"];
/// Property aliases for the prefecture of a municipality feature.
pub const PREFECTURE_PROPERTIES: &[&str] = &["pref_name", "N03_001"];

/// When a source is consulted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activation {
    /// Always consulted.
    Always,
    /// Consulted only when the named earlier source produced no features.
    WhenEmpty(String),
}

/// A ranked provider of depot-assigned polygons.
pub trait ZoneSource {
    /// Unique identifier, referenced by [`Activation::WhenEmpty`].
    fn id(&self) -> &str;

    /// When this source is consulted.
    fn activation(&self) -> Activation {
        Activation::Always
    }

    /// Decodes the source and resolves a depot for every unit.
    ///
    /// # Errors
    ///
    /// Returns an error if a required input is missing or unreadable.
    fn load(&self, resolver: &TieredResolver) -> Result<Vec<ZoneFeature>, GeometryError>;
}

/// Input files of the standard layering.
#[derive(Debug, Clone)]
pub struct SourceInputs {
    /// Wrapped e-Stat KMZ archive (required).
    pub kmz: PathBuf,
    /// Town-level `GeoJSON` for the designated city (optional).
    pub town_geojson: PathBuf,
    /// Municipality-level N03 `GeoJSON` (optional).
    pub fallback_geojson: PathBuf,
}

/// Builds the standard three-layer source list.
///
/// The primary layer covers every baseline municipality except the
/// designated city, which the secondary layer covers instead. The
/// fallback layer runs only when the secondary produced nothing.
#[must_use]
pub fn layered_sources(
    config: &LayerConfig,
    inputs: &SourceInputs,
    resolver: &TieredResolver,
) -> Vec<Box<dyn ZoneSource>> {
    let designated = canonical_municipality(&config.designated_city);
    let primary_munis: BTreeSet<String> = resolver
        .municipalities()
        .filter(|muni| *muni != designated)
        .map(str::to_string)
        .collect();

    vec![
        Box::new(KmzTownSource {
            layer: config.primary.clone(),
            path: inputs.kmz.clone(),
            municipalities: primary_munis,
        }),
        Box::new(GeojsonTownSource {
            layer: config.secondary.clone(),
            path: inputs.town_geojson.clone(),
            municipalities: BTreeSet::from([designated]),
        }),
        Box::new(MunicipalityFallbackSource {
            layer: config.fallback.clone(),
            path: inputs.fallback_geojson.clone(),
            when_empty: config.secondary.id.clone(),
        }),
    ]
}

fn zone_feature(
    area: &TownArea,
    source_tag: &str,
    resolved: ResolvedDepot,
    geometry: Option<geojson::Geometry>,
) -> ZoneFeature {
    ZoneFeature {
        properties: ZoneProperties {
            area_id: area.area_id.clone(),
            area_name: format!("{}{}", area.municipality, area.town_name),
            municipality: area.municipality.clone(),
            town_name: area.town_name.clone(),
            pref_name: area.pref_name.clone(),
            town_code: area.source_code.clone(),
            source: source_tag.to_string(),
            depot_code: resolved.depot,
            depot_name: depot_name(resolved.depot),
            assign_status: resolved.status,
        },
        geometry,
    }
}

/// Town polygons from a wrapped e-Stat KMZ archive. A missing or corrupt
/// archive is an error.
#[derive(Debug, Clone)]
pub struct KmzTownSource {
    /// Identifiers, tags, and defaults of this layer.
    pub layer: TownLayer,
    /// Path to the outer ZIP.
    pub path: PathBuf,
    /// Canonical municipalities to keep.
    pub municipalities: BTreeSet<String>,
}

impl KmzTownSource {
    /// Groups placemarks into town areas keyed by `area_id`.
    ///
    /// Placemarks outside the target municipalities, without a town name
    /// or registry code, or without any valid polygon are skipped.
    /// Fragments sharing an identifier are merged into one area.
    #[must_use]
    pub fn collect_town_areas(&self, placemarks: &[Placemark]) -> BTreeMap<String, TownArea> {
        let mut areas: BTreeMap<String, TownArea> = BTreeMap::new();

        for placemark in placemarks {
            let municipality = canonical_municipality(placemark.attribute("CITY_NAME"));
            if !self.municipalities.contains(&municipality) {
                continue;
            }
            let town_name = placemark.attribute("S_NAME");
            let code = placemark.attribute("KEYCODE1");
            if town_name.is_empty() || code.is_empty() || placemark.polygons.is_empty() {
                continue;
            }

            let area_id = format!("{}-{code}", self.layer.id_prefix);
            areas
                .entry(area_id.clone())
                .or_insert_with(|| {
                    let pref_name = match placemark.attribute("PREF_NAME") {
                        "" => self.layer.default_pref_name.clone(),
                        name => name.to_string(),
                    };
                    TownArea {
                        area_id,
                        pref_name,
                        municipality,
                        town_name: town_name.to_string(),
                        source_code: code.to_string(),
                        polygons: Vec::new(),
                    }
                })
                .polygons
                .extend(placemark.polygons.iter().cloned());
        }

        areas
    }
}

impl ZoneSource for KmzTownSource {
    fn id(&self) -> &str {
        &self.layer.id
    }

    fn load(&self, resolver: &TieredResolver) -> Result<Vec<ZoneFeature>, GeometryError> {
        let kml = read_wrapped_kml(&self.path)?;
        let placemarks = parse_placemarks(&kml).map_err(|e| GeometryError::Xml {
            path: self.path.display().to_string(),
            source: e,
        })?;
        let areas = self.collect_town_areas(&placemarks);
        log::info!(
            "{}: {} town areas from {} placemarks",
            self.layer.id,
            areas.len(),
            placemarks.len()
        );

        Ok(areas
            .into_values()
            .map(|area| {
                let resolved = resolver.resolve(&area.municipality, &area.town_name);
                let geometry = area.geometry();
                zone_feature(&area, &self.layer.source_tag, resolved, geometry)
            })
            .collect())
    }
}

/// Town polygons from a `GeoJSON` file. A missing file yields no
/// features.
#[derive(Debug, Clone)]
pub struct GeojsonTownSource {
    /// Identifiers, tags, and defaults of this layer.
    pub layer: TownLayer,
    /// Path to the `GeoJSON` file.
    pub path: PathBuf,
    /// Canonical municipalities to keep.
    pub municipalities: BTreeSet<String>,
}

impl ZoneSource for GeojsonTownSource {
    fn id(&self) -> &str {
        &self.layer.id
    }

    fn load(&self, resolver: &TieredResolver) -> Result<Vec<ZoneFeature>, GeometryError> {
        let Some(collection) = read_optional_collection(&self.path)? else {
            return Ok(Vec::new());
        };

        let mut out = Vec::new();
        for feature in collection.features {
            let municipality =
                canonical_municipality(&property(&feature, TOWN_MUNICIPALITY_PROPERTIES));
            if !self.municipalities.contains(&municipality) {
                continue;
            }
            let town_name = property(&feature, TOWN_NAME_PROPERTIES);
            let code = match property(&feature, TOWN_ID_PROPERTIES) {
                id if id.is_empty() => format!("{:05}", out.len() + 1),
                id => match id.strip_prefix(&format!("{}-", self.layer.id_prefix)) {
                    Some(code) => code.to_string(),
                    None => id,
                },
            };

            let area = TownArea {
                area_id: format!("{}-{code}", self.layer.id_prefix),
                pref_name: self.layer.default_pref_name.clone(),
                municipality,
                town_name,
                source_code: code,
                polygons: Vec::new(),
            };
            let resolved = resolver.resolve(&area.municipality, &area.town_name);
            out.push(zone_feature(
                &area,
                &self.layer.source_tag,
                resolved,
                feature.geometry,
            ));
        }

        log::info!("{}: {} town features", self.layer.id, out.len());
        Ok(out)
    }
}

/// Municipality polygons from an N03 `GeoJSON` file, restricted to the
/// configured administrative codes. A missing file yields no features.
#[derive(Debug, Clone)]
pub struct MunicipalityFallbackSource {
    /// Identifiers, tags, and codes of this layer.
    pub layer: FallbackLayer,
    /// Path to the `GeoJSON` file.
    pub path: PathBuf,
    /// Source whose empty output activates this one.
    pub when_empty: String,
}

impl ZoneSource for MunicipalityFallbackSource {
    fn id(&self) -> &str {
        &self.layer.id
    }

    fn activation(&self) -> Activation {
        Activation::WhenEmpty(self.when_empty.clone())
    }

    fn load(&self, resolver: &TieredResolver) -> Result<Vec<ZoneFeature>, GeometryError> {
        let Some(collection) = read_optional_collection(&self.path)? else {
            return Ok(Vec::new());
        };

        let mut out = Vec::new();
        for feature in collection.features {
            let code = property(&feature, MUNICIPALITY_ID_PROPERTIES);
            if !self.layer.area_codes.contains(&code) {
                continue;
            }
            let municipality =
                match canonical_municipality(&property(&feature, MUNICIPALITY_NAME_PROPERTIES)) {
                    muni if muni.is_empty() => code.clone(),
                    muni => muni,
                };
            let depot = resolver.single_depot(&municipality);

            let area = TownArea {
                area_id: format!("{}-{code}", self.layer.id_prefix),
                pref_name: property(&feature, PREFECTURE_PROPERTIES),
                municipality,
                town_name: String::new(),
                source_code: code,
                polygons: Vec::new(),
            };
            let resolved = ResolvedDepot {
                depot,
                status: MatchStatus::N03Fallback,
            };
            out.push(zone_feature(
                &area,
                &self.layer.source_tag,
                resolved,
                feature.geometry,
            ));
        }

        log::info!("{}: {} municipality features", self.layer.id, out.len());
        Ok(out)
    }
}

/// Reads a `GeoJSON` `FeatureCollection`, or `None` if the file does not
/// exist.
fn read_optional_collection(
    path: &Path,
) -> Result<Option<geojson::FeatureCollection>, GeometryError> {
    if !path.exists() {
        log::warn!("Optional polygon source {} not found; skipping", path.display());
        return Ok(None);
    }

    let file = std::fs::File::open(path).map_err(|e| GeometryError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    let collection = serde_json::from_reader(std::io::BufReader::new(file)).map_err(|e| {
        GeometryError::Json {
            path: path.display().to_string(),
            source: e,
        }
    })?;
    Ok(Some(collection))
}

/// Trimmed value of the first alias holding a non-empty string or a
/// number, or `""`.
fn property(feature: &geojson::Feature, aliases: &[&str]) -> String {
    let Some(properties) = feature.properties.as_ref() else {
        return String::new();
    };
    aliases
        .iter()
        .find_map(|alias| match properties.get(*alias)? {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_layers;
    use crate::kmz::tests::write_wrapped_kmz;
    use depot_map_zone_models::{AssignmentRecord, Depot, PostalRecord};

    const SQUARE: &str = "139.0,35.0 139.1,35.0 139.1,35.1 139.0,35.0";

    fn resolver() -> TieredResolver {
        let baseline = [
            AssignmentRecord {
                area_id: "14205".to_string(),
                area_name: "藤沢市".to_string(),
                depot_label: "FUJ".to_string(),
            },
            AssignmentRecord {
                area_id: "13209".to_string(),
                area_name: "町田市".to_string(),
                depot_label: "SGM".to_string(),
            },
        ];
        TieredResolver::from_baseline(&baseline).with_postal_records(&[PostalRecord {
            city: "藤沢市".to_string(),
            town: "辻堂".to_string(),
            depot_label: "YOK".to_string(),
            ..PostalRecord::default()
        }])
    }

    fn placemark(city: &str, town: &str, code: &str) -> String {
        format!(
            r#"<Placemark><ExtendedData><SchemaData>
<SimpleData name="CITY_NAME">{city}</SimpleData>
<SimpleData name="S_NAME">{town}</SimpleData>
<SimpleData name="KEYCODE1">{code}</SimpleData>
</SchemaData></ExtendedData>
<Polygon><outerBoundaryIs><LinearRing><coordinates>{SQUARE}</coordinates></LinearRing></outerBoundaryIs></Polygon>
</Placemark>"#
        )
    }

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(name);
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn kmz_source(path: PathBuf) -> KmzTownSource {
        KmzTownSource {
            layer: load_layers(None).unwrap().primary,
            path,
            municipalities: BTreeSet::from(["藤沢市".to_string()]),
        }
    }

    #[test]
    fn kmz_features_resolve_and_merge_fragments() {
        let dir = temp_dir("depot_map_geometry_sources_kmz_test");
        let path = dir.join("kanagawa.zip");
        let kml = format!(
            "<kml><Document>{}{}{}{}</Document></kml>",
            placemark("藤沢市", "辻堂1丁目", "142050010"),
            placemark("藤沢市", "辻堂1丁目", "142050010"),
            placemark("藤沢市", "鵠沼", "142050020"),
            placemark("町田市", "原町田", "132090010"),
        );
        write_wrapped_kmz(&path, &kml);

        let features = kmz_source(path).load(&resolver()).unwrap();
        assert_eq!(features.len(), 2);

        let first = &features[0].properties;
        assert_eq!(first.area_id, "KA14-142050010");
        assert_eq!(first.area_name, "藤沢市辻堂1丁目");
        assert_eq!(first.pref_name, "神奈川県");
        assert_eq!(first.source, "e-stat-r2ka14-kmz");
        assert_eq!(first.depot_code, Some(Depot::Yok));
        assert_eq!(first.assign_status, MatchStatus::TownMatch);
        assert!(matches!(
            features[0].geometry.as_ref().unwrap().value,
            geojson::Value::MultiPolygon(ref p) if p.len() == 2
        ));

        let second = &features[1].properties;
        assert_eq!(second.depot_name, "藤沢デポ FUJ");
        assert_eq!(second.assign_status, MatchStatus::MuniFallback);
        assert!(matches!(
            features[1].geometry.as_ref().unwrap().value,
            geojson::Value::Polygon(_)
        ));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_kmz_is_fatal() {
        let path = std::env::temp_dir().join("depot_map_geometry_sources_absent.zip");
        let _ = std::fs::remove_file(&path);
        assert!(kmz_source(path).load(&resolver()).is_err());
    }

    #[test]
    fn skips_placemarks_without_code_or_polygon() {
        let source = kmz_source(PathBuf::new());
        let mut no_polygon = Placemark::default();
        no_polygon
            .attributes
            .insert("CITY_NAME".to_string(), "藤沢市".to_string());
        no_polygon
            .attributes
            .insert("S_NAME".to_string(), "辻堂".to_string());
        no_polygon
            .attributes
            .insert("KEYCODE1".to_string(), "1".to_string());

        let mut no_code = no_polygon.clone();
        no_code.attributes.remove("KEYCODE1");
        no_code.polygons.push(vec![crate::kml::parse_coordinates(SQUARE)]);

        assert!(source.collect_town_areas(&[no_polygon, no_code]).is_empty());
    }

    fn geojson_file(dir: &Path, name: &str, value: &serde_json::Value) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, value.to_string()).unwrap();
        path
    }

    #[test]
    fn geojson_towns_get_prefixed_ids() {
        let dir = temp_dir("depot_map_geometry_sources_geojson_test");
        let path = geojson_file(
            &dir,
            "machida.geojson",
            &serde_json::json!({
                "type": "FeatureCollection",
                "features": [
                    {
                        "type": "Feature",
                        "properties": {"municipality": "町田市", "S_NAME": "原町田", "town_code": 132090010},
                        "geometry": null
                    },
                    {
                        "type": "Feature",
                        "properties": {"N03_004": "町田", "name": "本町田"},
                        "geometry": {"type": "Point", "coordinates": [139.4, 35.5]}
                    },
                    {
                        "type": "Feature",
                        "properties": {"municipality": "藤沢市", "name": "辻堂"},
                        "geometry": null
                    },
                    {
                        "type": "Feature",
                        "properties": {"municipality": "町田市", "name": "森野", "area_id": "TK13-5"},
                        "geometry": null
                    }
                ]
            }),
        );

        let source = GeojsonTownSource {
            layer: load_layers(None).unwrap().secondary,
            path,
            municipalities: BTreeSet::from(["町田市".to_string()]),
        };
        let features = source.load(&resolver()).unwrap();
        assert_eq!(features.len(), 3);

        assert_eq!(features[0].properties.area_id, "TK13-132090010");
        assert_eq!(features[0].properties.town_code, "132090010");
        assert_eq!(features[0].properties.pref_name, "東京都");
        assert_eq!(features[0].properties.source, "tokyo-town-geojson");
        assert_eq!(features[0].properties.depot_code, Some(Depot::Sgm));
        assert!(features[0].geometry.is_none());

        assert_eq!(features[1].properties.area_id, "TK13-00002");
        assert_eq!(features[1].properties.town_name, "本町田");
        assert!(features[1].geometry.is_some());

        assert_eq!(features[2].properties.area_id, "TK13-5");
        assert_eq!(features[2].properties.town_code, "5");

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_optional_geojson_yields_nothing() {
        let source = GeojsonTownSource {
            layer: load_layers(None).unwrap().secondary,
            path: std::env::temp_dir().join("depot_map_geometry_sources_absent.geojson"),
            municipalities: BTreeSet::new(),
        };
        assert!(source.load(&resolver()).unwrap().is_empty());
    }

    #[test]
    fn fallback_emits_only_configured_codes() {
        let dir = temp_dir("depot_map_geometry_sources_n03_test");
        let path = geojson_file(
            &dir,
            "n03.geojson",
            &serde_json::json!({
                "type": "FeatureCollection",
                "features": [
                    {
                        "type": "Feature",
                        "properties": {"N03_007": "13209", "N03_004": "町田市", "N03_001": "東京都"},
                        "geometry": null
                    },
                    {
                        "type": "Feature",
                        "properties": {"N03_007": "14205", "N03_004": "藤沢市"},
                        "geometry": null
                    }
                ]
            }),
        );

        let source = MunicipalityFallbackSource {
            layer: load_layers(None).unwrap().fallback,
            path,
            when_empty: "tokyo-town".to_string(),
        };
        assert_eq!(
            source.activation(),
            Activation::WhenEmpty("tokyo-town".to_string())
        );

        let features = source.load(&resolver()).unwrap();
        assert_eq!(features.len(), 1);
        let props = &features[0].properties;
        assert_eq!(props.area_id, "N03-13209");
        assert_eq!(props.area_name, "町田市");
        assert_eq!(props.town_name, "");
        assert_eq!(props.pref_name, "東京都");
        assert_eq!(props.source, "n03-fallback");
        assert_eq!(props.depot_code, Some(Depot::Sgm));
        assert_eq!(props.assign_status, MatchStatus::N03Fallback);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn malformed_geojson_is_an_error() {
        let dir = temp_dir("depot_map_geometry_sources_badjson_test");
        let path = dir.join("bad.geojson");
        std::fs::write(&path, "{not json").unwrap();

        let source = GeojsonTownSource {
            layer: load_layers(None).unwrap().secondary,
            path,
            municipalities: BTreeSet::new(),
        };
        assert!(matches!(
            source.load(&resolver()),
            Err(GeometryError::Json { .. })
        ));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn layered_sources_split_designated_city() {
        let config = load_layers(None).unwrap();
        let inputs = SourceInputs {
            kmz: PathBuf::from("kanagawa.zip"),
            town_geojson: PathBuf::from("machida.geojson"),
            fallback_geojson: PathBuf::from("n03.geojson"),
        };
        let sources = layered_sources(&config, &inputs, &resolver());

        let ids: Vec<&str> = sources.iter().map(|s| s.id()).collect();
        assert_eq!(ids, ["kanagawa-kmz", "tokyo-town", "n03-municipality"]);
        assert_eq!(sources[0].activation(), Activation::Always);
        assert_eq!(
            sources[2].activation(),
            Activation::WhenEmpty("tokyo-town".to_string())
        );
    }
}
