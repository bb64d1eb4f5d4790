//! Town-level zone map with the current depot of every unit.

use std::path::PathBuf;

use clap::Args;
use depot_map_geometry::{
    MergedZones, SourceInputs, StatusTally, ZoneSummary, layered_sources, load_layers,
    merge_sources, write_feature_collection,
};
use depot_map_resolve::TieredResolver;
use depot_map_tabular::{load_assignment_records, load_postal_records};

use crate::PipelineError;

/// Arguments of the `fine-polygons` pipeline.
#[derive(Debug, Clone, Args)]
pub struct FinePolygonsArgs {
    /// Current postal-code assignment CSV (town evidence)
    #[arg(long, default_value = "asis.csv")]
    pub asis: PathBuf,

    /// Wrapped e-Stat town boundary KMZ
    #[arg(long, default_value = "data/A002005212020DDKWC14.zip")]
    pub kmz: PathBuf,

    /// Area assignment CSV (municipality evidence)
    #[arg(long, default_value = "data/asis_admin_assignments.csv")]
    pub baseline: PathBuf,

    /// Town-level GeoJSON for the designated city
    #[arg(long, default_value = "data/tokyo/machida_towns.geojson")]
    pub town_geojson: PathBuf,

    /// Municipality-level N03 GeoJSON used when the town GeoJSON is empty
    #[arg(long, default_value = "data/n03_target_admin_areas.geojson")]
    pub fallback_geojson: PathBuf,

    /// Output GeoJSON path
    #[arg(long, default_value = "data/asis_fine_polygons.geojson")]
    pub out: PathBuf,

    /// Layer configuration replacing the built-in one
    #[arg(long)]
    pub layers: Option<PathBuf>,
}

/// Builds the zone map and writes it to [`FinePolygonsArgs::out`].
///
/// # Errors
///
/// Returns an error if a required input is missing or unreadable, or if
/// the map cannot be written.
pub fn run(args: &FinePolygonsArgs) -> Result<MergedZones, PipelineError> {
    let config = load_layers(args.layers.as_deref())?;

    let baseline = load_assignment_records(&args.baseline)?;
    let postal = load_postal_records(&args.asis)?;
    let resolver = TieredResolver::from_baseline(&baseline).with_postal_records(&postal);

    let inputs = SourceInputs {
        kmz: args.kmz.clone(),
        town_geojson: args.town_geojson.clone(),
        fallback_geojson: args.fallback_geojson.clone(),
    };
    let sources = layered_sources(&config, &inputs, &resolver);
    let merged = merge_sources(&sources, &resolver)?;

    write_feature_collection(&args.out, &merged.features)?;

    for report in &merged.reports {
        if report.consulted {
            log::info!("{}: {} features", report.id, report.feature_count);
        } else {
            log::info!("{}: not consulted", report.id);
        }
    }
    log::info!("{}", ZoneSummary::from_features(&merged.features));
    for (family, count) in StatusTally::from_features(&merged.features).iter() {
        log::info!("  {family}: {count}");
    }

    let conflicts = merged
        .features
        .iter()
        .filter(|f| f.properties.assign_status.is_conflict())
        .count();
    if conflicts > 0 {
        log::warn!("{conflicts} feature(s) have conflicting depot evidence and no depot");
    }

    Ok(merged)
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Write};
    use std::path::Path;

    use super::*;
    use zip::write::SimpleFileOptions;

    const SQUARE: &str = "139.0,35.0 139.1,35.0 139.1,35.1 139.0,35.0";

    fn zip_bytes(name: &str, content: &[u8]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file(name, SimpleFileOptions::default())
            .unwrap();
        writer.write_all(content).unwrap();
        writer.finish().unwrap().into_inner()
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

    fn write_inputs(dir: &Path) {
        std::fs::write(
            dir.join("baseline.csv"),
            "area_id,area_name,depot_code\n14205,藤沢市,FUJ\n13209,町田市,SGM\n",
        )
        .unwrap();
        std::fs::write(
            dir.join("asis.csv"),
            "郵便番号,市区,町,対応エリア,管轄デポ\n2510041,藤沢市,辻堂,藤沢市,横浜港北デポ YOK\n",
        )
        .unwrap();

        let kml = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<kml xmlns="http://www.opengis.net/kml/2.2"><Document><Folder>{}{}{}</Folder></Document></kml>"#,
            placemark("藤沢市", "辻堂", "142050010"),
            placemark("藤沢市", "鵠沼", "142050020"),
            placemark("横浜市", "中央", "141000010"),
        );
        let kmz = zip_bytes("doc.kml", kml.as_bytes());
        std::fs::write(dir.join("towns.zip"), zip_bytes("data.kmz", &kmz)).unwrap();

        std::fs::write(
            dir.join("n03.geojson"),
            r#"{"type":"FeatureCollection","features":[
{"type":"Feature","properties":{"N03_001":"東京都","N03_004":"町田市","N03_007":"13209"},
 "geometry":{"type":"Polygon","coordinates":[[[139.4,35.5],[139.5,35.5],[139.5,35.6],[139.4,35.5]]]}},
{"type":"Feature","properties":{"N03_001":"東京都","N03_004":"八王子市","N03_007":"13201"},
 "geometry":null}
]}"#,
        )
        .unwrap();
    }

    fn args(dir: &Path) -> FinePolygonsArgs {
        FinePolygonsArgs {
            asis: dir.join("asis.csv"),
            kmz: dir.join("towns.zip"),
            baseline: dir.join("baseline.csv"),
            town_geojson: dir.join("absent_towns.geojson"),
            fallback_geojson: dir.join("n03.geojson"),
            out: dir.join("out").join("zones.geojson"),
            layers: None,
        }
    }

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(name);
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn builds_layered_zone_map() {
        let dir = temp_dir("depot_map_cli_fine_polygons_test");
        write_inputs(&dir);
        let args = args(&dir);

        let merged = run(&args).unwrap();

        let ids: Vec<&str> = merged
            .features
            .iter()
            .map(|f| f.properties.area_id.as_str())
            .collect();
        assert_eq!(ids, ["KA14-142050010", "KA14-142050020", "N03-13209"]);

        let statuses: Vec<String> = merged
            .features
            .iter()
            .map(|f| f.properties.assign_status.to_string())
            .collect();
        assert_eq!(statuses, ["TOWN_MATCH", "MUNI_FALLBACK", "N03_FALLBACK"]);

        let consulted: Vec<(&str, bool, usize)> = merged
            .reports
            .iter()
            .map(|r| (r.id.as_str(), r.consulted, r.feature_count))
            .collect();
        assert_eq!(
            consulted,
            [
                ("kanagawa-kmz", true, 2),
                ("tokyo-town", true, 0),
                ("n03-municipality", true, 1),
            ]
        );

        let text = std::fs::read_to_string(&args.out).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        let features = value["features"].as_array().unwrap();
        assert_eq!(features.len(), 3);
        assert_eq!(features[0]["properties"]["depot_code"], "YOK");
        assert_eq!(features[0]["properties"]["area_name"], "藤沢市辻堂");
        assert_eq!(features[1]["properties"]["depot_code"], "FUJ");
        assert_eq!(features[2]["properties"]["depot_code"], "SGM");
        assert_eq!(features[2]["properties"]["source"], "n03-fallback");

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_kmz_is_fatal() {
        let dir = temp_dir("depot_map_cli_fine_polygons_missing_test");
        write_inputs(&dir);
        std::fs::remove_file(dir.join("towns.zip")).unwrap();
        let args = args(&dir);

        assert!(matches!(run(&args), Err(PipelineError::Geometry(_))));
        assert!(!args.out.exists());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn custom_layers_replace_the_builtin_ones() {
        let dir = temp_dir("depot_map_cli_fine_polygons_layers_test");
        write_inputs(&dir);
        std::fs::write(
            dir.join("layers.toml"),
            r#"designated_city = "町田市"

[primary]
id = "primary"
id_prefix = "P"
source_tag = "primary-kmz"
default_pref_name = "神奈川県"

[secondary]
id = "secondary"
id_prefix = "S"
source_tag = "secondary-geojson"
default_pref_name = "東京都"

[fallback]
id = "fallback"
id_prefix = "F"
source_tag = "fallback-geojson"
area_codes = []
"#,
        )
        .unwrap();
        let mut args = args(&dir);
        args.layers = Some(dir.join("layers.toml"));

        let merged = run(&args).unwrap();
        assert_eq!(merged.features.len(), 2);
        assert!(
            merged
                .features
                .iter()
                .all(|f| f.properties.area_id.starts_with("P-"))
        );

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
