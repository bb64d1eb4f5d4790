//! Ordered merging of ranked polygon sources.

use depot_map_resolve::TieredResolver;
use depot_map_zone_models::ZoneFeature;

use crate::GeometryError;
use crate::sources::{Activation, ZoneSource};

/// What one source contributed to a merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceReport {
    /// Source identifier.
    pub id: String,
    /// Whether the source was loaded.
    pub consulted: bool,
    /// Number of features it produced.
    pub feature_count: usize,
}

impl SourceReport {
    /// Whether the source produced at least one feature.
    #[must_use]
    pub const fn has_output(&self) -> bool {
        self.feature_count > 0
    }
}

/// The merged collection and a report per source, both in source order.
#[derive(Debug, Clone, Default)]
pub struct MergedZones {
    /// Concatenated features of every consulted source.
    pub features: Vec<ZoneFeature>,
    /// One report per source.
    pub reports: Vec<SourceReport>,
}

/// Consults `sources` in order and concatenates their features.
///
/// A source with [`Activation::WhenEmpty`] is skipped when the named
/// earlier source produced features. A name that matches no earlier
/// source counts as empty.
///
/// # Errors
///
/// Returns the first error raised by a consulted source.
pub fn merge_sources(
    sources: &[Box<dyn ZoneSource>],
    resolver: &TieredResolver,
) -> Result<MergedZones, GeometryError> {
    let mut merged = MergedZones::default();

    for source in sources {
        let consult = match source.activation() {
            Activation::Always => true,
            Activation::WhenEmpty(other) => !merged
                .reports
                .iter()
                .any(|report| report.id == other && report.has_output()),
        };

        if !consult {
            log::info!("{}: skipped, an earlier source already covers it", source.id());
            merged.reports.push(SourceReport {
                id: source.id().to_string(),
                consulted: false,
                feature_count: 0,
            });
            continue;
        }

        let features = source.load(resolver)?;
        merged.reports.push(SourceReport {
            id: source.id().to_string(),
            consulted: true,
            feature_count: features.len(),
        });
        merged.features.extend(features);
    }

    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use depot_map_zone_models::{MatchStatus, ZoneProperties};

    struct Fixed {
        id: &'static str,
        activation: Activation,
        count: usize,
    }

    impl ZoneSource for Fixed {
        fn id(&self) -> &str {
            self.id
        }

        fn activation(&self) -> Activation {
            self.activation.clone()
        }

        fn load(&self, _resolver: &TieredResolver) -> Result<Vec<ZoneFeature>, GeometryError> {
            Ok((0..self.count)
                .map(|i| ZoneFeature {
                    properties: ZoneProperties {
                        area_id: format!("{}-{i}", self.id),
                        area_name: String::new(),
                        municipality: String::new(),
                        town_name: String::new(),
                        pref_name: String::new(),
                        town_code: String::new(),
                        source: self.id.to_string(),
                        depot_code: None,
                        depot_name: "",
                        assign_status: MatchStatus::NoData,
                    },
                    geometry: None,
                })
                .collect())
        }
    }

    struct Failing;

    impl ZoneSource for Failing {
        fn id(&self) -> &str {
            "failing"
        }

        fn load(&self, _resolver: &TieredResolver) -> Result<Vec<ZoneFeature>, GeometryError> {
            Err(GeometryError::EmptyArchive("failing.zip".to_string()))
        }
    }

    fn sources(secondary: usize) -> Vec<Box<dyn ZoneSource>> {
        vec![
            Box::new(Fixed {
                id: "primary",
                activation: Activation::Always,
                count: 2,
            }),
            Box::new(Fixed {
                id: "secondary",
                activation: Activation::Always,
                count: secondary,
            }),
            Box::new(Fixed {
                id: "fallback",
                activation: Activation::WhenEmpty("secondary".to_string()),
                count: 1,
            }),
        ]
    }

    #[test]
    fn fallback_skipped_when_secondary_has_output() {
        let merged = merge_sources(&sources(3), &TieredResolver::default()).unwrap();

        assert_eq!(merged.features.len(), 5);
        assert!(merged.features.iter().all(|f| f.properties.source != "fallback"));
        assert!(!merged.reports[2].consulted);
        assert!(merged.reports[1].has_output());
    }

    #[test]
    fn fallback_consulted_when_secondary_is_empty() {
        let merged = merge_sources(&sources(0), &TieredResolver::default()).unwrap();

        let order: Vec<&str> = merged
            .features
            .iter()
            .map(|f| f.properties.source.as_str())
            .collect();
        assert_eq!(order, ["primary", "primary", "fallback"]);
        assert!(merged.reports[1].consulted);
        assert!(!merged.reports[1].has_output());
        assert_eq!(
            merged.reports[2],
            SourceReport {
                id: "fallback".to_string(),
                consulted: true,
                feature_count: 1,
            }
        );
    }

    #[test]
    fn unknown_activation_target_counts_as_empty() {
        let sources: Vec<Box<dyn ZoneSource>> = vec![Box::new(Fixed {
            id: "fallback",
            activation: Activation::WhenEmpty("missing".to_string()),
            count: 1,
        })];
        let merged = merge_sources(&sources, &TieredResolver::default()).unwrap();
        assert_eq!(merged.features.len(), 1);
    }

    #[test]
    fn source_errors_abort_the_merge() {
        let sources: Vec<Box<dyn ZoneSource>> = vec![Box::new(Failing)];
        assert!(matches!(
            merge_sources(&sources, &TieredResolver::default()),
            Err(GeometryError::EmptyArchive(_))
        ));
    }
}
