use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use geojson::{Feature, GeoJson, Value};

use crate::adapters::outbound::planar_surface::PlanarSurface;
use crate::common::{DomainError, DomainResult};
use crate::domains::crowding::{GroupInput, Point3, ScenarioSource, SurfaceDomain};

/// Overrides the scenario directory.
pub const DATA_DIR_ENV: &str = "CROWDING_DATA_DIR";

pub struct FilesystemScenarioSource {
    base: PathBuf,
}

impl FilesystemScenarioSource {
    pub fn new(base: Option<PathBuf>) -> Self {
        let base = base.unwrap_or_else(|| match env::var(DATA_DIR_ENV) {
            Ok(v) => PathBuf::from(v),
            Err(_) => PathBuf::from("resources/scenarios"),
        });
        Self { base }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn load_groups(&self, name: &str) -> DomainResult<Vec<GroupInput>> {
        let doc = self.load_geojson(name)?;
        parse_scenario(&doc)
    }
}

impl ScenarioSource for FilesystemScenarioSource {
    /// Existing or absolute paths are read as given, anything else relative to the base dir.
    fn load_geojson(&self, name: &str) -> DomainResult<String> {
        let direct = Path::new(name);
        let path = if direct.is_absolute() || direct.exists() {
            direct.to_path_buf()
        } else {
            self.base.join(name)
        };
        fs::read_to_string(&path).map_err(|e| {
            DomainError::InfrastructureError(format!("{}: {}", path.display(), e))
        })
    }
}

#[derive(Default)]
struct GroupDraft {
    name: String,
    pedestrians: Option<f64>,
    segments: Vec<Arc<dyn SurfaceDomain>>,
    attractors: Vec<Point3>,
}

fn group_name(feature: &Feature, index: usize) -> DomainResult<String> {
    let value = feature.property("group").ok_or_else(|| {
        DomainError::invalid_scenario(format!("feature {} has no `group` property", index))
    })?;
    value
        .as_str()
        .map(str::to_string)
        .or_else(|| value.as_i64().map(|n| n.to_string()))
        .ok_or_else(|| {
            DomainError::invalid_scenario(format!(
                "feature {} has a non-string `group` property",
                index
            ))
        })
}

fn polygon_surface(rings: &[Vec<Vec<f64>>], elevation: Option<f64>) -> Option<PlanarSurface> {
    let (exterior, holes) = rings.split_first()?;
    let elevation = elevation
        .or_else(|| exterior.first().and_then(|p| p.get(2).copied()))
        .unwrap_or(0.0);
    let to_xy = |ring: &Vec<Vec<f64>>| -> Vec<(f64, f64)> {
        ring.iter()
            .filter(|p| p.len() >= 2)
            .map(|p| (p[0], p[1]))
            .collect()
    };
    Some(PlanarSurface::new(
        to_xy(exterior),
        holes.iter().map(to_xy).collect(),
        elevation,
    ))
}

/// Builds analysis groups from a GeoJSON FeatureCollection.
///
/// Polygons (kind `sidewalk` or no kind) become segments, points of kind
/// `subway` or `interest` become attractors. Groups keep first-appearance order.
pub fn parse_scenario(geojson: &str) -> DomainResult<Vec<GroupInput>> {
    let doc: GeoJson = geojson
        .parse()
        .map_err(|e: geojson::Error| DomainError::invalid_scenario(e.to_string()))?;
    let collection = match doc {
        GeoJson::FeatureCollection(fc) => fc,
        _ => return Err(DomainError::invalid_scenario("expected a FeatureCollection")),
    };

    let mut drafts: Vec<GroupDraft> = Vec::new();

    for (index, feature) in collection.features.iter().enumerate() {
        let geometry = match &feature.geometry {
            Some(g) => g,
            None => continue,
        };
        let name = group_name(feature, index)?;
        let kind = feature.property("kind").and_then(|v| v.as_str());

        let pos = match drafts.iter().position(|d| d.name == name) {
            Some(p) => p,
            None => {
                drafts.push(GroupDraft {
                    name,
                    ..GroupDraft::default()
                });
                drafts.len() - 1
            }
        };
        let draft = &mut drafts[pos];

        match &geometry.value {
            Value::Polygon(_) | Value::MultiPolygon(_) if matches!(kind, None | Some("sidewalk")) => {
                if draft.pedestrians.is_none() {
                    draft.pedestrians = feature.property("pedestrians").and_then(|v| v.as_f64());
                }
                let elevation = feature.property("elevation").and_then(|v| v.as_f64());
                let polygons: Vec<&Vec<Vec<Vec<f64>>>> = match &geometry.value {
                    Value::Polygon(rings) => vec![rings],
                    Value::MultiPolygon(polys) => polys.iter().collect(),
                    _ => Vec::new(),
                };
                for rings in polygons {
                    if let Some(surface) = polygon_surface(rings, elevation) {
                        draft.segments.push(Arc::new(surface));
                    }
                }
            }
            Value::Point(p) if matches!(kind, Some("subway") | Some("interest")) => {
                if p.len() >= 2 {
                    let z = p.get(2).copied().unwrap_or(0.0);
                    draft.attractors.push(Point3::new(p[0], p[1], z));
                }
            }
            _ => {}
        }
    }

    Ok(drafts
        .into_iter()
        .map(|d| GroupInput {
            name: d.name,
            pedestrian_count: d.pedestrians.unwrap_or(0.0),
            segments: d.segments,
            attractors: d.attractors,
        })
        .collect())
}
