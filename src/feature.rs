//! Input features and the Overpass JSON dump they are read from.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;
use tracing::debug;

use crate::classify::Tags;
use crate::geo::GeoPoint;

#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(GeoPoint),
    Way { points: Vec<GeoPoint>, closed: bool },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub geometry: Geometry,
    pub tags: Tags,
}

impl Feature {
    pub fn point(point: GeoPoint, tags: Tags) -> Self {
        Self {
            geometry: Geometry::Point(point),
            tags,
        }
    }

    pub fn way(points: Vec<GeoPoint>, closed: bool, tags: Tags) -> Self {
        Self {
            geometry: Geometry::Way { points, closed },
            tags,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FeatureError {
    #[error("malformed feature dump: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Deserialize)]
struct Dump {
    #[serde(default)]
    elements: Vec<Element>,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum Element {
    Node {
        id: i64,
        lon: f64,
        lat: f64,
        #[serde(default)]
        tags: Option<Tags>,
    },
    Way {
        #[serde(default)]
        nodes: Vec<i64>,
        #[serde(default)]
        tags: Tags,
    },
    #[serde(other)]
    Other,
}

/// Parse an Overpass `out body` dump into features.
///
/// Ways keep only the node ids that resolve and are dropped when none do. A
/// way is closed when it lists more than two ids and the first equals the
/// last. Tagged nodes become point features. Document order is preserved.
pub fn load_overpass(json: &str) -> Result<Vec<Feature>, FeatureError> {
    let dump: Dump = serde_json::from_str(json)?;

    let nodes: HashMap<i64, GeoPoint> = dump
        .elements
        .iter()
        .filter_map(|element| match element {
            Element::Node { id, lon, lat, .. } => Some((*id, GeoPoint::new(*lon, *lat))),
            _ => None,
        })
        .collect();

    let mut features = Vec::new();
    for element in dump.elements {
        match element {
            Element::Way { nodes: ids, tags } => {
                let points: Vec<GeoPoint> =
                    ids.iter().filter_map(|id| nodes.get(id).copied()).collect();
                if points.is_empty() {
                    debug!(node_refs = ids.len(), "way skipped: no resolvable nodes");
                    continue;
                }
                let closed = ids.len() > 2 && ids.first() == ids.last();
                features.push(Feature::way(points, closed, tags));
            }
            Element::Node {
                lon,
                lat,
                tags: Some(tags),
                ..
            } => features.push(Feature::point(GeoPoint::new(lon, lat), tags)),
            Element::Node { tags: None, .. } | Element::Other => {}
        }
    }
    Ok(features)
}

pub fn load_overpass_file(path: &Path) -> anyhow::Result<Vec<Feature>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read feature dump {}", path.display()))?;
    load_overpass(&text).with_context(|| format!("failed to parse {}", path.display()))
}
