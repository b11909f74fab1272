//! Writers for the files a generation run leaves behind.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::classify::TerrainKind;
use crate::engine::{GenerationOutput, GenerationStats};
use crate::geo::CHUNK_SIZE;
use crate::ireg::{IregWriter, WriteMode};
use crate::npc::{relationship_count, NpcId, NpcProfile};
use crate::world::TileGrid;

pub const NPC_PROFILES_FILE: &str = "npc_profiles.json";
pub const SUMMARY_FILE: &str = "summary.json";
pub const TERRAIN_FILE: &str = "terrain.txt";
pub const GEOJSON_FILE: &str = "map.geojson";
pub const IREG_DIR: &str = "ireg";

const TOP_SHAPES: usize = 20;
const PROFILE_VERSION: &str = "1.0";
const GENERATOR: &str = "osm2world";

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Serialize)]
struct Location {
    tile_x: u32,
    tile_y: u32,
}

#[derive(Debug, Serialize)]
struct RoundedPersonality {
    openness: f64,
    conscientiousness: f64,
    extraversion: f64,
    agreeableness: f64,
    neuroticism: f64,
}

#[derive(Debug, Serialize)]
struct NpcRecord<'a> {
    id: NpcId,
    name: &'a str,
    profession: &'static str,
    building_type: &'a str,
    location: Location,
    shape: u16,
    personality: RoundedPersonality,
    dialogues: &'a [String],
    schedule: &'a str,
    knowledge_domains: &'a [String],
    relationships: BTreeMap<NpcId, f64>,
}

impl<'a> From<&'a NpcProfile> for NpcRecord<'a> {
    fn from(profile: &'a NpcProfile) -> Self {
        let p = &profile.personality;
        Self {
            id: profile.id,
            name: &profile.name,
            profession: profile.profession.as_str(),
            building_type: &profile.building_type,
            location: Location {
                tile_x: profile.tile.x,
                tile_y: profile.tile.y,
            },
            shape: profile.shape,
            personality: RoundedPersonality {
                openness: round3(p.openness),
                conscientiousness: round3(p.conscientiousness),
                extraversion: round3(p.extraversion),
                agreeableness: round3(p.agreeableness),
                neuroticism: round3(p.neuroticism),
            },
            dialogues: &profile.dialogues,
            schedule: &profile.schedule,
            knowledge_domains: &profile.knowledge_domains,
            relationships: profile
                .relationships
                .iter()
                .map(|(id, strength)| (*id, round3(*strength)))
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
struct NpcDocument<'a> {
    version: &'static str,
    generator: &'static str,
    npc_count: usize,
    npcs: Vec<NpcRecord<'a>>,
    relationship_count: usize,
}

#[derive(Debug, Serialize)]
pub struct MapSize {
    pub chunks: [u32; 2],
    pub tiles: [u32; 2],
}

#[derive(Debug, Serialize)]
pub struct MapStatistics {
    pub total_chunks: usize,
    pub total_objects: usize,
    pub unique_shapes: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ShapeCount {
    pub shape: u16,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct Summary {
    pub name: String,
    pub map_size: MapSize,
    pub statistics: MapStatistics,
    pub shape_counts: Vec<ShapeCount>,
    pub generation_stats: GenerationStats,
    pub road_tiles: usize,
    pub intersections: usize,
    pub seed: String,
    pub generated_at: String,
}

impl Summary {
    pub fn from_output(name: &str, output: &GenerationOutput, seed: &str) -> Self {
        let grid = &output.grid;
        let counts = shape_counts(grid);
        Self {
            name: name.to_string(),
            map_size: MapSize {
                chunks: [grid.width_chunks(), grid.height_chunks()],
                tiles: [grid.width_tiles(), grid.height_tiles()],
            },
            statistics: MapStatistics {
                total_chunks: grid.chunk_count(),
                total_objects: grid.object_count(),
                unique_shapes: counts.len(),
            },
            shape_counts: counts.into_iter().take(TOP_SHAPES).collect(),
            generation_stats: output.stats,
            road_tiles: output.roads.len(),
            intersections: output.roads.intersections(),
            seed: seed.to_string(),
            generated_at: chrono::Local::now().to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PointGeometry {
    #[serde(rename = "type")]
    kind: &'static str,
    pub coordinates: Vec<u32>,
}

impl PointGeometry {
    fn new(coordinates: Vec<u32>) -> Self {
        Self {
            kind: "Point",
            coordinates,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TileProperties {
    Terrain {
        shape: u16,
        chunk: [u32; 2],
        local: [u32; 2],
    },
    Object {
        shape: u16,
        frame: u8,
        quality: u8,
        lift: u8,
    },
}

#[derive(Debug, Serialize)]
pub struct MapFeature {
    #[serde(rename = "type")]
    kind: &'static str,
    pub geometry: PointGeometry,
    pub properties: TileProperties,
}

impl MapFeature {
    fn new(coordinates: Vec<u32>, properties: TileProperties) -> Self {
        Self {
            kind: "Feature",
            geometry: PointGeometry::new(coordinates),
            properties,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MapMetadata {
    pub map_size_chunks: [u32; 2],
    pub map_size_tiles: [u32; 2],
    pub total_chunks: usize,
    pub total_objects: usize,
}

/// Every terrain tile and object as a GeoJSON point in tile space.
#[derive(Debug, Serialize)]
pub struct MapCollection {
    #[serde(rename = "type")]
    kind: &'static str,
    pub features: Vec<MapFeature>,
    pub map_metadata: MapMetadata,
}

impl MapCollection {
    /// Chunks in grid order; each chunk's tiles row by row, then its objects
    /// as `[x, y, lift]`.
    pub fn from_grid(grid: &TileGrid) -> Self {
        let mut features = Vec::new();
        for (coord, chunk) in grid.chunks() {
            let origin = coord.origin();
            for ly in 0..CHUNK_SIZE {
                for lx in 0..CHUNK_SIZE {
                    features.push(MapFeature::new(
                        vec![origin.x + lx, origin.y + ly],
                        TileProperties::Terrain {
                            shape: chunk.terrain(lx, ly),
                            chunk: [coord.cx, coord.cy],
                            local: [lx, ly],
                        },
                    ));
                }
            }
            for object in chunk.objects() {
                features.push(MapFeature::new(
                    vec![object.tile.x, object.tile.y, u32::from(object.lift)],
                    TileProperties::Object {
                        shape: object.shape,
                        frame: object.frame,
                        quality: object.quality,
                        lift: object.lift,
                    },
                ));
            }
        }
        Self {
            kind: "FeatureCollection",
            features,
            map_metadata: MapMetadata {
                map_size_chunks: [grid.width_chunks(), grid.height_chunks()],
                map_size_tiles: [grid.width_tiles(), grid.height_tiles()],
                total_chunks: grid.chunk_count(),
                total_objects: grid.object_count(),
            },
        }
    }
}

/// Shape frequencies, most frequent first and ties by shape id.
pub fn shape_counts(grid: &TileGrid) -> Vec<ShapeCount> {
    let mut counts: HashMap<u16, usize> = HashMap::new();
    for object in grid.objects() {
        *counts.entry(object.shape).or_insert(0) += 1;
    }
    let mut counts: Vec<ShapeCount> = counts
        .into_iter()
        .map(|(shape, count)| ShapeCount { shape, count })
        .collect();
    counts.sort_by(|a, b| b.count.cmp(&a.count).then(a.shape.cmp(&b.shape)));
    counts
}

/// One character per tile, one line per tile row.
pub fn terrain_map(grid: &TileGrid) -> String {
    let mut lines = Vec::with_capacity(grid.height_tiles() as usize);
    for cy in 0..grid.height_chunks() {
        for ly in 0..CHUNK_SIZE {
            let mut line = String::with_capacity(grid.width_tiles() as usize);
            for cx in 0..grid.width_chunks() {
                match grid.chunk(cx, cy) {
                    Some(chunk) => {
                        for lx in 0..CHUNK_SIZE {
                            line.push(terrain_char(chunk.terrain(lx, ly)));
                        }
                    }
                    None => line.extend(std::iter::repeat('?').take(CHUNK_SIZE as usize)),
                }
            }
            lines.push(line);
        }
    }
    lines.join("\n")
}

fn terrain_char(id: u16) -> char {
    match TerrainKind::of_id(id) {
        Some(TerrainKind::Grass) => '.',
        Some(TerrainKind::Water) => '~',
        Some(TerrainKind::Cobblestone) => '#',
        Some(TerrainKind::Dirt) => ',',
        Some(TerrainKind::Sand) => ':',
        Some(TerrainKind::Swamp) => '%',
        Some(TerrainKind::Floor) => '_',
        _ => '?',
    }
}

fn round3(value: f32) -> f64 {
    (f64::from(value) * 1000.0).round() / 1000.0
}

/// Writes run artifacts into one output directory.
pub struct Exporter {
    output_dir: PathBuf,
}

impl Exporter {
    pub fn new(output_dir: impl AsRef<Path>) -> Result<Self, ExportError> {
        let output_dir = output_dir.as_ref().to_path_buf();
        fs::create_dir_all(&output_dir).map_err(|source| ExportError::Io {
            path: output_dir.clone(),
            source,
        })?;
        Ok(Self { output_dir })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Returns `None` when there are no NPCs to write.
    pub fn write_npc_profiles(
        &self,
        profiles: &[NpcProfile],
    ) -> Result<Option<PathBuf>, ExportError> {
        if profiles.is_empty() {
            info!("no NPCs to export");
            return Ok(None);
        }
        let document = NpcDocument {
            version: PROFILE_VERSION,
            generator: GENERATOR,
            npc_count: profiles.len(),
            npcs: profiles.iter().map(NpcRecord::from).collect(),
            relationship_count: relationship_count(profiles),
        };
        let path = self.write_json(NPC_PROFILES_FILE, &document)?;
        info!(npcs = profiles.len(), path = %path.display(), "exported NPC profiles");
        Ok(Some(path))
    }

    pub fn write_summary(&self, summary: &Summary) -> Result<PathBuf, ExportError> {
        let path = self.write_json(SUMMARY_FILE, summary)?;
        info!(path = %path.display(), "exported summary");
        Ok(path)
    }

    pub fn write_terrain_map(&self, grid: &TileGrid) -> Result<PathBuf, ExportError> {
        let path = self.output_dir.join(TERRAIN_FILE);
        fs::write(&path, terrain_map(grid)).map_err(|source| ExportError::Io {
            path: path.clone(),
            source,
        })?;
        info!(path = %path.display(), "exported terrain map");
        Ok(path)
    }

    pub fn write_geojson(&self, grid: &TileGrid) -> Result<PathBuf, ExportError> {
        let collection = MapCollection::from_grid(grid);
        let path = self.write_json(GEOJSON_FILE, &collection)?;
        info!(
            features = collection.features.len(),
            path = %path.display(),
            "exported map geojson"
        );
        Ok(path)
    }

    pub fn write_ireg(&self, grid: &TileGrid, mode: WriteMode) -> Result<usize, ExportError> {
        let writer = IregWriter::new(self.output_dir.join(IREG_DIR), mode);
        let streams = writer.write(grid)?;
        info!(streams, dir = %writer.dir().display(), ?mode, "exported object streams");
        Ok(streams)
    }

    fn write_json<T: Serialize>(&self, file: &str, value: &T) -> Result<PathBuf, ExportError> {
        let path = self.output_dir.join(file);
        let json = serde_json::to_string_pretty(value).map_err(|source| ExportError::Json {
            path: path.clone(),
            source,
        })?;
        fs::write(&path, json).map_err(|source| ExportError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::TileCoord;
    use crate::world::PlacedObject;

    #[test]
    fn shape_counts_sort_by_count_then_shape() {
        let mut grid = TileGrid::new(1, 1);
        for shape in [5, 3, 3, 9, 9, 1] {
            grid.add_object(PlacedObject::new(shape, TileCoord::new(0, 0)));
        }
        let counts = shape_counts(&grid);
        let order: Vec<u16> = counts.iter().map(|c| c.shape).collect();
        assert_eq!(order, vec![3, 9, 1, 5]);
        assert_eq!(counts[0].count, 2);
    }

    #[test]
    fn terrain_map_marks_known_kinds() {
        let mut grid = TileGrid::new(2, 1);
        grid.get_chunk(0, 0).fill_unset(|| 4);
        grid.set_terrain(0, 0, 8);
        grid.set_terrain(1, 0, 24);
        grid.set_terrain(2, 0, 17);
        let map = terrain_map(&grid);
        let lines: Vec<&str> = map.lines().collect();
        assert_eq!(lines.len(), 16);
        assert!(lines.iter().all(|l| l.chars().count() == 32));
        assert!(lines[0].starts_with("~#?."));
        assert!(lines[1].ends_with(&"?".repeat(16)));
    }

    #[test]
    fn geojson_lists_terrain_then_objects_per_chunk() {
        let mut grid = TileGrid::new(2, 1);
        grid.get_chunk(0, 0).fill_unset(|| 4);
        grid.add_object(
            PlacedObject::new(151, TileCoord::new(3, 2))
                .with_lift(4)
                .with_quality(7),
        );

        let collection = MapCollection::from_grid(&grid);
        assert_eq!(collection.features.len(), 256 + 1);
        assert_eq!(collection.map_metadata.map_size_tiles, [32, 16]);
        assert_eq!(collection.map_metadata.total_chunks, 1);

        let json = serde_json::to_value(&collection).expect("json");
        assert_eq!(json["type"], "FeatureCollection");
        let first = &json["features"][0];
        assert_eq!(first["type"], "Feature");
        assert_eq!(first["geometry"]["type"], "Point");
        assert_eq!(first["properties"]["type"], "terrain");
        assert_eq!(first["properties"]["shape"], 4);
        let last = &json["features"][256];
        assert_eq!(last["geometry"]["coordinates"], serde_json::json!([3, 2, 4]));
        assert_eq!(last["properties"]["type"], "object");
        assert_eq!(last["properties"]["quality"], 7);
        assert_eq!(last["properties"]["lift"], 4);
    }

    #[test]
    fn rounding_keeps_three_decimals() {
        assert_eq!(round3(0.123_456), 0.123);
        assert_eq!(round3(0.5), 0.5);
    }
}
