//! Tile-space rasterization: width-aware lines, polygon fill and the road
//! tile registry.

use std::collections::{BTreeMap, BTreeSet};

use rand::Rng;

use crate::geo::TileCoord;
use crate::rng::RngExt;
use crate::world::{TerrainId, TileGrid};

/// Centre tiles of the segment `p0 -> p1`, one per step of the longer axis.
pub fn line_tiles(p0: TileCoord, p1: TileCoord) -> Vec<TileCoord> {
    let dx = i64::from(p1.x) - i64::from(p0.x);
    let dy = i64::from(p1.y) - i64::from(p0.y);
    let dist = dx.abs().max(dy.abs());
    if dist == 0 {
        return vec![p0];
    }

    (0..=dist)
        .map(|i| {
            let t = i as f64 / dist as f64;
            let x = f64::from(p0.x) + t * dx as f64;
            let y = f64::from(p0.y) + t * dy as f64;
            TileCoord::new(x.floor() as u32, y.floor() as u32)
        })
        .collect()
}

/// Tiles covered by a segment of the given width, clipped to the world.
///
/// Each centre tile expands to a square of side `2 * (width / 2) + 1`. The
/// result keeps paint order and may repeat tiles where squares overlap.
pub fn swept_tiles(grid: &TileGrid, p0: TileCoord, p1: TileCoord, width: u32) -> Vec<TileCoord> {
    let half = i64::from(width / 2);
    let centres = line_tiles(p0, p1);
    if centres.len() == 1 {
        return centres;
    }

    let mut tiles = Vec::with_capacity(centres.len() * ((2 * half + 1) * (2 * half + 1)) as usize);
    for centre in centres {
        for wx in -half..=half {
            for wy in -half..=half {
                if let Some(tile) = grid.clip(i64::from(centre.x) + wx, i64::from(centre.y) + wy) {
                    tiles.push(tile);
                }
            }
        }
    }
    tiles
}

/// Paint a line of terrain, drawing a fresh candidate for every painted tile.
pub fn line_with_width<R: Rng>(
    grid: &mut TileGrid,
    rng: &mut R,
    p0: TileCoord,
    p1: TileCoord,
    candidates: &[TerrainId],
    width: u32,
) -> usize {
    let tiles = swept_tiles(grid, p0, p1, width);
    paint(grid, rng, &tiles, candidates)
}

/// Fill every tile of the vertices' bounding box that tests inside the polygon.
pub fn polygon_fill<R: Rng>(
    grid: &mut TileGrid,
    rng: &mut R,
    vertices: &[TileCoord],
    candidates: &[TerrainId],
) -> usize {
    let tiles = polygon_tiles(vertices);
    paint(grid, rng, &tiles, candidates)
}

/// Tiles inside a tile-space polygon, scanned row by row.
pub fn polygon_tiles(vertices: &[TileCoord]) -> Vec<TileCoord> {
    let Some(first) = vertices.first() else {
        return Vec::new();
    };
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
    for v in vertices {
        min_x = min_x.min(v.x);
        min_y = min_y.min(v.y);
        max_x = max_x.max(v.x);
        max_y = max_y.max(v.y);
    }

    let polygon: Vec<(f64, f64)> = vertices
        .iter()
        .map(|v| (f64::from(v.x), f64::from(v.y)))
        .collect();
    let mut inside = Vec::new();
    for y in min_y..=max_y {
        for x in min_x..=max_x {
            if point_in_polygon(f64::from(x), f64::from(y), &polygon) {
                inside.push(TileCoord::new(x, y));
            }
        }
    }
    inside
}

/// Even-odd ray cast towards +x. An edge counts only when exactly one of its
/// endpoints lies strictly above `py`, so shared vertices are never counted
/// twice.
pub fn point_in_polygon(px: f64, py: f64, vertices: &[(f64, f64)]) -> bool {
    let n = vertices.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (xi, yi) = vertices[i];
        let (xj, yj) = vertices[j];
        if ((yi > py) != (yj > py)) && (px < (xj - xi) * (py - yi) / (yj - yi) + xi) {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Paint each listed tile with a fresh draw from `candidates`.
pub fn paint<R: Rng>(
    grid: &mut TileGrid,
    rng: &mut R,
    tiles: &[TileCoord],
    candidates: &[TerrainId],
) -> usize {
    let mut painted = 0;
    for tile in tiles {
        if let Some(id) = rng.pick(candidates) {
            grid.set_terrain(tile.x, tile.y, id);
            painted += 1;
        }
    }
    painted
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoadCategory {
    Road(String),
    Intersection,
}

impl RoadCategory {
    pub fn as_str(&self) -> &str {
        match self {
            RoadCategory::Road(kind) => kind,
            RoadCategory::Intersection => "intersection",
        }
    }
}

/// Tile to road category for every tile a highway covers.
#[derive(Debug, Default)]
pub struct RoadRegistry {
    tiles: BTreeMap<TileCoord, RoadCategory>,
}

impl RoadRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the tiles one highway segment touches. A tile claimed by any
    /// earlier segment becomes an intersection, including the shared vertex
    /// of two consecutive segments of the same way. Repeats inside the
    /// segment's own sweep count once.
    pub fn register_segment(&mut self, kind: &str, tiles: impl IntoIterator<Item = TileCoord>) {
        let unique: BTreeSet<TileCoord> = tiles.into_iter().collect();
        for tile in unique {
            self.tiles
                .entry(tile)
                .and_modify(|category| *category = RoadCategory::Intersection)
                .or_insert_with(|| RoadCategory::Road(kind.to_string()));
        }
    }

    pub fn get(&self, tile: TileCoord) -> Option<&RoadCategory> {
        self.tiles.get(&tile)
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn intersections(&self) -> usize {
        self.tiles
            .values()
            .filter(|category| **category == RoadCategory::Intersection)
            .count()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TileCoord, &RoadCategory)> {
        self.tiles.iter()
    }
}
