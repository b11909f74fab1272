//! Geographic input coordinates and the integer tile lattice they map onto.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// Tiles per chunk edge.
pub const CHUNK_SIZE: u32 = 16;

const METRES_PER_DEGREE: f64 = 111_320.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

impl GeoPoint {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Self {
        Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        }
    }

    /// Box spanning `radius_m` metres in each direction around a centre point.
    pub fn around(lon: f64, lat: f64, radius_m: f64) -> Self {
        let delta_lat = radius_m / METRES_PER_DEGREE;
        let delta_lon = radius_m / (METRES_PER_DEGREE * lat.to_radians().cos());
        Self {
            min_lon: lon - delta_lon,
            min_lat: lat - delta_lat,
            max_lon: lon + delta_lon,
            max_lat: lat + delta_lat,
        }
    }

    pub fn lon_span(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    pub fn lat_span(&self) -> f64 {
        self.max_lat - self.min_lat
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TileCoord {
    pub x: u32,
    pub y: u32,
}

impl TileCoord {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    pub fn chunk(self) -> ChunkCoord {
        ChunkCoord {
            cx: self.x / CHUNK_SIZE,
            cy: self.y / CHUNK_SIZE,
        }
    }

    /// Offset inside the owning chunk.
    pub fn local(self) -> (u32, u32) {
        (self.x % CHUNK_SIZE, self.y % CHUNK_SIZE)
    }
}

/// Chunk position. Orders row-major, which is the grid's visitation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChunkCoord {
    pub cx: u32,
    pub cy: u32,
}

impl ChunkCoord {
    pub fn new(cx: u32, cy: u32) -> Self {
        Self { cx, cy }
    }

    pub fn origin(self) -> TileCoord {
        TileCoord::new(self.cx * CHUNK_SIZE, self.cy * CHUNK_SIZE)
    }
}

impl Ord for ChunkCoord {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.cy, self.cx).cmp(&(other.cy, other.cx))
    }
}

impl PartialOrd for ChunkCoord {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Maps longitude/latitude onto the tile lattice of a fixed-size world.
#[derive(Debug, Clone)]
pub struct CoordinateTransformer {
    bbox: BoundingBox,
    tiles_x: u32,
    tiles_y: u32,
}

impl CoordinateTransformer {
    pub fn new(bbox: BoundingBox, width_chunks: u32, height_chunks: u32) -> Self {
        Self {
            bbox,
            tiles_x: width_chunks * CHUNK_SIZE,
            tiles_y: height_chunks * CHUNK_SIZE,
        }
    }

    pub fn tiles_x(&self) -> u32 {
        self.tiles_x
    }

    pub fn tiles_y(&self) -> u32 {
        self.tiles_y
    }

    /// Tile for a geographic point; maximum latitude lands on row 0.
    pub fn transform(&self, lon: f64, lat: f64) -> TileCoord {
        let lon_span = self.bbox.lon_span();
        let lat_span = self.bbox.lat_span();
        let norm_x = if lon_span > 0.0 {
            (lon - self.bbox.min_lon) / lon_span
        } else {
            0.5
        };
        let norm_y = if lat_span > 0.0 {
            (lat - self.bbox.min_lat) / lat_span
        } else {
            0.5
        };
        let norm_y = 1.0 - norm_y;

        TileCoord {
            x: scale_axis(norm_x, self.tiles_x),
            y: scale_axis(norm_y, self.tiles_y),
        }
    }

    pub fn transform_point(&self, point: GeoPoint) -> TileCoord {
        self.transform(point.lon, point.lat)
    }

    /// `(chunk_x, chunk_y, local_x, local_y)` for a geographic point.
    pub fn to_chunk(&self, lon: f64, lat: f64) -> (u32, u32, u32, u32) {
        let tile = self.transform(lon, lat);
        let chunk = tile.chunk();
        let (lx, ly) = tile.local();
        (chunk.cx, chunk.cy, lx, ly)
    }
}

fn scale_axis(norm: f64, dim: u32) -> u32 {
    if dim == 0 {
        return 0;
    }
    let scaled = (norm * f64::from(dim)).floor();
    if scaled.is_nan() || scaled < 0.0 {
        0
    } else {
        (scaled as u64).min(u64::from(dim - 1)) as u32
    }
}
