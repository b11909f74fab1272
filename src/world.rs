use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::geo::{ChunkCoord, TileCoord, CHUNK_SIZE};

pub type TerrainId = u16;

/// Terrain value of a tile nothing has painted yet.
pub const UNSET_TERRAIN: TerrainId = u16::MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedObject {
    pub shape: u16,
    pub frame: u8,
    pub tile: TileCoord,
    pub lift: u8,
    pub quality: u8,
    pub flags: u8,
}

impl PlacedObject {
    pub fn new(shape: u16, tile: TileCoord) -> Self {
        Self {
            shape,
            frame: 0,
            tile,
            lift: 0,
            quality: 0,
            flags: 0,
        }
    }

    pub fn with_lift(mut self, lift: u8) -> Self {
        self.lift = lift;
        self
    }

    pub fn with_quality(mut self, quality: u8) -> Self {
        self.quality = quality;
        self
    }
}

#[derive(Debug, Clone)]
pub struct Chunk {
    terrain: [[TerrainId; CHUNK_SIZE as usize]; CHUNK_SIZE as usize],
    objects: Vec<PlacedObject>,
}

impl Chunk {
    pub fn new() -> Self {
        Self {
            terrain: [[UNSET_TERRAIN; CHUNK_SIZE as usize]; CHUNK_SIZE as usize],
            objects: Vec::new(),
        }
    }

    pub fn terrain(&self, local_x: u32, local_y: u32) -> TerrainId {
        self.terrain[local_y as usize][local_x as usize]
    }

    pub fn set_terrain(&mut self, local_x: u32, local_y: u32, id: TerrainId) {
        self.terrain[local_y as usize][local_x as usize] = id;
    }

    /// Terrain rows, indexed `[local_y][local_x]`.
    pub fn terrain_rows(&self) -> &[[TerrainId; CHUNK_SIZE as usize]; CHUNK_SIZE as usize] {
        &self.terrain
    }

    pub fn objects(&self) -> &[PlacedObject] {
        &self.objects
    }

    pub fn push_object(&mut self, object: PlacedObject) {
        self.objects.push(object);
    }

    /// Replace every unset tile with a value from `fill`.
    pub fn fill_unset(&mut self, mut fill: impl FnMut() -> TerrainId) {
        for row in self.terrain.iter_mut() {
            for cell in row.iter_mut() {
                if *cell == UNSET_TERRAIN {
                    *cell = fill();
                }
            }
        }
    }
}

impl Default for Chunk {
    fn default() -> Self {
        Self::new()
    }
}

/// Sparse chunk storage for terrain and placed objects.
pub struct TileGrid {
    width_chunks: u32,
    height_chunks: u32,
    chunks: BTreeMap<ChunkCoord, Chunk>,
}

impl TileGrid {
    pub fn new(width_chunks: u32, height_chunks: u32) -> Self {
        Self {
            width_chunks,
            height_chunks,
            chunks: BTreeMap::new(),
        }
    }

    pub fn width_chunks(&self) -> u32 {
        self.width_chunks
    }

    pub fn height_chunks(&self) -> u32 {
        self.height_chunks
    }

    pub fn width_tiles(&self) -> u32 {
        self.width_chunks * CHUNK_SIZE
    }

    pub fn height_tiles(&self) -> u32 {
        self.height_chunks * CHUNK_SIZE
    }

    /// Tile at signed coordinates if it lies inside the world.
    pub fn clip(&self, x: i64, y: i64) -> Option<TileCoord> {
        if x < 0 || y < 0 || x >= i64::from(self.width_tiles()) || y >= i64::from(self.height_tiles())
        {
            return None;
        }
        Some(TileCoord::new(x as u32, y as u32))
    }

    /// Chunk at the given coordinates, created on first access.
    pub fn get_chunk(&mut self, cx: u32, cy: u32) -> &mut Chunk {
        self.chunks.entry(ChunkCoord::new(cx, cy)).or_default()
    }

    pub fn chunk(&self, cx: u32, cy: u32) -> Option<&Chunk> {
        self.chunks.get(&ChunkCoord::new(cx, cy))
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Chunks in row-major order.
    pub fn chunks(&self) -> impl Iterator<Item = (ChunkCoord, &Chunk)> {
        self.chunks.iter().map(|(coord, chunk)| (*coord, chunk))
    }

    pub fn chunks_mut(&mut self) -> impl Iterator<Item = (ChunkCoord, &mut Chunk)> {
        self.chunks.iter_mut().map(|(coord, chunk)| (*coord, chunk))
    }

    pub fn set_terrain(&mut self, x: u32, y: u32, id: TerrainId) {
        let tile = TileCoord::new(x, y);
        let chunk = tile.chunk();
        let (lx, ly) = tile.local();
        self.get_chunk(chunk.cx, chunk.cy).set_terrain(lx, ly, id);
    }

    pub fn terrain_at(&self, x: u32, y: u32) -> Option<TerrainId> {
        let tile = TileCoord::new(x, y);
        let chunk = tile.chunk();
        let (lx, ly) = tile.local();
        self.chunk(chunk.cx, chunk.cy)
            .map(|chunk| chunk.terrain(lx, ly))
    }

    /// Store an object in the chunk its tile belongs to.
    pub fn add_object(&mut self, object: PlacedObject) {
        let chunk = object.tile.chunk();
        self.get_chunk(chunk.cx, chunk.cy).push_object(object);
    }

    pub fn objects(&self) -> impl Iterator<Item = &PlacedObject> {
        self.chunks.values().flat_map(|chunk| chunk.objects.iter())
    }

    pub fn object_count(&self) -> usize {
        self.chunks.values().map(|chunk| chunk.objects.len()).sum()
    }

    pub fn objects_at(&self, tile: TileCoord) -> impl Iterator<Item = &PlacedObject> {
        let chunk = tile.chunk();
        self.chunk(chunk.cx, chunk.cy)
            .into_iter()
            .flat_map(|chunk| chunk.objects.iter())
            .filter(move |object| object.tile == tile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_chunk_is_unset_and_empty() {
        let chunk = Chunk::new();
        assert_eq!(chunk.terrain(0, 0), UNSET_TERRAIN);
        assert_eq!(chunk.terrain(15, 15), UNSET_TERRAIN);
        assert!(chunk.objects().is_empty());
    }

    #[test]
    fn get_chunk_is_lazy_and_idempotent() {
        let mut grid = TileGrid::new(16, 16);
        assert_eq!(grid.chunk_count(), 0);
        grid.get_chunk(3, 3).set_terrain(0, 0, 99);
        assert_eq!(grid.chunk_count(), 1);
        assert_eq!(grid.get_chunk(3, 3).terrain(0, 0), 99);
        assert_eq!(grid.chunk_count(), 1);
    }

    #[test]
    fn set_terrain_lands_in_owning_chunk() {
        let mut grid = TileGrid::new(16, 16);
        grid.set_terrain(17, 33, 10);
        let chunk = grid.chunk(1, 2).expect("chunk created");
        assert_eq!(chunk.terrain(1, 1), 10);
        assert_eq!(grid.terrain_at(17, 33), Some(10));
        assert_eq!(grid.terrain_at(200, 200), None);
    }

    #[test]
    fn objects_grouped_by_tile_chunk() {
        let mut grid = TileGrid::new(16, 16);
        grid.add_object(PlacedObject::new(100, TileCoord::new(35, 50)));
        for i in 0..5 {
            grid.add_object(PlacedObject::new(100 + i, TileCoord::new(5 + i as u32, 5)));
        }
        assert_eq!(grid.chunk(2, 3).map(|c| c.objects().len()), Some(1));
        assert_eq!(grid.chunk(0, 0).map(|c| c.objects().len()), Some(5));
        assert_eq!(grid.object_count(), 6);
        assert_eq!(grid.objects_at(TileCoord::new(7, 5)).count(), 1);
    }

    #[test]
    fn clip_rejects_outside_tiles() {
        let grid = TileGrid::new(2, 1);
        assert_eq!(grid.clip(-1, 0), None);
        assert_eq!(grid.clip(32, 0), None);
        assert_eq!(grid.clip(0, 16), None);
        assert_eq!(grid.clip(31, 15), Some(TileCoord::new(31, 15)));
    }

    #[test]
    fn fill_unset_keeps_painted_tiles() {
        let mut chunk = Chunk::new();
        chunk.set_terrain(2, 3, 8);
        chunk.fill_unset(|| 4);
        assert_eq!(chunk.terrain(2, 3), 8);
        assert_eq!(chunk.terrain(0, 0), 4);
    }
}
