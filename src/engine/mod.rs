use serde::Serialize;
use tracing::{debug, info};

use crate::{
    building::BuildingPlanner,
    classify::{classify, objects_for, FeatureKind, Highway, ObjectKind, TerrainKind},
    feature::{Feature, Geometry},
    geo::{BoundingBox, CoordinateTransformer, GeoPoint, TileCoord},
    npc::{NpcProfile, NpcRoster},
    raster::{self, RoadRegistry},
    rng::{RngExt, SessionRng},
    world::{PlacedObject, TileGrid},
};

const WATERWAY_WIDTH: u32 = 3;
const AREA_SCATTER_STEP: usize = 3;

pub struct EngineSettings {
    pub bbox: BoundingBox,
    pub width_chunks: u32,
    pub height_chunks: u32,
    pub seed: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GenerationStats {
    pub buildings_processed: u64,
    pub roads_processed: u64,
    pub interiors_generated: u64,
    pub npcs_placed: u64,
    pub features_skipped: u64,
}

/// Everything a run produced, handed to exporters.
pub struct GenerationOutput {
    pub grid: TileGrid,
    pub npcs: Vec<NpcProfile>,
    pub roads: RoadRegistry,
    pub stats: GenerationStats,
}

/// One generation session: the world being built plus its single random
/// source.
pub struct Engine {
    transformer: CoordinateTransformer,
    grid: TileGrid,
    rng: SessionRng,
    roster: NpcRoster,
    roads: RoadRegistry,
    stats: GenerationStats,
}

impl Engine {
    pub fn new(settings: EngineSettings) -> Self {
        Self {
            transformer: CoordinateTransformer::new(
                settings.bbox,
                settings.width_chunks,
                settings.height_chunks,
            ),
            grid: TileGrid::new(settings.width_chunks, settings.height_chunks),
            rng: SessionRng::new(settings.seed),
            roster: NpcRoster::new(),
            roads: RoadRegistry::new(),
            stats: GenerationStats::default(),
        }
    }

    /// Apply features in order, then fill every unpainted tile with grass.
    /// Returns the counters for this run.
    pub fn run(&mut self, features: &[Feature]) -> GenerationStats {
        for feature in features {
            match &feature.geometry {
                Geometry::Point(point) => self.place_point(*point, feature),
                Geometry::Way { points, closed } => self.apply_way(points, *closed, feature),
            }
        }
        self.fill_default_terrain();

        info!(
            features = features.len(),
            chunks = self.grid.chunk_count(),
            objects = self.grid.object_count(),
            buildings = self.stats.buildings_processed,
            roads = self.stats.roads_processed,
            interiors = self.stats.interiors_generated,
            npcs = self.stats.npcs_placed,
            intersections = self.roads.intersections(),
            "generation complete"
        );
        self.stats
    }

    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    pub fn npcs(&self) -> &[NpcProfile] {
        self.roster.profiles()
    }

    pub fn roads(&self) -> &RoadRegistry {
        &self.roads
    }

    pub fn stats(&self) -> GenerationStats {
        self.stats
    }

    pub fn into_output(self) -> GenerationOutput {
        GenerationOutput {
            grid: self.grid,
            npcs: self.roster.into_profiles(),
            roads: self.roads,
            stats: self.stats,
        }
    }

    fn place_point(&mut self, point: GeoPoint, feature: &Feature) {
        let tile = self.transformer.transform_point(point);
        let objects = objects_for(&feature.tags);
        match self.rng.pick(objects.main_shapes()) {
            Some(shape) => self.grid.add_object(PlacedObject::new(shape, tile)),
            None => self.stats.features_skipped += 1,
        }
    }

    fn apply_way(&mut self, points: &[GeoPoint], closed: bool, feature: &Feature) {
        let tiles: Vec<TileCoord> = points
            .iter()
            .map(|p| self.transformer.transform_point(*p))
            .collect();
        if tiles.is_empty() {
            debug!("way skipped: no points");
            self.stats.features_skipped += 1;
            return;
        }

        match classify(&feature.tags, closed) {
            FeatureKind::Highway(highway) => self.highway(&highway, &tiles),
            FeatureKind::Building(building) => {
                let report = BuildingPlanner::new(&mut self.grid, &mut self.roster, &mut self.rng)
                    .build(&building, &tiles);
                match report {
                    Some(report) => {
                        self.stats.buildings_processed += 1;
                        if report.interior {
                            self.stats.interiors_generated += 1;
                        }
                        self.stats.npcs_placed += report.occupants.len() as u64;
                    }
                    None => self.stats.features_skipped += 1,
                }
            }
            FeatureKind::Area { terrain, closed } => self.area(feature, terrain, closed, &tiles),
            FeatureKind::Waterway(terrain) => {
                for segment in tiles.windows(2) {
                    raster::line_with_width(
                        &mut self.grid,
                        &mut self.rng,
                        segment[0],
                        segment[1],
                        terrain.ids(),
                        WATERWAY_WIDTH,
                    );
                }
            }
            FeatureKind::Barrier(kind) => self.barrier(kind, &tiles),
            FeatureKind::Unclassified => {
                debug!(points = tiles.len(), "way skipped: unclassified tags");
                self.stats.features_skipped += 1;
            }
        }
    }

    fn highway(&mut self, highway: &Highway, tiles: &[TileCoord]) {
        for segment in tiles.windows(2) {
            let swept = raster::swept_tiles(&self.grid, segment[0], segment[1], highway.width);
            if highway.bridge {
                self.bridge(segment[0], segment[1], &swept);
            } else {
                raster::paint(&mut self.grid, &mut self.rng, &swept, highway.terrain.ids());
            }
            self.roads.register_segment(&highway.kind, swept);
        }
        self.stats.roads_processed += 1;
    }

    /// Planking over the deck and a bridge object at both ends of the span.
    fn bridge(&mut self, start: TileCoord, end: TileCoord, deck: &[TileCoord]) {
        if start == end {
            return;
        }
        for tile in deck {
            if let Some(id) = self.rng.pick(TerrainKind::Planking.ids()) {
                self.grid.set_terrain(tile.x, tile.y, id);
            }
        }
        for tile in [start, end] {
            if let Some(shape) = self.rng.pick(ObjectKind::Bridge.shapes()) {
                self.grid.add_object(PlacedObject::new(shape, tile));
            }
        }
    }

    fn area(&mut self, feature: &Feature, terrain: TerrainKind, closed: bool, tiles: &[TileCoord]) {
        if closed && tiles.len() >= 3 {
            raster::polygon_fill(&mut self.grid, &mut self.rng, tiles, terrain.ids());
        } else {
            for segment in tiles.windows(2) {
                raster::line_with_width(
                    &mut self.grid,
                    &mut self.rng,
                    segment[0],
                    segment[1],
                    terrain.ids(),
                    1,
                );
            }
        }

        let objects = objects_for(&feature.tags);
        let shapes = objects.main_shapes();
        if shapes.is_empty() {
            return;
        }
        for tile in tiles.iter().step_by(AREA_SCATTER_STEP) {
            if let Some(shape) = self.rng.pick(shapes) {
                self.grid.add_object(PlacedObject::new(shape, *tile));
            }
        }
    }

    fn barrier(&mut self, kind: Option<ObjectKind>, tiles: &[TileCoord]) {
        let Some(kind) = kind else {
            return;
        };
        for segment in tiles.windows(2) {
            if segment[0] == segment[1] {
                continue;
            }
            for tile in raster::line_tiles(segment[0], segment[1]) {
                if let Some(shape) = self.rng.pick(kind.shapes()) {
                    self.grid.add_object(PlacedObject::new(shape, tile));
                }
            }
        }
    }

    fn fill_default_terrain(&mut self) {
        let grass = TerrainKind::Grass.ids();
        let rng = &mut self.rng;
        for cy in 0..self.grid.height_chunks() {
            for cx in 0..self.grid.width_chunks() {
                self.grid
                    .get_chunk(cx, cy)
                    .fill_unset(|| rng.pick(grass).unwrap_or(grass[0]));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::Tags;
    use crate::raster::RoadCategory;

    fn tags(pairs: &[(&str, &str)]) -> Tags {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn engine(seed: u64) -> Engine {
        Engine::new(EngineSettings {
            bbox: BoundingBox::new(0.0, 0.0, 1.0, 1.0),
            width_chunks: 2,
            height_chunks: 2,
            seed,
        })
    }

    fn way(points: &[(f64, f64)], closed: bool, pairs: &[(&str, &str)]) -> Feature {
        Feature::way(
            points.iter().map(|&(lon, lat)| GeoPoint::new(lon, lat)).collect(),
            closed,
            tags(pairs),
        )
    }

    #[test]
    fn empty_run_fills_world_with_grass() {
        let mut engine = engine(1);
        engine.run(&[]);
        assert_eq!(engine.grid().chunk_count(), 4);
        for y in 0..32 {
            for x in 0..32 {
                let id = engine.grid().terrain_at(x, y).expect("chunk");
                assert_eq!(TerrainKind::of_id(id), Some(TerrainKind::Grass));
            }
        }
    }

    #[test]
    fn crossing_highways_register_intersection() {
        let mut engine = engine(1);
        engine.run(&[
            way(&[(0.1, 0.5), (0.9, 0.5)], false, &[("highway", "primary")]),
            way(&[(0.5, 0.1), (0.5, 0.9)], false, &[("highway", "footway")]),
        ]);
        assert!(engine.roads().intersections() > 0);
        assert_eq!(engine.stats().roads_processed, 2);
        let centre = engine.grid().terrain_at(16, 16).expect("painted");
        assert_eq!(TerrainKind::of_id(centre), Some(TerrainKind::Sidewalk));
    }

    #[test]
    fn bent_highway_marks_its_joint() {
        let mut engine = engine(1);
        engine.run(&[way(
            &[(0.1, 0.5), (0.5, 0.5), (0.5, 0.1)],
            false,
            &[("highway", "service")],
        )]);
        assert_eq!(
            engine.roads().get(TileCoord::new(16, 16)),
            Some(&RoadCategory::Intersection)
        );
        assert_eq!(engine.roads().intersections(), 1);
    }

    #[test]
    fn bridge_places_planking_and_end_objects() {
        let mut engine = engine(2);
        engine.run(&[way(
            &[(0.2, 0.5), (0.8, 0.5)],
            false,
            &[("highway", "residential"), ("bridge", "yes")],
        )]);
        let deck = engine.grid().terrain_at(16, 16).expect("painted");
        assert_eq!(TerrainKind::of_id(deck), Some(TerrainKind::Planking));
        let bridges = ObjectKind::Bridge.shapes();
        let ends = engine
            .grid()
            .objects()
            .filter(|o| bridges.contains(&o.shape))
            .count();
        assert_eq!(ends, 2);
    }

    #[test]
    fn barrier_lines_get_objects() {
        let mut engine = engine(3);
        engine.run(&[way(&[(0.1, 0.5), (0.4, 0.5)], false, &[("barrier", "fence")])]);
        let fences = ObjectKind::Fence.shapes();
        assert!(engine.grid().objects().all(|o| fences.contains(&o.shape)));
        assert!(engine.grid().object_count() > 1);
    }

    #[test]
    fn tagged_point_places_one_object() {
        let mut engine = engine(4);
        engine.run(&[Feature::point(GeoPoint::new(0.5, 0.5), tags(&[("natural", "tree")]))]);
        assert_eq!(engine.grid().object_count(), 1);
        engine.run(&[Feature::point(GeoPoint::new(0.5, 0.5), tags(&[("name", "x")]))]);
        assert_eq!(engine.grid().object_count(), 1);
        assert_eq!(engine.stats().features_skipped, 1);
    }

    #[test]
    fn closed_area_fills_polygon() {
        let mut engine = engine(5);
        let square = [(0.2, 0.2), (0.8, 0.2), (0.8, 0.8), (0.2, 0.8), (0.2, 0.2)];
        engine.run(&[way(&square, true, &[("natural", "water")])]);
        let id = engine.grid().terrain_at(16, 16).expect("painted");
        assert_eq!(TerrainKind::of_id(id), Some(TerrainKind::Water));
        // five vertices, every third gets a wave object
        assert_eq!(engine.grid().object_count(), 2);
    }

    #[test]
    fn building_updates_stats() {
        let mut engine = engine(6);
        let square = [(0.2, 0.2), (0.8, 0.2), (0.8, 0.8), (0.2, 0.8), (0.2, 0.2)];
        engine.run(&[way(&square, true, &[("building", "house")])]);
        let stats = engine.stats();
        assert_eq!(stats.buildings_processed, 1);
        assert_eq!(stats.interiors_generated, 1);
        assert_eq!(stats.npcs_placed as usize, engine.npcs().len());
    }
}
