use std::path::{Path, PathBuf};

use osm2world::{
    classify::TerrainKind,
    config::{ConfigLoader, GenerationConfig},
    engine::{Engine, EngineSettings, GenerationOutput},
    feature::{load_overpass_file, Feature},
    ireg::{group_records, RECORD_LEN},
    raster::point_in_polygon,
};

fn fixture_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("regions")
}

fn load_fixture() -> (GenerationConfig, Vec<Feature>) {
    let config = ConfigLoader::new(fixture_dir())
        .load("tiny_town.yaml")
        .expect("config parses");
    let features = load_overpass_file(&fixture_dir().join("tiny_town.json")).expect("features");
    (config, features)
}

fn generate(config: &GenerationConfig, features: &[Feature], seed: u64) -> GenerationOutput {
    let mut engine = Engine::new(EngineSettings {
        bbox: config.bbox,
        width_chunks: config.world.width_chunks,
        height_chunks: config.world.height_chunks,
        seed,
    });
    engine.run(features);
    engine.into_output()
}

#[test]
fn fixture_config_loads() {
    let (config, features) = load_fixture();
    assert_eq!(config.name, "tiny_town");
    assert_eq!(config.world.width_chunks, 4);
    // the way with unresolvable nodes is dropped, the untagged nodes are not features
    assert_eq!(features.len(), 14);
}

#[test]
fn same_seed_reproduces_object_streams() {
    let (config, features) = load_fixture();
    let seed = config.seed.value();
    let first = generate(&config, &features, seed);
    let second = generate(&config, &features, seed);

    assert_eq!(group_records(&first.grid), group_records(&second.grid));
    assert_eq!(first.npcs.len(), second.npcs.len());
    for (a, b) in first.npcs.iter().zip(&second.npcs) {
        assert_eq!(a.name, b.name);
        assert_eq!(a.tile, b.tile);
        assert_eq!(a.relationships, b.relationships);
    }
}

#[test]
fn different_seeds_change_terrain() {
    let (config, features) = load_fixture();
    let first = generate(&config, &features, 1);
    let second = generate(&config, &features, 2);

    let differs = (0..first.grid.height_tiles()).any(|y| {
        (0..first.grid.width_tiles())
            .any(|x| first.grid.terrain_at(x, y) != second.grid.terrain_at(x, y))
    });
    assert!(differs);
}

#[test]
fn every_tile_is_painted() {
    let (config, features) = load_fixture();
    let output = generate(&config, &features, 9);
    assert_eq!(output.grid.chunk_count(), 16);
    for y in 0..output.grid.height_tiles() {
        for x in 0..output.grid.width_tiles() {
            let id = output.grid.terrain_at(x, y).expect("in world");
            assert!(TerrainKind::of_id(id).is_some(), "tile ({x},{y}) = {id}");
        }
    }
}

#[test]
fn fixture_features_show_up() {
    let (config, features) = load_fixture();
    let output = generate(&config, &features, 3);

    // house, tavern and shop; the shed footprint is too small
    assert_eq!(output.stats.buildings_processed, 3);
    assert_eq!(output.stats.interiors_generated, 3);
    assert_eq!(output.stats.roads_processed, 3);
    assert!(output.roads.intersections() > 0);

    let pond = output.grid.terrain_at(17, 49).expect("pond");
    assert_eq!(TerrainKind::of_id(pond), Some(TerrainKind::Water));
    let floor = output.grid.terrain_at(14, 14).expect("house");
    assert_eq!(TerrainKind::of_id(floor), Some(TerrainKind::Floor));

    assert_eq!(output.stats.npcs_placed as usize, output.npcs.len());
    for profile in &output.npcs {
        for other in profile.relationships.keys() {
            let other = output
                .npcs
                .iter()
                .find(|p| p.id == *other)
                .expect("related NPC exists");
            assert_eq!(other.building_type, profile.building_type);
        }
    }
}

#[test]
fn records_are_fixed_width() {
    let (config, features) = load_fixture();
    let output = generate(&config, &features, 4);
    let streams = group_records(&output.grid);
    assert_eq!(streams.keys().copied().collect::<Vec<_>>(), vec![0]);
    let bytes = &streams[&0];
    assert_eq!(bytes.len(), output.grid.object_count() * RECORD_LEN);
    assert!(bytes.chunks(RECORD_LEN).all(|record| record[0] == 10));
}

#[test]
fn polygon_membership() {
    let square = [(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)];
    assert!(point_in_polygon(5.0, 5.0, &square));
    assert!(!point_in_polygon(15.0, 15.0, &square));
}
