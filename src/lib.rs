pub mod building;
pub mod classify;
pub mod config;
pub mod engine;
pub mod export;
pub mod feature;
pub mod geo;
pub mod ireg;
pub mod npc;
pub mod raster;
pub mod rng;
pub mod world;

pub use config::{ConfigLoader, GenerationConfig, Seed};
pub use engine::{Engine, EngineSettings, GenerationOutput, GenerationStats};
pub use feature::{load_overpass, Feature, Geometry};
