use std::{
    fmt, fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::geo::BoundingBox;
use crate::ireg::WriteMode;
use crate::rng::seed_from_text;

fn default_chunks() -> u32 {
    16
}

/// Reproducibility seed: an integer, or any text hashed to one. Negative
/// integers keep their two's complement bits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Seed {
    Number(i64),
    Text(String),
}

impl Seed {
    pub fn value(&self) -> u64 {
        match self {
            Seed::Number(value) => *value as u64,
            Seed::Text(text) => seed_from_text(text),
        }
    }
}

impl Default for Seed {
    fn default() -> Self {
        Seed::Number(0)
    }
}

impl fmt::Display for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Seed::Number(value) => write!(f, "{value}"),
            Seed::Text(text) => f.write_str(text),
        }
    }
}

impl From<&str> for Seed {
    fn from(value: &str) -> Self {
        match value.trim().parse::<i64>() {
            Ok(number) => Seed::Number(number),
            Err(_) => Seed::Text(value.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldSize {
    #[serde(default = "default_chunks")]
    pub width_chunks: u32,
    #[serde(default = "default_chunks")]
    pub height_chunks: u32,
}

impl Default for WorldSize {
    fn default() -> Self {
        Self {
            width_chunks: default_chunks(),
            height_chunks: default_chunks(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default)]
    pub ireg_mode: WriteMode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    pub name: String,
    pub bbox: BoundingBox,
    #[serde(default)]
    pub world: WorldSize,
    #[serde(default)]
    pub seed: Seed,
    #[serde(default)]
    pub export: ExportConfig,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid bounding box: {0}")]
    BoundingBox(String),
    #[error("world size must be at least one chunk on each axis (got {width}x{height})")]
    EmptyWorld { width: u32, height: u32 },
    #[error("expected {expected} comma-separated numbers for {what}, got '{value}'")]
    Tuple {
        what: &'static str,
        expected: usize,
        value: String,
    },
}

impl GenerationConfig {
    pub fn new(name: impl Into<String>, bbox: BoundingBox) -> Self {
        Self {
            name: name.into(),
            bbox,
            world: WorldSize::default(),
            seed: Seed::default(),
            export: ExportConfig::default(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_bbox(&self.bbox)?;
        if self.world.width_chunks == 0 || self.world.height_chunks == 0 {
            return Err(ConfigError::EmptyWorld {
                width: self.world.width_chunks,
                height: self.world.height_chunks,
            });
        }
        Ok(())
    }
}

/// Finite and not inverted. A zero span on an axis is allowed.
pub fn validate_bbox(bbox: &BoundingBox) -> Result<(), ConfigError> {
    let values = [bbox.min_lon, bbox.min_lat, bbox.max_lon, bbox.max_lat];
    if values.iter().any(|v| !v.is_finite()) {
        return Err(ConfigError::BoundingBox(format!(
            "non-finite coordinate in {values:?}"
        )));
    }
    if bbox.min_lon > bbox.max_lon || bbox.min_lat > bbox.max_lat {
        return Err(ConfigError::BoundingBox(format!(
            "minimum exceeds maximum in {values:?}"
        )));
    }
    Ok(())
}

fn parse_numbers<T: std::str::FromStr>(
    value: &str,
    what: &'static str,
    expected: usize,
) -> Result<Vec<T>, ConfigError> {
    let err = || ConfigError::Tuple {
        what,
        expected,
        value: value.to_string(),
    };
    let parsed = value
        .split(',')
        .map(|part| part.trim().parse::<T>().map_err(|_| err()))
        .collect::<Result<Vec<T>, ConfigError>>()?;
    if parsed.len() != expected {
        return Err(err());
    }
    Ok(parsed)
}

/// `min_lon,min_lat,max_lon,max_lat`
pub fn parse_bbox(value: &str) -> Result<BoundingBox, ConfigError> {
    let v = parse_numbers::<f64>(value, "bbox", 4)?;
    let bbox = BoundingBox::new(v[0], v[1], v[2], v[3]);
    validate_bbox(&bbox)?;
    Ok(bbox)
}

/// `lon,lat`
pub fn parse_center(value: &str) -> Result<(f64, f64), ConfigError> {
    let v = parse_numbers::<f64>(value, "center", 2)?;
    Ok((v[0], v[1]))
}

/// `width,height` in chunks
pub fn parse_size(value: &str) -> Result<WorldSize, ConfigError> {
    let v = parse_numbers::<u32>(value, "size", 2)?;
    Ok(WorldSize {
        width_chunks: v[0],
        height_chunks: v[1],
    })
}

pub struct ConfigLoader {
    base_dir: PathBuf,
}

impl ConfigLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<GenerationConfig> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: GenerationConfig = serde_yaml::from_str(&data)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid config {}", path.display()))?;
        Ok(config)
    }
}
