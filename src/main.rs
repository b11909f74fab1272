use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use osm2world::{
    config::{parse_bbox, parse_center, parse_size, ConfigLoader, GenerationConfig, Seed},
    engine::{Engine, EngineSettings},
    export::{Exporter, Summary},
    feature::load_overpass_file,
    geo::BoundingBox,
    ireg::WriteMode,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    All,
    Ireg,
    Text,
    Json,
    Geojson,
}

#[derive(Debug, Parser)]
#[command(author, version, about = "Convert an Overpass feature dump into a tile world")]
struct Cli {
    /// Generation config YAML
    #[arg(long)]
    config: Option<PathBuf>,

    /// Overpass JSON dump with the region's features
    #[arg(long)]
    features: PathBuf,

    /// Bounding box as min_lon,min_lat,max_lon,max_lat
    #[arg(long, allow_hyphen_values = true, conflicts_with = "center")]
    bbox: Option<String>,

    /// Centre point as lon,lat; the box spans --radius metres around it
    #[arg(long, allow_hyphen_values = true)]
    center: Option<String>,

    /// Radius in metres around --center
    #[arg(long, default_value_t = 500.0)]
    radius: f64,

    /// World size in chunks as width,height
    #[arg(long)]
    size: Option<String>,

    /// Seed, either an integer or any text
    #[arg(long, allow_hyphen_values = true)]
    seed: Option<String>,

    /// Output directory
    #[arg(long, default_value = "output")]
    output: PathBuf,

    #[arg(long, value_enum, default_value_t = OutputFormat::All)]
    format: OutputFormat,

    /// Append to existing object streams instead of replacing them
    #[arg(long)]
    append: bool,
}

fn resolve_config(cli: &Cli) -> Result<GenerationConfig> {
    let bbox_override = match (&cli.bbox, &cli.center) {
        (Some(bbox), _) => Some(parse_bbox(bbox)?),
        (None, Some(center)) => {
            let (lon, lat) = parse_center(center)?;
            Some(BoundingBox::around(lon, lat, cli.radius))
        }
        (None, None) => None,
    };

    let mut config = match (&cli.config, bbox_override) {
        (Some(path), bbox) => {
            let mut config = ConfigLoader::new(".").load(path)?;
            if let Some(bbox) = bbox {
                config.bbox = bbox;
            }
            config
        }
        (None, Some(bbox)) => GenerationConfig::new("region", bbox),
        (None, None) => bail!("one of --config, --bbox or --center is required"),
    };

    if let Some(size) = &cli.size {
        config.world = parse_size(size)?;
    }
    if let Some(seed) = &cli.seed {
        config.seed = Seed::from(seed.as_str());
    }
    if cli.append {
        config.export.ireg_mode = WriteMode::Append;
    }
    config.validate()?;
    Ok(config)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let cli = Cli::parse();
    let config = resolve_config(&cli)?;
    let features = load_overpass_file(&cli.features)?;
    info!(
        name = %config.name,
        features = features.len(),
        width = config.world.width_chunks,
        height = config.world.height_chunks,
        seed = %config.seed,
        "starting generation"
    );

    let mut engine = Engine::new(EngineSettings {
        bbox: config.bbox,
        width_chunks: config.world.width_chunks,
        height_chunks: config.world.height_chunks,
        seed: config.seed.value(),
    });
    let stats = engine.run(&features);
    if stats.features_skipped > 0 {
        info!(skipped = stats.features_skipped, "some features could not be placed");
    }
    let output = engine.into_output();

    let exporter = Exporter::new(&cli.output)?;
    let format = cli.format;
    if matches!(format, OutputFormat::All | OutputFormat::Ireg) {
        exporter.write_ireg(&output.grid, config.export.ireg_mode)?;
    }
    if matches!(format, OutputFormat::All | OutputFormat::Text) {
        exporter.write_terrain_map(&output.grid)?;
    }
    if matches!(format, OutputFormat::All | OutputFormat::Geojson) {
        exporter.write_geojson(&output.grid)?;
    }
    if matches!(format, OutputFormat::All | OutputFormat::Json) {
        exporter.write_npc_profiles(&output.npcs)?;
        let summary = Summary::from_output(&config.name, &output, &config.seed.to_string());
        exporter.write_summary(&summary)?;
    }

    info!(output = %exporter.output_dir().display(), "done");
    Ok(())
}
