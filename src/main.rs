//! # Roomweave Command Line
//!
//! Generates one level and prints it as ASCII art or JSON.

use clap::{Parser, ValueEnum};
use log::{error, info};
use roomweave::{
    generation::utils::create_rng, AsciiRenderer, ClutterLibrary, CompositeGrid, GeneratedLevel,
    GenerationConfig, LevelGenerator, RecordingSpawner, RoomweaveError, RoomweaveResult,
    TemplateStore, Theme,
};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Tile map with props and spawn point
    Ascii,
    /// Slot overview with open edges and the path
    Layout,
    /// Full generation summary
    Json,
}

/// Command line arguments for the level generator.
#[derive(Parser, Debug)]
#[command(name = "roomweave")]
#[command(about = "Procedural 2D levels from connected room templates")]
#[command(version)]
struct Args {
    /// Random seed; overrides the configuration file
    #[arg(short, long)]
    seed: Option<u64>,

    /// JSON generation configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory of template CSV files; built-in templates when omitted
    #[arg(short, long)]
    templates: Option<PathBuf>,

    /// JSON clutter library; built-in props when omitted
    #[arg(long)]
    clutter: Option<PathBuf>,

    /// Theme to generate; overrides the configuration file
    #[arg(long)]
    theme: Option<String>,

    /// Skip the clutter pass
    #[arg(long)]
    no_clutter: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "ascii")]
    format: OutputFormat,

    /// Log filter (error, warn, info, debug, trace); falls back to RUST_LOG, then info
    #[arg(long)]
    log_level: Option<String>,
}

#[derive(Serialize)]
struct Report<'a> {
    seed: u64,
    theme: &'a Theme,
    level: &'a GeneratedLevel,
    rows: Vec<String>,
}

fn main() {
    let args = Args::parse();
    initialize_logging(args.log_level.as_deref());

    if let Err(e) = run(&args) {
        error!("{}", e);
        std::process::exit(1);
    }
}

const DEFAULT_LOG_FILTER: &str = "info";

fn initialize_logging(log_level: Option<&str>) {
    let env_filter = std::env::var(env_logger::DEFAULT_FILTER_ENV).ok();
    env_logger::Builder::new()
        .parse_filters(&log_filter(log_level, env_filter.as_deref()))
        .format_target(false)
        .init();
}

/// An explicit `--log-level` wins over `RUST_LOG`, which wins over the default.
fn log_filter(cli: Option<&str>, env: Option<&str>) -> String {
    cli.or(env.filter(|f| !f.trim().is_empty()))
        .unwrap_or(DEFAULT_LOG_FILTER)
        .to_string()
}

fn run(args: &Args) -> RoomweaveResult<()> {
    info!("Starting Roomweave v{}", roomweave::VERSION);

    let config = load_config(args)?;
    let templates = match &args.templates {
        Some(dir) => TemplateStore::load_dir(dir)?,
        None => TemplateStore::builtin(),
    };
    if templates.is_empty() {
        return Err(RoomweaveError::InvalidConfig(
            "no room templates were loaded".to_string(),
        ));
    }
    let clutter = match &args.clutter {
        Some(path) => ClutterLibrary::from_json_file(path)?,
        None => ClutterLibrary::builtin(),
    };

    let seed = config.seed;
    let mut rng = create_rng(&config);
    let mut generator = LevelGenerator::new(config, templates, clutter)?;
    let mut surface = CompositeGrid::new(0, 0);
    let mut spawner = RecordingSpawner::new();

    let level = generator.generate(&mut surface, &mut spawner, &mut rng)?;

    let renderer = AsciiRenderer::new();
    match args.format {
        OutputFormat::Ascii => {
            print!(
                "{}",
                renderer.render_surface(&surface, &level.clutter, level.spawn_point)
            );
        }
        OutputFormat::Layout => print!("{}", renderer.render_layout(&level.layout)),
        OutputFormat::Json => {
            let rows = renderer
                .render_surface(&surface, &level.clutter, level.spawn_point)
                .lines()
                .map(str::to_string)
                .collect();
            let report = Report {
                seed,
                theme: &generator.config().theme,
                level: &level,
                rows,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

fn load_config(args: &Args) -> RoomweaveResult<GenerationConfig> {
    let mut config = match &args.config {
        Some(path) => GenerationConfig::from_json_file(path)?,
        None => GenerationConfig::new(rand::random()),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(theme) = &args.theme {
        config.theme = Theme::new(theme.as_str());
    }
    if args.no_clutter {
        config.spawn_clutter = false;
    }
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_filter_precedence() {
        assert_eq!(log_filter(None, None), "info");
        assert_eq!(log_filter(None, Some("debug")), "debug");
        assert_eq!(log_filter(None, Some("  ")), "info");
        assert_eq!(log_filter(Some("warn"), Some("debug")), "warn");
        assert_eq!(
            log_filter(None, Some("roomweave=trace")),
            "roomweave=trace"
        );
    }

    #[test]
    fn test_log_level_flag_is_optional() {
        let args = Args::parse_from(["roomweave", "--seed", "3"]);
        assert!(args.log_level.is_none());
        assert_eq!(args.seed, Some(3));

        let args = Args::parse_from(["roomweave", "--log-level", "debug"]);
        assert_eq!(args.log_level.as_deref(), Some("debug"));
    }
}
