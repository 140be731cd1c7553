//! Coverage tile recolor tool.
//!
//! Reads a pre-rendered coverage tile from the tile tree, paints its
//! coverage pixels with a named accent color and writes the result. Batch
//! mode reads many requests from a file and shares an in-memory tile cache.

mod config;
mod job;

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use config::RecolorConfig;
use coverage_common::TileAddress;
use job::{run_batch, run_job, Output, RecolorJob};
use tile_store::{CachedTileStore, FilesystemTileStore};

#[derive(Parser, Debug)]
#[command(name = "recolor")]
#[command(about = "Recolor coverage tiles with a named accent color")]
struct Args {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Root of the <threshold>/<z>/<x>/<y>.png tile tree
    #[arg(long, env = "TILE_ROOT")]
    tiles_root: Option<PathBuf>,

    /// Threshold label (e.g. 3k_tiles, 100km)
    #[arg(long, required_unless_present = "batch")]
    threshold: Option<String>,

    /// Zoom level
    #[arg(long, required_unless_present = "batch")]
    z: Option<u32>,

    /// Tile column
    #[arg(long, required_unless_present = "batch")]
    x: Option<u32>,

    /// Tile row
    #[arg(long, required_unless_present = "batch")]
    y: Option<u32>,

    /// Accent color name
    #[arg(long, required_unless_present = "batch")]
    color: Option<String>,

    /// Output file, or - for stdout
    #[arg(short, long, default_value = "-")]
    output: String,

    /// File of "<threshold>/<z>/<x>/<y> <color> <output>" lines, or - for stdin
    #[arg(long, conflicts_with_all = ["threshold", "z", "x", "y", "color"])]
    batch: Option<String>,

    /// Skip CRC verification of input chunks
    #[arg(long)]
    no_verify_crc: bool,

    /// Log level (overridden by RUST_LOG)
    #[arg(long, default_value = "info", env = "LOG_LEVEL")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,
}

fn init_tracing(args: &Args) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    // stdout may carry tile bytes
    let builder = fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(true);

    if args.log_json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    init_tracing(&args);

    let mut config = match &args.config {
        Some(path) => RecolorConfig::load(path)?,
        None => RecolorConfig::default(),
    };
    config.apply_overrides(args.tiles_root.clone(), args.no_verify_crc);

    let palette = &config.palette;
    let options = config.recolor_options();
    let store = FilesystemTileStore::new(config.tiles_root()?)?;

    info!(
        root = %store.root().display(),
        colors = ?palette.names().collect::<Vec<_>>(),
        verify_crc = config.verify_crc,
        "Starting coverage recolor"
    );

    if let Some(batch) = &args.batch {
        let cached = CachedTileStore::new(store, config.cache_capacity);
        let report = if batch == "-" {
            run_batch(io::stdin().lock(), &cached, palette, &options)?
        } else {
            let file = File::open(batch)
                .with_context(|| format!("Failed to open batch file: {}", batch))?;
            run_batch(BufReader::new(file), &cached, palette, &options)?
        };

        let stats = cached.stats();
        info!(
            succeeded = report.succeeded,
            failed = report.failed,
            cache_hit_rate = stats.hit_rate(),
            "Batch complete"
        );
        if report.failed > 0 {
            bail!("{} of {} batch jobs failed", report.failed, report.failed + report.succeeded);
        }
        return Ok(());
    }

    // clap guarantees these when --batch is absent
    let (Some(threshold), Some(z), Some(x), Some(y), Some(color)) =
        (&args.threshold, args.z, args.x, args.y, &args.color)
    else {
        bail!("--threshold, --z, --x, --y and --color are required without --batch");
    };

    let job = RecolorJob {
        address: TileAddress::new(threshold.as_str(), z, x, y)?,
        color: color.clone(),
        output: Output::parse(&args.output),
    };
    run_job(&store, palette, &options, &job)?;

    Ok(())
}
