//! A single recolor request and its execution against a tile store.

use anyhow::{anyhow, bail, Context, Result};
use coverage_common::TileAddress;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::str::FromStr;
use tile_codec::{recolor_png_with, Palette, RecolorOptions};
use tile_store::TileStore;
use tracing::{error, info, instrument};

/// Where a recolored tile is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    Stdout,
    File(PathBuf),
}

impl Output {
    pub fn parse(value: &str) -> Self {
        if value == "-" {
            Output::Stdout
        } else {
            Output::File(PathBuf::from(value))
        }
    }

    fn write(&self, bytes: &[u8]) -> Result<()> {
        match self {
            Output::Stdout => {
                let mut stdout = io::stdout().lock();
                stdout.write_all(bytes)?;
                stdout.flush()?;
            }
            Output::File(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    fs::create_dir_all(parent)
                        .with_context(|| format!("Failed to create {}", parent.display()))?;
                }
                fs::write(path, bytes)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct RecolorJob {
    pub address: TileAddress,
    pub color: String,
    pub output: Output,
}

/// Parse `<threshold>/<z>/<x>/<y>` into a validated address.
pub fn parse_address(value: &str) -> Result<TileAddress> {
    let parts: Vec<&str> = value.trim_end_matches(".png").split('/').collect();
    let [threshold, z, x, y] = parts.as_slice() else {
        bail!("Expected <threshold>/<z>/<x>/<y>, got '{}'", value);
    };
    let number = |name: &str, s: &str| -> Result<u32> {
        s.parse()
            .with_context(|| format!("Invalid {} '{}' in '{}'", name, s, value))
    };
    Ok(TileAddress::new(
        *threshold,
        number("z", *z)?,
        number("x", *x)?,
        number("y", *y)?,
    )?)
}

/// Batch lines read `<threshold>/<z>/<x>/<y> <color> <output-file>`.
impl FromStr for RecolorJob {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        let [address, color, output] = fields.as_slice() else {
            bail!("Expected '<threshold>/<z>/<x>/<y> <color> <output>', got '{}'", line);
        };
        let output = Output::parse(output);
        if output == Output::Stdout {
            bail!("Batch jobs must write to a file, got '-'");
        }
        Ok(Self {
            address: parse_address(address)?,
            color: color.to_string(),
            output,
        })
    }
}

/// Fetch, recolor and write one tile.
///
/// The color is checked against the palette before the store is touched.
#[instrument(skip_all, fields(tile = %job.address, color = %job.color))]
pub fn run_job(
    store: &dyn TileStore,
    palette: &Palette,
    options: &RecolorOptions,
    job: &RecolorJob,
) -> Result<usize> {
    palette.lookup(&job.color)?;

    let source = store
        .get(&job.address)?
        .ok_or_else(|| anyhow!("Tile not found: {}", job.address))?;

    let recolored = recolor_png_with(&source, &job.color, palette, options)
        .with_context(|| format!("Failed to recolor {}", job.address))?;
    job.output.write(&recolored)?;

    info!(bytes = recolored.len(), "Wrote recolored tile");
    Ok(recolored.len())
}

/// Summary of a batch run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchReport {
    pub succeeded: usize,
    pub failed: usize,
}

/// Run every job in `reader`, one per line.
///
/// Blank lines and `#` comments are skipped. A failing job is logged and
/// does not stop the batch.
pub fn run_batch<R: BufRead>(
    reader: R,
    store: &dyn TileStore,
    palette: &Palette,
    options: &RecolorOptions,
) -> Result<BatchReport> {
    let mut report = BatchReport::default();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let outcome = line
            .parse::<RecolorJob>()
            .and_then(|job| run_job(store, palette, options, &job));
        match outcome {
            Ok(_) => report.succeeded += 1,
            Err(e) => {
                let message = format!("{:#}", e);
                error!(line = index + 1, error = %message, "Batch job failed");
                report.failed += 1;
            }
        }
    }

    Ok(report)
}
