//! Configuration for the recolor tool.
//!
//! Values come from an optional YAML file; command-line flags override them.
//!
//! ```yaml
//! tiles_root: /srv/coverage
//! verify_crc: true
//! compression_level: 6
//! cache_capacity: 256
//! palette:
//!   purple: [82, 82, 182]
//!   green: [82, 182, 82]
//! ```

use anyhow::{bail, Context, Result};
use flate2::Compression;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tile_codec::{DecodeOptions, EncodeOptions, Palette, RecolorOptions};

fn default_verify_crc() -> bool {
    true
}

fn default_compression_level() -> u32 {
    6
}

fn default_cache_capacity() -> usize {
    256
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecolorConfig {
    /// Root of the `<threshold>/<z>/<x>/<y>.png` tile tree.
    #[serde(default)]
    pub tiles_root: Option<PathBuf>,

    /// Named accent colors. Defaults to the built-in four.
    #[serde(default)]
    pub palette: Palette,

    #[serde(default = "default_verify_crc")]
    pub verify_crc: bool,

    /// zlib level for re-encoded tiles (0-9).
    #[serde(default = "default_compression_level")]
    pub compression_level: u32,

    /// Source tiles kept in memory during batch runs.
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
}

impl Default for RecolorConfig {
    fn default() -> Self {
        Self {
            tiles_root: None,
            palette: Palette::default(),
            verify_crc: default_verify_crc(),
            compression_level: default_compression_level(),
            cache_capacity: default_cache_capacity(),
        }
    }
}

impl RecolorConfig {
    /// Load and validate a YAML configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        Self::from_yaml(&content)
            .with_context(|| format!("Invalid config: {}", path.display()))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.compression_level > 9 {
            bail!(
                "compression_level must be between 0 and 9, got {}",
                self.compression_level
            );
        }
        Ok(())
    }

    /// Apply command-line overrides on top of file values.
    pub fn apply_overrides(&mut self, tiles_root: Option<PathBuf>, no_verify_crc: bool) {
        if let Some(root) = tiles_root {
            self.tiles_root = Some(root);
        }
        if no_verify_crc {
            self.verify_crc = false;
        }
    }

    pub fn tiles_root(&self) -> Result<&Path> {
        match &self.tiles_root {
            Some(root) => Ok(root),
            None => bail!("No tile root configured (use --tiles-root, TILE_ROOT or tiles_root)"),
        }
    }

    pub fn recolor_options(&self) -> RecolorOptions {
        RecolorOptions {
            decode: DecodeOptions {
                verify_crc: self.verify_crc,
            },
            encode: EncodeOptions {
                compression: Compression::new(self.compression_level),
            },
        }
    }
}
