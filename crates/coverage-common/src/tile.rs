//! Tile addressing for pre-rendered coverage tiles.
//!
//! Coverage tiles are stored per threshold layer (e.g. `3k_tiles`, `100km`)
//! and then by XYZ tile coordinate.

use crate::{StoreError, StoreResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// A tile coordinate (z/x/y).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileCoord {
    /// Zoom level
    pub z: u32,
    /// Column (x)
    pub x: u32,
    /// Row (y)
    pub y: u32,
}

impl TileCoord {
    pub fn new(z: u32, x: u32, y: u32) -> Self {
        Self { z, x, y }
    }

    /// Check that x and y fit inside the 2^z x 2^z grid of this zoom level.
    pub fn validate(&self) -> StoreResult<()> {
        if self.z >= 32 {
            return Err(StoreError::InvalidCoord {
                z: self.z,
                x: self.x,
                y: self.y,
                message: "zoom level out of range".to_string(),
            });
        }
        let tiles_per_side = 1u64 << self.z;
        if u64::from(self.x) >= tiles_per_side || u64::from(self.y) >= tiles_per_side {
            return Err(StoreError::InvalidCoord {
                z: self.z,
                x: self.x,
                y: self.y,
                message: format!("column/row must be below {}", tiles_per_side),
            });
        }
        Ok(())
    }

    /// Generate a cache key string.
    pub fn cache_key(&self) -> String {
        format!("{}/{}/{}", self.z, self.x, self.y)
    }
}

/// Full address of a coverage tile: threshold layer plus tile coordinate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawTileAddress")]
pub struct TileAddress {
    threshold: String,
    coord: TileCoord,
}

/// Unvalidated wire form of `TileAddress`.
#[derive(Deserialize)]
struct RawTileAddress {
    threshold: String,
    coord: TileCoord,
}

impl TryFrom<RawTileAddress> for TileAddress {
    type Error = StoreError;

    fn try_from(raw: RawTileAddress) -> StoreResult<Self> {
        let RawTileAddress { threshold, coord } = raw;
        Self::new(threshold, coord.z, coord.x, coord.y)
    }
}

impl TileAddress {
    /// Build a validated address.
    ///
    /// The threshold label becomes a directory name, so it is restricted to
    /// `[A-Za-z0-9_.-]` and may not be `.` or `..`.
    pub fn new(threshold: impl Into<String>, z: u32, x: u32, y: u32) -> StoreResult<Self> {
        let threshold = threshold.into();
        validate_threshold(&threshold)?;
        let coord = TileCoord::new(z, x, y);
        coord.validate()?;
        Ok(Self { threshold, coord })
    }

    pub fn threshold(&self) -> &str {
        &self.threshold
    }

    pub fn coord(&self) -> TileCoord {
        self.coord
    }

    /// Relative path of the tile file: `<threshold>/<z>/<x>/<y>.png`.
    pub fn relative_path(&self) -> PathBuf {
        let mut path = PathBuf::from(&self.threshold);
        path.push(self.coord.z.to_string());
        path.push(self.coord.x.to_string());
        path.push(format!("{}.png", self.coord.y));
        path
    }
}

impl fmt::Display for TileAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.threshold, self.coord.cache_key())
    }
}

fn validate_threshold(label: &str) -> StoreResult<()> {
    let invalid = |message: &str| StoreError::InvalidThreshold {
        label: label.to_string(),
        message: message.to_string(),
    };

    if label.is_empty() {
        return Err(invalid("must not be empty"));
    }
    if label == "." || label == ".." {
        return Err(invalid("must not be a relative directory"));
    }
    if !label
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
    {
        return Err(invalid("only ASCII letters, digits, '_', '-' and '.' are allowed"));
    }
    Ok(())
}
