//! Temporary on-disk tile trees laid out as `<threshold>/<z>/<x>/<y>.png`.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A tile tree in a temporary directory, removed on drop.
pub struct TempTileDir {
    dir: TempDir,
}

impl TempTileDir {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create temp tile dir"),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Path a tile would have under this root.
    pub fn tile_path(&self, threshold: &str, z: u32, x: u32, y: u32) -> PathBuf {
        self.root()
            .join(threshold)
            .join(z.to_string())
            .join(x.to_string())
            .join(format!("{}.png", y))
    }

    /// Write tile bytes, creating parent directories.
    pub fn write_tile(&self, threshold: &str, z: u32, x: u32, y: u32, bytes: &[u8]) -> PathBuf {
        let path = self.tile_path(threshold, z, x, y);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create tile dirs");
        }
        fs::write(&path, bytes).expect("write tile");
        path
    }
}

impl Default for TempTileDir {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_tile_layout() {
        let tiles = TempTileDir::new();
        let path = tiles.write_tile("100km", 6, 14, 23, b"png");
        assert!(path.ends_with("100km/6/14/23.png"));
        assert_eq!(fs::read(path).unwrap(), b"png");
    }
}
