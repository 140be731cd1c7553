//! Filesystem-backed tile store.

use crate::TileStore;
use coverage_common::{StoreError, StoreResult, TileAddress};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// Tiles stored under a root directory as `<threshold>/<z>/<x>/<y>.png`.
#[derive(Debug, Clone)]
pub struct FilesystemTileStore {
    root: PathBuf,
}

impl FilesystemTileStore {
    /// Open a store rooted at `root`, which must be an existing directory.
    pub fn new(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(StoreError::RootNotFound(root.display().to_string()));
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path of a tile, whether or not it exists.
    pub fn tile_path(&self, address: &TileAddress) -> PathBuf {
        self.root.join(address.relative_path())
    }
}

impl TileStore for FilesystemTileStore {
    #[instrument(skip(self), fields(tile = %address))]
    fn get(&self, address: &TileAddress) -> StoreResult<Option<Vec<u8>>> {
        let path = self.tile_path(address);
        match fs::read(&path) {
            Ok(bytes) => {
                debug!(bytes = bytes.len(), "Read tile");
                Ok(Some(bytes))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "Tile not found");
                Ok(None)
            }
            Err(e) => Err(StoreError::ReadError(format!("{}: {}", path.display(), e))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::TempTileDir;

    #[test]
    fn test_get_existing_tile() {
        let tiles = TempTileDir::new();
        tiles.write_tile("3k_tiles", 7, 30, 47, b"tile-bytes");

        let store = FilesystemTileStore::new(tiles.root()).unwrap();
        let addr = TileAddress::new("3k_tiles", 7, 30, 47).unwrap();
        assert_eq!(store.get(&addr).unwrap(), Some(b"tile-bytes".to_vec()));
        assert!(store.tile_path(&addr).ends_with("3k_tiles/7/30/47.png"));
    }

    #[test]
    fn test_missing_tile_is_none() {
        let tiles = TempTileDir::new();
        let store = FilesystemTileStore::new(tiles.root()).unwrap();

        let addr = TileAddress::new("6k_tiles", 5, 1, 2).unwrap();
        assert_eq!(store.get(&addr).unwrap(), None);
    }

    #[test]
    fn test_missing_root_is_error() {
        let tiles = TempTileDir::new();
        let missing = tiles.root().join("nope");
        assert!(matches!(
            FilesystemTileStore::new(missing),
            Err(StoreError::RootNotFound(_))
        ));
    }

    #[test]
    fn test_directory_in_place_of_tile_is_read_error() {
        let tiles = TempTileDir::new();
        let path = tiles.tile_path("100km", 1, 0, 0);
        fs::create_dir_all(&path).unwrap();

        let store = FilesystemTileStore::new(tiles.root()).unwrap();
        let addr = TileAddress::new("100km", 1, 0, 0).unwrap();
        assert!(matches!(store.get(&addr), Err(StoreError::ReadError(_))));
    }
}
