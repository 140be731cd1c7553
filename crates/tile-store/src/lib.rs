//! Storage for pre-rendered coverage tiles.
//!
//! Provides:
//! - `TileStore`, the lookup interface used by the recolor front ends
//! - `FilesystemTileStore` for tile trees laid out as `<threshold>/<z>/<x>/<y>.png`
//! - `CachedTileStore`, an in-memory LRU in front of any store

pub mod cache;
pub mod filesystem;

pub use cache::{CacheStats, CachedTileStore};
pub use filesystem::FilesystemTileStore;

use coverage_common::{StoreResult, TileAddress};

/// Source of raw tile bytes.
///
/// `Ok(None)` means the tile does not exist; errors are reserved for
/// failures reading a tile that should be readable.
pub trait TileStore: Send + Sync {
    fn get(&self, address: &TileAddress) -> StoreResult<Option<Vec<u8>>>;
}

impl<S: TileStore + ?Sized> TileStore for std::sync::Arc<S> {
    fn get(&self, address: &TileAddress) -> StoreResult<Option<Vec<u8>>> {
        (**self).get(address)
    }
}
