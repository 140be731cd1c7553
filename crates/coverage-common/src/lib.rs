//! Common types shared across the coverage tile crates.

pub mod error;
pub mod tile;

pub use error::{StoreError, StoreResult};
pub use tile::{TileAddress, TileCoord};
