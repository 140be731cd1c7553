//! Shared test utilities for the coverage tile workspace.
//!
//! This crate provides common testing infrastructure including:
//! - A PNG tile builder that can apply any scanline filter per row
//! - Pixel pattern generators for coverage-like tiles
//! - Fixture constants (ancillary chunks, accent colors)
//! - Temporary on-disk tile trees
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Then import in your tests:
//!
//! ```ignore
//! use test_utils::{CoverageTileBuilder, fixtures};
//! ```

pub mod builder;
pub mod fixtures;
pub mod generators;
pub mod tile_dir;

// Re-export commonly used items at the crate root
pub use builder::*;
pub use generators::*;
pub use tile_dir::*;

/// Assert that a PNG buffer starts with the PNG signature.
#[macro_export]
macro_rules! assert_png_signature {
    ($png:expr) => {{
        let png: &[u8] = &$png;
        assert!(
            png.len() >= 8 && png[..8] == $crate::fixtures::PNG_SIGNATURE,
            "buffer does not start with the PNG signature: {:?}",
            &png[..png.len().min(8)]
        );
    }};
}
