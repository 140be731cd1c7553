//! Accent color palette.
//!
//! A palette is built once at startup (from defaults or configuration) and
//! shared read-only by every recolor call.

use crate::error::{CodecError, CodecResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// An opaque RGB accent color. Serialized as `[r, g, b]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// The color at full opacity.
    pub fn opaque(self) -> [u8; 4] {
        [self.0, self.1, self.2, 255]
    }
}

/// Accent colors offered by the coverage map.
const DEFAULT_COLORS: [(&str, Rgb); 4] = [
    ("purple", Rgb(82, 82, 182)),
    ("green", Rgb(82, 182, 82)),
    ("yellow", Rgb(255, 222, 32)),
    ("gray", Rgb(111, 111, 111)),
];

/// Immutable mapping from color name to RGB.
///
/// Every name maps to a distinct color, so two names never produce the same
/// output tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, Rgb>", into = "BTreeMap<String, Rgb>")]
pub struct Palette {
    colors: BTreeMap<String, Rgb>,
}

impl Palette {
    /// Build a palette, rejecting empty palettes, blank names and duplicate colors.
    pub fn new<I, S>(entries: I) -> CodecResult<Self>
    where
        I: IntoIterator<Item = (S, Rgb)>,
        S: Into<String>,
    {
        let mut colors = BTreeMap::new();
        let mut seen = HashSet::new();

        for (name, rgb) in entries {
            let name = name.into();
            if name.trim().is_empty() {
                return Err(CodecError::InvalidPalette("color name must not be empty".to_string()));
            }
            if !seen.insert(rgb) {
                return Err(CodecError::InvalidPalette(format!(
                    "color {:?} for '{}' is already used by another name",
                    rgb, name
                )));
            }
            if colors.insert(name.clone(), rgb).is_some() {
                return Err(CodecError::InvalidPalette(format!(
                    "color name '{}' defined twice",
                    name
                )));
            }
        }

        if colors.is_empty() {
            return Err(CodecError::InvalidPalette("palette has no colors".to_string()));
        }

        Ok(Self { colors })
    }

    /// Look up a color by exact name.
    pub fn lookup(&self, name: &str) -> CodecResult<Rgb> {
        self.colors
            .get(name)
            .copied()
            .ok_or_else(|| CodecError::UnknownColor(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.colors.contains_key(name)
    }

    /// Color names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.colors.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Rgb)> {
        self.colors.iter().map(|(name, rgb)| (name.as_str(), *rgb))
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            colors: DEFAULT_COLORS
                .iter()
                .map(|(name, rgb)| (name.to_string(), *rgb))
                .collect(),
        }
    }
}

impl TryFrom<BTreeMap<String, Rgb>> for Palette {
    type Error = CodecError;

    fn try_from(colors: BTreeMap<String, Rgb>) -> CodecResult<Self> {
        Self::new(colors)
    }
}

impl From<Palette> for BTreeMap<String, Rgb> {
    fn from(palette: Palette) -> Self {
        palette.colors
    }
}
