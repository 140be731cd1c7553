//! Common test fixtures for coverage tile tests.

/// PNG file signature.
pub const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

/// Red channel value marking covered pixels in source tiles.
pub const SENTINEL_RED: u8 = 220;

/// A covered pixel as produced by the upstream tile generator.
pub const COVERED: [u8; 4] = [SENTINEL_RED, 0, 0, 255];

/// An uncovered, fully transparent source pixel.
pub const UNCOVERED: [u8; 4] = [0, 0, 0, 0];

/// Accent colors the service ships with.
pub mod colors {
    pub const PURPLE: (&str, [u8; 3]) = ("purple", [82, 82, 182]);
    pub const GREEN: (&str, [u8; 3]) = ("green", [82, 182, 82]);
    pub const YELLOW: (&str, [u8; 3]) = ("yellow", [255, 222, 32]);
    pub const GRAY: (&str, [u8; 3]) = ("gray", [111, 111, 111]);

    pub const ALL: [(&str, [u8; 3]); 4] = [PURPLE, GREEN, YELLOW, GRAY];
}

/// Ancillary chunks as written by common raster tools.
pub mod ancillary {
    /// gAMA: gamma 1/2.2
    pub fn gama() -> ([u8; 4], Vec<u8>) {
        (*b"gAMA", 45455u32.to_be_bytes().to_vec())
    }

    /// pHYs: 2835 pixels per metre (72 dpi)
    pub fn phys() -> ([u8; 4], Vec<u8>) {
        let mut data = Vec::with_capacity(9);
        data.extend_from_slice(&2835u32.to_be_bytes());
        data.extend_from_slice(&2835u32.to_be_bytes());
        data.push(1);
        (*b"pHYs", data)
    }

    /// tEXt with a keyword and value.
    pub fn text(keyword: &str, value: &str) -> ([u8; 4], Vec<u8>) {
        let mut data = keyword.as_bytes().to_vec();
        data.push(0);
        data.extend_from_slice(value.as_bytes());
        (*b"tEXt", data)
    }
}
