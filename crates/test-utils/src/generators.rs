//! Pixel pattern generators for creating synthetic coverage tiles.
//!
//! All generators return RGBA rasters in row-major order.

use crate::fixtures::{COVERED, SENTINEL_RED, UNCOVERED};

/// Build a raster by evaluating `f(x, y)` for every pixel.
pub fn raster_from_fn<F>(width: u32, height: u32, mut f: F) -> Vec<u8>
where
    F: FnMut(u32, u32) -> [u8; 4],
{
    let mut pixels = Vec::with_capacity(width as usize * height as usize * 4);
    for y in 0..height {
        for x in 0..width {
            pixels.extend_from_slice(&f(x, y));
        }
    }
    pixels
}

/// A coverage disc centred on the tile: covered inside `radius`, uncovered outside.
///
/// This is the shape produced for a radar site whose range ring lies
/// within a single tile.
pub fn coverage_disc(width: u32, height: u32, radius: f32) -> Vec<u8> {
    let cx = width as f32 / 2.0;
    let cy = height as f32 / 2.0;
    raster_from_fn(width, height, |x, y| {
        let dx = x as f32 + 0.5 - cx;
        let dy = y as f32 + 0.5 - cy;
        if (dx * dx + dy * dy).sqrt() <= radius {
            COVERED
        } else {
            UNCOVERED
        }
    })
}

/// A noisy raster whose red channel never equals the sentinel.
///
/// Other channels, including alpha, vary freely so filters have real work to do.
pub fn background_noise(width: u32, height: u32) -> Vec<u8> {
    let mut state: u32 = 0x9E37_79B9;
    raster_from_fn(width, height, |_, _| {
        let mut next = || {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state >> 24) as u8
        };
        let mut r = next();
        if r == SENTINEL_RED {
            r = r.wrapping_add(1);
        }
        [r, next(), next(), next()]
    })
}

/// Mixed tile: sentinel pixels on a checkerboard of `cell` pixels, with
/// near-miss values (219, 221) and sentinel values in other channels elsewhere.
pub fn checkerboard_coverage(width: u32, height: u32, cell: u32) -> Vec<u8> {
    let cell = cell.max(1);
    raster_from_fn(width, height, |x, y| {
        if ((x / cell) + (y / cell)) % 2 == 0 {
            [SENTINEL_RED, (x % 256) as u8, (y % 256) as u8, 255]
        } else if x % 2 == 0 {
            [SENTINEL_RED - 1, SENTINEL_RED, SENTINEL_RED, 255]
        } else {
            [SENTINEL_RED + 1, 0, 0, 128]
        }
    })
}

/// Count pixels whose red channel equals the sentinel.
pub fn count_sentinel_pixels(pixels: &[u8]) -> usize {
    pixels
        .chunks_exact(4)
        .filter(|px| px[0] == SENTINEL_RED)
        .count()
}
