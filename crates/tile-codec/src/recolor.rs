//! Coverage recolor transform.
//!
//! Upstream tile generation marks covered pixels with a red channel of 220.
//! Those pixels become the requested accent color at full opacity; every
//! other pixel becomes fully transparent.

use crate::header::BYTES_PER_PIXEL;
use crate::palette::Rgb;
use rayon::prelude::*;

/// Red channel value that marks a covered pixel in source tiles.
pub const COVERAGE_SENTINEL_RED: u8 = 220;

/// Fully transparent output pixel.
pub const TRANSPARENT: [u8; 4] = [0, 0, 0, 0];

/// Minimum pixels to benefit from parallel recoloring
const PARALLEL_THRESHOLD: usize = 4096; // 64x64 or larger

/// Recolor one pixel. Only the red channel is consulted.
#[inline(always)]
pub fn recolor_pixel(pixel: [u8; 4], target: Rgb) -> [u8; 4] {
    if pixel[0] == COVERAGE_SENTINEL_RED {
        target.opaque()
    } else {
        TRANSPARENT
    }
}

/// Recolor one scanline into `out` (same length as `row`).
pub fn recolor_row(row: &[u8], target: Rgb, out: &mut [u8]) {
    for (src, dst) in row
        .chunks_exact(BYTES_PER_PIXEL)
        .zip(out.chunks_exact_mut(BYTES_PER_PIXEL))
    {
        let pixel = [src[0], src[1], src[2], src[3]];
        dst.copy_from_slice(&recolor_pixel(pixel, target));
    }
}

/// Recolor a reconstructed raster into a new buffer.
///
/// Rows are independent once reconstructed, so large rasters are split
/// across the rayon pool one row per task.
pub fn recolor_raster(pixels: &[u8], stride: usize, target: Rgb) -> Vec<u8> {
    let mut out = vec![0u8; pixels.len()];
    if stride == 0 {
        return out;
    }

    if pixels.len() / BYTES_PER_PIXEL >= PARALLEL_THRESHOLD {
        out.par_chunks_mut(stride)
            .zip(pixels.par_chunks(stride))
            .for_each(|(dst, src)| recolor_row(src, target, dst));
    } else {
        for (dst, src) in out.chunks_mut(stride).zip(pixels.chunks(stride)) {
            recolor_row(src, target, dst);
        }
    }

    out
}
