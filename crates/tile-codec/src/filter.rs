//! Scanline filter reconstruction.
//!
//! Every inflated scanline is `[filter_tag, byte_0 .. byte_(stride-1)]`.
//! Reconstruction depends on the previous reconstructed row, so rows are
//! processed strictly in order. All arithmetic wraps modulo 256.

use crate::error::{CodecError, CodecResult};
use crate::header::BYTES_PER_PIXEL;

/// PNG filter types (filter method 0).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum FilterType {
    None = 0,
    Sub = 1,
    Up = 2,
    Average = 3,
    Paeth = 4,
}

impl FilterType {
    pub const ALL: [FilterType; 5] = [
        FilterType::None,
        FilterType::Sub,
        FilterType::Up,
        FilterType::Average,
        FilterType::Paeth,
    ];

    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(FilterType::None),
            1 => Some(FilterType::Sub),
            2 => Some(FilterType::Up),
            3 => Some(FilterType::Average),
            4 => Some(FilterType::Paeth),
            _ => None,
        }
    }

    pub fn tag(self) -> u8 {
        self as u8
    }
}

/// Paeth predictor. Ties resolve to left, then up, then upper-left.
#[inline]
pub fn paeth_predictor(left: u8, up: u8, upper_left: u8) -> u8 {
    let p = i16::from(left) + i16::from(up) - i16::from(upper_left);
    let pa = (p - i16::from(left)).abs();
    let pb = (p - i16::from(up)).abs();
    let pc = (p - i16::from(upper_left)).abs();

    if pa <= pb && pa <= pc {
        left
    } else if pb <= pc {
        up
    } else {
        upper_left
    }
}

/// Reverse one filter, writing reconstructed bytes into `out`.
///
/// `filtered`, `prev` and `out` must all be one stride long; `prev` is the
/// previous *reconstructed* row (zeros for the first row). Bytes to the left
/// are read back from `out`, which is filled front to back.
pub fn reconstruct_row(filter: FilterType, filtered: &[u8], prev: &[u8], out: &mut [u8]) {
    debug_assert_eq!(filtered.len(), out.len());
    debug_assert_eq!(prev.len(), out.len());
    let bpp = BYTES_PER_PIXEL;

    match filter {
        FilterType::None => out.copy_from_slice(filtered),
        FilterType::Sub => {
            for i in 0..out.len() {
                let left = if i >= bpp { out[i - bpp] } else { 0 };
                out[i] = filtered[i].wrapping_add(left);
            }
        }
        FilterType::Up => {
            for i in 0..out.len() {
                out[i] = filtered[i].wrapping_add(prev[i]);
            }
        }
        FilterType::Average => {
            for i in 0..out.len() {
                let left = if i >= bpp { u16::from(out[i - bpp]) } else { 0 };
                let up = u16::from(prev[i]);
                out[i] = filtered[i].wrapping_add(((left + up) / 2) as u8);
            }
        }
        FilterType::Paeth => {
            for i in 0..out.len() {
                let (left, upper_left) = if i >= bpp {
                    (out[i - bpp], prev[i - bpp])
                } else {
                    (0, 0)
                };
                out[i] = filtered[i].wrapping_add(paeth_predictor(left, prev[i], upper_left));
            }
        }
    }
}

/// Reconstruct a whole image from inflated, filter-tagged scanlines.
///
/// `raw` must hold at least `height * (stride + 1)` bytes. Returns the
/// `height * stride` pixel raster in a freshly allocated buffer.
pub fn unfilter_image(raw: &[u8], stride: usize, height: usize) -> CodecResult<Vec<u8>> {
    let line_len = stride + 1;
    let needed = line_len * height;
    if raw.len() < needed {
        return Err(CodecError::ShortImageData {
            expected: needed,
            actual: raw.len(),
        });
    }

    let zero_row = vec![0u8; stride];
    let mut pixels = vec![0u8; stride * height];

    for (y, line) in raw[..needed].chunks_exact(line_len).enumerate() {
        let tag = line[0];
        let filter =
            FilterType::from_tag(tag).ok_or(CodecError::UnknownFilter { row: y, tag })?;

        let (done, rest) = pixels.split_at_mut(y * stride);
        let prev = if y == 0 {
            &zero_row[..]
        } else {
            &done[(y - 1) * stride..]
        };
        reconstruct_row(filter, &line[1..], prev, &mut rest[..stride]);
    }

    Ok(pixels)
}
