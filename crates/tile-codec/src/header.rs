//! IHDR parsing and validation.

use crate::error::{CodecError, CodecResult};

/// IHDR payload size.
pub const IHDR_LEN: usize = 13;

/// Color type 6: truecolor with alpha.
pub const COLOR_TYPE_RGBA: u8 = 6;

/// Bytes per pixel for 8-bit RGBA.
pub const BYTES_PER_PIXEL: usize = 4;

/// Largest width/height allowed by the PNG format (2^31 - 1).
const MAX_DIMENSION: u32 = i32::MAX as u32;

/// Decoded IHDR fields. Immutable once parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageHeader {
    pub width: u32,
    pub height: u32,
    pub bit_depth: u8,
    pub color_type: u8,
    pub compression_method: u8,
    pub filter_method: u8,
    pub interlace_method: u8,
}

impl ImageHeader {
    /// Header for a non-interlaced 8-bit RGBA image.
    pub fn rgba(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bit_depth: 8,
            color_type: COLOR_TYPE_RGBA,
            compression_method: 0,
            filter_method: 0,
            interlace_method: 0,
        }
    }

    /// Parse an IHDR payload.
    pub fn parse(data: &[u8]) -> CodecResult<Self> {
        if data.len() != IHDR_LEN {
            return Err(CodecError::InvalidHeader(format!(
                "expected {} bytes, got {}",
                IHDR_LEN,
                data.len()
            )));
        }

        let width = u32::from_be_bytes([data[0], data[1], data[2], data[3]]);
        let height = u32::from_be_bytes([data[4], data[5], data[6], data[7]]);

        if width == 0 || height == 0 {
            return Err(CodecError::InvalidHeader(format!(
                "dimensions must be positive, got {}x{}",
                width, height
            )));
        }
        if width > MAX_DIMENSION || height > MAX_DIMENSION {
            return Err(CodecError::InvalidHeader(format!(
                "dimensions {}x{} exceed 2^31-1",
                width, height
            )));
        }

        Ok(Self {
            width,
            height,
            bit_depth: data[8],
            color_type: data[9],
            compression_method: data[10],
            filter_method: data[11],
            interlace_method: data[12],
        })
    }

    /// Serialize back to the 13-byte IHDR payload.
    pub fn to_bytes(&self) -> [u8; IHDR_LEN] {
        let mut out = [0u8; IHDR_LEN];
        out[0..4].copy_from_slice(&self.width.to_be_bytes());
        out[4..8].copy_from_slice(&self.height.to_be_bytes());
        out[8] = self.bit_depth;
        out[9] = self.color_type;
        out[10] = self.compression_method;
        out[11] = self.filter_method;
        out[12] = self.interlace_method;
        out
    }

    /// Reject anything other than 8-bit, non-interlaced RGBA.
    pub fn ensure_supported(&self) -> CodecResult<()> {
        if self.bit_depth != 8 {
            return Err(CodecError::Unsupported(format!(
                "bit depth {} (only 8 is supported)",
                self.bit_depth
            )));
        }
        if self.color_type != COLOR_TYPE_RGBA {
            return Err(CodecError::Unsupported(format!(
                "color type {} (only 6, RGBA, is supported)",
                self.color_type
            )));
        }
        if self.compression_method != 0 {
            return Err(CodecError::Unsupported(format!(
                "compression method {}",
                self.compression_method
            )));
        }
        if self.filter_method != 0 {
            return Err(CodecError::Unsupported(format!(
                "filter method {}",
                self.filter_method
            )));
        }
        if self.interlace_method != 0 {
            return Err(CodecError::Unsupported("interlaced images".to_string()));
        }
        Ok(())
    }

    /// Bytes per reconstructed scanline (width * 4).
    pub fn stride(&self) -> CodecResult<usize> {
        (self.width as usize)
            .checked_mul(BYTES_PER_PIXEL)
            .ok_or_else(|| CodecError::InvalidHeader("row size overflows".to_string()))
    }

    /// Bytes of the reconstructed raster (height * stride).
    pub fn raster_len(&self) -> CodecResult<usize> {
        self.stride()?
            .checked_mul(self.height as usize)
            .ok_or_else(|| CodecError::InvalidHeader("image size overflows".to_string()))
    }

    /// Bytes of inflated IDAT data: every row plus its filter tag.
    pub fn filtered_len(&self) -> CodecResult<usize> {
        (self.stride()? + 1)
            .checked_mul(self.height as usize)
            .ok_or_else(|| CodecError::InvalidHeader("image size overflows".to_string()))
    }
}
