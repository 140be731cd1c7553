//! PNG re-encoding.
//!
//! Output rows are never filtered: each scanline gets filter tag 0 and the
//! whole raster goes into a single zlib-compressed IDAT chunk.

use crate::chunk::{write_chunk, IDAT, IEND, IHDR, PNG_SIGNATURE};
use crate::decode::PngMetadata;
use crate::error::{CodecError, CodecResult};
use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::io::Write;

/// Encoder settings.
#[derive(Debug, Clone, Copy)]
pub struct EncodeOptions {
    /// zlib compression level for the IDAT stream.
    pub compression: Compression,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            compression: Compression::default(),
        }
    }
}

/// Prefix every row with filter tag 0 and deflate the result.
pub fn deflate_scanlines(
    pixels: &[u8],
    stride: usize,
    height: usize,
    compression: Compression,
) -> CodecResult<Vec<u8>> {
    if stride == 0 {
        return Err(CodecError::InvalidHeader("zero-width raster".to_string()));
    }
    let expected = stride * height;
    if pixels.len() != expected {
        return Err(CodecError::RasterSize {
            expected,
            actual: pixels.len(),
        });
    }

    let mut uncompressed = Vec::with_capacity(height * (1 + stride));
    for row in pixels.chunks_exact(stride) {
        uncompressed.push(0); // filter type: none
        uncompressed.extend_from_slice(row);
    }

    let mut encoder = ZlibEncoder::new(Vec::new(), compression);
    encoder
        .write_all(&uncompressed)
        .map_err(|e| CodecError::Deflate(e.to_string()))?;
    encoder.finish().map_err(|e| CodecError::Deflate(e.to_string()))
}

/// Build a PNG from preserved metadata and a replacement RGBA raster.
///
/// Layout: signature, IHDR (unchanged), ancillary chunks that preceded the
/// original pixel data, one new IDAT, ancillary chunks that followed it, IEND.
pub fn encode_png(
    metadata: &PngMetadata,
    pixels: &[u8],
    options: &EncodeOptions,
) -> CodecResult<Vec<u8>> {
    let header = &metadata.header;
    let idat = deflate_scanlines(
        pixels,
        header.stride()?,
        header.height as usize,
        options.compression,
    )?;

    let ancillary_len: usize = metadata.ancillary().map(|c| c.data.len() + 12).sum();
    // signature + IHDR + IDAT/IEND framing
    let mut png = Vec::with_capacity(8 + 25 + 24 + idat.len() + ancillary_len);

    png.extend_from_slice(&PNG_SIGNATURE);
    write_chunk(&mut png, &IHDR, &header.to_bytes())?;
    for chunk in &metadata.before_idat {
        write_chunk(&mut png, &chunk.kind, &chunk.data)?;
    }
    write_chunk(&mut png, &IDAT, &idat)?;
    for chunk in &metadata.after_idat {
        write_chunk(&mut png, &chunk.kind, &chunk.data)?;
    }
    write_chunk(&mut png, &IEND, &[])?;

    Ok(png)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::{Chunk, ChunkReader};
    use crate::decode::{decode_png, DecodeOptions};
    use crate::header::ImageHeader;

    fn metadata(width: u32, height: u32) -> PngMetadata {
        PngMetadata {
            header: ImageHeader::rgba(width, height),
            before_idat: vec![Chunk::new(*b"pHYs", vec![0, 0, 11, 19, 0, 0, 11, 19, 1])],
            after_idat: vec![Chunk::new(*b"tEXt", b"Software\0coverage".to_vec())],
        }
    }

    #[test]
    fn test_chunk_order() {
        let pixels = vec![0u8; 2 * 2 * 4];
        let png = encode_png(&metadata(2, 2), &pixels, &EncodeOptions::default()).unwrap();

        let mut reader = ChunkReader::new(&png).unwrap();
        let mut kinds = Vec::new();
        while let Some(chunk) = reader.next_chunk().unwrap() {
            kinds.push(chunk.name());
        }
        assert_eq!(kinds, ["IHDR", "pHYs", "IDAT", "tEXt", "IEND"]);
    }

    #[test]
    fn test_rows_are_unfiltered() {
        let pixels: Vec<u8> = (0..3 * 2 * 4).map(|i| i as u8).collect();
        let idat = deflate_scanlines(&pixels, 12, 2, Compression::fast()).unwrap();

        let mut decoder = flate2::read::ZlibDecoder::new(&idat[..]);
        let mut raw = Vec::new();
        std::io::Read::read_to_end(&mut decoder, &mut raw).unwrap();

        assert_eq!(raw.len(), 2 * 13);
        assert_eq!(raw[0], 0);
        assert_eq!(raw[13], 0);
        assert_eq!(&raw[1..13], &pixels[..12]);
        assert_eq!(&raw[14..], &pixels[12..]);
    }

    #[test]
    fn test_encode_decode_pixels() {
        let pixels: Vec<u8> = (0..4 * 3 * 4).map(|i| (i * 7) as u8).collect();
        let meta = metadata(4, 3);
        let png = encode_png(&meta, &pixels, &EncodeOptions::default()).unwrap();

        let decoded = decode_png(&png, &DecodeOptions::default()).unwrap();
        assert_eq!(decoded.pixels, pixels);
        assert_eq!(decoded.metadata, meta);
    }

    #[test]
    fn test_wrong_raster_size() {
        let err = encode_png(&metadata(2, 2), &[0u8; 15], &EncodeOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            CodecError::RasterSize {
                expected: 16,
                actual: 15
            }
        ));
    }
}
