//! Container parsing and pixel decoding.

use crate::chunk::{Chunk, ChunkReader, IDAT, IEND, IHDR};
use crate::error::{CodecError, CodecResult};
use crate::filter::unfilter_image;
use crate::header::ImageHeader;
use crate::idat;
use tracing::{debug, warn};

/// Decoder settings.
#[derive(Debug, Clone, Copy)]
pub struct DecodeOptions {
    /// Reject chunks whose stored CRC does not match their contents.
    pub verify_crc: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self { verify_crc: true }
    }
}

/// Everything in a PNG except its pixel data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PngMetadata {
    pub header: ImageHeader,
    /// Ancillary chunks found before the first IDAT, in file order.
    pub before_idat: Vec<Chunk>,
    /// Ancillary chunks found after the first IDAT, in file order.
    pub after_idat: Vec<Chunk>,
}

impl PngMetadata {
    /// All preserved chunks in their original relative order.
    pub fn ancillary(&self) -> impl Iterator<Item = &Chunk> {
        self.before_idat.iter().chain(self.after_idat.iter())
    }
}

/// A decoded 8-bit RGBA image.
#[derive(Debug, Clone)]
pub struct DecodedPng {
    pub metadata: PngMetadata,
    /// Reconstructed RGBA raster, row-major, `height * width * 4` bytes.
    pub pixels: Vec<u8>,
}

impl DecodedPng {
    pub fn width(&self) -> u32 {
        self.metadata.header.width
    }

    pub fn height(&self) -> u32 {
        self.metadata.header.height
    }

    /// Row length in bytes.
    pub fn stride(&self) -> usize {
        self.metadata.header.width as usize * 4
    }

    /// RGBA value at (x, y), if inside the image.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        let offset = y as usize * self.stride() + x as usize * 4;
        let px = &self.pixels[offset..offset + 4];
        Some([px[0], px[1], px[2], px[3]])
    }
}

/// Chunk-level view of a PNG before inflation.
struct Container {
    metadata: PngMetadata,
    idat_stream: Vec<u8>,
}

/// Walk the chunk list, validating layout and the header.
///
/// The header is checked for support as soon as it is read, so unsupported
/// files are rejected before any pixel data is examined.
fn read_container(data: &[u8], options: &DecodeOptions) -> CodecResult<Container> {
    let mut reader = ChunkReader::new(data)?.verify_crc(options.verify_crc);

    let mut header: Option<ImageHeader> = None;
    let mut idat_payloads: Vec<Vec<u8>> = Vec::new();
    let mut before_idat = Vec::new();
    let mut after_idat = Vec::new();
    let mut saw_iend = false;

    while let Some(chunk) = reader.next_chunk()? {
        if header.is_none() && !chunk.is(&IHDR) {
            return Err(CodecError::InvalidLayout(format!(
                "first chunk must be IHDR, found {}",
                chunk.name()
            )));
        }

        if chunk.is(&IHDR) {
            if header.is_some() {
                return Err(CodecError::InvalidLayout("duplicate IHDR chunk".to_string()));
            }
            let parsed = ImageHeader::parse(&chunk.data)?;
            parsed.ensure_supported()?;
            debug!(width = parsed.width, height = parsed.height, "Parsed IHDR");
            header = Some(parsed);
        } else if chunk.is(&IDAT) {
            idat_payloads.push(chunk.data);
        } else if chunk.is(&IEND) {
            saw_iend = true;
            break;
        } else {
            debug!(chunk = %chunk, "Preserving ancillary chunk");
            if idat_payloads.is_empty() {
                before_idat.push(chunk);
            } else {
                after_idat.push(chunk);
            }
        }
    }

    let header = header.ok_or_else(|| CodecError::InvalidLayout("missing IHDR chunk".to_string()))?;
    if idat_payloads.is_empty() {
        return Err(CodecError::InvalidLayout("missing IDAT chunk".to_string()));
    }

    if !saw_iend {
        warn!("PNG ended without IEND chunk");
    } else if reader.position() < data.len() {
        debug!(
            trailing = data.len() - reader.position(),
            "Ignoring bytes after IEND"
        );
    }

    debug!(idat_chunks = idat_payloads.len(), "Assembling IDAT stream");
    let idat_stream = idat::assemble(idat_payloads.iter().map(Vec::as_slice));

    Ok(Container {
        metadata: PngMetadata {
            header,
            before_idat,
            after_idat,
        },
        idat_stream,
    })
}

/// Decode an 8-bit RGBA PNG held in memory.
pub fn decode_png(data: &[u8], options: &DecodeOptions) -> CodecResult<DecodedPng> {
    let Container {
        metadata,
        idat_stream,
    } = read_container(data, options)?;

    let header = &metadata.header;
    let stride = header.stride()?;
    let raw = idat::inflate(&idat_stream, header.filtered_len()?)?;
    let pixels = unfilter_image(&raw, stride, header.height as usize)?;

    Ok(DecodedPng { metadata, pixels })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::{write_chunk, PNG_SIGNATURE};
    use crate::encode::{deflate_scanlines, EncodeOptions};

    fn raw_png(chunks: &[(&[u8; 4], Vec<u8>)]) -> Vec<u8> {
        let mut png = PNG_SIGNATURE.to_vec();
        for (kind, data) in chunks {
            write_chunk(&mut png, kind, data).unwrap();
        }
        png
    }

    fn one_pixel_idat(pixel: [u8; 4]) -> Vec<u8> {
        deflate_scanlines(&pixel, 4, 1, EncodeOptions::default().compression).unwrap()
    }

    #[test]
    fn test_decode_minimal_png() {
        let png = raw_png(&[
            (&IHDR, ImageHeader::rgba(1, 1).to_bytes().to_vec()),
            (&IDAT, one_pixel_idat([220, 1, 2, 3])),
            (&IEND, vec![]),
        ]);
        let decoded = decode_png(&png, &DecodeOptions::default()).unwrap();
        assert_eq!(decoded.pixels, [220, 1, 2, 3]);
        assert_eq!(decoded.pixel(0, 0), Some([220, 1, 2, 3]));
        assert_eq!(decoded.pixel(1, 0), None);
    }

    #[test]
    fn test_ancillary_split_around_idat() {
        let png = raw_png(&[
            (&IHDR, ImageHeader::rgba(1, 1).to_bytes().to_vec()),
            (b"gAMA", vec![0, 0, 177, 143]),
            (&IDAT, one_pixel_idat([0; 4])),
            (b"tEXt", b"k\0v".to_vec()),
            (&IEND, vec![]),
        ]);
        let decoded = decode_png(&png, &DecodeOptions::default()).unwrap();
        let meta = &decoded.metadata;
        assert_eq!(meta.before_idat.len(), 1);
        assert!(meta.before_idat[0].is(b"gAMA"));
        assert_eq!(meta.after_idat.len(), 1);
        assert!(meta.after_idat[0].is(b"tEXt"));
    }

    #[test]
    fn test_missing_iend_is_tolerated() {
        let png = raw_png(&[
            (&IHDR, ImageHeader::rgba(1, 1).to_bytes().to_vec()),
            (&IDAT, one_pixel_idat([5, 6, 7, 8])),
        ]);
        let decoded = decode_png(&png, &DecodeOptions::default()).unwrap();
        assert_eq!(decoded.pixels, [5, 6, 7, 8]);
    }

    #[test]
    fn test_layout_errors() {
        let ihdr = ImageHeader::rgba(1, 1).to_bytes().to_vec();
        let idat = one_pixel_idat([0; 4]);

        let cases = [
            raw_png(&[(&IDAT, idat.clone()), (&IEND, vec![])]),
            raw_png(&[(b"tEXt", vec![]), (&IHDR, ihdr.clone()), (&IEND, vec![])]),
            raw_png(&[(&IHDR, ihdr.clone()), (&IHDR, ihdr.clone()), (&IEND, vec![])]),
            raw_png(&[(&IHDR, ihdr.clone()), (&IEND, vec![])]),
            raw_png(&[]),
        ];
        for png in cases {
            assert!(matches!(
                decode_png(&png, &DecodeOptions::default()),
                Err(CodecError::InvalidLayout(_))
            ));
        }
    }

    #[test]
    fn test_unsupported_header_rejected_before_idat() {
        let header = ImageHeader {
            bit_depth: 1,
            ..ImageHeader::rgba(1, 1)
        };
        // IDAT is garbage: rejection must come from the header, not inflate.
        let png = raw_png(&[
            (&IHDR, header.to_bytes().to_vec()),
            (&IDAT, vec![0xFF; 8]),
            (&IEND, vec![]),
        ]);
        assert!(matches!(
            decode_png(&png, &DecodeOptions::default()),
            Err(CodecError::Unsupported(_))
        ));
    }
}
