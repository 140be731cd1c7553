//! PNG recolor codec for coverage tiles.
//!
//! Decodes 8-bit RGBA PNG tiles without an image library, reclassifies each
//! pixel by the coverage sentinel, and re-encodes the result:
//!
//! - Chunk framing and CRC checks (`chunk`)
//! - IDAT assembly and inflation (`idat`)
//! - Scanline filter reconstruction (`filter`)
//! - Sentinel recoloring (`recolor`) against a `Palette`
//! - Re-encoding with preserved ancillary chunks (`encode`)
//!
//! Every call works on owned in-memory buffers and keeps no state between
//! calls; the palette is the only shared value and is read-only.

pub mod chunk;
pub mod decode;
pub mod encode;
pub mod error;
pub mod filter;
pub mod header;
pub mod idat;
pub mod palette;
pub mod recolor;

pub use decode::{decode_png, DecodeOptions, DecodedPng, PngMetadata};
pub use encode::{encode_png, EncodeOptions};
pub use error::{CodecError, CodecResult, ErrorKind};
pub use header::ImageHeader;
pub use palette::{Palette, Rgb};
pub use recolor::COVERAGE_SENTINEL_RED;

/// Options for a full decode → recolor → encode pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecolorOptions {
    pub decode: DecodeOptions,
    pub encode: EncodeOptions,
}

/// Recolor a coverage tile with default options.
///
/// Sentinel pixels (red == 220) become `color` at full opacity, all others
/// become transparent. An unknown color is rejected before the input is read.
pub fn recolor_png(input: &[u8], color: &str, palette: &Palette) -> CodecResult<Vec<u8>> {
    recolor_png_with(input, color, palette, &RecolorOptions::default())
}

/// Recolor a coverage tile with explicit decoder/encoder options.
pub fn recolor_png_with(
    input: &[u8],
    color: &str,
    palette: &Palette,
    options: &RecolorOptions,
) -> CodecResult<Vec<u8>> {
    let target = palette.lookup(color)?;

    let decoded = decode_png(input, &options.decode)?;
    let recolored = recolor::recolor_raster(&decoded.pixels, decoded.stride(), target);
    let output = encode_png(&decoded.metadata, &recolored, &options.encode)?;

    tracing::debug!(
        color,
        width = decoded.width(),
        height = decoded.height(),
        input_bytes = input.len(),
        output_bytes = output.len(),
        "Recolored tile"
    );

    Ok(output)
}
