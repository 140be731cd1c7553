//! PNG tile builder.
//!
//! Produces coverage tiles the way other encoders would: rows may use any
//! scanline filter, pixel data may be split over several IDAT chunks, and
//! arbitrary ancillary chunks may surround it. Header fields can be forced to
//! unsupported values to exercise rejection paths.

use crate::fixtures::PNG_SIGNATURE;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::io::Write;

const BYTES_PER_PIXEL: usize = 4;

/// Builder for synthetic 8-bit RGBA PNG tiles.
#[derive(Debug, Clone)]
pub struct CoverageTileBuilder {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    /// Filter tag per row, cycled when shorter than the image.
    filters: Vec<u8>,
    before_idat: Vec<([u8; 4], Vec<u8>)>,
    after_idat: Vec<([u8; 4], Vec<u8>)>,
    idat_parts: usize,
    bit_depth: u8,
    color_type: u8,
    interlace: u8,
    include_iend: bool,
}

impl CoverageTileBuilder {
    /// A fully transparent tile with unfiltered rows.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0u8; width as usize * height as usize * BYTES_PER_PIXEL],
            filters: vec![0],
            before_idat: Vec::new(),
            after_idat: Vec::new(),
            idat_parts: 1,
            bit_depth: 8,
            color_type: 6,
            interlace: 0,
            include_iend: true,
        }
    }

    /// Replace the raster. Panics if the length does not match the dimensions.
    pub fn pixels(mut self, pixels: Vec<u8>) -> Self {
        assert_eq!(
            pixels.len(),
            self.width as usize * self.height as usize * BYTES_PER_PIXEL,
            "raster size does not match {}x{}",
            self.width,
            self.height
        );
        self.pixels = pixels;
        self
    }

    /// Use one filter tag for every row.
    pub fn filter(mut self, tag: u8) -> Self {
        self.filters = vec![tag];
        self
    }

    /// Use these filter tags row by row, cycling if needed.
    ///
    /// Tags above 4 are written verbatim over unfiltered bytes.
    pub fn filters(mut self, tags: &[u8]) -> Self {
        assert!(!tags.is_empty(), "at least one filter tag is required");
        self.filters = tags.to_vec();
        self
    }

    /// Add an ancillary chunk before the pixel data.
    pub fn chunk_before_idat(mut self, chunk: ([u8; 4], Vec<u8>)) -> Self {
        self.before_idat.push(chunk);
        self
    }

    /// Add an ancillary chunk after the pixel data.
    pub fn chunk_after_idat(mut self, chunk: ([u8; 4], Vec<u8>)) -> Self {
        self.after_idat.push(chunk);
        self
    }

    /// Split the compressed stream across `parts` IDAT chunks.
    pub fn split_idat(mut self, parts: usize) -> Self {
        self.idat_parts = parts.max(1);
        self
    }

    pub fn bit_depth(mut self, bit_depth: u8) -> Self {
        self.bit_depth = bit_depth;
        self
    }

    pub fn color_type(mut self, color_type: u8) -> Self {
        self.color_type = color_type;
        self
    }

    pub fn interlace(mut self, interlace: u8) -> Self {
        self.interlace = interlace;
        self
    }

    /// Omit the trailing IEND chunk.
    pub fn without_iend(mut self) -> Self {
        self.include_iend = false;
        self
    }

    /// The raw (unfiltered) raster the tile encodes.
    pub fn raster(&self) -> &[u8] {
        &self.pixels
    }

    /// Filter-tagged scanlines before compression.
    pub fn filtered_scanlines(&self) -> Vec<u8> {
        let stride = self.width as usize * BYTES_PER_PIXEL;
        let zero_row = vec![0u8; stride];
        let mut out = Vec::with_capacity(self.height as usize * (stride + 1));

        for (y, row) in self.pixels.chunks_exact(stride).enumerate() {
            let tag = self.filters[y % self.filters.len()];
            let prev = if y == 0 {
                &zero_row[..]
            } else {
                &self.pixels[(y - 1) * stride..y * stride]
            };
            out.push(tag);
            out.extend(apply_filter(tag, row, prev));
        }
        out
    }

    /// Encode the tile.
    pub fn build(&self) -> Vec<u8> {
        let compressed = zlib_compress(&self.filtered_scanlines());

        let mut png = PNG_SIGNATURE.to_vec();
        write_chunk(&mut png, b"IHDR", &self.header_bytes());
        for (kind, data) in &self.before_idat {
            write_chunk(&mut png, kind, data);
        }

        let part_len = compressed.len().div_ceil(self.idat_parts).max(1);
        for part in compressed.chunks(part_len) {
            write_chunk(&mut png, b"IDAT", part);
        }

        for (kind, data) in &self.after_idat {
            write_chunk(&mut png, kind, data);
        }
        if self.include_iend {
            write_chunk(&mut png, b"IEND", &[]);
        }
        png
    }

    fn header_bytes(&self) -> Vec<u8> {
        let mut ihdr = Vec::with_capacity(13);
        ihdr.extend_from_slice(&self.width.to_be_bytes());
        ihdr.extend_from_slice(&self.height.to_be_bytes());
        ihdr.push(self.bit_depth);
        ihdr.push(self.color_type);
        ihdr.push(0); // compression method
        ihdr.push(0); // filter method
        ihdr.push(self.interlace);
        ihdr
    }
}

/// Apply scanline filter `tag` to `row` given the previous raw row.
pub fn apply_filter(tag: u8, row: &[u8], prev: &[u8]) -> Vec<u8> {
    let bpp = BYTES_PER_PIXEL;
    (0..row.len())
        .map(|i| {
            let left = if i >= bpp { row[i - bpp] } else { 0 };
            let up = prev[i];
            let upper_left = if i >= bpp { prev[i - bpp] } else { 0 };
            let predictor = match tag {
                1 => left,
                2 => up,
                3 => ((left as u16 + up as u16) / 2) as u8,
                4 => paeth(left, up, upper_left),
                _ => 0,
            };
            row[i].wrapping_sub(predictor)
        })
        .collect()
}

fn paeth(a: u8, b: u8, c: u8) -> u8 {
    let p = a as i32 + b as i32 - c as i32;
    let pa = (p - a as i32).abs();
    let pb = (p - b as i32).abs();
    let pc = (p - c as i32).abs();
    if pa <= pb && pa <= pc {
        a
    } else if pb <= pc {
        b
    } else {
        c
    }
}

/// Write a PNG chunk: length, type, payload, CRC.
pub fn write_chunk(png: &mut Vec<u8>, chunk_type: &[u8; 4], data: &[u8]) {
    png.extend_from_slice(&(data.len() as u32).to_be_bytes());
    png.extend_from_slice(chunk_type);
    png.extend_from_slice(data);

    let mut hasher = crc32fast::Hasher::new();
    hasher.update(chunk_type);
    hasher.update(data);
    png.extend_from_slice(&hasher.finalize().to_be_bytes());
}

/// Walk a PNG and return `(type, payload)` for every chunk.
///
/// Panics on malformed framing; intended for assertions on codec output.
pub fn list_chunks(png: &[u8]) -> Vec<([u8; 4], Vec<u8>)> {
    assert!(png.len() >= 8 && png[..8] == PNG_SIGNATURE, "missing PNG signature");
    let mut chunks = Vec::new();
    let mut pos = 8;
    while pos < png.len() {
        let len = u32::from_be_bytes([png[pos], png[pos + 1], png[pos + 2], png[pos + 3]]) as usize;
        let mut kind = [0u8; 4];
        kind.copy_from_slice(&png[pos + 4..pos + 8]);
        let data = png[pos + 8..pos + 8 + len].to_vec();
        chunks.push((kind, data));
        pos += 12 + len;
    }
    chunks
}

fn zlib_compress(data: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).expect("in-memory write");
    encoder.finish().expect("in-memory write")
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::ZlibDecoder;
    use std::io::Read;

    fn inflate_idat(png: &[u8]) -> Vec<u8> {
        let stream: Vec<u8> = list_chunks(png)
            .into_iter()
            .filter(|(kind, _)| kind == b"IDAT")
            .flat_map(|(_, data)| data)
            .collect();
        let mut raw = Vec::new();
        ZlibDecoder::new(&stream[..]).read_to_end(&mut raw).unwrap();
        raw
    }

    #[test]
    fn test_build_layout() {
        let png = CoverageTileBuilder::new(2, 2)
            .chunk_before_idat(crate::fixtures::ancillary::gama())
            .chunk_after_idat(crate::fixtures::ancillary::text("k", "v"))
            .split_idat(3)
            .build();

        let kinds: Vec<[u8; 4]> = list_chunks(&png).into_iter().map(|(k, _)| k).collect();
        assert_eq!(kinds.first(), Some(b"IHDR"));
        assert_eq!(kinds[1], *b"gAMA");
        assert_eq!(kinds.iter().filter(|k| *k == b"IDAT").count(), 3);
        assert_eq!(kinds[kinds.len() - 2], *b"tEXt");
        assert_eq!(kinds.last(), Some(b"IEND"));
    }

    #[test]
    fn test_filtered_scanlines_tags() {
        let builder = CoverageTileBuilder::new(1, 5).filters(&[0, 1, 2, 3, 4]);
        let raw = inflate_idat(&builder.build());
        let tags: Vec<u8> = raw.chunks_exact(5).map(|line| line[0]).collect();
        assert_eq!(tags, [0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_up_filter_stores_differences() {
        let pixels = vec![10, 20, 30, 40, 15, 25, 35, 45];
        let builder = CoverageTileBuilder::new(1, 2).pixels(pixels).filter(2);
        let raw = builder.filtered_scanlines();
        assert_eq!(raw, [2, 10, 20, 30, 40, 2, 5, 5, 5, 5]);
    }
}
