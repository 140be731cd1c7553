//! PNG chunk framing.
//!
//! A PNG file is the 8-byte signature followed by chunks laid out as
//! `length (u32 BE) | type (4 bytes) | payload | CRC-32 (u32 BE)`, where the
//! CRC covers `type ++ payload`.

use crate::error::{CodecError, CodecResult};
use std::fmt;

/// PNG file signature.
pub const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

pub const IHDR: [u8; 4] = *b"IHDR";
pub const IDAT: [u8; 4] = *b"IDAT";
pub const IEND: [u8; 4] = *b"IEND";

/// One length-prefixed, type-tagged, CRC-checked segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub kind: [u8; 4],
    pub data: Vec<u8>,
    /// CRC as stored in the file.
    pub crc: u32,
}

impl Chunk {
    /// Build a chunk with a freshly computed CRC.
    pub fn new(kind: [u8; 4], data: Vec<u8>) -> Self {
        let crc = chunk_crc(&kind, &data);
        Self { kind, data, crc }
    }

    pub fn is(&self, kind: &[u8; 4]) -> bool {
        &self.kind == kind
    }

    /// CRC recomputed over `type ++ payload`.
    pub fn computed_crc(&self) -> u32 {
        chunk_crc(&self.kind, &self.data)
    }

    pub fn name(&self) -> String {
        String::from_utf8_lossy(&self.kind).into_owned()
    }
}

impl fmt::Display for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} bytes)", self.name(), self.data.len())
    }
}

/// Sequential chunk reader over an in-memory PNG.
pub struct ChunkReader<'a> {
    data: &'a [u8],
    pos: usize,
    verify_crc: bool,
}

impl<'a> ChunkReader<'a> {
    /// Check the signature and position the cursor on the first chunk.
    pub fn new(data: &'a [u8]) -> CodecResult<Self> {
        Ok(Self {
            data,
            pos: read_signature(data)?,
            verify_crc: true,
        })
    }

    /// Enable or disable CRC verification (enabled by default).
    pub fn verify_crc(mut self, verify: bool) -> Self {
        self.verify_crc = verify;
        self
    }

    /// Current byte offset into the file.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Read the next chunk, or `Ok(None)` once the input is exhausted.
    pub fn next_chunk(&mut self) -> CodecResult<Option<Chunk>> {
        if self.pos == self.data.len() {
            return Ok(None);
        }

        let start = self.pos;
        let length = u32::from_be_bytes(self.take_array(start, "length")?) as usize;
        let kind: [u8; 4] = self.take_array(start, "chunk type")?;
        let data = self.take(length, start, "payload")?.to_vec();
        let crc = u32::from_be_bytes(self.take_array(start, "CRC")?);

        let chunk = Chunk { kind, data, crc };
        if self.verify_crc {
            let computed = chunk.computed_crc();
            if computed != crc {
                return Err(CodecError::CrcMismatch {
                    chunk: chunk.name(),
                    stored: crc,
                    computed,
                });
            }
        }

        Ok(Some(chunk))
    }

    fn take(&mut self, len: usize, chunk_start: usize, what: &str) -> CodecResult<&'a [u8]> {
        let available = self.data.len() - self.pos;
        if len > available {
            return Err(CodecError::TruncatedChunk {
                offset: chunk_start,
                message: format!("{} needs {} bytes, {} available", what, len, available),
            });
        }
        let slice = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    fn take_array(&mut self, chunk_start: usize, what: &str) -> CodecResult<[u8; 4]> {
        let mut out = [0u8; 4];
        out.copy_from_slice(self.take(4, chunk_start, what)?);
        Ok(out)
    }
}

/// Check the PNG signature, returning the offset of the first chunk.
pub fn read_signature(data: &[u8]) -> CodecResult<usize> {
    match data.get(..PNG_SIGNATURE.len()) {
        Some(sig) if sig == PNG_SIGNATURE => Ok(PNG_SIGNATURE.len()),
        _ => Err(CodecError::InvalidSignature),
    }
}

/// Write a PNG chunk: length, type, payload, CRC.
pub fn write_chunk(png: &mut Vec<u8>, chunk_type: &[u8; 4], data: &[u8]) -> CodecResult<()> {
    let length = u32::try_from(data.len()).map_err(|_| CodecError::ChunkTooLarge(data.len()))?;

    png.extend_from_slice(&length.to_be_bytes());
    png.extend_from_slice(chunk_type);
    png.extend_from_slice(data);
    png.extend_from_slice(&chunk_crc(chunk_type, data).to_be_bytes());

    Ok(())
}

/// CRC-32 over `type ++ payload`, as stored after each chunk.
pub fn chunk_crc(chunk_type: &[u8; 4], data: &[u8]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(chunk_type);
    hasher.update(data);
    hasher.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_with(chunks: &[u8]) -> Vec<u8> {
        let mut png = PNG_SIGNATURE.to_vec();
        png.extend_from_slice(chunks);
        png
    }

    #[test]
    fn test_iend_crc_is_standard() {
        let mut out = Vec::new();
        write_chunk(&mut out, &IEND, &[]).unwrap();
        assert_eq!(out, [0, 0, 0, 0, b'I', b'E', b'N', b'D', 0xAE, 0x42, 0x60, 0x82]);
    }

    #[test]
    fn test_read_written_chunks_in_order() {
        let mut body = Vec::new();
        write_chunk(&mut body, b"tEXt", b"Comment\0coverage").unwrap();
        write_chunk(&mut body, &IEND, &[]).unwrap();
        let png = png_with(&body);

        let mut reader = ChunkReader::new(&png).unwrap();
        let text = reader.next_chunk().unwrap().unwrap();
        assert!(text.is(b"tEXt"));
        assert_eq!(text.data, b"Comment\0coverage");
        assert_eq!(text.crc, text.computed_crc());

        let end = reader.next_chunk().unwrap().unwrap();
        assert!(end.is(&IEND));
        assert!(reader.next_chunk().unwrap().is_none());
        assert_eq!(reader.position(), png.len());
    }

    #[test]
    fn test_bad_signature() {
        let mut png = png_with(&[]);
        png[1] = b'J';
        assert!(matches!(ChunkReader::new(&png), Err(CodecError::InvalidSignature)));
        assert!(matches!(ChunkReader::new(&[137, 80]), Err(CodecError::InvalidSignature)));
    }

    #[test]
    fn test_truncated_payload_is_error() {
        let mut body = Vec::new();
        write_chunk(&mut body, b"tEXt", b"0123456789").unwrap();
        body.truncate(body.len() - 8);
        let png = png_with(&body);

        let mut reader = ChunkReader::new(&png).unwrap();
        match reader.next_chunk() {
            Err(CodecError::TruncatedChunk { offset, message }) => {
                assert_eq!(offset, 8);
                assert!(message.contains("payload"), "{}", message);
            }
            other => panic!("expected truncated chunk, got {:?}", other),
        }
    }

    #[test]
    fn test_truncated_length_is_error() {
        let png = png_with(&[0, 0]);
        let mut reader = ChunkReader::new(&png).unwrap();
        assert!(matches!(
            reader.next_chunk(),
            Err(CodecError::TruncatedChunk { .. })
        ));
    }

    #[test]
    fn test_crc_mismatch() {
        let mut body = Vec::new();
        write_chunk(&mut body, b"gAMA", &[0, 0, 177, 143]).unwrap();
        let last = body.len() - 1;
        body[last] ^= 0xFF;
        let png = png_with(&body);

        let mut reader = ChunkReader::new(&png).unwrap();
        assert!(matches!(
            reader.next_chunk(),
            Err(CodecError::CrcMismatch { ref chunk, .. }) if chunk == "gAMA"
        ));

        let mut lenient = ChunkReader::new(&png).unwrap().verify_crc(false);
        let chunk = lenient.next_chunk().unwrap().unwrap();
        assert_ne!(chunk.crc, chunk.computed_crc());
    }
}
