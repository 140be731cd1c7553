//! Error types for the tile codec.

use std::fmt;
use thiserror::Error;

/// Result type alias using CodecError.
pub type CodecResult<T> = Result<T, CodecError>;

/// Primary error type for decoding, recoloring and encoding tiles.
#[derive(Debug, Error)]
pub enum CodecError {
    // === Structural Errors ===
    #[error("Not a PNG file: invalid signature")]
    InvalidSignature,

    #[error("Truncated chunk at offset {offset}: {message}")]
    TruncatedChunk { offset: usize, message: String },

    #[error("CRC mismatch in {chunk} chunk: stored {stored:#010x}, computed {computed:#010x}")]
    CrcMismatch {
        chunk: String,
        stored: u32,
        computed: u32,
    },

    #[error("Invalid IHDR: {0}")]
    InvalidHeader(String),

    #[error("Invalid chunk layout: {0}")]
    InvalidLayout(String),

    #[error("IDAT decompression failed: {0}")]
    Inflate(String),

    #[error("IDAT compression failed: {0}")]
    Deflate(String),

    #[error("Image data too short: expected {expected} bytes, got {actual}")]
    ShortImageData { expected: usize, actual: usize },

    #[error("Raster size mismatch: expected {expected} bytes, got {actual}")]
    RasterSize { expected: usize, actual: usize },

    #[error("Chunk payload too large: {0} bytes")]
    ChunkTooLarge(usize),

    // === Unsupported Format Errors ===
    #[error("Unsupported PNG: {0}")]
    Unsupported(String),

    // === Invalid Parameter Errors ===
    #[error("Unsupported color: {0}")]
    UnknownColor(String),

    #[error("Invalid palette: {0}")]
    InvalidPalette(String),

    // === Filter Errors ===
    #[error("Unknown filter type {tag} on row {row}")]
    UnknownFilter { row: usize, tag: u8 },
}

/// Coarse classification of a [`CodecError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed container: signature, chunk framing, CRC, zlib stream.
    Structural,
    /// Well-formed PNG outside the supported subset (8-bit RGBA, non-interlaced).
    Unsupported,
    /// Caller supplied a bad color name or palette.
    InvalidParameter,
    /// A scanline carried a filter tag outside 0..=4.
    UnknownFilter,
}

impl CodecError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CodecError::Unsupported(_) => ErrorKind::Unsupported,
            CodecError::UnknownColor(_) | CodecError::InvalidPalette(_) => {
                ErrorKind::InvalidParameter
            }
            CodecError::UnknownFilter { .. } => ErrorKind::UnknownFilter,
            _ => ErrorKind::Structural,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Structural => "structural format error",
            ErrorKind::Unsupported => "unsupported format",
            ErrorKind::InvalidParameter => "invalid parameter",
            ErrorKind::UnknownFilter => "unknown filter tag",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(CodecError::InvalidSignature.kind(), ErrorKind::Structural);
        assert_eq!(CodecError::Inflate("eof".into()).kind(), ErrorKind::Structural);
        assert_eq!(
            CodecError::Unsupported("bit depth 1".into()).kind(),
            ErrorKind::Unsupported
        );
        assert_eq!(
            CodecError::UnknownColor("teal".into()).kind(),
            ErrorKind::InvalidParameter
        );
        assert_eq!(
            CodecError::UnknownFilter { row: 3, tag: 9 }.kind(),
            ErrorKind::UnknownFilter
        );
    }

    #[test]
    fn test_error_messages() {
        let err = CodecError::UnknownColor("teal".into());
        assert_eq!(err.to_string(), "Unsupported color: teal");

        let err = CodecError::CrcMismatch {
            chunk: "IDAT".into(),
            stored: 1,
            computed: 0xdeadbeef,
        };
        assert_eq!(
            err.to_string(),
            "CRC mismatch in IDAT chunk: stored 0x00000001, computed 0xdeadbeef"
        );
    }
}
