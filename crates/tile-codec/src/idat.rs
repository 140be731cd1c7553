//! IDAT stream assembly and inflation.
//!
//! Compressed pixel data may be split across any number of IDAT chunks; the
//! payloads form one zlib stream once concatenated in file order.

use crate::error::{CodecError, CodecResult};
use flate2::{Decompress, FlushDecompress, Status};

/// Upper bound on the up-front output reservation.
const INITIAL_CAPACITY: usize = 1 << 20;

/// Output growth step once the buffer is full.
const GROW_STEP: usize = 32 * 1024;

/// Concatenate IDAT payloads in encounter order.
pub fn assemble<'a, I>(payloads: I) -> Vec<u8>
where
    I: IntoIterator<Item = &'a [u8]>,
{
    let mut stream = Vec::new();
    for payload in payloads {
        stream.extend_from_slice(payload);
    }
    stream
}

/// Inflate the assembled zlib stream into filter-tagged scanlines.
///
/// Exactly `expected_len` bytes are returned. The stream is decoded through
/// to its end marker so a corrupt or truncated tail is reported rather than
/// silently accepted; output beyond `expected_len` is discarded.
///
/// `expected_len` comes from the header, so the buffer only grows as data
/// is actually produced.
pub fn inflate(compressed: &[u8], expected_len: usize) -> CodecResult<Vec<u8>> {
    let mut inflater = Decompress::new(true);
    let mut raw = Vec::with_capacity(
        expected_len
            .min(compressed.len().saturating_mul(4))
            .min(INITIAL_CAPACITY)
            .max(GROW_STEP),
    );
    let mut trailing = 0usize;

    loop {
        if raw.capacity() == raw.len() {
            raw.reserve(GROW_STEP);
        }
        let consumed = inflater.total_in() as usize;
        let produced = inflater.total_out();
        let status = inflater
            .decompress_vec(&compressed[consumed..], &mut raw, FlushDecompress::None)
            .map_err(|e| CodecError::Inflate(e.to_string()))?;

        if raw.len() > expected_len {
            trailing += raw.len() - expected_len;
            raw.truncate(expected_len);
        }

        match status {
            Status::StreamEnd => break,
            Status::Ok | Status::BufError => {
                let stalled =
                    inflater.total_in() as usize == consumed && inflater.total_out() == produced;
                if stalled {
                    return Err(CodecError::Inflate(format!(
                        "unexpected end of zlib stream after {} of {} bytes",
                        consumed,
                        compressed.len()
                    )));
                }
            }
        }
    }

    if raw.len() < expected_len {
        return Err(CodecError::ShortImageData {
            expected: expected_len,
            actual: raw.len(),
        });
    }
    if trailing > 0 {
        tracing::debug!(trailing, "Ignoring extra bytes after last scanline");
    }

    Ok(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::ZlibEncoder;
    use flate2::Compression;
    use std::io::Write;

    fn zlib(data: &[u8]) -> Vec<u8> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn test_split_stream_reassembles() {
        let raw: Vec<u8> = (0..=255u8).cycle().take(3000).collect();
        let compressed = zlib(&raw);
        let (a, rest) = compressed.split_at(5);
        let (b, c) = rest.split_at(rest.len() / 2);

        let stream = assemble([a, b, c]);
        assert_eq!(stream, compressed);
        assert_eq!(inflate(&stream, raw.len()).unwrap(), raw);
    }

    #[test]
    fn test_corrupt_stream_is_error() {
        let mut compressed = zlib(&[7u8; 500]);
        compressed[0] = 0xFF;
        assert!(matches!(
            inflate(&compressed, 500),
            Err(CodecError::Inflate(_))
        ));
    }

    #[test]
    fn test_truncated_stream_is_error() {
        let raw: Vec<u8> = (0..4000u32).map(|i| (i * 31 % 251) as u8).collect();
        let compressed = zlib(&raw);
        let truncated = &compressed[..compressed.len() / 2];
        assert!(matches!(
            inflate(truncated, raw.len()),
            Err(CodecError::Inflate(_))
        ));

        // All pixel bytes present but the checksum trailer is missing.
        let no_trailer = &compressed[..compressed.len() - 4];
        assert!(matches!(
            inflate(no_trailer, raw.len()),
            Err(CodecError::Inflate(_))
        ));
    }

    #[test]
    fn test_short_data_is_error() {
        let compressed = zlib(&[1u8; 10]);
        assert!(matches!(
            inflate(&compressed, 11),
            Err(CodecError::ShortImageData {
                expected: 11,
                actual: 10
            })
        ));
    }

    #[test]
    fn test_oversized_expectation_is_short_not_allocated() {
        let compressed = zlib(&[0u8; 10]);
        let expected = 400_000 * (1 + 400_000 * 4);
        assert!(matches!(
            inflate(&compressed, expected),
            Err(CodecError::ShortImageData { actual: 10, .. })
        ));
    }

    #[test]
    fn test_large_output_grows_buffer() {
        let raw: Vec<u8> = (0..3_000_000u32).map(|i| (i % 7) as u8).collect();
        let compressed = zlib(&raw);
        assert!(compressed.len() * 4 < raw.len());
        assert_eq!(inflate(&compressed, raw.len()).unwrap(), raw);
    }

    #[test]
    fn test_empty_stream_is_error() {
        assert!(matches!(inflate(&[], 4), Err(CodecError::Inflate(_))));
    }

    #[test]
    fn test_extra_data_is_ignored() {
        let compressed = zlib(&[9u8; 20]);
        assert_eq!(inflate(&compressed, 16).unwrap(), vec![9u8; 16]);
    }
}
