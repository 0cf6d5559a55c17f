//! # dotz-lzw: the Unix `compress` (.Z) format in pure Rust
//!
//! This crate reads and writes the `.Z` format produced by compress(1):
//! adaptive LZW with 9 to 16 bit codes and optional "block mode" dictionary
//! resets.
//!
//! ## Format
//!
//! - **Header**: `1F 9D`, then one byte holding the maximum code width in
//!   bits 0-4 and the block-mode flag in bit 7
//! - **Codes**: packed least significant bit first, starting 9 bits wide
//! - **Growth**: the width increases by one whenever the next dictionary
//!   code no longer fits, after padding to a multiple of `width` bytes
//! - **CLEAR (256)**: in block mode, the encoder resets the dictionary when
//!   the compression ratio starts to drop
//! - **No trailer**: the stream simply ends; the last byte is zero padded
//!
//! ## Example
//!
//! ```rust
//! use dotz_lzw::{compress, decompress, ZConfig};
//!
//! let original = b"TOBEORNOTTOBEORTOBEORNOT";
//! let compressed = compress(original, ZConfig::default()).unwrap();
//! assert_eq!(&compressed[..3], &[0x1F, 0x9D, 0x90]);
//!
//! let decompressed = decompress(&compressed).unwrap();
//! assert_eq!(decompressed, original);
//! ```
//!
//! ## Streaming
//!
//! [`Session`], [`ZEncoder`] and [`ZDecoder`] accept input and output in
//! pieces of any size, down to a single byte, and produce output identical
//! to a one-shot call. [`compress_stream`] and [`decompress_stream`] drive
//! them from a reader into a writer.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

mod config;
mod decoder;
mod dictionary;
mod encoder;
mod session;

pub use config::{
    BLOCK_MODE, CHECK_GAP, CLEAR, FIRST, HASH_BITS, HASH_SIZE, HEADER_LEN, INIT_BITS, MAGIC,
    MAX_BITS, ZConfig,
};
pub use decoder::ZDecoder;
pub use dictionary::{CodeTable, HashDictionary};
pub use dotz_core::error::{DotzError, ErrorKind, Result};
pub use dotz_core::stream::StreamStats;
pub use dotz_core::traits::{FlushMode, Status};
pub use encoder::ZEncoder;
pub use session::Session;

use dotz_core::traits::{Compressor, Decompressor};
use std::io::{Read, Write};

/// Compress `data` into a complete `.Z` stream.
///
/// # Example
///
/// ```rust
/// use dotz_lzw::{compress, ZConfig};
///
/// let compressed = compress(&[b'x'; 1000], ZConfig::default()).unwrap();
/// assert!(compressed.len() < 100);
/// ```
pub fn compress(data: &[u8], config: ZConfig) -> Result<Vec<u8>> {
    let mut encoder = ZEncoder::new(config)?;
    encoder.compress_all(data)
}

/// Decompress a complete `.Z` stream.
///
/// # Example
///
/// ```rust
/// use dotz_lzw::decompress;
///
/// let data = decompress(&[0x1F, 0x9D, 0x90, 0x41, 0x84, 0x00]).unwrap();
/// assert_eq!(data, b"AB");
/// ```
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = ZDecoder::new();
    decoder.decompress_all(data)
}

/// Compress everything `reader` yields into `writer`.
pub fn compress_stream<R, W>(
    reader: &mut R,
    writer: &mut W,
    config: ZConfig,
) -> Result<StreamStats>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    let mut encoder = ZEncoder::new(config)?;
    dotz_core::stream::compress_stream(&mut encoder, reader, writer)
}

/// Decompress everything `reader` yields into `writer`.
///
/// Returns the byte counts together with the stream's header parameters.
pub fn decompress_stream<R, W>(
    reader: &mut R,
    writer: &mut W,
) -> Result<(StreamStats, ZConfig)>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    let mut decoder = ZDecoder::new();
    let stats = dotz_core::stream::decompress_stream(&mut decoder, reader, writer)?;
    let config = decoder
        .config()
        .copied()
        .ok_or_else(|| DotzError::truncated_header(0))?;
    Ok((stats, config))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_default() {
        let original = b"TOBEORNOTTOBEORTOBEORNOT";
        let compressed = compress(original, ZConfig::default()).unwrap();
        assert_eq!(decompress(&compressed).unwrap(), original);
    }

    #[test]
    fn test_empty_input() {
        let compressed = compress(b"", ZConfig::default()).unwrap();
        assert_eq!(compressed, [0x1F, 0x9D, 0x90]);
        assert!(decompress(&compressed).unwrap().is_empty());
    }

    #[test]
    fn test_thousand_a() {
        let original = vec![0x41u8; 1000];
        let compressed = compress(&original, ZConfig::default()).unwrap();
        // Each code is one 'A' longer than the last: 44 codes cover 990
        // bytes and a 45th the final 10.
        assert_eq!(compressed.len(), 3 + (45 * 9usize).div_ceil(8));
        assert_eq!(compress(&original, ZConfig::default()).unwrap(), compressed);
        assert_eq!(decompress(&compressed).unwrap(), original);
    }

    #[test]
    fn test_all_byte_values() {
        let original: Vec<u8> = (0..=255).collect();
        let compressed = compress(&original, ZConfig::default()).unwrap();
        assert_eq!(decompress(&compressed).unwrap(), original);
    }

    #[test]
    fn test_stream_helpers() {
        let original = b"streaming through readers and writers ".repeat(500);
        let mut packed = Vec::new();
        let stats = compress_stream(&mut &original[..], &mut packed, ZConfig::new(14)).unwrap();
        assert_eq!(stats.bytes_read, original.len() as u64);
        assert_eq!(stats.bytes_written, packed.len() as u64);

        let mut unpacked = Vec::new();
        let (stats, config) = decompress_stream(&mut &packed[..], &mut unpacked).unwrap();
        assert_eq!(unpacked, original);
        assert_eq!(stats.bytes_written, original.len() as u64);
        assert_eq!(config, ZConfig::new(14));
    }
}
