//! One open `.Z` stream in either direction.

use crate::config::ZConfig;
use crate::decoder::ZDecoder;
use crate::encoder::ZEncoder;
use dotz_core::error::Result;
use dotz_core::traits::{Compressor, Decompressor, Status};

/// A compression or decompression stream driven with caller-owned buffers.
///
/// A session is created for one direction and stays in it; each call does
/// as much work as the supplied buffers allow and reports which buffer the
/// caller has to service next.
///
/// # Example
///
/// ```rust
/// use dotz_core::Status;
/// use dotz_lzw::{Session, ZConfig};
///
/// let mut session = Session::begin_compress(ZConfig::default()).unwrap();
/// let mut out = [0u8; 64];
/// let (consumed, mut produced, status) = session.advance(b"AB", &mut out).unwrap();
/// assert_eq!((consumed, status), (2, Status::NeedsInput));
///
/// let (tail, status) = session.finish(&mut out[produced..]).unwrap();
/// produced += tail;
/// assert_eq!(status, Status::StreamEnd);
/// assert_eq!(&out[..produced], &[0x1F, 0x9D, 0x90, 0x41, 0x84, 0x00]);
/// ```
#[derive(Debug)]
pub enum Session {
    /// Raw bytes in, `.Z` bytes out.
    Compress(ZEncoder),
    /// `.Z` bytes in, raw bytes out.
    Decompress(ZDecoder),
}

impl Session {
    /// Open a compression stream.
    pub fn begin_compress(config: ZConfig) -> Result<Self> {
        Ok(Self::Compress(ZEncoder::new(config)?))
    }

    /// Open a decompression stream.
    pub fn begin_decompress() -> Self {
        Self::Decompress(ZDecoder::new())
    }

    /// Process as much of `input` as fits into `output`.
    ///
    /// Returns (bytes consumed, bytes produced, status).
    pub fn advance(&mut self, input: &[u8], output: &mut [u8]) -> Result<(usize, usize, Status)> {
        match self {
            Self::Compress(encoder) => encoder.advance(input, output),
            Self::Decompress(decoder) => decoder.advance(input, output),
        }
    }

    /// Signal end of input and drain what remains into `output`.
    ///
    /// Repeat with fresh output space until [`Status::StreamEnd`].
    pub fn finish(&mut self, output: &mut [u8]) -> Result<(usize, Status)> {
        match self {
            Self::Compress(encoder) => encoder.finish(output),
            Self::Decompress(decoder) => decoder.finish(output),
        }
    }

    /// Whether this session compresses.
    pub fn is_compress(&self) -> bool {
        matches!(self, Self::Compress(_))
    }

    /// Stream parameters; for a decompression stream only once the header
    /// has been read.
    pub fn config(&self) -> Option<&ZConfig> {
        match self {
            Self::Compress(encoder) => Some(encoder.config()),
            Self::Decompress(decoder) => decoder.config(),
        }
    }

    /// Bytes consumed so far.
    pub fn total_in(&self) -> u64 {
        match self {
            Self::Compress(encoder) => encoder.total_in(),
            Self::Decompress(decoder) => decoder.total_in(),
        }
    }

    /// Bytes produced so far.
    pub fn total_out(&self) -> u64 {
        match self {
            Self::Compress(encoder) => encoder.total_out(),
            Self::Decompress(decoder) => decoder.total_out(),
        }
    }

    /// Whether the stream has ended and all output was handed out.
    pub fn is_finished(&self) -> bool {
        match self {
            Self::Compress(encoder) => Compressor::is_finished(encoder),
            Self::Decompress(decoder) => Decompressor::is_finished(decoder),
        }
    }
}
