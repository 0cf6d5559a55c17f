//! Reader-to-writer drivers over the streaming traits.
//!
//! These pump a [`Read`] source through a [`Compressor`] or [`Decompressor`]
//! into a [`Write`] sink in fixed-size chunks, declaring end of input when
//! the reader returns 0.

use crate::error::{DotzError, Result};
use crate::traits::{Compressor, Decompressor, FlushMode, Status};
use log::debug;
use std::io::{ErrorKind, Read, Write};

/// Chunk size used for both the read and the write side.
pub const CHUNK_SIZE: usize = 8192;

/// Byte counts for one driven stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamStats {
    /// Bytes pulled from the reader.
    pub bytes_read: u64,
    /// Bytes pushed to the writer.
    pub bytes_written: u64,
}

/// Compress everything `reader` yields into `writer`.
pub fn compress_stream<C, R, W>(
    codec: &mut C,
    reader: &mut R,
    writer: &mut W,
) -> Result<StreamStats>
where
    C: Compressor + ?Sized,
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    pump(reader, writer, |input, output, flush| {
        codec.compress(input, output, flush)
    })
}

/// Decompress everything `reader` yields into `writer`.
pub fn decompress_stream<D, R, W>(
    codec: &mut D,
    reader: &mut R,
    writer: &mut W,
) -> Result<StreamStats>
where
    D: Decompressor + ?Sized,
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    pump(reader, writer, |input, output, flush| {
        codec.decompress(input, output, flush)
    })
}

fn read_chunk<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> Result<usize> {
    loop {
        match reader.read(buf) {
            Ok(n) => return Ok(n),
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(DotzError::Io(e)),
        }
    }
}

fn pump<R, W, F>(reader: &mut R, writer: &mut W, mut step: F) -> Result<StreamStats>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
    F: FnMut(&[u8], &mut [u8], FlushMode) -> Result<(usize, usize, Status)>,
{
    let mut stats = StreamStats::default();
    let mut input = vec![0u8; CHUNK_SIZE];
    let mut output = vec![0u8; CHUNK_SIZE];

    loop {
        let filled = read_chunk(reader, &mut input)?;
        stats.bytes_read += filled as u64;
        let flush = if filled == 0 {
            FlushMode::Finish
        } else {
            FlushMode::None
        };

        let mut pos = 0;
        loop {
            let (consumed, produced, status) = step(&input[pos..filled], &mut output, flush)?;
            pos += consumed;
            writer.write_all(&output[..produced])?;
            stats.bytes_written += produced as u64;

            match status {
                Status::StreamEnd => {
                    writer.flush()?;
                    debug!(
                        "stream finished: {} bytes in, {} bytes out",
                        stats.bytes_read, stats.bytes_written
                    );
                    return Ok(stats);
                }
                Status::NeedsOutput => continue,
                Status::NeedsInput if pos < filled => continue,
                Status::NeedsInput if flush == FlushMode::Finish => {
                    return Err(DotzError::usage(
                        "codec asked for input after end of stream was signalled",
                    ));
                }
                Status::NeedsInput => break,
            }
        }
    }
}
