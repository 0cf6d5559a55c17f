//! `.Z` decoder (decompression).

use crate::config::{CLEAR, FIRST, HEADER_LEN, IN_BUF_GUARD, IN_BUF_SIZE, INIT_BITS, ZConfig};
use crate::dictionary::CodeTable;
use dotz_core::bitstream::BitCursor;
use dotz_core::error::{DotzError, ErrorKind, Result};
use dotz_core::traits::{Decompressor, FlushMode, Status};
use log::{debug, trace, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Collecting the 3 header bytes.
    Header,
    /// Reading codes.
    Codes,
    /// End of input reached and all output handed out.
    Done,
    /// A call failed; the stream is abandoned.
    Failed,
}

/// The code read before the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Prev {
    /// Nothing read yet.
    Start,
    /// The last code was CLEAR.
    Cleared,
    /// The last data code.
    Code(u16),
}

/// Streaming decoder for the Unix `compress` format.
///
/// The decoder rebuilds the encoder's dictionary from the code stream
/// alone: every code after the first of an epoch defines one new entry,
/// the previous string extended by the first byte of the current one.
/// Strings are expanded back to front onto a stack that survives across
/// calls, so output can stop at any byte.
///
/// # Example
///
/// ```rust
/// use dotz_core::Decompressor;
/// use dotz_lzw::ZDecoder;
///
/// let mut decoder = ZDecoder::new();
/// let data = decoder.decompress_all(&[0x1F, 0x9D, 0x90, 0x41, 0x84, 0x00]).unwrap();
/// assert_eq!(data, b"AB");
/// ```
#[derive(Debug)]
pub struct ZDecoder {
    config: Option<ZConfig>,
    table: CodeTable,
    /// Compressed bytes taken from the caller but not yet fully read.
    buf: Box<[u8]>,
    /// Valid bytes at the front of `buf`.
    filled: usize,
    cursor: BitCursor,
    /// Bytes discarded from the front of `buf` so far.
    discarded: u64,
    n_bits: u8,
    /// Largest code readable before the width must grow.
    max_code: u32,
    /// Next entry to define.
    free_ent: u32,
    prev: Prev,
    /// First byte of the last expanded string.
    fin_char: u8,
    /// Expanded string, last byte at the bottom.
    stack: Vec<u8>,
    bytes_in: u64,
    bytes_out: u64,
    phase: Phase,
}

impl ZDecoder {
    /// Create a decoder. Stream parameters are read from the header.
    pub fn new() -> Self {
        Self {
            config: None,
            table: CodeTable::new(),
            buf: vec![0u8; IN_BUF_SIZE + IN_BUF_GUARD].into_boxed_slice(),
            filled: 0,
            cursor: BitCursor::new(),
            discarded: 0,
            n_bits: INIT_BITS,
            max_code: 0,
            free_ent: 0,
            prev: Prev::Start,
            fin_char: 0,
            stack: Vec::new(),
            bytes_in: 0,
            bytes_out: 0,
            phase: Phase::Header,
        }
    }

    /// Stream parameters, once the header has been read.
    pub fn config(&self) -> Option<&ZConfig> {
        self.config.as_ref()
    }

    /// Compressed bytes consumed so far, header included.
    pub fn total_in(&self) -> u64 {
        self.bytes_in
    }

    /// Decompressed bytes handed out so far.
    pub fn total_out(&self) -> u64 {
        self.bytes_out
    }

    /// Current code width in bits.
    pub fn code_width(&self) -> u8 {
        self.n_bits
    }

    /// Feed compressed `input` and collect decompressed bytes into `output`.
    pub fn advance(&mut self, input: &[u8], output: &mut [u8]) -> Result<(usize, usize, Status)> {
        self.guarded(input, output, FlushMode::None)
    }

    /// Declare the end of compressed input and drain what is left.
    pub fn finish(&mut self, output: &mut [u8]) -> Result<(usize, Status)> {
        let (_, produced, status) = self.guarded(&[], output, FlushMode::Finish)?;
        Ok((produced, status))
    }

    fn guarded(
        &mut self,
        input: &[u8],
        output: &mut [u8],
        flush: FlushMode,
    ) -> Result<(usize, usize, Status)> {
        match self.phase {
            Phase::Failed => return Err(DotzError::usage("decoder used after a failed call")),
            Phase::Done if !input.is_empty() => {
                self.phase = Phase::Failed;
                return Err(DotzError::usage("input supplied after the stream ended"));
            }
            Phase::Done => return Ok((0, 0, Status::StreamEnd)),
            Phase::Header | Phase::Codes => {}
        }

        if input.is_empty() && output.is_empty() && flush == FlushMode::None {
            self.phase = Phase::Failed;
            return Err(DotzError::usage(
                "call without input, output space or finish request cannot progress",
            ));
        }

        let result = self.step(input, output, flush);
        if let Err(e) = &result {
            if e.kind() == ErrorKind::CorruptStream {
                warn!("{e}");
            }
            self.phase = Phase::Failed;
        }
        result
    }

    fn step(
        &mut self,
        input: &[u8],
        output: &mut [u8],
        flush: FlushMode,
    ) -> Result<(usize, usize, Status)> {
        let mut consumed = 0;
        let mut produced = 0;

        if self.phase == Phase::Header {
            let take = (HEADER_LEN - self.filled).min(input.len());
            self.buf[self.filled..self.filled + take].copy_from_slice(&input[..take]);
            self.filled += take;
            self.bytes_in += take as u64;
            consumed += take;

            if self.filled < HEADER_LEN {
                if flush == FlushMode::Finish {
                    return Err(DotzError::truncated_header(self.filled));
                }
                return Ok((consumed, 0, Status::NeedsInput));
            }
            self.start(ZConfig::parse_header(&[self.buf[0], self.buf[1], self.buf[2]])?);
        }

        loop {
            if !self.stack.is_empty() {
                let n = self.stack.len().min(output.len() - produced);
                let split = self.stack.len() - n;
                for (slot, &byte) in output[produced..produced + n]
                    .iter_mut()
                    .zip(self.stack[split..].iter().rev())
                {
                    *slot = byte;
                }
                self.stack.truncate(split);
                produced += n;
                self.bytes_out += n as u64;
                if !self.stack.is_empty() {
                    return Ok((consumed, produced, Status::NeedsOutput));
                }
            }

            if self.free_ent > self.max_code {
                self.grow();
            }

            if !self.cursor.fits(self.filled, self.n_bits) {
                self.compact();
                let take = (IN_BUF_SIZE - self.filled).min(input.len() - consumed);
                if take == 0 {
                    if flush == FlushMode::Finish {
                        self.phase = Phase::Done;
                        debug!(
                            "decoder reached end of stream: {} bytes in, {} bytes out",
                            self.bytes_in, self.bytes_out
                        );
                        return Ok((consumed, produced, Status::StreamEnd));
                    }
                    return Ok((consumed, produced, Status::NeedsInput));
                }
                self.buf[self.filled..self.filled + take]
                    .copy_from_slice(&input[consumed..consumed + take]);
                self.filled += take;
                self.bytes_in += take as u64;
                consumed += take;
                continue;
            }

            let bit_position = self.discarded * 8 + self.cursor.position() as u64;
            let code = self.cursor.get_code(&self.buf, self.n_bits);
            self.expand(code, bit_position)?;
        }
    }

    fn start(&mut self, config: ZConfig) {
        debug!(
            "stream header: max_bits={} block_mode={}",
            config.max_bits, config.block_mode
        );
        self.config = Some(config);
        self.free_ent = u32::from(config.first_code());
        self.n_bits = INIT_BITS;
        self.max_code = self.max_code_for(INIT_BITS);
        self.cursor = BitCursor::at(HEADER_LEN * 8);
        self.phase = Phase::Codes;
    }

    fn stream_config(&self) -> ZConfig {
        self.config.unwrap_or_default()
    }

    fn max_code_for(&self, n_bits: u8) -> u32 {
        let config = self.stream_config();
        if n_bits == config.max_bits {
            config.code_limit()
        } else {
            (1 << n_bits) - 1
        }
    }

    fn grow(&mut self) {
        self.cursor.align(self.n_bits);
        self.n_bits += 1;
        self.max_code = self.max_code_for(self.n_bits);
        trace!(
            "code width {} -> {} at entry {}",
            self.n_bits - 1,
            self.n_bits,
            self.free_ent
        );
    }

    /// Drop fully read bytes from the front of the buffer.
    fn compact(&mut self) {
        let drop = self.cursor.whole_bytes().min(self.filled);
        self.buf.copy_within(drop..self.filled, 0);
        self.filled -= drop;
        self.cursor.rebase(drop);
        self.discarded += drop as u64;
    }

    fn clear(&mut self) {
        debug!("CLEAR code after {} output bytes", self.bytes_out);
        self.table.clear();
        self.free_ent = u32::from(FIRST);
        self.cursor.align(self.n_bits);
        self.n_bits = INIT_BITS;
        self.max_code = self.max_code_for(INIT_BITS);
        self.prev = Prev::Cleared;
    }

    /// Expand one code onto the output stack and extend the dictionary.
    fn expand(&mut self, code: u16, bit_position: u64) -> Result<()> {
        let config = self.stream_config();

        let old_code = match self.prev {
            Prev::Code(old) => old,
            Prev::Cleared if code == CLEAR && config.block_mode => {
                self.clear();
                return Ok(());
            }
            Prev::Start | Prev::Cleared => {
                if code >= 256 {
                    return Err(DotzError::corrupt_stream(
                        bit_position,
                        format!("code {code} opens an epoch but is not a literal"),
                    ));
                }
                self.fin_char = code as u8;
                self.stack.push(self.fin_char);
                self.prev = Prev::Code(code);
                return Ok(());
            }
        };

        if code == CLEAR && config.block_mode {
            self.clear();
            return Ok(());
        }

        let mut target = code;
        if u32::from(code) >= self.free_ent {
            if u32::from(code) > self.free_ent {
                return Err(DotzError::corrupt_stream(
                    bit_position,
                    format!("code {code} beyond next free entry {}", self.free_ent),
                ));
            }
            // The code names the entry being defined right now: the previous
            // string followed by its own first byte.
            self.stack.push(self.fin_char);
            target = old_code;
        }

        self.fin_char = self.table.unroll(target, &mut self.stack);

        if self.free_ent < config.code_limit() {
            self.table.define(self.free_ent as u16, old_code, self.fin_char);
            self.free_ent += 1;
        }
        self.prev = Prev::Code(code);
        Ok(())
    }
}

impl Default for ZDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decompressor for ZDecoder {
    fn decompress(
        &mut self,
        input: &[u8],
        output: &mut [u8],
        flush: FlushMode,
    ) -> Result<(usize, usize, Status)> {
        self.guarded(input, output, flush)
    }

    fn reset(&mut self) {
        self.config = None;
        self.table.clear();
        self.filled = 0;
        self.cursor = BitCursor::new();
        self.discarded = 0;
        self.n_bits = INIT_BITS;
        self.max_code = 0;
        self.free_ent = 0;
        self.prev = Prev::Start;
        self.fin_char = 0;
        self.stack.clear();
        self.bytes_in = 0;
        self.bytes_out = 0;
        self.phase = Phase::Header;
    }

    fn is_finished(&self) -> bool {
        self.phase == Phase::Done
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::ZEncoder;
    use dotz_core::{Compressor, ErrorKind};

    fn decode(data: &[u8]) -> Result<Vec<u8>> {
        ZDecoder::new().decompress_all(data)
    }

    #[test]
    fn test_known_vector() {
        assert_eq!(decode(&[0x1F, 0x9D, 0x90, 0x41, 0x84, 0x00]).unwrap(), b"AB");
    }

    #[test]
    fn test_header_only() {
        assert_eq!(decode(&[0x1F, 0x9D, 0x90]).unwrap(), b"");
        let mut decoder = ZDecoder::new();
        decoder.decompress_all(&[0x1F, 0x9D, 0x8C]).unwrap();
        assert_eq!(decoder.config(), Some(&ZConfig::new(12)));
    }

    #[test]
    fn test_kwkwk() {
        // "AAAA" -> 'A', 257, 'A'; 257 is referenced while being defined.
        let compressed = ZEncoder::new(ZConfig::default())
            .unwrap()
            .compress_all(b"AAAAAAA")
            .unwrap();
        assert_eq!(decode(&compressed).unwrap(), b"AAAAAAA");
    }

    #[test]
    fn test_truncated_header() {
        let err = decode(&[0x1F, 0x9D]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
        let err = decode(&[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
    }

    #[test]
    fn test_header_split_across_calls() {
        let mut decoder = ZDecoder::new();
        let mut out = [0u8; 8];
        assert_eq!(
            decoder.advance(&[0x1F], &mut out).unwrap(),
            (1, 0, Status::NeedsInput)
        );
        assert_eq!(
            decoder.advance(&[0x9D, 0x90, 0x41], &mut out).unwrap(),
            (3, 0, Status::NeedsInput)
        );
        let (consumed, produced, status) = decoder.advance(&[0x84, 0x00], &mut out).unwrap();
        assert_eq!((consumed, status), (2, Status::NeedsInput));
        assert_eq!(&out[..produced], b"AB");
        let (produced, status) = decoder.finish(&mut out).unwrap();
        assert_eq!((produced, status), (0, Status::StreamEnd));
    }

    #[test]
    fn test_first_code_must_be_literal() {
        // 257 as the first 9-bit code.
        let err = decode(&[0x1F, 0x9D, 0x90, 0x01, 0x01, 0x00]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CorruptStream);
    }

    #[test]
    fn test_clear_as_first_code_is_corrupt() {
        let err = decode(&[0x1F, 0x9D, 0x90, 0x00, 0x01, 0x00]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CorruptStream);
    }

    #[test]
    fn test_code_256_is_data_without_block_mode() {
        // Block mode off: 256 is the first dictionary entry, and here a
        // KwKwK reference. 'A', 256 -> "A" + "AA".
        let mut buf = [0u8; 8];
        buf[..3].copy_from_slice(&[0x1F, 0x9D, 0x10]);
        let mut cursor = BitCursor::at(24);
        cursor.put_code(&mut buf, 0x41, 9);
        cursor.put_code(&mut buf, 256, 9);
        let len = cursor.position().div_ceil(8);
        assert_eq!(decode(&buf[..len]).unwrap(), b"AAA");
    }

    #[test]
    fn test_errors_are_sticky() {
        let mut decoder = ZDecoder::new();
        let mut out = [0u8; 16];
        let err = decoder
            .decompress(&[0x1F, 0x8B, 0x08], &mut out, FlushMode::None)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
        let err = decoder
            .decompress(&[0x1F, 0x9D, 0x90], &mut out, FlushMode::None)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Usage);
    }

    #[test]
    fn test_reset_after_failure() {
        let mut decoder = ZDecoder::new();
        assert!(decoder.decompress_all(&[0, 0, 0]).is_err());
        decoder.reset();
        let out = decoder
            .decompress_all(&[0x1F, 0x9D, 0x90, 0x41, 0x84, 0x00])
            .unwrap();
        assert_eq!(out, b"AB");
        assert!(decoder.is_finished());
    }

    #[test]
    fn test_one_byte_output_slices() {
        let data = b"She sells sea shells by the sea shore. ".repeat(30);
        let compressed = ZEncoder::new(ZConfig::default())
            .unwrap()
            .compress_all(&data)
            .unwrap();

        let mut decoder = ZDecoder::new();
        let mut out = Vec::new();
        let mut pos = 0;
        let mut byte = [0u8; 1];
        loop {
            let flush = if pos == compressed.len() {
                FlushMode::Finish
            } else {
                FlushMode::None
            };
            let (consumed, produced, status) = decoder
                .decompress(&compressed[pos..], &mut byte, flush)
                .unwrap();
            pos += consumed;
            out.extend_from_slice(&byte[..produced]);
            if status == Status::StreamEnd {
                break;
            }
        }
        assert_eq!(out, data);
        assert_eq!(decoder.total_out(), data.len() as u64);
        assert_eq!(decoder.total_in(), compressed.len() as u64);
    }
}
