//! `.Z` encoder (compression).

use crate::config::{
    CHECK_GAP, CLEAR, FIRST, INIT_BITS, OUT_BUF_GUARD, OUT_BUF_SIZE, ZConfig,
};
use crate::dictionary::HashDictionary;
use dotz_core::bitstream::BitCursor;
use dotz_core::error::{DotzError, Result};
use dotz_core::traits::{Compressor, FlushMode, Status};
use log::{debug, trace};

/// Pending output, in bits, at which the encoder hands bytes to the caller
/// before accepting more input.
const FLUSH_THRESHOLD: usize = OUT_BUF_SIZE * 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Accepting input.
    Running,
    /// Final code written; handing out what is left.
    Finishing,
    /// Everything handed out.
    Done,
    /// A call broke the streaming contract.
    Failed,
}

/// Streaming LZW encoder producing the Unix `compress` format.
///
/// Input is consumed a byte at a time. The encoder keeps the longest known
/// string as a prefix code; when the next byte extends it into a pair the
/// dictionary has not seen, the prefix code is written and the pair becomes a
/// new entry. Codes start 9 bits wide and widen as the dictionary grows.
///
/// Once all `2^max_bits` codes are assigned the dictionary is frozen. In
/// block mode the encoder then measures the compression ratio every
/// [`CHECK_GAP`] input bytes and, as soon as it drops, writes a CLEAR code
/// and starts over with an empty dictionary.
///
/// # Example
///
/// ```rust
/// use dotz_core::Compressor;
/// use dotz_lzw::{ZConfig, ZEncoder};
///
/// let mut encoder = ZEncoder::new(ZConfig::default()).unwrap();
/// let compressed = encoder.compress_all(b"AB").unwrap();
/// assert_eq!(compressed, [0x1F, 0x9D, 0x90, 0x41, 0x84, 0x00]);
/// ```
#[derive(Debug)]
pub struct ZEncoder {
    config: ZConfig,
    dict: HashDictionary,
    /// Output not yet handed to the caller. Bytes past the cursor are zero.
    buf: Box<[u8]>,
    cursor: BitCursor,
    /// Current code width.
    n_bits: u8,
    /// Longest matched string so far, `None` before the first byte.
    prefix: Option<u16>,
    /// Bytes consumed, the first one included.
    bytes_in: u64,
    /// Bytes handed to the caller.
    bytes_out: u64,
    /// `bytes_in` value at which the ratio is next checked.
    checkpoint: u64,
    /// Ratio measured at the last checkpoint.
    ratio: f32,
    /// CLEAR codes written so far.
    resets: u64,
    state: State,
}

impl ZEncoder {
    /// Create an encoder for `config`.
    ///
    /// Fails with an unsupported width error if `config.max_bits` is
    /// outside 9..=16.
    pub fn new(config: ZConfig) -> Result<Self> {
        config.validate()?;

        let mut buf = vec![0u8; OUT_BUF_SIZE + OUT_BUF_GUARD].into_boxed_slice();
        buf[..3].copy_from_slice(&config.header());

        Ok(Self {
            config,
            dict: HashDictionary::new(&config),
            buf,
            cursor: BitCursor::at(24),
            n_bits: INIT_BITS,
            prefix: None,
            bytes_in: 0,
            bytes_out: 0,
            checkpoint: CHECK_GAP,
            ratio: 0.0,
            resets: 0,
            state: State::Running,
        })
    }

    /// Stream configuration.
    pub fn config(&self) -> &ZConfig {
        &self.config
    }

    /// Bytes consumed so far.
    pub fn total_in(&self) -> u64 {
        self.bytes_in
    }

    /// Bytes handed to the caller so far.
    pub fn total_out(&self) -> u64 {
        self.bytes_out
    }

    /// Number of CLEAR codes written so far.
    pub fn resets(&self) -> u64 {
        self.resets
    }

    /// Current code width in bits.
    pub fn code_width(&self) -> u8 {
        self.n_bits
    }

    /// Feed `input` and collect compressed bytes into `output`.
    ///
    /// Returns (bytes consumed, bytes written, status). With
    /// [`Status::NeedsOutput`] the call stopped early and must be repeated
    /// with fresh output space and the unconsumed input.
    pub fn advance(&mut self, input: &[u8], output: &mut [u8]) -> Result<(usize, usize, Status)> {
        self.step(input, output, FlushMode::None)
    }

    /// Write the final code and drain the remaining output.
    ///
    /// Repeat with fresh output space until [`Status::StreamEnd`].
    pub fn finish(&mut self, output: &mut [u8]) -> Result<(usize, Status)> {
        let (_, produced, status) = self.step(&[], output, FlushMode::Finish)?;
        Ok((produced, status))
    }

    fn step(
        &mut self,
        input: &[u8],
        output: &mut [u8],
        flush: FlushMode,
    ) -> Result<(usize, usize, Status)> {
        match self.state {
            State::Failed => {
                return Err(DotzError::usage("encoder used after a failed call"));
            }
            State::Finishing | State::Done if !input.is_empty() => {
                self.state = State::Failed;
                return Err(DotzError::usage("input supplied after the stream was finished"));
            }
            State::Done => return Ok((0, 0, Status::StreamEnd)),
            State::Running | State::Finishing => {}
        }

        if input.is_empty() && output.is_empty() && flush == FlushMode::None {
            self.state = State::Failed;
            return Err(DotzError::usage(
                "call without input, output space or finish request cannot progress",
            ));
        }

        // Once finishing has started only draining is left to do.
        let flush = if self.state == State::Finishing {
            FlushMode::Finish
        } else {
            flush
        };

        let mut consumed = 0;
        let mut produced = 0;

        while let Some(&byte) = input.get(consumed) {
            let Some(prefix) = self.prefix else {
                self.prefix = Some(u16::from(byte));
                self.bytes_in += 1;
                consumed += 1;
                continue;
            };

            // Width and ratio decisions are only taken between strings.
            if prefix < FIRST {
                self.maybe_grow();
                self.maybe_reset();
            }

            if self.cursor.position() >= FLUSH_THRESHOLD {
                produced += self.drain(&mut output[produced..], false);
                if self.cursor.position() >= FLUSH_THRESHOLD {
                    return Ok((consumed, produced, Status::NeedsOutput));
                }
            }

            self.bytes_in += 1;
            consumed += 1;
            match self.dict.lookup_or_insert(prefix, byte) {
                Some(code) => self.prefix = Some(code),
                None => {
                    self.emit(prefix);
                    self.prefix = Some(u16::from(byte));
                }
            }
        }

        if flush == FlushMode::Finish {
            if self.state == State::Running {
                if let Some(prefix) = self.prefix.take() {
                    self.maybe_grow();
                    self.emit(prefix);
                }
                self.state = State::Finishing;
                debug!(
                    "encoder finished input: {} bytes, {} resets, final width {}",
                    self.bytes_in, self.resets, self.n_bits
                );
            }

            produced += self.drain(&mut output[produced..], true);
            if self.cursor.position() == 0 {
                self.state = State::Done;
                return Ok((consumed, produced, Status::StreamEnd));
            }
            return Ok((consumed, produced, Status::NeedsOutput));
        }

        if self.cursor.position() >= FLUSH_THRESHOLD {
            produced += self.drain(&mut output[produced..], false);
        }
        Ok((consumed, produced, Status::NeedsInput))
    }

    #[inline]
    fn emit(&mut self, code: u16) {
        self.cursor.put_code(&mut self.buf, code, self.n_bits);
    }

    /// Widen codes once the next code to assign no longer fits.
    fn maybe_grow(&mut self) {
        if self.n_bits >= self.config.max_bits {
            return;
        }
        let ext_code = (1u32 << self.n_bits) + 1;
        if self.dict.next_code() >= ext_code {
            self.cursor.align(self.n_bits);
            self.n_bits += 1;
            trace!(
                "code width {} -> {} at input byte {}",
                self.n_bits - 1,
                self.n_bits,
                self.bytes_in
            );
        }
    }

    /// Clear the frozen dictionary when the compression ratio drops.
    fn maybe_reset(&mut self) {
        if !self.config.block_mode || !self.dict.is_full() || self.bytes_in < self.checkpoint {
            return;
        }
        self.checkpoint = self.bytes_in + CHECK_GAP;

        let bytes_out = self.bytes_out + self.cursor.whole_bytes() as u64;
        let ratio = if bytes_out == 0 {
            1.0
        } else {
            self.bytes_in as f32 / bytes_out as f32
        };

        if ratio >= self.ratio {
            self.ratio = ratio;
            return;
        }

        debug!(
            "ratio fell from {:.3} to {:.3} at input byte {}, clearing dictionary",
            self.ratio, ratio, self.bytes_in
        );
        self.ratio = 0.0;
        self.dict.clear();
        self.emit(CLEAR);
        self.cursor.align(self.n_bits);
        self.n_bits = INIT_BITS;
        self.resets += 1;
    }

    /// Hand whole pending bytes to `output`, plus the trailing partial byte
    /// when `finish` is set. Returns the number of bytes written.
    fn drain(&mut self, output: &mut [u8], finish: bool) -> usize {
        let position = self.cursor.position();
        let pending = if finish {
            position.div_ceil(8)
        } else {
            position / 8
        };
        let n = pending.min(output.len());
        if n == 0 {
            return 0;
        }

        output[..n].copy_from_slice(&self.buf[..n]);

        // Keep the partial byte at the cursor and zero what was moved.
        let tail_end = position / 8 + 1;
        self.buf.copy_within(n..tail_end, 0);
        self.buf[tail_end - n..tail_end].fill(0);
        self.cursor.rebase(n);
        self.bytes_out += n as u64;
        n
    }

    fn rebuild(&mut self) {
        self.buf.fill(0);
        self.buf[..3].copy_from_slice(&self.config.header());
        self.dict.clear();
        self.cursor = BitCursor::at(24);
        self.n_bits = INIT_BITS;
        self.prefix = None;
        self.bytes_in = 0;
        self.bytes_out = 0;
        self.checkpoint = CHECK_GAP;
        self.ratio = 0.0;
        self.resets = 0;
        self.state = State::Running;
    }
}

impl Compressor for ZEncoder {
    fn compress(
        &mut self,
        input: &[u8],
        output: &mut [u8],
        flush: FlushMode,
    ) -> Result<(usize, usize, Status)> {
        self.step(input, output, flush)
    }

    fn reset(&mut self) {
        self.rebuild();
    }

    fn is_finished(&self) -> bool {
        self.state == State::Done
    }
}
