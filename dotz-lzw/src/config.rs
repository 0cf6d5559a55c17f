//! `.Z` format constants and stream configuration.

use dotz_core::error::{DotzError, Result};
use log::warn;

/// The two magic bytes every `.Z` stream starts with.
pub const MAGIC: [u8; 2] = [0x1F, 0x9D];

/// Length of the stream header in bytes.
pub const HEADER_LEN: usize = 3;

/// Header flag: adaptive dictionary resets are enabled.
pub const BLOCK_MODE: u8 = 0x80;

/// Header mask for the maximum code width.
pub const BITS_MASK: u8 = 0x1F;

/// Header bits with no assigned meaning.
pub const RESERVED_MASK: u8 = 0x60;

/// Code width at the start of every epoch.
pub const INIT_BITS: u8 = 9;

/// Widest code this implementation reads or writes.
pub const MAX_BITS: u8 = 16;

/// Control code that resets the dictionary in block mode.
pub const CLEAR: u16 = 256;

/// First dictionary code in block mode.
pub const FIRST: u16 = 257;

/// log2 of the encoder hash table size.
pub const HASH_BITS: u32 = 17;

/// Number of slots in the encoder hash table.
pub const HASH_SIZE: usize = 1 << HASH_BITS;

/// Input bytes between two compression ratio checks once the dictionary is full.
pub const CHECK_GAP: u64 = 10_000;

/// Working size of the decoder input buffer.
pub const IN_BUF_SIZE: usize = 8192;

/// Extra bytes behind the decoder input buffer for 3-byte code reads.
pub const IN_BUF_GUARD: usize = 64;

/// Encoder output is handed out once this many bytes are pending.
pub const OUT_BUF_SIZE: usize = 8192;

/// Extra bytes behind the encoder output buffer for codes written past
/// [`OUT_BUF_SIZE`] before the next flush.
pub const OUT_BUF_GUARD: usize = 2048;

/// Parameters of a `.Z` stream, as carried in byte 2 of the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZConfig {
    /// Ceiling for the code width, 9 to 16.
    pub max_bits: u8,
    /// Whether the encoder may emit CLEAR codes when compression degrades.
    pub block_mode: bool,
}

impl ZConfig {
    /// What compress(1) writes by default: 16-bit codes, block mode on.
    pub const DEFAULT: Self = Self {
        max_bits: MAX_BITS,
        block_mode: true,
    };

    /// Create a block-mode configuration with `max_bits`, clamped the way
    /// compress(1) treats its `-b` option: 0 selects 16, values below 9
    /// become 9 and values above 16 become 16.
    ///
    /// With `max_bits == 9` codes never grow past 9 bits, so the last code
    /// assigned is 511. Legacy decoders widen to 10 bits at that point even
    /// when the header says 9, and reject such streams; dotz reads them.
    pub fn new(max_bits: u8) -> Self {
        let max_bits = match max_bits {
            0 => MAX_BITS,
            b => b.clamp(INIT_BITS, MAX_BITS),
        };
        Self {
            max_bits,
            block_mode: true,
        }
    }

    /// Same configuration with block mode switched off.
    pub fn without_block_mode(self) -> Self {
        Self {
            block_mode: false,
            ..self
        }
    }

    /// Same configuration with block mode set to `block_mode`.
    pub fn with_block_mode(self, block_mode: bool) -> Self {
        Self { block_mode, ..self }
    }

    /// Check that the width is one this implementation can handle.
    pub fn validate(&self) -> Result<()> {
        if (INIT_BITS..=MAX_BITS).contains(&self.max_bits) {
            Ok(())
        } else {
            Err(DotzError::unsupported_width(self.max_bits, MAX_BITS))
        }
    }

    /// Byte 2 of the header.
    pub fn header_byte(&self) -> u8 {
        let flag = if self.block_mode { BLOCK_MODE } else { 0 };
        self.max_bits | flag
    }

    /// The full 3-byte header.
    pub fn header(&self) -> [u8; HEADER_LEN] {
        [MAGIC[0], MAGIC[1], self.header_byte()]
    }

    /// Decode byte 2 of the header.
    pub fn from_header_byte(byte: u8) -> Result<Self> {
        if byte & RESERVED_MASK != 0 {
            warn!("reserved header bits set: {:#04x}", byte & RESERVED_MASK);
        }
        let config = Self {
            max_bits: byte & BITS_MASK,
            block_mode: byte & BLOCK_MODE != 0,
        };
        config.validate()?;
        Ok(config)
    }

    /// Decode a complete header, magic bytes included.
    pub fn parse_header(header: &[u8; HEADER_LEN]) -> Result<Self> {
        if header[..2] != MAGIC {
            return Err(DotzError::invalid_magic([header[0], header[1]]));
        }
        Self::from_header_byte(header[2])
    }

    /// Number of codes available at the maximum width (`2^max_bits`).
    pub fn code_limit(&self) -> u32 {
        1 << self.max_bits
    }

    /// First code the dictionary assigns.
    pub fn first_code(&self) -> u16 {
        if self.block_mode { FIRST } else { CLEAR }
    }
}

impl Default for ZConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
