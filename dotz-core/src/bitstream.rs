//! Bit-granular code packing for variable-width LZW codes.
//!
//! Codes of 9 to 16 bits are stored least-significant-bit first. A code at
//! bit offset `p` occupies the 3 bytes starting at `p >> 3`, shifted left by
//! `p & 7`, so every access touches exactly 3 bytes. Buffers handed to this
//! module must therefore carry at least 3 bytes of guard space past the last
//! code position.
//!
//! [`BitCursor`] wraps the raw functions with a position and an epoch
//! counter. An epoch starts at the beginning of the stream, at every code
//! width change and after every CLEAR code; [`BitCursor::align`] pads the
//! cursor to a whole number of `width`-byte groups measured from the epoch
//! start.
//!
//! # Example
//!
//! ```
//! use dotz_core::bitstream::BitCursor;
//!
//! let mut buf = [0u8; 8];
//! let mut writer = BitCursor::new();
//! writer.put_code(&mut buf, 0x141, 9);
//! writer.put_code(&mut buf, 0x0AA, 9);
//!
//! let mut reader = BitCursor::new();
//! assert_eq!(reader.get_code(&buf, 9), 0x141);
//! assert_eq!(reader.get_code(&buf, 9), 0x0AA);
//! ```

/// Merge `code` into `buf` at `bit_offset`.
///
/// The code is OR-ed into the 3 bytes starting at `bit_offset >> 3`; the
/// target bits must be zero. Returns the offset just past the code.
#[inline]
pub fn put_code(buf: &mut [u8], bit_offset: usize, code: u16, width: u8) -> usize {
    let at = bit_offset >> 3;
    let merged = u32::from(code) << (bit_offset & 7);
    buf[at] |= merged as u8;
    buf[at + 1] |= (merged >> 8) as u8;
    buf[at + 2] |= (merged >> 16) as u8;
    bit_offset + usize::from(width)
}

/// Extract a code of `width` bits from `buf` at `bit_offset`.
#[inline]
pub fn get_code(buf: &[u8], bit_offset: usize, width: u8, mask: u32) -> u16 {
    let at = bit_offset >> 3;
    let window =
        u32::from(buf[at]) | (u32::from(buf[at + 1]) << 8) | (u32::from(buf[at + 2]) << 16);
    debug_assert_eq!(mask, (1u32 << width) - 1);
    ((window >> (bit_offset & 7)) & mask) as u16
}

/// Number of padding bits needed to reach the next multiple of
/// `width * 8` bits after `epoch_bits` bits.
#[inline]
pub fn alignment_padding(epoch_bits: u64, width: u8) -> u64 {
    let group = u64::from(width) * 8;
    (group - epoch_bits % group) % group
}

/// A bit position inside a caller-owned byte buffer.
///
/// The cursor does not own the buffer. Owners that shift consumed bytes out
/// of the front of their buffer call [`BitCursor::rebase`] so the position
/// keeps pointing at the same bit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BitCursor {
    /// Bit offset into the buffer.
    position: usize,
    /// Bits written or read since the current epoch started.
    epoch_bits: u64,
}

impl BitCursor {
    /// A cursor at bit 0 with a fresh epoch.
    pub const fn new() -> Self {
        Self {
            position: 0,
            epoch_bits: 0,
        }
    }

    /// A cursor at `position` with a fresh epoch.
    pub const fn at(position: usize) -> Self {
        Self {
            position,
            epoch_bits: 0,
        }
    }

    /// Current bit offset into the buffer.
    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Number of whole bytes before the cursor.
    #[inline]
    pub fn whole_bytes(&self) -> usize {
        self.position >> 3
    }

    /// Bits covered since the current epoch started.
    #[inline]
    pub fn epoch_bits(&self) -> u64 {
        self.epoch_bits
    }

    /// Whether a code of `width` bits lies entirely inside the first
    /// `available` bytes of the buffer.
    #[inline]
    pub fn fits(&self, available: usize, width: u8) -> bool {
        self.position + usize::from(width) <= available * 8
    }

    /// Write `code` at the cursor and advance past it.
    #[inline]
    pub fn put_code(&mut self, buf: &mut [u8], code: u16, width: u8) {
        self.position = put_code(buf, self.position, code, width);
        self.epoch_bits += u64::from(width);
    }

    /// Read a `width`-bit code at the cursor and advance past it.
    #[inline]
    pub fn get_code(&mut self, buf: &[u8], width: u8) -> u16 {
        let code = get_code(buf, self.position, width, (1u32 << width) - 1);
        self.position += usize::from(width);
        self.epoch_bits += u64::from(width);
        code
    }

    /// Pad to the next `width * 8` bit boundary of the current epoch and
    /// start a new epoch there. Returns the number of bits skipped.
    pub fn align(&mut self, width: u8) -> u64 {
        let pad = alignment_padding(self.epoch_bits, width);
        self.position += pad as usize;
        self.epoch_bits = 0;
        pad
    }

    /// Account for `bytes` having been removed from the front of the buffer.
    /// The epoch count is unaffected.
    pub fn rebase(&mut self, bytes: usize) {
        self.position = self.position.saturating_sub(bytes * 8);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_get_straddling() {
        let mut buf = [0u8; 16];
        let mut pos = 0;
        let codes = [0x1FFu16, 0x000, 0x155, 0x0AA, 0x101, 0x0FF];
        for &code in &codes {
            pos = put_code(&mut buf, pos, code, 9);
        }
        assert_eq!(pos, 54);

        let mut pos = 0;
        for &code in &codes {
            assert_eq!(get_code(&buf, pos, 9, 0x1FF), code);
            pos += 9;
        }
    }

    #[test]
    fn test_lsb_first_layout() {
        // "AB" at 9 bits: 0x041 then 0x042 after a 24-bit header.
        let mut buf = [0u8; 8];
        let mut cursor = BitCursor::at(24);
        cursor.put_code(&mut buf, 0x41, 9);
        cursor.put_code(&mut buf, 0x42, 9);
        assert_eq!(&buf[3..6], &[0x41, 0x84, 0x00]);
        assert_eq!(cursor.position(), 42);
    }

    #[test]
    fn test_sixteen_bit_codes() {
        let mut buf = [0u8; 16];
        let mut writer = BitCursor::at(3);
        writer.put_code(&mut buf, 0xFFFF, 16);
        writer.put_code(&mut buf, 0x8001, 16);

        let mut reader = BitCursor::at(3);
        assert_eq!(reader.get_code(&buf, 16), 0xFFFF);
        assert_eq!(reader.get_code(&buf, 16), 0x8001);
    }

    #[test]
    fn test_alignment_padding() {
        assert_eq!(alignment_padding(0, 9), 0);
        assert_eq!(alignment_padding(72, 9), 0);
        assert_eq!(alignment_padding(9, 9), 63);
        assert_eq!(alignment_padding(80, 10), 0);
        assert_eq!(alignment_padding(81, 10), 79);
    }

    #[test]
    fn test_align_starts_new_epoch() {
        let mut buf = [0u8; 32];
        let mut cursor = BitCursor::at(24);
        for _ in 0..3 {
            cursor.put_code(&mut buf, 0x100, 9);
        }
        assert_eq!(cursor.epoch_bits(), 27);

        let skipped = cursor.align(9);
        assert_eq!(skipped, 45);
        assert_eq!(cursor.position(), 24 + 72);
        assert_eq!(cursor.epoch_bits(), 0);

        // Aligning again at an epoch boundary is a no-op.
        assert_eq!(cursor.align(10), 0);
    }

    #[test]
    fn test_rebase_keeps_fraction() {
        let mut buf = [0u8; 16];
        let mut cursor = BitCursor::new();
        cursor.put_code(&mut buf, 0x1AB, 9);
        cursor.put_code(&mut buf, 0x0CD, 9);
        assert_eq!(cursor.whole_bytes(), 2);

        cursor.rebase(2);
        assert_eq!(cursor.position(), 2);
        assert_eq!(cursor.epoch_bits(), 18);
        assert!(cursor.fits(3, 9));
        assert!(!cursor.fits(1, 9));
    }
}
