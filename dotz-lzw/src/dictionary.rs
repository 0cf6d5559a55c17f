//! LZW dictionaries.
//!
//! The encoder and decoder keep different views of the same implicit
//! dictionary:
//!
//! - [`HashDictionary`] maps a (prefix code, next byte) pair to the code it
//!   was assigned, using open addressing with double hashing over 2^17
//!   slots. The secondary strides are the classic compress(1) table.
//! - [`CodeTable`] is indexed directly by code and stores each entry's
//!   prefix code and final byte, which is all the decoder needs to rebuild
//!   a string.

use crate::config::{HASH_BITS, HASH_SIZE, ZConfig};

const HASH_MASK: u32 = (1 << HASH_BITS) - 1;

/// Marker for an unused hash slot. No real key reaches it, since keys use
/// at most 24 bits.
const EMPTY: u32 = u32::MAX;

/// Secondary hash strides, indexed by the byte being appended.
#[rustfmt::skip]
static PRIMETAB: [i32; 256] = [
    1013, -1061, 1109, -1181, 1231, -1291, 1361, -1429,
    1481, -1531, 1583, -1627, 1699, -1759, 1831, -1889,
    1973, -2017, 2083, -2137, 2213, -2273, 2339, -2383,
    2441, -2531, 2593, -2663, 2707, -2753, 2819, -2887,
    2957, -3023, 3089, -3181, 3251, -3313, 3361, -3449,
    3511, -3557, 3617, -3677, 3739, -3821, 3881, -3931,
    4013, -4079, 4139, -4219, 4271, -4349, 4423, -4493,
    4561, -4639, 4691, -4783, 4831, -4931, 4973, -5023,
    5101, -5179, 5261, -5333, 5413, -5471, 5521, -5591,
    5659, -5737, 5807, -5857, 5923, -6029, 6089, -6151,
    6221, -6287, 6343, -6397, 6491, -6571, 6659, -6709,
    6791, -6857, 6917, -6983, 7043, -7129, 7213, -7297,
    7369, -7477, 7529, -7577, 7643, -7703, 7789, -7873,
    7933, -8017, 8093, -8171, 8237, -8297, 8387, -8461,
    8543, -8627, 8689, -8741, 8819, -8867, 8963, -9029,
    9109, -9181, 9241, -9323, 9397, -9439, 9511, -9613,
    9677, -9743, 9811, -9871, 9941, -10061, 10111, -10177,
    10259, -10321, 10399, -10477, 10567, -10639, 10711, -10789,
    10867, -10949, 11047, -11113, 11173, -11261, 11329, -11423,
    11491, -11587, 11681, -11777, 11827, -11903, 11959, -12041,
    12109, -12197, 12263, -12343, 12413, -12487, 12541, -12611,
    12671, -12757, 12829, -12917, 12979, -13043, 13127, -13187,
    13291, -13367, 13451, -13523, 13619, -13691, 13751, -13829,
    13901, -13967, 14057, -14153, 14249, -14341, 14419, -14489,
    14557, -14633, 14717, -14767, 14831, -14897, 14983, -15083,
    15149, -15233, 15289, -15359, 15427, -15497, 15583, -15649,
    15733, -15791, 15881, -15937, 16057, -16097, 16189, -16267,
    16363, -16447, 16529, -16619, 16691, -16763, 16879, -16937,
    17021, -17093, 17183, -17257, 17341, -17401, 17477, -17551,
    17623, -17713, 17791, -17891, 17957, -18041, 18097, -18169,
    18233, -18307, 18379, -18451, 18523, -18637, 18731, -18803,
    18919, -19031, 19121, -19211, 19273, -19381, 19429, -19477,
];

/// Composite key for a (prefix code, next byte) pair.
#[inline]
fn pair_key(prefix: u16, byte: u8) -> u32 {
    (u32::from(prefix) << 8) | u32::from(byte)
}

/// Encoder-side dictionary: (prefix, byte) → code.
#[derive(Debug, Clone)]
pub struct HashDictionary {
    /// Packed pair stored in each slot, or [`EMPTY`].
    keys: Box<[u32]>,
    /// Code assigned to the pair in the same slot.
    codes: Box<[u16]>,
    /// Next code to hand out.
    next_code: u32,
    /// Code handed out first after a clear.
    first_code: u16,
    /// One past the largest code that may be assigned.
    code_limit: u32,
}

impl HashDictionary {
    /// Create an empty dictionary for `config`.
    pub fn new(config: &ZConfig) -> Self {
        Self {
            keys: vec![EMPTY; HASH_SIZE].into_boxed_slice(),
            codes: vec![0u16; HASH_SIZE].into_boxed_slice(),
            next_code: u32::from(config.first_code()),
            first_code: config.first_code(),
            code_limit: config.code_limit(),
        }
    }

    /// Look up `prefix` extended by `byte`.
    ///
    /// Returns the existing code on a hit. On a miss the pair is assigned
    /// the next free code, unless the code space is exhausted, and `None`
    /// is returned; the caller then emits `prefix` and starts over from
    /// `byte`.
    pub fn lookup_or_insert(&mut self, prefix: u16, byte: u8) -> Option<u16> {
        let key = pair_key(prefix, byte);
        let mut slot = ((u32::from(byte) << (HASH_BITS - 8)) ^ u32::from(prefix)) & HASH_MASK;
        let stride = PRIMETAB[usize::from(byte)] as u32;

        loop {
            let stored = self.keys[slot as usize];
            if stored == key {
                return Some(self.codes[slot as usize]);
            }
            if stored == EMPTY {
                break;
            }
            slot = slot.wrapping_add(stride) & HASH_MASK;
        }

        if !self.is_full() {
            self.keys[slot as usize] = key;
            self.codes[slot as usize] = self.next_code as u16;
            self.next_code += 1;
        }
        None
    }

    /// Forget every pair and restart code assignment.
    pub fn clear(&mut self) {
        self.keys.fill(EMPTY);
        self.next_code = u32::from(self.first_code);
    }

    /// Whether every code up to `2^max_bits - 1` has been assigned.
    pub fn is_full(&self) -> bool {
        self.next_code >= self.code_limit
    }

    /// The code the next insertion will receive.
    pub fn next_code(&self) -> u32 {
        self.next_code
    }

    /// Number of pairs currently stored.
    pub fn len(&self) -> usize {
        (self.next_code - u32::from(self.first_code)) as usize
    }

    /// Whether no pair has been stored since the last clear.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Decoder-side dictionary: code → (prefix code, last byte).
///
/// Codes below 256 are their own single-byte strings and never change.
#[derive(Debug, Clone)]
pub struct CodeTable {
    prefix: Box<[u16]>,
    suffix: Box<[u8]>,
}

impl CodeTable {
    /// Number of entries, enough for 16-bit codes.
    pub const SIZE: usize = 1 << 16;

    /// Create a table holding only the 256 literal codes.
    pub fn new() -> Self {
        let mut suffix = vec![0u8; Self::SIZE].into_boxed_slice();
        for (code, slot) in suffix.iter_mut().take(256).enumerate() {
            *slot = code as u8;
        }
        Self {
            prefix: vec![0u16; Self::SIZE].into_boxed_slice(),
            suffix,
        }
    }

    /// Define `code` as the string of `prefix` followed by `last`.
    ///
    /// `prefix` must be smaller than `code`, which keeps every chain finite.
    #[inline]
    pub fn define(&mut self, code: u16, prefix: u16, last: u8) {
        debug_assert!(prefix < code);
        self.prefix[usize::from(code)] = prefix;
        self.suffix[usize::from(code)] = last;
    }

    /// Push the string for `code` onto `stack` in reverse order and return
    /// its first byte. Popping the stack yields the string front to back.
    pub fn unroll(&self, mut code: u16, stack: &mut Vec<u8>) -> u8 {
        while code >= 256 {
            stack.push(self.suffix[usize::from(code)]);
            code = self.prefix[usize::from(code)];
        }
        let first = code as u8;
        stack.push(first);
        first
    }

    /// Drop every defined entry.
    pub fn clear(&mut self) {
        self.prefix[256..].fill(0);
        self.suffix[256..].fill(0);
    }
}

impl Default for CodeTable {
    fn default() -> Self {
        Self::new()
    }
}
