//! # dotz Core
//!
//! Core components shared by the dotz crates.
//!
//! - [`bitstream`]: LSB-first packing of 9 to 16 bit codes with epoch alignment
//! - [`traits`]: Streaming [`Compressor`] / [`Decompressor`] traits
//! - [`stream`]: Drivers that pump a reader through a codec into a writer
//! - [`error`]: Error types
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ dotz CLI                                    │
//! ├─────────────────────────────────────────────┤
//! │ dotz-lzw: .Z header, dictionary, encoder,   │
//! │           decoder, session                  │
//! ├─────────────────────────────────────────────┤
//! │ dotz-core (this crate): BitCursor, traits,  │
//! │           stream drivers, errors            │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use dotz_core::bitstream::BitCursor;
//!
//! let mut buf = [0u8; 6];
//! let mut cursor = BitCursor::at(0);
//! cursor.put_code(&mut buf, 0x41, 9);
//! cursor.put_code(&mut buf, 0x42, 9);
//! assert_eq!(&buf[..3], &[0x41, 0x84, 0x00]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]
#![allow(clippy::module_name_repetitions)]

pub mod bitstream;
pub mod error;
pub mod stream;
pub mod traits;

// Re-exports for convenience
pub use bitstream::BitCursor;
pub use error::{DotzError, ErrorKind, Result};
pub use stream::{StreamStats, compress_stream, decompress_stream};
pub use traits::{Compressor, Decompressor, FlushMode, Status};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::bitstream::BitCursor;
    pub use crate::error::{DotzError, ErrorKind, Result};
    pub use crate::stream::{StreamStats, compress_stream, decompress_stream};
    pub use crate::traits::{Compressor, Decompressor, FlushMode, Status};
}
