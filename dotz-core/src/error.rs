//! Error types for dotz operations.
//!
//! Every failure of the codec is reported as a [`DotzError`] value. Errors
//! are terminal for the stream that produced them: once an encoder or
//! decoder has returned an error, later calls report a usage error.

use std::io;
use thiserror::Error;

/// Broad classification of a [`DotzError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The caller broke the streaming contract.
    Usage,
    /// The input does not start with a valid `.Z` header.
    Format,
    /// The header declares a code width this build cannot handle.
    UnsupportedWidth,
    /// The code stream references entries that cannot exist.
    CorruptStream,
    /// An underlying reader or writer failed.
    Io,
}

/// The main error type for dotz operations.
#[derive(Debug, Error)]
pub enum DotzError {
    /// I/O error from underlying reader/writer.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The two magic bytes do not match `1F 9D`.
    #[error("Invalid magic number: expected [1f, 9d], found {found:02x?}")]
    InvalidMagic {
        /// The bytes found where the magic number was expected.
        found: [u8; 2],
    },

    /// The header is malformed or incomplete.
    #[error("Invalid header: {message}")]
    InvalidHeader {
        /// Description of the header error.
        message: String,
    },

    /// The header's maximum code width is outside the supported range.
    #[error("Unsupported code width: {bits} bits (supported range 9..={max})")]
    UnsupportedWidth {
        /// Width declared by the stream.
        bits: u8,
        /// Largest width this build decodes.
        max: u8,
    },

    /// An illegal code was read from the stream.
    #[error("Corrupt stream at bit position {bit_position}: {message}")]
    CorruptStream {
        /// Bit offset of the offending code, counted from the start of the stream.
        bit_position: u64,
        /// Description of the corruption.
        message: String,
    },

    /// The streaming API was misused.
    #[error("Usage error: {message}")]
    Usage {
        /// What the caller did wrong.
        message: String,
    },
}

/// Result type alias for dotz operations.
pub type Result<T> = std::result::Result<T, DotzError>;

impl DotzError {
    /// Create an invalid magic error.
    pub fn invalid_magic(found: [u8; 2]) -> Self {
        Self::InvalidMagic { found }
    }

    /// Create an invalid header error.
    pub fn invalid_header(message: impl Into<String>) -> Self {
        Self::InvalidHeader {
            message: message.into(),
        }
    }

    /// Create an error for a stream that ended inside its 3-byte header.
    pub fn truncated_header(available: usize) -> Self {
        Self::invalid_header(format!(
            "stream ended after {available} of 3 header bytes"
        ))
    }

    /// Create an unsupported width error.
    pub fn unsupported_width(bits: u8, max: u8) -> Self {
        Self::UnsupportedWidth { bits, max }
    }

    /// Create a corrupt stream error.
    pub fn corrupt_stream(bit_position: u64, message: impl Into<String>) -> Self {
        Self::CorruptStream {
            bit_position,
            message: message.into(),
        }
    }

    /// Create a usage error.
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage {
            message: message.into(),
        }
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Io(_) => ErrorKind::Io,
            Self::InvalidMagic { .. } | Self::InvalidHeader { .. } => ErrorKind::Format,
            Self::UnsupportedWidth { .. } => ErrorKind::UnsupportedWidth,
            Self::CorruptStream { .. } => ErrorKind::CorruptStream,
            Self::Usage { .. } => ErrorKind::Usage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DotzError::invalid_magic([0x1F, 0x8B]);
        assert!(err.to_string().contains("Invalid magic"));
        assert!(err.to_string().contains("8b"));

        let err = DotzError::unsupported_width(17, 16);
        assert!(err.to_string().contains("17 bits"));

        let err = DotzError::corrupt_stream(96, "code 300 beyond next free entry 260");
        assert!(err.to_string().contains("bit position 96"));
    }

    #[test]
    fn test_error_kind() {
        assert_eq!(DotzError::invalid_magic([0, 0]).kind(), ErrorKind::Format);
        assert_eq!(DotzError::truncated_header(2).kind(), ErrorKind::Format);
        assert_eq!(
            DotzError::unsupported_width(17, 16).kind(),
            ErrorKind::UnsupportedWidth
        );
        assert_eq!(
            DotzError::corrupt_stream(0, "bad").kind(),
            ErrorKind::CorruptStream
        );
        assert_eq!(DotzError::usage("no buffers").kind(), ErrorKind::Usage);
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: DotzError = io_err.into();
        assert!(matches!(err, DotzError::Io(_)));
        assert_eq!(err.kind(), ErrorKind::Io);
    }
}
