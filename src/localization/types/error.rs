//! Custom error types for the ace7-localization crate.

use thiserror::Error;

/// The primary error type for all operations in this crate.
#[derive(Debug, Error)]
pub enum LocalizationError {
    /// An error originating from I/O operations.
    #[error("I/O error: {0:?}")]
    Io(#[from] std::io::Error),

    /// The container is structurally invalid (negative lengths, bad text, impossible counts).
    #[error("Malformed container: {0}")]
    MalformedContainer(String),

    /// A declared field length runs past the end of the buffer.
    #[error("Truncated {context}: needed {needed} bytes, but only {remaining} remain")]
    Truncated {
        context: &'static str,
        needed: u64,
        remaining: u64,
    },

    /// An error occurred during decompression, usually a wrong cipher seed or corrupted data.
    #[error("Decompression failed: {0}")]
    DecompressionError(String),

    /// An error occurred while compressing a payload for writing.
    #[error("Compression failed: {0}")]
    CompressionError(String),

    /// The language letter is outside the supported `A`..=`M` range.
    #[error("Unknown language letter: {0:?}. Expected one of A-M.")]
    UnknownLanguageLetter(char),
}

/// A convenience `Result` type alias using the crate's `LocalizationError` type.
pub type Result<T> = std::result::Result<T, LocalizationError>;
