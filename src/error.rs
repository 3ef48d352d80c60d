use std::io;

use thiserror::Error;

/// Convenience result type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by the encode and decode pipelines.
#[derive(Debug, Error)]
pub enum Error {
    /// The command line did not match the expected shape.
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    /// A file could not be opened; `role` names which stream it was meant
    /// to serve.
    #[error("cannot open {role} file {path}: {source}")]
    ResourceUnavailable {
        role: &'static str,
        path: String,
        #[source]
        source: io::Error,
    },

    /// A read or write on an already-open stream failed.
    #[error("stream failure: {0}")]
    Io(#[from] io::Error),

    /// A codebook row could not be parsed under strict parsing.
    #[error("malformed codebook row at line {line}: {reason}")]
    MalformedCodebookRow { line: usize, reason: &'static str },

    /// The encoded stream walked off the decode tree; `bit_position` is
    /// the 1-based position of the offending bit.
    #[error("invalid codeword at bit position {bit_position}")]
    InvalidCodeword { bit_position: u64 },

    /// Decoding finished with a different symbol count than the codebook
    /// promised.
    #[error("symbol count mismatch: decoded {decoded}, expected {expected}")]
    SymbolCountMismatch { decoded: u64, expected: u64 },
}
