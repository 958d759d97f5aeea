/// Errors that can occur while decoding or translating wire frames.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// The opcode token resolved to no known opcode.
    ///
    /// Frame classification rejects such frames before translation; seeing
    /// this from translation means the caller bypassed classification.
    #[error("unknown opcode {0:?}")]
    UnknownOpcode(String),

    /// The frame declared a character encoding this crate cannot resolve.
    #[error("unknown character encoding {0:?}")]
    UnknownEncoding(String),

    /// The token list does not have the arity its opcode category demands.
    ///
    /// Translation is only meant to see classified-complete frames, so this
    /// indicates a caller bug rather than bad wire input.
    #[error("frame has {actual} tokens, expected {expected}")]
    TokenCount { expected: usize, actual: usize },

    /// The run-mode token matched no known run mode.
    #[error("unknown run mode {0:?}")]
    UnknownRunMode(String),

    /// The elapsed-time field was neither the placeholder nor an integer.
    #[error("invalid elapsed-time field {token:?}: {source}")]
    InvalidElapsed {
        token: String,
        source: std::num::ParseIntError,
    },

    /// A field token was not valid Base64.
    #[error("invalid base64 field: {0}")]
    Base64(#[from] base64::DecodeError),

    /// An I/O error occurred while reading the byte stream.
    #[error("wire I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, WireError>;
