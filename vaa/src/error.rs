use thiserror::Error;

/// Decoding failures. All of them are terminal: callers fix the bytes, the
/// decoder never retries.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// Input ended before the field being read
    #[error("UnexpectedEof")]
    UnexpectedEof,

    /// Emitter address length prefix was not 32
    #[error("InvalidAddressLength")]
    InvalidAddressLength,

    /// Input continues past the end of the encoding
    #[error("TrailingBytes")]
    TrailingBytes,

    /// A 256-bit amount used more than its low 128 bits
    #[error("AmountTooHigh")]
    AmountTooHigh,
}
