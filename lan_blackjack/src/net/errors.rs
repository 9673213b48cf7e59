//! Network error types for wire codec and protocol operations.

use thiserror::Error;

/// Errors that can occur while encoding or decoding protocol frames
#[derive(Debug, Eq, Error, PartialEq)]
pub enum WireError {
    /// Frame length does not match the fixed message layout
    #[error("Frame is {actual} bytes, expected {expected}")]
    Length { expected: usize, actual: usize },

    /// Frame does not start with the magic cookie
    #[error("Bad magic cookie: {0:#010x}")]
    BadCookie(u32),

    /// Message type tag does not match the expected message
    #[error("Unexpected message type tag: {0:#04x}")]
    BadTypeTag(u8),

    /// Card rank outside 1..=13
    #[error("Card rank {0} is out of range")]
    RankOutOfRange(u16),

    /// Suit code outside 0..=3
    #[error("Suit code {0} is out of range")]
    SuitOutOfRange(u8),

    /// Result code outside 0..=3
    #[error("Result code {0} is out of range")]
    ResultOutOfRange(u8),

    /// A session of zero rounds is meaningless
    #[error("Round count must be at least 1")]
    ZeroRounds,

    /// Decision token is neither hit nor stand
    #[error("Unrecognized decision token")]
    UnrecognizedDecision,
}

/// Result type for wire codec operations
pub type Result<T> = std::result::Result<T, WireError>;
