//! Error types for TUIO decoding

use thiserror::Error;

/// Result type alias for decoding operations
pub type Result<T> = std::result::Result<T, DecodeError>;

/// Errors raised while turning a datagram into cursor data.
///
/// None of these are fatal: the receive loop drops the offending
/// datagram and keeps going.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    /// The datagram is not valid OSC
    #[error("osc decode error: {0}")]
    Osc(String),

    /// A command message is shorter than its fixed layout
    #[error("'{command}' message is missing argument {index}")]
    MissingArgument { command: &'static str, index: usize },

    /// An argument has the wrong OSC type
    #[error("'{command}' argument {index} should be {expected}")]
    UnexpectedType {
        command: &'static str,
        index: usize,
        expected: &'static str,
    },

    /// A cursor bundle without an alive list
    #[error("cursor bundle has no '{0}' message")]
    MissingCommand(&'static str),
}

impl From<rosc::OscError> for DecodeError {
    fn from(e: rosc::OscError) -> Self {
        DecodeError::Osc(format!("{:?}", e))
    }
}
