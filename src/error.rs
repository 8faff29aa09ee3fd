//! Error types for the tag registry

use std::io;

use thiserror::Error;

/// Field-level failure while parsing a tag from its string form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TagParseError {
    /// A numeric field was not valid in its expected radix or overflowed 16 bits.
    #[error("invalid {field}: {value:?} is not a valid {kind} u16")]
    InvalidNumber {
        field: &'static str,
        value: String,
        kind: &'static str,
    },

    /// A byte field was not valid hexadecimal.
    #[error("invalid {field}: {value:?} is not valid hex")]
    InvalidHex { field: &'static str, value: String },

    /// A required field was empty.
    #[error("missing {field}")]
    Missing { field: &'static str },
}

/// The tag store actor is no longer running.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("tag store unavailable: {0}")]
    Unavailable(&'static str),
}

/// The client registry actor is no longer running.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("client registry unavailable: {0}")]
    Unavailable(&'static str),
}

/// Failure to hand a message to one session's outbound queue.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    /// The session's writer has stopped; the socket is gone.
    #[error("outbound channel closed")]
    Closed,

    /// The queue stayed full for the whole delivery timeout.
    #[error("outbound queue did not drain in time")]
    TimedOut,
}

/// An inbound frame that is not a well-formed message.
#[derive(Debug, Error)]
#[error("malformed message: {0}")]
pub struct DecodeError(#[from] serde_json::Error);

/// Errors from binding or running the server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("transport error: {0}")]
    Io(#[from] io::Error),
}
