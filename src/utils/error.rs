//! The `error` module defines the error types used within `stompsub`.
//!
//! Errors are split by the layer that raises them:
//!
//! - [`FrameError`]: the codec could not make sense of an inbound payload.
//! - [`ProtocolError`]: a frame decoded fine but the broker refuses it. The
//!   `Display` text is exactly what goes into the `message` header of the
//!   `ERROR` frame sent back to the client.
//! - [`TransportError`]: a send or close at the transport boundary failed.
//!   These are only logged; the peer may already be gone.

use thiserror::Error;

use crate::client::ClientId;

/// Decode failures raised by [`crate::frame::decode`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// The payload has no newline, so there is no command line.
    #[error("Invalid STOMP frame: missing command")]
    MissingCommand,

    /// A header line without a `:` separator.
    #[error("Invalid header format: {0}")]
    InvalidHeader(String),
}

/// Protocol-level failures reported to the originating client as an `ERROR` frame.
///
/// None of these close the connection.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Error processing message: {0}")]
    MalformedFrame(#[from] FrameError),

    /// Missing required header or unknown subscription id.
    #[error("{0}")]
    Validation(String),

    #[error("Unsupported command: {0}")]
    UnsupportedCommand(String),
}

impl ProtocolError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

/// Failures at the transport boundary.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The transport holds no live handle for this client.
    #[error("no transport registered for {0}")]
    UnknownClient(ClientId),

    /// The client's outbound channel was dropped by its writer task.
    #[error("outbound channel closed for {0}")]
    ChannelClosed(ClientId),
}
