//! Outbound frame construction
//!
//! The broker emits four commands: `CONNECTED` when a client attaches,
//! `MESSAGE` for each delivery, `RECEIPT` when a client asked for one and
//! `ERROR` when a frame is rejected. `message-id` values are fresh tokens.

use crate::frame::{CONNECTED, ERROR, Frame, MESSAGE, RECEIPT};
use crate::utils::id;

pub const DEFAULT_CONTENT_TYPE: &str = "text/plain";

pub fn connected_frame(session_id: &str, server: &str, version: &str) -> Frame {
    Frame::new(CONNECTED)
        .with_header("session-id", session_id)
        .with_header("server", server)
        .with_header("version", version)
}

/// A `MESSAGE` frame carrying `destination`, a new `message-id` and a
/// `content-type` that defaults to `text/plain`. The `subscription` header
/// is set per recipient at fan-out.
pub fn message_frame(destination: &str, content_type: Option<&str>, body: impl Into<String>) -> Frame {
    Frame::new(MESSAGE)
        .with_header("destination", destination)
        .with_header("message-id", id::new_token())
        .with_header("content-type", content_type.unwrap_or(DEFAULT_CONTENT_TYPE))
        .with_body(body)
}

pub fn receipt_frame(receipt_id: &str) -> Frame {
    Frame::new(RECEIPT).with_header("receipt-id", receipt_id)
}

pub fn error_frame(message: &str) -> Frame {
    Frame::new(ERROR).with_header("message", message)
}
