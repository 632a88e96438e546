//! Line-oriented STOMP codec.
//!
//! `decode` is a left inverse of `encode` up to whitespace: decoding an
//! encoded frame gives back the same command and headers, and the body with
//! leading/trailing whitespace removed.

use super::{CONTENT_LENGTH, Frame};
use crate::utils::error::FrameError;

/// Serialize a frame to its wire text.
///
/// A `content-length` header equal to the body's byte length is appended
/// after the caller's headers unless one is already present. The frame is
/// terminated with a single NUL.
pub fn encode(frame: &Frame) -> String {
    let mut out = String::with_capacity(frame.command.len() + frame.body.len() + 64);

    out.push_str(&frame.command);
    out.push('\n');

    for (key, value) in frame.headers.iter() {
        out.push_str(key);
        out.push(':');
        out.push_str(value);
        out.push('\n');
    }

    if !frame.headers.contains(CONTENT_LENGTH) {
        out.push_str(CONTENT_LENGTH);
        out.push(':');
        out.push_str(&frame.body.len().to_string());
        out.push('\n');
    }

    out.push('\n');
    out.push_str(&frame.body);
    out.push('\0');
    out
}

/// Parse wire text into a frame.
///
/// The first line is the command. Header lines follow until the first blank
/// line; everything after it is the body. A trailing line with no newline
/// that shows up before any blank line is taken as the body as well.
pub fn decode(data: &str) -> Result<Frame, FrameError> {
    let (command, mut rest) = data.split_once('\n').ok_or(FrameError::MissingCommand)?;
    let mut frame = Frame::new(command.trim());

    while !rest.is_empty() {
        let Some((line, tail)) = rest.split_once('\n') else {
            frame.body = trim_body(rest).to_string();
            break;
        };

        let line = line.trim();
        if line.is_empty() {
            frame.body = trim_body(tail).to_string();
            break;
        }

        let (key, value) = line
            .split_once(':')
            .ok_or_else(|| FrameError::InvalidHeader(line.to_string()))?;
        frame.headers.set(key.trim(), value.trim());
        rest = tail;
    }

    Ok(frame)
}

fn trim_body(body: &str) -> &str {
    body.trim_matches(|c: char| c.is_whitespace() || c == '\0')
}
