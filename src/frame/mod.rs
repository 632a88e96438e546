//! STOMP frames and their wire codec.
//!
//! A [`Frame`] is one protocol message unit: a command, an ordered header
//! block and a text body. The codec in [`codec`] turns frames into the wire
//! text and back:
//!
//! ```text
//! COMMAND\n
//! key:value\n
//! ...
//! \n
//! body\0
//! ```
//!
//! The command is an unconstrained string here; the broker decides which
//! commands it accepts. No header escaping is performed, so `\n`, `:` and NUL
//! inside header names or values corrupt the frame.

pub mod codec;

use std::fmt;
use std::str::FromStr;

pub use codec::{decode, encode};

use crate::utils::error::FrameError;

pub const CONNECT: &str = "CONNECT";
pub const CONNECTED: &str = "CONNECTED";
pub const SUBSCRIBE: &str = "SUBSCRIBE";
pub const SEND: &str = "SEND";
pub const MESSAGE: &str = "MESSAGE";
pub const UNSUBSCRIBE: &str = "UNSUBSCRIBE";
pub const DISCONNECT: &str = "DISCONNECT";
pub const RECEIPT: &str = "RECEIPT";
pub const ERROR: &str = "ERROR";

pub const CONTENT_LENGTH: &str = "content-length";

/// Ordered header block with unique keys.
///
/// Setting a key that is already present overwrites the value in place, so
/// the serialized order is the order in which keys were first inserted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers(Vec<(String, String)>);

impl Headers {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.iter().any(|(k, _)| k == key)
    }

    /// Insert or overwrite a header, keeping the original position on overwrite.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        let pos = self.0.iter().position(|(k, _)| k == key)?;
        Some(self.0.remove(pos).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Headers
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Headers::new();
        for (k, v) in iter {
            headers.set(k, v);
        }
        headers
    }
}

/// A single STOMP frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    pub command: String,
    pub headers: Headers,
    pub body: String,
}

impl Frame {
    /// Create a frame with no headers and an empty body.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            headers: Headers::new(),
            body: String::new(),
        }
    }

    /// Builder-style header setter.
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.set(key, value);
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    pub fn set_header(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.headers.set(key, value);
    }

    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key)
    }

    /// Serialize to wire text. See [`codec::encode`].
    pub fn encode(&self) -> String {
        encode(self)
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl FromStr for Frame {
    type Err = FrameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode(s)
    }
}
