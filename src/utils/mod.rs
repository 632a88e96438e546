//! The `utils` module provides shared definitions used across `stompsub`:
//! error types, tracing setup and token generation.

pub mod error;
pub mod id;
pub mod logging;

pub use error::{FrameError, ProtocolError, TransportError};
