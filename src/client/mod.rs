//! The `client` module defines how a connected client is identified.
//!
//! [`ClientId`] is the opaque key the broker uses for every per-client map.
//! [`Client`] pairs that id with the outbound channel used by the WebSocket
//! binding.

pub mod pubsub_client;
pub use pubsub_client::{Client, ClientId};
