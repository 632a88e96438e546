//! The `transport` module is the boundary between the broker and the network.
//!
//! The broker only needs two outbound capabilities per client, captured by
//! the [`Transport`] trait. Inbound events flow the other way: a binding
//! calls [`Broker::on_connection`], [`Broker::on_message`] and
//! [`Broker::on_close`] as its connections open, receive data and end.
//!
//! [`ChannelTransport`] implements the trait over per-client tokio channels,
//! and [`websocket`] wires it to a WebSocket listener.
//!
//! [`Broker::on_connection`]: crate::broker::Broker::on_connection
//! [`Broker::on_message`]: crate::broker::Broker::on_message
//! [`Broker::on_close`]: crate::broker::Broker::on_close

pub mod channel;
pub mod websocket;

use std::sync::Arc;

use crate::client::ClientId;
use crate::utils::error::TransportError;

pub use channel::ChannelTransport;
pub use websocket::start_websocket_server;

/// Outbound capabilities the broker requires from a transport.
///
/// Both calls are made while the broker lock is held, so implementations
/// must not block.
pub trait Transport: Send + Sync {
    /// Best-effort delivery of one fully encoded frame.
    fn send(&self, client: ClientId, frame: &str) -> Result<(), TransportError>;

    /// Request transport-level teardown of one client.
    fn close(&self, client: ClientId) -> Result<(), TransportError>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn send(&self, client: ClientId, frame: &str) -> Result<(), TransportError> {
        (**self).send(client, frame)
    }

    fn close(&self, client: ClientId) -> Result<(), TransportError> {
        (**self).close(client)
    }
}

#[cfg(test)]
mod websocket_tests;
