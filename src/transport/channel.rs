//! Channel-backed transport.
//!
//! Each registered client is an unbounded tokio sender of WebSocket
//! messages. Sending never blocks, which is what lets the broker call it
//! under its lock; the connection's writer task drains the other end.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc::UnboundedSender;
use tungstenite::protocol::Message as WsMessage;

use super::Transport;
use crate::client::{Client, ClientId};
use crate::utils::error::TransportError;

#[derive(Debug, Default)]
pub struct ChannelTransport {
    clients: Mutex<HashMap<ClientId, UnboundedSender<WsMessage>>>,
}

impl ChannelTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a client's outbound channel. Must happen before the broker
    /// sees the connection, since it immediately sends `CONNECTED`.
    pub fn register(&self, client: Client) {
        self.lock().insert(client.id, client.sender);
    }

    /// Forget a client without sending a close message.
    pub fn unregister(&self, client: ClientId) -> bool {
        self.lock().remove(&client).is_some()
    }

    pub fn is_registered(&self, client: ClientId) -> bool {
        self.lock().contains_key(&client)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<ClientId, UnboundedSender<WsMessage>>> {
        self.clients.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Transport for ChannelTransport {
    fn send(&self, client: ClientId, frame: &str) -> Result<(), TransportError> {
        let clients = self.lock();
        let sender = clients
            .get(&client)
            .ok_or(TransportError::UnknownClient(client))?;
        sender
            .send(WsMessage::text(frame.to_string()))
            .map_err(|_| TransportError::ChannelClosed(client))
    }

    fn close(&self, client: ClientId) -> Result<(), TransportError> {
        let sender = self
            .lock()
            .remove(&client)
            .ok_or(TransportError::UnknownClient(client))?;
        sender
            .send(WsMessage::Close(None))
            .map_err(|_| TransportError::ChannelClosed(client))
    }
}
