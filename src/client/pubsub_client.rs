use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::mpsc::UnboundedSender;
use tungstenite::protocol::Message as WsMessage;

static NEXT_CLIENT_ID: AtomicU64 = AtomicU64::new(1);

/// Transport-independent identity of a connected client.
///
/// Bindings assign one per connection with [`ClientId::next`] and translate
/// their native handle to and from it. The broker only ever uses it as a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClientId(u64);

impl ClientId {
    /// Next process-wide identity; monotonically increasing.
    pub fn next() -> Self {
        Self(NEXT_CLIENT_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl From<u64> for ClientId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "client-{}", self.0)
    }
}

/// Represents a connected WebSocket client.
///
/// Holds the sending side of the per-connection channel; the connection's
/// writer task owns the receiving side and forwards to the socket.
#[derive(Debug)]
pub struct Client {
    pub id: ClientId,

    /// Channel to send WebSocket messages to the client.
    pub sender: UnboundedSender<WsMessage>,
}

impl Client {
    /// Create a client with a freshly assigned id.
    pub fn new(sender: UnboundedSender<WsMessage>) -> Self {
        Self::with_id(ClientId::next(), sender)
    }

    pub fn with_id(id: ClientId, sender: UnboundedSender<WsMessage>) -> Self {
        Self { id, sender }
    }
}
