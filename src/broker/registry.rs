//! Connection registry
//!
//! One [`ClientSession`] per connected client, keyed by [`ClientId`]. The
//! session owns the client's view of its subscriptions (subscription id to
//! destination); the [`SubscriptionIndex`](super::index::SubscriptionIndex)
//! holds the inverse. The broker updates both together.

use std::collections::HashMap;

use crate::client::ClientId;

/// Per-client protocol state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Session created, `CONNECTED` not yet sent.
    Connecting,
    Connected,
    /// Terminal. Reported for clients that have no session.
    Disconnected,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSession {
    pub session_id: String,
    pub state: ConnectionState,
    /// subscription id -> destination
    pub subscriptions: HashMap<String, String>,
}

impl ClientSession {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            state: ConnectionState::Connecting,
            subscriptions: HashMap::new(),
        }
    }

    pub fn destination(&self, subscription_id: &str) -> Option<&str> {
        self.subscriptions.get(subscription_id).map(String::as_str)
    }
}

#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    sessions: HashMap<ClientId, ClientSession>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a session, returning the one it replaced.
    pub fn insert(&mut self, client: ClientId, session: ClientSession) -> Option<ClientSession> {
        self.sessions.insert(client, session)
    }

    pub fn get(&self, client: ClientId) -> Option<&ClientSession> {
        self.sessions.get(&client)
    }

    pub fn get_mut(&mut self, client: ClientId) -> Option<&mut ClientSession> {
        self.sessions.get_mut(&client)
    }

    pub fn remove(&mut self, client: ClientId) -> Option<ClientSession> {
        self.sessions.remove(&client)
    }

    pub fn contains(&self, client: ClientId) -> bool {
        self.sessions.contains_key(&client)
    }

    pub fn state(&self, client: ClientId) -> ConnectionState {
        self.sessions
            .get(&client)
            .map_or(ConnectionState::Disconnected, |s| s.state)
    }

    /// Connected clients in ascending id order, i.e. connection order.
    pub fn clients(&self) -> Vec<ClientId> {
        let mut clients: Vec<ClientId> = self.sessions.keys().copied().collect();
        clients.sort();
        clients
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn clear(&mut self) {
        self.sessions.clear();
    }
}
