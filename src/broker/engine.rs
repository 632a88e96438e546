//! Broker engine
//!
//! This module contains the in-memory broker responsible for:
//! - tracking each client's session and subscriptions
//! - maintaining the destination -> subscriber index used for fan-out
//! - publishing messages to wire subscribers and in-process observers
//!
//! Concurrency and usage notes:
//! - The public API here is synchronous and designed to be held behind a
//!   lock (`SharedBroker`, an `Arc<Mutex<Broker>>`) by the transport layer.
//!   Every entry point takes `&mut self`, so one lock covers every
//!   registry/index update.
//! - Outbound frames go through [`Transport::send`], which must not block.
//!   Send failures are logged and collected; they never stop a fan-out.
//!
//! Command handling lives in [`super::commands`].

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use super::index::SubscriptionIndex;
use super::message;
use super::observers::{ObserverId, ObserverRegistry};
use super::registry::{ClientSession, ConnectionRegistry, ConnectionState};
use crate::client::ClientId;
use crate::config::BrokerSettings;
use crate::frame::{Frame, Headers};
use crate::transport::Transport;
use crate::utils::error::TransportError;
use crate::utils::id;

pub const SUBSCRIPTION: &str = "subscription";

/// A broker shared between connection tasks.
pub type SharedBroker<T> = Arc<Mutex<Broker<T>>>;

/// Lock a shared broker. A poisoned lock is recovered rather than propagated;
/// every mutation leaves registry and index consistent before returning.
pub fn lock<T: Transport>(broker: &SharedBroker<T>) -> MutexGuard<'_, Broker<T>> {
    broker.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Outcome of one fan-out.
#[derive(Debug, Default)]
pub struct FanOut {
    /// Wire subscribers the frame was handed to.
    pub delivered: usize,
    /// Observer callbacks invoked.
    pub observers: usize,
    pub failures: Vec<(ClientId, TransportError)>,
}

#[derive(Debug)]
pub struct Broker<T: Transport> {
    pub(super) transport: Arc<T>,
    pub(super) settings: BrokerSettings,
    pub(super) clients: ConnectionRegistry,
    pub(super) index: SubscriptionIndex,
    pub(super) observers: ObserverRegistry,
}

impl<T: Transport> Broker<T> {
    pub fn new(transport: Arc<T>) -> Self {
        Self::with_settings(transport, BrokerSettings::default())
    }

    pub fn with_settings(transport: Arc<T>, settings: BrokerSettings) -> Self {
        Self {
            transport,
            settings,
            clients: ConnectionRegistry::new(),
            index: SubscriptionIndex::new(),
            observers: ObserverRegistry::new(),
        }
    }

    /// Wrap into the `Arc<Mutex<_>>` shape the transport layer expects.
    pub fn into_shared(self) -> SharedBroker<T> {
        Arc::new(Mutex::new(self))
    }

    pub fn transport(&self) -> &Arc<T> {
        &self.transport
    }

    pub fn sessions(&self) -> &ConnectionRegistry {
        &self.clients
    }

    pub fn subscriptions(&self) -> &SubscriptionIndex {
        &self.index
    }

    pub fn observers(&self) -> &ObserverRegistry {
        &self.observers
    }

    pub fn session(&self, client: ClientId) -> Option<&ClientSession> {
        self.clients.get(client)
    }

    pub fn connection_state(&self, client: ClientId) -> ConnectionState {
        self.clients.state(client)
    }

    /// A new transport connection. Creates the session, sends `CONNECTED`
    /// and returns the generated session id.
    pub fn on_connection(&mut self, client: ClientId) -> String {
        if self.release_client(client) {
            warn!(%client, "connection event for a client that was already connected");
        }

        let session_id = id::new_token();
        self.clients
            .insert(client, ClientSession::new(session_id.clone()));

        let connected = message::connected_frame(
            &session_id,
            &self.settings.server_name,
            &self.settings.protocol_version,
        );
        let _ = self.send_frame(client, &connected);

        if let Some(session) = self.clients.get_mut(client) {
            session.state = ConnectionState::Connected;
        }
        info!(%client, session_id = %session_id, "client connected");
        session_id
    }

    /// One inbound payload. Non-UTF-8 bytes are replaced rather than rejected.
    ///
    /// Any rejection is answered with an `ERROR` frame; the connection stays
    /// open.
    pub fn on_message(&mut self, client: ClientId, data: impl AsRef<[u8]>) {
        if self.clients.state(client) != ConnectionState::Connected {
            warn!(%client, "dropping frame from client without an open session");
            return;
        }

        let text = String::from_utf8_lossy(data.as_ref());
        if let Err(err) = self.process_frame(client, &text) {
            debug!(%client, error = %err, "rejecting frame");
            let _ = self.send_frame(client, &message::error_frame(&err.to_string()));
        }
    }

    /// The transport connection ended.
    pub fn on_close(&mut self, client: ClientId) {
        self.disconnect(client);
    }

    /// Tear a client down: drop it from every destination, forget its
    /// session and ask the transport to close it. The close request is made
    /// even for unknown clients.
    pub fn disconnect(&mut self, client: ClientId) {
        if self.release_client(client) {
            info!(%client, "client disconnected");
        }

        if let Err(err) = self.transport.close(client) {
            debug!(%client, error = %err, "transport close failed");
        }
    }

    /// Publish `body` to `destination` from embedding code.
    ///
    /// The `MESSAGE` frame starts with `destination`, a fresh `message-id`
    /// and `content-type` (caller's or `text/plain`); `headers` are then
    /// applied on top and win on conflict.
    pub fn publish(&mut self, destination: &str, body: impl Into<String>, headers: Headers) -> FanOut {
        let mut frame = message::message_frame(destination, headers.get("content-type"), body);
        for (key, value) in headers.iter() {
            frame.set_header(key, value);
        }
        self.publish_frame(destination, frame)
    }

    /// Fan `frame` out to every subscriber of `destination`, then wildcard
    /// observers, then observers of `destination`.
    ///
    /// The `subscription` header is rewritten for each recipient before it is
    /// encoded, so observers see whatever the last recipient got.
    pub fn publish_frame(&mut self, destination: &str, mut frame: Frame) -> FanOut {
        let mut report = FanOut::default();

        for (client, subscription_id) in self.index.subscribers(destination) {
            frame.set_header(SUBSCRIPTION, subscription_id.as_str());
            match self.transport.send(*client, &frame.encode()) {
                Ok(()) => report.delivered += 1,
                Err(err) => {
                    warn!(client = %client, destination, error = %err, "failed to deliver message");
                    report.failures.push((*client, err));
                }
            }
        }

        report.observers = self.observers.notify(destination, &frame);

        debug!(
            destination,
            delivered = report.delivered,
            failed = report.failures.len(),
            observers = report.observers,
            "published message"
        );
        report
    }

    /// Observe every publish to `destination`.
    pub fn subscribe<F>(&mut self, destination: &str, callback: F) -> ObserverId
    where
        F: FnMut(&Frame) + Send + 'static,
    {
        self.observers.add(destination, Box::new(callback))
    }

    /// Observe every publish to any destination.
    pub fn subscribe_any<F>(&mut self, callback: F) -> ObserverId
    where
        F: FnMut(&str, &Frame) + Send + 'static,
    {
        self.observers.add_any(Box::new(callback))
    }

    /// Remove an observer. Removing twice is a no-op that returns `false`.
    pub fn unsubscribe(&mut self, observer: ObserverId) -> bool {
        self.observers.remove(observer)
    }

    /// Disconnect every client and clear all registries and observers.
    pub fn shutdown(&mut self) {
        let clients = self.clients.clients();
        info!(clients = clients.len(), "shutting down broker");

        for client in clients {
            self.disconnect(client);
        }

        self.clients.clear();
        self.index.clear();
        self.observers.clear();
    }

    pub(super) fn send_frame(&self, client: ClientId, frame: &Frame) -> Result<(), TransportError> {
        self.transport.send(client, &frame.encode()).map_err(|err| {
            warn!(%client, command = %frame.command, error = %err, "failed to send frame");
            err
        })
    }

    /// Bind `subscription_id -> destination` for `client` in both the
    /// session and the index.
    ///
    /// If the id was bound to another destination it moves; if the client
    /// already held `destination` under another id, that id is released.
    pub(super) fn bind_subscription(&mut self, client: ClientId, subscription_id: &str, destination: &str) {
        let Some(session) = self.clients.get_mut(client) else {
            return;
        };

        if let Some(previous) = session.subscriptions.get(subscription_id) {
            if previous != destination {
                self.index.remove(previous, client);
            }
        }

        if let Some(replaced) = self.index.insert(destination, client, subscription_id) {
            if replaced != subscription_id {
                session.subscriptions.remove(&replaced);
                debug!(%client, destination, replaced = %replaced, "subscription id replaced");
            }
        }

        session
            .subscriptions
            .insert(subscription_id.to_string(), destination.to_string());
    }

    /// Remove one subscription from session and index. Returns the
    /// destination it pointed at.
    pub(super) fn release_subscription(&mut self, client: ClientId, subscription_id: &str) -> Option<String> {
        let session = self.clients.get_mut(client)?;
        let destination = session.subscriptions.remove(subscription_id)?;

        if self.index.subscription_id(&destination, client) == Some(subscription_id) {
            self.index.remove(&destination, client);
        }
        Some(destination)
    }

    /// Drop the client's session and every index entry pointing at it.
    fn release_client(&mut self, client: ClientId) -> bool {
        let Some(session) = self.clients.remove(client) else {
            return false;
        };

        for destination in session.subscriptions.values() {
            self.index.remove(destination, client);
        }
        true
    }
}
