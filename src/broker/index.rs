//! Subscription index
//!
//! Maps a destination to the clients subscribed to it and the subscription
//! id each one used. Subscribers are kept in the order they first
//! subscribed, which is the order fan-out visits them.
//!
//! A destination is present only while it has at least one subscriber;
//! removing the last one prunes the entry.

use std::collections::HashMap;

use crate::client::ClientId;

#[derive(Debug, Default)]
pub struct SubscriptionIndex {
    destinations: HashMap<String, Vec<(ClientId, String)>>,
}

impl SubscriptionIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `client -> subscription_id` under `destination`, creating the
    /// entry if needed. Returns the id it replaced, if the client was
    /// already subscribed there.
    pub fn insert(
        &mut self,
        destination: &str,
        client: ClientId,
        subscription_id: impl Into<String>,
    ) -> Option<String> {
        let subscription_id = subscription_id.into();
        let subscribers = self
            .destinations
            .entry(destination.to_string())
            .or_default();

        match subscribers.iter_mut().find(|(c, _)| *c == client) {
            Some(slot) => Some(std::mem::replace(&mut slot.1, subscription_id)),
            None => {
                subscribers.push((client, subscription_id));
                None
            }
        }
    }

    /// Remove `client` from `destination`, pruning the entry when it empties.
    pub fn remove(&mut self, destination: &str, client: ClientId) -> Option<String> {
        let subscribers = self.destinations.get_mut(destination)?;
        let pos = subscribers.iter().position(|(c, _)| *c == client)?;
        let (_, subscription_id) = subscribers.remove(pos);

        if subscribers.is_empty() {
            self.destinations.remove(destination);
        }
        Some(subscription_id)
    }

    pub fn subscribers(&self, destination: &str) -> &[(ClientId, String)] {
        self.destinations
            .get(destination)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn subscription_id(&self, destination: &str, client: ClientId) -> Option<&str> {
        self.subscribers(destination)
            .iter()
            .find(|(c, _)| *c == client)
            .map(|(_, id)| id.as_str())
    }

    pub fn contains(&self, destination: &str) -> bool {
        self.destinations.contains_key(destination)
    }

    pub fn destinations(&self) -> impl Iterator<Item = &str> {
        self.destinations.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.destinations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.destinations.is_empty()
    }

    pub fn clear(&mut self) {
        self.destinations.clear();
    }
}
