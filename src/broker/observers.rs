//! In-process observers
//!
//! Observers let embedding code see published messages without being a
//! wire client. Two kinds exist: wildcard observers see every destination,
//! destination observers see exactly one. Each registration returns an
//! [`ObserverId`]; removing it drops exactly that callback.
//!
//! Callbacks run under the broker lock and must not call back into the
//! broker.

use std::collections::HashMap;
use std::fmt;

use crate::frame::Frame;

pub type DestinationCallback = Box<dyn FnMut(&Frame) + Send>;
pub type WildcardCallback = Box<dyn FnMut(&str, &Frame) + Send>;

/// Registration token returned by [`ObserverRegistry::add`] and
/// [`ObserverRegistry::add_any`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(u64);

#[derive(Default)]
pub struct ObserverRegistry {
    next_id: u64,
    wildcard: Vec<(ObserverId, WildcardCallback)>,
    by_destination: HashMap<String, Vec<(ObserverId, DestinationCallback)>>,
}

impl ObserverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, destination: &str, callback: DestinationCallback) -> ObserverId {
        let id = self.allocate();
        self.by_destination
            .entry(destination.to_string())
            .or_default()
            .push((id, callback));
        id
    }

    pub fn add_any(&mut self, callback: WildcardCallback) -> ObserverId {
        let id = self.allocate();
        self.wildcard.push((id, callback));
        id
    }

    /// Remove one registration. Returns `false` if it was already gone.
    pub fn remove(&mut self, id: ObserverId) -> bool {
        if let Some(pos) = self.wildcard.iter().position(|(i, _)| *i == id) {
            self.wildcard.remove(pos);
            return true;
        }

        let mut emptied = None;
        let mut removed = false;
        for (destination, callbacks) in self.by_destination.iter_mut() {
            if let Some(pos) = callbacks.iter().position(|(i, _)| *i == id) {
                callbacks.remove(pos);
                removed = true;
                if callbacks.is_empty() {
                    emptied = Some(destination.clone());
                }
                break;
            }
        }

        if let Some(destination) = emptied {
            self.by_destination.remove(&destination);
        }
        removed
    }

    /// Invoke wildcard observers, then observers of `destination`, each group
    /// in registration order. Returns how many callbacks ran.
    pub fn notify(&mut self, destination: &str, frame: &Frame) -> usize {
        let mut invoked = 0;

        for (_, callback) in self.wildcard.iter_mut() {
            callback(destination, frame);
            invoked += 1;
        }

        if let Some(callbacks) = self.by_destination.get_mut(destination) {
            for (_, callback) in callbacks.iter_mut() {
                callback(frame);
                invoked += 1;
            }
        }

        invoked
    }

    pub fn has_destination(&self, destination: &str) -> bool {
        self.by_destination.contains_key(destination)
    }

    pub fn len(&self) -> usize {
        self.wildcard.len() + self.by_destination.values().map(Vec::len).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.wildcard.clear();
        self.by_destination.clear();
    }

    fn allocate(&mut self) -> ObserverId {
        self.next_id += 1;
        ObserverId(self.next_id)
    }
}

impl fmt::Debug for ObserverRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverRegistry")
            .field("wildcard", &self.wildcard.len())
            .field("destinations", &self.by_destination.keys().collect::<Vec<_>>())
            .finish()
    }
}
