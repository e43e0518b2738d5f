//! Change notification registry
//!
//! Subscribers register a callback per topic and get a `SubscriptionId`
//! back; the id is the only handle needed to unsubscribe. Callbacks run
//! synchronously on the thread that mutated the store.

use std::collections::HashMap;

use crate::keys::SettingKey;
use crate::value::SettingValue;

/// What a listener is subscribed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    /// The stored value of a setting changed
    Changed(SettingKey),
    /// Whether the control for a setting accepts input changed.
    /// Delivered as `SettingValue::Bool`.
    Interactable(SettingKey),
}

/// Token returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// Callback invoked with the new value.
pub type Listener = Box<dyn FnMut(SettingValue)>;

#[derive(Default)]
pub struct ObserverRegistry {
    next_id: u64,
    topics: HashMap<Topic, Vec<(SubscriptionId, Listener)>>,
}

impl ObserverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. Listeners of one topic are kept in
    /// subscription order, but callers must not rely on that order.
    pub fn subscribe(&mut self, topic: Topic, listener: Listener) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.topics.entry(topic).or_default().push((id, listener));
        id
    }

    /// Remove a listener. Returns false if the id is unknown or already removed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let mut emptied = None;
        let mut found = false;
        for (topic, listeners) in self.topics.iter_mut() {
            if let Some(pos) = listeners.iter().position(|(lid, _)| *lid == id) {
                listeners.remove(pos);
                found = true;
                if listeners.is_empty() {
                    emptied = Some(*topic);
                }
                break;
            }
        }
        if let Some(topic) = emptied {
            self.topics.remove(&topic);
        }
        found
    }

    /// Invoke every listener of `topic` with `value`.
    pub fn notify(&mut self, topic: Topic, value: SettingValue) {
        if let Some(listeners) = self.topics.get_mut(&topic) {
            for (_, listener) in listeners.iter_mut() {
                listener(value);
            }
        }
    }

    /// Number of listeners on one topic
    pub fn count(&self, topic: Topic) -> usize {
        self.topics.get(&topic).map_or(0, Vec::len)
    }

    /// Total number of listeners
    pub fn len(&self) -> usize {
        self.topics.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every listener
    pub fn clear(&mut self) {
        self.topics.clear();
    }
}

impl std::fmt::Debug for ObserverRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverRegistry")
            .field("listeners", &self.len())
            .finish()
    }
}
