use std::collections::HashSet;
use std::hash::Hash;

pub use crate::command::CommandType;
use dashmap::DashMap;

pub use self::handle::{SubscriberHandle, SubscriberId};

pub mod error;
pub mod handle;

/// The set of handles subscribed to a single command type.
pub type SubscriberSet<H> = HashSet<H, ahash::RandomState>;

/// A registry mapping each [`CommandType`] to the set of subscribers interested in it.
///
/// Keys are created lazily on the first subscribe. A key whose set has been emptied by
/// unsubscribes is left in place; readers treat an absent key and an empty set the same way.
///
/// All operations are safe to call concurrently from any number of stream sessions. Each call
/// holds a shard lock only for its own duration, so a [`lookup`](Self::lookup) returns a
/// consistent snapshot of one command type but is not atomic with later mutations.
#[derive(Debug)]
pub struct SubscriptionRegistry<H> {
    subscriptions: DashMap<CommandType, SubscriberSet<H>, ahash::RandomState>,
}

impl<H: Eq + Hash + Clone> SubscriptionRegistry<H> {
    /// Construct a new empty [`SubscriptionRegistry`].
    pub fn new() -> SubscriptionRegistry<H> {
        Self::default()
    }

    /// Add `handle` to the subscribers of `command_type`. Subscribing twice is a no-op.
    pub fn subscribe(&self, command_type: CommandType, handle: H) {
        self.subscriptions
            .entry(command_type)
            .or_default()
            .insert(handle);
    }

    /// Remove `handle` from the subscribers of `command_type`.
    ///
    /// Unknown command types and handles that were never subscribed are ignored.
    pub fn unsubscribe(&self, command_type: &str, handle: &H) {
        if let Some(mut subscribers) = self.subscriptions.get_mut(command_type) {
            subscribers.remove(handle);
        }
    }

    /// Snapshot the current subscribers of `command_type`, empty if there are none.
    pub fn lookup(&self, command_type: &str) -> SubscriberSet<H> {
        self.subscriptions
            .get(command_type)
            .map(|subscribers| subscribers.value().clone())
            .unwrap_or_default()
    }

    /// Drop every entry in the registry without notifying subscribers.
    pub fn clear(&self) {
        self.subscriptions.clear();
    }

    /// The command types that currently have an entry, including emptied ones.
    pub fn command_types(&self) -> Vec<CommandType> {
        self.subscriptions
            .iter()
            .map(|entry| entry.key().clone())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }
}

impl<H> Default for SubscriptionRegistry<H> {
    fn default() -> Self {
        Self {
            subscriptions: DashMap::default(),
        }
    }
}
