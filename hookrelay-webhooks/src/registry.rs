//! Subscription registry

use crate::Subscription;
use parking_lot::RwLock;
use std::sync::Arc;

/// Append-only, process-wide list of subscriptions.
///
/// Cloning yields another handle onto the same list. Indices returned by
/// [`register`](Self::register) are positions in insertion order and stay valid
/// for the life of the process since nothing is ever removed.
#[derive(Debug, Clone, Default)]
pub struct WebhookRegistry {
    subscriptions: Arc<RwLock<Vec<Subscription>>>,
}

impl WebhookRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a subscription and return its 0-based index
    pub fn register(&self, subscription: Subscription) -> usize {
        let mut subscriptions = self.subscriptions.write();
        subscriptions.push(subscription);
        subscriptions.len() - 1
    }

    /// All subscriptions in insertion order
    pub fn list(&self) -> Vec<Subscription> {
        self.subscriptions.read().clone()
    }

    /// Recipients of one trigger: everything registered at the time of the call.
    ///
    /// Later registrations are not part of the returned set.
    pub fn snapshot_for_dispatch(&self) -> Vec<Subscription> {
        self.list()
    }

    /// Get a subscription by index
    pub fn get(&self, index: usize) -> Option<Subscription> {
        self.subscriptions.read().get(index).cloned()
    }

    /// Get the number of registered subscriptions
    pub fn count(&self) -> usize {
        self.subscriptions.read().len()
    }

    /// Check whether nothing has been registered yet
    pub fn is_empty(&self) -> bool {
        self.subscriptions.read().is_empty()
    }
}
