//! Subscription records

use serde::{Deserialize, Serialize};

/// A registered callback: the URL to call and the event label it reacts to.
///
/// Neither field is validated; any string is accepted, including empty ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    /// Target URL for deliveries
    pub url: String,

    /// Event label describing what this subscription reacts to
    pub event: String,
}

impl Subscription {
    /// Create a new subscription
    pub fn new(url: impl Into<String>, event: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            event: event.into(),
        }
    }

    /// Decode a subscription from a JSON registration body
    pub fn from_json(body: &[u8]) -> crate::Result<Self> {
        Ok(serde_json::from_slice(body)?)
    }
}
