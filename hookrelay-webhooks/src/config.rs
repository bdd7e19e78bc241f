//! Configuration for outgoing deliveries

use crate::signature::headers;
use std::time::Duration;

/// Configuration for the delivery client
#[derive(Debug, Clone)]
pub struct WebhookConfig {
    /// Deadline for a single delivery call; `None` leaves it to the transport
    pub timeout: Option<Duration>,

    /// User-Agent header for outgoing requests
    pub user_agent: String,

    /// Header carrying the hex signature of the trigger payload
    pub signature_header: String,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            timeout: Some(Duration::from_secs(30)),
            user_agent: format!("hookrelay/{}", env!("CARGO_PKG_VERSION")),
            signature_header: headers::SIGNATURE.to_string(),
        }
    }
}

impl WebhookConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder for custom configuration
    pub fn builder() -> WebhookConfigBuilder {
        WebhookConfigBuilder::new()
    }
}

/// Builder for WebhookConfig
#[derive(Debug, Clone, Default)]
pub struct WebhookConfigBuilder {
    config: WebhookConfig,
}

impl WebhookConfigBuilder {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self {
            config: WebhookConfig::default(),
        }
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = Some(timeout);
        self
    }

    /// Set the timeout in seconds; zero disables the deadline
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.timeout = (secs > 0).then(|| Duration::from_secs(secs));
        self
    }

    /// Remove the request deadline entirely
    pub fn no_timeout(mut self) -> Self {
        self.config.timeout = None;
        self
    }

    /// Set the User-Agent header
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Set the signature header name
    pub fn signature_header(mut self, name: impl Into<String>) -> Self {
        self.config.signature_header = name.into();
        self
    }

    /// Build the configuration
    pub fn build(self) -> WebhookConfig {
        self.config
    }
}
