// Process configuration for the broker and receiver servers

use crate::{Result, ServerError};
use hookrelay_webhooks::{VerificationLevel, WebhookConfig, WebhookSignature};
use std::fmt;

/// Shared secret used when none is configured. Only suitable for local demos.
pub const DEFAULT_SECRET: &[u8] = &[1, 2, 3, 4, 5];

/// Default registration endpoint
pub const REGISTRATION_PATH: &str = "/registration";

/// Default invocation (trigger) endpoint
pub const INVOCATION_PATH: &str = "/invocation";

/// Default endpoint of the validating receiver
pub const RECEIVER_PATH: &str = "/invoked/";

/// Process-wide shared secret, fixed at startup
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(Vec<u8>);

impl Secret {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Signer keyed by this secret
    pub fn signer(&self) -> WebhookSignature {
        WebhookSignature::new(&self.0)
    }
}

impl Default for Secret {
    fn default() -> Self {
        Self::new(DEFAULT_SECRET)
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Secret(<{} bytes>)", self.0.len())
    }
}

/// Configuration of the broker server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub registration_path: String,
    pub invocation_path: String,
    pub secret: Secret,
    pub webhook: WebhookConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            registration_path: REGISTRATION_PATH.to_string(),
            invocation_path: INVOCATION_PATH.to_string(),
            secret: Secret::default(),
            webhook: WebhookConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn registration_path(mut self, path: impl Into<String>) -> Self {
        self.registration_path = path.into();
        self
    }

    pub fn invocation_path(mut self, path: impl Into<String>) -> Self {
        self.invocation_path = path.into();
        self
    }

    pub fn secret(mut self, secret: Secret) -> Self {
        self.secret = secret;
        self
    }

    pub fn webhook(mut self, webhook: WebhookConfig) -> Self {
        self.webhook = webhook;
        self
    }

    /// Check that both endpoints are absolute and distinct
    pub fn validate(&self) -> Result<()> {
        for path in [&self.registration_path, &self.invocation_path] {
            if !path.starts_with('/') {
                return Err(ServerError::Config(format!(
                    "Endpoint path must start with '/': {}",
                    path
                )));
            }
        }
        if self.registration_path == self.invocation_path {
            return Err(ServerError::Config(format!(
                "Registration and invocation share the path {}",
                self.registration_path
            )));
        }
        if self.secret.as_bytes().is_empty() {
            return Err(ServerError::Config("Secret must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Configuration of the validating receiver
#[derive(Debug, Clone)]
pub struct ReceiverConfig {
    pub port: u16,
    pub path: String,
    pub secret: Secret,
    pub level: VerificationLevel,
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self {
            port: 8081,
            path: RECEIVER_PATH.to_string(),
            secret: Secret::default(),
            level: VerificationLevel::None,
        }
    }
}

impl ReceiverConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn secret(mut self, secret: Secret) -> Self {
        self.secret = secret;
        self
    }

    pub fn level(mut self, level: VerificationLevel) -> Self {
        self.level = level;
        self
    }
}
