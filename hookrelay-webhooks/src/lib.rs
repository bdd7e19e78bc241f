//! Webhook brokering for hookrelay
//!
//! Clients register callback URLs against event labels; a trigger fans the
//! payload out to every registered callback with an HMAC-SHA256 signature so
//! receivers can verify the content came from the broker.
//!
//! # Features
//!
//! - **Registry**: append-only list of subscriptions, safe under concurrent use
//! - **Dispatcher**: one independent task per subscription, fire-and-forget
//! - **Delivery Client**: signed outbound POST per subscription
//! - **Signature Verification**: constant-time HMAC checks for receivers
//!
//! # Example: Registering and Dispatching
//!
//! ```rust,no_run
//! use hookrelay_webhooks::{
//!     DeliveryClient, Dispatcher, Subscription, WebhookConfig, WebhookRegistry, WebhookSignature,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let registry = WebhookRegistry::new();
//!     let index = registry.register(Subscription::new("http://localhost:9001/hook", "ORDER_PLACED"));
//!     assert_eq!(index, 0);
//!
//!     let client = DeliveryClient::new(WebhookConfig::default(), WebhookSignature::new("secret"))?;
//!     let dispatcher = Dispatcher::new(registry, client);
//!
//!     // Returns immediately; deliveries run in the background.
//!     dispatcher.dispatch("payload-A");
//!     Ok(())
//! }
//! ```
//!
//! # Example: Verifying a Delivery
//!
//! ```rust
//! use hookrelay_webhooks::{ContentVerifier, Invocation, Verifier, WebhookSignature, payload};
//!
//! let signer = WebhookSignature::new("secret");
//! let signature = signer.sign(b"payload-A").unwrap();
//! let body = payload::compose("ORDER_PLACED", b"payload-A");
//!
//! let verifier = ContentVerifier::new(signer);
//! let call = Invocation {
//!     path: "/invoked/",
//!     signature: Some(signature.as_str()),
//!     event: Some("ORDER_PLACED"),
//!     body: &body,
//! };
//! assert!(verifier.verify(&call).is_ok());
//! ```

mod client;
mod config;
mod dispatcher;
mod error;
pub mod payload;
mod receiver;
mod registry;
mod signature;
mod subscription;

pub use client::{DeliveryClient, DeliveryReport};
pub use config::{WebhookConfig, WebhookConfigBuilder};
pub use dispatcher::{Dispatch, Dispatcher};
pub use error::WebhookError;
pub use receiver::{
    ContentVerifier, Invocation, NoVerification, SecretUrlVerifier, VerificationLevel, Verifier,
};
pub use registry::WebhookRegistry;
pub use signature::{WebhookSignature, headers};
pub use subscription::Subscription;

/// Result type for webhook operations
pub type Result<T> = std::result::Result<T, WebhookError>;
