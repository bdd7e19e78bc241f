//! HTTP surface of hookrelay
//!
//! Hosts the broker endpoints (registration, invocation, informational page),
//! the validating receiver used to try deliveries out, the logging bootstrap
//! and process configuration. The webhook semantics themselves live in
//! `hookrelay-webhooks`.
//!
//! ```no_run
//! use hookrelay_server::{Application, Broker, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServerConfig::default();
//!     let broker = Broker::new(&config)?;
//!     Application::bind_port(config.port, broker).await?.run().await?;
//!     Ok(())
//! }
//! ```

pub mod application;
pub mod broker;
pub mod config;
pub mod error;
pub mod http;
pub mod logging;
pub mod receiver;

pub use application::{Application, RequestHandler};
pub use broker::Broker;
pub use config::{ReceiverConfig, Secret, ServerConfig};
pub use error::{Result, ServerError};
pub use self::http::{HttpRequest, HttpResponse};
pub use receiver::Receiver;
