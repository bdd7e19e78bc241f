// Error types for the hookrelay server

use hookrelay_webhooks::WebhookError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("{0}")]
    MethodNotAllowed(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Webhook(#[from] WebhookError),
}

impl ServerError {
    /// HTTP status code this error is reported with
    pub fn status_code(&self) -> u16 {
        match self {
            ServerError::BadRequest(_) => 400,
            ServerError::MethodNotAllowed(_) => 405,
            ServerError::NotFound(_) => 404,
            ServerError::Webhook(err) => match err {
                WebhookError::PayloadError(_)
                | WebhookError::SignatureInvalid(_)
                | WebhookError::SignatureMissing
                | WebhookError::SignatureMalformed(_) => 400,
                _ => 500,
            },
            _ => 500,
        }
    }

    /// Whether the error was caused by the caller
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }
}

pub type Result<T> = std::result::Result<T, ServerError>;
