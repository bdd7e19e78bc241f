// Validating receiver: a demo subscriber that checks inbound deliveries

use crate::{HttpRequest, HttpResponse, ReceiverConfig, RequestHandler, Result};
use async_trait::async_trait;
use hookrelay_webhooks::{Invocation, SecretUrlVerifier, VerificationLevel, Verifier, headers};
use http::Method;
use tracing::{info, warn};

const ACCEPTED: &str = "Successfully invoked dummy web service.";

/// Subscriber endpoint verifying each call with a pluggable [`Verifier`]
#[derive(Debug)]
pub struct Receiver {
    path: String,
    verifier: Box<dyn Verifier>,
    url_token: Option<String>,
}

impl Receiver {
    /// Build a receiver for the level and secret in `config`
    pub fn new(config: &ReceiverConfig) -> Result<Self> {
        let signer = config.secret.signer();
        let url_token = match config.level {
            VerificationLevel::Url => {
                Some(SecretUrlVerifier::new(signer.clone())?.token().to_string())
            }
            _ => None,
        };

        Ok(Self {
            path: config.path.clone(),
            verifier: config.level.verifier(signer)?,
            url_token,
        })
    }

    /// Path subscribers should register, including the secret token if the
    /// URL itself is what gets verified
    pub fn subscriber_path(&self) -> String {
        match &self.url_token {
            Some(token) => format!("{}{}", self.path, token),
            None => self.path.clone(),
        }
    }

    fn info_page() -> HttpResponse {
        HttpResponse::html(
            "This service reacts on the following endpoint: <br>\
             The /invoked/ endpoint reacts to invocation with any payload, \
             but can variably be configured to perform integrity checks (visible in the logs only).",
        )
    }

    fn invoked(&self, request: &HttpRequest) -> HttpResponse {
        info!(
            method = %request.method,
            body = %String::from_utf8_lossy(&request.body),
            "Received invocation"
        );

        let invocation = Invocation {
            path: &request.path,
            signature: request.header(headers::SIGNATURE),
            event: request.header(headers::EVENT),
            body: &request.body,
        };

        match self.verifier.verify(&invocation) {
            Ok(()) => {
                info!(path = %request.path, verifier = self.verifier.name(), "Valid invocation");
                HttpResponse::text(200, ACCEPTED)
            }
            Err(err) => {
                warn!(path = %request.path, verifier = self.verifier.name(), "Invalid invocation: {}", err);
                HttpResponse::text(400, "Invalid invocation")
            }
        }
    }
}

#[async_trait]
impl RequestHandler for Receiver {
    async fn handle(&self, request: HttpRequest) -> HttpResponse {
        if request.path.starts_with(&self.path) {
            self.invoked(&request)
        } else if request.method == Method::GET {
            Self::info_page()
        } else {
            HttpResponse::text(404, format!("Not Found: {}", request.path))
        }
    }
}
