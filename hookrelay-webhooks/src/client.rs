//! Delivery client for outgoing webhook calls

use crate::signature::headers;
use crate::{Result, WebhookConfig, WebhookError, WebhookSignature, payload};
use reqwest::Client;
use reqwest::header::{CONTENT_TYPE, HeaderValue};
use tracing::{debug, info};

/// What a subscriber answered to one successful delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReport {
    /// URL that was called
    pub url: String,

    /// HTTP status code of the response
    pub status: u16,

    /// Response body, lossily decoded
    pub body: String,
}

/// Client performing one signed outbound call per subscription
#[derive(Debug, Clone)]
pub struct DeliveryClient {
    config: WebhookConfig,
    http_client: Client,
    signer: WebhookSignature,
}

impl DeliveryClient {
    /// Create a new delivery client signing with `signer`
    pub fn new(config: WebhookConfig, signer: WebhookSignature) -> Result<Self> {
        let mut builder = Client::builder().user_agent(&config.user_agent);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build()?;

        Ok(Self {
            config,
            http_client,
            signer,
        })
    }

    /// Deliver `payload` for `event` to `url`.
    ///
    /// The body names the event and embeds the payload; the signature header
    /// covers the payload alone. Any transport failure or non-2xx answer is
    /// returned as an error for the caller to log.
    pub async fn deliver(&self, url: &str, event: &str, payload: &[u8]) -> Result<DeliveryReport> {
        let target = url::Url::parse(url)?;
        let body = payload::compose(event, payload);
        let signature = self.signer.sign(payload)?;

        debug!(url, event, bytes = body.len(), "Attempting delivery");

        let mut request = self
            .http_client
            .post(target)
            .header(CONTENT_TYPE, "text/plain; charset=utf-8")
            .header(self.config.signature_header.as_str(), signature);

        match HeaderValue::from_str(event) {
            Ok(value) => request = request.header(headers::EVENT, value),
            Err(_) => debug!(event, "Event label not representable as a header, omitting"),
        }

        let response = request.body(body).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(WebhookError::DeliveryStatus {
                status: status.as_u16(),
                body,
            });
        }

        info!(url, status = status.as_u16(), body = %body, "Webhook invoked");
        Ok(DeliveryReport {
            url: url.to_string(),
            status: status.as_u16(),
            body,
        })
    }

    /// Get the signer used for outgoing calls
    pub fn signer(&self) -> &WebhookSignature {
        &self.signer
    }
}
