// Broker endpoints: registration, invocation and the informational page

use crate::{HttpRequest, HttpResponse, RequestHandler, Result, ServerConfig, ServerError};
use async_trait::async_trait;
use hookrelay_webhooks::{DeliveryClient, Dispatcher, Subscription, WebhookRegistry};
use http::Method;
use tracing::{info, warn};

/// Routes broker requests onto the registry and dispatcher
#[derive(Debug, Clone)]
pub struct Broker {
    dispatcher: Dispatcher,
    registration_path: String,
    invocation_path: String,
}

impl Broker {
    /// Build a broker with a fresh registry from `config`
    pub fn new(config: &ServerConfig) -> Result<Self> {
        config.validate()?;
        let client = DeliveryClient::new(config.webhook.clone(), config.secret.signer())?;

        Ok(Self::with_dispatcher(
            Dispatcher::new(WebhookRegistry::new(), client),
            config,
        ))
    }

    /// Build a broker around an existing dispatcher
    pub fn with_dispatcher(dispatcher: Dispatcher, config: &ServerConfig) -> Self {
        Self {
            dispatcher,
            registration_path: config.registration_path.clone(),
            invocation_path: config.invocation_path.clone(),
        }
    }

    /// The registry backing this broker
    pub fn registry(&self) -> &WebhookRegistry {
        self.dispatcher.registry()
    }

    fn registration(&self, request: &HttpRequest) -> Result<HttpResponse> {
        match request.method {
            Method::POST => {
                let subscription = Subscription::from_json(&request.body).map_err(|e| {
                    ServerError::BadRequest(format!("Something went wrong: {}", e))
                })?;
                let url = subscription.url.clone();
                let index = self.registry().register(subscription);

                info!(url = %url, index, "Webhook has been registered");
                Ok(HttpResponse::text(201, index.to_string()))
            }
            Method::GET => {
                let subscriptions = serde_json::to_value(self.registry().list())
                    .map_err(hookrelay_webhooks::WebhookError::from)?;
                Ok(HttpResponse::json(&subscriptions))
            }
            ref other => Err(ServerError::MethodNotAllowed(format!(
                "Method {} not supported for {}",
                other, self.registration_path
            ))),
        }
    }

    fn invocation(&self, request: &HttpRequest) -> Result<HttpResponse> {
        if request.method != Method::POST {
            return Err(ServerError::MethodNotAllowed(format!(
                "Method {} not supported for {}",
                request.method, self.invocation_path
            )));
        }

        info!(bytes = request.body.len(), "Received trigger");
        // Deliveries are detached; the caller gets its answer right away.
        let dispatch = self.dispatcher.dispatch(request.body.clone());
        info!(deliveries = dispatch.len(), "Trigger dispatched");

        Ok(HttpResponse::ok())
    }

    fn info_page(&self, request: &HttpRequest) -> Result<HttpResponse> {
        if request.method != Method::GET {
            return Err(ServerError::NotFound(request.path.clone()));
        }

        Ok(HttpResponse::html(format!(
            "This service offers the following endpoints: <br>\
             The {reg} endpoint provides the registration functionality for webhooks (POST and GET), <br>\
             The {inv} endpoint triggers the invocation of registered webhooks when called (with arbitrary payload).<br>\
             The payload structure for the webhook registration via POST is the following JSON structure: \
             {{\"url\": \"http://targetHost:targetPort/pathTobeInvoked\", \"event\": \"EXAMPLE_EVENT\"}}<br>\
             Every invocation carries the header X-SIGNATURE: the hex HMAC-SHA256 of the trigger payload.",
            reg = self.registration_path,
            inv = self.invocation_path,
        )))
    }

    fn route(&self, request: &HttpRequest) -> Result<HttpResponse> {
        if request.path == self.registration_path {
            self.registration(request)
        } else if request.path == self.invocation_path {
            self.invocation(request)
        } else {
            self.info_page(request)
        }
    }
}

#[async_trait]
impl RequestHandler for Broker {
    async fn handle(&self, request: HttpRequest) -> HttpResponse {
        match self.route(&request) {
            Ok(response) => response,
            Err(err) => {
                warn!(method = %request.method, path = %request.path, "{}", err);
                HttpResponse::from_error(&err)
            }
        }
    }
}
