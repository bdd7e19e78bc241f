//! Fire-and-forget fan-out of trigger payloads

use crate::{DeliveryClient, DeliveryReport, Result, WebhookError, WebhookRegistry};
use bytes::Bytes;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{Instrument, error, info, info_span};

/// Fans a trigger payload out to every registered subscription.
///
/// Each delivery runs as its own tokio task. Failures are logged inside the task
/// and never reach the dispatcher, the registry or sibling deliveries.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: WebhookRegistry,
    client: Arc<DeliveryClient>,
}

impl Dispatcher {
    /// Create a dispatcher over `registry` delivering through `client`
    pub fn new(registry: WebhookRegistry, client: DeliveryClient) -> Self {
        Self {
            registry,
            client: Arc::new(client),
        }
    }

    /// Spawn one delivery per subscription present right now and return
    /// without waiting for any of them.
    ///
    /// Must be called from within a tokio runtime.
    pub fn dispatch(&self, payload: impl Into<Bytes>) -> Dispatch {
        let payload = payload.into();
        let recipients = self.registry.snapshot_for_dispatch();

        info!(subscribers = recipients.len(), bytes = payload.len(), "Dispatching trigger");

        let handles = recipients
            .into_iter()
            .map(|subscription| {
                let client = Arc::clone(&self.client);
                let payload = payload.clone();
                let span = info_span!("delivery", url = %subscription.url, event = %subscription.event);

                tokio::spawn(
                    async move {
                        let outcome = client
                            .deliver(&subscription.url, &subscription.event, &payload)
                            .await;
                        if let Err(ref e) = outcome {
                            error!("Webhook delivery failed: {}", e);
                        }
                        outcome
                    }
                    .instrument(span),
                )
            })
            .collect();

        Dispatch { handles }
    }

    /// Get the registry this dispatcher reads from
    pub fn registry(&self) -> &WebhookRegistry {
        &self.registry
    }
}

/// Handles onto the deliveries spawned by one trigger.
///
/// Dropping it detaches the tasks; they keep running to completion.
#[derive(Debug)]
pub struct Dispatch {
    handles: Vec<JoinHandle<Result<DeliveryReport>>>,
}

impl Dispatch {
    /// Number of deliveries spawned
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Whether no delivery was spawned
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Wait for every delivery and collect the outcomes in recipient order
    pub async fn join(self) -> Vec<Result<DeliveryReport>> {
        futures::future::join_all(self.handles)
            .await
            .into_iter()
            .map(|joined| {
                joined.unwrap_or_else(|e| {
                    Err(WebhookError::Internal(format!("Delivery task aborted: {}", e)))
                })
            })
            .collect()
    }
}
