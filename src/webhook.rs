//! Webhook delivery
//!
//! One JSON POST per event, no automatic retry. Transport failures map to
//! `TaskError::Network`, non-2xx answers to `TaskError::Server`.

use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{Result, TaskError};
use crate::event::WebhookEvent;

/// Status and body text returned by the endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReceipt {
    pub status: u16,
    pub body: String,
}

/// Sends an event to a URL
#[async_trait]
pub trait EventSender: Send + Sync {
    async fn send(&self, url: &str, event: &WebhookEvent) -> Result<DeliveryReceipt>;
}

#[derive(Debug, Clone)]
pub struct WebhookClient {
    client: reqwest::Client,
}

impl WebhookClient {
    /// `timeout` bounds the whole request; `None` leaves it to the transport.
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| TaskError::Network(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl EventSender for WebhookClient {
    async fn send(&self, url: &str, event: &WebhookEvent) -> Result<DeliveryReceipt> {
        debug!(
            url,
            event_type = event.event_type(),
            idempotency_key = %event.idempotency_key,
            "posting webhook event"
        );

        let response = self
            .client
            .post(url)
            .json(event)
            .send()
            .await
            .map_err(|e| {
                warn!(url, error = %e, "webhook transport failed");
                TaskError::Network(e.to_string())
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TaskError::Network(e.to_string()))?;

        debug!(status = status.as_u16(), body = %body, "webhook response received");

        if !status.is_success() {
            return Err(TaskError::Server {
                status: status.as_u16(),
                body,
            });
        }

        Ok(DeliveryReceipt {
            status: status.as_u16(),
            body,
        })
    }
}
