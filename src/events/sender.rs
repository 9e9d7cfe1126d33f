//! Delivery of outbound events to the event broker.

use reqwest::blocking::Client;
use std::time::Duration;

use crate::error::{Result, ServiceError};

use super::types::CloudEvent;

/// Delivers events to the orchestrator.
pub trait EventSender {
    /// Send one event. Errors are [`ServiceError::NotificationDeliveryFailed`].
    fn send(&self, event: &CloudEvent) -> Result<()>;
}

/// Posts events in structured CloudEvents JSON to an HTTP endpoint.
pub struct HttpEventSender {
    client: Client,
    endpoint: String,
}

impl HttpEventSender {
    /// Create a sender for `endpoint` with a 30-second timeout.
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ServiceError::Other(anyhow::anyhow!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

impl EventSender for HttpEventSender {
    fn send(&self, event: &CloudEvent) -> Result<()> {
        let failed = |message: String| ServiceError::NotificationDeliveryFailed {
            event_type: event.event_type.clone(),
            message,
        };

        let body = serde_json::to_vec(event).map_err(|e| failed(e.to_string()))?;

        let response = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/cloudevents+json")
            .body(body)
            .send()
            .map_err(|e| failed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(failed(format!(
                "HTTP {} from {}",
                response.status(),
                self.endpoint
            )));
        }

        tracing::debug!("Sent {} event {}", event.event_type, event.id);
        Ok(())
    }
}
