//! Recording event sender for testing.
//!
//! `RecordingSender` implements [`EventSender`] and keeps every event it
//! is asked to deliver, including the ones it was told to reject, so tests
//! can assert on both what was sent and what was attempted.
//!
//! # Example
//!
//! ```
//! use crossplane_service::events::RecordingSender;
//!
//! let sender = RecordingSender::new();
//! sender.fail_on(".status.changed");
//!
//! assert!(sender.events().is_empty());
//! assert_eq!(sender.count(".finished"), 0);
//! ```

use std::cell::RefCell;

use crate::error::{Result, ServiceError};

use super::sender::EventSender;
use super::types::CloudEvent;

/// Event sender that records instead of delivering.
#[derive(Debug, Default)]
pub struct RecordingSender {
    events: RefCell<Vec<CloudEvent>>,
    failing_suffixes: RefCell<Vec<String>>,
}

impl RecordingSender {
    /// Create a sender that accepts every event.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject events whose type ends with `suffix` (e.g. `.started`).
    ///
    /// Rejected events are still recorded as attempts.
    pub fn fail_on(&self, suffix: &str) {
        self.failing_suffixes.borrow_mut().push(suffix.to_string());
    }

    /// All attempted events, in order.
    pub fn events(&self) -> Vec<CloudEvent> {
        self.events.borrow().clone()
    }

    /// Types of all attempted events, in order.
    pub fn event_types(&self) -> Vec<String> {
        self.events
            .borrow()
            .iter()
            .map(|e| e.event_type.clone())
            .collect()
    }

    /// Number of attempted events whose type ends with `suffix`.
    pub fn count(&self, suffix: &str) -> usize {
        self.events
            .borrow()
            .iter()
            .filter(|e| e.event_type.ends_with(suffix))
            .count()
    }

    /// Attempted finished events.
    pub fn finished(&self) -> Vec<CloudEvent> {
        self.events
            .borrow()
            .iter()
            .filter(|e| e.event_type.ends_with(".finished"))
            .cloned()
            .collect()
    }

    /// Messages of attempted status-changed events.
    pub fn messages(&self) -> Vec<String> {
        self.events
            .borrow()
            .iter()
            .filter(|e| e.event_type.ends_with(".status.changed"))
            .filter_map(|e| e.data["message"].as_str().map(String::from))
            .collect()
    }
}

impl EventSender for RecordingSender {
    fn send(&self, event: &CloudEvent) -> Result<()> {
        self.events.borrow_mut().push(event.clone());

        let rejected = self
            .failing_suffixes
            .borrow()
            .iter()
            .any(|suffix| event.event_type.ends_with(suffix.as_str()));

        if rejected {
            return Err(ServiceError::NotificationDeliveryFailed {
                event_type: event.event_type.clone(),
                message: "event broker unavailable".to_string(),
            });
        }
        Ok(())
    }
}
