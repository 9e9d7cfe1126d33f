//! Keptn CloudEvents: envelopes, payloads and delivery.
//!
//! # Architecture
//!
//! - [`types`] - Envelope and payload definitions, event type helpers
//! - [`sender`] - [`EventSender`] trait and the HTTP implementation
//! - [`emitter`] - [`TaskEmitter`], the started/status/finished lifecycle
//! - [`mock`] - [`RecordingSender`] for tests

pub mod emitter;
pub mod mock;
pub mod sender;
pub mod types;

pub use emitter::TaskEmitter;
pub use mock::RecordingSender;
pub use sender::{EventSender, HttpEventSender};
pub use types::{
    finished_event_type, started_event_type, status_changed_event_type, triggered_event_type,
    CloudEvent, EventData, EventStatus, TaskResult, EVENT_TYPE_PREFIX,
};
