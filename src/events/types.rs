//! Event envelopes and payloads.
//!
//! Inbound and outbound events are CloudEvents in structured JSON mode.
//! Keptn extends the envelope with `shkeptncontext` (the correlation
//! context shared by every event of one sequence) and `triggeredid` (the
//! id of the triggered event a started/finished event answers).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Prefix of every Keptn event type.
pub const EVENT_TYPE_PREFIX: &str = "sh.keptn.event.";

/// CloudEvents spec version used for outbound events.
pub const SPEC_VERSION: &str = "1.0";

/// Build `sh.keptn.event.<task>.triggered`.
pub fn triggered_event_type(task: &str) -> String {
    format!("{}{}.triggered", EVENT_TYPE_PREFIX, task)
}

/// Build `sh.keptn.event.<task>.started`.
pub fn started_event_type(task: &str) -> String {
    format!("{}{}.started", EVENT_TYPE_PREFIX, task)
}

/// Build `sh.keptn.event.<task>.status.changed`.
pub fn status_changed_event_type(task: &str) -> String {
    format!("{}{}.status.changed", EVENT_TYPE_PREFIX, task)
}

/// Build `sh.keptn.event.<task>.finished`.
pub fn finished_event_type(task: &str) -> String {
    format!("{}{}.finished", EVENT_TYPE_PREFIX, task)
}

fn default_spec_version() -> String {
    SPEC_VERSION.to_string()
}

/// A CloudEvent envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloudEvent {
    #[serde(default = "default_spec_version")]
    pub specversion: String,

    pub id: String,

    #[serde(default)]
    pub source: String,

    #[serde(rename = "type")]
    pub event_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datacontenttype: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<DateTime<Utc>>,

    /// Keptn correlation context.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shkeptncontext: Option<String>,

    /// Id of the triggered event this event belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub triggeredid: Option<String>,

    #[serde(default)]
    pub data: serde_json::Value,
}

impl CloudEvent {
    /// Parse a structured-mode JSON envelope.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Deserialize the `data` attribute.
    pub fn data_as<T: serde::de::DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_value(self.data.clone())
    }
}

/// Keptn event status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Succeeded,
    Errored,
    #[serde(other)]
    Unknown,
}

/// Outcome of a task, meaningful once it has finished.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskResult {
    Pass,
    Fail,
    #[default]
    #[serde(other)]
    Unset,
}

impl TaskResult {
    pub fn is_unset(&self) -> bool {
        matches!(self, TaskResult::Unset)
    }
}

/// Payload shared by triggered, started, status-changed and finished events.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventData {
    #[serde(default)]
    pub project: String,

    #[serde(default)]
    pub stage: String,

    #[serde(default)]
    pub service: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<HashMap<String, String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<EventStatus>,

    #[serde(default, skip_serializing_if = "TaskResult::is_unset")]
    pub result: TaskResult,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
