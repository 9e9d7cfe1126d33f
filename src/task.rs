//! Tasks: one run of a workflow for a project/stage/service.

use std::collections::HashMap;
use std::fmt;

use crate::error::{Result, ServiceError};
use crate::events::{CloudEvent, EventData, TaskResult};

/// The two task types this service handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    Setup,
    Teardown,
}

impl TaskKind {
    /// Keptn task name, the middle part of the event type.
    pub fn task_name(&self) -> &'static str {
        match self {
            TaskKind::Setup => "environment-setup",
            TaskKind::Teardown => "environment-teardown",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.task_name())
    }
}

/// Lifecycle position of a task, as last reported to the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Triggered,
    Started,
    StatusChanged,
    Finished,
}

/// Identifiers that tie every emitted event to the triggering event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrelationContext {
    /// Keptn context shared by the whole sequence.
    pub keptn_context: String,
    /// Id of the triggered event.
    pub triggered_id: String,
}

/// One execution of a workflow.
#[derive(Debug, Clone)]
pub struct Task {
    pub kind: TaskKind,
    pub project: String,
    pub stage: String,
    pub service: String,
    pub labels: Option<HashMap<String, String>>,
    pub context: CorrelationContext,
    pub status: TaskStatus,
    pub result: TaskResult,
}

impl Task {
    /// Create a task from a triggered event.
    pub fn from_event(kind: TaskKind, event: &CloudEvent) -> Result<Self> {
        let data: EventData = event.data_as().map_err(|e| ServiceError::PayloadParse {
            event_type: event.event_type.clone(),
            message: e.to_string(),
        })?;

        Ok(Self {
            kind,
            project: data.project,
            stage: data.stage,
            service: data.service,
            labels: data.labels,
            context: CorrelationContext {
                keptn_context: event.shkeptncontext.clone().unwrap_or_default(),
                triggered_id: event.id.clone(),
            },
            status: TaskStatus::Triggered,
            result: TaskResult::Unset,
        })
    }

    /// Payload carrying this task's identifiers and nothing else.
    pub fn event_data(&self) -> EventData {
        EventData {
            project: self.project.clone(),
            stage: self.stage.clone(),
            service: self.service.clone(),
            labels: self.labels.clone(),
            ..Default::default()
        }
    }

    pub fn is_finished(&self) -> bool {
        self.status == TaskStatus::Finished
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn triggered(data: serde_json::Value) -> CloudEvent {
        CloudEvent {
            specversion: "1.0".into(),
            id: "trig-1".into(),
            source: "shipyard-controller".into(),
            event_type: "sh.keptn.event.environment-setup.triggered".into(),
            datacontenttype: None,
            time: None,
            shkeptncontext: Some("ctx-1".into()),
            triggeredid: None,
            data,
        }
    }

    #[test]
    fn task_from_event_copies_identifiers() {
        let event = triggered(json!({"project": "P", "stage": "T", "service": "S"}));
        let task = Task::from_event(TaskKind::Setup, &event).unwrap();

        assert_eq!(task.project, "P");
        assert_eq!(task.stage, "T");
        assert_eq!(task.service, "S");
        assert_eq!(task.context.keptn_context, "ctx-1");
        assert_eq!(task.context.triggered_id, "trig-1");
        assert_eq!(task.status, TaskStatus::Triggered);
        assert!(task.result.is_unset());
    }

    #[test]
    fn malformed_payload_is_parse_error() {
        let event = triggered(json!({"project": 42}));
        let err = Task::from_event(TaskKind::Setup, &event).unwrap_err();
        assert!(matches!(err, ServiceError::PayloadParse { .. }));
    }

    #[test]
    fn task_names() {
        assert_eq!(TaskKind::Setup.task_name(), "environment-setup");
        assert_eq!(TaskKind::Teardown.to_string(), "environment-teardown");
    }
}
