//! Task lifecycle notifications.

use chrono::Utc;
use ulid::Ulid;

use crate::error::{Result, ServiceError};
use crate::task::{Task, TaskStatus};

use super::sender::EventSender;
use super::types::{
    finished_event_type, started_event_type, status_changed_event_type, CloudEvent, EventData,
    EventStatus, TaskResult, SPEC_VERSION,
};

/// Sends started, status-changed and finished events for tasks.
///
/// Each call updates the task's status. `emit_finished` refuses to run
/// twice for the same task.
pub struct TaskEmitter<'a> {
    sender: &'a dyn EventSender,
    source: String,
}

impl<'a> TaskEmitter<'a> {
    /// Create an emitter that signs events with `source`.
    pub fn new(sender: &'a dyn EventSender, source: impl Into<String>) -> Self {
        Self {
            sender,
            source: source.into(),
        }
    }

    /// Announce that the task has been picked up.
    pub fn emit_started(&self, task: &mut Task) -> Result<()> {
        let event = self.event(task, started_event_type(task.kind.task_name()), task.event_data())?;
        task.status = TaskStatus::Started;
        self.sender.send(&event)
    }

    /// Report progress without changing the outcome.
    pub fn emit_status_changed(&self, task: &mut Task, message: &str) -> Result<()> {
        let data = EventData {
            message: Some(message.to_string()),
            ..task.event_data()
        };
        let event = self.event(
            task,
            status_changed_event_type(task.kind.task_name()),
            data,
        )?;
        task.status = TaskStatus::StatusChanged;
        self.sender.send(&event)
    }

    /// Report the terminal outcome.
    pub fn emit_finished(&self, task: &mut Task, result: TaskResult, message: &str) -> Result<()> {
        if task.is_finished() {
            return Err(ServiceError::Other(anyhow::anyhow!(
                "{} task {} has already finished",
                task.kind,
                task.context.triggered_id
            )));
        }

        let status = match result {
            TaskResult::Pass => EventStatus::Succeeded,
            TaskResult::Fail => EventStatus::Errored,
            TaskResult::Unset => EventStatus::Unknown,
        };
        let data = EventData {
            status: Some(status),
            result,
            message: (!message.is_empty()).then(|| message.to_string()),
            ..task.event_data()
        };
        let event = self.event(task, finished_event_type(task.kind.task_name()), data)?;

        task.status = TaskStatus::Finished;
        task.result = result;
        self.sender.send(&event)
    }

    fn event(&self, task: &Task, event_type: String, data: EventData) -> Result<CloudEvent> {
        let data = serde_json::to_value(data).map_err(|e| ServiceError::NotificationDeliveryFailed {
            event_type: event_type.clone(),
            message: e.to_string(),
        })?;

        Ok(CloudEvent {
            specversion: SPEC_VERSION.to_string(),
            id: Ulid::new().to_string(),
            source: self.source.clone(),
            event_type,
            datacontenttype: Some("application/json".to_string()),
            time: Some(Utc::now()),
            shkeptncontext: Some(task.context.keptn_context.clone()),
            triggeredid: Some(task.context.triggered_id.clone()),
            data,
        })
    }
}
