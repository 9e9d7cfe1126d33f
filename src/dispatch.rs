//! Inbound event dispatch.

use crate::error::{Result, ServiceError};
use crate::events::{CloudEvent, EVENT_TYPE_PREFIX};
use crate::task::{Task, TaskKind};
use crate::workflow::{setup, teardown, TaskReport, WorkflowContext};

/// Routes triggered events to their workflow.
pub struct EventDispatcher<'a> {
    ctx: WorkflowContext<'a>,
}

impl<'a> EventDispatcher<'a> {
    pub fn new(ctx: WorkflowContext<'a>) -> Self {
        Self { ctx }
    }

    /// Task kind handled for an event type, with or without the Keptn prefix.
    pub fn resolve(event_type: &str) -> Option<TaskKind> {
        let short = event_type
            .strip_prefix(EVENT_TYPE_PREFIX)
            .unwrap_or(event_type);
        match short {
            "environment-setup.triggered" => Some(TaskKind::Setup),
            "environment-teardown.triggered" => Some(TaskKind::Teardown),
            _ => None,
        }
    }

    /// Run the workflow for `event` and return its report.
    pub fn dispatch(&self, event: &CloudEvent) -> Result<TaskReport> {
        let kind = Self::resolve(&event.event_type).ok_or_else(|| {
            ServiceError::UnhandledEventType {
                event_type: event.event_type.clone(),
            }
        })?;

        tracing::info!("Handling {} event {}", event.event_type, event.id);
        let task = Task::from_event(kind, event)?;

        match kind {
            TaskKind::Setup => setup::run(self.ctx, task),
            TaskKind::Teardown => teardown::run(self.ctx, task),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_short_and_qualified_types() {
        assert_eq!(
            EventDispatcher::resolve("environment-setup.triggered"),
            Some(TaskKind::Setup)
        );
        assert_eq!(
            EventDispatcher::resolve("sh.keptn.event.environment-teardown.triggered"),
            Some(TaskKind::Teardown)
        );
    }

    #[test]
    fn ignores_echoes_and_other_tasks() {
        assert_eq!(
            EventDispatcher::resolve("sh.keptn.event.environment-setup.started"),
            None
        );
        assert_eq!(
            EventDispatcher::resolve("sh.keptn.event.environment-setup.finished"),
            None
        );
        assert_eq!(EventDispatcher::resolve("sh.keptn.event.deployment.triggered"), None);
        assert_eq!(EventDispatcher::resolve(""), None);
    }
}
