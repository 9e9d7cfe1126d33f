//! Environment teardown: delete the resources a cluster manifest created.

use std::fmt;

use tracing::info;

use crate::error::Result;
use crate::task::Task;

use super::{drive, StepContext, TaskReport, WorkflowContext, Workspace};

/// Progress of a teardown task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeardownState {
    Started,
    ManifestFetched,
    ManifestDeleted,
}

impl fmt::Display for TeardownState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TeardownState::Started => "started",
            TeardownState::ManifestFetched => "manifest fetched",
            TeardownState::ManifestDeleted => "manifest deleted",
        };
        f.write_str(name)
    }
}

/// Run the teardown workflow for `task`.
pub fn run(ctx: WorkflowContext<'_>, task: Task) -> Result<TaskReport> {
    drive(ctx, task, TeardownState::Started, |run, state| {
        let workspace = Workspace::create(&run.ctx.config.work_dir, &run.task)?;

        let manifest = run.fetch_manifest(&workspace)?;
        *state = TeardownState::ManifestFetched;

        let output = run.kubectl_manifest("delete", &manifest).step_failed(|e| {
            format!("Error while deleting crossplane cluster manifest: {}", e)
        })?;
        info!("Cluster manifest deleted");
        *state = TeardownState::ManifestDeleted;

        Ok(output.trim().to_string())
    })
}
