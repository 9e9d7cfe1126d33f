//! Task workflows.
//!
//! A workflow is a one-shot pipeline of steps run for a single task.
//! [`drive`] owns the lifecycle around the pipeline: it announces the
//! task, runs the steps, and reports exactly one finished notification
//! whatever the outcome. Steps fail fast through [`StepFailure`], which
//! pairs the causing error with the message the orchestrator sees.
//!
//! Problems that must not abort the task (a lost status notification,
//! an unreadable credential payload, a failing node probe) are recorded
//! as [`SoftFailure`]s, logged, and returned in the [`TaskReport`].

pub mod setup;
pub mod teardown;
pub mod workspace;

use std::fmt;
use std::fs;
use std::path::PathBuf;

use tracing::{error, info, warn};

use crate::config::ServiceConfig;
use crate::error::{Result, ServiceError};
use crate::events::{EventSender, TaskEmitter, TaskResult};
use crate::fetch::Downloader;
use crate::resources::{ResourceScope, ResourceStore};
use crate::secrets::OutputMasker;
use crate::shell::{CommandLine, CommandRunner};
use crate::task::{Task, TaskKind};

pub use setup::SetupState;
pub use teardown::TeardownState;
pub use workspace::Workspace;

/// Collaborators a workflow runs against.
#[derive(Clone, Copy)]
pub struct WorkflowContext<'a> {
    pub config: &'a ServiceConfig,
    pub runner: &'a dyn CommandRunner,
    pub resources: &'a dyn ResourceStore,
    pub sender: &'a dyn EventSender,
    pub downloader: &'a Downloader,
}

/// A problem that was logged and tolerated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SoftFailure {
    /// A status-changed notification could not be delivered.
    NotificationDeliveryFailed { message: String },
    /// The credential payload could not be read from the secret.
    CredentialFetchFailed { secret: String, message: String },
    /// The secret held an empty credential.
    EmptyCredential { secret: String },
    /// Listing the nodes of the new cluster failed.
    NodeProbeFailed { message: String },
}

impl fmt::Display for SoftFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SoftFailure::NotificationDeliveryFailed { message } => {
                write!(f, "Could not send status update: {}", message)
            }
            SoftFailure::CredentialFetchFailed { secret, message } => {
                write!(f, "Error while getting kubeconfig from {}: {}", secret, message)
            }
            SoftFailure::EmptyCredential { secret } => {
                write!(f, "KubeConfig in secret {} is empty", secret)
            }
            SoftFailure::NodeProbeFailed { message } => {
                write!(f, "Could not list cluster nodes: {}", message)
            }
        }
    }
}

/// Outcome of a workflow that ran to completion.
#[derive(Debug, Clone)]
pub struct TaskReport {
    pub kind: TaskKind,
    pub result: TaskResult,
    /// Message sent with the finished notification.
    pub message: String,
    /// Name of the last state the workflow reached.
    pub reached: String,
    pub soft_failures: Vec<SoftFailure>,
}

impl TaskReport {
    pub fn passed(&self) -> bool {
        self.result == TaskResult::Pass
    }
}

/// A fail-fast step error: the cause plus the message reported for it.
#[derive(Debug)]
pub struct StepFailure {
    pub message: String,
    pub error: ServiceError,
}

impl StepFailure {
    pub fn new(message: impl Into<String>, error: ServiceError) -> Self {
        Self {
            message: message.into(),
            error,
        }
    }
}

impl From<ServiceError> for StepFailure {
    fn from(error: ServiceError) -> Self {
        Self {
            message: error.to_string(),
            error,
        }
    }
}

impl From<std::io::Error> for StepFailure {
    fn from(error: std::io::Error) -> Self {
        ServiceError::Io(error).into()
    }
}

pub type StepResult<T> = std::result::Result<T, StepFailure>;

/// Attach a reported message to a failing step.
pub trait StepContext<T> {
    fn step_failed(self, message: impl FnOnce(&ServiceError) -> String) -> StepResult<T>;
}

impl<T> StepContext<T> for Result<T> {
    fn step_failed(self, message: impl FnOnce(&ServiceError) -> String) -> StepResult<T> {
        self.map_err(|error| StepFailure::new(message(&error), error))
    }
}

/// State shared by the steps of one task.
pub struct TaskRun<'a> {
    pub ctx: WorkflowContext<'a>,
    pub task: Task,
    pub masker: OutputMasker,
    emitter: TaskEmitter<'a>,
    soft_failures: Vec<SoftFailure>,
}

impl<'a> TaskRun<'a> {
    fn new(ctx: WorkflowContext<'a>, task: Task) -> Self {
        let mut masker = OutputMasker::new();
        masker.add_secret(ctx.config.remote_control_plane.token.as_str());

        Self {
            ctx,
            task,
            masker,
            emitter: TaskEmitter::new(ctx.sender, ctx.config.service_name.as_str()),
            soft_failures: Vec::new(),
        }
    }

    /// Send a progress message; delivery failure is tolerated.
    pub fn status(&mut self, message: &str) {
        let message = self.masker.mask(message);
        if let Err(e) = self.emitter.emit_status_changed(&mut self.task, &message) {
            self.soft_fail(SoftFailure::NotificationDeliveryFailed {
                message: e.to_string(),
            });
        }
    }

    /// Record a tolerated problem.
    pub fn soft_fail(&mut self, failure: SoftFailure) {
        warn!("{}", failure);
        self.soft_failures.push(failure);
    }

    pub fn soft_failures(&self) -> &[SoftFailure] {
        &self.soft_failures
    }

    /// Resource scope of the task's target environment.
    pub fn scope(&self) -> ResourceScope {
        ResourceScope::new(
            self.task.project.as_str(),
            self.task.stage.as_str(),
            self.task.service.as_str(),
        )
    }

    /// Fetch the manifest and store it in the workspace.
    pub fn fetch_manifest(&self, workspace: &Workspace) -> StepResult<PathBuf> {
        let uri = self.ctx.config.manifest_resource.as_str();
        info!("Looking for manifest {} in the resource store", uri);

        let content = self
            .ctx
            .resources
            .get_resource(&self.scope(), uri)
            .step_failed(|e| match e {
                ServiceError::ResourceNotFound { .. } => format!(
                    "No {} file found for service {} in stage {} in project {}",
                    uri, self.task.service, self.task.stage, self.task.project
                ),
                other => format!("Could not fetch {}: {}", uri, other),
            })?;

        let path = workspace.manifest_path(uri);
        fs::write(&path, content)
            .map_err(ServiceError::Io)
            .step_failed(|e| format!("Could not store manifest file locally: {}", e))?;

        info!("Manifest stored at {}", path.display());
        Ok(path)
    }

    /// Run `kubectl <verb> -f <manifest>`.
    pub fn kubectl_manifest(&self, verb: &str, manifest: &std::path::Path) -> Result<String> {
        let command = CommandLine::new(
            self.ctx.config.kubectl.as_str(),
            [verb.to_string(), "-f".to_string(), manifest.display().to_string()],
        );
        tracing::debug!("Running {}", command);
        self.ctx.runner.run(&command)
    }
}

/// Run `steps` for `task` between a started and a finished notification.
///
/// The finished notification is sent exactly once. When the started
/// notification cannot be delivered no step runs; a failed finished
/// notification is still attempted and the delivery error is returned.
/// Returned errors are masked like the reported messages.
pub fn drive<'a, S>(
    ctx: WorkflowContext<'a>,
    task: Task,
    initial: S,
    steps: impl FnOnce(&mut TaskRun<'a>, &mut S) -> StepResult<String>,
) -> Result<TaskReport>
where
    S: fmt::Display,
{
    let kind = task.kind;
    let mut run = TaskRun::new(ctx, task);
    info!(
        "Handling {} for service {} in stage {} of project {}",
        kind, run.task.service, run.task.stage, run.task.project
    );

    if let Err(e) = run.emitter.emit_started(&mut run.task) {
        let e = run.masker.mask_error(e);
        error!("Failed to send task started event ({}), aborting", e);
        let message = format!("Failed to send task started event: {}", e);
        if let Err(finish) = run
            .emitter
            .emit_finished(&mut run.task, TaskResult::Fail, &message)
        {
            warn!("Could not report aborted task: {}", finish);
        }
        return Err(e);
    }

    let mut state = initial;
    match steps(&mut run, &mut state) {
        Ok(message) => {
            info!("{} finished in state {}", kind, state);
            run.emitter
                .emit_finished(&mut run.task, TaskResult::Pass, &message)
                .map_err(|e| run.masker.mask_error(e))?;
            Ok(TaskReport {
                kind,
                result: TaskResult::Pass,
                message,
                reached: state.to_string(),
                soft_failures: run.soft_failures,
            })
        }
        Err(failure) => {
            let message = run.masker.mask(&failure.message);
            error!("{} failed after {}: {}", kind, state, message);
            if let Err(finish) = run
                .emitter
                .emit_finished(&mut run.task, TaskResult::Fail, &message)
            {
                warn!("Could not report failed task: {}", run.masker.mask_error(finish));
            }
            Err(run.masker.mask_error(failure.error))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{CloudEvent, RecordingSender};
    use crate::resources::memory::MemoryResourceStore;
    use crate::shell::ScriptedRunner;
    use crate::task::CorrelationContext;
    use crate::task::TaskStatus;

    fn task() -> Task {
        Task {
            kind: TaskKind::Teardown,
            project: "P".into(),
            stage: "T".into(),
            service: "S".into(),
            labels: None,
            context: CorrelationContext {
                keptn_context: "ctx".into(),
                triggered_id: "trig".into(),
            },
            status: TaskStatus::Triggered,
            result: TaskResult::Unset,
        }
    }

    struct Fixture {
        config: ServiceConfig,
        runner: ScriptedRunner,
        resources: MemoryResourceStore,
        sender: RecordingSender,
        downloader: Downloader,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                config: ServiceConfig::default(),
                runner: ScriptedRunner::new(),
                resources: MemoryResourceStore::new(),
                sender: RecordingSender::new(),
                downloader: Downloader::new().unwrap(),
            }
        }

        fn ctx(&self) -> WorkflowContext<'_> {
            WorkflowContext {
                config: &self.config,
                runner: &self.runner,
                resources: &self.resources,
                sender: &self.sender,
                downloader: &self.downloader,
            }
        }
    }

    fn finished(sender: &RecordingSender) -> Vec<CloudEvent> {
        sender.finished()
    }

    #[test]
    fn successful_steps_finish_with_pass() {
        let fixture = Fixture::new();
        let report = drive(fixture.ctx(), task(), "Begin", |run, state| {
            run.status("halfway");
            *state = "End";
            Ok("done".to_string())
        })
        .unwrap();

        assert!(report.passed());
        assert_eq!(report.reached, "End");
        assert_eq!(report.message, "done");
        assert_eq!(
            fixture.sender.event_types(),
            vec![
                "sh.keptn.event.environment-teardown.started",
                "sh.keptn.event.environment-teardown.status.changed",
                "sh.keptn.event.environment-teardown.finished",
            ]
        );
    }

    #[test]
    fn failing_step_finishes_once_with_fail() {
        let fixture = Fixture::new();
        let err = drive(fixture.ctx(), task(), "Begin", |_, _| {
            Err(StepFailure::new(
                "boom",
                ServiceError::Other(anyhow::anyhow!("cause")),
            ))
        })
        .unwrap_err();

        assert!(matches!(err, ServiceError::Other(_)));
        let finished = finished(&fixture.sender);
        assert_eq!(finished.len(), 1);
        assert_eq!(finished[0].data["result"], "fail");
        assert_eq!(finished[0].data["status"], "errored");
        assert_eq!(finished[0].data["message"], "boom");
    }

    #[test]
    fn undeliverable_started_skips_steps() {
        let fixture = Fixture::new();
        fixture.sender.fail_on(".started");

        let mut ran = false;
        let err = drive(fixture.ctx(), task(), "Begin", |_, _| {
            ran = true;
            Ok(String::new())
        })
        .unwrap_err();

        assert!(!ran);
        assert!(matches!(err, ServiceError::NotificationDeliveryFailed { .. }));
        assert_eq!(fixture.sender.count(".finished"), 1);
    }

    #[test]
    fn undeliverable_status_is_soft() {
        let fixture = Fixture::new();
        fixture.sender.fail_on(".status.changed");

        let report = drive(fixture.ctx(), task(), "Begin", |run, _| {
            run.status("progress");
            Ok(String::new())
        })
        .unwrap();

        assert!(report.passed());
        assert_eq!(report.soft_failures.len(), 1);
        assert!(matches!(
            report.soft_failures[0],
            SoftFailure::NotificationDeliveryFailed { .. }
        ));
    }

    #[test]
    fn failure_message_is_masked() {
        let mut fixture = Fixture::new();
        fixture.config.remote_control_plane.token = "api-token-123".into();

        let _ = drive(fixture.ctx(), task(), "Begin", |_, _| {
            Err(StepFailure::new(
                "helm said api-token-123",
                ServiceError::Other(anyhow::anyhow!("x")),
            ))
        });

        let finished = finished(&fixture.sender);
        assert_eq!(finished[0].data["message"], "helm said [REDACTED]");
    }

    #[test]
    fn returned_error_is_masked() {
        let mut fixture = Fixture::new();
        fixture.config.remote_control_plane.token = "api-token-123".into();

        let err = drive(fixture.ctx(), task(), "Begin", |_, _| {
            let command = CommandLine::new("helm", ["upgrade"]);
            Err(StepFailure::from(
                command.failed("exit status: 1", "Error: token api-token-123 rejected"),
            ))
        })
        .unwrap_err();

        assert!(matches!(err, ServiceError::CommandFailed { .. }));
        assert!(!err.to_string().contains("api-token-123"));
        assert!(err.to_string().contains("token [REDACTED] rejected"));
    }

    #[test]
    fn missing_manifest_message_names_target() {
        let fixture = Fixture::new();
        let temp = tempfile::TempDir::new().unwrap();

        let err = drive(fixture.ctx(), task(), "Begin", |run, _| {
            let workspace = Workspace::create(temp.path(), &run.task)?;
            run.fetch_manifest(&workspace)?;
            Ok(String::new())
        })
        .unwrap_err();

        assert!(matches!(err, ServiceError::ResourceNotFound { .. }));
        assert_eq!(
            finished(&fixture.sender)[0].data["message"],
            "No crossplane/cluster.yaml file found for service S in stage T in project P"
        );
    }
}
