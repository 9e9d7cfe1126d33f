//! Environment setup: provision a cluster and install the helm-service into it.

use std::fmt;
use std::fs;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use tracing::info;

use crate::error::{Result, ServiceError};
use crate::fetch::SecretClient;
use crate::readiness::ReadinessPoller;
use crate::shell::CommandLine;
use crate::task::Task;
use crate::values::{installer_overrides, patch_file};

use super::{drive, SoftFailure, StepContext, TaskReport, WorkflowContext, Workspace};

/// Progress of a setup task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupState {
    Started,
    ManifestFetched,
    ManifestApplied,
    SecretReady,
    CredentialPersisted,
    DependencyInstalled,
}

impl fmt::Display for SetupState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SetupState::Started => "started",
            SetupState::ManifestFetched => "manifest fetched",
            SetupState::ManifestApplied => "manifest applied",
            SetupState::SecretReady => "secret ready",
            SetupState::CredentialPersisted => "credential persisted",
            SetupState::DependencyInstalled => "dependency installed",
        };
        f.write_str(name)
    }
}

/// Run the setup workflow for `task`.
pub fn run(ctx: WorkflowContext<'_>, task: Task) -> Result<TaskReport> {
    drive(ctx, task, SetupState::Started, |run, state| {
        let config = run.ctx.config;
        let runner = run.ctx.runner;
        let workspace = Workspace::create(&config.work_dir, &run.task)?;

        let manifest = run.fetch_manifest(&workspace)?;
        *state = SetupState::ManifestFetched;

        run.kubectl_manifest("apply", &manifest).step_failed(|e| {
            format!("Error while applying crossplane cluster manifest: {}", e)
        })?;
        info!("Cluster manifest applied");
        *state = SetupState::ManifestApplied;

        let secret = &config.secret;
        run.status(&format!(
            "Cluster manifest applied - waiting for secret {} in namespace {}",
            secret.name, secret.namespace
        ));

        let secrets = SecretClient::new(runner, config.kubectl.as_str());
        ReadinessPoller::new(&config.poll)
            .await_secret(&secrets, &secret.name, &secret.namespace, |message| {
                run.status(message)
            })
            .step_failed(|e| format!("Cluster secret did not become available: {}", e))?;
        info!("Secret {} found", secret.name);
        *state = SetupState::SecretReady;

        let encoded = match secrets.fetch_data(&secret.name, &secret.namespace, &secret.data_key) {
            Ok(encoded) => encoded,
            Err(e) => {
                run.soft_fail(SoftFailure::CredentialFetchFailed {
                    secret: secret.name.clone(),
                    message: e.to_string(),
                });
                String::new()
            }
        };
        let kubeconfig = BASE64
            .decode(encoded.as_bytes())
            .map_err(|e| ServiceError::DecodeFailed {
                what: format!("kubeconfig in secret {}", secret.name),
                message: e.to_string(),
            })
            .step_failed(|e| format!("Could not base64 decode the Kubeconfig: {}", e))?;

        let kubeconfig_path = workspace.kubeconfig_path();
        fs::write(&kubeconfig_path, &kubeconfig)
            .map_err(ServiceError::Io)
            .step_failed(|e| format!("Could not store kubeconfig file locally: {}", e))?;
        if kubeconfig.is_empty() {
            run.soft_fail(SoftFailure::EmptyCredential {
                secret: secret.name.clone(),
            });
        }
        run.masker
            .add_secret_lines(&String::from_utf8_lossy(&kubeconfig));
        *state = SetupState::CredentialPersisted;

        let kubeconfig_arg = kubeconfig_path.display().to_string();
        let probe = CommandLine::new(
            config.kubectl.as_str(),
            ["get", "nodes", "--kubeconfig", kubeconfig_arg.as_str()],
        );
        let nodes = match runner.run(&probe) {
            Ok(output) => output,
            Err(e) => {
                let output = match &e {
                    ServiceError::CommandFailed { output, .. } => output.clone(),
                    other => other.to_string(),
                };
                run.soft_fail(SoftFailure::NodeProbeFailed {
                    message: e.to_string(),
                });
                output
            }
        };
        info!("Cluster nodes:\n{}", nodes);
        run.status(&nodes);

        let installer = &config.installer;
        let values_path = workspace.values_path();
        let template_url = installer.template_url();
        run.ctx
            .downloader
            .download(&template_url, &values_path)
            .step_failed(|e| format!("Could not download helm values template: {}", e))?;
        patch_file(
            &values_path,
            &installer_overrides(installer, &config.remote_control_plane),
        )
        .step_failed(|e| format!("Could not prepare helm values: {}", e))?;

        let install = CommandLine::new(
            config.helm.as_str(),
            [
                "upgrade".to_string(),
                "--install".to_string(),
                installer.release.clone(),
                installer.chart(),
                "-n".to_string(),
                installer.namespace.clone(),
                "--create-namespace".to_string(),
                "-f".to_string(),
                values_path.display().to_string(),
                "--kubeconfig".to_string(),
                kubeconfig_arg,
            ],
        );
        tracing::debug!("Running {}", install);
        let output = runner
            .run(&install)
            .step_failed(|e| format!("Error while installing {}: {}", installer.release, e))?;
        run.status(&output);
        *state = SetupState::DependencyInstalled;

        Ok(format!(
            "Environment for service {} in stage {} of project {} is ready",
            run.task.service, run.task.stage, run.task.project
        ))
    })
}
