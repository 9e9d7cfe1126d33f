//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct. Deployment settings can be
//! given as flags or through the environment variables a Keptn service
//! is normally configured with.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{ResourceMode, ServiceConfig};

/// Keptn service that provisions clusters with Crossplane.
#[derive(Debug, Parser)]
#[command(name = "crossplane-service")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to a YAML settings file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(flatten)]
    pub settings: SettingsArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Handle one Keptn CloudEvent
    Handle(HandleArgs),

    /// Print the patched helm-service values without installing anything
    RenderValues(RenderValuesArgs),
}

/// Settings that override the settings file.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct SettingsArgs {
    /// Where manifests are read from (local or production)
    #[arg(long, env = "ENV", global = true)]
    pub env: Option<ResourceMode>,

    /// Configuration service base URL
    #[arg(long, env = "CONFIGURATION_SERVICE", global = true)]
    pub configuration_service: Option<String>,

    /// Directory holding resources in local mode
    #[arg(long, env = "RESOURCE_DIR", global = true)]
    pub resource_dir: Option<PathBuf>,

    /// Event broker endpoint
    #[arg(long, env = "K_SINK", global = true)]
    pub event_broker: Option<String>,

    /// Base directory for working files
    #[arg(long, env = "WORK_DIR", global = true)]
    pub work_dir: Option<PathBuf>,

    /// Keptn release of the installed helm-service
    #[arg(long, env = "INSTALLER_VERSION", global = true)]
    pub installer_version: Option<String>,

    /// Protocol of the Keptn API
    #[arg(long, env = "KEPTN_API_PROTOCOL", global = true)]
    pub api_protocol: Option<String>,

    /// Hostname of the Keptn API
    #[arg(long, env = "KEPTN_API_HOSTNAME", global = true)]
    pub api_hostname: Option<String>,

    /// Keptn API token
    #[arg(long, env = "KEPTN_API_TOKEN", global = true, hide_env_values = true)]
    pub api_token: Option<String>,

    /// Stop waiting for the cluster secret after this many seconds
    #[arg(long, env = "POLL_TIMEOUT_SECS", global = true)]
    pub poll_timeout_secs: Option<u64>,
}

impl SettingsArgs {
    /// Apply every given setting on top of `config`.
    pub fn apply(&self, config: &mut ServiceConfig) {
        if let Some(mode) = self.env {
            config.resources.mode = mode;
        }
        if let Some(url) = &self.configuration_service {
            config.resources.configuration_service = Some(url.clone());
        }
        if let Some(dir) = &self.resource_dir {
            config.resources.local_dir = dir.clone();
        }
        if let Some(endpoint) = &self.event_broker {
            config.event_broker = endpoint.clone();
        }
        if let Some(dir) = &self.work_dir {
            config.work_dir = dir.clone();
        }
        if let Some(version) = &self.installer_version {
            config.installer.version = version.clone();
        }
        if let Some(protocol) = &self.api_protocol {
            config.remote_control_plane.protocol = protocol.clone();
        }
        if let Some(hostname) = &self.api_hostname {
            config.remote_control_plane.hostname = hostname.clone();
        }
        if let Some(token) = &self.api_token {
            config.remote_control_plane.token = token.clone();
        }
        if let Some(timeout) = self.poll_timeout_secs {
            config.poll.timeout_secs = Some(timeout);
        }
    }
}

/// Arguments for the `handle` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct HandleArgs {
    /// File holding the CloudEvent JSON (`-` or omitted for stdin)
    #[arg(short, long)]
    pub event: Option<PathBuf>,
}

/// Arguments for the `render-values` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct RenderValuesArgs {
    /// Write the values here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_reads_event_file() {
        let cli = Cli::try_parse_from(["crossplane-service", "handle", "--event", "event.json"])
            .unwrap();
        match cli.command {
            Commands::Handle(args) => {
                assert_eq!(args.event, Some(PathBuf::from("event.json")));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn settings_override_defaults() {
        let cli = Cli::try_parse_from([
            "crossplane-service",
            "--env",
            "production",
            "--configuration-service",
            "http://configuration-service:8080",
            "--installer-version",
            "0.8.1",
            "render-values",
        ])
        .unwrap();

        let mut config = ServiceConfig::default();
        cli.settings.apply(&mut config);

        assert_eq!(config.resources.mode, ResourceMode::Production);
        assert_eq!(
            config.resources.configuration_service.as_deref(),
            Some("http://configuration-service:8080")
        );
        assert_eq!(config.installer.version, "0.8.1");
    }

    #[test]
    fn unknown_environment_is_rejected() {
        let result = Cli::try_parse_from(["crossplane-service", "--env", "staging", "handle"]);
        assert!(result.is_err());
    }

    #[test]
    fn subcommand_is_required() {
        assert!(Cli::try_parse_from(["crossplane-service"]).is_err());
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
