//! Service settings.
//!
//! Every field has a default matching the values the service ships with,
//! so an empty settings file (or none at all) yields a working
//! configuration once the remote control plane endpoint is supplied.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Name used as the source of every emitted event.
pub const DEFAULT_SERVICE_NAME: &str = "crossplane-service";

/// Logical name of the cluster manifest in the resource store.
pub const DEFAULT_MANIFEST_RESOURCE: &str = "crossplane/cluster.yaml";

/// Secret created by Crossplane once the cluster is reachable.
pub const DEFAULT_SECRET_NAME: &str = "kubeconfig-keptn-crossplane";

/// Namespace Crossplane writes connection secrets to.
pub const DEFAULT_SECRET_NAMESPACE: &str = "crossplane-system";

/// Keptn release of the helm-service installed into new clusters.
pub const DEFAULT_INSTALLER_VERSION: &str = "0.8.0";

/// Root configuration for the service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Source identifier on outbound events.
    pub service_name: String,

    /// Logical filename of the manifest in the resource store.
    pub manifest_resource: String,

    /// Base directory for per-task working files.
    pub work_dir: PathBuf,

    /// kubectl executable.
    pub kubectl: String,

    /// helm executable.
    pub helm: String,

    /// Outbound event broker endpoint.
    pub event_broker: String,

    /// Where manifests are read from.
    pub resources: ResourceSettings,

    /// Credential secret coordinates.
    pub secret: SecretSettings,

    /// Readiness polling intervals.
    pub poll: PollSettings,

    /// Dependent component installation.
    pub installer: InstallerSettings,

    /// Control plane the installed component connects back to.
    pub remote_control_plane: RemoteControlPlane,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            service_name: DEFAULT_SERVICE_NAME.to_string(),
            manifest_resource: DEFAULT_MANIFEST_RESOURCE.to_string(),
            work_dir: std::env::temp_dir().join(DEFAULT_SERVICE_NAME),
            kubectl: "kubectl".to_string(),
            helm: "helm".to_string(),
            event_broker: "http://localhost:8081/event".to_string(),
            resources: ResourceSettings::default(),
            secret: SecretSettings::default(),
            poll: PollSettings::default(),
            installer: InstallerSettings::default(),
            remote_control_plane: RemoteControlPlane::default(),
        }
    }
}

/// Resource store selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceSettings {
    /// `local` reads from `local_dir`, `production` from the configuration service.
    pub mode: ResourceMode,

    /// Configuration service base URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configuration_service: Option<String>,

    /// Directory holding resources in local mode.
    pub local_dir: PathBuf,
}

impl Default for ResourceSettings {
    fn default() -> Self {
        Self {
            mode: ResourceMode::Local,
            configuration_service: None,
            local_dir: PathBuf::from("."),
        }
    }
}

/// Deployment environment, decides where resources come from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceMode {
    /// Resources are files on the local filesystem.
    #[default]
    Local,
    /// Resources come from the remote configuration service.
    Production,
}

impl std::str::FromStr for ResourceMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "local" => Ok(ResourceMode::Local),
            "production" => Ok(ResourceMode::Production),
            other => Err(format!(
                "unknown environment '{}' (expected local or production)",
                other
            )),
        }
    }
}

/// Credential secret coordinates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecretSettings {
    pub name: String,
    pub namespace: String,
    /// Data key holding the encoded kubeconfig.
    pub data_key: String,
}

impl Default for SecretSettings {
    fn default() -> Self {
        Self {
            name: DEFAULT_SECRET_NAME.to_string(),
            namespace: DEFAULT_SECRET_NAMESPACE.to_string(),
            data_key: "kubeconfig".to_string(),
        }
    }
}

/// Readiness polling intervals, in seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollSettings {
    /// Grace period before the first probe.
    pub initial_delay_secs: u64,

    /// Wait between probes.
    pub interval_secs: u64,

    /// Give up after this long. Unset means wait forever.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            initial_delay_secs: 10,
            interval_secs: 30,
            timeout_secs: None,
        }
    }
}

impl PollSettings {
    /// Settings with no waiting at all.
    pub fn immediate() -> Self {
        Self {
            initial_delay_secs: 0,
            interval_secs: 0,
            timeout_secs: None,
        }
    }

    pub fn initial_delay(&self) -> Duration {
        Duration::from_secs(self.initial_delay_secs)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// How the dependent component is installed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallerSettings {
    /// Release version, also used as the image tag.
    pub version: String,

    /// Helm release name.
    pub release: String,

    /// Namespace the release is installed into.
    pub namespace: String,

    /// Values template location; derived from `version` when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub values_template_url: Option<String>,

    /// Chart archive location; derived from `version` when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart_url: Option<String>,
}

impl Default for InstallerSettings {
    fn default() -> Self {
        Self {
            version: DEFAULT_INSTALLER_VERSION.to_string(),
            release: "helm-service".to_string(),
            namespace: "keptn-exec".to_string(),
            values_template_url: None,
            chart_url: None,
        }
    }
}

impl InstallerSettings {
    /// Values template for the configured version.
    pub fn template_url(&self) -> String {
        self.values_template_url.clone().unwrap_or_else(|| {
            format!(
                "https://raw.githubusercontent.com/keptn/keptn/release-{}/helm-service/chart/values.yaml",
                self.version
            )
        })
    }

    /// Chart archive for the configured version.
    pub fn chart(&self) -> String {
        self.chart_url.clone().unwrap_or_else(|| {
            format!(
                "https://github.com/keptn/keptn/releases/download/{0}/helm-service-{0}.tgz",
                self.version
            )
        })
    }
}

/// Endpoint of the control plane the installed component reports to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteControlPlane {
    pub protocol: String,
    pub hostname: String,
    pub token: String,
}

impl Default for RemoteControlPlane {
    fn default() -> Self {
        Self {
            protocol: "http".to_string(),
            hostname: String::new(),
            token: String::new(),
        }
    }
}
