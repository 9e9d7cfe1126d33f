//! crossplane-service - Keptn environment provisioning through Crossplane.
//!
//! The service reacts to `environment-setup.triggered` and
//! `environment-teardown.triggered` events. Setup applies a Crossplane
//! cluster manifest, waits for the cluster's kubeconfig secret, and
//! installs the Keptn helm-service into the new cluster. Teardown deletes
//! the manifest again. Progress and outcome are reported back to Keptn as
//! CloudEvents.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Settings loading and validation
//! - [`dispatch`] - Routing of inbound events to workflows
//! - [`error`] - Error types and result aliases
//! - [`events`] - CloudEvent types, delivery and the task lifecycle
//! - [`fetch`] - HTTP downloads and Kubernetes secret lookups
//! - [`readiness`] - Waiting for asynchronously created secrets
//! - [`resources`] - Where cluster manifests come from
//! - [`secrets`] - Masking credentials in reported output
//! - [`shell`] - External command execution
//! - [`task`] - Task identity and lifecycle state
//! - [`values`] - Helm values document patching
//! - [`workflow`] - The setup and teardown pipelines
//!
//! # Example
//!
//! ```
//! use crossplane_service::values::{FieldOverride, ValuesDocument};
//!
//! let mut doc = ValuesDocument::parse("a: 1\nb:\n  c: 2\n").unwrap();
//! doc.apply(&[FieldOverride::new("b.c", 5)]).unwrap();
//! assert_eq!(doc.get("b.c"), Some(&serde_yaml::Value::from(5)));
//! assert_eq!(doc.get("a"), Some(&serde_yaml::Value::from(1)));
//! ```
//!
//! For complete workflow runs, see the integration tests.

pub mod cli;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod events;
pub mod fetch;
pub mod readiness;
pub mod resources;
pub mod secrets;
pub mod shell;
pub mod task;
pub mod values;
pub mod workflow;

pub use error::{Result, ServiceError};
