//! Service configuration.
//!
//! Settings are resolved in three layers, later layers overriding earlier:
//!
//! 1. Built-in defaults ([`ServiceConfig::default`])
//! 2. An optional YAML settings file ([`load_config`])
//! 3. Command-line flags and their environment variables (see [`crate::cli`])
//!
//! The resolved [`ServiceConfig`] is passed explicitly to every component
//! that needs it; nothing reads settings from global state.

pub mod loader;
pub mod schema;

pub use loader::{load_config, validate_config};
pub use schema::{
    InstallerSettings, PollSettings, RemoteControlPlane, ResourceMode, ResourceSettings,
    SecretSettings, ServiceConfig, DEFAULT_INSTALLER_VERSION, DEFAULT_MANIFEST_RESOURCE,
    DEFAULT_SECRET_NAME, DEFAULT_SECRET_NAMESPACE, DEFAULT_SERVICE_NAME,
};
