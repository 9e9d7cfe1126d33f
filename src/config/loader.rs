//! Settings file loading and validation.

use crate::config::schema::{ResourceMode, ServiceConfig};
use crate::error::{Result, ServiceError};
use std::fs;
use std::path::Path;

/// Load settings from an optional YAML file.
///
/// Without a path the built-in defaults are returned. Environment and
/// command-line overrides are applied afterwards by the caller.
pub fn load_config(path: Option<&Path>) -> Result<ServiceConfig> {
    let Some(path) = path else {
        return Ok(ServiceConfig::default());
    };

    if !path.exists() {
        return Err(ServiceError::ConfigNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(ServiceConfig::default());
    }

    serde_yaml::from_str(&content).map_err(|e| ServiceError::ConfigParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Check settings for combinations that cannot work.
pub fn validate_config(config: &ServiceConfig) -> Result<()> {
    if config.service_name.trim().is_empty() {
        return Err(ServiceError::ConfigValidationError {
            message: "service_name must not be empty".to_string(),
        });
    }

    if config.manifest_resource.trim().is_empty() {
        return Err(ServiceError::ConfigValidationError {
            message: "manifest_resource must not be empty".to_string(),
        });
    }

    if config.resources.mode == ResourceMode::Production
        && config
            .resources
            .configuration_service
            .as_deref()
            .is_none_or(|url| url.trim().is_empty())
    {
        return Err(ServiceError::ConfigValidationError {
            message: "production mode requires a configuration service URL".to_string(),
        });
    }

    if config.secret.name.is_empty() || config.secret.namespace.is_empty() {
        return Err(ServiceError::ConfigValidationError {
            message: "secret name and namespace must be set".to_string(),
        });
    }

    Ok(())
}
