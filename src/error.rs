//! Error types for crossplane-service operations.
//!
//! This module defines [`ServiceError`], the error type shared by the
//! workflows and their building blocks, and a [`Result`] type alias.
//!
//! # Error Handling Strategy
//!
//! - Fail-fast conditions are `ServiceError` variants; a workflow turns
//!   each one into a single failed `finished` notification
//! - Soft conditions never become errors; see [`crate::workflow::SoftFailure`]
//! - Use `anyhow::Error` (via `ServiceError::Other`) for unexpected errors

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Core error type for crossplane-service operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The inbound event type has no handler.
    #[error("Unhandled Keptn Cloud Event: {event_type}")]
    UnhandledEventType { event_type: String },

    /// The inbound event payload does not match the triggered event data.
    #[error("Failed to parse payload of {event_type} event: {message}")]
    PayloadParse { event_type: String, message: String },

    /// A resource is missing from the resource store.
    #[error("Resource not found: {uri}")]
    ResourceNotFound { uri: String },

    /// The resource store could not be queried.
    #[error("Failed to fetch resource {uri}: {message}")]
    ResourceFetchFailed { uri: String, message: String },

    /// External command exited non-zero or could not start.
    #[error("Error executing command {command} {}: {exit}\n{output}", args.join(" "))]
    CommandFailed {
        command: String,
        args: Vec<String>,
        exit: String,
        output: String,
    },

    /// A base64 payload could not be decoded.
    #[error("Could not base64 decode {what}: {message}")]
    DecodeFailed { what: String, message: String },

    /// HTTP download failed.
    #[error("Failed to download {url}: {message}")]
    DownloadFailed { url: String, message: String },

    /// Structured document could not be read.
    #[error("Failed to load document {path}: {message}")]
    DocumentLoadFailed { path: PathBuf, message: String },

    /// Structured document is not valid YAML.
    #[error("Failed to parse document {path}: {message}")]
    DocumentParseFailed { path: PathBuf, message: String },

    /// Structured document could not be patched or written.
    #[error("Failed to write document {path}: {message}")]
    DocumentIo { path: PathBuf, message: String },

    /// A notification could not be delivered to the event broker.
    #[error("Failed to send {event_type} event: {message}")]
    NotificationDeliveryFailed { event_type: String, message: String },

    /// Readiness polling exceeded its configured deadline.
    #[error("Timed out after {elapsed:?} waiting for {what}")]
    Timeout { what: String, elapsed: Duration },

    /// Settings file not found at the given location.
    #[error("Configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse the settings file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// Invalid service settings.
    #[error("Invalid configuration: {message}")]
    ConfigValidationError { message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ServiceError {
    /// Rewrite the free-text parts of the error, keeping its variant.
    ///
    /// Used to redact credentials from command output and remote
    /// responses before an error leaves a workflow.
    pub fn map_text(self, f: impl Fn(&str) -> String) -> Self {
        use ServiceError::*;

        match self {
            PayloadParse { event_type, message } => PayloadParse {
                event_type,
                message: f(&message),
            },
            ResourceFetchFailed { uri, message } => ResourceFetchFailed {
                uri,
                message: f(&message),
            },
            CommandFailed {
                command,
                args,
                exit,
                output,
            } => CommandFailed {
                command,
                args: args.iter().map(|arg| f(arg)).collect(),
                exit,
                output: f(&output),
            },
            DecodeFailed { what, message } => DecodeFailed {
                what,
                message: f(&message),
            },
            DownloadFailed { url, message } => DownloadFailed {
                url: f(&url),
                message: f(&message),
            },
            DocumentLoadFailed { path, message } => DocumentLoadFailed {
                path,
                message: f(&message),
            },
            DocumentParseFailed { path, message } => DocumentParseFailed {
                path,
                message: f(&message),
            },
            DocumentIo { path, message } => DocumentIo {
                path,
                message: f(&message),
            },
            NotificationDeliveryFailed {
                event_type,
                message,
            } => NotificationDeliveryFailed {
                event_type,
                message: f(&message),
            },
            ConfigValidationError { message } => ConfigValidationError {
                message: f(&message),
            },
            Io(e) => {
                let text = e.to_string();
                let mapped = f(&text);
                if mapped == text {
                    Io(e)
                } else {
                    Io(std::io::Error::new(e.kind(), mapped))
                }
            }
            Other(e) => {
                let text = format!("{:#}", e);
                let mapped = f(&text);
                if mapped == text {
                    Other(e)
                } else {
                    Other(anyhow::anyhow!(mapped))
                }
            }
            other => other,
        }
    }
}

/// Result type alias for crossplane-service operations.
pub type Result<T> = std::result::Result<T, ServiceError>;
