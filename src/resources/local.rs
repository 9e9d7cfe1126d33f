//! Resources read from the local filesystem.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use crate::error::{Result, ServiceError};

use super::{ResourceScope, ResourceStore};

/// Serves resources from a directory, ignoring the scope.
///
/// Used when the service runs next to a checkout of the configuration
/// repository instead of inside a Keptn installation.
#[derive(Debug, Clone)]
pub struct LocalResourceStore {
    root: PathBuf,
}

impl LocalResourceStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ResourceStore for LocalResourceStore {
    fn get_resource(&self, _scope: &ResourceScope, uri: &str) -> Result<Vec<u8>> {
        let path = self.root.join(uri.trim_start_matches('/'));
        fs::read(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => ServiceError::ResourceNotFound {
                uri: uri.to_string(),
            },
            _ => ServiceError::ResourceFetchFailed {
                uri: uri.to_string(),
                message: format!("{}: {}", path.display(), e),
            },
        })
    }
}
