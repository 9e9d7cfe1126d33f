//! In-memory resource store for testing.

use std::collections::HashMap;

use crate::error::{Result, ServiceError};

use super::{ResourceScope, ResourceStore};

/// Resource store backed by a map, keyed by scope and URI.
#[derive(Debug, Clone, Default)]
pub struct MemoryResourceStore {
    resources: HashMap<(ResourceScope, String), Vec<u8>>,
}

impl MemoryResourceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a resource and return the store.
    pub fn with_resource(
        mut self,
        scope: ResourceScope,
        uri: &str,
        content: impl Into<Vec<u8>>,
    ) -> Self {
        self.insert(scope, uri, content);
        self
    }

    pub fn insert(&mut self, scope: ResourceScope, uri: &str, content: impl Into<Vec<u8>>) {
        self.resources
            .insert((scope, uri.to_string()), content.into());
    }
}

impl ResourceStore for MemoryResourceStore {
    fn get_resource(&self, scope: &ResourceScope, uri: &str) -> Result<Vec<u8>> {
        self.resources
            .get(&(scope.clone(), uri.to_string()))
            .cloned()
            .ok_or_else(|| ServiceError::ResourceNotFound {
                uri: uri.to_string(),
            })
    }
}
