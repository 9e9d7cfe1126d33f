//! Resource stores: where cluster manifests come from.
//!
//! A resource is a file kept in the Keptn configuration repository,
//! addressed by project, stage, service and a logical URI such as
//! `crossplane/cluster.yaml`.

pub mod configuration_service;
pub mod local;
pub mod memory;

pub use configuration_service::ConfigurationServiceStore;
pub use local::LocalResourceStore;
pub use memory::MemoryResourceStore;

use crate::error::Result;

/// Project, stage and service a resource belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceScope {
    pub project: String,
    pub stage: String,
    pub service: String,
}

impl ResourceScope {
    pub fn new(
        project: impl Into<String>,
        stage: impl Into<String>,
        service: impl Into<String>,
    ) -> Self {
        Self {
            project: project.into(),
            stage: stage.into(),
            service: service.into(),
        }
    }
}

/// Read access to resources.
pub trait ResourceStore {
    /// Fetch the raw bytes of `uri` in `scope`.
    ///
    /// A missing resource is [`crate::ServiceError::ResourceNotFound`];
    /// any other failure is `ResourceFetchFailed`.
    fn get_resource(&self, scope: &ResourceScope, uri: &str) -> Result<Vec<u8>>;
}
