//! Resources from the Keptn configuration service.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use reqwest::blocking::Client;
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use std::time::Duration;

use crate::error::{Result, ServiceError};

use super::{ResourceScope, ResourceStore};

/// Resource as returned by the configuration service API.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Resource {
    #[serde(rename = "resourceURI", default)]
    resource_uri: String,
    /// Base64-encoded file content.
    #[serde(default)]
    resource_content: String,
}

/// Fetches service-level resources over the configuration service REST API.
pub struct ConfigurationServiceStore {
    client: Client,
    base_url: Url,
}

impl ConfigurationServiceStore {
    /// Create a store for the service at `base_url`.
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| ServiceError::ConfigValidationError {
            message: format!("invalid configuration service URL '{}': {}", base_url, e),
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ServiceError::Other(anyhow::anyhow!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, base_url })
    }

    /// URL of a service-level resource; `uri` is sent as a single escaped segment.
    fn resource_url(&self, scope: &ResourceScope, uri: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ServiceError::ConfigValidationError {
                message: format!("configuration service URL cannot be a base: {}", self.base_url),
            })?
            .pop_if_empty()
            .extend([
                "v1",
                "project",
                scope.project.as_str(),
                "stage",
                scope.stage.as_str(),
                "service",
                scope.service.as_str(),
                "resource",
                uri,
            ]);
        Ok(url)
    }
}

impl ResourceStore for ConfigurationServiceStore {
    fn get_resource(&self, scope: &ResourceScope, uri: &str) -> Result<Vec<u8>> {
        let failed = |message: String| ServiceError::ResourceFetchFailed {
            uri: uri.to_string(),
            message,
        };

        let url = self.resource_url(scope, uri)?;
        tracing::debug!("Fetching resource {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| failed(e.to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(ServiceError::ResourceNotFound {
                uri: uri.to_string(),
            });
        }
        if !response.status().is_success() {
            return Err(failed(format!("HTTP {}", response.status())));
        }

        let resource: Resource = response.json().map_err(|e| failed(e.to_string()))?;
        tracing::debug!("Fetched resource {}", resource.resource_uri);

        BASE64
            .decode(resource.resource_content.trim())
            .map_err(|e| ServiceError::DecodeFailed {
                what: format!("resource {}", uri),
                message: e.to_string(),
            })
    }
}
