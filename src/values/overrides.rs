//! The fixed override set for the helm-service values document.

use std::path::Path;

use crate::config::{InstallerSettings, RemoteControlPlane};
use crate::error::Result;

use super::document::{FieldOverride, ValuesDocument};

/// Overrides applied to the helm-service values template.
///
/// The list is fixed: image tags follow the installer version and the
/// remote control plane section points the installed service back at
/// the orchestrating Keptn instance.
pub fn installer_overrides(
    installer: &InstallerSettings,
    control_plane: &RemoteControlPlane,
) -> Vec<FieldOverride> {
    vec![
        FieldOverride::new("helmservice.image.tag", installer.version.as_str()),
        FieldOverride::new("distributor.image.tag", installer.version.as_str()),
        FieldOverride::new("remoteControlPlane.enabled", true),
        FieldOverride::new("remoteControlPlane.api.protocol", control_plane.protocol.as_str()),
        FieldOverride::new("remoteControlPlane.api.hostname", control_plane.hostname.as_str()),
        FieldOverride::new("remoteControlPlane.api.token", control_plane.token.as_str()),
    ]
}

/// Load the document at `path`, apply `overrides` and write it back.
pub fn patch_file(path: &Path, overrides: &[FieldOverride]) -> Result<ValuesDocument> {
    let mut doc = ValuesDocument::load(path)?;
    doc.apply(overrides)?;
    doc.save(path)?;
    Ok(doc)
}
