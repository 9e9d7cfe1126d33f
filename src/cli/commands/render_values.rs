//! Render-values command implementation.
//!
//! Downloads the helm-service values template for the configured version
//! and applies the installer overrides, so operators can review what the
//! setup workflow would install.

use std::fs;
use std::io::Write;

use crate::cli::args::RenderValuesArgs;
use crate::config::ServiceConfig;
use crate::error::Result;
use crate::fetch::Downloader;
use crate::values::{installer_overrides, patch_file};

use super::dispatcher::{Command, CommandResult};

/// The render-values command implementation.
pub struct RenderValuesCommand<'a> {
    config: &'a ServiceConfig,
    args: RenderValuesArgs,
}

impl<'a> RenderValuesCommand<'a> {
    /// Create a new render-values command.
    pub fn new(config: &'a ServiceConfig, args: RenderValuesArgs) -> Self {
        Self { config, args }
    }
}

impl Command for RenderValuesCommand<'_> {
    fn execute(&self, out: &mut dyn Write) -> Result<CommandResult> {
        let installer = &self.config.installer;
        let target = match &self.args.output {
            Some(path) => path.clone(),
            None => self.config.work_dir.join("rendered-values.yaml"),
        };

        Downloader::new()?.download(&installer.template_url(), &target)?;
        let document = patch_file(
            &target,
            &installer_overrides(installer, &self.config.remote_control_plane),
        )?;

        match &self.args.output {
            Some(path) => writeln!(out, "Values written to {}", path.display())?,
            None => {
                out.write_all(document.to_yaml()?.as_bytes())?;
                fs::remove_file(&target)?;
            }
        }

        Ok(CommandResult::success())
    }
}
