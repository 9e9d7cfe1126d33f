//! Handle command implementation.
//!
//! `crossplane-service handle` reads one CloudEvent, wires the production
//! collaborators together and runs the matching workflow.

use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use crate::cli::args::HandleArgs;
use crate::config::{ResourceMode, ServiceConfig};
use crate::dispatch::EventDispatcher;
use crate::error::{Result, ServiceError};
use crate::events::{CloudEvent, HttpEventSender};
use crate::fetch::Downloader;
use crate::resources::{ConfigurationServiceStore, LocalResourceStore, ResourceStore};
use crate::shell::SystemRunner;
use crate::workflow::WorkflowContext;

use super::dispatcher::{Command, CommandResult};

/// The handle command implementation.
pub struct HandleCommand<'a> {
    config: &'a ServiceConfig,
    args: HandleArgs,
}

impl<'a> HandleCommand<'a> {
    /// Create a new handle command.
    pub fn new(config: &'a ServiceConfig, args: HandleArgs) -> Self {
        Self { config, args }
    }

    fn read_event(&self) -> Result<CloudEvent> {
        let json = match self.args.event.as_deref() {
            Some(path) if path != Path::new("-") => fs::read_to_string(path)?,
            _ => {
                let mut buffer = String::new();
                io::stdin().read_to_string(&mut buffer)?;
                buffer
            }
        };

        CloudEvent::from_json(&json).map_err(|e| ServiceError::PayloadParse {
            event_type: "(unparsed)".to_string(),
            message: e.to_string(),
        })
    }

    fn resource_store(&self) -> Result<Box<dyn ResourceStore>> {
        let resources = &self.config.resources;
        let store: Box<dyn ResourceStore> = match resources.mode {
            ResourceMode::Local => Box::new(LocalResourceStore::new(resources.local_dir.clone())),
            ResourceMode::Production => Box::new(ConfigurationServiceStore::new(
                resources.configuration_service.as_deref().unwrap_or_default(),
            )?),
        };
        Ok(store)
    }
}

impl Command for HandleCommand<'_> {
    fn execute(&self, out: &mut dyn Write) -> Result<CommandResult> {
        let event = self.read_event()?;

        let resources = self.resource_store()?;
        let runner = SystemRunner::new();
        let sender = HttpEventSender::new(self.config.event_broker.as_str())?;
        let downloader = Downloader::new()?;

        let dispatcher = EventDispatcher::new(WorkflowContext {
            config: self.config,
            runner: &runner,
            resources: resources.as_ref(),
            sender: &sender,
            downloader: &downloader,
        });

        match dispatcher.dispatch(&event) {
            Ok(report) => {
                writeln!(out, "{} passed: {}", report.kind, report.message)?;
                for failure in &report.soft_failures {
                    writeln!(out, "warning: {}", failure)?;
                }
                Ok(CommandResult::success())
            }
            Err(e) => {
                tracing::error!("Handling {} failed: {}", event.event_type, e);
                writeln!(out, "{} failed: {}", event.event_type, e)?;
                Ok(CommandResult::failure(1))
            }
        }
    }
}
