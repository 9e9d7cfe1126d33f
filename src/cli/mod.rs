//! Command-line interface for the crossplane service.
//!
//! This module provides the CLI argument parsing using clap's derive macros
//! and command implementations.
//!
//! # Architecture
//!
//! - [`args`] - Argument definitions using clap derive macros
//! - [`commands`] - Command implementations

pub mod args;
pub mod commands;

pub use args::{Cli, Commands, HandleArgs, RenderValuesArgs, SettingsArgs};
pub use commands::{Command, CommandDispatcher, CommandResult};

use crate::config::{load_config, validate_config, ServiceConfig};
use crate::error::Result;

/// Resolve settings: defaults, then the settings file, then flags and environment.
pub fn resolve_config(cli: &Cli) -> Result<ServiceConfig> {
    let mut config = load_config(cli.config.as_deref())?;
    cli.settings.apply(&mut config);
    validate_config(&config)?;
    Ok(config)
}
