//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results.
//!
//! # Architecture
//!
//! Commands are dispatched via [`CommandDispatcher`], which routes CLI
//! subcommands to their implementations. Settings are resolved once in
//! `main` and shared by every command.

pub mod dispatcher;
pub mod handle;
pub mod render_values;

pub use dispatcher::{Command, CommandDispatcher, CommandResult};
