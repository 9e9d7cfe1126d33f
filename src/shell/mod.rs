//! External command execution.

pub mod command;
pub mod mock;

pub use command::{CommandLine, CommandRunner, SystemRunner};
pub use mock::{ScriptedResponse, ScriptedRunner};
