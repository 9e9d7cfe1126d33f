//! External command execution.

use crate::error::{ServiceError, Result};
use std::fmt;
use std::process::{Command, Stdio};
use std::time::Instant;

/// A program and its arguments, passed to the process without a shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    /// Program name or path (e.g. `kubectl`).
    pub program: String,

    /// Arguments, one per element.
    pub args: Vec<String>,
}

impl CommandLine {
    /// Create a command line from a program and its arguments.
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Build the `CommandFailed` error for this command line.
    pub fn failed(&self, exit: impl Into<String>, output: impl Into<String>) -> ServiceError {
        ServiceError::CommandFailed {
            command: self.program.clone(),
            args: self.args.clone(),
            exit: exit.into(),
            output: output.into(),
        }
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Runs external commands to completion.
///
/// Implementations return the combined output on success. A non-zero exit
/// or a failure to start is reported as [`ServiceError::CommandFailed`],
/// which still carries whatever output was captured.
pub trait CommandRunner {
    /// Run the command and block until it exits.
    fn run(&self, command: &CommandLine) -> Result<String>;
}

/// [`CommandRunner`] that spawns real processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl SystemRunner {
    /// Create a runner that inherits the current working directory.
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, command: &CommandLine) -> Result<String> {
        let start = Instant::now();
        tracing::debug!("Executing: {}", command);

        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args);
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        let output = cmd
            .output()
            .map_err(|e| command.failed(e.to_string(), String::new()))?;

        let mut combined = String::from_utf8_lossy(&output.stdout).to_string();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        tracing::debug!(
            "{} finished with {} after {:?}",
            command.program,
            output.status,
            start.elapsed()
        );

        if output.status.success() {
            Ok(combined)
        } else {
            Err(command.failed(output.status.to_string(), combined))
        }
    }
}
