//! Scripted command runner for testing.
//!
//! `ScriptedRunner` implements [`CommandRunner`] without spawning
//! processes. Responses are queued per command prefix and every
//! invocation is captured for later assertion.
//!
//! # Example
//!
//! ```
//! use crossplane_service::shell::{CommandLine, CommandRunner, ScriptedRunner};
//!
//! let runner = ScriptedRunner::new();
//! runner.respond("kubectl get nodes", "node-1   Ready");
//! runner.fail("kubectl apply", 1, "error: invalid manifest");
//!
//! let nodes = runner.run(&CommandLine::new("kubectl", ["get", "nodes"])).unwrap();
//! assert_eq!(nodes, "node-1   Ready");
//! assert!(runner.run(&CommandLine::new("kubectl", ["apply", "-f", "x"])).is_err());
//! assert_eq!(runner.invocations().len(), 2);
//! ```

use std::cell::RefCell;
use std::collections::VecDeque;

use crate::error::Result;

use super::command::{CommandLine, CommandRunner};

/// Canned result for a scripted command.
#[derive(Debug, Clone)]
pub enum ScriptedResponse {
    /// Exit 0 with this output.
    Success(String),
    /// Exit with this code and output.
    Failure { code: i32, output: String },
}

#[derive(Debug)]
struct Script {
    prefix: String,
    responses: VecDeque<ScriptedResponse>,
    last: Option<ScriptedResponse>,
}

/// Command runner with pre-configured responses.
///
/// A command matches a script when its display form starts with the
/// script's prefix; the first matching script (in registration order)
/// wins. Queued responses are consumed in order and the final one
/// repeats. Unmatched commands succeed with empty output.
#[derive(Debug, Default)]
pub struct ScriptedRunner {
    scripts: RefCell<Vec<Script>>,
    invocations: RefCell<Vec<CommandLine>>,
}

impl ScriptedRunner {
    /// Create a runner where every command succeeds silently.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful response for commands starting with `prefix`.
    pub fn respond(&self, prefix: &str, output: &str) {
        self.push(prefix, ScriptedResponse::Success(output.to_string()));
    }

    /// Queue a failing response for commands starting with `prefix`.
    pub fn fail(&self, prefix: &str, code: i32, output: &str) {
        self.push(
            prefix,
            ScriptedResponse::Failure {
                code,
                output: output.to_string(),
            },
        );
    }

    /// Queue several responses for the same prefix.
    pub fn queue(&self, prefix: &str, responses: Vec<ScriptedResponse>) {
        for response in responses {
            self.push(prefix, response);
        }
    }

    fn push(&self, prefix: &str, response: ScriptedResponse) {
        let mut scripts = self.scripts.borrow_mut();
        if let Some(script) = scripts.iter_mut().find(|s| s.prefix == prefix) {
            script.responses.push_back(response);
        } else {
            scripts.push(Script {
                prefix: prefix.to_string(),
                responses: VecDeque::from([response]),
                last: None,
            });
        }
    }

    /// All commands run so far, in order.
    pub fn invocations(&self) -> Vec<CommandLine> {
        self.invocations.borrow().clone()
    }

    /// Number of commands run whose display form starts with `prefix`.
    pub fn count(&self, prefix: &str) -> usize {
        self.invocations
            .borrow()
            .iter()
            .filter(|c| c.to_string().starts_with(prefix))
            .count()
    }

    /// Whether any command starting with `prefix` was run.
    pub fn ran(&self, prefix: &str) -> bool {
        self.count(prefix) > 0
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, command: &CommandLine) -> Result<String> {
        self.invocations.borrow_mut().push(command.clone());

        let line = command.to_string();
        let response = {
            let mut scripts = self.scripts.borrow_mut();
            scripts
                .iter_mut()
                .find(|s| line.starts_with(&s.prefix))
                .and_then(|script| match script.responses.pop_front() {
                    Some(next) => {
                        script.last = Some(next.clone());
                        Some(next)
                    }
                    None => script.last.clone(),
                })
        };

        match response {
            None => Ok(String::new()),
            Some(ScriptedResponse::Success(output)) => Ok(output),
            Some(ScriptedResponse::Failure { code, output }) => {
                Err(command.failed(format!("exit status: {}", code), output))
            }
        }
    }
}
