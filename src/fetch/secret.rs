//! Kubernetes secret lookups through kubectl.

use crate::error::Result;
use crate::shell::{CommandLine, CommandRunner};

/// Reads secret metadata and data from the management cluster.
pub struct SecretClient<'a> {
    runner: &'a dyn CommandRunner,
    kubectl: String,
}

impl<'a> SecretClient<'a> {
    /// Create a client that invokes `kubectl` through `runner`.
    pub fn new(runner: &'a dyn CommandRunner, kubectl: impl Into<String>) -> Self {
        Self {
            runner,
            kubectl: kubectl.into(),
        }
    }

    /// Resolve the metadata name of a secret.
    ///
    /// The jsonpath template is single-quoted, so the raw output comes
    /// back wrapped in quotes; those are stripped. An error means the
    /// query failed, which includes the secret not existing yet.
    pub fn fetch_name(&self, name: &str, namespace: &str) -> Result<String> {
        let command = CommandLine::new(
            &self.kubectl,
            [
                "get",
                "secrets",
                name,
                "-n",
                namespace,
                "-o",
                "jsonpath='{.metadata.name}'",
            ],
        );
        let output = self.runner.run(&command)?;
        Ok(output.trim().trim_matches('\'').to_string())
    }

    /// Fetch the still-encoded value stored under `key` in a secret.
    pub fn fetch_data(&self, name: &str, namespace: &str, key: &str) -> Result<String> {
        let command = CommandLine::new(
            &self.kubectl,
            [
                "get".to_string(),
                "secrets".to_string(),
                name.to_string(),
                "-n".to_string(),
                namespace.to_string(),
                "-o".to_string(),
                format!("jsonpath={{.data.{}}}", key),
            ],
        );
        let output = self.runner.run(&command)?;
        Ok(output.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::ScriptedRunner;

    #[test]
    fn fetch_name_strips_quotes() {
        let runner = ScriptedRunner::new();
        runner.respond("kubectl get secrets", "'kubeconfig-keptn-crossplane'");

        let client = SecretClient::new(&runner, "kubectl");
        let name = client
            .fetch_name("kubeconfig-keptn-crossplane", "crossplane-system")
            .unwrap();

        assert_eq!(name, "kubeconfig-keptn-crossplane");
        let invocation = &runner.invocations()[0];
        assert_eq!(
            invocation.to_string(),
            "kubectl get secrets kubeconfig-keptn-crossplane -n crossplane-system -o jsonpath='{.metadata.name}'"
        );
    }

    #[test]
    fn fetch_name_of_absent_secret_is_empty() {
        let runner = ScriptedRunner::new();
        runner.respond("kubectl get secrets", "''");

        let client = SecretClient::new(&runner, "kubectl");
        assert_eq!(client.fetch_name("x", "y").unwrap(), "");
    }

    #[test]
    fn fetch_name_propagates_query_failure() {
        let runner = ScriptedRunner::new();
        runner.fail(
            "kubectl get secrets",
            1,
            "Error from server (NotFound): secrets \"x\" not found",
        );

        let client = SecretClient::new(&runner, "kubectl");
        assert!(client.fetch_name("x", "y").is_err());
    }

    #[test]
    fn fetch_data_uses_data_key_jsonpath() {
        let runner = ScriptedRunner::new();
        runner.respond("/usr/local/bin/kubectl get secrets", "YXBpVmVyc2lvbjogdjE=\n");

        let client = SecretClient::new(&runner, "/usr/local/bin/kubectl");
        let data = client
            .fetch_data("kubeconfig-keptn-crossplane", "crossplane-system", "kubeconfig")
            .unwrap();

        assert_eq!(data, "YXBpVmVyc2lvbjogdjE=");
        let invocation = &runner.invocations()[0];
        assert_eq!(invocation.program, "/usr/local/bin/kubectl");
        assert_eq!(invocation.args.last().unwrap(), "jsonpath={.data.kubeconfig}");
    }
}
