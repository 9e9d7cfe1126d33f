//! Output masking for credential values.
//!
//! Command output is forwarded to the orchestrator as status messages.
//! Anything that could echo the API token or the cluster kubeconfig goes
//! through an [`OutputMasker`] first.

use std::collections::BTreeSet;

use crate::error::ServiceError;

/// Shortest value registered as a secret. Shorter values would redact
/// unrelated words in command output.
pub const MIN_SECRET_LEN: usize = 8;

/// Shortest kubeconfig value treated as key material.
const MIN_KEY_MATERIAL_LEN: usize = 16;

/// Masks secret values in text.
///
/// # Example
///
/// ```
/// use crossplane_service::secrets::OutputMasker;
///
/// let mut masker = OutputMasker::new();
/// masker.add_secret("super-secret-token");
///
/// let output = masker.mask("--set token=super-secret-token");
/// assert_eq!(output, "--set token=[REDACTED]");
/// ```
#[derive(Debug, Clone)]
pub struct OutputMasker {
    /// Longest first, so a secret containing another is masked whole.
    secrets: BTreeSet<(std::cmp::Reverse<usize>, String)>,
    mask: String,
}

impl OutputMasker {
    /// Create a masker with the default `[REDACTED]` mask.
    pub fn new() -> Self {
        Self::with_mask("[REDACTED]")
    }

    /// Create a masker with a custom mask string.
    pub fn with_mask(mask: impl Into<String>) -> Self {
        Self {
            secrets: BTreeSet::new(),
            mask: mask.into(),
        }
    }

    /// Register a secret value to be masked.
    ///
    /// Empty and whitespace-only strings are ignored. Values shorter than
    /// [`MIN_SECRET_LEN`] are not registered and a warning is logged.
    /// Returns whether the value is now masked.
    pub fn add_secret(&mut self, value: impl Into<String>) -> bool {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return false;
        }
        if trimmed.len() < MIN_SECRET_LEN {
            tracing::warn!(
                "Secret of {} characters is too short to mask safely; it will not be redacted",
                trimmed.len()
            );
            return false;
        }
        self.secrets
            .insert((std::cmp::Reverse(value.len()), value));
        true
    }

    /// Register every non-empty line of a multi-line secret.
    ///
    /// Kubeconfigs are printed back line by line by some tools, so each
    /// line carrying key material is masked on its own.
    pub fn add_secret_lines(&mut self, value: &str) {
        for line in value.lines() {
            if let Some((_, secret)) = line.split_once(':') {
                let secret = secret.trim();
                if secret.len() >= MIN_KEY_MATERIAL_LEN {
                    self.add_secret(secret);
                }
            }
        }
    }

    /// Mask any secret values in the given string.
    pub fn mask(&self, input: &str) -> String {
        let mut result = input.to_string();
        for (_, secret) in &self.secrets {
            result = result.replace(secret.as_str(), &self.mask);
        }
        result
    }

    /// Mask secret values in the text of an error.
    pub fn mask_error(&self, error: ServiceError) -> ServiceError {
        error.map_text(|text| self.mask(text))
    }

    /// Get the number of registered secrets.
    pub fn secret_count(&self) -> usize {
        self.secrets.len()
    }
}

impl Default for OutputMasker {
    fn default() -> Self {
        Self::new()
    }
}
