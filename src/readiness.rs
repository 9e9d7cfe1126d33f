//! Waiting for asynchronously created secrets.
//!
//! Crossplane writes the connection secret of a new cluster some time
//! after the manifest has been applied. [`ReadinessPoller`] sleeps a
//! grace period, then probes until the secret resolves to the expected
//! name. Every unsuccessful round is reported through a callback so the
//! caller can keep the orchestrator informed.
//!
//! Without a configured timeout the poller waits forever; with one it
//! gives up with [`ServiceError::Timeout`].

use std::thread;
use std::time::{Duration, Instant};

use crate::config::PollSettings;
use crate::error::{Result, ServiceError};
use crate::fetch::SecretClient;

/// Polls for a secret until it exists.
#[derive(Debug, Clone)]
pub struct ReadinessPoller {
    initial_delay: Duration,
    interval: Duration,
    timeout: Option<Duration>,
}

impl ReadinessPoller {
    /// Create a poller from settings.
    pub fn new(settings: &PollSettings) -> Self {
        Self {
            initial_delay: settings.initial_delay(),
            interval: settings.interval(),
            timeout: settings.timeout(),
        }
    }

    /// Create a poller with explicit durations.
    pub fn with_intervals(initial_delay: Duration, interval: Duration) -> Self {
        Self {
            initial_delay,
            interval,
            timeout: None,
        }
    }

    /// Give up once `timeout` has elapsed since polling started.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Block until secret `expected` exists in `namespace`.
    ///
    /// `on_wait` receives a human-readable message after every probe that
    /// did not find the secret, whether the probe returned another name
    /// or failed outright. Returns the number of probes made.
    pub fn await_secret(
        &self,
        secrets: &SecretClient<'_>,
        expected: &str,
        namespace: &str,
        mut on_wait: impl FnMut(&str),
    ) -> Result<usize> {
        let start = Instant::now();
        thread::sleep(self.initial_delay);

        let mut probes = 0;
        loop {
            probes += 1;
            tracing::info!(
                "Checking availability of secret {} in namespace {}",
                expected,
                namespace
            );

            match secrets.fetch_name(expected, namespace) {
                Ok(name) if name == expected => {
                    tracing::info!("Secret {} found after {} probe(s)", expected, probes);
                    return Ok(probes);
                }
                Ok(name) => tracing::debug!("Retrieved secret name: {:?}", name),
                Err(e) => tracing::debug!("Secret query failed: {}", e),
            }

            if let Some(timeout) = self.timeout {
                let elapsed = start.elapsed();
                if elapsed.saturating_add(self.interval) > timeout {
                    return Err(ServiceError::Timeout {
                        what: format!("secret {} in namespace {}", expected, namespace),
                        elapsed,
                    });
                }
            }

            let message = format!(
                "Could not retrieve secret {} yet - waiting for {} seconds",
                expected,
                self.interval.as_secs()
            );
            tracing::info!("{}", message);
            on_wait(&message);

            thread::sleep(self.interval);
        }
    }
}
