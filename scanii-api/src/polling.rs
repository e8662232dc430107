//! Caller-side polling for asynchronous results.
//!
//! The client never polls by itself: [`ScaniiClient::retrieve`] answers 404
//! until an async submission finishes. [`poll_for_result`] wraps that call in
//! a bounded loop with a linearly growing delay.

use log::{debug, info};
use std::time::Duration;

use crate::ScaniiError;
use crate::client::ScaniiClient;
use crate::models::ScanResult;

/// Bounds for [`poll_for_result`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Retries after the first attempt
    pub max_attempts: u32,
    /// Delay step, multiplied by the attempt number
    pub base_delay: Duration,
    /// Upper bound for a single delay
    pub max_delay: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
        }
    }
}

impl PollPolicy {
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    #[must_use]
    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    #[must_use]
    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    /// Delay before retry number `attempt` (1-based).
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt).min(self.max_delay)
    }
}

/// Retrieve `id` until it is ready.
///
/// Only "not ready yet" (a 404 from the service) is retried; any other error
/// is returned as is.
///
/// # Errors
///
/// Returns the last 404 once `policy.max_attempts` retries are exhausted, or
/// the first non-404 error.
pub async fn poll_for_result(
    client: &ScaniiClient,
    id: &str,
    policy: &PollPolicy,
) -> Result<ScanResult, ScaniiError> {
    let mut attempt: u32 = 0;
    loop {
        debug!(
            "polling for result {id} {}/{}",
            attempt.saturating_add(1),
            policy.max_attempts.saturating_add(1)
        );

        match client.retrieve(id).await {
            Ok(result) => return Ok(result),
            Err(e) if e.is_not_found() && attempt < policy.max_attempts => {
                attempt = attempt.saturating_add(1);
                let delay = policy.delay_for(attempt);
                info!("result {id} not ready, retrying in {}ms", delay.as_millis());
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}
