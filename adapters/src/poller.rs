//! Generic long-running job polling
//!
//! Any asynchronous adapter drives its status endpoint through [`Poller`]:
//! query, classify with an adapter-supplied `is_ongoing` predicate, wait a
//! fixed delay, repeat. The first response classified as not ongoing is
//! returned untouched; deciding whether it means success or failure is the
//! adapter's job.

use std::future::Future;
use tracing::debug;

use crate::error::{AdapterResult, TaskFailure};
use crate::types::{HttpResponse, PollPolicy};

/// Fixed-delay status poller, shared by all asynchronous adapters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Poller {
    policy: PollPolicy,
}

impl Poller {
    pub fn new(policy: PollPolicy) -> Self {
        Self { policy }
    }

    /// Query until `is_ongoing` answers false and return that response
    ///
    /// With no `max_attempts` in the policy the loop only ends when the
    /// remote job reaches a terminal state. A failing status query (network
    /// error) ends polling with that error.
    pub async fn poll<Q, Fut, P>(&self, mut status_query: Q, is_ongoing: P) -> AdapterResult<HttpResponse>
    where
        Q: FnMut() -> Fut,
        Fut: Future<Output = AdapterResult<HttpResponse>>,
        P: Fn(&HttpResponse) -> bool,
    {
        let mut attempts: u32 = 0;

        loop {
            let response = status_query().await?;
            attempts = attempts.saturating_add(1);

            if !is_ongoing(&response) {
                debug!(attempts, status = response.status, "📬 Job reached terminal state");
                return Ok(response);
            }

            if let Some(max_attempts) = self.policy.max_attempts {
                if attempts >= max_attempts {
                    return Err(TaskFailure::PollExhausted { attempts });
                }
            }

            debug!(attempts, delay_ms = self.policy.delay.as_millis() as u64, "⏳ Job still running");
            tokio::time::sleep(self.policy.delay).await;
        }
    }
}

/// Predicate: JSON `field` holds one of the in-progress values
pub fn status_in<'a>(field: &'a str, in_progress: &'a [&'a str]) -> impl Fn(&HttpResponse) -> bool + 'a {
    move |response| {
        response
            .json_field(field)
            .map(|status| in_progress.contains(&status.as_str()))
            .unwrap_or(false)
    }
}

/// Predicate: HTTP status code equals the provider's "still working" code
pub fn status_code_is(code: u16) -> impl Fn(&HttpResponse) -> bool {
    move |response| response.status == code
}
