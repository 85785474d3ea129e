//! Lifecycle poller
//!
//! Bounded-time convergence wait shared by every workload kind. The caller
//! supplies the check; the poller owns timing only.
//!
//! Cancellation is by drop: when the request future is dropped the pending
//! check or sleep goes with it.

use sidecar_core::domain::workload::{PollOutcome, PollTiming};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use tracing::debug;

/// Why a poll stopped without converging
#[derive(Debug, Error)]
pub enum PollError<E> {
    /// The window elapsed; the outcome is unknown, not failed
    #[error("not converged after {elapsed:?}")]
    DeadlineExceeded { elapsed: Duration },

    /// The check reported a terminal failure
    #[error("{0}")]
    Failed(String),

    /// The check itself errored; never retried
    #[error("{0}")]
    Check(E),
}

/// Polls `check` until it converges, fails, errors, or the deadline passes
///
/// The first check runs immediately. Between checks the poller sleeps for
/// `interval`, cut short at the deadline, so the wait never overshoots the
/// deadline by more than one interval. A check still running when the
/// deadline passes is abandoned.
pub async fn poll_until<F, Fut, E>(timing: PollTiming, mut check: F) -> Result<(), PollError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<PollOutcome, E>>,
{
    let start = Instant::now();
    let mut attempt = 0u32;

    loop {
        let remaining = timing.deadline.saturating_sub(start.elapsed());
        if remaining.is_zero() {
            return Err(PollError::DeadlineExceeded {
                elapsed: start.elapsed(),
            });
        }

        attempt += 1;
        let outcome = match tokio::time::timeout(remaining, check()).await {
            Ok(result) => result.map_err(PollError::Check)?,
            Err(_) => {
                return Err(PollError::DeadlineExceeded {
                    elapsed: start.elapsed(),
                });
            }
        };

        match outcome {
            PollOutcome::Converged => {
                debug!(attempt, elapsed = ?start.elapsed(), "Converged");
                return Ok(());
            }
            PollOutcome::Failed(reason) => return Err(PollError::Failed(reason)),
            PollOutcome::Pending => {
                debug!(attempt, elapsed = ?start.elapsed(), "Not converged yet");
            }
        }

        let remaining = timing.deadline.saturating_sub(start.elapsed());
        tokio::time::sleep(timing.interval.min(remaining)).await;
    }
}
