//! Bounded convergence waits.
//!
//! The orchestrator mutates Jobs asynchronously through its own
//! reconciliation loop; after a delete the controller must observe the
//! change through fresh reads rather than assume it. This module provides
//! the single polling primitive used for those waits: evaluate a predicate
//! at a fixed interval until it holds or a deadline elapses.
//!
//! The per-tick transition is factored out as [`WaitState`] so timeout
//! behavior is testable without real orchestrator latency.

use std::time::Duration;

use tracing::debug;

/// Configuration for a bounded convergence wait
#[derive(Clone, Debug)]
pub struct WaitConfig {
    /// Delay between predicate evaluations
    pub interval: Duration,
    /// Total time budget before giving up
    pub timeout: Duration,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(200),
            timeout: Duration::from_secs(20),
        }
    }
}

/// Outcome of one polling tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitState {
    /// Predicate not yet satisfied, budget remains
    Waiting,
    /// Predicate holds
    Satisfied,
    /// Budget exhausted before the predicate held
    TimedOut,
}

impl WaitState {
    /// One transition rule: satisfied wins, then the deadline, else keep waiting
    pub fn tick(satisfied: bool, elapsed: Duration, timeout: Duration) -> Self {
        if satisfied {
            Self::Satisfied
        } else if elapsed >= timeout {
            Self::TimedOut
        } else {
            Self::Waiting
        }
    }
}

/// Poll `predicate` every `interval` until it holds or `timeout` elapses.
///
/// The predicate is expected to perform a fresh read on each evaluation; any
/// error it returns propagates immediately without retry (retry policy
/// belongs to the predicate, not the poller). `what` names the wait for
/// logging.
pub async fn wait_until<F, Fut, E>(
    config: &WaitConfig,
    what: &str,
    mut predicate: F,
) -> Result<WaitState, E>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<bool, E>>,
{
    let started = tokio::time::Instant::now();

    loop {
        let satisfied = predicate().await?;
        match WaitState::tick(satisfied, started.elapsed(), config.timeout) {
            WaitState::Waiting => {
                debug!(wait = %what, elapsed_ms = started.elapsed().as_millis(), "still waiting");
                tokio::time::sleep(config.interval).await;
            }
            done => return Ok(done),
        }
    }
}
