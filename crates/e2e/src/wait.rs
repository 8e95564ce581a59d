//! Explicit waits
//!
//! Every wait is a bounded poll scoped to one call site. Conditions are
//! re-probed at a fixed interval until they hold or the timeout expires.

use std::fmt;
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::debug;

use crate::driver::ElementState;
use crate::error::{E2eError, E2eResult};

/// Default poll interval for checking conditions
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Timeout and poll interval for one wait
#[derive(Debug, Clone, Copy)]
pub struct WaitPolicy {
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl WaitPolicy {
    pub fn new(timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            timeout,
            poll_interval,
        }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self::new(timeout, DEFAULT_POLL_INTERVAL)
    }
}

/// Element condition bound to a CSS selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// Attached to the DOM
    Present(String),
    /// Attached and displayed
    Visible(String),
    /// Displayed and enabled
    Clickable(String),
}

impl Condition {
    pub fn selector(&self) -> &str {
        match self {
            Condition::Present(s) | Condition::Visible(s) | Condition::Clickable(s) => s,
        }
    }

    /// Evaluate against a probe result
    pub fn holds(&self, state: Option<&ElementState>) -> bool {
        match (self, state) {
            (_, None) => false,
            (Condition::Present(_), Some(_)) => true,
            (Condition::Visible(_), Some(s)) => s.displayed,
            (Condition::Clickable(_), Some(s)) => s.displayed && s.enabled,
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Present(s) => write!(f, "presence of '{s}'"),
            Condition::Visible(s) => write!(f, "visibility of '{s}'"),
            Condition::Clickable(s) => write!(f, "'{s}' to be clickable"),
        }
    }
}

/// Poll `probe` until it yields a value or the policy times out.
///
/// Probe errors are treated as transient and polling continues.
pub async fn poll_until<T, F, Fut>(probe: F, policy: WaitPolicy, description: &str) -> E2eResult<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = E2eResult<Option<T>>>,
{
    let start = Instant::now();

    loop {
        match probe().await {
            Ok(Some(value)) => return Ok(value),
            Ok(None) => {}
            Err(e) => debug!("Transient error while waiting for {}: {}", description, e),
        }

        if start.elapsed() >= policy.timeout {
            return Err(E2eError::WaitTimeout {
                condition: description.to_string(),
                timeout: policy.timeout,
            });
        }

        sleep(policy.poll_interval).await;
    }
}
