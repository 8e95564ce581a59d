//! Anti-bot challenge interception
//!
//! The site sometimes answers a page load with a checkbox interstitial. After
//! every navigation the page layer asks [`ChallengeGuard`] to look for it and,
//! when present, click it away. Timeouts while doing so are not failures: the
//! guard gives up and the calling step decides whether the page is usable.

use std::fmt;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::driver::Driver;
use crate::error::E2eResult;
use crate::session::BrowserSession;
use crate::wait::Condition;

/// Whether the current page is showing the interstitial
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChallengeState {
    Normal,
    Challenged,
}

/// What one interception pass did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChallengeOutcome {
    /// No trigger on the page
    Absent,
    /// Trigger clicked and gone
    Dismissed,
    /// A bounded wait ran out
    GaveUp { reason: String },
}

impl fmt::Display for ChallengeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChallengeOutcome::Absent => write!(f, "absent"),
            ChallengeOutcome::Dismissed => write!(f, "dismissed"),
            ChallengeOutcome::GaveUp { reason } => write!(f, "gave up: {reason}"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChallengeGuard {
    selector: String,
    wait: Duration,
}

impl ChallengeGuard {
    /// `wait` bounds each of the clickable and disappearance waits
    pub fn new(selector: impl Into<String>, wait: Duration) -> Self {
        Self {
            selector: selector.into(),
            wait,
        }
    }

    pub fn selector(&self) -> &str {
        &self.selector
    }

    /// Single non-blocking look at the page
    pub async fn state<D: Driver>(&self, session: &BrowserSession<D>) -> ChallengeState {
        if session.exists_now(&self.selector).await {
            ChallengeState::Challenged
        } else {
            ChallengeState::Normal
        }
    }

    /// Dismiss the challenge if one is showing.
    ///
    /// Wait timeouts end in [`ChallengeOutcome::GaveUp`]; any other driver
    /// error is returned.
    pub async fn intercept<D: Driver>(&self, session: &BrowserSession<D>) -> E2eResult<ChallengeOutcome> {
        let outcome = match self.state(session).await {
            ChallengeState::Normal => {
                debug!("No challenge on page");
                ChallengeOutcome::Absent
            }
            ChallengeState::Challenged => self.dismiss(session).await?,
        };

        match &outcome {
            ChallengeOutcome::GaveUp { reason } => warn!("Challenge not dismissed, continuing: {}", reason),
            other => debug!("Challenge {}", other),
        }
        Ok(outcome)
    }

    async fn dismiss<D: Driver>(&self, session: &BrowserSession<D>) -> E2eResult<ChallengeOutcome> {
        info!("Challenge detected, clicking '{}'", self.selector);

        let trigger = match session
            .wait_until(&Condition::Clickable(self.selector.clone()), self.wait)
            .await
        {
            Ok(trigger) => trigger,
            Err(e) if e.is_timeout() => return Ok(ChallengeOutcome::GaveUp { reason: e.to_string() }),
            Err(e) => return Err(e),
        };

        session.click(&trigger).await?;

        match session
            .wait_until_gone(&Condition::Present(self.selector.clone()), self.wait)
            .await
        {
            Ok(()) => Ok(ChallengeOutcome::Dismissed),
            Err(e) if e.is_timeout() => Ok(ChallengeOutcome::GaveUp { reason: e.to_string() }),
            Err(e) => Err(e),
        }
    }
}
