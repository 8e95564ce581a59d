//! Kinoprobe UI acceptance layer
//!
//! Drives a real Chrome over the DevTools protocol and checks the public site
//! from a visitor's point of view.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  UiRunner                                                    │
//! │    └── per scenario: launch -> open -> check -> close       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  MainPage          selectors, URLs, "loaded" definition      │
//! │    └── ChallengeGuard   dismisses the checkbox interstitial  │
//! ├─────────────────────────────────────────────────────────────┤
//! │  BrowserSession    explicit waits, implicit fallback, close  │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Driver (trait)    ChromiumDriver in production              │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod challenge;
pub mod chromium;
pub mod driver;
pub mod error;
pub mod page;
pub mod runner;
pub mod session;
pub mod wait;

pub use challenge::{ChallengeGuard, ChallengeOutcome, ChallengeState};
pub use chromium::ChromiumDriver;
pub use driver::{Driver, ElementState, Point, Size};
pub use error::{E2eError, E2eResult};
pub use page::MainPage;
pub use runner::{UiRunner, UiScenario, SITE_TITLE};
pub use session::{close_after, BrowserSession, ElementHandle};
pub use wait::{poll_until, Condition, WaitPolicy, DEFAULT_POLL_INTERVAL};

/// Launch Chrome and wrap it in a session configured from `config`
pub async fn launch_session(config: &kinoprobe_common::UiConfig) -> E2eResult<BrowserSession<ChromiumDriver>> {
    let driver = ChromiumDriver::launch(config).await?;
    Ok(BrowserSession::new(driver, config.implicit_wait()))
}
