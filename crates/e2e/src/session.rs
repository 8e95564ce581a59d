//! Browser session wrapper
//!
//! One [`BrowserSession`] owns one driver for the duration of one test. It
//! adds the explicit wait primitives and the coarse implicit fallback used by
//! [`BrowserSession::find_element`]. Once closed, a session refuses further
//! work.

use futures::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::driver::{Driver, ElementState, Point, Size};
use crate::error::{E2eError, E2eResult};
use crate::wait::{poll_until, Condition, WaitPolicy, DEFAULT_POLL_INTERVAL};

/// An element located by a wait, with the state observed at that moment
#[derive(Debug, Clone, PartialEq)]
pub struct ElementHandle {
    pub selector: String,
    pub state: ElementState,
}

impl ElementHandle {
    pub fn is_displayed(&self) -> bool {
        self.state.displayed
    }

    pub fn location(&self) -> Point {
        self.state.location
    }

    pub fn size(&self) -> Size {
        self.state.size
    }
}

pub struct BrowserSession<D: Driver> {
    driver: D,
    implicit_wait: Duration,
    poll_interval: Duration,
    closed: AtomicBool,
}

impl<D: Driver> BrowserSession<D> {
    pub fn new(driver: D, implicit_wait: Duration) -> Self {
        Self {
            driver,
            implicit_wait,
            poll_interval: DEFAULT_POLL_INTERVAL,
            closed: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn ensure_open(&self) -> E2eResult<()> {
        if self.is_closed() {
            Err(E2eError::SessionClosed)
        } else {
            Ok(())
        }
    }

    fn policy(&self, timeout: Duration) -> WaitPolicy {
        WaitPolicy::new(timeout, self.poll_interval)
    }

    pub async fn navigate(&self, url: &str) -> E2eResult<()> {
        self.ensure_open()?;
        info!("Navigating to {}", url);
        self.driver.goto(url).await
    }

    /// Single probe, no waiting. Probe errors read as absent.
    pub async fn exists_now(&self, selector: &str) -> bool {
        if self.is_closed() {
            return false;
        }
        match self.driver.probe(selector).await {
            Ok(state) => state.is_some(),
            Err(e) => {
                debug!("Probe for '{}' failed: {}", selector, e);
                false
            }
        }
    }

    /// Wait until `condition` holds, returning the matched element
    pub async fn wait_until(&self, condition: &Condition, timeout: Duration) -> E2eResult<ElementHandle> {
        self.ensure_open()?;
        let selector = condition.selector();

        let state = poll_until(
            move || async move {
                let state = self.driver.probe(selector).await?;
                Ok(state.filter(|s| condition.holds(Some(s))))
            },
            self.policy(timeout),
            &condition.to_string(),
        )
        .await?;

        Ok(ElementHandle {
            selector: selector.to_string(),
            state,
        })
    }

    /// Wait until `condition` no longer holds
    pub async fn wait_until_gone(&self, condition: &Condition, timeout: Duration) -> E2eResult<()> {
        self.ensure_open()?;
        let selector = condition.selector();

        poll_until(
            move || async move {
                let state = self.driver.probe(selector).await?;
                Ok((!condition.holds(state.as_ref())).then_some(()))
            },
            self.policy(timeout),
            &format!("{condition} to end"),
        )
        .await
    }

    /// Locate an element using the implicit discovery timeout
    pub async fn find_element(&self, selector: &str) -> E2eResult<ElementHandle> {
        self.wait_until(&Condition::Present(selector.to_string()), self.implicit_wait)
            .await
            .map_err(|e| match e {
                E2eError::WaitTimeout { .. } => E2eError::ElementNotFound(selector.to_string()),
                other => other,
            })
    }

    /// Re-read the live state of a previously located element
    pub async fn refresh(&self, element: &ElementHandle) -> E2eResult<ElementHandle> {
        self.ensure_open()?;
        let state = self
            .driver
            .probe(&element.selector)
            .await?
            .ok_or_else(|| E2eError::ElementNotFound(element.selector.clone()))?;
        Ok(ElementHandle {
            selector: element.selector.clone(),
            state,
        })
    }

    pub async fn hover(&self, element: &ElementHandle) -> E2eResult<()> {
        self.ensure_open()?;
        self.driver.hover(&element.selector).await
    }

    pub async fn click(&self, element: &ElementHandle) -> E2eResult<()> {
        self.ensure_open()?;
        self.driver.click(&element.selector).await
    }

    pub async fn computed_style(&self, element: &ElementHandle, property: &str) -> E2eResult<String> {
        self.ensure_open()?;
        self.driver.computed_style(&element.selector, property).await
    }

    pub async fn title(&self) -> E2eResult<String> {
        self.ensure_open()?;
        self.driver.title().await
    }

    pub async fn url(&self) -> E2eResult<String> {
        self.ensure_open()?;
        self.driver.url().await
    }

    pub async fn back(&self) -> E2eResult<()> {
        self.ensure_open()?;
        self.driver.back().await
    }

    /// Wait until the current URL satisfies `accept`, returning it
    pub async fn wait_for_url<F>(&self, accept: F, description: &str, timeout: Duration) -> E2eResult<String>
    where
        F: Fn(&str) -> bool + Sync,
    {
        self.ensure_open()?;
        let accept = &accept;

        poll_until(
            move || async move {
                let url = self.driver.url().await?;
                Ok(accept(&url).then_some(url))
            },
            self.policy(timeout),
            description,
        )
        .await
    }

    /// Tear the browser down. Safe to call more than once.
    pub async fn close(&self) -> E2eResult<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        debug!("Closing browser session");
        self.driver.close().await
    }
}

/// Await `body`, then close `session` whether the body succeeded, failed or
/// panicked. A panic is resumed after the session is closed.
pub async fn close_after<D, T, Fut>(session: &BrowserSession<D>, body: Fut) -> E2eResult<T>
where
    D: Driver,
    Fut: Future<Output = E2eResult<T>>,
{
    let outcome = AssertUnwindSafe(body).catch_unwind().await;

    if let Err(e) = session.close().await {
        warn!("Failed to close browser session: {}", e);
    }

    match outcome {
        Ok(result) => result,
        Err(panic) => std::panic::resume_unwind(panic),
    }
}
