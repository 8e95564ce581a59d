//! Main page object
//!
//! Site-specific knowledge (URLs, selectors, what "loaded" means) lives here
//! and nowhere else. Each operation runs under one bounded wait.

use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use kinoprobe_common::{Reporter, UiConfig};

use crate::challenge::{ChallengeGuard, ChallengeOutcome};
use crate::driver::{Driver, Point, Size};
use crate::error::E2eResult;
use crate::session::{close_after, BrowserSession, ElementHandle};
use crate::wait::Condition;

pub struct MainPage<D: Driver> {
    session: BrowserSession<D>,
    config: UiConfig,
    wait: Duration,
    challenge: ChallengeGuard,
    reporter: Arc<dyn Reporter>,
}

impl<D: Driver> MainPage<D> {
    pub fn new(session: BrowserSession<D>, config: UiConfig, reporter: Arc<dyn Reporter>) -> Self {
        let challenge = ChallengeGuard::new(config.selector_challenge_button.clone(), config.challenge_wait());
        Self {
            wait: config.page_wait(),
            session,
            config,
            challenge,
            reporter,
        }
    }

    /// Override the per-operation wait
    #[must_use]
    pub fn with_wait(mut self, wait: Duration) -> Self {
        self.wait = wait;
        self
    }

    #[must_use]
    pub fn with_challenge(mut self, challenge: ChallengeGuard) -> Self {
        self.challenge = challenge;
        self
    }

    pub fn session(&self) -> &BrowserSession<D> {
        &self.session
    }

    pub fn config(&self) -> &UiConfig {
        &self.config
    }

    /// Navigate to the main page and clear any challenge
    pub async fn open(&self) -> E2eResult<ChallengeOutcome> {
        self.reporter.step("Open main page");
        self.session.navigate(&self.config.base_url).await?;
        self.challenge.intercept(&self.session).await
    }

    /// Logo visible within the page wait. Never fails.
    pub async fn is_loaded(&self) -> bool {
        self.reporter.step("Check main page is loaded");
        match self
            .session
            .wait_until(&Condition::Visible(self.config.selector_logo.clone()), self.wait)
            .await
        {
            Ok(_) => true,
            Err(e) => {
                debug!("Main page not loaded: {}", e);
                false
            }
        }
    }

    pub async fn rating_element(&self) -> E2eResult<ElementHandle> {
        self.reporter.step("Find rating element");
        self.present(&self.config.selector_rating).await
    }

    pub async fn navigation_menu(&self) -> E2eResult<ElementHandle> {
        self.reporter.step("Find navigation menu");
        self.present(&self.config.selector_navigation_menu).await
    }

    pub async fn navigation_menu_location_and_size(&self) -> E2eResult<(Point, Size)> {
        let menu = self.navigation_menu().await?;
        Ok((menu.location(), menu.size()))
    }

    pub async fn logo(&self) -> E2eResult<ElementHandle> {
        self.reporter.step("Find logo");
        self.present(&self.config.selector_logo).await
    }

    pub async fn hover(&self, element: &ElementHandle) -> E2eResult<()> {
        self.reporter.step(&format!("Hover over '{}'", element.selector));
        self.session.hover(element).await
    }

    /// Computed `cursor` of the element
    pub async fn cursor_style_of(&self, element: &ElementHandle) -> E2eResult<String> {
        self.reporter.step(&format!("Read cursor style of '{}'", element.selector));
        self.session.computed_style(element, "cursor").await
    }

    /// Navigate to a film page, the configured film when `film_id` is `None`
    pub async fn open_detail_page(&self, film_id: Option<u64>) -> E2eResult<()> {
        let url = self.config.film_url(film_id.unwrap_or(self.config.film_id));
        self.reporter.step(&format!("Open film page {url}"));
        self.session.navigate(&url).await
    }

    pub async fn close(&self) -> E2eResult<()> {
        self.session.close().await
    }

    /// Run `body` against this page, then close the session
    pub async fn scoped<T, Fut>(&self, body: Fut) -> E2eResult<T>
    where
        Fut: std::future::Future<Output = E2eResult<T>>,
    {
        close_after(&self.session, body).await
    }

    async fn present(&self, selector: &str) -> E2eResult<ElementHandle> {
        self.session
            .wait_until(&Condition::Present(selector.to_string()), self.wait)
            .await
    }
}
