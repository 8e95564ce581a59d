//! Scripted in-memory driver shared by the UI integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use kinoprobe_common::UiConfig;
use kinoprobe_e2e::{BrowserSession, Driver, E2eError, E2eResult, ElementState, Point, Size};

pub const BASE_URL: &str = "https://kino.test/";
pub const FILM_URL: &str = "https://kino.test/film/301";

#[derive(Debug, Clone)]
pub struct FakeElement {
    pub state: ElementState,
    pub appears_after: u32,
    pub cursor: String,
    pub vanishes_on_click: bool,
    pub click_fails: bool,
}

impl FakeElement {
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            state: ElementState::visible(Point { x, y }, Size { width: 120.0, height: 32.0 }),
            appears_after: 0,
            cursor: "auto".to_string(),
            vanishes_on_click: false,
            click_fails: false,
        }
    }

    pub fn hidden(mut self) -> Self {
        self.state.displayed = false;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.state.enabled = false;
        self
    }

    /// Absent for the first `n` probes after navigation
    pub fn after_probes(mut self, n: u32) -> Self {
        self.appears_after = n;
        self
    }

    pub fn cursor(mut self, cursor: &str) -> Self {
        self.cursor = cursor.to_string();
        self
    }

    pub fn vanishes_on_click(mut self) -> Self {
        self.vanishes_on_click = true;
        self
    }

    pub fn click_fails(mut self) -> Self {
        self.click_fails = true;
        self
    }
}

#[derive(Debug, Clone, Default)]
struct FakePage {
    title: String,
    elements: HashMap<String, FakeElement>,
}

#[derive(Debug, Default)]
struct FakeState {
    pages: HashMap<String, FakePage>,
    history: Vec<String>,
    probes: HashMap<String, u32>,
    removed: HashSet<String>,
    hovered: Option<String>,
    clicks: Vec<String>,
    visits: Vec<String>,
    close_calls: u32,
    closed: bool,
    back_ignored: bool,
}

impl FakeState {
    fn current(&self) -> Option<&FakePage> {
        self.history.last().and_then(|url| self.pages.get(url))
    }

    fn element(&self, selector: &str) -> Option<&FakeElement> {
        self.current().and_then(|page| page.elements.get(selector))
    }

    fn reset_page_state(&mut self) {
        self.probes.clear();
        self.removed.clear();
    }
}

/// Cloneable handle; clones share the same scripted browser
#[derive(Debug, Clone, Default)]
pub struct FakeDriver {
    state: Arc<Mutex<FakeState>>,
}

impl FakeDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(self, url: &str, title: &str, elements: Vec<(&str, FakeElement)>) -> Self {
        let page = FakePage {
            title: title.to_string(),
            elements: elements
                .into_iter()
                .map(|(selector, element)| (selector.to_string(), element))
                .collect(),
        };
        self.state.lock().pages.insert(url.to_string(), page);
        self
    }

    /// History navigation silently does nothing, like a page that swallows it
    pub fn ignores_back(self) -> Self {
        self.state.lock().back_ignored = true;
        self
    }

    pub fn current_url(&self) -> Option<String> {
        self.state.lock().history.last().cloned()
    }

    pub fn visits(&self) -> Vec<String> {
        self.state.lock().visits.clone()
    }

    pub fn hovered(&self) -> Option<String> {
        self.state.lock().hovered.clone()
    }

    pub fn clicks(&self) -> Vec<String> {
        self.state.lock().clicks.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    pub fn close_calls(&self) -> u32 {
        self.state.lock().close_calls
    }

    fn check_open(&self) -> E2eResult<()> {
        if self.state.lock().closed {
            Err(E2eError::Script("browser is gone".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Driver for FakeDriver {
    async fn goto(&self, url: &str) -> E2eResult<()> {
        self.check_open()?;
        let mut state = self.state.lock();
        state.history.push(url.to_string());
        state.visits.push(url.to_string());
        state.reset_page_state();
        Ok(())
    }

    async fn probe(&self, selector: &str) -> E2eResult<Option<ElementState>> {
        self.check_open()?;
        let mut state = self.state.lock();
        let seen = {
            let count = state.probes.entry(selector.to_string()).or_insert(0);
            *count += 1;
            *count
        };
        if state.removed.contains(selector) {
            return Ok(None);
        }
        Ok(state
            .element(selector)
            .filter(|element| seen > element.appears_after)
            .map(|element| element.state))
    }

    async fn hover(&self, selector: &str) -> E2eResult<()> {
        self.check_open()?;
        let mut state = self.state.lock();
        if state.element(selector).is_none() {
            return Err(E2eError::ElementNotFound(selector.to_string()));
        }
        state.hovered = Some(selector.to_string());
        Ok(())
    }

    async fn click(&self, selector: &str) -> E2eResult<()> {
        self.check_open()?;
        let mut state = self.state.lock();
        let element = state
            .element(selector)
            .cloned()
            .ok_or_else(|| E2eError::ElementNotFound(selector.to_string()))?;
        if element.click_fails {
            return Err(E2eError::Input(format!("click on '{selector}' was intercepted")));
        }
        state.clicks.push(selector.to_string());
        if element.vanishes_on_click {
            state.removed.insert(selector.to_string());
        }
        Ok(())
    }

    async fn computed_style(&self, selector: &str, property: &str) -> E2eResult<String> {
        self.check_open()?;
        let state = self.state.lock();
        let element = state
            .element(selector)
            .ok_or_else(|| E2eError::ElementNotFound(selector.to_string()))?;
        match property {
            "cursor" if state.hovered.as_deref() == Some(selector) => Ok(element.cursor.clone()),
            "cursor" => Ok("auto".to_string()),
            _ => Ok(String::new()),
        }
    }

    async fn title(&self) -> E2eResult<String> {
        self.check_open()?;
        Ok(self
            .state
            .lock()
            .current()
            .map(|page| page.title.clone())
            .unwrap_or_default())
    }

    async fn url(&self) -> E2eResult<String> {
        self.check_open()?;
        Ok(self.current_url().unwrap_or_else(|| "about:blank".to_string()))
    }

    async fn back(&self) -> E2eResult<()> {
        self.check_open()?;
        let mut state = self.state.lock();
        if state.back_ignored {
            return Ok(());
        }
        if state.history.len() > 1 {
            state.history.pop();
        }
        state.reset_page_state();
        Ok(())
    }

    async fn close(&self) -> E2eResult<()> {
        let mut state = self.state.lock();
        state.close_calls += 1;
        state.closed = true;
        Ok(())
    }
}

/// Configuration pointing at the fake site, with one-second waits
pub fn test_config() -> UiConfig {
    UiConfig {
        base_url: BASE_URL.to_string(),
        page_wait_secs: 1,
        implicit_wait_secs: 1,
        challenge_wait_secs: 1,
        ..UiConfig::default()
    }
}

/// A well-behaved copy of the site: main page plus the default film page
pub fn healthy_site(config: &UiConfig) -> FakeDriver {
    FakeDriver::new()
        .page(
            BASE_URL,
            "Кинопоиск. Онлайн кинотеатр",
            vec![
                (config.selector_logo.as_str(), FakeElement::at(24.0, 12.0).cursor("pointer")),
                (config.selector_navigation_menu.as_str(), FakeElement::at(16.0, 88.0)),
            ],
        )
        .page(
            FILM_URL,
            "Зеленая миля (1999) - Кинопоиск",
            vec![
                (config.selector_logo.as_str(), FakeElement::at(24.0, 12.0).cursor("pointer")),
                (config.selector_rating.as_str(), FakeElement::at(640.0, 420.0)),
            ],
        )
}

pub fn fast_session(driver: FakeDriver, implicit_wait_ms: u64) -> BrowserSession<FakeDriver> {
    BrowserSession::new(driver, Duration::from_millis(implicit_wait_ms))
        .with_poll_interval(Duration::from_millis(5))
}
