//! Chrome DevTools Protocol driver
//!
//! Element inspection runs as injected scripts that return JSON strings, so a
//! missing element comes back as `null` rather than an evaluation error.
//! Pointer interaction goes through CDP input events.

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::input::{
    DispatchMouseEventParams, DispatchMouseEventType, MouseButton,
};
use chromiumoxide::cdp::browser_protocol::page::{
    GetNavigationHistoryParams, NavigateToHistoryEntryParams,
};
use chromiumoxide::page::Page;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::Path;
use tempfile::TempDir;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use kinoprobe_common::UiConfig;

use crate::driver::{Driver, ElementState};
use crate::error::{E2eError, E2eResult};

const PROBE_SCRIPT: &str = r#"(() => {
  const el = document.querySelector(__SELECTOR__);
  if (!el) return JSON.stringify(null);
  const r = el.getBoundingClientRect();
  const s = window.getComputedStyle(el);
  const displayed = r.width > 0 && r.height > 0
    && s.display !== 'none'
    && s.visibility !== 'hidden'
    && parseFloat(s.opacity || '1') > 0;
  return JSON.stringify({
    displayed,
    enabled: !el.disabled,
    location: { x: r.left + window.scrollX, y: r.top + window.scrollY },
    size: { width: r.width, height: r.height },
  });
})()"#;

const CENTER_SCRIPT: &str = r#"(() => {
  const el = document.querySelector(__SELECTOR__);
  if (!el) return JSON.stringify(null);
  el.scrollIntoView({ block: 'center', inline: 'center' });
  const r = el.getBoundingClientRect();
  return JSON.stringify({ x: r.left + r.width / 2, y: r.top + r.height / 2 });
})()"#;

const STYLE_SCRIPT: &str = r#"(() => {
  const el = document.querySelector(__SELECTOR__);
  if (!el) return JSON.stringify(null);
  return JSON.stringify(window.getComputedStyle(el).getPropertyValue(__PROPERTY__));
})()"#;

#[derive(Debug, Deserialize)]
struct ViewportPoint {
    x: f64,
    y: f64,
}

/// Driver backed by a locally launched Chrome
pub struct ChromiumDriver {
    browser: Mutex<Option<Browser>>,
    page: Page,
    handler: JoinHandle<()>,
    // Declared last so Chrome is gone before the directory is removed
    profile: TempDir,
}

impl ChromiumDriver {
    /// Launch Chrome and open a blank tab
    pub async fn launch(config: &UiConfig) -> E2eResult<Self> {
        let profile = profile_dir()?;
        let browser_config = browser_config(config, profile.path())?;
        debug!("Launching Chrome (headless: {})", config.headless);

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| E2eError::Launch(e.to_string()))?;

        // The handler must be polled for CDP traffic to flow
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    warn!("Browser handler error: {}", e);
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| E2eError::Launch(e.to_string()))?;

        Ok(Self {
            browser: Mutex::new(Some(browser)),
            page,
            handler,
            profile,
        })
    }

    async fn eval_json<T: DeserializeOwned>(&self, script: &str) -> E2eResult<T> {
        let result = self
            .page
            .evaluate(script)
            .await
            .map_err(|e| E2eError::Script(e.to_string()))?;
        let raw: String = result
            .into_value()
            .map_err(|e| E2eError::Script(e.to_string()))?;
        Ok(serde_json::from_str(&raw)?)
    }

    async fn center_of(&self, selector: &str) -> E2eResult<ViewportPoint> {
        let script = CENTER_SCRIPT.replace("__SELECTOR__", &js_string(selector)?);
        self.eval_json::<Option<ViewportPoint>>(&script)
            .await?
            .ok_or_else(|| E2eError::ElementNotFound(selector.to_string()))
    }

    async fn mouse(
        &self,
        kind: DispatchMouseEventType,
        at: &ViewportPoint,
        button: Option<MouseButton>,
    ) -> E2eResult<()> {
        let mut builder = DispatchMouseEventParams::builder()
            .r#type(kind)
            .x(at.x)
            .y(at.y);
        if let Some(button) = button {
            builder = builder.button(button).click_count(1);
        }
        let params = builder.build().map_err(E2eError::Input)?;

        self.page
            .execute(params)
            .await
            .map_err(|e| E2eError::Input(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl Driver for ChromiumDriver {
    async fn goto(&self, url: &str) -> E2eResult<()> {
        self.page
            .goto(url)
            .await
            .map_err(|e| E2eError::Navigation {
                url: url.to_string(),
                reason: e.to_string(),
            })?;
        Ok(())
    }

    async fn probe(&self, selector: &str) -> E2eResult<Option<ElementState>> {
        let script = PROBE_SCRIPT.replace("__SELECTOR__", &js_string(selector)?);
        self.eval_json(&script).await
    }

    async fn hover(&self, selector: &str) -> E2eResult<()> {
        let center = self.center_of(selector).await?;
        self.mouse(DispatchMouseEventType::MouseMoved, &center, None)
            .await
    }

    async fn click(&self, selector: &str) -> E2eResult<()> {
        let center = self.center_of(selector).await?;
        self.mouse(DispatchMouseEventType::MouseMoved, &center, None)
            .await?;
        self.mouse(
            DispatchMouseEventType::MousePressed,
            &center,
            Some(MouseButton::Left),
        )
        .await?;
        self.mouse(
            DispatchMouseEventType::MouseReleased,
            &center,
            Some(MouseButton::Left),
        )
        .await
    }

    async fn computed_style(&self, selector: &str, property: &str) -> E2eResult<String> {
        let script = STYLE_SCRIPT
            .replace("__SELECTOR__", &js_string(selector)?)
            .replace("__PROPERTY__", &js_string(property)?);
        self.eval_json::<Option<String>>(&script)
            .await?
            .ok_or_else(|| E2eError::ElementNotFound(selector.to_string()))
    }

    async fn title(&self) -> E2eResult<String> {
        self.eval_json("JSON.stringify(document.title)").await
    }

    async fn url(&self) -> E2eResult<String> {
        let url = self
            .page
            .url()
            .await
            .map_err(|e| E2eError::Script(e.to_string()))?;
        Ok(url.unwrap_or_default())
    }

    async fn back(&self) -> E2eResult<()> {
        let history = self
            .page
            .execute(GetNavigationHistoryParams::default())
            .await
            .map_err(|e| E2eError::Script(e.to_string()))?;
        let previous = previous_entry(&history.entries, history.current_index).ok_or_else(|| {
            E2eError::Navigation {
                url: "history".to_string(),
                reason: "no earlier entry to go back to".to_string(),
            }
        })?;
        let (id, url) = (previous.id, previous.url.clone());
        debug!("Going back to {}", url);

        let navigation_failed = |e: chromiumoxide::error::CdpError| E2eError::Navigation {
            url: url.clone(),
            reason: e.to_string(),
        };
        self.page
            .execute(NavigateToHistoryEntryParams::new(id))
            .await
            .map_err(navigation_failed)?;
        self.page
            .wait_for_navigation()
            .await
            .map_err(navigation_failed)?;
        Ok(())
    }

    async fn close(&self) -> E2eResult<()> {
        let mut guard = self.browser.lock().await;
        if let Some(mut browser) = guard.take() {
            debug!("Closing browser");
            browser.close().await?;
            if let Err(e) = browser.wait().await {
                debug!("Waiting for Chrome to exit failed: {}", e);
            }
        }
        self.handler.abort();
        Ok(())
    }
}

impl Drop for ChromiumDriver {
    fn drop(&mut self) {
        // chromiumoxide kills the Chrome child when its Browser is dropped
        if self.browser.get_mut().is_some() {
            warn!("ChromiumDriver dropped without close() - forcing shutdown via Drop");
        }
        self.handler.abort();
    }
}

/// Fresh Chrome profile directory, removed when dropped
fn profile_dir() -> E2eResult<TempDir> {
    Ok(tempfile::Builder::new().prefix("kinoprobe-").tempdir()?)
}

fn browser_config(config: &UiConfig, profile: &Path) -> E2eResult<BrowserConfig> {
    let mut builder = BrowserConfig::builder();

    if !config.headless {
        builder = builder.with_head();
    }

    builder = builder.arg(format!(
        "--window-size={},{}",
        config.window_width, config.window_height
    ));

    // A fresh profile per session keeps Chrome's singleton lock out of the way
    builder = builder.arg(format!("--user-data-dir={}", profile.display()));

    builder = builder
        .arg("--no-sandbox")
        .arg("--disable-dev-shm-usage");

    if let Some(path) = &config.chrome_path {
        builder = builder.chrome_executable(path);
    }

    builder.build().map_err(E2eError::Launch)
}

/// History entry just before `current`, if any
fn previous_entry<T>(entries: &[T], current: i64) -> Option<&T> {
    let current = usize::try_from(current).ok()?;
    entries.get(current.checked_sub(1)?)
}

/// Encode a value as a JavaScript string literal
fn js_string(value: &str) -> E2eResult<String> {
    Ok(serde_json::to_string(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_is_embedded_as_literal() {
        let sel = js_string(r#"img[alt="Кинопоиск"]"#).unwrap();
        let script = PROBE_SCRIPT.replace("__SELECTOR__", &sel);
        assert!(script.contains(r#"document.querySelector("img[alt=\"Кинопоиск\"]")"#));
        assert!(!script.contains("__SELECTOR__"));
    }

    #[test]
    fn test_style_script_fills_both_slots() {
        let script = STYLE_SCRIPT
            .replace("__SELECTOR__", &js_string("a.logo").unwrap())
            .replace("__PROPERTY__", &js_string("cursor").unwrap());
        assert!(script.contains(r#"getPropertyValue("cursor")"#));
        assert!(script.contains(r#"querySelector("a.logo")"#));
    }

    #[test]
    fn test_profile_dir_is_removed_on_drop() {
        let profile = profile_dir().unwrap();
        let path = profile.path().to_path_buf();
        assert!(path.is_dir());
        assert!(path.starts_with(std::env::temp_dir()));
        assert!(path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.starts_with("kinoprobe-")));

        drop(profile);
        assert!(!path.exists());
    }

    #[test]
    fn test_browser_config_uses_given_profile() {
        let profile = profile_dir().unwrap();
        let config = UiConfig {
            chrome_path: Some("/usr/bin/chromium".into()),
            ..UiConfig::default()
        };
        assert!(browser_config(&config, profile.path()).is_ok());
    }

    #[test]
    fn test_previous_entry_steps_back_once() {
        let entries = ["about:blank", "https://kino.test/", "https://kino.test/film/301"];
        assert_eq!(previous_entry(&entries, 2), Some(&"https://kino.test/"));
        assert_eq!(previous_entry(&entries, 0), None);
        assert_eq!(previous_entry(&entries, -1), None);
    }

    #[test]
    fn test_probe_payload_shape() {
        let raw = r#"{"displayed":true,"enabled":true,"location":{"x":12.5,"y":40},"size":{"width":100,"height":20}}"#;
        let state: ElementState = serde_json::from_str(raw).unwrap();
        assert!(state.displayed);
        assert_eq!(state.location.x, 12.5);
        assert_eq!(state.size.height, 20.0);

        let absent: Option<ElementState> = serde_json::from_str("null").unwrap();
        assert!(absent.is_none());
    }
}
