//! Harness configuration
//!
//! The configuration file carries the API settings at the top level (the
//! `base_url`/`api_key` pair the target service hands out) and an optional
//! `ui` section. Every value has a default and can be overridden from the
//! environment after loading.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

use crate::error::{Error, Result};

/// Complete harness configuration, constructed once at start-up
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HarnessConfig {
    /// HTTP API settings
    #[serde(flatten)]
    pub api: ApiConfig,

    /// Web UI settings
    #[serde(default)]
    pub ui: UiConfig,
}

/// HTTP API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL every case endpoint is appended to
    pub base_url: String,

    /// Credential sent in `X-API-KEY` unless a case overrides it
    pub api_key: String,

    /// Per-request timeout applied by the HTTP client
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.kinopoisk.dev".to_string(),
            api_key: String::new(),
            timeout_secs: 30,
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Overlay `KINOPROBE_API_*` environment variables
    pub fn apply_env(&mut self) -> Result<()> {
        if let Some(v) = env_string("KINOPROBE_API_BASE_URL") {
            self.base_url = v;
        }
        if let Some(v) = env_string("KINOPROBE_API_KEY") {
            self.api_key = v;
        }
        if let Some(v) = env_parse("KINOPROBE_API_TIMEOUT_SECS")? {
            self.timeout_secs = v;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        validate_base_url("base_url", &self.base_url)?;
        if self.timeout_secs == 0 {
            return Err(Error::InvalidConfig("timeout_secs must be positive".to_string()));
        }
        Ok(())
    }
}

/// Web UI configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Main page URL
    pub base_url: String,

    /// Film opened by the detail-page scenarios when no id is given
    pub film_id: u64,

    /// Site logo, used as the "page loaded" marker
    pub selector_logo: String,

    /// Rating badge on a film page
    pub selector_rating: String,

    /// Left-hand navigation menu
    pub selector_navigation_menu: String,

    /// Anti-bot checkbox challenge trigger
    pub selector_challenge_button: String,

    /// Timeout for page-level explicit waits
    pub page_wait_secs: u64,

    /// Coarse element-discovery fallback
    pub implicit_wait_secs: u64,

    /// Timeout for each of the two challenge-dismissal waits
    pub challenge_wait_secs: u64,

    /// Run the browser without a window
    pub headless: bool,

    /// Browser window size
    pub window_width: u32,
    pub window_height: u32,

    /// Chrome executable (None = auto-detect)
    pub chrome_path: Option<String>,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.kinopoisk.ru/".to_string(),
            film_id: 301,
            selector_logo: r#"img[alt="Кинопоиск"]"#.to_string(),
            selector_rating: "span.styles_ratingKpTop__84afd".to_string(),
            selector_navigation_menu: "nav[data-tid='e500879d'] > ul".to_string(),
            selector_challenge_button: ".CheckboxCaptcha-Button".to_string(),
            page_wait_secs: 15,
            implicit_wait_secs: 25,
            challenge_wait_secs: 15,
            headless: true,
            window_width: 1920,
            window_height: 1080,
            chrome_path: None,
        }
    }
}

impl UiConfig {
    pub fn page_wait(&self) -> Duration {
        Duration::from_secs(self.page_wait_secs)
    }

    pub fn implicit_wait(&self) -> Duration {
        Duration::from_secs(self.implicit_wait_secs)
    }

    pub fn challenge_wait(&self) -> Duration {
        Duration::from_secs(self.challenge_wait_secs)
    }

    /// URL of a film detail page
    pub fn film_url(&self, film_id: u64) -> String {
        format!("{}/film/{}", self.base_url.trim_end_matches('/'), film_id)
    }

    /// Overlay the UI environment variables
    pub fn apply_env(&mut self) -> Result<()> {
        if let Some(v) = env_string("BASE_URL") {
            self.base_url = v;
        }
        if let Some(v) = env_parse("FILM_ID")? {
            self.film_id = v;
        }
        if let Some(v) = env_string("SELECTOR_LOGO_IMG") {
            self.selector_logo = v;
        }
        if let Some(v) = env_string("SELECTOR_RATING_SPAN") {
            self.selector_rating = v;
        }
        if let Some(v) = env_string("SELECTOR_NAVIGATION_MENU") {
            self.selector_navigation_menu = v;
        }
        if let Some(v) = env_string("SELECTOR_CAPTCHA_BUTTON") {
            self.selector_challenge_button = v;
        }
        if let Some(v) = env_parse("KINOPROBE_HEADLESS")? {
            self.headless = v;
        }
        if let Some(v) = env_string("CHROME_PATH") {
            self.chrome_path = Some(v);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        validate_base_url("ui.base_url", &self.base_url)?;
        for (name, selector) in [
            ("selector_logo", &self.selector_logo),
            ("selector_rating", &self.selector_rating),
            ("selector_navigation_menu", &self.selector_navigation_menu),
            ("selector_challenge_button", &self.selector_challenge_button),
        ] {
            if selector.trim().is_empty() {
                return Err(Error::InvalidConfig(format!("{name} is empty")));
            }
        }
        Ok(())
    }
}

impl HarnessConfig {
    /// Load configuration from file, falling back to defaults when it is missing
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Self::from_yaml(&content)
        } else {
            debug!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load, apply environment overrides and validate
    pub fn resolve(path: &Path) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.api.apply_env()?;
        config.ui.apply_env()?;
        config.api.validate()?;
        config.ui.validate()?;
        Ok(config)
    }
}

fn validate_base_url(field: &str, url: &str) -> Result<()> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(Error::InvalidConfig(format!(
            "{field} must be an http(s) URL, got '{url}'"
        )))
    }
}

fn env_string(var: &str) -> Option<String> {
    std::env::var(var)
        .ok()
        .and_then(|v| if v.trim().is_empty() { None } else { Some(v) })
}

fn env_parse<T: FromStr>(var: &str) -> Result<Option<T>> {
    match env_string(var) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| Error::InvalidEnv {
                var: var.to_string(),
                value,
            }),
    }
}
