//! UI scenario runner
//!
//! Each scenario gets its own browser: launch, open the main page, run the
//! check, close. Results are collected into a [`SuiteReport`].

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

use kinoprobe_common::{Reporter, ScenarioResult, SuiteReport, UiConfig};

use crate::chromium::ChromiumDriver;
use crate::driver::Driver;
use crate::ensure_ui;
use crate::error::{E2eError, E2eResult};
use crate::page::MainPage;
use crate::session::BrowserSession;
use crate::wait::Condition;

/// Substring every page title on the site carries
pub const SITE_TITLE: &str = "Кинопоиск";

const LOGO_WAIT: Duration = Duration::from_secs(20);
const SHORT_WAIT: Duration = Duration::from_secs(10);

/// Acceptance checks against the live site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UiScenario {
    MainPageLoads,
    RatingDisplayed,
    BrowserBack,
    NavigationMenuLeft,
    CursorPointerOnLogo,
}

impl UiScenario {
    pub const ALL: [UiScenario; 5] = [
        UiScenario::MainPageLoads,
        UiScenario::RatingDisplayed,
        UiScenario::BrowserBack,
        UiScenario::NavigationMenuLeft,
        UiScenario::CursorPointerOnLogo,
    ];

    /// Identifier used on the command line
    pub fn name(&self) -> &'static str {
        match self {
            UiScenario::MainPageLoads => "main-page-loads",
            UiScenario::RatingDisplayed => "rating-displayed",
            UiScenario::BrowserBack => "browser-back",
            UiScenario::NavigationMenuLeft => "navigation-menu-left",
            UiScenario::CursorPointerOnLogo => "cursor-pointer-on-logo",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            UiScenario::MainPageLoads => "Проверка загрузки главной страницы",
            UiScenario::RatingDisplayed => "Проверка отображения и расположения рейтинга фильма",
            UiScenario::BrowserBack => "Проверка работы кнопки назад в браузере",
            UiScenario::NavigationMenuLeft => "Проверка расположения меню навигации слева",
            UiScenario::CursorPointerOnLogo => "Проверка изменения курсора на pointer при наведении",
        }
    }

    /// Run the check on an already opened main page
    pub async fn run<D: Driver>(self, page: &MainPage<D>) -> E2eResult<()> {
        let session = page.session();
        let config = page.config();
        let logo = Condition::Present(config.selector_logo.clone());

        match self {
            UiScenario::MainPageLoads => {
                session.wait_until(&logo, LOGO_WAIT).await?;
                ensure_ui!(page.is_loaded().await, "main page did not load");
            }
            UiScenario::RatingDisplayed => {
                page.open_detail_page(Some(config.film_id)).await?;
                let rating = page.rating_element().await?;
                let rating = session.refresh(&rating).await?;
                ensure_ui!(rating.is_displayed(), "rating '{}' is not displayed", rating.selector);
                let at = rating.location();
                ensure_ui!(
                    at.x > 0.0 && at.y > 0.0,
                    "rating is misplaced at ({}, {})",
                    at.x,
                    at.y
                );
            }
            UiScenario::BrowserBack => {
                session.navigate(&config.film_url(config.film_id)).await?;
                session.back().await?;
                session
                    .wait_for_url(
                        |url| same_document(url, &config.base_url),
                        &format!("return to {}", config.base_url),
                        SHORT_WAIT,
                    )
                    .await?;
                session.wait_until(&logo, SHORT_WAIT).await?;
                ensure_ui!(
                    !session.exists_now(&config.selector_rating).await,
                    "film rating is still shown after going back"
                );
                let title = session.title().await?;
                ensure_ui!(
                    title.contains(SITE_TITLE),
                    "title '{}' does not mention {}",
                    title,
                    SITE_TITLE
                );
            }
            UiScenario::NavigationMenuLeft => {
                let (at, _) = page.navigation_menu_location_and_size().await?;
                ensure_ui!(at.x < 100.0, "navigation menu is not on the left, x = {}", at.x);
            }
            UiScenario::CursorPointerOnLogo => {
                let element = session.wait_until(&logo, SHORT_WAIT).await?;
                page.hover(&element).await?;
                let cursor = page.cursor_style_of(&element).await?;
                ensure_ui!(cursor == "pointer", "cursor is '{}', expected pointer", cursor);
            }
        }
        Ok(())
    }
}

/// Same address, ignoring query, fragment and trailing slash
fn same_document(url: &str, expected: &str) -> bool {
    fn path_of(url: &str) -> &str {
        let end = url.find(['?', '#']).unwrap_or(url.len());
        url[..end].trim_end_matches('/')
    }
    path_of(url) == path_of(expected)
}

impl fmt::Display for UiScenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for UiScenario {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UiScenario::ALL
            .into_iter()
            .find(|scenario| scenario.name() == s)
            .ok_or_else(|| {
                let known: Vec<_> = UiScenario::ALL.iter().map(|s| s.name()).collect();
                format!("unknown UI scenario '{}' (known: {})", s, known.join(", "))
            })
    }
}

/// Sequential UI scenario runner
pub struct UiRunner {
    config: UiConfig,
    reporter: Arc<dyn Reporter>,
}

impl UiRunner {
    pub fn new(config: UiConfig, reporter: Arc<dyn Reporter>) -> Self {
        Self { config, reporter }
    }

    pub async fn run_all(&self) -> SuiteReport {
        self.run_scenarios(&UiScenario::ALL).await
    }

    /// Run scenarios against freshly launched Chrome instances
    pub async fn run_scenarios(&self, scenarios: &[UiScenario]) -> SuiteReport {
        self.run_scenarios_with(scenarios, |config| async move {
            ChromiumDriver::launch(&config).await
        })
        .await
    }

    /// Run scenarios, obtaining one driver per scenario from `launch`
    pub async fn run_scenarios_with<D, F, Fut>(&self, scenarios: &[UiScenario], launch: F) -> SuiteReport
    where
        D: Driver,
        F: Fn(UiConfig) -> Fut,
        Fut: Future<Output = E2eResult<D>>,
    {
        let started_at = Utc::now();
        let start = Instant::now();
        let mut results = Vec::with_capacity(scenarios.len());

        info!("Running {} UI scenario(s)...", scenarios.len());

        let stale = self.reporter.drain();
        if !stale.is_empty() {
            debug!("Discarding {} record(s) from before this run", stale.len());
        }

        for &scenario in scenarios {
            let scenario_start = Instant::now();
            let outcome = match launch(self.config.clone()).await {
                Ok(driver) => self.run_on(scenario, driver).await,
                Err(e) => Err(e),
            };
            let duration_ms = scenario_start.elapsed().as_millis() as u64;

            let error = match outcome {
                Ok(()) => {
                    info!("✓ {} ({} ms)", scenario.title(), duration_ms);
                    None
                }
                Err(e) => {
                    error!("✗ {} - {}", scenario.title(), e);
                    Some(e.to_string())
                }
            };

            results.push(ScenarioResult {
                name: scenario.title().to_string(),
                success: error.is_none(),
                duration_ms,
                error,
                records: self.reporter.drain(),
            });
        }

        let report = SuiteReport::new("ui", started_at, results, start.elapsed().as_millis() as u64);
        info!(
            "UI results: {} passed, {} failed ({} ms)",
            report.passed, report.failed, report.duration_ms
        );
        report
    }

    /// Open the main page on `driver`, run one scenario, close the session
    pub async fn run_on<D: Driver>(&self, scenario: UiScenario, driver: D) -> E2eResult<()> {
        debug!("Running UI scenario: {}", scenario.name());
        self.reporter.step(scenario.title());

        let session = BrowserSession::new(driver, self.config.implicit_wait());
        let page = MainPage::new(session, self.config.clone(), self.reporter.clone());

        page.scoped(async {
            page.open().await?;
            scenario.run(&page).await
        })
        .await
        .map_err(|e| match e {
            E2eError::AssertionFailed(msg) => {
                E2eError::AssertionFailed(format!("{}: {}", scenario.title(), msg))
            }
            other => other,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scenario_names_round_trip_through_from_str() {
        for scenario in UiScenario::ALL {
            assert_eq!(scenario.name().parse::<UiScenario>().unwrap(), scenario);
        }
    }

    #[test]
    fn test_unknown_scenario_lists_known_names() {
        let err = "checkout".parse::<UiScenario>().unwrap_err();
        assert!(err.contains("main-page-loads"));
        assert!(err.contains("checkout"));
    }

    #[test]
    fn test_same_document_ignores_slash_and_query() {
        assert!(same_document("https://kino.test/?utm=1", "https://kino.test/"));
        assert!(same_document("https://kino.test", "https://kino.test/"));
        assert!(!same_document("https://kino.test/film/301", "https://kino.test/"));
    }

    #[test]
    fn test_scenario_serializes_kebab_case() {
        let json = serde_json::to_string(&UiScenario::CursorPointerOnLogo).unwrap();
        assert_eq!(json, "\"cursor-pointer-on-logo\"");
    }
}
