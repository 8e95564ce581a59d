//! Case execution: registry lookup, dispatch, classification, assertion

use chrono::Utc;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

use kinoprobe_common::{AttachmentKind, HarnessConfig, Reporter, ScenarioResult, SuiteReport};

use crate::cases::{CaseGroup, CaseRegistry};
use crate::error::{ApiError, ApiResult};
use crate::request::ApiClient;
use crate::validate::{Expectation, OutcomeClass, ResponseOutcome};

/// Fixed binding of a titled scenario to a dataset case and its expectation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scenario {
    pub title: &'static str,
    pub case: &'static str,
    pub group: CaseGroup,
    pub expectation: Expectation,
}

/// The documented API scenarios, in execution order
pub const SCENARIOS: &[Scenario] = &[
    Scenario {
        title: "Поиск фильма с использованием фильтров",
        case: "Поиск фильма с использованием фильтров",
        group: CaseGroup::Positive,
        expectation: Expectation::Success,
    },
    Scenario {
        title: "Поиск фильмов по рейтингу",
        case: "Поиск фильмов по рейтингу",
        group: CaseGroup::Positive,
        expectation: Expectation::Success,
    },
    Scenario {
        title: "Поиск фильма по названию",
        case: "Поиск фильма по названию",
        group: CaseGroup::Positive,
        expectation: Expectation::Success,
    },
    Scenario {
        title: "Поиск фильма с датой из будущего (негативный кейс)",
        case: "Поиск фильма с датой из будущего",
        group: CaseGroup::Negative,
        expectation: Expectation::RejectedOrEmpty,
    },
    Scenario {
        title: "Поиск фильма с некорректным токеном (негативный кейс)",
        case: "Поиск фильма с некорректным токеном",
        group: CaseGroup::Negative,
        expectation: Expectation::CredentialRejected,
    },
    Scenario {
        title: "Поиск фильма с несуществующим диапазоном рейтинга (негативный кейс)",
        case: "Поиск фильма с несуществующим диапазоном рейтинга",
        group: CaseGroup::Negative,
        expectation: Expectation::RejectedOrEmpty,
    },
    Scenario {
        title: "Поиск фильма по несуществующему названию (негативный кейс)",
        case: "Поиск фильма по несуществующему названию",
        group: CaseGroup::Negative,
        expectation: Expectation::RejectedOrEmpty,
    },
    Scenario {
        title: "Поиск фильма с датой из далёкого прошлого (негативный кейс)",
        case: "Поиск фильма с датой из далёкого прошлого",
        group: CaseGroup::Negative,
        expectation: Expectation::RejectedOrEmpty,
    },
];

/// Find the scenario bound to a case
pub fn binding(group: CaseGroup, case: &str) -> Option<&'static Scenario> {
    SCENARIOS.iter().find(|s| s.group == group && s.case == case)
}

/// Expectation applied to a case with no explicit binding
pub fn default_expectation(group: CaseGroup) -> Expectation {
    match group {
        CaseGroup::Positive => Expectation::Success,
        CaseGroup::Negative => Expectation::RejectedOrEmpty,
    }
}

/// Evidence from a passing case
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseReport {
    pub case: String,
    pub group: CaseGroup,
    pub expectation: Expectation,
    pub status: u16,
    pub class: OutcomeClass,
}

/// Runs dataset cases against the configured API
pub struct ApiTestEngine {
    registry: CaseRegistry,
    client: ApiClient,
    reporter: Arc<dyn Reporter>,
}

impl ApiTestEngine {
    pub fn new(registry: CaseRegistry, client: ApiClient, reporter: Arc<dyn Reporter>) -> Self {
        Self {
            registry,
            client,
            reporter,
        }
    }

    /// Build an engine from resolved configuration and a loaded registry
    pub fn from_config(
        config: &HarnessConfig,
        registry: CaseRegistry,
        reporter: Arc<dyn Reporter>,
    ) -> ApiResult<Self> {
        let client = ApiClient::new(config.api.clone(), reporter.clone())?;
        Ok(Self::new(registry, client, reporter))
    }

    pub fn registry(&self) -> &CaseRegistry {
        &self.registry
    }

    /// Execute a case with the expectation bound to it
    pub async fn execute(&self, case_name: &str, group: CaseGroup) -> ApiResult<CaseReport> {
        let expectation = binding(group, case_name)
            .map(|s| s.expectation)
            .unwrap_or_else(|| default_expectation(group));
        self.execute_with(case_name, group, expectation).await
    }

    /// Execute a case against an explicit expectation
    pub async fn execute_with(
        &self,
        case_name: &str,
        group: CaseGroup,
        expectation: Expectation,
    ) -> ApiResult<CaseReport> {
        let case = self.registry.get(group, case_name)?;
        self.reporter.step(&format!("Execute case: {}", case.name));

        let outcome = self
            .client
            .request(
                Method::GET,
                &case.endpoint,
                case.params.as_ref(),
                case.api_key.as_deref(),
            )
            .await?;

        self.reporter.step(&format!("Check response: expected {expectation}"));
        self.attach_outcome(&outcome);

        let class = outcome.classify();
        if !expectation.is_satisfied_by(&outcome) {
            return Err(ApiError::AssertionFailed {
                case: case.name.clone(),
                expectation,
                status: outcome.status,
                body: outcome.body,
            });
        }

        Ok(CaseReport {
            case: case.name.clone(),
            group,
            expectation,
            status: outcome.status,
            class,
        })
    }

    pub async fn run_scenario(&self, scenario: &Scenario) -> ApiResult<CaseReport> {
        self.execute_with(scenario.case, scenario.group, scenario.expectation)
            .await
    }

    /// Run every bound scenario in order.
    ///
    /// Setup defects abort the run; other failures are recorded per scenario.
    pub async fn run_all(&self) -> ApiResult<SuiteReport> {
        self.run_scenarios(SCENARIOS).await
    }

    pub async fn run_scenarios(&self, scenarios: &[Scenario]) -> ApiResult<SuiteReport> {
        let started_at = Utc::now();
        let start = Instant::now();
        let mut results = Vec::with_capacity(scenarios.len());

        info!("Running {} API scenario(s)...", scenarios.len());

        let stale = self.reporter.drain();
        if !stale.is_empty() {
            debug!("Discarding {} record(s) from before this run", stale.len());
        }

        for scenario in scenarios {
            let scenario_start = Instant::now();
            let outcome = self.run_scenario(scenario).await;
            let duration_ms = scenario_start.elapsed().as_millis() as u64;

            let error = match outcome {
                Ok(report) => {
                    info!("✓ {} ({} ms, {})", scenario.title, duration_ms, report.class);
                    None
                }
                Err(e) if e.is_setup_defect() => return Err(e),
                Err(e) => {
                    error!("✗ {} - {}", scenario.title, e);
                    Some(e.to_string())
                }
            };

            results.push(ScenarioResult {
                name: scenario.title.to_string(),
                success: error.is_none(),
                duration_ms,
                error,
                records: self.reporter.drain(),
            });
        }

        let report = SuiteReport::new("api", started_at, results, start.elapsed().as_millis() as u64);
        info!(
            "API results: {} passed, {} failed ({} ms)",
            report.passed, report.failed, report.duration_ms
        );
        Ok(report)
    }

    fn attach_outcome(&self, outcome: &ResponseOutcome) {
        self.reporter
            .attach("Status Code", AttachmentKind::Text, &outcome.status.to_string());
        self.reporter
            .attach("Response Body", AttachmentKind::Json, &outcome.body);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binding_table_is_consistent() {
        for scenario in SCENARIOS {
            assert!(scenario.title.starts_with(scenario.case));
            let expected = if scenario.case == "Поиск фильма с некорректным токеном" {
                Expectation::CredentialRejected
            } else {
                default_expectation(scenario.group)
            };
            assert_eq!(scenario.expectation, expected, "{}", scenario.title);
        }
    }

    #[test]
    fn test_binding_lookup() {
        let s = binding(CaseGroup::Negative, "Поиск фильма с некорректным токеном").unwrap();
        assert_eq!(s.expectation, Expectation::CredentialRejected);
        assert!(binding(CaseGroup::Positive, "Поиск фильма с некорректным токеном").is_none());
    }

    #[test]
    fn test_bundled_dataset_covers_every_scenario() {
        let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../../data/test_data.yaml");
        let registry = CaseRegistry::from_file(&path).unwrap();
        for scenario in SCENARIOS {
            registry.get(scenario.group, scenario.case).unwrap();
        }
    }
}
