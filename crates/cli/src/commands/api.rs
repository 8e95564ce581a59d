//! API Commands

use anyhow::{Context as _, Result};
use chrono::Utc;
use clap::Subcommand;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

use kinoprobe_api::{ApiTestEngine, CaseGroup, CaseRegistry, TestCase, SCENARIOS};
use kinoprobe_common::{HarnessConfig, RecordingReporter, Reporter, ScenarioResult, SuiteReport};

use super::{finish_suite, Context};
use crate::output::{print_list, TableDisplay};

#[derive(Subcommand)]
pub enum ApiCommands {
    /// Run the bound API scenarios
    Run {
        /// Run one dataset case by name instead of the scenario list
        #[arg(long, requires = "group")]
        case: Option<String>,

        /// Restrict to one dataset group (positive, negative)
        #[arg(short, long)]
        group: Option<CaseGroup>,
    },

    /// List the cases in the dataset
    Cases {
        /// Restrict to one dataset group (positive, negative)
        #[arg(short, long)]
        group: Option<CaseGroup>,
    },
}

/// Case display wrapper for serialization
#[derive(Serialize)]
pub struct CaseDisplay {
    pub group: CaseGroup,
    pub name: String,
    pub endpoint: String,
    pub params: String,
    pub api_key_override: bool,
}

impl CaseDisplay {
    fn new(group: CaseGroup, case: &TestCase) -> Self {
        let params = case
            .params
            .iter()
            .flatten()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");
        Self {
            group,
            name: case.name.clone(),
            endpoint: case.endpoint.clone(),
            params,
            api_key_override: case.api_key.as_deref().is_some_and(|k| !k.is_empty()),
        }
    }
}

impl TableDisplay for CaseDisplay {
    fn headers() -> Vec<&'static str> {
        vec!["GROUP", "NAME", "ENDPOINT", "PARAMS", "KEY OVERRIDE"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.group.to_string(),
            self.name.clone(),
            self.endpoint.clone(),
            self.params.clone(),
            if self.api_key_override { "yes" } else { "" }.to_string(),
        ]
    }
}

fn load_registry(ctx: &Context) -> Result<CaseRegistry> {
    CaseRegistry::from_file(&ctx.dataset)
        .with_context(|| format!("Failed to load dataset {}", ctx.dataset.display()))
}

/// Execute an API command; returns whether everything passed
pub async fn execute(cmd: ApiCommands, ctx: &Context) -> Result<bool> {
    match cmd {
        ApiCommands::Cases { group } => {
            let registry = load_registry(ctx)?;
            let groups = match group {
                Some(g) => vec![g],
                None => CaseGroup::ALL.to_vec(),
            };
            let rows: Vec<CaseDisplay> = groups
                .into_iter()
                .flat_map(|g| registry.group(g).iter().map(move |case| CaseDisplay::new(g, case)))
                .collect();
            print_list(&rows, ctx.format);
            Ok(true)
        }
        ApiCommands::Run { case, group } => {
            let config = HarnessConfig::resolve(&ctx.config)
                .with_context(|| format!("Failed to load config {}", ctx.config.display()))?;
            let reporter = Arc::new(RecordingReporter::logged());
            let engine = ApiTestEngine::from_config(&config, load_registry(ctx)?, reporter.clone())?;

            let report = match (case, group) {
                (Some(name), Some(group)) => run_case(&engine, reporter.as_ref(), &name, group).await?,
                (_, group) => {
                    let scenarios: Vec<_> = SCENARIOS
                        .iter()
                        .filter(|s| group.map_or(true, |g| s.group == g))
                        .copied()
                        .collect();
                    engine.run_scenarios(&scenarios).await?
                }
            };

            finish_suite(&report, ctx.format, ctx.output.as_deref())
        }
    }
}

async fn run_case(
    engine: &ApiTestEngine,
    reporter: &dyn Reporter,
    name: &str,
    group: CaseGroup,
) -> Result<SuiteReport> {
    let started_at = Utc::now();
    let start = Instant::now();

    let error = match engine.execute(name, group).await {
        Ok(_) => None,
        Err(e) if e.is_setup_defect() => return Err(e.into()),
        Err(e) => Some(e.to_string()),
    };

    let duration_ms = start.elapsed().as_millis() as u64;
    let result = ScenarioResult {
        name: name.to_string(),
        success: error.is_none(),
        duration_ms,
        error,
        records: reporter.drain(),
    };
    Ok(SuiteReport::new("api", started_at, vec![result], duration_ms))
}
