//! UI Commands

use anyhow::{Context as _, Result};
use clap::Subcommand;
use std::sync::Arc;

use kinoprobe_common::{HarnessConfig, RecordingReporter};
use kinoprobe_e2e::{UiRunner, UiScenario};

use super::{finish_suite, Context};

#[derive(Subcommand)]
pub enum UiCommands {
    /// Run UI scenarios in a fresh browser each
    Run {
        /// Scenario to run (repeatable); all when omitted
        #[arg(short, long)]
        scenario: Vec<UiScenario>,

        /// Show the browser window
        #[arg(long)]
        headed: bool,

        /// Chrome executable
        #[arg(long, env = "CHROME_PATH")]
        chrome: Option<String>,
    },
}

/// Execute a UI command; returns whether everything passed
pub async fn execute(cmd: UiCommands, ctx: &Context) -> Result<bool> {
    match cmd {
        UiCommands::Run {
            scenario,
            headed,
            chrome,
        } => {
            let mut config = HarnessConfig::resolve(&ctx.config)
                .with_context(|| format!("Failed to load config {}", ctx.config.display()))?
                .ui;
            if headed {
                config.headless = false;
            }
            if chrome.is_some() {
                config.chrome_path = chrome;
            }

            let scenarios = if scenario.is_empty() {
                UiScenario::ALL.to_vec()
            } else {
                scenario
            };

            let runner = UiRunner::new(config, Arc::new(RecordingReporter::logged()));
            let report = runner.run_scenarios(&scenarios).await;
            finish_suite(&report, ctx.format, ctx.output.as_deref())
        }
    }
}
