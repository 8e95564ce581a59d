//! CLI Commands

pub mod api;
pub mod ui;

use anyhow::Result;
use std::path::{Path, PathBuf};

use kinoprobe_common::SuiteReport;

use crate::output::{print_suite, OutputFormat};

/// Print a finished suite, persist it when asked, and report success
pub fn finish_suite(report: &SuiteReport, format: OutputFormat, output_dir: Option<&Path>) -> Result<bool> {
    print_suite(report, format);
    if let Some(dir) = output_dir {
        report.write_json(dir)?;
    }
    Ok(report.is_success())
}

/// Settings shared by every subcommand
pub struct Context {
    pub config: PathBuf,
    pub dataset: PathBuf,
    pub format: OutputFormat,
    pub output: Option<PathBuf>,
}
