//! Output formatting for CLI

use clap::ValueEnum;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

use kinoprobe_common::SuiteReport;

/// Output format
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
    /// Plain text format
    Plain,
}

/// Trait for items that can be displayed in a table
pub trait TableDisplay {
    fn headers() -> Vec<&'static str>;
    fn row(&self) -> Vec<String>;
}

fn new_table(headers: Vec<&'static str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(headers);
    table
}

fn serialized<T: Serialize + ?Sized>(value: &T, format: OutputFormat) -> Option<String> {
    match format {
        OutputFormat::Json => Some(serde_json::to_string_pretty(value).unwrap_or_default()),
        OutputFormat::Yaml => Some(serde_yaml::to_string(value).unwrap_or_default()),
        OutputFormat::Table | OutputFormat::Plain => None,
    }
}

/// Print a list of items
pub fn print_list<T: Serialize + TableDisplay>(items: &[T], format: OutputFormat) {
    if let Some(text) = serialized(items, format) {
        println!("{text}");
        return;
    }

    if items.is_empty() {
        println!("No items found.");
        return;
    }

    match format {
        OutputFormat::Plain => {
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    println!("---");
                }
                for (header, value) in T::headers().iter().zip(item.row()) {
                    println!("{}: {}", header, value);
                }
            }
        }
        _ => {
            let mut table = new_table(T::headers());
            for item in items {
                table.add_row(item.row());
            }
            println!("{table}");
        }
    }
}

/// Print suite results followed by a one-line summary
pub fn print_suite(report: &SuiteReport, format: OutputFormat) {
    if let Some(text) = serialized(report, format) {
        println!("{text}");
        return;
    }

    match format {
        OutputFormat::Plain => {
            for result in &report.results {
                let status = if result.success { "PASS" } else { "FAIL" };
                println!("{} {} ({} ms)", status, result.name, result.duration_ms);
                if let Some(error) = &result.error {
                    println!("    {}", error);
                }
            }
        }
        _ => {
            let mut table = new_table(vec!["SCENARIO", "RESULT", "DURATION", "ERROR"]);
            for result in &report.results {
                let status = if result.success {
                    "PASS".green().to_string()
                } else {
                    "FAIL".red().bold().to_string()
                };
                table.add_row(vec![
                    result.name.clone(),
                    status,
                    format!("{} ms", result.duration_ms),
                    result.error.clone().unwrap_or_default(),
                ]);
            }
            println!("{table}");
        }
    }

    let summary = summary_line(report);
    if report.is_success() {
        print_success(&summary);
    } else {
        print_error(&summary);
    }
}

fn summary_line(report: &SuiteReport) -> String {
    format!(
        "{} suite: {} passed, {} failed of {} ({} ms)",
        report.suite, report.passed, report.failed, report.total, report.duration_ms
    )
}

/// Print success message
pub fn print_success(message: &str) {
    println!("✅ {}", message);
}

/// Print error message
pub fn print_error(message: &str) {
    eprintln!("❌ {}", message);
}
