//! Diagnostics sink and suite results
//!
//! Engines call into a [`Reporter`] at fixed points (request built, response
//! received, page step entered). The reporter owns no storage contract:
//! [`TracingReporter`] turns records into log events, [`RecordingReporter`]
//! keeps them in memory so they can be asserted on or written out with the
//! suite results.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::Result;

/// Content type of an attachment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttachmentKind {
    Text,
    Json,
    UriList,
}

/// A single diagnostics record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "record", rename_all = "snake_case")]
pub enum ReportRecord {
    Step {
        title: String,
    },
    Attachment {
        name: String,
        kind: AttachmentKind,
        body: String,
    },
}

/// Receiver for step and attachment records
pub trait Reporter: Send + Sync {
    /// Mark the start of a named step
    fn step(&self, title: &str);

    /// Attach evidence to the current step
    fn attach(&self, name: &str, kind: AttachmentKind, body: &str);

    /// Hand over the records kept since the last drain.
    ///
    /// Runners call this after each scenario to fill
    /// [`ScenarioResult::records`]. Reporters that keep nothing return an
    /// empty list.
    fn drain(&self) -> Vec<ReportRecord> {
        Vec::new()
    }
}

/// Reporter that emits every record as a structured log event
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn step(&self, title: &str) {
        info!(step = title, "step");
    }

    fn attach(&self, name: &str, kind: AttachmentKind, body: &str) {
        info!(attachment = name, kind = ?kind, body = body, "attachment");
    }
}

/// Reporter that keeps records in memory
#[derive(Debug, Default)]
pub struct RecordingReporter {
    records: Mutex<Vec<ReportRecord>>,
    log: bool,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep records and also emit them through [`TracingReporter`]
    pub fn logged() -> Self {
        Self {
            records: Mutex::default(),
            log: true,
        }
    }

    pub fn records(&self) -> Vec<ReportRecord> {
        self.records.lock().clone()
    }

    /// Drain the records collected so far
    pub fn take(&self) -> Vec<ReportRecord> {
        std::mem::take(&mut *self.records.lock())
    }

    /// Body of the most recent attachment with this name
    pub fn attachment(&self, name: &str) -> Option<String> {
        self.records.lock().iter().rev().find_map(|r| match r {
            ReportRecord::Attachment { name: n, body, .. } if n == name => Some(body.clone()),
            _ => None,
        })
    }

    pub fn steps(&self) -> Vec<String> {
        self.records
            .lock()
            .iter()
            .filter_map(|r| match r {
                ReportRecord::Step { title } => Some(title.clone()),
                _ => None,
            })
            .collect()
    }
}

impl Reporter for RecordingReporter {
    fn step(&self, title: &str) {
        if self.log {
            TracingReporter.step(title);
        }
        self.records.lock().push(ReportRecord::Step {
            title: title.to_string(),
        });
    }

    fn attach(&self, name: &str, kind: AttachmentKind, body: &str) {
        if self.log {
            TracingReporter.attach(name, kind, body);
        }
        self.records.lock().push(ReportRecord::Attachment {
            name: name.to_string(),
            kind,
            body: body.to_string(),
        });
    }

    fn drain(&self) -> Vec<ReportRecord> {
        self.take()
    }
}

/// Result of running a single scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub name: String,
    pub success: bool,
    pub duration_ms: u64,
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub records: Vec<ReportRecord>,
}

/// Result of running a suite of scenarios
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteReport {
    pub suite: String,
    pub started_at: DateTime<Utc>,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub duration_ms: u64,
    pub results: Vec<ScenarioResult>,
}

impl SuiteReport {
    pub fn new(suite: &str, started_at: DateTime<Utc>, results: Vec<ScenarioResult>, duration_ms: u64) -> Self {
        let passed = results.iter().filter(|r| r.success).count();
        Self {
            suite: suite.to_string(),
            started_at,
            total: results.len(),
            passed,
            failed: results.len() - passed,
            duration_ms,
            results,
        }
    }

    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Write the report as pretty JSON into `output_dir`
    pub fn write_json(&self, output_dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(output_dir)?;

        let path = output_dir.join(format!("{}-results.json", self.suite));
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, json)?;

        info!("Results written to: {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(name: &str, success: bool) -> ScenarioResult {
        ScenarioResult {
            name: name.to_string(),
            success,
            duration_ms: 5,
            error: (!success).then(|| "boom".to_string()),
            records: vec![],
        }
    }

    #[test]
    fn test_recording_reporter_keeps_order() {
        let reporter = RecordingReporter::new();
        reporter.step("send");
        reporter.attach("Status Code", AttachmentKind::Text, "200");
        reporter.attach("Status Code", AttachmentKind::Text, "404");

        assert_eq!(reporter.steps(), vec!["send".to_string()]);
        assert_eq!(reporter.attachment("Status Code").as_deref(), Some("404"));
        assert_eq!(reporter.records().len(), 3);

        let drained = reporter.take();
        assert_eq!(drained.len(), 3);
        assert!(reporter.records().is_empty());
    }

    #[test]
    fn test_drain_hands_over_records_once() {
        let recording: &dyn Reporter = &RecordingReporter::logged();
        recording.step("Open main page");
        recording.attach("Response Body", AttachmentKind::Json, "{}");
        assert_eq!(recording.drain().len(), 2);
        assert!(recording.drain().is_empty());

        let tracing: &dyn Reporter = &TracingReporter;
        tracing.step("Open main page");
        assert!(tracing.drain().is_empty());
    }

    #[test]
    fn test_records_land_in_results_json() {
        let dir = tempfile::tempdir().unwrap();
        let mut failed = result("b", false);
        failed.records = vec![ReportRecord::Attachment {
            name: "Response Body".to_string(),
            kind: AttachmentKind::Json,
            body: r#"{"films":[]}"#.to_string(),
        }];
        let report = SuiteReport::new("api", Utc::now(), vec![failed], 1);
        let path = report.write_json(dir.path()).unwrap();

        let parsed: SuiteReport = serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(parsed.results[0].records, report.results[0].records);
    }

    #[test]
    fn test_suite_counts() {
        let report = SuiteReport::new("api", Utc::now(), vec![result("a", true), result("b", false)], 10);
        assert_eq!(report.total, 2);
        assert_eq!(report.passed, 1);
        assert_eq!(report.failed, 1);
        assert!(!report.is_success());
    }

    #[test]
    fn test_write_json() {
        let dir = tempfile::tempdir().unwrap();
        let report = SuiteReport::new("ui", Utc::now(), vec![result("a", true)], 1);
        let path = report.write_json(dir.path()).unwrap();

        let parsed: SuiteReport = serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(parsed.suite, "ui");
        assert!(parsed.is_success());
    }
}
