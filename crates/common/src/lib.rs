//! Kinoprobe Common Library
//!
//! Shared configuration, error types and the reporting sink used by the API
//! and UI harness crates.

pub mod config;
pub mod error;
pub mod report;

// Re-export commonly used types
pub use config::{ApiConfig, HarnessConfig, UiConfig};
pub use error::{Error, Result};
pub use report::{
    AttachmentKind, RecordingReporter, ReportRecord, Reporter, ScenarioResult, SuiteReport,
    TracingReporter,
};

/// Kinoprobe version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default location of the API configuration file
pub fn default_config_path() -> std::path::PathBuf {
    std::path::PathBuf::from("data").join("config.yaml")
}

/// Default location of the case dataset
pub fn default_dataset_path() -> std::path::PathBuf {
    std::path::PathBuf::from("data").join("test_data.yaml")
}
