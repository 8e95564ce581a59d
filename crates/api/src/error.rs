//! Error types for API case execution

use thiserror::Error;

use crate::cases::CaseGroup;
use crate::validate::Expectation;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Dataset error: {0}")]
    Dataset(String),

    #[error("Case not found: '{name}' in {group} group")]
    CaseNotFound { group: CaseGroup, name: String },

    #[error("Duplicate case: '{name}' appears more than once in {group} group")]
    DuplicateCase { group: CaseGroup, name: String },

    #[error("Invalid header {name}: {reason}")]
    InvalidHeader { name: String, reason: String },

    #[error("Assertion failed for '{case}': expected {expectation}, got status {status}; body: {body}")]
    AssertionFailed {
        case: String,
        expectation: Expectation,
        status: u16,
        body: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Config error: {0}")]
    Config(#[from] kinoprobe_common::Error),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    /// Dataset defects that abort a run before any request is sent
    pub fn is_setup_defect(&self) -> bool {
        matches!(
            self,
            ApiError::Dataset(_)
                | ApiError::CaseNotFound { .. }
                | ApiError::DuplicateCase { .. }
                | ApiError::Yaml(_)
        )
    }
}
