//! Error types for UI testing

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum E2eError {
    #[error("Browser failed to launch: {0}")]
    Launch(String),

    #[error("Navigation to '{url}' failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("Script execution failed: {0}")]
    Script(String),

    #[error("Input dispatch failed: {0}")]
    Input(String),

    #[error("Timeout waiting for {condition} after {timeout:?}")]
    WaitTimeout { condition: String, timeout: Duration },

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Assertion failed: {0}")]
    AssertionFailed(String),

    #[error("Browser session is already closed")]
    SessionClosed,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CDP error: {0}")]
    Cdp(#[from] chromiumoxide::error::CdpError),
}

impl E2eError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, E2eError::WaitTimeout { .. })
    }
}

pub type E2eResult<T> = Result<T, E2eError>;

/// Fail with an [`E2eError::AssertionFailed`] unless `cond` holds
#[macro_export]
macro_rules! ensure_ui {
    ($cond:expr, $($arg:tt)+) => {
        if !$cond {
            return Err($crate::error::E2eError::AssertionFailed(format!($($arg)+)));
        }
    };
}
