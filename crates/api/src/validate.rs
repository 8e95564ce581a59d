//! Response classification
//!
//! The target API reports search results in one of several shapes
//! (`docs`, `items`, `total`) and does not document a single form for
//! "nothing found". The checks below accept any of them.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Keys whose presence marks a search-shaped body
pub const RESULT_KEYS: [&str; 3] = ["docs", "items", "total"];

/// A completed HTTP exchange, captured once
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseOutcome {
    pub status: u16,
    pub body: String,
    /// Parsed body, absent when the body is not JSON
    pub parsed: Option<Value>,
}

impl ResponseOutcome {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        let parsed = serde_json::from_str(&body).ok();
        Self { status, body, parsed }
    }

    fn object(&self) -> Option<&serde_json::Map<String, Value>> {
        self.parsed.as_ref().and_then(Value::as_object)
    }

    /// At least one result-bearing key is present, whatever its value
    pub fn has_result_key(&self) -> bool {
        self.object()
            .is_some_and(|obj| RESULT_KEYS.iter().any(|k| obj.contains_key(*k)))
    }

    /// Empty by at least one shape.
    ///
    /// `docs` and `items` only count when present as empty arrays. A missing
    /// `total` reads as 1.
    pub fn is_empty_result(&self) -> bool {
        let Some(obj) = self.object() else {
            return false;
        };

        let empty_array = |key: &str| {
            obj.get(key)
                .and_then(Value::as_array)
                .is_some_and(|a| a.is_empty())
        };
        let total_zero = obj
            .get("total")
            .map_or(1.0, |v| v.as_f64().unwrap_or(1.0))
            == 0.0;

        empty_array("docs") || empty_array("items") || total_zero
    }

    pub fn classify(&self) -> OutcomeClass {
        if self.status != 200 {
            OutcomeClass::Rejected
        } else if self.is_empty_result() {
            OutcomeClass::EmptySuccess
        } else if self.has_result_key() {
            OutcomeClass::Success
        } else {
            OutcomeClass::Unrecognized
        }
    }
}

/// Summary label for a response, used in reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeClass {
    Success,
    EmptySuccess,
    Rejected,
    Unrecognized,
}

impl fmt::Display for OutcomeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            OutcomeClass::Success => "success",
            OutcomeClass::EmptySuccess => "empty-success",
            OutcomeClass::Rejected => "rejected",
            OutcomeClass::Unrecognized => "unrecognized",
        };
        f.write_str(label)
    }
}

/// What a scenario requires of its response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expectation {
    /// 200 with a result-bearing key
    Success,
    /// Non-200, or 200 with an empty result by any shape
    RejectedOrEmpty,
    /// 401 or 403, body ignored
    CredentialRejected,
}

impl Expectation {
    pub fn is_satisfied_by(&self, outcome: &ResponseOutcome) -> bool {
        match self {
            Expectation::Success => outcome.status == 200 && outcome.has_result_key(),
            Expectation::RejectedOrEmpty => outcome.status != 200 || outcome.is_empty_result(),
            Expectation::CredentialRejected => matches!(outcome.status, 401 | 403),
        }
    }
}

impl fmt::Display for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Expectation::Success => "200 with docs/items/total",
            Expectation::RejectedOrEmpty => "non-200 or empty result",
            Expectation::CredentialRejected => "401 or 403",
        };
        f.write_str(label)
    }
}
