//! Kinoprobe API runner
//!
//! Maps named cases from a YAML dataset onto HTTP calls against the movie
//! catalog API and checks the responses:
//!
//! ```text
//! CaseRegistry::get(group, name) -> TestCase
//!     -> ApiClient::build(GET, endpoint, params, api_key) -> RequestSpec
//!     -> ApiClient::send(spec) -> ResponseOutcome
//!     -> Expectation::is_satisfied_by(outcome)
//! ```

pub mod cases;
pub mod engine;
pub mod error;
pub mod request;
pub mod validate;

pub use cases::{CaseGroup, CaseRegistry, Params, TestCase};
pub use engine::{ApiTestEngine, CaseReport, Scenario, SCENARIOS};
pub use error::{ApiError, ApiResult};
pub use request::{ApiClient, RequestSpec};
pub use validate::{Expectation, OutcomeClass, ResponseOutcome};
