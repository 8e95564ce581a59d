//! Case dataset and registry
//!
//! The dataset is a YAML document with two ordered groups, `positive` and
//! `negative`. Each record names one scenario and the request it issues.
//! The registry indexes records by `(group, name)` once at load time so that
//! a lookup either yields exactly one case or a setup defect.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::Path;
use tracing::debug;

use crate::error::{ApiError, ApiResult};

/// Query parameters, passed to the transport verbatim
pub type Params = BTreeMap<String, String>;

/// A named, parameterized request scenario
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    /// Unique within its group
    pub name: String,

    /// Path appended to the configured base URL
    pub endpoint: String,

    #[serde(default, deserialize_with = "scalar_params")]
    pub params: Option<Params>,

    /// Credential override, used to simulate invalid tokens
    #[serde(default)]
    pub api_key: Option<String>,
}

/// Dataset group; decides the default expectation for its cases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseGroup {
    Positive,
    Negative,
}

impl CaseGroup {
    pub const ALL: [CaseGroup; 2] = [CaseGroup::Positive, CaseGroup::Negative];

    pub fn as_str(&self) -> &'static str {
        match self {
            CaseGroup::Positive => "positive",
            CaseGroup::Negative => "negative",
        }
    }
}

impl fmt::Display for CaseGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CaseGroup {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "positive" => Ok(CaseGroup::Positive),
            "negative" => Ok(CaseGroup::Negative),
            other => Err(format!("unknown case group '{other}'")),
        }
    }
}

/// On-disk dataset shape
#[derive(Debug, Clone, Default, Deserialize)]
struct Dataset {
    #[serde(default)]
    positive: Vec<TestCase>,
    #[serde(default)]
    negative: Vec<TestCase>,
}

/// Read-only index of all cases
#[derive(Debug, Clone)]
pub struct CaseRegistry {
    positive: Vec<TestCase>,
    negative: Vec<TestCase>,
    index: HashMap<(CaseGroup, String), usize>,
}

impl CaseRegistry {
    /// Parse a dataset from YAML
    pub fn from_yaml(yaml: &str) -> ApiResult<Self> {
        let dataset: Dataset = serde_yaml::from_str(yaml)?;
        Self::from_groups(dataset.positive, dataset.negative)
    }

    /// Parse a dataset from a YAML file
    pub fn from_file(path: &Path) -> ApiResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ApiError::Dataset(format!("cannot read {}: {}", path.display(), e))
        })?;
        let registry = Self::from_yaml(&content)?;
        debug!(
            "Loaded {} positive and {} negative case(s) from {}",
            registry.positive.len(),
            registry.negative.len(),
            path.display()
        );
        Ok(registry)
    }

    /// Build the registry, rejecting duplicate names within a group
    pub fn from_groups(positive: Vec<TestCase>, negative: Vec<TestCase>) -> ApiResult<Self> {
        let mut index = HashMap::new();

        for (group, cases) in [(CaseGroup::Positive, &positive), (CaseGroup::Negative, &negative)] {
            for (i, case) in cases.iter().enumerate() {
                if case.endpoint.is_empty() {
                    return Err(ApiError::Dataset(format!(
                        "case '{}' in {} group has an empty endpoint",
                        case.name, group
                    )));
                }
                if index.insert((group, case.name.clone()), i).is_some() {
                    return Err(ApiError::DuplicateCase {
                        group,
                        name: case.name.clone(),
                    });
                }
            }
        }

        Ok(Self {
            positive,
            negative,
            index,
        })
    }

    /// Resolve a case by exact name within a group
    pub fn get(&self, group: CaseGroup, name: &str) -> ApiResult<&TestCase> {
        self.index
            .get(&(group, name.to_string()))
            .map(|&i| &self.group(group)[i])
            .ok_or_else(|| ApiError::CaseNotFound {
                group,
                name: name.to_string(),
            })
    }

    /// Cases of a group in dataset order
    pub fn group(&self, group: CaseGroup) -> &[TestCase] {
        match group {
            CaseGroup::Positive => &self.positive,
            CaseGroup::Negative => &self.negative,
        }
    }

    pub fn len(&self) -> usize {
        self.positive.len() + self.negative.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Accept any YAML scalar as a parameter value
fn scalar_params<'de, D>(deserializer: D) -> Result<Option<Params>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let raw: Option<BTreeMap<String, serde_yaml::Value>> = Option::deserialize(deserializer)?;
    let Some(raw) = raw else {
        return Ok(None);
    };

    let mut params = Params::new();
    for (key, value) in raw {
        let value = match value {
            serde_yaml::Value::String(s) => s,
            serde_yaml::Value::Number(n) => n.to_string(),
            serde_yaml::Value::Bool(b) => b.to_string(),
            other => {
                return Err(D::Error::custom(format!(
                    "parameter '{key}' must be a scalar, got {other:?}"
                )))
            }
        };
        params.insert(key, value);
    }
    Ok(Some(params))
}
