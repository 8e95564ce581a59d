//! Request construction and dispatch

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

use kinoprobe_common::{ApiConfig, AttachmentKind, Reporter};

use crate::cases::Params;
use crate::error::{ApiError, ApiResult};
use crate::validate::ResponseOutcome;

pub const CONTENT_TYPE: &str = "Content-Type";
pub const API_KEY_HEADER: &str = "X-API-KEY";

/// A fully resolved request, ready to send
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSpec {
    pub method: Method,
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub params: Params,
}

/// HTTP client bound to one base configuration
pub struct ApiClient {
    http: reqwest::Client,
    config: ApiConfig,
    reporter: Arc<dyn Reporter>,
}

impl ApiClient {
    pub fn new(config: ApiConfig, reporter: Arc<dyn Reporter>) -> ApiResult<Self> {
        let http = reqwest::Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            http,
            config,
            reporter,
        })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Resolve a request against the base configuration.
    ///
    /// An empty `api_key` override falls back to the configured key, so the
    /// credential header is always present.
    pub fn build(
        &self,
        method: Method,
        endpoint: &str,
        params: Option<&Params>,
        api_key: Option<&str>,
    ) -> RequestSpec {
        let key = api_key
            .filter(|k| !k.is_empty())
            .unwrap_or(&self.config.api_key);

        let mut headers = BTreeMap::new();
        headers.insert(CONTENT_TYPE.to_string(), "application/json".to_string());
        headers.insert(API_KEY_HEADER.to_string(), key.to_string());

        RequestSpec {
            method,
            url: format!("{}{}", self.config.base_url, endpoint),
            headers,
            params: params.cloned().unwrap_or_default(),
        }
    }

    /// Send a request once. The trace is recorded before dispatch.
    pub async fn send(&self, spec: &RequestSpec) -> ApiResult<ResponseOutcome> {
        self.trace(spec);

        let mut headers = HeaderMap::new();
        for (name, value) in &spec.headers {
            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                ApiError::InvalidHeader {
                    name: name.clone(),
                    reason: e.to_string(),
                }
            })?;
            let header_value = HeaderValue::from_str(value).map_err(|e| ApiError::InvalidHeader {
                name: name.clone(),
                reason: e.to_string(),
            })?;
            headers.insert(header_name, header_value);
        }

        let response = self
            .http
            .request(spec.method.clone(), &spec.url)
            .headers(headers)
            .query(&spec.params)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        debug!("{} {} -> {}", spec.method, spec.url, status);

        Ok(ResponseOutcome::new(status, body))
    }

    /// Build and send in one step
    pub async fn request(
        &self,
        method: Method,
        endpoint: &str,
        params: Option<&Params>,
        api_key: Option<&str>,
    ) -> ApiResult<ResponseOutcome> {
        let spec = self.build(method, endpoint, params, api_key);
        self.send(&spec).await
    }

    fn trace(&self, spec: &RequestSpec) {
        info!(
            method = %spec.method,
            url = %spec.url,
            params = ?spec.params,
            "sending request"
        );

        self.reporter.step(&format!("{} {}", spec.method, spec.url));
        self.reporter
            .attach("Request URL", AttachmentKind::UriList, &spec.url);
        self.reporter.attach(
            "Request Headers",
            AttachmentKind::Text,
            &format!("{:?}", masked_headers(&spec.headers)),
        );
        self.reporter
            .attach("Request Params", AttachmentKind::Text, &format!("{:?}", spec.params));
    }
}

/// Headers with the credential replaced by a mask
fn masked_headers(headers: &BTreeMap<String, String>) -> BTreeMap<&str, String> {
    headers
        .iter()
        .map(|(name, value)| {
            let shown = if name.eq_ignore_ascii_case(API_KEY_HEADER) {
                mask_secret(value)
            } else {
                value.clone()
            };
            (name.as_str(), shown)
        })
        .collect()
}

/// Keep the last four characters of long secrets, nothing of short ones
fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{tail}")
}
