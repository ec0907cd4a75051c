//! Construction-time client configuration.
//!
//! # Design
//! Defaults are `const` items rather than global state: a `ClientConfig` is
//! assembled once, consumed by `ApiClient::new`, and never mutated again.
//! The data fields deserialize with serde so a config can be loaded from a
//! JSON file; interceptors are code-only and always start at their defaults.

use std::time::Duration;

use serde::{Deserialize, Deserializer};

use crate::interceptor::Interceptors;

/// Base URL used when the caller does not supply one.
pub const DEFAULT_BASE_URL: &str = "https://jsonplaceholder.typicode.com/";

/// Headers every client sends unless the caller overrides them.
pub const DEFAULT_HEADERS: &[(&str, &str)] = &[("accept", "application/json")];

/// Configuration for `ApiClient`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    /// Caller headers, merged over `DEFAULT_HEADERS`.
    pub headers: Vec<(String, String)>,
    #[serde(skip)]
    pub interceptors: Interceptors,
    #[serde(rename = "timeout_ms", deserialize_with = "deserialize_millis")]
    pub timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            headers: Vec::new(),
            interceptors: Interceptors::default(),
            timeout: None,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_interceptors(mut self, interceptors: Interceptors) -> Self {
        self.interceptors = interceptors;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Overlay `overrides` on `defaults`. Names compare case-insensitively and the
/// override wins; the default's position in the list is kept.
pub fn merge_headers(
    defaults: &[(&str, &str)],
    overrides: &[(String, String)],
) -> Vec<(String, String)> {
    let mut merged: Vec<(String, String)> = defaults
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    for (name, value) in overrides {
        match merged.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(name)) {
            Some(slot) => *slot = (name.clone(), value.clone()),
            None => merged.push((name.clone(), value.clone())),
        }
    }
    merged
}

/// Zero means "not provided": the transport keeps its own default.
pub(crate) fn effective_timeout(timeout: Option<Duration>) -> Option<Duration> {
    timeout.filter(|t| !t.is_zero())
}

fn deserialize_millis<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    let millis: Option<u64> = Option::deserialize(deserializer)?;
    Ok(millis.map(Duration::from_millis))
}
