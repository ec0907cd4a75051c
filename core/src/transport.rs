//! Transport abstraction and the reqwest-backed default.
//!
//! # Design
//! `ApiClient` never performs I/O itself. A `Transport` receives a fully
//! prepared `HttpRequest` and owns everything below it: connection reuse,
//! TLS, redirects, timeouts, cancellation and body decoding. Swapping the
//! transport (for a recording fake in tests, or another HTTP library) leaves
//! the client untouched.

use std::fmt;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::error::{ApiError, Response};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Executes prepared requests.
#[async_trait]
pub trait Transport: Send + Sync + fmt::Debug {
    /// Perform the exchange for `request` and return the decoded envelope.
    ///
    /// Non-success statuses, timeouts and cancellation are reported as
    /// errors according to the transport's own policy.
    async fn execute(&self, request: HttpRequest) -> Response<HttpResponse>;
}

/// Default transport built on `reqwest::Client`.
///
/// Treats any non-2xx status as `ApiError::Status`.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    inner: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Response<Self> {
        let inner = reqwest::Client::builder().build().map_err(ApiError::from)?;
        Ok(Self { inner })
    }

    pub fn from_reqwest(client: reqwest::Client) -> Self {
        Self { inner: client }
    }

    /// The underlying reqwest client.
    pub fn inner(&self) -> &reqwest::Client {
        &self.inner
    }

    async fn send(&self, request: HttpRequest) -> Response<HttpResponse> {
        let mut builder = self.inner.request(to_reqwest_method(request.method), &request.url);

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let text = response.text().await?;
        debug!(status, bytes = text.len(), "received response");

        let envelope = HttpResponse {
            status,
            headers,
            data: decode_body(&text),
        };
        if !envelope.is_success() {
            return Err(ApiError::Status { status, body: text });
        }
        Ok(envelope)
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Response<HttpResponse> {
        match request.cancellation.clone() {
            Some(token) => {
                if token.is_cancelled() {
                    return Err(ApiError::Cancelled);
                }
                tokio::select! {
                    _ = token.cancelled() => Err(ApiError::Cancelled),
                    result = self.send(request) => result,
                }
            }
            None => self.send(request).await,
        }
    }
}

fn to_reqwest_method(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Put => reqwest::Method::PUT,
        HttpMethod::Patch => reqwest::Method::PATCH,
        HttpMethod::Delete => reqwest::Method::DELETE,
    }
}

/// Empty bodies decode to `Null`; bodies that are not JSON are kept as text.
pub(crate) fn decode_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn decode_empty_body_is_null() {
        assert_eq!(decode_body(""), Value::Null);
        assert_eq!(decode_body("  \n"), Value::Null);
    }

    #[test]
    fn decode_json_body() {
        assert_eq!(
            decode_body(r#"{"id":1,"title":"x"}"#),
            json!({"id": 1, "title": "x"})
        );
    }

    #[test]
    fn decode_non_json_body_keeps_text() {
        assert_eq!(decode_body("plain text"), json!("plain text"));
    }

    #[test]
    fn methods_map_to_reqwest() {
        assert_eq!(to_reqwest_method(HttpMethod::Patch), reqwest::Method::PATCH);
        assert_eq!(to_reqwest_method(HttpMethod::Delete), reqwest::Method::DELETE);
    }

    #[test]
    fn transport_builds() {
        let transport = ReqwestTransport::new();
        assert!(transport.is_ok());
    }
}
