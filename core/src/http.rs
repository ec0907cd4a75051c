//! Plain-data HTTP request and response types.
//!
//! # Design
//! The client describes every call as an `HttpRequest` value before anything
//! touches the network, and every transport reports back an `HttpResponse`
//! value. Interceptors operate on these values, and tests can inspect them
//! without a server. The transport is the only place where I/O happens.
//!
//! All fields use owned types so values can move freely between the client,
//! interceptors and the transport.

use std::fmt;
use std::time::Duration;

use serde_json::Value;
use tokio_util::sync::CancellationToken;

/// HTTP verb supported by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// Whether requests with this verb send a payload.
    ///
    /// GET and DELETE never do; their arguments travel in the query string.
    pub fn carries_body(&self) -> bool {
        match self {
            HttpMethod::Get | HttpMethod::Delete => false,
            HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch => true,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An HTTP request described as plain data.
///
/// Built by `ApiClient`, passed through the request interceptor, then handed
/// to a `Transport` for execution.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    /// Fully resolved URL, base URL already applied.
    pub url: String,
    pub headers: Vec<(String, String)>,
    /// Query-string parameters. Pairs built from a query object are sorted
    /// by key.
    pub query: Vec<(String, String)>,
    /// JSON payload. Always `None` for GET and DELETE.
    pub body: Option<Value>,
    /// Effective timeout. `None` leaves the transport default in place.
    pub timeout: Option<Duration>,
    pub cancellation: Option<CancellationToken>,
}

impl HttpRequest {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// The response envelope: status, headers and decoded body.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    /// Decoded body. `Value::Null` for an empty body, `Value::String` for a
    /// body that is not JSON.
    pub data: Value,
}

impl HttpResponse {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}
