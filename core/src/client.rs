//! Configured client and its verb methods.
//!
//! # Design
//! `ApiClient` holds only what it was configured with: base URL, merged
//! headers, timeout, interceptors and a shared transport. It carries no
//! per-request state, so one instance can serve any number of concurrent
//! calls.
//!
//! Every verb funnels into one pipeline: build an `HttpRequest`, run the
//! request interceptor, hand the request to the transport, run the response
//! interceptor. Which arguments become the payload and which become the
//! query string is decided by `HttpMethod::carries_body`.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::{effective_timeout, merge_headers, ClientConfig, DEFAULT_HEADERS};
use crate::error::{ApiError, Response};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::interceptor::Interceptors;
use crate::transport::{ReqwestTransport, Transport};

/// Typed "no query" argument for the verb methods.
pub const NO_QUERY: Option<&'static ()> = None;

/// Per-call options: cancellation and a timeout override.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub cancellation: Option<CancellationToken>,
    /// Overrides the client timeout for this call only. Zero is ignored.
    pub timeout: Option<Duration>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Build a client over the default reqwest transport.
///
/// `timeout`, when given and non-zero, takes precedence over
/// `config.timeout`.
pub fn create_client(config: ClientConfig, timeout: Option<Duration>) -> Response<ApiClient> {
    ApiClient::new(config, timeout)
}

/// HTTP client bound to a base URL, default headers and interceptors.
///
/// The plain verb methods resolve to the full `HttpResponse`; the `*_json`
/// variants resolve to the decoded body only.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    headers: Vec<(String, String)>,
    timeout: Option<Duration>,
    interceptors: Interceptors,
    transport: Arc<dyn Transport>,
}

impl ApiClient {
    pub fn new(config: ClientConfig, timeout: Option<Duration>) -> Response<Self> {
        let transport = ReqwestTransport::new()?;
        Ok(Self::with_transport(config, timeout, Arc::new(transport)))
    }

    pub fn with_transport(
        config: ClientConfig,
        timeout: Option<Duration>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        let timeout = effective_timeout(timeout).or_else(|| effective_timeout(config.timeout));
        Self {
            base_url: config.base_url,
            headers: merge_headers(DEFAULT_HEADERS, &config.headers),
            timeout,
            interceptors: config.interceptors,
            transport,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Effective default headers after merging caller headers.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// The transport this client dispatches through.
    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    pub async fn get<Q>(
        &self,
        path: &str,
        query: Option<&Q>,
        options: RequestOptions,
    ) -> Response<HttpResponse>
    where
        Q: Serialize + ?Sized,
    {
        self.dispatch(HttpMethod::Get, path, Ok(None), to_query(query), options)
            .await
    }

    pub async fn post<B, Q>(
        &self,
        path: &str,
        body: &B,
        query: Option<&Q>,
        options: RequestOptions,
    ) -> Response<HttpResponse>
    where
        B: Serialize + ?Sized,
        Q: Serialize + ?Sized,
    {
        self.dispatch(HttpMethod::Post, path, to_body(body), to_query(query), options)
            .await
    }

    pub async fn put<B, Q>(
        &self,
        path: &str,
        body: &B,
        query: Option<&Q>,
        options: RequestOptions,
    ) -> Response<HttpResponse>
    where
        B: Serialize + ?Sized,
        Q: Serialize + ?Sized,
    {
        self.dispatch(HttpMethod::Put, path, to_body(body), to_query(query), options)
            .await
    }

    pub async fn patch<B, Q>(
        &self,
        path: &str,
        body: &B,
        query: Option<&Q>,
        options: RequestOptions,
    ) -> Response<HttpResponse>
    where
        B: Serialize + ?Sized,
        Q: Serialize + ?Sized,
    {
        self.dispatch(HttpMethod::Patch, path, to_body(body), to_query(query), options)
            .await
    }

    pub async fn del<Q>(
        &self,
        path: &str,
        query: Option<&Q>,
        options: RequestOptions,
    ) -> Response<HttpResponse>
    where
        Q: Serialize + ?Sized,
    {
        self.dispatch(HttpMethod::Delete, path, Ok(None), to_query(query), options)
            .await
    }

    pub async fn get_json<Q, R>(
        &self,
        path: &str,
        query: Option<&Q>,
        options: RequestOptions,
    ) -> Response<R>
    where
        Q: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        from_data(self.get(path, query, options).await?)
    }

    pub async fn post_json<B, Q, R>(
        &self,
        path: &str,
        body: &B,
        query: Option<&Q>,
        options: RequestOptions,
    ) -> Response<R>
    where
        B: Serialize + ?Sized,
        Q: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        from_data(self.post(path, body, query, options).await?)
    }

    pub async fn put_json<B, Q, R>(
        &self,
        path: &str,
        body: &B,
        query: Option<&Q>,
        options: RequestOptions,
    ) -> Response<R>
    where
        B: Serialize + ?Sized,
        Q: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        from_data(self.put(path, body, query, options).await?)
    }

    pub async fn patch_json<B, Q, R>(
        &self,
        path: &str,
        body: &B,
        query: Option<&Q>,
        options: RequestOptions,
    ) -> Response<R>
    where
        B: Serialize + ?Sized,
        Q: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        from_data(self.patch(path, body, query, options).await?)
    }

    pub async fn del_json<Q, R>(
        &self,
        path: &str,
        query: Option<&Q>,
        options: RequestOptions,
    ) -> Response<R>
    where
        Q: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        from_data(self.del(path, query, options).await?)
    }

    /// Issue a request with an explicit verb. `body` is ignored for GET and
    /// DELETE.
    pub async fn request<Q>(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&Value>,
        query: Option<&Q>,
        options: RequestOptions,
    ) -> Response<HttpResponse>
    where
        Q: Serialize + ?Sized,
    {
        self.dispatch(method, path, Ok(body.cloned()), to_query(query), options)
            .await
    }

    /// Describe a call as an `HttpRequest` without running interceptors or
    /// touching the network.
    pub fn build_request<Q>(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&Value>,
        query: Option<&Q>,
        options: RequestOptions,
    ) -> Response<HttpRequest>
    where
        Q: Serialize + ?Sized,
    {
        self.prepare(method, path, Ok(body.cloned()), to_query(query), options)
    }

    async fn dispatch(
        &self,
        method: HttpMethod,
        path: &str,
        body: Response<Option<Value>>,
        query: Response<Option<Value>>,
        options: RequestOptions,
    ) -> Response<HttpResponse> {
        let prepared = match self.prepare(method, path, body, query, options) {
            Ok(request) => self.interceptors.request_fulfilled(request),
            Err(err) => self.interceptors.request_rejected(err),
        };

        let outcome = match prepared {
            Ok(request) => {
                debug!(
                    method = %request.method,
                    url = %request.url,
                    query = request.query.len(),
                    timeout_ms = request.timeout.map(|t| t.as_millis() as u64),
                    "dispatching request"
                );
                self.transport.execute(request).await
            }
            Err(err) => Err(err),
        };

        match outcome {
            Ok(response) => self.interceptors.response_fulfilled(response),
            Err(err) => {
                warn!(%method, path, error = %err, "request failed");
                self.interceptors.response_rejected(err)
            }
        }
    }

    fn prepare(
        &self,
        method: HttpMethod,
        path: &str,
        body: Response<Option<Value>>,
        query: Response<Option<Value>>,
        options: RequestOptions,
    ) -> Response<HttpRequest> {
        let query = match query? {
            Some(q) => query_pairs(&q)?,
            None => Vec::new(),
        };
        let mut headers = self.headers.clone();

        let body = if method.carries_body() {
            let body = body?;
            if body.is_some()
                && !headers
                    .iter()
                    .any(|(k, _)| k.eq_ignore_ascii_case("content-type"))
            {
                headers.push(("content-type".to_string(), "application/json".to_string()));
            }
            body
        } else {
            None
        };

        Ok(HttpRequest {
            method,
            url: resolve_url(&self.base_url, path),
            headers,
            query,
            body,
            timeout: effective_timeout(options.timeout).or(self.timeout),
            cancellation: options.cancellation,
        })
    }
}

fn to_body<B: Serialize + ?Sized>(body: &B) -> Response<Option<Value>> {
    serde_json::to_value(body)
        .map(Some)
        .map_err(|e| ApiError::Serialization(e.to_string()))
}

fn to_query<Q: Serialize + ?Sized>(query: Option<&Q>) -> Response<Option<Value>> {
    query
        .map(serde_json::to_value)
        .transpose()
        .map_err(|e| ApiError::Serialization(e.to_string()))
}

fn from_data<R: DeserializeOwned>(response: HttpResponse) -> Response<R> {
    serde_json::from_value(response.data).map_err(|e| ApiError::Deserialization(e.to_string()))
}

/// Flatten a query object into URL-encoded pairs. `null` entries are dropped.
fn query_pairs(query: &Value) -> Response<Vec<(String, String)>> {
    let object = match query {
        Value::Null => return Ok(Vec::new()),
        Value::Object(object) => object,
        other => {
            return Err(ApiError::Serialization(format!(
                "query must be an object, got {other}"
            )))
        }
    };

    let filtered: Map<String, Value> = object
        .iter()
        .filter(|(_, v)| !v.is_null())
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    let encoded =
        serde_urlencoded::to_string(&filtered).map_err(|e| ApiError::Serialization(e.to_string()))?;
    serde_urlencoded::from_str(&encoded).map_err(|e| ApiError::Serialization(e.to_string()))
}

/// Join `path` onto `base` with exactly one slash. Absolute URLs bypass the
/// base.
fn resolve_url(base: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    if path.is_empty() {
        return base.to_string();
    }
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
