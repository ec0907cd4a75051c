//! Request and response interceptors.
//!
//! Each direction has a success hook and a failure hook. The four slots are
//! independent: leaving one empty falls back to identity (success) or
//! propagate-unchanged (failure) for that slot only.

use std::fmt;
use std::sync::Arc;

use crate::error::{ApiError, Response};
use crate::http::{HttpRequest, HttpResponse};

type RequestFulfilled = Arc<dyn Fn(HttpRequest) -> Response<HttpRequest> + Send + Sync>;
type RequestRejected = Arc<dyn Fn(ApiError) -> Response<HttpRequest> + Send + Sync>;
type ResponseFulfilled = Arc<dyn Fn(HttpResponse) -> Response<HttpResponse> + Send + Sync>;
type ResponseRejected = Arc<dyn Fn(ApiError) -> Response<HttpResponse> + Send + Sync>;

/// Interceptor set installed on a client.
///
/// ```
/// use api_client::Interceptors;
///
/// let interceptors = Interceptors::new().on_request(|mut req| {
///     req.headers.push(("x-request-id".to_string(), "42".to_string()));
///     Ok(req)
/// });
/// # let _ = interceptors;
/// ```
#[derive(Clone, Default)]
pub struct Interceptors {
    request_fulfilled: Option<RequestFulfilled>,
    request_rejected: Option<RequestRejected>,
    response_fulfilled: Option<ResponseFulfilled>,
    response_rejected: Option<ResponseRejected>,
}

impl Interceptors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transform an outgoing request.
    pub fn on_request<F>(mut self, f: F) -> Self
    where
        F: Fn(HttpRequest) -> Response<HttpRequest> + Send + Sync + 'static,
    {
        self.request_fulfilled = Some(Arc::new(f));
        self
    }

    /// Handle a failure raised while preparing a request. Returning `Ok`
    /// recovers with a replacement request.
    pub fn on_request_error<F>(mut self, f: F) -> Self
    where
        F: Fn(ApiError) -> Response<HttpRequest> + Send + Sync + 'static,
    {
        self.request_rejected = Some(Arc::new(f));
        self
    }

    /// Transform a successful response.
    pub fn on_response<F>(mut self, f: F) -> Self
    where
        F: Fn(HttpResponse) -> Response<HttpResponse> + Send + Sync + 'static,
    {
        self.response_fulfilled = Some(Arc::new(f));
        self
    }

    /// Handle a failed call. Returning `Ok` recovers with a substitute
    /// response; returning `Err` fails the call with that error.
    pub fn on_response_error<F>(mut self, f: F) -> Self
    where
        F: Fn(ApiError) -> Response<HttpResponse> + Send + Sync + 'static,
    {
        self.response_rejected = Some(Arc::new(f));
        self
    }

    pub(crate) fn request_fulfilled(&self, request: HttpRequest) -> Response<HttpRequest> {
        match &self.request_fulfilled {
            Some(f) => f(request),
            None => Ok(request),
        }
    }

    pub(crate) fn request_rejected(&self, error: ApiError) -> Response<HttpRequest> {
        match &self.request_rejected {
            Some(f) => f(error),
            None => Err(error),
        }
    }

    pub(crate) fn response_fulfilled(&self, response: HttpResponse) -> Response<HttpResponse> {
        match &self.response_fulfilled {
            Some(f) => f(response),
            None => Ok(response),
        }
    }

    pub(crate) fn response_rejected(&self, error: ApiError) -> Response<HttpResponse> {
        match &self.response_rejected {
            Some(f) => f(error),
            None => Err(error),
        }
    }
}

impl fmt::Debug for Interceptors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interceptors")
            .field("request_fulfilled", &self.request_fulfilled.is_some())
            .field("request_rejected", &self.request_rejected.is_some())
            .field("response_fulfilled", &self.response_fulfilled.is_some())
            .field("response_rejected", &self.response_rejected.is_some())
            .finish()
    }
}
