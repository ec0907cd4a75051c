//! Configurable REST client facade.
//!
//! # Overview
//! `create_client` binds a base URL, default headers, an optional timeout and
//! a request/response interceptor pair to a transport, and returns an
//! `ApiClient` with one method per HTTP verb. Plain verb methods resolve to
//! the full `HttpResponse`; the `*_json` variants resolve to the decoded body.
//!
//! # Design
//! - `ApiClient` is stateless between calls; it holds only its configuration.
//! - Each call is first described as an `HttpRequest` value, then executed by
//!   a `Transport`. The default transport is reqwest; tests substitute their
//!   own.
//! - GET and DELETE put their arguments in the query string and never send a
//!   body. POST, PUT and PATCH send a JSON body and still attach any query.
//! - Errors are propagated untouched. Only a caller-installed interceptor can
//!   recover or replace them.
//!
//! ```no_run
//! use api_client::{create_client, ClientConfig, RequestOptions};
//! use serde_json::{json, Value};
//!
//! # async fn demo() -> Result<(), api_client::ApiError> {
//! let client = create_client(ClientConfig::new("https://api.example.com/"), None)?;
//! let comments: Value = client
//!     .get_json("/comments", Some(&json!({"postId": 1})), RequestOptions::new())
//!     .await?;
//! # let _ = comments;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod interceptor;
pub mod transport;

pub use client::{create_client, ApiClient, RequestOptions, NO_QUERY};
pub use config::{ClientConfig, DEFAULT_BASE_URL, DEFAULT_HEADERS};
pub use error::{ApiError, Response};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use interceptor::Interceptors;
pub use transport::{ReqwestTransport, Transport};
pub use tokio_util::sync::CancellationToken;
