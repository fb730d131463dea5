//! HTTP transport for Tastypie API communication.
//!
//! This module provides the HTTP layer the resource model is built on. It
//! handles request construction, authentication headers, retry logic and
//! tolerant JSON decoding of responses.
//!
//! # Overview
//!
//! The main types in this module are:
//!
//! - [`HttpClient`]: The async HTTP client for API communication
//! - [`HttpRequest`]: A request to be sent to the API
//! - [`HttpResponse`]: A parsed response from the API
//! - [`HttpMethod`]: Supported HTTP methods (GET, POST, PATCH, DELETE)
//! - [`HttpError`]: Unified error type for transport failures
//!
//! # Example
//!
//! ```rust,ignore
//! use tastypie_client::{ApiConfig, ServiceUrl};
//! use tastypie_client::clients::{HttpClient, HttpRequest, HttpMethod};
//!
//! let config = ApiConfig::builder()
//!     .service_url(ServiceUrl::new("http://127.0.0.1:8000/api/v1/")?)
//!     .build()?;
//! let client = HttpClient::new(&config)?;
//!
//! let request = HttpRequest::builder(HttpMethod::Get, "/api/v1/mailing/schema/")
//!     .build()?;
//!
//! let response = client.request(request).await?;
//! ```
//!
//! # Retry Behavior
//!
//! The client implements automatic retry logic for transient failures:
//!
//! - **429 (Rate Limited)**: Retries using `Retry-After` header value, or 1 second if not present
//! - **500 (Server Error)**: Retries with fixed 1-second delay
//! - **Other errors (4xx)**: Returns immediately without retry
//!
//! The default `tries` is 1, meaning no automatic retries. Configure it on
//! [`ApiConfig`](crate::ApiConfig) or per request with `.tries(n)`.

mod errors;
mod http_client;
mod http_request;
mod http_response;

pub use errors::{
    HttpError, HttpResponseError, InvalidHttpRequestError, MaxHttpRetriesExceededError,
};
pub use http_client::{HttpClient, RETRY_WAIT_TIME, SDK_VERSION};
pub use http_request::{HttpMethod, HttpRequest, HttpRequestBuilder};
pub use http_response::HttpResponse;
