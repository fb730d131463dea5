//! HTTP client for Tastypie API communication.
//!
//! This module provides the [`HttpClient`] type for making authenticated
//! requests to a Tastypie API with automatic retry handling.

use std::collections::HashMap;
use std::time::Duration;

use crate::clients::errors::{HttpError, HttpResponseError, MaxHttpRetriesExceededError};
use crate::clients::http_request::{HttpMethod, HttpRequest};
use crate::clients::http_response::HttpResponse;
use crate::config::ApiConfig;

/// Fixed retry wait time in seconds.
pub const RETRY_WAIT_TIME: u64 = 1;

/// Crate version from Cargo.toml.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// HTTP client for making requests to a Tastypie API.
///
/// The client handles:
/// - URL construction from the service origin
/// - Default headers including User-Agent and `Authorization`
/// - Automatic retry logic for 429 and 500 responses
/// - JSON body decoding, tolerating empty and non-JSON bodies
///
/// Any non-2xx response is returned as [`HttpError::Response`]; callers
/// decide which 2xx codes they accept.
///
/// # Thread Safety
///
/// `HttpClient` is `Send + Sync`, making it safe to share across async tasks.
///
/// # Example
///
/// ```rust,ignore
/// use tastypie_client::{ApiConfig, ServiceUrl};
/// use tastypie_client::clients::{HttpClient, HttpRequest, HttpMethod};
///
/// let config = ApiConfig::builder()
///     .service_url(ServiceUrl::new("http://127.0.0.1:8000/api/v1/")?)
///     .build()?;
///
/// let client = HttpClient::new(&config)?;
///
/// let request = HttpRequest::builder(HttpMethod::Get, "/api/v1/mailing/")
///     .build()?;
///
/// let response = client.request(request).await?;
/// ```
#[derive(Debug)]
pub struct HttpClient {
    /// The internal reqwest HTTP client.
    client: reqwest::Client,
    /// Base URI (e.g., `http://127.0.0.1:8000`).
    base_uri: String,
    /// Default headers to include in all requests.
    default_headers: HashMap<String, String>,
    /// Attempts per request for retryable statuses.
    tries: u32,
}

// Verify HttpClient is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<HttpClient>();
};

impl HttpClient {
    /// Creates a new HTTP client for the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Network`] if the underlying reqwest client
    /// cannot be created (e.g., TLS initialization failure).
    ///
    /// # Example
    ///
    /// ```rust
    /// use tastypie_client::{ApiConfig, Credentials, ServiceUrl};
    /// use tastypie_client::clients::HttpClient;
    ///
    /// let config = ApiConfig::builder()
    ///     .service_url(ServiceUrl::new("http://127.0.0.1:8000/api/v1/").unwrap())
    ///     .credentials(Credentials::api_key("martin", "abc").unwrap())
    ///     .build()
    ///     .unwrap();
    ///
    /// let client = HttpClient::new(&config).unwrap();
    /// assert_eq!(client.base_uri(), "http://127.0.0.1:8000");
    /// ```
    pub fn new(config: &ApiConfig) -> Result<Self, HttpError> {
        let base_uri = config.service_url().origin().to_string();

        // Build User-Agent header
        let user_agent_prefix = config
            .user_agent_prefix()
            .map_or(String::new(), |prefix| format!("{prefix} | "));
        let rust_version = env!("CARGO_PKG_RUST_VERSION");
        let user_agent =
            format!("{user_agent_prefix}tastypie-client v{SDK_VERSION} | Rust {rust_version}");

        // Build default headers
        let mut default_headers = HashMap::new();
        default_headers.insert("User-Agent".to_string(), user_agent);
        default_headers.insert("Accept".to_string(), "application/json".to_string());

        if let Some(credentials) = config.credentials() {
            default_headers.insert(
                "Authorization".to_string(),
                credentials.authorization_header(),
            );
        }

        for (key, value) in config.extra_headers() {
            default_headers.insert(key.clone(), value.clone());
        }

        let mut builder = reqwest::Client::builder().use_rustls_tls();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            base_uri,
            default_headers,
            tries: config.tries(),
        })
    }

    /// Returns the base URI for this client.
    #[must_use]
    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    /// Returns the default headers for this client.
    #[must_use]
    pub const fn default_headers(&self) -> &HashMap<String, String> {
        &self.default_headers
    }

    /// Returns the default number of attempts per request.
    #[must_use]
    pub const fn tries(&self) -> u32 {
        self.tries
    }

    /// Resolves a request path into a full URL.
    ///
    /// Absolute URLs (as found in `Location` headers) are used unchanged;
    /// anything else is appended to the service origin.
    #[must_use]
    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        if path.starts_with('/') {
            format!("{}{path}", self.base_uri)
        } else {
            format!("{}/{path}", self.base_uri)
        }
    }

    /// Sends an HTTP request to the API.
    ///
    /// This method handles:
    /// - Request validation
    /// - URL construction
    /// - Header merging
    /// - Response parsing
    /// - Retry logic for 429 and 500 responses
    ///
    /// The request's own `tries` wins when it asks for more attempts than
    /// the configured default.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] if:
    /// - Request validation fails (`InvalidRequest`)
    /// - Network error occurs (`Network`)
    /// - Non-2xx response received (`Response`)
    /// - Max retries exceeded (`MaxRetries`)
    pub async fn request(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        request.verify()?;

        let url = self.url_for(&request.path);
        let max_tries = request.tries.max(self.tries);

        // Merge headers
        let mut headers = self.default_headers.clone();
        if request.body.is_some() {
            headers.insert("Content-Type".to_string(), "application/json".to_string());
        }
        if let Some(extra) = &request.extra_headers {
            for (key, value) in extra {
                headers.insert(key.clone(), value.clone());
            }
        }

        // Retry loop
        let mut tries: u32 = 0;
        loop {
            tries += 1;

            let mut req_builder = match request.http_method {
                HttpMethod::Get => self.client.get(&url),
                HttpMethod::Post => self.client.post(&url),
                HttpMethod::Patch => self.client.patch(&url),
                HttpMethod::Delete => self.client.delete(&url),
            };

            for (key, value) in &headers {
                req_builder = req_builder.header(key, value);
            }

            if let Some(query) = &request.query {
                req_builder = req_builder.query(query);
            }

            if let Some(body) = &request.body {
                req_builder = req_builder.body(body.to_string());
            }

            tracing::debug!(
                method = request.http_method.as_str(),
                url = %url,
                query = ?request.query,
                attempt = tries,
                "sending request"
            );

            let res = req_builder.send().await?;

            let code = res.status().as_u16();
            let res_headers = Self::parse_response_headers(res.headers());
            let body_text = res.text().await.unwrap_or_default();
            let body = Self::parse_body(&body_text);

            let response = HttpResponse::new(code, res_headers, body);

            tracing::debug!(
                method = request.http_method.as_str(),
                url = %url,
                status = code,
                "received response"
            );

            if response.is_ok() {
                return Ok(response);
            }

            let should_retry = code == 429 || code == 500;
            if !should_retry || (tries >= max_tries && max_tries == 1) {
                return Err(HttpError::Response(HttpResponseError::from_response(
                    &response,
                )));
            }

            if tries >= max_tries {
                let error = HttpResponseError::from_response(&response);
                return Err(HttpError::MaxRetries(MaxHttpRetriesExceededError {
                    code,
                    tries: max_tries,
                    message: error.message,
                    error_reference: error.error_reference,
                }));
            }

            let delay = Self::calculate_retry_delay(&response, code);
            tracing::warn!(
                status = code,
                attempt = tries,
                delay_secs = delay.as_secs_f64(),
                url = %url,
                "retrying request"
            );
            tokio::time::sleep(delay).await;
        }
    }

    /// Decodes a response body: empty bodies become `null`, non-JSON text
    /// is kept under `raw_body`.
    fn parse_body(body_text: &str) -> serde_json::Value {
        if body_text.trim().is_empty() {
            return serde_json::Value::Null;
        }
        serde_json::from_str(body_text)
            .unwrap_or_else(|_| serde_json::json!({ "raw_body": body_text }))
    }

    /// Parses response headers into a `HashMap`.
    fn parse_response_headers(
        headers: &reqwest::header::HeaderMap,
    ) -> HashMap<String, Vec<String>> {
        let mut result: HashMap<String, Vec<String>> = HashMap::new();
        for (name, value) in headers {
            let key = name.as_str().to_lowercase();
            let value = value.to_str().unwrap_or_default().to_string();
            result.entry(key).or_default().push(value);
        }
        result
    }

    /// Calculates the retry delay based on response and status code.
    fn calculate_retry_delay(response: &HttpResponse, status: u16) -> Duration {
        // 429 honours Retry-After; 500 always waits the fixed delay
        if status == 429 {
            if let Some(retry_after) = response.retry_request_after {
                if retry_after.is_finite() && retry_after >= 0.0 {
                    return Duration::from_secs_f64(retry_after);
                }
            }
        }
        Duration::from_secs(RETRY_WAIT_TIME)
    }
}
