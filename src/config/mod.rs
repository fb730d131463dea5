//! Configuration types for the Tastypie client.
//!
//! This module provides the core configuration types used to point the
//! client at an API root and shape the requests it sends.
//!
//! # Overview
//!
//! The main types in this module are:
//!
//! - [`ApiConfig`]: The main configuration struct holding all client settings
//! - [`ApiConfigBuilder`]: A builder for constructing [`ApiConfig`] instances
//! - [`ServiceUrl`]: A validated API root URL
//! - [`Credentials`]: Basic or `ApiKey` authorization
//! - [`Secret`]: A password or API key with masked debug output
//!
//! # Example
//!
//! ```rust
//! use tastypie_client::{ApiConfig, Credentials, ServiceUrl};
//!
//! let config = ApiConfig::builder()
//!     .service_url(ServiceUrl::new("http://127.0.0.1:8000/api/v1/").unwrap())
//!     .credentials(Credentials::basic("martin", "secret").unwrap())
//!     .page_limit(50)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.page_limit(), 50);
//! ```

mod newtypes;

pub use newtypes::{Credentials, Secret, ServiceUrl};

use std::collections::HashMap;
use std::time::Duration;

use crate::error::ConfigError;

/// Page size used when iterating a resource list, matching Tastypie's default `limit`.
pub const DEFAULT_PAGE_LIMIT: u64 = 20;

/// Configuration for the Tastypie client.
///
/// This struct holds everything needed to talk to one API root: where it
/// lives, how to authenticate, and how large list pages should be.
///
/// # Thread Safety
///
/// `ApiConfig` is `Clone`, `Send`, and `Sync`, making it safe to share
/// across threads and async tasks.
///
/// # Example
///
/// ```rust
/// use tastypie_client::{ApiConfig, ServiceUrl};
///
/// let config = ApiConfig::builder()
///     .service_url(ServiceUrl::new("http://127.0.0.1:8000/api/v1/").unwrap())
///     .strip_trailing_slash(true)
///     .build()
///     .unwrap();
///
/// assert!(config.strip_trailing_slash());
/// ```
#[derive(Clone, Debug)]
pub struct ApiConfig {
    service_url: ServiceUrl,
    credentials: Option<Credentials>,
    page_limit: u64,
    tries: u32,
    timeout: Option<Duration>,
    user_agent_prefix: Option<String>,
    extra_headers: HashMap<String, String>,
    strip_trailing_slash: bool,
}

impl ApiConfig {
    /// Creates a new builder for constructing an `ApiConfig`.
    #[must_use]
    pub fn builder() -> ApiConfigBuilder {
        ApiConfigBuilder::new()
    }

    /// Returns the API root URL.
    #[must_use]
    pub const fn service_url(&self) -> &ServiceUrl {
        &self.service_url
    }

    /// Returns the credentials, if configured.
    #[must_use]
    pub const fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    /// Returns the page size used by resource list iteration.
    #[must_use]
    pub const fn page_limit(&self) -> u64 {
        self.page_limit
    }

    /// Returns how many times the transport attempts a request that
    /// receives a 429 or 500 response.
    #[must_use]
    pub const fn tries(&self) -> u32 {
        self.tries
    }

    /// Returns the transport timeout, if configured.
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Returns the user agent prefix, if configured.
    #[must_use]
    pub fn user_agent_prefix(&self) -> Option<&str> {
        self.user_agent_prefix.as_deref()
    }

    /// Returns the extra headers sent with every request.
    #[must_use]
    pub const fn extra_headers(&self) -> &HashMap<String, String> {
        &self.extra_headers
    }

    /// Returns whether generated URLs drop their trailing slash.
    #[must_use]
    pub const fn strip_trailing_slash(&self) -> bool {
        self.strip_trailing_slash
    }
}

// Verify ApiConfig is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ApiConfig>();
};

/// Builder for constructing [`ApiConfig`] instances.
///
/// `service_url` is required. All other fields have sensible defaults.
///
/// # Defaults
///
/// - `credentials`: `None`
/// - `page_limit`: [`DEFAULT_PAGE_LIMIT`]
/// - `tries`: `1` (no retries)
/// - `timeout`: `None`
/// - `user_agent_prefix`: `None`
/// - `strip_trailing_slash`: `false`
#[derive(Debug, Default)]
pub struct ApiConfigBuilder {
    service_url: Option<ServiceUrl>,
    credentials: Option<Credentials>,
    page_limit: Option<u64>,
    tries: Option<u32>,
    timeout: Option<Duration>,
    user_agent_prefix: Option<String>,
    extra_headers: HashMap<String, String>,
    strip_trailing_slash: bool,
}

impl ApiConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API root URL (required).
    #[must_use]
    pub fn service_url(mut self, url: ServiceUrl) -> Self {
        self.service_url = Some(url);
        self
    }

    /// Sets the credentials attached to every request.
    #[must_use]
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Sets the page size used by resource list iteration.
    #[must_use]
    pub const fn page_limit(mut self, limit: u64) -> Self {
        self.page_limit = Some(limit);
        self
    }

    /// Sets the number of transport attempts for 429 and 500 responses.
    #[must_use]
    pub const fn tries(mut self, tries: u32) -> Self {
        self.tries = Some(tries);
        self
    }

    /// Sets the transport timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the user agent prefix for HTTP requests.
    #[must_use]
    pub fn user_agent_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.user_agent_prefix = Some(prefix.into());
        self
    }

    /// Adds a header sent with every request.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers.insert(name.into(), value.into());
        self
    }

    /// Emits list, detail and schema URLs without their trailing slash.
    ///
    /// Tastypie itself expects the slash (Django redirects otherwise), but
    /// other servers following the same conventions may not.
    #[must_use]
    pub const fn strip_trailing_slash(mut self, strip: bool) -> Self {
        self.strip_trailing_slash = strip;
        self
    }

    /// Builds the [`ApiConfig`], validating that required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRequiredField`] if `service_url` is not set,
    /// or [`ConfigError::InvalidPageLimit`] if the page limit is zero.
    pub fn build(self) -> Result<ApiConfig, ConfigError> {
        let service_url = self.service_url.ok_or(ConfigError::MissingRequiredField {
            field: "service_url",
        })?;

        let page_limit = self.page_limit.unwrap_or(DEFAULT_PAGE_LIMIT);
        if page_limit == 0 {
            return Err(ConfigError::InvalidPageLimit { limit: page_limit });
        }

        Ok(ApiConfig {
            service_url,
            credentials: self.credentials,
            page_limit,
            tries: self.tries.unwrap_or(1).max(1),
            timeout: self.timeout,
            user_agent_prefix: self.user_agent_prefix,
            extra_headers: self.extra_headers,
            strip_trailing_slash: self.strip_trailing_slash,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service_url() -> ServiceUrl {
        ServiceUrl::new("http://127.0.0.1:8000/api/v1/").unwrap()
    }

    #[test]
    fn test_builder_requires_service_url() {
        let result = ApiConfigBuilder::new().build();

        assert!(matches!(
            result,
            Err(ConfigError::MissingRequiredField {
                field: "service_url"
            })
        ));
    }

    #[test]
    fn test_builder_provides_sensible_defaults() {
        let config = ApiConfig::builder()
            .service_url(service_url())
            .build()
            .unwrap();

        assert_eq!(config.page_limit(), DEFAULT_PAGE_LIMIT);
        assert_eq!(config.tries(), 1);
        assert!(config.credentials().is_none());
        assert!(config.timeout().is_none());
        assert!(config.user_agent_prefix().is_none());
        assert!(config.extra_headers().is_empty());
        assert!(!config.strip_trailing_slash());
    }

    #[test]
    fn test_builder_rejects_zero_page_limit() {
        let result = ApiConfig::builder()
            .service_url(service_url())
            .page_limit(0)
            .build();

        assert!(matches!(
            result,
            Err(ConfigError::InvalidPageLimit { limit: 0 })
        ));
    }

    #[test]
    fn test_builder_with_all_optional_fields() {
        let credentials = Credentials::api_key("martin", "key").unwrap();

        let config = ApiConfig::builder()
            .service_url(service_url())
            .credentials(credentials.clone())
            .page_limit(100)
            .tries(3)
            .timeout(Duration::from_secs(5))
            .user_agent_prefix("MyApp/1.0")
            .header("X-Tenant", "acme")
            .strip_trailing_slash(true)
            .build()
            .unwrap();

        assert_eq!(config.credentials(), Some(&credentials));
        assert_eq!(config.page_limit(), 100);
        assert_eq!(config.tries(), 3);
        assert_eq!(config.timeout(), Some(Duration::from_secs(5)));
        assert_eq!(config.user_agent_prefix(), Some("MyApp/1.0"));
        assert_eq!(
            config.extra_headers().get("X-Tenant"),
            Some(&"acme".to_string())
        );
        assert!(config.strip_trailing_slash());
    }

    #[test]
    fn test_zero_tries_is_clamped_to_one() {
        let config = ApiConfig::builder()
            .service_url(service_url())
            .tries(0)
            .build()
            .unwrap();

        assert_eq!(config.tries(), 1);
    }

    #[test]
    fn test_config_is_clone_and_debug() {
        let config = ApiConfig::builder()
            .service_url(service_url())
            .credentials(Credentials::basic("martin", "hidden-password").unwrap())
            .build()
            .unwrap();

        let cloned = config.clone();
        assert_eq!(cloned.service_url(), config.service_url());

        let debug_str = format!("{config:?}");
        assert!(debug_str.contains("ApiConfig"));
        assert!(!debug_str.contains("hidden-password"));
    }
}
