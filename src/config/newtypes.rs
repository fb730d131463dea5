//! Validated newtype wrappers for configuration values.
//!
//! This module provides type-safe wrappers around string values that validate
//! their contents on construction. Invalid values are rejected with clear error messages.

use crate::error::ConfigError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::fmt;
use url::Url;

/// A validated service URL pointing at the API root.
///
/// The URL is split into an origin (`scheme://host[:port]`) and a base path
/// that always ends with `/`. Relation URIs returned by the server are paths
/// under this base path and are resolved against it with [`ServiceUrl::join`].
///
/// # Example
///
/// ```rust
/// use tastypie_client::ServiceUrl;
///
/// let url = ServiceUrl::new("http://127.0.0.1:8000/api/v1").unwrap();
/// assert_eq!(url.scheme(), "http");
/// assert_eq!(url.origin(), "http://127.0.0.1:8000");
/// assert_eq!(url.base_path(), "/api/v1/");
/// assert_eq!(url.as_ref(), "http://127.0.0.1:8000/api/v1/");
///
/// let link = url.join("/api/v1/mailing/7/").unwrap();
/// assert_eq!(link.as_str(), "http://127.0.0.1:8000/api/v1/mailing/7/");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceUrl {
    url: Url,
    origin: String,
}

impl ServiceUrl {
    /// Creates a new validated service URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidServiceUrl`] if the URL does not parse,
    /// is not `http` or `https`, has no host, or carries a query string or
    /// fragment.
    pub fn new(url: impl Into<String>) -> Result<Self, ConfigError> {
        let raw = url.into();
        let trimmed = raw.trim();
        let invalid = || ConfigError::InvalidServiceUrl {
            url: trimmed.to_string(),
        };

        let mut url = Url::parse(trimmed).map_err(|_| invalid())?;
        if !matches!(url.scheme(), "http" | "https")
            || url.host_str().map_or(true, str::is_empty)
            || url.query().is_some()
            || url.fragment().is_some()
        {
            return Err(invalid());
        }

        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        let origin = url.origin().ascii_serialization();

        Ok(Self { url, origin })
    }

    /// Returns the URL scheme (e.g., "https").
    #[must_use]
    pub fn scheme(&self) -> &str {
        self.url.scheme()
    }

    /// Returns `scheme://host[:port]` without any path.
    #[must_use]
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Returns the base path, always ending with `/` (e.g., `/api/v1/`).
    #[must_use]
    pub fn base_path(&self) -> &str {
        self.url.path()
    }

    /// Returns the parsed URL.
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    /// Resolves `link` against this URL.
    ///
    /// Absolute URLs come back unchanged; paths starting with `/` are taken
    /// relative to the origin. Anything else is not a link and yields `None`.
    #[must_use]
    pub fn join(&self, link: &str) -> Option<Url> {
        match Url::parse(link) {
            Ok(url) => Some(url),
            Err(url::ParseError::RelativeUrlWithoutBase) if link.starts_with('/') => {
                self.url.join(link).ok()
            }
            Err(_) => None,
        }
    }
}

impl AsRef<str> for ServiceUrl {
    fn as_ref(&self) -> &str {
        self.url.as_str()
    }
}

impl fmt::Display for ServiceUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url.as_str())
    }
}

/// A credential secret (password or API key).
///
/// The `Debug` implementation masks the secret value, displaying only
/// `Secret(*****)` instead of the actual value.
///
/// # Example
///
/// ```rust
/// use tastypie_client::Secret;
///
/// let secret = Secret::new("hunter2").unwrap();
/// assert_eq!(format!("{:?}", secret), "Secret(*****)");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    /// Creates a new validated secret.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptySecret`] if the secret is empty.
    pub fn new(secret: impl Into<String>) -> Result<Self, ConfigError> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(ConfigError::EmptySecret);
        }
        Ok(Self(secret))
    }
}

impl AsRef<str> for Secret {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(*****)")
    }
}

/// Credentials attached to every request as an `Authorization` header.
///
/// Tastypie ships two header-based schemes: HTTP Basic authentication and
/// its own `ApiKey username:key` scheme.
///
/// # Example
///
/// ```rust
/// use tastypie_client::Credentials;
///
/// let basic = Credentials::basic("martin", "secret").unwrap();
/// assert_eq!(basic.authorization_header(), "Basic bWFydGluOnNlY3JldA==");
///
/// let api_key = Credentials::api_key("martin", "204db7bcfafb2deb").unwrap();
/// assert_eq!(api_key.authorization_header(), "ApiKey martin:204db7bcfafb2deb");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Credentials {
    /// HTTP Basic authentication.
    Basic {
        /// The account username.
        username: String,
        /// The account password.
        password: Secret,
    },
    /// Tastypie API key authentication.
    ApiKey {
        /// The account username.
        username: String,
        /// The API key issued to the account.
        key: Secret,
    },
}

impl Credentials {
    /// Creates HTTP Basic credentials.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyUsername`] or [`ConfigError::EmptySecret`]
    /// if either part is empty.
    pub fn basic(
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        Ok(Self::Basic {
            username: Self::validate_username(username.into())?,
            password: Secret::new(password)?,
        })
    }

    /// Creates Tastypie API key credentials.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyUsername`] or [`ConfigError::EmptySecret`]
    /// if either part is empty.
    pub fn api_key(
        username: impl Into<String>,
        key: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        Ok(Self::ApiKey {
            username: Self::validate_username(username.into())?,
            key: Secret::new(key)?,
        })
    }

    /// Returns the username for either scheme.
    #[must_use]
    pub fn username(&self) -> &str {
        match self {
            Self::Basic { username, .. } | Self::ApiKey { username, .. } => username,
        }
    }

    /// Returns the `Authorization` header value for these credentials.
    #[must_use]
    pub fn authorization_header(&self) -> String {
        match self {
            Self::Basic { username, password } => {
                let token = STANDARD.encode(format!("{username}:{}", password.as_ref()));
                format!("Basic {token}")
            }
            Self::ApiKey { username, key } => format!("ApiKey {username}:{}", key.as_ref()),
        }
    }

    fn validate_username(username: String) -> Result<String, ConfigError> {
        if username.trim().is_empty() {
            return Err(ConfigError::EmptyUsername);
        }
        Ok(username)
    }
}
