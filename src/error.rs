//! Error types for client configuration.
//!
//! This module contains the error type returned when building an
//! [`ApiConfig`](crate::ApiConfig) or one of its validated newtypes.
//!
//! # Error Handling
//!
//! All configuration constructors return `Result<T, ConfigError>` to enable
//! fail-fast validation. Error messages are designed to be clear and actionable.
//!
//! # Example
//!
//! ```rust
//! use tastypie_client::{ConfigError, ServiceUrl};
//!
//! let result = ServiceUrl::new("not a url");
//! assert!(matches!(result, Err(ConfigError::InvalidServiceUrl { .. })));
//! ```

use thiserror::Error;

/// Errors that can occur during client configuration.
///
/// Each variant provides a clear, actionable error message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The service URL could not be parsed.
    #[error("Invalid service URL '{url}'. Expected 'http(s)://host[:port]/path/'.")]
    InvalidServiceUrl {
        /// The invalid URL that was provided.
        url: String,
    },

    /// A credential username was empty.
    #[error("Credential username cannot be empty.")]
    EmptyUsername,

    /// A credential secret (password or API key) was empty.
    #[error("Credential secret cannot be empty. Please provide a password or API key.")]
    EmptySecret,

    /// The page limit must be at least one.
    #[error("Invalid page limit {limit}. The page limit must be greater than zero.")]
    InvalidPageLimit {
        /// The rejected limit.
        limit: u64,
    },

    /// A required field was not set on the builder.
    #[error("Missing required field '{field}'. Set it on the builder before build().")]
    MissingRequiredField {
        /// The name of the missing field.
        field: &'static str,
    },
}
