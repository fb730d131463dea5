//! Error types for resource-level API operations.
//!
//! Transport failures arrive as [`HttpError`]; this module maps them onto
//! the semantic variants callers actually branch on.
//!
//! # Error Handling
//!
//! - **Unexpected status**: [`ApiError::BadHttpStatus`], carrying the status
//!   code and decoded response body
//! - **404 on a detail fetch**: [`ApiError::ResourceNotFound`]
//! - **Root discovery failure**: [`ApiError::ApiUnreachable`]
//! - **Network / retry exhaustion**: [`ApiError::Http`]
//!
//! # Example
//!
//! ```rust,ignore
//! use tastypie_client::ApiError;
//!
//! match mailing.get(131).await {
//!     Ok(resource) => println!("Found: {}", resource.id()),
//!     Err(ApiError::ResourceNotFound { endpoint, id, .. }) => {
//!         println!("{endpoint} {id} does not exist");
//!     }
//!     Err(e) => println!("Other error: {e} (status {:?})", e.status()),
//! }
//! ```

use thiserror::Error;

use crate::clients::{HttpError, HttpResponse, HttpResponseError, InvalidHttpRequestError};

/// Error type for API operations.
///
/// Every failure reported by the transport surfaces as one of these
/// variants; nothing is retried or recovered locally.
///
/// # Example
///
/// ```rust
/// use tastypie_client::ApiError;
///
/// let error = ApiError::ResourceDeleted {
///     endpoint: "mailing".to_string(),
///     id: "7".to_string(),
/// };
/// assert_eq!(error.to_string(), "mailing 7 has been deleted");
/// assert_eq!(error.status(), None);
/// ```
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered with a status outside the operation's expected set.
    #[error(transparent)]
    BadHttpStatus(HttpResponseError),

    /// A detail fetch returned 404.
    #[error("{endpoint} {id} not found")]
    ResourceNotFound {
        /// The endpoint name.
        endpoint: String,
        /// The requested id.
        id: String,
        /// The 404 response.
        #[source]
        source: HttpResponseError,
    },

    /// The API root could not be fetched or decoded.
    #[error("API root {url} is unreachable: {source}")]
    ApiUnreachable {
        /// The root URL.
        url: String,
        /// The underlying transport failure.
        #[source]
        source: HttpError,
    },

    /// No endpoint with this name was discovered at the API root.
    #[error("unknown endpoint: {name}")]
    UnknownEndpoint {
        /// The requested name.
        name: String,
    },

    /// The resource was deleted and no longer accepts updates.
    #[error("{endpoint} {id} has been deleted")]
    ResourceDeleted {
        /// The endpoint name.
        endpoint: String,
        /// The resource id.
        id: String,
    },

    /// A single-resource lookup by filter matched nothing.
    #[error("no {endpoint} resource matches the given filter")]
    NoResourceMatched {
        /// The endpoint name.
        endpoint: String,
    },

    /// A single-resource lookup by filter matched several resources.
    #[error("{count} {endpoint} resources match the given filter, expected one")]
    MultipleResourcesReturned {
        /// The endpoint name.
        endpoint: String,
        /// The server-reported match count.
        count: u64,
    },

    /// Fields passed to `add`/`update` are not a JSON object.
    #[error("invalid fields: {message}")]
    InvalidFields {
        /// What went wrong.
        message: String,
    },

    /// A success response did not have the expected shape.
    #[error("malformed payload: {context}")]
    MalformedPayload {
        /// Which payload was being read.
        context: String,
    },

    /// A success response could not be decoded.
    #[error("failed to decode {context}: {source}")]
    Decode {
        /// Which payload was being read.
        context: String,
        /// The decoding error.
        #[source]
        source: serde_json::Error,
    },

    /// Network failure or retry exhaustion.
    #[error(transparent)]
    Http(HttpError),
}

impl ApiError {
    /// Returns the HTTP status code associated with this error, if any.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::BadHttpStatus(e) | Self::ResourceNotFound { source: e, .. } => Some(e.code),
            Self::ApiUnreachable { source, .. } | Self::Http(source) => source.status(),
            _ => None,
        }
    }

    /// Returns the request ID if available.
    #[must_use]
    pub fn request_id(&self) -> Option<&str> {
        match self {
            Self::BadHttpStatus(e) | Self::ResourceNotFound { source: e, .. } => {
                e.error_reference.as_deref()
            }
            Self::Http(HttpError::Response(e)) => e.error_reference.as_deref(),
            Self::Http(HttpError::MaxRetries(e)) => e.error_reference.as_deref(),
            _ => None,
        }
    }

    /// Builds the error for a 2xx response outside the expected set.
    pub(crate) fn unexpected_status(response: &HttpResponse) -> Self {
        Self::BadHttpStatus(HttpResponseError::from_response(response))
    }

    pub(crate) fn malformed(context: impl Into<String>) -> Self {
        Self::MalformedPayload {
            context: context.into(),
        }
    }
}

impl From<HttpError> for ApiError {
    fn from(error: HttpError) -> Self {
        match error {
            HttpError::Response(e) => Self::BadHttpStatus(e),
            other => Self::Http(other),
        }
    }
}

impl From<InvalidHttpRequestError> for ApiError {
    fn from(error: InvalidHttpRequestError) -> Self {
        Self::Http(HttpError::InvalidRequest(error))
    }
}

/// Accepts a response only if its status is one of `expected`.
pub(crate) fn expect_status(
    response: HttpResponse,
    expected: &[u16],
) -> Result<HttpResponse, ApiError> {
    if expected.contains(&response.code) {
        Ok(response)
    } else {
        Err(ApiError::unexpected_status(&response))
    }
}

// Verify ApiError is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ApiError>();
};

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    fn response_error(code: u16) -> HttpResponseError {
        HttpResponseError {
            code,
            message: format!("[{code}]"),
            body: serde_json::Value::Null,
            error_reference: Some("req-1".to_string()),
        }
    }

    #[test]
    fn test_http_response_error_maps_to_bad_http_status() {
        let error: ApiError = HttpError::Response(response_error(405)).into();
        assert!(matches!(error, ApiError::BadHttpStatus(ref e) if e.code == 405));
        assert_eq!(error.status(), Some(405));
        assert_eq!(error.request_id(), Some("req-1"));
    }

    #[test]
    fn test_other_http_errors_stay_wrapped() {
        let error: ApiError = HttpError::InvalidRequest(InvalidHttpRequestError::MissingBody {
            method: "post".to_string(),
        })
        .into();
        assert!(matches!(error, ApiError::Http(_)));
        assert_eq!(error.status(), None);
    }

    #[test]
    fn test_resource_not_found_reports_404() {
        let error = ApiError::ResourceNotFound {
            endpoint: "mailing".to_string(),
            id: "131".to_string(),
            source: response_error(404),
        };
        assert_eq!(error.status(), Some(404));
        assert_eq!(error.to_string(), "mailing 131 not found");
        assert!(std::error::Error::source(&error).is_some());
    }

    #[test]
    fn test_api_unreachable_carries_status() {
        let error = ApiError::ApiUnreachable {
            url: "http://localhost/api/v1/".to_string(),
            source: HttpError::Response(response_error(503)),
        };
        assert_eq!(error.status(), Some(503));
        assert!(error.to_string().contains("http://localhost/api/v1/"));
    }

    #[test]
    fn test_expect_status_accepts_listed_codes() {
        let response = HttpResponse::new(202, HashMap::new(), json!({}));
        assert!(expect_status(response, &[202, 200]).is_ok());
    }

    #[test]
    fn test_expect_status_rejects_other_success_codes() {
        let response = HttpResponse::new(200, HashMap::new(), json!({"ok": true}));
        let error = expect_status(response, &[204]).unwrap_err();
        assert!(matches!(error, ApiError::BadHttpStatus(ref e) if e.code == 200));
    }

    #[test]
    fn test_multiple_resources_message() {
        let error = ApiError::MultipleResourcesReturned {
            endpoint: "mailing".to_string(),
            count: 3,
        };
        assert_eq!(
            error.to_string(),
            "3 mailing resources match the given filter, expected one"
        );
    }
}
