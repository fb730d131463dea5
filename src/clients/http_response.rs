//! HTTP response types for the Tastypie client.
//!
//! This module provides the [`HttpResponse`] type for accessing the status,
//! headers and decoded body of an API response.

use std::collections::HashMap;

/// An HTTP response from the API.
///
/// Header names are lower-cased; a header may carry several values.
/// The body is the decoded JSON document: `null` for an empty body, and
/// `{"raw_body": "<text>"}` when the body is not JSON.
#[derive(Clone, Debug)]
pub struct HttpResponse {
    /// The HTTP status code.
    pub code: u16,
    /// Response headers (headers may have multiple values).
    pub headers: HashMap<String, Vec<String>>,
    /// The parsed response body.
    pub body: serde_json::Value,
    /// Seconds to wait before retrying (from `Retry-After` header).
    pub retry_request_after: Option<f64>,
}

impl HttpResponse {
    /// Creates a new `HttpResponse`, parsing the `Retry-After` header.
    #[must_use]
    pub fn new(code: u16, headers: HashMap<String, Vec<String>>, body: serde_json::Value) -> Self {
        let retry_request_after = headers
            .get("retry-after")
            .and_then(|values| values.first())
            .and_then(|value| value.parse::<f64>().ok());

        Self {
            code,
            headers,
            body,
            retry_request_after,
        }
    }

    /// Returns `true` if the response status code is in the 2xx range.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.code >= 200 && self.code <= 299
    }

    /// Returns the first value of a header, looked up case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_lowercase())
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Returns the `X-Request-Id` header value, if present.
    ///
    /// This ID is useful for debugging and should be included in error reports.
    #[must_use]
    pub fn request_id(&self) -> Option<&str> {
        self.header("x-request-id")
    }

    /// Returns the `Location` header value, if present.
    ///
    /// Tastypie sets it on `201 Created` responses to point at the new resource.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.header("location")
    }

    /// Returns `true` when the body carries no data (`null` or `{}`).
    #[must_use]
    pub fn is_body_empty(&self) -> bool {
        match &self.body {
            serde_json::Value::Null => true,
            serde_json::Value::Object(map) => map.is_empty(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_is_ok_returns_true_for_2xx() {
        for code in 200..=299 {
            let response = HttpResponse::new(code, HashMap::new(), json!({}));
            assert!(
                response.is_ok(),
                "Expected is_ok() to be true for code {code}"
            );
        }
    }

    #[test]
    fn test_is_ok_returns_false_for_4xx_and_5xx() {
        for code in [400, 404, 405, 429, 500] {
            let response = HttpResponse::new(code, HashMap::new(), json!({}));
            assert!(!response.is_ok());
        }
    }

    #[test]
    fn test_retry_after_parsing() {
        let mut headers = HashMap::new();
        headers.insert("retry-after".to_string(), vec!["2.5".to_string()]);

        let response = HttpResponse::new(429, headers, json!({}));
        assert!((response.retry_request_after.unwrap() - 2.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_request_id_extraction() {
        let mut headers = HashMap::new();
        headers.insert("x-request-id".to_string(), vec!["abc-123-xyz".to_string()]);

        let response = HttpResponse::new(200, headers, json!({}));
        assert_eq!(response.request_id(), Some("abc-123-xyz"));
    }

    #[test]
    fn test_location_lookup_is_case_insensitive() {
        let mut headers = HashMap::new();
        headers.insert(
            "location".to_string(),
            vec!["http://localhost/api/v1/mailing/7/".to_string()],
        );

        let response = HttpResponse::new(201, headers, serde_json::Value::Null);
        assert_eq!(
            response.header("Location"),
            Some("http://localhost/api/v1/mailing/7/")
        );
        assert_eq!(
            response.location(),
            Some("http://localhost/api/v1/mailing/7/")
        );
    }

    #[test]
    fn test_is_body_empty() {
        let empty = HttpResponse::new(204, HashMap::new(), serde_json::Value::Null);
        assert!(empty.is_body_empty());

        let empty_object = HttpResponse::new(202, HashMap::new(), json!({}));
        assert!(empty_object.is_body_empty());

        let data = HttpResponse::new(200, HashMap::new(), json!({"id": 1}));
        assert!(!data.is_body_empty());
    }
}
