//! Resource URI parsing.
//!
//! Tastypie identifies every resource by a detail URI of the form
//! `{base_path}{endpoint}/{id}/`. Relation fields carry these URIs, and list
//! envelopes carry `next`/`previous` URIs whose query string holds the filter
//! the server applied. Links are resolved against the service URL with
//! [`url::Url`]; no request is ever needed to identify a resource.
//!
//! # Example
//!
//! ```rust
//! use tastypie_client::rest::ResourceUri;
//! use tastypie_client::ServiceUrl;
//!
//! let root = ServiceUrl::new("http://127.0.0.1:8000/api/v1/").unwrap();
//! let uri = ResourceUri::parse("/api/v1/mailing/7/", &root).unwrap();
//! assert_eq!(uri.endpoint(), "mailing");
//! assert_eq!(uri.id(), "7");
//!
//! // List URIs have no id segment.
//! assert!(ResourceUri::parse("/api/v1/mailing/", &root).is_none());
//! ```

use std::borrow::Cow;
use std::fmt;

use url::Url;

use crate::config::ServiceUrl;

/// The identity of one resource: its endpoint segment and id.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ResourceUri {
    endpoint: String,
    id: String,
}

impl ResourceUri {
    /// Parses a detail URI (absolute or origin-relative) under `root`.
    ///
    /// The query string and trailing slash are ignored. Returns `None` when
    /// the path does not name an endpoint and an id.
    #[must_use]
    pub fn parse(uri: &str, root: &ServiceUrl) -> Option<Self> {
        let url = root.join(uri)?;
        let segments = relative_segments(&url, root);
        let [.., endpoint, id] = segments.as_slice() else {
            return None;
        };

        Some(Self {
            endpoint: endpoint.clone(),
            id: id.clone(),
        })
    }

    /// Returns the endpoint segment (e.g., `mailing`).
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Returns the id segment.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for ResourceUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.endpoint, self.id)
    }
}

/// Returns `true` when `value` looks like a resource URI under `root`.
#[must_use]
pub fn is_resource_uri(value: &str, root: &ServiceUrl) -> bool {
    root.join(value)
        .is_some_and(|url| segments(&url).starts_with(&segments(root.url())))
        && ResourceUri::parse(value, root).is_some()
}

/// Returns the first path segment below `root`, which is the endpoint
/// segment for list, detail and schema URIs alike.
#[must_use]
pub fn endpoint_segment(uri: &str, root: &ServiceUrl) -> Option<String> {
    let url = root.join(uri)?;
    relative_segments(&url, root).into_iter().next()
}

/// Returns the last non-empty path segment of `url`.
#[must_use]
pub fn last_segment(url: &Url) -> Option<String> {
    segments(url).pop()
}

/// Decodes the query string of `uri` into key/value pairs, in order.
#[must_use]
pub fn query_pairs(uri: &str, root: &ServiceUrl) -> Vec<(String, String)> {
    root.join(uri)
        .map(|url| url.query_pairs().into_owned().collect())
        .unwrap_or_default()
}

/// Non-empty, percent-decoded path segments.
fn segments(url: &Url) -> Vec<String> {
    url.path_segments()
        .map(|parts| {
            parts
                .filter(|part| !part.is_empty())
                .map(|part| {
                    urlencoding::decode(part).map_or_else(|_| part.to_string(), Cow::into_owned)
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Segments below the root path, or every segment when `url` lies elsewhere.
fn relative_segments(url: &Url, root: &ServiceUrl) -> Vec<String> {
    let base = segments(root.url());
    let mut all = segments(url);
    if all.starts_with(&base) {
        return all.split_off(base.len());
    }
    all
}
