//! Filter parameters for resource lists.
//!
//! A [`Filter`] maps a field name, optionally suffixed with a Django lookup
//! operator (`name__contains`, `created__gte`), to a comparison value. It is
//! sent verbatim as query parameters; nothing is checked against the schema.
//!
//! # Example
//!
//! ```rust
//! use tastypie_client::rest::Filter;
//!
//! let filter = Filter::new()
//!     .eq("status", "sent")
//!     .lookup("subject", "icontains", "newsletter")
//!     .is_in("id", [1, 2, 3])
//!     .order_by("-created");
//!
//! assert_eq!(filter.get("status"), Some("sent"));
//! assert_eq!(filter.get("subject__icontains"), Some("newsletter"));
//! assert_eq!(filter.get("id__in"), Some("1,2,3"));
//! assert_eq!(filter.get("order_by"), Some("-created"));
//! ```

use std::collections::BTreeMap;
use std::fmt::Display;

use serde::Serialize;

use crate::rest::ApiError;

/// Query parameters that pagination manages itself.
pub(crate) const PAGINATION_PARAMS: &[&str] = &["offset", "limit", "format"];

/// A set of filter parameters, kept sorted by key.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Filter(BTreeMap<String, String>);

impl Filter {
    /// Creates an empty filter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an exact-match condition.
    #[must_use]
    pub fn eq(self, field: impl Into<String>, value: impl Display) -> Self {
        self.param(field, value)
    }

    /// Adds a lookup condition, producing the key `{field}__{op}`.
    #[must_use]
    pub fn lookup(self, field: &str, op: &str, value: impl Display) -> Self {
        self.param(format!("{field}__{op}"), value)
    }

    /// Adds an `{field}__in` condition with comma-joined values.
    #[must_use]
    pub fn is_in<I, V>(self, field: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Display,
    {
        let joined = values
            .into_iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(",");
        self.param(format!("{field}__in"), joined)
    }

    /// Sets the `order_by` parameter; prefix with `-` for descending order.
    #[must_use]
    pub fn order_by(self, field: impl Display) -> Self {
        self.param("order_by", field)
    }

    /// Adds a raw query parameter, replacing any previous value for `key`.
    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl Display) -> Self {
        self.0.insert(key.into(), value.to_string());
        self
    }

    /// Builds a filter from any serializable struct or map.
    ///
    /// `null` values are skipped, arrays are comma-joined and nested objects
    /// are sent as their JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidFields`] if `params` does not serialize to
    /// a JSON object.
    pub fn from_params<T: Serialize>(params: &T) -> Result<Self, ApiError> {
        let value = serde_json::to_value(params).map_err(|e| ApiError::InvalidFields {
            message: format!("Failed to serialize filter: {e}"),
        })?;

        let serde_json::Value::Object(map) = value else {
            return Err(ApiError::InvalidFields {
                message: "filter parameters must serialize to an object".to_string(),
            });
        };

        let mut query = BTreeMap::new();
        for (key, val) in map {
            match val {
                serde_json::Value::Null => {}
                serde_json::Value::String(s) => {
                    query.insert(key, s);
                }
                serde_json::Value::Number(n) => {
                    query.insert(key, n.to_string());
                }
                serde_json::Value::Bool(b) => {
                    query.insert(key, b.to_string());
                }
                serde_json::Value::Array(arr) => {
                    let values: Vec<String> = arr
                        .iter()
                        .filter_map(|v| match v {
                            serde_json::Value::String(s) => Some(s.clone()),
                            serde_json::Value::Number(n) => Some(n.to_string()),
                            serde_json::Value::Bool(b) => Some(b.to_string()),
                            _ => None,
                        })
                        .collect();
                    if !values.is_empty() {
                        query.insert(key, values.join(","));
                    }
                }
                serde_json::Value::Object(_) => {
                    query.insert(key, val.to_string());
                }
            }
        }

        Ok(Self(query))
    }

    /// Returns the value for `key`, if set.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Returns `true` when no parameters are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the parameters in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Returns the parameters as a query map.
    #[must_use]
    pub fn to_query(&self) -> BTreeMap<String, String> {
        self.0.clone()
    }

    /// Builds the filter a server embedded in an envelope URI, dropping the
    /// pagination parameters.
    pub(crate) fn from_query_pairs(pairs: Vec<(String, String)>) -> Self {
        Self(
            pairs
                .into_iter()
                .filter(|(k, _)| !PAGINATION_PARAMS.contains(&k.as_str()))
                .collect(),
        )
    }
}

impl<K: Into<String>, V: Display> FromIterator<(K, V)> for Filter {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.to_string()))
                .collect(),
        )
    }
}
