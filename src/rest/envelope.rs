//! The list envelope Tastypie wraps every collection page in.

use serde::Deserialize;

/// Pagination metadata of a list page.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct ListMeta {
    /// Total number of matching resources on the server.
    #[serde(default)]
    pub total_count: u64,
    /// Page size the server applied.
    #[serde(default)]
    pub limit: u64,
    /// Offset of this page.
    #[serde(default)]
    pub offset: u64,
    /// URI of the next page, if any.
    #[serde(default)]
    pub next: Option<String>,
    /// URI of the previous page, if any.
    #[serde(default)]
    pub previous: Option<String>,
}

/// One page of a collection: `{"meta": {...}, "objects": [...]}`.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ListEnvelope {
    /// Pagination metadata.
    pub meta: ListMeta,
    /// The resources on this page, in server order.
    #[serde(default)]
    pub objects: Vec<serde_json::Value>,
}

impl ListEnvelope {
    /// Returns `true` if `value` has the envelope shape (`objects` array plus
    /// a `meta` object).
    #[must_use]
    pub fn looks_like(value: &serde_json::Value) -> bool {
        value.get("objects").is_some_and(serde_json::Value::is_array)
            && value.get("meta").is_some_and(serde_json::Value::is_object)
    }

    /// Returns the URI the server embedded for this collection: `next`,
    /// else `previous`.
    #[must_use]
    pub fn link(&self) -> Option<&str> {
        self.meta.next.as_deref().or(self.meta.previous.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_deserialization() {
        let envelope: ListEnvelope = serde_json::from_value(json!({
            "meta": {"limit": 20, "next": "/api/v1/mailing/?limit=20&offset=20",
                     "offset": 0, "previous": null, "total_count": 130},
            "objects": [{"id": 1}, {"id": 2}]
        }))
        .unwrap();

        assert_eq!(envelope.meta.total_count, 130);
        assert_eq!(envelope.meta.limit, 20);
        assert_eq!(envelope.objects.len(), 2);
        assert_eq!(envelope.link(), Some("/api/v1/mailing/?limit=20&offset=20"));
    }

    #[test]
    fn test_link_falls_back_to_previous() {
        let envelope: ListEnvelope = serde_json::from_value(json!({
            "meta": {"total_count": 3, "previous": "/api/v1/contact/?mailing=1&offset=0"},
            "objects": []
        }))
        .unwrap();
        assert_eq!(envelope.link(), Some("/api/v1/contact/?mailing=1&offset=0"));
    }

    #[test]
    fn test_looks_like() {
        assert!(ListEnvelope::looks_like(
            &json!({"meta": {"total_count": 0}, "objects": []})
        ));
        assert!(!ListEnvelope::looks_like(&json!({"objects": []})));
        assert!(!ListEnvelope::looks_like(&json!(["/api/v1/contact/1/"])));
    }
}
