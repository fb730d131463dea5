//! Schema-driven field values and relation resolution.
//!
//! [`coerce`] turns one raw payload value into a [`Field`] using the
//! field's schema descriptor:
//!
//! | descriptor type     | raw value                          | result                       |
//! |---------------------|------------------------------------|------------------------------|
//! | `datetime`          | date/time string                   | [`Field::DateTime`]          |
//! | `related` / `list`  | resource URI string                | [`Field::RelatedOne`] (lazy) |
//! | `related` / `list`  | nested object with `resource_uri`  | [`Field::RelatedOne`] (hydrated) |
//! | `related` / `list`  | list envelope (`meta` + `objects`) | [`Field::RelatedMany`]       |
//! | `related` / `list`  | array of resource URIs             | [`Field::RelatedMany`] (`id__in`) |
//! | `related` / `list`  | array of nested objects            | [`Field::RelatedMany`] (pre-seeded) |
//! | anything else       | anything                           | [`Field::Scalar`]            |
//!
//! Nothing here performs a request. A value that cannot be resolved (an
//! unparseable date, a URI pointing at an unknown endpoint) is passed
//! through as [`Field::Scalar`].

use chrono::{DateTime, FixedOffset, NaiveDateTime};

use crate::config::ServiceUrl;
use crate::rest::api::{ApiCore, Registry};
use crate::rest::endpoint::EndpointProxy;
use crate::rest::envelope::ListEnvelope;
use crate::rest::filter::Filter;
use crate::rest::resource::ResourceProxy;
use crate::rest::resource_list::{ResourceList, SeedPage};
use crate::rest::schema::{FieldDescriptor, FieldType};
use crate::rest::uri::{self, ResourceUri};

/// A field value as presented to callers.
#[derive(Clone, Debug)]
pub enum Field {
    /// Plain JSON value.
    Scalar(serde_json::Value),
    /// Parsed `datetime` field; values without an offset are read as UTC.
    DateTime(DateTime<FixedOffset>),
    /// Link to one resource.
    RelatedOne(ResourceProxy),
    /// Link to a collection of resources.
    RelatedMany(ResourceList),
}

impl Field {
    /// Returns the JSON value of a scalar field.
    #[must_use]
    pub const fn as_scalar(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Scalar(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the string value of a scalar field.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        self.as_scalar().and_then(serde_json::Value::as_str)
    }

    /// Returns the date/time of a `datetime` field.
    #[must_use]
    pub const fn as_datetime(&self) -> Option<&DateTime<FixedOffset>> {
        match self {
            Self::DateTime(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the proxy of a to-one relation.
    #[must_use]
    pub const fn as_related_one(&self) -> Option<&ResourceProxy> {
        match self {
            Self::RelatedOne(proxy) => Some(proxy),
            _ => None,
        }
    }

    /// Returns the list of a to-many relation.
    #[must_use]
    pub const fn as_related_many(&self) -> Option<&ResourceList> {
        match self {
            Self::RelatedMany(list) => Some(list),
            _ => None,
        }
    }

    /// Returns `true` for either kind of relation.
    #[must_use]
    pub const fn is_relation(&self) -> bool {
        matches!(self, Self::RelatedOne(_) | Self::RelatedMany(_))
    }
}

/// Presents `raw` according to `descriptor`.
///
/// `owner` is the endpoint of the resource holding the field; related
/// endpoints are looked up in `registry`.
pub(crate) fn coerce(
    owner: &EndpointProxy,
    registry: &Registry,
    descriptor: Option<&FieldDescriptor>,
    raw: &serde_json::Value,
) -> Field {
    let Some(descriptor) = descriptor else {
        return Field::Scalar(raw.clone());
    };

    match descriptor.field_type {
        FieldType::Datetime => raw
            .as_str()
            .and_then(|text| {
                let parsed = parse_datetime(text);
                if parsed.is_none() {
                    tracing::warn!(endpoint = %owner.name(), value = text, "unparseable datetime");
                }
                parsed
            })
            .map_or_else(|| Field::Scalar(raw.clone()), Field::DateTime),
        FieldType::Related | FieldType::List => Resolver {
            owner,
            registry,
            descriptor,
        }
        .resolve(raw)
        .unwrap_or_else(|| Field::Scalar(raw.clone())),
        _ => Field::Scalar(raw.clone()),
    }
}

/// Parses RFC 3339, or Tastypie's offset-less ISO 8601 read as UTC.
pub(crate) fn parse_datetime(text: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed);
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .map(|naive| naive.and_utc().fixed_offset())
}

struct Resolver<'a> {
    owner: &'a EndpointProxy,
    registry: &'a Registry,
    descriptor: &'a FieldDescriptor,
}

impl Resolver<'_> {
    fn resolve(&self, raw: &serde_json::Value) -> Option<Field> {
        match raw {
            serde_json::Value::String(link) => self.to_one(link),
            serde_json::Value::Object(map) if ListEnvelope::looks_like(raw) => {
                self.envelope(raw, map.get("resource_uri").and_then(serde_json::Value::as_str))
            }
            serde_json::Value::Object(_) => self.nested_one(raw),
            serde_json::Value::Array(items) => self.to_many(items),
            _ => None,
        }
    }

    fn root(&self) -> &ServiceUrl {
        self.owner.core().root()
    }

    fn endpoint(&self, name: &str) -> Option<EndpointProxy> {
        let found = ApiCore::find(self.registry, name)
            .map(|state| EndpointProxy::new(std::sync::Arc::clone(self.owner.core()), state));
        if found.is_none() {
            tracing::debug!(
                endpoint = %self.owner.name(),
                related = name,
                "relation points at an unknown endpoint"
            );
        }
        found
    }

    /// Endpoint named by the descriptor's `related_schema` URL.
    fn schema_endpoint(&self) -> Option<EndpointProxy> {
        let schema_url = self.descriptor.related_schema.as_deref()?;
        let name = uri::endpoint_segment(schema_url, self.root())?;
        self.endpoint(&name)
    }

    fn to_one(&self, link: &str) -> Option<Field> {
        if !uri::is_resource_uri(link, self.root()) {
            return None;
        }
        let parsed = ResourceUri::parse(link, self.root())?;
        let endpoint = self.endpoint(parsed.endpoint())?;
        Some(Field::RelatedOne(ResourceProxy::new(endpoint, parsed.id())))
    }

    fn nested_one(&self, raw: &serde_json::Value) -> Option<Field> {
        let link = raw.get("resource_uri")?.as_str()?;
        let parsed = ResourceUri::parse(link, self.root())?;
        let endpoint = self.endpoint(parsed.endpoint())?;
        let resource = endpoint.resource_from_payload(raw.clone()).ok()?;
        Some(Field::RelatedOne(ResourceProxy::hydrated(resource)))
    }

    fn envelope(&self, raw: &serde_json::Value, own_uri: Option<&str>) -> Option<Field> {
        let envelope: ListEnvelope = serde_json::from_value(raw.clone()).ok()?;
        let link = envelope.link().or(own_uri);

        let endpoint = link
            .and_then(|link| uri::endpoint_segment(link, self.root()))
            .and_then(|name| self.endpoint(&name))
            .or_else(|| {
                envelope
                    .objects
                    .iter()
                    .find_map(|object| object.get("resource_uri")?.as_str())
                    .and_then(|object_uri| ResourceUri::parse(object_uri, self.root()))
                    .and_then(|parsed| self.endpoint(parsed.endpoint()))
            })
            .or_else(|| self.schema_endpoint())?;

        let filter = link.map_or_else(Filter::new, |link| {
            Filter::from_query_pairs(uri::query_pairs(link, self.root()))
        });

        let received = envelope.objects.len() as u64;
        let (page_limit, total) = if link.is_some() {
            let limit = if envelope.meta.limit > 0 {
                envelope.meta.limit
            } else {
                self.owner.core().config.page_limit()
            };
            if envelope.meta.offset > 0 {
                // A later page: iteration has to start from offset 0.
                return Some(Field::RelatedMany(ResourceList::new(endpoint, filter, limit)));
            }
            (limit, envelope.meta.total_count)
        } else {
            // Without a link there is no filter to page with; the embedded
            // objects are the whole collection.
            (self.owner.core().config.page_limit(), received)
        };
        let next_offset = envelope.meta.offset + received.max(page_limit);

        Some(Field::RelatedMany(ResourceList::seeded(
            endpoint,
            filter,
            page_limit,
            SeedPage {
                objects: envelope.objects,
                next_offset,
            },
            total,
        )))
    }

    fn to_many(&self, items: &[serde_json::Value]) -> Option<Field> {
        if items.is_empty() {
            let endpoint = self.schema_endpoint()?;
            let page_limit = endpoint.core().config.page_limit();
            return Some(Field::RelatedMany(ResourceList::seeded(
                endpoint,
                Filter::new(),
                page_limit,
                SeedPage {
                    objects: Vec::new(),
                    next_offset: 0,
                },
                0,
            )));
        }

        if items.iter().all(serde_json::Value::is_string) {
            let parsed: Vec<ResourceUri> = items
                .iter()
                .filter_map(serde_json::Value::as_str)
                .filter(|link| uri::is_resource_uri(link, self.root()))
                .filter_map(|link| ResourceUri::parse(link, self.root()))
                .collect();
            if parsed.len() != items.len() {
                return None;
            }
            let endpoint = self.endpoint(parsed[0].endpoint())?;
            let filter = Filter::new().is_in("id", parsed.iter().map(ResourceUri::id));
            return Some(Field::RelatedMany(endpoint.filter(filter)));
        }

        if items
            .iter()
            .all(|item| item.get("resource_uri").is_some_and(serde_json::Value::is_string))
        {
            let first = items[0].get("resource_uri")?.as_str()?;
            let parsed = ResourceUri::parse(first, self.root())?;
            let endpoint = self.endpoint(parsed.endpoint())?;
            let total = items.len() as u64;
            let page_limit = endpoint.core().config.page_limit();
            return Some(Field::RelatedMany(ResourceList::seeded(
                endpoint,
                Filter::new(),
                page_limit,
                SeedPage {
                    objects: items.to_vec(),
                    next_offset: total,
                },
                total,
            )));
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_datetime_rfc3339() {
        let parsed = parse_datetime("2024-03-01T10:30:00+02:00").unwrap();
        assert_eq!(parsed.offset().local_minus_utc(), 7200);
        assert_eq!(parsed.hour(), 10);
    }

    #[test]
    fn test_parse_datetime_naive_is_utc() {
        let parsed = parse_datetime("2024-03-01T10:30:00.123456").unwrap();
        assert_eq!(parsed.offset().local_minus_utc(), 0);
        assert_eq!(parsed.year(), 2024);
        assert_eq!(parsed.minute(), 30);

        let spaced = parse_datetime("2024-03-01 10:30:00").unwrap();
        assert_eq!(spaced.day(), 1);
    }

    #[test]
    fn test_parse_datetime_rejects_garbage() {
        assert!(parse_datetime("yesterday").is_none());
        assert!(parse_datetime("2024-03-01").is_none());
    }

    #[test]
    fn test_field_accessors() {
        let field = Field::Scalar(serde_json::json!("hello"));
        assert_eq!(field.as_str(), Some("hello"));
        assert!(field.as_datetime().is_none());
        assert!(!field.is_relation());

        let when = Field::DateTime(parse_datetime("2024-03-01T10:30:00Z").unwrap());
        assert!(when.as_datetime().is_some());
        assert!(when.as_scalar().is_none());
    }
}
