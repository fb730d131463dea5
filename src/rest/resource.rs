//! Resources and lazy resource proxies.
//!
//! A [`Resource`] holds the field data of one fetched object together with
//! its identity (endpoint and id). Field values are exposed through
//! [`Resource::field`], which presents each value according to the
//! endpoint's schema and memoizes the result per field.
//!
//! A [`ResourceProxy`] is what a to-one relation resolves to: it knows the
//! endpoint and id of its target and fetches it on first use.
//!
//! # Example
//!
//! ```rust,ignore
//! use tastypie_client::rest::Field;
//! use serde_json::json;
//!
//! let mut mailing = api.endpoint("mailing").await?.get(7).await?;
//!
//! if let Some(Field::RelatedOne(owner)) = mailing.field("owner").await {
//!     let owner = owner.fetch().await?;
//!     println!("owner {}", owner.id());
//! }
//!
//! mailing.update(&json!({"subject": "Updated"})).await?;
//! mailing.delete().await?;
//! ```

use std::collections::HashMap;
use std::fmt::Display;
use std::sync::OnceLock;

use serde::Serialize;
use tokio::sync::OnceCell;

use crate::clients::{HttpMethod, HttpRequest};
use crate::rest::endpoint::{fields_to_object, EndpointProxy};
use crate::rest::errors::expect_status;
use crate::rest::relation::{self, Field};
use crate::rest::uri::ResourceUri;
use crate::rest::ApiError;

/// One resource's field data and identity.
///
/// Relation fields stay as raw link data until read through
/// [`Resource::field`]; the resolved value is cached on this instance.
/// After a successful [`Resource::delete`] the resource is terminal and
/// rejects further updates.
#[derive(Clone, Debug)]
pub struct Resource {
    endpoint: EndpointProxy,
    id: String,
    uri: Option<String>,
    fields: serde_json::Map<String, serde_json::Value>,
    cells: HashMap<String, FieldCell>,
    deleted: bool,
}

/// Per-field memo. `resolved` holds the schema-driven value; `unresolved`
/// holds the raw value served while the schema cannot be fetched, so a
/// later read still gets a chance to resolve.
#[derive(Clone, Debug, Default)]
struct FieldCell {
    resolved: OnceLock<Field>,
    unresolved: OnceLock<Field>,
}

impl Resource {
    /// Builds a resource from a detail payload.
    ///
    /// The id is the last segment of `resource_uri`, else the `id` field.
    pub(crate) fn from_payload(
        endpoint: EndpointProxy,
        payload: serde_json::Value,
    ) -> Result<Self, ApiError> {
        let serde_json::Value::Object(mut fields) = payload else {
            return Err(ApiError::malformed(format!(
                "{} payload is not an object",
                endpoint.name()
            )));
        };

        let uri = match fields.remove("resource_uri") {
            Some(serde_json::Value::String(uri)) if !uri.is_empty() => Some(uri),
            _ => None,
        };

        let root = endpoint.core().root();
        let id = uri
            .as_deref()
            .and_then(|uri| ResourceUri::parse(uri, root))
            .map(|parsed| parsed.id().to_string())
            .or_else(|| fields.get("id").and_then(scalar_to_string))
            .ok_or_else(|| {
                ApiError::malformed(format!(
                    "{} payload has neither resource_uri nor id",
                    endpoint.name()
                ))
            })?;

        let cells = fields
            .keys()
            .map(|name| (name.clone(), FieldCell::default()))
            .collect();

        Ok(Self {
            endpoint,
            id,
            uri,
            fields,
            cells,
            deleted: false,
        })
    }

    /// Returns the resource id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the endpoint this resource belongs to.
    #[must_use]
    pub const fn endpoint(&self) -> &EndpointProxy {
        &self.endpoint
    }

    /// Returns the `resource_uri` the server reported, if any.
    #[must_use]
    pub fn resource_uri(&self) -> Option<&str> {
        self.uri.as_deref()
    }

    /// Returns the names of the fields in this resource's payload.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Returns `true` if the payload has a field called `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Returns `true` once the resource has been deleted.
    #[must_use]
    pub const fn is_deleted(&self) -> bool {
        self.deleted
    }

    /// Returns the value of field `name`, or `None` if the payload has no
    /// such field.
    ///
    /// The first read of any field fetches the endpoint schema if it is not
    /// cached yet. Relation fields come back as proxies or lists; the result
    /// is computed once per field and reused on later reads.
    ///
    /// If the schema or the API root cannot be fetched, the raw value is
    /// returned as [`Field::Scalar`] and the next read tries again.
    pub async fn field(&self, name: &str) -> Option<&Field> {
        let (Some(cell), Some(raw)) = (self.cells.get(name), self.fields.get(name)) else {
            return None;
        };
        if let Some(field) = cell.resolved.get() {
            return Some(field);
        }

        match self.resolve(name, raw).await {
            Ok(coerced) => Some(cell.resolved.get_or_init(|| coerced)),
            Err(error) => {
                tracing::warn!(
                    endpoint = %self.endpoint.name(),
                    field = name,
                    %error,
                    "schema unavailable, returning the raw value"
                );
                Some(cell.unresolved.get_or_init(|| Field::Scalar(raw.clone())))
            }
        }
    }

    async fn resolve(&self, name: &str, raw: &serde_json::Value) -> Result<Field, ApiError> {
        let schema = self.endpoint.get_schema().await?;
        let registry = self.endpoint.core().registry().await?;
        Ok(relation::coerce(&self.endpoint, registry, schema.field(name), raw))
    }

    /// Applies `fields` with one PATCH and merges the result locally.
    ///
    /// The fields the server echoes back (or, when it answers without a
    /// body, the fields sent) replace the local values, and their cached
    /// relation values are dropped. On failure nothing local changes.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::ResourceDeleted`] if the resource was deleted,
    /// [`ApiError::InvalidFields`] if `fields` is not an object, or
    /// [`ApiError::BadHttpStatus`] if the server does not answer 202, 200
    /// or 204.
    pub async fn update<T: Serialize + ?Sized>(
        &mut self,
        fields: &T,
    ) -> Result<&mut Self, ApiError> {
        self.ensure_live()?;
        let body = fields_to_object(fields)?;
        tracing::debug!(
            endpoint = %self.endpoint.name(),
            id = %self.id,
            fields = %body,
            "updating resource"
        );

        let request = HttpRequest::builder(HttpMethod::Patch, self.endpoint.detail_path(&self.id))
            .body(body.clone())
            .build()?;
        let response = expect_status(
            self.endpoint.core().http.request(request).await?,
            &[202, 200, 204],
        )?;

        let merged = match response.body {
            serde_json::Value::Object(map) if !map.is_empty() => map,
            _ => match body {
                serde_json::Value::Object(map) => map,
                _ => serde_json::Map::new(),
            },
        };
        self.merge(merged);
        Ok(self)
    }

    /// Deletes the resource with one DELETE.
    ///
    /// Only `204 No Content` counts as success; the resource is then
    /// terminal. Any other status leaves it untouched.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::ResourceDeleted`] if already deleted, or
    /// [`ApiError::BadHttpStatus`] for any status other than 204.
    pub async fn delete(&mut self) -> Result<bool, ApiError> {
        self.ensure_live()?;

        let request =
            HttpRequest::builder(HttpMethod::Delete, self.endpoint.detail_path(&self.id)).build()?;
        expect_status(self.endpoint.core().http.request(request).await?, &[204])?;

        tracing::debug!(endpoint = %self.endpoint.name(), id = %self.id, "deleted resource");
        self.deleted = true;
        Ok(true)
    }

    fn ensure_live(&self) -> Result<(), ApiError> {
        if self.deleted {
            return Err(ApiError::ResourceDeleted {
                endpoint: self.endpoint.name().to_string(),
                id: self.id.clone(),
            });
        }
        Ok(())
    }

    fn merge(&mut self, mut fields: serde_json::Map<String, serde_json::Value>) {
        if let Some(serde_json::Value::String(uri)) = fields.remove("resource_uri") {
            self.uri = Some(uri);
        }
        for (name, value) in fields {
            self.cells.insert(name.clone(), FieldCell::default());
            self.fields.insert(name, value);
        }
    }
}

fn scalar_to_string(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// A to-one relation target: endpoint and id known, data fetched on demand.
///
/// The proxy starts unhydrated unless the server nested the full object.
/// [`ResourceProxy::fetch`] issues at most one request over the proxy's
/// lifetime.
#[derive(Clone, Debug)]
pub struct ResourceProxy {
    endpoint: EndpointProxy,
    id: String,
    resource: OnceCell<Resource>,
}

impl ResourceProxy {
    pub(crate) fn new(endpoint: EndpointProxy, id: impl Display) -> Self {
        Self {
            endpoint,
            id: id.to_string(),
            resource: OnceCell::new(),
        }
    }

    pub(crate) fn hydrated(resource: Resource) -> Self {
        Self {
            endpoint: resource.endpoint.clone(),
            id: resource.id.clone(),
            resource: OnceCell::new_with(Some(resource)),
        }
    }

    /// Returns the target endpoint.
    #[must_use]
    pub const fn endpoint(&self) -> &EndpointProxy {
        &self.endpoint
    }

    /// Returns the target id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns `true` once the target's data is loaded.
    #[must_use]
    pub fn is_hydrated(&self) -> bool {
        self.resource.initialized()
    }

    /// Returns the target if it is already loaded.
    #[must_use]
    pub fn hydrated_resource(&self) -> Option<&Resource> {
        self.resource.get()
    }

    /// Returns the target, fetching it on first call.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::ResourceNotFound`] if the target no longer exists,
    /// or any other fetch error; a later call tries again.
    pub async fn fetch(&self) -> Result<&Resource, ApiError> {
        self.resource
            .get_or_try_init(|| self.endpoint.get(&self.id))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalar_to_string() {
        assert_eq!(scalar_to_string(&json!(42)), Some("42".to_string()));
        assert_eq!(scalar_to_string(&json!("abc")), Some("abc".to_string()));
        assert_eq!(scalar_to_string(&json!("")), None);
        assert_eq!(scalar_to_string(&json!(null)), None);
    }
}
