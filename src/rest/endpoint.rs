//! Endpoint proxies.
//!
//! An [`EndpointProxy`] is a handle on one named collection published at
//! the API root. It builds lazy [`ResourceList`]s, fetches single resources,
//! creates new ones and caches the endpoint's [`Schema`].
//!
//! # Example
//!
//! ```rust,ignore
//! use tastypie_client::rest::Filter;
//! use serde_json::json;
//!
//! let mailing = api.endpoint("mailing").await?;
//!
//! // No request until the list is iterated.
//! let drafts = mailing.filter(Filter::new().eq("status", "draft"));
//!
//! let created = mailing.add(&json!({"subject": "Hello"})).await?;
//! let fetched = mailing.get(created.id()).await?;
//! let many = mailing.get_many([1, 2, 3]).await?;
//! ```

use std::collections::HashMap;
use std::fmt::{self, Display};
use std::sync::Arc;

use serde::Serialize;

use crate::clients::{HttpError, HttpMethod, HttpRequest};
use crate::rest::api::{ApiCore, EndpointState};
use crate::rest::envelope::ListEnvelope;
use crate::rest::errors::expect_status;
use crate::rest::filter::Filter;
use crate::rest::resource::Resource;
use crate::rest::resource_list::ResourceList;
use crate::rest::schema::Schema;
use crate::rest::ApiError;

/// A handle on one endpoint.
///
/// Cheap to clone. Two proxies compare equal when they refer to the same
/// discovered endpoint of the same [`Api`](crate::Api).
#[derive(Clone)]
pub struct EndpointProxy {
    core: Arc<ApiCore>,
    state: Arc<EndpointState>,
}

impl EndpointProxy {
    pub(crate) const fn new(core: Arc<ApiCore>, state: Arc<EndpointState>) -> Self {
        Self { core, state }
    }

    pub(crate) fn core(&self) -> &Arc<ApiCore> {
        &self.core
    }

    /// Returns the name this endpoint is published under at the API root.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.state.name
    }

    /// Returns the URL segment resource URIs of this endpoint carry.
    #[must_use]
    pub fn resource_name(&self) -> &str {
        &self.state.resource_name
    }

    /// Returns the list path, as requested on the wire.
    #[must_use]
    pub fn list_path(&self) -> String {
        self.core.finish_path(self.state.list_path.clone())
    }

    /// Returns the detail path for `id`, as requested on the wire.
    #[must_use]
    pub fn detail_path(&self, id: impl Display) -> String {
        let id = urlencoding::encode(&id.to_string()).into_owned();
        self.core.finish_path(format!("{}{id}/", self.state.list_path))
    }

    /// Returns the schema path, as requested on the wire.
    #[must_use]
    pub fn schema_path(&self) -> String {
        self.core.finish_path(self.state.schema_path.clone())
    }

    /// Returns a lazy list over every resource of this endpoint.
    ///
    /// Same as `filter(Filter::new())`; no request is made.
    #[must_use]
    pub fn all(&self) -> ResourceList {
        self.filter(Filter::new())
    }

    /// Returns a lazy list over the resources matching `filter`.
    ///
    /// No request is made until the list is iterated or counted.
    #[must_use]
    pub fn filter(&self, filter: Filter) -> ResourceList {
        ResourceList::new(self.clone(), filter, self.core.config.page_limit())
    }

    /// Fetches one resource by id.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::ResourceNotFound`] on 404 and
    /// [`ApiError::BadHttpStatus`] for any other unexpected status.
    pub async fn get(&self, id: impl Display) -> Result<Resource, ApiError> {
        let id = id.to_string();
        let request = HttpRequest::builder(HttpMethod::Get, self.detail_path(&id)).build()?;

        let response = match self.core.http.request(request).await {
            Ok(response) => expect_status(response, &[200])?,
            Err(HttpError::Response(source)) if source.code == 404 => {
                return Err(ApiError::ResourceNotFound {
                    endpoint: self.state.name.clone(),
                    id,
                    source,
                });
            }
            Err(e) => return Err(e.into()),
        };

        self.resource_from_payload(response.body)
    }

    /// Fetches several resources by id with one request.
    ///
    /// The result is keyed by id as a string and holds exactly what the
    /// server returned; ids it did not return are absent.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::BadHttpStatus`] for an unexpected status, or a
    /// decoding error for a malformed page.
    pub async fn get_many<I, V>(&self, ids: I) -> Result<HashMap<String, Resource>, ApiError>
    where
        I: IntoIterator<Item = V>,
        V: Display,
    {
        let ids: Vec<String> = ids.into_iter().map(|id| id.to_string()).collect();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let filter = Filter::new().is_in("id", &ids);
        let limit = u64::try_from(ids.len()).unwrap_or(u64::MAX);
        let envelope = self.fetch_page(&filter, 0, limit).await?;

        envelope
            .objects
            .into_iter()
            .map(|payload| {
                let resource = self.resource_from_payload(payload)?;
                Ok((resource.id().to_string(), resource))
            })
            .collect()
    }

    /// Fetches the single resource matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NoResourceMatched`] or
    /// [`ApiError::MultipleResourcesReturned`] when the filter does not
    /// match exactly one resource.
    pub async fn get_one(&self, filter: Filter) -> Result<Resource, ApiError> {
        let envelope = self.fetch_page(&filter, 0, 2).await?;
        let count = envelope.meta.total_count.max(envelope.objects.len() as u64);

        if count > 1 {
            return Err(ApiError::MultipleResourcesReturned {
                endpoint: self.state.name.clone(),
                count,
            });
        }

        let payload = envelope
            .objects
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::NoResourceMatched {
                endpoint: self.state.name.clone(),
            })?;
        self.resource_from_payload(payload)
    }

    /// Creates a resource from `fields` with one POST.
    ///
    /// When the server answers without a body (Tastypie's default unless
    /// `always_return_data` is set), the new resource is fetched from the
    /// `Location` header.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidFields`] if `fields` is not a JSON object,
    /// [`ApiError::BadHttpStatus`] if the server does not answer 201 or 200.
    pub async fn add<T: Serialize + ?Sized>(&self, fields: &T) -> Result<Resource, ApiError> {
        let body = fields_to_object(fields)?;
        tracing::debug!(endpoint = %self.state.name, fields = %body, "creating resource");

        let request = HttpRequest::builder(HttpMethod::Post, self.list_path())
            .body(body)
            .build()?;
        let response = expect_status(self.core.http.request(request).await?, &[201, 200])?;

        if !response.is_body_empty() {
            return self.resource_from_payload(response.body);
        }

        let location = response
            .location()
            .ok_or_else(|| ApiError::malformed("creation response has neither body nor Location"))?
            .to_string();

        let request = HttpRequest::builder(HttpMethod::Get, location).build()?;
        let response = expect_status(self.core.http.request(request).await?, &[200])?;
        self.resource_from_payload(response.body)
    }

    /// Returns this endpoint's schema, fetching it on first use only.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::BadHttpStatus`] or [`ApiError::Decode`] if the
    /// schema cannot be fetched; the next call tries again.
    pub async fn get_schema(&self) -> Result<&Schema, ApiError> {
        self.state
            .schema
            .get_or_try_init(|| self.fetch_schema())
            .await
    }

    async fn fetch_schema(&self) -> Result<Schema, ApiError> {
        let request = HttpRequest::builder(HttpMethod::Get, self.schema_path()).build()?;
        let response = expect_status(self.core.http.request(request).await?, &[200])?;
        tracing::debug!(endpoint = %self.state.name, "fetched schema");

        serde_json::from_value(response.body).map_err(|source| ApiError::Decode {
            context: format!("{} schema", self.state.name),
            source,
        })
    }

    /// Returns the schema if it has already been fetched.
    #[must_use]
    pub fn cached_schema(&self) -> Option<&Schema> {
        self.state.schema.get()
    }

    /// Fetches one page of this endpoint's list.
    pub(crate) async fn fetch_page(
        &self,
        filter: &Filter,
        offset: u64,
        limit: u64,
    ) -> Result<ListEnvelope, ApiError> {
        let request = HttpRequest::builder(HttpMethod::Get, self.list_path())
            .query(filter.to_query())
            .query_param("offset", offset.to_string())
            .query_param("limit", limit.to_string())
            .build()?;
        let response = expect_status(self.core.http.request(request).await?, &[200])?;

        let envelope: ListEnvelope =
            serde_json::from_value(response.body).map_err(|source| ApiError::Decode {
                context: format!("{} list page", self.state.name),
                source,
            })?;

        tracing::debug!(
            endpoint = %self.state.name,
            offset,
            limit,
            total_count = envelope.meta.total_count,
            objects = envelope.objects.len(),
            "fetched page"
        );
        Ok(envelope)
    }

    pub(crate) fn resource_from_payload(
        &self,
        payload: serde_json::Value,
    ) -> Result<Resource, ApiError> {
        Resource::from_payload(self.clone(), payload)
    }
}

impl PartialEq for EndpointProxy {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }
}

impl Eq for EndpointProxy {}

impl fmt::Debug for EndpointProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndpointProxy")
            .field("name", &self.state.name)
            .field("list_endpoint", &self.state.list_path)
            .field("schema_cached", &self.state.schema.initialized())
            .finish()
    }
}

/// Serializes `fields` and checks it is a JSON object.
pub(crate) fn fields_to_object<T: Serialize + ?Sized>(
    fields: &T,
) -> Result<serde_json::Value, ApiError> {
    let value = serde_json::to_value(fields).map_err(|e| ApiError::InvalidFields {
        message: format!("Failed to serialize fields: {e}"),
    })?;
    if value.is_object() {
        Ok(value)
    } else {
        Err(ApiError::InvalidFields {
            message: format!("expected an object of fields, got {value}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fields_to_object_accepts_maps_and_structs() {
        #[derive(Serialize)]
        struct Mailing {
            subject: &'static str,
        }

        assert_eq!(
            fields_to_object(&Mailing { subject: "Hi" }).unwrap(),
            json!({"subject": "Hi"})
        );
        assert!(fields_to_object(&json!({"a": 1})).is_ok());
    }

    #[test]
    fn test_fields_to_object_rejects_non_objects() {
        assert!(matches!(
            fields_to_object(&json!([1, 2])),
            Err(ApiError::InvalidFields { .. })
        ));
        assert!(matches!(
            fields_to_object("subject"),
            Err(ApiError::InvalidFields { .. })
        ));
    }
}
