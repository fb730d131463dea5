//! Resource model for Tastypie-style APIs.
//!
//! This module turns raw HTTP responses into navigable objects:
//!
//! - **[`Api`]**: the API root and its endpoint registry, discovered once
//! - **[`EndpointProxy`]**: one named collection with list, filter, get,
//!   get-many, add and schema operations
//! - **[`ResourceList`] / [`ResourceCursor`]**: lazy offset/limit pagination
//! - **[`Resource`]**: one object's fields and identity, with update and delete
//! - **[`Field`]**: schema-driven field values; relation links become
//!   [`ResourceProxy`] or [`ResourceList`] values
//! - **[`Schema`]**: per-endpoint field metadata, cached after the first fetch
//! - **[`ApiError`]**: semantic error types for all of the above
//!
//! # Requests
//!
//! Every operation awaits at most one request at a time and nothing is
//! fetched ahead of need:
//!
//! | operation                         | requests                                  |
//! |-----------------------------------|-------------------------------------------|
//! | `Api::new`                        | none                                      |
//! | first registry access             | `GET {base_path}`                         |
//! | `EndpointProxy::all` / `filter`   | none                                      |
//! | iterating a list of `N`           | `ceil(N / limit)` × `GET {list}?offset&limit` |
//! | `EndpointProxy::get`              | `GET {list}{id}/`                         |
//! | `EndpointProxy::get_many`         | `GET {list}?id__in=…`                     |
//! | `EndpointProxy::add`              | `POST {list}` (+ `GET Location`)          |
//! | `EndpointProxy::get_schema`       | `GET {list}schema/` once                  |
//! | `Resource::update`                | `PATCH {list}{id}/`                       |
//! | `Resource::delete`                | `DELETE {list}{id}/`                      |
//! | `ResourceProxy::fetch`            | `GET {list}{id}/` once                    |
//!
//! # Example
//!
//! ```rust,ignore
//! use tastypie_client::{Api, ApiConfig, ServiceUrl};
//! use tastypie_client::rest::{Field, Filter};
//!
//! let api = Api::new(
//!     ApiConfig::builder()
//!         .service_url(ServiceUrl::new("http://127.0.0.1:8000/api/v1/")?)
//!         .build()?,
//! )?;
//!
//! let mailing = api.endpoint("mailing").await?;
//! println!("{} mailings", mailing.all().count().await?);
//!
//! let sent = mailing.filter(Filter::new().eq("status", "sent")).collect().await?;
//! for resource in &sent {
//!     if let Some(Field::RelatedMany(contacts)) = resource.field("contacts").await {
//!         println!("{} contacts", contacts.count().await?);
//!     }
//! }
//! ```

mod api;
mod endpoint;
mod envelope;
mod errors;
mod filter;
mod relation;
mod resource;
mod resource_list;
mod schema;
mod uri;

pub use api::Api;
pub use endpoint::EndpointProxy;
pub use envelope::{ListEnvelope, ListMeta};
pub use errors::ApiError;
pub use filter::Filter;
pub use relation::Field;
pub use resource::{Resource, ResourceProxy};
pub use resource_list::{ResourceCursor, ResourceList};
pub use schema::{FieldDescriptor, FieldType, RelatedType, Schema};
pub use uri::ResourceUri;
