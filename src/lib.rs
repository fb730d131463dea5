//! # Tastypie API Client
//!
//! A Rust client for resource-oriented REST APIs following the Django
//! Tastypie conventions: an API root listing named endpoints, offset/limit
//! paginated list envelopes, per-endpoint schemas and hyperlinked relations.
//!
//! ## Overview
//!
//! This crate provides:
//! - Type-safe configuration via [`ApiConfig`] and [`ApiConfigBuilder`]
//! - HTTP Basic and Tastypie `ApiKey` authentication via [`Credentials`]
//! - Endpoint discovery from the API root via [`Api`]
//! - Lazy, filterable, paginated collections via [`ResourceList`]
//! - Create, fetch, update and delete of individual [`Resource`]s
//! - Schema-driven field values: datetimes are parsed and relation links
//!   become lazy [`ResourceProxy`] / [`ResourceList`] values
//! - Async HTTP transport with retry logic for 429 and 500 responses
//!
//! ## Quick Start
//!
//! ```rust
//! use tastypie_client::{Api, ApiConfig, Credentials, ServiceUrl};
//!
//! // Create configuration using the builder pattern
//! let config = ApiConfig::builder()
//!     .service_url(ServiceUrl::new("http://127.0.0.1:8000/api/v1/").unwrap())
//!     .credentials(Credentials::api_key("martin", "204db7bcfafb2deb").unwrap())
//!     .page_limit(50)
//!     .build()
//!     .unwrap();
//!
//! // No request is made until an endpoint is needed
//! let api = Api::new(config).unwrap();
//! # let _ = api;
//! ```
//!
//! ## Working with Resources
//!
//! ```rust,ignore
//! use tastypie_client::{Api, Field, Filter};
//! use serde_json::json;
//!
//! let mailing = api.endpoint("mailing").await?;
//!
//! // Lazy: pages are fetched while iterating
//! let mut cursor = mailing.filter(Filter::new().lookup("subject", "contains", "news")).iter();
//! while let Some(resource) = cursor.next().await {
//!     let resource = resource?;
//!     if let Some(Field::DateTime(created)) = resource.field("created").await {
//!         println!("{} created {created}", resource.id());
//!     }
//! }
//!
//! // Create, update and delete
//! let mut created = mailing.add(&json!({"subject": "Hello"})).await?;
//! created.update(&json!({"subject": "Hello again"})).await?;
//! created.delete().await?;
//! ```
//!
//! ## Design Principles
//!
//! - **No global state**: Configuration and caches live on the [`Api`] instance
//! - **Fail-fast validation**: All newtypes validate on construction
//! - **Lazy by default**: Lists, relations and schemas are fetched on first need
//! - **Fetch once**: The endpoint registry, schemas and relation values are
//!   computed at most once per owner
//! - **Async-first**: Designed for use with Tokio async runtime

pub mod clients;
pub mod config;
pub mod error;
pub mod rest;

// Re-export public types at crate root for convenience
pub use config::{ApiConfig, ApiConfigBuilder, Credentials, Secret, ServiceUrl, DEFAULT_PAGE_LIMIT};
pub use error::ConfigError;

// Re-export the resource model
pub use rest::{
    Api, ApiError, EndpointProxy, Field, FieldDescriptor, FieldType, Filter, ListEnvelope,
    ListMeta, RelatedType, Resource, ResourceCursor, ResourceList, ResourceProxy, ResourceUri,
    Schema,
};

// Re-export HTTP client types
pub use clients::{
    HttpClient, HttpError, HttpMethod, HttpRequest, HttpRequestBuilder, HttpResponse,
    HttpResponseError, InvalidHttpRequestError, MaxHttpRetriesExceededError,
};
