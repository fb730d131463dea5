//! Shared fixtures for the integration tests.
//!
//! Every test runs against a wiremock server that plays a Tastypie API
//! rooted at `/api/v1/` with `mailing`, `contact`, `user` and `tag`
//! endpoints.

#![allow(dead_code)]

use serde_json::{json, Value};
use tastypie_client::{Api, ApiConfig, ServiceUrl};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const BASE_PATH: &str = "/api/v1/";

/// Endpoints published at the API root.
pub const ENDPOINTS: &[&str] = &["mailing", "contact", "user", "tag"];

/// Builds the root discovery payload for `names`.
pub fn root_payload(names: &[&str]) -> Value {
    let mut root = serde_json::Map::new();
    for name in names {
        root.insert(
            (*name).to_string(),
            json!({
                "list_endpoint": format!("{BASE_PATH}{name}/"),
                "schema": format!("{BASE_PATH}{name}/schema/"),
            }),
        );
    }
    Value::Object(root)
}

/// Mounts the API root, expecting it to be fetched exactly once.
pub async fn mount_root(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(BASE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(root_payload(ENDPOINTS)))
        .expect(1)
        .mount(server)
        .await;
}

pub fn config_for(server: &MockServer) -> ApiConfig {
    config_with_limit(server, 20)
}

pub fn config_with_limit(server: &MockServer, page_limit: u64) -> ApiConfig {
    ApiConfig::builder()
        .service_url(ServiceUrl::new(format!("{}{BASE_PATH}", server.uri())).unwrap())
        .page_limit(page_limit)
        .build()
        .unwrap()
}

/// Starts a server with the root mounted and returns a client for it.
pub async fn start() -> (MockServer, Api) {
    start_with_limit(20).await
}

pub async fn start_with_limit(page_limit: u64) -> (MockServer, Api) {
    let server = MockServer::start().await;
    mount_root(&server).await;
    let api = Api::new(config_with_limit(&server, page_limit)).unwrap();
    (server, api)
}

pub fn resource_uri(endpoint: &str, id: u64) -> String {
    format!("{BASE_PATH}{endpoint}/{id}/")
}

/// A mailing detail payload.
pub fn mailing(id: u64) -> Value {
    json!({
        "id": id,
        "subject": format!("Mailing {id}"),
        "created": "2024-03-01T10:30:00",
        "resource_uri": resource_uri("mailing", id),
    })
}

/// A contact detail payload.
pub fn contact(id: u64) -> Value {
    json!({
        "id": id,
        "email": format!("contact{id}@example.com"),
        "resource_uri": resource_uri("contact", id),
    })
}

/// A list envelope page.
pub fn page(
    endpoint: &str,
    objects: Vec<Value>,
    total_count: u64,
    offset: u64,
    limit: u64,
) -> Value {
    let next = (offset + limit < total_count).then(|| {
        format!(
            "{BASE_PATH}{endpoint}/?limit={limit}&offset={}",
            offset + limit
        )
    });
    let previous = (offset > 0).then(|| {
        format!(
            "{BASE_PATH}{endpoint}/?limit={limit}&offset={}",
            offset.saturating_sub(limit)
        )
    });
    json!({
        "meta": {
            "limit": limit,
            "next": next,
            "offset": offset,
            "previous": previous,
            "total_count": total_count,
        },
        "objects": objects,
    })
}

/// Mounts one mailing list page, expecting it to be requested once.
pub async fn mount_mailing_page(server: &MockServer, total: u64, offset: u64, limit: u64) {
    let last = total.min(offset + limit);
    let objects = (offset + 1..=last).map(mailing).collect();
    Mock::given(method("GET"))
        .and(path(format!("{BASE_PATH}mailing/")))
        .and(query_param("offset", offset.to_string()))
        .and(query_param("limit", limit.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            "mailing", objects, total, offset, limit,
        )))
        .expect(1)
        .mount(server)
        .await;
}

/// Mounts a detail payload, expecting `times` requests.
pub async fn mount_detail(server: &MockServer, endpoint: &str, id: u64, body: Value, times: u64) {
    Mock::given(method("GET"))
        .and(path(resource_uri(endpoint, id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(times)
        .mount(server)
        .await;
}

/// The mailing endpoint schema.
pub fn mailing_schema() -> Value {
    json!({
        "allowed_detail_http_methods": ["get", "patch", "delete"],
        "allowed_list_http_methods": ["get", "post"],
        "default_format": "application/json",
        "default_limit": 20,
        "fields": {
            "id": {"type": "integer", "nullable": false, "readonly": false,
                   "unique": true, "default": "", "blank": false},
            "subject": {"type": "string", "nullable": false, "readonly": false,
                        "unique": false, "default": "", "blank": false},
            "created": {"type": "datetime", "nullable": false, "readonly": true,
                        "unique": false, "default": "No default provided.", "blank": false},
            "owner": {"type": "related", "related_type": "to_one",
                      "related_schema": "/api/v1/user/schema/",
                      "nullable": true, "readonly": false, "unique": false,
                      "default": "No default provided.", "blank": false},
            "contacts": {"type": "related", "related_type": "to_many",
                         "related_schema": "/api/v1/contact/schema/",
                         "nullable": true, "readonly": false, "unique": false,
                         "default": "No default provided.", "blank": false},
            "tags": {"type": "related", "related_type": "to_many",
                     "related_schema": "/api/v1/tag/schema/"},
            "resource_uri": {"type": "string", "readonly": true}
        },
        "filtering": {"subject": ["exact", "contains"]},
        "ordering": ["created"]
    })
}

/// Mounts the mailing schema, expecting it to be fetched `times` times.
pub async fn mount_mailing_schema(server: &MockServer, times: u64) {
    Mock::given(method("GET"))
        .and(path(format!("{BASE_PATH}mailing/schema/")))
        .respond_with(ResponseTemplate::new(200).set_body_json(mailing_schema()))
        .expect(times)
        .mount(server)
        .await;
}

/// Number of requests the server has seen so far.
pub async fn request_count(server: &MockServer) -> usize {
    server.received_requests().await.map_or(0, |requests| requests.len())
}
