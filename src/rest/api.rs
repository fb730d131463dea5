//! The API root and its endpoint registry.
//!
//! An [`Api`] owns the transport and the registry of endpoints discovered
//! at the API root. Discovery happens once; every later lookup hands out
//! proxies that share the same per-endpoint state (and therefore the same
//! schema cache).

use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;
use tokio::sync::OnceCell;

use crate::clients::{HttpClient, HttpError, HttpMethod, HttpRequest, HttpResponseError};
use crate::config::{ApiConfig, ServiceUrl};
use crate::rest::endpoint::EndpointProxy;
use crate::rest::schema::Schema;
use crate::rest::uri;
use crate::rest::ApiError;

pub(crate) type Registry = HashMap<String, Arc<EndpointState>>;

/// Entry of the root discovery payload.
#[derive(Debug, Deserialize)]
struct EndpointDescriptor {
    #[serde(default)]
    list_endpoint: Option<String>,
    #[serde(default)]
    schema: Option<String>,
}

/// State shared by every proxy for one endpoint.
#[derive(Debug)]
pub(crate) struct EndpointState {
    pub(crate) name: String,
    /// Last path segment of the list URL; relation URIs carry this segment.
    pub(crate) resource_name: String,
    /// List path, always ending with `/`.
    pub(crate) list_path: String,
    pub(crate) schema_path: String,
    pub(crate) schema: OnceCell<Schema>,
}

/// Transport, configuration and registry behind an [`Api`].
#[derive(Debug)]
pub(crate) struct ApiCore {
    pub(crate) config: ApiConfig,
    pub(crate) http: HttpClient,
    endpoints: OnceCell<Registry>,
}

impl ApiCore {
    /// Returns the registry, fetching the API root on first use.
    pub(crate) async fn registry(&self) -> Result<&Registry, ApiError> {
        self.endpoints.get_or_try_init(|| self.fetch_registry()).await
    }

    /// Finds an endpoint by registry key, else by its URL segment.
    pub(crate) fn find(registry: &Registry, name: &str) -> Option<Arc<EndpointState>> {
        registry.get(name).cloned().or_else(|| {
            registry
                .values()
                .find(|state| state.resource_name == name)
                .cloned()
        })
    }

    /// Drops the trailing slash of a generated path when configured to.
    pub(crate) fn finish_path(&self, path: String) -> String {
        if self.config.strip_trailing_slash() && path.len() > 1 && path.ends_with('/') {
            path.trim_end_matches('/').to_string()
        } else {
            path
        }
    }

    pub(crate) fn base_path(&self) -> &str {
        self.config.service_url().base_path()
    }

    pub(crate) fn root(&self) -> &ServiceUrl {
        self.config.service_url()
    }

    async fn fetch_registry(&self) -> Result<Registry, ApiError> {
        let root_url = self.config.service_url().to_string();
        let unreachable = |source: HttpError| ApiError::ApiUnreachable {
            url: root_url.clone(),
            source,
        };

        let request = HttpRequest::builder(HttpMethod::Get, self.base_path())
            .build()
            .map_err(|e| unreachable(e.into()))?;
        let response = self
            .http
            .request(request)
            .await
            .map_err(unreachable)?;

        if response.code != 200 {
            return Err(unreachable(HttpError::Response(
                HttpResponseError::from_response(&response),
            )));
        }

        let descriptors: HashMap<String, EndpointDescriptor> =
            serde_json::from_value(response.body).map_err(|source| ApiError::Decode {
                context: format!("API root {root_url}"),
                source,
            })?;

        let mut registry = Registry::new();
        for (name, descriptor) in descriptors {
            let Some(list_url) = descriptor
                .list_endpoint
                .as_deref()
                .and_then(|link| self.root().join(link))
            else {
                tracing::debug!(endpoint = %name, "skipping root entry without list_endpoint");
                continue;
            };

            let mut list_path = list_url.path().to_string();
            if !list_path.ends_with('/') {
                list_path.push('/');
            }
            let schema_path = descriptor
                .schema
                .as_deref()
                .and_then(|link| self.root().join(link))
                .map_or_else(|| format!("{list_path}schema/"), |url| url.path().to_string());
            let resource_name = uri::last_segment(&list_url).unwrap_or_else(|| name.clone());

            registry.insert(
                name.clone(),
                Arc::new(EndpointState {
                    name,
                    resource_name,
                    list_path,
                    schema_path,
                    schema: OnceCell::new(),
                }),
            );
        }

        tracing::debug!(url = %root_url, endpoints = registry.len(), "discovered API endpoints");
        Ok(registry)
    }
}

/// Entry point to a Tastypie API.
///
/// `Api` is cheap to clone; clones share the transport, the endpoint
/// registry and every schema cache.
///
/// # Example
///
/// ```rust,ignore
/// use tastypie_client::{Api, ApiConfig, Credentials, ServiceUrl};
///
/// let config = ApiConfig::builder()
///     .service_url(ServiceUrl::new("http://127.0.0.1:8000/api/v1/")?)
///     .credentials(Credentials::api_key("martin", "204db7bc")?)
///     .build()?;
///
/// let api = Api::connect(config).await?;
/// let mailing = api.endpoint("mailing").await?;
///
/// let mut cursor = mailing.all().iter();
/// while let Some(resource) = cursor.next().await {
///     let resource = resource?;
///     println!("{}", resource.id());
/// }
/// ```
#[derive(Clone, Debug)]
pub struct Api {
    core: Arc<ApiCore>,
}

// Verify Api is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Api>();
};

impl Api {
    /// Creates a client without touching the network.
    ///
    /// The API root is fetched on the first call that needs an endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] if the HTTP client cannot be created.
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        let http = HttpClient::new(&config).map_err(ApiError::Http)?;
        Ok(Self {
            core: Arc::new(ApiCore {
                config,
                http,
                endpoints: OnceCell::new(),
            }),
        })
    }

    /// Creates a client and discovers the endpoints right away.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::ApiUnreachable`] if the API root cannot be fetched.
    pub async fn connect(config: ApiConfig) -> Result<Self, ApiError> {
        let api = Self::new(config)?;
        api.core.registry().await?;
        Ok(api)
    }

    /// Returns the configuration this client was built with.
    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.core.config
    }

    /// Returns every endpoint published at the API root, keyed by name.
    ///
    /// The root is fetched once; later calls return proxies to the same
    /// endpoints without a request.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::ApiUnreachable`] if the root cannot be fetched,
    /// or [`ApiError::Decode`] if it is not an endpoint mapping.
    pub async fn discover(&self) -> Result<HashMap<String, EndpointProxy>, ApiError> {
        let registry = self.core.registry().await?;
        Ok(registry
            .iter()
            .map(|(name, state)| {
                (
                    name.clone(),
                    EndpointProxy::new(Arc::clone(&self.core), Arc::clone(state)),
                )
            })
            .collect())
    }

    /// Same as [`Api::discover`].
    ///
    /// # Errors
    ///
    /// See [`Api::discover`].
    pub async fn endpoints(&self) -> Result<HashMap<String, EndpointProxy>, ApiError> {
        self.discover().await
    }

    /// Returns the endpoint called `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::UnknownEndpoint`] if the root does not publish it,
    /// or any discovery error.
    pub async fn endpoint(&self, name: &str) -> Result<EndpointProxy, ApiError> {
        let registry = self.core.registry().await?;
        ApiCore::find(registry, name)
            .map(|state| EndpointProxy::new(Arc::clone(&self.core), state))
            .ok_or_else(|| ApiError::UnknownEndpoint {
                name: name.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn core(strip: bool) -> ApiCore {
        let config = ApiConfig::builder()
            .service_url(ServiceUrl::new("http://127.0.0.1:8000/api/v1/").unwrap())
            .strip_trailing_slash(strip)
            .build()
            .unwrap();
        ApiCore {
            http: HttpClient::new(&config).unwrap(),
            config,
            endpoints: OnceCell::new(),
        }
    }

    fn state(name: &str, list_path: &str) -> Arc<EndpointState> {
        let list_url = Url::parse(&format!("http://host{list_path}")).unwrap();
        Arc::new(EndpointState {
            name: name.to_string(),
            resource_name: uri::last_segment(&list_url).unwrap(),
            list_path: list_path.to_string(),
            schema_path: format!("{list_path}schema/"),
            schema: OnceCell::new(),
        })
    }

    #[test]
    fn test_find_by_key_then_by_segment() {
        let mut registry = Registry::new();
        registry.insert("mailings".to_string(), state("mailings", "/api/v1/mailing/"));

        let by_key = ApiCore::find(&registry, "mailings").unwrap();
        let by_segment = ApiCore::find(&registry, "mailing").unwrap();
        assert!(Arc::ptr_eq(&by_key, &by_segment));
        assert!(ApiCore::find(&registry, "contact").is_none());
    }

    #[test]
    fn test_finish_path() {
        assert_eq!(
            core(false).finish_path("/api/v1/mailing/".to_string()),
            "/api/v1/mailing/"
        );
        assert_eq!(
            core(true).finish_path("/api/v1/mailing/".to_string()),
            "/api/v1/mailing"
        );
        assert_eq!(core(true).finish_path("/".to_string()), "/");
    }

    #[test]
    fn test_api_new_makes_no_request() {
        let config = ApiConfig::builder()
            .service_url(ServiceUrl::new("http://127.0.0.1:1/api/v1/").unwrap())
            .build()
            .unwrap();
        let api = Api::new(config).unwrap();
        assert_eq!(api.config().service_url().base_path(), "/api/v1/");
        assert!(api.core.endpoints.get().is_none());
    }
}
