//! REST backing client
//!
//! Maps CRUD calls onto `{endpoint}/apis/projectcalico.org/v3/{plural}`.

use super::http::{HttpResponse, HttpTransport};
use super::{Client, KindClient, RequestOptions};
use crate::api::{BgpConfiguration, BgpPeer, Kind, List, API_VERSION};
use crate::context::Context;
use crate::error::ClientError;
use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use std::time::Duration;
use url::Url;

/// REST calls for a single kind
pub struct RestKindClient<K> {
    http: HttpTransport,
    endpoint: Url,
    _kind: PhantomData<fn() -> K>,
}

impl<K: Kind> RestKindClient<K> {
    fn new(http: HttpTransport, endpoint: Url) -> Self {
        Self {
            http,
            endpoint,
            _kind: PhantomData,
        }
    }

    /// Collection URL, optionally extended with an object name
    fn url(&self, namespace: Option<&str>, name: Option<&str>) -> Url {
        let mut path = format!(
            "{}/apis/{}",
            self.endpoint.path().trim_end_matches('/'),
            API_VERSION
        );
        if K::NAMESPACED {
            if let Some(namespace) = namespace {
                path.push_str(&format!("/namespaces/{}", urlencoding::encode(namespace)));
            }
        }
        path.push('/');
        path.push_str(K::PLURAL);
        if let Some(name) = name {
            path.push('/');
            path.push_str(&urlencoding::encode(name));
        }

        let mut url = self.endpoint.clone();
        url.set_path(&path);
        url.set_query(None);
        url
    }

    fn with_query(mut url: Url, pairs: &[(&str, Option<&str>)]) -> Url {
        if pairs.iter().any(|(_, v)| v.is_some()) {
            let mut query = url.query_pairs_mut();
            for (key, value) in pairs {
                if let Some(value) = value {
                    query.append_pair(key, value);
                }
            }
        }
        url
    }

    fn body(resource: K) -> Result<serde_json::Value, ClientError> {
        serde_json::to_value(resource.into_object())
            .map_err(|e| ClientError::Validation(format!("failed to encode {}: {}", K::KIND, e)))
    }

    /// Turn a response into a value or the matching error kind
    fn decode<T: DeserializeOwned>(
        method: &Method,
        name: &str,
        response: HttpResponse,
    ) -> Result<T, ClientError> {
        if response.status.is_success() {
            return serde_json::from_str(&response.body)
                .map_err(|e| ClientError::Decode(format!("{} response: {}", K::KIND, e)));
        }

        Err(match response.status {
            StatusCode::NOT_FOUND => ClientError::not_found(K::KIND, name),
            StatusCode::CONFLICT if *method == Method::POST => {
                ClientError::already_exists(K::KIND, name)
            }
            StatusCode::CONFLICT | StatusCode::PRECONDITION_FAILED => {
                ClientError::conflict(K::KIND, name, response.message())
            }
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                ClientError::Validation(response.message())
            }
            status => ClientError::Unexpected {
                status: status.as_u16(),
                message: response.message(),
            },
        })
    }
}

#[async_trait]
impl<K: Kind> KindClient<K> for RestKindClient<K> {
    async fn create(
        &self,
        _ctx: &Context,
        resource: K,
        opts: &RequestOptions,
    ) -> Result<K, ClientError> {
        let name = resource.metadata().name.clone();
        let namespace = resource.metadata().namespace.clone().or_else(|| opts.namespace.clone());
        let url = self.url(namespace.as_deref(), None);
        let body = Self::body(resource)?;

        let response = self.http.send(Method::POST, url.as_str(), Some(&body)).await?;
        Self::decode(&Method::POST, &name, response)
    }

    async fn update(
        &self,
        _ctx: &Context,
        resource: K,
        opts: &RequestOptions,
    ) -> Result<K, ClientError> {
        let name = resource.metadata().name.clone();
        let namespace = resource.metadata().namespace.clone().or_else(|| opts.namespace.clone());
        let url = self.url(namespace.as_deref(), Some(&name));
        let body = Self::body(resource)?;

        let response = self.http.send(Method::PUT, url.as_str(), Some(&body)).await?;
        Self::decode(&Method::PUT, &name, response)
    }

    async fn delete(
        &self,
        _ctx: &Context,
        name: &str,
        opts: &RequestOptions,
    ) -> Result<K, ClientError> {
        let url = Self::with_query(
            self.url(opts.namespace.as_deref(), Some(name)),
            &[("resourceVersion", opts.resource_version.as_deref())],
        );

        let response = self.http.send(Method::DELETE, url.as_str(), None).await?;
        Self::decode(&Method::DELETE, name, response)
    }

    async fn get(&self, _ctx: &Context, name: &str, opts: &RequestOptions) -> Result<K, ClientError> {
        let url = Self::with_query(
            self.url(opts.namespace.as_deref(), Some(name)),
            &[("resourceVersion", opts.resource_version.as_deref())],
        );

        let response = self.http.send(Method::GET, url.as_str(), None).await?;
        Self::decode(&Method::GET, name, response)
    }

    async fn list(&self, _ctx: &Context, opts: &RequestOptions) -> Result<List<K>, ClientError> {
        let url = Self::with_query(
            self.url(opts.namespace.as_deref(), None),
            &[
                ("name", opts.name.as_deref()),
                ("resourceVersion", opts.resource_version.as_deref()),
            ],
        );

        let response = self.http.send(Method::GET, url.as_str(), None).await?;
        Self::decode(&Method::GET, opts.name.as_deref().unwrap_or(""), response)
    }
}

/// [`Client`] backed by a control-plane REST API
pub struct RestClient {
    bgp_configurations: RestKindClient<BgpConfiguration>,
    bgp_peers: RestKindClient<BgpPeer>,
}

impl RestClient {
    /// Create a client for `endpoint` (e.g. `https://10.0.0.1:6443`)
    pub fn new(
        endpoint: &str,
        token: Option<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, ClientError> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| ClientError::Validation(format!("invalid endpoint '{}': {}", endpoint, e)))?;
        if endpoint.cannot_be_a_base() {
            return Err(ClientError::Validation(format!(
                "invalid endpoint '{}': not a base URL",
                endpoint
            )));
        }

        let http = HttpTransport::new(token, timeout)?;
        tracing::debug!("REST client for {}", endpoint);

        Ok(Self {
            bgp_configurations: RestKindClient::new(http.clone(), endpoint.clone()),
            bgp_peers: RestKindClient::new(http, endpoint),
        })
    }
}

impl Client for RestClient {
    fn bgp_configurations(&self) -> &dyn KindClient<BgpConfiguration> {
        &self.bgp_configurations
    }

    fn bgp_peers(&self) -> &dyn KindClient<BgpPeer> {
        &self.bgp_peers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind_client(endpoint: &str) -> RestKindClient<BgpConfiguration> {
        let http = HttpTransport::new(None, None).unwrap();
        RestKindClient::new(http, Url::parse(endpoint).unwrap())
    }

    #[test]
    fn test_url_layout() {
        let client = kind_client("http://127.0.0.1:8080");
        assert_eq!(
            client.url(None, Some("default")).as_str(),
            "http://127.0.0.1:8080/apis/projectcalico.org/v3/bgpconfigurations/default"
        );
    }

    #[test]
    fn test_url_keeps_endpoint_prefix_and_encodes_name() {
        let client = kind_client("https://api.example.net/control/");
        assert_eq!(
            client.url(None, Some("node.rack 1")).as_str(),
            "https://api.example.net/control/apis/projectcalico.org/v3/bgpconfigurations/node.rack%201"
        );
    }

    #[test]
    fn test_query_only_carries_set_values() {
        let client = kind_client("http://localhost");
        let url = RestKindClient::<BgpConfiguration>::with_query(
            client.url(None, None),
            &[("name", Some("default")), ("resourceVersion", None)],
        );
        assert_eq!(url.query(), Some("name=default"));
    }

    #[test]
    fn test_invalid_endpoint_rejected() {
        assert!(matches!(
            RestClient::new("not a url", None, None),
            Err(ClientError::Validation(_))
        ));
    }
}
