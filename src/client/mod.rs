//! Backing client interface
//!
//! The dispatch layer talks to the control plane only through these traits.
//!
//! - [`memory`] - in-process store with full resource-version semantics
//! - [`http`] - HTTP transport utilities
//! - [`rest`] - REST client for a control-plane API server

pub mod http;
pub mod memory;
pub mod rest;

use crate::api::{BgpConfiguration, BgpPeer, Kind, List};
use crate::context::Context;
use crate::error::ClientError;
use async_trait::async_trait;

pub use memory::{MemoryClient, MemoryStore};
pub use rest::RestClient;

/// Options shared by every CRUD call
///
/// Not every field applies to every call: `name` only filters List, and
/// `namespace` is only used for namespaced kinds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    /// Pin the call to this revision
    pub resource_version: Option<String>,
    pub name: Option<String>,
    pub namespace: Option<String>,
}

impl RequestOptions {
    pub fn with_resource_version(mut self, version: Option<&str>) -> Self {
        self.resource_version = version.filter(|v| !v.is_empty()).map(str::to_string);
        self
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = (!name.is_empty()).then(|| name.to_string());
        self
    }

    pub fn with_namespace(mut self, namespace: Option<&str>) -> Self {
        self.namespace = namespace.map(str::to_string);
        self
    }
}

/// CRUD calls for a single kind
#[async_trait]
pub trait KindClient<K: Kind>: Send + Sync {
    async fn create(&self, ctx: &Context, resource: K, opts: &RequestOptions)
        -> Result<K, ClientError>;

    async fn update(&self, ctx: &Context, resource: K, opts: &RequestOptions)
        -> Result<K, ClientError>;

    async fn delete(&self, ctx: &Context, name: &str, opts: &RequestOptions)
        -> Result<K, ClientError>;

    async fn get(&self, ctx: &Context, name: &str, opts: &RequestOptions)
        -> Result<K, ClientError>;

    async fn list(&self, ctx: &Context, opts: &RequestOptions) -> Result<List<K>, ClientError>;
}

/// A backing client: one [`KindClient`] per supported kind
pub trait Client: Send + Sync {
    fn bgp_configurations(&self) -> &dyn KindClient<BgpConfiguration>;
    fn bgp_peers(&self) -> &dyn KindClient<BgpPeer>;
}
