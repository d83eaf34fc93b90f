//! In-memory backing client
//!
//! Keeps resources in process with the same revision rules a control-plane
//! datastore applies: every write bumps a shared revision counter, updates
//! must carry the current revision, and deletes may be pinned to one.

use super::{Client, KindClient, RequestOptions};
use crate::api::{BgpConfiguration, BgpPeer, Kind, List};
use crate::context::Context;
use crate::error::ClientError;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use uuid::Uuid;

/// (namespace, name)
type Key = (String, String);

/// Store for a single kind
pub struct MemoryStore<K> {
    items: RwLock<BTreeMap<Key, K>>,
    revision: Arc<AtomicU64>,
    requests: AtomicUsize,
    latency: Option<Duration>,
}

impl<K: Kind> MemoryStore<K> {
    pub fn new() -> Self {
        Self::with_revision(Arc::new(AtomicU64::new(0)))
    }

    fn with_revision(revision: Arc<AtomicU64>) -> Self {
        Self {
            items: RwLock::new(BTreeMap::new()),
            revision,
            requests: AtomicUsize::new(0),
            latency: None,
        }
    }

    /// Number of calls that reached this store
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    fn next_revision(&self) -> String {
        (self.revision.fetch_add(1, Ordering::SeqCst) + 1).to_string()
    }

    fn current_revision(&self) -> String {
        self.revision.load(Ordering::SeqCst).to_string()
    }

    async fn enter(&self) {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }

    fn key(namespace: Option<&str>, name: &str) -> Key {
        let namespace = if K::NAMESPACED {
            namespace.unwrap_or("default")
        } else {
            ""
        };
        (namespace.to_string(), name.to_string())
    }
}

impl<K: Kind> Default for MemoryStore<K> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<K: Kind> KindClient<K> for MemoryStore<K> {
    async fn create(
        &self,
        _ctx: &Context,
        mut resource: K,
        _opts: &RequestOptions,
    ) -> Result<K, ClientError> {
        self.enter().await;

        let meta = resource.metadata();
        if meta.name.is_empty() {
            return Err(ClientError::Validation("metadata.name must be set".to_string()));
        }
        if meta.version().is_some() {
            return Err(ClientError::Validation(
                "metadata.resourceVersion must not be set on create".to_string(),
            ));
        }

        let key = Self::key(meta.namespace.as_deref(), &meta.name);
        let mut items = self.items.write().await;
        if items.contains_key(&key) {
            return Err(ClientError::already_exists(K::KIND, &key.1));
        }

        let meta = resource.metadata_mut();
        meta.resource_version = Some(self.next_revision());
        meta.uid = Some(Uuid::new_v4().to_string());
        meta.creation_timestamp = Some(Utc::now());
        if K::NAMESPACED && meta.namespace.is_none() {
            meta.namespace = Some(key.0.clone());
        }

        tracing::debug!("memory: created {}({}) at {:?}", K::KIND, key.1, meta.resource_version);
        items.insert(key, resource.clone());
        Ok(resource)
    }

    async fn update(
        &self,
        _ctx: &Context,
        mut resource: K,
        _opts: &RequestOptions,
    ) -> Result<K, ClientError> {
        self.enter().await;

        let meta = resource.metadata();
        let Some(version) = meta.version().map(str::to_string) else {
            return Err(ClientError::Validation(
                "metadata.resourceVersion must be set on update".to_string(),
            ));
        };

        let key = Self::key(meta.namespace.as_deref(), &meta.name);
        let mut items = self.items.write().await;
        let Some(current) = items.get(&key) else {
            return Err(ClientError::not_found(K::KIND, &key.1));
        };

        let current_meta = current.metadata();
        if current_meta.version() != Some(version.as_str()) {
            return Err(ClientError::conflict(
                K::KIND,
                &key.1,
                format!(
                    "resource version {} is stale, current is {}",
                    version,
                    current_meta.version().unwrap_or("-")
                ),
            ));
        }

        let uid = current_meta.uid.clone();
        let created = current_meta.creation_timestamp;

        let meta = resource.metadata_mut();
        meta.resource_version = Some(self.next_revision());
        meta.uid = uid;
        meta.creation_timestamp = created;

        items.insert(key, resource.clone());
        Ok(resource)
    }

    async fn delete(
        &self,
        _ctx: &Context,
        name: &str,
        opts: &RequestOptions,
    ) -> Result<K, ClientError> {
        self.enter().await;

        let key = Self::key(opts.namespace.as_deref(), name);
        let mut items = self.items.write().await;
        let Some(current) = items.get(&key) else {
            return Err(ClientError::not_found(K::KIND, name));
        };

        if let Some(pinned) = opts.resource_version.as_deref() {
            if current.metadata().version() != Some(pinned) {
                return Err(ClientError::conflict(
                    K::KIND,
                    name,
                    format!("resource version {} is not the current version", pinned),
                ));
            }
        }

        // Deletion is a write: advance the revision even though nothing keeps it.
        self.next_revision();
        items
            .remove(&key)
            .ok_or_else(|| ClientError::not_found(K::KIND, name))
    }

    async fn get(&self, _ctx: &Context, name: &str, opts: &RequestOptions) -> Result<K, ClientError> {
        self.enter().await;

        let key = Self::key(opts.namespace.as_deref(), name);
        let items = self.items.read().await;
        let found = items.get(&key).filter(|r| match opts.resource_version.as_deref() {
            Some(pinned) => r.metadata().version() == Some(pinned),
            None => true,
        });

        found
            .cloned()
            .ok_or_else(|| ClientError::not_found(K::KIND, name))
    }

    async fn list(&self, _ctx: &Context, opts: &RequestOptions) -> Result<List<K>, ClientError> {
        self.enter().await;

        let items = self.items.read().await;
        let matched = items
            .iter()
            .filter(|((namespace, name), resource)| {
                let namespace_ok = match (K::NAMESPACED, opts.namespace.as_deref()) {
                    (true, Some(ns)) => namespace == ns,
                    _ => true,
                };
                let name_ok = opts.name.as_deref().map_or(true, |n| n == name);
                let version_ok = opts
                    .resource_version
                    .as_deref()
                    .map_or(true, |v| resource.metadata().version() == Some(v));
                namespace_ok && name_ok && version_ok
            })
            .map(|(_, resource)| resource.clone())
            .collect();

        Ok(List::new(matched, Some(self.current_revision())))
    }
}

/// In-memory [`Client`] with one store per kind and a shared revision counter
pub struct MemoryClient {
    bgp_configurations: MemoryStore<BgpConfiguration>,
    bgp_peers: MemoryStore<BgpPeer>,
}

impl MemoryClient {
    pub fn new() -> Self {
        let revision = Arc::new(AtomicU64::new(0));
        Self {
            bgp_configurations: MemoryStore::with_revision(revision.clone()),
            bgp_peers: MemoryStore::with_revision(revision),
        }
    }

    /// Delay every call by `latency`
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.bgp_configurations.latency = Some(latency);
        self.bgp_peers.latency = Some(latency);
        self
    }

    /// Calls that reached any store
    pub fn request_count(&self) -> usize {
        self.bgp_configurations.request_count() + self.bgp_peers.request_count()
    }
}

impl Default for MemoryClient {
    fn default() -> Self {
        Self::new()
    }
}

impl Client for MemoryClient {
    fn bgp_configurations(&self) -> &dyn KindClient<BgpConfiguration> {
        &self.bgp_configurations
    }

    fn bgp_peers(&self) -> &dyn KindClient<BgpPeer> {
        &self.bgp_peers
    }
}
