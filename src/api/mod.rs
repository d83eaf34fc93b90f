//! Resource value types
//!
//! Every manageable kind is a concrete struct implementing [`Kind`]. The
//! closed [`ResourceObject`] enum is the type-erased handle the registry and
//! commands pass around; adapters narrow it back with [`Kind::from_object`].
//!
//! - [`bgp_configuration`] - cluster-wide BGP settings
//! - [`bgp_peer`] - explicit BGP peerings

pub mod bgp_configuration;
pub mod bgp_peer;

use crate::client::{Client, KindClient};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub use bgp_configuration::{BgpConfiguration, BgpConfigurationSpec, BgpPassword, SecretKeySelector};
pub use bgp_peer::{BgpPeer, BgpPeerSpec};

/// API group/version written on every object
pub const API_VERSION: &str = "projectcalico.org/v3";

fn default_api_version() -> String {
    API_VERSION.to_string()
}

/// Standard object metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    /// Opaque revision token, set by the server
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
}

impl ObjectMeta {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Resource version if set and non-empty
    pub fn version(&self) -> Option<&str> {
        self.resource_version.as_deref().filter(|v| !v.is_empty())
    }
}

/// List metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_version: Option<String>,
}

/// Typed collection returned by a backing client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "K: DeserializeOwned"))]
pub struct List<K> {
    #[serde(default)]
    pub metadata: ListMeta,
    #[serde(default = "Vec::new")]
    pub items: Vec<K>,
}

impl<K> List<K> {
    pub fn new(items: Vec<K>, resource_version: Option<String>) -> Self {
        Self {
            metadata: ListMeta { resource_version },
            items,
        }
    }
}

/// A concrete resource kind
///
/// Implemented once per resource struct. The associated constants are the
/// registration identity; the narrowing functions connect the struct to the
/// type-erased [`ResourceObject`].
pub trait Kind:
    Clone + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    const KIND: &'static str;
    const LIST_KIND: &'static str;
    /// Lower-case plural used in REST paths
    const PLURAL: &'static str;
    const NAMESPACED: bool;

    /// Empty resource carrying only `metadata`
    fn from_metadata(metadata: ObjectMeta) -> Self;

    fn metadata(&self) -> &ObjectMeta;
    fn metadata_mut(&mut self) -> &mut ObjectMeta;

    fn into_object(self) -> ResourceObject;

    /// Narrow a generic handle; hands the handle back on mismatch
    fn from_object(object: ResourceObject) -> Result<Self, ResourceObject>;

    /// Borrowing form of [`Kind::from_object`]
    fn from_object_ref(object: &ResourceObject) -> Option<&Self>;

    /// Borrow the per-kind backing client
    fn client(client: &dyn Client) -> &dyn KindClient<Self>;
}

/// Type-erased handle to one resource of any registered kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum ResourceObject {
    #[serde(rename = "BGPConfiguration")]
    BgpConfiguration(BgpConfiguration),
    #[serde(rename = "BGPPeer")]
    BgpPeer(BgpPeer),
}

impl ResourceObject {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::BgpConfiguration(_) => BgpConfiguration::KIND,
            Self::BgpPeer(_) => BgpPeer::KIND,
        }
    }

    pub fn metadata(&self) -> &ObjectMeta {
        match self {
            Self::BgpConfiguration(r) => r.metadata(),
            Self::BgpPeer(r) => r.metadata(),
        }
    }

    pub fn metadata_mut(&mut self) -> &mut ObjectMeta {
        match self {
            Self::BgpConfiguration(r) => r.metadata_mut(),
            Self::BgpPeer(r) => r.metadata_mut(),
        }
    }

    pub fn name(&self) -> &str {
        &self.metadata().name
    }
}

/// Type-erased collection produced by List
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceListObject {
    pub api_version: String,
    pub kind: String,
    pub metadata: ListMeta,
    pub items: Vec<ResourceObject>,
}

impl ResourceListObject {
    pub fn new(kind: impl Into<String>, items: Vec<ResourceObject>) -> Self {
        Self {
            api_version: default_api_version(),
            kind: kind.into(),
            metadata: ListMeta::default(),
            items,
        }
    }

    pub fn from_typed<K: Kind>(list: List<K>) -> Self {
        Self {
            api_version: default_api_version(),
            kind: K::LIST_KIND.to_string(),
            metadata: list.metadata,
            items: list.items.into_iter().map(Kind::into_object).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_round_trips_through_kind_tag() {
        let mut config = BgpConfiguration::new("default");
        config.spec.as_number = Some(64512);

        let yaml = serde_yaml::to_string(&config.clone().into_object()).unwrap();
        assert!(yaml.contains("kind: BGPConfiguration"));
        assert!(yaml.contains("apiVersion: projectcalico.org/v3"));

        let back: ResourceObject = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back, ResourceObject::BgpConfiguration(config));
    }

    #[test]
    fn test_narrowing_hands_back_mismatched_object() {
        let peer = BgpPeer::new("rack1-tor", "10.0.0.1", 64513).into_object();
        let Err(original) = BgpConfiguration::from_object(peer.clone()) else {
            panic!("peer should not narrow to BGPConfiguration");
        };
        assert_eq!(original, peer);
    }

    #[test]
    fn test_empty_resource_version_is_absent() {
        let mut meta = ObjectMeta::named("x");
        meta.resource_version = Some(String::new());
        assert_eq!(meta.version(), None);
        meta.resource_version = Some("12".to_string());
        assert_eq!(meta.version(), Some("12"));
    }

    #[test]
    fn test_list_object_keeps_list_kind_and_revision() {
        let list = List::new(
            vec![BgpConfiguration::new("default")],
            Some("42".to_string()),
        );
        let erased = ResourceListObject::from_typed(list);
        assert_eq!(erased.kind, "BGPConfigurationList");
        assert_eq!(erased.metadata.resource_version.as_deref(), Some("42"));
        assert_eq!(erased.len(), 1);
    }
}
