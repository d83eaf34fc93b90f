//! BGP configuration resource
//!
//! Cluster-wide BGP settings. The object named `default` applies to every
//! node; `node.<name>` objects override it per node.

use super::{default_api_version, Kind, ObjectMeta, ResourceObject};
use crate::client::{Client, KindClient};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BgpConfiguration {
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: BgpConfigurationSpec,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BgpConfigurationSpec {
    /// Log level for the BGP daemon's screen output (e.g. "Info")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_severity_screen: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_to_node_mesh_enabled: Option<bool>,
    /// Default AS number for nodes without their own
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub as_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<BgpPassword>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listen_port: Option<u16>,
}

/// Password reference; the secret itself never lives in the resource
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BgpPassword {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_key_ref: Option<SecretKeySelector>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SecretKeySelector {
    pub name: String,
    pub key: String,
}

impl BgpPassword {
    /// `secret/key`, or None when no reference is set
    pub fn display(&self) -> Option<String> {
        self.secret_key_ref
            .as_ref()
            .map(|r| format!("{}/{}", r.name, r.key))
    }
}

impl BgpConfiguration {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            api_version: default_api_version(),
            metadata: ObjectMeta::named(name),
            spec: BgpConfigurationSpec::default(),
        }
    }
}

impl Kind for BgpConfiguration {
    const KIND: &'static str = "BGPConfiguration";
    const LIST_KIND: &'static str = "BGPConfigurationList";
    const PLURAL: &'static str = "bgpconfigurations";
    const NAMESPACED: bool = false;

    fn from_metadata(metadata: ObjectMeta) -> Self {
        Self {
            api_version: default_api_version(),
            metadata,
            spec: BgpConfigurationSpec::default(),
        }
    }

    fn metadata(&self) -> &ObjectMeta {
        &self.metadata
    }

    fn metadata_mut(&mut self) -> &mut ObjectMeta {
        &mut self.metadata
    }

    fn into_object(self) -> ResourceObject {
        ResourceObject::BgpConfiguration(self)
    }

    fn from_object(object: ResourceObject) -> Result<Self, ResourceObject> {
        match object {
            ResourceObject::BgpConfiguration(r) => Ok(r),
            other => Err(other),
        }
    }

    fn from_object_ref(object: &ResourceObject) -> Option<&Self> {
        match object {
            ResourceObject::BgpConfiguration(r) => Some(r),
            _ => None,
        }
    }

    fn client(client: &dyn Client) -> &dyn KindClient<Self> {
        client.bgp_configurations()
    }
}
