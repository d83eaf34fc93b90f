//! BGP peer resource

use super::{default_api_version, BgpPassword, Kind, ObjectMeta, ResourceObject};
use crate::client::{Client, KindClient};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BgpPeer {
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: BgpPeerSpec,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BgpPeerSpec {
    /// Node that peers; unset means every node
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node: Option<String>,
    #[serde(default, rename = "peerIP")]
    pub peer_ip: String,
    #[serde(default)]
    pub as_number: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_selector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub peer_selector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<BgpPassword>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub keep_original_next_hop: bool,
}

impl BgpPeer {
    pub fn new(name: impl Into<String>, peer_ip: impl Into<String>, as_number: u32) -> Self {
        Self {
            api_version: default_api_version(),
            metadata: ObjectMeta::named(name),
            spec: BgpPeerSpec {
                peer_ip: peer_ip.into(),
                as_number,
                ..Default::default()
            },
        }
    }
}

impl Kind for BgpPeer {
    const KIND: &'static str = "BGPPeer";
    const LIST_KIND: &'static str = "BGPPeerList";
    const PLURAL: &'static str = "bgppeers";
    const NAMESPACED: bool = false;

    fn from_metadata(metadata: ObjectMeta) -> Self {
        Self {
            api_version: default_api_version(),
            metadata,
            spec: BgpPeerSpec::default(),
        }
    }

    fn metadata(&self) -> &ObjectMeta {
        &self.metadata
    }

    fn metadata_mut(&mut self) -> &mut ObjectMeta {
        &mut self.metadata
    }

    fn into_object(self) -> ResourceObject {
        ResourceObject::BgpPeer(self)
    }

    fn from_object(object: ResourceObject) -> Result<Self, ResourceObject> {
        match object {
            ResourceObject::BgpPeer(r) => Ok(r),
            other => Err(other),
        }
    }

    fn from_object_ref(object: &ResourceObject) -> Option<&Self> {
        match object {
            ResourceObject::BgpPeer(r) => Some(r),
            _ => None,
        }
    }

    fn client(client: &dyn Client) -> &dyn KindClient<Self> {
        client.bgp_peers()
    }
}
