use crate::api::BgpPeer;
use crate::resource::column::{non_empty, non_empty_opt, non_zero};
use crate::resource::registry::Registration;

/// Peers with neither a node nor a node selector apply to every node
fn node(peer: &BgpPeer) -> Option<String> {
    match (&peer.spec.node, &peer.spec.node_selector) {
        (Some(node), _) if !node.is_empty() => Some(node.clone()),
        (_, Some(selector)) if !selector.is_empty() => None,
        _ => Some("(global)".to_string()),
    }
}

pub(super) fn registration() -> Registration<BgpPeer> {
    Registration::<BgpPeer>::new()
        .aliases(&["bgppeer", "bgppeers", "bgpp", "bgpps", "bp", "bps"])
        .default_columns(&["NAME", "PEERIP", "NODE", "ASN"])
        .wide_columns(&[
            "NAME",
            "PEERIP",
            "NODE",
            "ASN",
            "NODESELECTOR",
            "PEERSELECTOR",
            "PASSWORD",
        ])
        .column("NAME", |r| non_empty(&r.metadata.name))
        .column("PEERIP", |r| non_empty(&r.spec.peer_ip))
        .column("NODE", node)
        .column("ASN", |r| non_zero(r.spec.as_number))
        .column("NODESELECTOR", |r| non_empty_opt(r.spec.node_selector.as_ref()))
        .column("PEERSELECTOR", |r| non_empty_opt(r.spec.peer_selector.as_ref()))
        .column("PASSWORD", |r| r.spec.password.as_ref().and_then(|p| p.display()))
}
