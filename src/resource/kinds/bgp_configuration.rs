use crate::api::BgpConfiguration;
use crate::resource::column::{non_empty, non_empty_opt, non_zero};
use crate::resource::registry::Registration;

pub(super) fn registration() -> Registration<BgpConfiguration> {
    Registration::<BgpConfiguration>::new()
        .aliases(&["bgpconfiguration", "bgpconfigurations", "bgpconfig", "bgpconfigs"])
        .default_columns(&["NAME", "LOGSEVERITY", "MESHENABLED", "ASNUMBER"])
        .wide_columns(&[
            "NAME",
            "LOGSEVERITY",
            "MESHENABLED",
            "ASNUMBER",
            "LISTENPORT",
            "PASSWORD",
        ])
        .column("NAME", |r| non_empty(&r.metadata.name))
        .column("LOGSEVERITY", |r| {
            non_empty_opt(r.spec.log_severity_screen.as_ref())
        })
        .column("MESHENABLED", |r| {
            r.spec.node_to_node_mesh_enabled.map(|b| b.to_string())
        })
        .column("ASNUMBER", |r| r.spec.as_number.and_then(non_zero))
        .column("LISTENPORT", |r| r.spec.listen_port.and_then(non_zero))
        .column("PASSWORD", |r| r.spec.password.as_ref().and_then(|p| p.display()))
}
