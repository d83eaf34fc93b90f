//! Output rendering
//!
//! Tables use the descriptor's column sets; YAML and JSON dump the objects.

use crate::api::{ResourceListObject, ResourceObject};
use crate::resource::decode::GENERIC_LIST_KIND;
use crate::resource::{ColumnSet, ResourceDescriptor};
use anyhow::Result;
use clap::ValueEnum;
use tabled::builder::Builder;
use tabled::settings::Style;

/// Output format for `get`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Output {
    #[default]
    Table,
    Wide,
    Yaml,
    Json,
}

/// Objects of one kind, ready to render
pub struct Group<'a> {
    pub descriptor: &'a ResourceDescriptor,
    pub objects: Vec<ResourceObject>,
}

/// Render all groups in the chosen format
pub fn render(groups: &[Group<'_>], output: Output) -> Result<String> {
    match output {
        Output::Table => render_tables(groups, ColumnSet::Default),
        Output::Wide => render_tables(groups, ColumnSet::Wide),
        Output::Yaml | Output::Json => {
            let mut objects: Vec<ResourceObject> = groups
                .iter()
                .flat_map(|g| g.objects.iter().cloned())
                .collect();

            if objects.len() == 1 {
                let object = objects.remove(0);
                return serialize(&object, output);
            }

            // One kind keeps its own list kind; a mix becomes a generic List
            let list_kind = match groups {
                [group] => group.descriptor.list_kind(),
                _ => GENERIC_LIST_KIND,
            };
            serialize(&ResourceListObject::new(list_kind, objects), output)
        }
    }
}

fn serialize<T: serde::Serialize>(value: &T, output: Output) -> Result<String> {
    Ok(match output {
        Output::Json => {
            let mut text = serde_json::to_string_pretty(value)?;
            text.push('\n');
            text
        }
        _ => serde_yaml::to_string(value)?,
    })
}

fn render_tables(groups: &[Group<'_>], set: ColumnSet) -> Result<String> {
    let mut tables = Vec::with_capacity(groups.len());

    for group in groups {
        let mut records: Vec<Vec<String>> = Vec::with_capacity(group.objects.len() + 1);
        records.push(
            group
                .descriptor
                .headers(set)
                .iter()
                .map(|h| h.to_string())
                .collect(),
        );
        for object in &group.objects {
            records.push(group.descriptor.row(set, object)?);
        }

        let mut table = Builder::from(records).build();
        table.with(Style::blank());
        tables.push(table.to_string());
    }

    let mut text = tables.join("\n\n");
    text.push('\n');
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{BgpConfiguration, BgpPeer, Kind};
    use crate::resource::Registry;

    #[test]
    fn test_table_has_headers_and_placeholders() {
        let registry = Registry::with_defaults();
        let mut config = BgpConfiguration::new("default");
        config.spec.log_severity_screen = Some("Info".to_string());
        let groups = [Group {
            descriptor: registry.lookup("bgpconfig").unwrap(),
            objects: vec![config.into_object()],
        }];

        let text = render(&groups, Output::Table).unwrap();
        let mut lines = text.lines();
        let header: Vec<_> = lines.next().unwrap().split_whitespace().collect();
        assert_eq!(header, ["NAME", "LOGSEVERITY", "MESHENABLED", "ASNUMBER"]);
        let row: Vec<_> = lines.next().unwrap().split_whitespace().collect();
        assert_eq!(row, ["default", "Info", "-", "-"]);
    }

    #[test]
    fn test_wide_adds_columns() {
        let registry = Registry::with_defaults();
        let groups = [Group {
            descriptor: registry.lookup("bgppeer").unwrap(),
            objects: vec![BgpPeer::new("tor", "10.0.0.1", 64512).into_object()],
        }];

        let text = render(&groups, Output::Wide).unwrap();
        assert!(text.lines().next().unwrap().contains("PEERSELECTOR"));
    }

    #[test]
    fn test_single_object_is_not_wrapped() {
        let registry = Registry::with_defaults();
        let groups = [Group {
            descriptor: registry.lookup("bgpconfig").unwrap(),
            objects: vec![BgpConfiguration::new("default").into_object()],
        }];

        let json: serde_json::Value =
            serde_json::from_str(&render(&groups, Output::Json).unwrap()).unwrap();
        assert_eq!(json["kind"], "BGPConfiguration");
        assert_eq!(json["metadata"]["name"], "default");
    }

    #[test]
    fn test_several_objects_become_a_list() {
        let registry = Registry::with_defaults();
        let groups = [
            Group {
                descriptor: registry.lookup("bgpconfig").unwrap(),
                objects: vec![BgpConfiguration::new("default").into_object()],
            },
            Group {
                descriptor: registry.lookup("bgppeer").unwrap(),
                objects: vec![BgpPeer::new("tor", "10.0.0.1", 64512).into_object()],
            },
        ];

        let yaml = render(&groups, Output::Yaml).unwrap();
        let value: serde_yaml::Value = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(value["kind"].as_str(), Some("List"));
        assert_eq!(value["items"].as_sequence().map(Vec::len), Some(2));

        let back = crate::resource::parse_documents(&registry, &yaml).unwrap();
        let kinds: Vec<_> = back.iter().map(ResourceObject::kind).collect();
        assert_eq!(kinds, ["BGPConfiguration", "BGPPeer"]);
    }

    #[test]
    fn test_one_kind_uses_its_list_kind() {
        let registry = Registry::with_defaults();
        let groups = [Group {
            descriptor: registry.lookup("bgppeer").unwrap(),
            objects: vec![
                BgpPeer::new("a", "10.0.0.1", 64512).into_object(),
                BgpPeer::new("b", "10.0.0.2", 64512).into_object(),
            ],
        }];

        let yaml = render(&groups, Output::Yaml).unwrap();
        assert!(yaml.starts_with("apiVersion: projectcalico.org/v3\nkind: BGPPeerList\n"));

        let back = crate::resource::parse_documents(&registry, &yaml).unwrap();
        assert_eq!(back, groups[0].objects);
    }
}
