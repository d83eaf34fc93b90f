//! Resource document decoding
//!
//! Turns YAML (or JSON) text into [`ResourceObject`]s. The `kind` field of each
//! document is resolved through the registry, so aliases are accepted, and
//! `<Kind>List` documents expand to their items.

use super::descriptor::ResourceDescriptor;
use super::registry::Registry;
use crate::api::{ResourceObject, API_VERSION};
use crate::error::{Error, Result};
use serde::Deserialize;
use serde_yaml::Value;

/// Kind of a list mixing several resource kinds
pub const GENERIC_LIST_KIND: &str = "List";

/// Parse every document in `text`, in order
///
/// Empty documents (e.g. a trailing `---`) are skipped. `index` in errors is
/// the zero-based position of the document in the stream.
pub fn parse_documents(registry: &Registry, text: &str) -> Result<Vec<ResourceObject>> {
    let mut objects = Vec::new();

    for (index, document) in serde_yaml::Deserializer::from_str(text).enumerate() {
        let value = Value::deserialize(document).map_err(|e| Error::decode(index, e.to_string()))?;
        if value.is_null() {
            continue;
        }
        objects.extend(decode_value(registry, index, value)?);
    }

    tracing::debug!("decoded {} resource(s)", objects.len());
    Ok(objects)
}

fn decode_value(registry: &Registry, index: usize, value: Value) -> Result<Vec<ResourceObject>> {
    if !value.is_mapping() {
        return Err(Error::decode(index, "document is not a mapping"));
    }

    if let Some(api_version) = value.get("apiVersion").and_then(Value::as_str) {
        if api_version != API_VERSION {
            return Err(Error::decode(
                index,
                format!("unsupported apiVersion '{}', expected '{}'", api_version, API_VERSION),
            ));
        }
    }

    let Some(kind) = value.get("kind").and_then(Value::as_str).map(str::to_string) else {
        return Err(Error::decode(index, "missing 'kind'"));
    };

    // A generic List holds items of any kind, each naming its own
    if kind.trim().eq_ignore_ascii_case(GENERIC_LIST_KIND) {
        let mut objects = Vec::new();
        for item in list_items(index, &value)? {
            if item.get("kind").and_then(Value::as_str).is_none() {
                return Err(Error::decode(index, "list item is missing 'kind'"));
            }
            if item.get("items").is_some() {
                return Err(Error::decode(index, "nested lists are not supported"));
            }
            objects.extend(decode_value(registry, index, item)?);
        }
        return Ok(objects);
    }

    if let Some(descriptor) = list_descriptor(registry, &kind) {
        return list_items(index, &value)?
            .into_iter()
            .map(|item| decode_one(descriptor, index, item))
            .collect();
    }

    let descriptor = registry.lookup(&kind)?;
    decode_one(descriptor, index, value).map(|object| vec![object])
}

fn list_items(index: usize, value: &Value) -> Result<Vec<Value>> {
    match value.get("items") {
        Some(Value::Sequence(items)) => Ok(items.clone()),
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(_) => Err(Error::decode(index, "'items' is not a sequence")),
    }
}

/// Descriptor whose list kind is `kind`, if any
fn list_descriptor<'a>(registry: &'a Registry, kind: &str) -> Option<&'a ResourceDescriptor> {
    registry
        .descriptors()
        .find(|d| d.list_kind().eq_ignore_ascii_case(kind.trim()))
}

fn decode_one(descriptor: &ResourceDescriptor, index: usize, value: Value) -> Result<ResourceObject> {
    match value.get("metadata") {
        Some(Value::Mapping(_)) => {}
        Some(_) => return Err(Error::decode(index, "'metadata' is not a mapping")),
        None => return Err(Error::decode(index, "missing 'metadata'")),
    }

    descriptor
        .decode(value)
        .map_err(|message| Error::decode(index, message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ResourceObject;

    #[test]
    fn test_alias_kinds_decode_to_canonical_variant() {
        let registry = Registry::with_defaults();
        let text = r#"
apiVersion: projectcalico.org/v3
kind: bgpconfig
metadata:
  name: default
spec:
  asNumber: 64512
  nodeToNodeMeshEnabled: false
---
kind: BGPPeer
metadata:
  name: rack1-tor
spec:
  peerIP: 192.0.2.1
  asNumber: 64513
---
"#;
        let objects = parse_documents(&registry, text).unwrap();
        assert_eq!(objects.len(), 2);

        let ResourceObject::BgpConfiguration(config) = &objects[0] else {
            panic!("expected BGPConfiguration, got {}", objects[0].kind());
        };
        assert_eq!(config.spec.as_number, Some(64512));
        assert_eq!(config.spec.node_to_node_mesh_enabled, Some(false));

        assert_eq!(objects[1].kind(), "BGPPeer");
        assert_eq!(objects[1].name(), "rack1-tor");
    }

    #[test]
    fn test_json_document() {
        let registry = Registry::with_defaults();
        let text = r#"{"kind":"BGPPeer","metadata":{"name":"p"},"spec":{"peerIP":"10.0.0.1","asNumber":65000}}"#;
        let objects = parse_documents(&registry, text).unwrap();
        assert_eq!(objects[0].name(), "p");
    }

    #[test]
    fn test_list_document_expands() {
        let registry = Registry::with_defaults();
        let text = r#"
kind: BGPPeerList
items:
- kind: BGPPeer
  metadata: {name: a}
  spec: {peerIP: 10.0.0.1, asNumber: 65000}
- metadata: {name: b}
  spec: {peerIP: 10.0.0.2, asNumber: 65000}
"#;
        let objects = parse_documents(&registry, text).unwrap();
        let names: Vec<_> = objects.iter().map(ResourceObject::name).collect();
        assert_eq!(names, ["a", "b"]);
    }

    #[test]
    fn test_generic_list_decodes_each_item_by_its_kind() {
        let registry = Registry::with_defaults();
        let text = r#"
apiVersion: projectcalico.org/v3
kind: List
metadata: {}
items:
- kind: BGPConfiguration
  metadata: {name: default}
- kind: bgppeer
  metadata: {name: tor}
  spec: {peerIP: 10.0.0.1, asNumber: 65000}
"#;
        let objects = parse_documents(&registry, text).unwrap();
        let kinds: Vec<_> = objects.iter().map(ResourceObject::kind).collect();
        assert_eq!(kinds, ["BGPConfiguration", "BGPPeer"]);
    }

    #[test]
    fn test_generic_list_item_needs_kind() {
        let registry = Registry::with_defaults();
        let text = "kind: List\nitems:\n- metadata: {name: a}\n";
        assert!(matches!(
            parse_documents(&registry, text),
            Err(Error::Decode { index: 0, .. })
        ));
    }

    #[test]
    fn test_unknown_kind() {
        let registry = Registry::with_defaults();
        let err = parse_documents(&registry, "kind: IPPool\nmetadata: {name: x}\n").unwrap_err();
        assert!(matches!(err, Error::UnknownKind(kind) if kind == "IPPool"));
    }

    #[test]
    fn test_errors_carry_document_index() {
        let registry = Registry::with_defaults();
        let text = "kind: BGPPeer\nmetadata: {name: a}\n---\nkind: BGPPeer\nspec: {}\n";
        let err = parse_documents(&registry, text).unwrap_err();
        assert!(matches!(err, Error::Decode { index: 1, .. }));
    }

    #[test]
    fn test_wrong_api_version() {
        let registry = Registry::with_defaults();
        let text = "apiVersion: v1\nkind: BGPPeer\nmetadata: {name: a}\n";
        assert!(matches!(
            parse_documents(&registry, text),
            Err(Error::Decode { index: 0, .. })
        ));
    }

    #[test]
    fn test_bad_field_type() {
        let registry = Registry::with_defaults();
        let text = "kind: BGPConfiguration\nmetadata: {name: a}\nspec: {asNumber: lots}\n";
        let err = parse_documents(&registry, text).unwrap_err();
        assert!(err.to_string().contains("invalid BGPConfiguration"));
    }
}
