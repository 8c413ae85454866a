//! Owned node identity record and lenient extraction from an attribute map.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::attribute::{AttributeMap, AttributeValue};
use crate::keys;

/// Identity attributes of one workload instance.
///
/// Empty strings mean "absent". Extraction is lenient, so a document
/// missing a field still produces an encodable record. Label and
/// platform-metadata maps are `BTreeMap`s: iteration order is the canonical
/// sorted-by-key order the binary codec relies on for binary-search lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeInfo {
    pub name: String,
    pub namespace: String,
    pub owner: String,
    pub workload_name: String,
    pub mesh_id: String,
    pub cluster_id: String,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    #[serde(default)]
    pub platform_metadata: BTreeMap<String, String>,
}

impl NodeInfo {
    /// Extract a node record from a parsed metadata document.
    ///
    /// Missing keys and wrongly-typed values become empty defaults rather
    /// than errors; callers needing strict validation must do it upstream.
    /// Non-string values inside the sub-maps are skipped; a key repeated in
    /// the source document resolves to its last occurrence.
    pub fn from_attributes(attributes: &AttributeMap) -> Self {
        Self {
            name: string_field(attributes, keys::NAME_KEY),
            namespace: string_field(attributes, keys::NAMESPACE_KEY),
            owner: string_field(attributes, keys::OWNER_KEY),
            workload_name: string_field(attributes, keys::WORKLOAD_NAME_KEY),
            mesh_id: string_field(attributes, keys::MESH_ID_KEY),
            cluster_id: string_field(attributes, keys::CLUSTER_ID_KEY),
            labels: string_map(attributes, keys::LABELS_KEY),
            platform_metadata: string_map(attributes, keys::PLATFORM_METADATA_KEY),
        }
    }

    /// Node identity: `<name>.<namespace>`.
    pub fn node_id(&self) -> String {
        format!("{}.{}", self.name, self.namespace)
    }
}

fn string_field(attributes: &AttributeMap, key: &str) -> String {
    attributes.get_str(key).unwrap_or_default().to_string()
}

fn string_map(attributes: &AttributeMap, key: &str) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();
    if let Some(map) = attributes.get_map(key) {
        for (k, v) in map.iter() {
            if let AttributeValue::String(s) = v {
                out.insert(k.to_string(), s.clone());
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_attributes() -> AttributeMap {
        let doc = serde_json::json!({
            "NAME": "test_pod",
            "NAMESPACE": "test_namespace",
            "OWNER": "test_owner",
            "WORKLOAD_NAME": "test_workload",
            "MESH_ID": "test-mesh",
            "LABELS": {
                "app": "productpage",
                "version": "v1",
            },
            "PLATFORM_METADATA": {
                "gcp_project": "test_project",
            },
        });
        AttributeMap::try_from(&doc).unwrap()
    }

    #[test]
    fn test_extraction() {
        let node = NodeInfo::from_attributes(&sample_attributes());
        assert_eq!(node.name, "test_pod");
        assert_eq!(node.namespace, "test_namespace");
        assert_eq!(node.workload_name, "test_workload");
        assert_eq!(node.mesh_id, "test-mesh");
        assert_eq!(node.labels.get("app").map(String::as_str), Some("productpage"));
        assert_eq!(node.node_id(), "test_pod.test_namespace");
    }

    #[test]
    fn test_missing_fields_default_empty() {
        let mut attrs = AttributeMap::new();
        attrs.insert(keys::NAME_KEY, "solo");
        let node = NodeInfo::from_attributes(&attrs);
        assert_eq!(node.name, "solo");
        assert_eq!(node.namespace, "");
        assert_eq!(node.cluster_id, "");
        assert!(node.labels.is_empty());
        assert_eq!(node.node_id(), "solo.");
    }

    #[test]
    fn test_non_string_label_values_skipped() {
        let doc = serde_json::json!({
            "LABELS": { "app": "web", "nested": { "x": "y" } },
        });
        let attrs = AttributeMap::try_from(&doc).unwrap();
        let node = NodeInfo::from_attributes(&attrs);
        assert_eq!(node.labels.len(), 1);
        assert_eq!(node.labels.get("app").map(String::as_str), Some("web"));
    }
}
