pub mod error;
pub mod forest;
pub mod query;
pub mod seed;
pub mod storage;
pub mod tree;
pub mod validate;

pub use error::TreeError;
pub use forest::{Forest, ForestStats};
pub use query::{ListQuery, Page, SubsystemRow};
pub use storage::{Settings, Storage};
pub use tree::ConfigTree;

use serde::{Deserialize, Serialize};
use std::fmt;

// --- Types ---

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeType {
    System,
    Subsystem,
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeType::System => f.write_str("system"),
            NodeType::Subsystem => f.write_str("subsystem"),
        }
    }
}

/// A node of the two-level configuration tree. Systems sit at the top level
/// and own their subsystems through `children`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConfigNode {
    pub id: String,
    /// Owning system for subsystems, `null` for systems.
    #[serde(default)]
    pub parent_id: Option<String>,
    pub name: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ConfigNode>,
}

impl ConfigNode {
    /// An empty top-level system.
    pub fn system(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::bare(id.into(), None, name.into(), NodeType::System)
    }

    /// A subsystem attached to `parent_id`.
    pub fn subsystem(
        id: impl Into<String>,
        parent_id: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self::bare(
            id.into(),
            Some(parent_id.into()),
            name.into(),
            NodeType::Subsystem,
        )
    }

    fn bare(id: String, parent_id: Option<String>, name: String, node_type: NodeType) -> Self {
        Self {
            id,
            parent_id,
            name,
            node_type,
            description: None,
            git_url: None,
            owner_name: None,
            owner_role: None,
            owner_avatar: None,
            language: None,
            children: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn is_system(&self) -> bool {
        self.node_type == NodeType::System
    }

    pub fn is_subsystem(&self) -> bool {
        self.node_type == NodeType::Subsystem
    }
}

// --- Ids ---

pub const SYSTEM_ID_PREFIX: &str = "sys-";
pub const SUBSYSTEM_ID_PREFIX: &str = "sub-";

/// Generate the next system ID. Follows the "sys-{N}" pattern with N
/// incrementing. Ids share one namespace, so subsystem ids are scanned too.
pub fn next_system_id(forest: &Forest) -> String {
    next_id(SYSTEM_ID_PREFIX, all_ids(forest))
}

/// Generate the next "sub-{N}" ID, scanning ids at both levels.
pub fn next_subsystem_id(forest: &Forest) -> String {
    next_id(SUBSYSTEM_ID_PREFIX, all_ids(forest))
}

fn all_ids(forest: &Forest) -> impl Iterator<Item = &str> {
    forest
        .systems()
        .iter()
        .map(|s| s.id.as_str())
        .chain(forest.subsystems().map(|(_, sub)| sub.id.as_str()))
}

fn next_id<'a>(prefix: &str, ids: impl Iterator<Item = &'a str>) -> String {
    let max = ids
        .filter_map(|id| id.strip_prefix(prefix).and_then(|n| n.parse::<u64>().ok()))
        .max()
        .unwrap_or(0);
    format!("{}{}", prefix, max + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_json_uses_camel_case_and_type_tag() {
        let mut sub = ConfigNode::subsystem("sub-1", "sys-1", "Gateway");
        sub.git_url = Some("https://example.com/gw.git".into());
        let json = serde_json::to_value(&sub).unwrap();
        assert_eq!(json["type"], "SUBSYSTEM");
        assert_eq!(json["parentId"], "sys-1");
        assert_eq!(json["gitUrl"], "https://example.com/gw.git");
        assert!(json.get("children").is_none());
        assert!(json.get("ownerName").is_none());
    }

    #[test]
    fn system_serializes_null_parent() {
        let json = serde_json::to_value(ConfigNode::system("sys-1", "Ledger")).unwrap();
        assert!(json["parentId"].is_null());
        assert_eq!(json["type"], "SYSTEM");
    }

    #[test]
    fn ui_only_fields_are_ignored_on_read() {
        let raw = r#"{"id":"sys-9","parentId":null,"name":"Risk","type":"SYSTEM","expanded":true}"#;
        let node: ConfigNode = serde_json::from_str(raw).unwrap();
        assert_eq!(node.id, "sys-9");
        assert!(node.children.is_empty());
    }

    #[test]
    fn next_ids_skip_unparseable_suffixes() {
        let forest = seed::demo_forest();
        assert_eq!(next_system_id(&forest), "sys-4");
        // demo subsystems are "sub-1-1" style and never parse
        assert_eq!(next_subsystem_id(&forest), "sub-1");
    }

    #[test]
    fn next_ids_look_past_the_other_level() {
        let mut forest = seed::demo_forest();
        let idx = forest.system_index("sys-3").unwrap();
        forest.systems[idx]
            .children
            .push(ConfigNode::subsystem("sys-4", "sys-3", "Odd Name"));
        forest.systems.push(ConfigNode::system("sub-7", "Odd System"));
        assert_eq!(next_system_id(&forest), "sys-5");
        assert_eq!(next_subsystem_id(&forest), "sub-8");
        assert!(!forest.contains_id(&next_system_id(&forest)));
    }

    #[test]
    fn next_id_on_empty_forest_starts_at_one() {
        let forest = Forest::default();
        assert_eq!(next_system_id(&forest), "sys-1");
        assert_eq!(next_subsystem_id(&forest), "sub-1");
    }
}
