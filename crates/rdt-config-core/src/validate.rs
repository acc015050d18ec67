//! Checks applied before a node reaches the tree.
//!
//! The store itself only enforces the structural shape of its inputs
//! ([`check_shape`]). Name and id rules live here and are run by callers
//! before invoking the store, mirroring how the configuration forms refuse to
//! save a node without a name.

use crate::{ConfigNode, Forest, NodeType, TreeError};

/// Trim and require a non-empty name.
pub fn name(raw: &str) -> Result<String, TreeError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(TreeError::ValidationFailed("name is required".into()));
    }
    Ok(trimmed.to_string())
}

/// Reject nodes that would break the two-level shape: wrong type tag, a
/// subsystem carrying children, or a system carrying subsystem-only fields.
pub fn check_shape(node: &ConfigNode, expected: NodeType) -> Result<(), TreeError> {
    if node.node_type != expected {
        return Err(TreeError::ValidationFailed(format!(
            "'{}' is a {}, expected a {}",
            node.id, node.node_type, expected
        )));
    }
    match expected {
        NodeType::Subsystem if !node.children.is_empty() => {
            Err(TreeError::ValidationFailed(format!(
                "subsystem '{}' cannot have children",
                node.id
            )))
        }
        NodeType::System => {
            let fields = subsystem_fields_set(node);
            if fields.is_empty() {
                return Ok(());
            }
            Err(TreeError::ValidationFailed(format!(
                "system '{}' cannot carry subsystem fields: {}",
                node.id,
                fields.join(", ")
            )))
        }
        NodeType::Subsystem => Ok(()),
    }
}

/// JSON names of the subsystem-only fields that are set on `node`.
fn subsystem_fields_set(node: &ConfigNode) -> Vec<&'static str> {
    [
        ("gitUrl", &node.git_url),
        ("ownerName", &node.owner_name),
        ("ownerRole", &node.owner_role),
        ("ownerAvatar", &node.owner_avatar),
        ("language", &node.language),
    ]
    .into_iter()
    .filter(|(_, value)| value.is_some())
    .map(|(field, _)| field)
    .collect()
}

/// Validate a node about to be created: shape, non-empty unused id, name.
/// New systems must start without subsystems. Returns the node with its name
/// trimmed.
pub fn new_node(
    forest: &Forest,
    mut node: ConfigNode,
    expected: NodeType,
) -> Result<ConfigNode, TreeError> {
    check_shape(&node, expected)?;
    if expected == NodeType::System && !node.children.is_empty() {
        return Err(TreeError::ValidationFailed(format!(
            "new system '{}' must not carry subsystems",
            node.id
        )));
    }
    if node.id.trim().is_empty() {
        return Err(TreeError::ValidationFailed("id is required".into()));
    }
    if forest.contains_id(&node.id) {
        return Err(TreeError::ValidationFailed(format!(
            "id '{}' is already in use",
            node.id
        )));
    }
    node.name = name(&node.name)?;
    Ok(node)
}

/// Validate an edit of an existing node: shape and name.
pub fn edited_node(mut node: ConfigNode, expected: NodeType) -> Result<ConfigNode, TreeError> {
    check_shape(&node, expected)?;
    node.name = name(&node.name)?;
    Ok(node)
}
