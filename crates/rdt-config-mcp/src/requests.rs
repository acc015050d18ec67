use rdt_config_core::ConfigNode;
use rmcp::schemars;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct ForestRequest {
    /// Name of the forest. Defaults to the configured default forest.
    pub forest: Option<String>,
}

#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct SeedRequest {
    /// Name of the forest to populate
    pub forest: Option<String>,
    /// Replace the forest if it already exists. Default: false.
    pub overwrite: Option<bool>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DeleteForestRequest {
    /// Name of the forest to delete. Required; there is no default here.
    pub forest: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct NodeRequest {
    /// Name of the forest
    pub forest: Option<String>,
    /// ID of the node, e.g. "sys-1" or "sub-1-2"
    pub id: String,
}

#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct ListSystemsRequest {
    /// Name of the forest
    pub forest: Option<String>,
    /// Case-insensitive filter on name or description
    pub keyword: Option<String>,
    /// 1-based page number. Default: 1.
    pub page: Option<usize>,
    /// Page size. Default: 10.
    pub size: Option<usize>,
}

#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct ListSubsystemsRequest {
    /// Name of the forest
    pub forest: Option<String>,
    /// Only list subsystems of this system
    pub system_id: Option<String>,
    /// Case-insensitive filter on name or description
    pub keyword: Option<String>,
    /// 1-based page number. Default: 1.
    pub page: Option<usize>,
    /// Page size. Default: 10.
    pub size: Option<usize>,
}

#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct AddSystemRequest {
    /// Name of the forest
    pub forest: Option<String>,
    /// ID for the new system. Default: next free "sys-N".
    pub id: Option<String>,
    /// Display name (required, non-empty)
    pub name: String,
    /// What this system does
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct UpdateSystemRequest {
    /// Name of the forest
    pub forest: Option<String>,
    /// ID of the system to update
    pub id: String,
    /// New display name
    pub name: Option<String>,
    /// New description. Empty string clears it.
    pub description: Option<String>,
}

/// Optional subsystem attributes. An empty string clears a field.
#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct SubsystemFields {
    /// What this subsystem does
    pub description: Option<String>,
    /// Git repository URL
    pub git_url: Option<String>,
    /// Name of the owning engineer
    pub owner_name: Option<String>,
    /// Role of the owner, e.g. "Tech Lead"
    pub owner_role: Option<String>,
    /// Avatar image URL of the owner
    pub owner_avatar: Option<String>,
    /// Implementation language or stack, e.g. "Rust"
    pub language: Option<String>,
}

impl SubsystemFields {
    pub fn apply(self, node: &mut ConfigNode) {
        let slots = [
            (self.description, &mut node.description),
            (self.git_url, &mut node.git_url),
            (self.owner_name, &mut node.owner_name),
            (self.owner_role, &mut node.owner_role),
            (self.owner_avatar, &mut node.owner_avatar),
            (self.language, &mut node.language),
        ];
        for (value, slot) in slots {
            if let Some(v) = value {
                *slot = non_empty(v);
            }
        }
    }
}

#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct AddSubsystemRequest {
    /// Name of the forest
    pub forest: Option<String>,
    /// ID of the system the subsystem belongs to
    pub parent_id: String,
    /// ID for the new subsystem. Default: next free "sub-N".
    pub id: Option<String>,
    /// Display name (required, non-empty)
    pub name: String,
    #[serde(flatten)]
    pub fields: SubsystemFields,
}

#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct UpdateSubsystemRequest {
    /// Name of the forest
    pub forest: Option<String>,
    /// ID of the subsystem to update
    pub id: String,
    /// System to move the subsystem to. Default: its current system.
    pub parent_id: Option<String>,
    /// New display name
    pub name: Option<String>,
    #[serde(flatten)]
    pub fields: SubsystemFields,
}

pub fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}
