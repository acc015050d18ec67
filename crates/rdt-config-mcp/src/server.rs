use crate::forests::Forests;
use crate::requests::{
    AddSubsystemRequest, AddSystemRequest, DeleteForestRequest, ForestRequest,
    ListSubsystemsRequest, ListSystemsRequest, NodeRequest, SeedRequest, UpdateSubsystemRequest,
    UpdateSystemRequest,
};
use rdt_config_core::TreeError;
use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler,
};
use serde_json::Value;
use tracing::warn;

const INSTRUCTIONS: &str = r#"Edits system configuration trees. A forest holds top-level systems; each system owns an ordered list of subsystems. Subsystems belong to exactly one system.

- Every tool takes an optional `forest` name; it defaults to the configured default forest, which is created on first use.
- `get_forest` returns the full tree. Use `list_systems` / `list_subsystems` for keyword search and paging.
- Deleting a system also deletes all of its subsystems. Confirm with the user first.
- `delete_forest` removes a whole forest file. Confirm with the user first.
- `update_subsystem` with `parent_id` moves the subsystem to another system.
- Ids are generated ("sys-N", "sub-N") when omitted on add."#;

/// Turn an operation result into a tool response. Domain failures are
/// reported as tool errors, not protocol errors.
fn respond(result: Result<Value, TreeError>) -> Result<CallToolResult, McpError> {
    let rendered = result.and_then(|v| Ok(serde_json::to_string_pretty(&v)?));
    match rendered {
        Ok(json) => Ok(CallToolResult::success(vec![Content::text(json)])),
        Err(e) => {
            warn!(error = %e, "tool call failed");
            Ok(CallToolResult::error(vec![Content::text(e.to_string())]))
        }
    }
}

#[derive(Clone)]
pub struct ConfigServer {
    forests: Forests,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl ConfigServer {
    pub fn new(forests: Forests) -> Self {
        Self {
            forests,
            tool_router: Self::tool_router(),
        }
    }

    #[tool(description = "List all stored configuration forests")]
    fn list_forests(&self) -> Result<CallToolResult, McpError> {
        respond(self.forests.list_forests())
    }

    #[tool(
        description = "Get the full forest: every system with its nested subsystems, plus counts. Returns {forest, stats: {systems, subsystems}, systems: [{id, parentId, name, type, description?, children: [...]}]}."
    )]
    fn get_forest(
        &self,
        Parameters(req): Parameters<ForestRequest>,
    ) -> Result<CallToolResult, McpError> {
        respond(self.forests.get_forest(req))
    }

    #[tool(description = "Verify that a stored forest is well-formed without creating it")]
    fn check_forest(
        &self,
        Parameters(req): Parameters<ForestRequest>,
    ) -> Result<CallToolResult, McpError> {
        respond(self.forests.check_forest(req))
    }

    #[tool(description = "Get one system with its subsystems")]
    fn get_system(
        &self,
        Parameters(req): Parameters<NodeRequest>,
    ) -> Result<CallToolResult, McpError> {
        respond(self.forests.get_system(req))
    }

    #[tool(description = "Get one subsystem together with the name of the system owning it")]
    fn get_subsystem(
        &self,
        Parameters(req): Parameters<NodeRequest>,
    ) -> Result<CallToolResult, McpError> {
        respond(self.forests.get_subsystem(req))
    }

    #[tool(
        description = "Search systems by keyword (name or description, case-insensitive). Returns a page {records, total, page, size} in forest order."
    )]
    fn list_systems(
        &self,
        Parameters(req): Parameters<ListSystemsRequest>,
    ) -> Result<CallToolResult, McpError> {
        respond(self.forests.list_systems(req))
    }

    #[tool(
        description = "Search subsystems across all systems or within one system. Each record carries parentId and parentName."
    )]
    fn list_subsystems(
        &self,
        Parameters(req): Parameters<ListSubsystemsRequest>,
    ) -> Result<CallToolResult, McpError> {
        respond(self.forests.list_subsystems(req))
    }

    #[tool(description = "Add an empty system at the end of the forest")]
    fn add_system(
        &self,
        Parameters(req): Parameters<AddSystemRequest>,
    ) -> Result<CallToolResult, McpError> {
        respond(self.forests.add_system(req))
    }

    #[tool(description = "Rename or re-describe a system. Its subsystems are left untouched.")]
    fn update_system(
        &self,
        Parameters(req): Parameters<UpdateSystemRequest>,
    ) -> Result<CallToolResult, McpError> {
        respond(self.forests.update_system(req))
    }

    #[tool(description = "Delete a system and all of its subsystems")]
    fn delete_system(
        &self,
        Parameters(req): Parameters<NodeRequest>,
    ) -> Result<CallToolResult, McpError> {
        respond(self.forests.delete_system(req))
    }

    #[tool(description = "Add a subsystem to an existing system")]
    fn add_subsystem(
        &self,
        Parameters(req): Parameters<AddSubsystemRequest>,
    ) -> Result<CallToolResult, McpError> {
        respond(self.forests.add_subsystem(req))
    }

    #[tool(
        description = "Update a subsystem's fields and optionally move it to another system via parent_id. The subsystem ends up in exactly one system."
    )]
    fn update_subsystem(
        &self,
        Parameters(req): Parameters<UpdateSubsystemRequest>,
    ) -> Result<CallToolResult, McpError> {
        respond(self.forests.update_subsystem(req))
    }

    #[tool(description = "Delete a subsystem. Deleting an unknown id reports deleted: false.")]
    fn delete_subsystem(
        &self,
        Parameters(req): Parameters<NodeRequest>,
    ) -> Result<CallToolResult, McpError> {
        respond(self.forests.delete_subsystem(req))
    }

    #[tool(description = "Populate a forest with the demo systems")]
    fn seed_forest(
        &self,
        Parameters(req): Parameters<SeedRequest>,
    ) -> Result<CallToolResult, McpError> {
        respond(self.forests.seed_forest(req))
    }

    #[tool(description = "Delete a stored forest file. The forest name must be given explicitly.")]
    fn delete_forest(
        &self,
        Parameters(req): Parameters<DeleteForestRequest>,
    ) -> Result<CallToolResult, McpError> {
        respond(self.forests.delete_forest(req))
    }
}

#[tool_handler]
impl ServerHandler for ConfigServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(INSTRUCTIONS.into()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}
