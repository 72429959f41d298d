//! MCP tool listing and dispatch over the agent tool registry.

use super::protocol::{Tool, ToolCallParams, ToolCallResult};
use crate::agent::{ToolInvocation, ToolRegistry};
use uuid::Uuid;

/// Every registered tool, in registration order.
pub fn list_tools(registry: &ToolRegistry) -> Vec<Tool> {
    registry.specs().into_iter().map(Tool::from).collect()
}

/// Execute a tool exactly as the agents would and render its JSON result.
pub async fn call_tool(registry: &ToolRegistry, params: ToolCallParams) -> ToolCallResult {
    let arguments = params
        .arguments
        .map(|args| args.to_string())
        .unwrap_or_default();
    let call = ToolInvocation::new(format!("mcp_{}", Uuid::new_v4()), params.name, arguments);

    let result = registry.invoke(&call).await;
    let text = serde_json::to_string_pretty(&result.payload).unwrap_or_else(|_| result.content());

    if result.is_error {
        ToolCallResult::error(text)
    } else {
        ToolCallResult::text(text)
    }
}
