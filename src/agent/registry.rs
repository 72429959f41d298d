//! Tool declarations, the tool trait and the name-to-tool registry.

use super::message::ToolInvocation;
use crate::error::{CurioError, Result};
use async_trait::async_trait;
use futures::FutureExt;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{info, warn};

/// Static declaration of a callable tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    /// JSON schema of the argument object.
    pub parameters: Value,
}

impl ToolSpec {
    pub fn new(name: &str, description: &str, parameters: Value) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            parameters,
        }
    }

    /// Names listed in the schema's `required` array.
    pub fn required_fields(&self) -> Vec<&str> {
        self.parameters
            .get("required")
            .and_then(|r| r.as_array())
            .map(|fields| fields.iter().filter_map(|f| f.as_str()).collect())
            .unwrap_or_default()
    }
}

/// A capability the model may invoke.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Declaration sent to the model.
    fn spec(&self) -> ToolSpec;

    /// Check the arguments before execution.
    ///
    /// The default accepts any JSON object that carries every `required` field.
    fn validate(&self, args: &Value) -> Result<()> {
        let spec = self.spec();
        let object = args.as_object().ok_or_else(|| CurioError::InvalidArguments {
            tool: spec.name.clone(),
            message: "arguments must be a JSON object".to_string(),
        })?;

        let missing: Vec<&str> = spec
            .required_fields()
            .into_iter()
            .filter(|field| object.get(*field).map_or(true, Value::is_null))
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(CurioError::InvalidArguments {
                tool: spec.name.clone(),
                message: format!("missing required field(s): {}", missing.join(", ")),
            })
        }
    }

    /// Run the tool. The returned value should be a JSON object.
    async fn execute(&self, args: Value) -> Result<Value>;
}

/// Deserialize tool arguments into a typed struct.
pub fn parse_args<T: DeserializeOwned>(tool: &str, args: Value) -> Result<T> {
    serde_json::from_value(args).map_err(|e| CurioError::InvalidArguments {
        tool: tool.to_string(),
        message: e.to_string(),
    })
}

/// Output of one tool invocation, ready to feed back to the model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolResult {
    pub call_id: String,
    pub name: String,
    pub payload: Value,
    pub is_error: bool,
}

impl ToolResult {
    pub fn success(call: &ToolInvocation, payload: Value) -> Self {
        Self {
            call_id: call.id.clone(),
            name: call.name.clone(),
            payload,
            is_error: false,
        }
    }

    /// Error-tagged result in the same shape tools use for soft failures.
    pub fn error(call: &ToolInvocation, message: impl Into<String>) -> Self {
        Self {
            call_id: call.id.clone(),
            name: call.name.clone(),
            payload: json!({ "success": false, "error": message.into() }),
            is_error: true,
        }
    }

    /// The error message, for error-tagged results.
    pub fn error_message(&self) -> Option<&str> {
        if self.is_error {
            self.payload.get("error").and_then(|e| e.as_str())
        } else {
            None
        }
    }

    /// Serialized payload for the tool-result message.
    pub fn content(&self) -> String {
        self.payload.to_string()
    }
}

/// Registry mapping tool names to implementations.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, Arc<dyn Tool>>,
    order: Vec<String>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool; a later registration under the same name replaces the earlier one.
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> &mut Self {
        let name = tool.spec().name;
        if self.tools.insert(name.clone(), tool).is_none() {
            self.order.push(name);
        }
        self
    }

    pub fn with(mut self, tool: impl Tool + 'static) -> Self {
        self.register(Arc::new(tool));
        self
    }

    /// Add every tool from another registry.
    pub fn merge(mut self, other: ToolRegistry) -> Self {
        for name in &other.order {
            if let Some(tool) = other.tools.get(name) {
                self.register(tool.clone());
            }
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.order.iter().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Tool catalog in registration order.
    pub fn specs(&self) -> Vec<ToolSpec> {
        self.order
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(|tool| tool.spec())
            .collect()
    }

    /// Execute one invocation. Never fails: every fault becomes an error-tagged result.
    pub async fn invoke(&self, call: &ToolInvocation) -> ToolResult {
        let Some(tool) = self.tools.get(&call.name) else {
            warn!("Model requested unknown tool: {}", call.name);
            return ToolResult::error(call, CurioError::UnknownTool(call.name.clone()).to_string());
        };

        let args = match parse_arguments(&call.arguments) {
            Ok(args) => args,
            Err(e) => return ToolResult::error(call, format!("Invalid tool arguments: {}", e)),
        };

        if let Err(e) = tool.validate(&args) {
            return ToolResult::error(call, e.to_string());
        }

        info!("Executing tool {} with args: {}", call.name, call.arguments);

        match AssertUnwindSafe(tool.execute(args)).catch_unwind().await {
            Ok(Ok(payload)) => ToolResult::success(call, payload),
            Ok(Err(e)) => {
                warn!("Tool {} failed: {}", call.name, e);
                ToolResult::error(call, e.to_string())
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                warn!("Tool {} panicked: {}", call.name, message);
                ToolResult::error(call, format!("Tool panicked: {}", message))
            }
        }
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.order)
            .finish()
    }
}

/// Parse model-produced argument text. Empty text means no arguments.
fn parse_arguments(raw: &str) -> std::result::Result<Value, serde_json::Error> {
    if raw.trim().is_empty() {
        return Ok(Value::Object(Map::new()));
    }
    serde_json::from_str(raw)
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    struct Echo;

    #[derive(Deserialize)]
    struct EchoArgs {
        text: String,
    }

    #[async_trait]
    impl Tool for Echo {
        fn spec(&self) -> ToolSpec {
            ToolSpec::new(
                "echo",
                "Echo the text back",
                json!({
                    "type": "object",
                    "properties": { "text": { "type": "string" } },
                    "required": ["text"]
                }),
            )
        }

        async fn execute(&self, args: Value) -> Result<Value> {
            let args: EchoArgs = parse_args("echo", args)?;
            Ok(json!({ "success": true, "text": args.text }))
        }
    }

    struct Broken;

    #[async_trait]
    impl Tool for Broken {
        fn spec(&self) -> ToolSpec {
            ToolSpec::new("broken", "Always fails", json!({ "type": "object", "properties": {} }))
        }

        async fn execute(&self, _args: Value) -> Result<Value> {
            Err(CurioError::Tool("upstream API returned 500".to_string()))
        }
    }

    struct Panics;

    #[async_trait]
    impl Tool for Panics {
        fn spec(&self) -> ToolSpec {
            ToolSpec::new("panics", "Panics", json!({ "type": "object", "properties": {} }))
        }

        async fn execute(&self, _args: Value) -> Result<Value> {
            panic!("index out of bounds");
        }
    }

    fn registry() -> ToolRegistry {
        ToolRegistry::new().with(Echo).with(Broken).with(Panics)
    }

    #[tokio::test]
    async fn test_invoke_success() {
        let call = ToolInvocation::new("1", "echo", r#"{"text": "hi"}"#);
        let result = registry().invoke(&call).await;
        assert!(!result.is_error);
        assert_eq!(result.call_id, "1");
        assert_eq!(result.payload["text"], "hi");
    }

    #[tokio::test]
    async fn test_unknown_tool_is_error_result() {
        let call = ToolInvocation::new("2", "teleport", "{}");
        let result = registry().invoke(&call).await;
        assert!(result.is_error);
        assert_eq!(result.error_message(), Some("Unknown tool: teleport"));
        assert_eq!(result.payload["success"], false);
    }

    #[tokio::test]
    async fn test_missing_required_field_is_error_result() {
        let call = ToolInvocation::new("3", "echo", "{}");
        let result = registry().invoke(&call).await;
        assert!(result.is_error);
        assert!(result.error_message().unwrap().contains("text"));
    }

    #[tokio::test]
    async fn test_malformed_json_is_error_result() {
        let call = ToolInvocation::new("4", "echo", "{not json");
        let result = registry().invoke(&call).await;
        assert!(result.is_error);
        assert!(result.error_message().unwrap().starts_with("Invalid tool arguments"));
    }

    #[tokio::test]
    async fn test_tool_error_is_error_result() {
        let call = ToolInvocation::new("5", "broken", "");
        let result = registry().invoke(&call).await;
        assert!(result.is_error);
        assert_eq!(result.error_message(), Some("upstream API returned 500"));
    }

    #[tokio::test]
    async fn test_tool_panic_is_error_result() {
        let call = ToolInvocation::new("6", "panics", "{}");
        let result = registry().invoke(&call).await;
        assert!(result.is_error);
        assert!(result.error_message().unwrap().contains("index out of bounds"));
    }

    #[test]
    fn test_specs_keep_registration_order() {
        let names: Vec<String> = registry().specs().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["echo", "broken", "panics"]);
    }

    #[test]
    fn test_merge_and_replace() {
        let merged = ToolRegistry::new().with(Echo).merge(ToolRegistry::new().with(Echo).with(Broken));
        assert_eq!(merged.len(), 2);
        assert_eq!(merged.names(), vec!["echo", "broken"]);
    }
}
