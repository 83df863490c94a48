use anyhow::{bail, Result};
use async_trait::async_trait;
use std::collections::HashSet;

use crate::errors::{AgentError, AgentResult};
use crate::models::content::Content;
use crate::models::tool::{Tool, ToolCall};

/// A group of related tools sharing a backing service (weather, places,
/// expenses...). Toolkits are constructed once at startup and shared
/// read-only across runs.
#[async_trait]
pub trait Toolkit: Send + Sync {
    /// Name of the toolkit, for logging
    fn name(&self) -> &str;

    /// The tool descriptors this toolkit provides
    fn tools(&self) -> &[Tool];

    /// Execute one of this toolkit's tools
    async fn call(&self, tool_call: ToolCall) -> AgentResult<Vec<Content>>;
}

/// The fixed, ordered set of tools exposed to the model. Built once at
/// startup; duplicate tool names across toolkits fail construction rather
/// than surfacing as per-call errors.
pub struct ToolRegistry {
    toolkits: Vec<Box<dyn Toolkit>>,
}

impl ToolRegistry {
    pub fn new(toolkits: Vec<Box<dyn Toolkit>>) -> Result<Self> {
        let mut seen = HashSet::new();
        for toolkit in &toolkits {
            for tool in toolkit.tools() {
                if !seen.insert(tool.name.clone()) {
                    bail!(
                        "duplicate tool name '{}' registered by toolkit '{}'",
                        tool.name,
                        toolkit.name()
                    );
                }
            }
        }
        Ok(Self { toolkits })
    }

    /// The flat descriptor list, in registration order.
    pub fn tools(&self) -> Vec<Tool> {
        self.toolkits
            .iter()
            .flat_map(|toolkit| toolkit.tools().iter().cloned())
            .collect()
    }

    /// Route a tool call to the toolkit that owns the named tool.
    pub async fn dispatch(&self, tool_call: ToolCall) -> AgentResult<Vec<Content>> {
        let toolkit = self
            .toolkits
            .iter()
            .find(|toolkit| toolkit.tools().iter().any(|tool| tool.name == tool_call.name))
            .ok_or_else(|| AgentError::ToolNotFound(tool_call.name.clone()))?;

        tracing::debug!(tool = %tool_call.name, toolkit = %toolkit.name(), "dispatching tool call");
        toolkit.call(tool_call).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct EchoToolkit {
        name: String,
        tools: Vec<Tool>,
    }

    impl EchoToolkit {
        fn new(name: &str, tool_name: &str) -> Self {
            Self {
                name: name.to_string(),
                tools: vec![Tool::new(
                    tool_name,
                    "Echoes back the input",
                    json!({
                        "type": "object",
                        "properties": {"message": {"type": "string"}},
                        "required": ["message"]
                    }),
                )],
            }
        }
    }

    #[async_trait]
    impl Toolkit for EchoToolkit {
        fn name(&self) -> &str {
            &self.name
        }

        fn tools(&self) -> &[Tool] {
            &self.tools
        }

        async fn call(&self, tool_call: ToolCall) -> AgentResult<Vec<Content>> {
            Ok(vec![Content::text(
                tool_call.arguments["message"].as_str().unwrap_or(""),
            )])
        }
    }

    #[tokio::test]
    async fn test_dispatch_routes_by_name() {
        let registry = ToolRegistry::new(vec![
            Box::new(EchoToolkit::new("first", "echo_one")),
            Box::new(EchoToolkit::new("second", "echo_two")),
        ])
        .unwrap();

        assert_eq!(registry.tools().len(), 2);

        let result = registry
            .dispatch(ToolCall::new("echo_two", json!({"message": "hi"})))
            .await
            .unwrap();
        assert_eq!(result[0].as_text(), Some("hi"));
    }

    #[tokio::test]
    async fn test_unknown_tool_is_an_error_result() {
        let registry =
            ToolRegistry::new(vec![Box::new(EchoToolkit::new("only", "echo"))]).unwrap();

        let err = registry
            .dispatch(ToolCall::new("no_such_tool", json!({})))
            .await
            .unwrap_err();
        assert_eq!(err, AgentError::ToolNotFound("no_such_tool".to_string()));
    }

    #[test]
    fn test_duplicate_names_fail_startup() {
        let result = ToolRegistry::new(vec![
            Box::new(EchoToolkit::new("first", "echo")),
            Box::new(EchoToolkit::new("second", "echo")),
        ]);
        assert!(result.is_err());
    }
}
