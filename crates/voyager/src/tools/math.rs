use async_trait::async_trait;
use serde_json::json;

use super::registry::Toolkit;
use super::required_i64;
use crate::errors::{AgentError, AgentResult};
use crate::models::content::Content;
use crate::models::tool::{Tool, ToolCall};

/// Basic integer arithmetic so the model never does mental math on costs.
pub struct MathToolkit {
    tools: Vec<Tool>,
}

impl Default for MathToolkit {
    fn default() -> Self {
        Self::new()
    }
}

impl MathToolkit {
    pub fn new() -> Self {
        let two_ints = json!({
            "type": "object",
            "properties": {
                "a": {"type": "integer", "description": "First operand"},
                "b": {"type": "integer", "description": "Second operand"}
            },
            "required": ["a", "b"]
        });

        let tools = vec![
            Tool::new("add", "Add two integers.", two_ints.clone()),
            Tool::new("multiply", "Multiply two integers.", two_ints),
        ];
        Self { tools }
    }
}

#[async_trait]
impl Toolkit for MathToolkit {
    fn name(&self) -> &str {
        "math"
    }

    fn tools(&self) -> &[Tool] {
        &self.tools
    }

    async fn call(&self, tool_call: ToolCall) -> AgentResult<Vec<Content>> {
        let a = required_i64(&tool_call.arguments, "a")?;
        let b = required_i64(&tool_call.arguments, "b")?;

        let result = match tool_call.name.as_str() {
            "add" => a.checked_add(b),
            "multiply" => a.checked_mul(b),
            _ => return Err(AgentError::ToolNotFound(tool_call.name)),
        }
        .ok_or_else(|| {
            AgentError::InvalidParameters(format!(
                "integer overflow in {}({}, {})",
                tool_call.name, a, b
            ))
        })?;

        Ok(vec![Content::text(result.to_string())])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_add() {
        let toolkit = MathToolkit::new();
        let result = toolkit
            .call(ToolCall::new("add", json!({"a": 12, "b": 30})))
            .await
            .unwrap();
        assert_eq!(result[0].as_text(), Some("42"));
    }

    #[tokio::test]
    async fn test_multiply() {
        let toolkit = MathToolkit::new();
        let result = toolkit
            .call(ToolCall::new("multiply", json!({"a": 6, "b": 7})))
            .await
            .unwrap();
        assert_eq!(result[0].as_text(), Some("42"));
    }

    #[tokio::test]
    async fn test_overflow_is_invalid_parameters() {
        let toolkit = MathToolkit::new();
        let err = toolkit
            .call(ToolCall::new(
                "multiply",
                json!({"a": i64::MAX, "b": 2}),
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::InvalidParameters(_)));
    }
}
