use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while running the agent. The first four variants are
/// recoverable: they are folded back into the conversation as error tool
/// results so the model can adapt. The remaining variants terminate the run.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Deserialize, Serialize)]
pub enum AgentError {
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Tool execution failed: {0}")]
    ExecutionError(String),

    #[error("Tool call timed out: {0}")]
    Timeout(String),

    #[error("Model endpoint failed: {0}")]
    Provider(String),

    #[error("No final answer after {0} model round trips")]
    TurnLimit(usize),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type AgentResult<T> = Result<T, AgentError>;

impl AgentError {
    /// Whether this error can be reported back into the conversation as a
    /// tool result, rather than terminating the run.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AgentError::ToolNotFound(_)
                | AgentError::InvalidParameters(_)
                | AgentError::ExecutionError(_)
                | AgentError::Timeout(_)
        )
    }
}
