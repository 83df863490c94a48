use std::time::Duration;

use futures::stream::BoxStream;

use crate::errors::{AgentError, AgentResult};
use crate::models::content::Content;
use crate::models::message::{Message, MessageContent, ToolRequest};
use crate::models::role::Role;
use crate::models::tool::ToolCall;
use crate::prompt::SYSTEM_PROMPT;
use crate::providers::base::Provider;
use crate::tools::registry::ToolRegistry;

/// Bounds on a single run. The turn limit guarantees termination even if the
/// model keeps asking for tools; the tool timeout keeps one stuck lookup from
/// stalling the run.
#[derive(Debug, Clone)]
pub struct RunLimits {
    pub max_turns: usize,
    pub tool_timeout: Duration,
}

impl Default for RunLimits {
    fn default() -> Self {
        Self {
            max_turns: 25,
            tool_timeout: Duration::from_secs(30),
        }
    }
}

/// Where the loop stands between steps. `Failed` has no variant here: a
/// failing step surfaces as the stream's terminal error instead.
enum RunState {
    AwaitingModel,
    DispatchingTools(Message),
    Done,
}

/// Coerce the inbound items into the uniform shape the provider expects:
/// anything that is not already a plain-text user message is flattened into
/// one. Applied once at the start of a run; normalizing an already-normalized
/// sequence is a no-op.
pub fn normalize_messages(messages: &[Message]) -> Vec<Message> {
    messages
        .iter()
        .map(|message| {
            let is_plain_user = message.role == Role::User
                && message
                    .content
                    .iter()
                    .all(|content| matches!(content, MessageContent::Text(_)));
            if is_plain_user {
                message.clone()
            } else {
                Message {
                    role: Role::User,
                    created: message.created,
                    content: vec![MessageContent::text(message.text())],
                }
            }
        })
        .collect()
}

/// The orchestrator: alternates between asking the model for its next step
/// and executing the tools it requests, until the model answers without
/// requesting any.
pub struct Agent {
    provider: Box<dyn Provider>,
    registry: ToolRegistry,
    limits: RunLimits,
}

impl Agent {
    pub fn new(provider: Box<dyn Provider>, registry: ToolRegistry) -> Self {
        Self::with_limits(provider, registry, RunLimits::default())
    }

    pub fn with_limits(
        provider: Box<dyn Provider>,
        registry: ToolRegistry,
        limits: RunLimits,
    ) -> Self {
        Self {
            provider,
            registry,
            limits,
        }
    }

    /// Execute one tool call under the configured timeout. Recoverable
    /// failures (unknown tool, bad arguments, downstream errors, timeout)
    /// come back as the `Err` side of the result and are fed into the
    /// conversation, never raised out of the loop.
    async fn dispatch_tool_call(
        &self,
        tool_call: AgentResult<ToolCall>,
    ) -> AgentResult<Vec<Content>> {
        let call = tool_call?;
        let name = call.name.clone();

        match tokio::time::timeout(self.limits.tool_timeout, self.registry.dispatch(call)).await {
            Ok(result) => {
                if let Err(e) = &result {
                    tracing::warn!(tool = %name, error = %e, "tool call failed");
                }
                result
            }
            Err(_) => {
                tracing::warn!(tool = %name, "tool call timed out");
                Err(AgentError::Timeout(name))
            }
        }
    }

    /// Run the agent loop over the given conversation, yielding each message
    /// as it is produced: the assistant's turns and the tool-result turns.
    /// The stream ends after the first assistant message with no tool
    /// requests, or with a single fatal error.
    pub fn reply(&self, messages: &[Message]) -> BoxStream<'_, Result<Message, AgentError>> {
        let mut messages = normalize_messages(messages);
        let tools = self.registry.tools();
        let max_turns = self.limits.max_turns;

        Box::pin(async_stream::try_stream! {
            let mut state = RunState::AwaitingModel;
            let mut turns = 0usize;

            loop {
                match state {
                    RunState::AwaitingModel => {
                        if turns >= max_turns {
                            tracing::error!(max_turns, "run exceeded the round-trip limit");
                            Err(AgentError::TurnLimit(max_turns))?;
                        }
                        turns += 1;

                        let (response, usage) = self
                            .provider
                            .complete(SYSTEM_PROMPT, &messages, &tools)
                            .await
                            .map_err(|e| AgentError::Provider(e.to_string()))?;
                        tracing::debug!(
                            turn = turns,
                            total_tokens = ?usage.total_tokens,
                            "model completion received"
                        );

                        messages.push(response.clone());
                        yield response.clone();

                        state = if response.tool_requests().is_empty() {
                            RunState::Done
                        } else {
                            RunState::DispatchingTools(response)
                        };
                    }
                    RunState::DispatchingTools(ref response) => {
                        let requests: Vec<ToolRequest> =
                            response.tool_requests().into_iter().cloned().collect();

                        // Dispatch in parallel, then append the results in the
                        // order the calls were issued so each id lines up for
                        // the model's next turn.
                        let futures: Vec<_> = requests
                            .iter()
                            .map(|request| self.dispatch_tool_call(request.tool_call.clone()))
                            .collect();
                        let outputs = futures::future::join_all(futures).await;

                        let mut tool_message = Message::user();
                        for (request, output) in requests.iter().zip(outputs.into_iter()) {
                            tool_message =
                                tool_message.with_tool_response(request.id.clone(), output);
                        }

                        messages.push(tool_message.clone());
                        yield tool_message;

                        state = RunState::AwaitingModel;
                    }
                    RunState::Done => break,
                }
            }
        })
    }

    /// Drive a run to completion and return the final assistant text. This is
    /// what the request boundary calls.
    pub async fn answer(&self, messages: &[Message]) -> Result<String, AgentError> {
        use futures::TryStreamExt;

        let mut stream = self.reply(messages);
        let mut final_text = String::new();

        while let Some(message) = stream.try_next().await? {
            if message.role == Role::Assistant {
                let text = message.text();
                if !text.is_empty() {
                    final_text = text;
                }
            }
        }

        Ok(final_text)
    }
}
