use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::time::Duration;

use super::base::{Provider, ProviderError, ProviderResult, Usage};
use super::configs::OpenAiProviderConfig;
use super::utils::{
    check_context_length_error, get_openai_usage, messages_to_openai_spec,
    openai_response_to_message, tools_to_openai_spec,
};
use crate::models::message::Message;
use crate::models::tool::Tool;

pub const OPENAI_HOST: &str = "https://api.openai.com";

pub struct OpenAiProvider {
    client: Client,
    config: OpenAiProviderConfig,
}

impl OpenAiProvider {
    pub fn new(config: OpenAiProviderConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()?;

        Ok(Self { client, config })
    }

    async fn post(&self, payload: Value) -> ProviderResult<Value> {
        let url = format!(
            "{}/v1/chat/completions",
            self.config.host.trim_end_matches('/')
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&payload)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => Ok(response.json().await?),
            status => Err(ProviderError::Unavailable(format!(
                "chat completions request failed with status {}",
                status
            ))),
        }
    }
}

#[async_trait]
impl Provider for OpenAiProvider {
    async fn complete(
        &self,
        system: &str,
        messages: &[Message],
        tools: &[Tool],
    ) -> ProviderResult<(Message, Usage)> {
        let payload = build_chat_payload(
            &self.config.model,
            system,
            messages,
            tools,
            self.config.temperature.map(f64::from),
            self.config.max_tokens,
        );

        let response = self.post(payload).await?;

        if let Some(error) = response.get("error") {
            if let Some(err) = check_context_length_error(error) {
                return Err(err);
            }
            return Err(ProviderError::Unavailable(format!(
                "chat completions API error: {}",
                error
            )));
        }

        let message = openai_response_to_message(&response)?;
        let usage = get_openai_usage(&response);

        Ok((message, usage))
    }
}

/// Build the chat completions payload shared by all OpenAI-compatible
/// providers: system message first, then the converted history, then the
/// bound tools and sampling parameters.
pub(super) fn build_chat_payload(
    model: &str,
    system: &str,
    messages: &[Message],
    tools: &[Tool],
    temperature: Option<f64>,
    max_tokens: Option<i32>,
) -> Value {
    let system_message = json!({
        "role": "system",
        "content": system
    });

    let mut messages_array = vec![system_message];
    messages_array.extend(messages_to_openai_spec(messages));

    let mut payload = json!({
        "model": model,
        "messages": messages_array
    });

    if !tools.is_empty() {
        payload
            .as_object_mut()
            .unwrap()
            .insert("tools".to_string(), json!(tools_to_openai_spec(tools)));
    }
    if let Some(temp) = temperature {
        payload
            .as_object_mut()
            .unwrap()
            .insert("temperature".to_string(), json!(temp));
    }
    if let Some(tokens) = max_tokens {
        payload
            .as_object_mut()
            .unwrap()
            .insert("max_tokens".to_string(), json!(tokens));
    }

    payload
}
