use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;

use super::base::{Provider, ProviderError, ProviderResult, Usage};
use super::configs::GroqProviderConfig;
use super::openai::build_chat_payload;
use super::utils::{check_context_length_error, get_openai_usage, openai_response_to_message};
use crate::models::message::Message;
use crate::models::tool::Tool;

pub const GROQ_HOST: &str = "https://api.groq.com/openai";
pub const GROQ_MODEL: &str = "llama-3.3-70b-versatile";

/// Groq serves an OpenAI-compatible chat completions API under its own host,
/// so only the endpoint and credentials differ from the OpenAI provider.
pub struct GroqProvider {
    client: Client,
    config: GroqProviderConfig,
}

impl GroqProvider {
    pub fn new(config: GroqProviderConfig) -> Result<Self> {
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
impl Provider for GroqProvider {
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

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_complete_uses_bearer_auth() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("Authorization", "Bearer groq_test_key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{
                    "message": {"role": "assistant", "content": "Namaste!"}
                }],
                "usage": {"prompt_tokens": 5, "completion_tokens": 2, "total_tokens": 7}
            })))
            .mount(&mock_server)
            .await;

        let provider = GroqProvider::new(GroqProviderConfig {
            host: mock_server.uri(),
            api_key: "groq_test_key".to_string(),
            model: GROQ_MODEL.to_string(),
            temperature: Some(0.2),
            max_tokens: None,
        })
        .unwrap();

        let messages = vec![Message::user().with_text("hello")];
        let (message, usage) = provider
            .complete("You are a travel agent.", &messages, &[])
            .await
            .unwrap();

        assert_eq!(message.text(), "Namaste!");
        assert_eq!(usage.total_tokens, Some(7));
    }
}
