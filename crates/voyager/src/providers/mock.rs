use async_trait::async_trait;
use std::sync::Arc;
use std::sync::Mutex;

use super::base::{Provider, ProviderError, ProviderResult, Usage};
use crate::models::message::Message;
use crate::models::tool::Tool;

/// A mock provider that returns pre-configured responses for testing.
pub struct MockProvider {
    responses: Arc<Mutex<Vec<Message>>>,
    fail_with: Option<String>,
}

impl MockProvider {
    /// Create a new mock provider with a sequence of scripted responses
    pub fn new(responses: Vec<Message>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses)),
            fail_with: None,
        }
    }

    /// Create a mock provider whose every completion fails
    pub fn failing<S: Into<String>>(reason: S) -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            fail_with: Some(reason.into()),
        }
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn complete(
        &self,
        _system: &str,
        _messages: &[Message],
        _tools: &[Tool],
    ) -> ProviderResult<(Message, Usage)> {
        if let Some(reason) = &self.fail_with {
            return Err(ProviderError::Unavailable(reason.clone()));
        }

        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            // Out of script: behave like a model that has nothing to add
            Ok((Message::assistant().with_text(""), Usage::default()))
        } else {
            Ok((responses.remove(0), Usage::default()))
        }
    }
}
