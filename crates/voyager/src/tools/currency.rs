use anyhow::{ensure, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

use super::registry::Toolkit;
use super::{required_f64, required_str};
use crate::errors::{AgentError, AgentResult};
use crate::models::content::Content;
use crate::models::tool::{Tool, ToolCall};

pub const EXCHANGE_RATE_HOST: &str = "https://v6.exchangerate-api.com";

/// Client for ExchangeRate-API v6 (`/v6/{key}/latest/{BASE}`).
pub struct ExchangeRateClient {
    client: Client,
    host: String,
    api_key: String,
}

impl ExchangeRateClient {
    pub fn new<S: Into<String>>(api_key: S) -> Result<Self> {
        Self::with_host(EXCHANGE_RATE_HOST, api_key)
    }

    pub fn with_host<H: Into<String>, S: Into<String>>(host: H, api_key: S) -> Result<Self> {
        let api_key = api_key.into();
        ensure!(!api_key.is_empty(), "exchange rate API key is not set");

        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            host: host.into(),
            api_key,
        })
    }

    /// Convert an amount between currencies at the live rate.
    pub async fn convert(&self, amount: f64, from: &str, to: &str) -> AgentResult<f64> {
        if amount < 0.0 {
            return Err(AgentError::InvalidParameters(
                "amount must be non-negative".to_string(),
            ));
        }

        let from = from.to_uppercase();
        let to = to.to_uppercase();

        let url = format!(
            "{}/v6/{}/latest/{}",
            self.host.trim_end_matches('/'),
            self.api_key,
            from
        );

        let response = self.client.get(&url).send().await.map_err(|e| {
            AgentError::ExecutionError(format!(
                "network error while calling ExchangeRate API: {}",
                e
            ))
        })?;

        if !response.status().is_success() {
            return Err(AgentError::ExecutionError(format!(
                "ExchangeRate API call failed (status={})",
                response.status()
            )));
        }

        let data: Value = response.json().await.map_err(|e| {
            AgentError::ExecutionError(format!("invalid JSON response from ExchangeRate API: {}", e))
        })?;

        let rates = data
            .get("conversion_rates")
            .and_then(|r| r.as_object())
            .ok_or_else(|| {
                AgentError::ExecutionError(
                    "invalid API response format: missing 'conversion_rates'".to_string(),
                )
            })?;

        let rate = rates.get(&to).and_then(|r| r.as_f64()).ok_or_else(|| {
            AgentError::InvalidParameters(format!(
                "{} not found in exchange rates for {}",
                to, from
            ))
        })?;

        Ok(amount * rate)
    }
}

pub struct CurrencyToolkit {
    client: ExchangeRateClient,
    tools: Vec<Tool>,
}

impl CurrencyToolkit {
    pub fn new<S: Into<String>>(api_key: S) -> Result<Self> {
        Ok(Self::with_client(ExchangeRateClient::new(api_key)?))
    }

    pub fn with_client(client: ExchangeRateClient) -> Self {
        let tools = vec![Tool::new(
            "convert_currency",
            "Convert an amount of money from one currency to another at the live exchange rate.",
            json!({
                "type": "object",
                "properties": {
                    "amount": {"type": "number", "description": "Amount of money to convert"},
                    "from_currency": {"type": "string", "description": "Source currency code, e.g. USD, INR"},
                    "to_currency": {"type": "string", "description": "Target currency code, e.g. EUR, JPY"}
                },
                "required": ["amount", "from_currency", "to_currency"]
            }),
        )];
        Self { client, tools }
    }
}

#[async_trait]
impl Toolkit for CurrencyToolkit {
    fn name(&self) -> &str {
        "currency"
    }

    fn tools(&self) -> &[Tool] {
        &self.tools
    }

    async fn call(&self, tool_call: ToolCall) -> AgentResult<Vec<Content>> {
        match tool_call.name.as_str() {
            "convert_currency" => {
                let amount = required_f64(&tool_call.arguments, "amount")?;
                let from = required_str(&tool_call.arguments, "from_currency")?;
                let to = required_str(&tool_call.arguments, "to_currency")?;

                let converted = self.client.convert(amount, &from, &to).await?;
                Ok(vec![Content::text(format!(
                    "{} {} = {} {}",
                    amount,
                    from.to_uppercase(),
                    converted,
                    to.to_uppercase()
                ))])
            }
            _ => Err(AgentError::ToolNotFound(tool_call.name)),
        }
    }
}
