use anyhow::{ensure, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

use super::registry::Toolkit;
use super::required_str;
use crate::errors::{AgentError, AgentResult};
use crate::models::content::Content;
use crate::models::tool::{Tool, ToolCall};

pub const OPENWEATHER_HOST: &str = "https://api.openweathermap.org";

/// How many daily entries the forecast summary reports at most.
const FORECAST_DAYS: usize = 5;

/// Thin client for the OpenWeatherMap 2.5 API, always in metric units.
pub struct WeatherClient {
    client: Client,
    host: String,
    api_key: String,
}

impl WeatherClient {
    pub fn new<S: Into<String>>(api_key: S) -> Result<Self> {
        Self::with_host(OPENWEATHER_HOST, api_key)
    }

    pub fn with_host<H: Into<String>, S: Into<String>>(host: H, api_key: S) -> Result<Self> {
        let api_key = api_key.into();
        ensure!(!api_key.is_empty(), "OpenWeatherMap API key is not set");

        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            host: host.into(),
            api_key,
        })
    }

    async fn get(&self, endpoint: &str, city: &str, extra: &[(&str, &str)]) -> AgentResult<Value> {
        let url = format!("{}/data/2.5/{}", self.host.trim_end_matches('/'), endpoint);
        let mut params = vec![
            ("q", city),
            ("appid", self.api_key.as_str()),
            ("units", "metric"),
        ];
        params.extend_from_slice(extra);

        let response = self
            .client
            .get(&url)
            .query(&params)
            .send()
            .await
            .map_err(|e| {
                AgentError::ExecutionError(format!("network error while calling OpenWeather: {}", e))
            })?;

        if !response.status().is_success() {
            return Err(AgentError::ExecutionError(format!(
                "OpenWeather API failed (status={})",
                response.status()
            )));
        }

        response.json().await.map_err(|e| {
            AgentError::ExecutionError(format!("invalid JSON response from OpenWeather: {}", e))
        })
    }

    /// Current conditions for a city.
    pub async fn current(&self, city: &str) -> AgentResult<Value> {
        self.get("weather", city, &[]).await
    }

    /// Raw 3-hourly forecast entries for a city.
    pub async fn forecast(&self, city: &str) -> AgentResult<Value> {
        self.get("forecast", city, &[("cnt", "10")]).await
    }
}

fn field_or_na(value: Option<&Value>) -> String {
    match value {
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::String(s)) => s.clone(),
        _ => "N/A".to_string(),
    }
}

fn summarize_current(city: &str, data: &Value) -> String {
    let temp = field_or_na(data.pointer("/main/temp"));
    let desc = field_or_na(data.pointer("/weather/0/description"));
    format!("Current weather in {}: {}°C, {}", city, temp, desc)
}

/// Collapse the raw 3-hourly forecast into one entry per calendar date,
/// chronological, capped at `FORECAST_DAYS`.
fn summarize_forecast(city: &str, data: &Value) -> String {
    let entries = match data.get("list").and_then(|l| l.as_array()) {
        Some(entries) => entries,
        None => return format!("Could not fetch forecast for {}", city),
    };

    let mut seen_dates = std::collections::HashSet::new();
    let mut summary = Vec::new();

    for entry in entries {
        let date = entry
            .get("dt_txt")
            .and_then(|d| d.as_str())
            .and_then(|d| d.split(' ').next())
            .unwrap_or("");
        if date.is_empty() || !seen_dates.insert(date.to_string()) {
            continue;
        }

        let temp = field_or_na(entry.pointer("/main/temp"));
        let desc = field_or_na(entry.pointer("/weather/0/description"));
        summary.push(format!("{}: {}°C, {}", date, temp, desc));

        if summary.len() >= FORECAST_DAYS {
            break;
        }
    }

    if summary.is_empty() {
        return format!("Could not fetch forecast for {}", city);
    }

    format!(
        "Weather forecast for {} (next {} days):\n{}",
        city,
        summary.len(),
        summary.join("\n")
    )
}

pub struct WeatherToolkit {
    client: WeatherClient,
    tools: Vec<Tool>,
}

impl WeatherToolkit {
    pub fn new<S: Into<String>>(api_key: S) -> Result<Self> {
        Ok(Self::with_client(WeatherClient::new(api_key)?))
    }

    pub fn with_client(client: WeatherClient) -> Self {
        let tools = vec![
            Tool::new(
                "get_current_weather",
                "Get the current weather for a city.",
                json!({
                    "type": "object",
                    "properties": {
                        "city": {"type": "string", "description": "City name, e.g. Goa"}
                    },
                    "required": ["city"]
                }),
            ),
            Tool::new(
                "get_weather_forecast",
                "Get the 5-day weather forecast for a city, one summary per day.",
                json!({
                    "type": "object",
                    "properties": {
                        "city": {"type": "string", "description": "City name, e.g. Goa"}
                    },
                    "required": ["city"]
                }),
            ),
        ];
        Self { client, tools }
    }
}

#[async_trait]
impl Toolkit for WeatherToolkit {
    fn name(&self) -> &str {
        "weather"
    }

    fn tools(&self) -> &[Tool] {
        &self.tools
    }

    async fn call(&self, tool_call: ToolCall) -> AgentResult<Vec<Content>> {
        match tool_call.name.as_str() {
            "get_current_weather" => {
                let city = required_str(&tool_call.arguments, "city")?;
                // Lookup failures are reported as text so the model can plan
                // around missing weather instead of seeing a hard error.
                let text = match self.client.current(&city).await {
                    Ok(data) => summarize_current(&city, &data),
                    Err(e) => format!("Failed to fetch current weather for {}: {}", city, e),
                };
                Ok(vec![Content::text(text)])
            }
            "get_weather_forecast" => {
                let city = required_str(&tool_call.arguments, "city")?;
                let text = match self.client.forecast(&city).await {
                    Ok(data) => summarize_forecast(&city, &data),
                    Err(e) => format!("Failed to fetch forecast for {}: {}", city, e),
                };
                Ok(vec![Content::text(text)])
            }
            _ => Err(AgentError::ToolNotFound(tool_call.name)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn forecast_entry(dt_txt: &str, temp: f64, desc: &str) -> Value {
        json!({
            "dt_txt": dt_txt,
            "main": {"temp": temp},
            "weather": [{"description": desc}]
        })
    }

    #[test]
    fn test_summarize_current() {
        let data = json!({
            "main": {"temp": 28.4},
            "weather": [{"description": "clear sky"}]
        });
        assert_eq!(
            summarize_current("Goa", &data),
            "Current weather in Goa: 28.4°C, clear sky"
        );
    }

    #[test]
    fn test_summarize_current_missing_fields() {
        let data = json!({});
        assert_eq!(
            summarize_current("Goa", &data),
            "Current weather in Goa: N/A°C, N/A"
        );
    }

    #[test]
    fn test_forecast_deduplicates_by_date() {
        // 12 raw 3-hourly entries spanning 4 distinct dates
        let mut entries = Vec::new();
        for day in 1..=4 {
            for hour in ["00", "06", "12"] {
                entries.push(forecast_entry(
                    &format!("2025-06-0{} {}:00:00", day, hour),
                    20.0 + day as f64,
                    "light rain",
                ));
            }
        }
        let data = json!({"list": entries});

        let summary = summarize_forecast("Goa", &data);
        let lines: Vec<&str> = summary.lines().collect();

        // Header plus exactly one line per date, chronological
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[1], "2025-06-01: 21.0°C, light rain");
        assert_eq!(lines[2], "2025-06-02: 22.0°C, light rain");
        assert_eq!(lines[3], "2025-06-03: 23.0°C, light rain");
        assert_eq!(lines[4], "2025-06-04: 24.0°C, light rain");
    }

    #[test]
    fn test_forecast_caps_at_five_days() {
        let entries: Vec<Value> = (1..=9)
            .map(|day| forecast_entry(&format!("2025-06-0{} 12:00:00", day), 25.0, "sunny"))
            .collect();
        let data = json!({"list": entries});

        let summary = summarize_forecast("Goa", &data);
        assert_eq!(summary.lines().count(), 6); // header + 5 days
    }

    #[test]
    fn test_forecast_empty_list() {
        let data = json!({"list": []});
        assert_eq!(
            summarize_forecast("Goa", &data),
            "Could not fetch forecast for Goa"
        );
    }

    #[tokio::test]
    async fn test_current_weather_tool() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .and(query_param("q", "Goa"))
            .and(query_param("units", "metric"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "main": {"temp": 30.1},
                "weather": [{"description": "scattered clouds"}]
            })))
            .mount(&mock_server)
            .await;

        let toolkit = WeatherToolkit::with_client(
            WeatherClient::with_host(mock_server.uri(), "test_key").unwrap(),
        );

        let result = toolkit
            .call(ToolCall::new("get_current_weather", json!({"city": "Goa"})))
            .await
            .unwrap();

        assert_eq!(
            result[0].as_text(),
            Some("Current weather in Goa: 30.1°C, scattered clouds")
        );
    }

    #[tokio::test]
    async fn test_lookup_failure_becomes_text() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&mock_server)
            .await;

        let toolkit = WeatherToolkit::with_client(
            WeatherClient::with_host(mock_server.uri(), "bad_key").unwrap(),
        );

        let result = toolkit
            .call(ToolCall::new("get_current_weather", json!({"city": "Goa"})))
            .await
            .unwrap();

        assert!(result[0]
            .as_text()
            .unwrap()
            .starts_with("Failed to fetch current weather for Goa"));
    }

    #[tokio::test]
    async fn test_missing_city_is_invalid_parameters() {
        let toolkit = WeatherToolkit::with_client(
            WeatherClient::with_host("http://localhost:1", "test_key").unwrap(),
        );

        let err = toolkit
            .call(ToolCall::new("get_current_weather", json!({})))
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::InvalidParameters(_)));
    }
}
