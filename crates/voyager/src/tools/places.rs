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

pub const GOOGLE_PLACES_HOST: &str = "https://maps.googleapis.com";
pub const TAVILY_HOST: &str = "https://api.tavily.com";

/// Cap on tool output so a single lookup cannot blow up the context.
const MAX_CHARS: usize = 1500;

fn truncate(text: String) -> String {
    if text.chars().count() <= MAX_CHARS {
        return text;
    }
    let mut out: String = text.chars().take(MAX_CHARS).collect();
    out.push_str("...");
    out
}

/// Google Places text search, the primary provider.
pub struct GooglePlacesClient {
    client: Client,
    host: String,
    api_key: String,
}

impl GooglePlacesClient {
    pub fn new<S: Into<String>>(api_key: S) -> Result<Self> {
        Self::with_host(GOOGLE_PLACES_HOST, api_key)
    }

    pub fn with_host<H: Into<String>, S: Into<String>>(host: H, api_key: S) -> Result<Self> {
        let api_key = api_key.into();
        ensure!(!api_key.is_empty(), "Google Places API key is not set");

        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            host: host.into(),
            api_key,
        })
    }

    /// Run a text search. An empty string means the API answered cleanly but
    /// found nothing; the caller decides whether to fall back.
    pub async fn search(&self, query: &str) -> AgentResult<String> {
        let url = format!(
            "{}/maps/api/place/textsearch/json",
            self.host.trim_end_matches('/')
        );

        let response = self
            .client
            .get(&url)
            .query(&[("query", query), ("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| {
                AgentError::ExecutionError(format!(
                    "network error while calling Google Places: {}",
                    e
                ))
            })?;

        if !response.status().is_success() {
            return Err(AgentError::ExecutionError(format!(
                "Google Places API failed (status={})",
                response.status()
            )));
        }

        let data: Value = response.json().await.map_err(|e| {
            AgentError::ExecutionError(format!("invalid JSON response from Google Places: {}", e))
        })?;

        match data.get("status").and_then(|s| s.as_str()) {
            Some("OK") => {}
            Some("ZERO_RESULTS") => return Ok(String::new()),
            other => {
                return Err(AgentError::ExecutionError(format!(
                    "Google Places API failed: {}",
                    other.unwrap_or("no status in response")
                )))
            }
        }

        let results = data
            .get("results")
            .and_then(|r| r.as_array())
            .map(|results| {
                results
                    .iter()
                    .filter_map(|place| {
                        let name = place.get("name")?.as_str()?;
                        let address = place
                            .get("formatted_address")
                            .and_then(|a| a.as_str())
                            .unwrap_or("address unknown");
                        let rating = place
                            .get("rating")
                            .and_then(|r| r.as_f64())
                            .map(|r| format!(", rating {}", r))
                            .unwrap_or_default();
                        Some(format!("- {} ({}{})", name, address, rating))
                    })
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();

        Ok(truncate(results.join("\n")))
    }
}

/// Tavily web search, the fallback provider.
pub struct TavilyClient {
    client: Client,
    host: String,
    api_key: String,
}

impl TavilyClient {
    pub fn new<S: Into<String>>(api_key: S) -> Result<Self> {
        Self::with_host(TAVILY_HOST, api_key)
    }

    pub fn with_host<H: Into<String>, S: Into<String>>(host: H, api_key: S) -> Result<Self> {
        let api_key = api_key.into();
        ensure!(!api_key.is_empty(), "Tavily API key is not set");

        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            host: host.into(),
            api_key,
        })
    }

    pub async fn search(&self, query: &str) -> AgentResult<String> {
        let url = format!("{}/search", self.host.trim_end_matches('/'));

        let response = self
            .client
            .post(&url)
            .json(&json!({
                "api_key": self.api_key,
                "query": query,
                "topic": "general",
                "include_answer": "advanced",
            }))
            .send()
            .await
            .map_err(|e| {
                AgentError::ExecutionError(format!("network error while calling Tavily: {}", e))
            })?;

        if !response.status().is_success() {
            return Err(AgentError::ExecutionError(format!(
                "Tavily search failed (status={})",
                response.status()
            )));
        }

        let data: Value = response.json().await.map_err(|e| {
            AgentError::ExecutionError(format!("invalid JSON response from Tavily: {}", e))
        })?;

        let text = match data.get("answer").and_then(|a| a.as_str()) {
            Some(answer) if !answer.is_empty() => answer.to_string(),
            _ => data.to_string(),
        };

        if text.is_empty() {
            return Err(AgentError::ExecutionError(
                "Empty response from Tavily".to_string(),
            ));
        }

        Ok(truncate(text))
    }
}

#[derive(Debug, Clone, Copy)]
enum PlaceCategory {
    Attractions,
    Restaurants,
    Activities,
    Transportation,
}

impl PlaceCategory {
    fn from_tool(name: &str) -> Option<Self> {
        match name {
            "search_attractions" => Some(PlaceCategory::Attractions),
            "search_restaurants" => Some(PlaceCategory::Restaurants),
            "search_activities" => Some(PlaceCategory::Activities),
            "search_transportation" => Some(PlaceCategory::Transportation),
            _ => None,
        }
    }

    fn query(&self, place: &str) -> String {
        match self {
            PlaceCategory::Attractions => {
                format!("top attractive places in and around {}", place)
            }
            PlaceCategory::Restaurants => {
                format!("top 10 restaurants and eateries in and around {}", place)
            }
            PlaceCategory::Activities => format!("popular activities in and around {}", place),
            PlaceCategory::Transportation => {
                format!("modes of transportation available in {}", place)
            }
        }
    }

    fn describe(&self, place: &str) -> String {
        match self {
            PlaceCategory::Attractions => format!("the attractions of {}", place),
            PlaceCategory::Restaurants => format!("the restaurants of {}", place),
            PlaceCategory::Activities => format!("the activities in and around {}", place),
            PlaceCategory::Transportation => {
                format!("the modes of transportation available in {}", place)
            }
        }
    }
}

/// Place search with a primary/fallback provider chain: Google Places when a
/// key is configured, Tavily otherwise or whenever Google fails or comes back
/// empty. The chain is internal; the model only ever sees one text result.
pub struct PlacesToolkit {
    google: Option<GooglePlacesClient>,
    tavily: TavilyClient,
    tools: Vec<Tool>,
}

impl PlacesToolkit {
    pub fn new(google_api_key: Option<&str>, tavily_api_key: &str) -> Result<Self> {
        let google = match google_api_key {
            Some(key) => Some(GooglePlacesClient::new(key)?),
            None => {
                tracing::warn!("Google Places key not set, using Tavily only for place search");
                None
            }
        };
        Ok(Self::with_clients(google, TavilyClient::new(tavily_api_key)?))
    }

    pub fn with_clients(google: Option<GooglePlacesClient>, tavily: TavilyClient) -> Self {
        let place_schema = |what: &str| {
            json!({
                "type": "object",
                "properties": {
                    "place": {
                        "type": "string",
                        "description": format!("Place to search {} in, e.g. Goa", what)
                    }
                },
                "required": ["place"]
            })
        };

        let tools = vec![
            Tool::new(
                "search_attractions",
                "Search tourist attractions in a place.",
                place_schema("attractions"),
            ),
            Tool::new(
                "search_restaurants",
                "Search restaurants in a place.",
                place_schema("restaurants"),
            ),
            Tool::new(
                "search_activities",
                "Search activities in and around a place.",
                place_schema("activities"),
            ),
            Tool::new(
                "search_transportation",
                "Search transportation options in a place.",
                place_schema("transportation"),
            ),
        ];

        Self {
            google,
            tavily,
            tools,
        }
    }

    async fn lookup(&self, category: PlaceCategory, place: &str) -> AgentResult<String> {
        let query = category.query(place);

        if let Some(google) = &self.google {
            match google.search(&query).await {
                Ok(result) if !result.is_empty() => {
                    return Ok(format!(
                        "Following are {} as suggested by Google:\n{}",
                        category.describe(place),
                        result
                    ));
                }
                Ok(_) => {}
                Err(e) => {
                    let fallback = self.tavily.search(&query).await?;
                    return Ok(format!(
                        "Google failed due to: {}\nFollowing are {} (via Tavily):\n{}",
                        e,
                        category.describe(place),
                        fallback
                    ));
                }
            }
        }

        let fallback = self.tavily.search(&query).await?;
        Ok(format!(
            "Google returned no results.\nFollowing are {} (via Tavily):\n{}",
            category.describe(place),
            fallback
        ))
    }
}

#[async_trait]
impl Toolkit for PlacesToolkit {
    fn name(&self) -> &str {
        "places"
    }

    fn tools(&self) -> &[Tool] {
        &self.tools
    }

    async fn call(&self, tool_call: ToolCall) -> AgentResult<Vec<Content>> {
        let category = PlaceCategory::from_tool(&tool_call.name)
            .ok_or_else(|| AgentError::ToolNotFound(tool_call.name.clone()))?;
        let place = required_str(&tool_call.arguments, "place")?;
        let text = self.lookup(category, &place).await?;
        Ok(vec![Content::text(text)])
    }
}
