use crate::error::{to_env_var, ConfigError};
use config::{Config, Environment};
use serde::Deserialize;
use std::net::SocketAddr;
use std::time::Duration;
use voyager::agent::RunLimits;
use voyager::providers::{
    configs::{GroqProviderConfig, OpenAiProviderConfig, ProviderConfig},
    groq, openai,
};

#[derive(Debug, Default, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl ServerSettings {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse()
            .map_err(|source| ConfigError::InvalidAddress { addr, source })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase", tag = "type")]
pub enum ProviderSettings {
    OpenAi {
        #[serde(default = "default_openai_host")]
        host: String,
        api_key: String,
        #[serde(default = "default_openai_model")]
        model: String,
        #[serde(default = "default_temperature")]
        temperature: Option<f32>,
        #[serde(default)]
        max_tokens: Option<i32>,
    },
    Groq {
        #[serde(default = "default_groq_host")]
        host: String,
        api_key: String,
        #[serde(default = "default_groq_model")]
        model: String,
        #[serde(default = "default_temperature")]
        temperature: Option<f32>,
        #[serde(default)]
        max_tokens: Option<i32>,
    },
}

impl ProviderSettings {
    // Convert to the voyager ProviderConfig
    pub fn into_config(self) -> ProviderConfig {
        match self {
            ProviderSettings::OpenAi {
                host,
                api_key,
                model,
                temperature,
                max_tokens,
            } => ProviderConfig::OpenAi(OpenAiProviderConfig {
                host,
                api_key,
                model,
                temperature,
                max_tokens,
            }),
            ProviderSettings::Groq {
                host,
                api_key,
                model,
                temperature,
                max_tokens,
            } => ProviderConfig::Groq(GroqProviderConfig {
                host,
                api_key,
                model,
                temperature,
                max_tokens,
            }),
        }
    }
}

/// API keys for the tool backends. Google Places is optional; when it is
/// absent, place lookups go straight to Tavily.
#[derive(Debug, Deserialize)]
pub struct ToolSettings {
    pub openweather_api_key: String,
    #[serde(default)]
    pub google_places_api_key: Option<String>,
    pub tavily_api_key: String,
    pub exchange_rate_api_key: String,
}

#[derive(Debug, Deserialize)]
pub struct AgentSettings {
    #[serde(default = "default_max_turns")]
    pub max_turns: usize,
    #[serde(default = "default_tool_timeout_secs")]
    pub tool_timeout_secs: u64,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            max_turns: default_max_turns(),
            tool_timeout_secs: default_tool_timeout_secs(),
        }
    }
}

impl AgentSettings {
    pub fn run_limits(&self) -> RunLimits {
        RunLimits {
            max_turns: self.max_turns,
            tool_timeout: Duration::from_secs(self.tool_timeout_secs),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    pub provider: ProviderSettings,
    pub tools: ToolSettings,
    #[serde(default)]
    pub agent: AgentSettings,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::load_and_validate()
    }

    fn load_and_validate() -> Result<Self, ConfigError> {
        let config = Config::builder()
            // Server defaults
            .set_default("server.host", default_host())?
            .set_default("server.port", default_port())?
            // Agent defaults
            .set_default("agent.max_turns", default_max_turns() as i64)?
            .set_default("agent.tool_timeout_secs", default_tool_timeout_secs() as i64)?
            // Layer on the environment variables
            .add_source(
                Environment::with_prefix("VOYAGER")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let result: Result<Self, config::ConfigError> = config.try_deserialize();

        // Missing fields get reported as the environment variable to set
        match result {
            Ok(settings) => Ok(settings),
            Err(err) => {
                tracing::debug!("Configuration error: {:?}", &err);

                let error_str = err.to_string();
                if error_str.starts_with("missing field") {
                    let field = error_str
                        .trim_start_matches("missing field `")
                        .trim_end_matches("`");
                    let env_var = to_env_var(&qualify_missing_field(field));
                    Err(ConfigError::MissingEnvVar { env_var })
                } else if let config::ConfigError::NotFound(field) = &err {
                    let env_var = to_env_var(field);
                    Err(ConfigError::MissingEnvVar { env_var })
                } else {
                    Err(ConfigError::Other(err))
                }
            }
        }
    }
}

/// Serde reports missing fields by bare name, losing the section they live
/// in. Re-qualify the fields that have no default so the hint names an
/// environment variable that actually works.
fn qualify_missing_field(field: &str) -> String {
    match field {
        "type" | "api_key" => format!("provider.{}", field),
        "openweather_api_key" | "google_places_api_key" | "tavily_api_key"
        | "exchange_rate_api_key" => format!("tools.{}", field),
        _ => field.to_string(),
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_openai_host() -> String {
    openai::OPENAI_HOST.to_string()
}

fn default_openai_model() -> String {
    "gpt-4o".to_string()
}

fn default_groq_host() -> String {
    groq::GROQ_HOST.to_string()
}

fn default_groq_model() -> String {
    groq::GROQ_MODEL.to_string()
}

fn default_temperature() -> Option<f32> {
    Some(0.2)
}

fn default_max_turns() -> usize {
    25
}

fn default_tool_timeout_secs() -> u64 {
    30
}
