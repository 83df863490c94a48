mod configuration;
mod error;
mod routes;
mod state;

use anyhow::Result;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use voyager::agent::Agent;
use voyager::providers::factory;
use voyager::tools::currency::CurrencyToolkit;
use voyager::tools::expenses::ExpenseToolkit;
use voyager::tools::math::MathToolkit;
use voyager::tools::places::PlacesToolkit;
use voyager::tools::registry::{ToolRegistry, Toolkit};
use voyager::tools::weather::WeatherToolkit;

use configuration::Settings;
use state::AppState;

fn build_agent(settings: Settings) -> Result<Agent> {
    let toolkits: Vec<Box<dyn Toolkit>> = vec![
        Box::new(WeatherToolkit::new(&settings.tools.openweather_api_key)?),
        Box::new(PlacesToolkit::new(
            settings.tools.google_places_api_key.as_deref(),
            &settings.tools.tavily_api_key,
        )?),
        Box::new(ExpenseToolkit::new()),
        Box::new(MathToolkit::new()),
        Box::new(CurrencyToolkit::new(&settings.tools.exchange_rate_api_key)?),
    ];
    let registry = ToolRegistry::new(toolkits)?;

    let limits = settings.agent.run_limits();
    let provider = factory::get_provider(settings.provider.into_config())?;

    Ok(Agent::with_limits(provider, registry, limits))
}

/// Agent construction failures (a missing tool key, say) are not fatal: the
/// server still comes up and every query answers 500 until it is restarted
/// with working configuration.
fn init_state(settings: Settings) -> AppState {
    match build_agent(settings) {
        Ok(agent) => AppState::new(agent),
        Err(e) => {
            tracing::error!(error = %e, "failed to initialize travel agent");
            AppState::uninitialized()
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let settings = Settings::new()?;
    let addr = settings.server.socket_addr()?;
    let state = init_state(settings);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = routes::configure(state).layer(cors);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use crate::configuration::{AgentSettings, ProviderSettings, ServerSettings, ToolSettings};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn settings_with_empty_weather_key() -> Settings {
        Settings {
            server: ServerSettings::default(),
            provider: ProviderSettings::OpenAi {
                host: "https://api.openai.com".to_string(),
                api_key: "test-key".to_string(),
                model: "gpt-4o".to_string(),
                temperature: None,
                max_tokens: None,
            },
            tools: ToolSettings {
                openweather_api_key: String::new(),
                google_places_api_key: None,
                tavily_api_key: "tavily-key".to_string(),
                exchange_rate_api_key: "exchange-key".to_string(),
            },
            agent: AgentSettings::default(),
        }
    }

    #[tokio::test]
    async fn test_failed_agent_init_still_serves() {
        let state = init_state(settings_with_empty_weather_key());
        assert!(state.agent.is_none());

        let app = routes::configure(state);
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/query")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"query": "Plan a trip to Goa"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "Travel agent is not initialized.");
    }
}
