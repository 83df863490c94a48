use crate::state::AppState;
use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use voyager::models::message::Message;

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub answer: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn internal_error(message: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
}

/// Run one full agent loop for the question and return the final answer.
/// Clients never see provider or tool internals: failures map to a generic
/// 500 body and the detail goes to the log.
async fn query_handler(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, (StatusCode, Json<ErrorResponse>)> {
    let agent = state
        .agent
        .as_ref()
        .ok_or_else(|| internal_error("Travel agent is not initialized."))?;

    tracing::info!(query_chars = request.query.len(), "handling query");

    let messages = vec![Message::user().with_text(&request.query)];
    match agent.answer(&messages).await {
        Ok(answer) => Ok(Json(QueryResponse { answer })),
        Err(e) => {
            tracing::error!(error = %e, "query failed");
            Err(internal_error(
                "Internal server error while processing your request.",
            ))
        }
    }
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/query", post(query_handler))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use voyager::agent::Agent;
    use voyager::providers::mock::MockProvider;
    use voyager::tools::math::MathToolkit;
    use voyager::tools::registry::ToolRegistry;

    fn app_with_provider(provider: MockProvider) -> Router {
        let registry = ToolRegistry::new(vec![Box::new(MathToolkit::new())]).unwrap();
        let agent = Agent::new(Box::new(provider), registry);
        routes(AppState::new(agent))
    }

    fn query_request(query: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/query")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({"query": query}).to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_query_returns_answer() {
        let app = app_with_provider(MockProvider::new(vec![
            Message::assistant().with_text("Day 1: beaches. Day 2: old town."),
        ]));

        let response = app
            .oneshot(query_request("Plan a weekend in Lisbon"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["answer"], "Day 1: beaches. Day 2: old town.");
    }

    #[tokio::test]
    async fn test_uninitialized_agent_is_500() {
        let app = routes(AppState::uninitialized());

        let response = app.oneshot(query_request("anything")).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Travel agent is not initialized.");
    }

    #[tokio::test]
    async fn test_provider_failure_is_generic_500() {
        let app = app_with_provider(MockProvider::failing("upstream quota exceeded"));

        let response = app
            .oneshot(query_request("Plan a weekend in Lisbon"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(
            body["error"],
            "Internal server error while processing your request."
        );
        // The upstream detail stays out of the response body
        assert!(!body["error"]
            .as_str()
            .unwrap()
            .contains("quota"));
    }

    #[tokio::test]
    async fn test_malformed_request_is_client_error() {
        let app = app_with_provider(MockProvider::new(vec![]));

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/query")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"prompt": "wrong field"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert!(response.status().is_client_error());
    }
}
