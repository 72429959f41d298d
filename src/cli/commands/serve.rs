//! HTTP API server for integration with other systems.
//!
//! Provides REST endpoints for running the agents and reading the reading list.

use crate::agent::{AgentRun, SilentObserver, ToolSpec};
use crate::cli::Output;
use crate::config::Settings;
use crate::error::CurioError;
use crate::orchestrator::{Orchestrator, RunOptions, Scenario};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;

/// Shared application state.
struct AppState {
    orchestrator: Orchestrator,
}

/// Run the HTTP API server.
pub async fn run_serve(host: &str, port: u16, settings: Settings) -> anyhow::Result<()> {
    let orchestrator = Orchestrator::new(settings)?;
    let state = Arc::new(AppState { orchestrator });

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Curio API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("Tools", "GET  /tools");
    Output::kv("Podcast agent", "POST /agent/podcast");
    Output::kv("Discovery agent", "POST /agent/discover");
    Output::kv("Reading list", "GET  /saved");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, router(state)).await?;

    Ok(())
}

fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/tools", get(list_tools))
        .route("/agent/podcast", post(podcast))
        .route("/agent/discover", post(discover))
        .route("/saved", get(list_saved))
        .layer(cors)
        .with_state(state)
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct PodcastRequest {
    #[serde(default)]
    goal: Option<String>,
    #[serde(default)]
    scenario: Option<Scenario>,
    #[serde(flatten)]
    options: RunOptions,
}

#[derive(Deserialize)]
struct DiscoverRequest {
    topic: String,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    max_iterations: Option<usize>,
}

#[derive(Serialize)]
struct RunResponse {
    content: String,
    tools_used: Vec<String>,
    estimated_cost: f64,
    #[serde(flatten)]
    run: AgentRun,
}

#[derive(Serialize)]
struct ToolsResponse {
    tools: Vec<ToolSpec>,
    total: usize,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn list_tools(State(state): State<Arc<AppState>>) -> Response {
    match state.orchestrator.all_tools() {
        Ok(registry) => {
            let tools = registry.specs();
            Json(ToolsResponse {
                total: tools.len(),
                tools,
            })
            .into_response()
        }
        Err(e) => error_response(e),
    }
}

async fn podcast(State(state): State<Arc<AppState>>, Json(req): Json<PodcastRequest>) -> Response {
    let goal = match (req.goal, req.scenario) {
        (Some(goal), _) => goal,
        (None, Some(scenario)) => scenario.goal().to_string(),
        (None, None) => {
            return error_response(CurioError::InvalidInput(
                "Provide a goal or a scenario".to_string(),
            ))
        }
    };

    let result = state
        .orchestrator
        .run_podcast(&goal, &req.options, &SilentObserver)
        .await;
    run_response(&state, result)
}

async fn discover(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DiscoverRequest>,
) -> Response {
    let options = RunOptions {
        model: req.model,
        max_iterations: req.max_iterations,
        live: None,
    };
    let result = state
        .orchestrator
        .run_discovery(&req.topic, &options, &SilentObserver)
        .await;
    run_response(&state, result)
}

async fn list_saved(State(state): State<Arc<AppState>>) -> Response {
    match state.orchestrator.reading_list().list().await {
        Ok(items) => Json(serde_json::json!({
            "total": items.len(),
            "items": items,
        }))
        .into_response(),
        Err(e) => error_response(e),
    }
}

fn run_response(state: &AppState, result: crate::Result<AgentRun>) -> Response {
    match result {
        Ok(run) => Json(RunResponse {
            content: run.outcome.content_or_marker().to_string(),
            tools_used: run.tools_used().into_iter().map(String::from).collect(),
            estimated_cost: state.orchestrator.estimated_cost(&run),
            run,
        })
        .into_response(),
        Err(e) => error_response(e),
    }
}

fn error_status(error: &CurioError) -> StatusCode {
    match error {
        CurioError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        CurioError::ModelApi(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(error: CurioError) -> Response {
    let status = error_status(&error);
    if status.is_server_error() {
        warn!("Request failed: {}", error);
    }
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{ModelTurn, ScriptedModel};
    use crate::config::Prompts;
    use crate::reading_list::MemoryReadingList;

    fn state(model: ScriptedModel) -> Arc<AppState> {
        Arc::new(AppState {
            orchestrator: Orchestrator::with_components(
                Settings::default(),
                Prompts::default(),
                Arc::new(MemoryReadingList::new()),
                Arc::new(model),
            ),
        })
    }

    fn podcast_request(goal: Option<&str>) -> PodcastRequest {
        PodcastRequest {
            goal: goal.map(String::from),
            scenario: None,
            options: RunOptions::default(),
        }
    }

    #[test]
    fn test_error_status_mapping() {
        assert_eq!(
            error_status(&CurioError::InvalidInput("x".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            error_status(&CurioError::ModelApi("down".into())),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            error_status(&CurioError::Agent("x".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_podcast_completes() {
        let state = state(ScriptedModel::new(vec![ModelTurn::text("All done")]));
        let response = podcast(State(state), Json(podcast_request(Some("AI news")))).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_podcast_without_goal_is_bad_request() {
        let state = state(ScriptedModel::new(vec![]));
        let response = podcast(State(state), Json(podcast_request(None))).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_model_failure_is_bad_gateway() {
        let state = state(ScriptedModel::from_results(vec![Err(CurioError::ModelApi(
            "connection refused".into(),
        ))]));
        let request = DiscoverRequest {
            topic: "rust".to_string(),
            model: None,
            max_iterations: None,
        };
        let response = discover(State(state), Json(request)).await;
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_tools_and_saved_are_ok() {
        let state = state(ScriptedModel::new(vec![]));
        assert_eq!(list_tools(State(state.clone())).await.status(), StatusCode::OK);
        assert_eq!(list_saved(State(state)).await.status(), StatusCode::OK);
    }
}
