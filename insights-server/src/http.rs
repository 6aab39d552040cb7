//! Insights HTTP API
//!
//! Axum-based HTTP server exposing the insight pipeline. Each user action is
//! one request: the form state arrives in the body and the handler runs the
//! pipeline to completion before responding (no background work).
//!
//! Architecture: each endpoint has a thin axum handler that delegates to a
//! pure inner function. The inner functions are directly testable without
//! axum dispatch machinery.
//!
//! Endpoints:
//! - GET  /health   — health check with vector index status
//! - GET  /version  — server version info
//! - POST /generate — generate insights + recommendations, store the insight
//! - POST /query    — similarity query against stored insights

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use insights_core::prompts;
use insights_core::{
    ChatClient, IndexClient, InsightStore, InsightsConfig, InsightsError, Language, RepoRecord,
};
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::sync::broadcast;

/// Inline message shown when a required form field is empty.
const MISSING_FIELDS_MESSAGE: &str = "Please enter all required fields.";

/// Shared state for all HTTP handlers — every client is constructed once at
/// startup and injected here, never reached for as a global.
#[derive(Clone)]
pub struct HttpState {
    pub chat: ChatClient,
    pub store: InsightStore,
    pub index: IndexClient,
    pub config: InsightsConfig,
}

/// Build the Axum router with all endpoints
pub fn build_router(state: Arc<HttpState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/version", get(version_handler))
        .route("/generate", post(generate_handler))
        .route("/query", post(query_handler))
        .with_state(state)
}

/// Start the HTTP server on the configured address.
/// Gracefully shuts down when the broadcast shutdown signal fires.
pub async fn start_http_server(
    state: HttpState,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<()> {
    let addr = format!("{}:{}", state.config.http.host, state.config.http.port);
    let app = build_router(Arc::new(state));

    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Insights HTTP API listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown.recv().await;
            tracing::info!("HTTP server shutting down...");
        })
        .await?;

    Ok(())
}

// ============================================================================
// Request DTOs
// ============================================================================

#[derive(Debug, Deserialize, Default)]
pub struct GenerateRequest {
    pub url: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub stars: u64,
    #[serde(default)]
    pub language: Language,
}

#[derive(Debug, Deserialize, Default)]
pub struct QueryRequest {
    pub query: Option<String>,
}

// ============================================================================
// Inner (directly testable) business logic functions
// ============================================================================

/// Inner health check — describes the vector index and returns
/// (status_code, json_body).
pub async fn health_inner(index: &IndexClient, index_name: &str) -> (StatusCode, serde_json::Value) {
    match index.describe(index_name).await {
        Ok(description) => (
            StatusCode::OK,
            serde_json::json!({
                "status": "healthy",
                "version": env!("CARGO_PKG_VERSION"),
                "index": index_name,
                "host": description.host,
                "ready": description.status.ready,
            }),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            serde_json::json!({
                "status": "unhealthy",
                "error": e.to_string(),
            }),
        ),
    }
}

/// Inner version — returns version info (pure, no IO).
pub fn version_inner() -> serde_json::Value {
    serde_json::json!({
        "version": env!("CARGO_PKG_VERSION"),
        "protocol": "insights/1",
    })
}

/// Inner generate — validates the form fields, then runs the full pipeline
/// sequentially: insight completion → store → recommendation completion.
///
/// Validation failure returns 400 before any outbound call is made. Any
/// pipeline failure aborts the action with 500 and no partial-result
/// recovery: an insight may already be stored when the recommendation call
/// fails, and the remote index is left as-is.
pub async fn generate_inner(
    state: &HttpState,
    req: GenerateRequest,
) -> (StatusCode, serde_json::Value) {
    let url = req.url.unwrap_or_default();
    let description = req.description.unwrap_or_default();

    if url.trim().is_empty() || description.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            serde_json::json!({
                "error": MISSING_FIELDS_MESSAGE,
                "status": "error",
            }),
        );
    }

    let record = RepoRecord {
        url,
        description,
        stars: req.stars,
        language: req.language,
    };

    let start = Instant::now();

    match run_pipeline(state, &record).await {
        Ok((insights, recommendations)) => {
            let took_ms = start.elapsed().as_millis() as u64;
            tracing::info!(url = %record.url, took_ms, "Generated and stored insight");
            (
                StatusCode::OK,
                serde_json::json!({
                    "insights": insights,
                    "recommendations": recommendations,
                    "took_ms": took_ms,
                }),
            )
        }
        Err(e) => {
            tracing::error!(url = %record.url, error = %e, "Insight pipeline failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                serde_json::json!({
                    "error": e.to_string(),
                    "status": "error",
                }),
            )
        }
    }
}

/// The three outbound calls, strictly sequential.
async fn run_pipeline(
    state: &HttpState,
    record: &RepoRecord,
) -> Result<(String, String), InsightsError> {
    let insights = state.chat.complete(&prompts::insight_prompt(record)).await?;

    state.store.store(&insights, record).await?;

    let recommendations = state
        .chat
        .complete(&prompts::recommendation_prompt(
            &record.description,
            record.language,
        ))
        .await?;

    Ok((insights, recommendations))
}

/// Inner query — validates the query text and returns the nearest stored
/// insight (or the sentinel on an empty index).
pub async fn query_inner(state: &HttpState, req: QueryRequest) -> (StatusCode, serde_json::Value) {
    let query = match req.query {
        Some(q) if !q.trim().is_empty() => q,
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                serde_json::json!({
                    "error": "query field is required",
                    "status": "error",
                }),
            );
        }
    };

    match state.store.query(&query).await {
        Ok(result) => (
            StatusCode::OK,
            serde_json::json!({
                "result": result,
                "query": query,
            }),
        ),
        Err(e) => {
            tracing::error!(error = %e, "Insight query failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                serde_json::json!({
                    "error": e.to_string(),
                    "status": "error",
                }),
            )
        }
    }
}

// ============================================================================
// Axum handler wrappers (thin — delegate to inner functions)
// ============================================================================

pub async fn health_handler(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    let (status, body) = health_inner(&state.index, &state.config.index.name).await;
    (status, Json(body))
}

pub async fn version_handler() -> impl IntoResponse {
    (StatusCode::OK, Json(version_inner()))
}

pub async fn generate_handler(
    State(state): State<Arc<HttpState>>,
    Json(req): Json<GenerateRequest>,
) -> impl IntoResponse {
    let (status, body) = generate_inner(&state, req).await;
    (status, Json(body))
}

pub async fn query_handler(
    State(state): State<Arc<HttpState>>,
    Json(req): Json<QueryRequest>,
) -> impl IntoResponse {
    let (status, body) = query_inner(&state, req).await;
    (status, Json(body))
}

// ============================================================================
// Unit Tests — call inner functions directly against mock upstream services
// ============================================================================
