//! Chronicle HTTP REST API
//!
//! Axum-based HTTP server exposing the query surface, quiz sessions and the
//! historical assistant as JSON.
//!
//! Architecture: each endpoint has a thin axum handler that builds a
//! `ChronicleRequest` and delegates to [`dispatch`], which runs the router and
//! maps the response to a status code. `dispatch` is directly testable without
//! axum dispatch machinery.
//!
//! Endpoints:
//! - GET  /health                      - dataset summary
//! - GET  /version                     - server version info
//! - GET  /years                       - distinct years, ascending
//! - GET  /places?year=                - places recorded for a year
//! - GET  /events?year=&place=         - events at a year and place
//! - GET  /countries                   - distinct countries
//! - GET  /countries/:country/timeline - per-country timeline
//! - GET  /event-types                 - distinct event types
//! - GET  /event-types/:type/events    - events of a type, with map overlay
//! - GET  /curiosity                   - random historical curiosity
//! - POST /quiz                        - start a quiz session
//! - POST /quiz/:id/answer             - answer one question
//! - GET  /quiz/:id/score              - score the attempt
//! - POST /quiz/:id/reset              - draw a new sample
//! - DELETE /quiz/:id                  - end the attempt and free its session
//! - POST /ask                         - ask the historical assistant

use std::sync::Arc;

use anyhow::Result;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use chronicle_core::config::HttpConfig;
use chronicle_core::protocol::{ChronicleRequest, ChronicleResponse, PROTOCOL};
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::router;
use crate::state::AppState;

/// Build the Axum router with all endpoints
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/version", get(version_handler))
        .route("/years", get(years_handler))
        .route("/places", get(places_handler))
        .route("/events", get(events_handler))
        .route("/countries", get(countries_handler))
        .route("/countries/:country/timeline", get(timeline_handler))
        .route("/event-types", get(event_types_handler))
        .route("/event-types/:event_type/events", get(events_of_type_handler))
        .route("/curiosity", get(curiosity_handler))
        .route("/quiz", post(start_quiz_handler))
        .route("/quiz/:id", delete(end_quiz_handler))
        .route("/quiz/:id/answer", post(answer_handler))
        .route("/quiz/:id/score", get(score_handler))
        .route("/quiz/:id/reset", post(reset_handler))
        .route("/ask", post(ask_handler))
        .with_state(state)
}

/// Start the HTTP server on the configured address.
/// Gracefully shuts down when the broadcast shutdown signal fires.
pub async fn start_http_server(
    state: Arc<AppState>,
    config: &HttpConfig,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<()> {
    let addr = format!("{}:{}", config.host, config.port);

    let app = build_router(state);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Chronicle HTTP API listening on http://{}", addr);

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

#[derive(Debug, Deserialize)]
pub struct PlacesQuery {
    pub year: i64,
}

#[derive(Debug, Deserialize)]
pub struct EventsQuery {
    pub year: i64,
    pub place: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct StartQuizRequest {
    pub size: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    pub index: usize,
    pub answer: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct AskRequest {
    pub question: Option<String>,
}

// ============================================================================
// Inner (directly testable) dispatch
// ============================================================================

/// Run a request through the router and pick the HTTP status.
pub async fn dispatch(
    state: &AppState,
    request: ChronicleRequest,
) -> (StatusCode, serde_json::Value) {
    let response = router::handle_request(request, state).await;

    match response_to_http(response) {
        Ok(data) => (StatusCode::OK, data),
        Err(e) => (
            StatusCode::BAD_REQUEST,
            serde_json::json!({
                "error": e,
                "status": "error",
            }),
        ),
    }
}

/// Inner version: returns version info (pure, no IO).
pub fn version_inner() -> serde_json::Value {
    serde_json::json!({
        "version": env!("CARGO_PKG_VERSION"),
        "protocol": PROTOCOL,
    })
}

// ============================================================================
// Axum handler wrappers (thin, delegate to dispatch)
// ============================================================================

async fn respond(state: &AppState, request: ChronicleRequest) -> impl IntoResponse {
    let (status, body) = dispatch(state, request).await;
    (status, Json(body))
}

pub async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    respond(&state, ChronicleRequest::Health).await
}

pub async fn version_handler() -> impl IntoResponse {
    (StatusCode::OK, Json(version_inner()))
}

pub async fn years_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    respond(&state, ChronicleRequest::Years).await
}

pub async fn places_handler(
    State(state): State<Arc<AppState>>,
    Query(q): Query<PlacesQuery>,
) -> impl IntoResponse {
    respond(&state, ChronicleRequest::Places { year: q.year }).await
}

pub async fn events_handler(
    State(state): State<Arc<AppState>>,
    Query(q): Query<EventsQuery>,
) -> impl IntoResponse {
    respond(
        &state,
        ChronicleRequest::EventsAt {
            year: q.year,
            place: q.place,
        },
    )
    .await
}

pub async fn countries_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    respond(&state, ChronicleRequest::Countries).await
}

pub async fn timeline_handler(
    State(state): State<Arc<AppState>>,
    Path(country): Path<String>,
) -> impl IntoResponse {
    respond(&state, ChronicleRequest::Timeline { country }).await
}

pub async fn event_types_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    respond(&state, ChronicleRequest::EventTypes).await
}

pub async fn events_of_type_handler(
    State(state): State<Arc<AppState>>,
    Path(event_type): Path<String>,
) -> impl IntoResponse {
    respond(&state, ChronicleRequest::EventsOfType { event_type }).await
}

pub async fn curiosity_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    respond(&state, ChronicleRequest::Curiosity).await
}

pub async fn start_quiz_handler(
    State(state): State<Arc<AppState>>,
    body: Option<Json<StartQuizRequest>>,
) -> impl IntoResponse {
    let req = body.map(|Json(r)| r).unwrap_or_default();
    respond(&state, ChronicleRequest::StartQuiz { size: req.size }).await
}

pub async fn answer_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<AnswerRequest>,
) -> impl IntoResponse {
    respond(
        &state,
        ChronicleRequest::SubmitAnswer {
            session: id,
            index: req.index,
            answer: req.answer,
        },
    )
    .await
}

pub async fn score_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    respond(&state, ChronicleRequest::Score { session: id }).await
}

pub async fn reset_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    respond(&state, ChronicleRequest::ResetQuiz { session: id }).await
}

pub async fn end_quiz_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    respond(&state, ChronicleRequest::EndQuiz { session: id }).await
}

pub async fn ask_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AskRequest>,
) -> impl IntoResponse {
    let question = req.question.unwrap_or_default();
    respond(&state, ChronicleRequest::Ask { question }).await
}

// ============================================================================
// Helpers
// ============================================================================

/// Convert a router `ChronicleResponse` into an HTTP body value, or an error string.
pub fn response_to_http(response: ChronicleResponse) -> std::result::Result<serde_json::Value, String> {
    if response.is_ok() {
        Ok(response.data.unwrap_or(serde_json::json!({})))
    } else {
        Err(response.error.unwrap_or_else(|| "unknown error".to_string()))
    }
}
