//! HTTP integration tests for the Chronicle REST API
//!
//! Routes are exercised end to end with the Axum `oneshot` approach against
//! the sample tables in `data/`. The assistant is either a local stub or a
//! `ChatCompletionsClient` pointed at a wiremock server.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chronicle_core::config::DataConfig;
use chronicle_core::{
    AssistantBackend, AssistantError, ChatCompletionsClient, ChatConfig, DEFAULT_QUIZ_SIZE,
};
use chronicle_server::http::build_router;
use chronicle_server::AppState;
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct EchoAssistant;

#[async_trait]
impl AssistantBackend for EchoAssistant {
    async fn ask(&self, question: &str) -> Result<String, AssistantError> {
        if question.trim().is_empty() {
            return Err(AssistantError::EmptyQuestion);
        }
        Ok(format!("You asked: {}", question))
    }

    fn name(&self) -> &str {
        "echo"
    }
}

fn sample_state(assistant: Option<Arc<dyn AssistantBackend>>) -> Arc<AppState> {
    let dataset = chronicle_ingest::load_dataset(&DataConfig {
        events_path: "../data/events.csv".to_string(),
        trivia_path: "../data/trivia.csv".to_string(),
    })
    .expect("sample data should load");
    Arc::new(AppState::new(dataset, DEFAULT_QUIZ_SIZE, assistant))
}

async fn call(state: Arc<AppState>, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let app = build_router(state);
    let builder = Request::builder().method(method).uri(uri);
    let req = match body {
        Some(b) => builder
            .header("content-type", "application/json")
            .body(Body::from(b.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

// ===========================================================================
// TEST 1: GET /health - dataset summary with dropped rows
// ===========================================================================
#[tokio::test]
async fn test_health_summary() {
    let (status, body) = call(sample_state(None), "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["year_span"]["min"], -753);
    // "circa 2500 BC" cannot be normalized
    assert_eq!(body["dropped_events"].as_array().unwrap().len(), 1);
    assert_eq!(body["rejected_questions"], json!([]));
}

// ===========================================================================
// TEST 2: GET /version
// ===========================================================================
#[tokio::test]
async fn test_version_endpoint() {
    let (status, body) = call(sample_state(None), "GET", "/version", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["protocol"], "chronicle/1");
}

// ===========================================================================
// TEST 3: year/place drill-down
// ===========================================================================
#[tokio::test]
async fn test_year_and_place_drill_down() {
    let state = sample_state(None);

    let (_, years) = call(state.clone(), "GET", "/years", None).await;
    let years: Vec<i64> = serde_json::from_value(years["years"].clone()).unwrap();
    assert_eq!(years.first(), Some(&-753));
    assert!(years.windows(2).all(|w| w[0] < w[1]), "years must be ascending");

    let (_, places) = call(state.clone(), "GET", "/places?year=1945", None).await;
    assert_eq!(places["places"], json!(["Berlin", "Hiroshima"]));

    let (status, events) = call(state.clone(), "GET", "/events?year=1945&place=Berlin", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(events["count"], 1);
    assert_eq!(events["events"][0]["name"], "Fall of Berlin");

    let (status, events) = call(state, "GET", "/events?year=1945&place=Paris", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(events["count"], 0);
}

// ===========================================================================
// TEST 4: country timeline is chronological
// ===========================================================================
#[tokio::test]
async fn test_country_timeline() {
    let state = sample_state(None);

    let (_, countries) = call(state.clone(), "GET", "/countries", None).await;
    assert!(countries["countries"]
        .as_array()
        .unwrap()
        .contains(&json!("Italy")));

    let (status, body) = call(state, "GET", "/countries/Italy/timeline", None).await;
    assert_eq!(status, StatusCode::OK);
    let years: Vec<i64> = body["points"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["year"].as_i64().unwrap())
        .collect();
    assert_eq!(years, vec![-753, -44, 476]);
}

// ===========================================================================
// TEST 5: exploration by event type with map overlay country
// ===========================================================================
#[tokio::test]
async fn test_explore_by_type() {
    let state = sample_state(None);

    let (_, types) = call(state.clone(), "GET", "/event-types", None).await;
    assert!(types["event_types"]
        .as_array()
        .unwrap()
        .contains(&json!("Exploration")));

    let (_, body) = call(state, "GET", "/event-types/Exploration/events", None).await;
    let events = body["events"].as_array().unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0]["name"], "Voyage of Columbus");
    assert_eq!(events[0]["map_country"], "Bahamas");
    // Moon landing carries the "Unknown" sentinel
    assert!(events[1]["map_country"].is_null());
}

// ===========================================================================
// TEST 6: full quiz session over HTTP
// ===========================================================================
#[tokio::test]
async fn test_quiz_session_flow() {
    let state = sample_state(None);

    let (status, started) = call(state.clone(), "POST", "/quiz", None).await;
    assert_eq!(status, StatusCode::OK);
    let id = started["session"].as_str().unwrap().to_string();
    let questions = started["questions"].as_array().unwrap();
    assert_eq!(questions.len(), DEFAULT_QUIZ_SIZE);

    // Answer the first question with its first choice
    let first_choice = questions[0]["choices"][0].as_str().unwrap().to_string();
    let (status, answered) = call(
        state.clone(),
        "POST",
        &format!("/quiz/{}/answer", id),
        Some(json!({ "index": 0, "answer": first_choice })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(answered["answered"], 1);

    // An answer that is not a choice is refused
    let (status, _) = call(
        state.clone(),
        "POST",
        &format!("/quiz/{}/answer", id),
        Some(json!({ "index": 1, "answer": "definitely not a choice" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, score) = call(state.clone(), "GET", &format!("/quiz/{}/score", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(score["total"], DEFAULT_QUIZ_SIZE);
    let expected = if score["results"][0]["correct"] == json!(true) { 1 } else { 0 };
    assert_eq!(score["score"], expected);

    let (status, reset) = call(state.clone(), "POST", &format!("/quiz/{}/reset", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reset["session"], id.as_str());

    let (_, score) = call(state.clone(), "GET", &format!("/quiz/{}/score", id), None).await;
    assert_eq!(score["score"], 0);
    assert!(score["results"][0].get("correct_answer").is_none());

    let (status, ended) = call(state.clone(), "DELETE", &format!("/quiz/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ended["ended"], true);

    let (status, _) = call(state, "GET", &format!("/quiz/{}/score", id), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ===========================================================================
// TEST 7: quiz larger than the pool is refused
// ===========================================================================
#[tokio::test]
async fn test_quiz_insufficient_pool() {
    let (status, body) = call(
        sample_state(None),
        "POST",
        "/quiz",
        Some(json!({ "size": 50 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");

    let state = sample_state(None);
    let (status, _) = call(state.clone(), "POST", "/quiz", Some(json!({ "size": 0 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(state.sessions.lock().await.is_empty());
}

// ===========================================================================
// TEST 8: assistant - stub backend, blank question, wiremock failure
// ===========================================================================
#[tokio::test]
async fn test_ask_with_stub_assistant() {
    let state = sample_state(Some(Arc::new(EchoAssistant)));

    let (status, body) = call(
        state.clone(),
        "POST",
        "/ask",
        Some(json!({ "question": "Who was Leonidas?" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
    assert_eq!(body["message"], "You asked: Who was Leonidas?");

    let (status, body) = call(state, "POST", "/ask", Some(json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], false);
    assert_eq!(body["message"], "Please enter a question.");
}

#[tokio::test]
async fn test_ask_api_failure_is_displayed_not_propagated() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": { "message": "Incorrect API key provided" }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = ChatCompletionsClient::new(ChatConfig {
        api_key: "bad-key".to_string(),
        model: "gpt-3.5-turbo".to_string(),
        base_url: mock_server.uri(),
    })
    .unwrap();
    let state = sample_state(Some(Arc::new(client)));

    let (status, body) = call(
        state,
        "POST",
        "/ask",
        Some(json!({ "question": "What caused the fall of Rome?" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], false);
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("Incorrect API key provided"));
}
