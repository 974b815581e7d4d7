use chronicle_core::assistant::{ask_for_display, AssistantReply};
use chronicle_core::facts::random_curiosity;
use chronicle_core::protocol::{ChronicleRequest, ChronicleResponse};
use std::collections::HashMap;

use chrono::Utc;
use chronicle_core::{Event, QuizSession};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use serde_json::json;
use uuid::Uuid;

use crate::state::AppState;

/// An event as listed in exploration mode, with the country to highlight on
/// the map overlay (absent for unknown countries).
#[derive(Debug, Serialize)]
pub struct ExploredEvent<'a> {
    #[serde(flatten)]
    pub event: &'a Event,
    pub map_country: Option<&'a str>,
}

pub async fn handle_request(request: ChronicleRequest, state: &AppState) -> ChronicleResponse {
    match request {
        ChronicleRequest::Ping => ChronicleResponse::pong(),
        ChronicleRequest::Health => ChronicleResponse::ok(health_data(state)),
        ChronicleRequest::Years => ChronicleResponse::ok(json!({
            "years": state.events.distinct_years(),
        })),
        ChronicleRequest::Places { year } => ChronicleResponse::ok(json!({
            "year": year,
            "places": state.events.places_at(year),
        })),
        ChronicleRequest::EventsAt { year, place } => {
            let events = state.events.events_at(year, &place);
            ChronicleResponse::ok(json!({
                "year": year,
                "place": place,
                "count": events.len(),
                "events": events,
            }))
        }
        ChronicleRequest::Countries => ChronicleResponse::ok(json!({
            "countries": state.events.distinct_countries(),
        })),
        ChronicleRequest::Timeline { country } => {
            let events = state.events.events_in_country(&country);
            ChronicleResponse::ok(json!({
                "country": country,
                "points": state.events.timeline(&country),
                "events": events,
            }))
        }
        ChronicleRequest::EventTypes => ChronicleResponse::ok(json!({
            "event_types": state.events.distinct_event_types(),
        })),
        ChronicleRequest::EventsOfType { event_type } => {
            let events: Vec<ExploredEvent> = state
                .events
                .events_of_type(&event_type)
                .into_iter()
                .map(|event| ExploredEvent {
                    event,
                    map_country: event.map_country(),
                })
                .collect();
            ChronicleResponse::ok(json!({
                "event_type": event_type,
                "count": events.len(),
                "events": events,
            }))
        }
        ChronicleRequest::Curiosity => {
            let mut rng = StdRng::from_entropy();
            ChronicleResponse::ok(json!({ "curiosity": random_curiosity(&mut rng) }))
        }
        ChronicleRequest::StartQuiz { size } => start_quiz(state, size).await,
        ChronicleRequest::SubmitAnswer {
            session,
            index,
            answer,
        } => submit_answer(state, session, index, answer).await,
        ChronicleRequest::Score { session } => score_quiz(state, session).await,
        ChronicleRequest::ResetQuiz { session } => reset_quiz(state, session).await,
        ChronicleRequest::EndQuiz { session } => end_quiz(state, session).await,
        ChronicleRequest::Ask { question } => {
            let reply = match &state.assistant {
                Some(backend) => ask_for_display(backend.as_ref(), &question).await,
                None => AssistantReply {
                    ok: false,
                    message: "The historical assistant is not configured.".to_string(),
                },
            };
            ChronicleResponse::ok(json!(reply))
        }
    }
}

fn health_data(state: &AppState) -> serde_json::Value {
    let year_span = state
        .events
        .year_span()
        .map(|(min, max)| json!({ "min": min, "max": max }));

    json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "events": state.events.len(),
        "dropped_events": state.events.dropped(),
        "questions": state.pool().len(),
        "rejected_questions": state.trivia.rejected,
        "quiz_size": state.quiz_size,
        "year_span": year_span,
        "assistant": state.assistant.as_ref().map(|a| a.name().to_string()),
    })
}

// ============================================================================
// Quiz sessions
// ============================================================================

fn session_data(id: Uuid, session: &QuizSession) -> serde_json::Value {
    let questions: Vec<_> = session.questions().iter().map(|q| q.to_public()).collect();
    json!({
        "session": id,
        "size": session.len(),
        "started_at": session.started_at(),
        "questions": questions,
    })
}

fn unknown_session(id: Uuid) -> ChronicleResponse {
    ChronicleResponse::err(format!("Unknown quiz session: {}", id))
}

/// Drop expired attempts, then the oldest ones until a new attempt fits.
fn evict_sessions(state: &AppState, sessions: &mut HashMap<Uuid, QuizSession>) {
    let now = Utc::now();
    let before = sessions.len();
    sessions.retain(|_, s| !s.is_expired(now, state.session_ttl));

    while sessions.len() >= state.max_sessions {
        let Some(oldest) = sessions
            .iter()
            .min_by_key(|(_, s)| s.started_at())
            .map(|(id, _)| *id)
        else {
            break;
        };
        sessions.remove(&oldest);
    }

    let evicted = before - sessions.len();
    if evicted > 0 {
        tracing::debug!(evicted, held = sessions.len(), "Evicted quiz sessions");
    }
}

async fn start_quiz(state: &AppState, size: Option<usize>) -> ChronicleResponse {
    let size = size.unwrap_or(state.quiz_size);
    if size == 0 {
        return ChronicleResponse::err("Quiz size must be at least 1");
    }
    let mut rng = StdRng::from_entropy();

    match QuizSession::start(state.pool(), size, &mut rng) {
        Ok(session) => {
            let id = Uuid::new_v4();
            let data = session_data(id, &session);
            let mut sessions = state.sessions.lock().await;
            evict_sessions(state, &mut sessions);
            sessions.insert(id, session);
            tracing::debug!(session = %id, size, "Quiz session started");
            ChronicleResponse::ok(data)
        }
        Err(e) => {
            tracing::warn!(size, pool = state.pool().len(), "Quiz start refused: {}", e);
            ChronicleResponse::err(e.to_string())
        }
    }
}

async fn submit_answer(
    state: &AppState,
    id: Uuid,
    index: usize,
    answer: String,
) -> ChronicleResponse {
    let mut sessions = state.sessions.lock().await;
    let Some(session) = sessions.get_mut(&id) else {
        return unknown_session(id);
    };

    match session.submit_answer(index, answer) {
        Ok(()) => ChronicleResponse::ok(json!({
            "session": id,
            "index": index,
            "answered": session.answers().iter().filter(|a| a.is_some()).count(),
            "complete": session.is_complete(),
        })),
        Err(e) => ChronicleResponse::err(e.to_string()),
    }
}

async fn score_quiz(state: &AppState, id: Uuid) -> ChronicleResponse {
    let sessions = state.sessions.lock().await;
    let Some(session) = sessions.get(&id) else {
        return unknown_session(id);
    };

    // Correct answers stay hidden while the attempt is still open.
    let complete = session.is_complete();
    let results: Vec<serde_json::Value> = session
        .questions()
        .iter()
        .zip(session.answers())
        .map(|(q, a)| {
            let mut result = json!({
                "prompt": q.prompt(),
                "answer": a,
                "correct": a.as_deref().is_some_and(|a| q.is_correct(a)),
            });
            if complete {
                result["correct_answer"] = json!(q.correct_answer());
            }
            result
        })
        .collect();

    ChronicleResponse::ok(json!({
        "session": id,
        "score": session.score(),
        "total": session.len(),
        "complete": complete,
        "results": results,
    }))
}

async fn reset_quiz(state: &AppState, id: Uuid) -> ChronicleResponse {
    let mut sessions = state.sessions.lock().await;
    let Some(session) = sessions.get_mut(&id) else {
        return unknown_session(id);
    };

    let mut rng = StdRng::from_entropy();
    match session.reset(state.pool(), &mut rng) {
        Ok(()) => ChronicleResponse::ok(session_data(id, session)),
        Err(e) => ChronicleResponse::err(e.to_string()),
    }
}

async fn end_quiz(state: &AppState, id: Uuid) -> ChronicleResponse {
    match state.sessions.lock().await.remove(&id) {
        Some(_) => {
            tracing::debug!(session = %id, "Quiz session ended");
            ChronicleResponse::ok(json!({ "session": id, "ended": true }))
        }
        None => unknown_session(id),
    }
}
