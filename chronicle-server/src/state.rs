use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chronicle_core::{
    AssistantBackend, EventIndex, QuizSession, TriviaQuestion, DEFAULT_MAX_SESSIONS,
    DEFAULT_SESSION_TTL_SECS,
};
use chronicle_ingest::{Dataset, TriviaLoad};
use tokio::sync::Mutex;
use uuid::Uuid;

/// Shared state for the router and every HTTP handler.
///
/// The tables are read-only after construction. The session map is the only
/// mutable state; each entry belongs to the client holding its id. Entries
/// older than `session_ttl` are swept when a new attempt starts, and the map
/// never holds more than `max_sessions` attempts.
pub struct AppState {
    pub events: EventIndex,
    pub trivia: TriviaLoad,
    pub quiz_size: usize,
    pub assistant: Option<Arc<dyn AssistantBackend>>,
    pub sessions: Mutex<HashMap<Uuid, QuizSession>>,
    pub session_ttl: Duration,
    pub max_sessions: usize,
}

impl AppState {
    pub fn new(
        dataset: Dataset,
        quiz_size: usize,
        assistant: Option<Arc<dyn AssistantBackend>>,
    ) -> Self {
        Self {
            events: dataset.events,
            trivia: dataset.trivia,
            quiz_size,
            assistant,
            sessions: Mutex::new(HashMap::new()),
            session_ttl: Duration::from_secs(DEFAULT_SESSION_TTL_SECS),
            max_sessions: DEFAULT_MAX_SESSIONS,
        }
    }

    pub fn with_session_limits(mut self, ttl: Duration, max_sessions: usize) -> Self {
        self.session_ttl = ttl;
        self.max_sessions = max_sessions.max(1);
        self
    }

    /// The quiz pool: every trivia question that passed validation.
    pub fn pool(&self) -> &[TriviaQuestion] {
        &self.trivia.questions
    }
}
