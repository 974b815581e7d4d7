use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Protocol tag reported by `/version`.
pub const PROTOCOL: &str = "chronicle/1";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ChronicleRequest {
    Ping,
    Health,
    Years,
    Places {
        year: i64,
    },
    EventsAt {
        year: i64,
        place: String,
    },
    Countries,
    Timeline {
        country: String,
    },
    EventTypes,
    EventsOfType {
        event_type: String,
    },
    Curiosity,
    StartQuiz {
        #[serde(default)]
        size: Option<usize>,
    },
    SubmitAnswer {
        session: Uuid,
        index: usize,
        answer: String,
    },
    Score {
        session: Uuid,
    },
    ResetQuiz {
        session: Uuid,
    },
    EndQuiz {
        session: Uuid,
    },
    Ask {
        question: String,
    },
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ChronicleResponse {
    pub status: String,
    pub data: Option<serde_json::Value>,
    pub error: Option<String>,
    pub version: String,
}

impl ChronicleResponse {
    pub fn ok(data: serde_json::Value) -> Self {
        Self {
            status: "ok".to_string(),
            data: Some(data),
            error: None,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    pub fn err(msg: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            data: None,
            error: Some(msg.into()),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    pub fn pong() -> Self {
        Self::ok(serde_json::json!({"pong": true}))
    }

    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}
