use config::{Config, ConfigError, File};
use serde::Deserialize;

use crate::assistant::{DEFAULT_BASE_URL, DEFAULT_CHAT_MODEL};
use crate::quiz::{DEFAULT_MAX_SESSIONS, DEFAULT_QUIZ_SIZE, DEFAULT_SESSION_TTL_SECS};

#[derive(Debug, Deserialize, Clone)]
pub struct ChronicleConfig {
    pub service: ServiceConfig,
    pub data: DataConfig,
    #[serde(default)]
    pub quiz: QuizConfig,
    #[serde(default)]
    pub assistant: AssistantConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    pub log_level: String,
}

/// Locations of the two static input tables.
#[derive(Debug, Deserialize, Clone)]
pub struct DataConfig {
    pub events_path: String,
    pub trivia_path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct QuizConfig {
    pub size: usize,
    /// Seconds an idle attempt is kept on the server.
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: u64,
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
}

fn default_session_ttl_secs() -> u64 {
    DEFAULT_SESSION_TTL_SECS
}

fn default_max_sessions() -> usize {
    DEFAULT_MAX_SESSIONS
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_QUIZ_SIZE,
            session_ttl_secs: DEFAULT_SESSION_TTL_SECS,
            max_sessions: DEFAULT_MAX_SESSIONS,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AssistantConfig {
    pub model: String,
    pub base_url: String,
    /// Falls back to `OPENAI_API_KEY` when absent.
    #[serde(default)]
    pub api_key: Option<String>,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_CHAT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub host: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8777,
        }
    }
}

impl ChronicleConfig {
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(File::with_name(path))
            .build()?;
        s.try_deserialize()
    }
}
