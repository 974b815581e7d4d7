pub mod assistant;
pub mod config;
pub mod error;
pub mod facts;
pub mod models;
pub mod normalize;
pub mod protocol;
pub mod query;
pub mod quiz;

pub use assistant::{
    ask_for_display, AssistantBackend, AssistantError, AssistantReply, ChatCompletionsClient,
    ChatConfig,
};
pub use config::ChronicleConfig;
pub use error::{DataIntegrityError, QuizError};
pub use models::{Event, PublicQuestion, RawEvent, RawYear, TriviaQuestion};
pub use normalize::{chronological_order, normalize, parse_year, DroppedRow, NormalizedEvents};
pub use query::{EventIndex, TimelinePoint};
pub use quiz::{
    sample_quiz, score, QuizSession, DEFAULT_MAX_SESSIONS, DEFAULT_QUIZ_SIZE,
    DEFAULT_SESSION_TTL_SECS,
};
