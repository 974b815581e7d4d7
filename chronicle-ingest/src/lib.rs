//! Loading of the static input tables
//!
//! Both tables are read once at startup and handed to the core as owned,
//! in-memory values:
//! - the events CSV becomes an [`EventIndex`] (normalized, chronological)
//! - the trivia CSV becomes a validated quiz pool ([`TriviaLoad`])

pub mod choices;
pub mod error;
pub mod events;
pub mod trivia;

use chronicle_core::config::DataConfig;
use chronicle_core::EventIndex;

pub use choices::parse_choices;
pub use error::IngestError;
pub use events::{load_events, read_events};
pub use trivia::{load_trivia, read_trivia, RejectedQuestion, TriviaLoad};

/// Everything the query surface and the quiz need, loaded and validated.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub events: EventIndex,
    pub trivia: TriviaLoad,
}

pub fn load_dataset(config: &DataConfig) -> Result<Dataset, IngestError> {
    let events = EventIndex::new(load_events(&config.events_path)?);
    let trivia = load_trivia(&config.trivia_path)?;

    tracing::info!(
        events = events.len(),
        dropped_events = events.dropped().len(),
        questions = trivia.questions.len(),
        rejected_questions = trivia.rejected.len(),
        "Dataset loaded"
    );

    Ok(Dataset { events, trivia })
}
