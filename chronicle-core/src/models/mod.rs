pub mod event;
pub mod trivia;

pub use event::{Event, RawEvent, RawYear, UNKNOWN_COUNTRY};
pub use trivia::{PublicQuestion, TriviaQuestion};
