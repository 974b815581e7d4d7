use thiserror::Error;

/// A trivia row that cannot be trusted as a quiz question.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DataIntegrityError {
    #[error("malformed choice list: {0}")]
    MalformedChoices(String),

    #[error("question has no choices")]
    NoChoices,

    #[error("duplicate choice: {0:?}")]
    DuplicateChoice(String),

    #[error("correct answer {answer:?} is not one of the choices")]
    AnswerNotInChoices { answer: String },

    #[error("missing field: {0}")]
    MissingField(&'static str),

    #[error("row has {found} fields, expected {expected}")]
    FieldCount { expected: usize, found: usize },

    #[error("unreadable row: {0}")]
    UnreadableRow(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QuizError {
    #[error("quiz pool has {available} questions, {requested} requested")]
    InsufficientPool { requested: usize, available: usize },

    #[error("question {index} out of range (quiz has {len})")]
    QuestionOutOfRange { index: usize, len: usize },

    #[error("{answer:?} is not a choice for question {index}")]
    UnknownChoice { index: usize, answer: String },
}
