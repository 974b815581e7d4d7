use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::DataIntegrityError;

/// One quiz item. Construction guarantees the correct answer is exactly one
/// of the (unique, display-ordered) choices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TriviaRecord")]
pub struct TriviaQuestion {
    prompt: String,
    choices: Vec<String>,
    correct_answer: String,
}

/// Unchecked shape used when deserializing; validated into `TriviaQuestion`.
#[derive(Debug, Deserialize)]
struct TriviaRecord {
    prompt: String,
    choices: Vec<String>,
    correct_answer: String,
}

impl TryFrom<TriviaRecord> for TriviaQuestion {
    type Error = DataIntegrityError;

    fn try_from(r: TriviaRecord) -> Result<Self, Self::Error> {
        TriviaQuestion::new(r.prompt, r.choices, r.correct_answer)
    }
}

impl TriviaQuestion {
    pub fn new(
        prompt: impl Into<String>,
        choices: Vec<String>,
        correct_answer: impl Into<String>,
    ) -> Result<Self, DataIntegrityError> {
        let correct_answer = correct_answer.into();

        if choices.is_empty() {
            return Err(DataIntegrityError::NoChoices);
        }

        let mut seen = HashSet::with_capacity(choices.len());
        for choice in &choices {
            if !seen.insert(choice.as_str()) {
                return Err(DataIntegrityError::DuplicateChoice(choice.clone()));
            }
        }

        if !seen.contains(correct_answer.as_str()) {
            return Err(DataIntegrityError::AnswerNotInChoices {
                answer: correct_answer,
            });
        }

        Ok(Self {
            prompt: prompt.into(),
            choices,
            correct_answer,
        })
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Choices in display order.
    pub fn choices(&self) -> &[String] {
        &self.choices
    }

    pub fn correct_answer(&self) -> &str {
        &self.correct_answer
    }

    pub fn is_correct(&self, answer: &str) -> bool {
        self.correct_answer == answer
    }

    pub fn has_choice(&self, answer: &str) -> bool {
        self.choices.iter().any(|c| c == answer)
    }

    /// The question as shown to a quiz taker, answer withheld.
    pub fn to_public(&self) -> PublicQuestion {
        PublicQuestion {
            prompt: self.prompt.clone(),
            choices: self.choices.clone(),
        }
    }
}

/// A question with its correct answer stripped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicQuestion {
    pub prompt: String,
    pub choices: Vec<String>,
}
