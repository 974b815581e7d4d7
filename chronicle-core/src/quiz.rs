//! Trivia quiz: sampling, scoring and per-attempt session state
//!
//! A quiz attempt draws a fixed sample once and keeps it until an explicit
//! [`QuizSession::reset`]. Scoring is a pure query over the drawn questions and
//! the answers recorded so far.

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::QuizError;
use crate::models::TriviaQuestion;

/// Number of questions per attempt unless configured otherwise.
pub const DEFAULT_QUIZ_SIZE: usize = 5;

/// How long a server-held attempt lives after it was started or reset.
pub const DEFAULT_SESSION_TTL_SECS: u64 = 60 * 60;

/// Upper bound on attempts a server keeps at once.
pub const DEFAULT_MAX_SESSIONS: usize = 1024;

/// Draw `k` distinct questions uniformly at random, without replacement.
///
/// # Errors
/// * `QuizError::InsufficientPool` when the pool holds fewer than `k` questions
pub fn sample_quiz<R>(
    pool: &[TriviaQuestion],
    k: usize,
    rng: &mut R,
) -> Result<Vec<TriviaQuestion>, QuizError>
where
    R: Rng + ?Sized,
{
    if pool.len() < k {
        return Err(QuizError::InsufficientPool {
            requested: k,
            available: pool.len(),
        });
    }

    let mut drawn: Vec<TriviaQuestion> = pool.choose_multiple(rng, k).cloned().collect();
    // choose_multiple picks a uniform subset but not a uniform order
    drawn.shuffle(rng);
    Ok(drawn)
}

/// Count answers that exactly match their question's correct answer.
///
/// Unanswered (`None`) and missing trailing answers count as incorrect.
pub fn score(drawn: &[TriviaQuestion], answers: &[Option<String>]) -> usize {
    drawn
        .iter()
        .zip(answers)
        .filter(|(question, answer)| {
            answer
                .as_deref()
                .is_some_and(|a| question.is_correct(a))
        })
        .count()
}

/// One quiz attempt, owned by whoever is taking the quiz.
#[derive(Debug, Clone)]
pub struct QuizSession {
    drawn: Vec<TriviaQuestion>,
    answers: Vec<Option<String>>,
    started_at: DateTime<Utc>,
}

impl QuizSession {
    /// Draw `k` questions from the pool and start a fresh attempt.
    pub fn start<R>(pool: &[TriviaQuestion], k: usize, rng: &mut R) -> Result<Self, QuizError>
    where
        R: Rng + ?Sized,
    {
        let drawn = sample_quiz(pool, k, rng)?;
        let answers = vec![None; drawn.len()];
        Ok(Self {
            drawn,
            answers,
            started_at: Utc::now(),
        })
    }

    /// Record (or replace) the answer to question `index`.
    ///
    /// The answer must be one of that question's choices.
    pub fn submit_answer(&mut self, index: usize, answer: impl Into<String>) -> Result<(), QuizError> {
        let answer = answer.into();
        let question = self.drawn.get(index).ok_or(QuizError::QuestionOutOfRange {
            index,
            len: self.drawn.len(),
        })?;

        if !question.has_choice(&answer) {
            return Err(QuizError::UnknownChoice { index, answer });
        }

        self.answers[index] = Some(answer);
        Ok(())
    }

    pub fn score(&self) -> usize {
        score(&self.drawn, &self.answers)
    }

    /// Discard this attempt and draw a new sample of the same size.
    ///
    /// On error the current attempt is left untouched.
    pub fn reset<R>(&mut self, pool: &[TriviaQuestion], rng: &mut R) -> Result<(), QuizError>
    where
        R: Rng + ?Sized,
    {
        *self = Self::start(pool, self.drawn.len(), rng)?;
        Ok(())
    }

    pub fn questions(&self) -> &[TriviaQuestion] {
        &self.drawn
    }

    pub fn answers(&self) -> &[Option<String>] {
        &self.answers
    }

    pub fn len(&self) -> usize {
        self.drawn.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drawn.is_empty()
    }

    /// True once every drawn question has an answer.
    pub fn is_complete(&self) -> bool {
        self.answers.iter().all(Option::is_some)
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Whether the attempt was started at least `ttl` before `now`.
    pub fn is_expired(&self, now: DateTime<Utc>, ttl: std::time::Duration) -> bool {
        (now - self.started_at).to_std().is_ok_and(|age| age >= ttl)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn question(n: usize) -> TriviaQuestion {
        TriviaQuestion::new(
            format!("Question {}", n),
            vec![format!("right {}", n), format!("wrong {}", n)],
            format!("right {}", n),
        )
        .unwrap()
    }

    fn pool(size: usize) -> Vec<TriviaQuestion> {
        (0..size).map(question).collect()
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    // ========================================================================
    // sample_quiz
    // ========================================================================

    #[test]
    fn test_sample_returns_k_distinct_pool_questions() {
        let pool = pool(12);
        let mut rng = rng();
        for k in 0..=pool.len() {
            let drawn = sample_quiz(&pool, k, &mut rng).unwrap();
            assert_eq!(drawn.len(), k);
            let prompts: HashSet<&str> = drawn.iter().map(|q| q.prompt()).collect();
            assert_eq!(prompts.len(), k, "drawn questions must be distinct");
            assert!(drawn.iter().all(|q| pool.contains(q)));
        }
    }

    #[test]
    fn test_sample_whole_pool() {
        let pool = pool(5);
        let drawn = sample_quiz(&pool, 5, &mut rng()).unwrap();
        let prompts: HashSet<&str> = drawn.iter().map(|q| q.prompt()).collect();
        let expected: HashSet<&str> = pool.iter().map(|q| q.prompt()).collect();
        assert_eq!(prompts, expected);
    }

    #[test]
    fn test_sample_insufficient_pool() {
        let pool = pool(3);
        let err = sample_quiz(&pool, 5, &mut rng()).unwrap_err();
        assert_eq!(
            err,
            QuizError::InsufficientPool {
                requested: 5,
                available: 3
            }
        );
    }

    // ========================================================================
    // score
    // ========================================================================

    #[test]
    fn test_score_counts_exact_matches_only() {
        let drawn = pool(3);
        let answers = vec![
            Some("right 0".to_string()),
            Some("Right 1".to_string()),
            None,
        ];
        assert_eq!(score(&drawn, &answers), 1);
        assert_eq!(score(&drawn, &[]), 0);
    }

    #[test]
    fn test_score_increments_by_one_per_corrected_answer() {
        let drawn = pool(4);
        let mut answers: Vec<Option<String>> = drawn
            .iter()
            .enumerate()
            .map(|(i, _)| Some(format!("wrong {}", i)))
            .collect();
        let mut previous = score(&drawn, &answers);
        assert_eq!(previous, 0);

        for i in 0..drawn.len() {
            answers[i] = Some(drawn[i].correct_answer().to_string());
            let current = score(&drawn, &answers);
            assert_eq!(current, previous + 1);
            previous = current;
        }
    }

    // ========================================================================
    // QuizSession
    // ========================================================================

    #[test]
    fn test_session_draw_is_fixed_until_reset() {
        let pool = pool(20);
        let mut rng = rng();
        let mut session = QuizSession::start(&pool, DEFAULT_QUIZ_SIZE, &mut rng).unwrap();
        let first: Vec<TriviaQuestion> = session.questions().to_vec();

        let correct = first[0].correct_answer().to_string();
        session.submit_answer(0, correct).unwrap();
        assert_eq!(session.questions(), first.as_slice());
        assert_eq!(session.score(), 1);
        assert!(!session.is_complete());

        session.reset(&pool, &mut rng).unwrap();
        assert_eq!(session.len(), DEFAULT_QUIZ_SIZE);
        assert!(session.answers().iter().all(Option::is_none));
        assert_eq!(session.score(), 0);
    }

    #[test]
    fn test_session_rejects_bad_answers() {
        let pool = pool(5);
        let mut session = QuizSession::start(&pool, 2, &mut rng()).unwrap();

        assert_eq!(
            session.submit_answer(2, "anything"),
            Err(QuizError::QuestionOutOfRange { index: 2, len: 2 })
        );
        assert!(matches!(
            session.submit_answer(0, "not a choice"),
            Err(QuizError::UnknownChoice { index: 0, .. })
        ));
        assert!(session.answers().iter().all(Option::is_none));
    }

    #[test]
    fn test_session_complete_and_full_score() {
        let pool = pool(5);
        let mut session = QuizSession::start(&pool, 5, &mut rng()).unwrap();
        let answers: Vec<String> = session
            .questions()
            .iter()
            .map(|q| q.correct_answer().to_string())
            .collect();
        for (i, a) in answers.into_iter().enumerate() {
            session.submit_answer(i, a).unwrap();
        }
        assert!(session.is_complete());
        assert_eq!(session.score(), 5);
    }

    #[test]
    fn test_failed_reset_keeps_attempt() {
        let big = pool(10);
        let small = pool(2);
        let mut rng = rng();
        let mut session = QuizSession::start(&big, 5, &mut rng).unwrap();
        let before = session.questions().to_vec();

        assert!(session.reset(&small, &mut rng).is_err());
        assert_eq!(session.questions(), before.as_slice());
    }

    #[test]
    fn test_session_expiry() {
        let mut rng = rng();
        let session = QuizSession::start(&pool(5), 2, &mut rng).unwrap();
        let hour = std::time::Duration::from_secs(3600);
        let started = session.started_at();

        assert!(!session.is_expired(started, hour));
        assert!(!session.is_expired(started + chrono::Duration::minutes(59), hour));
        assert!(session.is_expired(started + chrono::Duration::minutes(61), hour));
        // A clock that went backwards never expires an attempt.
        assert!(!session.is_expired(started - chrono::Duration::minutes(5), hour));
    }
}
