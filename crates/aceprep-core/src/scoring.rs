//! Negative-marking scorer and personal best tracking.
//!
//! Each question is scored independently: +4 for an exact match with the
//! correct answer token, -1 for any other answer, 0 when unanswered. Totals
//! can go negative and are never clamped.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::QuestionSet;
use crate::persist::Persist;

/// Marks awarded for a correct answer.
pub const CORRECT_MARKS: i32 = 4;

/// Marks awarded for an incorrect answer.
pub const INCORRECT_MARKS: i32 = -1;

/// Question id → the user's answer token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerMap(BTreeMap<u32, String>);

impl AnswerMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the answer for `id`.
    pub fn insert(&mut self, id: u32, token: impl Into<String>) {
        self.0.insert(id, token.into());
    }

    /// Forget the answer for `id`, making the question skipped again.
    pub fn clear(&mut self, id: u32) -> Option<String> {
        self.0.remove(&id)
    }

    pub fn get(&self, id: u32) -> Option<&str> {
        self.0.get(&id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &str)> {
        self.0.iter().map(|(id, token)| (*id, token.as_str()))
    }
}

impl FromIterator<(u32, String)> for AnswerMap {
    fn from_iter<I: IntoIterator<Item = (u32, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// What a single question earned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Correct,
    Incorrect,
    Skipped,
}

impl Outcome {
    pub fn marks(&self) -> i32 {
        match self {
            Outcome::Correct => CORRECT_MARKS,
            Outcome::Incorrect => INCORRECT_MARKS,
            Outcome::Skipped => 0,
        }
    }
}

/// Per-question entry of a [`ScoreResult`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOutcome {
    pub question_id: u32,
    pub outcome: Outcome,
    /// The answer that was scored, if any.
    pub submitted: Option<String>,
}

/// Result of scoring one answer map against one question set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub total: i32,
    /// In question-set order.
    pub outcomes: Vec<QuestionOutcome>,
}

impl ScoreResult {
    pub fn count(&self, outcome: Outcome) -> usize {
        self.outcomes.iter().filter(|o| o.outcome == outcome).count()
    }

    /// Highest total the set allows.
    pub fn max_total(&self) -> i32 {
        self.outcomes.len() as i32 * CORRECT_MARKS
    }

    pub fn outcome_of(&self, question_id: u32) -> Option<Outcome> {
        self.outcomes
            .iter()
            .find(|o| o.question_id == question_id)
            .map(|o| o.outcome)
    }
}

/// Score `answers` against `set`.
pub fn score(set: &QuestionSet, answers: &AnswerMap) -> ScoreResult {
    let outcomes: Vec<QuestionOutcome> = set
        .questions
        .iter()
        .map(|q| {
            let submitted = answers.get(q.id);
            let outcome = match submitted {
                None => Outcome::Skipped,
                Some(token) if token == q.correct_answer => Outcome::Correct,
                Some(_) => Outcome::Incorrect,
            };
            QuestionOutcome {
                question_id: q.id,
                outcome,
                submitted: submitted.map(str::to_string),
            }
        })
        .collect();

    let total = outcomes.iter().map(|o| o.outcome.marks()).sum();
    ScoreResult { total, outcomes }
}

/// Highest archive score ever recorded.
///
/// Starts at 0, so a negative total is never recorded. The stored value only
/// ever increases.
pub struct PersonalBest {
    best: i32,
    backend: Box<dyn Persist<i32>>,
}

impl PersonalBest {
    pub fn open(backend: impl Persist<i32> + 'static) -> Self {
        let best = match backend.load() {
            Ok(value) => value.unwrap_or(0),
            Err(e) => {
                tracing::warn!("failed to load personal best, using 0: {e:#}");
                0
            }
        };
        Self {
            best,
            backend: Box::new(backend),
        }
    }

    pub fn current(&self) -> i32 {
        self.best
    }

    /// Record `total`; returns `true` when it beats the stored best.
    pub fn record(&mut self, total: i32) -> bool {
        if total <= self.best {
            return false;
        }
        tracing::info!(previous = self.best, new = total, "new personal best");
        self.best = total;
        if let Err(e) = self.backend.save(&total) {
            tracing::warn!("failed to persist personal best: {e:#}");
        }
        true
    }
}
