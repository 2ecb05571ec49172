//! Answer sheet for the test-taking tools.
//!
//! A sheet starts in the answering phase, where answers may be changed
//! freely and correctness is hidden. Submitting freezes the answers, scores
//! them and reveals solutions. There is no way back to answering for the
//! same question set.

use crate::error::AnswerError;
use crate::model::{Question, QuestionSet};
use crate::scoring::{score, AnswerMap, ScoreResult};

/// A question set together with the user's answers to it.
///
/// The sheet is submitted once `result` is set; the answers are frozen from
/// then on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerSheet {
    set: QuestionSet,
    answers: AnswerMap,
    result: Option<ScoreResult>,
}

impl AnswerSheet {
    /// A fresh sheet with no answers.
    pub fn new(set: QuestionSet) -> Self {
        Self {
            set,
            answers: AnswerMap::new(),
            result: None,
        }
    }

    pub fn questions(&self) -> &QuestionSet {
        &self.set
    }

    pub fn answers(&self) -> &AnswerMap {
        &self.answers
    }

    pub fn is_submitted(&self) -> bool {
        self.result.is_some()
    }

    /// The frozen score, once submitted.
    pub fn result(&self) -> Option<&ScoreResult> {
        self.result.as_ref()
    }

    /// Record an answer for `question_id`.
    ///
    /// A blank token clears the answer. MCQ answers are normalised to an
    /// option letter and must name an offered option.
    pub fn answer(&mut self, question_id: u32, token: &str) -> Result<(), AnswerError> {
        if self.is_submitted() {
            return Err(AnswerError::AlreadySubmitted);
        }
        let question: &Question = self
            .set
            .get(question_id)
            .ok_or(AnswerError::UnknownQuestion(question_id))?;

        match question.normalize_answer(token) {
            None => {
                self.answers.clear(question_id);
            }
            Some(Ok(normalized)) => self.answers.insert(question_id, normalized),
            Some(Err(token)) => {
                return Err(AnswerError::InvalidOption {
                    id: question_id,
                    token,
                })
            }
        }
        Ok(())
    }

    /// Freeze the answers and score them. Submitting twice returns the
    /// original result unchanged.
    pub fn submit(&mut self) -> &ScoreResult {
        let (set, answers) = (&self.set, &self.answers);
        self.result.get_or_insert_with(|| score(set, answers))
    }
}
