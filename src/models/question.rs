use serde::Deserialize;

use crate::protocol::{NUM_OPTIONS, QuestionSubmission};

/// A question from the admin's question bank.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Question {
    pub text: String,
    pub options: [String; NUM_OPTIONS],
    /// 1-based index into `options`.
    pub correct_answer: usize,
}

impl Question {
    pub fn to_submission(&self) -> QuestionSubmission {
        QuestionSubmission {
            text: self.text.clone(),
            options: self.options.clone(),
            correct: self.correct_answer,
        }
    }
}
