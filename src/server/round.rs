//! One question/answer/scoring cycle.

use std::collections::HashMap;

use crate::protocol::{NUM_OPTIONS, QuestionSubmission, ServerMessage};

use super::state::ConnectionId;

/// The outstanding question and the answers collected for it.
#[derive(Debug, Clone)]
pub struct Round {
    text: String,
    options: [String; NUM_OPTIONS],
    correct: usize,
    answers: HashMap<ConnectionId, usize>,
}

impl Round {
    pub fn new(question: QuestionSubmission) -> Self {
        Self {
            text: question.text,
            options: question.options,
            correct: question.correct,
            answers: HashMap::new(),
        }
    }

    /// The form sent to participants: the correct option is not included.
    pub fn question_message(&self) -> ServerMessage {
        ServerMessage::Question {
            text: self.text.clone(),
            options: self.options.clone(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn options(&self) -> &[String; NUM_OPTIONS] {
        &self.options
    }

    /// 1-based index of the correct option.
    pub fn correct(&self) -> usize {
        self.correct
    }

    /// Record an answer. A second answer from the same player replaces the
    /// first.
    pub fn record(&mut self, player: ConnectionId, choice: usize) {
        self.answers.insert(player, choice);
    }

    pub fn answer_of(&self, player: &ConnectionId) -> Option<usize> {
        self.answers.get(player).copied()
    }

    pub fn is_correct(&self, player: &ConnectionId) -> bool {
        self.answer_of(player) == Some(self.correct)
    }

    pub fn answer_count(&self) -> usize {
        self.answers.len()
    }

    /// Whether the number of answers recorded, including those of players
    /// who have since left, matches the current participant count.
    pub fn is_complete(&self, participants: usize) -> bool {
        self.answers.len() == participants
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn round() -> Round {
        Round::new(QuestionSubmission {
            text: "Capital?".to_string(),
            options: ["London", "Paris", "Berlin", "Madrid"].map(String::from),
            correct: 2,
        })
    }

    #[test]
    fn test_last_answer_wins() {
        let mut round = round();
        let p = Uuid::new_v4();
        round.record(p, 1);
        round.record(p, 2);
        assert_eq!(round.answer_count(), 1);
        assert!(round.is_correct(&p));
    }

    #[test]
    fn test_completion_counts_current_participants() {
        let mut round = round();
        let (p1, p2) = (Uuid::new_v4(), Uuid::new_v4());
        round.record(p1, 3);
        assert!(!round.is_complete(2));
        round.record(p2, 2);
        assert!(round.is_complete(2));
    }

    #[test]
    fn test_departed_answer_still_counts() {
        let mut round = round();
        let (gone, p2) = (Uuid::new_v4(), Uuid::new_v4());
        round.record(gone, 2);
        assert!(!round.is_complete(3));

        // `gone` has left, leaving two participants.
        round.record(p2, 1);
        assert_eq!(round.answer_of(&gone), Some(2));
        assert!(round.is_complete(2));
    }

    #[test]
    fn test_question_message_hides_correct_option() {
        assert_eq!(
            round().question_message().to_string(),
            "QUESTION:Capital?|London|Paris|Berlin|Madrid"
        );
    }
}
