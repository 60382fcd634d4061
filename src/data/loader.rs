use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::models::Question;
use crate::protocol::NUM_OPTIONS;

/// Errors raised while loading a question bank.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("{} must contain at least one question", .path.display())]
    Empty { path: PathBuf },

    #[error("question {number}: {reason}")]
    Invalid { number: usize, reason: String },
}

/// Load and validate a JSON question bank.
pub fn load_questions_from_json<P: AsRef<Path>>(path: P) -> Result<Vec<Question>, LoadError> {
    let path = path.as_ref();

    let json_content = fs::read_to_string(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let questions: Vec<Question> =
        serde_json::from_str(&json_content).map_err(|source| LoadError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    if questions.is_empty() {
        return Err(LoadError::Empty {
            path: path.to_path_buf(),
        });
    }

    validate_questions(&questions)?;
    Ok(questions)
}

/// Check that every question can be sent as a `QUESTION:` frame.
pub fn validate_questions(questions: &[Question]) -> Result<(), LoadError> {
    for (i, question) in questions.iter().enumerate() {
        let number = i + 1;
        if !(1..=NUM_OPTIONS).contains(&question.correct_answer) {
            return Err(LoadError::Invalid {
                number,
                reason: format!(
                    "correct_answer must be 1-{NUM_OPTIONS}, got {}",
                    question.correct_answer
                ),
            });
        }
        let fields = std::iter::once(&question.text).chain(question.options.iter());
        for field in fields {
            if field.contains(['|', '\n']) {
                return Err(LoadError::Invalid {
                    number,
                    reason: format!("{field:?} contains '|' or a line break"),
                });
            }
        }
    }
    Ok(())
}
