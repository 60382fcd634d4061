//! # live-quiz
//!
//! A moderated multiple-choice quiz played live over TCP. The first person to
//! join becomes the admin and drives the game; everyone after that answers
//! questions and collects points.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use live_quiz::{QuizError, ServerConfig, server::Server};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), QuizError> {
//!     let server = Server::bind(ServerConfig::default()).await?;
//!     server.run().await;
//!     Ok(())
//! }
//! ```

pub mod client;
mod config;
mod data;
mod models;
pub mod protocol;
pub mod server;

use std::io;

use thiserror::Error;

pub use config::{ClientConfig, ServerConfig};
pub use data::{LoadError, load_questions_from_json, validate_questions};
pub use models::Question;

/// Error type for quiz operations.
#[derive(Debug, Error)]
pub enum QuizError {
    /// Error loading questions from file.
    #[error("Failed to load questions: {0}")]
    Load(#[from] LoadError),

    /// Could not reach the server.
    #[error("Failed to connect to {addr}: {source}")]
    Connect { addr: String, source: io::Error },

    /// IO error while serving or playing.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}
