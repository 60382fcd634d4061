//! Quiz client module.
//!
//! A plain stdin/stdout front end for admins and players.

mod client;
mod state;

pub use client::run;
pub use state::{Action, ClientApp, ClientState, DraftStep, QuestionDraft};
