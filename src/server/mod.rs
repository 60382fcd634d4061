//! Quiz session server.
//!
//! Hosts a single session over newline-framed TCP: one admin, any number of
//! participants.

mod broadcast;
mod connection;
mod round;
mod scoreboard;
mod server;
mod session;
mod state;
#[cfg(test)]
mod testing;

pub use broadcast::Outbound;
pub use connection::{Chunk, ConnectionManager, Ready, TransportError};
pub use round::Round;
pub use server::{Server, serve};
pub use session::Session;
pub use state::{ConnectionId, Phase, Player, Resolution, SessionRegistry};
