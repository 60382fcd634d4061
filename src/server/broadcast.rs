//! Fan-out delivery of server messages.
//!
//! Delivery is best effort: a failed send to one connection is logged and
//! never stops delivery to the others, and it is never treated as a
//! disconnect. Disconnects are only detected on the read path.

use tracing::debug;

use crate::protocol::ServerMessage;

use super::state::{ConnectionId, SessionRegistry};

/// Anything that can push messages to live connections.
pub trait Outbound {
    /// Attempt delivery to one connection. Returns `false` on failure.
    fn send(&mut self, to: ConnectionId, message: &ServerMessage) -> bool;

    /// Every live connection, registered or not.
    fn connection_ids(&self) -> Vec<ConnectionId>;
}

/// Send to every live connection.
pub fn to_all<O: Outbound>(out: &mut O, message: &ServerMessage) {
    for id in out.connection_ids() {
        deliver(out, id, message);
    }
}

/// Send to every live connection except `skip`.
pub fn to_all_except<O: Outbound>(out: &mut O, skip: ConnectionId, message: &ServerMessage) {
    for id in out.connection_ids() {
        if id != skip {
            deliver(out, id, message);
        }
    }
}

/// Send to every registered non-admin player.
pub fn to_participants<O: Outbound>(
    out: &mut O,
    registry: &SessionRegistry,
    message: &ServerMessage,
) {
    for id in registry.participant_ids() {
        deliver(out, id, message);
    }
}

/// Send to a single connection, logging a failure.
pub fn deliver<O: Outbound>(out: &mut O, to: ConnectionId, message: &ServerMessage) -> bool {
    let delivered = out.send(to, message);
    if !delivered {
        debug!(connection = %to, %message, "delivery failed");
    }
    delivered
}
