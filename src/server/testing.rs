//! In-memory [`Outbound`] used by the session tests.

use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use crate::protocol::ServerMessage;

use super::broadcast::Outbound;
use super::state::ConnectionId;

/// Records every delivered message per connection.
#[derive(Debug, Default)]
pub struct Recorder {
    open: Vec<ConnectionId>,
    failing: HashSet<ConnectionId>,
    inbox: HashMap<ConnectionId, Vec<ServerMessage>>,
}

impl Recorder {
    /// Simulate an accepted connection.
    pub fn open(&mut self) -> ConnectionId {
        let id = Uuid::new_v4();
        self.open.push(id);
        id
    }

    /// Simulate a connection going away.
    pub fn close(&mut self, id: ConnectionId) {
        self.open.retain(|open| *open != id);
    }

    /// Keep the connection listed but make every write to it fail.
    pub fn fail_writes(&mut self, id: ConnectionId) {
        self.failing.insert(id);
    }

    /// Messages delivered to `id` so far.
    pub fn received(&self, id: ConnectionId) -> Vec<ServerMessage> {
        self.inbox.get(&id).cloned().unwrap_or_default()
    }

    /// Forget everything delivered so far.
    pub fn clear(&mut self) {
        self.inbox.clear();
    }
}

impl Outbound for Recorder {
    fn send(&mut self, to: ConnectionId, message: &ServerMessage) -> bool {
        if !self.open.contains(&to) || self.failing.contains(&to) {
            return false;
        }
        self.inbox.entry(to).or_default().push(message.clone());
        true
    }

    fn connection_ids(&self) -> Vec<ConnectionId> {
        self.open.clone()
    }
}
