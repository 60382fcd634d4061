//! Session state: players, roles and the lifecycle phase.

use std::collections::HashMap;

use tracing::info;
use uuid::Uuid;

use crate::protocol::{Role, ServerMessage};

use super::broadcast::{self, Outbound};

/// Stable identifier issued to a connection when it is accepted.
pub type ConnectionId = Uuid;

/// Coarse lifecycle stage of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nobody has registered yet, so there is no admin.
    AwaitingRole,
    /// Admin present, waiting for `START_GAME`.
    Idle,
    /// Game running; questions may be asked.
    InProgress,
    /// Game over. Terminal.
    Ended,
}

/// A registered player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    /// Id of the connection the player registered on.
    pub id: ConnectionId,
    /// Self-reported display name.
    pub name: String,
    /// Assigned once at registration, never changed.
    pub role: Role,
    /// Cumulative points.
    pub score: u32,
    /// Registration sequence number, used to break ranking ties.
    pub joined: u64,
}

impl Player {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn add_point(&mut self) {
        self.score += 1;
    }
}

/// Outcome of [`SessionRegistry::register_or_resolve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The frame was this connection's name and a player was created.
    Registered(Role),
    /// The connection already belongs to a player with this role.
    Known(Role),
}

/// Maps connections to players and hands out the admin role.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    players: HashMap<ConnectionId, Player>,
    next_seq: u64,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the connection using `frame` as its display name, or resolve
    /// the player it already belongs to.
    ///
    /// The first player ever registered becomes the admin. Registration sends
    /// the `ROLE:` message and announces the newcomer to every connection.
    pub fn register_or_resolve<O: Outbound>(
        &mut self,
        out: &mut O,
        id: ConnectionId,
        frame: &str,
    ) -> Resolution {
        if let Some(player) = self.players.get(&id) {
            return Resolution::Known(player.role);
        }

        let role = if self.next_seq == 0 {
            Role::Admin
        } else {
            Role::Participant
        };
        let player = Player {
            id,
            name: frame.to_string(),
            role,
            score: 0,
            joined: self.next_seq,
        };
        self.next_seq += 1;

        info!(connection = %id, name = %player.name, ?role, "player registered");
        broadcast::deliver(out, id, &ServerMessage::Role(role));
        broadcast::to_all(
            out,
            &ServerMessage::System(format!("{} joined the game!", player.name)),
        );
        self.players.insert(id, player);

        Resolution::Registered(role)
    }

    /// Forget the player on `id` and tell everyone still connected.
    pub fn remove<O: Outbound>(&mut self, out: &mut O, id: ConnectionId) -> Option<Player> {
        let player = self.players.remove(&id)?;
        info!(connection = %id, name = %player.name, role = ?player.role, "player left");
        broadcast::to_all_except(
            out,
            id,
            &ServerMessage::System(format!("{} left the game.", player.name)),
        );
        Some(player)
    }

    pub fn get(&self, id: &ConnectionId) -> Option<&Player> {
        self.players.get(id)
    }

    pub fn get_mut(&mut self, id: &ConnectionId) -> Option<&mut Player> {
        self.players.get_mut(id)
    }

    /// All players, in no particular order.
    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.players.values()
    }

    /// Ids of every non-admin player.
    pub fn participant_ids(&self) -> Vec<ConnectionId> {
        self.players
            .values()
            .filter(|p| !p.is_admin())
            .map(|p| p.id)
            .collect()
    }

    /// Number of non-admin players.
    pub fn participant_count(&self) -> usize {
        self.players.values().filter(|p| !p.is_admin()).count()
    }

    /// Number of registered players, admin included.
    pub fn player_count(&self) -> usize {
        self.players.len()
    }
}
