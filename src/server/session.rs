//! The quiz session and its round state machine.
//!
//! `Session` is driven entirely by [`Session::handle_frame`] and
//! [`Session::disconnect`], both called from the server loop. Outgoing
//! messages go through an [`Outbound`] so the state machine never touches a
//! socket directly.
//!
//! Phases move `AwaitingRole → Idle → InProgress → Ended`. Within
//! `InProgress` the admin asks questions one at a time; a round completes
//! as soon as the number of recorded answers equals the number of
//! participants at the moment an answer arrives. There is no round timeout,
//! so a round can only be abandoned by a new question or `STOP_GAME`.

use tracing::{debug, info, warn};

use crate::protocol::{ClientMessage, QuestionSubmission, Role, ServerMessage};

use super::broadcast::{self, Outbound};
use super::round::Round;
use super::scoreboard;
use super::state::{ConnectionId, Phase, Resolution, SessionRegistry};

/// The one quiz session a server hosts.
#[derive(Debug)]
pub struct Session {
    phase: Phase,
    registry: SessionRegistry,
    round: Option<Round>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            phase: Phase::AwaitingRole,
            registry: SessionRegistry::new(),
            round: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    pub fn current_round(&self) -> Option<&Round> {
        self.round.as_ref()
    }

    /// Process one decoded frame from `id`.
    pub fn handle_frame<O: Outbound>(&mut self, out: &mut O, id: ConnectionId, frame: &str) {
        if self.phase == Phase::Ended {
            debug!(connection = %id, frame, "session ended, ignoring frame");
            return;
        }

        let role = match self.registry.register_or_resolve(out, id, frame) {
            Resolution::Registered(_) => {
                if self.phase == Phase::AwaitingRole {
                    self.phase = Phase::Idle;
                }
                return;
            }
            Resolution::Known(role) => role,
        };

        match frame.parse::<ClientMessage>() {
            Ok(message) => self.dispatch(out, id, role, message),
            Err(e) => warn!(connection = %id, error = %e, "dropping malformed frame"),
        }
    }

    /// Forget the player on a connection that has gone away.
    ///
    /// An answer the player already gave stays in the round and keeps
    /// counting towards completion, while the participant count drops.
    /// Completion is not re-evaluated here; it waits for the next answer.
    pub fn disconnect<O: Outbound>(&mut self, out: &mut O, id: ConnectionId) {
        if self.registry.remove(out, id).is_none() {
            return;
        }
        if let Some(round) = &self.round {
            if round.answer_of(&id).is_some() {
                debug!(connection = %id, "departed player's answer still counts");
            }
        }
    }

    fn dispatch<O: Outbound>(
        &mut self,
        out: &mut O,
        id: ConnectionId,
        role: Role,
        message: ClientMessage,
    ) {
        match (message, role) {
            (ClientMessage::StartGame, Role::Admin) => self.start_game(out),
            (ClientMessage::Question(question), Role::Admin) => {
                self.submit_question(out, id, question)
            }
            (ClientMessage::StopGame, Role::Admin) => self.stop_game(out, id),
            (ClientMessage::Answer(choice), Role::Participant) => {
                self.submit_answer(out, id, choice)
            }
            (message, role) => {
                debug!(connection = %id, ?role, %message, "ignoring message not permitted for role")
            }
        }
    }

    fn start_game<O: Outbound>(&mut self, out: &mut O) {
        if self.phase != Phase::Idle {
            debug!(phase = ?self.phase, "ignoring START_GAME");
            return;
        }
        self.phase = Phase::InProgress;
        info!(players = self.registry.player_count(), "game started");
        broadcast::to_all(out, &ServerMessage::GameStarted);
    }

    fn submit_question<O: Outbound>(
        &mut self,
        out: &mut O,
        admin: ConnectionId,
        question: QuestionSubmission,
    ) {
        if self.phase != Phase::InProgress {
            broadcast::deliver(
                out,
                admin,
                &ServerMessage::System(
                    "The game has not started yet. Send START_GAME first.".to_string(),
                ),
            );
            return;
        }

        if self.registry.participant_count() == 0 {
            warn!(question = %question.text, "question rejected, no participants");
            broadcast::deliver(
                out,
                admin,
                &ServerMessage::System(
                    "No players are connected. The question was not sent.".to_string(),
                ),
            );
            return;
        }

        if let Some(previous) = self.round.take() {
            warn!(
                question = previous.text(),
                answers = previous.answer_count(),
                "replacing unfinished round"
            );
        }

        let round = Round::new(question);
        info!(
            question = round.text(),
            participants = self.registry.participant_count(),
            "question sent"
        );
        broadcast::to_participants(out, &self.registry, &round.question_message());
        self.round = Some(round);
    }

    fn submit_answer<O: Outbound>(&mut self, out: &mut O, id: ConnectionId, choice: usize) {
        if self.phase != Phase::InProgress {
            debug!(connection = %id, "ignoring answer outside a running game");
            return;
        }
        let Some(round) = self.round.as_mut() else {
            debug!(connection = %id, "ignoring answer, no question outstanding");
            return;
        };

        round.record(id, choice);
        debug!(connection = %id, choice, "answer recorded");
        broadcast::deliver(out, id, &ServerMessage::AnswerReceived);

        if round.is_complete(self.registry.participant_count()) {
            self.complete_round(out);
        }
    }

    fn complete_round<O: Outbound>(&mut self, out: &mut O) {
        let Some(round) = self.round.take() else {
            return;
        };

        for id in self.registry.participant_ids() {
            let correct = round.is_correct(&id);
            if correct {
                if let Some(player) = self.registry.get_mut(&id) {
                    player.add_point();
                }
            }
            broadcast::deliver(out, id, &ServerMessage::RoundResult { correct });
        }

        let summary = {
            let ranked = scoreboard::rank(self.registry.players());
            scoreboard::round_summary(round.options(), round.correct(), &ranked)
        };
        info!(question = round.text(), "round complete");
        broadcast::to_all(out, &ServerMessage::RoundOver(summary));
    }

    fn stop_game<O: Outbound>(&mut self, out: &mut O, admin: ConnectionId) {
        if self.phase != Phase::InProgress {
            broadcast::deliver(
                out,
                admin,
                &ServerMessage::System("The game has not started yet.".to_string()),
            );
            return;
        }

        if let Some(round) = self.round.take() {
            info!(question = round.text(), "discarding unfinished round");
        }
        self.phase = Phase::Ended;

        let ranked = scoreboard::rank(self.registry.players());
        let summary = scoreboard::final_summary(&ranked);
        info!(
            winner = scoreboard::winner(&ranked).map(|p| p.name.as_str()),
            "game over"
        );
        broadcast::to_all(out, &ServerMessage::GameOver(summary));
    }
}
