//! Protocol messages for client-server communication.
//!
//! Every message is one line of text shaped `VERB` or `VERB:payload`, with
//! `|` separating the fields of a payload. Both directions implement
//! [`FromStr`] and [`Display`] so the server, the bundled client and the
//! tests share one grammar.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Number of options every question carries.
pub const NUM_OPTIONS: usize = 4;

/// Default server port.
pub const DEFAULT_PORT: u16 = 12345;

const FIELD_SEPARATOR: char = '|';

const RESULT_CORRECT: &str = "Correct! +1 point";
const RESULT_WRONG: &str = "Wrong answer!";

/// Reasons a frame can be rejected by the codec.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("unknown message: {0:?}")]
    UnknownVerb(String),

    #[error("{verb} expects {expected} fields, got {found}")]
    FieldCount {
        verb: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("option index must be 1-4, got {0:?}")]
    InvalidChoice(String),

    #[error("unrecognised {verb} payload: {payload:?}")]
    Malformed {
        verb: &'static str,
        payload: String,
    },

    #[error("frame is not valid UTF-8")]
    InvalidUtf8,

    #[error("frame exceeds {limit} bytes without a delimiter")]
    FrameTooLong { limit: usize },
}

/// Role assigned to a player when they register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Admin,
    Participant,
}

impl Role {
    fn as_wire(self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Participant => "PLAYER",
        }
    }
}

/// A question as submitted by the admin, correct option included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionSubmission {
    pub text: String,
    pub options: [String; NUM_OPTIONS],
    /// 1-based index into `options`.
    pub correct: usize,
}

/// Messages sent from a registered client to the server.
///
/// The very first frame of a connection is its display name and is never
/// parsed as a `ClientMessage`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientMessage {
    /// Admin opens the game.
    StartGame,

    /// Admin submits a question.
    Question(QuestionSubmission),

    /// Participant picks an option (1-based).
    Answer(usize),

    /// Admin ends the game.
    StopGame,
}

/// Messages sent from server to client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerMessage {
    /// Sent on accept; the client replies with its display name.
    NameRequest,

    /// Role granted at registration.
    Role(Role),

    /// Informational text.
    System(String),

    /// The admin started the game.
    GameStarted,

    /// Question forwarded to participants, correct option stripped.
    Question {
        text: String,
        options: [String; NUM_OPTIONS],
    },

    /// Acknowledges a participant's answer.
    AnswerReceived,

    /// Per-participant outcome of a completed round.
    RoundResult { correct: bool },

    /// Round standings, one entry per line.
    RoundOver(String),

    /// Final standings; ends the session.
    GameOver(String),
}

/// Parses a 1-based option index.
pub fn parse_choice(raw: &str) -> Result<usize, ProtocolError> {
    match raw.trim().parse::<usize>() {
        Ok(choice) if (1..=NUM_OPTIONS).contains(&choice) => Ok(choice),
        _ => Err(ProtocolError::InvalidChoice(raw.to_string())),
    }
}

/// Splits a `|`-separated payload, requiring exactly `expected` fields.
fn split_fields<'a>(
    verb: &'static str,
    payload: &'a str,
    expected: usize,
) -> Result<Vec<&'a str>, ProtocolError> {
    let fields: Vec<&str> = payload.split(FIELD_SEPARATOR).collect();
    if fields.len() != expected {
        return Err(ProtocolError::FieldCount {
            verb,
            expected,
            found: fields.len(),
        });
    }
    Ok(fields)
}

fn options_from(fields: &[&str]) -> [String; NUM_OPTIONS] {
    [
        fields[0].to_string(),
        fields[1].to_string(),
        fields[2].to_string(),
        fields[3].to_string(),
    ]
}

impl FromStr for ClientMessage {
    type Err = ProtocolError;

    fn from_str(frame: &str) -> Result<Self, Self::Err> {
        match frame.split_once(':') {
            Some(("QUESTION", payload)) => {
                let fields = split_fields("QUESTION", payload, NUM_OPTIONS + 2)?;
                Ok(ClientMessage::Question(QuestionSubmission {
                    text: fields[0].to_string(),
                    options: options_from(&fields[1..=NUM_OPTIONS]),
                    correct: parse_choice(fields[NUM_OPTIONS + 1])?,
                }))
            }
            Some(_) => Err(ProtocolError::UnknownVerb(frame.to_string())),
            None => match frame.trim() {
                "START_GAME" => Ok(ClientMessage::StartGame),
                "STOP_GAME" => Ok(ClientMessage::StopGame),
                answer if !answer.is_empty() && answer.bytes().all(|b| b.is_ascii_digit()) => {
                    parse_choice(answer).map(ClientMessage::Answer)
                }
                _ => Err(ProtocolError::UnknownVerb(frame.to_string())),
            },
        }
    }
}

impl fmt::Display for ClientMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientMessage::StartGame => write!(f, "START_GAME"),
            ClientMessage::StopGame => write!(f, "STOP_GAME"),
            ClientMessage::Answer(choice) => write!(f, "{choice}"),
            ClientMessage::Question(q) => write!(
                f,
                "QUESTION:{}|{}|{}",
                q.text,
                q.options.join("|"),
                q.correct
            ),
        }
    }
}

impl FromStr for ServerMessage {
    type Err = ProtocolError;

    fn from_str(frame: &str) -> Result<Self, Self::Err> {
        let Some((verb, payload)) = frame.split_once(':') else {
            return match frame {
                "NAME_REQUEST" => Ok(ServerMessage::NameRequest),
                "GAME_STARTED" => Ok(ServerMessage::GameStarted),
                "ANSWER_RECEIVED" => Ok(ServerMessage::AnswerReceived),
                _ => Err(ProtocolError::UnknownVerb(frame.to_string())),
            };
        };

        match verb {
            "ROLE" => match payload {
                "ADMIN" => Ok(ServerMessage::Role(Role::Admin)),
                "PLAYER" => Ok(ServerMessage::Role(Role::Participant)),
                _ => Err(ProtocolError::Malformed {
                    verb: "ROLE",
                    payload: payload.to_string(),
                }),
            },
            "SYSTEM" => Ok(ServerMessage::System(payload.to_string())),
            "QUESTION" => {
                let fields = split_fields("QUESTION", payload, NUM_OPTIONS + 1)?;
                Ok(ServerMessage::Question {
                    text: fields[0].to_string(),
                    options: options_from(&fields[1..]),
                })
            }
            "RESULT" => match payload {
                RESULT_CORRECT => Ok(ServerMessage::RoundResult { correct: true }),
                RESULT_WRONG => Ok(ServerMessage::RoundResult { correct: false }),
                _ => Err(ProtocolError::Malformed {
                    verb: "RESULT",
                    payload: payload.to_string(),
                }),
            },
            "ROUND_OVER" => Ok(ServerMessage::RoundOver(payload.to_string())),
            "GAME_OVER" => Ok(ServerMessage::GameOver(payload.to_string())),
            _ => Err(ProtocolError::UnknownVerb(frame.to_string())),
        }
    }
}

impl fmt::Display for ServerMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerMessage::NameRequest => write!(f, "NAME_REQUEST"),
            ServerMessage::Role(role) => write!(f, "ROLE:{}", role.as_wire()),
            ServerMessage::System(text) => write!(f, "SYSTEM:{text}"),
            ServerMessage::GameStarted => write!(f, "GAME_STARTED"),
            ServerMessage::Question { text, options } => {
                write!(f, "QUESTION:{}|{}", text, options.join("|"))
            }
            ServerMessage::AnswerReceived => write!(f, "ANSWER_RECEIVED"),
            ServerMessage::RoundResult { correct: true } => write!(f, "RESULT:{RESULT_CORRECT}"),
            ServerMessage::RoundResult { correct: false } => write!(f, "RESULT:{RESULT_WRONG}"),
            ServerMessage::RoundOver(summary) => write!(f, "ROUND_OVER:{summary}"),
            ServerMessage::GameOver(summary) => write!(f, "GAME_OVER:{summary}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capital_options() -> [String; 4] {
        ["London", "Paris", "Berlin", "Madrid"].map(String::from)
    }

    #[test]
    fn test_parse_admin_question() {
        let msg: ClientMessage = "QUESTION:Capital?|London|Paris|Berlin|Madrid|2"
            .parse()
            .unwrap();
        assert_eq!(
            msg,
            ClientMessage::Question(QuestionSubmission {
                text: "Capital?".to_string(),
                options: capital_options(),
                correct: 2,
            })
        );
    }

    #[test]
    fn test_question_field_count_is_enforced() {
        let err = "QUESTION:Capital?|London|Paris|Berlin|Madrid"
            .parse::<ClientMessage>()
            .unwrap_err();
        assert_eq!(
            err,
            ProtocolError::FieldCount {
                verb: "QUESTION",
                expected: 6,
                found: 5
            }
        );
    }

    #[test]
    fn test_question_correct_index_out_of_range() {
        let err = "QUESTION:Q|a|b|c|d|5".parse::<ClientMessage>().unwrap_err();
        assert_eq!(err, ProtocolError::InvalidChoice("5".to_string()));
    }

    #[test]
    fn test_parse_answers_and_commands() {
        assert_eq!("3".parse::<ClientMessage>(), Ok(ClientMessage::Answer(3)));
        assert_eq!("START_GAME".parse::<ClientMessage>(), Ok(ClientMessage::StartGame));
        assert_eq!("STOP_GAME".parse::<ClientMessage>(), Ok(ClientMessage::StopGame));
        assert!(matches!(
            "0".parse::<ClientMessage>(),
            Err(ProtocolError::InvalidChoice(_))
        ));
        assert!(matches!(
            "12".parse::<ClientMessage>(),
            Err(ProtocolError::InvalidChoice(_))
        ));
        assert!(matches!(
            "hello".parse::<ClientMessage>(),
            Err(ProtocolError::UnknownVerb(_))
        ));
        assert!(matches!(
            "ANSWER:2".parse::<ClientMessage>(),
            Err(ProtocolError::UnknownVerb(_))
        ));
    }

    #[test]
    fn test_player_question_strips_correct_index() {
        let msg = ServerMessage::Question {
            text: "Capital?".to_string(),
            options: capital_options(),
        };
        assert_eq!(msg.to_string(), "QUESTION:Capital?|London|Paris|Berlin|Madrid");
    }

    #[test]
    fn test_server_message_wire_format() {
        assert_eq!(ServerMessage::Role(Role::Admin).to_string(), "ROLE:ADMIN");
        assert_eq!(ServerMessage::Role(Role::Participant).to_string(), "ROLE:PLAYER");
        assert_eq!(
            ServerMessage::RoundResult { correct: true }.to_string(),
            "RESULT:Correct! +1 point"
        );
        assert_eq!(
            "RESULT:Wrong answer!".parse::<ServerMessage>(),
            Ok(ServerMessage::RoundResult { correct: false })
        );
        assert_eq!(
            "SYSTEM:Bob joined the game!".parse::<ServerMessage>(),
            Ok(ServerMessage::System("Bob joined the game!".to_string()))
        );
    }

    #[test]
    fn test_client_question_display_matches_grammar() {
        let msg = ClientMessage::Question(QuestionSubmission {
            text: "Capital?".to_string(),
            options: capital_options(),
            correct: 2,
        });
        assert_eq!(msg.to_string(), "QUESTION:Capital?|London|Paris|Berlin|Madrid|2");
    }
}
