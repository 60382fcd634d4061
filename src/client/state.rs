//! Client state management.
//!
//! [`ClientApp`] turns server messages and typed lines into [`Action`]s and
//! never does I/O itself.

use crate::models::Question;
use crate::protocol::{
    ClientMessage, NUM_OPTIONS, QuestionSubmission, Role, ServerMessage, parse_choice,
};

/// Something the I/O loop should do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Show text to the user.
    Print(String),
    /// Send one frame to the server.
    Send(String),
    /// Leave the client.
    Quit,
}

/// Current state of the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientState {
    /// Connected, waiting for `NAME_REQUEST`.
    Connecting,
    /// The next typed line is our display name.
    NameEntry,
    /// Name sent, waiting for a role.
    AwaitingRole,
    /// Controlling the game, possibly in the middle of typing a question.
    Admin { draft: Option<QuestionDraft> },
    /// Answering questions.
    Player,
    /// `GAME_OVER` received.
    Finished,
}

/// Result of feeding one line to a [`QuestionDraft`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftStep {
    /// Ask for the next field.
    Prompt(String),
    /// The line was rejected; ask again.
    Retry(String),
    /// All fields collected.
    Done(QuestionSubmission),
}

/// A question being typed in by the admin, one field per line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionDraft {
    text: Option<String>,
    options: Vec<String>,
}

impl QuestionDraft {
    pub const FIRST_PROMPT: &'static str = "Question:";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, line: &str) -> DraftStep {
        let Some(text) = &self.text else {
            if let Some(reason) = field_problem(line) {
                return DraftStep::Retry(reason);
            }
            self.text = Some(line.trim().to_string());
            return DraftStep::Prompt("Option 1:".to_string());
        };

        if self.options.len() < NUM_OPTIONS {
            if let Some(reason) = field_problem(line) {
                return DraftStep::Retry(reason);
            }
            self.options.push(line.trim().to_string());
            return if self.options.len() < NUM_OPTIONS {
                DraftStep::Prompt(format!("Option {}:", self.options.len() + 1))
            } else {
                DraftStep::Prompt(format!("Correct answer (1-{NUM_OPTIONS}):"))
            };
        }

        match parse_choice(line) {
            Ok(correct) => DraftStep::Done(QuestionSubmission {
                text: text.clone(),
                options: [
                    self.options[0].clone(),
                    self.options[1].clone(),
                    self.options[2].clone(),
                    self.options[3].clone(),
                ],
                correct,
            }),
            Err(_) => DraftStep::Retry(format!("Enter a number from 1 to {NUM_OPTIONS}.")),
        }
    }
}

fn field_problem(line: &str) -> Option<String> {
    if line.trim().is_empty() {
        Some("This field cannot be empty.".to_string())
    } else if line.contains('|') {
        Some("'|' is not allowed here.".to_string())
    } else {
        None
    }
}

const ADMIN_HELP: &str = "\n*** You are the ADMIN! ***
Commands:
  start     - start the game
  question  - type in a question
  next      - send the next question from the question bank
  stop      - end the game";

const PLAYER_HELP: &str =
    "\n*** You are a PLAYER! Wait for the admin to start the game ***\nEnter 1-4 when you see a question.";

/// Everything the client knows about its session.
#[derive(Debug)]
pub struct ClientApp {
    pub state: ClientState,
    name: Option<String>,
    bank: Vec<Question>,
    next_question: usize,
}

impl ClientApp {
    /// `name` is sent without prompting when the server asks for it.
    pub fn new(name: Option<String>, bank: Vec<Question>) -> Self {
        Self {
            state: ClientState::Connecting,
            name,
            bank,
            next_question: 0,
        }
    }

    /// Questions left in the bank.
    pub fn remaining_questions(&self) -> usize {
        self.bank.len().saturating_sub(self.next_question)
    }

    /// React to a message from the server.
    pub fn on_server(&mut self, msg: ServerMessage) -> Vec<Action> {
        match msg {
            ServerMessage::NameRequest => match self.name.take() {
                Some(name) => {
                    self.state = ClientState::AwaitingRole;
                    vec![Action::Send(name)]
                }
                None => {
                    self.state = ClientState::NameEntry;
                    vec![Action::Print("Enter your name:".to_string())]
                }
            },
            ServerMessage::Role(Role::Admin) => {
                self.state = ClientState::Admin { draft: None };
                let mut help = ADMIN_HELP.to_string();
                if !self.bank.is_empty() {
                    help.push_str(&format!("\n{} questions loaded.", self.bank.len()));
                }
                vec![Action::Print(help)]
            }
            ServerMessage::Role(Role::Participant) => {
                self.state = ClientState::Player;
                vec![Action::Print(PLAYER_HELP.to_string())]
            }
            ServerMessage::System(text) => vec![Action::Print(text)],
            ServerMessage::GameStarted => vec![Action::Print("\n=== GAME STARTED! ===\n".to_string())],
            ServerMessage::Question { text, options } => {
                let mut shown = format!("\n=== QUESTION ===\n{text}");
                for (i, option) in options.iter().enumerate() {
                    shown.push_str(&format!("\n{}. {}", i + 1, option));
                }
                vec![Action::Print(shown)]
            }
            ServerMessage::AnswerReceived => {
                vec![Action::Print("Your answer has been received!".to_string())]
            }
            ServerMessage::RoundResult { correct } => {
                let text = if correct { "Correct! +1 point" } else { "Wrong answer!" };
                vec![Action::Print(format!("\n{text}\n"))]
            }
            ServerMessage::RoundOver(summary) => vec![Action::Print(format!("\n{summary}\n"))],
            ServerMessage::GameOver(summary) => {
                self.state = ClientState::Finished;
                vec![Action::Print(format!("\n{summary}")), Action::Quit]
            }
        }
    }

    /// React to a line typed by the user.
    pub fn on_input(&mut self, line: &str) -> Vec<Action> {
        let trimmed = line.trim();
        let bank_len = self.bank.len();

        match &mut self.state {
            ClientState::NameEntry => {
                if trimmed.is_empty() {
                    return Vec::new();
                }
                self.state = ClientState::AwaitingRole;
                vec![Action::Send(trimmed.to_string())]
            }
            ClientState::Connecting | ClientState::AwaitingRole => {
                vec![Action::Print("Waiting for the server...".to_string())]
            }
            ClientState::Admin { draft: Some(draft) } => match draft.push(line) {
                DraftStep::Prompt(prompt) | DraftStep::Retry(prompt) => vec![Action::Print(prompt)],
                DraftStep::Done(question) => {
                    self.state = ClientState::Admin { draft: None };
                    vec![
                        Action::Send(ClientMessage::Question(question).to_string()),
                        Action::Print("Question sent! Waiting for players to answer...".to_string()),
                    ]
                }
            },
            ClientState::Admin { draft } => match trimmed.to_lowercase().as_str() {
                "" => Vec::new(),
                "start" => vec![Action::Send(ClientMessage::StartGame.to_string())],
                "stop" => vec![Action::Send(ClientMessage::StopGame.to_string())],
                "question" => {
                    *draft = Some(QuestionDraft::new());
                    vec![
                        Action::Print("\n--- Enter Question ---".to_string()),
                        Action::Print(QuestionDraft::FIRST_PROMPT.to_string()),
                    ]
                }
                "next" => match self.bank.get(self.next_question) {
                    Some(question) => {
                        self.next_question += 1;
                        vec![
                            Action::Send(ClientMessage::Question(question.to_submission()).to_string()),
                            Action::Print(format!(
                                "Sent question {}/{}: {}",
                                self.next_question, bank_len, question.text
                            )),
                        ]
                    }
                    None if bank_len == 0 => {
                        vec![Action::Print("No question bank loaded (use --questions).".to_string())]
                    }
                    None => vec![Action::Print("All questions have been sent.".to_string())],
                },
                _ => vec![Action::Print(
                    "Unknown command! Use: start, question, next or stop".to_string(),
                )],
            },
            ClientState::Player => {
                if trimmed.is_empty() {
                    return Vec::new();
                }
                match parse_choice(trimmed) {
                    Ok(choice) => vec![Action::Send(ClientMessage::Answer(choice).to_string())],
                    Err(_) => vec![Action::Print(
                        "Invalid input! Enter 1, 2, 3, or 4 to answer questions.".to_string(),
                    )],
                }
            }
            ClientState::Finished => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sends(actions: &[Action]) -> Vec<&str> {
        actions
            .iter()
            .filter_map(|a| match a {
                Action::Send(frame) => Some(frame.as_str()),
                _ => None,
            })
            .collect()
    }

    fn admin(bank: Vec<Question>) -> ClientApp {
        let mut app = ClientApp::new(Some("Alice".to_string()), bank);
        assert_eq!(app.on_server(ServerMessage::NameRequest), vec![Action::Send("Alice".to_string())]);
        app.on_server(ServerMessage::Role(Role::Admin));
        app
    }

    #[test]
    fn test_prompts_for_name_when_none_given() {
        let mut app = ClientApp::new(None, Vec::new());
        app.on_server(ServerMessage::NameRequest);
        assert_eq!(app.state, ClientState::NameEntry);
        assert!(app.on_input("   ").is_empty());
        assert_eq!(app.on_input("Bob\n"), vec![Action::Send("Bob".to_string())]);
        assert_eq!(app.state, ClientState::AwaitingRole);
    }

    #[test]
    fn test_admin_types_a_question() {
        let mut app = admin(Vec::new());
        app.on_input("question");
        app.on_input("Capital?");
        for option in ["London", "Paris", "Berlin"] {
            app.on_input(option);
        }
        assert!(sends(&app.on_input("Madrid")).is_empty());
        assert!(matches!(app.on_input("9")[0], Action::Print(_)));

        let actions = app.on_input("2");
        assert_eq!(sends(&actions), vec!["QUESTION:Capital?|London|Paris|Berlin|Madrid|2"]);
        assert_eq!(app.state, ClientState::Admin { draft: None });
    }

    #[test]
    fn test_draft_rejects_separator() {
        let mut draft = QuestionDraft::new();
        assert!(matches!(draft.push("a|b"), DraftStep::Retry(_)));
        assert_eq!(draft.push("Fine?"), DraftStep::Prompt("Option 1:".to_string()));
    }

    #[test]
    fn test_admin_commands() {
        let mut app = admin(Vec::new());
        assert_eq!(sends(&app.on_input("START")), vec!["START_GAME"]);
        assert_eq!(sends(&app.on_input("stop")), vec!["STOP_GAME"]);
        assert!(sends(&app.on_input("next")).is_empty());
        assert!(sends(&app.on_input("dance")).is_empty());
    }

    #[test]
    fn test_next_walks_the_question_bank() {
        let bank = vec![Question {
            text: "2+2?".to_string(),
            options: ["3", "4", "5", "22"].map(String::from),
            correct_answer: 2,
        }];
        let mut app = admin(bank);
        assert_eq!(sends(&app.on_input("next")), vec!["QUESTION:2+2?|3|4|5|22|2"]);
        assert_eq!(app.remaining_questions(), 0);
        assert!(sends(&app.on_input("next")).is_empty());
    }

    #[test]
    fn test_player_answers() {
        let mut app = ClientApp::new(Some("Bob".to_string()), Vec::new());
        app.on_server(ServerMessage::NameRequest);
        app.on_server(ServerMessage::Role(Role::Participant));
        assert_eq!(sends(&app.on_input("3")), vec!["3"]);
        assert!(sends(&app.on_input("5")).is_empty());
        assert!(sends(&app.on_input("start")).is_empty());
    }

    #[test]
    fn test_game_over_quits() {
        let mut app = ClientApp::new(Some("Bob".to_string()), Vec::new());
        let actions = app.on_server(ServerMessage::GameOver("=== FINAL SCORES ===".to_string()));
        assert_eq!(actions.last(), Some(&Action::Quit));
        assert_eq!(app.state, ClientState::Finished);
    }
}
