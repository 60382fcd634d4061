//! Line-oriented wire protocol shared by the server and the client.

pub mod codec;
mod messages;

pub use codec::{FrameDecoder, encode_frame};
pub use messages::{
    ClientMessage, DEFAULT_PORT, NUM_OPTIONS, ProtocolError, QuestionSubmission, Role,
    ServerMessage, parse_choice,
};
