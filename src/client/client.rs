//! Line-oriented terminal client.

use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tracing::{debug, info, warn};

use crate::QuizError;
use crate::config::ClientConfig;
use crate::data::load_questions_from_json;
use crate::protocol::{FrameDecoder, ServerMessage, encode_frame};

use super::state::{Action, ClientApp};

const READ_BUFFER_SIZE: usize = 1024;

/// Run the quiz client until the game ends or the server goes away.
pub async fn run(config: ClientConfig) -> Result<(), QuizError> {
    let bank = match &config.questions {
        Some(path) => load_questions_from_json(path)?,
        None => Vec::new(),
    };

    let addr = format!("{}:{}", config.host, config.port);
    let stream = TcpStream::connect(&addr)
        .await
        .map_err(|source| QuizError::Connect {
            addr: addr.clone(),
            source,
        })?;
    info!(%addr, questions = bank.len(), "connected");
    println!("Connected to quiz server at {addr}!");

    let (mut reader, mut writer) = stream.into_split();
    let mut app = ClientApp::new(config.name, bank);
    let mut decoder = FrameDecoder::new();
    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let mut buf = vec![0u8; READ_BUFFER_SIZE];

    loop {
        let actions = tokio::select! {
            read = reader.read(&mut buf) => {
                let n = read?;
                if n == 0 {
                    println!("Disconnected from server!");
                    return Ok(());
                }
                let mut actions = Vec::new();
                for frame in decoder.feed(&buf[..n]) {
                    match frame.and_then(|f| f.parse::<ServerMessage>()) {
                        Ok(msg) => {
                            debug!(%msg, "server message");
                            actions.extend(app.on_server(msg));
                        }
                        Err(e) => warn!(error = %e, "ignoring unreadable server frame"),
                    }
                }
                actions
            }
            line = stdin.next_line(), if stdin_open => match line? {
                Some(line) => app.on_input(&line),
                None => {
                    debug!("stdin closed");
                    stdin_open = false;
                    Vec::new()
                }
            },
        };

        for action in actions {
            match action {
                Action::Print(text) => println!("{text}"),
                Action::Send(frame) => writer.write_all(encode_frame(&frame).as_bytes()).await?,
                Action::Quit => return Ok(()),
            }
        }
    }
}
