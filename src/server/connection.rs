//! Ownership of live connections and readiness multiplexing.
//!
//! Background tasks only move bytes: an accept task hands over new streams,
//! one reader task per connection forwards raw chunks, and one writer task
//! per connection drains an outgoing queue. Everything they observe lands on
//! a single channel that [`ConnectionManager::poll`] drains, so the server
//! loop is the only place session state is ever touched.

use std::collections::HashMap;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::protocol::{FrameDecoder, ProtocolError, ServerMessage, encode_frame};

use super::broadcast::Outbound;
use super::state::ConnectionId;

const READ_BUFFER_SIZE: usize = 1024;
const ACCEPT_RETRY_DELAY: Duration = Duration::from_millis(50);

/// Frames decoded from one read, each either text or a protocol fault.
pub type Frames = Vec<Result<String, ProtocolError>>;

/// Why a connection's read side is finished.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("connection closed by peer")]
    Closed,

    #[error("read failed: {0}")]
    Io(#[from] io::Error),
}

/// What a reader task observed.
#[derive(Debug)]
pub enum Chunk {
    Data(Vec<u8>),
    Eof,
    Failed(io::Error),
}

/// One readiness event surfaced by [`ConnectionManager::poll`].
#[derive(Debug)]
pub enum Ready {
    /// The listening socket produced a new connection.
    Listener { stream: TcpStream, addr: SocketAddr },
    /// A connection has input, or its read side finished.
    Connection { id: ConnectionId, chunk: Chunk },
}

struct Connection {
    addr: SocketAddr,
    decoder: FrameDecoder,
    outgoing: mpsc::UnboundedSender<String>,
    reader: JoinHandle<()>,
}

/// Owns the listening socket and every accepted connection.
pub struct ConnectionManager {
    ready_tx: mpsc::UnboundedSender<Ready>,
    ready_rx: mpsc::UnboundedReceiver<Ready>,
    connections: HashMap<ConnectionId, Connection>,
    acceptor: JoinHandle<()>,
}

impl ConnectionManager {
    /// Start accepting on `listener`. Must be called inside a tokio runtime.
    pub fn new(listener: TcpListener) -> Self {
        let (ready_tx, ready_rx) = mpsc::unbounded_channel();
        let acceptor = tokio::spawn(accept_loop(listener, ready_tx.clone()));
        Self {
            ready_tx,
            ready_rx,
            connections: HashMap::new(),
            acceptor,
        }
    }

    /// Wait up to `timeout` for readiness, then return everything that is
    /// ready. Returns an empty set when the timeout elapses first.
    pub async fn poll(&mut self, timeout: Duration) -> Vec<Ready> {
        let mut ready = Vec::new();
        if let Ok(Some(first)) = time::timeout(timeout, self.ready_rx.recv()).await {
            ready.push(first);
            while let Ok(next) = self.ready_rx.try_recv() {
                ready.push(next);
            }
        }
        ready
    }

    /// Take ownership of a freshly accepted stream.
    pub fn accept(&mut self, stream: TcpStream, addr: SocketAddr) -> ConnectionId {
        let id = Uuid::new_v4();
        if let Err(e) = stream.set_nodelay(true) {
            debug!(connection = %id, error = %e, "could not disable Nagle");
        }

        let (read_half, write_half) = stream.into_split();
        let (outgoing, queue) = mpsc::unbounded_channel();
        let reader = tokio::spawn(read_loop(id, read_half, self.ready_tx.clone()));
        tokio::spawn(write_loop(id, write_half, queue));

        self.connections.insert(
            id,
            Connection {
                addr,
                decoder: FrameDecoder::new(),
                outgoing,
                reader,
            },
        );
        info!(connection = %id, %addr, "client connected");
        id
    }

    /// Decode a chunk received on `id`.
    ///
    /// End of stream and read failures come back as a [`TransportError`];
    /// the caller is expected to [`remove`](Self::remove) the connection.
    /// Chunks for connections already removed decode to nothing.
    pub fn read(&mut self, id: ConnectionId, chunk: Chunk) -> Result<Frames, TransportError> {
        let Some(connection) = self.connections.get_mut(&id) else {
            debug!(connection = %id, "chunk for a removed connection");
            return Ok(Vec::new());
        };
        match chunk {
            Chunk::Data(bytes) => Ok(connection.decoder.feed(&bytes)),
            Chunk::Eof => Err(TransportError::Closed),
            Chunk::Failed(e) => Err(TransportError::Io(e)),
        }
    }

    /// Destroy a connection. Messages already queued for it are still
    /// flushed by its writer before the socket closes.
    pub fn remove(&mut self, id: ConnectionId) {
        if let Some(connection) = self.connections.remove(&id) {
            connection.reader.abort();
            debug!(connection = %id, addr = %connection.addr, "connection removed");
        }
    }

    pub fn addr(&self, id: &ConnectionId) -> Option<SocketAddr> {
        self.connections.get(id).map(|c| c.addr)
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }
}

impl Outbound for ConnectionManager {
    fn send(&mut self, to: ConnectionId, message: &ServerMessage) -> bool {
        self.connections
            .get(&to)
            .is_some_and(|c| c.outgoing.send(encode_frame(message)).is_ok())
    }

    fn connection_ids(&self) -> Vec<ConnectionId> {
        self.connections.keys().copied().collect()
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        self.acceptor.abort();
        for connection in self.connections.values() {
            connection.reader.abort();
        }
    }
}

async fn accept_loop(listener: TcpListener, ready: mpsc::UnboundedSender<Ready>) {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                if ready.send(Ready::Listener { stream, addr }).is_err() {
                    break;
                }
            }
            Err(e) => {
                warn!(error = %e, "failed to accept connection");
                time::sleep(ACCEPT_RETRY_DELAY).await;
            }
        }
    }
}

async fn read_loop(
    id: ConnectionId,
    mut reader: OwnedReadHalf,
    ready: mpsc::UnboundedSender<Ready>,
) {
    let mut buf = vec![0u8; READ_BUFFER_SIZE];
    loop {
        let chunk = match reader.read(&mut buf).await {
            Ok(0) => Chunk::Eof,
            Ok(n) => Chunk::Data(buf[..n].to_vec()),
            Err(e) => Chunk::Failed(e),
        };
        let finished = !matches!(chunk, Chunk::Data(_));
        if ready.send(Ready::Connection { id, chunk }).is_err() || finished {
            break;
        }
    }
}

async fn write_loop(
    id: ConnectionId,
    mut writer: OwnedWriteHalf,
    mut queue: mpsc::UnboundedReceiver<String>,
) {
    while let Some(frame) = queue.recv().await {
        if let Err(e) = writer.write_all(frame.as_bytes()).await {
            debug!(connection = %id, error = %e, "write failed");
            break;
        }
    }
}
