//! TCP server and main event loop.

use std::future::Future;
use std::io;
use std::net::SocketAddr;

use tokio::net::{TcpListener, TcpSocket};
use tracing::{info, warn};

use crate::QuizError;
use crate::config::ServerConfig;
use crate::protocol::ServerMessage;

use super::broadcast;
use super::connection::{ConnectionManager, Ready, TransportError};
use super::session::Session;

/// A bound quiz server, ready to run.
pub struct Server {
    listener: TcpListener,
    config: ServerConfig,
}

impl Server {
    /// Bind the listening socket described by `config`.
    pub async fn bind(config: ServerConfig) -> Result<Self, QuizError> {
        let addr = SocketAddr::new(config.bind, config.port);
        let socket = if addr.is_ipv4() {
            TcpSocket::new_v4()?
        } else {
            TcpSocket::new_v6()?
        };
        socket.set_reuseaddr(true)?;
        socket.bind(addr)?;
        let listener = socket.listen(config.backlog)?;

        info!(
            address = %listener.local_addr()?,
            backlog = config.backlog,
            "quiz server listening"
        );
        Ok(Self { listener, config })
    }

    /// Address actually bound; useful when the configured port is 0.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Run until the process is killed.
    pub async fn run(self) {
        self.run_until(std::future::pending()).await
    }

    /// Run the session loop until `shutdown` completes.
    pub async fn run_until<F: Future<Output = ()>>(self, shutdown: F) {
        let tick = self.config.tick;
        let mut connections = ConnectionManager::new(self.listener);
        let mut session = Session::new();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!(connections = connections.connection_count(), "shutting down");
                    break;
                }
                ready = connections.poll(tick) => {
                    for item in ready {
                        handle_ready(&mut session, &mut connections, item);
                    }
                }
            }
        }
    }
}

/// Bind and run a server until `shutdown` completes.
pub async fn serve<F: Future<Output = ()>>(
    config: ServerConfig,
    shutdown: F,
) -> Result<(), QuizError> {
    Server::bind(config).await?.run_until(shutdown).await;
    Ok(())
}

fn handle_ready(session: &mut Session, connections: &mut ConnectionManager, ready: Ready) {
    match ready {
        Ready::Listener { stream, addr } => {
            let id = connections.accept(stream, addr);
            broadcast::deliver(connections, id, &ServerMessage::NameRequest);
        }
        Ready::Connection { id, chunk } => match connections.read(id, chunk) {
            Ok(frames) => {
                for frame in frames {
                    match frame {
                        Ok(text) => session.handle_frame(connections, id, &text),
                        Err(e) => warn!(connection = %id, error = %e, "dropping malformed frame"),
                    }
                }
            }
            Err(e) => {
                let addr = connections.addr(&id);
                match &e {
                    TransportError::Closed => info!(connection = %id, ?addr, "client disconnected"),
                    TransportError::Io(err) => {
                        warn!(connection = %id, ?addr, error = %err, "read failed, dropping connection")
                    }
                }
                connections.remove(id);
                session.disconnect(connections, id);
            }
        },
    }
}
