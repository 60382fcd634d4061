//! Runtime settings for the server and the client.

use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use std::time::Duration;

use crate::protocol::DEFAULT_PORT;

/// Settings for [`crate::server::Server`].
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on.
    pub bind: IpAddr,
    /// Port to listen on; 0 lets the OS pick.
    pub port: u16,
    /// Listen backlog.
    pub backlog: u32,
    /// Longest wait for readiness before the loop ticks again.
    pub tick: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            backlog: 5,
            tick: Duration::from_millis(100),
        }
    }
}

/// Settings for [`crate::client::run`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub host: String,
    pub port: u16,
    /// Display name to send without prompting.
    pub name: Option<String>,
    /// Question bank for the admin's `next` command.
    pub questions: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            name: None,
            questions: None,
        }
    }
}
