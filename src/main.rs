use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use live_quiz::protocol::DEFAULT_PORT;
use live_quiz::{ClientConfig, ServerConfig, client, server};
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Host a quiz session
    Serve {
        /// Address to listen on
        #[arg(short, long, default_value = "0.0.0.0")]
        bind: IpAddr,

        /// Port to listen on
        #[arg(short, long, default_value_t = DEFAULT_PORT)]
        port: u16,

        /// Listen backlog
        #[arg(long, default_value_t = 5)]
        backlog: u32,

        /// Event loop tick in milliseconds
        #[arg(long, default_value_t = 100)]
        tick_ms: u64,
    },

    /// Join a quiz session
    Join {
        /// Server host
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Server port
        #[arg(short, long, default_value_t = DEFAULT_PORT)]
        port: u16,

        /// Display name (prompted for if omitted)
        #[arg(short, long)]
        name: Option<String>,

        /// JSON question bank for the admin's `next` command
        #[arg(short, long)]
        questions: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Keep the client's terminal quiet unless asked otherwise.
    let default_filter = match args.command {
        Command::Serve { .. } => "info",
        Command::Join { .. } => "warn",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = match args.command {
        Command::Serve {
            bind,
            port,
            backlog,
            tick_ms,
        } => {
            let config = ServerConfig {
                bind,
                port,
                backlog,
                tick: Duration::from_millis(tick_ms),
            };
            server::serve(config, async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    error!(error = %e, "failed to listen for ctrl-c");
                    std::future::pending::<()>().await;
                }
            })
            .await
        }
        Command::Join {
            host,
            port,
            name,
            questions,
        } => {
            client::run(ClientConfig {
                host,
                port,
                name,
                questions,
            })
            .await
        }
    };

    if let Err(e) = result {
        error!(error = %e, "exiting");
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
