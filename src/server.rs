use std::{sync::Arc, time::Duration};

use anyhow::Context;
use clap::Parser;
use thiserror::Error;
use tokio::{net::TcpListener, sync::Mutex};
use tracing::{error, info};

use crate::{
    connection::handle_client_connection, expiry::spawn_expiry_sweeper,
    key_value_store::KeyValueStore, state::State,
};

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    InvalidArguments(#[from] clap::Error),
}

impl CliError {
    /// Prints the error (or the requested help/version text) and exits.
    pub fn exit(&self) -> ! {
        match self {
            CliError::InvalidArguments(e) => e.exit(),
        }
    }
}

/// Server configuration, read from the command line.
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "redis-keyspace", version, about = "An in-memory Redis-compatible server")]
pub struct RedisServer {
    /// Port to listen on
    #[arg(long, default_value_t = 6379)]
    pub port: u16,

    /// Address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub bind: String,

    /// Period of the background sweep for expired keys, in milliseconds.
    /// 0 disables it and leaves expiry to key access alone.
    #[arg(long, default_value_t = 100)]
    pub expiry_sweep_interval_ms: u64,

    /// Default log level, overridden by RUST_LOG
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl RedisServer {
    pub fn new<I: IntoIterator<Item = String>>(command_line_args: I) -> Result<Self, CliError> {
        Ok(RedisServer::try_parse_from(command_line_args)?)
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }

    pub async fn run(&self) -> anyhow::Result<()> {
        let address = self.address();
        let listener = TcpListener::bind(&address)
            .await
            .with_context(|| format!("failed to bind to {}", address))?;

        info!(address = %address, "server listening");

        self.serve(listener).await
    }

    /// Accepts clients on `listener` until accepting fails. Every client gets
    /// its own task sharing one keyspace and one server state.
    pub async fn serve(&self, listener: TcpListener) -> anyhow::Result<()> {
        let store = Arc::new(Mutex::new(KeyValueStore::new()));
        let state = Arc::new(Mutex::new(State::new()));

        let sweeper = (self.expiry_sweep_interval_ms > 0).then(|| {
            spawn_expiry_sweeper(
                Arc::clone(&store),
                Duration::from_millis(self.expiry_sweep_interval_ms),
            )
        });

        let result = loop {
            let (stream, client_address) = match listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) => {
                    error!(error = %e, "failed to accept connection");
                    break Err(anyhow::Error::new(e).context("failed to accept connection"));
                }
            };

            tokio::spawn(handle_client_connection(
                stream,
                client_address.to_string(),
                Arc::clone(&store),
                Arc::clone(&state),
            ));
        };

        if let Some(sweeper) = sweeper {
            sweeper.abort();
        }

        result
    }
}
