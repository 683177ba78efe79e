use anyhow::Context;
use redis_keyspace::server::RedisServer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let server = match RedisServer::new(std::env::args()) {
        Ok(server) => server,
        Err(e) => e.exit(),
    };

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&server.log_level))
        .context("invalid log level")?;

    tracing_subscriber::fmt().with_env_filter(filter).init();

    server.run().await
}
