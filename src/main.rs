//! TTL Cache shell
//!
//! Interactive command shell over an in-process cache. Reads commands from
//! stdin, one per line, and writes replies to stdout.

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ttl_cache::shell::{Reply, Session};
use ttl_cache::CacheConfig;

/// Main entry point for the cache shell.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging (to stderr)
/// 2. Load configuration from environment variables
/// 3. Create the cache session and start the expiration sweeper
/// 4. Process stdin lines until EOF, `QUIT` or Ctrl+C
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ttl_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = CacheConfig::from_env().context("invalid cache configuration")?;
    info!(
        capacity = config.capacity,
        policy = %config.policy,
        ttl_secs = config.ttl.map(|ttl| ttl.as_secs()),
        compression = config.compression.is_some(),
        "configuration loaded"
    );

    let mut session = Session::new(config).context("cannot create cache")?;
    session.start_sweeper();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line.context("failed to read stdin")?,
            _ = signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down");
                break;
            }
        };
        let Some(line) = line else { break };
        if line.trim().is_empty() {
            continue;
        }

        let output = match session.handle_line(&line).await {
            Reply::Text(text) => text,
            Reply::Error(message) => format!("ERR {}", message),
            Reply::Quit => break,
        };
        stdout.write_all(output.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
        stdout.flush().await?;
    }

    info!("Shell shutdown complete");
    Ok(())
}
