//! Draftline server binary.
//!
//! # Usage
//!
//! ```bash
//! # Defaults: 25s clocks, 64-deep lobby inboxes
//! draftline-server --bind 0.0.0.0:8080
//!
//! # Untimed drafts
//! draftline-server --pick-timer 0 --ban-timer 0
//! ```

use clap::Parser;
use draftline_core::{DEFAULT_TIMER_SECS, Rules};
use draftline_server::{
    DEFAULT_CHAMPION_POOL, DEFAULT_INBOX_CAPACITY, DEFAULT_OUTBOX_CAPACITY, Server, ServerConfig,
};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Draftline ban/pick draft server
#[derive(Parser, Debug)]
#[command(name = "draftline-server")]
#[command(about = "Real-time champion draft lobbies over WebSockets")]
#[command(version)]
struct Args {
    /// Address to bind to
    #[arg(short, long, default_value = "0.0.0.0:8080")]
    bind: String,

    /// Default pick clock in seconds (0 disables)
    #[arg(long, default_value_t = DEFAULT_TIMER_SECS)]
    pick_timer: i64,

    /// Default ban clock in seconds (0 disables)
    #[arg(long, default_value_t = DEFAULT_TIMER_SECS)]
    ban_timer: i64,

    /// Auto-picks draw from champion ids 1..=N
    #[arg(long, default_value_t = DEFAULT_CHAMPION_POOL)]
    champion_pool: u32,

    /// Per-lobby inbox depth
    #[arg(long, default_value_t = DEFAULT_INBOX_CAPACITY)]
    inbox_capacity: usize,

    /// Per-connection outbox depth
    #[arg(long, default_value_t = DEFAULT_OUTBOX_CAPACITY)]
    outbox_capacity: usize,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    tracing::info!("Draftline server starting");
    tracing::info!("Binding to {}", args.bind);

    let config = ServerConfig {
        bind_address: args.bind,
        rules: Rules {
            fearless: false,
            pick_timer_sec: args.pick_timer,
            ban_timer_sec: args.ban_timer,
        },
        champion_pool: args.champion_pool,
        inbox_capacity: args.inbox_capacity,
        outbox_capacity: args.outbox_capacity,
    };

    let server = Server::bind(config).await?;
    tracing::info!("Server listening on {}", server.local_addr()?);

    let shutdown = server.shutdown_token();
    tokio::spawn(async move {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::warn!("cannot listen for Ctrl-C: {}", err);
            return;
        }
        tracing::info!("Ctrl-C received, shutting down");
        shutdown.cancel();
    });

    server.run().await?;

    Ok(())
}
