mod channels;
mod connection;
mod handler;
mod server;

use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser;

use server::ServerConfig;

/// Farkle server - hosts two-player Farkle tables in named channels
#[derive(Parser, Debug)]
#[command(name = "farkle-server", version, about)]
struct Args {
    /// Address to bind the server to
    #[arg(short, long, default_value = "0.0.0.0:9877")]
    bind: String,

    /// Maximum simultaneous connections allowed
    #[arg(short, long, default_value_t = 100)]
    max_connections: usize,

    /// Minutes without activity before a table is closed
    #[arg(long, default_value_t = 30)]
    idle_timeout_mins: u64,

    /// Seconds between idle table sweeps
    #[arg(long, default_value_t = 300)]
    sweep_interval_secs: u64,

    /// Seed the dice for reproducible games
    #[arg(long)]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "farkle_server=debug,farkle_common=debug".into()),
        )
        .init();

    let args = Args::parse();

    let addr: SocketAddr = args.bind.parse()?;
    let config = ServerConfig {
        addr,
        max_connections: args.max_connections,
        idle_timeout: Duration::from_secs(args.idle_timeout_mins * 60),
        sweep_interval: Duration::from_secs(args.sweep_interval_secs.max(1)),
        seed: args.seed,
    };

    tracing::info!(
        "Starting farkle server on {} (max {} connections, idle timeout {}m)",
        addr,
        args.max_connections,
        args.idle_timeout_mins
    );
    server::run(config).await
}
