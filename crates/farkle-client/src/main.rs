mod app;
mod input;
mod network;
mod render;

use clap::Parser;

/// Farkle Client - play Farkle and chat from the terminal
#[derive(Parser, Debug)]
#[command(name = "farkle-client", version, about)]
struct Args {
    /// Server address to connect to
    #[arg(short = 's', long, default_value = "127.0.0.1:9877")]
    server: String,

    /// Player name
    #[arg(short, long)]
    name: Option<String>,

    /// Channel to join on connect
    #[arg(short, long, default_value = "general")]
    channel: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "farkle_client=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let name = args.name.unwrap_or_else(|| "Player".to_string());
    let channel = args.channel.trim_start_matches('#').to_string();

    if let Err(e) = app::run(args.server, name, channel).await {
        eprintln!("Error: {}", e);
    }

    Ok(())
}
