use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use farkle_common::dice::StdDice;
use farkle_common::store::GameStore;

use crate::channels::ChannelDirectory;
use crate::connection::{self, ConnectionHandle};
use crate::handler;

pub struct ServerConfig {
    pub addr: SocketAddr,
    pub max_connections: usize,
    pub idle_timeout: Duration,
    pub sweep_interval: Duration,
    /// Fixed seed for reproducible rolls; entropy when unset.
    pub seed: Option<u64>,
}

pub struct ServerState {
    pub games: RwLock<GameStore>,
    /// Taken after `games` is locked for writing.
    pub dice: Mutex<StdDice>,
    pub channels: RwLock<ChannelDirectory>,
    pub connections: RwLock<HashMap<Uuid, ConnectionHandle>>,
    pub max_connections: usize,
}

impl ServerState {
    pub fn new(max_connections: usize, dice: StdDice) -> Self {
        Self {
            games: RwLock::new(GameStore::new()),
            dice: Mutex::new(dice),
            channels: RwLock::new(ChannelDirectory::new()),
            connections: RwLock::new(HashMap::new()),
            max_connections,
        }
    }
}

pub type SharedState = Arc<ServerState>;

pub async fn run(config: ServerConfig) -> anyhow::Result<()> {
    let dice = match config.seed {
        Some(seed) => {
            tracing::warn!("Rolling with fixed seed {}", seed);
            StdDice::seeded(seed)
        }
        None => StdDice::from_entropy(),
    };
    let state: SharedState = Arc::new(ServerState::new(config.max_connections, dice));

    tokio::spawn(sweep_idle_games(
        state.clone(),
        config.idle_timeout,
        config.sweep_interval,
    ));

    let listener = TcpListener::bind(config.addr).await?;
    tracing::info!("Listening on {}", config.addr);

    loop {
        let (stream, peer_addr) = listener.accept().await?;

        // Enforce max connections
        let conn_count = state.connections.read().await.len();
        if conn_count >= state.max_connections {
            tracing::warn!(
                "Rejecting connection from {} (max {} reached)",
                peer_addr,
                state.max_connections
            );
            drop(stream);
            continue;
        }

        tracing::info!("New connection from {} ({}/{})", peer_addr, conn_count + 1, state.max_connections);

        let state = state.clone();
        tokio::spawn(async move {
            if let Err(e) = connection::handle_connection(stream, state).await {
                tracing::warn!("Connection error from {}: {}", peer_addr, e);
            }
        });
    }
}

/// Ends games nobody has touched for `timeout`, checking every `interval`.
async fn sweep_idle_games(state: SharedState, timeout: Duration, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    loop {
        ticker.tick().await;
        let expired = state.games.write().await.expire_idle(timeout);
        for transition in expired {
            let channel = transition.game.channel_id.clone();
            handler::broadcast_update(&channel, transition, &state).await;
        }
    }
}
