use bytes::Bytes;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use uuid::Uuid;

use farkle_common::protocol::{self, ClientMessage, ServerMessage, Transport};

use crate::handler;
use crate::server::SharedState;

pub const MAX_NAME_LEN: usize = 32;

pub struct ConnectionHandle {
    pub player_id: Uuid,
    pub player_name: String,
    pub tx: mpsc::Sender<ServerMessage>,
}

/// Cleans up a display name, or says why it can't be used.
pub fn check_name(raw: &str) -> Result<String, String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err("Player name must not be empty".into());
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(format!("Player name is longer than {} characters", MAX_NAME_LEN));
    }
    if name.chars().any(char::is_control) {
        return Err("Player name contains control characters".into());
    }
    Ok(name.to_string())
}

pub async fn handle_connection(stream: TcpStream, state: SharedState) -> anyhow::Result<()> {
    let mut transport = protocol::framed_transport(stream);

    let Some(player_name) = handshake(&mut transport).await? else {
        return Ok(());
    };
    let player_id = Uuid::new_v4();
    protocol::send_message(
        &mut transport,
        &ServerMessage::Welcome {
            player_id,
            server_version: env!("CARGO_PKG_VERSION").to_string(),
        },
    )
    .await?;

    let (tx, outbox) = mpsc::channel::<ServerMessage>(64);
    state.connections.write().await.insert(
        player_id,
        ConnectionHandle {
            player_id,
            player_name: player_name.clone(),
            tx,
        },
    );

    let (sink, stream) = transport.split();
    let writer = tokio::spawn(write_loop(outbox, sink));
    read_loop(stream, player_id, &player_name, &state).await;

    handler::handle_disconnect(player_id, &state).await;
    writer.abort();
    Ok(())
}

/// Waits for Hello and returns the accepted name. Refusals are answered
/// with `HandshakeError` and yield `None`.
async fn handshake(transport: &mut Transport) -> anyhow::Result<Option<String>> {
    let refusal = match protocol::recv_message::<ClientMessage>(transport).await? {
        None => return Ok(None),
        Some(ClientMessage::Hello {
            player_name,
            version,
        }) => match check_name(&player_name) {
            Ok(name) => {
                tracing::info!("Player '{}' connected (client version: {})", name, version);
                return Ok(Some(name));
            }
            Err(reason) => reason,
        },
        Some(other) => format!("Expected Hello message, got {:?}", other),
    };

    tracing::debug!("Handshake refused: {}", refusal);
    protocol::send_message(transport, &ServerMessage::HandshakeError { reason: refusal }).await?;
    Ok(None)
}

async fn write_loop(
    mut outbox: mpsc::Receiver<ServerMessage>,
    mut sink: SplitSink<Transport, Bytes>,
) {
    while let Some(msg) = outbox.recv().await {
        let frame = match protocol::serialize_message(&msg) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::error!("Failed to serialize {:?}: {}", msg, e);
                continue;
            }
        };
        if sink.send(frame).await.is_err() {
            return;
        }
    }
}

async fn read_loop(
    mut stream: SplitStream<Transport>,
    player_id: Uuid,
    player_name: &str,
    state: &SharedState,
) {
    while let Some(frame) = stream.next().await {
        let frame = match frame {
            Ok(frame) => frame,
            Err(e) => {
                tracing::warn!("Read error from {}: {}", player_name, e);
                return;
            }
        };
        let msg = match protocol::deserialize_message::<ClientMessage>(&frame) {
            Ok(msg) => msg,
            Err(e) => {
                tracing::warn!("Failed to parse message from {}: {}", player_name, e);
                continue;
            }
        };
        if msg == ClientMessage::Disconnect {
            tracing::info!("Player '{}' left", player_name);
            return;
        }
        if let Err(e) = handler::handle_message(player_id, msg, state).await {
            tracing::error!("Handler error for {}: {}", player_name, e);
        }
    }
    tracing::info!("Player '{}' disconnected", player_name);
}
