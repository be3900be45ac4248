use bytes::Bytes;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use uuid::Uuid;

use farkle_common::protocol::{self, ClientMessage, ServerMessage, Transport};

/// A connection that has completed the Hello handshake.
pub struct Session {
    pub player_id: Uuid,
    pub server_version: String,
    pub tx: mpsc::Sender<ClientMessage>,
    pub rx: mpsc::Receiver<ServerMessage>,
}

/// Connects, introduces the player and waits for the server to accept them.
///
/// Fails if the server refuses the name or answers with anything but
/// `Welcome`. On success, outgoing and incoming frames are pumped through
/// the session's channels by two background tasks.
pub async fn connect(addr: &str, player_name: &str) -> anyhow::Result<Session> {
    let stream = TcpStream::connect(addr).await?;
    let mut transport = protocol::framed_transport(stream);

    protocol::send_message(
        &mut transport,
        &ClientMessage::Hello {
            player_name: player_name.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
    )
    .await?;

    let reply = protocol::recv_message::<ServerMessage>(&mut transport).await?;
    let (player_id, server_version) = match reply {
        Some(ServerMessage::Welcome {
            player_id,
            server_version,
        }) => (player_id, server_version),
        Some(ServerMessage::HandshakeError { reason }) => {
            anyhow::bail!("server refused '{}': {}", player_name, reason)
        }
        Some(other) => anyhow::bail!("unexpected reply to Hello: {:?}", other),
        None => anyhow::bail!("server closed the connection during the handshake"),
    };
    tracing::info!("Joined {} as {} (server {})", addr, player_id, server_version);

    let (sink, stream) = transport.split();
    let (tx, outgoing) = mpsc::channel(64);
    let (incoming, rx) = mpsc::channel(64);
    tokio::spawn(pump_outgoing(outgoing, sink));
    tokio::spawn(pump_incoming(stream, incoming));

    Ok(Session {
        player_id,
        server_version,
        tx,
        rx,
    })
}

async fn pump_outgoing(
    mut outgoing: mpsc::Receiver<ClientMessage>,
    mut sink: SplitSink<Transport, Bytes>,
) {
    while let Some(msg) = outgoing.recv().await {
        let frame = match protocol::serialize_message(&msg) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::error!("Dropping unencodable {:?}: {}", msg, e);
                continue;
            }
        };
        if let Err(e) = sink.send(frame).await {
            tracing::debug!("Connection closed while sending: {}", e);
            return;
        }
    }
    let _ = sink.close().await;
}

async fn pump_incoming(mut stream: SplitStream<Transport>, incoming: mpsc::Sender<ServerMessage>) {
    while let Some(frame) = stream.next().await {
        let frame = match frame {
            Ok(frame) => frame,
            Err(e) => {
                tracing::warn!("Read error: {}", e);
                return;
            }
        };
        match protocol::deserialize_message::<ServerMessage>(&frame) {
            Ok(msg) => {
                if incoming.send(msg).await.is_err() {
                    return;
                }
            }
            Err(e) => tracing::warn!("Skipping unreadable server frame: {}", e),
        }
    }
}
