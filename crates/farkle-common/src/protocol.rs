use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::net::TcpStream;
use tokio_util::codec::{Framed, LengthDelimitedCodec};
use uuid::Uuid;

use crate::game::{ChannelId, GameError, GameSnapshot, TurnEvent};

// -- Framing --

pub type Transport = Framed<TcpStream, LengthDelimitedCodec>;

pub fn framed_transport(stream: TcpStream) -> Transport {
    LengthDelimitedCodec::builder()
        .max_frame_length(64 * 1024)
        .new_framed(stream)
}

// -- Client -> Server Messages --

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum ClientMessage {
    // Handshake
    Hello {
        player_name: String,
        version: String,
    },

    // Table setup
    OpenTable {
        channel: ChannelId,
    },
    JoinTable {
        channel: ChannelId,
    },
    Watch {
        channel: ChannelId,
    },

    // Gameplay
    Roll {
        channel: ChannelId,
    },
    SelectDie {
        channel: ChannelId,
        index: usize,
    },
    ResetSelection {
        channel: ChannelId,
    },
    Bank {
        channel: ChannelId,
    },
    Quit {
        channel: ChannelId,
    },

    // Chat
    Say {
        channel: ChannelId,
        message: String,
    },

    // Connection
    Ping,
    Disconnect,
}

impl ClientMessage {
    /// Channel the message is addressed to, if any.
    pub fn channel(&self) -> Option<&str> {
        match self {
            ClientMessage::OpenTable { channel }
            | ClientMessage::JoinTable { channel }
            | ClientMessage::Watch { channel }
            | ClientMessage::Roll { channel }
            | ClientMessage::SelectDie { channel, .. }
            | ClientMessage::ResetSelection { channel }
            | ClientMessage::Bank { channel }
            | ClientMessage::Quit { channel }
            | ClientMessage::Say { channel, .. } => Some(channel.as_str()),
            ClientMessage::Hello { .. } | ClientMessage::Ping | ClientMessage::Disconnect => None,
        }
    }
}

// -- Server -> Client Messages --

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum ServerMessage {
    // Handshake
    Welcome {
        player_id: Uuid,
        server_version: String,
    },
    HandshakeError {
        reason: String,
    },

    // Game state
    GameUpdate {
        channel: ChannelId,
        event: TurnEvent,
        game: GameSnapshot,
    },
    TableState {
        channel: ChannelId,
        game: Option<GameSnapshot>,
    },

    // Chat
    ChannelMessage {
        channel: ChannelId,
        sender_id: Uuid,
        sender_name: String,
        message: String,
        timestamp: i64,
    },

    // Errors
    Error {
        code: ErrorCode,
        message: String,
    },

    // Connection
    Pong,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ErrorCode {
    GameNotFound,
    NotYourTurn,
    NotStarted,
    MustSelectScoringDice,
    InvalidSelection,
    NothingToBank,
    AlreadyInGame,
    GameAlreadyStarted,
    GameFull,
    ChannelBusy,
    InvalidAction,
    InternalError,
}

impl From<&GameError> for ErrorCode {
    fn from(e: &GameError) -> Self {
        match e {
            GameError::GameNotFound => ErrorCode::GameNotFound,
            GameError::NotYourTurn => ErrorCode::NotYourTurn,
            GameError::NotStarted => ErrorCode::NotStarted,
            GameError::MustSelectScoringDice => ErrorCode::MustSelectScoringDice,
            GameError::InvalidSelection => ErrorCode::InvalidSelection,
            GameError::NothingToBank => ErrorCode::NothingToBank,
            GameError::AlreadyInGame => ErrorCode::AlreadyInGame,
            GameError::GameAlreadyStarted => ErrorCode::GameAlreadyStarted,
            GameError::GameFull => ErrorCode::GameFull,
            GameError::ChannelBusy => ErrorCode::ChannelBusy,
        }
    }
}

impl ServerMessage {
    pub fn error(e: &GameError) -> Self {
        ServerMessage::Error {
            code: e.into(),
            message: e.to_string(),
        }
    }
}

// -- Serialization helpers --

pub fn serialize_message<T: Serialize>(msg: &T) -> Result<Bytes, serde_json::Error> {
    let json = serde_json::to_vec(msg)?;
    Ok(Bytes::from(json))
}

pub fn deserialize_message<T: for<'de> Deserialize<'de>>(
    data: &[u8],
) -> Result<T, serde_json::Error> {
    serde_json::from_slice(data)
}

// -- Transport helpers --

pub async fn send_message<T: Serialize>(
    transport: &mut Transport,
    msg: &T,
) -> anyhow::Result<()> {
    let bytes = serialize_message(msg).map_err(|e| anyhow::anyhow!("serialize error: {}", e))?;
    transport
        .send(bytes)
        .await
        .map_err(|e| anyhow::anyhow!("send error: {}", e))
}

pub async fn recv_message<T: for<'de> Deserialize<'de>>(
    transport: &mut Transport,
) -> anyhow::Result<Option<T>> {
    match transport.next().await {
        Some(Ok(frame)) => {
            let msg = deserialize_message(&frame)
                .map_err(|e| anyhow::anyhow!("deserialize error: {}", e))?;
            Ok(Some(msg))
        }
        Some(Err(e)) => Err(anyhow::anyhow!("recv error: {}", e)),
        None => Ok(None),
    }
}
