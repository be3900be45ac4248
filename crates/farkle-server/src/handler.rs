use uuid::Uuid;

use farkle_common::game::{GameError, GameStatus};
use farkle_common::player::Player;
use farkle_common::protocol::{ClientMessage, ErrorCode, ServerMessage};
use farkle_common::store::Transition;

use crate::server::SharedState;

pub async fn handle_message(
    player_id: Uuid,
    msg: ClientMessage,
    state: &SharedState,
) -> anyhow::Result<()> {
    let pid = player_id.to_string();

    if msg.channel().is_some_and(|c| c.trim().is_empty()) {
        send_to_player(
            player_id,
            ServerMessage::Error {
                code: ErrorCode::InvalidAction,
                message: "Channel name must not be empty".into(),
            },
            state,
        )
        .await;
        return Ok(());
    }

    match msg {
        ClientMessage::OpenTable { channel } => {
            let Some(host) = seat_for(player_id, state).await else {
                return Ok(());
            };
            let result = state.games.write().await.create(&channel, host);
            finish(player_id, &channel, result, state).await;
        }

        ClientMessage::JoinTable { channel } => {
            let Some(player) = seat_for(player_id, state).await else {
                return Ok(());
            };
            let result = state
                .games
                .write()
                .await
                .apply(&channel, |game, now| game.join(player, now));
            finish(player_id, &channel, result, state).await;
        }

        ClientMessage::Watch { channel } => {
            state.channels.write().await.watch(&channel, player_id);
            let game = state.games.read().await.get(&channel).map(|g| g.snapshot());
            send_to_player(player_id, ServerMessage::TableState { channel, game }, state).await;
        }

        ClientMessage::Roll { channel } => {
            let mut games = state.games.write().await;
            let mut dice = state.dice.lock().await;
            let result = games.apply(&channel, |game, now| game.roll(&pid, &mut *dice, now));
            drop(dice);
            drop(games);
            finish(player_id, &channel, result, state).await;
        }

        ClientMessage::SelectDie { channel, index } => {
            let mut games = state.games.write().await;

            // The core treats a missing die as a bug, so stale indices stop here
            let stale = games.get(&channel).is_some_and(|game| {
                game.status == GameStatus::Playing
                    && game.is_current_player(&pid)
                    && !game.has_die(index)
            });
            if stale {
                drop(games);
                send_to_player(
                    player_id,
                    ServerMessage::Error {
                        code: ErrorCode::InvalidAction,
                        message: "Invalid selection".into(),
                    },
                    state,
                )
                .await;
                return Ok(());
            }

            let result = games.apply(&channel, |game, now| game.select_die(&pid, index, now));
            drop(games);
            finish(player_id, &channel, result, state).await;
        }

        ClientMessage::ResetSelection { channel } => {
            let result = state
                .games
                .write()
                .await
                .apply(&channel, |game, now| game.reset_selection(&pid, now));
            finish(player_id, &channel, result, state).await;
        }

        ClientMessage::Bank { channel } => {
            let result = state
                .games
                .write()
                .await
                .apply(&channel, |game, now| game.bank(&pid, now));
            finish(player_id, &channel, result, state).await;
        }

        ClientMessage::Quit { channel } => {
            let result = state
                .games
                .write()
                .await
                .apply(&channel, |game, now| game.quit(&pid, now));
            finish(player_id, &channel, result, state).await;
        }

        ClientMessage::Say { channel, message } => {
            let sender_name = match state.connections.read().await.get(&player_id) {
                Some(c) => c.player_name.clone(),
                None => return Ok(()),
            };

            let members = {
                let mut channels = state.channels.write().await;
                channels.watch(&channel, player_id);
                channels.watchers(&channel)
            };
            let timestamp = chrono::Utc::now().timestamp();

            broadcast_to_list(
                &members,
                &ServerMessage::ChannelMessage {
                    channel,
                    sender_id: player_id,
                    sender_name,
                    message,
                    timestamp,
                },
                state,
            )
            .await;
        }

        ClientMessage::Ping => {
            send_to_player(player_id, ServerMessage::Pong, state).await;
        }

        ClientMessage::Disconnect => {
            handle_disconnect(player_id, state).await;
        }

        ClientMessage::Hello { .. } => {
            tracing::debug!("Ignoring repeated Hello from {}", player_id);
        }
    }

    Ok(())
}

pub async fn handle_disconnect(player_id: Uuid, state: &SharedState) {
    // Games are left alone; the idle sweep reclaims abandoned tables.
    state.channels.write().await.leave_all(player_id);
    state.connections.write().await.remove(&player_id);
}

/// Sends a transition to everyone watching `channel`.
pub async fn broadcast_update(channel: &str, transition: Transition, state: &SharedState) {
    let members = state.channels.read().await.watchers(channel);
    let msg = ServerMessage::GameUpdate {
        channel: channel.to_string(),
        event: transition.event,
        game: transition.game,
    };
    broadcast_to_list(&members, &msg, state).await;
}

/// Builds the core's view of a connected player.
async fn seat_for(player_id: Uuid, state: &SharedState) -> Option<Player> {
    state
        .connections
        .read()
        .await
        .get(&player_id)
        .map(|c| Player::new(c.player_id.to_string(), c.player_name.clone()))
}

async fn finish(
    player_id: Uuid,
    channel: &str,
    result: Result<Transition, GameError>,
    state: &SharedState,
) {
    match result {
        Ok(transition) => {
            state.channels.write().await.watch(channel, player_id);
            broadcast_update(channel, transition, state).await;
        }
        Err(e) => {
            if e.is_rejection() {
                tracing::info!("Rejected action from {} in {}: {}", player_id, channel, e);
            } else {
                tracing::debug!("Ignored action from {} in {}: {}", player_id, channel, e);
            }
            send_to_player(player_id, ServerMessage::error(&e), state).await;
        }
    }
}

async fn send_to_player(player_id: Uuid, msg: ServerMessage, state: &SharedState) {
    let conns = state.connections.read().await;
    if let Some(conn) = conns.get(&player_id) {
        let _ = conn.tx.send(msg).await;
    }
}

/// Broadcast a message to a list of player IDs.
async fn broadcast_to_list(member_ids: &[Uuid], msg: &ServerMessage, state: &SharedState) {
    let conns = state.connections.read().await;
    for &id in member_ids {
        if let Some(conn) = conns.get(&id) {
            let _ = conn.tx.send(msg.clone()).await;
        }
    }
}
