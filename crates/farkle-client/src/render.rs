use farkle_common::dice::die_face;
use farkle_common::game::{GameSnapshot, GameStatus, Outcome, TurnEvent};
use farkle_common::protocol::ServerMessage;

/// Lines to print for one server message.
pub fn render(msg: &ServerMessage) -> Vec<String> {
    match msg {
        ServerMessage::Welcome { server_version, .. } => {
            vec![format!("Connected (server {}). Type !help for commands.", server_version)]
        }
        ServerMessage::HandshakeError { reason } => vec![format!("Handshake failed: {}", reason)],
        ServerMessage::GameUpdate {
            channel,
            event,
            game,
        } => {
            let mut lines = vec![format!("[#{}] {}", channel, headline(event, game))];
            lines.extend(table(game));
            lines
        }
        ServerMessage::TableState { channel, game } => match game {
            Some(game) => {
                let mut lines = vec![format!("[#{}] Table state:", channel)];
                lines.extend(table(game));
                lines
            }
            None => vec![format!(
                "[#{}] No game here. Type !farkle to start one.",
                channel
            )],
        },
        ServerMessage::ChannelMessage {
            channel,
            sender_name,
            message,
            timestamp,
            ..
        } => {
            let time = chrono::DateTime::from_timestamp(*timestamp, 0)
                .map(|t| t.format("%H:%M").to_string())
                .unwrap_or_default();
            vec![format!("[#{} {}] {}: {}", channel, time, sender_name, message)]
        }
        ServerMessage::Error { message, .. } => vec![format!("Error: {}", message)],
        ServerMessage::Pong => vec!["pong".into()],
    }
}

fn name<'a>(game: &'a GameSnapshot, id: &'a str) -> &'a str {
    game.player(id).map(|p| p.name.as_str()).unwrap_or(id)
}

fn headline(event: &TurnEvent, game: &GameSnapshot) -> String {
    match event {
        TurnEvent::Opened { host } => {
            format!("{} is starting a game! Type !join to play.", name(game, host))
        }
        TurnEvent::Joined { .. } => format!(
            "Game between {}. {} rolls first.",
            game.players
                .iter()
                .map(|p| p.name.as_str())
                .collect::<Vec<_>>()
                .join(" and "),
            game.current_player().map(|p| p.name.as_str()).unwrap_or("Host")
        ),
        TurnEvent::Rolled {
            player,
            dice,
            hot_dice,
        } => {
            let prefix = if *hot_dice { "Hot dice! " } else { "" };
            format!("{}{} rolled {}", prefix, name(game, player), format_dice(dice))
        }
        TurnEvent::Farkled {
            player,
            dice,
            forfeited,
            next,
        } => format!(
            "FARKLE! {} got nothing from {} and lost {} points. {}'s turn.",
            name(game, player),
            format_dice(dice),
            forfeited,
            name(game, next)
        ),
        TurnEvent::Selected {
            player,
            value,
            turn_score,
        } => format!(
            "{} set aside {} (selection worth {})",
            name(game, player),
            format_dice(&[*value]),
            turn_score
        ),
        TurnEvent::SelectionReset { player } => {
            format!("{} put the selected dice back", name(game, player))
        }
        TurnEvent::Banked {
            player,
            points,
            next,
            ..
        } => format!(
            "{} banked {} points. {}'s turn.",
            name(game, player),
            points,
            name(game, next)
        ),
        TurnEvent::Won { player, total, .. } => {
            format!("Game over! {} wins with {} points!", name(game, player), total)
        }
        TurnEvent::Quit { player } => format!("{} has quit the game.", name(game, player)),
        TurnEvent::TimedOut => "The game was closed after sitting idle.".into(),
    }
}

fn table(game: &GameSnapshot) -> Vec<String> {
    let mut lines = Vec::new();

    if game.status == GameStatus::Playing && !game.is_over() {
        if let Some(current) = game.current_player() {
            lines.push(format!("  {}'s turn", current.name));
        }
        if !game.roll.is_empty() {
            let roll: Vec<String> = game
                .roll
                .iter()
                .enumerate()
                .map(|(i, &d)| format!("[{}] {} {}", i + 1, die_face(d), d))
                .collect();
            lines.push(format!("  Roll:       {}", roll.join("  ")));
        }
        if !game.selection.is_empty() {
            lines.push(format!("  Selected:   {}", format_dice(&game.selection)));
        }
        if game.at_stake > 0 {
            lines.push(format!("  Turn score: {}", game.at_stake));
        }
    }

    if matches!(game.outcome, Some(Outcome::Quit { .. }) | Some(Outcome::TimedOut)) {
        lines.push("  Final scores:".into());
    }
    let scores: Vec<String> = game
        .players
        .iter()
        .map(|p| format!("{}: {}", p.name, p.score))
        .collect();
    lines.push(format!("  {}", scores.join(" | ")));
    lines
}

pub fn format_dice(dice: &[u8]) -> String {
    if dice.is_empty() {
        return "None".into();
    }
    dice.iter()
        .map(|&d| format!("{} {}", die_face(d), d))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use farkle_common::player::Player;

    fn snapshot() -> GameSnapshot {
        let mut alice = Player::new("a", "Alice");
        alice.score = 1200;
        let bob = Player::new("b", "Bob");
        GameSnapshot {
            channel_id: "general".into(),
            status: GameStatus::Playing,
            players: vec![alice, bob],
            current_turn: Some(0),
            roll: vec![2, 3, 6],
            selection: vec![1, 5],
            turn_score: 150,
            accumulated_score: 300,
            at_stake: 450,
            outcome: None,
        }
    }

    #[test]
    fn test_format_dice() {
        assert_eq!(format_dice(&[]), "None");
        assert_eq!(format_dice(&[1, 5]), "⚀ 1 ⚄ 5");
    }

    #[test]
    fn test_render_table() {
        let lines = render(&ServerMessage::GameUpdate {
            channel: "general".into(),
            event: TurnEvent::Selected {
                player: "a".into(),
                value: 5,
                turn_score: 150,
            },
            game: snapshot(),
        });
        assert_eq!(lines[0], "[#general] Alice set aside ⚄ 5 (selection worth 150)");
        assert_eq!(lines[1], "  Alice's turn");
        assert_eq!(lines[2], "  Roll:       [1] ⚁ 2  [2] ⚂ 3  [3] ⚅ 6");
        assert_eq!(lines[3], "  Selected:   ⚀ 1 ⚄ 5");
        assert_eq!(lines[4], "  Turn score: 450");
        assert_eq!(lines[5], "  Alice: 1200 | Bob: 0");
    }

    #[test]
    fn test_render_farkle() {
        let mut game = snapshot();
        game.roll.clear();
        game.selection.clear();
        game.turn_score = 0;
        game.accumulated_score = 0;
        game.at_stake = 0;
        game.current_turn = Some(1);
        let lines = render(&ServerMessage::GameUpdate {
            channel: "general".into(),
            event: TurnEvent::Farkled {
                player: "a".into(),
                dice: vec![2, 3, 4],
                forfeited: 300,
                next: "b".into(),
            },
            game,
        });
        assert_eq!(
            lines[0],
            "[#general] FARKLE! Alice got nothing from ⚁ 2 ⚂ 3 ⚃ 4 and lost 300 points. Bob's turn."
        );
        assert_eq!(lines[1], "  Bob's turn");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_render_quit_shows_final_scores() {
        let mut game = snapshot();
        game.outcome = Some(Outcome::Quit {
            quitter: "a".into(),
        });
        let lines = render(&ServerMessage::GameUpdate {
            channel: "general".into(),
            event: TurnEvent::Quit { player: "a".into() },
            game,
        });
        assert_eq!(
            lines,
            vec![
                "[#general] Alice has quit the game.".to_string(),
                "  Final scores:".to_string(),
                "  Alice: 1200 | Bob: 0".to_string(),
            ]
        );
    }

    #[test]
    fn test_render_empty_channel() {
        let lines = render(&ServerMessage::TableState {
            channel: "dice".into(),
            game: None,
        });
        assert_eq!(lines, vec!["[#dice] No game here. Type !farkle to start one."]);
    }

    #[test]
    fn test_render_error() {
        let lines = render(&ServerMessage::Error {
            code: farkle_common::protocol::ErrorCode::NothingToBank,
            message: "no points to bank".into(),
        });
        assert_eq!(lines, vec!["Error: no points to bank"]);
    }
}
