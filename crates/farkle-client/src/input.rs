use farkle_common::protocol::ClientMessage;

pub const HELP: &str = "\
Commands:
  !farkle         open a table in the current channel
  !join           join the table in the current channel
  !watch          follow the current channel's table
  !roll           roll (or roll the remaining dice)
  !select <n>     set aside die number n from the roll
  !reset          put the selection back
  !bank           bank your turn points
  !quit           end the game (on your turn)
  !channel <name> switch channel
  !ping           check the server is alive
  !help           show this help
  !exit           leave
Anything else is sent as a chat message.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Send(ClientMessage),
    SwitchChannel(String),
    Help,
    Exit,
    Empty,
    Invalid(String),
}

/// Turns one line of user input into a command for `channel`.
pub fn parse_line(line: &str, channel: &str) -> Command {
    let line = line.trim();
    if line.is_empty() {
        return Command::Empty;
    }
    if !line.starts_with('!') {
        return Command::Send(ClientMessage::Say {
            channel: channel.to_string(),
            message: line.to_string(),
        });
    }

    let mut parts = line.split_whitespace();
    let verb = parts.next().unwrap_or_default().to_lowercase();
    let arg = parts.next();
    let channel = channel.to_string();

    match verb.as_str() {
        "!farkle" => Command::Send(ClientMessage::OpenTable { channel }),
        "!join" => Command::Send(ClientMessage::JoinTable { channel }),
        "!watch" => Command::Send(ClientMessage::Watch { channel }),
        "!roll" => Command::Send(ClientMessage::Roll { channel }),
        "!reset" => Command::Send(ClientMessage::ResetSelection { channel }),
        "!bank" => Command::Send(ClientMessage::Bank { channel }),
        "!quit" => Command::Send(ClientMessage::Quit { channel }),
        "!ping" => Command::Send(ClientMessage::Ping),
        "!select" => match arg.and_then(|a| a.parse::<usize>().ok()) {
            Some(n) if n >= 1 => Command::Send(ClientMessage::SelectDie {
                channel,
                index: n - 1,
            }),
            _ => Command::Invalid("usage: !select <die number>".into()),
        },
        "!channel" => match arg {
            Some(name) => Command::SwitchChannel(name.trim_start_matches('#').to_string()),
            None => Command::Invalid("usage: !channel <name>".into()),
        },
        "!help" => Command::Help,
        "!exit" => Command::Exit,
        other => Command::Invalid(format!("unknown command {}, try !help", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_chat() {
        assert_eq!(
            parse_line("  good luck  ", "general"),
            Command::Send(ClientMessage::Say {
                channel: "general".into(),
                message: "good luck".into(),
            })
        );
    }

    #[test]
    fn test_blank_line() {
        assert_eq!(parse_line("   ", "general"), Command::Empty);
    }

    #[test]
    fn test_game_commands() {
        assert_eq!(
            parse_line("!farkle", "dice"),
            Command::Send(ClientMessage::OpenTable {
                channel: "dice".into()
            })
        );
        assert_eq!(
            parse_line("!ROLL", "dice"),
            Command::Send(ClientMessage::Roll {
                channel: "dice".into()
            })
        );
        assert_eq!(
            parse_line("!bank", "dice"),
            Command::Send(ClientMessage::Bank {
                channel: "dice".into()
            })
        );
    }

    #[test]
    fn test_select_is_one_based() {
        assert_eq!(
            parse_line("!select 3", "dice"),
            Command::Send(ClientMessage::SelectDie {
                channel: "dice".into(),
                index: 2,
            })
        );
        assert!(matches!(parse_line("!select 0", "dice"), Command::Invalid(_)));
        assert!(matches!(parse_line("!select", "dice"), Command::Invalid(_)));
        assert!(matches!(parse_line("!select x", "dice"), Command::Invalid(_)));
    }

    #[test]
    fn test_switch_channel() {
        assert_eq!(
            parse_line("!channel #random", "general"),
            Command::SwitchChannel("random".into())
        );
        assert!(matches!(parse_line("!channel", "general"), Command::Invalid(_)));
    }

    #[test]
    fn test_unknown_command() {
        assert_eq!(
            parse_line("!dance", "general"),
            Command::Invalid("unknown command !dance, try !help".into())
        );
    }

    #[test]
    fn test_help_lists_every_command() {
        for verb in [
            "!farkle", "!join", "!watch", "!roll", "!select", "!reset", "!bank", "!quit",
            "!channel", "!ping", "!help", "!exit",
        ] {
            assert!(HELP.contains(verb), "{} missing from help", verb);
            let parsed = parse_line(&format!("{} 1", verb), "general");
            assert!(
                !matches!(parsed, Command::Invalid(ref m) if m.starts_with("unknown")),
                "{} is listed but not accepted",
                verb
            );
        }
    }

    #[test]
    fn test_help_and_exit() {
        assert_eq!(parse_line("!help", "general"), Command::Help);
        assert_eq!(parse_line("!exit", "general"), Command::Exit);
    }
}
