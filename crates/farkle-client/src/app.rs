use tokio::io::{AsyncBufReadExt, BufReader};

use farkle_common::protocol::ClientMessage;

use crate::input::{self, Command};
use crate::network;
use crate::render;

pub async fn run(server: String, name: String, mut channel: String) -> anyhow::Result<()> {
    let network::Session {
        player_id,
        server_version,
        tx,
        mut rx,
    } = network::connect(&server, &name).await?;
    tracing::debug!("Playing as {} with id {}", name, player_id);
    println!(
        "Connected to {} (server {}). Type !help for commands.",
        server, server_version
    );
    tx.send(ClientMessage::Watch {
        channel: channel.clone(),
    })
    .await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            msg = rx.recv() => {
                let Some(msg) = msg else {
                    println!("Disconnected from server.");
                    break;
                };
                print_lines(&render::render(&msg));
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    let _ = tx.send(ClientMessage::Disconnect).await;
                    break;
                };
                match input::parse_line(&line, &channel) {
                    Command::Send(msg) => tx.send(msg).await?,
                    Command::SwitchChannel(next) => {
                        channel = next;
                        println!("Now in #{}", channel);
                        tx.send(ClientMessage::Watch { channel: channel.clone() }).await?;
                    }
                    Command::Help => println!("{}", input::HELP),
                    Command::Exit => {
                        let _ = tx.send(ClientMessage::Disconnect).await;
                        break;
                    }
                    Command::Invalid(reason) => println!("{}", reason),
                    Command::Empty => {}
                }
            }
        }
    }

    Ok(())
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{}", line);
    }
}
