//! UI triggers: restart and close requests from the keyboard

use std::io::BufRead;
use std::thread::{self, JoinHandle};

use tokio::sync::mpsc;
use tracing::{debug, info};

use super::SessionCommand;

/// Map a typed line to a command
pub fn parse_command(line: &str) -> Option<SessionCommand> {
    match line.trim().to_ascii_lowercase().as_str() {
        "r" | "restart" | "replay" => Some(SessionCommand::Restart),
        "q" | "quit" | "exit" | "\u{1b}" => Some(SessionCommand::Close),
        _ => None,
    }
}

/// Read commands from stdin until EOF or until the session stops listening.
/// Runs on its own thread: a blocking stdin read must not hold up runtime shutdown.
pub fn spawn_stdin_triggers(command_tx: mpsc::Sender<SessionCommand>) -> JoinHandle<()> {
    thread::spawn(move || {
        let stdin = std::io::stdin();

        for line in stdin.lock().lines() {
            let Ok(line) = line else {
                break;
            };
            let Some(command) = parse_command(&line) else {
                debug!(input = %line.trim(), "Ignoring unknown command");
                continue;
            };
            info!(?command, "Trigger received");
            if command_tx.blocking_send(command).is_err() {
                break;
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_map_to_commands() {
        assert_eq!(parse_command("r\n"), Some(SessionCommand::Restart));
        assert_eq!(parse_command(" Restart "), Some(SessionCommand::Restart));
        assert_eq!(parse_command("q"), Some(SessionCommand::Close));
        assert_eq!(parse_command("\u{1b}"), Some(SessionCommand::Close));
        assert_eq!(parse_command("fire"), None);
        assert_eq!(parse_command(""), None);
    }
}
