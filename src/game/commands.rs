//! Player input: action keys and chat, including the developer commands
//! typed into chat.

use log::info;
use serde_json::json;

use crate::game::broadcast::Target;
use crate::game::error::{GameError, GameResult};
use crate::game::state::Game;
use crate::game::types::{GamePhase, Point};

/// Chat lines starting with this are developer commands.
pub const COMMAND_MARKER: char = '/';

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Teleport(Point),
    Restart,
}

impl Command {
    pub fn parse(line: &str) -> GameResult<Command> {
        let mut words = line.trim_start_matches(COMMAND_MARKER).split_whitespace();
        match words.next() {
            Some("teleport") => {
                let mut coordinate = || {
                    words
                        .next()
                        .and_then(|w| w.parse::<i32>().ok())
                        .ok_or_else(|| GameError::invalid_command("Usage: /teleport <x> <y>"))
                };
                let x = coordinate()?;
                let y = coordinate()?;
                Ok(Command::Teleport(Point::new(x, y)))
            }
            Some("restart") => Ok(Command::Restart),
            Some(other) => Err(GameError::invalid_command(format!("Unknown command '{other}'."))),
            None => Err(GameError::invalid_command("Empty command.")),
        }
    }
}

/// What a chat line asks the room to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatOutcome {
    Said,
    Ignored,
    Teleported,
    Restarted,
}

impl Game {
    /// A key pressed during the game.
    pub fn action(&mut self, username: &str, key: &str, extra: Option<u32>) -> GameResult<()> {
        if self.phase != GamePhase::Started {
            return Ok(());
        }
        let entity = self
            .player_entity_mut(username)
            .ok_or_else(|| GameError::invalid_action("Spectators cannot act."))?;
        if !entity.alive {
            return Err(GameError::invalid_action("You are dead."));
        }
        match entity.as_player_mut() {
            Some(player) => player.prepare_action(key, extra),
            None => Ok(()),
        }
    }

    pub fn chat(&mut self, username: &str, text: &str) -> GameResult<ChatOutcome> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(ChatOutcome::Ignored);
        }
        if !text.starts_with(COMMAND_MARKER) {
            self.emit("chat message", json!({ "username": username, "message": text }), Target::Room);
            return Ok(ChatOutcome::Said);
        }

        match Command::parse(text)? {
            Command::Teleport(to) => {
                self.teleport(username, to)?;
                Ok(ChatOutcome::Teleported)
            }
            Command::Restart => {
                info!("[Game {}] restart requested by {}", self.room_id, username);
                self.restart()?;
                Ok(ChatOutcome::Restarted)
            }
        }
    }

    fn teleport(&mut self, username: &str, to: Point) -> GameResult<()> {
        if self.phase != GamePhase::Started {
            return Err(GameError::invalid_command("The game has not started."));
        }
        if !self.grid.is_walkable(to) {
            return Err(GameError::invalid_command(format!("Cannot teleport to ({}, {}).", to.x, to.y)));
        }
        let entity = self
            .player_entity_mut(username)
            .ok_or_else(|| GameError::invalid_command("Spectators cannot teleport."))?;
        entity.position = to;
        if let Some(motion) = entity.motion.as_mut() {
            motion.stop();
        }
        self.refresh_all_sight();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_developer_commands() {
        assert_eq!(Command::parse("/teleport 4 -2"), Ok(Command::Teleport(Point::new(4, -2))));
        assert_eq!(Command::parse("/restart"), Ok(Command::Restart));
    }

    #[test]
    fn malformed_commands_are_rejected() {
        for line in ["/teleport 4", "/teleport x y", "/dance", "/"] {
            assert!(matches!(Command::parse(line), Err(GameError::InvalidCommand(_))), "{line}");
        }
    }
}
