//! Parsing of interactive commands
//!
//! Every failure here is a malformed-input error: it is reported to the
//! player and the prompt repeats.

use hextaboo_core::{Action, Hex};

/// A line typed at the prompt
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Submit an action to the engine
    Act(Action),
    /// Print the board again
    Board,
    /// Print the command summary
    Help,
    /// Abandon the game
    Quit,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("empty command")]
    Empty,

    #[error("unknown command '{0}'. Use 'place q r' or 'remove'")]
    Unknown(String),

    #[error("usage: {0}")]
    Usage(&'static str),

    #[error("'{0}' is not a whole number")]
    NotANumber(String),
}

pub const HELP: &str = "\
Commands:
  place <q> <r>   place a stone at axial coordinate (q, r)
  remove          neutralize the opponent's last stone (player 2, once)
  board           show the board
  help            show this message
  quit            abandon the game";

fn parse_coordinate(token: &str) -> Result<i32, CommandError> {
    token
        .parse()
        .map_err(|_| CommandError::NotANumber(token.to_string()))
}

/// Parse one input line
pub fn parse(line: &str) -> Result<Command, CommandError> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let Some(verb) = parts.first() else {
        return Err(CommandError::Empty);
    };

    match verb.to_ascii_lowercase().as_str() {
        "place" | "p" => match parts[1..] {
            [q, r] => Ok(Command::Act(Action::Place(Hex::new(
                parse_coordinate(q)?,
                parse_coordinate(r)?,
            )))),
            _ => Err(CommandError::Usage("place <q> <r>")),
        },
        "remove" | "neutralize" => {
            if parts.len() == 1 {
                Ok(Command::Act(Action::Neutralize))
            } else {
                Err(CommandError::Usage("remove"))
            }
        }
        "board" => Ok(Command::Board),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        other => Err(CommandError::Unknown(other.to_string())),
    }
}
