use core::str::FromStr;
use minesweep_core::{Coord, Coord2};
use thiserror::Error;

/// One line of player input, the typed stand-in for mouse clicks.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Command {
    /// left click
    Reveal(Coord2),
    /// right click
    Flag(Coord2),
    Restart,
    Quit,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub(crate) enum ParseCommandError {
    #[error("empty command, try `r ROW COL`, `f ROW COL`, `n` or `q`")]
    Empty,
    #[error("unknown command `{0}`, try `r ROW COL`, `f ROW COL`, `n` or `q`")]
    Unknown(String),
    #[error("`{0}` expects a row and a column")]
    MissingCoords(&'static str),
    #[error("invalid coordinate `{0}`")]
    InvalidCoord(String),
    #[error("unexpected trailing input `{0}`")]
    Trailing(String),
}

fn parse_coord(word: Option<&str>, command: &'static str) -> Result<Coord, ParseCommandError> {
    let word = word.ok_or(ParseCommandError::MissingCoords(command))?;
    word.parse()
        .map_err(|_| ParseCommandError::InvalidCoord(word.to_string()))
}

impl FromStr for Command {
    type Err = ParseCommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let keyword = words.next().ok_or(ParseCommandError::Empty)?;

        let command = match keyword.to_ascii_lowercase().as_str() {
            "r" | "reveal" => {
                let row = parse_coord(words.next(), "reveal")?;
                let col = parse_coord(words.next(), "reveal")?;
                Command::Reveal((row, col))
            }
            "f" | "flag" => {
                let row = parse_coord(words.next(), "flag")?;
                let col = parse_coord(words.next(), "flag")?;
                Command::Flag((row, col))
            }
            "n" | "new" | "restart" => Command::Restart,
            "q" | "quit" | "exit" => Command::Quit,
            _ => return Err(ParseCommandError::Unknown(keyword.to_string())),
        };

        match words.next() {
            Some(extra) => Err(ParseCommandError::Trailing(extra.to_string())),
            None => Ok(command),
        }
    }
}
