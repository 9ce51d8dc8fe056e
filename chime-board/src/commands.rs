//! Text commands for the board
//!
//! The shell binary reads one command per line and parses it into a
//! [`Command`]. Board operations are forwarded to [`Board::apply`];
//! `status` and `quit` are handled by the shell itself.
//!
//! [`Board::apply`]: crate::board::Board::apply

use crate::error::{Error, Result};
use chime_common::human_time::parse_editor_input;
use std::str::FromStr;

/// An operation on the board
#[derive(Debug, Clone, PartialEq)]
pub enum BoardCommand {
    Add,
    Remove(usize),
    Start(usize),
    Stop(usize),
    Test(usize),
    /// Duration editor input (`m:ss`)
    Duration { index: usize, minutes: u32, seconds: u32 },
    /// Decimal minutes, as stored on the slot
    Minutes { index: usize, minutes: f64 },
    Category { index: usize, key: String },
    /// Volume bar level (0-10)
    Volume { index: usize, level: u8 },
    TogglePlayPause,
    /// Fraction of the clip (0.0-1.0)
    Seek(f64),
    /// Player volume bar level (0-10)
    PlayerVolume(u8),
}

/// One parsed shell line
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Board(BoardCommand),
    Status,
    Quit,
}

impl FromStr for Command {
    type Err = Error;

    fn from_str(line: &str) -> Result<Self> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Err(Error::InvalidInput("empty command".to_string()));
        };
        let args: Vec<&str> = words.collect();

        let command = match verb.to_ascii_lowercase().as_str() {
            "add" => BoardCommand::Add,
            "remove" | "rm" => BoardCommand::Remove(index_arg(&args)?),
            "start" => BoardCommand::Start(index_arg(&args)?),
            "stop" => BoardCommand::Stop(index_arg(&args)?),
            "test" => BoardCommand::Test(index_arg(&args)?),
            "duration" => {
                let index = index_arg(&args)?;
                let (minutes, seconds) = parse_editor_input(value_arg(&args, "m:ss")?);
                BoardCommand::Duration {
                    index,
                    minutes,
                    seconds,
                }
            }
            "minutes" => BoardCommand::Minutes {
                index: index_arg(&args)?,
                minutes: parse_number(value_arg(&args, "minutes")?)?,
            },
            "category" => BoardCommand::Category {
                index: index_arg(&args)?,
                key: value_arg(&args, "category key")?.to_string(),
            },
            "volume" => BoardCommand::Volume {
                index: index_arg(&args)?,
                level: parse_number(value_arg(&args, "level")?)?,
            },
            "toggle" | "pause" | "play" => BoardCommand::TogglePlayPause,
            "seek" => BoardCommand::Seek(parse_fraction(first_arg(&args, "fraction")?)?),
            "player-volume" => {
                BoardCommand::PlayerVolume(parse_number(first_arg(&args, "level")?)?)
            }
            "status" => return Ok(Command::Status),
            "quit" | "exit" => return Ok(Command::Quit),
            other => return Err(Error::InvalidInput(format!("unknown command '{}'", other))),
        };
        Ok(Command::Board(command))
    }
}

fn first_arg<'a>(args: &[&'a str], what: &str) -> Result<&'a str> {
    args.first()
        .copied()
        .ok_or_else(|| Error::InvalidInput(format!("missing {}", what)))
}

fn index_arg(args: &[&str]) -> Result<usize> {
    parse_number(first_arg(args, "reminder index")?)
}

fn value_arg<'a>(args: &[&'a str], what: &str) -> Result<&'a str> {
    args.get(1)
        .copied()
        .ok_or_else(|| Error::InvalidInput(format!("missing {}", what)))
}

fn parse_number<T: FromStr>(text: &str) -> Result<T> {
    text.parse()
        .map_err(|_| Error::InvalidInput(format!("'{}' is not a valid number", text)))
}

/// Seek position; finite values only
fn parse_fraction(text: &str) -> Result<f64> {
    let fraction: f64 = parse_number(text)?;
    if !fraction.is_finite() {
        return Err(Error::InvalidInput(format!(
            "'{}' is not a valid seek fraction",
            text
        )));
    }
    Ok(fraction)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(line: &str) -> BoardCommand {
        match line.parse::<Command>().unwrap() {
            Command::Board(command) => command,
            other => panic!("expected board command, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_slot_commands() {
        assert_eq!(board("add"), BoardCommand::Add);
        assert_eq!(board("start 2"), BoardCommand::Start(2));
        assert_eq!(board("  STOP   0 "), BoardCommand::Stop(0));
        assert_eq!(board("remove 1"), BoardCommand::Remove(1));
        assert_eq!(board("test 3"), BoardCommand::Test(3));
    }

    #[test]
    fn test_parse_edits() {
        assert_eq!(
            board("duration 0 1:30"),
            BoardCommand::Duration {
                index: 0,
                minutes: 1,
                seconds: 30
            }
        );
        assert_eq!(
            board("minutes 1 2.5"),
            BoardCommand::Minutes {
                index: 1,
                minutes: 2.5
            }
        );
        assert_eq!(
            board("category 0 Sonnguyn"),
            BoardCommand::Category {
                index: 0,
                key: "Sonnguyn".to_string()
            }
        );
        assert_eq!(
            board("volume 0 4"),
            BoardCommand::Volume { index: 0, level: 4 }
        );
    }

    #[test]
    fn test_parse_player_and_shell_commands() {
        assert_eq!(board("toggle"), BoardCommand::TogglePlayPause);
        assert_eq!(board("seek 0.25"), BoardCommand::Seek(0.25));
        assert_eq!(board("player-volume 3"), BoardCommand::PlayerVolume(3));
        assert_eq!("status".parse::<Command>().unwrap(), Command::Status);
        assert_eq!("quit".parse::<Command>().unwrap(), Command::Quit);
    }

    #[test]
    fn test_parse_errors() {
        for line in [
            "",
            "dance",
            "start",
            "start x",
            "volume 0",
            "volume 0 300",
            "seek",
            "seek nan",
            "seek inf",
            "seek -infinity",
        ] {
            assert!(
                matches!(line.parse::<Command>(), Err(Error::InvalidInput(_))),
                "line {:?} should be rejected",
                line
            );
        }
    }
}
