//! Translates one trimmed, non-empty inbound text line into a typed
//! [`Command`], or rejects it with a [`CommandError`] (always rendered on the
//! wire as `INVALID_FORMAT`).

use crate::board::NoteFilter;
use crate::error::CommandError;
use crate::geometry::Point;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Post {
        x: u32,
        y: u32,
        color: String,
        message: String,
    },
    Pin {
        x: u32,
        y: u32,
    },
    Unpin {
        x: u32,
        y: u32,
    },
    Shake,
    Clear,
    GetPins,
    Get(NoteFilterArgs),
    Disconnect,
}

/// The parsed, not-yet-validated arguments of a filtered `GET`. Kept distinct
/// from [`NoteFilter`] so the parser never needs to know about board
/// validation; `Session` converts one into the other.
pub type NoteFilterArgs = NoteFilter;

/// Parses a single command line, already trimmed of its trailing newline and
/// any surrounding whitespace.
pub fn parse(line: &str) -> Result<Command, CommandError> {
    let line = line.trim();
    if line.is_empty() {
        return Err(CommandError::Empty);
    }

    let (keyword, rest) = take_token(line).expect("non-empty line has a first token");
    match keyword.to_ascii_uppercase().as_str() {
        "POST" => parse_post(rest),
        "PIN" => parse_two_coords(rest, "PIN").map(|(x, y)| Command::Pin { x, y }),
        "UNPIN" => parse_two_coords(rest, "UNPIN").map(|(x, y)| Command::Unpin { x, y }),
        "SHAKE" => parse_no_args(rest, "SHAKE").map(|()| Command::Shake),
        "CLEAR" => parse_no_args(rest, "CLEAR").map(|()| Command::Clear),
        "DISCONNECT" => parse_no_args(rest, "DISCONNECT").map(|()| Command::Disconnect),
        "GET" => parse_get(rest),
        other => Err(CommandError::UnknownCommand(other.to_string())),
    }
}

/// Splits off the next whitespace-delimited token, skipping any leading run
/// of whitespace first. Returns `None` if nothing but whitespace remains.
fn take_token(s: &str) -> Option<(&str, &str)> {
    let s = s.trim_start();
    if s.is_empty() {
        return None;
    }
    match s.find(char::is_whitespace) {
        Some(idx) => Some((&s[..idx], &s[idx..])),
        None => Some((s, "")),
    }
}

fn parse_coord(raw: &str, field: &'static str) -> Result<u32, CommandError> {
    raw.parse::<u32>()
        .map_err(|_| CommandError::NotANumber {
            field,
            value: raw.to_string(),
        })
}

fn parse_two_coords(rest: &str, command: &'static str) -> Result<(u32, u32), CommandError> {
    let (x_str, rest) = take_token(rest).ok_or(CommandError::WrongArity {
        command,
        expected: "2",
        got: 0,
    })?;
    let (y_str, rest) = take_token(rest).ok_or(CommandError::WrongArity {
        command,
        expected: "2",
        got: 1,
    })?;
    if take_token(rest).is_some() {
        return Err(CommandError::WrongArity {
            command,
            expected: "2",
            got: 3,
        });
    }
    Ok((parse_coord(x_str, "x")?, parse_coord(y_str, "y")?))
}

fn parse_no_args(rest: &str, command: &'static str) -> Result<(), CommandError> {
    if take_token(rest).is_some() {
        return Err(CommandError::WrongArity {
            command,
            expected: "0",
            got: 1,
        });
    }
    Ok(())
}

fn parse_post(rest: &str) -> Result<Command, CommandError> {
    let (x_str, rest) = take_token(rest).ok_or(CommandError::WrongArity {
        command: "POST",
        expected: "at least 4",
        got: 0,
    })?;
    let (y_str, rest) = take_token(rest).ok_or(CommandError::WrongArity {
        command: "POST",
        expected: "at least 4",
        got: 1,
    })?;
    let (color_str, rest) = take_token(rest).ok_or(CommandError::WrongArity {
        command: "POST",
        expected: "at least 4",
        got: 2,
    })?;
    if rest.is_empty() {
        return Err(CommandError::WrongArity {
            command: "POST",
            expected: "at least 4",
            got: 3,
        });
    }

    Ok(Command::Post {
        x: parse_coord(x_str, "x")?,
        y: parse_coord(y_str, "y")?,
        color: color_str.to_string(),
        message: rest.trim_start().to_string(),
    })
}

fn parse_get(rest: &str) -> Result<Command, CommandError> {
    let rest = rest.trim();
    if rest.is_empty() {
        return Ok(Command::Get(NoteFilter::default()));
    }
    if rest.eq_ignore_ascii_case("PINS") {
        return Ok(Command::GetPins);
    }

    let tokens: Vec<&str> = rest.split_whitespace().collect();
    let mut filter = NoteFilter::default();
    let mut i = 0;

    while i < tokens.len() {
        let tok = tokens[i];
        let (key, value) = tok
            .split_once('=')
            .ok_or_else(|| CommandError::UnknownCriterion(tok.to_string()))?;

        match key.to_ascii_lowercase().as_str() {
            "color" => {
                if filter.color.is_some() {
                    return Err(CommandError::DuplicateCriterion("color"));
                }
                if value.is_empty() {
                    return Err(CommandError::UnknownCriterion(tok.to_string()));
                }
                filter.color = Some(value.to_string());
                i += 1;
            }
            "contains" => {
                if filter.contains.is_some() {
                    return Err(CommandError::DuplicateCriterion("contains"));
                }
                let (x_str, y_str, consumed) = if !value.is_empty() {
                    let y = tokens.get(i + 1).ok_or(CommandError::IncompleteContains)?;
                    (value, *y, 2)
                } else {
                    let x = tokens.get(i + 1).ok_or(CommandError::IncompleteContains)?;
                    let y = tokens.get(i + 2).ok_or(CommandError::IncompleteContains)?;
                    (*x, *y, 3)
                };
                filter.contains = Some(Point::new(
                    parse_coord(x_str, "contains.x")?,
                    parse_coord(y_str, "contains.y")?,
                ));
                i += consumed;
            }
            "refersto" => {
                if filter.refers_to.is_some() {
                    return Err(CommandError::DuplicateCriterion("refersTo"));
                }
                if value.is_empty() {
                    return Err(CommandError::UnknownCriterion(tok.to_string()));
                }
                filter.refers_to = Some(value.to_string());
                i += 1;
            }
            _ => return Err(CommandError::UnknownCriterion(tok.to_string())),
        }
    }

    Ok(Command::Get(filter))
}
