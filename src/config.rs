//! Immutable board configuration, fixed at startup from the process launch
//! arguments: `port boardW boardH noteW noteH color1 ... colorN`.
//!
//! Parsing the raw argument list is a thin outer layer deliberately kept out
//! of the rest of the core: it produces a validated [`BoardConfig`] plus the
//! listening address, or a [`ConfigError`], and nothing downstream ever sees
//! unvalidated input again.

use std::collections::BTreeSet;
use std::net::SocketAddr;

use crate::error::ConfigError;

/// Board dimensions, note dimensions, and the allowed color set. Set once at
/// startup and shared read-only for the lifetime of the process.
#[derive(Debug, Clone)]
pub struct BoardConfig {
    pub board_w: u32,
    pub board_h: u32,
    pub note_w: u32,
    pub note_h: u32,
    valid_colors: BTreeSet<String>,
}

impl BoardConfig {
    /// Parses the positional launch arguments (`args[0]` is the port, not the
    /// program name) into a validated configuration and listening address.
    pub fn from_args(args: &[String]) -> Result<(BoardConfig, SocketAddr), ConfigError> {
        if args.len() < 6 {
            return Err(ConfigError::TooFewArguments);
        }

        let port = parse_port(&args[0])?;
        let board_w = parse_positive(&args[1], "boardW")?;
        let board_h = parse_positive(&args[2], "boardH")?;
        let note_w = parse_positive(&args[3], "noteW")?;
        let note_h = parse_positive(&args[4], "noteH")?;

        let valid_colors: BTreeSet<String> =
            args[5..].iter().map(|c| c.to_ascii_uppercase()).collect();
        if valid_colors.is_empty() {
            return Err(ConfigError::NoColors);
        }

        let addr: SocketAddr = ([0, 0, 0, 0], port).into();

        Ok((
            BoardConfig {
                board_w,
                board_h,
                note_w,
                note_h,
                valid_colors,
            },
            addr,
        ))
    }

    /// Canonicalizes a color to upper case and checks membership.
    pub fn canonicalize_color(&self, raw: &str) -> Option<String> {
        let upper = raw.to_ascii_uppercase();
        self.valid_colors.contains(&upper).then_some(upper)
    }

    /// Colors in ascending lexicographic order, for the handshake banner.
    pub fn colors_sorted(&self) -> impl Iterator<Item = &str> {
        self.valid_colors.iter().map(String::as_str)
    }
}

fn parse_positive(raw: &str, field: &'static str) -> Result<u32, ConfigError> {
    raw.parse::<u32>()
        .ok()
        .filter(|&n| n > 0)
        .ok_or_else(|| ConfigError::NotAPositiveInteger {
            field,
            value: raw.to_string(),
        })
}

/// Ports are `u16` on the wire; reject anything that wouldn't fit one,
/// rather than silently truncating it.
fn parse_port(raw: &str) -> Result<u16, ConfigError> {
    raw.parse::<u16>()
        .ok()
        .filter(|&n| n > 0)
        .ok_or_else(|| ConfigError::NotAPositiveInteger {
            field: "port",
            value: raw.to_string(),
        })
}
