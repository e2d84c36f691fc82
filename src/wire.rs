//! Renders board state and errors into the exact line forms the protocol
//! promises: `OK ...` / `ERROR ...` single lines and `DATA BEGIN` ... `DATA
//! END` envelopes. The only place in the crate that knows what a reply looks
//! like on the wire.

use crate::board::NoteView;
use crate::config::BoardConfig;
use crate::error::{ReplyError, ReplyErrorLine};
use crate::geometry::Point;

/// The four handshake lines emitted once, in order, when a session connects.
pub fn handshake_lines(config: &BoardConfig) -> Vec<String> {
    let colors = config.colors_sorted().collect::<Vec<_>>().join(" ");
    vec![
        format!("BOARD {} {}", config.board_w, config.board_h),
        format!("NOTE {} {}", config.note_w, config.note_h),
        format!("COLORS {colors}"),
        "OK READY".to_string(),
    ]
}

pub fn ok_posted(id: u64) -> String {
    format!("OK POSTED {id}")
}

pub fn ok_pinned(x: u32, y: u32) -> String {
    format!("OK PINNED {x} {y}")
}

pub fn ok_unpinned(x: u32, y: u32) -> String {
    format!("OK UNPINNED {x} {y}")
}

pub fn ok_shaken(removed: usize) -> String {
    format!("OK SHAKEN REMOVED {removed}")
}

pub fn ok_cleared() -> &'static str {
    "OK CLEARED"
}

pub fn ok_bye() -> &'static str {
    "OK BYE"
}

pub fn error_line(err: &ReplyError) -> String {
    ReplyErrorLine(err).to_string()
}

fn pin_line(p: &Point) -> String {
    format!("PIN {} {}", p.x, p.y)
}

fn note_line(view: &NoteView) -> String {
    let pinned = if view.pinned { "PINNED" } else { "UNPINNED" };
    format!(
        "NOTE {} {} {} {} {} {}",
        view.note.id, view.note.x, view.note.y, view.note.color, pinned, view.note.message
    )
}

/// Wraps a body of lines in a `DATA BEGIN` / `DATA END` envelope.
fn envelope(body: Vec<String>) -> Vec<String> {
    let mut out = Vec::with_capacity(body.len() + 2);
    out.push("DATA BEGIN".to_string());
    out.extend(body);
    out.push("DATA END".to_string());
    out
}

pub fn pins_block(pins: &[Point]) -> Vec<String> {
    envelope(pins.iter().map(pin_line).collect())
}

pub fn notes_block(notes: &[NoteView]) -> Vec<String> {
    envelope(notes.iter().map(note_line).collect())
}
