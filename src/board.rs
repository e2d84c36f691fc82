//! The single shared in-memory board: notes keyed by monotonic id, a set of
//! pin coordinates, and the operations that enforce every geometric
//! invariant across them. Guarded by a single readers/writer lock so that
//! every mutator is atomic and reads never observe half-applied mutations.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::config::BoardConfig;
use crate::error::BoardError;
use crate::geometry::{Point, Rect};

/// An immutable record created by `POST`. Never mutated after insertion;
/// removal (by `SHAKE` or `CLEAR`) is the only way it leaves the board.
#[derive(Debug, Clone)]
pub struct Note {
    pub id: u64,
    pub x: u32,
    pub y: u32,
    pub color: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl Note {
    fn rect(&self, config: &BoardConfig) -> Rect {
        Rect::new(self.x, self.y, config.note_w, config.note_h)
    }
}

/// A note plus its derived pinned-ness at the moment of a read.
#[derive(Debug, Clone)]
pub struct NoteView {
    pub note: Note,
    pub pinned: bool,
}

struct Inner {
    notes: HashMap<u64, Note>,
    pins: HashSet<Point>,
    next_id: u64,
}

/// Optional, ANDed filters for `getNotesFiltered`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteFilter {
    pub color: Option<String>,
    pub contains: Option<Point>,
    pub refers_to: Option<String>,
}

/// The shared board store. Construct once behind an `Arc` and clone that
/// handle into every session.
pub struct Board {
    config: BoardConfig,
    inner: RwLock<Inner>,
}

impl Board {
    pub fn new(config: BoardConfig) -> Self {
        Self {
            config,
            inner: RwLock::new(Inner {
                notes: HashMap::new(),
                pins: HashSet::new(),
                next_id: 1,
            }),
        }
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    /// Creates a note. Validates color, bounds, and overlap, in that order;
    /// the first failing check aborts before any mutation.
    pub fn post(&self, x: u32, y: u32, color_raw: &str, message: String) -> Result<u64, BoardError> {
        let color = self
            .config
            .canonicalize_color(color_raw)
            .ok_or_else(|| BoardError::InvalidColor(color_raw.to_ascii_uppercase()))?;

        let new_rect = Rect::new(x, y, self.config.note_w, self.config.note_h);
        if !new_rect.inside_board(self.config.board_w, self.config.board_h) {
            return Err(BoardError::OutOfBounds { x, y });
        }

        let mut inner = self.inner.write();
        if let Some(colliding) = inner
            .notes
            .values()
            .find(|n| new_rect.complete_overlap(&n.rect(&self.config)))
        {
            return Err(BoardError::Overlap { id: colliding.id });
        }

        let id = inner.next_id;
        inner.next_id += 1;
        inner.notes.insert(
            id,
            Note {
                id,
                x,
                y,
                color,
                message,
                created_at: Utc::now(),
            },
        );
        Ok(id)
    }

    /// Places a pin at `(x, y)`. Idempotent: re-pinning an already-present
    /// coordinate succeeds silently.
    pub fn pin(&self, x: u32, y: u32) -> Result<(), BoardError> {
        let mut inner = self.inner.write();
        let covered = inner
            .notes
            .values()
            .any(|n| n.rect(&self.config).contains_point(x, y));
        if !covered {
            return Err(BoardError::PinMiss { x, y });
        }
        inner.pins.insert(Point::new(x, y));
        Ok(())
    }

    /// Removes the pin at exactly `(x, y)`.
    pub fn unpin(&self, x: u32, y: u32) -> Result<(), BoardError> {
        let mut inner = self.inner.write();
        if !inner.pins.remove(&Point::new(x, y)) {
            return Err(BoardError::NoPin { x, y });
        }
        Ok(())
    }

    /// Removes every note that is not currently pinned. Pins themselves are
    /// never touched, so a pin whose notes all disappear becomes orphaned.
    /// Returns the number of notes removed.
    pub fn shake(&self) -> usize {
        let mut inner = self.inner.write();
        let pins: Vec<Point> = inner.pins.iter().copied().collect();
        let config = &self.config;
        let before = inner.notes.len();
        inner
            .notes
            .retain(|_, n| pins.iter().any(|p| n.rect(config).contains_point(p.x, p.y)));
        before - inner.notes.len()
    }

    /// Removes all notes and all pins. The id counter is not reset.
    pub fn clear(&self) {
        let mut inner = self.inner.write();
        inner.notes.clear();
        inner.pins.clear();
    }

    /// A snapshot of the pins, sorted ascending by `(y, x)`.
    pub fn get_pins_sorted(&self) -> Vec<Point> {
        let inner = self.inner.read();
        let mut pins: Vec<Point> = inner.pins.iter().copied().collect();
        pins.sort_by_key(|p| (p.y, p.x));
        pins
    }

    /// Notes matching every supplied filter, pinned-first then
    /// newest-first (descending id).
    pub fn get_notes_filtered(&self, filter: &NoteFilter) -> Result<Vec<NoteView>, BoardError> {
        let canonical_color = match &filter.color {
            Some(raw) => Some(
                self.config
                    .canonicalize_color(raw)
                    .ok_or_else(|| BoardError::InvalidColor(raw.to_ascii_uppercase()))?,
            ),
            None => None,
        };
        let refers_to_lower = filter.refers_to.as_ref().map(|s| s.to_lowercase());

        let inner = self.inner.read();
        let mut views: Vec<NoteView> = inner
            .notes
            .values()
            .filter(|n| canonical_color.as_deref().map_or(true, |c| c == n.color))
            .filter(|n| {
                filter
                    .contains
                    .map_or(true, |p| n.rect(&self.config).contains_point(p.x, p.y))
            })
            .filter(|n| {
                refers_to_lower
                    .as_deref()
                    .map_or(true, |needle| n.message.to_lowercase().contains(needle))
            })
            .map(|n| NoteView {
                pinned: inner.pins.iter().any(|p| n.rect(&self.config).contains_point(p.x, p.y)),
                note: n.clone(),
            })
            .collect();

        views.sort_by_key(|v| (!v.pinned, std::cmp::Reverse(v.note.id)));
        Ok(views)
    }
}
