//! Per-panel undo/redo history with dirty tracking (§4.C).
//!
//! History entries are immutable: `push` always clones the incoming stroke
//! list into a fresh [`std::rc::Rc`]-shared entry rather than mutating one
//! in place, so `undo`/`redo` only ever move entries between the two
//! stacks — matching §9's "immutable history with shared tails."

use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

/// One point of a freehand stroke.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StrokePoint {
    pub x: f64,
    pub y: f64,
}

/// A single freehand stroke, as stored in a `.draw` file (§6).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Stroke {
    pub id: String,
    pub points: Vec<StrokePoint>,
    pub color: String,
    pub width: f64,
}

/// One recorded state of the drawing: the full stroke list at a point in
/// time, plus when it was recorded.
#[derive(Clone, Debug, PartialEq)]
pub struct HistoryEntry {
    strokes: Rc<Vec<Stroke>>,
    timestamp: u128,
}

impl HistoryEntry {
    fn new(strokes: Vec<Stroke>, timestamp: u128) -> Self {
        Self { strokes: Rc::new(strokes), timestamp }
    }

    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    pub fn timestamp(&self) -> u128 {
        self.timestamp
    }

    fn same_identity(&self, other: &HistoryEntry) -> bool {
        Rc::ptr_eq(&self.strokes, &other.strokes)
    }
}

fn now_millis() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis()).unwrap_or(0)
}

/// Bounded undo/redo stacks with dirty tracking against a saved snapshot.
#[derive(Debug)]
pub struct HistoryState {
    undo_stack: Vec<HistoryEntry>,
    redo_stack: Vec<HistoryEntry>,
    max_size: usize,
    saved_entry: Option<HistoryEntry>,
}

impl HistoryState {
    /// A fresh, empty history bounded to `max_size` undo entries.
    pub fn new(max_size: usize) -> Self {
        assert!(max_size > 0, "max_size must be positive");
        Self { undo_stack: Vec::new(), redo_stack: Vec::new(), max_size, saved_entry: None }
    }

    /// Replaces the state with a single entry marked as the saved snapshot.
    /// Clears dirty.
    pub fn initialize(&mut self, strokes: Vec<Stroke>) {
        let entry = HistoryEntry::new(strokes, now_millis());
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.undo_stack.push(entry.clone());
        self.saved_entry = Some(entry);
        log::debug!("history initialized with {} strokes", self.current().map_or(0, |s| s.len()));
    }

    /// Appends a new current state, dropping the oldest entry past
    /// `max_size` and clearing the redo stack.
    pub fn push(&mut self, strokes: Vec<Stroke>) {
        let entry = HistoryEntry::new(strokes, now_millis());
        self.undo_stack.push(entry);
        if self.undo_stack.len() > self.max_size {
            self.undo_stack.remove(0);
        }
        self.redo_stack.clear();
        log::debug!("history push: undo depth now {}", self.undo_stack.len());
    }

    /// Undoes the most recent push. Requires more than one entry on the
    /// undo stack (the first entry is the baseline and can't be undone
    /// past). Returns the new current strokes, or `None` if there was
    /// nothing to undo.
    pub fn undo(&mut self) -> Option<&[Stroke]> {
        if self.undo_stack.len() <= 1 {
            return None;
        }
        let popped = self.undo_stack.pop().expect("length checked above");
        self.redo_stack.push(popped);
        log::debug!("history undo: undo depth now {}", self.undo_stack.len());
        self.current()
    }

    /// Redoes the most recently undone entry. Returns the new current
    /// strokes, or `None` if there was nothing to redo.
    pub fn redo(&mut self) -> Option<&[Stroke]> {
        let entry = self.redo_stack.pop()?;
        self.undo_stack.push(entry);
        log::debug!("history redo: undo depth now {}", self.undo_stack.len());
        self.current()
    }

    /// Marks the current top of the undo stack as saved.
    pub fn mark_saved(&mut self) {
        self.saved_entry = self.undo_stack.last().cloned();
    }

    /// Empties both stacks and clears the saved snapshot.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.saved_entry = None;
    }

    /// The current strokes (top of the undo stack), if any.
    pub fn current(&self) -> Option<&[Stroke]> {
        self.undo_stack.last().map(HistoryEntry::strokes)
    }

    pub fn can_undo(&self) -> bool {
        self.undo_stack.len() > 1
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// `true` if the current top differs (by identity) from the saved
    /// snapshot, or if there's no saved snapshot and any history exists.
    pub fn is_dirty(&self) -> bool {
        match (&self.saved_entry, self.undo_stack.last()) {
            (Some(saved), Some(top)) => !saved.same_identity(top),
            (Some(_), None) => true,
            (None, _) => !self.undo_stack.is_empty(),
        }
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }
}
