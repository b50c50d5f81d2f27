//! Full-state snapshot undo/redo.
//!
//! Each store keeps one `History` over its persisted document field only;
//! transient flags (the pending drop slot) never enter a snapshot.

use std::mem;

/// Snapshot stacks around a present state. Undo is disabled until at least
/// one commit has happened; the initial state is not itself undoable.
#[derive(Debug, Clone)]
pub struct History<T: Clone> {
    present: T,
    past: Vec<T>,
    future: Vec<T>,
}

impl<T: Clone> History<T> {
    pub fn new(initial: T) -> Self {
        Self {
            present: initial,
            past: Vec::new(),
            future: Vec::new(),
        }
    }

    pub fn present(&self) -> &T {
        &self.present
    }

    /// Commit a new present state. Any redoable future is discarded.
    pub fn commit(&mut self, next: T) {
        let previous = mem::replace(&mut self.present, next);
        self.past.push(previous);
        self.future.clear();
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    /// Step back one state. Returns whether anything changed.
    pub fn undo(&mut self) -> bool {
        match self.past.pop() {
            Some(previous) => {
                let current = mem::replace(&mut self.present, previous);
                self.future.push(current);
                true
            }
            None => false,
        }
    }

    /// Step forward one state. Returns whether anything changed.
    pub fn redo(&mut self) -> bool {
        match self.future.pop() {
            Some(next) => {
                let current = mem::replace(&mut self.present, next);
                self.past.push(current);
                true
            }
            None => false,
        }
    }
}
