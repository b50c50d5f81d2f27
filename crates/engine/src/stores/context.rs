//! Cross-store undo coordination.
//!
//! A single global undo/redo shortcut has to know which store committed
//! last. Both stores share one `ModificationTracker` through an injected
//! handle and mark it on every commit; undo and redo themselves leave it
//! untouched so a redo lands on the same store.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

/// Which store committed last.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Character,
    Drawer,
}

const NONE: u8 = 0;
const CHARACTER: u8 = 1;
const DRAWER: u8 = 2;

/// Shared, lock-free last-modified flag.
#[derive(Debug, Clone, Default)]
pub struct ModificationTracker(Arc<AtomicU8>);

impl ModificationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark(&self, kind: StoreKind) {
        let raw = match kind {
            StoreKind::Character => CHARACTER,
            StoreKind::Drawer => DRAWER,
        };
        self.0.store(raw, Ordering::Relaxed);
    }

    pub fn last_modified(&self) -> Option<StoreKind> {
        match self.0.load(Ordering::Relaxed) {
            CHARACTER => Some(StoreKind::Character),
            DRAWER => Some(StoreKind::Drawer),
            _ => None,
        }
    }
}
