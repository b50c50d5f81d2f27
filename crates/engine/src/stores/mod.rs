//! The two undo/redo-enabled document stores and their shared
//! modification tracker.

pub mod character;
pub mod context;
pub mod drawer;

pub use character::{CharacterStore, CHARACTER_STORAGE_KEY};
pub use context::{ModificationTracker, StoreKind};
pub use drawer::{DrawerStore, PendingDrop, DRAWER_STORAGE_KEY};
