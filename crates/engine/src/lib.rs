//! Mistbound engine: stores, persistence, versioning, and interchange for
//! the character sheet manager.
//!
//! The [`App`] facade owns the undo-enabled [`CharacterStore`] and
//! [`DrawerStore`] plus the settings store, and bridges them: global
//! undo/redo routing, `.cotm` file import/export, drag-and-drop between
//! sheet and drawer, and legacy file migration.

pub mod app;
pub mod error;
pub mod harmonize;
pub mod history;
pub mod interchange;
pub mod legacy;
pub mod reid;
pub mod settings;
pub mod storage;
pub mod stores;

pub use app::{App, ExportBundle};
pub use error::{ImportError, LegacyError};
pub use harmonize::{harmonize, APP_VERSION};
pub use interchange::{
    decode, export_file, export_filename, parse_import, ExportFile, ImportedContent,
    FILE_EXTENSION,
};
pub use legacy::{
    migrate_legacy_character, migrate_legacy_files, MigratedCharacterPayload, MigrationReport,
};
pub use reid::deep_re_id;
pub use settings::{Settings, SettingsStore, ThemeName};
pub use storage::{FileStorage, MemoryStorage, PersistEnvelope, StoragePort};
pub use stores::{CharacterStore, DrawerStore, ModificationTracker, PendingDrop, StoreKind};
