//! Application facade wiring the stores together: cross-store undo,
//! file import/export, and the drag-and-drop bridges between the sheet
//! and the drawer.

use std::sync::Arc;

use mistbound_domain::tree::find_folder;
use mistbound_domain::{CardId, DrawerItemContent, FolderId, GameSystem, ItemId, ItemKind};

use crate::error::ImportError;
use crate::interchange::{
    decode, drawer_export_filename, export_file, export_filename, parse_import, ImportedContent,
    FILE_EXTENSION,
};
use crate::legacy::{migrate_legacy_files, MigrationReport};
use crate::reid::deep_re_id;
use crate::settings::SettingsStore;
use crate::storage::StoragePort;
use crate::stores::{CharacterStore, DrawerStore, ModificationTracker, StoreKind};

/// A ready-to-write export: suggested filename plus file contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportBundle {
    pub filename: String,
    pub contents: String,
}

fn bundle(base_name: String, contents: Result<String, ImportError>) -> Option<ExportBundle> {
    match contents {
        Ok(contents) => Some(ExportBundle {
            filename: format!("{base_name}.{FILE_EXTENSION}"),
            contents,
        }),
        Err(error) => {
            tracing::error!(%error, "export serialization failed");
            None
        }
    }
}

fn content_game(content: &DrawerItemContent) -> GameSystem {
    match content {
        DrawerItemContent::Card(card) => card.details.game(),
        DrawerItemContent::Tracker(tracker) => tracker.game(),
        DrawerItemContent::Character(character) => character.game,
    }
}

/// All stores behind one handle, sharing a storage backend and the
/// modification tracker that routes global undo/redo.
pub struct App {
    pub character: CharacterStore,
    pub drawer: DrawerStore,
    pub settings: SettingsStore,
    tracker: ModificationTracker,
}

impl App {
    pub fn new(storage: Arc<dyn StoragePort>) -> Self {
        let tracker = ModificationTracker::new();
        Self {
            character: CharacterStore::new(storage.clone(), tracker.clone()),
            drawer: DrawerStore::new(storage.clone(), tracker.clone()),
            settings: SettingsStore::new(storage),
            tracker,
        }
    }

    // --- Cross-store undo/redo ---

    /// Undo in whichever store committed last. Nothing committed yet (or
    /// nothing left to undo there) is a no-op.
    pub fn undo(&mut self) -> bool {
        match self.tracker.last_modified() {
            Some(StoreKind::Character) => self.character.undo(),
            Some(StoreKind::Drawer) => self.drawer.undo(),
            None => false,
        }
    }

    /// Redo in whichever store committed last.
    pub fn redo(&mut self) -> bool {
        match self.tracker.last_modified() {
            Some(StoreKind::Character) => self.character.redo(),
            Some(StoreKind::Drawer) => self.drawer.redo(),
            None => false,
        }
    }

    // --- File import ---

    /// Import a `.cotm` file, routing its content by declared type: whole
    /// drawers and folders go to the drawer, everything else onto the
    /// sheet. Returns the imported kind for user messaging.
    pub fn import_file(&mut self, raw: &str) -> Result<ItemKind, ImportError> {
        let file = parse_import(raw)?;
        let kind = file.file_type;
        let game_missing = file
            .content
            .get("game")
            .map_or(true, serde_json::Value::is_null);
        match decode(file)? {
            ImportedContent::Drawer(drawer) => self.drawer.import_full_drawer(&drawer, None),
            ImportedContent::Folder(folder) => {
                self.drawer.add_imported_folder(&folder, None);
            }
            ImportedContent::Character(character) => {
                self.character.load_character(deep_re_id(&character));
            }
            ImportedContent::Card(card) => self.character.add_imported_card(card, None),
            ImportedContent::Tracker(mut tracker) => {
                // A tracker payload with no game stamp of its own lands
                // on the loaded character's game, not the envelope's.
                if game_missing {
                    if let Some(character) = self.character.character() {
                        tracker.set_game(character.game);
                    }
                }
                self.character.add_imported_tracker(tracker, None);
            }
        }
        Ok(kind)
    }

    /// Import a `.cotm` file straight into the drawer under `parent`.
    /// Sheet-level content becomes a drawer item instead of touching the
    /// loaded character.
    pub fn import_file_into_drawer(
        &mut self,
        raw: &str,
        parent: Option<FolderId>,
    ) -> Result<ItemKind, ImportError> {
        let file = parse_import(raw)?;
        let kind = file.file_type;
        match decode(file)? {
            ImportedContent::Drawer(drawer) => self.drawer.import_full_drawer(&drawer, parent),
            ImportedContent::Folder(folder) => {
                self.drawer.add_imported_folder(&folder, parent);
            }
            ImportedContent::Character(character) => {
                let game = character.game;
                self.drawer
                    .add_imported_item(game, &DrawerItemContent::Character(character), parent);
            }
            ImportedContent::Card(card) => {
                let game = card.details.game();
                self.drawer
                    .add_imported_item(game, &DrawerItemContent::Card(card), parent);
            }
            ImportedContent::Tracker(tracker) => {
                let game = tracker.game();
                self.drawer
                    .add_imported_item(game, &DrawerItemContent::Tracker(tracker), parent);
            }
        }
        Ok(kind)
    }

    // --- Drag and drop bridges ---

    /// Drop a drawer item onto the sheet. Cards and trackers are inserted
    /// at `index`; a full character replaces the loaded one. The drawer
    /// copy stays where it is.
    pub fn drop_drawer_item_on_sheet(&mut self, item_id: ItemId, index: Option<usize>) {
        let Some(item) = self.drawer.item(item_id) else {
            tracing::warn!(%item_id, "dropped drawer item no longer exists");
            return;
        };
        match item.content.clone() {
            DrawerItemContent::Card(card) => self.character.add_imported_card(card, index),
            DrawerItemContent::Tracker(tracker) => {
                self.character.add_imported_tracker(tracker, index);
            }
            DrawerItemContent::Character(character) => {
                self.character.load_character(deep_re_id(&character));
            }
        }
    }

    /// Drop sheet content onto the drawer: opens the naming handshake on
    /// the drawer store; nothing is stored until the drop is confirmed.
    pub fn drop_sheet_content_on_drawer(
        &mut self,
        content: DrawerItemContent,
        parent: Option<FolderId>,
    ) {
        let game = content_game(&content);
        self.drawer.initiate_item_drop(game, content, parent);
    }

    /// Confirm the pending drop under `name`. Returns the stored item's id.
    pub fn confirm_pending_drop(&mut self, name: &str) -> Option<ItemId> {
        self.drawer.add_item(name)
    }

    pub fn cancel_pending_drop(&mut self) {
        self.drawer.clear_pending_item_drop();
    }

    // --- File export ---

    pub fn export_character(&self) -> Option<ExportBundle> {
        let character = self.character.character()?;
        let base = export_filename(
            character.game,
            ItemKind::FullCharacterSheet,
            Some(&character.name),
        );
        bundle(
            base,
            export_file(character, ItemKind::FullCharacterSheet, character.game),
        )
    }

    pub fn export_card(&self, card_id: CardId) -> Option<ExportBundle> {
        let character = self.character.character()?;
        let card = character.card(card_id)?;
        let kind = card.card_type.item_kind();
        let game = card.details.game();
        bundle(
            export_filename(game, kind, Some(&character.name)),
            export_file(card, kind, game),
        )
    }

    pub fn export_drawer(&self) -> Option<ExportBundle> {
        bundle(
            drawer_export_filename(),
            export_file(
                self.drawer.drawer(),
                ItemKind::FullDrawer,
                GameSystem::Neutral,
            ),
        )
    }

    pub fn export_folder(&self, folder_id: FolderId) -> Option<ExportBundle> {
        let folder = find_folder(&self.drawer.drawer().folders, folder_id)?;
        bundle(
            export_filename(GameSystem::Neutral, ItemKind::Folder, Some(&folder.name)),
            export_file(folder, ItemKind::Folder, GameSystem::Neutral),
        )
    }

    pub fn export_drawer_item(&self, item_id: ItemId) -> Option<ExportBundle> {
        let item = self.drawer.item(item_id)?;
        bundle(
            export_filename(item.game, item.kind, Some(&item.name)),
            export_file(&item.content, item.kind, item.game),
        )
    }

    // --- Legacy migration ---

    /// Migrate a batch of legacy character files into the drawer.
    pub fn migrate_legacy(&mut self, files: &[(String, String)]) -> MigrationReport {
        migrate_legacy_files(&mut self.drawer, files)
    }
}
