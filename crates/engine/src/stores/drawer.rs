//! Drawer store: owns the folder/item library and the pending-drop
//! handshake.
//!
//! The document under undo is the drawer tree alone. The pending drop is
//! deliberately outside it: a half-finished drag must not be undoable and
//! must not survive a restart, so it lives next to the history rather than
//! inside it and is skipped by persistence.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use mistbound_domain::tree::{
    add_folder_recursively, add_item_recursively, delete_folder_recursively,
    delete_item_recursively, find_and_remove_folder, find_and_remove_item, find_folder, find_item,
    is_descendant, merge_into_folder_recursively, rename_folder_recursively,
    rename_item_recursively, reorder_folders_recursively, reorder_items_recursively, reorder_list,
};
use mistbound_domain::{
    Drawer, DrawerItem, DrawerItemContent, Folder, FolderId, GameSystem, ItemId, ItemKind,
};

use crate::harmonize::harmonize;
use crate::history::History;
use crate::reid::deep_re_id;
use crate::storage::{PersistEnvelope, StoragePort};
use crate::stores::context::{ModificationTracker, StoreKind};

pub const DRAWER_STORAGE_KEY: &str = "mistbound_drawer-storage";

/// A drag that has left the sheet but has not been named yet. Confirming
/// it turns it into a [`DrawerItem`]; cancelling discards it.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingDrop {
    pub game: GameSystem,
    pub kind: ItemKind,
    pub content: DrawerItemContent,
    pub parent_folder_id: Option<FolderId>,
    pub default_name: String,
}

/// The persisted slice: the tree only, never the pending drop.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct DrawerSlice {
    drawer: Drawer,
}

pub struct DrawerStore {
    history: History<Drawer>,
    pending_drop: Option<PendingDrop>,
    storage: Arc<dyn StoragePort>,
    tracker: ModificationTracker,
}

impl DrawerStore {
    /// Open the store, restoring (and harmonizing) any persisted tree.
    pub fn new(storage: Arc<dyn StoragePort>, tracker: ModificationTracker) -> Self {
        let initial = Self::restore(storage.as_ref()).unwrap_or_default();
        Self {
            history: History::new(initial),
            pending_drop: None,
            storage,
            tracker,
        }
    }

    fn restore(storage: &dyn StoragePort) -> Option<Drawer> {
        let raw = storage.load(DRAWER_STORAGE_KEY)?;
        let envelope: Value = match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(error) => {
                tracing::warn!(%error, "drawer storage is unreadable; starting empty");
                return None;
            }
        };
        let drawer = envelope.pointer("/state/drawer")?.clone();
        let harmonized = harmonize(drawer, ItemKind::FullDrawer);
        match serde_json::from_value(harmonized) {
            Ok(drawer) => {
                tracing::info!("drawer state restored");
                Some(drawer)
            }
            Err(error) => {
                tracing::warn!(%error, "persisted drawer does not deserialize; starting empty");
                None
            }
        }
    }

    pub fn drawer(&self) -> &Drawer {
        self.history.present()
    }

    pub fn pending_drop(&self) -> Option<&PendingDrop> {
        self.pending_drop.as_ref()
    }

    /// Look an item up anywhere in the tree, root items included.
    pub fn item(&self, item_id: ItemId) -> Option<&DrawerItem> {
        let drawer = self.drawer();
        drawer
            .root_items
            .iter()
            .find(|item| item.id == item_id)
            .or_else(|| find_item(&drawer.folders, item_id))
    }

    fn persist(&self) {
        let slice = DrawerSlice {
            drawer: self.history.present().clone(),
        };
        match serde_json::to_string(&PersistEnvelope::new(slice)) {
            Ok(json) => self.storage.save(DRAWER_STORAGE_KEY, &json),
            Err(error) => tracing::error!(%error, "failed to serialize drawer state"),
        }
    }

    fn update<F>(&mut self, mutate: F)
    where
        F: FnOnce(&mut Drawer),
    {
        let mut next = self.history.present().clone();
        mutate(&mut next);
        if *self.history.present() == next {
            return;
        }
        self.tracker.mark(StoreKind::Drawer);
        self.history.commit(next);
        self.persist();
        tracing::debug!("drawer state committed");
    }

    // --- Whole-drawer actions ---

    /// Merge an imported drawer into this one, re-identified throughout:
    /// concatenated at the top level, or folded into `parent` when given.
    pub fn import_full_drawer(&mut self, drawer: &Drawer, parent: Option<FolderId>) {
        let incoming = deep_re_id(drawer);
        self.update(|current| match parent {
            None => {
                current.folders.extend(incoming.folders);
                current.root_items.extend(incoming.root_items);
            }
            Some(parent_id) => {
                current.folders = merge_into_folder_recursively(
                    &current.folders,
                    parent_id,
                    &incoming.folders,
                    &incoming.root_items,
                );
            }
        });
    }

    // --- Folder actions ---

    /// Create an empty folder under `parent` (root when `None`). Returns
    /// the new folder's id; a stale parent id leaves the tree untouched.
    pub fn add_folder(&mut self, name: &str, parent: Option<FolderId>) -> FolderId {
        let folder = Folder::new(name);
        let folder_id = folder.id;
        self.update(|drawer| match parent {
            None => drawer.folders.push(folder),
            Some(parent_id) => {
                drawer.folders = add_folder_recursively(&drawer.folders, &folder, parent_id);
            }
        });
        folder_id
    }

    /// Insert an imported folder subtree with fresh ids throughout.
    pub fn add_imported_folder(&mut self, folder: &Folder, parent: Option<FolderId>) -> FolderId {
        let mut folder = deep_re_id(folder);
        reset_folder_transient(&mut folder);
        let folder_id = folder.id;
        self.update(|drawer| match parent {
            None => drawer.folders.push(folder),
            Some(parent_id) => {
                drawer.folders = add_folder_recursively(&drawer.folders, &folder, parent_id);
            }
        });
        folder_id
    }

    pub fn rename_folder(&mut self, folder_id: FolderId, name: &str) {
        self.update(|drawer| {
            drawer.folders = rename_folder_recursively(&drawer.folders, folder_id, name);
        });
    }

    /// Delete a folder and everything inside it.
    pub fn delete_folder(&mut self, folder_id: FolderId) {
        self.update(|drawer| {
            drawer.folders = delete_folder_recursively(&drawer.folders, folder_id);
        });
    }

    /// Move a folder under `destination` (root when `None`).
    ///
    /// Rejected moves are silent no-ops: onto itself, into its own subtree,
    /// or into a destination that no longer exists. The destination is
    /// checked before the folder is extracted so a rejected move can never
    /// lose the node.
    pub fn move_folder(&mut self, folder_id: FolderId, destination: Option<FolderId>) {
        if destination == Some(folder_id) {
            tracing::warn!(%folder_id, "ignoring move of a folder onto itself");
            return;
        }
        if let Some(dest_id) = destination {
            let folders = &self.drawer().folders;
            if find_folder(folders, dest_id).is_none() {
                tracing::warn!(%dest_id, "ignoring folder move to a missing destination");
                return;
            }
            if is_descendant(folders, folder_id, dest_id) {
                tracing::warn!(%folder_id, %dest_id, "ignoring folder move into its own subtree");
                return;
            }
        }
        self.update(|drawer| {
            let (moved, remaining) = find_and_remove_folder(&drawer.folders, folder_id);
            let Some(moved) = moved else {
                return;
            };
            drawer.folders = match destination {
                None => {
                    let mut folders = remaining;
                    folders.push(moved);
                    folders
                }
                Some(dest_id) => add_folder_recursively(&remaining, &moved, dest_id),
            };
        });
    }

    /// Reorder the sub-folders of `parent` (root folders when `None`).
    pub fn reorder_folders(&mut self, parent: Option<FolderId>, old_index: usize, new_index: usize) {
        self.update(|drawer| {
            drawer.folders = match parent {
                None => reorder_list(&drawer.folders, old_index, new_index),
                Some(parent_id) => {
                    reorder_folders_recursively(&drawer.folders, parent_id, old_index, new_index)
                }
            };
        });
    }

    // --- Item actions ---

    /// First half of the drop handshake: stash the dragged content until
    /// the user names it. A new drag overwrites an unconfirmed one.
    pub fn initiate_item_drop(
        &mut self,
        game: GameSystem,
        mut content: DrawerItemContent,
        parent_folder_id: Option<FolderId>,
    ) {
        content.reset_transient();
        self.pending_drop = Some(PendingDrop {
            game,
            kind: content.item_kind(),
            default_name: content.display_name().to_string(),
            content,
            parent_folder_id,
        });
    }

    pub fn clear_pending_item_drop(&mut self) {
        self.pending_drop = None;
    }

    /// Second half of the handshake: materialize the pending drop as an
    /// item named `name` (the content's own name when empty). Returns
    /// `None` when no drop is pending.
    pub fn add_item(&mut self, name: &str) -> Option<ItemId> {
        let pending = self.pending_drop.take()?;
        let name = if name.trim().is_empty() {
            pending.default_name
        } else {
            name.to_string()
        };
        let item = DrawerItem {
            id: ItemId::new(),
            game: pending.game,
            kind: pending.kind,
            name,
            content: pending.content,
        };
        let item_id = item.id;
        self.update(|drawer| insert_item(drawer, item, pending.parent_folder_id));
        Some(item_id)
    }

    /// Insert imported content directly, bypassing the drop handshake.
    pub fn add_imported_item(
        &mut self,
        game: GameSystem,
        content: &DrawerItemContent,
        parent: Option<FolderId>,
    ) -> ItemId {
        let mut content = deep_re_id(content);
        content.reset_transient();
        let item = DrawerItem {
            id: ItemId::new(),
            game,
            kind: content.item_kind(),
            name: content.display_name().to_string(),
            content,
        };
        let item_id = item.id;
        self.update(|drawer| insert_item(drawer, item, parent));
        item_id
    }

    pub fn rename_item(&mut self, item_id: ItemId, name: &str) {
        self.update(|drawer| {
            for item in &mut drawer.root_items {
                if item.id == item_id {
                    item.name = name.to_string();
                }
            }
            drawer.folders = rename_item_recursively(&drawer.folders, item_id, name);
        });
    }

    pub fn delete_item(&mut self, item_id: ItemId) {
        self.update(|drawer| {
            drawer.root_items.retain(|item| item.id != item_id);
            drawer.folders = delete_item_recursively(&drawer.folders, item_id);
        });
    }

    /// Move an item into `destination` (root when `None`). The destination
    /// is checked before extraction; a missing one makes the move a no-op.
    pub fn move_item(&mut self, item_id: ItemId, destination: Option<FolderId>) {
        if let Some(dest_id) = destination {
            if find_folder(&self.drawer().folders, dest_id).is_none() {
                tracing::warn!(%dest_id, "ignoring item move to a missing destination");
                return;
            }
        }
        self.update(|drawer| {
            let moved;
            if let Some(index) = drawer.root_items.iter().position(|i| i.id == item_id) {
                moved = drawer.root_items.remove(index);
            } else {
                let (found, remaining) = find_and_remove_item(&drawer.folders, item_id);
                let Some(found) = found else {
                    return;
                };
                drawer.folders = remaining;
                moved = found;
            }
            insert_item(drawer, moved, destination);
        });
    }

    /// Reorder the items of `parent` (root items when `None`).
    pub fn reorder_items(&mut self, parent: Option<FolderId>, old_index: usize, new_index: usize) {
        self.update(|drawer| match parent {
            None => drawer.root_items = reorder_list(&drawer.root_items, old_index, new_index),
            Some(parent_id) => {
                drawer.folders =
                    reorder_items_recursively(&drawer.folders, parent_id, old_index, new_index);
            }
        });
    }

    // --- Time travel ---

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo(&mut self) -> bool {
        let changed = self.history.undo();
        if changed {
            self.persist();
        }
        changed
    }

    pub fn redo(&mut self) -> bool {
        let changed = self.history.redo();
        if changed {
            self.persist();
        }
        changed
    }
}

/// Place an item under `parent`; a stale parent id falls back to the root
/// rather than dropping the item.
fn insert_item(drawer: &mut Drawer, item: DrawerItem, parent: Option<FolderId>) {
    match parent {
        Some(parent_id) if find_folder(&drawer.folders, parent_id).is_some() => {
            drawer.folders = add_item_recursively(&drawer.folders, &item, parent_id);
        }
        Some(parent_id) => {
            tracing::warn!(%parent_id, "parent folder is gone; placing item at the root");
            drawer.root_items.push(item);
        }
        None => drawer.root_items.push(item),
    }
}

fn reset_folder_transient(folder: &mut Folder) {
    for item in &mut folder.items {
        item.content.reset_transient();
    }
    for sub in &mut folder.folders {
        reset_folder_transient(sub);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use mistbound_domain::tree::find_item_folder;
    use mistbound_domain::{Card, StatusTracker, Tracker};

    fn store() -> DrawerStore {
        DrawerStore::new(Arc::new(MemoryStorage::new()), ModificationTracker::new())
    }

    fn tracker_content(name: &str) -> DrawerItemContent {
        DrawerItemContent::Tracker(Tracker::Status(StatusTracker::new(
            name,
            GameSystem::Legends,
        )))
    }

    fn count_folders(folders: &[Folder]) -> usize {
        folders.iter().map(|f| 1 + count_folders(&f.folders)).sum()
    }

    #[test]
    fn test_add_folder_at_root_and_nested() {
        let mut store = store();
        let act_one = store.add_folder("Act 1", None);
        let heroes = store.add_folder("Heroes", Some(act_one));

        let drawer = store.drawer();
        assert_eq!(drawer.folders.len(), 1);
        assert_eq!(drawer.folders[0].id, act_one);
        assert_eq!(drawer.folders[0].folders[0].id, heroes);
    }

    #[test]
    fn test_add_folder_under_stale_parent_changes_nothing() {
        let mut store = store();
        store.add_folder("Lost", Some(FolderId::new()));
        assert!(store.drawer().folders.is_empty());
        assert!(!store.can_undo());
    }

    #[test]
    fn test_drop_handshake_confirm() {
        let mut store = store();
        let folder = store.add_folder("Trackers", None);

        let mut card = Card::hero("Aria", 0);
        card.is_flipped = true;
        store.initiate_item_drop(GameSystem::Legends, DrawerItemContent::Card(card), Some(folder));
        let pending = store.pending_drop().expect("pending drop");
        assert_eq!(pending.kind, ItemKind::CharacterCard);
        assert_eq!(pending.default_name, "Hero Card");

        let item_id = store.add_item("Aria's hero card").expect("confirmed");
        assert!(store.pending_drop().is_none());

        let item = store.item(item_id).expect("stored item");
        assert_eq!(item.name, "Aria's hero card");
        match &item.content {
            DrawerItemContent::Card(card) => assert!(!card.is_flipped),
            other => panic!("expected card content, got {other:?}"),
        }
        assert_eq!(
            find_item_folder(&store.drawer().folders, item_id).map(|f| f.id),
            Some(folder)
        );
    }

    #[test]
    fn test_drop_handshake_blank_name_uses_default() {
        let mut store = store();
        store.initiate_item_drop(GameSystem::Legends, tracker_content("Bleeding"), None);
        let item_id = store.add_item("  ").expect("confirmed");
        assert_eq!(store.item(item_id).expect("item").name, "Bleeding");
    }

    #[test]
    fn test_drop_handshake_cancel_and_overwrite() {
        let mut store = store();
        store.initiate_item_drop(GameSystem::Legends, tracker_content("First"), None);
        store.initiate_item_drop(GameSystem::Legends, tracker_content("Second"), None);
        assert_eq!(
            store.pending_drop().expect("pending").default_name,
            "Second"
        );

        store.clear_pending_item_drop();
        assert!(store.pending_drop().is_none());
        assert!(store.add_item("anything").is_none());
        assert!(store.drawer().root_items.is_empty());
    }

    #[test]
    fn test_move_folder_conserves_tree() {
        let mut store = store();
        let act_one = store.add_folder("Act 1", None);
        let heroes = store.add_folder("Heroes", Some(act_one));
        let scraps = store.add_folder("Scraps", None);
        let before = count_folders(&store.drawer().folders);

        store.move_folder(heroes, Some(scraps));

        let drawer = store.drawer();
        assert_eq!(count_folders(&drawer.folders), before);
        assert!(find_folder(&drawer.folders, act_one)
            .expect("act one")
            .folders
            .is_empty());
        assert_eq!(
            find_folder(&drawer.folders, scraps).expect("scraps").folders[0].id,
            heroes
        );
    }

    #[test]
    fn test_move_folder_rejections_are_noops() {
        let mut store = store();
        let act_one = store.add_folder("Act 1", None);
        let heroes = store.add_folder("Heroes", Some(act_one));
        let before = store.drawer().clone();

        store.move_folder(act_one, Some(act_one)); // onto itself
        store.move_folder(act_one, Some(heroes)); // into own subtree
        store.move_folder(act_one, Some(FolderId::new())); // missing destination
        store.move_folder(FolderId::new(), None); // missing folder

        assert_eq!(*store.drawer(), before);
    }

    #[test]
    fn test_move_folder_to_root() {
        let mut store = store();
        let act_one = store.add_folder("Act 1", None);
        let heroes = store.add_folder("Heroes", Some(act_one));

        store.move_folder(heroes, None);

        let drawer = store.drawer();
        assert_eq!(drawer.folders.len(), 2);
        assert_eq!(drawer.folders[1].id, heroes);
    }

    #[test]
    fn test_move_item_between_root_and_folder() {
        let mut store = store();
        let folder = store.add_folder("Trackers", None);
        let item_id = store.add_imported_item(GameSystem::Legends, &tracker_content("Dazed"), None);
        assert_eq!(store.drawer().root_items.len(), 1);

        store.move_item(item_id, Some(folder));
        assert!(store.drawer().root_items.is_empty());
        assert_eq!(
            find_item_folder(&store.drawer().folders, item_id).map(|f| f.id),
            Some(folder)
        );

        store.move_item(item_id, None);
        assert_eq!(store.drawer().root_items.len(), 1);
    }

    #[test]
    fn test_move_item_to_missing_destination_is_noop() {
        let mut store = store();
        let item_id = store.add_imported_item(GameSystem::Legends, &tracker_content("Dazed"), None);
        store.move_item(item_id, Some(FolderId::new()));
        assert_eq!(store.drawer().root_items.len(), 1);
    }

    #[test]
    fn test_imported_content_gets_fresh_ids() {
        let mut store = store();
        let content = tracker_content("Dazed");
        let original_id = match &content {
            DrawerItemContent::Tracker(tracker) => tracker.id(),
            other => panic!("expected tracker content, got {other:?}"),
        };
        let item_id = store.add_imported_item(GameSystem::Legends, &content, None);
        match &store.item(item_id).expect("item").content {
            DrawerItemContent::Tracker(tracker) => assert_ne!(tracker.id(), original_id),
            other => panic!("expected tracker content, got {other:?}"),
        }
    }

    fn incoming_drawer() -> (Drawer, Folder) {
        let mut incoming = Drawer::default();
        let mut folder = Folder::new("Imported");
        folder.items.push(DrawerItem {
            id: ItemId::new(),
            game: GameSystem::Legends,
            kind: ItemKind::StatusTracker,
            name: "Dazed".to_string(),
            content: tracker_content("Dazed"),
        });
        incoming.folders.push(folder.clone());
        (incoming, folder)
    }

    #[test]
    fn test_import_full_drawer_concatenates_at_top_level() {
        let mut store = store();
        store.add_folder("Old", None);

        let (incoming, folder) = incoming_drawer();
        store.import_full_drawer(&incoming, None);

        let drawer = store.drawer();
        assert_eq!(drawer.folders.len(), 2);
        assert_eq!(drawer.folders[1].name, "Imported");
        assert_ne!(drawer.folders[1].id, folder.id);
        assert_ne!(drawer.folders[1].items[0].id, folder.items[0].id);
    }

    #[test]
    fn test_import_full_drawer_merges_into_destination() {
        let mut store = store();
        let dest = store.add_folder("Library", None);

        let (incoming, _) = incoming_drawer();
        store.import_full_drawer(&incoming, Some(dest));

        let library = find_folder(&store.drawer().folders, dest).expect("library");
        assert_eq!(library.folders.len(), 1);
        assert_eq!(library.folders[0].name, "Imported");
    }

    #[test]
    fn test_reorder_root_folders() {
        let mut store = store();
        let a = store.add_folder("A", None);
        let b = store.add_folder("B", None);
        store.reorder_folders(None, 0, 1);
        let ids: Vec<FolderId> = store.drawer().folders.iter().map(|f| f.id).collect();
        assert_eq!(ids, vec![b, a]);
    }

    #[test]
    fn test_undo_redo_tree_changes() {
        let mut store = store();
        let folder = store.add_folder("Act 1", None);
        store.rename_folder(folder, "Act One");

        assert!(store.undo());
        assert_eq!(store.drawer().folders[0].name, "Act 1");
        assert!(store.undo());
        assert!(store.drawer().folders.is_empty());
        assert!(!store.undo());

        assert!(store.redo());
        assert_eq!(store.drawer().folders.len(), 1);
    }

    #[test]
    fn test_persists_and_restores() {
        let storage: Arc<MemoryStorage> = Arc::new(MemoryStorage::new());
        {
            let mut store = DrawerStore::new(storage.clone(), ModificationTracker::new());
            let folder = store.add_folder("Act 1", None);
            store.add_imported_item(
                GameSystem::Legends,
                &tracker_content("Dazed"),
                Some(folder),
            );
            store.initiate_item_drop(GameSystem::Legends, tracker_content("Lost"), None);
        }
        let reopened = DrawerStore::new(storage, ModificationTracker::new());
        assert_eq!(reopened.drawer().folders[0].name, "Act 1");
        assert_eq!(reopened.drawer().folders[0].items.len(), 1);
        // the pending drop never reaches storage
        assert!(reopened.pending_drop().is_none());
        assert!(!reopened.can_undo());
    }
}
