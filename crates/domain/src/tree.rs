//! Pure recursive functions over the immutable drawer forest.
//!
//! Every mutating function takes the forest plus target ids/payloads and
//! returns a new forest, rebuilding only the path to the touched node.
//! Operating on an id that does not exist returns the input structurally
//! unchanged rather than erroring: the UI races mutations against undo,
//! and a stale id must never corrupt the tree.

use crate::drawer::{DrawerItem, Folder};
use crate::ids::{FolderId, ItemId};

/// Depth-first search for a folder by id.
pub fn find_folder(folders: &[Folder], id: FolderId) -> Option<&Folder> {
    for folder in folders {
        if folder.id == id {
            return Some(folder);
        }
        if let Some(found) = find_folder(&folder.folders, id) {
            return Some(found);
        }
    }
    None
}

/// The folder whose direct `folders` list contains `child_id`, or `None`
/// if `child_id` lives at the root (or nowhere).
pub fn find_parent_folder(folders: &[Folder], child_id: FolderId) -> Option<&Folder> {
    for folder in folders {
        if folder.folders.iter().any(|f| f.id == child_id) {
            return Some(folder);
        }
        if let Some(found) = find_parent_folder(&folder.folders, child_id) {
            return Some(found);
        }
    }
    None
}

/// Depth-first search for an item by id.
pub fn find_item(folders: &[Folder], item_id: ItemId) -> Option<&DrawerItem> {
    for folder in folders {
        if let Some(item) = folder.items.iter().find(|i| i.id == item_id) {
            return Some(item);
        }
        if let Some(found) = find_item(&folder.folders, item_id) {
            return Some(found);
        }
    }
    None
}

/// The folder whose direct `items` list contains `item_id`.
pub fn find_item_folder(folders: &[Folder], item_id: ItemId) -> Option<&Folder> {
    for folder in folders {
        if folder.items.iter().any(|i| i.id == item_id) {
            return Some(folder);
        }
        if let Some(found) = find_item_folder(&folder.folders, item_id) {
            return Some(found);
        }
    }
    None
}

/// Whether `candidate` lives anywhere inside the subtree rooted at
/// `ancestor`. Used to reject folder moves that would create a cycle.
pub fn is_descendant(folders: &[Folder], ancestor: FolderId, candidate: FolderId) -> bool {
    match find_folder(folders, ancestor) {
        Some(folder) => find_folder(&folder.folders, candidate).is_some(),
        None => false,
    }
}

pub fn add_folder_recursively(
    folders: &[Folder],
    new_folder: &Folder,
    parent_id: FolderId,
) -> Vec<Folder> {
    folders
        .iter()
        .map(|folder| {
            let mut folder = folder.clone();
            if folder.id == parent_id {
                folder.folders.push(new_folder.clone());
            } else {
                folder.folders = add_folder_recursively(&folder.folders, new_folder, parent_id);
            }
            folder
        })
        .collect()
}

pub fn rename_folder_recursively(
    folders: &[Folder],
    folder_id: FolderId,
    new_name: &str,
) -> Vec<Folder> {
    folders
        .iter()
        .map(|folder| {
            let mut folder = folder.clone();
            if folder.id == folder_id {
                folder.name = new_name.to_string();
            } else {
                folder.folders = rename_folder_recursively(&folder.folders, folder_id, new_name);
            }
            folder
        })
        .collect()
}

pub fn delete_folder_recursively(folders: &[Folder], folder_id: FolderId) -> Vec<Folder> {
    folders
        .iter()
        .filter(|folder| folder.id != folder_id)
        .map(|folder| {
            let mut folder = folder.clone();
            folder.folders = delete_folder_recursively(&folder.folders, folder_id);
            folder
        })
        .collect()
}

/// Extract a folder and the forest without it in one logical transaction,
/// so a move can re-insert the very node it removed. When the id is not
/// found the extracted slot is `None` and the forest equals the input.
pub fn find_and_remove_folder(
    folders: &[Folder],
    folder_id: FolderId,
) -> (Option<Folder>, Vec<Folder>) {
    let mut found = None;
    let updated = remove_folder_inner(folders, folder_id, &mut found);
    (found, updated)
}

fn remove_folder_inner(
    folders: &[Folder],
    folder_id: FolderId,
    found: &mut Option<Folder>,
) -> Vec<Folder> {
    if folders.iter().any(|f| f.id == folder_id) {
        return folders
            .iter()
            .filter(|f| {
                if f.id == folder_id {
                    *found = Some((*f).clone());
                    false
                } else {
                    true
                }
            })
            .cloned()
            .collect();
    }
    folders
        .iter()
        .map(|folder| {
            let mut folder = folder.clone();
            folder.folders = remove_folder_inner(&folder.folders, folder_id, found);
            folder
        })
        .collect()
}

pub fn reorder_folders_recursively(
    folders: &[Folder],
    parent_id: FolderId,
    old_index: usize,
    new_index: usize,
) -> Vec<Folder> {
    folders
        .iter()
        .map(|folder| {
            let mut folder = folder.clone();
            if folder.id == parent_id {
                folder.folders = reorder_list(&folder.folders, old_index, new_index);
            } else {
                folder.folders =
                    reorder_folders_recursively(&folder.folders, parent_id, old_index, new_index);
            }
            folder
        })
        .collect()
}

/// Bulk-append an entire sub-forest and item list into one target folder.
/// Used for importing a whole drawer or folder into a destination.
pub fn merge_into_folder_recursively(
    folders: &[Folder],
    parent_id: FolderId,
    folders_to_add: &[Folder],
    items_to_add: &[DrawerItem],
) -> Vec<Folder> {
    folders
        .iter()
        .map(|folder| {
            let mut folder = folder.clone();
            if folder.id == parent_id {
                folder.folders.extend_from_slice(folders_to_add);
                folder.items.extend_from_slice(items_to_add);
            } else {
                folder.folders = merge_into_folder_recursively(
                    &folder.folders,
                    parent_id,
                    folders_to_add,
                    items_to_add,
                );
            }
            folder
        })
        .collect()
}

pub fn add_item_recursively(
    folders: &[Folder],
    new_item: &DrawerItem,
    parent_id: FolderId,
) -> Vec<Folder> {
    folders
        .iter()
        .map(|folder| {
            let mut folder = folder.clone();
            if folder.id == parent_id {
                folder.items.push(new_item.clone());
            } else {
                folder.folders = add_item_recursively(&folder.folders, new_item, parent_id);
            }
            folder
        })
        .collect()
}

pub fn rename_item_recursively(
    folders: &[Folder],
    item_id: ItemId,
    new_name: &str,
) -> Vec<Folder> {
    folders
        .iter()
        .map(|folder| {
            let mut folder = folder.clone();
            for item in &mut folder.items {
                if item.id == item_id {
                    item.name = new_name.to_string();
                }
            }
            folder.folders = rename_item_recursively(&folder.folders, item_id, new_name);
            folder
        })
        .collect()
}

pub fn delete_item_recursively(folders: &[Folder], item_id: ItemId) -> Vec<Folder> {
    folders
        .iter()
        .map(|folder| {
            let mut folder = folder.clone();
            folder.items.retain(|item| item.id != item_id);
            folder.folders = delete_item_recursively(&folder.folders, item_id);
            folder
        })
        .collect()
}

/// Item counterpart of [`find_and_remove_folder`].
pub fn find_and_remove_item(
    folders: &[Folder],
    item_id: ItemId,
) -> (Option<DrawerItem>, Vec<Folder>) {
    let mut found = None;
    let updated = remove_item_inner(folders, item_id, &mut found);
    (found, updated)
}

fn remove_item_inner(
    folders: &[Folder],
    item_id: ItemId,
    found: &mut Option<DrawerItem>,
) -> Vec<Folder> {
    folders
        .iter()
        .map(|folder| {
            let mut folder = folder.clone();
            if let Some(index) = folder.items.iter().position(|item| item.id == item_id) {
                *found = Some(folder.items.remove(index));
            } else {
                folder.folders = remove_item_inner(&folder.folders, item_id, found);
            }
            folder
        })
        .collect()
}

pub fn reorder_items_recursively(
    folders: &[Folder],
    parent_id: FolderId,
    old_index: usize,
    new_index: usize,
) -> Vec<Folder> {
    folders
        .iter()
        .map(|folder| {
            let mut folder = folder.clone();
            if folder.id == parent_id {
                folder.items = reorder_list(&folder.items, old_index, new_index);
            } else {
                folder.folders =
                    reorder_items_recursively(&folder.folders, parent_id, old_index, new_index);
            }
            folder
        })
        .collect()
}

/// Move the element at `old_index` to `new_index`, shifting the rest.
/// Out-of-range indices are a no-op (stale drag events after a concurrent
/// deletion must not panic).
pub fn reorder_list<T: Clone>(list: &[T], old_index: usize, new_index: usize) -> Vec<T> {
    let mut result = list.to_vec();
    if old_index >= result.len() || new_index >= result.len() {
        return result;
    }
    let moved = result.remove(old_index);
    result.insert(new_index, moved);
    result
}

/// Path from the root down to `folder_id` (inclusive), for UI navigation.
pub fn build_breadcrumb(folders: &[Folder], folder_id: FolderId) -> Vec<&Folder> {
    let mut path = Vec::new();
    let mut current = find_folder(folders, folder_id);
    while let Some(folder) = current {
        path.insert(0, folder);
        current = find_parent_folder(folders, folder.id);
    }
    path
}
