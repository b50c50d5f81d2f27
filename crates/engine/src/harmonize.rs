//! Version harmonizer.
//!
//! Persisted documents and imported files may have been written by older
//! application versions. Before such a document re-enters a store it is
//! run through a linear upgrade chain: a sorted table of per-version,
//! per-content-type migration functions, applied in ascending order, after
//! which the node is stamped with the running application version.
//! Containers recurse: a drawer into its root items and folders, a folder
//! into its items and sub-folders, an item into its content payload
//! (re-dispatched by the item's declared type).
//!
//! Migrations are additive-only; none removes or renames user content.
//! Harmonization runs at the JSON level because the whole point is that
//! the incoming shape predates the current typed model.

use mistbound_domain::{ItemKind, STATUS_TIER_COUNT};
use once_cell::sync::Lazy;
use semver::Version;
use serde_json::{json, Value};
use uuid::Uuid;

/// Version stamped on exports and on harmonized documents
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

struct Migration {
    version: Version,
    kind: ItemKind,
    apply: fn(&mut Value),
}

static MIGRATIONS: Lazy<Vec<Migration>> = Lazy::new(|| {
    let mut table = vec![
        Migration {
            version: Version::new(1, 0, 2),
            kind: ItemKind::FullCharacterSheet,
            apply: backfill_story_tags,
        },
        Migration {
            version: Version::new(1, 1, 0),
            kind: ItemKind::StatusTracker,
            apply: pad_status_tiers,
        },
    ];
    table.sort_by(|a, b| a.version.cmp(&b.version));
    table
});

/// 1.0.2: character sheets gained the story-tag tracker list
fn backfill_story_tags(value: &mut Value) {
    if let Some(trackers) = value.get_mut("trackers").and_then(Value::as_object_mut) {
        trackers
            .entry("storyTags")
            .or_insert_with(|| Value::Array(Vec::new()));
    }
}

/// 1.1.0: status trackers grew from five to six tiers
fn pad_status_tiers(value: &mut Value) {
    if let Some(tiers) = value.get_mut("tiers").and_then(Value::as_array_mut) {
        while tiers.len() < STATUS_TIER_COUNT {
            tiers.push(Value::Bool(false));
        }
    }
}

/// Upgrade `value` (a document of the given kind) to the current schema.
pub fn harmonize(value: Value, kind: ItemKind) -> Value {
    let mut value = value;
    normalize_ids(&mut value);
    harmonize_node(&mut value, kind);
    value
}

fn harmonize_node(value: &mut Value, kind: ItemKind) {
    if !value.is_object() {
        return;
    }

    // Step 1: versioned migrations for this node
    let mut current = declared_version(value).unwrap_or_else(|| Version::new(1, 0, 0));
    for migration in MIGRATIONS.iter() {
        if migration.version > current {
            if migration.kind == kind {
                (migration.apply)(value);
            }
            set_version(value, &migration.version.to_string());
            current = migration.version.clone();
        }
    }
    if let Ok(app_version) = Version::parse(APP_VERSION) {
        if current < app_version {
            set_version(value, APP_VERSION);
        }
    }

    // Step 2: recurse into container children
    if is_drawer(value) {
        harmonize_children(value, "rootItems");
        harmonize_sub_folders(value);
    } else if is_folder(value) {
        harmonize_children(value, "items");
        harmonize_sub_folders(value);
    } else if is_drawer_item(value) {
        let content_kind = value
            .get("type")
            .cloned()
            .and_then(|t| serde_json::from_value::<ItemKind>(t).ok());
        if let (Some(content_kind), Some(content)) = (content_kind, value.get_mut("content")) {
            harmonize_node(content, content_kind);
        }
    }
}

fn harmonize_children(value: &mut Value, field: &str) {
    let kinds: Vec<Option<ItemKind>> = match value.get(field).and_then(Value::as_array) {
        Some(items) => items
            .iter()
            .map(|item| {
                item.get("type")
                    .cloned()
                    .and_then(|t| serde_json::from_value::<ItemKind>(t).ok())
            })
            .collect(),
        None => return,
    };
    if let Some(items) = value.get_mut(field).and_then(Value::as_array_mut) {
        for (item, kind) in items.iter_mut().zip(kinds) {
            if let Some(kind) = kind {
                harmonize_node(item, kind);
            }
        }
    }
}

fn harmonize_sub_folders(value: &mut Value) {
    if let Some(folders) = value.get_mut("folders").and_then(Value::as_array_mut) {
        for folder in folders {
            harmonize_node(folder, ItemKind::Folder);
        }
    }
}

fn declared_version(value: &Value) -> Option<Version> {
    value
        .get("version")
        .and_then(Value::as_str)
        .and_then(|v| Version::parse(v).ok())
}

fn set_version(value: &mut Value, version: &str) {
    if let Some(obj) = value.as_object_mut() {
        obj.insert("version".to_string(), json!(version));
    }
}

fn is_drawer(value: &Value) -> bool {
    value.get("rootItems").is_some() && value.get("folders").is_some()
}

fn is_folder(value: &Value) -> bool {
    value.get("items").is_some()
        && value.get("folders").is_some()
        && value.get("rootItems").is_none()
}

fn is_drawer_item(value: &Value) -> bool {
    value.get("content").is_some() && value.get("type").is_some() && value.get("id").is_some()
}

/// Baseline pass: documents written before the current id scheme carry
/// opaque string ids. Any `id` that is not a UUID gets a fresh one so the
/// document still loads; identity of such ids is not preserved, which is
/// safe because every duplication path re-ids regardless.
fn normalize_ids(value: &mut Value) {
    match value {
        Value::Array(items) => {
            for item in items {
                normalize_ids(item);
            }
        }
        Value::Object(map) => {
            if let Some(Value::String(id)) = map.get_mut("id") {
                if Uuid::parse_str(id).is_err() {
                    *id = Uuid::new_v4().to_string();
                }
            }
            for (_, child) in map.iter_mut() {
                normalize_ids(child);
            }
        }
        _ => {}
    }
}
