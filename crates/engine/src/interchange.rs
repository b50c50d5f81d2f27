//! File interchange format (`.cotm` / `.json` export files).
//!
//! ```json
//! {
//!   "fileType": "CHARACTER_THEME",
//!   "game": "LEGENDS",
//!   "version": "1.3.0",
//!   "content": { ... }
//! }
//! ```
//!
//! Import validates only that `fileType` and `content` are present, then
//! runs the content through the version harmonizer before anything is
//! typed. Export always stamps the current application version.

use chrono::Utc;
use mistbound_domain::{Card, Character, Drawer, Folder, GameSystem, ItemKind, Tracker};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ImportError;
use crate::harmonize::{harmonize, APP_VERSION};

/// Extension used for exported files
pub const FILE_EXTENSION: &str = "cotm";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportFile {
    pub file_type: ItemKind,
    pub game: GameSystem,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub content: Value,
}

/// Typed view of a successfully imported file.
#[derive(Debug, Clone)]
pub enum ImportedContent {
    Drawer(Drawer),
    Folder(Folder),
    Character(Character),
    Card(Card),
    Tracker(Tracker),
}

/// Parse raw file text into an [`ExportFile`].
///
/// Missing `fileType`/`content` is reported as [`ImportError::InvalidFormat`]
/// (distinct from unparseable JSON) so the caller can message it properly.
pub fn parse_import(raw: &str) -> Result<ExportFile, ImportError> {
    let value: Value = serde_json::from_str(raw)?;
    let obj = value.as_object().ok_or(ImportError::InvalidFormat)?;
    if !obj.contains_key("fileType") || !obj.contains_key("content") {
        return Err(ImportError::InvalidFormat);
    }
    Ok(serde_json::from_value(value)?)
}

/// Harmonize the file's content and decode it into the type its
/// `fileType` declares.
pub fn decode(file: ExportFile) -> Result<ImportedContent, ImportError> {
    let mut content = file.content;

    // The envelope's version is the declared schema version; push it onto
    // the content node when the content does not carry its own.
    if let Some(obj) = content.as_object_mut() {
        if let Some(version) = &file.version {
            obj.entry("version")
                .or_insert_with(|| Value::String(version.clone()));
        }
        // Early tracker exports stamped the game only on the envelope.
        if matches!(
            file.file_type,
            ItemKind::StatusTracker | ItemKind::StoryTagTracker
        ) && obj.get("game").map_or(true, Value::is_null)
        {
            obj.insert("game".to_string(), serde_json::to_value(file.game)?);
        }
    }

    let content = harmonize(content, file.file_type);

    let imported = match file.file_type {
        ItemKind::FullDrawer => ImportedContent::Drawer(serde_json::from_value(content)?),
        ItemKind::Folder => ImportedContent::Folder(serde_json::from_value(content)?),
        ItemKind::FullCharacterSheet => {
            ImportedContent::Character(serde_json::from_value(content)?)
        }
        ItemKind::CharacterCard | ItemKind::CharacterTheme | ItemKind::GroupTheme => {
            ImportedContent::Card(serde_json::from_value(content)?)
        }
        ItemKind::StatusTracker | ItemKind::StoryTagTracker => {
            ImportedContent::Tracker(serde_json::from_value(content)?)
        }
    };
    Ok(imported)
}

/// Serialize `content` as an export file stamped with the current
/// application version.
pub fn export_file<T: Serialize>(
    content: &T,
    kind: ItemKind,
    game: GameSystem,
) -> Result<String, ImportError> {
    let file = ExportFile {
        file_type: kind,
        game,
        version: Some(APP_VERSION.to_string()),
        content: serde_json::to_value(content)?,
    };
    Ok(serde_json::to_string_pretty(&file)?)
}

/// Cosmetic filename for an export: game/type abbreviation, optional
/// handle, and an ISO date. No extension.
pub fn export_filename(game: GameSystem, kind: ItemKind, handle: Option<&str>) -> String {
    let date = Utc::now().format("%Y-%m-%d");

    let game_text = match game {
        GameSystem::Legends => Some("LitM"),
        GameSystem::City => Some("CoM"),
        GameSystem::Otherscape => Some("OS"),
        GameSystem::Neutral => None,
    };

    let type_text = match kind {
        ItemKind::FullCharacterSheet => "Character",
        ItemKind::CharacterCard => "Character-Card",
        ItemKind::CharacterTheme => "Theme-Card",
        ItemKind::GroupTheme => "Group-Theme-Card",
        ItemKind::Folder => "Drawer-Folder",
        ItemKind::FullDrawer => "Drawer",
        ItemKind::StatusTracker => "Status-Tracker",
        ItemKind::StoryTagTracker => "Story-Tag-Tracker",
    };

    let base = match game_text {
        Some(game_text) => format!("{game_text}_{type_text}"),
        None => type_text.to_string(),
    };
    let prefix = match handle {
        Some(handle) if !handle.is_empty() => format!("{handle}_{base}"),
        _ => base,
    };

    format!("{prefix}_{date}")
}

/// Filename for a full-drawer export (`MM-DD-YYYY` date stamp).
pub fn drawer_export_filename() -> String {
    format!("Mistbound - Full Drawer - {}", Utc::now().format("%m-%d-%Y"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mistbound_domain::{StatusTracker, StoryTagTracker};

    #[test]
    fn test_malformed_payload_is_invalid_format() {
        let error = parse_import("{\"foo\": 1}").expect_err("must reject");
        assert!(matches!(error, ImportError::InvalidFormat));
    }

    #[test]
    fn test_garbage_is_parse_error() {
        let error = parse_import("not json at all").expect_err("must reject");
        assert!(matches!(error, ImportError::Parse(_)));
    }

    #[test]
    fn test_character_round_trip() {
        let character = Character::new("Aria");
        let raw = export_file(
            &character,
            ItemKind::FullCharacterSheet,
            GameSystem::Legends,
        )
        .expect("export");

        let file = parse_import(&raw).expect("parse");
        assert_eq!(file.file_type, ItemKind::FullCharacterSheet);
        assert_eq!(file.version.as_deref(), Some(APP_VERSION));

        match decode(file).expect("decode") {
            ImportedContent::Character(back) => assert_eq!(back, character),
            other => panic!("expected character, got {other:?}"),
        }
    }

    #[test]
    fn test_tracker_round_trip_carries_tag() {
        let tracker = Tracker::StoryTag(StoryTagTracker::new("Owes me", GameSystem::Legends));
        let raw =
            export_file(&tracker, ItemKind::StoryTagTracker, GameSystem::Legends).expect("export");
        match decode(parse_import(&raw).expect("parse")).expect("decode") {
            ImportedContent::Tracker(back) => assert_eq!(back, tracker),
            other => panic!("expected tracker, got {other:?}"),
        }
    }

    #[test]
    fn test_import_harmonizes_old_content() {
        let tracker = Tracker::Status(StatusTracker::new("Burning", GameSystem::Legends));
        let mut value = serde_json::to_value(&tracker).expect("serialize");
        value["tiers"] = serde_json::json!([true, false, false, false, false]);
        let raw = serde_json::to_string(&ExportFile {
            file_type: ItemKind::StatusTracker,
            game: GameSystem::Legends,
            version: Some("1.0.0".to_string()),
            content: value,
        })
        .expect("serialize");

        match decode(parse_import(&raw).expect("parse")).expect("decode") {
            ImportedContent::Tracker(Tracker::Status(status)) => {
                assert_eq!(status.tiers.len(), mistbound_domain::STATUS_TIER_COUNT);
                assert!(status.tiers[0]);
            }
            other => panic!("expected status tracker, got {other:?}"),
        }
    }

    #[test]
    fn test_tracker_without_game_takes_envelope_game() {
        let raw = serde_json::json!({
            "fileType": "STATUS_TRACKER",
            "game": "CITY",
            "version": "1.0.0",
            "content": {
                "id": "b4c1f6be-7e13-4e26-9d3e-2f36a41c9f01",
                "trackerType": "STATUS",
                "name": "Burning",
                "tiers": [false, false, false, false, false, false]
            }
        })
        .to_string();

        match decode(parse_import(&raw).expect("parse")).expect("decode") {
            ImportedContent::Tracker(tracker) => assert_eq!(tracker.game(), GameSystem::City),
            other => panic!("expected tracker, got {other:?}"),
        }
    }

    #[test]
    fn test_filenames() {
        let name = export_filename(
            GameSystem::Legends,
            ItemKind::CharacterTheme,
            Some("Aria"),
        );
        assert!(name.starts_with("Aria_LitM_Theme-Card_"));

        let neutral = export_filename(GameSystem::Neutral, ItemKind::FullDrawer, None);
        assert!(neutral.starts_with("Drawer_"));
    }
}
