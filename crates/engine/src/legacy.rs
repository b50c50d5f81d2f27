//! Migration of legacy character files from the old sheet manager.
//!
//! The legacy format stores four fixed theme slots, burnt tags, and
//! experience/decay counters. The transform rebuilds it as a modern
//! character and additionally "deconstructs" it into standalone cards and
//! trackers so each piece lands in the drawer on its own.

use chrono::Utc;
use serde::Deserialize;

use mistbound_domain::tree::find_folder;
use mistbound_domain::{
    BlandTag, Card, CardDetails, CardId, CardType, Character, CharacterId, DrawerItemContent,
    FolderId, GameSystem, HeroDetails, StatusTracker, Tag, ThemeDetails, ThemeType, Tracker,
    Trackers, STATUS_TIER_COUNT,
};

use crate::error::LegacyError;
use crate::stores::DrawerStore;

/// Name of the root drawer folder all migrated files land under
const MIGRATION_FOLDER: &str = "MIGRATION";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyTag {
    name: String,
    is_active: bool,
    is_burnt: bool,
}

#[derive(Debug, Clone, Deserialize)]
struct LegacyBio {
    body: String,
}

#[derive(Debug, Clone, Deserialize)]
struct LegacyImprovement {
    name: String,
}

/// A field that the legacy writer emitted as either one value or a list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            Self::Many(values) => values,
            Self::One(value) => vec![value],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyThemeContent {
    themebook: String,
    level: ThemeType,
    main_tag: LegacyTag,
    power_tags: Vec<LegacyTag>,
    weakness_tags: Vec<String>,
    experience: u32,
    decay: u32,
    bio: LegacyBio,
    improvement: OneOrMany<LegacyImprovement>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyTheme {
    is_empty: bool,
    content: Option<LegacyThemeContent>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyCharacter {
    name: String,
    compatibility: String,
    theme_one: LegacyTheme,
    theme_two: LegacyTheme,
    theme_three: LegacyTheme,
    theme_four: LegacyTheme,
    backpack: Vec<LegacyTag>,
    statuses: Vec<LegacyStatus>,
}

#[derive(Debug, Clone, Deserialize)]
struct LegacyStatus {
    name: String,
    level: Vec<bool>,
}

/// Result of a single file migration: the assembled character plus its
/// pieces broken out as standalone drawer content.
#[derive(Debug, Clone)]
pub struct MigratedCharacterPayload {
    pub character: Character,
    pub deconstructed_cards: Vec<Card>,
    pub deconstructed_trackers: Vec<StatusTracker>,
}

/// Outcome of a batch migration. Files fail independently; one bad file
/// never aborts the rest.
#[derive(Debug, Default)]
pub struct MigrationReport {
    pub migrated: usize,
    pub failures: Vec<(String, LegacyError)>,
}

fn tag_from_legacy(tag: &LegacyTag) -> Tag {
    let mut mapped = Tag::new(&tag.name);
    mapped.is_active = tag.is_active;
    mapped.is_scratched = tag.is_burnt;
    mapped
}

/// Parse and transform one legacy character file.
pub fn migrate_legacy_character(raw: &str) -> Result<MigratedCharacterPayload, LegacyError> {
    let legacy: LegacyCharacter = serde_json::from_str(raw)?;
    transform_legacy_character(legacy)
}

fn transform_legacy_character(
    legacy: LegacyCharacter,
) -> Result<MigratedCharacterPayload, LegacyError> {
    if legacy.compatibility != "litm" {
        return Err(LegacyError::UnsupportedGameSystem(legacy.compatibility));
    }

    let themes = [
        legacy.theme_one,
        legacy.theme_two,
        legacy.theme_three,
        legacy.theme_four,
    ];

    let mut deconstructed_cards = Vec::new();
    for (slot, theme) in themes.into_iter().enumerate() {
        if theme.is_empty {
            continue;
        }
        let Some(content) = theme.content else {
            continue;
        };

        let details = ThemeDetails {
            game: GameSystem::Legends,
            themebook: content.themebook,
            theme_type: content.level,
            abandon: content.decay,
            improve: content.experience,
            milestone: 0,
            main_tag: tag_from_legacy(&content.main_tag),
            power_tags: content.power_tags.iter().map(tag_from_legacy).collect(),
            weakness_tags: content.weakness_tags.iter().map(Tag::new).collect(),
            quest: Some(content.bio.body),
            improvements: content
                .improvement
                .into_vec()
                .into_iter()
                .map(|imp| BlandTag::new(imp.name))
                .collect(),
        };

        deconstructed_cards.push(Card {
            id: CardId::new(),
            // The legacy sheet shows the main tag as the theme's title
            title: details.main_tag.name.clone(),
            order: slot,
            is_flipped: false,
            card_type: CardType::CharacterTheme,
            details: CardDetails::Theme(details),
        });
    }

    let hero_card = Card {
        id: CardId::new(),
        title: "Hero Card".to_string(),
        order: 0,
        is_flipped: false,
        card_type: CardType::CharacterCard,
        details: CardDetails::Hero(HeroDetails {
            game: GameSystem::Legends,
            character_name: legacy.name.clone(),
            fellowship_relationships: Vec::new(),
            promise: 0,
            quintessences: Vec::new(),
            backpack: legacy
                .backpack
                .iter()
                .map(|tag| BlandTag::new(&tag.name))
                .collect(),
        }),
    };

    let deconstructed_trackers: Vec<StatusTracker> = legacy
        .statuses
        .into_iter()
        .map(|status| {
            let mut tracker = StatusTracker::new(status.name, GameSystem::Legends);
            tracker.tiers = status.level;
            if tracker.tiers.len() < STATUS_TIER_COUNT {
                tracker.tiers.resize(STATUS_TIER_COUNT, false);
            }
            tracker
        })
        .collect();

    let mut cards = vec![hero_card];
    cards.extend(deconstructed_cards.iter().enumerate().map(|(index, card)| {
        let mut card = card.clone();
        card.order = index + 1;
        card
    }));

    let character = Character {
        id: CharacterId::new(),
        name: legacy.name,
        game: GameSystem::Legends,
        cards,
        trackers: Trackers {
            statuses: deconstructed_trackers.clone(),
            story_tags: Vec::new(),
        },
    };

    Ok(MigratedCharacterPayload {
        character,
        deconstructed_cards,
        deconstructed_trackers,
    })
}

/// Migrate a batch of legacy files into the drawer.
///
/// Each file becomes a `"{name} - {date}"` folder under a shared
/// `MIGRATION` root, holding the full sheet plus `Cards` and `Trackers`
/// sub-folders with the deconstructed pieces. Folders are reused by name
/// across files so re-running a migration does not fork the tree.
pub fn migrate_legacy_files(store: &mut DrawerStore, files: &[(String, String)]) -> MigrationReport {
    let mut report = MigrationReport::default();
    if files.is_empty() {
        return report;
    }

    let root_id = get_or_create_folder(store, MIGRATION_FOLDER, None);
    let date = Utc::now().format("%Y-%m-%d");

    for (file_name, raw) in files {
        let payload = match migrate_legacy_character(raw) {
            Ok(payload) => payload,
            Err(error) => {
                tracing::warn!(file_name, %error, "legacy file failed to migrate");
                report.failures.push((file_name.clone(), error));
                continue;
            }
        };

        let character_folder = get_or_create_folder(
            store,
            &format!("{} - {}", payload.character.name, date),
            Some(root_id),
        );
        store.add_imported_item(
            GameSystem::Legends,
            &DrawerItemContent::Character(payload.character),
            Some(character_folder),
        );

        if !payload.deconstructed_cards.is_empty() {
            let cards_folder = get_or_create_folder(store, "Cards", Some(character_folder));
            for card in payload.deconstructed_cards {
                store.add_imported_item(
                    GameSystem::Legends,
                    &DrawerItemContent::Card(card),
                    Some(cards_folder),
                );
            }
        }

        if !payload.deconstructed_trackers.is_empty() {
            let trackers_folder = get_or_create_folder(store, "Trackers", Some(character_folder));
            for tracker in payload.deconstructed_trackers {
                store.add_imported_item(
                    GameSystem::Legends,
                    &DrawerItemContent::Tracker(Tracker::Status(tracker)),
                    Some(trackers_folder),
                );
            }
        }

        report.migrated += 1;
    }

    report
}

/// Find a folder by name in the direct children of `parent` (root when
/// `None`), creating it when absent.
fn get_or_create_folder(store: &mut DrawerStore, name: &str, parent: Option<FolderId>) -> FolderId {
    let scope = match parent {
        None => Some(&store.drawer().folders),
        Some(parent_id) => find_folder(&store.drawer().folders, parent_id).map(|f| &f.folders),
    };
    if let Some(existing) = scope.and_then(|folders| folders.iter().find(|f| f.name == name)) {
        return existing.id;
    }
    store.add_folder(name, parent)
}
