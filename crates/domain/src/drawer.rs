//! The drawer: the persistent hierarchical library of saved folders and
//! items, distinct from the live character sheet.

use serde::{Deserialize, Serialize};

use crate::card::Card;
use crate::character::Character;
use crate::ids::{FolderId, ItemId};
use crate::tracker::Tracker;

/// Supported game systems. Only LEGENDS has card factories; the others
/// exist for interchange tagging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameSystem {
    Legends,
    City,
    Otherscape,
    Neutral,
}

/// Every kind of content the drawer and the interchange format can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemKind {
    FullDrawer,
    Folder,
    FullCharacterSheet,
    CharacterCard,
    CharacterTheme,
    GroupTheme,
    StatusTracker,
    StoryTagTracker,
}

/// Payload of a drawer item. Untagged on the wire: the adjacent `type`
/// field on [`DrawerItem`] is the human-facing discriminator, while the
/// variants themselves are distinguished by their required fields
/// (`cardType`, `trackerType`, `cards`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DrawerItemContent {
    Card(Card),
    Tracker(Tracker),
    Character(Character),
}

impl DrawerItemContent {
    /// The interchange kind this content stores/exports as
    pub fn item_kind(&self) -> ItemKind {
        match self {
            Self::Card(card) => card.card_type.item_kind(),
            Self::Tracker(tracker) => tracker.item_kind(),
            Self::Character(_) => ItemKind::FullCharacterSheet,
        }
    }

    /// Human-readable name carried by the content (card title, tracker or
    /// character name), used as the default drawer name.
    pub fn display_name(&self) -> &str {
        match self {
            Self::Card(card) => &card.title,
            Self::Tracker(tracker) => tracker.name(),
            Self::Character(character) => &character.name,
        }
    }

    /// Clear in-flight UI flags so the stored snapshot is at rest.
    pub fn reset_transient(&mut self) {
        match self {
            Self::Card(card) => card.reset_transient(),
            Self::Tracker(_) => {}
            Self::Character(character) => {
                for card in &mut character.cards {
                    card.reset_transient();
                }
            }
        }
    }
}

/// A leaf in the drawer tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawerItem {
    pub id: ItemId,
    pub game: GameSystem,
    #[serde(rename = "type")]
    pub kind: ItemKind,
    pub name: String,
    pub content: DrawerItemContent,
}

/// A folder owns its items and sub-folders directly; there is no parent
/// pointer, parents are discovered by tree search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    pub id: FolderId,
    pub name: String,
    pub items: Vec<DrawerItem>,
    pub folders: Vec<Folder>,
}

impl Folder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: FolderId::new(),
            name: name.into(),
            items: Vec::new(),
            folders: Vec::new(),
        }
    }
}

/// The drawer tree's root: folders and items with no parent folder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Drawer {
    pub folders: Vec<Folder>,
    pub root_items: Vec<DrawerItem>,
}
