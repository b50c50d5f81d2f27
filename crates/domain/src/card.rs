//! Cards: the themed units on the character sheet.
//!
//! `CardDetails` is a closed sum over the payload shapes a card can carry.
//! On the wire the variants are distinguished by their required fields
//! (`themebook` for themes, `characterName` for the hero card), so the
//! enum serializes untagged and deserializes by declaration order.

use serde::{Deserialize, Serialize};

use crate::drawer::{GameSystem, ItemKind};
use crate::ids::{CardId, RelationshipId, TagId};
use crate::tags::{BlandTag, Tag};

/// Card subtypes. `CharacterCard` (the hero card) is unique per character:
/// importing a second one replaces the existing one in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CardType {
    CharacterCard,
    CharacterTheme,
    GroupTheme,
}

impl CardType {
    /// At most one card of a unique type may exist on a character
    pub fn is_unique_per_character(self) -> bool {
        matches!(self, Self::CharacterCard)
    }

    /// Interchange kind a card of this type exports as
    pub fn item_kind(self) -> ItemKind {
        match self {
            Self::CharacterCard => ItemKind::CharacterCard,
            Self::CharacterTheme => ItemKind::CharacterTheme,
            Self::GroupTheme => ItemKind::GroupTheme,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThemeType {
    Origin,
    Adventure,
    Greatness,
}

/// Details of a regular theme card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeDetails {
    pub game: GameSystem,
    pub themebook: String,
    pub theme_type: ThemeType,
    pub abandon: u32,
    pub improve: u32,
    pub milestone: u32,
    pub main_tag: Tag,
    pub power_tags: Vec<Tag>,
    pub weakness_tags: Vec<Tag>,
    pub quest: Option<String>,
    pub improvements: Vec<BlandTag>,
}

/// Details of the shared fellowship theme card. Same shape as a theme
/// minus the themebook identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FellowshipDetails {
    pub game: GameSystem,
    pub abandon: u32,
    pub improve: u32,
    pub milestone: u32,
    pub main_tag: Tag,
    pub power_tags: Vec<Tag>,
    pub weakness_tags: Vec<Tag>,
    pub quest: Option<String>,
    pub improvements: Vec<BlandTag>,
}

/// A bond between the hero and a fellowship companion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FellowshipRelationship {
    pub id: RelationshipId,
    pub companion_name: String,
    pub relationship_tag: String,
}

impl FellowshipRelationship {
    pub fn blank() -> Self {
        Self {
            id: RelationshipId::new(),
            companion_name: String::new(),
            relationship_tag: String::new(),
        }
    }
}

/// Partial update for a [`FellowshipRelationship`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelationshipPatch {
    pub companion_name: Option<String>,
    pub relationship_tag: Option<String>,
}

impl RelationshipPatch {
    pub fn apply(&self, rel: &mut FellowshipRelationship) {
        if let Some(name) = &self.companion_name {
            rel.companion_name = name.clone();
        }
        if let Some(tag) = &self.relationship_tag {
            rel.relationship_tag = tag.clone();
        }
    }
}

/// Details of the hero card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeroDetails {
    pub game: GameSystem,
    pub character_name: String,
    pub fellowship_relationships: Vec<FellowshipRelationship>,
    pub promise: u32,
    pub quintessences: Vec<BlandTag>,
    pub backpack: Vec<BlandTag>,
}

/// The tag lists a card's details may expose. A list name that the current
/// details variant does not carry makes the edit a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagList {
    PowerTags,
    WeaknessTags,
}

/// The bland-tag lists a card's details may expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlandTagList {
    Quintessences,
    Improvements,
    Backpack,
}

/// Closed polymorphic payload of a card.
///
/// Variant order matters for untagged deserialization: a theme payload is a
/// superset of a fellowship payload, so `Theme` must be tried first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CardDetails {
    Theme(ThemeDetails),
    Hero(HeroDetails),
    Fellowship(FellowshipDetails),
}

impl CardDetails {
    pub fn game(&self) -> GameSystem {
        match self {
            Self::Theme(d) => d.game,
            Self::Hero(d) => d.game,
            Self::Fellowship(d) => d.game,
        }
    }

    /// Hero-embedded character name, if this is a hero payload
    pub fn character_name(&self) -> Option<&str> {
        match self {
            Self::Hero(d) => Some(&d.character_name),
            _ => None,
        }
    }

    pub fn as_hero_mut(&mut self) -> Option<&mut HeroDetails> {
        match self {
            Self::Hero(d) => Some(d),
            _ => None,
        }
    }

    /// The named tag list, if this variant carries it
    pub fn tag_list_mut(&mut self, list: TagList) -> Option<&mut Vec<Tag>> {
        let (power, weakness) = match self {
            Self::Theme(d) => (&mut d.power_tags, &mut d.weakness_tags),
            Self::Fellowship(d) => (&mut d.power_tags, &mut d.weakness_tags),
            Self::Hero(_) => return None,
        };
        Some(match list {
            TagList::PowerTags => power,
            TagList::WeaknessTags => weakness,
        })
    }

    /// The named bland-tag list, if this variant carries it
    pub fn bland_tag_list_mut(&mut self, list: BlandTagList) -> Option<&mut Vec<BlandTag>> {
        match (self, list) {
            (Self::Theme(d), BlandTagList::Improvements) => Some(&mut d.improvements),
            (Self::Fellowship(d), BlandTagList::Improvements) => Some(&mut d.improvements),
            (Self::Hero(d), BlandTagList::Quintessences) => Some(&mut d.quintessences),
            (Self::Hero(d), BlandTagList::Backpack) => Some(&mut d.backpack),
            _ => None,
        }
    }
}

/// Options for creating a fresh card from the card dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateCardOptions {
    pub card_type: CardType,
    pub themebook: Option<String>,
    pub theme_type: Option<ThemeType>,
    pub main_tag_name: Option<String>,
    pub power_tags_count: usize,
    pub weakness_tags_count: usize,
}

/// A themed unit on the character sheet.
///
/// `order` is an explicit sort key redundant with array position; callers
/// that insert, delete, or reorder cards must renumber afterwards (see
/// `Character::renumber_cards`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: CardId,
    pub title: String,
    pub order: usize,
    pub is_flipped: bool,
    pub card_type: CardType,
    pub details: CardDetails,
}

impl Card {
    /// Build a fresh card per `options`, appended at `order`.
    ///
    /// Returns `None` when the requested type is not supported for the
    /// active game (only LEGENDS has card factories today).
    pub fn create(
        character_name: &str,
        game: GameSystem,
        order: usize,
        options: &CreateCardOptions,
    ) -> Option<Self> {
        if game != GameSystem::Legends {
            return None;
        }

        let main_tag = Tag::new(options.main_tag_name.clone().unwrap_or_default());
        let power_tags: Vec<Tag> = (0..options.power_tags_count).map(|_| Tag::blank()).collect();
        let weakness_tags: Vec<Tag> = (0..options.weakness_tags_count)
            .map(|_| Tag::blank())
            .collect();

        let (title, details) = match options.card_type {
            CardType::GroupTheme => (
                format!("{character_name}'s Fellowship Theme Card"),
                CardDetails::Fellowship(FellowshipDetails {
                    game,
                    abandon: 0,
                    improve: 0,
                    milestone: 0,
                    main_tag,
                    power_tags,
                    weakness_tags,
                    quest: Some(String::new()),
                    improvements: Vec::new(),
                }),
            ),
            CardType::CharacterTheme => {
                let themebook = options.themebook.clone().unwrap_or_default();
                let theme_type = options.theme_type.unwrap_or(ThemeType::Origin);
                let title = if themebook.is_empty() {
                    format!("{character_name}'s Theme Card - {theme_type:?}")
                } else {
                    format!("{character_name}'s Theme Card - {themebook}/{theme_type:?}")
                };
                (
                    title,
                    CardDetails::Theme(ThemeDetails {
                        game,
                        themebook,
                        theme_type,
                        abandon: 0,
                        improve: 0,
                        milestone: 0,
                        main_tag,
                        power_tags,
                        weakness_tags,
                        quest: Some(String::new()),
                        improvements: Vec::new(),
                    }),
                )
            }
            // The hero card only comes from the character factory
            CardType::CharacterCard => return None,
        };

        Some(Self {
            id: CardId::new(),
            title,
            order,
            is_flipped: false,
            card_type: options.card_type,
            details,
        })
    }

    /// Default hero card for a fresh character
    pub fn hero(name: &str, order: usize) -> Self {
        Self {
            id: CardId::new(),
            title: "Hero Card".to_string(),
            order,
            is_flipped: false,
            card_type: CardType::CharacterCard,
            details: CardDetails::Hero(HeroDetails {
                game: GameSystem::Legends,
                character_name: name.to_string(),
                fellowship_relationships: Vec::new(),
                promise: 0,
                quintessences: Vec::new(),
                backpack: Vec::new(),
            }),
        }
    }

    /// Reset in-flight UI flags before the card is stored as a resting
    /// snapshot (drawer items are not live views).
    pub fn reset_transient(&mut self) {
        self.is_flipped = false;
    }

    pub fn tag_mut(&mut self, list: TagList, tag_id: TagId) -> Option<&mut Tag> {
        self.details
            .tag_list_mut(list)?
            .iter_mut()
            .find(|tag| tag.id == tag_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn theme_options() -> CreateCardOptions {
        CreateCardOptions {
            card_type: CardType::CharacterTheme,
            themebook: Some("Wanderer".to_string()),
            theme_type: Some(ThemeType::Adventure),
            main_tag_name: Some("pathfinder".to_string()),
            power_tags_count: 3,
            weakness_tags_count: 1,
        }
    }

    #[test]
    fn test_create_theme_card() {
        let card = Card::create("Aria", GameSystem::Legends, 2, &theme_options())
            .expect("legends theme card");
        assert_eq!(card.order, 2);
        assert!(!card.is_flipped);
        assert_eq!(card.card_type, CardType::CharacterTheme);
        match &card.details {
            CardDetails::Theme(d) => {
                assert_eq!(d.themebook, "Wanderer");
                assert_eq!(d.main_tag.name, "pathfinder");
                assert_eq!(d.power_tags.len(), 3);
                assert_eq!(d.weakness_tags.len(), 1);
            }
            other => panic!("expected theme details, got {other:?}"),
        }
    }

    #[test]
    fn test_create_rejects_unsupported_game() {
        assert!(Card::create("Aria", GameSystem::City, 0, &theme_options()).is_none());
    }

    #[test]
    fn test_hero_card_has_no_tag_lists() {
        let mut card = Card::hero("Aria", 0);
        assert!(card.details.tag_list_mut(TagList::PowerTags).is_none());
        assert!(card
            .details
            .bland_tag_list_mut(BlandTagList::Backpack)
            .is_some());
        assert!(card
            .details
            .bland_tag_list_mut(BlandTagList::Improvements)
            .is_none());
    }

    #[test]
    fn test_details_untagged_round_trip() {
        let card = Card::create("Aria", GameSystem::Legends, 0, &theme_options())
            .expect("legends theme card");
        let json = serde_json::to_value(&card).expect("serialize");
        assert_eq!(json["cardType"], "CHARACTER_THEME");
        assert_eq!(json["details"]["themeType"], "Adventure");

        let back: Card = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back, card);
    }

    #[test]
    fn test_fellowship_details_do_not_parse_as_theme() {
        let card = Card::create(
            "Aria",
            GameSystem::Legends,
            0,
            &CreateCardOptions {
                card_type: CardType::GroupTheme,
                themebook: None,
                theme_type: None,
                main_tag_name: None,
                power_tags_count: 1,
                weakness_tags_count: 1,
            },
        )
        .expect("fellowship card");
        let json = serde_json::to_value(&card).expect("serialize");
        let back: Card = serde_json::from_value(json).expect("deserialize");
        assert!(matches!(back.details, CardDetails::Fellowship(_)));
    }
}
