//! The character document: exactly one lives in the character store at a
//! time. Created by the factory, replaced wholesale by a load, otherwise
//! mutated immutably by store actions.

use serde::{Deserialize, Serialize};

use crate::card::Card;
use crate::drawer::GameSystem;
use crate::ids::{CardId, CharacterId};
use crate::tracker::{StatusTracker, StoryTagTracker};

/// The character's non-card sheet elements.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trackers {
    pub statuses: Vec<StatusTracker>,
    pub story_tags: Vec<StoryTagTracker>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    pub id: CharacterId,
    pub name: String,
    pub game: GameSystem,
    pub cards: Vec<Card>,
    pub trackers: Trackers,
}

impl Character {
    /// Factory: a fresh character with the default starting hero card and
    /// empty trackers.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: CharacterId::new(),
            game: GameSystem::Legends,
            cards: vec![Card::hero(&name, 0)],
            trackers: Trackers::default(),
            name,
        }
    }

    pub fn card(&self, card_id: CardId) -> Option<&Card> {
        self.cards.iter().find(|card| card.id == card_id)
    }

    pub fn card_mut(&mut self, card_id: CardId) -> Option<&mut Card> {
        self.cards.iter_mut().find(|card| card.id == card_id)
    }

    /// Restore the order invariant: every card's `order` equals its index.
    pub fn renumber_cards(&mut self) {
        for (index, card) in self.cards.iter_mut().enumerate() {
            card.order = index;
        }
    }
}
