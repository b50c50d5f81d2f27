//! Character store: owns the single active character document.
//!
//! Every mutator follows the same contract: no-op when no character is
//! loaded, compute a new document value, mark this store as last modified,
//! snapshot it for undo, and persist the document slice. Mutations that
//! end up changing nothing (stale ids, lists the card's details variant
//! does not carry) commit nothing and leave undo history untouched.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use mistbound_domain::{
    BlandTag, BlandTagList, Card, CardDetails, CardId, CardType, Character, CreateCardOptions,
    FellowshipRelationship, GameSystem, HeroDetails, ItemKind, RelationshipId, RelationshipPatch,
    StatusPatch, StatusTracker, StoryTagPatch, StoryTagTracker, Tag, TagId, TagList, TagPatch,
    Tracker, TrackerId,
};
use mistbound_domain::tree::reorder_list;

use crate::harmonize::harmonize;
use crate::history::History;
use crate::reid::deep_re_id;
use crate::storage::{PersistEnvelope, StoragePort};
use crate::stores::context::{ModificationTracker, StoreKind};

pub const CHARACTER_STORAGE_KEY: &str = "mistbound_character-storage";

/// The persisted slice: the document only, never transient state.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CharacterSlice {
    character: Option<Character>,
}

pub struct CharacterStore {
    history: History<Option<Character>>,
    storage: Arc<dyn StoragePort>,
    tracker: ModificationTracker,
}

impl CharacterStore {
    /// Open the store, restoring (and harmonizing) any persisted document.
    pub fn new(storage: Arc<dyn StoragePort>, tracker: ModificationTracker) -> Self {
        let initial = Self::restore(storage.as_ref());
        Self {
            history: History::new(initial),
            storage,
            tracker,
        }
    }

    fn restore(storage: &dyn StoragePort) -> Option<Character> {
        let raw = storage.load(CHARACTER_STORAGE_KEY)?;
        let envelope: Value = match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(error) => {
                tracing::warn!(%error, "character storage is unreadable; starting empty");
                return None;
            }
        };
        let character = envelope.pointer("/state/character")?.clone();
        if character.is_null() {
            return None;
        }
        let harmonized = harmonize(character, ItemKind::FullCharacterSheet);
        match serde_json::from_value(harmonized) {
            Ok(character) => {
                tracing::info!("character state restored");
                Some(character)
            }
            Err(error) => {
                tracing::warn!(%error, "persisted character does not deserialize; starting empty");
                None
            }
        }
    }

    pub fn character(&self) -> Option<&Character> {
        self.history.present().as_ref()
    }

    fn persist(&self) {
        let slice = CharacterSlice {
            character: self.history.present().clone(),
        };
        match serde_json::to_string(&PersistEnvelope::new(slice)) {
            Ok(json) => self.storage.save(CHARACTER_STORAGE_KEY, &json),
            Err(error) => tracing::error!(%error, "failed to serialize character state"),
        }
    }

    fn commit(&mut self, next: Option<Character>) {
        self.tracker.mark(StoreKind::Character);
        self.history.commit(next);
        self.persist();
        tracing::debug!("character state committed");
    }

    /// Run a mutation against a copy of the current character. Absent
    /// document or an unchanged result both mean: commit nothing.
    fn update<F>(&mut self, mutate: F)
    where
        F: FnOnce(&mut Character),
    {
        let Some(current) = self.history.present().as_ref() else {
            return;
        };
        let mut next = current.clone();
        mutate(&mut next);
        if self.history.present().as_ref() == Some(&next) {
            return;
        }
        self.commit(Some(next));
    }

    // --- Character actions ---

    /// Replace the whole document (full-sheet import or drag).
    pub fn load_character(&mut self, character: Character) {
        self.commit(Some(character));
    }

    /// Replace the loaded character with a fresh factory character.
    pub fn reset_character(&mut self) {
        if self.character().is_none() {
            return;
        }
        self.commit(Some(Character::new("New Character")));
    }

    pub fn set_game(&mut self, game: GameSystem) {
        self.update(|character| character.game = game);
    }

    /// Rename the character, keeping the hero card's embedded name in sync.
    pub fn update_character_name(&mut self, name: &str) {
        self.update(|character| {
            character.name = name.to_string();
            for card in &mut character.cards {
                if card.card_type == CardType::CharacterCard {
                    if let Some(hero) = card.details.as_hero_mut() {
                        hero.character_name = name.to_string();
                    }
                }
            }
        });
    }

    // --- Card actions ---

    pub fn add_card(&mut self, options: &CreateCardOptions) {
        self.update(|character| {
            let order = character.cards.len();
            if let Some(card) = Card::create(&character.name, character.game, order, options) {
                character.cards.push(card);
            }
        });
    }

    /// Insert an imported card with fresh ids. A unique-per-character card
    /// replaces the existing one at its position and propagates its
    /// embedded name onto the character; any other card is inserted at
    /// `index` (default: end) and all orders renumbered.
    pub fn add_imported_card(&mut self, card: Card, index: Option<usize>) {
        self.update(|character| {
            let mut card = deep_re_id(&card);
            if card.card_type.is_unique_per_character() {
                if let Some(name) = card.details.character_name() {
                    character.name = name.to_string();
                }
                if let Some(position) = character
                    .cards
                    .iter()
                    .position(|c| c.card_type.is_unique_per_character())
                {
                    card.order = character.cards[position].order;
                    character.cards[position] = card;
                    return;
                }
            }
            let at = index.unwrap_or(character.cards.len()).min(character.cards.len());
            character.cards.insert(at, card);
            character.renumber_cards();
        });
    }

    pub fn delete_card(&mut self, card_id: CardId) {
        self.update(|character| {
            character.cards.retain(|card| card.id != card_id);
            character.renumber_cards();
        });
    }

    /// Replace a card's whole details payload
    pub fn update_card_details(&mut self, card_id: CardId, details: CardDetails) {
        self.update(|character| {
            if let Some(card) = character.card_mut(card_id) {
                card.details = details;
            }
        });
    }

    pub fn reorder_cards(&mut self, old_index: usize, new_index: usize) {
        self.update(|character| {
            character.cards = reorder_list(&character.cards, old_index, new_index);
            character.renumber_cards();
        });
    }

    pub fn flip_card(&mut self, card_id: CardId) {
        self.update(|character| {
            if let Some(card) = character.card_mut(card_id) {
                card.is_flipped = !card.is_flipped;
            }
        });
    }

    // --- Tag actions ---

    pub fn add_tag(&mut self, card_id: CardId, list: TagList) {
        self.update(|character| {
            if let Some(tags) = character
                .card_mut(card_id)
                .and_then(|card| card.details.tag_list_mut(list))
            {
                tags.push(Tag::blank());
            }
        });
    }

    pub fn update_tag(&mut self, card_id: CardId, list: TagList, tag_id: TagId, patch: &TagPatch) {
        self.update(|character| {
            if let Some(tag) = character
                .card_mut(card_id)
                .and_then(|card| card.tag_mut(list, tag_id))
            {
                patch.apply(tag);
            }
        });
    }

    pub fn remove_tag(&mut self, card_id: CardId, list: TagList, tag_id: TagId) {
        self.update(|character| {
            if let Some(tags) = character
                .card_mut(card_id)
                .and_then(|card| card.details.tag_list_mut(list))
            {
                tags.retain(|tag| tag.id != tag_id);
            }
        });
    }

    // --- Bland tag actions (quintessences, improvements, backpack) ---

    pub fn add_bland_tag(&mut self, card_id: CardId, list: BlandTagList) {
        self.update(|character| {
            if let Some(tags) = character
                .card_mut(card_id)
                .and_then(|card| card.details.bland_tag_list_mut(list))
            {
                tags.push(BlandTag::blank());
            }
        });
    }

    pub fn update_bland_tag(
        &mut self,
        card_id: CardId,
        list: BlandTagList,
        tag_id: TagId,
        name: &str,
    ) {
        self.update(|character| {
            if let Some(tag) = character
                .card_mut(card_id)
                .and_then(|card| card.details.bland_tag_list_mut(list))
                .and_then(|tags| tags.iter_mut().find(|tag| tag.id == tag_id))
            {
                tag.name = name.to_string();
            }
        });
    }

    pub fn remove_bland_tag(&mut self, card_id: CardId, list: BlandTagList, tag_id: TagId) {
        self.update(|character| {
            if let Some(tags) = character
                .card_mut(card_id)
                .and_then(|card| card.details.bland_tag_list_mut(list))
            {
                tags.retain(|tag| tag.id != tag_id);
            }
        });
    }

    // --- Tracker actions ---

    pub fn add_status(&mut self, name: Option<&str>) {
        self.update(|character| {
            let status = StatusTracker::new(name.unwrap_or_default(), character.game);
            character.trackers.statuses.push(status);
        });
    }

    pub fn add_story_tag(&mut self, name: Option<&str>) {
        self.update(|character| {
            let story_tag = StoryTagTracker::new(name.unwrap_or_default(), character.game);
            character.trackers.story_tags.push(story_tag);
        });
    }

    /// Insert an imported tracker with fresh ids at `index` (default: end).
    pub fn add_imported_tracker(&mut self, tracker: Tracker, index: Option<usize>) {
        self.update(|character| match deep_re_id(&tracker) {
            Tracker::Status(status) => {
                let list = &mut character.trackers.statuses;
                let at = index.unwrap_or(list.len()).min(list.len());
                list.insert(at, status);
            }
            Tracker::StoryTag(story_tag) => {
                let list = &mut character.trackers.story_tags;
                let at = index.unwrap_or(list.len()).min(list.len());
                list.insert(at, story_tag);
            }
        });
    }

    pub fn remove_status(&mut self, tracker_id: TrackerId) {
        self.update(|character| {
            character
                .trackers
                .statuses
                .retain(|tracker| tracker.id != tracker_id);
        });
    }

    pub fn remove_story_tag(&mut self, tracker_id: TrackerId) {
        self.update(|character| {
            character
                .trackers
                .story_tags
                .retain(|tracker| tracker.id != tracker_id);
        });
    }

    pub fn update_status(&mut self, tracker_id: TrackerId, patch: &StatusPatch) {
        self.update(|character| {
            if let Some(tracker) = character
                .trackers
                .statuses
                .iter_mut()
                .find(|tracker| tracker.id == tracker_id)
            {
                patch.apply(tracker);
            }
        });
    }

    pub fn update_story_tag(
        &mut self,
        tracker_id: TrackerId,
        patch: &StoryTagPatch,
    ) {
        self.update(|character| {
            if let Some(tracker) = character
                .trackers
                .story_tags
                .iter_mut()
                .find(|tracker| tracker.id == tracker_id)
            {
                patch.apply(tracker);
            }
        });
    }

    pub fn reorder_statuses(&mut self, old_index: usize, new_index: usize) {
        self.update(|character| {
            character.trackers.statuses =
                reorder_list(&character.trackers.statuses, old_index, new_index);
        });
    }

    pub fn reorder_story_tags(&mut self, old_index: usize, new_index: usize) {
        self.update(|character| {
            character.trackers.story_tags =
                reorder_list(&character.trackers.story_tags, old_index, new_index);
        });
    }

    // --- Fellowship relationship actions (hero card only) ---

    pub fn add_relationship(&mut self, card_id: CardId) {
        self.update(|character| {
            if let Some(hero) = hero_details_mut(character, card_id) {
                hero.fellowship_relationships
                    .push(FellowshipRelationship::blank());
            }
        });
    }

    pub fn update_relationship(
        &mut self,
        card_id: CardId,
        relationship_id: RelationshipId,
        patch: &RelationshipPatch,
    ) {
        self.update(|character| {
            if let Some(relationship) = hero_details_mut(character, card_id).and_then(|hero| {
                hero.fellowship_relationships
                    .iter_mut()
                    .find(|rel| rel.id == relationship_id)
            }) {
                patch.apply(relationship);
            }
        });
    }

    pub fn remove_relationship(&mut self, card_id: CardId, relationship_id: RelationshipId) {
        self.update(|character| {
            if let Some(hero) = hero_details_mut(character, card_id) {
                hero.fellowship_relationships
                    .retain(|rel| rel.id != relationship_id);
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

fn hero_details_mut(
    character: &mut Character,
    card_id: CardId,
) -> Option<&mut HeroDetails> {
    let card = character.card_mut(card_id)?;
    if card.card_type != CardType::CharacterCard {
        return None;
    }
    card.details.as_hero_mut()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use mistbound_domain::ThemeType;

    fn store() -> CharacterStore {
        CharacterStore::new(Arc::new(MemoryStorage::new()), ModificationTracker::new())
    }

    fn loaded_store(name: &str) -> CharacterStore {
        let mut store = store();
        store.load_character(Character::new(name));
        store
    }

    fn theme_options() -> CreateCardOptions {
        CreateCardOptions {
            card_type: CardType::CharacterTheme,
            themebook: Some("Wanderer".to_string()),
            theme_type: Some(ThemeType::Origin),
            main_tag_name: None,
            power_tags_count: 2,
            weakness_tags_count: 1,
        }
    }

    fn orders(store: &CharacterStore) -> Vec<usize> {
        store
            .character()
            .map(|c| c.cards.iter().map(|card| card.order).collect())
            .unwrap_or_default()
    }

    #[test]
    fn test_mutators_noop_without_character() {
        let mut store = store();
        store.add_card(&theme_options());
        store.reset_character();
        store.add_status(Some("Burning"));
        assert!(store.character().is_none());
        assert!(!store.can_undo());
    }

    #[test]
    fn test_new_character_scenario() {
        let store = loaded_store("Aria");
        let character = store.character().expect("loaded");
        assert_eq!(character.cards.len(), 1);
        assert_eq!(character.cards[0].card_type, CardType::CharacterCard);
        assert_eq!(character.cards[0].order, 0);
        assert_eq!(
            character.cards[0].details.character_name(),
            Some("Aria")
        );
        assert!(character.trackers.statuses.is_empty());
    }

    #[test]
    fn test_order_invariant_across_mutations() {
        let mut store = loaded_store("Aria");
        store.add_card(&theme_options());
        store.add_card(&theme_options());
        assert_eq!(orders(&store), vec![0, 1, 2]);

        let second_id = store.character().expect("loaded").cards[1].id;
        store.delete_card(second_id);
        assert_eq!(orders(&store), vec![0, 1]);

        let imported = Card::create("Aria", GameSystem::Legends, 0, &theme_options())
            .expect("theme card");
        store.add_imported_card(imported, Some(1));
        assert_eq!(orders(&store), vec![0, 1, 2]);

        store.reorder_cards(0, 2);
        assert_eq!(orders(&store), vec![0, 1, 2]);
    }

    #[test]
    fn test_reorder_moves_and_renumbers() {
        let mut store = loaded_store("Aria");
        store.add_card(&theme_options());
        store.add_card(&theme_options());
        let before: Vec<CardId> = store
            .character()
            .expect("loaded")
            .cards
            .iter()
            .map(|c| c.id)
            .collect();

        store.reorder_cards(0, 2);
        let after: Vec<CardId> = store
            .character()
            .expect("loaded")
            .cards
            .iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(after, vec![before[1], before[2], before[0]]);
        assert_eq!(orders(&store), vec![0, 1, 2]);
    }

    #[test]
    fn test_out_of_range_reorder_is_noop() {
        let mut store = loaded_store("Aria");
        store.add_card(&theme_options());
        let before = store.character().cloned();
        store.reorder_cards(5, 0);
        assert_eq!(store.character().cloned(), before);
    }

    #[test]
    fn test_unique_card_replacement_in_place() {
        let mut store = loaded_store("Aria");
        store.add_card(&theme_options());

        let incoming = Card::hero("Brin", 9);
        store.add_imported_card(incoming.clone(), None);

        let character = store.character().expect("loaded");
        let heroes: Vec<&Card> = character
            .cards
            .iter()
            .filter(|c| c.card_type == CardType::CharacterCard)
            .collect();
        assert_eq!(heroes.len(), 1);
        assert_eq!(character.cards[0].card_type, CardType::CharacterCard);
        assert_eq!(character.cards[0].order, 0);
        assert_eq!(character.name, "Brin");
        // the import got fresh ids
        assert_ne!(character.cards[0].id, incoming.id);
    }

    #[test]
    fn test_rename_propagates_to_hero_card() {
        let mut store = loaded_store("Aria");
        store.update_character_name("Brin");
        let character = store.character().expect("loaded");
        assert_eq!(character.name, "Brin");
        assert_eq!(character.cards[0].details.character_name(), Some("Brin"));
    }

    #[test]
    fn test_tag_edit_on_hero_card_is_noop() {
        let mut store = loaded_store("Aria");
        let hero_id = store.character().expect("loaded").cards[0].id;
        let before = store.character().cloned();
        store.add_tag(hero_id, TagList::PowerTags);
        assert_eq!(store.character().cloned(), before);
        assert!(!store.can_redo());
    }

    #[test]
    fn test_tag_crud_on_theme_card() {
        let mut store = loaded_store("Aria");
        store.add_card(&theme_options());
        let card_id = store.character().expect("loaded").cards[1].id;

        store.add_tag(card_id, TagList::PowerTags);
        let tag_id = {
            let character = store.character().expect("loaded");
            let card = character.card(card_id).expect("card");
            match &card.details {
                CardDetails::Theme(d) => {
                    assert_eq!(d.power_tags.len(), 3);
                    d.power_tags[2].id
                }
                other => panic!("expected theme details, got {other:?}"),
            }
        };

        store.update_tag(
            card_id,
            TagList::PowerTags,
            tag_id,
            &TagPatch {
                name: Some("keen eye".to_string()),
                is_active: Some(true),
                ..TagPatch::default()
            },
        );
        store.remove_tag(card_id, TagList::WeaknessTags, TagId::new());

        let character = store.character().expect("loaded");
        let card = character.card(card_id).expect("card");
        match &card.details {
            CardDetails::Theme(d) => {
                assert_eq!(d.power_tags[2].name, "keen eye");
                assert!(d.power_tags[2].is_active);
                assert_eq!(d.weakness_tags.len(), 1);
            }
            other => panic!("expected theme details, got {other:?}"),
        }
    }

    #[test]
    fn test_imported_tracker_gets_fresh_ids_and_index() {
        let mut store = loaded_store("Aria");
        store.add_status(Some("Burning"));
        let incoming = Tracker::Status(StatusTracker::new("Dazed", GameSystem::Legends));
        store.add_imported_tracker(incoming.clone(), Some(0));

        let character = store.character().expect("loaded");
        assert_eq!(character.trackers.statuses.len(), 2);
        assert_eq!(character.trackers.statuses[0].name, "Dazed");
        assert_ne!(character.trackers.statuses[0].id, incoming.id());
    }

    #[test]
    fn test_undo_boundary() {
        let mut store = loaded_store("Aria");
        // one action so far (the load)
        assert!(store.can_undo());
        store.undo();
        assert!(store.character().is_none());
        assert!(!store.can_undo());
        assert!(!store.undo());

        assert!(store.redo());
        assert!(store.character().is_some());
        assert!(!store.can_redo());
    }

    #[test]
    fn test_noop_mutations_do_not_pollute_history() {
        let mut store = loaded_store("Aria");
        store.update_tag(
            CardId::new(),
            TagList::PowerTags,
            TagId::new(),
            &TagPatch::default(),
        );
        // only the load is undoable
        store.undo();
        assert!(store.character().is_none());
    }

    #[test]
    fn test_persists_and_restores() {
        let storage: Arc<MemoryStorage> = Arc::new(MemoryStorage::new());
        {
            let mut store =
                CharacterStore::new(storage.clone(), ModificationTracker::new());
            store.load_character(Character::new("Aria"));
            store.add_status(Some("Burning"));
        }
        let reopened = CharacterStore::new(storage, ModificationTracker::new());
        let character = reopened.character().expect("restored");
        assert_eq!(character.name, "Aria");
        assert_eq!(character.trackers.statuses.len(), 1);
        // restored initial state is not undoable
        assert!(!reopened.can_undo());
    }

    #[test]
    fn test_relationship_crud_scoped_to_hero() {
        let mut store = loaded_store("Aria");
        store.add_card(&theme_options());
        let hero_id = store.character().expect("loaded").cards[0].id;
        let theme_id = store.character().expect("loaded").cards[1].id;

        store.add_relationship(theme_id);
        store.add_relationship(hero_id);

        let rel_id = {
            let character = store.character().expect("loaded");
            match &character.cards[0].details {
                CardDetails::Hero(d) => {
                    assert_eq!(d.fellowship_relationships.len(), 1);
                    d.fellowship_relationships[0].id
                }
                other => panic!("expected hero details, got {other:?}"),
            }
        };

        store.update_relationship(
            hero_id,
            rel_id,
            &RelationshipPatch {
                companion_name: Some("Brin".to_string()),
                relationship_tag: Some("sworn shield".to_string()),
            },
        );
        store.remove_relationship(hero_id, RelationshipId::new());

        let character = store.character().expect("loaded");
        match &character.cards[0].details {
            CardDetails::Hero(d) => {
                assert_eq!(d.fellowship_relationships[0].companion_name, "Brin");
            }
            other => panic!("expected hero details, got {other:?}"),
        }
    }
}
