//! Status and story-tag trackers.

use serde::{Deserialize, Serialize};

use crate::drawer::{GameSystem, ItemKind};
use crate::ids::TrackerId;

/// Number of severity tiers a fresh status tracker starts with
pub const STATUS_TIER_COUNT: usize = 6;

/// Ordered severity tiers, each independently togglable. Tier order has
/// meaning but toggling is direct, not cascading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusTracker {
    pub id: TrackerId,
    pub name: String,
    pub game: GameSystem,
    pub tiers: Vec<bool>,
}

impl StatusTracker {
    pub fn new(name: impl Into<String>, game: GameSystem) -> Self {
        Self {
            id: TrackerId::new(),
            name: name.into(),
            game,
            tiers: vec![false; STATUS_TIER_COUNT],
        }
    }
}

/// A scratchable story tag living outside any card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryTagTracker {
    pub id: TrackerId,
    pub name: String,
    pub game: GameSystem,
    pub is_scratched: bool,
}

impl StoryTagTracker {
    pub fn new(name: impl Into<String>, game: GameSystem) -> Self {
        Self {
            id: TrackerId::new(),
            name: name.into(),
            game,
            is_scratched: false,
        }
    }
}

/// Closed union over the tracker kinds, tagged on the wire by `trackerType`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "trackerType")]
pub enum Tracker {
    #[serde(rename = "STATUS")]
    Status(StatusTracker),
    #[serde(rename = "STORY_TAG")]
    StoryTag(StoryTagTracker),
}

impl Tracker {
    pub fn id(&self) -> TrackerId {
        match self {
            Self::Status(t) => t.id,
            Self::StoryTag(t) => t.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Status(t) => &t.name,
            Self::StoryTag(t) => &t.name,
        }
    }

    pub fn game(&self) -> GameSystem {
        match self {
            Self::Status(t) => t.game,
            Self::StoryTag(t) => t.game,
        }
    }

    pub fn set_game(&mut self, game: GameSystem) {
        match self {
            Self::Status(t) => t.game = game,
            Self::StoryTag(t) => t.game = game,
        }
    }

    /// Interchange kind this tracker exports as
    pub fn item_kind(&self) -> ItemKind {
        match self {
            Self::Status(_) => ItemKind::StatusTracker,
            Self::StoryTag(_) => ItemKind::StoryTagTracker,
        }
    }
}

/// Partial update for a [`StatusTracker`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusPatch {
    pub name: Option<String>,
    pub tiers: Option<Vec<bool>>,
}

impl StatusPatch {
    pub fn apply(&self, tracker: &mut StatusTracker) {
        if let Some(name) = &self.name {
            tracker.name = name.clone();
        }
        if let Some(tiers) = &self.tiers {
            tracker.tiers = tiers.clone();
        }
    }
}

/// Partial update for a [`StoryTagTracker`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoryTagPatch {
    pub name: Option<String>,
    pub is_scratched: Option<bool>,
}

impl StoryTagPatch {
    pub fn apply(&self, tracker: &mut StoryTagTracker) {
        if let Some(name) = &self.name {
            tracker.name = name.clone();
        }
        if let Some(is_scratched) = self.is_scratched {
            tracker.is_scratched = is_scratched;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_starts_with_fixed_unmarked_tiers() {
        let tracker = StatusTracker::new("Burning", GameSystem::Legends);
        assert_eq!(tracker.tiers, vec![false; STATUS_TIER_COUNT]);
    }

    #[test]
    fn test_tracker_wire_tag() {
        let tracker = Tracker::Status(StatusTracker::new("Dazed", GameSystem::Legends));
        let json = serde_json::to_value(&tracker).expect("serialize");
        assert_eq!(json["trackerType"], "STATUS");
        assert_eq!(json["game"], "LEGENDS");

        let back: Tracker = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back, tracker);
    }

    #[test]
    fn test_story_tag_wire_tag() {
        let tracker = Tracker::StoryTag(StoryTagTracker::new("Owes me", GameSystem::Legends));
        let json = serde_json::to_value(&tracker).expect("serialize");
        assert_eq!(json["trackerType"], "STORY_TAG");
        assert_eq!(json["isScratched"], false);
    }
}
