//! Mistbound domain: the character sheet and drawer data model.
//!
//! Pure data types and tree functions only; stores, persistence, and
//! import/export live in `mistbound-engine`.

pub mod card;
pub mod character;
pub mod drawer;
pub mod ids;
pub mod tags;
pub mod tracker;
pub mod tree;

pub use card::{
    BlandTagList, Card, CardDetails, CardType, CreateCardOptions, FellowshipDetails,
    FellowshipRelationship, HeroDetails, RelationshipPatch, TagList, ThemeDetails, ThemeType,
};
pub use character::{Character, Trackers};
pub use drawer::{Drawer, DrawerItem, DrawerItemContent, Folder, GameSystem, ItemKind};
pub use ids::{CardId, CharacterId, FolderId, ItemId, RelationshipId, TagId, TrackerId};
pub use tags::{BlandTag, Tag, TagPatch};
pub use tracker::{
    StatusPatch, StatusTracker, StoryTagPatch, StoryTagTracker, Tracker, STATUS_TIER_COUNT,
};
