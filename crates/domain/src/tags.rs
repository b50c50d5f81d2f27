//! Tag value objects shared by cards and trackers.

use serde::{Deserialize, Serialize};

use crate::ids::TagId;

/// A power or weakness tag.
///
/// `is_active` marks the tag as "in play"; `is_scratched` marks it as
/// burned/crossed out. The two flags are independent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: TagId,
    pub name: String,
    pub is_active: bool,
    pub is_scratched: bool,
}

impl Tag {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: TagId::new(),
            name: name.into(),
            is_active: false,
            is_scratched: false,
        }
    }

    /// Blank tag, as created when a card gains a new empty tag slot
    pub fn blank() -> Self {
        Self::new("")
    }
}

/// A name-only tag (quintessence, backpack item, improvement) with no
/// activation state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlandTag {
    pub id: TagId,
    pub name: String,
}

impl BlandTag {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: TagId::new(),
            name: name.into(),
        }
    }

    pub fn blank() -> Self {
        Self::new("")
    }
}

/// Partial update for a [`Tag`]; `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagPatch {
    pub name: Option<String>,
    pub is_active: Option<bool>,
    pub is_scratched: Option<bool>,
}

impl TagPatch {
    pub fn apply(&self, tag: &mut Tag) {
        if let Some(name) = &self.name {
            tag.name = name.clone();
        }
        if let Some(is_active) = self.is_active {
            tag.is_active = is_active;
        }
        if let Some(is_scratched) = self.is_scratched {
            tag.is_scratched = is_scratched;
        }
    }
}
