//! Application settings: a small persisted store with no undo history.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::storage::{PersistEnvelope, StoragePort};

pub const SETTINGS_STORAGE_KEY: &str = "mistbound_app-settings";

/// Visual theme of the application shell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ThemeName {
    #[default]
    ThemeNeutral,
    ThemeLegends,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub theme: ThemeName,
    pub is_compact_drawer: bool,
    pub is_side_by_side_view: bool,
    /// Version the user last saw, drives the "what's new" prompt
    pub last_visited_version: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: ThemeName::default(),
            is_compact_drawer: false,
            is_side_by_side_view: false,
            last_visited_version: "0.0.0".to_string(),
        }
    }
}

pub struct SettingsStore {
    settings: Settings,
    storage: Arc<dyn StoragePort>,
}

impl SettingsStore {
    pub fn new(storage: Arc<dyn StoragePort>) -> Self {
        let settings = Self::restore(storage.as_ref()).unwrap_or_default();
        Self { settings, storage }
    }

    fn restore(storage: &dyn StoragePort) -> Option<Settings> {
        let raw = storage.load(SETTINGS_STORAGE_KEY)?;
        match serde_json::from_str::<PersistEnvelope<Settings>>(&raw) {
            Ok(envelope) => Some(envelope.state),
            Err(error) => {
                tracing::warn!(%error, "persisted settings are unreadable; using defaults");
                None
            }
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    fn persist(&self) {
        match serde_json::to_string(&PersistEnvelope::new(self.settings.clone())) {
            Ok(json) => self.storage.save(SETTINGS_STORAGE_KEY, &json),
            Err(error) => tracing::error!(%error, "failed to serialize settings"),
        }
    }

    pub fn set_theme(&mut self, theme: ThemeName) {
        self.settings.theme = theme;
        self.persist();
    }

    pub fn toggle_compact_drawer(&mut self) {
        self.settings.is_compact_drawer = !self.settings.is_compact_drawer;
        self.persist();
    }

    pub fn set_side_by_side_view(&mut self, side_by_side: bool) {
        self.settings.is_side_by_side_view = side_by_side;
        self.persist();
    }

    pub fn set_last_visited_version(&mut self, version: &str) {
        self.settings.last_visited_version = version.to_string();
        self.persist();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    #[test]
    fn test_defaults() {
        let store = SettingsStore::new(Arc::new(MemoryStorage::new()));
        assert_eq!(store.settings().theme, ThemeName::ThemeNeutral);
        assert_eq!(store.settings().last_visited_version, "0.0.0");
    }

    #[test]
    fn test_persists_and_restores() {
        let storage: Arc<MemoryStorage> = Arc::new(MemoryStorage::new());
        {
            let mut store = SettingsStore::new(storage.clone());
            store.set_theme(ThemeName::ThemeLegends);
            store.toggle_compact_drawer();
        }
        let reopened = SettingsStore::new(storage);
        assert_eq!(reopened.settings().theme, ThemeName::ThemeLegends);
        assert!(reopened.settings().is_compact_drawer);
    }

    #[test]
    fn test_theme_wire_names() {
        let json = serde_json::to_value(ThemeName::ThemeLegends).expect("serialize");
        assert_eq!(json, "theme-legends");
    }
}
