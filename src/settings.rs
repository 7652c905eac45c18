//! Player settings and preferences
//!
//! Persisted in LocalStorage, separate from any game data.

use serde::{Deserialize, Serialize};

use crate::leaderboard::MAX_NICKNAME_LEN;
use crate::platform::KeyBindings;
use crate::tuning::Tuning;

/// Score API used when nothing is configured
pub const DEFAULT_API_BASE_URL: &str = "/api";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Leaderboard identity; empty means scores are not submitted
    pub nickname: String,
    /// Base URL of the score API
    pub api_base_url: String,
    /// Movement keys
    pub key_bindings: KeyBindings,
    /// Game balance overrides
    pub tuning: Tuning,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            nickname: String::new(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            key_bindings: KeyBindings::default(),
            tuning: Tuning::default(),
        }
    }
}

impl Settings {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "mini_arcade_settings";

    /// Store a nickname the way the nickname field does: trimmed and capped
    pub fn set_nickname(&mut self, raw: &str) {
        self.nickname = raw.trim().chars().take(MAX_NICKNAME_LEN).collect();
    }

    /// Parse stored settings, falling back to defaults for bad tuning
    pub fn from_json(json: &str) -> Option<Self> {
        let mut settings: Settings = serde_json::from_str(json).ok()?;
        if let Err(e) = settings.tuning.validate() {
            log::warn!("Ignoring stored tuning: {}", e);
            settings.tuning = Tuning::default();
        }
        Some(settings)
    }

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Some(settings) = Self::from_json(&json) {
                    log::info!("Loaded settings from LocalStorage");
                    return settings;
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_nickname_trims_and_caps() {
        let mut settings = Settings::default();
        settings.set_nickname("  hana  ");
        assert_eq!(settings.nickname, "hana");

        settings.set_nickname("abcdefghijklmnopqrst");
        assert_eq!(settings.nickname, "abcdefghijklmno");

        settings.set_nickname("   ");
        assert!(settings.nickname.is_empty());
    }

    #[test]
    fn test_from_json_partial() {
        let settings = Settings::from_json(r#"{ "nickname": "joon" }"#).unwrap();
        assert_eq!(settings.nickname, "joon");
        assert_eq!(settings.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(settings.key_bindings, KeyBindings::default());
        assert!(Settings::from_json("{").is_none());
    }

    #[test]
    fn test_from_json_rejects_bad_tuning() {
        let json = r#"{ "tuning": { "initial_spawn_interval_ms": -5.0 } }"#;
        let settings = Settings::from_json(json).unwrap();
        assert_eq!(settings.tuning, Tuning::default());
    }
}
