//! Game settings and preferences
//!
//! Persisted in LocalStorage on the web build; session state itself is
//! never persisted.

use serde::{Deserialize, Serialize};

use crate::tuning::Tuning;

/// Difficulty preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DifficultyPreset {
    /// Aggressive spawn ramp, short lifetimes, no concurrency cap
    #[default]
    Classic,
    /// Gentle ramp, slow bugs, at most two on screen
    Relaxed,
}

impl DifficultyPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            DifficultyPreset::Classic => "Classic",
            DifficultyPreset::Relaxed => "Relaxed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "classic" => Some(DifficultyPreset::Classic),
            "relaxed" | "gentle" => Some(DifficultyPreset::Relaxed),
            _ => None,
        }
    }

    /// Balance profile for this preset
    pub fn tuning(&self) -> Tuning {
        match self {
            DifficultyPreset::Classic => Tuning::classic(),
            DifficultyPreset::Relaxed => Tuning::relaxed(),
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Difficulty preset
    pub difficulty: DifficultyPreset,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Mute when the tab is hidden
    pub mute_on_blur: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            difficulty: DifficultyPreset::Classic,
            master_volume: 0.8,
            sfx_volume: 1.0,
            mute_on_blur: true,
        }
    }
}

impl Settings {
    /// LocalStorage key
    const STORAGE_KEY: &'static str = "exterminator_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(settings) = serde_json::from_str(&json) {
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
    fn test_preset_round_trip() {
        for preset in [DifficultyPreset::Classic, DifficultyPreset::Relaxed] {
            assert_eq!(DifficultyPreset::from_str(preset.as_str()), Some(preset));
        }
        assert_eq!(DifficultyPreset::from_str("nope"), None);
        assert_eq!(
            DifficultyPreset::from_str("gentle"),
            Some(DifficultyPreset::Relaxed)
        );
    }

    #[test]
    fn test_preset_selects_matching_tuning() {
        assert_eq!(DifficultyPreset::Classic.tuning(), Tuning::classic());
        assert_eq!(DifficultyPreset::Relaxed.tuning(), Tuning::relaxed());
    }

    #[test]
    fn test_settings_serde_round_trip() {
        let settings = Settings {
            difficulty: DifficultyPreset::Relaxed,
            master_volume: 0.5,
            sfx_volume: 0.9,
            mute_on_blur: false,
        };
        let json = serde_json::to_string(&settings).unwrap();
        let back: Settings = serde_json::from_str(&json).unwrap();
        assert_eq!(back.difficulty, DifficultyPreset::Relaxed);
        assert!(!back.mute_on_blur);
    }
}
