//! Exterminator - an emoji bug-squashing reaction game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (spawning, bug lifecycle, scoring)
//! - `tuning`: Data-driven game balance presets
//! - `settings`: Player preferences persisted to LocalStorage
//! - `audio`: Web Audio SFX synthesis (wasm only)
//!
//! The browser shell (DOM bug elements, HUD, buttons) lives in `main.rs`.

#[cfg(target_arch = "wasm32")]
pub mod audio;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use settings::{DifficultyPreset, Settings};
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz is plenty for tap gameplay)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Score needed to win
    pub const TARGET_SCORE: u32 = 20_000;
    /// Escaped bugs allowed before losing
    pub const MISS_LIMIT: u32 = 10;

    /// Points per squashed regular bug
    pub const POINTS_REGULAR: u32 = 1000;
    /// Points per squashed fast bug
    pub const POINTS_FAST: u32 = 2000;

    /// How long a squashed bug lingers for its pop animation (seconds)
    pub const DESPAWN_DELAY: f32 = 0.16;
    /// Cadence of the defensive offscreen sweep (seconds)
    pub const SWEEP_PERIOD: f32 = 2.0;
    /// Rise progress past which a bug is definitely offscreen
    pub const OFFSCREEN_PROGRESS: f32 = 1.1;

    /// Horizontal spawn lane, in percent of screen width
    pub const LANE_MIN_X: f32 = 8.0;
    pub const LANE_MAX_X: f32 = 92.0;

    /// Stacking depth range for spawned bugs (cosmetic z-ordering)
    pub const DEPTH_MIN: u8 = 10;
    pub const DEPTH_MAX: u8 = 40;
}
