//! Player settings, session setup and host configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::adventure::AdventureLevelConfig;
use crate::modes::daily_seed;
use crate::types::{
    BoardLayout, BoosterKind, Difficulty, GameMode, COUNTDOWN_MS, DEFAULT_ARR_MS, DEFAULT_DAS_MS,
    SOFT_DROP_ARR_MS,
};

pub use blockfall_input::InputConfig;

/// Player-facing tuning, applied without a reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Gravity speed; 100 is normal, higher is faster
    pub speed_percent: u32,
    pub das_ms: u32,
    pub arr_ms: u32,
    pub soft_drop_arr_ms: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            speed_percent: 100,
            das_ms: DEFAULT_DAS_MS,
            arr_ms: DEFAULT_ARR_MS,
            soft_drop_arr_ms: SOFT_DROP_ARR_MS,
        }
    }
}

/// Everything a session reset needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSetup {
    pub start_level: u32,
    pub mode: GameMode,
    pub adventure: Option<AdventureLevelConfig>,
    /// Starting garbage rows removed as assistance
    pub assist_rows: u8,
    pub boosters: Vec<BoosterKind>,
    pub difficulty: Difficulty,
    pub layout: BoardLayout,
    pub seed: u32,
    pub countdown_ms: u32,
    /// Day number for the Daily challenge; overrides `seed`
    pub daily_day: Option<u32>,
}

impl Default for GameSetup {
    fn default() -> Self {
        Self {
            start_level: 0,
            mode: GameMode::Marathon,
            adventure: None,
            assist_rows: 0,
            boosters: Vec::new(),
            difficulty: Difficulty::Normal,
            layout: BoardLayout::Comfort,
            seed: 1,
            countdown_ms: COUNTDOWN_MS,
            daily_day: None,
        }
    }
}

impl GameSetup {
    pub fn for_mode(mode: GameMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = seed;
        self
    }

    /// Seed the simulation actually runs with.
    pub fn effective_seed(&self) -> u32 {
        match (self.mode, self.daily_day) {
            (GameMode::Daily, Some(day)) => daily_seed(day),
            _ => self.seed,
        }
    }
}

/// Terminal host configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostConfig {
    pub seed: Option<u32>,
    pub mode: GameMode,
    pub difficulty: Difficulty,
    pub layout: BoardLayout,
    pub save_dir: PathBuf,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            seed: None,
            mode: GameMode::Marathon,
            difficulty: Difficulty::Normal,
            layout: BoardLayout::Comfort,
            save_dir: PathBuf::from(".blockfall"),
        }
    }
}

impl HostConfig {
    /// Create from `BLOCKFALL_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create from any key lookup; unknown or malformed values fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let get = |key: &str| {
            lookup(key)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };

        Self {
            seed: get("BLOCKFALL_SEED").and_then(|s| s.parse().ok()),
            mode: get("BLOCKFALL_MODE")
                .and_then(|s| GameMode::from_str(&s))
                .unwrap_or(defaults.mode),
            difficulty: get("BLOCKFALL_DIFFICULTY")
                .and_then(|s| Difficulty::from_str(&s))
                .unwrap_or(defaults.difficulty),
            layout: get("BLOCKFALL_LAYOUT")
                .and_then(|s| BoardLayout::from_str(&s))
                .unwrap_or(defaults.layout),
            save_dir: get("BLOCKFALL_SAVE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.save_dir),
        }
    }
}
