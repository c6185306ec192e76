//! GameCore engine - session orchestration on top of the pure simulation.
//!
//! [`GameCore`] composes the board, score, input, adventure and booster
//! managers behind one command surface and publishes everything that happens
//! on an [`EventBus`]. It performs no I/O of its own: time comes in through
//! `update(dt)`, persistence goes through a [`KeyValueStore`].
//!
//! ```
//! use blockfall_engine::{GameCore, GameSetup};
//! use blockfall_engine::types::{GameAction, GameMode, GameStateKind};
//!
//! let mut core = GameCore::new();
//! let mut setup = GameSetup::for_mode(GameMode::Sprint).with_seed(7);
//! setup.countdown_ms = 0;
//! core.reset_game(setup);
//! assert_eq!(core.state(), GameStateKind::Playing);
//!
//! core.handle_action(GameAction::HardDrop);
//! core.update(16);
//! assert_eq!(core.stats().pieces, 1);
//! ```

pub mod adventure;
pub mod boosters;
pub mod campaign;
pub mod config;
pub mod events;
pub mod game_core;
pub mod modes;
pub mod persistence;
pub mod replay;
pub mod state;

pub use blockfall_types as types;

pub use adventure::{
    star_rating, AdventureLevelConfig, AdventureManager, BossConfig, Gimmick, Objective,
    ObjectiveKind, ObjectiveStatus, Rewards, StoryNodes,
};
pub use boosters::{BoosterController, PendingSelection, SelectionError, WildcardOrigin};
pub use config::{GameConfig, GameSetup, HostConfig, InputConfig};
pub use events::{
    AudioCue, EndReason, EventBus, EventKind, GameEvent, SessionResult, SubscriptionId, VisualEffect,
};
pub use game_core::{GameCore, MAX_FRAME_MS};
pub use modes::{daily_seed, BattleOpponent, ModeRules, OpponentRules};
pub use persistence::{
    FileStore, KeyValueStore, MemoryStore, PersistenceError, SaveData, StoreError, SAVE_KEY,
};
pub use replay::{
    PlaybackResult, ReplayCommand, ReplayData, ReplayEntry, ReplayPlayer, ReplayRecorder,
};
pub use state::StateManager;
