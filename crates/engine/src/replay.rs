//! Deterministic replays.
//!
//! A replay is the session setup plus every accepted command stamped with the
//! simulation time it was applied at. Because the core is driven by a fixed
//! tick and seeded RNGs, re-applying the commands at the same ticks rebuilds the
//! exact same session, which the final score and board hash confirm.

use serde::{Deserialize, Serialize};

use blockfall_core::GameStats;

use crate::config::{GameConfig, GameSetup};
use crate::game_core::GameCore;
use crate::types::{GameAction, GameStateKind, PieceKind};

pub const REPLAY_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReplayCommand {
    Action(GameAction),
    ChooseWildcard(PieceKind),
    ExecuteBomb(u8),
    ExecuteLineClear(u8),
    CancelSelection,
    /// Player settings changed mid-session
    SetConfig(GameConfig),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayEntry {
    /// Simulation time the command was applied at
    pub at_ms: u32,
    pub command: ReplayCommand,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayData {
    pub version: u32,
    pub setup: GameSetup,
    /// Player settings in effect when the session was reset
    pub config: GameConfig,
    pub entries: Vec<ReplayEntry>,
    pub final_stats: GameStats,
    pub final_score: u32,
    pub final_board_hash: u64,
    pub duration_ms: u32,
}

impl ReplayData {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl Default for ReplayData {
    fn default() -> Self {
        Self {
            version: REPLAY_VERSION,
            setup: GameSetup::default(),
            config: GameConfig::default(),
            entries: Vec::new(),
            final_stats: GameStats::default(),
            final_score: 0,
            final_board_hash: 0,
            duration_ms: 0,
        }
    }
}

/// Collects commands while a session runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayRecorder {
    setup: GameSetup,
    config: GameConfig,
    /// Settings as of the last recorded entry
    current_config: GameConfig,
    entries: Vec<ReplayEntry>,
}

impl ReplayRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, setup: GameSetup, config: GameConfig) {
        self.setup = setup;
        self.config = config;
        self.current_config = config;
        self.entries.clear();
    }

    pub fn record(&mut self, at_ms: u32, command: ReplayCommand) {
        self.entries.push(ReplayEntry { at_ms, command });
    }

    /// Record a settings change; repeats of the current settings are skipped.
    pub fn record_config(&mut self, at_ms: u32, config: GameConfig) {
        if config == self.current_config {
            return;
        }
        self.current_config = config;
        self.record(at_ms, ReplayCommand::SetConfig(config));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The replay so far, stamped with the given final state.
    pub fn snapshot(&self, final_stats: &GameStats, final_board_hash: u64, duration_ms: u32) -> ReplayData {
        ReplayData {
            version: REPLAY_VERSION,
            setup: self.setup.clone(),
            config: self.config,
            entries: self.entries.clone(),
            final_stats: final_stats.clone(),
            final_score: final_stats.score,
            final_board_hash,
            duration_ms,
        }
    }
}

/// Outcome of a finished playback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackResult {
    pub stats: GameStats,
    pub score: u32,
    pub board_hash: u64,
    pub state: GameStateKind,
    pub sim_time_ms: u32,
}

impl PlaybackResult {
    /// Whether the playback reproduced the recorded session: same stats and
    /// same grid.
    pub fn matches(&self, data: &ReplayData) -> bool {
        self.stats == data.final_stats
            && self.score == data.final_score
            && self.board_hash == data.final_board_hash
    }
}

/// Re-runs a [`ReplayData`] on a [`GameCore`], tick by tick.
#[derive(Debug, Clone)]
pub struct ReplayPlayer {
    data: ReplayData,
    cursor: usize,
}

impl ReplayPlayer {
    /// Reset `core` to the recorded settings and setup, skipping the countdown.
    pub fn new(data: ReplayData, core: &mut GameCore) -> Self {
        let mut setup = data.setup.clone();
        setup.countdown_ms = 0;
        core.set_game_config(data.config);
        core.reset_game(setup);
        Self { data, cursor: 0 }
    }

    pub fn data(&self) -> &ReplayData {
        &self.data
    }

    pub fn is_finished(&self, core: &GameCore) -> bool {
        let state = core.state();
        if matches!(state, GameStateKind::GameOver | GameStateKind::Victory | GameStateKind::Menu) {
            return true;
        }
        let remaining = self.cursor < self.data.entries.len();
        if state != GameStateKind::Playing {
            // Only a recorded command can leave a selection.
            return !remaining;
        }
        !remaining && core.sim_time_ms() >= self.data.duration_ms
    }

    /// Apply due commands, then advance one tick if the simulation is running.
    /// Returns false once playback is finished.
    pub fn step(&mut self, core: &mut GameCore) -> bool {
        if self.is_finished(core) {
            return false;
        }
        let mut applied = false;
        while let Some(entry) = self.data.entries.get(self.cursor) {
            if entry.at_ms > core.sim_time_ms() {
                break;
            }
            if !core.apply_replay_command(entry.command) {
                log::warn!("replay command {:?} at {}ms was rejected", entry.command, entry.at_ms);
            }
            self.cursor += 1;
            applied = true;
        }
        if core.state() != GameStateKind::Playing {
            // Time is frozen; without a command due now nothing can move on.
            return applied;
        }
        if core.sim_time_ms() < self.data.duration_ms || self.cursor < self.data.entries.len() {
            core.simulate_tick();
        }
        true
    }

    /// Run to the end and report the final state.
    pub fn play_to_end(&mut self, core: &mut GameCore) -> PlaybackResult {
        while self.step(core) {}
        PlaybackResult {
            stats: core.stats().clone(),
            score: core.stats().score,
            board_hash: core.board_hash(),
            state: core.state(),
            sim_time_ms: core.sim_time_ms(),
        }
    }
}
