//! Per-mode rules and the Battle opponent.

use serde::{Deserialize, Serialize};

use blockfall_core::SimpleRng;

use crate::types::{Difficulty, GameMode};

pub const SPRINT_LINES: u32 = 40;
pub const BLITZ_MS: u32 = 120_000;
pub const TIME_ATTACK_MS: u32 = 180_000;
pub const PUZZLE_PIECE_LIMIT: u32 = 40;
pub const PUZZLE_GARBAGE_ROWS: u8 = 6;
pub const BATTLE_OPPONENT_HP: u32 = 30;
pub const BATTLE_ATTACK_MS: u32 = 6_000;
/// Largest single opponent attack
pub const BATTLE_MAX_ATTACK_ROWS: u32 = 3;

const OPPONENT_SALT: u32 = 0xBB67_AE85;
const DAILY_SALT: u32 = 0x3C6E_F372;

/// Battle opponent parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpponentRules {
    pub hp: u32,
    pub attack_interval_ms: u32,
}

/// Win/lose conditions and setup for a mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeRules {
    pub mode: GameMode,
    /// Clearing this many rows wins
    pub line_goal: Option<u32>,
    /// Session ends when play time reaches this
    pub time_limit_ms: Option<u32>,
    /// Running out of pieces loses
    pub piece_limit: Option<u32>,
    /// Removing every garbage cell wins
    pub clear_garbage_goal: bool,
    /// Overflow wipes the board instead of ending the session
    pub top_out_wipes: bool,
    pub starting_garbage: u8,
    pub level_progression: bool,
    pub opponent: Option<OpponentRules>,
}

impl ModeRules {
    pub fn for_mode(mode: GameMode, difficulty: Difficulty) -> Self {
        let base = Self {
            mode,
            line_goal: None,
            time_limit_ms: None,
            piece_limit: None,
            clear_garbage_goal: false,
            top_out_wipes: false,
            starting_garbage: 0,
            level_progression: true,
            opponent: None,
        };
        match mode {
            GameMode::Marathon | GameMode::Adventure => base,
            GameMode::Sprint => Self {
                line_goal: Some(SPRINT_LINES),
                level_progression: false,
                ..base
            },
            GameMode::Blitz | GameMode::Daily => Self {
                time_limit_ms: Some(BLITZ_MS),
                ..base
            },
            GameMode::TimeAttack => Self {
                time_limit_ms: Some(TIME_ATTACK_MS),
                ..base
            },
            GameMode::Zen => Self {
                top_out_wipes: true,
                level_progression: false,
                ..base
            },
            GameMode::Puzzle => Self {
                piece_limit: Some(PUZZLE_PIECE_LIMIT),
                clear_garbage_goal: true,
                starting_garbage: PUZZLE_GARBAGE_ROWS,
                level_progression: false,
                ..base
            },
            GameMode::Battle => Self {
                opponent: Some(OpponentRules {
                    hp: BATTLE_OPPONENT_HP,
                    attack_interval_ms: BATTLE_ATTACK_MS * difficulty.attack_interval_percent() / 100,
                }),
                ..base
            },
        }
    }
}

/// Seed shared by everyone playing the Daily challenge on `day`.
pub fn daily_seed(day: u32) -> u32 {
    SimpleRng::fork(day, DAILY_SALT).next_u32()
}

/// AI opponent that sends garbage on a fixed cadence and takes damage from clears.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleOpponent {
    hp: u32,
    max_hp: u32,
    interval_ms: u32,
    timer_ms: u32,
    rng: SimpleRng,
}

impl BattleOpponent {
    pub fn new(rules: OpponentRules, seed: u32) -> Self {
        Self {
            hp: rules.hp,
            max_hp: rules.hp,
            interval_ms: rules.attack_interval_ms.max(1),
            timer_ms: 0,
            rng: SimpleRng::fork(seed, OPPONENT_SALT),
        }
    }

    pub fn hp(&self) -> u32 {
        self.hp
    }

    pub fn max_hp(&self) -> u32 {
        self.max_hp
    }

    pub fn is_defeated(&self) -> bool {
        self.hp == 0
    }

    /// Apply outgoing garbage as damage. Returns the remaining HP.
    pub fn damage(&mut self, rows: u32) -> u32 {
        self.hp = self.hp.saturating_sub(rows);
        self.hp
    }

    /// Advance the attack timer; returns garbage rows when an attack lands.
    pub fn tick(&mut self, elapsed_ms: u32) -> Option<u8> {
        if self.is_defeated() {
            return None;
        }
        self.timer_ms += elapsed_ms;
        if self.timer_ms < self.interval_ms {
            return None;
        }
        self.timer_ms -= self.interval_ms;
        let rows = 1 + self.rng.next_range(BATTLE_MAX_ATTACK_ROWS);
        Some(rows as u8)
    }
}
