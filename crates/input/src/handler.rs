//! DAS/ARR input manager.
//!
//! Timing is driven entirely by the `elapsed_ms` passed to [`InputManager::update`],
//! so repeats depend only on simulated time, never on the render rate or the
//! wall clock. Terminals that never report key releases can opt into an idle
//! timeout through [`InputConfig::key_release_timeout_ms`].

use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

use crate::types::{GameAction, DEFAULT_ARR_MS, DEFAULT_DAS_MS, SOFT_DROP_ARR_MS, SOFT_DROP_DAS_MS};

/// Moves emitted when a zero-ARR direction finishes charging.
///
/// Wide enough to cross the widest board layout.
pub const ARR_ZERO_BURST: usize = 20;

/// Maximum actions returned by one [`InputManager::update`].
pub const MAX_ACTIONS_PER_UPDATE: usize = 64;

/// Repeat timing, applied without a reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputConfig {
    pub das_ms: u32,
    /// 0 charges straight to the wall.
    pub arr_ms: u32,
    pub soft_drop_arr_ms: u32,
    /// Release held keys after this much time without a press event.
    pub key_release_timeout_ms: Option<u32>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            das_ms: DEFAULT_DAS_MS,
            arr_ms: DEFAULT_ARR_MS,
            soft_drop_arr_ms: SOFT_DROP_ARR_MS,
            key_release_timeout_ms: None,
        }
    }
}

/// Direction for horizontal movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HorizontalDirection {
    Left,
    Right,
    None,
}

impl HorizontalDirection {
    fn action(self) -> Option<GameAction> {
        match self {
            HorizontalDirection::Left => Some(GameAction::MoveLeft),
            HorizontalDirection::Right => Some(GameAction::MoveRight),
            HorizontalDirection::None => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct RepeatTimer {
    das_timer: u32,
    arr_accumulator: u32,
    charged: bool,
}

impl RepeatTimer {
    fn restart(&mut self) {
        *self = Self::default();
    }

    /// Advance by `elapsed_ms` and return how many repeats fire.
    fn advance(&mut self, elapsed_ms: u32, das: u32, arr: u32) -> usize {
        let prev_das = self.das_timer;
        self.das_timer = self.das_timer.saturating_add(elapsed_ms);
        if self.das_timer < das {
            return 0;
        }

        if arr == 0 {
            if self.charged {
                return usize::from(elapsed_ms > 0);
            }
            self.charged = true;
            return ARR_ZERO_BURST;
        }

        // Only time past the DAS threshold feeds the repeat accumulator.
        let excess = if prev_das < das {
            self.das_timer - das
        } else {
            elapsed_ms
        };
        self.arr_accumulator = self.arr_accumulator.saturating_add(excess);
        let repeats = self.arr_accumulator / arr;
        self.arr_accumulator %= arr;
        repeats as usize
    }
}

/// Tracks held actions and turns them into timed move intents.
#[derive(Debug, Clone)]
pub struct InputManager {
    config: InputConfig,
    left_held: bool,
    right_held: bool,
    horizontal: HorizontalDirection,
    down_held: bool,
    idle_ms: u32,
    horizontal_repeat: RepeatTimer,
    down_repeat: RepeatTimer,
}

impl InputManager {
    pub fn new() -> Self {
        Self::with_config(InputConfig::default())
    }

    pub fn with_config(config: InputConfig) -> Self {
        Self {
            config,
            left_held: false,
            right_held: false,
            horizontal: HorizontalDirection::None,
            down_held: false,
            idle_ms: 0,
            horizontal_repeat: RepeatTimer::default(),
            down_repeat: RepeatTimer::default(),
        }
    }

    pub fn config(&self) -> InputConfig {
        self.config
    }

    /// Replace the timing config; held keys stay held.
    pub fn set_config(&mut self, config: InputConfig) {
        self.config = config;
    }

    pub fn direction(&self) -> HorizontalDirection {
        self.horizontal
    }

    pub fn is_held(&self, action: GameAction) -> bool {
        match action {
            GameAction::MoveLeft => self.left_held,
            GameAction::MoveRight => self.right_held,
            GameAction::SoftDrop => self.down_held,
            _ => false,
        }
    }

    /// Register a press. Returns the action to apply immediately, if any.
    ///
    /// A repeated press of the key already driving movement (terminal key
    /// repeat) only refreshes the idle timer.
    pub fn press(&mut self, action: GameAction) -> Option<GameAction> {
        match action {
            GameAction::MoveLeft => {
                self.idle_ms = 0;
                self.left_held = true;
                self.take_direction(HorizontalDirection::Left)
            }
            GameAction::MoveRight => {
                self.idle_ms = 0;
                self.right_held = true;
                self.take_direction(HorizontalDirection::Right)
            }
            GameAction::SoftDrop => {
                self.idle_ms = 0;
                if self.down_held {
                    None
                } else {
                    self.down_held = true;
                    self.down_repeat.restart();
                    Some(GameAction::SoftDrop)
                }
            }
            other => Some(other),
        }
    }

    fn take_direction(&mut self, direction: HorizontalDirection) -> Option<GameAction> {
        if self.horizontal == direction {
            return None;
        }
        self.horizontal = direction;
        self.horizontal_repeat.restart();
        direction.action()
    }

    pub fn release(&mut self, action: GameAction) {
        match action {
            GameAction::MoveLeft => {
                self.left_held = false;
                if self.horizontal == HorizontalDirection::Left {
                    self.fall_back(self.right_held, HorizontalDirection::Right);
                }
            }
            GameAction::MoveRight => {
                self.right_held = false;
                if self.horizontal == HorizontalDirection::Right {
                    self.fall_back(self.left_held, HorizontalDirection::Left);
                }
            }
            GameAction::SoftDrop => {
                self.down_held = false;
                self.down_repeat.restart();
            }
            _ => {}
        }
    }

    /// The still-held opposite direction takes over and charges DAS from zero.
    fn fall_back(&mut self, other_held: bool, other: HorizontalDirection) {
        self.horizontal = if other_held {
            other
        } else {
            HorizontalDirection::None
        };
        self.horizontal_repeat.restart();
    }

    fn release_all(&mut self) {
        self.left_held = false;
        self.right_held = false;
        self.horizontal = HorizontalDirection::None;
        self.down_held = false;
        self.horizontal_repeat.restart();
        self.down_repeat.restart();
    }

    /// Advance repeat timers and collect auto-repeated actions.
    pub fn update(&mut self, elapsed_ms: u32) -> ArrayVec<GameAction, MAX_ACTIONS_PER_UPDATE> {
        let mut actions = ArrayVec::new();

        if let Some(timeout) = self.config.key_release_timeout_ms {
            self.idle_ms = self.idle_ms.saturating_add(elapsed_ms);
            if self.idle_ms > timeout && (self.horizontal != HorizontalDirection::None || self.down_held) {
                log::debug!("auto-releasing held keys after {}ms idle", self.idle_ms);
                self.release_all();
            }
        }

        if let Some(action) = self.horizontal.action() {
            let repeats = self
                .horizontal_repeat
                .advance(elapsed_ms, self.config.das_ms, self.config.arr_ms);
            for _ in 0..repeats {
                if actions.try_push(action).is_err() {
                    break;
                }
            }
        }

        if self.down_held {
            let repeats = self.down_repeat.advance(
                elapsed_ms,
                SOFT_DROP_DAS_MS,
                self.config.soft_drop_arr_ms,
            );
            for _ in 0..repeats {
                if actions.try_push(GameAction::SoftDrop).is_err() {
                    break;
                }
            }
        }

        actions
    }

    /// Drop all held state. Called on session reset.
    pub fn reset(&mut self) {
        self.release_all();
        self.idle_ms = 0;
    }
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}
