//! Session statistics - the flat, read-only view every consumer renders from.

use serde::{Deserialize, Serialize};

use crate::types::BoosterKind;

/// Remaining duration of a timed buff or booster effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Timer {
    pub active: bool,
    pub remaining_ms: u32,
}

impl Timer {
    pub fn start(&mut self, duration_ms: u32) {
        self.active = true;
        self.remaining_ms = duration_ms;
    }

    /// Count down; returns true on the tick the timer runs out.
    pub fn tick(&mut self, elapsed_ms: u32) -> bool {
        if !self.active {
            return false;
        }
        self.remaining_ms = self.remaining_ms.saturating_sub(elapsed_ms);
        if self.remaining_ms == 0 {
            self.active = false;
            return true;
        }
        false
    }

    pub fn stop(&mut self) {
        *self = Timer::default();
    }
}

/// Booster counts carried into the session, indexed by [`BoosterKind::index`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BoosterInventory {
    counts: [u8; 5],
}

impl BoosterInventory {
    pub fn from_list(list: &[BoosterKind]) -> Self {
        let mut inventory = Self::default();
        for &kind in list {
            inventory.add(kind, 1);
        }
        inventory
    }

    pub fn count(&self, kind: BoosterKind) -> u8 {
        self.counts[kind.index()]
    }

    /// Whether the booster can be activated right now.
    pub fn is_ready(&self, kind: BoosterKind) -> bool {
        self.count(kind) > 0
    }

    pub fn add(&mut self, kind: BoosterKind, n: u8) {
        let slot = &mut self.counts[kind.index()];
        *slot = slot.saturating_add(n);
    }

    /// Use one charge. Returns false when none are left.
    pub fn consume(&mut self, kind: BoosterKind) -> bool {
        let slot = &mut self.counts[kind.index()];
        if *slot == 0 {
            return false;
        }
        *slot -= 1;
        true
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStats {
    pub score: u32,
    pub rows: u32,
    pub level: u32,
    pub time_ms: u32,
    pub pieces: u32,

    /// -1 when no combo chain is running
    pub combo: i32,
    pub max_combo: i32,
    pub b2b_chain: u32,
    pub max_b2b_chain: u32,

    pub tetrises: u32,
    pub tspins: u32,
    pub perfect_clears: u32,
    pub gems: u32,
    pub bombs: u32,

    pub focus: u32,
    pub zone: Timer,
    pub frenzy: Timer,
    pub overdrive: Timer,
    pub slow_time: Timer,
    pub flipped_gravity: Timer,

    pub boosters: BoosterInventory,

    /// Boss or battle opponent health; 0/0 when there is no opponent
    pub boss_hp: u32,
    pub boss_max_hp: u32,

    pub garbage_pending: u32,
    pub lines_sent: u32,
}

impl GameStats {
    pub fn new(start_level: u32) -> Self {
        Self {
            level: start_level,
            ..Self::default()
        }
    }

    /// Percent multiplier applied to the line-clear portion of the score.
    pub fn multiplier_percent(&self) -> u32 {
        use crate::types::{FRENZY_BONUS_PERCENT, OVERDRIVE_BONUS_PERCENT, ZONE_BONUS_PERCENT};

        let mut percent = 100;
        if self.zone.active {
            percent += ZONE_BONUS_PERCENT;
        }
        if self.frenzy.active {
            percent += FRENZY_BONUS_PERCENT;
        }
        if self.overdrive.active {
            percent += OVERDRIVE_BONUS_PERCENT;
        }
        percent
    }
}

impl Default for GameStats {
    fn default() -> Self {
        Self {
            score: 0,
            rows: 0,
            level: 0,
            time_ms: 0,
            pieces: 0,
            combo: -1,
            max_combo: -1,
            b2b_chain: 0,
            max_b2b_chain: 0,
            tetrises: 0,
            tspins: 0,
            perfect_clears: 0,
            gems: 0,
            bombs: 0,
            focus: 0,
            zone: Timer::default(),
            frenzy: Timer::default(),
            overdrive: Timer::default(),
            slow_time: Timer::default(),
            flipped_gravity: Timer::default(),
            boosters: BoosterInventory::default(),
            boss_hp: 0,
            boss_max_hp: 0,
            garbage_pending: 0,
            lines_sent: 0,
        }
    }
}
