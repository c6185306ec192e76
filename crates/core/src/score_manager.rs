//! ScoreManager - turns lock results into score, chains, meters and achievements.

use serde::{Deserialize, Serialize};

use crate::board_manager::LockResult;
use crate::scoring::{calculate_attack, calculate_drop_score, calculate_level, calculate_score, ScoreResult};
use crate::stats::{BoosterInventory, GameStats};
use crate::types::{
    BoosterKind, TSpinKind, FOCUS_GAUGE_MAX, FOCUS_PER_LINE, FOCUS_TETRIS_BONUS, FOCUS_TSPIN_BONUS,
    FRENZY_COMBO_THRESHOLD, FRENZY_MS, OVERDRIVE_B2B_THRESHOLD, OVERDRIVE_MS, ZONE_MS,
};

/// One-shot session milestones
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Achievement {
    FirstTetris,
    FirstTSpin,
    PerfectClear,
    Combo5,
    BackToBack3,
    Lines100,
    Score100k,
}

impl Achievement {
    pub const ALL: [Achievement; 7] = [
        Achievement::FirstTetris,
        Achievement::FirstTSpin,
        Achievement::PerfectClear,
        Achievement::Combo5,
        Achievement::BackToBack3,
        Achievement::Lines100,
        Achievement::Score100k,
    ];

    fn earned(&self, stats: &GameStats) -> bool {
        match self {
            Achievement::FirstTetris => stats.tetrises > 0,
            Achievement::FirstTSpin => stats.tspins > 0,
            Achievement::PerfectClear => stats.perfect_clears > 0,
            Achievement::Combo5 => stats.max_combo >= 5,
            Achievement::BackToBack3 => stats.max_b2b_chain >= 3,
            Achievement::Lines100 => stats.rows >= 100,
            Achievement::Score100k => stats.score >= 100_000,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Achievement::FirstTetris => "first_tetris",
            Achievement::FirstTSpin => "first_tspin",
            Achievement::PerfectClear => "perfect_clear",
            Achievement::Combo5 => "combo_5",
            Achievement::BackToBack3 => "back_to_back_3",
            Achievement::Lines100 => "lines_100",
            Achievement::Score100k => "score_100k",
        }
    }
}

/// Everything a single lock changed, for event fan-out.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScoreUpdate {
    pub score: ScoreResult,
    pub lines: u32,
    pub tspin: TSpinKind,
    pub perfect_clear: bool,
    pub combo: i32,
    pub b2b_chain: u32,
    pub level_up: Option<u32>,
    pub zone_started: bool,
    pub frenzy_started: bool,
    pub overdrive_started: bool,
    /// Garbage rows this clear sends to an opponent
    pub attack: u32,
    pub achievements: Vec<Achievement>,
}

/// Timed effects that ran out during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Expired {
    pub zone: bool,
    pub frenzy: bool,
    pub overdrive: bool,
    pub slow_time: bool,
    pub flipped_gravity: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreManager {
    stats: GameStats,
    start_level: u32,
    level_progression: bool,
    unlocked: Vec<Achievement>,
}

impl ScoreManager {
    pub fn new(start_level: u32, level_progression: bool) -> Self {
        Self {
            stats: GameStats::new(start_level),
            start_level,
            level_progression,
            unlocked: Vec::new(),
        }
    }

    pub fn reset(&mut self, start_level: u32, level_progression: bool, boosters: BoosterInventory) {
        *self = Self::new(start_level, level_progression);
        self.stats.boosters = boosters;
    }

    pub fn stats(&self) -> &GameStats {
        &self.stats
    }

    pub fn unlocked(&self) -> &[Achievement] {
        &self.unlocked
    }

    /// Score a locked piece and advance every chain and meter.
    pub fn on_lock(&mut self, result: &LockResult) -> ScoreUpdate {
        let lines = result.lines();
        let stats = &mut self.stats;
        stats.pieces += 1;
        stats.gems += result.collected.gems;
        stats.bombs += result.collected.bombs;

        // Chains before this lock decide the bonuses it earns
        let combo_index = if lines > 0 { stats.combo + 1 } else { -1 };
        let score = calculate_score(
            lines,
            stats.level,
            result.tspin,
            combo_index,
            stats.b2b_chain,
            result.perfect_clear,
            stats.multiplier_percent(),
        );
        stats.score = stats.score.saturating_add(score.total);

        stats.combo = combo_index;
        stats.max_combo = stats.max_combo.max(stats.combo);

        if score.qualifies_for_b2b {
            stats.b2b_chain += 1;
            stats.max_b2b_chain = stats.max_b2b_chain.max(stats.b2b_chain);
        } else if lines > 0 {
            stats.b2b_chain = 0;
        }

        if lines >= 4 {
            stats.tetrises += 1;
        }
        if result.tspin != TSpinKind::None {
            stats.tspins += 1;
        }
        if result.perfect_clear {
            stats.perfect_clears += 1;
        }

        let mut update = ScoreUpdate {
            score,
            lines,
            tspin: result.tspin,
            perfect_clear: result.perfect_clear,
            combo: stats.combo,
            b2b_chain: stats.b2b_chain,
            ..ScoreUpdate::default()
        };

        if lines > 0 {
            stats.rows += lines;
            if self.level_progression {
                let level = calculate_level(self.start_level, stats.rows);
                if level > stats.level {
                    stats.level = level;
                    update.level_up = Some(level);
                }
            }

            if !stats.zone.active {
                stats.focus += lines * FOCUS_PER_LINE;
                if lines >= 4 {
                    stats.focus += FOCUS_TETRIS_BONUS;
                }
                if result.tspin != TSpinKind::None {
                    stats.focus += FOCUS_TSPIN_BONUS;
                }
                if stats.focus >= FOCUS_GAUGE_MAX {
                    stats.focus = 0;
                    stats.zone.start(ZONE_MS);
                    update.zone_started = true;
                }
            }

            if !stats.frenzy.active && stats.combo >= FRENZY_COMBO_THRESHOLD {
                stats.frenzy.start(FRENZY_MS);
                update.frenzy_started = true;
            }
            if !stats.overdrive.active && stats.b2b_chain >= OVERDRIVE_B2B_THRESHOLD {
                stats.overdrive.start(OVERDRIVE_MS);
                update.overdrive_started = true;
            }

            update.attack = calculate_attack(
                lines,
                result.tspin,
                score.b2b_applied,
                combo_index,
                result.perfect_clear,
            );
        }

        stats.score = stats.score.saturating_add(calculate_drop_score(result.hard_drop_cells, true));

        update.achievements = self.check_achievements();
        update
    }

    /// Soft drop points (+1 per cell)
    pub fn add_soft_drop(&mut self, cells: u32) {
        self.stats.score = self.stats.score.saturating_add(calculate_drop_score(cells, false));
    }

    fn check_achievements(&mut self) -> Vec<Achievement> {
        let mut earned = Vec::new();
        for achievement in Achievement::ALL {
            if !self.unlocked.contains(&achievement) && achievement.earned(&self.stats) {
                self.unlocked.push(achievement);
                earned.push(achievement);
            }
        }
        earned
    }

    /// Advance session time and every timed effect.
    pub fn tick(&mut self, elapsed_ms: u32) -> Expired {
        let stats = &mut self.stats;
        stats.time_ms = stats.time_ms.saturating_add(elapsed_ms);
        Expired {
            zone: stats.zone.tick(elapsed_ms),
            frenzy: stats.frenzy.tick(elapsed_ms),
            overdrive: stats.overdrive.tick(elapsed_ms),
            slow_time: stats.slow_time.tick(elapsed_ms),
            flipped_gravity: stats.flipped_gravity.tick(elapsed_ms),
        }
    }

    pub fn consume_booster(&mut self, kind: BoosterKind) -> bool {
        self.stats.boosters.consume(kind)
    }

    pub fn start_slow_time(&mut self, duration_ms: u32) {
        self.stats.slow_time.start(duration_ms);
    }

    pub fn start_flipped_gravity(&mut self, duration_ms: u32) {
        self.stats.flipped_gravity.start(duration_ms);
    }

    /// Collect modifiers removed outside a lock (booster clears).
    pub fn collect(&mut self, gems: u32, bombs: u32) {
        self.stats.gems += gems;
        self.stats.bombs += bombs;
    }

    pub fn set_opponent_hp(&mut self, hp: u32, max_hp: u32) {
        self.stats.boss_hp = hp;
        self.stats.boss_max_hp = max_hp;
    }

    pub fn set_garbage_pending(&mut self, rows: u32) {
        self.stats.garbage_pending = rows;
    }

    pub fn add_lines_sent(&mut self, rows: u32) {
        self.stats.lines_sent += rows;
    }
}

impl Default for ScoreManager {
    fn default() -> Self {
        Self::new(0, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PieceKind;

    fn lock(lines: u8) -> LockResult {
        LockResult {
            cleared_rows: (0..lines).collect(),
            ..LockResult::new(PieceKind::I)
        }
    }

    #[test]
    fn test_b2b_sequence() {
        let mut scores = ScoreManager::default();
        let chain: Vec<u32> = [4, 4, 1, 4]
            .iter()
            .map(|&n| scores.on_lock(&lock(n)).b2b_chain)
            .collect();
        assert_eq!(chain, vec![1, 2, 0, 1]);
    }

    #[test]
    fn test_no_clear_keeps_b2b_but_breaks_combo() {
        let mut scores = ScoreManager::default();
        scores.on_lock(&lock(4));
        assert_eq!(scores.stats().combo, 0);
        let update = scores.on_lock(&lock(0));
        assert_eq!(update.b2b_chain, 1);
        assert_eq!(update.combo, -1);
    }

    #[test]
    fn test_combo_counts_up() {
        let mut scores = ScoreManager::default();
        let combos: Vec<i32> = (0..3).map(|_| scores.on_lock(&lock(1)).combo).collect();
        assert_eq!(combos, vec![0, 1, 2]);
        assert_eq!(scores.stats().score, 40 + (40 + 50) + (40 + 100));
    }

    #[test]
    fn test_level_up_every_ten_lines() {
        let mut scores = ScoreManager::new(0, true);
        let mut level_ups = Vec::new();
        for _ in 0..5 {
            if let Some(level) = scores.on_lock(&lock(4)).level_up {
                level_ups.push(level);
            }
        }
        assert_eq!(scores.stats().rows, 20);
        assert_eq!(level_ups, vec![1, 2]);
    }

    #[test]
    fn test_zone_triggers_at_full_gauge() {
        let mut scores = ScoreManager::default();
        // Each Tetris fills 4 * 8 + 10 = 42
        assert!(!scores.on_lock(&lock(4)).zone_started);
        assert!(!scores.on_lock(&lock(4)).zone_started);
        let update = scores.on_lock(&lock(4));
        assert!(update.zone_started);
        assert_eq!(scores.stats().focus, 0);
        assert!(scores.stats().zone.active);
    }

    #[test]
    fn test_frenzy_at_combo_four() {
        let mut scores = ScoreManager::default();
        let started: Vec<bool> = (0..5).map(|_| scores.on_lock(&lock(1)).frenzy_started).collect();
        assert_eq!(started, vec![false, false, false, false, true]);
    }

    #[test]
    fn test_achievements_fire_once() {
        let mut scores = ScoreManager::default();
        let first = scores.on_lock(&lock(4));
        assert!(first.achievements.contains(&Achievement::FirstTetris));
        let second = scores.on_lock(&lock(4));
        assert!(!second.achievements.contains(&Achievement::FirstTetris));
    }

    #[test]
    fn test_tick_expires_buffs() {
        let mut scores = ScoreManager::default();
        scores.start_slow_time(32);
        assert!(!scores.tick(16).slow_time);
        assert!(scores.tick(16).slow_time);
        assert_eq!(scores.stats().time_ms, 32);
    }

    #[test]
    fn test_hard_drop_points() {
        let mut scores = ScoreManager::default();
        let mut result = lock(0);
        result.hard_drop_cells = 10;
        scores.on_lock(&result);
        assert_eq!(scores.stats().score, 20);
    }
}
