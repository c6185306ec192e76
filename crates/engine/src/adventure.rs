//! AdventureManager - objectives, boss fights, gimmicks and star ratings.

use serde::{Deserialize, Serialize};

use blockfall_core::GameStats;

use crate::types::{Difficulty, TSpinKind};

/// Boss damage by rows cleared at once (index = rows, capped at four).
const BOSS_DAMAGE: [u32; 5] = [0, 10, 25, 40, 60];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectiveKind {
    Lines,
    Score,
    Gems,
    Bombs,
    Tetris,
    Combo,
    /// Clear `target` rows within the move limit
    Moves,
    /// Survive `target` seconds
    TimeSurvival,
    /// Bring the boss to zero HP
    Boss,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Objective {
    pub kind: ObjectiveKind,
    pub target: u32,
    pub time_limit_ms: Option<u32>,
    /// Maximum pieces that may be locked
    pub move_limit: Option<u32>,
}

impl Objective {
    pub fn new(kind: ObjectiveKind, target: u32) -> Self {
        Self {
            kind,
            target,
            time_limit_ms: None,
            move_limit: None,
        }
    }
}

/// Level modifiers applied at session start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gimmick {
    StartingGarbage(u8),
    /// Gems embedded in the starting garbage
    Gems(u32),
    /// Bomb blocks embedded in the starting garbage
    BombBlocks(u32),
    RisingGarbage { interval_ms: u32, rows: u8 },
    FlippedGravity,
    Wildcards { every: u32 },
    SpeedBoost { percent: u32 },
    ExtendedShapes,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BossConfig {
    pub name: String,
    pub hp: u32,
    pub attack_interval_ms: u32,
    pub attack_rows: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StoryNodes {
    pub intro: Vec<String>,
    pub outro: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rewards {
    pub coins: u32,
    pub xp: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdventureLevelConfig {
    pub id: u32,
    pub name: String,
    pub objective: Objective,
    pub gimmicks: Vec<Gimmick>,
    pub boss: Option<BossConfig>,
    pub story: StoryNodes,
    pub rewards: Rewards,
    pub start_level: u32,
}

impl AdventureLevelConfig {
    pub fn starting_garbage(&self) -> u8 {
        self.gimmicks
            .iter()
            .map(|g| match g {
                Gimmick::StartingGarbage(rows) => *rows,
                _ => 0,
            })
            .sum()
    }

    pub fn gems(&self) -> u32 {
        self.gimmicks
            .iter()
            .map(|g| if let Gimmick::Gems(n) = g { *n } else { 0 })
            .sum()
    }

    pub fn bomb_blocks(&self) -> u32 {
        self.gimmicks
            .iter()
            .map(|g| if let Gimmick::BombBlocks(n) = g { *n } else { 0 })
            .sum()
    }

    pub fn flipped(&self) -> bool {
        self.gimmicks.contains(&Gimmick::FlippedGravity)
    }

    pub fn extended_shapes(&self) -> bool {
        self.gimmicks.contains(&Gimmick::ExtendedShapes)
    }

    pub fn wildcard_every(&self) -> Option<u32> {
        self.gimmicks.iter().find_map(|g| match g {
            Gimmick::Wildcards { every } => Some(*every),
            _ => None,
        })
    }

    /// Gravity speed multiplier in percent.
    pub fn speed_percent(&self) -> u32 {
        self.gimmicks
            .iter()
            .find_map(|g| match g {
                Gimmick::SpeedBoost { percent } => Some(*percent),
                _ => None,
            })
            .unwrap_or(100)
    }

    fn rising_garbage(&self) -> Option<(u32, u8)> {
        self.gimmicks.iter().find_map(|g| match g {
            Gimmick::RisingGarbage { interval_ms, rows } => Some((*interval_ms, *rows)),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectiveStatus {
    InProgress,
    Complete,
    Failed,
}

/// Stars for a completion ratio in percent.
pub fn star_rating(ratio_percent: u32) -> u8 {
    match ratio_percent {
        r if r >= 100 => 3,
        r if r >= 75 => 2,
        r if r >= 50 => 1,
        _ => 0,
    }
}

/// Damage a clear deals to a boss.
pub fn boss_damage(lines: u32, tspin: TSpinKind) -> u32 {
    let base = BOSS_DAMAGE[lines.min(4) as usize];
    if tspin == TSpinKind::Full {
        base * 2
    } else {
        base
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AdventureManager {
    config: Option<AdventureLevelConfig>,
    boss_hp: u32,
    boss_max_hp: u32,
    boss_interval_ms: u32,
    boss_timer_ms: u32,
    rising_timer_ms: u32,
}

impl AdventureManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a level. Boss cadence is scaled by difficulty.
    pub fn start(&mut self, config: AdventureLevelConfig, difficulty: Difficulty) {
        let (hp, interval) = match &config.boss {
            Some(boss) => (
                boss.hp,
                boss.attack_interval_ms * difficulty.attack_interval_percent() / 100,
            ),
            None => (0, 0),
        };
        log::debug!("adventure level {} '{}' started", config.id, config.name);
        *self = Self {
            config: Some(config),
            boss_hp: hp,
            boss_max_hp: hp,
            boss_interval_ms: interval.max(1),
            boss_timer_ms: 0,
            rising_timer_ms: 0,
        };
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn config(&self) -> Option<&AdventureLevelConfig> {
        self.config.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.config.is_some()
    }

    pub fn boss_hp(&self) -> u32 {
        self.boss_hp
    }

    pub fn boss_max_hp(&self) -> u32 {
        self.boss_max_hp
    }

    /// Apply a line clear to the boss. Returns the new HP if a boss is present.
    pub fn on_clear(&mut self, lines: u32, tspin: TSpinKind) -> Option<u32> {
        self.config.as_ref()?.boss.as_ref()?;
        if lines == 0 {
            return None;
        }
        self.boss_hp = self.boss_hp.saturating_sub(boss_damage(lines, tspin));
        Some(self.boss_hp)
    }

    /// Advance boss attacks and rising garbage. Returns rows to queue.
    pub fn tick(&mut self, elapsed_ms: u32) -> u8 {
        let Some(config) = &self.config else {
            return 0;
        };
        let mut rows = 0u8;

        if let Some(boss) = &config.boss {
            if self.boss_hp > 0 {
                self.boss_timer_ms += elapsed_ms;
                if self.boss_timer_ms >= self.boss_interval_ms {
                    self.boss_timer_ms -= self.boss_interval_ms;
                    rows = rows.saturating_add(boss.attack_rows);
                }
            }
        }

        if let Some((interval_ms, rise)) = config.rising_garbage() {
            self.rising_timer_ms += elapsed_ms;
            if self.rising_timer_ms >= interval_ms.max(1) {
                self.rising_timer_ms -= interval_ms.max(1);
                rows = rows.saturating_add(rise);
            }
        }
        rows
    }

    /// Current value measured against the objective target.
    pub fn progress(&self, stats: &GameStats) -> u32 {
        let Some(config) = &self.config else {
            return 0;
        };
        match config.objective.kind {
            ObjectiveKind::Lines | ObjectiveKind::Moves => stats.rows,
            ObjectiveKind::Score => stats.score,
            ObjectiveKind::Gems => stats.gems,
            ObjectiveKind::Bombs => stats.bombs,
            ObjectiveKind::Tetris => stats.tetrises,
            ObjectiveKind::Combo => stats.max_combo.max(0) as u32,
            ObjectiveKind::TimeSurvival => stats.time_ms / 1000,
            ObjectiveKind::Boss => self.boss_max_hp - self.boss_hp,
        }
    }

    /// Check the objective after a lock, clear or tick.
    pub fn evaluate(&self, stats: &GameStats) -> ObjectiveStatus {
        let Some(config) = &self.config else {
            return ObjectiveStatus::InProgress;
        };
        let objective = &config.objective;

        let complete = match objective.kind {
            ObjectiveKind::Boss => self.boss_max_hp > 0 && self.boss_hp == 0,
            ObjectiveKind::TimeSurvival => stats.time_ms >= objective.target.saturating_mul(1000),
            _ => self.progress(stats) >= objective.target,
        };
        if complete {
            return ObjectiveStatus::Complete;
        }

        let out_of_time = objective
            .time_limit_ms
            .is_some_and(|limit| stats.time_ms >= limit);
        let out_of_moves = objective
            .move_limit
            .is_some_and(|limit| stats.pieces >= limit);
        if out_of_time || out_of_moves {
            ObjectiveStatus::Failed
        } else {
            ObjectiveStatus::InProgress
        }
    }

    /// Completion ratio in percent, used for stars.
    pub fn ratio_percent(&self, stats: &GameStats) -> u32 {
        let Some(config) = &self.config else {
            return 0;
        };
        let objective = &config.objective;
        let (done, target) = match objective.kind {
            ObjectiveKind::TimeSurvival => (stats.time_ms as u64, objective.target as u64 * 1000),
            ObjectiveKind::Boss => (
                (self.boss_max_hp - self.boss_hp) as u64,
                self.boss_max_hp as u64,
            ),
            _ => (self.progress(stats) as u64, objective.target as u64),
        };
        if target == 0 {
            return 100;
        }
        (done * 100 / target).min(u32::MAX as u64) as u32
    }

    pub fn stars(&self, stats: &GameStats) -> u8 {
        star_rating(self.ratio_percent(stats))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level(objective: Objective) -> AdventureLevelConfig {
        AdventureLevelConfig {
            id: 99,
            name: "test".into(),
            objective,
            gimmicks: Vec::new(),
            boss: None,
            story: StoryNodes::default(),
            rewards: Rewards::default(),
            start_level: 0,
        }
    }

    #[test]
    fn test_lines_objective_stars() {
        let mut am = AdventureManager::new();
        am.start(level(Objective::new(ObjectiveKind::Lines, 10)), Difficulty::Normal);

        for (rows, stars) in [(10, 3), (8, 2), (5, 1), (2, 0)] {
            let stats = GameStats {
                rows,
                ..GameStats::default()
            };
            assert_eq!(am.stars(&stats), stars, "{} rows", rows);
        }
    }

    #[test]
    fn test_star_thresholds() {
        assert_eq!(star_rating(150), 3);
        assert_eq!(star_rating(100), 3);
        assert_eq!(star_rating(99), 2);
        assert_eq!(star_rating(75), 2);
        assert_eq!(star_rating(74), 1);
        assert_eq!(star_rating(50), 1);
        assert_eq!(star_rating(49), 0);
    }

    #[test]
    fn test_time_limit_fails_objective() {
        let mut am = AdventureManager::new();
        let mut objective = Objective::new(ObjectiveKind::Score, 5000);
        objective.time_limit_ms = Some(60_000);
        am.start(level(objective), Difficulty::Normal);

        let mut stats = GameStats {
            score: 4000,
            time_ms: 59_000,
            ..GameStats::default()
        };
        assert_eq!(am.evaluate(&stats), ObjectiveStatus::InProgress);
        stats.time_ms = 60_000;
        assert_eq!(am.evaluate(&stats), ObjectiveStatus::Failed);
        stats.score = 5000;
        assert_eq!(am.evaluate(&stats), ObjectiveStatus::Complete);
    }

    #[test]
    fn test_moves_objective_fails_when_pieces_run_out() {
        let mut am = AdventureManager::new();
        let mut objective = Objective::new(ObjectiveKind::Moves, 8);
        objective.move_limit = Some(30);
        am.start(level(objective), Difficulty::Normal);

        let stats = GameStats {
            rows: 6,
            pieces: 30,
            ..GameStats::default()
        };
        assert_eq!(am.evaluate(&stats), ObjectiveStatus::Failed);
    }

    #[test]
    fn test_time_survival_ratio() {
        let mut am = AdventureManager::new();
        am.start(level(Objective::new(ObjectiveKind::TimeSurvival, 60)), Difficulty::Normal);

        let stats = GameStats {
            time_ms: 45_000,
            ..GameStats::default()
        };
        assert_eq!(am.ratio_percent(&stats), 75);
        assert_eq!(am.stars(&stats), 2);
        assert_eq!(am.evaluate(&stats), ObjectiveStatus::InProgress);
    }

    #[test]
    fn test_boss_takes_damage_and_attacks() {
        let mut config = level(Objective::new(ObjectiveKind::Boss, 0));
        config.boss = Some(BossConfig {
            name: "golem".into(),
            hp: 100,
            attack_interval_ms: 1000,
            attack_rows: 2,
        });
        let mut am = AdventureManager::new();
        am.start(config, Difficulty::Normal);

        assert_eq!(am.on_clear(4, TSpinKind::None), Some(40));
        assert_eq!(am.on_clear(2, TSpinKind::Full), Some(0));
        assert_eq!(am.evaluate(&GameStats::default()), ObjectiveStatus::Complete);
        assert_eq!(am.stars(&GameStats::default()), 3);
        // Defeated bosses stop attacking.
        assert_eq!(am.tick(5000), 0);
    }

    #[test]
    fn test_boss_attack_cadence() {
        let mut config = level(Objective::new(ObjectiveKind::Boss, 0));
        config.boss = Some(BossConfig {
            name: "golem".into(),
            hp: 100,
            attack_interval_ms: 1000,
            attack_rows: 2,
        });
        let mut am = AdventureManager::new();
        am.start(config, Difficulty::Easy);

        assert_eq!(am.tick(1499), 0);
        assert_eq!(am.tick(1), 2);
    }

    #[test]
    fn test_rising_garbage() {
        let mut config = level(Objective::new(ObjectiveKind::TimeSurvival, 60));
        config.gimmicks.push(Gimmick::RisingGarbage {
            interval_ms: 500,
            rows: 1,
        });
        let mut am = AdventureManager::new();
        am.start(config, Difficulty::Normal);

        let rows: u32 = (0..10).map(|_| am.tick(100) as u32).sum();
        assert_eq!(rows, 2);
    }

    #[test]
    fn test_gimmick_queries() {
        let mut config = level(Objective::new(ObjectiveKind::Gems, 5));
        config.gimmicks = vec![
            Gimmick::StartingGarbage(3),
            Gimmick::Gems(6),
            Gimmick::SpeedBoost { percent: 150 },
            Gimmick::Wildcards { every: 4 },
        ];
        assert_eq!(config.starting_garbage(), 3);
        assert_eq!(config.gems(), 6);
        assert_eq!(config.bomb_blocks(), 0);
        assert_eq!(config.speed_percent(), 150);
        assert_eq!(config.wildcard_every(), Some(4));
        assert!(!config.flipped());
    }

    #[test]
    fn test_no_level_means_no_objective() {
        let am = AdventureManager::new();
        assert_eq!(am.evaluate(&GameStats::default()), ObjectiveStatus::InProgress);
        assert_eq!(am.stars(&GameStats::default()), 0);
    }
}
