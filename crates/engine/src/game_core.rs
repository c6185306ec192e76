//! GameCore - the composition root of a session.
//!
//! Owns every sub-manager and is the whole externally callable surface: the
//! host feeds it wall-clock deltas through [`GameCore::update`] and player
//! intents through [`GameCore::handle_action`], and reads back a
//! [`GameSnapshot`] plus events from the bus.
//!
//! Time advances in fixed [`TICK_MS`] steps taken from an accumulator, so the
//! simulation is identical for any frame rate. Only PLAYING (and the
//! countdown) consume time; selections, pause and menus freeze it.

use std::fmt;

use blockfall_core::{
    fnv1a64, BoardConfig, BoardManager, BoosterInventory, GameSnapshot, GameStats, LockResult,
    ScoreManager, SpawnOutcome,
};
use blockfall_input::InputManager;

use crate::adventure::{AdventureLevelConfig, AdventureManager, ObjectiveStatus, Rewards};
use crate::boosters::{BoosterController, PendingSelection, SelectionError, WildcardOrigin};
use crate::campaign;
use crate::config::{GameConfig, GameSetup, InputConfig};
use crate::events::{AudioCue, EndReason, EventBus, GameEvent, SessionResult, VisualEffect};
use crate::modes::{BattleOpponent, ModeRules};
use crate::persistence::{self, KeyValueStore, PersistenceError, SaveData, SAVE_KEY, SAVE_VERSION};
use crate::replay::{ReplayCommand, ReplayData, ReplayRecorder};
use crate::state::StateManager;
use crate::types::{
    Block, BoosterKind, GameAction, GameMode, GameStateKind, PieceKind, TSpinKind,
    FLIPPED_GRAVITY_MS, GARBAGE_INTERVAL_MS, LOCK_DELAY_MS, SLOW_TIME_MS, TICK_MS,
};

/// Longest frame delta consumed at once; longer gaps are dropped, not caught up.
pub const MAX_FRAME_MS: u32 = 250;

/// Where the story screen leads once its last line is dismissed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StoryExit {
    StartLevel,
    Map,
}

#[derive(Debug, Clone)]
struct StoryCursor {
    lines: Vec<String>,
    index: usize,
    exit: StoryExit,
}

pub struct GameCore {
    events: EventBus,
    state: StateManager,
    board: BoardManager,
    score: ScoreManager,
    input: InputManager,
    adventure: AdventureManager,
    boosters: BoosterController,
    opponent: Option<BattleOpponent>,
    rules: ModeRules,
    setup: GameSetup,
    config: GameConfig,
    recorder: ReplayRecorder,

    accumulator_ms: u32,
    sim_time_ms: u32,
    episode_id: u32,

    selected_level: Option<AdventureLevelConfig>,
    pending_setup: Option<GameSetup>,
    story: Option<StoryCursor>,
    last_result: Option<SessionResult>,
}

impl GameCore {
    pub fn new() -> Self {
        let setup = GameSetup::default();
        Self {
            events: EventBus::new(),
            state: StateManager::new(),
            board: BoardManager::default(),
            score: ScoreManager::default(),
            input: InputManager::new(),
            adventure: AdventureManager::new(),
            boosters: BoosterController::new(),
            opponent: None,
            rules: ModeRules::for_mode(setup.mode, setup.difficulty),
            setup,
            config: GameConfig::default(),
            recorder: ReplayRecorder::new(),
            accumulator_ms: 0,
            sim_time_ms: 0,
            episode_id: 0,
            selected_level: None,
            pending_setup: None,
            story: None,
            last_result: None,
        }
    }

    // ============== Session lifecycle ==============

    /// Start a fresh session. This is the only hard cancellation point: every
    /// timer, queued garbage and held input from the previous session is dropped.
    pub fn reset_game(&mut self, setup: GameSetup) {
        let seed = setup.effective_seed();
        let difficulty = setup.difficulty;
        self.rules = ModeRules::for_mode(setup.mode, difficulty);

        match setup.adventure.clone() {
            Some(level) if setup.mode == GameMode::Adventure => self.adventure.start(level, difficulty),
            _ => self.adventure.clear(),
        }
        let level = self.adventure.config().cloned();

        let start_level = level
            .as_ref()
            .map_or(setup.start_level, |l| l.start_level.max(setup.start_level));
        let shapes = match &level {
            Some(l) if l.extended_shapes() => {
                let mut shapes = PieceKind::STANDARD.to_vec();
                shapes.extend_from_slice(&PieceKind::EXTENDED);
                shapes
            }
            _ => Vec::new(),
        };

        self.board.initialize(&BoardConfig {
            layout: setup.layout,
            start_level,
            seed,
            shapes,
            lock_delay_ms: LOCK_DELAY_MS,
            lock_reset_limit: difficulty.lock_reset_limit(),
            gravity_percent: difficulty.gravity_percent(),
            speed_percent: self.effective_speed_percent(),
            garbage_interval_ms: GARBAGE_INTERVAL_MS,
            wildcard_every: level.as_ref().and_then(|l| l.wildcard_every()),
            flipped: level.as_ref().is_some_and(|l| l.flipped()),
        });

        let (gems, bombs, level_garbage) = level
            .as_ref()
            .map_or((0, 0, 0), |l| (l.gems(), l.bomb_blocks(), l.starting_garbage()));
        let mut garbage = self
            .rules
            .starting_garbage
            .saturating_add(level_garbage)
            .saturating_sub(setup.assist_rows);
        if gems + bombs > 0 {
            garbage = garbage.max(2);
        }
        if garbage > 0 && !self.board.insert_garbage(garbage) {
            log::error!("starting garbage overflowed the board");
        }
        self.board.embed_modifiers(Block::Gem, gems);
        self.board.embed_modifiers(Block::Bomb, bombs);

        self.score.reset(
            start_level,
            self.rules.level_progression,
            BoosterInventory::from_list(&setup.boosters),
        );

        self.opponent = self.rules.opponent.map(|rules| BattleOpponent::new(rules, seed));
        if let Some(opp) = &self.opponent {
            self.score.set_opponent_hp(opp.hp(), opp.max_hp());
        } else if level.as_ref().is_some_and(|l| l.boss.is_some()) {
            self.score
                .set_opponent_hp(self.adventure.boss_hp(), self.adventure.boss_max_hp());
        }

        self.input.reset();
        self.boosters = BoosterController::new();
        self.accumulator_ms = 0;
        self.sim_time_ms = 0;
        self.episode_id = self.episode_id.wrapping_add(1);
        self.story = None;
        self.last_result = None;
        self.recorder.start(setup.clone(), self.config);

        log::info!(
            "session {} reset: mode={} difficulty={:?} seed={} level={}",
            self.episode_id,
            setup.mode.as_str(),
            difficulty,
            seed,
            start_level
        );

        let countdown_ms = setup.countdown_ms;
        self.setup = setup;
        self.force_state(GameStateKind::Countdown);
        self.state.start_countdown(countdown_ms);
        if countdown_ms == 0 {
            self.begin_play();
        } else {
            let seconds = self.state.countdown_seconds();
            self.emit(GameEvent::Audio(AudioCue::CountdownTick { seconds }));
        }
    }

    fn begin_play(&mut self) {
        if !self.transition(GameStateKind::Playing) {
            return;
        }
        self.emit(GameEvent::Audio(AudioCue::CountdownGo));
        let outcome = self.board.spawn_next();
        self.handle_spawn(outcome);
    }

    /// Advance by a wall-clock delta.
    pub fn update(&mut self, elapsed_ms: u32) {
        if !matches!(self.state.current(), GameStateKind::Countdown | GameStateKind::Playing) {
            self.accumulator_ms = 0;
            return;
        }
        self.accumulator_ms = (self.accumulator_ms + elapsed_ms).min(MAX_FRAME_MS);
        while self.accumulator_ms >= TICK_MS {
            self.accumulator_ms -= TICK_MS;
            self.step();
            if !matches!(self.state.current(), GameStateKind::Countdown | GameStateKind::Playing) {
                self.accumulator_ms = 0;
                break;
            }
        }
    }

    fn step(&mut self) {
        match self.state.current() {
            GameStateKind::Countdown => {
                let before = self.state.countdown_seconds();
                if self.state.tick_countdown(TICK_MS) {
                    self.begin_play();
                } else {
                    let seconds = self.state.countdown_seconds();
                    if seconds != before {
                        self.emit(GameEvent::Audio(AudioCue::CountdownTick { seconds }));
                    }
                }
            }
            GameStateKind::Playing => {
                for action in self.input.update(TICK_MS) {
                    if !self.state.is_simulating() {
                        break;
                    }
                    self.apply_piece_action(action);
                }
                if self.state.is_simulating() {
                    self.simulate_tick();
                }
            }
            _ => {}
        }
    }

    /// One fixed step of gravity, lock delay, garbage and timers.
    pub(crate) fn simulate_tick(&mut self) {
        self.sim_time_ms += TICK_MS;

        let expired = self.score.tick(TICK_MS);
        if expired.zone {
            self.emit(GameEvent::VisualEffect(VisualEffect::ZoneEnd));
        }
        if expired.slow_time {
            self.board.set_slow_time(false);
            self.emit(GameEvent::VisualEffect(VisualEffect::SlowTime { active: false }));
        }
        if expired.flipped_gravity {
            let flipped = self.level_flipped();
            self.board.set_flipped(flipped);
            self.emit(GameEvent::VisualEffect(VisualEffect::GravityFlip { flipped }));
        }

        if let Some(rows) = self.opponent.as_mut().and_then(|opp| opp.tick(TICK_MS)) {
            log::debug!("opponent attacks with {} rows", rows);
            self.board.queue_garbage(rows);
        }
        let boss_rows = self.adventure.tick(TICK_MS);
        if boss_rows > 0 {
            self.board.queue_garbage(boss_rows);
        }

        let outcome = self.board.tick(TICK_MS);
        if outcome.soft_drop_cells > 0 {
            self.score.add_soft_drop(outcome.soft_drop_cells);
        }
        if outcome.garbage_rows > 0 {
            self.emit(GameEvent::GarbageReceived {
                rows: outcome.garbage_rows,
            });
            self.emit(GameEvent::Audio(AudioCue::Garbage));
        }
        self.score.set_garbage_pending(self.board.pending_garbage());

        if outcome.overflow {
            self.top_out();
            return;
        }
        if let Some(result) = outcome.locked {
            self.after_lock(result);
        }
        if self.state.is_simulating() {
            self.check_session_end();
        }
    }

    // ============== Actions ==============

    /// Feed a pressed action. Returns true if it changed anything.
    ///
    /// Piece actions are dropped outside PLAYING. Horizontal moves and soft
    /// drop are routed through the repeat timers; held keys repeat in `update`.
    pub fn handle_action(&mut self, action: GameAction) -> bool {
        match action {
            GameAction::Pause => match self.state.current() {
                GameStateKind::Playing => self.pause(),
                GameStateKind::Paused => self.resume(),
                _ => false,
            },
            GameAction::Restart => match self.state.current() {
                GameStateKind::Menu | GameStateKind::Map | GameStateKind::Story | GameStateKind::BoosterSelection => {
                    false
                }
                _ => {
                    self.reset_game(self.setup.clone());
                    true
                }
            },
            GameAction::Ability(kind) => self.activate_booster(kind).is_ok(),
            _ => {
                if !self.state.is_simulating() {
                    return false;
                }
                match self.input.press(action) {
                    Some(action) => self.apply_piece_action(action),
                    None => false,
                }
            }
        }
    }

    /// Feed a released action (stops DAS/ARR repeat).
    pub fn release_action(&mut self, action: GameAction) {
        self.input.release(action);
    }

    fn apply_piece_action(&mut self, action: GameAction) -> bool {
        if !action.is_piece_action() || !self.state.is_simulating() {
            return false;
        }
        self.recorder
            .record(self.sim_time_ms, ReplayCommand::Action(action));

        let (applied, cue) = match action {
            GameAction::MoveLeft => (self.board.move_horizontal(-1), AudioCue::Move),
            GameAction::MoveRight => (self.board.move_horizontal(1), AudioCue::Move),
            GameAction::SoftDrop => {
                let moved = self.board.soft_drop();
                if moved {
                    self.score.add_soft_drop(1);
                }
                (moved, AudioCue::SoftDrop)
            }
            GameAction::RotateCw => (self.board.rotate(true), AudioCue::Rotate),
            GameAction::RotateCcw => (self.board.rotate(false), AudioCue::Rotate),
            GameAction::HardDrop => {
                let Some(result) = self.board.hard_drop() else {
                    return false;
                };
                self.emit(GameEvent::Audio(AudioCue::HardDrop));
                self.after_lock(result);
                return true;
            }
            GameAction::Hold => {
                let Some(outcome) = self.board.hold() else {
                    return false;
                };
                self.emit(GameEvent::Audio(AudioCue::Hold));
                self.handle_spawn(outcome);
                return true;
            }
            _ => return false,
        };
        if applied {
            self.emit(GameEvent::Audio(cue));
        }
        applied
    }

    pub fn pause(&mut self) -> bool {
        if !self.transition(GameStateKind::Paused) {
            return false;
        }
        self.input.reset();
        self.accumulator_ms = 0;
        true
    }

    /// Resume play. Time spent paused is discarded.
    pub fn resume(&mut self) -> bool {
        if !self.state.is(GameStateKind::Paused) || !self.transition(GameStateKind::Playing) {
            return false;
        }
        self.accumulator_ms = 0;
        true
    }

    // ============== Lock resolution ==============

    fn after_lock(&mut self, result: LockResult) {
        if result.overlapped {
            self.diagnostic(format!("{:?} locked over occupied cells", result.kind));
        }

        let update = self.score.on_lock(&result);
        self.emit(GameEvent::PieceLocked {
            kind: result.kind,
            tspin: result.tspin,
        });
        self.emit(GameEvent::Audio(AudioCue::Lock));

        if update.lines > 0 {
            self.emit(GameEvent::LinesCleared {
                rows: result.cleared_rows.clone(),
                tspin: update.tspin,
                perfect_clear: update.perfect_clear,
                combo: update.combo,
                b2b_chain: update.b2b_chain,
                score: update.score.total,
            });
            self.emit(GameEvent::VisualEffect(VisualEffect::LineClear {
                rows: result.cleared_rows.clone(),
            }));

            let cue = if update.lines >= 4 {
                AudioCue::Tetris
            } else if update.tspin != TSpinKind::None {
                AudioCue::TSpin
            } else {
                AudioCue::LineClear { lines: update.lines }
            };
            self.emit(GameEvent::Audio(cue));
            if update.combo >= 1 {
                self.emit(GameEvent::Audio(AudioCue::Combo { count: update.combo }));
            }
            if update.score.b2b_applied {
                self.emit(GameEvent::Audio(AudioCue::BackToBack));
            }
            if update.perfect_clear {
                self.emit(GameEvent::Audio(AudioCue::PerfectClear));
                self.emit(GameEvent::VisualEffect(VisualEffect::PerfectClear));
            }
            if update.lines >= 4 {
                self.emit(GameEvent::VisualEffect(VisualEffect::ScreenShake));
            }
        }

        if let Some(level) = update.level_up {
            self.board.set_level(level);
            self.emit(GameEvent::LevelUp(level));
            self.emit(GameEvent::Audio(AudioCue::LevelUp));
        }
        if update.zone_started {
            self.emit(GameEvent::VisualEffect(VisualEffect::ZoneStart));
        }
        if update.frenzy_started {
            self.emit(GameEvent::VisualEffect(VisualEffect::FrenzyStart));
        }
        if update.overdrive_started {
            self.emit(GameEvent::VisualEffect(VisualEffect::OverdriveStart));
        }
        for achievement in update.achievements {
            log::info!("achievement unlocked: {}", achievement.as_str());
            self.emit(GameEvent::Achievement(achievement));
        }

        if update.lines > 0 {
            // Outgoing lines cancel incoming garbage first; the rest is sent.
            let outgoing = update.attack.max(update.lines);
            let sent = self.board.cancel_garbage(outgoing);
            self.score.set_garbage_pending(self.board.pending_garbage());
            if sent > 0 {
                self.score.add_lines_sent(sent);
                if let Some(opp) = self.opponent.as_mut() {
                    let hp = opp.damage(sent);
                    let max_hp = opp.max_hp();
                    self.score.set_opponent_hp(hp, max_hp);
                    self.emit(GameEvent::BossHpChanged { hp, max_hp });
                }
            }
            if let Some(hp) = self.adventure.on_clear(update.lines, update.tspin) {
                let max_hp = self.adventure.boss_max_hp();
                self.score.set_opponent_hp(hp, max_hp);
                self.emit(GameEvent::BossHpChanged { hp, max_hp });
            }
        }

        if self.check_session_end() {
            return;
        }
        let outcome = self.board.spawn_next();
        self.handle_spawn(outcome);
    }

    fn handle_spawn(&mut self, outcome: SpawnOutcome) {
        match outcome {
            SpawnOutcome::Spawned(_) => {}
            SpawnOutcome::Wildcard => {
                self.boosters
                    .begin(PendingSelection::Wildcard(WildcardOrigin::Spawn));
                self.input.reset();
                self.transition(GameStateKind::WildcardSelection);
            }
            SpawnOutcome::Blocked => self.top_out(),
        }
    }

    fn top_out(&mut self) {
        if !self.rules.top_out_wipes {
            self.end_session(false, EndReason::TopOut);
            return;
        }
        log::info!("board overflowed; wiping");
        self.board.wipe();
        self.emit(GameEvent::VisualEffect(VisualEffect::ScreenShake));
        match self.board.spawn_next() {
            SpawnOutcome::Blocked => self.end_session(false, EndReason::TopOut),
            outcome => self.handle_spawn(outcome),
        }
    }

    /// Check mode and objective end conditions. Returns true if the session ended.
    fn check_session_end(&mut self) -> bool {
        let stats = self.score.stats();

        let victory = if self.rules.line_goal.is_some_and(|goal| stats.rows >= goal) {
            Some(EndReason::GoalReached)
        } else if self.opponent.as_ref().is_some_and(|o| o.is_defeated()) {
            Some(EndReason::OpponentDefeated)
        } else if self.rules.clear_garbage_goal
            && self.board.board().count_blocks(|b| *b == Block::Garbage) == 0
        {
            Some(EndReason::GoalReached)
        } else {
            None
        };
        if let Some(reason) = victory {
            self.end_session(true, reason);
            return true;
        }

        match self.adventure.evaluate(stats) {
            ObjectiveStatus::Complete => {
                self.end_session(true, EndReason::ObjectiveComplete);
                return true;
            }
            ObjectiveStatus::Failed => {
                self.end_session(false, EndReason::ObjectiveFailed);
                return true;
            }
            ObjectiveStatus::InProgress => {}
        }

        let defeat = if self.rules.piece_limit.is_some_and(|limit| stats.pieces >= limit) {
            Some(EndReason::OutOfPieces)
        } else if self.rules.time_limit_ms.is_some_and(|limit| stats.time_ms >= limit) {
            Some(EndReason::TimeUp)
        } else {
            None
        };
        if let Some(reason) = defeat {
            self.end_session(false, reason);
            return true;
        }
        false
    }

    fn end_session(&mut self, victory: bool, reason: EndReason) {
        let target = if victory {
            GameStateKind::Victory
        } else {
            GameStateKind::GameOver
        };
        if !self.state.can_transition(target) {
            self.diagnostic(format!(
                "cannot end session from {}",
                self.state.current().as_str()
            ));
            return;
        }

        let stats = self.score.stats().clone();
        let stars = if self.adventure.is_active() {
            self.adventure.stars(&stats)
        } else if victory {
            3
        } else {
            0
        };
        let rewards = match self.adventure.config() {
            Some(level) if victory => level.rewards,
            _ => Rewards::default(),
        };
        let result = SessionResult {
            mode: self.setup.mode,
            difficulty: self.setup.difficulty,
            stats,
            stars,
            level_id: self.adventure.config().map(|l| l.id),
            rewards,
            reason,
            replay: self.replay(),
        };

        self.input.reset();
        self.accumulator_ms = 0;
        self.transition(target);
        log::info!(
            "session {} ended: {:?} score={} stars={}",
            self.episode_id,
            reason,
            result.stats.score,
            stars
        );

        if victory {
            self.emit(GameEvent::Audio(AudioCue::Victory));
            self.emit(GameEvent::Victory(Box::new(result.clone())));
        } else {
            self.emit(GameEvent::Audio(AudioCue::GameOver));
            self.emit(GameEvent::GameOver(Box::new(result.clone())));
        }
        self.last_result = Some(result);
    }

    // ============== Boosters ==============

    /// Activate a booster from the inventory.
    ///
    /// Instant boosters apply and consume immediately. Selection boosters
    /// suspend the simulation; inventory is only consumed once the selection
    /// is executed.
    pub fn activate_booster(&mut self, kind: BoosterKind) -> Result<(), SelectionError> {
        if !self.state.is_simulating() {
            return Err(SelectionError::NotPlaying);
        }
        if !self.score.stats().boosters.is_ready(kind) {
            log::warn!("booster {} requested with empty inventory", kind.as_str());
            return Err(SelectionError::NoInventory);
        }

        match BoosterController::selection_for(kind) {
            Some(selection) => {
                self.boosters.begin(selection);
                self.input.reset();
                self.transition(selection.state());
            }
            None => {
                self.score.consume_booster(kind);
                match kind {
                    BoosterKind::SlowTime => {
                        self.score.start_slow_time(SLOW_TIME_MS);
                        self.board.set_slow_time(true);
                        self.emit(GameEvent::VisualEffect(VisualEffect::SlowTime { active: true }));
                    }
                    BoosterKind::FlippedGravity => {
                        self.score.start_flipped_gravity(FLIPPED_GRAVITY_MS);
                        let flipped = !self.level_flipped();
                        self.board.set_flipped(flipped);
                        self.emit(GameEvent::VisualEffect(VisualEffect::GravityFlip { flipped }));
                    }
                    _ => {}
                }
                self.emit(GameEvent::BoosterActivated(kind));
                self.emit(GameEvent::Audio(AudioCue::Booster));
            }
        }
        log::debug!("booster {} activated", kind.as_str());
        self.recorder
            .record(self.sim_time_ms, ReplayCommand::Action(GameAction::Ability(kind)));
        Ok(())
    }

    /// Confirm a bomb selection clearing rows `start..start + BOMB_ROWS`.
    /// On error the selection stays open for another try.
    pub fn execute_bomb(&mut self, start: u8) -> Result<(), SelectionError> {
        let rows = self
            .boosters
            .validate_bomb(start, self.board.board())
            .inspect_err(|e| log::warn!("bomb selection rejected: {}", e))?;
        if !self.score.consume_booster(BoosterKind::Bomb) {
            return Err(SelectionError::NoInventory);
        }

        let collected = self.board.clear_rows(&rows);
        self.score.collect(collected.gems, collected.bombs);
        self.boosters.finish();
        self.recorder
            .record(self.sim_time_ms, ReplayCommand::ExecuteBomb(start));

        self.emit(GameEvent::VisualEffect(VisualEffect::Explosion { rows }));
        self.emit(GameEvent::Audio(AudioCue::Booster));
        self.emit(GameEvent::BoosterActivated(BoosterKind::Bomb));
        self.emit(GameEvent::BombSelectionEnd { executed: true });
        self.resume_after_clear();
        Ok(())
    }

    /// Confirm a line-clearer selection of a single row.
    pub fn execute_line_clear(&mut self, row: u8) -> Result<(), SelectionError> {
        let row = self
            .boosters
            .validate_line(row, self.board.board())
            .inspect_err(|e| log::warn!("line selection rejected: {}", e))?;
        if !self.score.consume_booster(BoosterKind::LineClearer) {
            return Err(SelectionError::NoInventory);
        }

        let collected = self.board.clear_rows(&[row]);
        self.score.collect(collected.gems, collected.bombs);
        self.boosters.finish();
        self.recorder
            .record(self.sim_time_ms, ReplayCommand::ExecuteLineClear(row));

        self.emit(GameEvent::VisualEffect(VisualEffect::LineClear { rows: vec![row] }));
        self.emit(GameEvent::Audio(AudioCue::Booster));
        self.emit(GameEvent::BoosterActivated(BoosterKind::LineClearer));
        self.emit(GameEvent::LineSelectionEnd { executed: true });
        self.resume_after_clear();
        Ok(())
    }

    fn resume_after_clear(&mut self) {
        self.transition(GameStateKind::Playing);
        if self.check_session_end() {
            return;
        }
        if self.board.active().is_none() && !self.board.wildcard_pending() {
            let outcome = self.board.spawn_next();
            self.handle_spawn(outcome);
        }
    }

    /// Abandon the open selection without consuming inventory.
    pub fn cancel_selection(&mut self) -> bool {
        let Some(selection) = self.boosters.finish() else {
            return false;
        };
        self.recorder
            .record(self.sim_time_ms, ReplayCommand::CancelSelection);
        match selection {
            PendingSelection::Bomb => {
                self.emit(GameEvent::BombSelectionEnd { executed: false });
                self.transition(GameStateKind::Playing);
            }
            PendingSelection::Line => {
                self.emit(GameEvent::LineSelectionEnd { executed: false });
                self.transition(GameStateKind::Playing);
            }
            PendingSelection::Wildcard(origin) => {
                self.emit(GameEvent::WildcardSelectionEnd { chosen: None });
                self.transition(GameStateKind::Playing);
                if origin == WildcardOrigin::Spawn {
                    if let Some(outcome) = self.board.cancel_wildcard() {
                        self.handle_spawn(outcome);
                    }
                }
            }
        }
        true
    }

    /// Resolve WILDCARD_SELECTION with the chosen shape.
    pub fn choose_wildcard_piece(&mut self, kind: PieceKind) -> bool {
        let Some(PendingSelection::Wildcard(origin)) = self.boosters.pending() else {
            return false;
        };
        match origin {
            WildcardOrigin::Spawn => {
                let Some(outcome) = self.board.choose_wildcard(kind) else {
                    self.diagnostic("wildcard selection without a pending spawn".to_string());
                    return false;
                };
                self.boosters.finish();
                self.recorder
                    .record(self.sim_time_ms, ReplayCommand::ChooseWildcard(kind));
                self.emit(GameEvent::WildcardSelectionEnd { chosen: Some(kind) });
                self.transition(GameStateKind::Playing);
                self.handle_spawn(outcome);
            }
            WildcardOrigin::PieceSwap => {
                if !self.board.swap_active(kind) {
                    return false;
                }
                self.score.consume_booster(BoosterKind::PieceSwap);
                self.boosters.finish();
                self.recorder
                    .record(self.sim_time_ms, ReplayCommand::ChooseWildcard(kind));
                self.emit(GameEvent::BoosterActivated(BoosterKind::PieceSwap));
                self.emit(GameEvent::WildcardSelectionEnd { chosen: Some(kind) });
                self.transition(GameStateKind::Playing);
            }
        }
        true
    }

    pub(crate) fn apply_replay_command(&mut self, command: ReplayCommand) -> bool {
        match command {
            ReplayCommand::Action(GameAction::Ability(kind)) => self.activate_booster(kind).is_ok(),
            ReplayCommand::Action(action) => self.apply_piece_action(action),
            ReplayCommand::ChooseWildcard(kind) => self.choose_wildcard_piece(kind),
            ReplayCommand::ExecuteBomb(start) => self.execute_bomb(start).is_ok(),
            ReplayCommand::ExecuteLineClear(row) => self.execute_line_clear(row).is_ok(),
            ReplayCommand::CancelSelection => self.cancel_selection(),
            ReplayCommand::SetConfig(config) => {
                self.set_game_config(config);
                true
            }
        }
    }

    // ============== Map and story ==============

    pub fn open_map(&mut self) -> bool {
        self.story = None;
        self.transition(GameStateKind::Map)
    }

    /// Pick a campaign level on the map.
    pub fn select_level(&mut self, id: u32) -> bool {
        if !self.state.is(GameStateKind::Map) {
            return false;
        }
        let Some(level) = campaign::level_by_id(id) else {
            log::warn!("unknown level {}", id);
            return false;
        };
        self.selected_level = Some(level);
        self.transition(GameStateKind::BoosterSelection)
    }

    /// Confirm the boosters taken into the selected level and start it,
    /// showing its intro first if it has one.
    pub fn confirm_boosters(&mut self, boosters: Vec<BoosterKind>) -> bool {
        if !self.state.is(GameStateKind::BoosterSelection) {
            return false;
        }
        let Some(level) = self.selected_level.clone() else {
            return false;
        };
        let intro = level.story.intro.clone();
        self.pending_setup = Some(GameSetup {
            mode: GameMode::Adventure,
            start_level: level.start_level,
            adventure: Some(level),
            boosters,
            daily_day: None,
            ..self.setup.clone()
        });

        if intro.is_empty() {
            self.start_pending_level();
        } else {
            self.story = Some(StoryCursor {
                lines: intro,
                index: 0,
                exit: StoryExit::StartLevel,
            });
            self.transition(GameStateKind::Story);
        }
        true
    }

    /// Show the outro of the level just won. Returns false if it has none.
    pub fn show_outro(&mut self) -> bool {
        if !self.state.is(GameStateKind::Victory) {
            return false;
        }
        let outro = match self.adventure.config() {
            Some(level) if !level.story.outro.is_empty() => level.story.outro.clone(),
            _ => return false,
        };
        self.story = Some(StoryCursor {
            lines: outro,
            index: 0,
            exit: StoryExit::Map,
        });
        self.transition(GameStateKind::Story)
    }

    /// Current story line, if a story is showing.
    pub fn story_line(&self) -> Option<&str> {
        if !self.state.is(GameStateKind::Story) {
            return None;
        }
        let story = self.story.as_ref()?;
        story.lines.get(story.index).map(String::as_str)
    }

    /// Dismiss the current story line.
    pub fn advance_story(&mut self) -> bool {
        if !self.state.is(GameStateKind::Story) {
            return false;
        }
        let Some(story) = self.story.as_mut() else {
            return false;
        };
        story.index += 1;
        if story.index < story.lines.len() {
            return true;
        }
        let exit = story.exit;
        self.story = None;
        match exit {
            StoryExit::StartLevel => self.start_pending_level(),
            StoryExit::Map => {
                self.transition(GameStateKind::Map);
            }
        }
        true
    }

    fn start_pending_level(&mut self) {
        if let Some(setup) = self.pending_setup.take() {
            self.reset_game(setup);
        }
    }

    pub fn return_to_menu(&mut self) -> bool {
        if !self.transition(GameStateKind::Menu) {
            return false;
        }
        self.boosters.finish();
        self.input.reset();
        self.accumulator_ms = 0;
        self.story = None;
        true
    }

    // ============== Persistence ==============

    /// Save the running session. Returns `Ok(false)` outside PLAYING/PAUSED.
    pub fn save_game(&self, store: &mut dyn KeyValueStore) -> Result<bool, PersistenceError> {
        if !matches!(self.state.current(), GameStateKind::Playing | GameStateKind::Paused) {
            return Ok(false);
        }
        let data = SaveData {
            version: SAVE_VERSION,
            setup: self.setup.clone(),
            board: self.board.clone(),
            score: self.score.clone(),
            adventure: self.adventure.clone(),
            opponent: self.opponent.clone(),
            sim_time_ms: self.sim_time_ms,
            episode_id: self.episode_id,
            replay: self.recorder.clone(),
        };
        persistence::write_save(store, &data)?;
        log::info!("saved session {} at {}ms", self.episode_id, self.sim_time_ms);
        Ok(true)
    }

    /// Restore a saved session into PAUSED.
    ///
    /// Returns false when nothing is saved (state untouched) or the save is
    /// unreadable, in which case the engine falls back to a fresh MENU.
    pub fn load_game(&mut self, store: &dyn KeyValueStore) -> bool {
        let data = match persistence::read_save(store) {
            Ok(Some(data)) => data,
            Ok(None) => return false,
            Err(e) => {
                log::warn!("ignoring unreadable save: {}", e);
                self.reset_to_menu();
                return false;
            }
        };

        self.rules = ModeRules::for_mode(data.setup.mode, data.setup.difficulty);
        self.setup = data.setup;
        self.board = data.board;
        self.score = data.score;
        self.adventure = data.adventure;
        self.opponent = data.opponent;
        self.sim_time_ms = data.sim_time_ms;
        self.episode_id = data.episode_id;
        self.recorder = data.replay;
        self.boosters = BoosterController::new();
        self.input.reset();
        self.accumulator_ms = 0;
        self.story = None;
        self.last_result = None;
        self.force_state(GameStateKind::Paused);
        // The saved board carries the speed it was played at; current settings win.
        self.set_game_config(self.config);
        log::info!("loaded session {} at {}ms", self.episode_id, self.sim_time_ms);
        true
    }

    pub fn has_saved_game(&self, store: &dyn KeyValueStore) -> bool {
        matches!(persistence::read_save(store), Ok(Some(_)))
    }

    pub fn clear_saved_game(&self, store: &mut dyn KeyValueStore) -> Result<(), PersistenceError> {
        store.remove(SAVE_KEY)?;
        Ok(())
    }

    fn reset_to_menu(&mut self) {
        self.board = BoardManager::default();
        self.score = ScoreManager::default();
        self.adventure.clear();
        self.opponent = None;
        self.boosters = BoosterController::new();
        self.input.reset();
        self.accumulator_ms = 0;
        self.sim_time_ms = 0;
        self.story = None;
        self.force_state(GameStateKind::Menu);
    }

    // ============== Configuration ==============

    /// Apply player settings immediately.
    pub fn set_game_config(&mut self, config: GameConfig) {
        self.config = config;
        self.board.set_speed_percent(self.effective_speed_percent());
        let timeout = self.input.config().key_release_timeout_ms;
        self.input.set_config(InputConfig {
            das_ms: config.das_ms,
            arr_ms: config.arr_ms,
            soft_drop_arr_ms: config.soft_drop_arr_ms,
            key_release_timeout_ms: timeout,
        });
        self.record_config();
    }

    pub fn set_input_config(&mut self, config: InputConfig) {
        self.config.das_ms = config.das_ms;
        self.config.arr_ms = config.arr_ms;
        self.config.soft_drop_arr_ms = config.soft_drop_arr_ms;
        self.input.set_config(config);
        self.record_config();
    }

    /// Settings changes inside a running session become part of its replay.
    fn record_config(&mut self) {
        let in_session = matches!(
            self.state.current(),
            GameStateKind::Countdown
                | GameStateKind::Playing
                | GameStateKind::Paused
                | GameStateKind::WildcardSelection
                | GameStateKind::BombSelection
                | GameStateKind::LineSelection
        );
        if in_session {
            self.recorder.record_config(self.sim_time_ms, self.config);
        }
    }

    fn effective_speed_percent(&self) -> u32 {
        let level = self.adventure.config().map_or(100, |l| l.speed_percent());
        (self.config.speed_percent * level / 100).max(1)
    }

    fn level_flipped(&self) -> bool {
        self.adventure.config().is_some_and(|l| l.flipped())
    }

    // ============== Events ==============

    pub fn events(&mut self) -> &mut EventBus {
        &mut self.events
    }

    fn emit(&mut self, event: GameEvent) {
        self.events.emit(event);
    }

    fn diagnostic(&mut self, message: String) {
        log::error!("{}", message);
        self.emit(GameEvent::Diagnostic { message });
    }

    fn transition(&mut self, to: GameStateKind) -> bool {
        match self.state.transition_to(to) {
            Some((from, to)) => {
                self.emit(GameEvent::StateChange { from, to });
                true
            }
            None => false,
        }
    }

    fn force_state(&mut self, to: GameStateKind) {
        let (from, to) = self.state.force(to);
        self.emit(GameEvent::StateChange { from, to });
    }

    // ============== Queries ==============

    pub fn state(&self) -> GameStateKind {
        self.state.current()
    }

    pub fn stats(&self) -> &GameStats {
        self.score.stats()
    }

    pub fn board(&self) -> &BoardManager {
        &self.board
    }

    pub fn adventure(&self) -> &AdventureManager {
        &self.adventure
    }

    pub fn opponent(&self) -> Option<&BattleOpponent> {
        self.opponent.as_ref()
    }

    pub fn setup(&self) -> &GameSetup {
        &self.setup
    }

    pub fn game_config(&self) -> GameConfig {
        self.config
    }

    pub fn input_config(&self) -> InputConfig {
        self.input.config()
    }

    pub fn pending_selection(&self) -> Option<PendingSelection> {
        self.boosters.pending()
    }

    pub fn selected_level(&self) -> Option<&AdventureLevelConfig> {
        self.selected_level.as_ref()
    }

    /// Result of the last finished session.
    pub fn last_result(&self) -> Option<&SessionResult> {
        self.last_result.as_ref()
    }

    pub fn countdown_seconds(&self) -> u32 {
        self.state.countdown_seconds()
    }

    /// Simulated play time; stops during pause and selections.
    pub fn sim_time_ms(&self) -> u32 {
        self.sim_time_ms
    }

    pub fn episode_id(&self) -> u32 {
        self.episode_id
    }

    /// The session recorded so far.
    pub fn replay(&self) -> ReplayData {
        self.recorder
            .snapshot(self.score.stats(), self.board_hash(), self.sim_time_ms)
    }

    pub fn board_hash(&self) -> u64 {
        let mut codes = Vec::new();
        self.board.board().write_codes(&mut codes);
        fnv1a64(&codes)
    }

    /// Fill `out` for rendering, reusing its buffers.
    pub fn snapshot_into(&self, out: &mut GameSnapshot) {
        self.board.snapshot_into(out);
        out.state = self.state.current();
        out.mode = self.setup.mode;
        out.stats.clone_from(self.score.stats());
        out.episode_id = self.episode_id;
        out.seed = self.board.seed();
        out.sim_time_ms = self.sim_time_ms;
    }

    pub fn snapshot(&self) -> GameSnapshot {
        let mut snapshot = GameSnapshot::default();
        self.snapshot_into(&mut snapshot);
        snapshot
    }
}

impl Default for GameCore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for GameCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameCore")
            .field("state", &self.state.current())
            .field("mode", &self.setup.mode)
            .field("episode_id", &self.episode_id)
            .field("sim_time_ms", &self.sim_time_ms)
            .field("score", &self.score.stats().score)
            .field("events", &self.events)
            .finish()
    }
}
