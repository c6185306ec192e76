//! BoardManager - owns the grid, the active piece, the bag, hold and garbage
//!
//! All mutation of the collision grid goes through here. The manager is
//! driven by a fixed `tick(elapsed_ms)` and by discrete piece actions; it
//! never reads a clock, so identical inputs always produce identical boards.

use std::collections::VecDeque;

use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

use crate::board::{Board, Collected, Gravity};
use crate::piece::{ActivePiece, PieceController};
use crate::rng::{RandomizerBag, SimpleRng};
use crate::scoring::{get_drop_interval_ms, get_soft_drop_interval_ms};
use crate::snapshot::{ActiveSnapshot, GameSnapshot};
use crate::types::{
    Block, BoardLayout, PieceKind, TSpinKind, DROP_INTERVAL_MIN_MS, GARBAGE_INTERVAL_MS,
    LOCK_DELAY_MS, LOCK_RESET_LIMIT, PREVIEW_LEN, SOFT_DROP_GRACE_MS, SOFT_DROP_MULTIPLIER,
};

/// Salt for the garbage stream so it never shares state with the bag
const GARBAGE_SALT: u32 = 0x6A09_E667;

/// Board setup for a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardConfig {
    pub layout: BoardLayout,
    pub start_level: u32,
    pub seed: u32,
    /// Shapes the bag draws from; empty means the standard seven
    pub shapes: Vec<PieceKind>,
    pub lock_delay_ms: u32,
    pub lock_reset_limit: u8,
    /// Gravity interval scale (difficulty), percent
    pub gravity_percent: u32,
    /// Gravity speed (player setting), percent; higher is faster
    pub speed_percent: u32,
    pub garbage_interval_ms: u32,
    /// Every Nth spawn asks the player to pick the shape
    pub wildcard_every: Option<u32>,
    pub flipped: bool,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            layout: BoardLayout::default(),
            start_level: 0,
            seed: 1,
            shapes: Vec::new(),
            lock_delay_ms: LOCK_DELAY_MS,
            lock_reset_limit: LOCK_RESET_LIMIT,
            gravity_percent: 100,
            speed_percent: 100,
            garbage_interval_ms: GARBAGE_INTERVAL_MS,
            wildcard_every: None,
            flipped: false,
        }
    }
}

/// What happened when a new piece was requested
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpawnOutcome {
    Spawned(PieceKind),
    /// Waiting for the player to choose the shape
    Wildcard,
    /// Spawn cells are occupied (top-out)
    Blocked,
}

/// Placement metadata of a lock
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockResult {
    pub kind: PieceKind,
    /// Grid rows removed, ascending
    pub cleared_rows: Vec<u8>,
    pub tspin: TSpinKind,
    pub perfect_clear: bool,
    pub collected: Collected,
    pub hard_drop_cells: u32,
    /// The piece overlapped the stack when locked (internal invariant broken)
    pub overlapped: bool,
}

impl LockResult {
    pub fn new(kind: PieceKind) -> Self {
        Self {
            kind,
            cleared_rows: Vec::new(),
            tspin: TSpinKind::None,
            perfect_clear: false,
            collected: Collected::default(),
            hard_drop_cells: 0,
            overlapped: false,
        }
    }

    pub fn lines(&self) -> u32 {
        self.cleared_rows.len() as u32
    }
}

/// Result of a single `tick`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TickOutcome {
    pub locked: Option<LockResult>,
    pub garbage_rows: u8,
    /// Garbage pushed blocks off the board or out from under the active piece
    pub overflow: bool,
    pub soft_drop_cells: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardManager {
    board: Board,
    gravity: Gravity,
    controller: PieceController,
    bag: RandomizerBag,
    garbage_rng: SimpleRng,
    hold: Option<PieceKind>,
    can_hold: bool,
    garbage_queue: VecDeque<u8>,
    garbage_timer_ms: u32,
    garbage_interval_ms: u32,
    drop_timer_ms: u32,
    /// Remaining soft-drop grace; gravity runs at soft-drop speed while > 0
    soft_drop_ms: u32,
    level: u32,
    gravity_percent: u32,
    speed_percent: u32,
    slow_time: bool,
    wildcard_every: Option<u32>,
    spawn_count: u32,
    wildcard_pending: bool,
    pieces_locked: u32,
}

impl BoardManager {
    pub fn new(config: &BoardConfig) -> Self {
        let board = Board::new(config.layout);
        Self {
            board,
            gravity: if config.flipped { Gravity::Up } else { Gravity::Down },
            controller: PieceController::new(config.lock_delay_ms, config.lock_reset_limit),
            bag: RandomizerBag::with_shapes(config.seed, &config.shapes),
            garbage_rng: SimpleRng::fork(config.seed, GARBAGE_SALT),
            hold: None,
            can_hold: true,
            garbage_queue: VecDeque::new(),
            garbage_timer_ms: 0,
            garbage_interval_ms: config.garbage_interval_ms.max(1),
            drop_timer_ms: 0,
            soft_drop_ms: 0,
            level: config.start_level,
            gravity_percent: config.gravity_percent.max(1),
            speed_percent: config.speed_percent.max(1),
            slow_time: false,
            wildcard_every: config.wildcard_every.filter(|&n| n > 0),
            spawn_count: 0,
            wildcard_pending: false,
            pieces_locked: 0,
        }
    }

    /// Reset everything for a new session.
    pub fn initialize(&mut self, config: &BoardConfig) {
        *self = Self::new(config);
        log::debug!(
            "board initialized: {}x{} seed={}",
            self.board.width(),
            self.board.height(),
            config.seed
        );
    }

    // ============== Spawning ==============

    /// Spawn the next piece, or hand the choice to the player on wildcard turns.
    pub fn spawn_next(&mut self) -> SpawnOutcome {
        self.spawn_count += 1;
        if let Some(n) = self.wildcard_every {
            if self.spawn_count % n == 0 {
                self.wildcard_pending = true;
                return SpawnOutcome::Wildcard;
            }
        }
        let kind = self.bag.draw();
        self.spawn_kind(kind)
    }

    fn spawn_kind(&mut self, kind: PieceKind) -> SpawnOutcome {
        self.drop_timer_ms = 0;
        if self.controller.spawn(kind, &self.board, self.gravity) {
            SpawnOutcome::Spawned(kind)
        } else {
            SpawnOutcome::Blocked
        }
    }

    /// Resolve a pending wildcard spawn with the chosen shape.
    pub fn choose_wildcard(&mut self, kind: PieceKind) -> Option<SpawnOutcome> {
        if !self.wildcard_pending {
            return None;
        }
        self.wildcard_pending = false;
        Some(self.spawn_kind(kind))
    }

    /// Abandon a pending wildcard; the next bag piece spawns instead.
    pub fn cancel_wildcard(&mut self) -> Option<SpawnOutcome> {
        if !self.wildcard_pending {
            return None;
        }
        self.wildcard_pending = false;
        let kind = self.bag.draw();
        Some(self.spawn_kind(kind))
    }

    /// Replace the active piece's shape in place (PieceSwap booster).
    pub fn swap_active(&mut self, kind: PieceKind) -> bool {
        let Some(current) = self.controller.active().copied() else {
            return false;
        };
        let swapped = ActivePiece::new(kind, current.x, current.y);
        if swapped.fits(&self.board) {
            self.controller.place(swapped, &self.board, self.gravity)
        } else {
            let restored = self.controller.spawn(kind, &self.board, self.gravity);
            if !restored {
                self.controller.place(current, &self.board, self.gravity);
            }
            restored
        }
    }

    // ============== Piece actions ==============

    pub fn move_horizontal(&mut self, dx: i8) -> bool {
        self.controller.try_move(&self.board, self.gravity, dx, 0)
    }

    /// One cell toward the floor, also arming soft-drop gravity.
    pub fn soft_drop(&mut self) -> bool {
        self.soft_drop_ms = SOFT_DROP_GRACE_MS;
        let dy = self.gravity.dy();
        self.controller.try_move(&self.board, self.gravity, 0, dy)
    }

    pub fn rotate(&mut self, clockwise: bool) -> bool {
        self.controller.try_rotate(&self.board, self.gravity, clockwise)
    }

    /// Drop and lock immediately.
    pub fn hard_drop(&mut self) -> Option<LockResult> {
        self.controller.active()?;
        let cells = self.controller.hard_drop(&self.board, self.gravity);
        let mut result = self.lock_active()?;
        result.hard_drop_cells = cells;
        Some(result)
    }

    /// Swap the active piece with the hold slot (once per piece).
    ///
    /// Returns `None` when hold is not allowed, otherwise the spawn that
    /// replaced the held piece.
    pub fn hold(&mut self) -> Option<SpawnOutcome> {
        if !self.can_hold {
            return None;
        }
        let current = self.controller.active()?.kind;
        self.controller.discard();
        self.can_hold = false;

        let outcome = match self.hold.replace(current) {
            Some(held) => self.spawn_kind(held),
            None => self.spawn_next(),
        };
        Some(outcome)
    }

    // ============== Simulation ==============

    /// Advance gravity, lock delay and garbage cadence by `elapsed_ms`.
    pub fn tick(&mut self, elapsed_ms: u32) -> TickOutcome {
        let mut outcome = TickOutcome::default();

        if self.garbage_queue.is_empty() {
            self.garbage_timer_ms = 0;
        } else {
            self.garbage_timer_ms += elapsed_ms;
            if self.garbage_timer_ms >= self.garbage_interval_ms {
                self.garbage_timer_ms = 0;
                let rows = self.garbage_queue.pop_front().unwrap_or(0);
                outcome.garbage_rows = rows;
                if !self.insert_garbage(rows) {
                    outcome.overflow = true;
                    return outcome;
                }
            }
        }

        if self.controller.active().is_none() {
            return outcome;
        }

        let soft = self.soft_drop_ms > 0;
        self.soft_drop_ms = self.soft_drop_ms.saturating_sub(elapsed_ms);

        if self.controller.tick_lock(&self.board, self.gravity, elapsed_ms) {
            outcome.locked = self.lock_active();
            return outcome;
        }

        let interval = self.drop_interval_ms(soft);
        self.drop_timer_ms += elapsed_ms;
        let dy = self.gravity.dy();
        while self.drop_timer_ms >= interval {
            self.drop_timer_ms -= interval;
            if !self.controller.try_move(&self.board, self.gravity, 0, dy) {
                self.drop_timer_ms = 0;
                break;
            }
            if soft {
                outcome.soft_drop_cells += 1;
            }
        }

        outcome
    }

    /// Current gravity interval in milliseconds.
    pub fn drop_interval_ms(&self, soft: bool) -> u32 {
        let mut interval = get_drop_interval_ms(self.level) * self.gravity_percent / self.speed_percent;
        if self.slow_time {
            interval *= 2;
        }
        let interval = interval.max(DROP_INTERVAL_MIN_MS);
        if soft {
            get_soft_drop_interval_ms(interval, SOFT_DROP_MULTIPLIER)
        } else {
            interval
        }
    }

    /// Merge the active piece into the grid and clear completed rows.
    pub fn lock_active(&mut self) -> Option<LockResult> {
        let (piece, tspin) = self.controller.take(&self.board)?;

        let mut result = LockResult::new(piece.kind);
        result.tspin = tspin;
        if !self.board.lock_piece(piece.shape(), piece.x, piece.y, piece.kind) {
            result.overlapped = true;
            log::error!("locked {:?} onto occupied cells at ({}, {})", piece.kind, piece.x, piece.y);
        }

        let (rows, collected) = self.board.clear_full_rows(self.gravity);
        result.perfect_clear = !rows.is_empty() && self.board.is_empty();
        result.cleared_rows = rows;
        result.collected = collected;

        self.can_hold = true;
        self.pieces_locked += 1;
        self.drop_timer_ms = 0;
        self.soft_drop_ms = 0;
        Some(result)
    }

    // ============== Garbage ==============

    /// Queue garbage to rise on the garbage cadence.
    pub fn queue_garbage(&mut self, rows: u8) {
        if rows > 0 {
            self.garbage_queue.push_back(rows);
        }
    }

    /// Cancel queued garbage with outgoing lines. Returns lines left over.
    pub fn cancel_garbage(&mut self, mut lines: u32) -> u32 {
        while lines > 0 {
            let Some(front) = self.garbage_queue.front_mut() else {
                break;
            };
            let cancel = (*front as u32).min(lines);
            *front -= cancel as u8;
            lines -= cancel;
            if *front == 0 {
                self.garbage_queue.pop_front();
            }
        }
        lines
    }

    pub fn pending_garbage(&self) -> u32 {
        self.garbage_queue.iter().map(|&r| r as u32).sum()
    }

    /// Push `rows` garbage rows in from the floor immediately.
    /// Returns false on overflow.
    pub fn insert_garbage(&mut self, rows: u8) -> bool {
        let width = self.board.width() as u32;
        let mut ok = true;
        for _ in 0..rows {
            let gap = self.garbage_rng.next_range(width) as u8;
            ok &= self.board.insert_garbage_row(gap, self.gravity);
        }
        log::debug!("inserted {} garbage rows", rows);
        ok && self.controller.nudge_clear(&self.board, self.gravity, rows)
    }

    /// Replace random garbage cells with a modifier. Returns how many were placed.
    pub fn embed_modifiers(&mut self, block: Block, count: u32) -> u32 {
        let mut candidates: Vec<(i8, i8)> = Vec::new();
        for y in 0..self.board.height() as i8 {
            for x in 0..self.board.width() as i8 {
                if self.board.get(x, y) == Some(Some(Block::Garbage)) {
                    candidates.push((x, y));
                }
            }
        }
        self.garbage_rng.shuffle(&mut candidates);
        let placed = candidates.len().min(count as usize);
        for &(x, y) in &candidates[..placed] {
            self.board.set(x, y, Some(block));
        }
        placed as u32
    }

    // ============== Booster effects ==============

    /// Remove arbitrary rows and compact. The active piece is nudged clear if
    /// the settling stack reaches it.
    pub fn clear_rows(&mut self, rows: &[u8]) -> Collected {
        let (_, collected) = self.board.clear_rows(rows, self.gravity);
        let height = self.board.height();
        if !self.controller.nudge_clear(&self.board, self.gravity, height) {
            log::error!("active piece could not be settled after a row clear");
            self.controller.discard();
        }
        collected
    }

    /// Flip or restore gravity. The active piece keeps its position.
    pub fn set_flipped(&mut self, flipped: bool) {
        let gravity = if flipped { Gravity::Up } else { Gravity::Down };
        if gravity != self.gravity {
            self.gravity = gravity;
            self.drop_timer_ms = 0;
            log::debug!("gravity now {:?}", gravity);
        }
    }

    /// Empty the grid (Zen overflow).
    pub fn wipe(&mut self) {
        self.board.clear();
        self.controller.discard();
        self.garbage_queue.clear();
    }

    pub fn set_level(&mut self, level: u32) {
        self.level = level;
    }

    pub fn set_speed_percent(&mut self, percent: u32) {
        self.speed_percent = percent.max(1);
    }

    pub fn set_slow_time(&mut self, on: bool) {
        self.slow_time = on;
    }

    // ============== Queries ==============

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    pub fn gravity(&self) -> Gravity {
        self.gravity
    }

    pub fn active(&self) -> Option<&ActivePiece> {
        self.controller.active()
    }

    pub fn ghost(&self) -> Option<ActivePiece> {
        self.controller.ghost(&self.board, self.gravity)
    }

    pub fn hold_piece(&self) -> Option<PieceKind> {
        self.hold
    }

    pub fn can_hold(&self) -> bool {
        self.can_hold
    }

    pub fn preview(&self) -> ArrayVec<PieceKind, PREVIEW_LEN> {
        self.bag.preview()
    }

    pub fn seed(&self) -> u32 {
        self.bag.seed()
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn wildcard_pending(&self) -> bool {
        self.wildcard_pending
    }

    pub fn pieces_locked(&self) -> u32 {
        self.pieces_locked
    }

    /// Fill the board-related snapshot fields, reusing `out`'s buffers.
    pub fn snapshot_into(&self, out: &mut GameSnapshot) {
        out.width = self.board.width();
        out.height = self.board.height();
        self.board.write_codes(&mut out.board);
        out.active = self.active().map(ActiveSnapshot::from);
        out.ghost = self.ghost().map(|g| ActiveSnapshot::from(&g));
        out.next_queue = self.preview();
        out.hold = self.hold;
        out.can_hold = self.can_hold;
        out.flipped_gravity = self.gravity == Gravity::Up;
    }
}

impl Default for BoardManager {
    fn default() -> Self {
        Self::new(&BoardConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started(seed: u32) -> BoardManager {
        let mut bm = BoardManager::new(&BoardConfig {
            seed,
            ..BoardConfig::default()
        });
        assert!(matches!(bm.spawn_next(), SpawnOutcome::Spawned(_)));
        bm
    }

    #[test]
    fn test_spawn_follows_preview() {
        let mut bm = BoardManager::default();
        let next = bm.preview()[0];
        assert_eq!(bm.spawn_next(), SpawnOutcome::Spawned(next));
        assert_eq!(bm.active().map(|p| p.kind), Some(next));
    }

    #[test]
    fn test_gravity_moves_piece_after_interval() {
        let mut bm = started(3);
        let y0 = bm.active().unwrap().y;
        for _ in 0..62 {
            bm.tick(16);
        }
        assert_eq!(bm.active().unwrap().y, y0);
        bm.tick(16);
        assert_eq!(bm.active().unwrap().y, y0 + 1);
    }

    #[test]
    fn test_hard_drop_locks_and_counts_cells() {
        let mut bm = started(3);
        let result = bm.hard_drop().unwrap();
        assert!(result.hard_drop_cells > 0);
        assert!(bm.active().is_none());
        assert_eq!(bm.pieces_locked(), 1);
        assert!(!bm.board().is_empty());
    }

    #[test]
    fn test_piece_locks_after_lock_delay() {
        let mut bm = started(9);
        while bm.soft_drop() {}
        let mut locked = None;
        for _ in 0..40 {
            let outcome = bm.tick(16);
            if outcome.locked.is_some() {
                locked = outcome.locked;
                break;
            }
        }
        assert!(locked.is_some());
    }

    #[test]
    fn test_hold_once_per_piece() {
        let mut bm = started(5);
        let first = bm.active().unwrap().kind;
        assert!(bm.hold().is_some());
        assert_eq!(bm.hold_piece(), Some(first));
        assert!(bm.hold().is_none());
        bm.hard_drop();
        bm.spawn_next();
        assert!(matches!(bm.hold(), Some(SpawnOutcome::Spawned(k)) if k == first));
    }

    #[test]
    fn test_line_clear_reports_rows() {
        let mut bm = BoardManager::default();
        for x in 0..10 {
            if !(3..=6).contains(&x) {
                bm.board_mut().set(x, 20, Some(Block::Garbage));
            }
        }
        bm.controller
            .place(ActivePiece::new(PieceKind::I, 3, 0), &bm.board, Gravity::Down);
        let result = bm.hard_drop().unwrap();
        assert_eq!(result.cleared_rows, vec![20]);
        assert!(result.perfect_clear);
    }

    #[test]
    fn test_wildcard_every_third_spawn() {
        let mut bm = BoardManager::new(&BoardConfig {
            wildcard_every: Some(3),
            ..BoardConfig::default()
        });
        let preview_before = bm.preview();
        assert!(matches!(bm.spawn_next(), SpawnOutcome::Spawned(_)));
        bm.hard_drop();
        assert!(matches!(bm.spawn_next(), SpawnOutcome::Spawned(_)));
        bm.hard_drop();
        assert_eq!(bm.spawn_next(), SpawnOutcome::Wildcard);
        assert!(bm.wildcard_pending());
        // The bag was not consumed by the wildcard turn
        assert_eq!(bm.preview()[0], preview_before[2]);
        assert_eq!(bm.choose_wildcard(PieceKind::Plus), Some(SpawnOutcome::Spawned(PieceKind::Plus)));
        assert!(bm.choose_wildcard(PieceKind::T).is_none());
    }

    #[test]
    fn test_garbage_rises_on_cadence() {
        let mut bm = started(11);
        bm.queue_garbage(2);
        assert_eq!(bm.pending_garbage(), 2);
        let mut risen = 0;
        for _ in 0..(GARBAGE_INTERVAL_MS / 16 + 1) {
            risen += bm.tick(16).garbage_rows;
        }
        assert_eq!(risen, 2);
        assert_eq!(bm.pending_garbage(), 0);
        assert!(bm.board().is_occupied(0, 20) || bm.board().is_occupied(1, 20));
    }

    #[test]
    fn test_cancel_garbage() {
        let mut bm = BoardManager::default();
        bm.queue_garbage(2);
        bm.queue_garbage(3);
        assert_eq!(bm.cancel_garbage(3), 0);
        assert_eq!(bm.pending_garbage(), 2);
        assert_eq!(bm.cancel_garbage(5), 3);
        assert_eq!(bm.pending_garbage(), 0);
    }

    #[test]
    fn test_flipped_gravity_falls_up() {
        let mut bm = BoardManager::new(&BoardConfig {
            flipped: true,
            ..BoardConfig::default()
        });
        bm.spawn_next();
        let y0 = bm.active().unwrap().y;
        assert!(bm.soft_drop());
        assert_eq!(bm.active().unwrap().y, y0 - 1);
    }

    #[test]
    fn test_slow_time_doubles_interval() {
        let mut bm = BoardManager::default();
        assert_eq!(bm.drop_interval_ms(false), 1000);
        bm.set_slow_time(true);
        assert_eq!(bm.drop_interval_ms(false), 2000);
        assert_eq!(bm.drop_interval_ms(true), 200);
    }

    #[test]
    fn test_same_seed_same_board() {
        let mut a = started(1234);
        let mut b = started(1234);
        for _ in 0..10 {
            a.hard_drop();
            b.hard_drop();
            a.spawn_next();
            b.spawn_next();
        }
        assert_eq!(a.board(), b.board());
    }
}
