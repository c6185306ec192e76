//! Active piece control - movement, SRS rotation, lock delay, T-spin detection
//!
//! [`PieceController`] owns the falling piece and its lock-delay bookkeeping.
//! It never touches the board's cells; locking is done by
//! [`BoardManager`](crate::BoardManager) once the controller hands the piece
//! over.

use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

use crate::board::{Board, Gravity};
use crate::pieces::{get_shape, spawn_position, try_rotate, PieceShape};
use crate::types::{PieceKind, Rotation, TSpinKind, LOCK_DELAY_MS, LOCK_RESET_LIMIT, MAX_MINOS};

/// The falling piece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivePiece {
    pub kind: PieceKind,
    pub rotation: Rotation,
    pub x: i8,
    pub y: i8,
}

impl ActivePiece {
    pub fn new(kind: PieceKind, x: i8, y: i8) -> Self {
        Self {
            kind,
            rotation: Rotation::North,
            x,
            y,
        }
    }

    /// Current shape offsets
    pub fn shape(&self) -> PieceShape {
        get_shape(self.kind, self.rotation)
    }

    /// Absolute board cells covered by the piece
    pub fn cells(&self) -> ArrayVec<(i8, i8), MAX_MINOS> {
        self.shape()
            .iter()
            .map(|&(dx, dy)| (self.x + dx, self.y + dy))
            .collect()
    }

    pub fn fits(&self, board: &Board) -> bool {
        board.fits(self.shape(), self.x, self.y)
    }

    /// True when one more gravity step would collide
    pub fn is_grounded(&self, board: &Board, gravity: Gravity) -> bool {
        !board.fits(self.shape(), self.x, self.y + gravity.dy())
    }

    fn depth(&self, gravity: Gravity) -> i16 {
        self.y as i16 * gravity.dy() as i16
    }
}

/// Lock delay timer with a capped number of resets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockDelay {
    delay_ms: u32,
    limit: u8,
    timer_ms: u32,
    resets: u8,
}

impl LockDelay {
    pub fn new(delay_ms: u32, limit: u8) -> Self {
        Self {
            delay_ms,
            limit,
            timer_ms: 0,
            resets: 0,
        }
    }

    /// Restart the timer; counts against the reset limit.
    /// Returns false once the limit is used up.
    pub fn reset(&mut self) -> bool {
        if self.resets < self.limit {
            self.timer_ms = 0;
            self.resets += 1;
            true
        } else {
            false
        }
    }

    /// Full restart, used when the piece reaches a new lowest position.
    pub fn restart(&mut self) {
        self.timer_ms = 0;
        self.resets = 0;
    }

    pub fn advance(&mut self, elapsed_ms: u32) {
        self.timer_ms = self.timer_ms.saturating_add(elapsed_ms);
    }

    /// The piece must lock now: timer ran out, or every reset is spent.
    pub fn should_lock(&self) -> bool {
        self.timer_ms >= self.delay_ms || self.resets >= self.limit
    }

    pub fn timer_ms(&self) -> u32 {
        self.timer_ms
    }

    pub fn resets(&self) -> u8 {
        self.resets
    }
}

impl Default for LockDelay {
    fn default() -> Self {
        Self::new(LOCK_DELAY_MS, LOCK_RESET_LIMIT)
    }
}

/// Owns the active piece between spawn and lock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieceController {
    active: Option<ActivePiece>,
    lock: LockDelay,
    lock_delay_ms: u32,
    lock_limit: u8,
    /// Deepest point reached along the gravity axis
    deepest: i16,
    last_action_was_rotate: bool,
    last_kick: (i8, i8),
}

impl PieceController {
    pub fn new(lock_delay_ms: u32, lock_limit: u8) -> Self {
        Self {
            active: None,
            lock: LockDelay::new(lock_delay_ms, lock_limit),
            lock_delay_ms,
            lock_limit,
            deepest: i16::MIN,
            last_action_was_rotate: false,
            last_kick: (0, 0),
        }
    }

    pub fn active(&self) -> Option<&ActivePiece> {
        self.active.as_ref()
    }

    pub fn lock_delay(&self) -> &LockDelay {
        &self.lock
    }

    /// Place a fresh piece at its spawn position.
    /// Returns false (leaving no active piece) if the spawn cells are blocked.
    pub fn spawn(&mut self, kind: PieceKind, board: &Board, gravity: Gravity) -> bool {
        let (x, y) = spawn_position(kind, board.width(), board.height(), gravity);
        self.place(ActivePiece::new(kind, x, y), board, gravity)
    }

    /// Replace the active piece with `piece` if it fits.
    pub fn place(&mut self, piece: ActivePiece, board: &Board, gravity: Gravity) -> bool {
        self.lock = LockDelay::new(self.lock_delay_ms, self.lock_limit);
        self.last_action_was_rotate = false;
        self.last_kick = (0, 0);
        if piece.fits(board) {
            self.deepest = piece.depth(gravity);
            self.active = Some(piece);
            true
        } else {
            self.active = None;
            false
        }
    }

    /// Move by (dx, dy). Returns true if moved.
    pub fn try_move(&mut self, board: &Board, gravity: Gravity, dx: i8, dy: i8) -> bool {
        let Some(piece) = self.active else {
            return false;
        };
        let moved = ActivePiece {
            x: piece.x + dx,
            y: piece.y + dy,
            ..piece
        };
        if !moved.fits(board) {
            return false;
        }

        let was_grounded = piece.is_grounded(board, gravity);
        self.active = Some(moved);
        self.last_action_was_rotate = false;
        self.after_successful_move(board, gravity, was_grounded);
        true
    }

    /// Rotate with SRS kicks. Returns true if rotated.
    pub fn try_rotate(&mut self, board: &Board, gravity: Gravity, clockwise: bool) -> bool {
        let Some(piece) = self.active else {
            return false;
        };
        let Some((_, rotation, (kx, ky))) = try_rotate(
            piece.kind,
            piece.rotation,
            piece.x,
            piece.y,
            clockwise,
            |x, y| board.is_valid(x, y),
        ) else {
            return false;
        };

        let was_grounded = piece.is_grounded(board, gravity);
        self.active = Some(ActivePiece {
            rotation,
            x: piece.x + kx,
            y: piece.y + ky,
            ..piece
        });
        self.last_action_was_rotate = true;
        self.last_kick = (kx, ky);
        self.after_successful_move(board, gravity, was_grounded);
        true
    }

    fn after_successful_move(&mut self, board: &Board, gravity: Gravity, was_grounded: bool) {
        let Some(piece) = self.active else {
            return;
        };
        let depth = piece.depth(gravity);
        if depth > self.deepest {
            self.deepest = depth;
            self.lock.restart();
        } else if was_grounded || piece.is_grounded(board, gravity) {
            self.lock.reset();
        }
    }

    /// Advance lock delay while grounded. Returns true when the piece must lock.
    pub fn tick_lock(&mut self, board: &Board, gravity: Gravity, elapsed_ms: u32) -> bool {
        let Some(piece) = self.active else {
            return false;
        };
        if !piece.is_grounded(board, gravity) {
            return false;
        }
        self.lock.advance(elapsed_ms);
        self.lock.should_lock()
    }

    /// Cells the piece can still fall along the gravity axis
    pub fn drop_distance(&self, board: &Board, gravity: Gravity) -> i8 {
        let Some(piece) = self.active else {
            return 0;
        };
        let shape = piece.shape();
        let step = gravity.dy();
        let mut distance: i8 = 0;
        while board.fits(shape, piece.x, piece.y + step * (distance + 1)) {
            distance += 1;
        }
        distance
    }

    /// Landing position of the active piece
    pub fn ghost(&self, board: &Board, gravity: Gravity) -> Option<ActivePiece> {
        let piece = self.active?;
        Some(ActivePiece {
            y: piece.y + gravity.dy() * self.drop_distance(board, gravity),
            ..piece
        })
    }

    /// Drop to the landing position. Returns cells travelled.
    pub fn hard_drop(&mut self, board: &Board, gravity: Gravity) -> u32 {
        let distance = self.drop_distance(board, gravity);
        if distance == 0 {
            return 0;
        }
        if let Some(piece) = self.active.as_mut() {
            piece.y += gravity.dy() * distance;
            self.deepest = self.deepest.max(piece.depth(gravity));
            self.last_action_was_rotate = false;
            self.lock.restart();
        }
        distance as u32
    }

    /// Hand the active piece over for locking, with its T-spin classification.
    pub fn take(&mut self, board: &Board) -> Option<(ActivePiece, TSpinKind)> {
        let piece = self.active.take()?;
        let tspin = self.t_spin_kind(&piece, board);
        Some((piece, tspin))
    }

    /// Drop the active piece without locking it.
    pub fn discard(&mut self) -> Option<ActivePiece> {
        self.active.take()
    }

    /// Shift the piece against gravity until it fits again, up to `max_steps`.
    pub fn nudge_clear(&mut self, board: &Board, gravity: Gravity, max_steps: u8) -> bool {
        let Some(mut piece) = self.active else {
            return true;
        };
        for _ in 0..=max_steps {
            if piece.fits(board) {
                self.active = Some(piece);
                self.deepest = self.deepest.min(piece.depth(gravity));
                return true;
            }
            piece.y -= gravity.dy();
        }
        false
    }

    /// Three-corner T-spin check, evaluated before the piece joins the stack.
    fn t_spin_kind(&self, piece: &ActivePiece, board: &Board) -> TSpinKind {
        if piece.kind != PieceKind::T || !self.last_action_was_rotate {
            return TSpinKind::None;
        }

        let blocked = |&(cx, cy): &(i8, i8)| !board.is_valid(piece.x + cx, piece.y + cy);

        let corners = [(0, 0), (2, 0), (0, 2), (2, 2)];
        if corners.iter().filter(|c| blocked(c)).count() < 3 {
            return TSpinKind::None;
        }

        // Corners on either side of the pointing mino
        let front = match piece.rotation {
            Rotation::North => [(0, 0), (2, 0)],
            Rotation::East => [(2, 0), (2, 2)],
            Rotation::South => [(0, 2), (2, 2)],
            Rotation::West => [(0, 0), (0, 2)],
        };
        let front_filled = front.iter().filter(|c| blocked(c)).count();

        // The last SRS test upgrades a mini
        let long_kick = self.last_kick.0.abs() == 1 && self.last_kick.1.abs() == 2;

        if front_filled == 2 || long_kick {
            TSpinKind::Full
        } else {
            TSpinKind::Mini
        }
    }
}

impl Default for PieceController {
    fn default() -> Self {
        Self::new(LOCK_DELAY_MS, LOCK_RESET_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Block, BoardLayout};

    fn board() -> Board {
        Board::new(BoardLayout::Comfort)
    }

    #[test]
    fn test_spawn_and_move() {
        let board = board();
        let mut pc = PieceController::default();
        assert!(pc.spawn(PieceKind::T, &board, Gravity::Down));
        assert!(pc.try_move(&board, Gravity::Down, -1, 0));
        assert_eq!(pc.active().map(|p| p.x), Some(2));
    }

    #[test]
    fn test_move_into_wall_fails() {
        let board = board();
        let mut pc = PieceController::default();
        pc.spawn(PieceKind::O, &board, Gravity::Down);
        let mut moves = 0;
        while pc.try_move(&board, Gravity::Down, -1, 0) {
            moves += 1;
        }
        assert_eq!(moves, 4);
        assert_eq!(pc.active().map(|p| p.x), Some(-1));
    }

    #[test]
    fn test_spawn_blocked() {
        let mut board = board();
        board.set(4, 0, Some(Block::Garbage));
        let mut pc = PieceController::default();
        assert!(!pc.spawn(PieceKind::T, &board, Gravity::Down));
        assert!(pc.active().is_none());
    }

    #[test]
    fn test_hard_drop_distance() {
        let board = board();
        let mut pc = PieceController::default();
        pc.spawn(PieceKind::O, &board, Gravity::Down);
        assert_eq!(pc.hard_drop(&board, Gravity::Down), 19);
        assert!(pc.active().is_some_and(|p| p.is_grounded(&board, Gravity::Down)));
    }

    #[test]
    fn test_flipped_gravity_drops_up() {
        let board = board();
        let mut pc = PieceController::default();
        pc.spawn(PieceKind::O, &board, Gravity::Up);
        pc.hard_drop(&board, Gravity::Up);
        assert_eq!(pc.active().map(|p| p.y), Some(0));
    }

    #[test]
    fn test_lock_reset_limit_forces_lock() {
        let board = board();
        let mut pc = PieceController::new(LOCK_DELAY_MS, 3);
        pc.spawn(PieceKind::O, &board, Gravity::Down);
        pc.hard_drop(&board, Gravity::Down);

        for _ in 0..3 {
            assert!(!pc.tick_lock(&board, Gravity::Down, 100));
            assert!(pc.try_move(&board, Gravity::Down, 1, 0) || pc.try_move(&board, Gravity::Down, -1, 0));
        }
        assert_eq!(pc.lock_delay().resets(), 3);
        assert!(pc.tick_lock(&board, Gravity::Down, 16));
    }

    #[test]
    fn test_lock_timer_expires() {
        let board = board();
        let mut pc = PieceController::default();
        pc.spawn(PieceKind::O, &board, Gravity::Down);
        pc.hard_drop(&board, Gravity::Down);
        assert!(!pc.tick_lock(&board, Gravity::Down, LOCK_DELAY_MS - 1));
        assert!(pc.tick_lock(&board, Gravity::Down, 1));
    }

    #[test]
    fn test_airborne_piece_does_not_lock() {
        let board = board();
        let mut pc = PieceController::default();
        pc.spawn(PieceKind::T, &board, Gravity::Down);
        assert!(!pc.tick_lock(&board, Gravity::Down, 10_000));
    }

    #[test]
    fn test_t_spin_requires_rotation() {
        let mut board = board();
        board.set(0, 20, Some(Block::Garbage));
        board.set(2, 20, Some(Block::Garbage));
        board.set(2, 18, Some(Block::Garbage));
        let mut pc = PieceController::default();
        assert!(pc.place(
            ActivePiece {
                kind: PieceKind::T,
                rotation: Rotation::South,
                x: 0,
                y: 18
            },
            &board,
            Gravity::Down
        ));
        let (_, tspin) = pc.take(&board).unwrap();
        assert_eq!(tspin, TSpinKind::None);
    }

    #[test]
    fn test_t_spin_full_after_rotate() {
        let mut board = board();
        // T-slot: the T rotates into a south-facing pocket at the bottom
        for x in 0..10 {
            if x != 4 {
                board.set(x, 20, Some(Block::Garbage));
            }
            if !(3..=5).contains(&x) {
                board.set(x, 19, Some(Block::Garbage));
            }
        }
        board.set(3, 18, Some(Block::Garbage));

        let mut pc = PieceController::default();
        assert!(pc.place(
            ActivePiece {
                kind: PieceKind::T,
                rotation: Rotation::East,
                x: 3,
                y: 18
            },
            &board,
            Gravity::Down
        ));
        assert!(pc.try_rotate(&board, Gravity::Down, true));
        let piece = *pc.active().unwrap();
        assert_eq!(piece.rotation, Rotation::South);
        assert_eq!((piece.x, piece.y), (3, 18));
        let (_, tspin) = pc.take(&board).unwrap();
        assert_eq!(tspin, TSpinKind::Full);
    }

    #[test]
    fn test_nudge_clear_moves_against_gravity() {
        let mut board = board();
        let mut pc = PieceController::default();
        pc.spawn(PieceKind::O, &board, Gravity::Down);
        pc.hard_drop(&board, Gravity::Down);
        // Raise the floor under the piece
        assert!(board.insert_garbage_row(0, Gravity::Down));
        assert!(!pc.active().unwrap().fits(&board));
        assert!(pc.nudge_clear(&board, Gravity::Down, 4));
        assert_eq!(pc.active().map(|p| p.y), Some(18));
    }
}
