//! Render boundary - a plain, reusable copy of everything a frontend draws.

use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

use crate::piece::ActivePiece;
use crate::stats::GameStats;
use crate::types::{GameMode, GameStateKind, PieceKind, Rotation, MAX_MINOS, PREVIEW_LEN};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActiveSnapshot {
    pub kind: PieceKind,
    pub rotation: Rotation,
    pub x: i8,
    pub y: i8,
    /// Absolute board cells
    pub cells: ArrayVec<(i8, i8), MAX_MINOS>,
}

impl From<&ActivePiece> for ActiveSnapshot {
    fn from(value: &ActivePiece) -> Self {
        Self {
            kind: value.kind,
            rotation: value.rotation,
            x: value.x,
            y: value.y,
            cells: value.cells(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub width: u8,
    pub height: u8,
    /// Row-major cell codes, 0 = empty (see `Block::code`)
    pub board: Vec<u8>,
    pub active: Option<ActiveSnapshot>,
    pub ghost: Option<ActiveSnapshot>,
    pub hold: Option<PieceKind>,
    pub next_queue: ArrayVec<PieceKind, PREVIEW_LEN>,
    pub can_hold: bool,
    pub flipped_gravity: bool,
    pub state: GameStateKind,
    pub mode: GameMode,
    pub stats: GameStats,
    pub episode_id: u32,
    pub seed: u32,
    pub sim_time_ms: u32,
}

impl GameSnapshot {
    /// Cell code at (x, y), or `None` outside the grid.
    pub fn cell(&self, x: u8, y: u8) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.board
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    /// FNV-1a hash of the grid codes, for cheap board comparisons.
    pub fn board_hash(&self) -> u64 {
        fnv1a64(&self.board)
    }

    pub fn playable(&self) -> bool {
        self.state == GameStateKind::Playing
    }
}

pub fn fnv1a64(bytes: &[u8]) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01B3;
    bytes
        .iter()
        .fold(OFFSET, |hash, &b| (hash ^ b as u64).wrapping_mul(PRIME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fnv_known_values() {
        assert_eq!(fnv1a64(b""), 0xcbf2_9ce4_8422_2325);
        assert_eq!(fnv1a64(b"a"), 0xaf63_dc4c_8601_ec8c);
    }

    #[test]
    fn test_cell_lookup() {
        let snap = GameSnapshot {
            width: 2,
            height: 2,
            board: vec![0, 1, 2, 3],
            ..GameSnapshot::default()
        };
        assert_eq!(snap.cell(1, 1), Some(3));
        assert_eq!(snap.cell(2, 0), None);
    }
}
