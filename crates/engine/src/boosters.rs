//! BoosterController - activation protocol and selection validation.
//!
//! Instant boosters (slow time, flipped gravity) apply on activation. Bomb,
//! line clearer and piece swap suspend the simulation in a selection state
//! until the host confirms or cancels.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use blockfall_core::Board;

use crate::types::{BoosterKind, GameStateKind, BOMB_ROWS};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("boosters can only be activated while playing")]
    NotPlaying,
    #[error("no selection of that kind is pending")]
    NotSelecting,
    #[error("{count} rows from row {start} exceed board height {height}")]
    OutOfBounds { start: u8, count: u8, height: u8 },
    #[error("selected rows are already empty")]
    AlreadyCleared,
    #[error("no booster of that kind left")]
    NoInventory,
}

/// Where a wildcard choice came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WildcardOrigin {
    /// A wildcard spawn; nothing is active yet
    Spawn,
    /// The PieceSwap booster; replaces the active piece
    PieceSwap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PendingSelection {
    Bomb,
    Line,
    Wildcard(WildcardOrigin),
}

impl PendingSelection {
    pub fn state(&self) -> GameStateKind {
        match self {
            PendingSelection::Bomb => GameStateKind::BombSelection,
            PendingSelection::Line => GameStateKind::LineSelection,
            PendingSelection::Wildcard(_) => GameStateKind::WildcardSelection,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoosterController {
    pending: Option<PendingSelection>,
}

impl BoosterController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selection a booster needs, or `None` for instant boosters.
    pub fn selection_for(kind: BoosterKind) -> Option<PendingSelection> {
        match kind {
            BoosterKind::Bomb => Some(PendingSelection::Bomb),
            BoosterKind::LineClearer => Some(PendingSelection::Line),
            BoosterKind::PieceSwap => Some(PendingSelection::Wildcard(WildcardOrigin::PieceSwap)),
            BoosterKind::SlowTime | BoosterKind::FlippedGravity => None,
        }
    }

    pub fn begin(&mut self, selection: PendingSelection) {
        log::debug!("selection started: {:?}", selection);
        self.pending = Some(selection);
    }

    pub fn pending(&self) -> Option<PendingSelection> {
        self.pending
    }

    pub fn is_pending(&self, selection: PendingSelection) -> bool {
        self.pending == Some(selection)
    }

    /// End the current selection.
    pub fn finish(&mut self) -> Option<PendingSelection> {
        self.pending.take()
    }

    /// Rows a bomb starting at `start` would clear.
    pub fn bomb_rows(start: u8) -> impl Iterator<Item = u8> {
        (0..BOMB_ROWS).map(move |i| start.saturating_add(i))
    }

    pub fn validate_bomb(&self, start: u8, board: &Board) -> Result<Vec<u8>, SelectionError> {
        if !self.is_pending(PendingSelection::Bomb) {
            return Err(SelectionError::NotSelecting);
        }
        let height = board.height();
        if start as u32 + BOMB_ROWS as u32 > height as u32 {
            return Err(SelectionError::OutOfBounds {
                start,
                count: BOMB_ROWS,
                height,
            });
        }
        let rows: Vec<u8> = Self::bomb_rows(start).collect();
        if rows.iter().all(|&y| board.is_row_empty(y)) {
            return Err(SelectionError::AlreadyCleared);
        }
        Ok(rows)
    }

    pub fn validate_line(&self, row: u8, board: &Board) -> Result<u8, SelectionError> {
        if !self.is_pending(PendingSelection::Line) {
            return Err(SelectionError::NotSelecting);
        }
        let height = board.height();
        if row >= height {
            return Err(SelectionError::OutOfBounds {
                start: row,
                count: 1,
                height,
            });
        }
        if board.is_row_empty(row) {
            return Err(SelectionError::AlreadyCleared);
        }
        Ok(row)
    }
}
