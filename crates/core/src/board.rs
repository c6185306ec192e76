//! Board module - manages the game grid
//!
//! The board is a `width x height` grid where each cell is empty or holds
//! exactly one [`Block`]. Storage is a flat row-major vector sized once from
//! the [`BoardLayout`], so the hot paths never reallocate.
//!
//! Coordinates: (x, y) where x grows left to right and y grows top to bottom.
//! The grid orientation never changes; flipped gravity only changes which
//! edge acts as the floor when rows compact or garbage rises.

use serde::{Deserialize, Serialize};

use crate::types::{Block, BoardLayout, Cell, PieceKind};

/// Direction pieces fall and rows compact toward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Gravity {
    /// Floor is the last row
    #[default]
    Down,
    /// Floor is row 0
    Up,
}

impl Gravity {
    /// Row delta of one gravity step.
    pub fn dy(self) -> i8 {
        match self {
            Gravity::Down => 1,
            Gravity::Up => -1,
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            Gravity::Down => Gravity::Up,
            Gravity::Up => Gravity::Down,
        }
    }
}

/// Modifier blocks removed together with cleared rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Collected {
    pub gems: u32,
    pub bombs: u32,
    pub garbage: u32,
}

impl Collected {
    fn add_row(&mut self, row: &[Cell]) {
        for cell in row.iter().flatten() {
            match cell {
                Block::Gem => self.gems += 1,
                Block::Bomb => self.bombs += 1,
                Block::Garbage => self.garbage += 1,
                Block::Piece(_) => {}
            }
        }
    }
}

/// The game board using flat vector storage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    width: u8,
    height: u8,
    /// Row-major cells (y * width + x)
    cells: Vec<Cell>,
}

impl Board {
    /// Create a new empty board for a layout
    pub fn new(layout: BoardLayout) -> Self {
        Self::with_size(layout.width(), layout.height())
    }

    /// Create a new empty board with explicit dimensions
    pub fn with_size(width: u8, height: u8) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            width,
            height,
            cells: vec![None; width as usize * height as usize],
        }
    }

    /// Calculate flat index from (x, y) coordinates
    #[inline(always)]
    fn index(&self, x: i8, y: i8) -> Option<usize> {
        if self.is_out_of_bounds(x, y) {
            return None;
        }
        Some((y as usize) * (self.width as usize) + (x as usize))
    }

    pub fn width(&self) -> u8 {
        self.width
    }

    pub fn height(&self) -> u8 {
        self.height
    }

    /// Get cell at position (x, y)
    /// Returns None if out of bounds
    pub fn get(&self, x: i8, y: i8) -> Option<Cell> {
        self.index(x, y).map(|idx| self.cells[idx])
    }

    /// Set cell at position (x, y)
    /// Returns false if out of bounds
    pub fn set(&mut self, x: i8, y: i8, cell: Cell) -> bool {
        match self.index(x, y) {
            Some(idx) => {
                self.cells[idx] = cell;
                true
            }
            None => false,
        }
    }

    /// Check if position is valid (within bounds and empty)
    pub fn is_valid(&self, x: i8, y: i8) -> bool {
        matches!(self.get(x, y), Some(None))
    }

    /// Check if position is occupied (within bounds and filled)
    pub fn is_occupied(&self, x: i8, y: i8) -> bool {
        matches!(self.get(x, y), Some(Some(_)))
    }

    pub fn is_out_of_bounds(&self, x: i8, y: i8) -> bool {
        x < 0 || y < 0 || x as i16 >= self.width as i16 || y as i16 >= self.height as i16
    }

    /// True when every cell of `shape` placed at (x, y) is in bounds and empty.
    pub fn fits(&self, shape: &[(i8, i8)], x: i8, y: i8) -> bool {
        shape.iter().all(|&(dx, dy)| {
            let (Some(px), Some(py)) = (x.checked_add(dx), y.checked_add(dy)) else {
                return false;
            };
            self.is_valid(px, py)
        })
    }

    fn row(&self, y: u8) -> &[Cell] {
        let w = self.width as usize;
        let start = y as usize * w;
        &self.cells[start..start + w]
    }

    /// Check if a row is completely filled
    pub fn is_row_full(&self, y: u8) -> bool {
        y < self.height && self.row(y).iter().all(Option::is_some)
    }

    pub fn is_row_empty(&self, y: u8) -> bool {
        y >= self.height || self.row(y).iter().all(Option::is_none)
    }

    /// No occupied cell anywhere (perfect clear).
    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(Option::is_none)
    }

    /// Number of cells holding a block matching `pred`.
    pub fn count_blocks(&self, pred: impl Fn(&Block) -> bool) -> u32 {
        self.cells.iter().flatten().filter(|b| pred(b)).count() as u32
    }

    /// Remove rows selected by `remove` and compact the survivors toward
    /// the gravity floor, preserving their order. Returns removed row
    /// indices ascending.
    fn compact(
        &mut self,
        gravity: Gravity,
        remove: impl Fn(u8, &[Cell]) -> bool,
    ) -> (Vec<u8>, Collected) {
        let w = self.width as usize;
        let h = self.height as usize;
        // i-th row counted from the floor
        let row_at = |i: usize| match gravity {
            Gravity::Down => h - 1 - i,
            Gravity::Up => i,
        };

        let mut removed = Vec::new();
        let mut collected = Collected::default();
        let mut write = 0usize;

        for read in 0..h {
            let y = row_at(read);
            let start = y * w;
            if remove(y as u8, &self.cells[start..start + w]) {
                removed.push(y as u8);
                collected.add_row(&self.cells[start..start + w]);
            } else {
                let dst = row_at(write);
                if dst != y {
                    self.cells.copy_within(start..start + w, dst * w);
                }
                write += 1;
            }
        }

        for i in write..h {
            let y = row_at(i);
            self.cells[y * w..y * w + w].fill(None);
        }

        removed.sort_unstable();
        (removed, collected)
    }

    /// Clear all full rows and compact toward the floor.
    pub fn clear_full_rows(&mut self, gravity: Gravity) -> (Vec<u8>, Collected) {
        self.compact(gravity, |_, row| row.iter().all(Option::is_some))
    }

    /// Clear specific rows regardless of fill (booster effects).
    pub fn clear_rows(&mut self, rows: &[u8], gravity: Gravity) -> (Vec<u8>, Collected) {
        self.compact(gravity, |y, _| rows.contains(&y))
    }

    /// Insert one garbage row at the floor with an empty column at `gap`,
    /// pushing the stack away from the floor. Returns false when an
    /// occupied cell is pushed off the far edge.
    pub fn insert_garbage_row(&mut self, gap: u8, gravity: Gravity) -> bool {
        let w = self.width as usize;
        let h = self.height as usize;
        let total = w * h;

        let (lost_row, floor_row) = match gravity {
            Gravity::Down => (0usize, h - 1),
            Gravity::Up => (h - 1, 0usize),
        };
        let overflow = self.cells[lost_row * w..lost_row * w + w]
            .iter()
            .any(Option::is_some);

        match gravity {
            Gravity::Down => self.cells.copy_within(w..total, 0),
            Gravity::Up => self.cells.copy_within(0..total - w, w),
        }

        let gap = (gap as usize).min(w - 1);
        for (x, cell) in self.cells[floor_row * w..floor_row * w + w]
            .iter_mut()
            .enumerate()
        {
            *cell = if x == gap { None } else { Some(Block::Garbage) };
        }

        !overflow
    }

    /// Lock piece cells onto the board
    /// Returns false (leaving the board untouched) if any cell is out of
    /// bounds or already occupied
    pub fn lock_piece(&mut self, shape: &[(i8, i8)], x: i8, y: i8, kind: PieceKind) -> bool {
        if !self.fits(shape, x, y) {
            return false;
        }
        for &(dx, dy) in shape {
            self.set(x + dx, y + dy, Some(Block::Piece(kind)));
        }
        true
    }

    /// Clear the entire board
    pub fn clear(&mut self) {
        self.cells.fill(None);
    }

    /// Row-major cells
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Write snapshot codes (0 = empty) into `out`, reusing its allocation.
    pub fn write_codes(&self, out: &mut Vec<u8>) {
        out.clear();
        out.extend(self.cells.iter().map(|c| c.map_or(0, |b| b.code())));
    }

    /// Height of the stack measured from the gravity floor.
    pub fn stack_height(&self, gravity: Gravity) -> u8 {
        let occupied = (0..self.height).filter(|&y| !self.is_row_empty(y));
        let height = match gravity {
            Gravity::Down => occupied.min().map(|top| self.height - top),
            Gravity::Up => occupied.max().map(|bottom| bottom + 1),
        };
        height.unwrap_or(0)
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new(BoardLayout::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill_row(board: &mut Board, y: i8, block: Block) {
        for x in 0..board.width() as i8 {
            board.set(x, y, Some(block));
        }
    }

    #[test]
    fn test_dimensions_follow_layout() {
        let board = Board::new(BoardLayout::Dense);
        assert_eq!(board.width(), 20);
        assert_eq!(board.height(), 50);
        assert_eq!(board.cells().len(), 1000);
    }

    #[test]
    fn test_clear_full_rows_down() {
        let mut board = Board::default();
        fill_row(&mut board, 19, Block::Garbage);
        fill_row(&mut board, 20, Block::Piece(PieceKind::I));
        board.set(0, 18, Some(Block::Piece(PieceKind::T)));

        let (rows, _) = board.clear_full_rows(Gravity::Down);
        assert_eq!(rows, vec![19, 20]);
        assert_eq!(board.get(0, 20), Some(Some(Block::Piece(PieceKind::T))));
        assert_eq!(board.get(0, 18), Some(None));
    }

    #[test]
    fn test_clear_full_rows_up_compacts_toward_top() {
        let mut board = Board::default();
        fill_row(&mut board, 0, Block::Garbage);
        board.set(3, 1, Some(Block::Piece(PieceKind::O)));

        let (rows, _) = board.clear_full_rows(Gravity::Up);
        assert_eq!(rows, vec![0]);
        assert_eq!(board.get(3, 0), Some(Some(Block::Piece(PieceKind::O))));
        assert_eq!(board.get(3, 1), Some(None));
    }

    #[test]
    fn test_clear_rows_collects_modifiers() {
        let mut board = Board::default();
        board.set(2, 15, Some(Block::Gem));
        board.set(4, 16, Some(Block::Bomb));
        board.set(5, 16, Some(Block::Garbage));

        let (rows, collected) = board.clear_rows(&[15, 16, 17], Gravity::Down);
        assert_eq!(rows, vec![15, 16, 17]);
        assert_eq!(collected.gems, 1);
        assert_eq!(collected.bombs, 1);
        assert_eq!(collected.garbage, 1);
        assert!(board.is_empty());
    }

    #[test]
    fn test_insert_garbage_row_shifts_stack() {
        let mut board = Board::default();
        board.set(1, 20, Some(Block::Piece(PieceKind::L)));

        assert!(board.insert_garbage_row(4, Gravity::Down));
        assert_eq!(board.get(1, 19), Some(Some(Block::Piece(PieceKind::L))));
        assert_eq!(board.get(4, 20), Some(None));
        assert_eq!(board.get(0, 20), Some(Some(Block::Garbage)));
        assert!(!board.is_row_full(20));
    }

    #[test]
    fn test_insert_garbage_reports_overflow() {
        let mut board = Board::default();
        board.set(0, 0, Some(Block::Piece(PieceKind::T)));
        assert!(!board.insert_garbage_row(0, Gravity::Down));
    }

    #[test]
    fn test_insert_garbage_flipped_rises_from_top() {
        let mut board = Board::default();
        assert!(board.insert_garbage_row(9, Gravity::Up));
        assert_eq!(board.get(0, 0), Some(Some(Block::Garbage)));
        assert_eq!(board.get(9, 0), Some(None));
        assert!(board.is_row_empty(20));
    }

    #[test]
    fn test_stack_height() {
        let mut board = Board::default();
        assert_eq!(board.stack_height(Gravity::Down), 0);
        board.set(0, 17, Some(Block::Garbage));
        assert_eq!(board.stack_height(Gravity::Down), 4);
        assert_eq!(board.stack_height(Gravity::Up), 18);
    }

    #[test]
    fn test_write_codes() {
        let mut board = Board::with_size(3, 2);
        board.set(1, 1, Some(Block::Gem));
        let mut out = Vec::new();
        board.write_codes(&mut out);
        assert_eq!(out, vec![0, 0, 0, 0, Block::Gem.code(), 0]);
    }
}
