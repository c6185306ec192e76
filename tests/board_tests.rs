//! Board tests - grid, line clears and garbage across layouts and gravity

use blockfall::core::{Board, BoardConfig, BoardManager, Gravity, SpawnOutcome};
use blockfall::types::{Block, BoardLayout, PieceKind};

fn fill_row(board: &mut Board, y: i8, block: Block) {
    for x in 0..board.width() as i8 {
        board.set(x, y, Some(block));
    }
}

#[test]
fn test_layout_sizes() {
    let comfort = Board::new(BoardLayout::Comfort);
    assert_eq!((comfort.width(), comfort.height()), (10, 21));

    let dense = Board::new(BoardLayout::Dense);
    assert_eq!((dense.width(), dense.height()), (20, 50));
    assert!(dense.is_empty());
    assert_eq!(dense.cells().len(), 1000);
}

#[test]
fn test_board_get_out_of_bounds() {
    let board = Board::new(BoardLayout::Comfort);
    assert_eq!(board.get(-1, 0), None);
    assert_eq!(board.get(0, -1), None);
    assert_eq!(board.get(10, 0), None);
    assert_eq!(board.get(0, 21), None);
    assert_eq!(board.get(9, 20), Some(None));
}

#[test]
fn test_board_set_and_get() {
    let mut board = Board::new(BoardLayout::Comfort);
    let t = Some(Block::Piece(PieceKind::T));
    assert!(board.set(5, 10, t));
    assert_eq!(board.get(5, 10), Some(t));
    assert!(board.is_occupied(5, 10));

    assert!(!board.set(10, 0, t));
    board.clear();
    assert!(board.is_empty());
}

#[test]
fn test_clear_compacts_toward_floor() {
    let mut board = Board::new(BoardLayout::Comfort);
    fill_row(&mut board, 20, Block::Piece(PieceKind::I));
    fill_row(&mut board, 18, Block::Piece(PieceKind::O));
    board.set(0, 19, Some(Block::Piece(PieceKind::T)));
    board.set(4, 17, Some(Block::Piece(PieceKind::L)));

    let (rows, _) = board.clear_full_rows(Gravity::Down);
    assert_eq!(rows, vec![18, 20]);
    assert_eq!(board.get(0, 20), Some(Some(Block::Piece(PieceKind::T))));
    assert_eq!(board.get(4, 19), Some(Some(Block::Piece(PieceKind::L))));
    assert!(board.is_row_empty(18));
}

#[test]
fn test_flipped_gravity_clears_toward_row_zero() {
    let mut board = Board::new(BoardLayout::Comfort);
    fill_row(&mut board, 0, Block::Garbage);
    board.set(3, 1, Some(Block::Piece(PieceKind::S)));

    let (rows, collected) = board.clear_full_rows(Gravity::Up);
    assert_eq!(rows, vec![0]);
    assert_eq!(collected.garbage, 10);
    assert_eq!(board.get(3, 0), Some(Some(Block::Piece(PieceKind::S))));
    assert_eq!(board.stack_height(Gravity::Up), 1);
}

#[test]
fn test_clear_rows_collects_modifiers() {
    let mut board = Board::new(BoardLayout::Comfort);
    board.set(0, 20, Some(Block::Gem));
    board.set(1, 20, Some(Block::Bomb));
    board.set(2, 19, Some(Block::Gem));

    // Booster clears remove rows regardless of fill.
    let (rows, collected) = board.clear_rows(&[19, 20], Gravity::Down);
    assert_eq!(rows, vec![19, 20]);
    assert_eq!((collected.gems, collected.bombs), (2, 1));
    assert!(board.is_empty());
}

#[test]
fn test_garbage_row_pushes_stack_up() {
    let mut board = Board::new(BoardLayout::Comfort);
    board.set(2, 20, Some(Block::Piece(PieceKind::J)));

    assert!(board.insert_garbage_row(7, Gravity::Down));
    assert_eq!(board.get(2, 19), Some(Some(Block::Piece(PieceKind::J))));
    assert_eq!(board.get(7, 20), Some(None));
    assert_eq!(board.count_blocks(|b| *b == Block::Garbage), 9);

    // A block on the top row is pushed off.
    board.set(0, 0, Some(Block::Garbage));
    assert!(!board.insert_garbage_row(0, Gravity::Down));
}

#[test]
fn test_lock_piece_rejects_overlap() {
    let mut board = Board::new(BoardLayout::Comfort);
    let shape = [(0, 0), (1, 0), (0, 1), (1, 1)];
    assert!(board.lock_piece(&shape, 0, 19, PieceKind::O));
    assert!(!board.lock_piece(&shape, 1, 19, PieceKind::O));
    assert_eq!(board.count_blocks(|_| true), 4);
}

#[test]
fn test_manager_clears_a_line_on_dense_board() {
    let config = BoardConfig {
        layout: BoardLayout::Dense,
        seed: 5,
        shapes: vec![PieceKind::I],
        ..BoardConfig::default()
    };
    let mut manager = BoardManager::new(&config);
    // Leave exactly the spawn columns of the I piece open on the floor.
    for x in 0..20 {
        if !(8..12).contains(&x) {
            manager.board_mut().set(x, 49, Some(Block::Garbage));
        }
    }

    assert_eq!(manager.spawn_next(), SpawnOutcome::Spawned(PieceKind::I));
    let lock = manager.hard_drop().unwrap();
    assert_eq!(lock.cleared_rows, vec![49]);
    assert_eq!(lock.collected.garbage, 16);
    assert!(lock.perfect_clear);
}
