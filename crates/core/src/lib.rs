//! Core game logic - pure, deterministic, and testable
//!
//! This crate contains the rules of the falling-block simulation. It has
//! **no dependencies** on UI, networking, clocks or I/O, making it:
//!
//! - **Deterministic**: Same seed and inputs produce identical boards (replays)
//! - **Testable**: Unit tests for every rule beside the code
//! - **Portable**: Runs in any host (terminal, GUI, headless)
//!
//! # Module Structure
//!
//! - [`board`]: variable-size collision grid with gravity-aware line clearing
//! - [`pieces`]: shape tables (tetrominoes plus extended shapes) and SRS kicks
//! - [`piece`]: active piece control, lock delay and T-spin detection
//! - [`rng`]: LCG and the bag randomizer
//! - [`board_manager`]: grid + active piece + bag + hold + garbage, driven by `tick`
//! - [`scoring`]: score tables with T-spins, combos, back-to-back and perfect clears
//! - [`score_manager`]: chains, meters, levels and achievements over [`GameStats`]
//! - [`snapshot`]: render boundary
//!
//! # Example
//!
//! ```
//! use blockfall_core::{BoardConfig, BoardManager, SpawnOutcome};
//!
//! let mut board = BoardManager::new(&BoardConfig { seed: 12345, ..BoardConfig::default() });
//! assert!(matches!(board.spawn_next(), SpawnOutcome::Spawned(_)));
//!
//! board.move_horizontal(1);
//! board.rotate(true);
//! let lock = board.hard_drop().unwrap();
//! assert!(lock.hard_drop_cells > 0);
//! ```
//!
//! # Timing
//!
//! The simulation uses a fixed timestep:
//! - **Tick Rate**: 16ms
//! - **Gravity**: Depends on level (1000ms at level 0, 120ms floor)
//! - **Soft Drop**: 10x faster than normal gravity
//! - **Lock Delay**: 450ms when grounded, at most 15 resets

pub mod board;
pub mod board_manager;
pub mod piece;
pub mod pieces;
pub mod rng;
pub mod score_manager;
pub mod scoring;
pub mod snapshot;
pub mod stats;

pub use blockfall_types as types;

pub use board::{Board, Collected, Gravity};
pub use board_manager::{BoardConfig, BoardManager, LockResult, SpawnOutcome, TickOutcome};
pub use piece::{ActivePiece, LockDelay, PieceController};
pub use pieces::{get_shape, try_rotate};
pub use rng::{RandomizerBag, SimpleRng};
pub use score_manager::{Achievement, Expired, ScoreManager, ScoreUpdate};
pub use scoring::{calculate_drop_score, calculate_score, ScoreResult};
pub use snapshot::{fnv1a64, ActiveSnapshot, GameSnapshot};
pub use stats::{BoosterInventory, GameStats, Timer};
