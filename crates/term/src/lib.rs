//! Terminal presentation for blockfall.
//!
//! Rendering is split in two: [`GameView`] turns a snapshot into a
//! [`FrameBuffer`] without touching the terminal, and [`TerminalRenderer`]
//! flushes framebuffers with crossterm, re-emitting only changed cells.

pub mod fb;
pub mod game_view;
pub mod renderer;

pub use blockfall_core as core;
pub use blockfall_types as types;

pub use fb::{Cell, CellStyle, FrameBuffer, Rgb};
pub use game_view::{AnchorY, GameView, Hud, Viewport};
pub use renderer::{encode_diff_into, encode_full_into, TerminalRenderer};
