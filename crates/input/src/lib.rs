//! Input layer (engine-facing).
//!
//! Independent of any UI framework: [`KeyBindings`] resolves keyboard, gamepad
//! and touch bindings into [`crate::types::GameAction`]s, and [`InputManager`]
//! turns held actions into DAS/ARR-timed move intents.

pub mod handler;
pub mod map;

pub use blockfall_types as types;

pub use handler::{HorizontalDirection, InputConfig, InputManager};
pub use map::{should_quit, Binding, GamepadButton, KeyBindings, TouchGesture};
