//! StateManager - the top-level finite state machine.
//!
//! Requests for transitions missing from the table are ignored (they return
//! `None`), so stray input can never push the engine into an undefined state.

use serde::{Deserialize, Serialize};

use crate::types::GameStateKind;

use GameStateKind::*;

/// Allowed `from -> to` pairs.
fn allowed(from: GameStateKind, to: GameStateKind) -> bool {
    match from {
        Menu => matches!(to, Countdown | Map),
        Countdown => matches!(to, Playing | Menu),
        Playing => matches!(
            to,
            Paused | GameOver | Victory | WildcardSelection | BombSelection | LineSelection | Menu
        ),
        Paused => matches!(to, Playing | Menu),
        GameOver => matches!(to, Countdown | Map | Menu),
        Victory => matches!(to, Countdown | Story | Map | Menu),
        Map => matches!(to, BoosterSelection | Menu),
        BoosterSelection => matches!(to, Story | Countdown | Map | Menu),
        Story => matches!(to, Countdown | Map | Menu),
        WildcardSelection => matches!(to, Playing | GameOver | Menu),
        BombSelection | LineSelection => matches!(to, Playing | Menu),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateManager {
    current: GameStateKind,
    previous: GameStateKind,
    countdown_ms: u32,
}

impl StateManager {
    pub fn new() -> Self {
        Self {
            current: Menu,
            previous: Menu,
            countdown_ms: 0,
        }
    }

    pub fn current(&self) -> GameStateKind {
        self.current
    }

    pub fn previous(&self) -> GameStateKind {
        self.previous
    }

    pub fn is(&self, state: GameStateKind) -> bool {
        self.current == state
    }

    /// Only PLAYING advances gravity, lock delay and timers.
    pub fn is_simulating(&self) -> bool {
        self.current == Playing
    }

    pub fn can_transition(&self, to: GameStateKind) -> bool {
        allowed(self.current, to)
    }

    /// Move to `to` if the table allows it. Returns the `(from, to)` pair on success.
    pub fn transition_to(&mut self, to: GameStateKind) -> Option<(GameStateKind, GameStateKind)> {
        if !self.can_transition(to) {
            log::debug!("ignored transition {} -> {}", self.current.as_str(), to.as_str());
            return None;
        }
        Some(self.set(to))
    }

    /// Unconditional move, reserved for session reset and save restore.
    pub fn force(&mut self, to: GameStateKind) -> (GameStateKind, GameStateKind) {
        self.set(to)
    }

    fn set(&mut self, to: GameStateKind) -> (GameStateKind, GameStateKind) {
        let from = self.current;
        self.previous = from;
        self.current = to;
        if to != Countdown {
            self.countdown_ms = 0;
        }
        log::debug!("state {} -> {}", from.as_str(), to.as_str());
        (from, to)
    }

    pub fn start_countdown(&mut self, duration_ms: u32) {
        self.countdown_ms = duration_ms;
    }

    pub fn countdown_ms(&self) -> u32 {
        self.countdown_ms
    }

    /// Whole seconds left on the countdown, rounded up.
    pub fn countdown_seconds(&self) -> u32 {
        self.countdown_ms.div_ceil(1000)
    }

    /// Run the countdown down; true once it has elapsed.
    pub fn tick_countdown(&mut self, elapsed_ms: u32) -> bool {
        if self.current != Countdown {
            return false;
        }
        self.countdown_ms = self.countdown_ms.saturating_sub(elapsed_ms);
        self.countdown_ms == 0
    }
}

impl Default for StateManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_path() {
        let mut sm = StateManager::new();
        assert_eq!(sm.transition_to(Countdown), Some((Menu, Countdown)));
        assert_eq!(sm.transition_to(Playing), Some((Countdown, Playing)));
        assert!(sm.is_simulating());
        assert!(sm.transition_to(Paused).is_some());
        assert!(!sm.is_simulating());
        assert!(sm.transition_to(Playing).is_some());
        assert!(sm.transition_to(GameOver).is_some());
        assert_eq!(sm.previous(), Playing);
    }

    #[test]
    fn test_invalid_transitions_are_ignored() {
        let mut sm = StateManager::new();
        assert_eq!(sm.transition_to(Playing), None);
        assert_eq!(sm.transition_to(Paused), None);
        assert_eq!(sm.current(), Menu);

        sm.force(Playing);
        // Selections only return to play.
        sm.transition_to(BombSelection);
        assert_eq!(sm.transition_to(Paused), None);
        assert_eq!(sm.current(), BombSelection);
    }

    #[test]
    fn test_map_flow() {
        let mut sm = StateManager::new();
        assert!(sm.transition_to(Map).is_some());
        assert!(sm.transition_to(BoosterSelection).is_some());
        assert!(sm.transition_to(Story).is_some());
        assert!(sm.transition_to(Countdown).is_some());
    }

    #[test]
    fn test_countdown_ticks_down() {
        let mut sm = StateManager::new();
        sm.transition_to(Countdown);
        sm.start_countdown(3000);
        assert_eq!(sm.countdown_seconds(), 3);

        assert!(!sm.tick_countdown(1001));
        assert_eq!(sm.countdown_seconds(), 2);
        assert!(!sm.tick_countdown(1998));
        assert!(sm.tick_countdown(1));
    }

    #[test]
    fn test_countdown_ignored_outside_countdown_state() {
        let mut sm = StateManager::new();
        sm.start_countdown(100);
        assert!(!sm.tick_countdown(200));
    }
}
