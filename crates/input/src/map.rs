//! Action bindings over keyboard, gamepad and touch sources.
//!
//! Each [`GameAction`] owns a list of alternate [`Binding`]s. A binding maps to
//! at most one action: binding it again moves it.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::types::{BoosterKind, GameAction};

/// Buttons of a standard-layout gamepad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GamepadButton {
    South,
    East,
    West,
    North,
    LeftShoulder,
    RightShoulder,
    Select,
    Start,
    DPadUp,
    DPadDown,
    DPadLeft,
    DPadRight,
}

/// Touch gestures recognised by touch hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TouchGesture {
    SwipeLeft,
    SwipeRight,
    SwipeDown,
    FlickDown,
    Tap,
    TwoFingerTap,
    SwipeUp,
    LongPress,
}

/// One physical input that can trigger an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Binding {
    Key(KeyCode),
    Gamepad(GamepadButton),
    Touch(TouchGesture),
}

impl Binding {
    /// Letter keys match regardless of case.
    fn normalized(self) -> Self {
        match self {
            Binding::Key(KeyCode::Char(c)) => Binding::Key(KeyCode::Char(c.to_ascii_lowercase())),
            other => other,
        }
    }
}

/// Action to binding table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBindings {
    entries: Vec<(GameAction, Binding)>,
}

impl KeyBindings {
    /// A table with no bindings at all.
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Bind `binding` to `action`, removing it from any other action.
    pub fn bind(&mut self, action: GameAction, binding: Binding) {
        let binding = binding.normalized();
        self.entries.retain(|&(_, b)| b != binding);
        self.entries.push((action, binding));
    }

    pub fn unbind(&mut self, action: GameAction, binding: Binding) {
        let binding = binding.normalized();
        self.entries.retain(|&(a, b)| !(a == action && b == binding));
    }

    /// Remove every binding of `action`.
    pub fn clear_action(&mut self, action: GameAction) {
        self.entries.retain(|&(a, _)| a != action);
    }

    pub fn bindings(&self, action: GameAction) -> impl Iterator<Item = Binding> + '_ {
        self.entries
            .iter()
            .filter(move |&&(a, _)| a == action)
            .map(|&(_, b)| b)
    }

    pub fn action_for(&self, binding: Binding) -> Option<GameAction> {
        let binding = binding.normalized();
        self.entries
            .iter()
            .find(|&&(_, b)| b == binding)
            .map(|&(a, _)| a)
    }

    /// Map a terminal key event to a game action.
    pub fn handle_key_event(&self, key: KeyEvent) -> Option<GameAction> {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return None;
        }
        self.action_for(Binding::Key(key.code))
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        use Binding::{Gamepad, Key, Touch};
        use GamepadButton as Pad;

        let mut map = Self::empty();
        let table: [(GameAction, &[Binding]); 9] = [
            (
                GameAction::MoveLeft,
                &[
                    Key(KeyCode::Left),
                    Key(KeyCode::Char('h')),
                    Key(KeyCode::Char('a')),
                    Gamepad(Pad::DPadLeft),
                    Touch(TouchGesture::SwipeLeft),
                ],
            ),
            (
                GameAction::MoveRight,
                &[
                    Key(KeyCode::Right),
                    Key(KeyCode::Char('l')),
                    Key(KeyCode::Char('d')),
                    Gamepad(Pad::DPadRight),
                    Touch(TouchGesture::SwipeRight),
                ],
            ),
            (
                GameAction::SoftDrop,
                &[
                    Key(KeyCode::Down),
                    Key(KeyCode::Char('j')),
                    Key(KeyCode::Char('s')),
                    Gamepad(Pad::DPadDown),
                    Touch(TouchGesture::SwipeDown),
                ],
            ),
            (
                GameAction::HardDrop,
                &[
                    Key(KeyCode::Char(' ')),
                    Gamepad(Pad::DPadUp),
                    Touch(TouchGesture::FlickDown),
                ],
            ),
            (
                GameAction::RotateCw,
                &[
                    Key(KeyCode::Up),
                    Key(KeyCode::Char('k')),
                    Key(KeyCode::Char('w')),
                    Key(KeyCode::Char('x')),
                    Gamepad(Pad::East),
                    Touch(TouchGesture::Tap),
                ],
            ),
            (
                GameAction::RotateCcw,
                &[
                    Key(KeyCode::Char('z')),
                    Key(KeyCode::Char('y')),
                    Gamepad(Pad::South),
                    Touch(TouchGesture::TwoFingerTap),
                ],
            ),
            (
                GameAction::Hold,
                &[
                    Key(KeyCode::Char('c')),
                    Gamepad(Pad::LeftShoulder),
                    Gamepad(Pad::RightShoulder),
                    Touch(TouchGesture::SwipeUp),
                ],
            ),
            (
                GameAction::Pause,
                &[
                    Key(KeyCode::Char('p')),
                    Key(KeyCode::Esc),
                    Gamepad(Pad::Start),
                    Touch(TouchGesture::LongPress),
                ],
            ),
            (
                GameAction::Restart,
                &[Key(KeyCode::Char('r')), Gamepad(Pad::Select)],
            ),
        ];
        for (action, bindings) in table {
            for &binding in bindings {
                map.bind(action, binding);
            }
        }

        // Ability slots on the digit row.
        for (slot, kind) in BoosterKind::ALL.into_iter().enumerate() {
            if let Some(digit) = char::from_digit(slot as u32 + 1, 10) {
                map.bind(GameAction::Ability(kind), Key(KeyCode::Char(digit)));
            }
        }
        map
    }
}

/// Check if key should quit the game.
pub fn should_quit(key: KeyEvent) -> bool {
    matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q'))
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}
