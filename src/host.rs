//! Terminal host glue.
//!
//! Keys are routed by engine state: gameplay keys go through the
//! [`KeyBindings`] table, menu-like states (map, story, selections) get their
//! own small key sets. [`HostSession`] owns the cursor state those screens
//! need and applies [`HostCommand`]s to a [`GameCore`].

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};

use crate::engine::{campaign, AdventureLevelConfig, GameCore, GameSetup, HostConfig};
use crate::input::{should_quit, KeyBindings};
use crate::term::Hud;
use crate::types::{BoosterKind, GameAction, GameMode, GameStateKind, PieceKind, BOMB_ROWS};

/// What a key means in the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostCommand {
    Quit,
    Press(GameAction),
    Release(GameAction),
    /// Start a fresh session from the host configuration
    Start,
    OpenMap,
    /// Move the map or row cursor
    Cursor(i8),
    Confirm,
    Back,
    ToggleBooster(BoosterKind),
    Wildcard(PieceKind),
}

pub struct HostSession {
    bindings: KeyBindings,
    levels: Vec<AdventureLevelConfig>,
    template: GameSetup,
    /// Index into `levels`
    map_cursor: usize,
    picks: Vec<BoosterKind>,
    selection_row: u8,
    last_state: GameStateKind,
    /// Terminals without release reporting get an immediate release after each press
    synthesize_release: bool,
}

impl HostSession {
    pub fn new(config: &HostConfig, seed: u32, day: u32, synthesize_release: bool) -> Self {
        let mut template = GameSetup::for_mode(config.mode).with_seed(config.seed.unwrap_or(seed));
        template.difficulty = config.difficulty;
        template.layout = config.layout;
        if config.mode == GameMode::Daily {
            template.daily_day = Some(day);
        }

        Self {
            bindings: KeyBindings::default(),
            levels: campaign::campaign(),
            template,
            map_cursor: 0,
            picks: Vec::new(),
            selection_row: 0,
            last_state: GameStateKind::Menu,
            synthesize_release,
        }
    }

    pub fn setup(&self) -> &GameSetup {
        &self.template
    }

    pub fn picks(&self) -> &[BoosterKind] {
        &self.picks
    }

    pub fn selection_row(&self) -> u8 {
        self.selection_row
    }

    /// Resolve a key event against the engine state.
    pub fn route(&self, state: GameStateKind, key: KeyEvent) -> Option<HostCommand> {
        if should_quit(key) {
            return Some(HostCommand::Quit);
        }
        if key.kind == KeyEventKind::Release {
            return self.bindings.handle_key_event(key).map(HostCommand::Release);
        }

        use GameStateKind::*;
        use HostCommand::*;
        let command = match (state, key.code) {
            (Menu, KeyCode::Enter) => Start,
            (Menu, KeyCode::Char('m')) => OpenMap,
            (Menu, _) => return None,

            (Map | BombSelection | LineSelection, KeyCode::Up) => Cursor(-1),
            (Map | BombSelection | LineSelection, KeyCode::Down) => Cursor(1),
            (BoosterSelection, KeyCode::Char(c)) => {
                let slot = c.to_digit(10)? as usize;
                ToggleBooster(*BoosterKind::ALL.get(slot.checked_sub(1)?)?)
            }
            (WildcardSelection, KeyCode::Char(c)) => Wildcard(PieceKind::from_str(&c.to_string())?),
            (Story, KeyCode::Char(' ')) => Confirm,

            (Paused, KeyCode::Backspace) => Back,
            (GameOver | Victory, KeyCode::Char('m')) => OpenMap,
            (_, KeyCode::Enter) if state != Playing && state != Paused && state != Countdown => Confirm,
            (_, KeyCode::Esc) if !matches!(state, Playing | Paused | Countdown) => Back,

            _ => Press(self.bindings.handle_key_event(key)?),
        };
        Some(command)
    }

    /// Apply a command. Returns false when the host should exit.
    pub fn apply(&mut self, core: &mut GameCore, command: HostCommand) -> bool {
        let state = core.state();
        match command {
            HostCommand::Quit => return false,
            HostCommand::Press(action) => {
                core.handle_action(action);
                if self.synthesize_release {
                    core.release_action(action);
                }
            }
            HostCommand::Release(action) => core.release_action(action),
            HostCommand::Start => core.reset_game(self.template.clone()),
            HostCommand::OpenMap => {
                core.open_map();
            }
            HostCommand::Cursor(delta) => self.move_cursor(core, delta),
            HostCommand::Confirm => self.confirm(core, state),
            HostCommand::Back => {
                match state {
                    GameStateKind::BoosterSelection => core.open_map(),
                    s if s.is_selection() => core.cancel_selection(),
                    _ => core.return_to_menu(),
                };
            }
            HostCommand::ToggleBooster(kind) => {
                if let Some(i) = self.picks.iter().position(|&k| k == kind) {
                    self.picks.remove(i);
                } else {
                    self.picks.push(kind);
                }
            }
            HostCommand::Wildcard(kind) => {
                core.choose_wildcard_piece(kind);
            }
        }
        true
    }

    fn confirm(&mut self, core: &mut GameCore, state: GameStateKind) {
        match state {
            GameStateKind::Map => {
                if let Some(level) = self.levels.get(self.map_cursor) {
                    self.picks.clear();
                    core.select_level(level.id);
                }
            }
            GameStateKind::BoosterSelection => {
                core.confirm_boosters(self.picks.clone());
            }
            GameStateKind::Story => {
                core.advance_story();
            }
            GameStateKind::BombSelection => {
                if let Err(e) = core.execute_bomb(self.selection_row) {
                    log::info!("bomb not placed: {}", e);
                }
            }
            GameStateKind::LineSelection => {
                if let Err(e) = core.execute_line_clear(self.selection_row) {
                    log::info!("row not cleared: {}", e);
                }
            }
            GameStateKind::Victory if core.setup().adventure.is_some() => {
                if !core.show_outro() {
                    core.open_map();
                }
            }
            GameStateKind::GameOver if core.setup().adventure.is_some() => {
                core.reset_game(core.setup().clone());
            }
            GameStateKind::GameOver | GameStateKind::Victory => core.reset_game(self.template.clone()),
            _ => {}
        }
    }

    fn move_cursor(&mut self, core: &GameCore, delta: i8) {
        let height = core.board().board().height();
        match core.state() {
            GameStateKind::Map => {
                let last = self.levels.len().saturating_sub(1) as i64;
                self.map_cursor = (self.map_cursor as i64 + delta as i64).clamp(0, last) as usize;
            }
            GameStateKind::BombSelection => {
                let last = height.saturating_sub(BOMB_ROWS) as i16;
                self.selection_row = (self.selection_row as i16 + delta as i16).clamp(0, last) as u8;
            }
            GameStateKind::LineSelection => {
                let last = height.saturating_sub(1) as i16;
                self.selection_row = (self.selection_row as i16 + delta as i16).clamp(0, last) as u8;
            }
            _ => {}
        }
    }

    /// Track state changes after each frame; row pickers start at the floor.
    pub fn observe(&mut self, core: &GameCore) {
        let state = core.state();
        if state == self.last_state {
            return;
        }
        let height = core.board().board().height();
        match state {
            GameStateKind::BombSelection => self.selection_row = height.saturating_sub(BOMB_ROWS),
            GameStateKind::LineSelection => self.selection_row = height.saturating_sub(1),
            _ => {}
        }
        log::debug!("host saw {} -> {}", self.last_state.as_str(), state.as_str());
        self.last_state = state;
    }

    pub fn hud<'a>(&'a self, core: &'a GameCore) -> Hud<'a> {
        let state = core.state();
        let title = match state {
            GameStateKind::Map => self.levels.get(self.map_cursor).map(|l| l.name.as_str()),
            GameStateKind::BoosterSelection => core.selected_level().map(|l| l.name.as_str()),
            _ => core.setup().adventure.as_ref().map(|l| l.name.as_str()),
        };
        Hud {
            countdown_seconds: core.countdown_seconds(),
            story_line: core.story_line(),
            selection_rows: match state {
                GameStateKind::BombSelection => Some((self.selection_row, BOMB_ROWS)),
                GameStateKind::LineSelection => Some((self.selection_row, 1)),
                _ => None,
            },
            title,
        }
    }
}
