//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the engine.
//! All types are plain data with serde derives, making them usable in any
//! context (simulation core, input, persistence, replays, hosts).
//!
//! # Board Layouts
//!
//! | Layout    | Width | Height |
//! |-----------|-------|--------|
//! | `Comfort` | 10    | 21     |
//! | `Dense`   | 20    | 50     |
//!
//! Coordinates are `(x, y)` with `y = 0` at the top row.
//!
//! # Game Timing Constants
//!
//! Timing values are in milliseconds:
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `TICK_MS` | 16 | Fixed simulation step |
//! | `BASE_DROP_MS` | 1000 | Gravity at level 0 |
//! | `SOFT_DROP_MULTIPLIER` | 10 | Soft drop is 10x faster |
//! | `SOFT_DROP_GRACE_MS` | 150 | Soft drop state timeout after the last soft drop action |
//! | `LOCK_DELAY_MS` | 450 | Time before a grounded piece locks |
//! | `LOCK_RESET_LIMIT` | 15 | Max lock timer resets per piece |
//! | `COUNTDOWN_MS` | 3000 | Countdown before play starts |
//!
//! # DAS/ARR Timing
//!
//! - `DEFAULT_DAS_MS`: 150ms - time before auto-repeat starts
//! - `DEFAULT_ARR_MS`: 50ms - interval between auto-repeats (0 = charge to wall)
//! - `SOFT_DROP_ARR_MS`: 50ms - soft drop repeat interval
//!
//! # Drop Intervals by Level
//!
//! | Level | Interval |
//! |-------|----------|
//! | 0 | 1000ms |
//! | 1 | 800ms |
//! | 2 | 650ms |
//! | 3 | 500ms |
//! | 4 | 400ms |
//! | 5 | 320ms |
//! | 6 | 250ms |
//! | 7 | 200ms |
//! | 8 | 160ms |
//! | 9+ | 120ms floor |
//!
//! # Examples
//!
//! ```
//! use blockfall_types::{BoardLayout, GameAction, PieceKind, Rotation};
//!
//! let piece = PieceKind::from_str("t").unwrap();
//! assert_eq!(piece, PieceKind::T);
//!
//! assert_eq!(Rotation::North.rotate_cw(), Rotation::East);
//!
//! let action = GameAction::from_str("moveLeft").unwrap();
//! assert_eq!(action, GameAction::MoveLeft);
//!
//! assert_eq!(BoardLayout::Comfort.width(), 10);
//! assert_eq!(BoardLayout::Dense.height(), 50);
//! ```

use serde::{Deserialize, Serialize};

/// Fixed timestep interval in milliseconds (16ms ≈ 60 FPS)
pub const TICK_MS: u32 = 16;

/// Base gravity interval at level 0 (1000ms = 1 second per row)
pub const BASE_DROP_MS: u32 = 1000;

/// Soft drop speed multiplier (10x normal speed)
pub const SOFT_DROP_MULTIPLIER: u32 = 10;

/// Soft drop state timeout after the most recent soft drop action
pub const SOFT_DROP_GRACE_MS: u32 = 150;

/// Lock delay when piece is grounded (450ms)
pub const LOCK_DELAY_MS: u32 = 450;

/// Maximum number of lock timer resets per piece (15)
pub const LOCK_RESET_LIMIT: u8 = 15;

/// DAS (Delayed Auto Shift) delay in milliseconds
pub const DEFAULT_DAS_MS: u32 = 150;

/// ARR (Auto Repeat Rate) in milliseconds
pub const DEFAULT_ARR_MS: u32 = 50;

/// Soft drop DAS in milliseconds
pub const SOFT_DROP_DAS_MS: u32 = 0;

/// Soft drop ARR in milliseconds
pub const SOFT_DROP_ARR_MS: u32 = 50;

/// Drop intervals by level (milliseconds per row)
///
/// Index 0 = Level 0, Index 8 = Level 8
pub const DROP_INTERVALS: [u32; 9] = [1000, 800, 650, 500, 400, 320, 250, 200, 160];

/// Drop interval floor for levels past the table (120ms)
pub const DROP_INTERVAL_FLOOR_MS: u32 = 120;

/// Absolute minimum drop interval after speed/difficulty scaling
pub const DROP_INTERVAL_MIN_MS: u32 = 16;

/// Countdown between reset and play
pub const COUNTDOWN_MS: u32 = 3000;

/// Number of upcoming pieces exposed to the render boundary
pub const PREVIEW_LEN: usize = 5;

/// Largest number of minos in any supported shape
pub const MAX_MINOS: usize = 5;

/// Lines per level in level-progression modes
pub const LINES_PER_LEVEL: u32 = 10;

/// Rows cleared by one bomb booster
pub const BOMB_ROWS: u8 = 3;

/// Slow-time booster duration
pub const SLOW_TIME_MS: u32 = 10_000;

/// Flipped-gravity booster duration
pub const FLIPPED_GRAVITY_MS: u32 = 15_000;

/// Default cadence at which queued garbage is inserted
pub const GARBAGE_INTERVAL_MS: u32 = 1_500;

/// Focus gauge capacity; reaching it triggers Zone
pub const FOCUS_GAUGE_MAX: u32 = 100;

/// Focus gained per cleared line
pub const FOCUS_PER_LINE: u32 = 8;

/// Extra focus for a four-line clear
pub const FOCUS_TETRIS_BONUS: u32 = 10;

/// Extra focus for a T-spin clear
pub const FOCUS_TSPIN_BONUS: u32 = 6;

/// Zone duration
pub const ZONE_MS: u32 = 10_000;

/// Combo index that triggers Frenzy
pub const FRENZY_COMBO_THRESHOLD: i32 = 4;

/// Frenzy duration
pub const FRENZY_MS: u32 = 8_000;

/// Back-to-back chain that triggers Overdrive
pub const OVERDRIVE_B2B_THRESHOLD: u32 = 3;

/// Overdrive duration
pub const OVERDRIVE_MS: u32 = 12_000;

/// Score multiplier bonuses (percent points, additive)
pub const ZONE_BONUS_PERCENT: u32 = 100;
pub const FRENZY_BONUS_PERCENT: u32 = 50;
pub const OVERDRIVE_BONUS_PERCENT: u32 = 50;

/// Piece kinds
///
/// The seven standard tetrominoes plus the unlockable extended shapes:
/// - **I**: Cyan, horizontal bar
/// - **O**: Yellow, 2x2 square
/// - **T**: Magenta, T-shaped
/// - **S**: Green, S-shaped
/// - **Z**: Red, Z-shaped (mirror of S)
/// - **J**: Blue, J-shaped
/// - **L**: Orange, L-shaped (mirror of J)
/// - **Mono**: single cell, never rotates
/// - **V**: three-cell corner
/// - **Plus**: five-cell cross
/// - **U**: five-cell cup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceKind {
    I,
    O,
    T,
    S,
    Z,
    J,
    L,
    Mono,
    V,
    Plus,
    U,
}

impl PieceKind {
    /// The standard 7-bag set.
    pub const STANDARD: [PieceKind; 7] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::T,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::J,
        PieceKind::L,
    ];

    /// Unlockable shapes outside the standard set.
    pub const EXTENDED: [PieceKind; 4] = [PieceKind::Mono, PieceKind::V, PieceKind::Plus, PieceKind::U];

    /// Parse piece kind from string (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use blockfall_types::PieceKind;
    ///
    /// assert_eq!(PieceKind::from_str("i"), Some(PieceKind::I));
    /// assert_eq!(PieceKind::from_str("Plus"), Some(PieceKind::Plus));
    /// assert_eq!(PieceKind::from_str("unknown"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "i" => Some(PieceKind::I),
            "o" => Some(PieceKind::O),
            "t" => Some(PieceKind::T),
            "s" => Some(PieceKind::S),
            "z" => Some(PieceKind::Z),
            "j" => Some(PieceKind::J),
            "l" => Some(PieceKind::L),
            "mono" => Some(PieceKind::Mono),
            "v" => Some(PieceKind::V),
            "plus" => Some(PieceKind::Plus),
            "u" => Some(PieceKind::U),
            _ => None,
        }
    }

    /// Convert to lowercase string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            PieceKind::I => "i",
            PieceKind::O => "o",
            PieceKind::T => "t",
            PieceKind::S => "s",
            PieceKind::Z => "z",
            PieceKind::J => "j",
            PieceKind::L => "l",
            PieceKind::Mono => "mono",
            PieceKind::V => "v",
            PieceKind::Plus => "plus",
            PieceKind::U => "u",
        }
    }

    /// Stable non-zero color code used by the snapshot grid.
    pub fn color_code(&self) -> u8 {
        match self {
            PieceKind::I => 1,
            PieceKind::O => 2,
            PieceKind::T => 3,
            PieceKind::S => 4,
            PieceKind::Z => 5,
            PieceKind::J => 6,
            PieceKind::L => 7,
            PieceKind::Mono => 8,
            PieceKind::V => 9,
            PieceKind::Plus => 10,
            PieceKind::U => 11,
        }
    }
}

/// Rotation states following the Super Rotation System (SRS)
///
/// - **North**: Spawn orientation (0° rotation)
/// - **East**: Rotated 90° clockwise
/// - **South**: Rotated 180°
/// - **West**: Rotated 90° counter-clockwise (270° clockwise)
///
/// The rotation cycle goes: North → East → South → West → North
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rotation {
    North,
    East,
    South,
    West,
}

impl Rotation {
    /// Rotate clockwise (90°)
    ///
    /// # Examples
    ///
    /// ```
    /// use blockfall_types::Rotation;
    ///
    /// assert_eq!(Rotation::North.rotate_cw(), Rotation::East);
    /// assert_eq!(Rotation::West.rotate_cw(), Rotation::North);
    /// ```
    pub fn rotate_cw(&self) -> Self {
        match self {
            Rotation::North => Rotation::East,
            Rotation::East => Rotation::South,
            Rotation::South => Rotation::West,
            Rotation::West => Rotation::North,
        }
    }

    /// Rotate counter-clockwise (-90° or 270°)
    ///
    /// # Examples
    ///
    /// ```
    /// use blockfall_types::Rotation;
    ///
    /// assert_eq!(Rotation::North.rotate_ccw(), Rotation::West);
    /// assert_eq!(Rotation::East.rotate_ccw(), Rotation::North);
    /// ```
    pub fn rotate_ccw(&self) -> Self {
        match self {
            Rotation::North => Rotation::West,
            Rotation::West => Rotation::South,
            Rotation::South => Rotation::East,
            Rotation::East => Rotation::North,
        }
    }

    /// Rotation state as 0-3 (North = 0, clockwise order)
    pub fn index(&self) -> u8 {
        match self {
            Rotation::North => 0,
            Rotation::East => 1,
            Rotation::South => 2,
            Rotation::West => 3,
        }
    }

    /// Parse rotation from string
    ///
    /// Accepts full names or single letters (case-insensitive):
    /// "north" | "n", "east" | "e", "south" | "s", "west" | "w"
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "north" | "n" => Some(Rotation::North),
            "east" | "e" => Some(Rotation::East),
            "south" | "s" => Some(Rotation::South),
            "west" | "w" => Some(Rotation::West),
            _ => None,
        }
    }

    /// Convert to lowercase string
    pub fn as_str(&self) -> &'static str {
        match self {
            Rotation::North => "north",
            Rotation::East => "east",
            Rotation::South => "south",
            Rotation::West => "west",
        }
    }
}

/// Power-ups carried into a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BoosterKind {
    /// Clears `BOMB_ROWS` contiguous rows chosen by the player
    Bomb,
    /// Clears one row chosen by the player
    LineClearer,
    /// Halves gravity for `SLOW_TIME_MS`
    SlowTime,
    /// Inverts gravity for `FLIPPED_GRAVITY_MS`
    FlippedGravity,
    /// Replaces the active piece with a chosen shape
    PieceSwap,
}

impl BoosterKind {
    pub const ALL: [BoosterKind; 5] = [
        BoosterKind::Bomb,
        BoosterKind::LineClearer,
        BoosterKind::SlowTime,
        BoosterKind::FlippedGravity,
        BoosterKind::PieceSwap,
    ];

    /// Inventory slot index.
    pub fn index(&self) -> usize {
        match self {
            BoosterKind::Bomb => 0,
            BoosterKind::LineClearer => 1,
            BoosterKind::SlowTime => 2,
            BoosterKind::FlippedGravity => 3,
            BoosterKind::PieceSwap => 4,
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "bomb" => Some(BoosterKind::Bomb),
            "lineclearer" | "line" => Some(BoosterKind::LineClearer),
            "slowtime" | "slow" => Some(BoosterKind::SlowTime),
            "flippedgravity" | "flip" => Some(BoosterKind::FlippedGravity),
            "pieceswap" | "swap" => Some(BoosterKind::PieceSwap),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BoosterKind::Bomb => "bomb",
            BoosterKind::LineClearer => "lineClearer",
            BoosterKind::SlowTime => "slowTime",
            BoosterKind::FlippedGravity => "flippedGravity",
            BoosterKind::PieceSwap => "pieceSwap",
        }
    }
}

/// Game actions that can be applied to modify game state
///
/// These actions are produced by the input manager, replays, and hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameAction {
    /// Move piece one cell left
    MoveLeft,
    /// Move piece one cell right
    MoveRight,
    /// Drop piece one cell (with soft drop scoring) and engage soft-drop gravity
    SoftDrop,
    /// Instantly drop piece to lowest valid position and lock it
    HardDrop,
    /// Rotate piece 90° clockwise
    RotateCw,
    /// Rotate piece 90° counter-clockwise
    RotateCcw,
    /// Hold current piece (if available)
    Hold,
    /// Toggle pause state
    Pause,
    /// Restart the session with the same setup
    Restart,
    /// Use the booster in the given ability slot
    Ability(BoosterKind),
}

impl GameAction {
    /// Parse action from string
    ///
    /// # Examples
    ///
    /// ```
    /// use blockfall_types::{BoosterKind, GameAction};
    ///
    /// assert_eq!(GameAction::from_str("moveLeft"), Some(GameAction::MoveLeft));
    /// assert_eq!(GameAction::from_str("hardDrop"), Some(GameAction::HardDrop));
    /// assert_eq!(
    ///     GameAction::from_str("abilityBomb"),
    ///     Some(GameAction::Ability(BoosterKind::Bomb))
    /// );
    /// assert_eq!(GameAction::from_str("unknown"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        let lower = s.to_lowercase();
        if let Some(rest) = lower.strip_prefix("ability") {
            return BoosterKind::from_str(rest).map(GameAction::Ability);
        }
        match lower.as_str() {
            "moveleft" => Some(GameAction::MoveLeft),
            "moveright" => Some(GameAction::MoveRight),
            "softdrop" => Some(GameAction::SoftDrop),
            "harddrop" => Some(GameAction::HardDrop),
            "rotatecw" => Some(GameAction::RotateCw),
            "rotateccw" => Some(GameAction::RotateCcw),
            "hold" => Some(GameAction::Hold),
            "pause" => Some(GameAction::Pause),
            "restart" => Some(GameAction::Restart),
            _ => None,
        }
    }

    /// Convert to camelCase string
    pub fn as_str(&self) -> &'static str {
        match self {
            GameAction::MoveLeft => "moveLeft",
            GameAction::MoveRight => "moveRight",
            GameAction::SoftDrop => "softDrop",
            GameAction::HardDrop => "hardDrop",
            GameAction::RotateCw => "rotateCw",
            GameAction::RotateCcw => "rotateCcw",
            GameAction::Hold => "hold",
            GameAction::Pause => "pause",
            GameAction::Restart => "restart",
            GameAction::Ability(BoosterKind::Bomb) => "abilityBomb",
            GameAction::Ability(BoosterKind::LineClearer) => "abilityLineClearer",
            GameAction::Ability(BoosterKind::SlowTime) => "abilitySlowTime",
            GameAction::Ability(BoosterKind::FlippedGravity) => "abilityFlippedGravity",
            GameAction::Ability(BoosterKind::PieceSwap) => "abilityPieceSwap",
        }
    }

    /// Actions that move or rotate the active piece.
    pub fn is_piece_action(&self) -> bool {
        matches!(
            self,
            GameAction::MoveLeft
                | GameAction::MoveRight
                | GameAction::SoftDrop
                | GameAction::HardDrop
                | GameAction::RotateCw
                | GameAction::RotateCcw
                | GameAction::Hold
        )
    }
}

/// T-Spin detection result
///
/// T-Spins are detected based on corner occupancy around the T piece.
/// - **None**: Not a T-spin
/// - **Mini**: 3+ corners filled but the two front corners are not both filled
/// - **Full**: 3+ corners filled and both front corners filled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TSpinKind {
    #[default]
    None,
    Mini,
    Full,
}

impl TSpinKind {
    /// Convert to optional string representation
    pub fn as_str(&self) -> Option<&'static str> {
        match self {
            TSpinKind::None => None,
            TSpinKind::Mini => Some("mini"),
            TSpinKind::Full => Some("full"),
        }
    }
}

/// Occupant of a non-empty board cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Block {
    /// Locked piece, colored by its kind
    Piece(PieceKind),
    /// Garbage row filler
    Garbage,
    /// Collectible gem modifier
    Gem,
    /// Collectible bomb modifier
    Bomb,
}

impl Block {
    /// Grid code for snapshots (0 is reserved for empty).
    pub fn code(&self) -> u8 {
        match self {
            Block::Piece(kind) => kind.color_code(),
            Block::Garbage => 20,
            Block::Gem => 21,
            Block::Bomb => 22,
        }
    }
}

/// A cell on the game board
///
/// - `None`: Empty cell
/// - `Some(Block)`: Cell holding exactly one occupant
pub type Cell = Option<Block>;

/// Board size presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BoardLayout {
    /// 10 × 21
    #[default]
    Comfort,
    /// 20 × 50
    Dense,
}

impl BoardLayout {
    pub fn width(&self) -> u8 {
        match self {
            BoardLayout::Comfort => 10,
            BoardLayout::Dense => 20,
        }
    }

    pub fn height(&self) -> u8 {
        match self {
            BoardLayout::Comfort => 21,
            BoardLayout::Dense => 50,
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "comfort" => Some(BoardLayout::Comfort),
            "dense" => Some(BoardLayout::Dense),
            _ => None,
        }
    }
}

/// Game modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GameMode {
    #[default]
    Marathon,
    Sprint,
    Blitz,
    Battle,
    Adventure,
    Zen,
    Puzzle,
    Daily,
    TimeAttack,
}

impl GameMode {
    pub const ALL: [GameMode; 9] = [
        GameMode::Marathon,
        GameMode::Sprint,
        GameMode::Blitz,
        GameMode::Battle,
        GameMode::Adventure,
        GameMode::Zen,
        GameMode::Puzzle,
        GameMode::Daily,
        GameMode::TimeAttack,
    ];

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "marathon" => Some(GameMode::Marathon),
            "sprint" => Some(GameMode::Sprint),
            "blitz" => Some(GameMode::Blitz),
            "battle" => Some(GameMode::Battle),
            "adventure" => Some(GameMode::Adventure),
            "zen" => Some(GameMode::Zen),
            "puzzle" => Some(GameMode::Puzzle),
            "daily" => Some(GameMode::Daily),
            "timeattack" | "time_attack" => Some(GameMode::TimeAttack),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::Marathon => "marathon",
            GameMode::Sprint => "sprint",
            GameMode::Blitz => "blitz",
            GameMode::Battle => "battle",
            GameMode::Adventure => "adventure",
            GameMode::Zen => "zen",
            GameMode::Puzzle => "puzzle",
            GameMode::Daily => "daily",
            GameMode::TimeAttack => "timeattack",
        }
    }
}

/// Difficulty presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
    Expert,
}

impl Difficulty {
    /// Gravity interval scale in percent (higher is slower).
    pub fn gravity_percent(&self) -> u32 {
        match self {
            Difficulty::Easy => 150,
            Difficulty::Normal => 100,
            Difficulty::Hard => 75,
            Difficulty::Expert => 50,
        }
    }

    /// Lock resets allowed per piece.
    pub fn lock_reset_limit(&self) -> u8 {
        match self {
            Difficulty::Easy | Difficulty::Normal => LOCK_RESET_LIMIT,
            Difficulty::Hard => 10,
            Difficulty::Expert => 8,
        }
    }

    /// Opponent/boss attack interval scale in percent (higher is slower).
    pub fn attack_interval_percent(&self) -> u32 {
        match self {
            Difficulty::Easy => 150,
            Difficulty::Normal => 100,
            Difficulty::Hard => 80,
            Difficulty::Expert => 60,
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "normal" => Some(Difficulty::Normal),
            "hard" => Some(Difficulty::Hard),
            "expert" => Some(Difficulty::Expert),
            _ => None,
        }
    }
}

/// Top-level engine state. Exactly one is current at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GameStateKind {
    #[default]
    Menu,
    Countdown,
    Playing,
    Paused,
    GameOver,
    Victory,
    Map,
    Story,
    BoosterSelection,
    WildcardSelection,
    BombSelection,
    LineSelection,
}

impl GameStateKind {
    /// States that suspend the simulation while awaiting a player choice mid-game.
    pub fn is_selection(&self) -> bool {
        matches!(
            self,
            GameStateKind::WildcardSelection | GameStateKind::BombSelection | GameStateKind::LineSelection
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GameStateKind::Menu => "MENU",
            GameStateKind::Countdown => "COUNTDOWN",
            GameStateKind::Playing => "PLAYING",
            GameStateKind::Paused => "PAUSED",
            GameStateKind::GameOver => "GAMEOVER",
            GameStateKind::Victory => "VICTORY",
            GameStateKind::Map => "MAP",
            GameStateKind::Story => "STORY",
            GameStateKind::BoosterSelection => "BOOSTER_SELECTION",
            GameStateKind::WildcardSelection => "WILDCARD_SELECTION",
            GameStateKind::BombSelection => "BOMB_SELECTION",
            GameStateKind::LineSelection => "LINE_SELECTION",
        }
    }
}

/// Line clear scoring table (Classic Nintendo scoring)
///
/// Base points for clearing N lines at level 0:
/// - 0 lines: 0 points
/// - 1 line: 40 points
/// - 2 lines: 100 points
/// - 3 lines: 300 points
/// - 4 lines: 1200 points (Tetris!)
///
/// Points are multiplied by (level + 1).
pub const LINE_SCORES: [u32; 5] = [0, 40, 100, 300, 1200];

/// Perfect clear bonus by lines cleared, multiplied by (level + 1)
pub const PERFECT_CLEAR_SCORES: [u32; 5] = [0, 800, 1200, 1800, 2000];

/// Extra perfect clear bonus when the clear is also back-to-back
pub const PERFECT_CLEAR_B2B_BONUS: u32 = 1200;

/// Combo scoring base value (50 points per combo step)
pub const COMBO_BASE: u32 = 50;

/// Back-to-back bonus numerator (3/2 = 1.5x; the extra half is the bonus)
pub const B2B_NUMERATOR: u32 = 3;

/// Back-to-back bonus denominator
pub const B2B_DENOMINATOR: u32 = 2;
