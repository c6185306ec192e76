//! Typed publish/subscribe hub between the engine and its collaborators.
//!
//! Audio, particles and telemetry subscribe by [`EventKind`]; the engine emits
//! fire-and-forget and never depends on whether anyone is listening.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::adventure::Rewards;
use crate::replay::ReplayData;
use crate::types::{
    BoosterKind, Difficulty, GameMode, GameStateKind, PieceKind, TSpinKind,
};
use blockfall_core::{Achievement, GameStats};

/// Discrete sounds for the audio collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AudioCue {
    Move,
    Rotate,
    SoftDrop,
    HardDrop,
    Lock,
    Hold,
    LineClear { lines: u32 },
    Tetris,
    TSpin,
    PerfectClear,
    Combo { count: i32 },
    BackToBack,
    LevelUp,
    Garbage,
    Booster,
    CountdownTick { seconds: u32 },
    CountdownGo,
    GameOver,
    Victory,
}

/// Particle and screen effects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum VisualEffect {
    LineClear { rows: Vec<u8> },
    PerfectClear,
    Explosion { rows: Vec<u8> },
    ZoneStart,
    ZoneEnd,
    FrenzyStart,
    OverdriveStart,
    GravityFlip { flipped: bool },
    SlowTime { active: bool },
    ScreenShake,
}

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    TopOut,
    TimeUp,
    GoalReached,
    OpponentDefeated,
    ObjectiveComplete,
    ObjectiveFailed,
    OutOfPieces,
}

/// Payload of GAMEOVER and VICTORY.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionResult {
    pub mode: GameMode,
    pub difficulty: Difficulty,
    pub stats: GameStats,
    pub stars: u8,
    pub level_id: Option<u32>,
    pub rewards: Rewards,
    pub reason: EndReason,
    pub replay: ReplayData,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    StateChange {
        from: GameStateKind,
        to: GameStateKind,
    },
    GameOver(Box<SessionResult>),
    Victory(Box<SessionResult>),
    Audio(AudioCue),
    VisualEffect(VisualEffect),
    PieceLocked {
        kind: PieceKind,
        tspin: TSpinKind,
    },
    LinesCleared {
        rows: Vec<u8>,
        tspin: TSpinKind,
        perfect_clear: bool,
        combo: i32,
        b2b_chain: u32,
        score: u32,
    },
    BombSelectionEnd {
        executed: bool,
    },
    LineSelectionEnd {
        executed: bool,
    },
    WildcardSelectionEnd {
        chosen: Option<PieceKind>,
    },
    BoosterActivated(BoosterKind),
    GarbageReceived {
        rows: u8,
    },
    BossHpChanged {
        hp: u32,
        max_hp: u32,
    },
    Achievement(Achievement),
    LevelUp(u32),
    /// Internal invariant violation, reported instead of panicking.
    Diagnostic {
        message: String,
    },
}

/// Subscription key for [`GameEvent`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    StateChange,
    GameOver,
    Victory,
    Audio,
    VisualEffect,
    PieceLocked,
    LinesCleared,
    BombSelectionEnd,
    LineSelectionEnd,
    WildcardSelectionEnd,
    BoosterActivated,
    GarbageReceived,
    BossHpChanged,
    Achievement,
    LevelUp,
    Diagnostic,
}

impl GameEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            GameEvent::StateChange { .. } => EventKind::StateChange,
            GameEvent::GameOver(_) => EventKind::GameOver,
            GameEvent::Victory(_) => EventKind::Victory,
            GameEvent::Audio(_) => EventKind::Audio,
            GameEvent::VisualEffect(_) => EventKind::VisualEffect,
            GameEvent::PieceLocked { .. } => EventKind::PieceLocked,
            GameEvent::LinesCleared { .. } => EventKind::LinesCleared,
            GameEvent::BombSelectionEnd { .. } => EventKind::BombSelectionEnd,
            GameEvent::LineSelectionEnd { .. } => EventKind::LineSelectionEnd,
            GameEvent::WildcardSelectionEnd { .. } => EventKind::WildcardSelectionEnd,
            GameEvent::BoosterActivated(_) => EventKind::BoosterActivated,
            GameEvent::GarbageReceived { .. } => EventKind::GarbageReceived,
            GameEvent::BossHpChanged { .. } => EventKind::BossHpChanged,
            GameEvent::Achievement(_) => EventKind::Achievement,
            GameEvent::LevelUp(_) => EventKind::LevelUp,
            GameEvent::Diagnostic { .. } => EventKind::Diagnostic,
        }
    }
}

/// Handle returned by [`EventBus::on`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

pub type Listener = Box<dyn FnMut(&GameEvent)>;

struct Subscription {
    id: SubscriptionId,
    /// `None` receives every event
    kind: Option<EventKind>,
    listener: Listener,
}

#[derive(Default)]
pub struct EventBus {
    subscriptions: Vec<Subscription>,
    next_id: u64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to one kind of event.
    pub fn on(&mut self, kind: EventKind, listener: impl FnMut(&GameEvent) + 'static) -> SubscriptionId {
        self.subscribe(Some(kind), Box::new(listener))
    }

    /// Subscribe to every event.
    pub fn on_any(&mut self, listener: impl FnMut(&GameEvent) + 'static) -> SubscriptionId {
        self.subscribe(None, Box::new(listener))
    }

    fn subscribe(&mut self, kind: Option<EventKind>, listener: Listener) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscriptions.push(Subscription { id, kind, listener });
        id
    }

    /// Returns false if the id was not subscribed.
    pub fn off(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|s| s.id != id);
        self.subscriptions.len() != before
    }

    /// Deliver `event` to matching listeners in subscription order.
    pub fn emit(&mut self, event: GameEvent) {
        let kind = event.kind();
        for sub in self.subscriptions.iter_mut() {
            if sub.kind.map_or(true, |k| k == kind) {
                (sub.listener)(&event);
            }
        }
    }

    pub fn listener_count(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn clear(&mut self) {
        self.subscriptions.clear();
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.subscriptions.len())
            .finish()
    }
}
