//! Integration tests for the GameCore session loop

use std::cell::RefCell;
use std::rc::Rc;

use blockfall::engine::{
    AdventureLevelConfig, EndReason, EventKind, GameCore, GameEvent, GameSetup, KeyValueStore,
    MemoryStore, Objective, ObjectiveKind, Rewards, SelectionError, StoryNodes, SAVE_KEY,
};
use blockfall::types::{BoosterKind, GameAction, GameMode, GameStateKind, TICK_MS};

fn started(mode: GameMode, seed: u32) -> GameCore {
    let mut setup = GameSetup::for_mode(mode).with_seed(seed);
    setup.countdown_ms = 0;
    let mut core = GameCore::new();
    core.reset_game(setup);
    core
}

/// Advance by whole ticks, the way a host at 60 fps would.
fn advance(core: &mut GameCore, ms: u32) {
    for _ in 0..ms / TICK_MS {
        core.update(TICK_MS);
    }
}

fn active_x(core: &GameCore) -> i8 {
    core.snapshot().active.expect("active piece").x
}

fn level(objective: Objective) -> AdventureLevelConfig {
    AdventureLevelConfig {
        id: 99,
        name: "Test Ground".to_string(),
        objective,
        gimmicks: Vec::new(),
        boss: None,
        story: StoryNodes::default(),
        rewards: Rewards { coins: 40, xp: 20 },
        start_level: 0,
    }
}

#[test]
fn test_game_lifecycle() {
    let mut core = GameCore::new();
    assert_eq!(core.state(), GameStateKind::Menu);

    core.reset_game(GameSetup::for_mode(GameMode::Marathon).with_seed(12345));
    assert_eq!(core.state(), GameStateKind::Countdown);
    assert_eq!(core.countdown_seconds(), 3);

    advance(&mut core, 1008);
    assert_eq!(core.countdown_seconds(), 2);
    assert_eq!(core.sim_time_ms(), 0, "countdown does not advance the simulation");

    advance(&mut core, 2000);
    assert_eq!(core.state(), GameStateKind::Playing);
    let snap = core.snapshot();
    assert!(snap.active.is_some());
    assert_eq!(snap.next_queue.len(), 5);
    assert_eq!(snap.seed, 12345);
}

#[test]
fn test_das_and_arr_through_update() {
    let mut core = started(GameMode::Marathon, 7);
    let x0 = active_x(&core);

    core.handle_action(GameAction::MoveRight);
    assert_eq!(active_x(&core), x0 + 1, "first press moves immediately");

    advance(&mut core, 128);
    assert_eq!(active_x(&core), x0 + 1, "DAS has not charged yet");

    advance(&mut core, 320);
    assert!(active_x(&core) > x0 + 1, "auto-repeat after DAS");

    core.release_action(GameAction::MoveRight);
    let x = active_x(&core);
    advance(&mut core, 320);
    assert_eq!(active_x(&core), x, "release stops the repeat");
}

#[test]
fn test_pause_freezes_the_simulation() {
    let mut core = started(GameMode::Marathon, 3);
    advance(&mut core, 160);
    let t = core.sim_time_ms();

    assert!(core.handle_action(GameAction::Pause));
    assert_eq!(core.state(), GameStateKind::Paused);
    advance(&mut core, 1000);
    assert_eq!(core.sim_time_ms(), t);
    assert!(!core.handle_action(GameAction::HardDrop));

    core.handle_action(GameAction::Pause);
    assert_eq!(core.state(), GameStateKind::Playing);
    advance(&mut core, 16);
    assert_eq!(core.sim_time_ms(), t + 16);
}

#[test]
fn test_center_stack_tops_out() {
    let mut core = started(GameMode::Marathon, 21);
    for _ in 0..100 {
        if core.state() != GameStateKind::Playing {
            break;
        }
        core.handle_action(GameAction::HardDrop);
        core.update(TICK_MS);
    }
    assert_eq!(core.state(), GameStateKind::GameOver);
    let result = core.last_result().expect("session result");
    assert_eq!(result.reason, EndReason::TopOut);
    assert_eq!(result.stars, 0);
    assert_eq!(result.stats.rows, 0);
}

#[test]
fn test_state_change_events() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);

    let mut core = GameCore::new();
    core.events().on(EventKind::StateChange, move |event| {
        if let GameEvent::StateChange { to, .. } = event {
            sink.borrow_mut().push(*to);
        }
    });

    let mut setup = GameSetup::for_mode(GameMode::Sprint);
    setup.countdown_ms = 1000;
    core.reset_game(setup);
    advance(&mut core, 1024);
    core.handle_action(GameAction::Pause);

    let seen = seen.borrow();
    assert_eq!(
        seen.as_slice(),
        &[GameStateKind::Countdown, GameStateKind::Playing, GameStateKind::Paused]
    );
}

#[test]
fn test_bomb_selection_flow() {
    let mut setup = GameSetup::for_mode(GameMode::Marathon).with_seed(5);
    setup.countdown_ms = 0;
    setup.boosters = vec![BoosterKind::Bomb, BoosterKind::LineClearer];
    let mut core = GameCore::new();
    core.reset_game(setup);

    core.handle_action(GameAction::HardDrop);
    core.update(TICK_MS);
    let height = core.board().board().height();

    core.handle_action(GameAction::Ability(BoosterKind::Bomb));
    assert_eq!(core.state(), GameStateKind::BombSelection);

    // Rejected targets keep the selection open.
    assert!(matches!(
        core.execute_bomb(height - 2),
        Err(SelectionError::OutOfBounds { .. })
    ));
    assert_eq!(core.state(), GameStateKind::BombSelection);
    assert_eq!(core.execute_bomb(0), Err(SelectionError::AlreadyCleared));
    assert_eq!(core.stats().boosters.count(BoosterKind::Bomb), 1);

    core.execute_bomb(height - 3).unwrap();
    assert_eq!(core.state(), GameStateKind::Playing);
    assert_eq!(core.stats().boosters.count(BoosterKind::Bomb), 0);
    assert!(core.board().board().is_empty());

    core.handle_action(GameAction::Ability(BoosterKind::LineClearer));
    assert_eq!(core.state(), GameStateKind::LineSelection);
    assert!(core.cancel_selection());
    assert_eq!(core.state(), GameStateKind::Playing);
    assert_eq!(core.stats().boosters.count(BoosterKind::LineClearer), 1);
}

#[test]
fn test_adventure_time_survival_awards_stars() {
    let mut setup = GameSetup::for_mode(GameMode::Adventure).with_seed(8);
    setup.countdown_ms = 0;
    setup.adventure = Some(level(Objective::new(ObjectiveKind::TimeSurvival, 2)));
    let mut core = GameCore::new();
    core.reset_game(setup);

    advance(&mut core, 1984);
    assert_eq!(core.state(), GameStateKind::Playing);
    advance(&mut core, 16);
    assert_eq!(core.state(), GameStateKind::Victory);

    let result = core.last_result().unwrap();
    assert_eq!(result.reason, EndReason::ObjectiveComplete);
    assert_eq!(result.stars, 3);
    assert_eq!(result.level_id, Some(99));
    assert_eq!(result.rewards, Rewards { coins: 40, xp: 20 });
}

#[test]
fn test_adventure_move_limit_fails() {
    let mut objective = Objective::new(ObjectiveKind::Moves, 8);
    objective.move_limit = Some(2);
    let mut setup = GameSetup::for_mode(GameMode::Adventure).with_seed(8);
    setup.countdown_ms = 0;
    setup.adventure = Some(level(objective));
    let mut core = GameCore::new();
    core.reset_game(setup);

    for _ in 0..2 {
        core.handle_action(GameAction::HardDrop);
        core.update(TICK_MS);
    }
    assert_eq!(core.state(), GameStateKind::GameOver);
    let result = core.last_result().unwrap();
    assert_eq!(result.reason, EndReason::ObjectiveFailed);
    assert_eq!(result.stars, 0);
    assert_eq!(result.rewards, Rewards::default());
}

#[test]
fn test_save_and_resume_paused() {
    let mut store = MemoryStore::new();
    let mut core = started(GameMode::Marathon, 31);
    for _ in 0..3 {
        core.handle_action(GameAction::HardDrop);
        advance(&mut core, 64);
    }
    assert!(core.save_game(&mut store).unwrap());

    let mut resumed = GameCore::new();
    assert!(resumed.load_game(&store));
    assert_eq!(resumed.state(), GameStateKind::Paused);
    assert_eq!(resumed.board_hash(), core.board_hash());
    assert_eq!(resumed.stats(), core.stats());
    assert_eq!(resumed.sim_time_ms(), core.sim_time_ms());

    assert!(resumed.resume());
    core.handle_action(GameAction::HardDrop);
    resumed.handle_action(GameAction::HardDrop);
    advance(&mut core, 32);
    advance(&mut resumed, 32);
    assert_eq!(resumed.board_hash(), core.board_hash());
}

#[test]
fn test_save_rules() {
    let mut store = MemoryStore::new();
    let mut core = GameCore::new();
    assert!(!core.save_game(&mut store).unwrap(), "nothing to save from the menu");
    assert!(!core.has_saved_game(&store));

    store.set(SAVE_KEY, "{\"version\": 1, \"setup\": 3}").unwrap();
    core.reset_game(GameSetup::default());
    assert!(!core.load_game(&store));
    assert_eq!(core.state(), GameStateKind::Menu);
}
