use blockfall::core::GameSnapshot;
use blockfall::engine::{GameCore, GameSetup};
use blockfall::term::{AnchorY, FrameBuffer, GameView, Hud, TerminalRenderer, Viewport};
use blockfall::types::{GameAction, GameMode};

fn playing() -> GameCore {
    let mut setup = GameSetup::for_mode(GameMode::Marathon).with_seed(5);
    setup.countdown_ms = 0;
    let mut core = GameCore::new();
    core.reset_game(setup);
    core
}

#[test]
fn term_view_frames_the_core_board() {
    let core = playing();
    let view = GameView::default().with_anchor_y(AnchorY::Top);

    // 10 columns at two characters each, 21 rows, plus the border
    let fb = view.render(&core.snapshot(), &Hud::default(), Viewport::new(22, 23));
    assert_eq!(fb.get(0, 0).unwrap().ch, '┌');
    assert_eq!(fb.get(21, 0).unwrap().ch, '┐');
    assert_eq!(fb.get(0, 22).unwrap().ch, '└');
    assert_eq!(fb.get(21, 22).unwrap().ch, '┘');

    // The freshly spawned piece is drawn near the top.
    let top: String = (1..4).map(|y| fb.row_text(y)).collect();
    assert!(top.contains("██"));
}

#[test]
fn term_view_shows_locked_piece_and_stats() {
    let mut core = playing();
    core.handle_action(GameAction::HardDrop);
    core.update(16);
    assert_eq!(core.stats().pieces, 1);

    let fb = GameView::default()
        .with_anchor_y(AnchorY::Top)
        .render(&core.snapshot(), &Hud::default(), Viewport::new(60, 30));
    let floor = fb.row_text(21);
    assert!(floor.chars().filter(|&c| c == '█').count() >= 4, "{floor}");

    let panel: Vec<String> = (0..fb.height()).map(|y| fb.row_text(y)).collect();
    assert!(panel.iter().any(|row| row.contains("SCORE")));
    assert!(panel.iter().any(|row| row.contains("NEXT")));
}

#[test]
fn term_view_pause_overlay() {
    let mut core = playing();
    core.pause();
    let fb = GameView::default().render(&core.snapshot(), &Hud::default(), Viewport::new(60, 30));
    assert!((0..fb.height()).any(|y| fb.row_text(y).contains("PAUSED")));
}

#[test]
fn term_renderer_only_sends_changes_between_frames() {
    let mut core = playing();
    let view = GameView::default();
    let mut snap = GameSnapshot::default();
    let mut fb = FrameBuffer::new(0, 0);
    let mut renderer = TerminalRenderer::with_writer(Vec::new());

    core.snapshot_into(&mut snap);
    view.render_into(&snap, &Hud::default(), Viewport::new(60, 30), &mut fb);
    renderer.draw_swap(&mut fb).unwrap();
    let full = renderer.writer().len();

    core.snapshot_into(&mut snap);
    view.render_into(&snap, &Hud::default(), Viewport::new(60, 30), &mut fb);
    renderer.draw_swap(&mut fb).unwrap();
    assert_eq!(renderer.writer().len(), full, "an unchanged frame writes nothing");

    core.handle_action(GameAction::MoveRight);
    core.snapshot_into(&mut snap);
    view.render_into(&snap, &Hud::default(), Viewport::new(60, 30), &mut fb);
    renderer.draw_swap(&mut fb).unwrap();
    let diff = renderer.writer().len() - full;
    assert!(diff > 0 && diff < full / 4);
}
