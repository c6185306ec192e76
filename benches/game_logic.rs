use criterion::{black_box, criterion_group, criterion_main, Criterion};
use blockfall::core::{Board, BoardConfig, BoardManager, GameSnapshot, Gravity};
use blockfall::engine::{GameCore, GameSetup};
use blockfall::types::{Block, BoardLayout, GameMode, PieceKind};

fn started_manager(layout: BoardLayout) -> BoardManager {
    let mut bm = BoardManager::new(&BoardConfig {
        layout,
        seed: 12345,
        ..BoardConfig::default()
    });
    bm.spawn_next();
    bm
}

fn bench_tick(c: &mut Criterion) {
    let mut setup = GameSetup::for_mode(GameMode::Zen).with_seed(12345);
    setup.countdown_ms = 0;
    let mut core = GameCore::new();
    core.reset_game(setup);

    c.bench_function("game_update_16ms", |b| {
        b.iter(|| {
            core.update(black_box(16));
        })
    });
}

fn bench_line_clear(c: &mut Criterion) {
    for layout in [BoardLayout::Comfort, BoardLayout::Dense] {
        let name = format!("clear_4_lines_{}x{}", layout.width(), layout.height());
        c.bench_function(&name, |b| {
            b.iter(|| {
                let mut board = Board::new(layout);
                let (w, h) = (layout.width() as i8, layout.height() as i8);
                for y in h - 4..h {
                    for x in 0..w {
                        board.set(x, y, Some(Block::Piece(PieceKind::I)));
                    }
                }
                board.clear_full_rows(Gravity::Down)
            })
        });
    }
}

fn bench_piece_spawn(c: &mut Criterion) {
    let mut bm = started_manager(BoardLayout::Comfort);

    c.bench_function("spawn_piece", |b| {
        b.iter(|| {
            bm.spawn_next();
        })
    });
}

fn bench_try_move(c: &mut Criterion) {
    let mut bm = started_manager(BoardLayout::Comfort);
    let mut dx = 1;

    c.bench_function("try_move", |b| {
        b.iter(|| {
            if !bm.move_horizontal(black_box(dx)) {
                dx = -dx;
            }
        })
    });
}

fn bench_try_rotate(c: &mut Criterion) {
    let mut bm = started_manager(BoardLayout::Comfort);

    c.bench_function("try_rotate", |b| {
        b.iter(|| {
            bm.rotate(true);
        })
    });
}

fn bench_snapshot(c: &mut Criterion) {
    let mut setup = GameSetup::for_mode(GameMode::Marathon).with_seed(12345);
    setup.countdown_ms = 0;
    setup.layout = BoardLayout::Dense;
    let mut core = GameCore::new();
    core.reset_game(setup);
    let mut snap = GameSnapshot::default();

    c.bench_function("snapshot_into_dense", |b| {
        b.iter(|| {
            core.snapshot_into(black_box(&mut snap));
        })
    });
}

criterion_group!(
    benches,
    bench_tick,
    bench_line_clear,
    bench_piece_spawn,
    bench_try_move,
    bench_try_rotate,
    bench_snapshot
);
criterion_main!(benches);
