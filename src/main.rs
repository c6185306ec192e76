//! Terminal blockfall runner.
//!
//! Drives a [`GameCore`] from wall-clock time, renders its snapshot through
//! the framebuffer renderer and keeps the session in a file store so a quit
//! mid-game resumes paused on the next launch.

use std::fs::File;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use crossterm::event::{
    self, Event, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags,
    PushKeyboardEnhancementFlags,
};
use crossterm::{execute, terminal};

use blockfall::core::GameSnapshot;
use blockfall::engine::{FileStore, GameCore, HostConfig};
use blockfall::host::HostSession;
use blockfall::term::{FrameBuffer, GameView, TerminalRenderer, Viewport};
use blockfall::types::{GameStateKind, TICK_MS};

fn main() -> Result<()> {
    let config = HostConfig::from_env();
    let mut store = FileStore::new(&config.save_dir)
        .with_context(|| format!("cannot use save dir {}", config.save_dir.display()))?;
    init_logging(&config)?;

    let mut term = TerminalRenderer::new();
    term.enter()?;
    let enhanced = terminal::supports_keyboard_enhancement().unwrap_or(false);
    if enhanced {
        execute!(
            std::io::stdout(),
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        )?;
    }

    let result = run(&mut term, &config, &mut store, enhanced);

    if enhanced {
        let _ = execute!(std::io::stdout(), PopKeyboardEnhancementFlags);
    }
    // Always try to restore terminal state.
    let _ = term.exit();
    result
}

/// The terminal belongs to the game, so logs go to a file in the save dir.
fn init_logging(config: &HostConfig) -> Result<()> {
    let path = config.save_dir.join("blockfall.log");
    let file = File::create(&path).with_context(|| format!("cannot open {}", path.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn run(
    term: &mut TerminalRenderer,
    config: &HostConfig,
    store: &mut FileStore,
    enhanced: bool,
) -> Result<()> {
    let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
    let seed = now.as_millis() as u32;
    let day = (now.as_secs() / 86_400) as u32;

    let mut core = GameCore::new();
    let mut host = HostSession::new(config, seed, day, !enhanced);
    if core.load_game(&*store) {
        log::info!("resumed saved session");
    }

    let view = GameView::default();
    let mut snap = GameSnapshot::default();
    let mut fb = FrameBuffer::new(0, 0);
    let frame = Duration::from_millis(TICK_MS as u64);
    let mut last = Instant::now();

    loop {
        let (w, h) = terminal::size().unwrap_or((80, 24));
        core.snapshot_into(&mut snap);
        view.render_into(&snap, &host.hud(&core), Viewport::new(w, h), &mut fb);
        term.draw_swap(&mut fb)?;

        let timeout = frame.saturating_sub(last.elapsed());
        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) => {
                    if let Some(command) = host.route(core.state(), key) {
                        if !host.apply(&mut core, command) {
                            break;
                        }
                    }
                }
                Event::Resize(..) => term.invalidate(),
                _ => {}
            }
        }

        let elapsed = last.elapsed();
        if elapsed >= frame {
            last = Instant::now();
            core.update(elapsed.as_millis() as u32);
            host.observe(&core);
        }
    }

    if core.state() == GameStateKind::Playing {
        core.pause();
    }
    match core.save_game(store) {
        Ok(true) => log::info!("session saved"),
        Ok(false) => core.clear_saved_game(store)?,
        Err(e) => log::error!("save failed: {}", e),
    }
    Ok(())
}
