//! GameView: maps a [`GameSnapshot`] into a terminal framebuffer.
//!
//! Pure, no I/O. Board cells are `cell_w` columns by `cell_h` rows so the
//! playfield keeps a roughly square aspect in common terminal fonts.

use crate::core::GameSnapshot;
use crate::fb::{CellStyle, FrameBuffer, Rgb};
use crate::types::{BoosterKind, GameStateKind, PieceKind};

const PLAYFIELD_BG: Rgb = Rgb::new(30, 30, 40);
const PANEL_BG: Rgb = Rgb::new(0, 0, 0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorY {
    Center,
    Top,
}

/// Host-side state that is not part of the snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Hud<'a> {
    pub countdown_seconds: u32,
    pub story_line: Option<&'a str>,
    /// Rows highlighted while picking a bomb or line target: (first row, count)
    pub selection_rows: Option<(u8, u8)>,
    /// Adventure level title shown above the panel
    pub title: Option<&'a str>,
}

pub struct GameView {
    cell_w: u16,
    cell_h: u16,
    anchor_y: AnchorY,
}

impl Default for GameView {
    fn default() -> Self {
        Self::new(2, 1)
    }
}

/// Top-left of the bordered playfield plus its outer size.
#[derive(Debug, Clone, Copy)]
struct Frame {
    x: u16,
    y: u16,
    w: u16,
    h: u16,
}

impl GameView {
    pub fn new(cell_w: u16, cell_h: u16) -> Self {
        Self {
            cell_w: cell_w.max(1),
            cell_h: cell_h.max(1),
            anchor_y: AnchorY::Center,
        }
    }

    pub fn with_anchor_y(mut self, anchor_y: AnchorY) -> Self {
        self.anchor_y = anchor_y;
        self
    }

    /// Render into a reused framebuffer; resizes it to `viewport` first.
    pub fn render_into(&self, snap: &GameSnapshot, hud: &Hud<'_>, viewport: Viewport, fb: &mut FrameBuffer) {
        fb.resize(viewport.width, viewport.height);
        fb.clear(CellStyle::new(Rgb::new(220, 220, 220), PANEL_BG).cell(' '));

        let board_w = snap.width as u16 * self.cell_w;
        let board_h = snap.height as u16 * self.cell_h;
        let w = board_w + 2;
        let h = board_h + 2;
        let frame = Frame {
            x: viewport.width.saturating_sub(w) / 2,
            y: match self.anchor_y {
                AnchorY::Center => viewport.height.saturating_sub(h) / 2,
                AnchorY::Top => 0,
            },
            w,
            h,
        };

        let bg = CellStyle::new(Rgb::new(80, 80, 90), PLAYFIELD_BG);
        fb.fill_rect(frame.x + 1, frame.y + 1, board_w, board_h, ' ', bg);
        draw_border(fb, frame, CellStyle::new(Rgb::new(200, 200, 200), PANEL_BG));

        self.draw_board(fb, snap, hud, frame);
        self.draw_side_panel(fb, snap, hud, viewport, frame);
        self.draw_overlay(fb, snap, hud, frame);
    }

    /// Convenience helper that allocates a new framebuffer.
    pub fn render(&self, snap: &GameSnapshot, hud: &Hud<'_>, viewport: Viewport) -> FrameBuffer {
        let mut fb = FrameBuffer::new(viewport.width, viewport.height);
        self.render_into(snap, hud, viewport, &mut fb);
        fb
    }

    fn draw_board(&self, fb: &mut FrameBuffer, snap: &GameSnapshot, hud: &Hud<'_>, frame: Frame) {
        let highlighted = |y: u8| match hud.selection_rows {
            Some((start, count)) => y >= start && y < start.saturating_add(count),
            None => false,
        };

        for y in 0..snap.height {
            let row_bg = if highlighted(y) {
                Rgb::new(90, 60, 30)
            } else {
                PLAYFIELD_BG
            };
            for x in 0..snap.width {
                let (ch, fg, dim) = match snap.cell(x, y).unwrap_or(0) {
                    0 => ('·', Rgb::new(90, 90, 100), true),
                    code => block_glyph(code),
                };
                let style = CellStyle {
                    fg,
                    bg: row_bg,
                    bold: ch != '·',
                    dim,
                };
                self.fill_cell(fb, frame, x as i8, y as i8, snap, ch, style);
            }
        }

        if let Some(ghost) = &snap.ghost {
            let style = CellStyle::new(Rgb::new(140, 140, 140), PLAYFIELD_BG).dim();
            for &(x, y) in &ghost.cells {
                self.fill_cell(fb, frame, x, y, snap, '░', style);
            }
        }

        if let Some(active) = &snap.active {
            let style = CellStyle::new(piece_color(active.kind), PLAYFIELD_BG).bold();
            for &(x, y) in &active.cells {
                self.fill_cell(fb, frame, x, y, snap, '█', style);
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn fill_cell(
        &self,
        fb: &mut FrameBuffer,
        frame: Frame,
        x: i8,
        y: i8,
        snap: &GameSnapshot,
        ch: char,
        style: CellStyle,
    ) {
        if x < 0 || y < 0 || x as u8 >= snap.width || y as u8 >= snap.height {
            return;
        }
        let px = frame.x + 1 + x as u16 * self.cell_w;
        let py = frame.y + 1 + y as u16 * self.cell_h;
        fb.fill_rect(px, py, self.cell_w, self.cell_h, ch, style);
    }

    fn draw_side_panel(
        &self,
        fb: &mut FrameBuffer,
        snap: &GameSnapshot,
        hud: &Hud<'_>,
        viewport: Viewport,
        frame: Frame,
    ) {
        let x = frame.x.saturating_add(frame.w).saturating_add(2);
        if x >= viewport.width || viewport.width - x < 12 {
            return;
        }

        let label = CellStyle::new(Rgb::new(220, 220, 220), PANEL_BG).bold();
        let value = CellStyle::new(Rgb::new(200, 200, 200), PANEL_BG);
        let dim = value.dim();
        let stats = &snap.stats;
        let mut y = frame.y;

        if let Some(title) = hud.title {
            fb.put_str(x, y, title, label);
            y += 2;
        }

        fb.put_str(x, y, snap.mode.as_str(), dim);
        y += 2;

        for (name, n) in [("SCORE", stats.score), ("LEVEL", stats.level), ("LINES", stats.rows)] {
            fb.put_str(x, y, name, label);
            fb.put_u32(x, y + 1, n, value);
            y += 3;
        }

        fb.put_str(x, y, "TIME", label);
        put_clock(fb, x, y + 1, stats.time_ms, value);
        y += 3;

        if stats.combo > 0 || stats.b2b_chain > 0 {
            let cx = fb.put_str(x, y, "COMBO ", dim);
            fb.put_u32(cx, y, stats.combo.max(0) as u32, value);
            let bx = fb.put_str(x, y + 1, "B2B   ", dim);
            fb.put_u32(bx, y + 1, stats.b2b_chain, value);
            y += 3;
        }

        fb.put_str(x, y, "HOLD", label);
        let hold_style = if snap.can_hold { value } else { dim };
        fb.put_str(x, y + 1, snap.hold.map(piece_label).unwrap_or("-"), hold_style);
        y += 3;

        fb.put_str(x, y, "NEXT", label);
        y += 1;
        for kind in &snap.next_queue {
            if y >= viewport.height {
                return;
            }
            fb.put_str(x, y, piece_label(*kind), CellStyle::new(piece_color(*kind), PANEL_BG));
            y += 1;
        }
        y += 1;

        if BoosterKind::ALL.iter().any(|&k| stats.boosters.count(k) > 0) {
            fb.put_str(x, y, "BOOSTERS", label);
            y += 1;
            for (i, kind) in BoosterKind::ALL.iter().enumerate() {
                let n = stats.boosters.count(*kind);
                if n == 0 {
                    continue;
                }
                let kx = fb.put_u32(x, y, i as u32 + 1, dim);
                let kx = fb.put_str(kx, y, " ", dim);
                let kx = fb.put_str(kx, y, kind.as_str(), value);
                let kx = fb.put_str(kx, y, " x", dim);
                fb.put_u32(kx, y, n as u32, value);
                y += 1;
            }
            y += 1;
        }

        if stats.boss_max_hp > 0 {
            fb.put_str(x, y, "FOE", label);
            let hx = fb.put_u32(x, y + 1, stats.boss_hp, value);
            let hx = fb.put_str(hx, y + 1, "/", dim);
            fb.put_u32(hx, y + 1, stats.boss_max_hp, value);
            y += 3;
        }

        if stats.garbage_pending > 0 {
            let gx = fb.put_str(x, y, "INCOMING ", CellStyle::new(Rgb::new(220, 80, 80), PANEL_BG));
            fb.put_u32(gx, y, stats.garbage_pending, value);
            y += 1;
        }

        let buffs = [
            ("ZONE", stats.zone.active),
            ("FRENZY", stats.frenzy.active),
            ("OVERDRIVE", stats.overdrive.active),
            ("SLOW", stats.slow_time.active),
            ("FLIP", snap.flipped_gravity),
        ];
        for (name, on) in buffs {
            if on && y < viewport.height {
                fb.put_str(x, y, name, CellStyle::new(Rgb::new(240, 220, 80), PANEL_BG).bold());
                y += 1;
            }
        }
    }

    fn draw_overlay(&self, fb: &mut FrameBuffer, snap: &GameSnapshot, hud: &Hud<'_>, frame: Frame) {
        let style = CellStyle::new(Rgb::new(255, 255, 255), PANEL_BG).bold();
        let mid = frame.y.saturating_add(frame.h / 2);

        let (title, hint) = match snap.state {
            GameStateKind::Playing => return,
            GameStateKind::Countdown => {
                let x = frame.x + frame.w / 2;
                fb.put_u32(x, mid, hud.countdown_seconds, style);
                return;
            }
            GameStateKind::Story => {
                let line = hud.story_line.unwrap_or("...");
                put_wrapped(fb, frame, mid, line, style);
                return;
            }
            GameStateKind::Menu => ("BLOCKFALL", "enter: play  m: map"),
            GameStateKind::Paused => ("PAUSED", "p: resume"),
            GameStateKind::GameOver => ("GAME OVER", "r: retry  esc: menu"),
            GameStateKind::Victory => ("VICTORY", "enter: continue"),
            GameStateKind::Map => ("MAP", "up/down: level  enter: pick"),
            GameStateKind::BoosterSelection => ("BOOSTERS", "1-5: toggle  enter: go"),
            GameStateKind::WildcardSelection => ("CHOOSE PIECE", "i o t s z j l"),
            GameStateKind::BombSelection => ("PLACE BOMB", "up/down  enter  esc"),
            GameStateKind::LineSelection => ("CLEAR ROW", "up/down  enter  esc"),
        };
        put_centered(fb, frame, mid, title, style);
        put_centered(fb, frame, mid.saturating_add(1), hint, style.dim());
    }
}

fn draw_border(fb: &mut FrameBuffer, f: Frame, style: CellStyle) {
    if f.w < 2 || f.h < 2 {
        return;
    }
    let (right, bottom) = (f.x + f.w - 1, f.y + f.h - 1);
    fb.put_char(f.x, f.y, '┌', style);
    fb.put_char(right, f.y, '┐', style);
    fb.put_char(f.x, bottom, '└', style);
    fb.put_char(right, bottom, '┘', style);
    for x in f.x + 1..right {
        fb.put_char(x, f.y, '─', style);
        fb.put_char(x, bottom, '─', style);
    }
    for y in f.y + 1..bottom {
        fb.put_char(f.x, y, '│', style);
        fb.put_char(right, y, '│', style);
    }
}

fn put_centered(fb: &mut FrameBuffer, f: Frame, y: u16, text: &str, style: CellStyle) {
    let len = text.chars().count() as u16;
    let x = f.x.saturating_add(f.w.saturating_sub(len) / 2);
    fb.put_str(x, y, text, style);
}

/// Word-wrap `text` inside the playfield, centered on `mid`.
fn put_wrapped(fb: &mut FrameBuffer, f: Frame, mid: u16, text: &str, style: CellStyle) {
    let max = f.w.saturating_sub(4).max(1) as usize;
    let mut lines: Vec<String> = Vec::new();
    for word in text.split_whitespace() {
        match lines.last_mut() {
            Some(line) if line.chars().count() + 1 + word.chars().count() <= max => {
                line.push(' ');
                line.push_str(word);
            }
            _ => lines.push(word.to_string()),
        }
    }
    let top = mid.saturating_sub(lines.len() as u16 / 2);
    for (i, line) in lines.iter().enumerate() {
        put_centered(fb, f, top + i as u16, line, style);
    }
}

fn put_clock(fb: &mut FrameBuffer, x: u16, y: u16, ms: u32, style: CellStyle) {
    let secs = ms / 1000;
    let x = fb.put_u32(x, y, secs / 60, style);
    let x = fb.put_str(x, y, if secs % 60 < 10 { ":0" } else { ":" }, style);
    fb.put_u32(x, y, secs % 60, style);
}

fn block_glyph(code: u8) -> (char, Rgb, bool) {
    match code {
        20 => ('▓', Rgb::new(120, 120, 120), false),
        21 => ('◆', Rgb::new(90, 230, 250), false),
        22 => ('●', Rgb::new(250, 70, 50), false),
        _ => match piece_from_code(code) {
            Some(kind) => ('█', piece_color(kind), false),
            None => ('?', Rgb::new(255, 0, 255), false),
        },
    }
}

fn piece_from_code(code: u8) -> Option<PieceKind> {
    PieceKind::STANDARD
        .iter()
        .chain(PieceKind::EXTENDED.iter())
        .copied()
        .find(|k| k.color_code() == code)
}

fn piece_color(kind: PieceKind) -> Rgb {
    match kind {
        PieceKind::I => Rgb::new(80, 220, 220),
        PieceKind::O => Rgb::new(240, 220, 80),
        PieceKind::T => Rgb::new(200, 120, 220),
        PieceKind::S => Rgb::new(100, 220, 120),
        PieceKind::Z => Rgb::new(220, 80, 80),
        PieceKind::J => Rgb::new(80, 120, 220),
        PieceKind::L => Rgb::new(255, 165, 0),
        PieceKind::Mono => Rgb::new(230, 230, 230),
        PieceKind::V => Rgb::new(170, 200, 90),
        PieceKind::Plus => Rgb::new(240, 120, 170),
        PieceKind::U => Rgb::new(120, 170, 250),
    }
}

fn piece_label(kind: PieceKind) -> &'static str {
    match kind {
        PieceKind::I => "I",
        PieceKind::O => "O",
        PieceKind::T => "T",
        PieceKind::S => "S",
        PieceKind::Z => "Z",
        PieceKind::J => "J",
        PieceKind::L => "L",
        PieceKind::Mono => ".",
        PieceKind::V => "V",
        PieceKind::Plus => "+",
        PieceKind::U => "U",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ActiveSnapshot, BoardConfig, BoardManager, GameStats};
    use crate::types::{BoardLayout, GameMode, Rotation};

    fn snapshot(layout: BoardLayout) -> GameSnapshot {
        let (width, height) = (layout.width(), layout.height());
        GameSnapshot {
            width,
            height,
            board: vec![0; width as usize * height as usize],
            state: GameStateKind::Playing,
            mode: GameMode::Marathon,
            stats: GameStats::new(1),
            ..GameSnapshot::default()
        }
    }

    fn find(fb: &FrameBuffer, needle: &str) -> Option<u16> {
        (0..fb.height()).find(|&y| fb.row_text(y).contains(needle))
    }

    #[test]
    fn test_board_frame_and_panel() {
        let snap = snapshot(BoardLayout::Comfort);
        let fb = GameView::default().render(&snap, &Hud::default(), Viewport::new(60, 24));

        assert!(find(&fb, "SCORE").is_some());
        assert!(find(&fb, "marathon").is_some());
        // 21 playfield rows plus two border rows
        let top = find(&fb, "┌").unwrap();
        assert!(fb.row_text(top + 22).contains('┘'));
    }

    #[test]
    fn test_locked_cells_and_modifiers_render() {
        let mut snap = snapshot(BoardLayout::Comfort);
        let bottom = (snap.height as usize - 1) * snap.width as usize;
        snap.board[bottom] = 20;
        snap.board[bottom + 1] = 21;
        snap.board[bottom + 2] = 22;
        snap.board[bottom + 3] = PieceKind::T.color_code();

        let fb = GameView::default()
            .with_anchor_y(AnchorY::Top)
            .render(&snap, &Hud::default(), Viewport::new(40, 24));
        let row = fb.row_text(snap.height as u16);
        assert!(row.contains("▓▓◆◆●●██"));
    }

    #[test]
    fn test_active_and_ghost_cells() {
        let mut snap = snapshot(BoardLayout::Comfort);
        let piece = |y: i8| ActiveSnapshot {
            kind: PieceKind::I,
            rotation: Rotation::North,
            x: 3,
            y,
            cells: (3..7).map(|x| (x, y)).collect(),
        };
        snap.active = Some(piece(1));
        snap.ghost = Some(piece(20));

        let fb = GameView::new(1, 1)
            .with_anchor_y(AnchorY::Top)
            .render(&snap, &Hud::default(), Viewport::new(12, 23));
        assert_eq!(fb.row_text(2), "│···████···│");
        assert_eq!(fb.row_text(21), "│···░░░░···│");
    }

    #[test]
    fn test_overlays_follow_state() {
        let mut snap = snapshot(BoardLayout::Comfort);
        let view = GameView::default();
        let vp = Viewport::new(60, 24);

        snap.state = GameStateKind::Paused;
        assert!(find(&view.render(&snap, &Hud::default(), vp), "PAUSED").is_some());

        snap.state = GameStateKind::Countdown;
        let hud = Hud {
            countdown_seconds: 3,
            ..Hud::default()
        };
        let fb = view.render(&snap, &hud, vp);
        assert!(find(&fb, "3").is_some());

        snap.state = GameStateKind::Story;
        let hud = Hud {
            story_line: Some("The golem wakes"),
            ..Hud::default()
        };
        assert!(find(&view.render(&snap, &hud, vp), "golem").is_some());

        snap.state = GameStateKind::Playing;
        let fb = view.render(&snap, &Hud::default(), vp);
        assert!(find(&fb, "PAUSED").is_none());
    }

    #[test]
    fn test_dense_layout_and_stats_from_core() {
        let config = BoardConfig {
            layout: BoardLayout::Dense,
            seed: 3,
            ..BoardConfig::default()
        };
        let mut board = BoardManager::new(&config);
        board.spawn_next();
        let mut snap = snapshot(BoardLayout::Dense);
        board.snapshot_into(&mut snap);
        assert_eq!(snap.board.len(), 20 * 50);
        snap.stats.boss_hp = 40;
        snap.stats.boss_max_hp = 150;

        let fb = GameView::new(1, 1).render(&snap, &Hud::default(), Viewport::new(80, 60));
        assert!(find(&fb, "40/150").is_some());
    }

    #[test]
    fn test_narrow_viewport_skips_panel() {
        let snap = snapshot(BoardLayout::Comfort);
        let fb = GameView::default().render(&snap, &Hud::default(), Viewport::new(22, 24));
        assert!(find(&fb, "SCORE").is_none());
    }

    #[test]
    fn test_clock_format() {
        let mut fb = FrameBuffer::new(8, 1);
        put_clock(&mut fb, 0, 0, 125_000, CellStyle::default());
        assert_eq!(fb.row_text(0).trim_end(), "2:05");
    }
}
