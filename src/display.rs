/// Rendering layer.  All terminal I/O lives here.
///
/// `TerminalPort` is the crossterm implementation of `RenderPort`: it keeps
/// a proxy per entity, the HUD strings and the held-key table, and draws one
/// complete frame on `render`.  No game logic is performed here.

use std::collections::HashMap;
use std::io::Write;

use crossterm::{
    cursor,
    event::{KeyCode, KeyEventKind},
    style::{self, Color, Print},
    terminal, QueueableCommand,
};

use crate::entities::{Controls, Direction, EntityId, EntityKind, Facing};
use crate::geometry::Rect;
use crate::port::{RenderPort, START_LABEL, START_MESSAGE};

// ── Colour palette ────────────────────────────────────────────────────────────

const C_BORDER: Color = Color::DarkBlue;
const C_HUD_SCORE: Color = Color::Yellow;
const C_HUD_CLOCK: Color = Color::Cyan;
const C_SHOOTER: Color = Color::White;
const C_TARGET: Color = Color::Red;
const C_BULLET: Color = Color::Cyan;
const C_HINT: Color = Color::DarkGrey;
const C_RESULT: Color = Color::Yellow;

// ── Cell mapping ─────────────────────────────────────────────────────────────

/// Arena pixels per terminal column / row.
pub const PX_PER_COL: i32 = 10;
pub const PX_PER_ROW: i32 = 20;

/// Rows above the play area: HUD + top border.
const TOP_ROWS: u16 = 2;

/// A key is considered "held" if its last press/repeat event arrived within
/// this many frames.  Covers terminals that don't emit key-release events.
pub const HOLD_WINDOW: u64 = 4;

/// Columns and rows of the play area for an arena size in pixels.
pub fn play_cells(width: i32, height: i32) -> (u16, u16) {
    (
        (width / PX_PER_COL).max(1) as u16,
        (height / PX_PER_ROW).max(1) as u16,
    )
}

/// Terminal cell (column, row) of a box's centre, clamped inside the border.
pub fn cell_for(rect: &Rect, cols: u16, rows: u16) -> (u16, u16) {
    let cx = (rect.x + rect.width / 2).div_euclid(PX_PER_COL);
    let cy = (rect.y + rect.height / 2).div_euclid(PX_PER_ROW);
    let col = cx.clamp(0, i32::from(cols) - 1) as u16;
    let row = cy.clamp(0, i32::from(rows) - 1) as u16;
    (1 + col, TOP_ROWS + row)
}

fn facing_glyph(facing: Facing) -> &'static str {
    match facing.directions().as_slice() {
        [Direction::Up] => "▲",
        [Direction::Down] => "▼",
        [Direction::Left] => "◀",
        [Direction::Right] => "▶",
        [Direction::Up, Direction::Left] => "◤",
        [Direction::Up, Direction::Right] => "◥",
        [Direction::Down, Direction::Left] => "◣",
        [Direction::Down, Direction::Right] => "◢",
        _ => "■",
    }
}

fn key_direction(code: &KeyCode) -> Option<Direction> {
    match code {
        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => Some(Direction::Up),
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => Some(Direction::Down),
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => Some(Direction::Left),
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => Some(Direction::Right),
        _ => None,
    }
}

// ── Port ─────────────────────────────────────────────────────────────────────

pub struct TerminalPort {
    arena: (i32, i32),
    proxies: HashMap<EntityId, (EntityKind, Rect)>,
    facing: Facing,
    score: String,
    clock: String,
    result: Option<(String, String)>,
    listening: bool,
    /// Maps each held key → the frame it was last seen (press or repeat).
    key_frame: HashMap<KeyCode, u64>,
    frame: u64,
}

impl TerminalPort {
    pub fn new(arena_width: i32, arena_height: i32) -> Self {
        Self {
            arena: (arena_width, arena_height),
            proxies: HashMap::new(),
            facing: Facing::default(),
            score: "000".to_string(),
            clock: "00:00:00".to_string(),
            result: Some((START_MESSAGE.to_string(), START_LABEL.to_string())),
            listening: false,
            key_frame: HashMap::new(),
            frame: 0,
        }
    }

    pub fn next_frame(&mut self) {
        self.frame += 1;
    }

    /// Record a key event.  Release events (keyboard-enhancement terminals)
    /// drop the key at once; otherwise it expires after `HOLD_WINDOW`.
    pub fn record_key(&mut self, code: KeyCode, kind: KeyEventKind) {
        match kind {
            KeyEventKind::Press | KeyEventKind::Repeat => {
                self.key_frame.insert(code, self.frame);
            }
            KeyEventKind::Release => {
                self.key_frame.remove(&code);
            }
        }
    }

    fn is_held(&self, key: &KeyCode) -> bool {
        self.key_frame
            .get(key)
            .map(|&last| self.frame.saturating_sub(last) <= HOLD_WINDOW)
            .unwrap_or(false)
    }

    pub fn result(&self) -> Option<(&str, &str)> {
        self.result.as_ref().map(|(m, l)| (m.as_str(), l.as_str()))
    }

    pub fn clear_result(&mut self) {
        self.result = None;
    }

    pub fn proxy(&self, id: EntityId) -> Option<(EntityKind, Rect)> {
        self.proxies.get(&id).copied()
    }

    /// Render one complete frame.
    pub fn render<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        let (cols, rows) = play_cells(self.arena.0, self.arena.1);
        out.queue(terminal::Clear(terminal::ClearType::All))?;

        self.draw_border(out, cols, rows)?;
        self.draw_hud(out, cols)?;

        let mut proxies: Vec<_> = self.proxies.iter().collect();
        // shooter last so it stays visible under overlapping proxies
        proxies.sort_by_key(|(id, (kind, _))| (*kind == EntityKind::Shooter, **id));
        for (_, (kind, rect)) in proxies {
            let (col, row) = cell_for(rect, cols, rows);
            let (glyph, color) = match kind {
                EntityKind::Shooter => (facing_glyph(self.facing), C_SHOOTER),
                EntityKind::Target => ("◆", C_TARGET),
                EntityKind::Bullet => ("•", C_BULLET),
            };
            out.queue(cursor::MoveTo(col, row))?;
            out.queue(style::SetForegroundColor(color))?;
            out.queue(Print(glyph))?;
        }

        self.draw_controls_hint(out, rows)?;
        if let Some((message, label)) = &self.result {
            self.draw_result(out, cols, rows, message, label)?;
        }

        // Park cursor in a harmless spot and flush
        out.queue(style::ResetColor)?;
        out.queue(cursor::MoveTo(0, TOP_ROWS + rows + 2))?;
        out.flush()?;
        Ok(())
    }

    // ── Border ────────────────────────────────────────────────────────────────

    fn draw_border<W: Write>(&self, out: &mut W, cols: u16, rows: u16) -> std::io::Result<()> {
        out.queue(style::SetForegroundColor(C_BORDER))?;
        let bar = "─".repeat(cols as usize);

        out.queue(cursor::MoveTo(0, TOP_ROWS - 1))?;
        out.queue(Print(format!("┌{bar}┐")))?;
        out.queue(cursor::MoveTo(0, TOP_ROWS + rows))?;
        out.queue(Print(format!("└{bar}┘")))?;

        for row in TOP_ROWS..TOP_ROWS + rows {
            out.queue(cursor::MoveTo(0, row))?;
            out.queue(Print("│"))?;
            out.queue(cursor::MoveTo(cols + 1, row))?;
            out.queue(Print("│"))?;
        }
        Ok(())
    }

    // ── HUD (row 0) ───────────────────────────────────────────────────────────

    fn draw_hud<W: Write>(&self, out: &mut W, cols: u16) -> std::io::Result<()> {
        out.queue(cursor::MoveTo(1, 0))?;
        out.queue(style::SetForegroundColor(C_HUD_SCORE))?;
        out.queue(Print(format!("Score: {}", self.score)))?;

        let clock = format!("Time: {}", self.clock);
        let x = (cols + 2).saturating_sub(clock.chars().count() as u16 + 1);
        out.queue(cursor::MoveTo(x, 0))?;
        out.queue(style::SetForegroundColor(C_HUD_CLOCK))?;
        out.queue(Print(clock))?;
        Ok(())
    }

    // ── Controls hint (below the arena) ───────────────────────────────────────

    fn draw_controls_hint<W: Write>(&self, out: &mut W, rows: u16) -> std::io::Result<()> {
        out.queue(cursor::MoveTo(1, TOP_ROWS + rows + 1))?;
        out.queue(style::SetForegroundColor(C_HINT))?;
        out.queue(Print("Arrows / WASD : Move   SPACE : Shoot   Q : Quit"))?;
        Ok(())
    }

    // ── Result popup ──────────────────────────────────────────────────────────

    fn draw_result<W: Write>(
        &self,
        out: &mut W,
        cols: u16,
        rows: u16,
        message: &str,
        label: &str,
    ) -> std::io::Result<()> {
        let button = format!("[ Enter - {label} ]");
        let width = message.chars().count().max(button.chars().count()) + 4;
        let lines = [
            format!("╔{}╗", "═".repeat(width)),
            format!("║{:^width$}║", message),
            format!("║{:^width$}║", button),
            format!("╚{}╝", "═".repeat(width)),
        ];

        let cx = cols / 2 + 1;
        let start_row = TOP_ROWS + (rows / 2).saturating_sub(lines.len() as u16 / 2);
        out.queue(style::SetForegroundColor(C_RESULT))?;
        for (i, line) in lines.iter().enumerate() {
            let col = cx.saturating_sub(line.chars().count() as u16 / 2);
            out.queue(cursor::MoveTo(col, start_row + i as u16))?;
            out.queue(Print(line))?;
        }
        Ok(())
    }
}

impl RenderPort for TerminalPort {
    fn arena_size(&self) -> (i32, i32) {
        self.arena
    }

    fn create_proxy(&mut self, id: EntityId, kind: EntityKind, rect: Rect) {
        self.proxies.insert(id, (kind, rect));
    }

    fn move_proxy(&mut self, id: EntityId, rect: Rect) {
        if let Some(proxy) = self.proxies.get_mut(&id) {
            proxy.1 = rect;
        }
    }

    fn destroy_proxy(&mut self, id: EntityId) {
        self.proxies.remove(&id);
    }

    fn set_facing(&mut self, facing: Facing) {
        self.facing = facing;
    }

    fn held_controls(&self) -> Controls {
        let mut controls = Controls::default();
        if !self.listening {
            return controls;
        }
        for code in self.key_frame.keys() {
            if !self.is_held(code) {
                continue;
            }
            if let Some(direction) = key_direction(code) {
                controls.set(direction, true);
            } else if *code == KeyCode::Char(' ') {
                controls.fire = true;
            }
        }
        controls
    }

    fn set_score(&mut self, text: &str) {
        self.score = text.to_string();
    }

    fn set_clock(&mut self, text: &str) {
        self.clock = text.to_string();
    }

    fn set_result(&mut self, message: &str, control_label: &str) {
        self.result = Some((message.to_string(), control_label.to_string()));
    }

    fn start_listening(&mut self) {
        self.key_frame.clear();
        self.listening = true;
    }

    fn stop_listening(&mut self) {
        self.key_frame.clear();
        self.listening = false;
    }
}
