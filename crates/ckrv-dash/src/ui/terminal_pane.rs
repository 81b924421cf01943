use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use ckrv_core::event::{EventKind, OrchestrationEvent};

const SCROLLBACK: usize = 1000;
const DEFAULT_COLS: u16 = 80;
const DEFAULT_ROWS: u16 = 24;

/// Draw ticks to wait before re-applying the fit once. Layout may not
/// have settled at first mount; the deferred refit corrects for it.
const REFIT_DELAY_TICKS: u8 = 2;

// ---------------------------------------------------------------------------
// TerminalPane
// ---------------------------------------------------------------------------

/// Embedded terminal: one vt100 parser per pane instance, fed with the
/// engine's raw output lines. Fits itself to the pane on resize, with a
/// one-shot deferred refit shortly after construction. Dropped with the
/// pane.
pub struct TerminalPane {
    parser: vt100::Parser,
    cols: u16,
    rows: u16,
    refit_ticks: Option<u8>,
    /// Line selection as (anchor, cursor) rows in the visible screen.
    selection: Option<(u16, u16)>,
}

impl TerminalPane {
    pub fn new() -> Self {
        Self {
            parser: vt100::Parser::new(DEFAULT_ROWS, DEFAULT_COLS, SCROLLBACK),
            cols: DEFAULT_COLS,
            rows: DEFAULT_ROWS,
            refit_ticks: Some(REFIT_DELAY_TICKS),
            selection: None,
        }
    }

    // ── Input ────────────────────────────────────────────────────────────

    pub fn feed(&mut self, bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }
        self.parser.process(bytes);
    }

    /// Write one orchestration event as a colored terminal line.
    pub fn feed_event(&mut self, event: &OrchestrationEvent) {
        let color = match event.kind {
            EventKind::Error => "\x1b[31m",
            EventKind::Warning => "\x1b[33m",
            EventKind::Success => "\x1b[32m",
            EventKind::StepStart | EventKind::StepEnd => "\x1b[36m",
            EventKind::Log => "",
        };
        let line = match &event.step_name {
            Some(step) => format!("{color}[{step}] {}\x1b[0m\r\n", event.message),
            None => format!("{color}{}\x1b[0m\r\n", event.message),
        };
        self.feed(line.as_bytes());
    }

    // ── Sizing ───────────────────────────────────────────────────────────

    /// Fit the parser grid to the pane's inner size. No-op when the size
    /// is unchanged.
    pub fn fit(&mut self, cols: u16, rows: u16) {
        let cols = cols.max(1);
        let rows = rows.max(1);
        if (cols, rows) != (self.cols, self.rows) {
            self.cols = cols;
            self.rows = rows;
            self.parser.set_size(rows, cols);
            self.selection = None;
        }
    }

    /// Counts down the deferred refit and re-applies the current size
    /// once when it fires.
    pub fn tick(&mut self) {
        if let Some(remaining) = self.refit_ticks {
            if remaining == 0 {
                self.parser.set_size(self.rows, self.cols);
                self.refit_ticks = None;
            } else {
                self.refit_ticks = Some(remaining - 1);
            }
        }
    }

    pub fn size(&self) -> (u16, u16) {
        (self.cols, self.rows)
    }

    // ── Selection / clipboard ────────────────────────────────────────────

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::SHIFT) {
            match key.code {
                KeyCode::Up => self.extend_selection(-1),
                KeyCode::Down => self.extend_selection(1),
                _ => {}
            }
        } else if key.code == KeyCode::Esc {
            self.selection = None;
        }
    }

    fn extend_selection(&mut self, delta: i32) {
        let (anchor, cursor) = match self.selection {
            Some(sel) => sel,
            None => {
                let last = self.rows.saturating_sub(1);
                (last, last)
            }
        };
        let moved = cursor as i32 + delta;
        let moved = moved.clamp(0, self.rows.saturating_sub(1) as i32) as u16;
        self.selection = Some((anchor, moved));
    }

    pub fn has_selection(&self) -> bool {
        self.selection.is_some()
    }

    /// Text of the selected rows, trailing blanks trimmed per row.
    pub fn selection_text(&self) -> Option<String> {
        let (anchor, cursor) = self.selection?;
        let (from, to) = (anchor.min(cursor), anchor.max(cursor));
        let lines: Vec<String> = self
            .screen_lines()
            .into_iter()
            .skip(from as usize)
            .take((to - from) as usize + 1)
            .map(|l| l.trim_end().to_string())
            .collect();
        Some(lines.join("\n"))
    }

    /// Copy the selection to the system clipboard. Does nothing without
    /// a selection; clipboard failures are swallowed.
    pub fn copy_selection(&mut self) {
        let Some(text) = self.selection_text() else {
            return;
        };
        match arboard::Clipboard::new().and_then(|mut cb| cb.set_text(text)) {
            Ok(()) => self.selection = None,
            Err(e) => tracing::debug!("clipboard copy failed: {e}"),
        }
    }

    // ── Rendering ────────────────────────────────────────────────────────

    pub fn screen_lines(&self) -> Vec<String> {
        let screen = self.parser.screen();
        let (_, cols) = screen.size();
        screen.rows(0, cols).collect()
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect, focused: bool) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Terminal ")
            .border_style(if focused {
                Style::default().fg(Color::Cyan)
            } else {
                Style::default()
            });
        let inner = block.inner(area);
        self.fit(inner.width, inner.height);

        let selected = self
            .selection
            .map(|(a, c)| (a.min(c), a.max(c)));
        let lines: Vec<Line> = self
            .screen_lines()
            .into_iter()
            .enumerate()
            .map(|(i, text)| {
                let in_selection =
                    selected.is_some_and(|(from, to)| (from..=to).contains(&(i as u16)));
                if in_selection {
                    Line::styled(text, Style::default().add_modifier(Modifier::REVERSED))
                } else {
                    Line::raw(text)
                }
            })
            .collect();

        frame.render_widget(Paragraph::new(lines).block(block), area);
    }
}

impl Default for TerminalPane {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
