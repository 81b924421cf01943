use std::panic::{catch_unwind, AssertUnwindSafe};

use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

// ---------------------------------------------------------------------------
// Boundary
// ---------------------------------------------------------------------------

/// Render-time failure containment for the pane grid.
///
/// The first panic out of the wrapped render latches a failed state; from
/// then on the boundary draws a fallback pane instead of re-running the
/// closure, until `reset` re-attempts the original render from scratch.
/// Panics in key handlers or background tasks are not caught here — only
/// the synchronous render path is wrapped.
pub struct Boundary {
    failure: Option<String>,
}

impl Boundary {
    pub fn new() -> Self {
        Self { failure: None }
    }

    pub fn is_failed(&self) -> bool {
        self.failure.is_some()
    }

    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    /// Re-attempt rendering the wrapped subtree on the next draw.
    pub fn reset(&mut self) {
        self.failure = None;
    }

    /// Run `render` inside the boundary, substituting the fallback pane
    /// if it panics (or has already panicked).
    pub fn render(
        &mut self,
        frame: &mut Frame,
        area: Rect,
        render: impl FnOnce(&mut Frame, Rect),
    ) {
        if self.failure.is_none() {
            let outcome = catch_unwind(AssertUnwindSafe(|| render(frame, area)));
            if let Err(payload) = outcome {
                let message = panic_message(payload.as_ref());
                tracing::error!("render panicked: {message}");
                self.failure = Some(message);
            } else {
                return;
            }
        }
        self.render_fallback(frame, area);
    }

    fn render_fallback(&self, frame: &mut Frame, area: Rect) {
        let detail = self.failure.as_deref().unwrap_or("unknown failure");
        let fallback = Paragraph::new(vec![
            Line::raw(""),
            Line::styled("render failed", Style::default().fg(Color::Red)),
            Line::raw(""),
            Line::raw(detail.to_string()),
            Line::raw(""),
            Line::styled("press r to retry", Style::default().fg(Color::DarkGray)),
        ])
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red))
                .title(" Error "),
        );
        frame.render_widget(fallback, area);
    }
}

impl Default for Boundary {
    fn default() -> Self {
        Self::new()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn panic_latches_fallback_and_reset_recovers() {
        let backend = TestBackend::new(40, 10);
        let mut terminal = Terminal::new(backend).unwrap();
        let mut boundary = Boundary::new();

        // Swallow the default panic hook output for the induced panic.
        let hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(|_| {}));

        terminal
            .draw(|f| {
                let area = f.area();
                boundary.render(f, area, |_, _| panic!("pane exploded"));
            })
            .unwrap();

        std::panic::set_hook(hook);

        assert!(boundary.is_failed());
        assert_eq!(boundary.failure(), Some("pane exploded"));
        assert!(buffer_text(&terminal).contains("render failed"));

        // While latched, the closure is not re-run.
        terminal
            .draw(|f| {
                let area = f.area();
                boundary.render(f, area, |_, _| unreachable!("latched"));
            })
            .unwrap();

        // Reset re-attempts the original subtree.
        boundary.reset();
        let mut rendered = false;
        terminal
            .draw(|f| {
                let area = f.area();
                boundary.render(f, area, |frame, area| {
                    rendered = true;
                    frame.render_widget(Paragraph::new("healthy again"), area);
                });
            })
            .unwrap();

        assert!(rendered);
        assert!(!boundary.is_failed());
        assert!(buffer_text(&terminal).contains("healthy again"));
    }
}
