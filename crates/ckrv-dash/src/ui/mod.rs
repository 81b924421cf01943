pub mod boundary;
pub mod log_view;
pub mod pipeline_view;
pub mod terminal_pane;
pub mod workflow_view;

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use crate::app::{App, Pane};

/// Top-level draw. The whole pane grid sits inside the render boundary;
/// the toast overlay stays outside it so failure notices still show
/// when a pane is tripped.
pub fn draw(frame: &mut Frame, app: &mut App) {
    // Detach the boundary so the closure can borrow the rest of the app.
    let mut boundary = std::mem::take(&mut app.boundary);
    let area = frame.area();
    boundary.render(frame, area, |frame, area| draw_panes(frame, area, app));
    app.boundary = boundary;

    draw_toasts(frame, app);
}

fn draw_panes(frame: &mut Frame, area: Rect, app: &mut App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(7),  // Pipeline
            Constraint::Min(8),     // Log | Workflow
            Constraint::Length(10), // Terminal
        ])
        .split(area);

    pipeline_view::render(frame, rows[0], app, app.focus == Pane::Pipeline);

    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(rows[1]);

    log_view::render(frame, middle[0], app, app.focus == Pane::Log);
    workflow_view::render(frame, middle[1], app, app.focus == Pane::Workflow);

    let terminal_focused = app.focus == Pane::Terminal;
    app.terminal.render(frame, rows[2], terminal_focused);
}

fn draw_toasts(frame: &mut Frame, app: &App) {
    let area = frame.area();
    for (i, toast) in app.toasts.iter().rev().take(3).enumerate() {
        let width = (toast.text.len() as u16 + 4).min(area.width.saturating_sub(2));
        let rect = Rect {
            x: area.width.saturating_sub(width + 1),
            y: 1 + (i as u16) * 3,
            width,
            height: 3,
        };
        let style = if toast.success {
            Style::default().fg(Color::Green)
        } else {
            Style::default().fg(Color::Red)
        };
        frame.render_widget(Clear, rect);
        frame.render_widget(
            Paragraph::new(toast.text.clone())
                .block(Block::default().borders(Borders::ALL).border_style(style)),
            rect,
        );
    }
}
