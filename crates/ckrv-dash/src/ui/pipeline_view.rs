use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use ckrv_core::pipeline::StageStatus;

use crate::app::App;

/// Four stage panels side by side. Every status here is a client-side
/// inference from the latest poll snapshots.
pub fn render(frame: &mut Frame, area: Rect, app: &App, focused: bool) {
    let outer = Block::default()
        .borders(Borders::ALL)
        .title(" Pipeline ")
        .border_style(if focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default()
        });
    let inner = outer.inner(area);
    frame.render_widget(outer, area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
        ])
        .split(inner);

    for (report, column) in app.stages().iter().zip(columns.iter()) {
        let style = status_style(report.status);
        let mut lines = vec![
            Line::styled(format!("{}", report.status), style),
            Line::raw(report.headline.clone()),
        ];
        if !report.detail.is_empty() {
            lines.push(Line::styled(
                report.detail.clone(),
                Style::default().fg(Color::DarkGray),
            ));
        }

        let panel = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} ", report.stage.title()))
                .border_style(style),
        );
        frame.render_widget(panel, *column);
    }
}

fn status_style(status: StageStatus) -> Style {
    match status {
        StageStatus::Empty => Style::default().fg(Color::DarkGray),
        StageStatus::Ready => Style::default().fg(Color::Blue),
        StageStatus::Running => Style::default().fg(Color::Yellow),
        StageStatus::Done => Style::default().fg(Color::Green),
    }
}
