use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph};
use ratatui::Frame;

use ckrv_core::event::{EventKind, OrchestrationEvent};

use crate::app::App;

/// Event log pane: filter bar on top, filtered event list, status footer.
pub fn render(frame: &mut Frame, area: Rect, app: &App, focused: bool) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Filter bar
            Constraint::Min(3),    // Events
            Constraint::Length(1), // Footer
        ])
        .split(area);

    render_filter_bar(frame, chunks[0], app, focused);
    render_events(frame, chunks[1], app, focused);
    render_footer(frame, chunks[2], app);
}

fn render_filter_bar(frame: &mut Frame, area: Rect, app: &App, focused: bool) {
    let kind_label = match app.filter.kind {
        Some(kind) => kind.label(),
        None => "ALL",
    };
    let query = if app.filter_editing {
        format!("{}▏", app.filter.query)
    } else if app.filter.query.is_empty() {
        "(press / to filter)".to_string()
    } else {
        app.filter.query.clone()
    };

    let bar = Paragraph::new(Line::from(vec![
        Span::styled(format!(" {kind_label} "), Style::default().fg(Color::Cyan)),
        Span::raw("| "),
        Span::raw(query),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Filter ")
            .border_style(if focused && app.filter_editing {
                Style::default().fg(Color::Yellow)
            } else if focused {
                Style::default().fg(Color::Cyan)
            } else {
                Style::default()
            }),
    );
    frame.render_widget(bar, area);
}

fn render_events(frame: &mut Frame, area: Rect, app: &App, focused: bool) {
    let shown = app.filtered_events();
    let visible = area.height.saturating_sub(2) as usize;
    // Tail-follow: newest events are the interesting ones.
    let skip = shown.len().saturating_sub(visible);

    let items: Vec<ListItem> = shown
        .iter()
        .skip(skip)
        .map(|event| event_item(event))
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Log ")
        .border_style(if focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default()
        });

    if items.is_empty() {
        let hint = if app.stream_ended {
            "event stream ended — restart the dashboard to reconnect"
        } else {
            "waiting for events… start a run with `ckrv run`"
        };
        frame.render_widget(
            Paragraph::new(hint)
                .style(Style::default().fg(Color::DarkGray))
                .block(block),
            area,
        );
    } else {
        frame.render_widget(List::new(items).block(block), area);
    }
}

fn event_item(event: &OrchestrationEvent) -> ListItem<'static> {
    let style = style_for_kind(event.kind);
    let mut spans = vec![
        Span::styled(
            format!("{} ", event.timestamp.format("%H:%M:%S")),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(format!("{:10} ", event.kind.label()), style),
    ];
    if let Some(step) = &event.step_name {
        spans.push(Span::styled(
            format!("[{step}] "),
            Style::default().add_modifier(Modifier::BOLD),
        ));
    }
    spans.push(Span::raw(event.message.clone()));
    ListItem::new(Line::from(spans))
}

fn style_for_kind(kind: EventKind) -> Style {
    match kind {
        EventKind::Error => Style::default().fg(Color::Red),
        EventKind::Warning => Style::default().fg(Color::Yellow),
        EventKind::Success => Style::default().fg(Color::Green),
        EventKind::StepStart | EventKind::StepEnd => Style::default().fg(Color::Cyan),
        EventKind::Log => Style::default(),
    }
}

fn render_footer(frame: &mut Frame, area: Rect, app: &App) {
    let shown = app.filtered_events().len();
    let mut text = format!(" {shown}/{} events", app.log.len());
    if app.log.dropped() > 0 {
        text.push_str(&format!("  ({} evicted)", app.log.dropped()));
    }
    if app.stream_ended {
        text.push_str("  [stream ended]");
    }
    text.push_str("  e export · c clear");

    frame.render_widget(
        Paragraph::new(text).style(Style::default().fg(Color::DarkGray)),
        area,
    );
}
