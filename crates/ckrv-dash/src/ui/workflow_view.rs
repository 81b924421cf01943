use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph};
use ratatui::Frame;

use crate::app::{App, Mutation};

/// Spec list on the left, the three sequential gates plus the latest
/// command result on the right.
pub fn render(frame: &mut Frame, area: Rect, app: &App, focused: bool) {
    let outer = Block::default()
        .borders(Borders::ALL)
        .title(" Workflow ")
        .border_style(if focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default()
        });
    let inner = outer.inner(area);
    frame.render_widget(outer, area);

    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(inner);

    render_spec_list(frame, halves[0], app);
    render_gates(frame, halves[1], app);
}

fn render_spec_list(frame: &mut Frame, area: Rect, app: &App) {
    if app.specs.is_empty() {
        frame.render_widget(
            Paragraph::new("no specs yet — ckrv spec new <name>")
                .style(Style::default().fg(Color::DarkGray)),
            area,
        );
        return;
    }

    let items: Vec<ListItem> = app
        .specs
        .iter()
        .enumerate()
        .map(|(i, spec)| {
            let style = if i == app.selected_spec {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            ListItem::new(format!("{} ({})", spec.name, spec.stage_label())).style(style)
        })
        .collect();
    frame.render_widget(List::new(items), area);
}

fn render_gates(frame: &mut Frame, area: Rect, app: &App) {
    let gates = app.gates();
    let inputs = app.gate_inputs();

    let busy_verb = app.busy.as_ref().map(Mutation::verb);
    let mut lines = vec![
        gate_line(
            "clarify",
            gates.needs_clarification,
            format!("{} unresolved", inputs.unresolved_clarifications),
            None,
        ),
        gate_line(
            "design   (d)",
            gates.can_design,
            if inputs.has_design {
                "design exists".to_string()
            } else {
                "no design".to_string()
            },
            busy_verb.filter(|v| *v == "generate design"),
        ),
        gate_line(
            "tasks    (t)",
            gates.can_generate_tasks,
            if inputs.has_tasks {
                "tasks exist".to_string()
            } else {
                "no tasks".to_string()
            },
            busy_verb.filter(|v| *v == "generate tasks"),
        ),
        Line::raw(""),
        Line::styled(
            "v validate · f fix · F fix --check",
            Style::default().fg(Color::DarkGray),
        ),
    ];

    if let Some(result) = app.command_slot.get() {
        lines.push(Line::raw(""));
        let (label, style) = if result.success {
            ("ok: ", Style::default().fg(Color::Green))
        } else {
            ("error: ", Style::default().fg(Color::Red))
        };
        lines.push(Line::from(vec![
            Span::styled(label, style),
            Span::raw(result.message.clone().unwrap_or_default()),
            Span::styled("  (x to dismiss)", Style::default().fg(Color::DarkGray)),
        ]));
    }

    frame.render_widget(Paragraph::new(lines), area);
}

fn gate_line(
    name: &str,
    active: bool,
    detail: String,
    busy: Option<&'static str>,
) -> Line<'static> {
    let (marker, style) = if busy.is_some() {
        ("⠿", Style::default().fg(Color::Yellow))
    } else if active {
        ("●", Style::default().fg(Color::Green))
    } else {
        ("○", Style::default().fg(Color::DarkGray))
    };
    let suffix = if busy.is_some() { "  working…" } else { "" };
    Line::from(vec![
        Span::styled(format!("{marker} "), style),
        Span::styled(format!("{name:14}"), style),
        Span::styled(detail, Style::default().fg(Color::DarkGray)),
        Span::styled(suffix, Style::default().fg(Color::Yellow)),
    ])
}
