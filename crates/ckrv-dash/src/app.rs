use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use ckrv_core::command::{CommandResult, CommandSlot};
use ckrv_core::config::DashConfig;
use ckrv_core::event::{EventKind, OrchestrationEvent};
use ckrv_core::gate::{GateInputs, Gates};
use ckrv_core::log::{LogBuffer, LogFilter};
use ckrv_core::pipeline::{derive_stages, StageReport};
use ckrv_core::spec::SpecSummary;
use ckrv_core::task::Task;

use crate::ui::boundary::Boundary;
use crate::ui::terminal_pane::TerminalPane;

const TOAST_TTL: Duration = Duration::from_secs(4);

// ---------------------------------------------------------------------------
// Panes / messages / effects
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pane {
    Log,
    Pipeline,
    Workflow,
    Terminal,
}

impl Pane {
    pub fn next(self) -> Pane {
        match self {
            Pane::Log => Pane::Pipeline,
            Pane::Pipeline => Pane::Workflow,
            Pane::Workflow => Pane::Terminal,
            Pane::Terminal => Pane::Log,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Pane::Log => "Log",
            Pane::Pipeline => "Pipeline",
            Pane::Workflow => "Workflow",
            Pane::Terminal => "Terminal",
        }
    }
}

/// A user-triggered backend mutation. Carried in the trigger effect and
/// echoed back in the completion message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Validate { spec: String },
    GenerateDesign { spec: String },
    GenerateTasks { spec: String },
    Fix { check: bool },
}

impl Mutation {
    pub fn verb(&self) -> &'static str {
        match self {
            Mutation::Validate { .. } => "validate",
            Mutation::GenerateDesign { .. } => "generate design",
            Mutation::GenerateTasks { .. } => "generate tasks",
            Mutation::Fix { .. } => "fix",
        }
    }
}

/// Inbound state changes, from the background sources and from finished
/// mutations.
#[derive(Debug)]
pub enum Msg {
    Event(OrchestrationEvent),
    StreamEnded,
    Specs(Vec<SpecSummary>),
    Tasks(Vec<Task>),
    MutationDone {
        mutation: Mutation,
        result: CommandResult,
        /// Unresolved clarification count, reported by validate only.
        unresolved: Option<usize>,
    },
}

/// Work the runtime performs on the app's behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Mutate(Mutation),
    ExportLog,
}

// ---------------------------------------------------------------------------
// Toast
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Toast {
    pub text: String,
    pub success: bool,
    pub expires_at: Instant,
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

/// The single state store behind the dashboard. All mutation goes
/// through [`App::apply`], [`App::handle_key`], or the tick.
pub struct App {
    pub config: DashConfig,

    // Log slice
    pub log: LogBuffer,
    pub filter: LogFilter,
    pub filter_editing: bool,
    pub stream_ended: bool,

    // Pipeline slice
    pub specs: Vec<SpecSummary>,
    pub tasks: Vec<Task>,

    // Workflow slice
    pub selected_spec: usize,
    unresolved: HashMap<String, usize>,
    designed: HashSet<String>,
    tasked: HashSet<String>,
    pub busy: Option<Mutation>,
    pub command_slot: CommandSlot,

    // Chrome
    pub focus: Pane,
    pub toasts: Vec<Toast>,
    pub boundary: Boundary,
    pub terminal: TerminalPane,
    pub should_quit: bool,
}

impl App {
    pub fn new(config: DashConfig) -> Self {
        let log = LogBuffer::with_capacity(config.log_capacity);
        Self {
            config,
            log,
            filter: LogFilter::default(),
            filter_editing: false,
            stream_ended: false,
            specs: Vec::new(),
            tasks: Vec::new(),
            selected_spec: 0,
            unresolved: HashMap::new(),
            designed: HashSet::new(),
            tasked: HashSet::new(),
            busy: None,
            command_slot: CommandSlot::default(),
            focus: Pane::Log,
            toasts: Vec::new(),
            boundary: Boundary::new(),
            terminal: TerminalPane::new(),
            should_quit: false,
        }
    }

    // ── Derived views ────────────────────────────────────────────────────

    pub fn selected(&self) -> Option<&SpecSummary> {
        self.specs.get(self.selected_spec)
    }

    pub fn gate_inputs(&self) -> GateInputs {
        match self.selected() {
            Some(spec) => GateInputs {
                unresolved_clarifications: self
                    .unresolved
                    .get(&spec.name)
                    .copied()
                    .unwrap_or(0),
                has_design: self.designed.contains(&spec.name),
                has_tasks: spec.has_tasks || self.tasked.contains(&spec.name),
            },
            None => GateInputs::default(),
        }
    }

    pub fn gates(&self) -> Gates {
        Gates::derive(self.gate_inputs())
    }

    pub fn stages(&self) -> [StageReport; 4] {
        derive_stages(&self.specs, &self.tasks)
    }

    pub fn filtered_events(&self) -> Vec<&OrchestrationEvent> {
        self.log.filtered(&self.filter)
    }

    // ── Inbound messages ─────────────────────────────────────────────────

    pub fn apply(&mut self, msg: Msg) {
        match msg {
            Msg::Event(event) => {
                self.terminal.feed_event(&event);
                self.log.push(event);
            }
            Msg::StreamEnded => {
                self.stream_ended = true;
            }
            Msg::Specs(specs) => {
                self.specs = specs;
                if self.selected_spec >= self.specs.len() {
                    self.selected_spec = self.specs.len().saturating_sub(1);
                }
            }
            Msg::Tasks(tasks) => {
                self.tasks = tasks;
            }
            Msg::MutationDone {
                mutation,
                result,
                unresolved,
            } => self.finish_mutation(mutation, result, unresolved),
        }
    }

    /// Success flips the matching gate input; failure changes nothing —
    /// the gate stays enabled for a retry.
    fn finish_mutation(
        &mut self,
        mutation: Mutation,
        result: CommandResult,
        unresolved: Option<usize>,
    ) {
        if self.busy.as_ref() == Some(&mutation) {
            self.busy = None;
        }

        if result.success {
            match &mutation {
                Mutation::Validate { spec } => {
                    self.unresolved.insert(spec.clone(), unresolved.unwrap_or(0));
                }
                Mutation::GenerateDesign { spec } => {
                    self.designed.insert(spec.clone());
                }
                Mutation::GenerateTasks { spec } => {
                    self.tasked.insert(spec.clone());
                }
                Mutation::Fix { .. } => {}
            }
        } else if let Mutation::Validate { spec } = &mutation {
            // A completed validation that found clarifications is still
            // fresh gate input, unlike a transport-level failure.
            if let Some(n) = unresolved {
                self.unresolved.insert(spec.clone(), n);
            }
        }

        let text = result
            .message
            .clone()
            .unwrap_or_else(|| format!("{} finished", mutation.verb()));
        self.push_toast(text, result.success);
        self.command_slot.set(result);
    }

    pub fn push_toast(&mut self, text: impl Into<String>, success: bool) {
        self.toasts.push(Toast {
            text: text.into(),
            success,
            expires_at: Instant::now() + TOAST_TTL,
        });
    }

    pub fn tick(&mut self, now: Instant) {
        self.toasts.retain(|t| t.expires_at > now);
        self.terminal.tick();
    }

    // ── Key handling ─────────────────────────────────────────────────────

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Effect> {
        if self.filter_editing {
            self.handle_filter_key(key);
            return None;
        }

        // Boundary reset is available from anywhere while tripped.
        if self.boundary.is_failed() && key.code == KeyCode::Char('r') {
            self.boundary.reset();
            return None;
        }

        // Ctrl+Shift+C is the terminal pane's copy chord, but only while a
        // selection exists; without one (and for plain Ctrl+C) it quits.
        if key.modifiers.contains(KeyModifiers::CONTROL)
            && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C'))
        {
            let wants_copy =
                key.modifiers.contains(KeyModifiers::SHIFT) || key.code == KeyCode::Char('C');
            if wants_copy && self.terminal.has_selection() {
                self.terminal.copy_selection();
                return None;
            }
            self.should_quit = true;
            return None;
        }

        match key.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
                None
            }
            KeyCode::Tab => {
                self.focus = self.focus.next();
                None
            }
            KeyCode::Char('x') => {
                self.command_slot.clear();
                None
            }
            _ => match self.focus {
                Pane::Log => self.handle_log_key(key),
                Pane::Workflow => self.handle_workflow_key(key),
                Pane::Terminal => {
                    self.terminal.handle_key(key);
                    None
                }
                Pane::Pipeline => None,
            },
        }
    }

    fn handle_filter_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Enter => self.filter_editing = false,
            KeyCode::Backspace => {
                self.filter.query.pop();
            }
            KeyCode::Char(c) => self.filter.query.push(c),
            _ => {}
        }
    }

    fn handle_log_key(&mut self, key: KeyEvent) -> Option<Effect> {
        match key.code {
            KeyCode::Char('/') => {
                self.filter_editing = true;
                None
            }
            KeyCode::Char('k') => {
                self.filter.kind = next_kind(self.filter.kind);
                None
            }
            KeyCode::Char('c') => {
                self.log.clear();
                None
            }
            KeyCode::Char('e') => Some(Effect::ExportLog),
            _ => None,
        }
    }

    fn handle_workflow_key(&mut self, key: KeyEvent) -> Option<Effect> {
        match key.code {
            KeyCode::Up => {
                self.selected_spec = self.selected_spec.saturating_sub(1);
                None
            }
            KeyCode::Down => {
                if self.selected_spec + 1 < self.specs.len() {
                    self.selected_spec += 1;
                }
                None
            }
            KeyCode::Char('v') => {
                let spec = self.selected()?.name.clone();
                self.trigger(Mutation::Validate { spec })
            }
            KeyCode::Char('d') => {
                if !self.gates().can_design {
                    return None;
                }
                let spec = self.selected()?.name.clone();
                self.trigger(Mutation::GenerateDesign { spec })
            }
            KeyCode::Char('t') => {
                if !self.gates().can_generate_tasks {
                    return None;
                }
                let spec = self.selected()?.name.clone();
                self.trigger(Mutation::GenerateTasks { spec })
            }
            KeyCode::Char('f') => self.trigger(Mutation::Fix { check: false }),
            KeyCode::Char('F') => self.trigger(Mutation::Fix { check: true }),
            _ => None,
        }
    }

    /// One mutation in flight at a time; triggers while busy are ignored.
    fn trigger(&mut self, mutation: Mutation) -> Option<Effect> {
        if self.busy.is_some() {
            return None;
        }
        self.busy = Some(mutation.clone());
        Some(Effect::Mutate(mutation))
    }
}

/// all → step_start → … → log → all
fn next_kind(current: Option<EventKind>) -> Option<EventKind> {
    let all = EventKind::all();
    match current {
        None => Some(all[0]),
        Some(kind) => {
            let idx = all.iter().position(|k| *k == kind).unwrap_or(0);
            all.get(idx + 1).copied()
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app_with_spec(name: &str, has_tasks: bool) -> App {
        let mut app = App::new(DashConfig::default());
        app.apply(Msg::Specs(vec![SpecSummary {
            name: name.to_string(),
            path: format!("specs/{name}.md"),
            has_tasks,
            has_implementation: false,
            implementation_branch: None,
        }]));
        app.focus = Pane::Workflow;
        app
    }

    #[test]
    fn events_append_in_arrival_order() {
        let mut app = App::new(DashConfig::default());
        for i in 0..3 {
            app.apply(Msg::Event(OrchestrationEvent::new(
                EventKind::Log,
                format!("line {i}"),
            )));
        }
        assert_eq!(app.log.len(), 3);
        let shown = app.filtered_events();
        assert_eq!(shown[0].message, "line 0");
        assert_eq!(shown[2].message, "line 2");
    }

    #[test]
    fn design_gate_requires_resolved_clarifications() {
        let mut app = app_with_spec("auth", false);

        // Validation reports two unresolved clarifications.
        app.apply(Msg::MutationDone {
            mutation: Mutation::Validate {
                spec: "auth".into(),
            },
            result: CommandResult::failed("2 validation error(s)"),
            unresolved: Some(2),
        });

        let gates = app.gates();
        assert!(gates.needs_clarification);
        assert!(!gates.can_design);
        assert!(!gates.can_generate_tasks);

        // 'd' is a no-op while the design gate is disabled.
        assert_eq!(app.handle_key(key(KeyCode::Char('d'))), None);
    }

    #[test]
    fn design_success_flips_gate_and_enables_tasks() {
        let mut app = app_with_spec("auth", false);
        assert!(app.gates().can_design);

        let effect = app.handle_key(key(KeyCode::Char('d'))).unwrap();
        assert_eq!(
            effect,
            Effect::Mutate(Mutation::GenerateDesign {
                spec: "auth".into()
            })
        );
        assert!(app.busy.is_some());

        app.apply(Msg::MutationDone {
            mutation: Mutation::GenerateDesign {
                spec: "auth".into(),
            },
            result: CommandResult::ok("design generated"),
            unresolved: None,
        });

        assert!(app.busy.is_none());
        let gates = app.gates();
        assert!(!gates.can_design);
        assert!(gates.can_generate_tasks);
        assert!(app.command_slot.get().unwrap().success);
        assert_eq!(app.toasts.len(), 1);
        assert!(app.toasts[0].success);
    }

    #[test]
    fn failed_mutation_leaves_gates_unchanged() {
        let mut app = app_with_spec("auth", false);
        let before = app.gates();

        app.handle_key(key(KeyCode::Char('d'))).unwrap();
        app.apply(Msg::MutationDone {
            mutation: Mutation::GenerateDesign {
                spec: "auth".into(),
            },
            result: CommandResult::failed("engine unreachable"),
            unresolved: None,
        });

        assert_eq!(app.gates(), before);
        assert!(app.busy.is_none(), "gate is retriggerable after failure");
        assert!(!app.command_slot.get().unwrap().success);
        assert!(!app.toasts[0].success);
        // Retry goes through.
        assert!(app.handle_key(key(KeyCode::Char('d'))).is_some());
    }

    #[test]
    fn second_trigger_ignored_while_busy() {
        let mut app = app_with_spec("auth", false);
        assert!(app.handle_key(key(KeyCode::Char('v'))).is_some());
        assert_eq!(app.handle_key(key(KeyCode::Char('f'))), None);
    }

    #[test]
    fn tasks_gate_needs_design_without_tasks() {
        let mut app = app_with_spec("auth", true);
        app.apply(Msg::MutationDone {
            mutation: Mutation::GenerateDesign {
                spec: "auth".into(),
            },
            result: CommandResult::ok("design generated"),
            unresolved: None,
        });
        // Spec already has tasks: gate stays closed.
        assert!(!app.gates().can_generate_tasks);
        assert_eq!(app.handle_key(key(KeyCode::Char('t'))), None);
    }

    #[test]
    fn clear_empties_buffer_under_active_filter() {
        let mut app = App::new(DashConfig::default());
        app.apply(Msg::Event(OrchestrationEvent::new(EventKind::Error, "boom")));
        app.apply(Msg::Event(OrchestrationEvent::new(EventKind::Log, "ok")));
        app.filter.kind = Some(EventKind::Error);

        app.handle_key(key(KeyCode::Char('c')));
        assert!(app.log.is_empty());
        assert!(app.filtered_events().is_empty());
    }

    #[test]
    fn export_key_emits_effect() {
        let mut app = App::new(DashConfig::default());
        assert_eq!(
            app.handle_key(key(KeyCode::Char('e'))),
            Some(Effect::ExportLog)
        );
    }

    #[test]
    fn filter_editing_captures_text() {
        let mut app = App::new(DashConfig::default());
        app.handle_key(key(KeyCode::Char('/')));
        assert!(app.filter_editing);
        app.handle_key(key(KeyCode::Char('v')));
        app.handle_key(key(KeyCode::Char('e')));
        app.handle_key(key(KeyCode::Enter));
        assert!(!app.filter_editing);
        assert_eq!(app.filter.query, "ve");
    }

    #[test]
    fn kind_filter_cycles_through_all_and_back() {
        let mut app = App::new(DashConfig::default());
        let mut seen = Vec::new();
        for _ in 0..=EventKind::all().len() {
            app.handle_key(key(KeyCode::Char('k')));
            seen.push(app.filter.kind);
        }
        assert_eq!(seen.first(), Some(&Some(EventKind::StepStart)));
        assert_eq!(seen.last(), Some(&None));
    }

    #[test]
    fn toasts_expire_on_tick() {
        let mut app = App::new(DashConfig::default());
        app.push_toast("done", true);
        app.tick(Instant::now());
        assert_eq!(app.toasts.len(), 1);
        app.tick(Instant::now() + TOAST_TTL + Duration::from_millis(1));
        assert!(app.toasts.is_empty());
    }

    #[test]
    fn copy_chord_quits_without_selection_and_copies_with_one() {
        let chord = KeyEvent::new(
            KeyCode::Char('C'),
            KeyModifiers::CONTROL | KeyModifiers::SHIFT,
        );

        let mut app = App::new(DashConfig::default());
        app.handle_key(chord);
        assert!(app.should_quit, "no selection: chord behaves like Ctrl+C");

        let mut app = App::new(DashConfig::default());
        app.terminal
            .handle_key(KeyEvent::new(KeyCode::Up, KeyModifiers::SHIFT));
        assert!(app.terminal.has_selection());
        app.handle_key(chord);
        assert!(!app.should_quit, "selection: chord is the copy intercept");
    }

    #[test]
    fn stream_end_is_latched() {
        let mut app = App::new(DashConfig::default());
        assert!(!app.stream_ended);
        app.apply(Msg::StreamEnded);
        assert!(app.stream_ended);
    }
}
