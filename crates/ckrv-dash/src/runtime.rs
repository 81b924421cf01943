use std::io::Stdout;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crossterm::event::{Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use futures::StreamExt;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio::sync::mpsc;

use ckrv_client::{spawn_specs_poller, spawn_tasks_poller, ApiClient, EventStream};
use ckrv_core::command::CommandResult;
use ckrv_core::config::DashConfig;

use crate::app::{App, Effect, Msg, Mutation};
use crate::{export, ui};

type Term = Terminal<CrosstermBackend<Stdout>>;

// ---------------------------------------------------------------------------
// Entry
// ---------------------------------------------------------------------------

/// Run the dashboard against the engine named in `config`, with `root`
/// as the destination for log exports. Returns when the user quits.
pub async fn run(root: PathBuf, config: DashConfig) -> anyhow::Result<()> {
    enable_raw_mode()?;
    let mut terminal = match setup_terminal() {
        Ok(t) => t,
        Err(e) => {
            // Raw mode is already on; undo it before surfacing the error.
            let _ = disable_raw_mode();
            return Err(e);
        }
    };

    let result = run_loop(&mut terminal, root, config).await;

    // Teardown is best-effort on every exit path; a failing restore must
    // not mask the loop's own error.
    if let Err(e) = disable_raw_mode() {
        tracing::warn!("failed to disable raw mode: {e}");
    }
    if let Err(e) = execute!(terminal.backend_mut(), LeaveAlternateScreen) {
        tracing::warn!("failed to leave alternate screen: {e}");
    }
    if let Err(e) = terminal.show_cursor() {
        tracing::warn!("failed to restore cursor: {e}");
    }

    result
}

fn setup_terminal() -> anyhow::Result<Term> {
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    Ok(Terminal::new(CrosstermBackend::new(std::io::stdout()))?)
}

// ---------------------------------------------------------------------------
// Event loop
// ---------------------------------------------------------------------------

async fn run_loop(terminal: &mut Term, root: PathBuf, config: DashConfig) -> anyhow::Result<()> {
    let api = ApiClient::new(&config.server_url);
    let mut app = App::new(config.clone());

    // Background sources. Pollers abort when dropped at the end of this
    // function; the event stream task ends when `events` drops.
    let specs_poller = spawn_specs_poller(api.clone(), Duration::from_secs(config.specs_poll_secs));
    let tasks_poller = spawn_tasks_poller(api.clone(), Duration::from_secs(config.tasks_poll_secs));
    let mut specs_rx = specs_poller.subscribe();
    let mut tasks_rx = tasks_poller.subscribe();

    let mut events = match EventStream::connect(api.http_client(), api.base_url()).await {
        Ok(stream) => Some(stream),
        Err(e) => {
            tracing::warn!("event stream unavailable: {e}");
            app.push_toast(format!("event stream unavailable: {e}"), false);
            app.apply(Msg::StreamEnded);
            None
        }
    };

    let (msg_tx, mut msg_rx) = mpsc::unbounded_channel::<Msg>();
    let mut term_events = crossterm::event::EventStream::new();
    let mut ticker = tokio::time::interval(Duration::from_millis(200));

    loop {
        terminal.draw(|frame| ui::draw(frame, &mut app))?;
        if app.should_quit {
            break;
        }

        let effect = tokio::select! {
            maybe = term_events.next() => match maybe {
                Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                    app.handle_key(key)
                }
                Some(Ok(_)) => None, // resize redraws on the next pass
                Some(Err(e)) => return Err(e.into()),
                None => break,
            },
            maybe = next_event(&mut events) => {
                match maybe {
                    Some(event) => app.apply(Msg::Event(event)),
                    None => {
                        app.apply(Msg::StreamEnded);
                        events = None;
                    }
                }
                None
            }
            changed = specs_rx.changed() => {
                if changed.is_ok() {
                    let specs = specs_rx.borrow_and_update().clone();
                    app.apply(Msg::Specs(specs));
                }
                None
            }
            changed = tasks_rx.changed() => {
                if changed.is_ok() {
                    let tasks = tasks_rx.borrow_and_update().clone();
                    app.apply(Msg::Tasks(tasks));
                }
                None
            }
            Some(msg) = msg_rx.recv() => {
                app.apply(msg);
                None
            }
            _ = ticker.tick() => {
                app.tick(Instant::now());
                None
            }
        };

        if let Some(effect) = effect {
            perform(effect, &api, &msg_tx, &root, &mut app);
        }
    }

    Ok(())
}

async fn next_event(
    events: &mut Option<EventStream>,
) -> Option<ckrv_core::event::OrchestrationEvent> {
    match events {
        Some(stream) => stream.next().await,
        None => std::future::pending().await,
    }
}

// ---------------------------------------------------------------------------
// Effects
// ---------------------------------------------------------------------------

fn perform(
    effect: Effect,
    api: &ApiClient,
    msg_tx: &mpsc::UnboundedSender<Msg>,
    root: &std::path::Path,
    app: &mut App,
) {
    match effect {
        Effect::Mutate(mutation) => spawn_mutation(api.clone(), mutation, msg_tx.clone()),
        Effect::ExportLog => match export::write_export(root, app.filtered_events()) {
            Ok(path) => app.push_toast(format!("exported to {}", path.display()), true),
            Err(e) => app.push_toast(format!("export failed: {e}"), false),
        },
    }
}

/// Run one mutation to completion off the UI loop and report back as a
/// message. Transport errors become failed results; the app never sees
/// an `Err`.
fn spawn_mutation(api: ApiClient, mutation: Mutation, tx: mpsc::UnboundedSender<Msg>) {
    tokio::spawn(async move {
        let (result, unresolved) = match &mutation {
            Mutation::Validate { spec } => match api.validate_spec(spec).await {
                Ok(report) => {
                    let unresolved = report.errors.len();
                    (report.into_result(), Some(unresolved))
                }
                Err(e) => (CommandResult::failed(e.to_string()), None),
            },
            Mutation::GenerateDesign { spec } => match api.generate_design(spec).await {
                Ok(result) => (result, None),
                Err(e) => (CommandResult::failed(e.to_string()), None),
            },
            Mutation::GenerateTasks { spec } => match api.generate_tasks(spec).await {
                Ok(result) => (result, None),
                Err(e) => (CommandResult::failed(e.to_string()), None),
            },
            Mutation::Fix { check } => match api.fix(*check).await {
                Ok(result) => (result, None),
                Err(e) => (CommandResult::failed(e.to_string()), None),
            },
        };
        let _ = tx.send(Msg::MutationDone {
            mutation,
            result,
            unresolved,
        });
    });
}
