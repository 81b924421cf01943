mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use ckrv_core::config::DashConfig;

#[derive(Parser)]
#[command(
    name = "ckrv-dash",
    about = "Terminal dashboard for ckrv orchestration runs",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .ckrv/ or .git/)
    #[arg(long, global = true, env = "CKRV_ROOT")]
    root: Option<PathBuf>,

    /// Engine API base URL (overrides .ckrv/dash.yaml)
    #[arg(long, global = true, env = "CKRV_URL")]
    url: Option<String>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    /// Append tracing output to this file instead of stderr
    #[arg(long, global = true, value_name = "PATH")]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the dashboard (the default when no subcommand is given)
    Dash,

    /// One-shot pipeline status from the engine's list endpoints
    Status,

    /// Tail the event stream to stdout
    Events {
        /// Stop after this many events
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Ask the engine to fix outstanding issues
    Fix {
        /// Report what would change without applying it
        #[arg(long)]
        check: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    // The dashboard owns the screen, so without a log file tracing stays
    // quiet there. With --log-file (or for headless commands) the
    // default is INFO.
    let default_level = match (&cli.command, &cli.log_file) {
        (None | Some(Commands::Dash), None) => tracing::Level::WARN,
        _ => tracing::Level::INFO,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false);

    match &cli.log_file {
        Some(path) => {
            let file = match std::fs::OpenOptions::new().create(true).append(true).open(path) {
                Ok(f) => f,
                Err(e) => {
                    eprintln!("error: opening log file {}: {e}", path.display());
                    std::process::exit(1);
                }
            };
            subscriber.with_writer(std::sync::Arc::new(file)).init();
        }
        None => subscriber.with_writer(std::io::stderr).init(),
    }

    let root = root::resolve_root(cli.root.as_deref());

    let result = load_config(&root, cli.url).and_then(|config| match cli.command {
        None | Some(Commands::Dash) => cmd::dash::run(&root, config),
        Some(Commands::Status) => cmd::status::run(&config, cli.json),
        Some(Commands::Events { limit }) => cmd::events::run(&config, limit, cli.json),
        Some(Commands::Fix { check }) => cmd::fix::run(&config, check, cli.json),
    });

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn load_config(root: &std::path::Path, url: Option<String>) -> anyhow::Result<DashConfig> {
    let mut config = DashConfig::load(root)?;
    if let Some(url) = url {
        config.server_url = url;
    }
    Ok(config)
}
