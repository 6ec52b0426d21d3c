#![forbid(unsafe_code)]

mod burndown;
mod commit;
mod config;
mod constants;
mod error;
mod fields;
mod gateway;
mod hydration;
mod options;
mod reducer;
mod session;
mod surface;
mod working;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::{Level as TraceLevel, info, warn};
use tracing_subscriber::FmtSubscriber;

use burndown::BurndownSettings;
use commit::CommitController;
use config::AppSettings;
use fields::{Field, encode_bool};
use gateway::{FileGateway, MemoryGateway, Scope, StorageGateway, Visibility};
use options::BoardCatalog;
use reducer::FieldChangeEvent;
use session::ConfigSession;
use surface::ConsolePanel;

/// Board-scoped configuration for the sprint burndown chart
#[derive(Debug, Parser)]
#[command(name = "sprint-burndown-config", version, about)]
struct Cli {
    /// Board whose shared configuration is edited
    #[arg(long, global = true, default_value = constants::config::DEFAULT_BOARD_ID)]
    board: String,

    /// Directory holding board records (overrides the settings file)
    #[arg(long, global = true)]
    storage_dir: Option<PathBuf>,

    /// Board data JSON (lists, members, cards) used to offer choices
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Delay in milliseconds before the panel closes after a save
    #[arg(long, global = true)]
    delay_ms: Option<u64>,

    /// Settings file (defaults to the user config directory)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Work on an in-memory copy of the board record; nothing is written
    #[arg(long, global = true)]
    dry_run: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Open the configuration panel and show its current state
    Open,
    /// Print the persisted shared record
    Show {
        /// Decode values into their native types
        #[arg(long)]
        typed: bool,
    },
    /// Replace a single-value field, then save
    Set { field: String, value: String },
    /// Replace the whole selection of a multi-value field, then save
    Select { field: String, ids: Vec<String> },
    /// Add one id to a multi-value field, then save
    Add { field: String, id: String },
    /// Remove one id from a multi-value field, then save
    Remove { field: String, id: String },
    /// Show or hide team size on the chart, then save
    ToggleTeamSize { state: Toggle },
    /// Delete every persisted shared field
    Clear,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Toggle {
    On,
    Off,
}

impl Command {
    /// The widget change a command stands for, if it edits a field
    fn field_change(&self) -> Option<FieldChangeEvent> {
        match self {
            // A single value given for a list field selects just that id
            Command::Set { field, value } if fields::is_multi_valued(field) => {
                Some(FieldChangeEvent::replace_set(field, [value.clone()]))
            }
            Command::Set { field, value } => Some(FieldChangeEvent::replace_scalar(field, value)),
            Command::Select { field, ids } => Some(FieldChangeEvent::replace_set(field, ids.iter().cloned())),
            Command::Add { field, id } => Some(FieldChangeEvent::add_to_set(field, id)),
            Command::Remove { field, id } => Some(FieldChangeEvent::remove_from_set(field, id)),
            Command::ToggleTeamSize { state } => Some(FieldChangeEvent::replace_scalar(
                Field::IsShowTeamSize.name(),
                encode_bool(matches!(state, Toggle::On)),
            )),
            Command::Open | Command::Show { .. } | Command::Clear => None,
        }
    }
}

fn init_logging(configured: &str) -> Result<()> {
    // LOG_LEVEL wins over the settings file
    let log_level = match std::env::var("LOG_LEVEL")
        .unwrap_or_else(|_| configured.to_string())
        .to_lowercase()
        .as_str()
    {
        "trace" => TraceLevel::TRACE,
        "debug" => TraceLevel::DEBUG,
        "warn" => TraceLevel::WARN,
        "error" => TraceLevel::ERROR,
        _ => TraceLevel::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber).context("Failed to install log subscriber")
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = match &cli.settings {
        Some(path) => AppSettings::load_from(path)?,
        None => AppSettings::load()?,
    };
    init_logging(&settings.log_level)?;

    let storage_dir = cli.storage_dir.clone().unwrap_or_else(|| settings.storage_dir());
    let gateway = FileGateway::new(&storage_dir, &cli.board)
        .with_context(|| format!("Failed to open storage for board '{}'", cli.board))?;
    info!(board = %cli.board, path = %gateway.path().display(), "Using board storage");

    if let Command::Show { typed } = cli.command {
        let record = gateway
            .get_all(Scope::Board, Visibility::Shared)
            .await
            .context("Failed to read shared record")?;
        if typed {
            let (decoded, malformed) = BurndownSettings::from_record(&record);
            for bad in &malformed {
                warn!(field = %bad.field, raw = %bad.raw, "Malformed stored value");
            }
            println!("{decoded:#?}");
        } else {
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        return Ok(());
    }

    if cli.dry_run {
        let record = gateway
            .get_all(Scope::Board, Visibility::Shared)
            .await
            .context("Failed to read shared record")?;
        let memory = MemoryGateway::with_shared(record);
        run_session(&cli, &settings, memory).await
    } else {
        run_session(&cli, &settings, gateway).await
    }
}

/// Open the panel, apply the command and commit it
async fn run_session<G: StorageGateway>(cli: &Cli, settings: &AppSettings, gateway: G) -> Result<()> {
    let delay = cli
        .delay_ms
        .map(std::time::Duration::from_millis)
        .unwrap_or_else(|| settings.save_confirm_delay());
    let commit = CommitController::new(delay, settings.confirmation_duration());

    let mut session = ConfigSession::new(gateway, ConsolePanel::new(), commit);
    if let Some(path) = &cli.catalog {
        session = session.with_catalog(BoardCatalog::load(path)?);
    }

    let hydration = session.open_panel().await?;
    for failure in &hydration.failures {
        warn!(error = %failure, "Field could not be loaded");
    }

    match &cli.command {
        Command::Open => {
            print!("{}", session.panel().render());
        }
        Command::Clear => {
            let removed = session.clear().await?;
            println!("Removed {} field(s): {}", removed.len(), removed.join(", "));
            if session.panel().reload_requested() {
                println!("Configuration view reset");
            }
        }
        command => {
            if let Some(event) = command.field_change() {
                session.on_field_change(&event)?;
            }
            print!("{}", session.panel().render());
            if let Err(err) = session.save().await {
                if err.is_retryable() {
                    warn!("Nothing was written; the same command can be retried");
                }
                return Err(err.into());
            }
            if session.panel().is_closed() {
                println!("Configuration panel closed");
            }
        }
    }

    for alert in session.panel().alerts() {
        println!("[{}] {}", alert.display, alert.message);
    }
    if cli.dry_run {
        let record = session.gateway().get_all(Scope::Board, Visibility::Shared).await?;
        println!("{}", serde_json::to_string_pretty(&record)?);
    }
    info!(state = session.state().as_str(), fields = session.working().len(), "Session finished");
    Ok(())
}
