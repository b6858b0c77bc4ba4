use clap::{Parser, Subcommand};
use rolling_file::{BasicRollingFileAppender, RollingConditionBasic};
use std::io::Write;
use std::sync::Arc;
use tether_cli::commands;
use tether_cli::readline;
use tether_cli::state::HarnessState;
use tether_core::EngineConfig;
use tokio::sync::RwLock;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), String> {
    let _log_guard = init_logging();

    let config = EngineConfig::load();
    let state = Arc::new(RwLock::new(HarnessState::new(config)));

    loop {
        let line = readline()?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match respond(line, Arc::clone(&state)).await {
            Ok(quit) => {
                if quit {
                    break;
                }
            }
            Err(err) => {
                write!(std::io::stdout(), "{err}").map_err(|e| e.to_string())?;
                std::io::stdout().flush().map_err(|e| e.to_string())?;
            }
        }
    }

    Ok(())
}

fn init_logging() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    match log_file_appender() {
        Ok(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(writer)
                        .with_ansi(false),
                )
                .init();
            Some(guard)
        }
        Err(err) => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
            tracing::warn!("file logging disabled: {err}");
            None
        }
    }
}

fn log_file_appender() -> std::io::Result<BasicRollingFileAppender> {
    let dir = dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("tether")
        .join("logs");
    std::fs::create_dir_all(&dir)?;
    BasicRollingFileAppender::new(
        dir.join("tether-cli.log"),
        RollingConditionBasic::new().max_size(2 * 1024 * 1024),
        2,
    )
}

#[derive(Parser)]
#[command(version, about = "cli")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Sync the canned server snapshot (on-connect path)
    Connect,
    /// Clear every cache and revert presentation (on-logout path)
    Disconnect,
    /// Apply a catalog item
    Add {
        #[arg(short, long)]
        item: String,
        #[arg(short, long, default_value_t = 0, allow_hyphen_values = true)]
        layer: i8,
        #[arg(short, long)]
        by: Option<String>,
    },
    /// Remove a catalog item
    Remove {
        #[arg(short, long)]
        item: String,
        #[arg(short, long, default_value_t = 0, allow_hyphen_values = true)]
        layer: i8,
    },
    /// Fake an external change and deliver the change notification
    Tamper {
        #[arg(short, long)]
        target: String,
    },
    /// Print the engine's resolved state and the dry-run subsystems
    State,
    /// Print the provenance audit trail
    Audit,
    /// List catalog items
    Items,
    Config,
    Exit,
}

async fn respond(line: &str, state: Arc<RwLock<HarnessState>>) -> Result<bool, String> {
    let mut args = shlex::split(line).ok_or("error: Invalid quoting")?;
    args.insert(0, "tether".to_string());
    let cli = Cli::try_parse_from(args).map_err(|e| e.to_string())?;

    match &cli.command {
        Some(Commands::Connect) => commands::connect(Arc::clone(&state)).await?,
        Some(Commands::Disconnect) => commands::disconnect(Arc::clone(&state)).await?,
        Some(Commands::Add { item, layer, by }) => {
            commands::add_item(Arc::clone(&state), item, *layer, by.as_deref()).await?
        }
        Some(Commands::Remove { item, layer }) => {
            commands::remove_item(Arc::clone(&state), item, *layer).await?
        }
        Some(Commands::Tamper { target }) => commands::tamper(Arc::clone(&state), target).await?,
        Some(Commands::State) => commands::show_state(Arc::clone(&state)).await?,
        Some(Commands::Audit) => commands::show_audit(Arc::clone(&state)).await?,
        Some(Commands::Items) => commands::list_items(),
        Some(Commands::Config) => commands::show_settings(Arc::clone(&state)).await?,
        Some(Commands::Exit) => {
            commands::exit();
            return Ok(true);
        }
        None => {}
    }
    Ok(false)
}
