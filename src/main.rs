//! Guidepost - Main entry point
//!
//! Launches the operations console with its guided tours, or runs one of the
//! catalog and state maintenance commands.

use anyhow::{Context, Result};
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use guidepost::app::App;
use guidepost::cli::{Cli, Commands, FlowCommands};
use guidepost::components::tour_menu;
use guidepost::config::EngineConfig;
use guidepost::engine::controller::TourEngine;
use guidepost::engine::placement;
use guidepost::engine::storage::{CompletionStore, JsonFileStore, MemoryStore};
use guidepost::flows::FlowRegistry;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::collections::BTreeSet;
use std::fs::OpenOptions;
use std::io::stdout;
use std::sync::{Arc, Mutex};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

/// Initialize the logger. The interactive console logs to a file so the
/// terminal UI is not overwritten; every other command logs to stderr.
fn init_logger(cli: &Cli) -> Result<()> {
    // RUST_LOG overrides the default level
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if cli.is_interactive() {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&cli.log_file)
            .with_context(|| format!("Failed to open log file {:?}", cli.log_file))?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
    Ok(())
}

/// Config file values with command-line overrides applied
fn load_config(cli: &Cli) -> Result<EngineConfig> {
    let mut config = match &cli.config {
        Some(path) => EngineConfig::load_from_file(path)?,
        None => EngineConfig::default(),
    };
    if let Some(path) = &cli.state_file {
        config.state_file = Some(path.clone());
    }
    if let Some(path) = &cli.flows {
        config.flows_file = Some(path.clone());
    }
    if cli.ephemeral {
        config.state_file = None;
    }
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn load_registry(config: &EngineConfig) -> Result<FlowRegistry> {
    match &config.flows_file {
        Some(path) => FlowRegistry::load_from_file(path)
            .with_context(|| format!("Failed to load flow catalog {:?}", path)),
        None => Ok(FlowRegistry::builtin()),
    }
}

fn open_store(config: &EngineConfig) -> Box<dyn CompletionStore> {
    match &config.state_file {
        Some(path) => Box::new(JsonFileStore::new(path)),
        None => Box::new(MemoryStore::new()),
    }
}

/// Main application entry point
fn main() -> Result<()> {
    let cli = Cli::parse_args();
    init_logger(&cli)?;
    info!("Guidepost starting up");

    let config = load_config(&cli)?;
    debug!("Configuration loaded: {:?}", config);

    match &cli.command {
        None | Some(Commands::Run) => run_console(config),
        Some(Commands::Flows { action }) => run_flows_command(action, &config),
        Some(Commands::Status) => print_status(&config),
        Some(Commands::Reset) => reset_completed(&config),
        Some(Commands::Place {
            target,
            callout,
            viewport,
            side,
        }) => {
            let position =
                placement::calculate(*target, *callout, *side, *viewport, &config.placement);
            println!("{}", serde_json::to_string_pretty(&position)?);
            Ok(())
        }
    }
}

/// Run the interactive console
fn run_console(config: EngineConfig) -> Result<()> {
    let registry = Arc::new(load_registry(&config)?);
    let store = open_store(&config);
    info!("Completion state: {}", store.describe());
    let engine = TourEngine::new(registry, store, &config);
    let mut app = App::new(engine, config);

    enable_raw_mode().context("Failed to enable raw mode")?;
    crossterm::execute!(stdout(), EnterAlternateScreen, EnableMouseCapture)
        .context("Failed to enter alternate screen")?;

    let result = Terminal::new(CrosstermBackend::new(stdout()))
        .context("Failed to create terminal")
        .and_then(|mut terminal| {
            let result = app.run(&mut terminal).map_err(anyhow::Error::from);
            let _ = terminal.show_cursor();
            result
        });

    // Cleanup terminal (always attempt cleanup, even if app failed)
    let _ = disable_raw_mode();
    let _ = crossterm::execute!(stdout(), LeaveAlternateScreen, DisableMouseCapture);

    if let Err(e) = &result {
        error!("Console exited with error: {:#}", e);
    }
    result
}

fn run_flows_command(action: &FlowCommands, config: &EngineConfig) -> Result<()> {
    match action {
        FlowCommands::List => {
            let registry = load_registry(config)?;
            println!("{:<18} {:<8} {:<12} {:>5}", "FLOW", "KIND", "TRIGGER", "STEPS");
            for flow in registry.iter() {
                println!(
                    "{:<18} {:<8} {:<12} {:>5}",
                    flow.id,
                    flow.kind().to_string(),
                    flow.trigger_route.as_deref().unwrap_or("-"),
                    flow.len()
                );
            }
        }
        FlowCommands::Validate { path } => match FlowRegistry::load_from_file(path) {
            Ok(registry) => {
                info!("Flow catalog validation successful");
                println!("✓ Flow catalog is valid: {} flows in {:?}", registry.len(), path);
            }
            Err(e) => {
                error!("Flow catalog validation failed: {}", e);
                eprintln!("✗ Flow catalog validation failed: {}", e);
                std::process::exit(1);
            }
        },
        FlowCommands::Export { path } => {
            let registry = load_registry(config)?;
            registry
                .save_to_file(path)
                .with_context(|| format!("Failed to export flow catalog to {:?}", path))?;
            println!("✓ Exported {} flows to {:?}", registry.len(), path);
        }
    }
    Ok(())
}

fn print_status(config: &EngineConfig) -> Result<()> {
    let registry = Arc::new(load_registry(config)?);
    let store = open_store(config);
    println!("Completion state: {}", store.describe());
    let engine = TourEngine::new(registry, store, config);
    for entry in tour_menu::entries(&engine) {
        println!("{:<18} {}", entry.flow_id, entry.status);
    }
    Ok(())
}

fn reset_completed(config: &EngineConfig) -> Result<()> {
    let mut store = open_store(config);
    store
        .save(&BTreeSet::new())
        .with_context(|| format!("Failed to reset {}", store.describe()))?;
    println!("✓ Completion tracking reset ({})", store.describe());
    Ok(())
}
