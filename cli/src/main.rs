//! CLI entrypoint for council
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use council_application::{
    AgentResponder, ConversationLogger, ConversationStore, CouncilController,
    NoConversationLogger,
};
use council_infrastructure::{
    ConfigLoader, FileConfig, HttpAgentResponder, JsonFileConversationStore,
    JsonlConversationLogger, MemoryConversationStore, ResponderKind, ScriptedAgentResponder,
    StorageKind,
};
use council_presentation::{Cli, CouncilRepl};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Keep the guard alive so buffered log lines are flushed on exit
    let _log_guard = init_tracing(&cli);

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_deref());
        let config = load_config(&cli)?;
        println!();
        println!("{:#?}", config);
        return Ok(());
    }

    let config = load_config(&cli)?;
    config.validate().context("invalid configuration")?;

    info!(council = %config.council.id, agents = config.agents.len(), "Starting council");

    // === Dependency Injection ===
    let registry = Arc::new(config.agent_registry()?);
    if registry.is_empty() {
        warn!("No agents configured; add [[agents]] entries to your config");
    }

    let responder = build_responder(&config)?;
    let store = build_store(&config);
    let logger = build_logger(&cli, &config);

    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let controller = CouncilController::new(
        config.council_config(),
        Arc::clone(&registry),
        responder,
        store,
        logger,
        events_tx,
    );
    let handle = controller.spawn().await?;

    CouncilRepl::new(handle, registry)
        .with_progress(!cli.quiet)
        .run(events_rx)
        .await?;

    Ok(())
}

fn init_tracing(cli: &Cli) -> Option<WorkerGuard> {
    // Initialize logging based on verbosity level
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    match &cli.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "council.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .init();
            Some(guard)
        }
        None => {
            // stderr keeps log lines out of the REPL's stdout
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
            None
        }
    }
}

fn load_config(cli: &Cli) -> Result<FileConfig> {
    if cli.no_config {
        return Ok(ConfigLoader::load_defaults());
    }
    ConfigLoader::load(cli.config.as_deref())
        .map_err(|e| anyhow!("failed to load configuration: {}", e))
}

fn build_responder(config: &FileConfig) -> Result<Arc<dyn AgentResponder>> {
    let responder = &config.responder;
    match responder.kind {
        ResponderKind::Http => {
            let endpoint = responder
                .endpoint
                .clone()
                .ok_or_else(|| anyhow!("responder endpoint is not configured"))?;
            info!(endpoint = %endpoint, timeout = ?responder.timeout(), "Using HTTP responder");
            Ok(Arc::new(HttpAgentResponder::new(
                endpoint,
                responder.timeout(),
            )?))
        }
        ResponderKind::Scripted => match &responder.script {
            Some(path) => {
                info!(script = %path.display(), "Using scripted responder");
                Ok(Arc::new(ScriptedAgentResponder::load(path)?))
            }
            None => {
                warn!("Scripted responder has no script; every summon will fail");
                Ok(Arc::new(ScriptedAgentResponder::default()))
            }
        },
    }
}

fn build_store(config: &FileConfig) -> Arc<dyn ConversationStore> {
    match config.storage.kind {
        StorageKind::Memory => Arc::new(MemoryConversationStore::new()),
        StorageKind::Json => {
            let dir = config.storage.resolved_dir();
            info!(dir = %dir.display(), "Using JSON file store");
            Arc::new(JsonFileConversationStore::new(dir))
        }
    }
}

fn build_logger(cli: &Cli, config: &FileConfig) -> Arc<dyn ConversationLogger> {
    let path = cli
        .transcript
        .clone()
        .or_else(|| config.logging.transcript.clone());

    match path.and_then(JsonlConversationLogger::open) {
        Some(logger) => {
            info!(path = %logger.path().display(), "Writing transcript");
            Arc::new(logger)
        }
        None => Arc::new(NoConversationLogger),
    }
}
