//! Broker ledger binary
//!
//! `start` runs the ingestion gateway, the settlement worker, or both;
//! `validate` checks a configuration file; `init` writes one with defaults.

use anyhow::{Context, Result};
use cli::{Cli, Commands, StartArgs};
use config::{generate_default_config, load_config, save_config, validate_config, BrokerConfig};
use gateway::{create_router, GatewayState};
use observability::{init_logging, init_metrics, LogFormat};
use server::{HttpServer, Server, ServerConfig, ShutdownController};
use settlement::{IntervalTicker, SettlementWorker};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use storage::Database;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    match cli.command {
        Commands::Start(args) => start(args).await,
        Commands::Validate { config } => {
            init_logging("brokerd", LogFormat::Pretty, "info")?;
            validate_command(config)
        }
        Commands::Init { output } => {
            init_logging("brokerd", LogFormat::Pretty, "info")?;
            init_command(output)
        }
    }
}

async fn start(args: StartArgs) -> Result<()> {
    let mut config = load_config(&args.config)?;
    args.apply_overrides(&mut config)?;

    let format = LogFormat::parse(&config.logging.format).unwrap_or_default();
    init_logging(&config.service.name, format, &config.logging.level)?;

    let report = validate_config(&config);
    for warning in &report.warnings {
        warn!(field = %warning.field, message = %warning.message, "Configuration warning");
    }
    if !report.is_valid() {
        for err in &report.errors {
            error!("{}", err);
        }
        anyhow::bail!("Cannot start due to configuration errors");
    }

    info!(
        mode = args.mode.as_str(),
        db = %config.storage.path,
        worker = config.worker.enabled,
        gateway = config.gateway.enabled,
        "Starting broker ledger"
    );

    if config.metrics.enabled {
        init_metrics(config.metrics.port)?;
    }

    let db = Database::connect(&config.storage)
        .await
        .context("Failed to open database")?;
    db.run_migrations()
        .await
        .context("Failed to initialize database schema")?;

    let shutdown = ShutdownController::with_ctrl_c();
    let mut tasks = spawn_components(&config, &db, &shutdown);

    let mut failure = None;
    while let Some(joined) = tasks.join_next().await {
        let outcome = joined
            .context("Component task panicked")
            .and_then(|result| result);
        if let Err(e) = outcome {
            error!(error = %e, "Component stopped with an error, shutting down");
            shutdown.shutdown();
            failure.get_or_insert(e);
        }
    }

    db.close().await;
    info!("Shutdown complete");

    match failure {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

fn spawn_components(
    config: &BrokerConfig,
    db: &Database,
    shutdown: &ShutdownController,
) -> JoinSet<Result<()>> {
    let mut tasks = JoinSet::new();

    if config.worker.enabled {
        let worker = Arc::new(SettlementWorker::from_config(
            db.clone(),
            &config.worker,
            &config.settlement,
        ));
        let ticker = IntervalTicker::new(config.worker.poll_interval());
        let token = shutdown.child_token();
        tasks.spawn(async move {
            worker.run(ticker, token).await;
            Ok(())
        });
    }

    if config.gateway.enabled {
        let router = create_router(
            GatewayState::new(db.clone()),
            Duration::from_secs(config.gateway.request_timeout_seconds),
        );
        let server = HttpServer::new("gateway", ServerConfig::from_gateway(&config.gateway), router);
        let token = shutdown.child_token();
        tasks.spawn(async move {
            server.run(token).await.context("Gateway server failed")
        });
    }

    tasks
}

fn validate_command<P: AsRef<Path>>(config_path: P) -> Result<()> {
    info!(path = ?config_path.as_ref(), "Validating configuration");

    let config = load_config(&config_path)?;
    let report = validate_config(&config);

    println!("\n=== Configuration Validation Report ===\n");

    if !report.warnings.is_empty() {
        println!("Warnings ({}):", report.warnings.len());
        for warning in &report.warnings {
            println!("  [warn] [{}] {}", warning.field, warning.message);
        }
        println!();
    }

    if !report.errors.is_empty() {
        println!("Errors ({}):", report.errors.len());
        for err in &report.errors {
            println!("  [error] {}", err);
        }
        println!();
        anyhow::bail!("Configuration validation failed");
    }

    println!("[ok] Configuration is valid!");
    println!();
    println!("Service: {}", config.service.name);
    println!("Database: {}", config.storage.path);
    println!(
        "Worker: {} (every {}ms, formula {:?})",
        enabled(config.worker.enabled),
        config.worker.poll_interval_ms,
        config.settlement.formula
    );
    println!(
        "Gateway: {} ({})",
        enabled(config.gateway.enabled),
        config.gateway.address()
    );

    Ok(())
}

fn init_command<P: AsRef<Path>>(output_path: P) -> Result<()> {
    let output_path = output_path.as_ref();
    info!(?output_path, "Initializing new configuration file");

    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {:?}", parent))?;
    }

    save_config(&generate_default_config(), output_path)?;

    println!("[ok] Configuration file created: {:?}", output_path);
    println!();
    println!("Next steps:");
    println!("  1. Edit the database path and gateway address");
    println!("  2. Run 'brokerd validate --config {:?}'", output_path);
    println!("  3. Run 'brokerd start --config {:?}'", output_path);

    Ok(())
}

fn enabled(flag: bool) -> &'static str {
    if flag {
        "enabled"
    } else {
        "disabled"
    }
}
