use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use config::BrokerConfig;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "brokerd")]
#[command(about = "Broker ledger - trade ingestion and settlement")]
#[command(version = "0.1.0")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the gateway and/or the settlement worker
    Start(StartArgs),

    /// Validate configuration without starting anything
    Validate {
        /// Path to the configuration file
        #[arg(short, long, default_value = "master_config/broker.yaml")]
        config: PathBuf,
    },

    /// Write a configuration file with all defaults
    Init {
        /// Output path for the new configuration file
        #[arg(short, long, default_value = "broker.yaml")]
        output: PathBuf,
    },
}

#[derive(clap::Args, Debug, Clone)]
pub struct StartArgs {
    /// Which components run in this process
    #[arg(short, long, value_enum, default_value = "monolith")]
    pub mode: DeploymentMode,

    /// Path to the configuration file
    #[arg(short, long, default_value = "master_config/broker.yaml")]
    pub config: PathBuf,

    /// Override the SQLite database path
    #[arg(long, env = "BROKER_DB")]
    pub db: Option<String>,

    /// Override the gateway listen address (`PORT` or `HOST:PORT`)
    #[arg(long)]
    pub listen: Option<String>,

    /// Override the settlement poll interval in milliseconds
    #[arg(long)]
    pub poll_ms: Option<u64>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeploymentMode {
    /// Gateway and settlement worker in one process
    Monolith,

    /// Ingestion and stats endpoints only
    Gateway,

    /// Settlement worker only
    Worker,
}

impl DeploymentMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeploymentMode::Monolith => "monolith",
            DeploymentMode::Gateway => "gateway",
            DeploymentMode::Worker => "worker",
        }
    }
}

impl StartArgs {
    /// Layer command-line overrides on top of the file configuration.
    pub fn apply_overrides(&self, config: &mut BrokerConfig) -> Result<()> {
        match self.mode {
            DeploymentMode::Monolith => {}
            DeploymentMode::Gateway => config.worker.enabled = false,
            DeploymentMode::Worker => config.gateway.enabled = false,
        }

        if let Some(db) = &self.db {
            config.storage.path = db.clone();
        }

        if let Some(listen) = &self.listen {
            let (host, port) = parse_listen(listen)?;
            if let Some(host) = host {
                config.gateway.host = host;
            }
            config.gateway.port = port;
        }

        if let Some(poll_ms) = self.poll_ms {
            config.worker.poll_interval_ms = poll_ms;
        }

        Ok(())
    }
}

/// `8080`, `:8080` or `127.0.0.1:8080`
fn parse_listen(listen: &str) -> Result<(Option<String>, u16)> {
    let (host, port) = match listen.rsplit_once(':') {
        Some((host, port)) => (Some(host), port),
        None => (None, listen),
    };

    let port: u16 = port
        .parse()
        .with_context(|| format!("Invalid listen port in '{}'", listen))?;

    match host {
        Some("") | None => Ok((None, port)),
        Some(host) if host.contains(':') => bail!("Invalid listen host in '{}'", listen),
        Some(host) => Ok((Some(host.to_string()), port)),
    }
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
