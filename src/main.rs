//! brokerlink - Main entry point
//!
//! Loads the gateway configuration, brings up the connection registry with
//! its health monitor, and keeps the process alive until a shutdown signal.

use brokerlink::config::{ConnectionConfig, GatewayConfig};
use brokerlink::observability::init_default_logging;
use brokerlink::registry::ConnectionRegistry;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info, warn};

/// Multi-connection gateway for ActiveMQ-style brokers
#[derive(Parser)]
#[command(name = "brokerlink")]
#[command(about = "Multi-connection gateway for ActiveMQ-style brokers")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the gateway with the configured connections
    Run,
    /// Validate configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
    /// Probe one broker endpoint without registering it
    Test {
        /// Broker hostname
        #[arg(long)]
        host: String,
        /// Broker management port
        #[arg(long, default_value_t = brokerlink::config::DEFAULT_MANAGEMENT_PORT)]
        port: u16,
        /// Basic-auth username
        #[arg(long, env = "BROKER_USERNAME")]
        username: Option<String>,
        /// Basic-auth password
        #[arg(long, env = "BROKER_PASSWORD")]
        password: Option<String>,
        /// Use HTTPS
        #[arg(long)]
        ssl: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_default_logging();

    info!("Starting brokerlink v{}", env!("CARGO_PKG_VERSION"));

    let result = match cli.command {
        Commands::Run => {
            let config = load_configuration(&cli.config);
            run_gateway(config).await
        }
        Commands::Config { show } => {
            let config = load_configuration(&cli.config);
            handle_config_command(config, show)
        }
        Commands::Test {
            host,
            port,
            username,
            password,
            ssl,
        } => {
            let connection = ConnectionConfig {
                host,
                port,
                username,
                password,
                ssl,
                ..ConnectionConfig::new("placeholder")
            };
            handle_test_command(connection).await
        }
    };

    if let Err(e) = result {
        error!("Command failed: {}", e);
        process::exit(1);
    }

    info!("Application shutdown complete");
}

fn load_configuration(config_path: &Option<PathBuf>) -> GatewayConfig {
    let result = match config_path {
        Some(path) => {
            info!("Loading configuration from: {}", path.display());
            GatewayConfig::load_from_file(path)
        }
        None => {
            let default_paths = ["brokerlink.toml", "config/brokerlink.toml"];
            for path_str in default_paths {
                let path = PathBuf::from(path_str);
                if path.exists() {
                    info!("Loading configuration from: {}", path.display());
                    return match GatewayConfig::load_from_file(&path) {
                        Ok(config) => config,
                        Err(e) => {
                            error!("Failed to load configuration: {}", e);
                            process::exit(1);
                        }
                    };
                }
            }
            info!("No configuration file found, starting with an empty registry");
            return GatewayConfig::default();
        }
    };

    match result {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    }
}

async fn run_gateway(config: GatewayConfig) -> Result<(), Box<dyn std::error::Error>> {
    let interval = Duration::from_secs(config.gateway.health_check_interval_secs);
    let registry = Arc::new(ConnectionRegistry::with_health_interval(interval));

    // Bring up configured connections; a broker that is down at startup is
    // logged, not fatal.
    let mut ids: Vec<&String> = config.connections.keys().collect();
    ids.sort();
    for id in ids {
        let connection = config.connections[id].clone();
        if let Err(e) = registry.add_connection(id, connection).await {
            warn!(connection = %id, error = %e, "failed to establish configured connection");
        }
    }

    registry.start_health_monitor();
    info!(
        connections = registry.list_connections().await.len(),
        "gateway is running"
    );

    let mut sigint = signal::unix::signal(signal::unix::SignalKind::interrupt())?;
    let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())?;
    tokio::select! {
        _ = sigint.recv() => {
            info!("Received SIGINT, shutting down gracefully...");
        }
        _ = sigterm.recv() => {
            info!("Received SIGTERM, shutting down gracefully...");
        }
    }

    registry.disconnect_all().await;
    Ok(())
}

fn handle_config_command(
    config: GatewayConfig,
    show: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if show {
        println!("Current configuration:");
        println!("{}", toml::to_string_pretty(&config)?);
    }
    info!("Configuration validation complete");
    Ok(())
}

async fn handle_test_command(
    connection: ConnectionConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let registry = ConnectionRegistry::new();
    let report = registry.test_connection(connection).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    if !report.success {
        process::exit(1);
    }
    Ok(())
}
