use std::net::SocketAddr;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use peergate::api::{create_router, AppState};
use peergate::config::{LoggingConfig, PolicyConfig};
use peergate::engine::Engine;
use peergate::error::{EngineError, Result};
use peergate::settlement::LogSettlement;
use peergate::store::InMemoryHistoryStore;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[derive(Parser)]
#[command(name = "peergate", version, about = "P2P trade decision engine")]
struct Cli {
    /// Configuration directory (expects <dir>/default.toml)
    #[arg(short, long, env = "PEERGATE_CONFIG", default_value = "config")]
    config: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP decision service
    Serve {
        /// Listen port; overrides the config file
        #[arg(short, long, env = "PEERGATE_PORT")]
        port: Option<u16>,
    },
    /// Validate the policy configuration and exit
    CheckConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Serve { port: None }) {
        Commands::Serve { port } => {
            let config = match PolicyConfig::load_from(&cli.config) {
                Ok(c) => c,
                Err(e) => {
                    eprintln!(
                        "Warning: could not load config from {}: {}; using built-in defaults",
                        cli.config, e
                    );
                    PolicyConfig::default()
                }
            };
            init_logging(&config.logging);
            run_server(config, port).await
        }
        Commands::CheckConfig => {
            init_logging_simple();
            let config = PolicyConfig::load_from(&cli.config)?;
            check_config(&config)
        }
    }
}

async fn run_server(config: PolicyConfig, port_override: Option<u16>) -> Result<()> {
    if let Err(errors) = config.validate() {
        for e in &errors {
            error!("config: {}", e);
        }
        return Err(EngineError::ConfigInvalid(format!(
            "{} invalid setting(s)",
            errors.len()
        )));
    }

    let port = port_override.or(config.api_port).unwrap_or(8080);
    let engine = Arc::new(Engine::new(
        config,
        Arc::new(InMemoryHistoryStore::new()),
        Arc::new(LogSettlement),
    ));
    let app = create_router(AppState::new(engine));

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Starting decision API on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| EngineError::Internal(format!("API server error: {}", e)))?;

    info!("Shutdown complete");
    Ok(())
}

fn check_config(config: &PolicyConfig) -> Result<()> {
    match config.validate() {
        Ok(()) => {
            println!(
                "Configuration OK: {} payment methods, port {}",
                config.payment_methods.len(),
                config.api_port.unwrap_or(8080)
            );
            Ok(())
        }
        Err(errors) => {
            eprintln!("Configuration invalid:");
            for e in &errors {
                eprintln!("  - {}", e);
            }
            Err(EngineError::ConfigInvalid(format!(
                "{} invalid setting(s)",
                errors.len()
            )))
        }
    }
}

fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},peergate=debug", logging.level)));

    // Check if we should write to file (prefer PEERGATE_LOG_DIR, fallback to LOG_DIR).
    let log_dir = std::env::var("PEERGATE_LOG_DIR")
        .or_else(|_| std::env::var("LOG_DIR"))
        .unwrap_or_else(|_| "/var/log/peergate".to_string());

    // `tracing_appender::rolling::daily` panics if it can't create the initial
    // log file, and this binary aborts on panic. Preflight writability first.
    let file_layer = if std::fs::create_dir_all(&log_dir).is_ok() {
        let test_path = std::path::Path::new(&log_dir).join(".peergate_write_test");
        match std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&test_path)
        {
            Ok(_) => {
                let _ = std::fs::remove_file(&test_path);

                // Daily rotating file appender
                let file_appender = tracing_appender::rolling::daily(&log_dir, "peergate.log");
                let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

                // The flush guard must outlive main; leak it for the process lifetime
                Box::leak(Box::new(guard));

                Some(
                    tracing_subscriber::fmt::layer()
                        .with_writer(non_blocking)
                        .with_ansi(false)
                        .with_target(true),
                )
            }
            Err(e) => {
                eprintln!(
                    "Warning: Could not write to log directory {} ({}), file logging disabled",
                    log_dir, e
                );
                None
            }
        }
    } else {
        eprintln!(
            "Warning: Could not create log directory {}, file logging disabled",
            log_dir
        );
        None
    };

    // Console layer; JSON output when the config asks for it
    let console_layer = if logging.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .boxed()
    };

    let file_logging_enabled = file_layer.is_some();
    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    if file_logging_enabled {
        eprintln!("Logging to: {}/peergate.log", log_dir);
    }
}

fn init_logging_simple() {
    // Minimal logging for CLI commands
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .try_init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => error!("Failed to install SIGTERM handler: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
