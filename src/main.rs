use std::sync::Arc;

use clap::Parser;
use tracing::{debug, error};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use code_analysis_assistant::{
    backend::BackendClient,
    cli::{execute_command, Cli},
    config::{Config, LogFormat},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize logging
    init_logging(&config);

    debug!(
        version = env!("CARGO_PKG_VERSION"),
        base_url = %config.backend.base_url,
        "Code analysis assistant starting"
    );

    let client = match BackendClient::new(&config.backend, config.request.clone()) {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "Failed to initialize backend client");
            return Err(e.into());
        }
    };

    let result = execute_command(cli.command, Arc::new(client)).await;
    if result.exit_code == 0 {
        print!("{}", result.message);
    } else {
        eprintln!("{}", result.message);
    }
    std::process::exit(result.exit_code);
}

/// Initialize tracing/logging
fn init_logging(config: &Config) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}
