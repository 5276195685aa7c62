//! ggcoded - GGCODE compile gateway

use clap::Parser;
use ggcode_service::{GatewayConfig, GatewayError, Server};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// ggcoded CLI
#[derive(Parser)]
#[command(name = "ggcoded")]
#[command(about = "GGCODE compile gateway", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "GGCODE_CONFIG")]
    config: Option<String>,

    /// Listen address
    #[arg(short, long, env = "GGCODE_LISTEN_ADDR")]
    listen: Option<String>,

    /// Path to the compiler shared library
    #[arg(long, env = "GGCODE_LIBRARY")]
    library: Option<String>,

    /// Directory of example programs
    #[arg(long, env = "GGCODE_EXAMPLES_DIR")]
    examples_dir: Option<String>,

    /// Log level
    #[arg(long, env = "GGCODE_LOG_LEVEL")]
    log_level: Option<String>,

    /// Enable JSON logging
    #[arg(long, env = "GGCODE_LOG_JSON")]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = GatewayConfig::load(cli.config.as_deref())
        .map_err(|e| GatewayError::Config(e.to_string()))?;

    // Override with CLI args
    if let Some(listen) = &cli.listen {
        config.server.listen_addr = listen
            .parse()
            .map_err(|e| GatewayError::Config(format!("Invalid listen address: {}", e)))?;
    }
    if let Some(library) = cli.library {
        config.compiler.library_path = library.into();
    }
    if let Some(dir) = cli.examples_dir {
        config.catalog.directory = dir.into();
    }
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    config.logging.json |= cli.json;

    // Initialize tracing
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.logging.level.clone().into());

    if config.logging.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        library = %config.compiler.library_path.display(),
        "starting ggcoded"
    );

    let server = Server::new(config)?;
    server.run().await?;

    Ok(())
}
