//! Server setup and lifecycle management

use crate::api::{create_router, AppState};
use crate::config::{CompilerConfig, GatewayConfig};
use crate::error::{GatewayError, GatewayResult};
use ggcode_core::{
    CompilerBackend, CompilerBridge, ExampleCatalog, NativeCompiler, UnavailableCompiler,
};
use std::sync::Arc;
use tokio::net::TcpListener;

/// GGCODE gateway server
pub struct Server {
    config: GatewayConfig,
    bridge: Arc<CompilerBridge>,
    catalog: Arc<ExampleCatalog>,
}

impl Server {
    /// Create a new server, loading the compiler library once.
    pub fn new(config: GatewayConfig) -> GatewayResult<Self> {
        let backend = load_backend(&config.compiler)?;
        let bridge = Arc::new(CompilerBridge::new(
            backend,
            config.compiler.bridge_config(),
        ));

        let catalog = Arc::new(
            ExampleCatalog::new(config.catalog.directory.clone())
                .with_extension(&config.catalog.extension),
        );

        Ok(Self {
            config,
            bridge,
            catalog,
        })
    }

    /// Run the server until a shutdown signal arrives
    pub async fn run(self) -> GatewayResult<()> {
        let addr = self.config.server.listen_addr;

        let state = AppState::new(self.bridge.clone(), self.catalog.clone());
        let app = create_router(state, &self.config.server);

        let listener = TcpListener::bind(addr).await?;

        tracing::info!("GGCODE gateway listening on {}", addr);
        tracing::info!(
            compiler = self.bridge.backend_name(),
            examples = %self.catalog.directory().display(),
            "serving"
        );

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| GatewayError::Server(e.to_string()))?;

        tracing::info!("GGCODE gateway shutting down");

        self.bridge.close();

        Ok(())
    }
}

fn load_backend(config: &CompilerConfig) -> GatewayResult<Arc<dyn CompilerBackend>> {
    match NativeCompiler::load(&config.library_path) {
        Ok(compiler) => Ok(Arc::new(
            compiler.with_result_release(config.free_results),
        )),
        Err(err) if config.require_library => Err(err.into()),
        Err(err) => {
            tracing::warn!(
                error = %err,
                "compiler library not loaded, compiles will fail until restart"
            );
            Ok(Arc::new(UnavailableCompiler::new(err.to_string())))
        }
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received terminate signal, initiating graceful shutdown");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_missing_library_falls_back() {
        let config = CompilerConfig {
            library_path: PathBuf::from("/nonexistent/libggcode.so"),
            ..CompilerConfig::default()
        };
        let backend = load_backend(&config).unwrap();
        assert_eq!(backend.name(), "unavailable");
    }

    #[test]
    fn test_missing_library_is_fatal_when_required() {
        let config = CompilerConfig {
            library_path: PathBuf::from("/nonexistent/libggcode.so"),
            require_library: true,
            ..CompilerConfig::default()
        };
        assert!(matches!(
            load_backend(&config),
            Err(GatewayError::Bridge(_))
        ));
    }
}
