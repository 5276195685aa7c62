//! Configuration for ggcoded

use ggcode_core::{BridgeConfig, RenderMode};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Main gateway configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// External compiler configuration
    #[serde(default)]
    pub compiler: CompilerConfig,

    /// Example catalog configuration
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,

    /// Enable CORS
    #[serde(default = "default_true")]
    pub enable_cors: bool,

    /// Maximum request body size in bytes
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            enable_cors: true,
            max_body_size: default_max_body_size(),
        }
    }
}

/// Compiler library configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompilerConfig {
    /// Path to the compiler shared library
    #[serde(default = "default_library_path")]
    pub library_path: PathBuf,

    /// Mode flag passed with every compile
    #[serde(default)]
    pub mode: RenderMode,

    /// Per-request compile deadline in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum compiles in flight
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,

    /// Refuse to start when the library cannot be loaded
    #[serde(default)]
    pub require_library: bool,

    /// Release returned strings with the C allocator
    #[serde(default = "default_true")]
    pub free_results: bool,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            library_path: default_library_path(),
            mode: RenderMode::default(),
            timeout_secs: default_timeout_secs(),
            max_concurrent: default_max_concurrent(),
            require_library: false,
            free_results: true,
        }
    }
}

impl CompilerConfig {
    pub fn bridge_config(&self) -> BridgeConfig {
        BridgeConfig {
            mode: self.mode,
            timeout: Duration::from_secs(self.timeout_secs),
            max_concurrent: self.max_concurrent,
        }
    }
}

/// Example catalog configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Directory holding the example programs
    #[serde(default = "default_catalog_dir")]
    pub directory: PathBuf,

    /// File extension of example programs
    #[serde(default = "default_extension")]
    pub extension: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            directory: default_catalog_dir(),
            extension: default_extension(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// JSON format
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// Default value helpers
fn default_true() -> bool {
    true
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 3000))
}

fn default_max_body_size() -> usize {
    10 * 1024 * 1024
}

fn default_library_path() -> PathBuf {
    PathBuf::from("./libggcode.so")
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_concurrent() -> usize {
    4
}

fn default_catalog_dir() -> PathBuf {
    PathBuf::from("./samples")
}

fn default_extension() -> String {
    ggcode_core::catalog::DEFAULT_EXTENSION.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl GatewayConfig {
    /// Load configuration: defaults, then the optional file, then
    /// `GGCODE_`-prefixed environment variables (`GGCODE_COMPILER__TIMEOUT_SECS`).
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        builder = builder.add_source(config::Config::try_from(&GatewayConfig::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(true));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("GGCODE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }
}
