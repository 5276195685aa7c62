//! Calling contract between the gateway and the external GGCODE compiler.
//!
//! The compiler is an opaque, blocking, non-reentrant foreign function. The
//! bridge encodes sanitized text into a [`BoundaryBuffer`], runs the call on
//! the blocking thread pool under a concurrency cap and a deadline, and
//! returns the compiler's text verbatim. Compiler diagnostics (for example
//! `; ERROR`) come back as ordinary output: the contract has no separate
//! error channel.

use crate::buffer::BoundaryBuffer;
use crate::error::BridgeError;
use crate::sanitize::{sanitize, SanitizedText};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, warn, Instrument};
use uuid::Uuid;

/// Output text on success, a classified bridge failure otherwise.
pub type CompileResult = Result<String, BridgeError>;

/// Integer mode flag passed alongside the source buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    /// Plain G-code without annotations (`0`).
    Bare,
    /// Plain-text G-code with the compiler's annotations (`1`).
    #[default]
    Annotated,
}

impl RenderMode {
    pub fn flag(self) -> i32 {
        match self {
            RenderMode::Bare => 0,
            RenderMode::Annotated => 1,
        }
    }
}

/// Something that can run the compiler calling contract.
///
/// `invoke` blocks; callers go through [`CompilerBridge`], which moves it off
/// the async executor.
pub trait CompilerBackend: Send + Sync {
    fn name(&self) -> &str;

    fn invoke(&self, buffer: &BoundaryBuffer, mode: RenderMode) -> CompileResult;
}

/// Stand-in used when the compiler library could not be loaded at startup.
#[derive(Debug, Clone)]
pub struct UnavailableCompiler {
    reason: String,
}

impl UnavailableCompiler {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl CompilerBackend for UnavailableCompiler {
    fn name(&self) -> &str {
        "unavailable"
    }

    fn invoke(&self, _buffer: &BoundaryBuffer, _mode: RenderMode) -> CompileResult {
        Err(BridgeError::Unavailable(self.reason.clone()))
    }
}

#[derive(Debug, Clone)]
pub struct BridgeConfig {
    pub mode: RenderMode,
    /// How long a caller waits, queueing included.
    pub timeout: Duration,
    /// Compiles allowed in flight at once.
    pub max_concurrent: usize,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            mode: RenderMode::Annotated,
            timeout: Duration::from_secs(30),
            max_concurrent: 4,
        }
    }
}

/// Request-facing entry point to the compiler.
#[derive(Clone)]
pub struct CompilerBridge {
    backend: Arc<dyn CompilerBackend>,
    config: BridgeConfig,
    permits: Arc<Semaphore>,
}

impl CompilerBridge {
    pub fn new(backend: Arc<dyn CompilerBackend>, config: BridgeConfig) -> Self {
        let permits = Arc::new(Semaphore::new(config.max_concurrent.max(1)));
        Self {
            backend,
            config,
            permits,
        }
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Sanitize raw request text and compile it.
    pub async fn compile_source(&self, raw: &str) -> CompileResult {
        self.compile(sanitize(raw)).await
    }

    pub async fn compile(&self, text: SanitizedText) -> CompileResult {
        let span = tracing::debug_span!(
            "compile",
            compile_id = %Uuid::new_v4(),
            backend = self.backend.name()
        );

        let result = self.run(text).instrument(span).await;
        if let Err(err) = &result {
            warn!(kind = err.kind(), error = %err, "compile failed");
        }
        result
    }

    async fn run(&self, text: SanitizedText) -> CompileResult {
        // Rejected before any permit is taken, so the backend never sees it.
        let buffer = BoundaryBuffer::encode(&text)?;
        let mode = self.config.mode;
        let deadline = self.config.timeout;
        debug!(bytes = buffer.len(), mode = mode.flag(), "dispatching compile");

        let backend = Arc::clone(&self.backend);
        let permits = Arc::clone(&self.permits);
        let call = async move {
            let permit = permits
                .acquire_owned()
                .await
                .map_err(|_| BridgeError::unavailable("compiler bridge is closed"))?;

            // The permit moves into the blocking task: a call that outlives
            // its deadline still counts against the cap until it returns.
            tokio::task::spawn_blocking(move || {
                let _permit = permit;
                backend.invoke(&buffer, mode)
            })
            .await
            .map_err(|err| {
                if err.is_panic() {
                    BridgeError::unavailable("compiler call panicked")
                } else {
                    BridgeError::unavailable("compiler call was cancelled")
                }
            })?
        };

        let output = tokio::time::timeout(deadline, call)
            .await
            .map_err(|_| BridgeError::Timeout { after: deadline })??;

        debug!(output_bytes = output.len(), "compile finished");
        Ok(output)
    }

    /// Stop admitting new compiles. In-flight calls finish normally.
    pub fn close(&self) {
        self.permits.close();
    }
}
