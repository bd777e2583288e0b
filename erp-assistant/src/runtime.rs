//! Start-up wiring shared by the CLI and embedding hosts.
//!
//! [`Runtime`] owns the registry built over a single [`LookupStore`] and the
//! observers attached to it. Everything is assembled once; afterwards the
//! runtime is only read, so it can be shared across tasks freely.

use std::sync::Arc;

use erp_config::{AppConfig, ConfigError};
use erp_primitives::CallId;
use erp_store::LookupStore;
use erp_telemetry::{DispatchSnapshot, DispatchStats};
use erp_tools::catalog::{self, Manifest, MissPolicy};
use erp_tools::{
    CompositeObserver, DispatchObserver, ToolCallRequest, ToolCallResponse, ToolError,
    ToolRegistry, TracingObserver,
};
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info};

/// Errors raised while assembling or driving a [`Runtime`].
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Configuration or dataset could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Tool binding or registration failed.
    #[error(transparent)]
    Tools(#[from] ToolError),
    /// Session transport failed.
    #[error("session i/o error: {0}")]
    Io(#[from] std::io::Error),
    /// A response could not be encoded.
    #[error("response encoding error: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Counts gathered over one [`Runtime::serve`] session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SessionSummary {
    /// Requests answered, including malformed ones.
    pub requests: u64,
    /// Requests answered with an error outcome.
    pub failures: u64,
}

/// Registry, store, and observers assembled for one process.
#[derive(Debug)]
pub struct Runtime {
    registry: Arc<ToolRegistry>,
    stats: Arc<DispatchStats>,
}

impl Runtime {
    /// Builds the runtime described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::Config`] when the dataset cannot be loaded and
    /// [`RuntimeError::Tools`] when a tool fails to bind.
    pub fn from_config(config: &AppConfig) -> Result<Self, RuntimeError> {
        let store = config.build_store()?;
        Self::with_store(store, config.miss_policy)
    }

    /// Builds the runtime over an already constructed store.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::Tools`] when a tool fails to bind.
    pub fn with_store(store: LookupStore, policy: MissPolicy) -> Result<Self, RuntimeError> {
        let products = store.product_count();
        let counterparties = store.counterparty_count();
        let stats = Arc::new(DispatchStats::new());
        let observer = CompositeObserver::new([
            Arc::new(TracingObserver) as Arc<dyn DispatchObserver>,
            Arc::clone(&stats) as Arc<dyn DispatchObserver>,
        ]);
        let registry =
            catalog::standard_registry(&Arc::new(store), policy)?.with_observer(Arc::new(observer));

        info!(
            tools = registry.len(),
            products,
            counterparties,
            %policy,
            "runtime assembled"
        );

        Ok(Self {
            registry: Arc::new(registry),
            stats,
        })
    }

    /// Shared handle to the registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    /// Manifest published to the external caller.
    #[must_use]
    pub fn manifest(&self) -> Manifest {
        catalog::manifest(&self.registry)
    }

    /// Dispatch counters since start-up.
    #[must_use]
    pub fn stats(&self) -> DispatchSnapshot {
        self.stats.snapshot()
    }

    /// Executes one request envelope.
    #[must_use]
    pub fn handle(&self, request: ToolCallRequest) -> ToolCallResponse {
        self.registry.handle(request)
    }

    /// Answers one JSON request per input line with one JSON response per
    /// output line until `reader` reaches EOF. Blank lines are skipped;
    /// undecodable lines get an `invalid_arguments` response.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::Io`] when reading or writing fails.
    pub async fn serve<R, W>(&self, reader: R, mut writer: W) -> Result<SessionSummary, RuntimeError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut summary = SessionSummary::default();
        let mut lines = reader.lines();

        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let response = match serde_json::from_str::<ToolCallRequest>(line) {
                Ok(request) => self.handle(request),
                Err(err) => {
                    debug!(error = %err, "undecodable request line");
                    ToolCallResponse::new(
                        CallId::random(),
                        String::new(),
                        Err(ToolError::invalid_arguments("request", err.to_string())),
                    )
                }
            };

            summary.requests += 1;
            if !response.is_ok() {
                summary.failures += 1;
            }

            let mut encoded = serde_json::to_vec(&response)?;
            encoded.push(b'\n');
            writer.write_all(&encoded).await?;
            writer.flush().await?;
        }

        info!(
            requests = summary.requests,
            failures = summary.failures,
            "session closed"
        );
        Ok(summary)
    }
}
