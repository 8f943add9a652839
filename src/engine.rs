//! Application engine
//!
//! Wires the snapshot store, the generator task and the HTTP server
//! together and owns the shutdown token shared by both.

use std::sync::Arc;
use tokio::signal;
use tokio_util::sync::CancellationToken;

use crate::core::SnapshotStore;
use crate::generator::Generator;
use crate::infrastructure::api::{start_server, AppState};
use crate::infrastructure::config::{Config, Startup};
use crate::infrastructure::metrics::BoardMetrics;
use crate::Result;

/// Main engine managing the service lifecycle
pub struct AppEngine {
    config: Config,
    startup: Startup,
    store: Arc<SnapshotStore>,
    metrics: Arc<BoardMetrics>,
    shutdown: CancellationToken,
}

impl AppEngine {
    pub fn new(config: Config, startup: Startup) -> Self {
        Self {
            config,
            startup,
            store: Arc::new(SnapshotStore::new()),
            metrics: Arc::new(BoardMetrics::new()),
            shutdown: CancellationToken::new(),
        }
    }

    /// Handler state sharing this engine's store and metrics
    pub fn state(&self) -> AppState {
        AppState {
            store: self.store.clone(),
            metrics: self.metrics.clone(),
            template_root: Arc::new(self.startup.root_path.clone()),
        }
    }

    /// Token that stops both the generator and the server when cancelled
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Run until a shutdown signal arrives or the server fails
    pub async fn run(self) -> Result<()> {
        tracing::info!(
            listen = %self.startup.listen_addr,
            root = %self.startup.root_path.display(),
            profile = ?self.config.generator.profile,
            csv_export = self.config.server.csv_export,
            "Starting decoy board"
        );

        let generator = Generator::new(
            &self.config.generator,
            self.startup.real_name.clone(),
            self.store.clone(),
            self.metrics.clone(),
        );
        let generator_handle = tokio::spawn(generator.run(self.shutdown.child_token()));

        let signal_token = self.shutdown.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = shutdown_signal() => signal_token.cancel(),
                _ = signal_token.cancelled() => {}
            }
        });

        let served = start_server(
            self.state(),
            &self.startup.listen_addr,
            self.config.server.csv_export,
            self.shutdown.clone(),
        )
        .await;

        // Server is gone either way, stop the generator too
        self.shutdown.cancel();
        if let Err(e) = generator_handle.await {
            tracing::error!("Generator task failed: {}", e);
        }

        served?;
        tracing::info!("Decoy board shut down");
        Ok(())
    }
}

/// Resolves on Ctrl+C or SIGTERM
pub async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => tracing::info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                tracing::error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                tracing::info!("Received terminate signal, shutting down");
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
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
