//! Dashboard server implementation.

use crate::error::DashboardError;
use crate::routes;
use crate::state::AppState;
use ocrdesk_client::{RefreshIntervals, spawn_refreshers};
use tokio::net::TcpListener;

/// The dashboard server.
pub struct DashboardServer {
    state: AppState,
}

impl DashboardServer {
    /// Create a new dashboard server around prepared state.
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    /// Start the dashboard server and serve until ctrl-c.
    ///
    /// Background refreshers keep the AI status and statistics warm while the
    /// server runs and are stopped on shutdown.
    pub async fn run(&self) -> Result<(), DashboardError> {
        let config = self.state.config();
        let addr = config.dashboard.bind_addr();
        tracing::info!(
            address = %addr,
            backend = %config.api.base_url,
            "Starting ocrdesk dashboard"
        );

        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| DashboardError::StartupFailed(e.to_string()))?;

        let refreshers = spawn_refreshers(
            self.state.queries(),
            RefreshIntervals::from_config(&config.cache),
        );
        let app = routes::create_router(self.state.clone());

        let served = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await;
        refreshers.abort();
        tracing::info!("Dashboard stopped");

        served.map_err(|e| DashboardError::StartupFailed(e.to_string()))
    }

    /// Get the configured listen port.
    pub fn listen_port(&self) -> u16 {
        self.state.config().dashboard.port
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
}
