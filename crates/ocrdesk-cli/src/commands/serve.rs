//! Serve command for starting the dashboard.
//!
//! `ocrdesk serve` - Run the web dashboard until ctrl-c.

use ocrdesk_core::OcrdeskConfig;
use ocrdesk_dashboard::{AppState, DashboardServer};

/// Start the dashboard, optionally overriding the configured address.
pub async fn serve(mut config: OcrdeskConfig, host: Option<String>, port: Option<u16>) -> anyhow::Result<()> {
    if let Some(host) = host {
        config.dashboard.host = host;
    }
    if let Some(port) = port {
        config.dashboard.port = port;
    }
    config.validate()?;

    let state = AppState::from_config(config)?;
    if !state.tokens().is_set() {
        tracing::warn!("No API token stored, the dashboard will ask for one at /login");
    }

    let address = state.config().dashboard.bind_addr();
    println!("✔ Dashboard listening on http://{address}");
    println!("  Backend: {}", state.config().api.base_url);

    DashboardServer::new(state).run().await?;
    Ok(())
}
