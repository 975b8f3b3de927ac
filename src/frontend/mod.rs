pub mod context;
pub mod http;
pub mod server_state;


use context::FrontendContext;
use std::sync::Arc;
use tracing::{info, warn};

/// Serves the briefing endpoint until ctrl-c.
pub async fn start_all(ctx: Arc<FrontendContext>) -> anyhow::Result<()> {
    let shutdown_ctx = Arc::clone(&ctx);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!(target: "briefing::frontend", "Shutdown signal received");
                shutdown_ctx.server_state.signal_shutdown();
            }
            Err(e) => warn!(target: "briefing::frontend", "Failed to listen for ctrl-c: {}", e),
        }
    });

    http::listener::run_http_server(ctx).await
}
