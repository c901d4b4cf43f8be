use tokio::signal;
use tracing::{error, warn};

/// 等待 Ctrl+C，收到后返回
pub async fn listen_for_shutdown() {
    match signal::ctrl_c().await {
        Ok(()) => warn!("Shutdown signal received, initiating graceful shutdown..."),
        Err(e) => error!("Failed to listen for Ctrl+C: {}", e),
    }
}
