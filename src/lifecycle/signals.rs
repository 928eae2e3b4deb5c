//! OS signal handling.
//!
//! Ctrl-C fires the cancel token of the running workflow; a second Ctrl-C
//! exits the process.

use crate::lifecycle::cancel::CancelToken;

/// Spawn a task that cancels `token` on the first Ctrl-C.
pub fn cancel_on_ctrl_c(token: CancelToken) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            return;
        }
        tracing::warn!("Ctrl-C received, cancelling");
        token.cancel();

        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::error!("Second Ctrl-C received, exiting");
            std::process::exit(130);
        }
    })
}
