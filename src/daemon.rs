//! Daemon lifecycle management.
//!
//! Wires the shared stats cache to the HTTP view, handles unix signals, and
//! drives graceful shutdown of the tracked tasks.

use std::sync::Arc;

use tokio::signal::unix::{self, SignalKind};
use tokio_util::{sync::CancellationToken, task::TaskTracker};

use crate::tracing::prelude::*;
use crate::{
    api::{self, ApiConfig},
    cache::PoolCache,
};

/// The main daemon.
pub struct Daemon {
    shutdown: CancellationToken,
    tracker: TaskTracker,
}

impl Daemon {
    /// Create a new daemon instance.
    pub fn new() -> Self {
        Self {
            shutdown: CancellationToken::new(),
            tracker: TaskTracker::new(),
        }
    }

    /// Run the daemon until shutdown is requested.
    pub async fn run(self) -> anyhow::Result<()> {
        let cache = Arc::new(PoolCache::default());

        // Start the stats server. Cache producers (chain notifications,
        // connection tracking, payment processing) attach to the same Arc.
        self.tracker.spawn({
            let shutdown = self.shutdown.clone();
            let cache = cache.clone();
            async move {
                if let Err(e) = api::serve(ApiConfig::default(), shutdown, cache).await {
                    error!("Stats server error: {e}");
                }
            }
        });

        let mut sigint = unix::signal(SignalKind::interrupt())?;
        let mut sigterm = unix::signal(SignalKind::terminate())?;

        tokio::select! {
            _ = sigint.recv() => info!("SIGINT received, shutting down."),
            _ = sigterm.recv() => info!("SIGTERM received, shutting down."),
        }

        self.shutdown.cancel();
        self.tracker.close();
        self.tracker.wait().await;

        Ok(())
    }
}

impl Default for Daemon {
    fn default() -> Self {
        Self::new()
    }
}
