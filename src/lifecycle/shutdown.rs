//! Shutdown coordination for the plugin server.

use std::fmt;

use tokio::sync::broadcast;

/// What ended the wait in [`wait_for_shutdown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownCause {
    /// [`Shutdown::trigger`] fired, or the `Shutdown` was dropped.
    Triggered,
    /// The process received Ctrl+C.
    Interrupt,
}

impl fmt::Display for ShutdownCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ShutdownCause::Triggered => "triggered",
            ShutdownCause::Interrupt => "interrupt",
        })
    }
}

/// Owner side of the stop signal shared by the server and test harnesses.
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Receiver handed to `HttpServer::run`.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Signal every subscriber and return how many were listening.
    pub fn trigger(&self) -> usize {
        let listeners = self.tx.send(()).unwrap_or(0);
        if listeners == 0 {
            tracing::debug!("Shutdown triggered with no listeners");
        } else {
            tracing::info!(listeners, "Shutdown triggered");
        }
        listeners
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve once `rx` is signalled (or its `Shutdown` dropped) or Ctrl+C
/// arrives.
pub async fn wait_for_shutdown(mut rx: broadcast::Receiver<()>) -> ShutdownCause {
    tokio::select! {
        _ = rx.recv() => ShutdownCause::Triggered,
        _ = interrupt() => ShutdownCause::Interrupt,
    }
}

/// Never resolves if the Ctrl+C handler cannot be installed.
async fn interrupt() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
}
