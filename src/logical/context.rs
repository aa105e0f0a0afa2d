//! Per-request cancellation and deadline.
//!
//! # Design Decisions
//! - Cancellation is a `watch` channel so any number of clones observe it
//! - A context whose handle was dropped can no longer be cancelled
//! - Deadline uses tokio's clock

use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;

use crate::logical::LogicalError;

/// Caller-supplied cancellation and deadline for one logical request.
#[derive(Debug, Clone)]
pub struct Context {
    deadline: Option<Instant>,
    cancelled: watch::Receiver<bool>,
}

/// Cancels every clone of the context it was created with.
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }
}

impl Context {
    /// A context that never expires and cannot be cancelled.
    pub fn background() -> Self {
        let (_tx, rx) = watch::channel(false);
        Self {
            deadline: None,
            cancelled: rx,
        }
    }

    /// A cancellable context with no deadline.
    pub fn with_cancel() -> (Self, CancelHandle) {
        let (tx, rx) = watch::channel(false);
        (
            Self {
                deadline: None,
                cancelled: rx,
            },
            CancelHandle { tx },
        )
    }

    /// Returns a copy of this context that expires after `timeout`.
    ///
    /// An earlier existing deadline is kept.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        let candidate = Instant::now() + timeout;
        let deadline = match self.deadline {
            Some(existing) if existing < candidate => existing,
            _ => candidate,
        };
        Self {
            deadline: Some(deadline),
            cancelled: self.cancelled.clone(),
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Reports why the context is no longer usable, if it is not.
    pub fn err(&self) -> Option<LogicalError> {
        if *self.cancelled.borrow() {
            return Some(LogicalError::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(LogicalError::DeadlineExceeded),
            _ => None,
        }
    }

    /// Drives `fut` unless the context is cancelled or expires first.
    ///
    /// Dropping `fut` on abort releases whatever it holds.
    pub async fn run<F, T>(&self, fut: F) -> Result<T, LogicalError>
    where
        F: Future<Output = T>,
    {
        if let Some(err) = self.err() {
            return Err(err);
        }

        let expired = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            out = fut => Ok(out),
            _ = expired => Err(LogicalError::DeadlineExceeded),
            _ = self.wait_cancelled() => Err(LogicalError::Cancelled),
        }
    }

    async fn wait_cancelled(&self) {
        let mut rx = self.cancelled.clone();
        loop {
            if *rx.borrow_and_update() {
                return;
            }
            if rx.changed().await.is_err() {
                // Sender gone: cancellation can no longer happen.
                std::future::pending::<()>().await;
            }
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::background()
    }
}
