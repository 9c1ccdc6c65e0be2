//! Graceful shutdown signal handling.
//!
//! [`ShutdownSignal`] fans one trigger out to the accept loop and to every
//! connection task. [`ConnectionTracker`] counts live connections so the
//! server can wait for them to drain.
//!
//! # Example
//!
//! ```rust,ignore
//! use switchyard_server::ShutdownSignal;
//!
//! let shutdown = ShutdownSignal::with_os_signals();
//! server.run_with_shutdown(shutdown).await?;
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use switchyard_core::Cancellation;
use tokio::sync::Notify;

/// A signal that can be used to trigger and await graceful shutdown.
///
/// Clones share state; triggering any clone triggers all of them.
///
/// # Example
///
/// ```rust
/// use switchyard_server::ShutdownSignal;
///
/// let shutdown = ShutdownSignal::new();
/// let observer = shutdown.clone();
///
/// shutdown.trigger();
/// assert!(observer.is_shutdown());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ShutdownSignal {
    inner: Cancellation,
}

impl ShutdownSignal {
    /// Creates a signal that has not fired.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fires the signal. Idempotent.
    pub fn trigger(&self) {
        self.inner.cancel();
    }

    /// Returns `true` once the signal has fired.
    #[must_use]
    pub fn is_shutdown(&self) -> bool {
        self.inner.is_cancelled()
    }

    /// Completes when the signal fires, immediately if it already has.
    pub async fn recv(&self) {
        self.inner.cancelled().await;
    }

    /// Creates a signal that fires on SIGTERM or SIGINT (Ctrl+C).
    ///
    /// Must be called from within a Tokio runtime.
    #[must_use]
    pub fn with_os_signals() -> Self {
        let signal = Self::new();
        let signal_clone = signal.clone();

        tokio::spawn(async move {
            wait_for_os_signal().await;
            signal_clone.trigger();
        });

        signal
    }
}

/// Waits for an OS shutdown signal.
///
/// If no handler can be registered the future never completes, leaving
/// shutdown to programmatic triggers.
async fn wait_for_os_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = sigterm.recv() => {
                        tracing::info!("Received SIGTERM, initiating graceful shutdown");
                    }
                    result = tokio::signal::ctrl_c() => {
                        on_ctrl_c(result).await;
                    }
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to register SIGTERM handler");
                on_ctrl_c(tokio::signal::ctrl_c().await).await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        on_ctrl_c(tokio::signal::ctrl_c().await).await;
    }
}

async fn on_ctrl_c(result: std::io::Result<()>) {
    match result {
        Ok(()) => tracing::info!("Received SIGINT, initiating graceful shutdown"),
        Err(e) => {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    }
}

/// Counts active connections during shutdown.
///
/// # Example
///
/// ```rust
/// use switchyard_server::ConnectionTracker;
///
/// let tracker = ConnectionTracker::new();
///
/// let token = tracker.acquire();
/// assert_eq!(tracker.active_connections(), 1);
///
/// drop(token);
/// assert_eq!(tracker.active_connections(), 0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConnectionTracker {
    active: Arc<AtomicUsize>,
    notify: Arc<Notify>,
}

impl ConnectionTracker {
    /// Creates a new connection tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires a token to hold for the lifetime of a connection.
    #[must_use]
    pub fn acquire(&self) -> ConnectionToken {
        self.active.fetch_add(1, Ordering::SeqCst);
        ConnectionToken {
            active: Arc::clone(&self.active),
            notify: Arc::clone(&self.notify),
        }
    }

    /// Returns the number of active connections.
    #[must_use]
    pub fn active_connections(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Waits until all connections are closed.
    pub async fn wait_for_shutdown(&self) {
        loop {
            // Register interest before checking the count so the last drop
            // cannot be missed.
            let notified = self.notify.notified();
            if self.active.load(Ordering::SeqCst) == 0 {
                return;
            }
            notified.await;
        }
    }
}

/// A token representing an active connection.
#[derive(Debug)]
pub struct ConnectionToken {
    active: Arc<AtomicUsize>,
    notify: Arc<Notify>,
}

impl Drop for ConnectionToken {
    fn drop(&mut self) {
        if self.active.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.notify.notify_waiters();
        }
    }
}
