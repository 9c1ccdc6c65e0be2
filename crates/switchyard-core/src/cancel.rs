//! Cooperative cancellation for in-flight requests.
//!
//! The dispatcher gives each request its own [`Cancellation`]. When the
//! request deadline passes it calls [`Cancellation::cancel`]; handlers that
//! await I/O should race their work against [`Cancellation::cancelled`].
//!
//! ```rust,ignore
//! tokio::select! {
//!     _ = ctx.cancelled() => Response::json_error(...),
//!     rows = store.query(...) => render(rows),
//! }
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::broadcast;

/// A one-shot cancellation signal shared by every clone.
///
/// # Example
///
/// ```rust
/// use switchyard_core::Cancellation;
///
/// let cancellation = Cancellation::new();
/// let observer = cancellation.clone();
///
/// cancellation.cancel();
/// assert!(observer.is_cancelled());
/// ```
#[derive(Debug, Clone)]
pub struct Cancellation {
    /// Whether cancellation has been requested
    triggered: Arc<AtomicBool>,

    /// Broadcast sender for waking waiters
    sender: broadcast::Sender<()>,
}

impl Cancellation {
    /// Creates a signal that has not been triggered.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(1);
        Self {
            triggered: Arc::new(AtomicBool::new(false)),
            sender,
        }
    }

    /// Requests cancellation. Idempotent.
    pub fn cancel(&self) {
        if self
            .triggered
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            // No receivers is fine.
            let _ = self.sender.send(());
        }
    }

    /// Returns `true` once [`cancel`](Self::cancel) has been called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.triggered.load(Ordering::SeqCst)
    }

    /// Completes when cancellation is requested, immediately if it already
    /// was.
    pub async fn cancelled(&self) {
        // Subscribe before checking the flag so a concurrent `cancel` cannot
        // slip between the two.
        let mut receiver = self.sender.subscribe();
        if self.is_cancelled() {
            return;
        }
        let _ = receiver.recv().await;
    }
}

impl Default for Cancellation {
    fn default() -> Self {
        Self::new()
    }
}
