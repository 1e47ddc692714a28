//! history::cancel
//!
//! Cooperative cancellation.
//!
//! Work is never interrupted forcibly. Long-running operations poll the
//! token at fixed checkpoints and unwind cleanly when it is set.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A shared abort flag.
///
/// Clones share the same flag, so a token handed to another thread can stop
/// an engine mid-walk or mid-layout.
///
/// # Example
///
/// ```
/// use lanegraph::history::CancelToken;
///
/// let token = CancelToken::new();
/// let remote = token.clone();
/// remote.cancel();
/// assert!(token.is_cancelled());
/// token.reset();
/// assert!(!remote.is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a stop. Idempotent.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Re-arm the token.
    pub fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}
