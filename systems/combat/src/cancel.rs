use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// Cooperative abort flag checked by the battle loop between rounds.
///
/// Clones share the same flag, so a handle can be given to another thread or
/// a signal handler while the battle runs.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    /// Creates a token that has not been cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests that the battle stop before its next round.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Reports whether cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}
