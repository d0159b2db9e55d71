/// Cooperative cancellation shared by every thread of one scan.
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Write-once stop flag.
///
/// Clones share the same flag. It only ever moves from `false` to `true`,
/// so `Relaxed` ordering is enough: no other data is published through it.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask every holder of this token to stop. Idempotent.
    pub fn request_cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}
