use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::errors::StakeError;

/// Cooperative cancellation flag shared between a caller and a running
/// aggregation or action. Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// `Err(Cancelled)` once cancelled
    pub fn check(&self) -> Result<(), StakeError> {
        if self.is_cancelled() {
            Err(StakeError::Cancelled)
        } else {
            Ok(())
        }
    }
}
