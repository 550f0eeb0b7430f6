//! Cooperative cancellation for long-running layout calls.
//!
//! Pairwise scans (intersection counting, neighbour detection) grow with the
//! square of the parcel count on adversarial inputs, so every hot loop polls a
//! [`CancelToken`] and bails out with [`SiteError::Cancelled`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::SiteError;

/// Shared flag; clones observe the same cancellation state.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    /// `Err(SiteError::Cancelled)` once [`cancel`](Self::cancel) was called.
    #[inline]
    pub fn check(&self) -> Result<(), SiteError> {
        if self.is_cancelled() {
            Err(SiteError::Cancelled)
        } else {
            Ok(())
        }
    }
}
