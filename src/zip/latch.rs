//! First-writer-wins error slot.

use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{ProtocolViolation, StreamError};

/// Holds at most one [`StreamError`].
///
/// The winner is decided by a compare-and-swap on `latched`; only the winner
/// writes `error`, so the cell is never contended. Readers may briefly see the
/// flag without the value: the winner drains right after publishing it.
#[derive(Debug, Default)]
pub(crate) struct ErrorSlot {
    latched: AtomicBool,
    error: OnceLock<StreamError>,
}

impl ErrorSlot {
    /// Latches `error`, or reports the attempt as a second error.
    pub(crate) fn latch(&self, error: StreamError) -> Result<(), ProtocolViolation> {
        if self
            .latched
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            let first = self
                .error
                .get()
                .map_or_else(|| "<pending>".to_string(), ToString::to_string);
            return Err(ProtocolViolation::ErrorReportedTwice {
                first,
                second: error.to_string(),
            });
        }
        let _ = self.error.set(error);
        Ok(())
    }

    pub(crate) fn get(&self) -> Option<&StreamError> {
        self.error.get()
    }
}
