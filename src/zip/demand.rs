//! Saturating demand arithmetic over an atomic counter.
//!
//! `u64::MAX` stands for unbounded demand: once reached it is never added to
//! nor subtracted from.

use std::sync::atomic::{AtomicU64, Ordering};

/// Demand value meaning "no limit".
pub(crate) const UNBOUNDED: u64 = u64::MAX;

/// Adds `n` to `requested`, saturating at [`UNBOUNDED`]. Returns the previous value.
pub(crate) fn add(requested: &AtomicU64, n: u64) -> u64 {
    match requested.fetch_update(Ordering::AcqRel, Ordering::Acquire, |r| {
        (r != UNBOUNDED).then(|| r.saturating_add(n))
    }) {
        Ok(prev) | Err(prev) => prev,
    }
}

/// Subtracts `n` emitted items from `requested`. Returns the remaining demand.
///
/// Unbounded demand stays unbounded; the counter never goes below zero.
pub(crate) fn sub(requested: &AtomicU64, n: u64) -> u64 {
    match requested.fetch_update(Ordering::AcqRel, Ordering::Acquire, |r| {
        (r != UNBOUNDED).then(|| r.saturating_sub(n))
    }) {
        Ok(prev) => prev.saturating_sub(n),
        Err(_) => UNBOUNDED,
    }
}
