//! # Serialized drain: a work-counter trampoline.
//!
//! [`Serialized`] grants exclusive access to a piece of state without a lock.
//! Every caller bumps an atomic work counter; only the caller that moves it off
//! zero runs the drain body, and it keeps looping until the counter drops back
//! to zero. Concurrent callers just leave a "redo" mark and return.
//!
//! ```text
//! thread A: drain() wip 0→1 ──► body ──► body ──► wip 2→0 ──► exit
//! thread B:            drain() wip 1→2 ──► return (A re-runs the body)
//! ```
//!
//! A body may *park* the drain by returning [`ControlFlow::Break`]: the counter is
//! never released again, so the state is frozen for good. This is how terminal
//! outcomes are made permanent.

use std::cell::UnsafeCell;
use std::ops::ControlFlow;
use std::sync::atomic::{AtomicUsize, Ordering};

use crossbeam_utils::CachePadded;

pub(crate) struct Serialized<S> {
    wip: CachePadded<AtomicUsize>,
    state: UnsafeCell<S>,
}

// SAFETY: `state` is only reachable through `drain` and `park`, which hand out
// `&mut S` solely to the thread that moved `wip` off zero. That thread keeps the
// exclusive right until it brings `wip` back to zero with an `AcqRel` update, which
// orders its writes before the next owner's reads. A parked drain never releases.
unsafe impl<S: Send> Sync for Serialized<S> {}

impl<S> Serialized<S> {
    pub(crate) fn new(state: S) -> Self {
        Self {
            wip: CachePadded::new(AtomicUsize::new(0)),
            state: UnsafeCell::new(state),
        }
    }

    /// Runs `body` until no more work is owed, or until it breaks.
    ///
    /// Returns `true` if this call acted as the drain owner.
    pub(crate) fn drain<F>(&self, mut body: F) -> bool
    where
        F: FnMut(&mut S) -> ControlFlow<()>,
    {
        if self.wip.fetch_add(1, Ordering::AcqRel) != 0 {
            return false;
        }
        let mut missed = 1;
        loop {
            // SAFETY: this thread moved `wip` off zero and has not released it.
            let state = unsafe { &mut *self.state.get() };
            if body(state).is_break() {
                return true;
            }
            missed = self.wip.fetch_sub(missed, Ordering::AcqRel) - missed;
            if missed == 0 {
                return true;
            }
        }
    }

    /// Runs `f` once with exclusive access and parks the drain for good.
    ///
    /// Does nothing (and returns `false`) if a drain is running or already parked;
    /// the owner is then expected to notice whatever prompted the call.
    pub(crate) fn park<F>(&self, f: F) -> bool
    where
        F: FnOnce(&mut S),
    {
        if self.wip.fetch_add(1, Ordering::AcqRel) != 0 {
            return false;
        }
        // SAFETY: as in `drain`; the counter is never released afterwards.
        let state = unsafe { &mut *self.state.get() };
        f(state);
        true
    }
}
