//! # Buffered subscriber: bridges one asynchronous upstream into the barrier.
//!
//! The upstream pushes values on its own thread; the barrier polls them from
//! whichever thread currently owns the drain.
//!
//! ```text
//! upstream thread                    BufferSubscriber                 drain owner
//!   on_subscribe(s) ──► CAS handle EMPTY→SETTING→READY, s.request(prefetch)
//!   on_next(v)      ──► queue.push(v) ──► parent.drain()
//!   on_complete()   ──► done = true   ──► parent.drain()
//!   on_error(e)     ──► parent.report_error(e)
//!                                          read_next()  ◄── queue.pop()
//!                                          request_more() ──► s.request(1)
//!                                          cancel()       ──► swap CANCELLED, s.cancel()
//! ```
//!
//! ## Ownership
//! The barrier keeps the [`SourceBuffer`]; the upstream keeps the
//! [`BufferSubscriber`], which holds a strong reference to the barrier. A
//! running zip therefore stays alive for as long as any upstream can still
//! signal it, whether or not the consumer kept its subscription handle.
//!
//! ## Rules
//! - The upstream handle is stored once; a duplicate `on_subscribe` is cancelled.
//! - `cancel()` releases the stored handle exactly once, whichever thread calls it.
//! - After `cancel()` no value is read and late signals are ignored.
//! - Completion counts only once the queue is empty.
//! - An error never marks the source done; the latched error ends the zip.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Arc, OnceLock};

use crossbeam_queue::ArrayQueue;
use tracing::{debug, warn};

use crate::error::{ProtocolViolation, StreamError};
use crate::events::{Event, EventKind};
use crate::reactive::{Publisher, Subscriber, Subscription};
use crate::zip::barrier::Coordinator;

const EMPTY: u8 = 0;
const SETTING: u8 = 1;
const READY: u8 = 2;
const CANCELLED: u8 = 3;

/// Barrier-side state of one asynchronous source.
pub(crate) struct SourceBuffer<T> {
    index: usize,
    queue: ArrayQueue<T>,
    handle_state: AtomicU8,
    handle: OnceLock<Arc<dyn Subscription>>,
    done: AtomicBool,
    outstanding: u64,
}

/// What the upstream sees: signals land in the buffer, then wake the barrier.
pub(crate) struct BufferSubscriber<T> {
    buffer: Arc<SourceBuffer<T>>,
    parent: Arc<dyn Coordinator>,
}

impl<T: Send + 'static> SourceBuffer<T> {
    /// Creates the buffer for source `index`, keeping up to `prefetch` values.
    pub(crate) fn new(index: usize, prefetch: usize) -> Self {
        let prefetch = prefetch.max(1);
        Self {
            index,
            queue: ArrayQueue::new(prefetch),
            handle_state: AtomicU8::new(EMPTY),
            handle: OnceLock::new(),
            done: AtomicBool::new(false),
            outstanding: prefetch as u64,
        }
    }

    pub(crate) fn subscribe_to(
        self: &Arc<Self>,
        parent: Arc<dyn Coordinator>,
        source: &dyn Publisher<T>,
    ) {
        source.subscribe(Arc::new(BufferSubscriber::new(Arc::clone(self), parent)));
    }

    pub(crate) fn read_next(&self) -> Option<T> {
        if self.is_cancelled() {
            return None;
        }
        self.queue.pop()
    }

    /// Terminated once cancelled, or once completed with nothing left to read.
    ///
    /// `done` is read before the queue: every value pushed ahead of the
    /// completion is then visible, so an empty queue really is drained.
    pub(crate) fn is_terminated(&self) -> bool {
        if self.is_cancelled() {
            return true;
        }
        self.done.load(Ordering::Acquire) && self.queue.is_empty()
    }

    /// Replaces the value just consumed with one more from upstream.
    pub(crate) fn request_more(&self) {
        if self.handle_state.load(Ordering::Acquire) != READY {
            return;
        }
        if let Some(s) = self.handle.get() {
            if let Err(err) = s.request(1) {
                warn!(source = self.index, error = %err, "upstream rejected replenish request");
            }
        }
    }

    pub(crate) fn cancel(&self) {
        if self.handle_state.load(Ordering::Acquire) == CANCELLED {
            return;
        }
        if self.handle_state.swap(CANCELLED, Ordering::AcqRel) == READY {
            if let Some(s) = self.handle.get() {
                s.cancel();
            }
        }
    }

    pub(crate) fn pending(&self) -> u64 {
        self.queue.len() as u64
    }

    fn is_cancelled(&self) -> bool {
        self.handle_state.load(Ordering::Acquire) == CANCELLED
    }

    fn duplicate(&self, parent: &dyn Coordinator, s: Arc<dyn Subscription>) {
        let violation = ProtocolViolation::DuplicateSubscription { index: self.index };
        warn!(source = self.index, label = violation.as_label(), "{violation}");
        parent.publish(
            Event::new(EventKind::DuplicateSubscription)
                .with_source(self.index)
                .with_reason(violation.to_string()),
        );
        s.cancel();
    }
}


impl<T: Send + 'static> BufferSubscriber<T> {
    pub(crate) fn new(buffer: Arc<SourceBuffer<T>>, parent: Arc<dyn Coordinator>) -> Self {
        Self { buffer, parent }
    }
}

impl<T: Send + 'static> Subscriber<T> for BufferSubscriber<T> {
    fn on_subscribe(&self, s: Arc<dyn Subscription>) {
        let buf = &self.buffer;
        if self.parent.is_cancelled() {
            s.cancel();
            return;
        }

        match buf
            .handle_state
            .compare_exchange(EMPTY, SETTING, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => {}
            Err(CANCELLED) => {
                s.cancel();
                return;
            }
            Err(_) => {
                buf.duplicate(self.parent.as_ref(), s);
                return;
            }
        }

        // Only the SETTING winner writes the cell.
        let _ = buf.handle.set(Arc::clone(&s));
        if buf
            .handle_state
            .compare_exchange(SETTING, READY, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            // cancel() ran while the handle was being stored.
            s.cancel();
            return;
        }

        self.parent
            .publish(Event::new(EventKind::SourceSubscribed).with_source(buf.index));
        if let Err(err) = s.request(buf.outstanding) {
            warn!(source = buf.index, error = %err, "upstream rejected prefetch request");
        }
    }

    fn on_next(&self, value: T) {
        let buf = &self.buffer;
        if buf.is_cancelled() {
            return;
        }
        if buf.queue.push(value).is_err() {
            let capacity = buf.queue.capacity();
            warn!(source = buf.index, capacity, "upstream ignored backpressure");
            self.parent.publish(
                Event::new(EventKind::SourceOverflow)
                    .with_source(buf.index)
                    .with_reason(format!("capacity={capacity}")),
            );
            self.on_error(StreamError::Overflow {
                index: buf.index,
                capacity,
            });
            return;
        }
        self.parent.drain();
    }

    fn on_error(&self, error: StreamError) {
        let buf = &self.buffer;
        if buf.is_cancelled() {
            debug!(source = buf.index, %error, "error after cancellation dropped");
            return;
        }
        // `done` stays clear: a drain must not read this source as exhausted
        // before the error is latched.
        if let Err(violation) = self.parent.report_error(error) {
            warn!(source = buf.index, label = violation.as_label(), "{violation}");
            std::panic::panic_any(violation);
        }
    }

    fn on_complete(&self) {
        self.buffer.done.store(true, Ordering::Release);
        self.parent.drain();
    }
}
