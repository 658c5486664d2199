//! # Lifecycle events emitted by zip operators.
//!
//! The [`EventKind`] enum classifies event types across two categories:
//! - **Source events**: one upstream's handshake or misbehaviour
//! - **Terminal events**: how a zip subscription ended
//!
//! The [`Event`] struct carries additional metadata such as timestamps, operator
//! name, source index and reasons. Events are published at lifecycle edges only,
//! never per tuple.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use zipbarrier::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::ZipFailed)
//!     .with_operator("prices")
//!     .with_source(2)
//!     .with_reason("upstream failed: boom");
//!
//! assert_eq!(ev.kind, EventKind::ZipFailed);
//! assert_eq!(ev.operator.as_deref(), Some("prices"));
//! assert_eq!(ev.source, Some(2));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of zip events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Observer events ===
    /// Observer panicked during event processing.
    ///
    /// Sets:
    /// - `operator`: observer name
    /// - `reason`: panic info/message
    ObserverPanicked,

    /// Observer dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `operator`: observer name
    /// - `reason`: reason string (e.g., "full", "closed")
    ObserverOverflow,

    // === Subscription lifecycle ===
    /// A consumer subscribed and a barrier was built.
    ///
    /// Sets:
    /// - `operator`: operator name (if named)
    /// - `reason`: number of upstream sources
    ZipSubscribed,

    /// One upstream completed its handshake.
    ///
    /// Sets:
    /// - `operator`, `source`
    SourceSubscribed,

    /// One upstream called `on_subscribe` twice; the duplicate was cancelled.
    ///
    /// Sets:
    /// - `operator`, `source`, `reason`
    DuplicateSubscription,

    /// One upstream delivered more than it was asked for.
    ///
    /// Sets:
    /// - `operator`, `source`, `reason`
    SourceOverflow,

    // === Terminal outcomes ===
    /// The zip completed.
    ///
    /// Sets:
    /// - `operator`, `emitted`
    ZipCompleted,

    /// The zip failed; the consumer received `on_error`.
    ///
    /// Sets:
    /// - `operator`, `emitted`, `reason`
    ZipFailed,

    /// The consumer cancelled.
    ///
    /// Sets:
    /// - `operator`, `emitted`
    ZipCancelled,
}

/// Zip event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Name of the operator (or observer), if applicable.
    pub operator: Option<Arc<str>>,
    /// Index of the upstream source, if applicable.
    pub source: Option<usize>,
    /// Human-readable reason (errors, overflow details, etc.).
    pub reason: Option<Arc<str>>,
    /// Number of tuples delivered downstream before the event.
    pub emitted: Option<u64>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            operator: None,
            source: None,
            reason: None,
            emitted: None,
        }
    }

    /// Attaches an operator name.
    #[inline]
    pub fn with_operator(mut self, operator: impl Into<Arc<str>>) -> Self {
        self.operator = Some(operator.into());
        self
    }

    /// Attaches an upstream source index.
    #[inline]
    pub fn with_source(mut self, index: usize) -> Self {
        self.source = Some(index);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches the number of tuples emitted so far.
    #[inline]
    pub fn with_emitted(mut self, n: u64) -> Self {
        self.emitted = Some(n);
        self
    }

    /// Creates an observer overflow event.
    #[inline]
    pub fn observer_overflow(observer: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::ObserverOverflow)
            .with_operator(observer)
            .with_reason(format!("observer={observer} reason={reason}"))
    }

    /// Creates an observer panic event.
    #[inline]
    pub fn observer_panicked(observer: &'static str, info: String) -> Self {
        Event::new(EventKind::ObserverPanicked)
            .with_operator(observer)
            .with_reason(info)
    }

    #[inline]
    pub fn is_observer_overflow(&self) -> bool {
        matches!(self.kind, EventKind::ObserverOverflow)
    }

    /// Returns `true` for the three terminal outcomes.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.kind,
            EventKind::ZipCompleted | EventKind::ZipFailed | EventKind::ZipCancelled
        )
    }
}
