//! # zipbarrier
//!
//! **zipbarrier** is a lock-free N-ary *zip* operator for backpressure-aware
//! reactive streams.
//!
//! It subscribes to N upstream publishers and emits one combined item per
//! "row": the i-th item is the combinator applied to the i-th value of every
//! source. The sequence completes as soon as any source runs out, fails as soon
//! as any source fails, and never emits more than the consumer requested.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │  Publisher   │   │  Publisher   │   │ Just (scalar)│
//!     │  (source 0)  │   │  (source 1)  │   │  (source 2)  │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼                  │ read once,
//!     ┌──────────────┐   ┌──────────────┐          │ no subscription
//!     │BufferSubscr. │   │BufferSubscr. │          │
//!     │ (prefetch q) │   │ (prefetch q) │          │
//!     └──────┬───────┘   └──────┬───────┘          │
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Barrier (one per consumer)                                       │
//! │  - slot buffer [Option<T>; N]                                     │
//! │  - demand counter, error latch, cancelled flag                    │
//! │  - serialized drain (work-counter trampoline, no locks)           │
//! └──────┬──────────────────────────────────────────────┬─────────────┘
//!        │ on_next(combine(tuple)) / on_complete /      │ lifecycle events
//!        │ on_error                                     ▼ (optional)
//!        ▼                                     ┌──────────────────┐
//!   Subscriber (consumer)                      │ Bus ──► Observers│
//!                                              └──────────────────┘
//! ```
//!
//! ### Lifecycle
//! ```text
//! ZipPublisher::subscribe(consumer)
//!   ├─ no sources        ─► on_subscribe(noop), on_complete
//!   ├─ scalar fails      ─► on_subscribe(noop), on_error(Start)
//!   └─ otherwise         ─► on_subscribe(barrier), subscribe every source
//!
//! drain (one thread at a time) {
//!   ├─ cancelled / error ─► cancel every source, on_error (if any), stop
//!   ├─ fill empty slots; a finished, empty source ─► on_complete, stop
//!   └─ while demand && tuple complete ─► on_next, request one more per source
//! }
//! ```
//!
//! ## Features
//! | Area              | Description                                              | Key types / traits                          |
//! |-------------------|----------------------------------------------------------|---------------------------------------------|
//! | **Protocol**      | Push/pull roles with demand and cancellation.            | [`Publisher`], [`Subscriber`], [`Subscription`] |
//! | **Operator**      | N-ary zip with a pluggable combinator.                   | [`ZipPublisher`], [`ZipBuilder`], [`Barrier`] |
//! | **Errors**        | Stream failures, protocol violations, invalid demand.    | [`StreamError`], [`ProtocolViolation`], [`InvalidDemand`] |
//! | **Observability** | Lifecycle events on a broadcast bus, async observers.    | [`Event`], [`Bus`], [`Observe`], [`ObserverSet`] |
//! | **Configuration** | Prefetch and bus sizing.                                 | [`ZipConfig`]                               |
//! | **Sources**       | Ready-made publishers for tests and demos.               | [`sources`]                                 |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::sync::{Arc, Mutex};
//! use zipbarrier::{
//!     Publisher, StreamError, Subscriber, Subscription, ZipPublisher, sources::FromIter,
//! };
//!
//! struct Collect(Mutex<Vec<u32>>);
//!
//! impl Subscriber<u32> for Collect {
//!     fn on_subscribe(&self, s: Arc<dyn Subscription>) {
//!         s.request(u64::MAX).unwrap();
//!     }
//!     fn on_next(&self, v: u32) {
//!         self.0.lock().unwrap().push(v);
//!     }
//!     fn on_error(&self, _: StreamError) {}
//!     fn on_complete(&self) {}
//! }
//!
//! let zip = ZipPublisher::builder(vec![
//!     Arc::new(FromIter::new([1u32, 2, 3])) as Arc<dyn Publisher<u32>>,
//!     Arc::new(FromIter::new([10u32, 20])),
//! ])
//! .combine(|t: &[u32]| Ok(t[0] + t[1]))
//! .build();
//!
//! let sink = Arc::new(Collect(Mutex::new(Vec::new())));
//! zip.subscribe(sink.clone());
//! assert_eq!(*sink.0.lock().unwrap(), vec![11, 22]);
//! ```
mod config;
mod error;
mod events;
mod observers;
mod reactive;
mod zip;

pub mod sources;

// ---- Public re-exports ----

pub use config::ZipConfig;
pub use error::{BoxError, InvalidDemand, ProtocolViolation, SharedError, StreamError};
pub use events::{Bus, Event, EventKind};
pub use observers::{Observe, ObserverSet};
pub use reactive::{NoopSubscription, Publisher, Subscriber, Subscription};
pub use zip::{Barrier, Combinator, ZipBuilder, ZipPublisher};

// Optional: expose a simple built-in logger observer (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use observers::LogWriter;
