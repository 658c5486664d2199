//! # Observer trait.
//!
//! [`Observe`] is the extension point for reacting to zip lifecycle events:
//! exporting metrics, alerting on failures, structured logging.
//!
//! Each observer gets:
//! - **Dedicated worker task** (runs independently)
//! - **Bounded queue** (capacity via [`Observe::queue_capacity`])
//! - **Panic isolation** (panics are reported as `EventKind::ObserverPanicked`)
//!
//! ## Example
//! ```rust
//! use async_trait::async_trait;
//! use zipbarrier::{Event, EventKind, Observe};
//!
//! struct Failures;
//!
//! #[async_trait]
//! impl Observe for Failures {
//!     async fn on_event(&self, ev: &Event) {
//!         if matches!(ev.kind, EventKind::ZipFailed) {
//!             // page someone
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str { "failures" }
//! }
//! ```

use async_trait::async_trait;

use crate::events::Event;

/// Handler for zip lifecycle events.
///
/// ### Implementation requirements
/// - Use async I/O; avoid blocking the executor.
/// - Handle errors internally; do not panic.
/// - Slow processing affects only this observer's queue.
#[async_trait]
pub trait Observe: Send + Sync + 'static {
    /// Processes a single event, in FIFO order for this observer.
    async fn on_event(&self, event: &Event);

    /// Name used in overflow/panic events.
    ///
    /// The default uses `type_name::<Self>()`, which can be verbose.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Preferred queue capacity (clamped to at least 1). Default: 1024.
    fn queue_capacity(&self) -> usize {
        1024
    }
}
