//! Event observers: user handlers fed from the bus.
//!
//! ## Contents
//! - [`Observe`] the extension trait
//! - [`ObserverSet`] per-observer queues and workers, plus the bus listener
//! - [`LogWriter`] stdout printer (feature `logging`)

#[cfg(feature = "logging")]
mod log;
mod observe;
mod set;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use observe::Observe;
pub use set::ObserverSet;
