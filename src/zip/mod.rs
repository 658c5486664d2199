//! The zip operator and its lock-free coordinator.
//!
//! ## Contents
//! - [`ZipPublisher`], [`ZipBuilder`] the operator and its factory
//! - [`Barrier`] per-subscription coordinator, also the consumer's subscription
//! - internal: per-source states (scalar or buffered), the drain trampoline,
//!   demand arithmetic and the single-error latch

mod barrier;
mod buffer;
mod builder;
pub(crate) mod demand;
pub(crate) mod drain;
mod latch;
mod publisher;
mod scalar;
mod state;

#[cfg(test)]
pub(crate) mod testkit;

pub use barrier::{Barrier, Combinator};
pub use builder::ZipBuilder;
pub use publisher::ZipPublisher;
