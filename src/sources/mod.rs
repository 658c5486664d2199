//! Ready-made publishers.
//!
//! ## Contents
//! - [`Just`], [`Scalar`] single values, read synchronously by a zip
//! - [`FromIter`] an in-memory sequence that honors demand
//! - [`Empty`], [`Fail`] immediate terminal signals

mod iter;
mod scalar;
mod terminal;

pub use iter::FromIter;
pub use scalar::{Just, Scalar};
pub use terminal::{Empty, Fail};
