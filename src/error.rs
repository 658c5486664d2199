//! Error types used by the zip operator and its protocol roles.
//!
//! This module defines three error families:
//!
//! - [`StreamError`]: data-level failures delivered to a consumer through `on_error`.
//! - [`ProtocolViolation`]: a broken caller or upstream; never delivered through the stream.
//! - [`InvalidDemand`]: `request(0)`, rejected synchronously.
//!
//! All of them provide `as_label` / `as_message` helpers for logging and metrics.

use std::error::Error as StdError;
use std::sync::Arc;

use thiserror::Error;

/// Owned, thread-safe error produced by user code (sources, combinators).
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Shared form of [`BoxError`], which keeps [`StreamError`] cheap to clone.
pub type SharedError = Arc<dyn StdError + Send + Sync + 'static>;

/// # Failures carried by the stream itself.
///
/// A consumer observes at most one of these, through `Subscriber::on_error`,
/// after which the whole zip tears down (every other upstream is cancelled).
#[non_exhaustive]
#[derive(Error, Debug, Clone)]
pub enum StreamError {
    /// An upstream source signalled a failure.
    #[error("upstream failed: {source}")]
    Upstream {
        /// The failure reported by the source.
        #[source]
        source: SharedError,
    },

    /// A scalar source failed to produce its value while the zip was starting.
    #[error("source #{index} failed to produce its value: {source}")]
    Start {
        /// Position of the source in the zip.
        index: usize,
        /// The underlying failure.
        #[source]
        source: SharedError,
    },

    /// The combinator rejected an assembled tuple.
    #[error("combinator failed on tuple {tuple}: {source}")]
    Combine {
        /// Debug rendering of the tuple handed to the combinator.
        tuple: String,
        /// The underlying failure.
        #[source]
        source: SharedError,
    },

    /// A source delivered more values than were requested from it.
    #[error("source #{index} overflowed its prefetch buffer of {capacity}")]
    Overflow {
        /// Position of the source in the zip.
        index: usize,
        /// Capacity of the per-source buffer.
        capacity: usize,
    },
}

impl StreamError {
    /// Wraps any error (or message) as an upstream failure.
    ///
    /// # Example
    /// ```
    /// use zipbarrier::StreamError;
    ///
    /// let err = StreamError::upstream("connection reset");
    /// assert_eq!(err.as_label(), "stream_upstream");
    /// assert_eq!(err.to_string(), "upstream failed: connection reset");
    /// ```
    pub fn upstream(err: impl Into<BoxError>) -> Self {
        StreamError::Upstream {
            source: Arc::from(err.into()),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            StreamError::Upstream { .. } => "stream_upstream",
            StreamError::Start { .. } => "stream_start",
            StreamError::Combine { .. } => "stream_combine",
            StreamError::Overflow { .. } => "stream_overflow",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            StreamError::Upstream { source } => format!("upstream: {source}"),
            StreamError::Start { index, source } => format!("start: source={index} err={source}"),
            StreamError::Combine { tuple, source } => format!("combine: tuple={tuple} err={source}"),
            StreamError::Overflow { index, capacity } => {
                format!("overflow: source={index} capacity={capacity}")
            }
        }
    }
}

/// # Breaches of the publisher/subscriber protocol.
///
/// These are unrecoverable: they point at a broken caller or upstream rather than
/// at bad data. They are returned synchronously where a return channel exists
/// ([`ZipPublisher::try_subscribe`](crate::ZipPublisher::try_subscribe)) and raised as a
/// panic carrying this value otherwise.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolViolation {
    /// `subscribe` was called without a subscriber.
    #[error("subscriber must not be null")]
    NullSubscriber,

    /// A source called `on_subscribe` more than once.
    #[error("source #{index} delivered a second subscription")]
    DuplicateSubscription {
        /// Position of the offending source.
        index: usize,
    },

    /// A second error reached a zip that already latched one.
    #[error("error reported twice; latched: {first}; rejected: {second}")]
    ErrorReportedTwice {
        /// The error that was latched first.
        first: String,
        /// The error that was rejected.
        second: String,
    },
}

impl ProtocolViolation {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use zipbarrier::ProtocolViolation;
    ///
    /// let err = ProtocolViolation::DuplicateSubscription { index: 2 };
    /// assert_eq!(err.as_label(), "protocol_duplicate_subscription");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ProtocolViolation::NullSubscriber => "protocol_null_subscriber",
            ProtocolViolation::DuplicateSubscription { .. } => "protocol_duplicate_subscription",
            ProtocolViolation::ErrorReportedTwice { .. } => "protocol_error_reported_twice",
        }
    }

    /// Returns a human-readable message with details about the violation.
    pub fn as_message(&self) -> String {
        match self {
            ProtocolViolation::NullSubscriber => "null subscriber".to_string(),
            ProtocolViolation::DuplicateSubscription { index } => {
                format!("duplicate subscription: source={index}")
            }
            ProtocolViolation::ErrorReportedTwice { first, second } => {
                format!("error reported twice: first={first} second={second}")
            }
        }
    }
}

/// Demand of zero passed to `Subscription::request`.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("request(n) requires n > 0, got {requested}")]
pub struct InvalidDemand {
    /// The rejected amount.
    pub requested: u64,
}

impl InvalidDemand {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        "demand_invalid"
    }
}
