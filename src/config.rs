//! # Zip operator configuration.
//!
//! [`ZipConfig`] holds the tunables shared by every barrier an operator creates.
//!
//! ## Sentinel values
//! - `prefetch = 0` → treated as 1 (a source is always asked for something)
//! - `bus_capacity = 0` → treated as 1 (enforced by `Bus`)
//!
//! # Example
//! ```
//! use zipbarrier::ZipConfig;
//!
//! let mut cfg = ZipConfig::default();
//! cfg.prefetch = 256;
//!
//! assert_eq!(cfg.prefetch_clamped(), 256);
//! assert_eq!(ZipConfig { prefetch: 0, ..cfg }.prefetch_clamped(), 1);
//! ```

/// Configuration for a zip operator.
///
/// ## Field semantics
/// - `prefetch`: values requested from each asynchronous source up front; also
///   the capacity of that source's buffer (min 1)
/// - `bus_capacity`: ring buffer size of a bus created by
///   [`ZipBuilder::with_events`](crate::ZipBuilder::with_events) (min 1)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ZipConfig {
    /// Initial demand per asynchronous source.
    ///
    /// After the first tuple, each consumed value is replaced by a request for
    /// exactly one more, so at most `prefetch` values are ever buffered.
    pub prefetch: usize,

    /// Capacity of the event bus broadcast channel.
    ///
    /// Slow listeners that lag behind more than `bus_capacity` events receive
    /// `Lagged` and skip older items.
    pub bus_capacity: usize,
}

impl ZipConfig {
    /// Returns the prefetch clamped to a minimum of 1.
    #[inline]
    pub fn prefetch_clamped(&self) -> usize {
        self.prefetch.max(1)
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for ZipConfig {
    /// Default configuration:
    ///
    /// - `prefetch = 32`
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            prefetch: 32,
            bus_capacity: 1024,
        }
    }
}
