use std::fmt;
use std::sync::Arc;

use super::barrier::Combinator;
use super::publisher::{Settings, ZipPublisher};
use crate::config::ZipConfig;
use crate::error::BoxError;
use crate::events::Bus;
use crate::reactive::Publisher;

/// Builder for a named, configured zip operator.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use zipbarrier::{Publisher, ZipConfig, ZipPublisher, sources::FromIter};
///
/// let zip = ZipPublisher::builder(vec![
///     Arc::new(FromIter::new(1u32..=3)) as Arc<dyn Publisher<u32>>,
///     Arc::new(FromIter::new(10u32..=30)),
/// ])
/// .name("pairs")
/// .config(ZipConfig { prefetch: 4, ..ZipConfig::default() })
/// .with_events()
/// .combine(|t: &[u32]| Ok(t[0] + t[1]))
/// .build();
///
/// assert_eq!(zip.name(), Some("pairs"));
/// assert!(zip.bus().is_some());
/// ```
pub struct ZipBuilder<T, R> {
    sources: Vec<Arc<dyn Publisher<T>>>,
    combinator: Combinator<T, R>,
    name: Option<Arc<str>>,
    cfg: ZipConfig,
    bus: Option<Bus>,
    events: bool,
}

impl<T> ZipBuilder<T, Vec<T>>
where
    T: Clone + fmt::Debug + Send + 'static,
{
    /// Creates a builder that emits one `Vec` per tuple.
    pub fn new(sources: Vec<Arc<dyn Publisher<T>>>) -> Self {
        let combinator: Combinator<T, Vec<T>> =
            Arc::new(|tuple: &[T]| Ok::<_, BoxError>(tuple.to_vec()));
        Self {
            sources,
            combinator,
            name: None,
            cfg: ZipConfig::default(),
            bus: None,
            events: false,
        }
    }
}

impl<T, R> ZipBuilder<T, R>
where
    T: fmt::Debug + Send + 'static,
    R: Send + 'static,
{
    /// Names the operator; the name tags every event its barriers publish.
    pub fn name(mut self, name: impl Into<Arc<str>>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn config(mut self, cfg: ZipConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Publishes lifecycle events to an existing bus.
    ///
    /// Several operators may share one bus.
    pub fn bus(mut self, bus: Bus) -> Self {
        self.bus = Some(bus);
        self
    }

    /// Publishes lifecycle events to a dedicated bus sized by
    /// [`ZipConfig::bus_capacity`]. Ignored when [`bus`](Self::bus) was set.
    pub fn with_events(mut self) -> Self {
        self.events = true;
        self
    }

    /// Replaces the combinator.
    pub fn combine<R2, F>(self, combinator: F) -> ZipBuilder<T, R2>
    where
        R2: Send + 'static,
        F: Fn(&[T]) -> Result<R2, BoxError> + Send + Sync + 'static,
    {
        ZipBuilder {
            sources: self.sources,
            combinator: Arc::new(combinator),
            name: self.name,
            cfg: self.cfg,
            bus: self.bus,
            events: self.events,
        }
    }

    /// Builds the operator.
    pub fn build(self) -> ZipPublisher<T, R> {
        let bus = match (self.bus, self.events) {
            (Some(bus), _) => Some(bus),
            (None, true) => Some(Bus::new(self.cfg.bus_capacity_clamped())),
            (None, false) => None,
        };
        ZipPublisher::from_parts(
            self.sources,
            self.combinator,
            Settings {
                name: self.name,
                prefetch: self.cfg.prefetch_clamped(),
                bus,
            },
        )
    }
}
