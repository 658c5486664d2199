use crate::error::InvalidDemand;

/// Link between one subscriber and one publisher.
pub trait Subscription: Send + Sync {
    /// Adds `n` to the outstanding demand.
    ///
    /// `n == 0` is rejected with [`InvalidDemand`]. Demand saturates at `u64::MAX`,
    /// which means "unbounded".
    fn request(&self, n: u64) -> Result<(), InvalidDemand>;

    /// Stops the flow. Idempotent.
    fn cancel(&self);
}

/// Subscription that ignores everything; handed out when there is nothing to drive.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSubscription;

impl Subscription for NoopSubscription {
    fn request(&self, n: u64) -> Result<(), InvalidDemand> {
        if n == 0 {
            return Err(InvalidDemand { requested: n });
        }
        Ok(())
    }

    fn cancel(&self) {}
}
