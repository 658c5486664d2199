//! Per-source state for a publisher whose single value is available synchronously.

/// Holds a precomputed value and hands it out once.
///
/// The source counts as terminated the moment its value is consumed
/// (`request_more`) or the state is cancelled.
#[derive(Debug)]
pub(crate) struct ScalarState<T> {
    value: Option<T>,
    read: bool,
}

impl<T> ScalarState<T> {
    pub(crate) fn new(value: T) -> Self {
        Self {
            value: Some(value),
            read: false,
        }
    }

    pub(crate) fn read_next(&mut self) -> Option<T> {
        if self.read {
            return None;
        }
        self.value.take()
    }

    pub(crate) fn is_terminated(&self) -> bool {
        self.read
    }

    pub(crate) fn request_more(&mut self) {
        self.read = true;
    }

    pub(crate) fn cancel(&mut self) {
        self.read = true;
        self.value = None;
    }

    pub(crate) fn pending(&self) -> u64 {
        if self.value.is_some() { 1 } else { 0 }
    }
}
