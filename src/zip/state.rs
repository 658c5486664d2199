//! Uniform polling interface over the two kinds of per-source state.

use std::sync::Arc;

use super::buffer::SourceBuffer;
use super::scalar::ScalarState;

/// One upstream as seen by the drain loop.
///
/// Chosen at construction: publishers exposing a synchronous value become
/// [`SourceState::Scalar`], all others [`SourceState::Buffered`].
pub(crate) enum SourceState<T> {
    Scalar(ScalarState<T>),
    Buffered(Arc<SourceBuffer<T>>),
}

impl<T: Send + 'static> SourceState<T> {
    /// Takes the next available value, if any.
    pub(crate) fn read_next(&mut self) -> Option<T> {
        match self {
            SourceState::Scalar(s) => s.read_next(),
            SourceState::Buffered(b) => b.read_next(),
        }
    }

    /// `true` once the source can never produce another value.
    pub(crate) fn is_terminated(&self) -> bool {
        match self {
            SourceState::Scalar(s) => s.is_terminated(),
            SourceState::Buffered(b) => b.is_terminated(),
        }
    }

    /// Acknowledges the value consumed by the last tuple.
    pub(crate) fn request_more(&mut self) {
        match self {
            SourceState::Scalar(s) => s.request_more(),
            SourceState::Buffered(b) => b.request_more(),
        }
    }

    pub(crate) fn cancel(&mut self) {
        match self {
            SourceState::Scalar(s) => s.cancel(),
            SourceState::Buffered(b) => b.cancel(),
        }
    }

    /// Values ready to be read without waiting on the upstream.
    pub(crate) fn pending(&self) -> u64 {
        match self {
            SourceState::Scalar(s) => s.pending(),
            SourceState::Buffered(b) => b.pending(),
        }
    }
}
