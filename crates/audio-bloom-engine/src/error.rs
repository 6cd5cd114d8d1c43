//! Error types for the rendering engine.

use std::fmt;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, VizError>;

/// Which feed array a [`VizError::MalformedFeedData`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleStream {
    TimeDomain,
    Frequency,
}

impl fmt::Display for SampleStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SampleStream::TimeDomain => write!(f, "time-domain"),
            SampleStream::Frequency => write!(f, "frequency"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum VizError {
    /// `start` was called before a live analysis feed was attached
    #[error("no analysis feed attached")]
    NoFeedAttached,

    /// The surface has zero (or non-finite) extent; the frame's draws are skipped
    #[error("rendering surface unavailable ({width}x{height})")]
    SurfaceUnavailable { width: f32, height: f32 },

    /// A feed array did not have the length its transform size implies
    #[error("malformed {stream} data: expected {expected} samples, got {actual}")]
    MalformedFeedData {
        stream: SampleStream,
        expected: usize,
        actual: usize,
    },
}
