//! Pipeline-specific error types.

use crate::pipeline::id::ElementId;
use std::any::Any;
use thiserror::Error;

/// Errors that can occur while building or driving a pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A frame was requested from an exhausted source. Callers must check
    /// `is_closed` first.
    #[error("Source {element} is closed")]
    SourceClosed { element: ElementId },

    /// A fatal gate rejected a frame.
    #[error("Gate '{name}' ({gate}) rejected a frame")]
    GateFailed {
        gate: ElementId,
        name: String,
        frame: Box<dyn Any + Send + Sync>,
    },

    /// A stream owned by a barrier tried to deliver to its sink.
    #[error("Stream '{stream}' belongs to a barrier and cannot be run on its own")]
    GuardedStream { stream: String },

    #[error("Stream {stream} has no sink attached")]
    NoSink { stream: ElementId },

    #[error("Buffer of {element} exceeded its limit of {limit} frames")]
    BufferOverflow { element: ElementId, limit: usize },

    #[error("Configuration error: {0}")]
    Config(String),

    /// Error raised by a user-supplied handler, passed through untouched.
    #[error(transparent)]
    Handler(#[from] anyhow::Error),
}

impl PipelineError {
    /// The frame carried by a `GateFailed` error, if it is of type `T`.
    pub fn failed_frame<T: 'static>(&self) -> Option<&T> {
        match self {
            PipelineError::GateFailed { frame, .. } => frame.downcast_ref::<T>(),
            _ => None,
        }
    }

    /// Take ownership of the frame carried by a `GateFailed` error.
    pub fn into_failed_frame<T: 'static>(self) -> Option<T> {
        match self {
            PipelineError::GateFailed { frame, .. } => frame.downcast::<T>().ok().map(|f| *f),
            _ => None,
        }
    }

    pub fn is_source_closed(&self) -> bool {
        matches!(self, PipelineError::SourceClosed { .. })
    }
}

pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_failed_carries_frame() {
        let err = PipelineError::GateFailed {
            gate: ElementId(3),
            name: "positive".to_string(),
            frame: Box::new(-4i64),
        };
        assert_eq!(err.to_string(), "Gate 'positive' (#3) rejected a frame");
        assert_eq!(err.failed_frame::<i64>(), Some(&-4));
        assert_eq!(err.failed_frame::<String>(), None);
        assert_eq!(err.into_failed_frame::<i64>(), Some(-4));
    }

    #[test]
    fn test_handler_error_is_transparent() {
        let err = PipelineError::from(anyhow::anyhow!("disk on fire"));
        assert_eq!(err.to_string(), "disk on fire");
    }

    #[test]
    fn test_source_closed_display() {
        let err = PipelineError::SourceClosed {
            element: ElementId(12),
        };
        assert!(err.is_source_closed());
        assert_eq!(err.to_string(), "Source #12 is closed");
    }
}
