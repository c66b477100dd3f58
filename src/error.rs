//! Error handling for strom
//!
//! Pipeline operations return [`PipelineError`](crate::pipeline::PipelineError).
//! This module defines the crate-level error used around them (configuration
//! files, logging setup) and a Result alias for those operations.

use crate::pipeline::PipelineError;
use thiserror::Error;

/// Main error type for strom operations outside the pipeline core
#[derive(Error, Debug)]
pub enum StromError {
    /// Errors raised while driving a pipeline
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// Errors related to configuration values
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parse errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<StromError>,
    },
}

impl StromError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        StromError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error, skipping context layers
    pub fn root(&self) -> &StromError {
        match self {
            StromError::WithContext { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Result type alias for strom operations
pub type Result<T> = std::result::Result<T, StromError>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error result
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context lazily to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.with_context(f()))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, PipelineError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| StromError::from(e).with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| StromError::from(e).with_context(f()))
    }
}
