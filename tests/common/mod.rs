//! Common test utilities and helpers

#![allow(dead_code)] // Test utilities may not all be used in every test file

pub mod builders;
pub mod mock_helpers;

use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Upper bound for tests that drive streams from several threads
pub fn test_timeout() -> Duration {
    Duration::from_secs(5)
}

/// Frames collected by a sink, shared with the test body
pub type Collected<T> = Arc<Mutex<Vec<T>>>;

/// Snapshot of the collected frames
pub fn collected<T: Clone>(frames: &Collected<T>) -> Vec<T> {
    frames.lock().unwrap().clone()
}
