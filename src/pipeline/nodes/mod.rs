//! Built-in pipeline elements.

pub mod barrier;
pub mod gate;
pub mod sink;
pub mod source;
pub mod split;
pub mod transformer;

pub use barrier::{Barrier, BarrierBuilder, CombinedFrame};
pub use gate::Gate;
pub use sink::{GuardSink, Sink};
pub use source::Source;
pub use split::{CloseLatch, SplitSource, SplitTap};
pub use transformer::Transformer;
