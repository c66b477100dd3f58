//! Element abstraction for the pipeline.
//!
//! Two-layer design:
//! - **Capability traits**: `Pullable` (sources, barriers), `Transformable`
//!   (stages) and `Consumable` (sinks). Anything implementing them can be
//!   plugged into a stream.
//! - **`Stage` enum**: the built-in stages, dispatched with a `match`;
//!   `Stage::Plugin` boxes any other `Transformable`.

use crate::pipeline::error::PipelineResult;
use crate::pipeline::nodes::{Gate, SplitTap, Transformer};
use crate::pipeline::topology::NodeSnapshot;

/// Values that can travel through a stream.
pub trait Frame: Send + Sync + 'static {}

impl<T: Send + Sync + 'static> Frame for T {}

/// Something a stream can pull frames from.
pub trait Pullable<T>: Send {
    /// Whether more frames can be pulled. Must never go from `true` back to
    /// `false`.
    fn is_closed(&self) -> bool;

    /// Pull the next frame. `Ok(None)` means nothing was produced this tick.
    /// Fails with `SourceClosed` once closed.
    fn get_frame(&mut self) -> PipelineResult<Option<T>>;

    /// Describe this element. Elements pulling from other streams include
    /// them as upstream branches.
    fn snapshot(&self) -> NodeSnapshot;
}

/// A stage between a stream's source and its sink.
pub trait Transformable<T>: Send {
    /// Transform a frame. `Ok(None)` ends the current tick.
    fn transform(&mut self, frame: T) -> PipelineResult<Option<T>>;

    fn snapshot(&self) -> NodeSnapshot;
}

/// Terminal consumer of a stream.
pub trait Consumable<T>: Send {
    fn consume(&mut self, frame: T) -> PipelineResult<()>;

    fn snapshot(&self) -> NodeSnapshot;
}

/// Enum dispatch for stream stages.
pub enum Stage<T> {
    Transformer(Transformer<T>),
    Gate(Gate<T>),
    Split(SplitTap<T>),
    Plugin(Box<dyn Transformable<T>>),
}

impl<T: Frame> Stage<T> {
    pub fn transform(&mut self, frame: T) -> PipelineResult<Option<T>> {
        match self {
            Stage::Transformer(n) => n.transform(frame),
            Stage::Gate(n) => n.transform(frame),
            Stage::Split(n) => n.transform(frame),
            Stage::Plugin(n) => n.transform(frame),
        }
    }

    pub fn snapshot(&self) -> NodeSnapshot {
        match self {
            Stage::Transformer(n) => n.snapshot(),
            Stage::Gate(n) => n.snapshot(),
            Stage::Split(n) => n.snapshot(),
            Stage::Plugin(n) => n.snapshot(),
        }
    }
}

impl<T> From<Transformer<T>> for Stage<T> {
    fn from(node: Transformer<T>) -> Self {
        Stage::Transformer(node)
    }
}

impl<T> From<Gate<T>> for Stage<T> {
    fn from(node: Gate<T>) -> Self {
        Stage::Gate(node)
    }
}

impl<T> From<SplitTap<T>> for Stage<T> {
    fn from(node: SplitTap<T>) -> Self {
        Stage::Split(node)
    }
}

impl<T> From<Box<dyn Transformable<T>>> for Stage<T> {
    fn from(node: Box<dyn Transformable<T>>) -> Self {
        Stage::Plugin(node)
    }
}
