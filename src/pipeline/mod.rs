//! Pull-based stream pipeline.
//!
//! Frames are pulled from a source, folded through an ordered chain of stages
//! and handed to a sink. Nothing runs unless a caller drives a stream.
//!
//! # Architecture
//!
//! ```text
//! [Source] ──► [Transformer] ──► [Gate] ──► [SplitTap] ──► [Sink]
//!                                               │
//!                                               ▼
//!                                   [SplitSource] ──► ... ──► [Sink]
//!
//! [Stream a] ─┐
//! [Stream b] ─┴─► [Barrier] ──► ... ──► [Sink]
//! ```
//!
//! # Design
//!
//! - **Enum dispatch for stages**: `Stage` covers the built-in stages;
//!   `Transformable` trait objects plug in anything else.
//! - **Explicit configuration**: every element is built from an
//!   `ElementConfig` (name plus captured arguments) and a typed handler.
//! - **Ownership over checks**: adding a stage moves it into its stream; a
//!   barrier takes its constituent streams.
//! - **Channels between streams**: split and divert buffers are crossbeam
//!   channels, so the two ends may live on different threads.

pub mod args;
pub mod error;
pub mod id;
pub mod node;
pub mod node_type;
pub mod nodes;
pub mod stream;
pub mod topology;

pub use args::{ArgDescriptor, Binder, CapturedArgs, ConfigValue, ElementConfig};
pub use error::{PipelineError, PipelineResult};
pub use id::ElementId;
pub use node::{Consumable, Frame, Pullable, Stage, Transformable};
pub use node_type::ElementKind;
pub use nodes::{
    Barrier, BarrierBuilder, CloseLatch, CombinedFrame, Gate, GuardSink, Sink, Source, SplitSource,
    SplitTap, Transformer,
};
pub use stream::{RunSummary, Stream, Tick};
pub use topology::{BranchSnapshot, NodeSnapshot, StreamTopology};
