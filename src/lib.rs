//! # strom: pull-based stream pipelines
//!
//! A small dataflow engine. A [`Stream`](pipeline::Stream) pulls frames from a
//! source, folds them through transformers and gates and hands survivors to a
//! sink. Streams can be split into independently driven copies, and several
//! streams can be realigned into one by a [`Barrier`](pipeline::Barrier).
//!
//! ## Architecture
//!
//! - **Pipeline**: elements, streams, split buffers and barriers
//! - **Config**: engine defaults loaded from JSON or TOML
//! - **Logging**: `tracing` subscriber setup for drivers
//!
//! ## Example
//!
//! ```
//! use strom::pipeline::{CapturedArgs, ElementConfig, Gate, Sink, Source, Stream, Transformer};
//!
//! let source = Source::batch(ElementConfig::new().arg(20), |args: &CapturedArgs| {
//!     Ok(0..args.int(0, "up_until")?)
//! });
//! let sink = Sink::new(ElementConfig::new(), |frame: i64, _| {
//!     println!("{frame}");
//!     Ok(())
//! });
//!
//! let mut stream = Stream::new(source).with_sink(sink);
//! stream
//!     .add(Transformer::map(ElementConfig::new().kwarg("number", 10), |frame: i64, args| {
//!         Ok(frame + args.int(0, "number")?)
//!     }))
//!     .add(Gate::new(ElementConfig::new(), |frame: &i64, _| Ok(frame % 2 == 0)));
//!
//! let summary = stream.run()?;
//! assert_eq!(summary.delivered, 10);
//! # Ok::<(), strom::pipeline::PipelineError>(())
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod pipeline;

// Re-export commonly used types
pub use config::{BarrierSettings, EngineConfig, LoggingConfig, StreamSettings};
pub use error::{Result, ResultExt, StromError};
pub use pipeline::{PipelineError, PipelineResult, Stream};
