//! Stream: one source, an ordered chain of stages and a sink.
//!
//! ```text
//! run() ─► tick() ─► get_frame() ─► source ─► stage 1 ─► ... ─► sink
//!                                             │ None
//!                                             └─► tick ends, nothing delivered
//! ```
//!
//! A stream is closed exactly when its source is closed; stages that drop
//! frames never close it. Closure is published on a [`CloseLatch`] that
//! derived (split and divert) streams watch.

use crate::config::StreamSettings;
use crate::pipeline::error::{PipelineError, PipelineResult};
use crate::pipeline::id::ElementId;
use crate::pipeline::node::{Consumable, Frame, Pullable, Stage};
use crate::pipeline::nodes::split::{buffer, CloseLatch, SplitSource, SplitTap};
use crate::pipeline::nodes::Gate;
use crate::pipeline::topology::StreamTopology;

/// Outcome of a single [`Stream::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// The source is closed; nothing was pulled.
    Closed,
    /// A frame reached the sink.
    Delivered,
    /// A frame was pulled but a stage produced no frame.
    Dropped,
}

/// Counters returned by [`Stream::run`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub pulled: u64,
    pub delivered: u64,
    pub dropped: u64,
}

/// A pull-driven pipeline.
///
/// Stages are owned by the stream they are added to, so one stage can never
/// serve two streams:
///
/// ```compile_fail
/// use strom::pipeline::{ElementConfig, Gate, Source, Stream};
///
/// let source = || Source::batch(ElementConfig::new(), |_: &_| Ok(vec![1i64]));
/// let gate = Gate::new(ElementConfig::new(), |frame: &i64, _| Ok(*frame > 0));
/// let mut first = Stream::new(source());
/// let mut second = Stream::new(source());
/// first.add(gate);
/// second.add(gate);
/// ```
pub struct Stream<T> {
    id: ElementId,
    name: Option<String>,
    source: Box<dyn Pullable<T>>,
    stages: Vec<Stage<T>>,
    sink: Option<Box<dyn Consumable<T>>>,
    settings: StreamSettings,
    closed: CloseLatch,
    started: bool,
}

impl<T: Frame> Stream<T> {
    pub fn new(source: impl Pullable<T> + 'static) -> Self {
        Self::with_settings(source, StreamSettings::default())
    }

    pub fn with_settings(source: impl Pullable<T> + 'static, settings: StreamSettings) -> Self {
        Self {
            id: ElementId::next(),
            name: None,
            source: Box::new(source),
            stages: Vec::new(),
            sink: None,
            settings,
            closed: CloseLatch::new(),
            started: false,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_sink(mut self, sink: impl Consumable<T> + 'static) -> Self {
        self.set_sink(sink);
        self
    }

    /// Attach a sink, replacing any previous one.
    pub fn set_sink(&mut self, sink: impl Consumable<T> + 'static) {
        self.sink = Some(Box::new(sink));
    }

    /// Append a stage. Stages added after pulling began only see later frames.
    pub fn add(&mut self, stage: impl Into<Stage<T>>) -> &mut Self {
        if self.started {
            tracing::warn!(stream = %self.id, "Stage added to a stream that is already running");
        }
        self.stages.push(stage.into());
        self
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn settings(&self) -> &StreamSettings {
        &self.settings
    }

    pub fn source(&self) -> &dyn Pullable<T> {
        self.source.as_ref()
    }

    pub fn stages(&self) -> &[Stage<T>] {
        &self.stages
    }

    pub fn sink(&self) -> Option<&dyn Consumable<T>> {
        self.sink.as_deref()
    }

    /// Whether the source is exhausted. Once true, stays true.
    pub fn is_closed(&self) -> bool {
        self.publish_closure()
    }

    /// Pull one frame and fold it through the stages.
    ///
    /// Returns `Ok(None)` as soon as the source or any stage yields no frame;
    /// later stages are skipped for this tick.
    pub fn get_frame(&mut self) -> PipelineResult<Option<T>> {
        if !self.started {
            self.started = true;
            tracing::debug!(stream = %self.id, name = ?self.name, "Stream started");
        }

        let frame = self.pull_through_stages();
        // After the stages, so derived streams already hold the last frame.
        self.publish_closure();
        frame
    }

    fn pull_through_stages(&mut self) -> PipelineResult<Option<T>> {
        let Some(mut frame) = self.source.get_frame()? else {
            return Ok(None);
        };
        for stage in &mut self.stages {
            match stage.transform(frame)? {
                Some(next) => frame = next,
                None => return Ok(None),
            }
        }
        Ok(Some(frame))
    }

    /// Set the close latch once the source reports closed.
    fn publish_closure(&self) -> bool {
        if self.closed.is_closed() {
            return true;
        }
        if self.source.is_closed() {
            tracing::debug!(stream = %self.id, "Stream source closed");
            self.closed.close();
            return true;
        }
        false
    }

    /// One iteration of the run loop.
    pub fn tick(&mut self) -> PipelineResult<Tick> {
        if self.sink.is_none() {
            return Err(PipelineError::NoSink { stream: self.id });
        }
        if self.is_closed() {
            return Ok(Tick::Closed);
        }

        let Some(frame) = self.get_frame()? else {
            return Ok(Tick::Dropped);
        };
        if let Some(sink) = self.sink.as_mut() {
            sink.consume(frame)?;
        }
        Ok(Tick::Delivered)
    }

    /// Drive the stream until its source closes or an error occurs.
    pub fn run(&mut self) -> PipelineResult<RunSummary> {
        let mut summary = RunSummary::default();
        loop {
            match self.tick()? {
                Tick::Closed => break,
                Tick::Delivered => summary.delivered += 1,
                Tick::Dropped => summary.dropped += 1,
            }
            summary.pulled += 1;
        }
        tracing::debug!(
            stream = %self.id,
            pulled = summary.pulled,
            delivered = summary.delivered,
            dropped = summary.dropped,
            "Stream finished"
        );
        Ok(summary)
    }

    /// Mirror every frame reaching this point of the stream into a new stream.
    ///
    /// The returned stream has no stages and no sink. Both streams must be
    /// driven; frames wait in an unbounded buffer (unless
    /// `split_buffer_limit` is set) until the derived stream pulls them. A
    /// derived pull that finds the buffer empty yields no frame unless
    /// `split_wait` is set.
    pub fn split(&mut self) -> Stream<T>
    where
        T: Clone,
    {
        let tap_id = ElementId::next();
        let (writer, rx) = buffer(tap_id, self.settings.split_buffer_limit);
        let derived = self.derived_stream(rx);
        tracing::debug!(stream = %self.id, derived = %derived.id, "Stream split");
        self.add(SplitTap::new(tap_id, writer, derived.id, T::clone));
        derived
    }

    /// Append `gate` so that frames it rejects flow into the returned stream
    /// instead of being dropped.
    pub fn divert(&mut self, mut gate: Gate<T>) -> Stream<T> {
        let (writer, rx) = buffer(gate.id(), self.settings.split_buffer_limit);
        let derived = self.derived_stream(rx);
        tracing::debug!(
            stream = %self.id,
            derived = %derived.id,
            gate = %gate.id(),
            "Gate diverted"
        );
        gate.divert_into(writer, derived.id);
        self.add(gate);
        derived
    }

    fn derived_stream(&self, rx: crossbeam_channel::Receiver<T>) -> Stream<T> {
        let source = SplitSource::new(rx, self.closed.clone(), self.settings.split_wait_interval());
        Stream::with_settings(source, self.settings.clone())
    }

    /// Read-only snapshot of this stream and everything upstream of it.
    pub fn topology(&self) -> StreamTopology {
        StreamTopology {
            id: self.id,
            name: self.name.clone(),
            source: self.source.snapshot(),
            stages: self.stages.iter().map(Stage::snapshot).collect(),
            sink: self.sink.as_ref().map(|sink| sink.snapshot()),
        }
    }
}
