//! Barrier: a source that realigns frames from several named streams.
//!
//! ```text
//! [stream "a"] ─┐
//! [stream "b"] ─┼─► combine ─► buffer ─► window handler ─► oldest entry
//! [stream "c"] ─┘   {a,b,c}    (FIFO)     open / closed      or no frame
//! ```
//!
//! Every pull takes one frame from each open constituent (closed ones
//! contribute `None`), appends the combined frame to the buffer and hands the
//! whole buffer to the window handler. The handler may reorder or drop
//! entries; when it reports the window open the oldest entry is released.
//!
//! The barrier is closed once every constituent is closed, whatever is still
//! buffered. Pulling from a closed barrier drains the buffer oldest first
//! without consulting the handler, then fails with `SourceClosed`.

use crate::config::BarrierSettings;
use crate::pipeline::args::{Binder, CapturedArgs, ElementConfig};
use crate::pipeline::error::{PipelineError, PipelineResult};
use crate::pipeline::id::ElementId;
use crate::pipeline::node::{Frame, Pullable};
use crate::pipeline::node_type::ElementKind;
use crate::pipeline::nodes::sink::GuardSink;
use crate::pipeline::stream::Stream;
use crate::pipeline::topology::{BranchSnapshot, NodeSnapshot};
use std::collections::{BTreeMap, HashSet, VecDeque};

/// One frame (or no frame) per constituent stream, keyed by stream name.
pub type CombinedFrame<T> = BTreeMap<String, Option<T>>;

type WindowFn<T> =
    Box<dyn FnMut(&mut VecDeque<CombinedFrame<T>>, &CapturedArgs) -> anyhow::Result<bool> + Send>;

/// Synchronizes several streams into one stream of combined frames.
pub struct Barrier<T> {
    id: ElementId,
    streams: Vec<(String, Stream<T>)>,
    binder: Binder<WindowFn<T>>,
    buffer: VecDeque<CombinedFrame<T>>,
    buffer_limit: Option<usize>,
}

impl<T: Frame> Barrier<T> {
    /// Start building a barrier around a window handler.
    pub fn builder<F>(config: ElementConfig, window: F) -> BarrierBuilder<T>
    where
        F: FnMut(&mut VecDeque<CombinedFrame<T>>, &CapturedArgs) -> anyhow::Result<bool>
            + Send
            + 'static,
    {
        let window: WindowFn<T> = Box::new(window);
        BarrierBuilder {
            binder: Binder::new(config, window),
            streams: Vec::new(),
            settings: BarrierSettings::default(),
        }
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    pub fn name(&self) -> &str {
        self.binder.config().name().unwrap_or("Barrier")
    }

    /// Constituent streams in insertion order.
    pub fn streams(&self) -> impl Iterator<Item = (&str, &Stream<T>)> {
        self.streams.iter().map(|(name, stream)| (name.as_str(), stream))
    }

    /// Combined frames held back by the window handler.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    fn combine(&mut self) -> PipelineResult<CombinedFrame<T>> {
        let mut combined = CombinedFrame::new();
        for (name, stream) in &mut self.streams {
            let frame = if stream.is_closed() {
                None
            } else {
                stream.get_frame()?
            };
            combined.insert(name.clone(), frame);
        }
        Ok(combined)
    }
}

impl<T: Frame> Pullable<CombinedFrame<T>> for Barrier<T> {
    fn is_closed(&self) -> bool {
        self.streams.iter().all(|(_, stream)| stream.is_closed())
    }

    fn get_frame(&mut self) -> PipelineResult<Option<CombinedFrame<T>>> {
        if self.is_closed() {
            return match self.buffer.pop_front() {
                Some(frame) => Ok(Some(frame)),
                None => Err(PipelineError::SourceClosed { element: self.id }),
            };
        }

        // An overflow leaves the constituents unpulled.
        if let Some(limit) = self.buffer_limit {
            if self.buffer.len() >= limit {
                return Err(PipelineError::BufferOverflow {
                    element: self.id,
                    limit,
                });
            }
        }
        let combined = self.combine()?;
        self.buffer.push_back(combined);

        let open = self.binder.call(&mut self.buffer)?;
        tracing::trace!(
            barrier = %self.id,
            open,
            buffered = self.buffer.len(),
            "Barrier window evaluated"
        );

        if open {
            Ok(self.buffer.pop_front())
        } else {
            Ok(None)
        }
    }

    fn snapshot(&self) -> NodeSnapshot {
        let upstream = self
            .streams
            .iter()
            .map(|(name, stream)| BranchSnapshot {
                name: name.clone(),
                stream: stream.topology(),
            })
            .collect();
        NodeSnapshot::new(self.id, ElementKind::Barrier, self.binder.config())
            .with_upstream(upstream)
    }
}

/// Collects the constituent streams of a [`Barrier`].
pub struct BarrierBuilder<T> {
    binder: Binder<WindowFn<T>>,
    streams: Vec<(String, Stream<T>)>,
    settings: BarrierSettings,
}

impl<T: Frame> BarrierBuilder<T> {
    /// Attach a constituent stream under `name`.
    ///
    /// The stream's sink is replaced with a [`GuardSink`]: from now on its
    /// frames are only reachable through the barrier.
    pub fn stream(mut self, name: impl Into<String>, mut stream: Stream<T>) -> Self {
        let name = name.into();
        stream.set_sink(GuardSink::new(name.clone()));
        self.streams.push((name, stream));
        self
    }

    pub fn settings(mut self, settings: BarrierSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn build(self) -> PipelineResult<Barrier<T>> {
        if self.streams.is_empty() {
            return Err(PipelineError::Config(
                "a barrier needs at least one stream".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        for (name, _) in &self.streams {
            if !seen.insert(name.as_str()) {
                return Err(PipelineError::Config(format!(
                    "duplicate barrier stream name '{}'",
                    name
                )));
            }
        }

        let barrier = Barrier {
            id: ElementId::next(),
            streams: self.streams,
            binder: self.binder,
            buffer: VecDeque::new(),
            buffer_limit: self.settings.buffer_limit,
        };
        tracing::debug!(
            barrier = %barrier.id,
            streams = barrier.streams.len(),
            "Barrier built"
        );
        Ok(barrier)
    }
}
