//! Sink nodes: the terminal consumers of a stream.

use crate::pipeline::args::{Binder, CapturedArgs, ElementConfig};
use crate::pipeline::error::{PipelineError, PipelineResult};
use crate::pipeline::id::ElementId;
use crate::pipeline::node::{Consumable, Frame};
use crate::pipeline::node_type::ElementKind;
use crate::pipeline::topology::NodeSnapshot;

type ConsumeFn<T> = Box<dyn FnMut(T, &CapturedArgs) -> anyhow::Result<()> + Send>;

/// Sink: hands each frame that survives the stream to a handler.
pub struct Sink<T> {
    id: ElementId,
    binder: Binder<ConsumeFn<T>>,
}

impl<T: Frame> Sink<T> {
    pub fn new<F>(config: ElementConfig, handler: F) -> Self
    where
        F: FnMut(T, &CapturedArgs) -> anyhow::Result<()> + Send + 'static,
    {
        let handler: ConsumeFn<T> = Box::new(handler);
        Self {
            id: ElementId::next(),
            binder: Binder::new(config, handler),
        }
    }

    /// Sink whose handler is a method on `receiver`.
    pub fn bound<R, F>(config: ElementConfig, mut receiver: R, mut method: F) -> Self
    where
        R: Send + 'static,
        F: FnMut(&mut R, T, &CapturedArgs) -> anyhow::Result<()> + Send + 'static,
    {
        Self::new(config, move |frame: T, args: &CapturedArgs| {
            method(&mut receiver, frame, args)
        })
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    pub fn name(&self) -> &str {
        self.binder.config().name().unwrap_or("Sink")
    }
}

impl<T: Frame> Consumable<T> for Sink<T> {
    fn consume(&mut self, frame: T) -> PipelineResult<()> {
        Ok(self.binder.call(frame)?)
    }

    fn snapshot(&self) -> NodeSnapshot {
        NodeSnapshot::new(self.id, ElementKind::Sink, self.binder.config())
    }
}

/// Sink installed on streams owned by a barrier. Frames must be pulled
/// through the barrier, so driving such a stream directly is an error.
#[derive(Debug)]
pub struct GuardSink {
    id: ElementId,
    stream: String,
}

impl GuardSink {
    pub fn new(stream: impl Into<String>) -> Self {
        Self {
            id: ElementId::next(),
            stream: stream.into(),
        }
    }

    pub fn id(&self) -> ElementId {
        self.id
    }
}

impl<T: Frame> Consumable<T> for GuardSink {
    fn consume(&mut self, _frame: T) -> PipelineResult<()> {
        Err(PipelineError::GuardedStream {
            stream: self.stream.clone(),
        })
    }

    fn snapshot(&self) -> NodeSnapshot {
        NodeSnapshot::bare(self.id, ElementKind::Sink, format!("guard:{}", self.stream))
    }
}
