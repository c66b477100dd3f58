//! Transformer node: applies a handler to every frame.

use crate::pipeline::args::{Binder, CapturedArgs, ElementConfig};
use crate::pipeline::error::PipelineResult;
use crate::pipeline::id::ElementId;
use crate::pipeline::node::Frame;
use crate::pipeline::node_type::ElementKind;
use crate::pipeline::topology::NodeSnapshot;

type TransformFn<T> = Box<dyn FnMut(T, &CapturedArgs) -> anyhow::Result<Option<T>> + Send>;

/// Transformer: replaces each frame with the handler's result.
///
/// The handler decides whether a frame continues; returning `None` ends the
/// current tick without reaching the sink.
pub struct Transformer<T> {
    id: ElementId,
    binder: Binder<TransformFn<T>>,
}

impl<T: Frame> Transformer<T> {
    pub fn new<F>(config: ElementConfig, handler: F) -> Self
    where
        F: FnMut(T, &CapturedArgs) -> anyhow::Result<Option<T>> + Send + 'static,
    {
        let handler: TransformFn<T> = Box::new(handler);
        Self {
            id: ElementId::next(),
            binder: Binder::new(config, handler),
        }
    }

    /// Transformer whose handler always produces a frame.
    pub fn map<F>(config: ElementConfig, mut handler: F) -> Self
    where
        F: FnMut(T, &CapturedArgs) -> anyhow::Result<T> + Send + 'static,
    {
        Self::new(config, move |frame: T, args: &CapturedArgs| {
            handler(frame, args).map(Some)
        })
    }

    /// Transformer whose handler is a method on `receiver`.
    pub fn bound<R, F>(config: ElementConfig, mut receiver: R, mut method: F) -> Self
    where
        R: Send + 'static,
        F: FnMut(&mut R, T, &CapturedArgs) -> anyhow::Result<Option<T>> + Send + 'static,
    {
        Self::new(config, move |frame: T, args: &CapturedArgs| {
            method(&mut receiver, frame, args)
        })
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    pub fn name(&self) -> &str {
        self.binder.config().name().unwrap_or("Transformer")
    }

    pub fn transform(&mut self, frame: T) -> PipelineResult<Option<T>> {
        Ok(self.binder.call(frame)?)
    }

    pub fn snapshot(&self) -> NodeSnapshot {
        NodeSnapshot::new(self.id, ElementKind::Transformer, self.binder.config())
    }
}
