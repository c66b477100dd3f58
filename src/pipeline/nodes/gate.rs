//! Gate node: a predicate over frames with a failure policy.
//!
//! | Policy   | Frame passes | Frame fails                              |
//! |----------|--------------|------------------------------------------|
//! | drop     | unchanged    | no frame this tick, stream stays open    |
//! | fatal    | unchanged    | `GateFailed` carrying the frame          |
//! | divert   | unchanged    | frame moved to the diverted stream       |
//!
//! Gates are non-fatal (drop) unless configured otherwise.

use crate::pipeline::args::{Binder, CapturedArgs, ElementConfig};
use crate::pipeline::error::{PipelineError, PipelineResult};
use crate::pipeline::id::ElementId;
use crate::pipeline::node::Frame;
use crate::pipeline::node_type::ElementKind;
use crate::pipeline::nodes::split::BufferWriter;
use crate::pipeline::topology::NodeSnapshot;

type PredicateFn<T> = Box<dyn FnMut(&T, &CapturedArgs) -> anyhow::Result<bool> + Send>;

enum FailurePolicy<T> {
    Drop,
    Fatal,
    Divert {
        writer: BufferWriter<T>,
        stream: ElementId,
    },
}

/// Gate: passes frames that satisfy its predicate.
pub struct Gate<T> {
    id: ElementId,
    binder: Binder<PredicateFn<T>>,
    policy: FailurePolicy<T>,
}

impl<T: Frame> Gate<T> {
    /// Non-fatal gate.
    pub fn new<F>(config: ElementConfig, predicate: F) -> Self
    where
        F: FnMut(&T, &CapturedArgs) -> anyhow::Result<bool> + Send + 'static,
    {
        let predicate: PredicateFn<T> = Box::new(predicate);
        Self {
            id: ElementId::next(),
            binder: Binder::new(config, predicate),
            policy: FailurePolicy::Drop,
        }
    }

    /// Gate whose predicate is a method on `receiver`.
    pub fn bound<R, F>(config: ElementConfig, mut receiver: R, mut method: F) -> Self
    where
        R: Send + 'static,
        F: FnMut(&mut R, &T, &CapturedArgs) -> anyhow::Result<bool> + Send + 'static,
    {
        Self::new(config, move |frame: &T, args: &CapturedArgs| {
            method(&mut receiver, frame, args)
        })
    }

    /// Make failures abort the stream (`true`) or drop the frame (`false`).
    pub fn fatal(mut self, fatal: bool) -> Self {
        self.policy = if fatal {
            FailurePolicy::Fatal
        } else {
            FailurePolicy::Drop
        };
        self
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    pub fn name(&self) -> &str {
        self.binder.config().name().unwrap_or("Gate")
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self.policy, FailurePolicy::Fatal)
    }

    /// Id of the stream receiving rejected frames, if this gate diverts.
    pub fn diverted_stream(&self) -> Option<ElementId> {
        match &self.policy {
            FailurePolicy::Divert { stream, .. } => Some(*stream),
            _ => None,
        }
    }

    /// Route rejected frames into `writer`. Replaces any fatal/drop policy.
    pub(crate) fn divert_into(&mut self, writer: BufferWriter<T>, stream: ElementId) {
        self.policy = FailurePolicy::Divert { writer, stream };
    }

    pub fn transform(&mut self, frame: T) -> PipelineResult<Option<T>> {
        if self.binder.call(&frame)? {
            return Ok(Some(frame));
        }

        match &mut self.policy {
            FailurePolicy::Drop => {
                tracing::trace!(gate = %self.id, "Gate dropped frame");
                Ok(None)
            }
            FailurePolicy::Fatal => Err(PipelineError::GateFailed {
                gate: self.id,
                name: self.binder.config().name().unwrap_or("Gate").to_string(),
                frame: Box::new(frame),
            }),
            FailurePolicy::Divert { writer, .. } => {
                writer.push(frame)?;
                Ok(None)
            }
        }
    }

    pub fn snapshot(&self) -> NodeSnapshot {
        let node = NodeSnapshot::new(self.id, ElementKind::Gate, self.binder.config());
        match self.diverted_stream() {
            Some(stream) => node.with_derived_stream(stream),
            None => node,
        }
    }
}
