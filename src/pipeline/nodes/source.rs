//! Source node: originates the frames of a stream.
//!
//! Two delivery modes:
//! - **Batch**: the handler returns a whole collection on the first pull; each
//!   pull then removes the oldest remaining frame (FIFO). Closed once the
//!   collection has been materialized and drained.
//! - **On demand**: each pull invokes the handler for exactly one frame. A
//!   closing predicate decides when the source is exhausted; once it reports
//!   closed the source stays closed.

use crate::pipeline::args::{Binder, CapturedArgs, ElementConfig};
use crate::pipeline::error::{PipelineError, PipelineResult};
use crate::pipeline::id::ElementId;
use crate::pipeline::node::{Frame, Pullable};
use crate::pipeline::node_type::ElementKind;
use crate::pipeline::topology::NodeSnapshot;
use std::cell::Cell;
use std::collections::VecDeque;

type BatchFn<T> = Box<dyn FnMut(&CapturedArgs) -> anyhow::Result<VecDeque<T>> + Send>;
type ProduceFn<T> = Box<dyn FnMut(&CapturedArgs) -> anyhow::Result<T> + Send>;
type CloserFn = Box<dyn Fn() -> bool + Send>;

enum Mode<T> {
    Batch {
        binder: Binder<BatchFn<T>>,
        /// `None` until the first pull.
        pending: Option<VecDeque<T>>,
    },
    OnDemand {
        binder: Binder<ProduceFn<T>>,
        closer: CloserFn,
        closed: Cell<bool>,
    },
}

/// A frame source.
pub struct Source<T> {
    id: ElementId,
    mode: Mode<T>,
}

impl<T: Frame> Source<T> {
    /// Source that materializes all of its frames on the first pull.
    pub fn batch<F, I>(config: ElementConfig, mut handler: F) -> Self
    where
        F: FnMut(&CapturedArgs) -> anyhow::Result<I> + Send + 'static,
        I: IntoIterator<Item = T>,
    {
        let materialize: BatchFn<T> =
            Box::new(move |args: &CapturedArgs| Ok(handler(args)?.into_iter().collect()));
        Self {
            id: ElementId::next(),
            mode: Mode::Batch {
                binder: Binder::new(config, materialize),
                pending: None,
            },
        }
    }

    /// Source that produces one frame per pull until `closer` returns true.
    pub fn on_demand<F, C>(config: ElementConfig, handler: F, closer: C) -> Self
    where
        F: FnMut(&CapturedArgs) -> anyhow::Result<T> + Send + 'static,
        C: Fn() -> bool + Send + 'static,
    {
        let produce: ProduceFn<T> = Box::new(handler);
        Self {
            id: ElementId::next(),
            mode: Mode::OnDemand {
                binder: Binder::new(config, produce),
                closer: Box::new(closer),
                closed: Cell::new(false),
            },
        }
    }

    /// On-demand source whose handler is a method on `receiver`.
    pub fn on_demand_bound<R, F, C>(
        config: ElementConfig,
        mut receiver: R,
        mut method: F,
        closer: C,
    ) -> Self
    where
        R: Send + 'static,
        F: FnMut(&mut R, &CapturedArgs) -> anyhow::Result<T> + Send + 'static,
        C: Fn() -> bool + Send + 'static,
    {
        Self::on_demand(
            config,
            move |args: &CapturedArgs| method(&mut receiver, args),
            closer,
        )
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    pub fn name(&self) -> &str {
        self.config().name().unwrap_or("Source")
    }

    pub fn config(&self) -> &ElementConfig {
        match &self.mode {
            Mode::Batch { binder, .. } => binder.config(),
            Mode::OnDemand { binder, .. } => binder.config(),
        }
    }

    pub fn is_batch(&self) -> bool {
        matches!(self.mode, Mode::Batch { .. })
    }

    /// Frames left in a materialized batch. `None` before the first pull and
    /// for on-demand sources.
    pub fn remaining(&self) -> Option<usize> {
        match &self.mode {
            Mode::Batch { pending, .. } => pending.as_ref().map(VecDeque::len),
            Mode::OnDemand { .. } => None,
        }
    }
}

impl<T: Frame> Pullable<T> for Source<T> {
    fn is_closed(&self) -> bool {
        match &self.mode {
            Mode::Batch { pending, .. } => pending.as_ref().is_some_and(VecDeque::is_empty),
            Mode::OnDemand { closer, closed, .. } => {
                if closed.get() {
                    return true;
                }
                let now_closed = closer();
                if now_closed {
                    closed.set(true);
                }
                now_closed
            }
        }
    }

    fn get_frame(&mut self) -> PipelineResult<Option<T>> {
        if self.is_closed() {
            return Err(PipelineError::SourceClosed { element: self.id });
        }

        match &mut self.mode {
            Mode::Batch { binder, pending } => {
                if pending.is_none() {
                    let frames = binder.call_bare()?;
                    tracing::debug!(
                        source = %self.id,
                        frames = frames.len(),
                        "Materialized batch source"
                    );
                    *pending = Some(frames);
                }
                Ok(pending.as_mut().and_then(VecDeque::pop_front))
            }
            Mode::OnDemand { binder, .. } => Ok(Some(binder.call_bare()?)),
        }
    }

    fn snapshot(&self) -> NodeSnapshot {
        NodeSnapshot::new(self.id, ElementKind::Source, self.config())
    }
}
