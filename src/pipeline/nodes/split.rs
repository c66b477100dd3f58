//! Split: mirrors a stream's frames into an independently drained stream.
//!
//! ```text
//! origin:  [Source] ──► ... ──► [SplitTap] ──► ... ──► [Sink]
//!                                   │ clone
//!                                   ▼
//!                          ┌─────────────────┐
//!                          │ buffer (FIFO)   │
//!                          └────────┬────────┘
//! derived:                   [SplitSource] ──► ... ──► [Sink]
//! ```
//!
//! The buffer is a crossbeam channel, unbounded unless
//! `StreamSettings::split_buffer_limit` is set. Nothing slows the origin down
//! when the derived stream lags; an undrained derived stream grows the buffer
//! without limit. Both streams must be driven separately, from one thread or
//! from two.
//!
//! The derived source is closed once the origin stream is closed and the
//! buffer is empty. The origin publishes its closure through a [`CloseLatch`]
//! after the pull that exhausted its source, so the last frame has already
//! passed the tap.
//!
//! An empty buffer with the origin still open yields no frame, so a derived
//! stream may be pulled before its origin on the same thread (a barrier
//! listing it first, for instance). With `StreamSettings::split_wait` the pull
//! instead waits for a frame or for the origin to close, for origin and
//! derived stream running on different threads.

use crate::pipeline::error::{PipelineError, PipelineResult};
use crate::pipeline::id::ElementId;
use crate::pipeline::node::{Frame, Pullable};
use crate::pipeline::node_type::ElementKind;
use crate::pipeline::topology::NodeSnapshot;
use crossbeam_channel::{
    bounded, unbounded, Receiver, RecvTimeoutError, Sender, TryRecvError, TrySendError,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// One-way flag recording that a stream's source has closed.
#[derive(Debug, Clone, Default)]
pub struct CloseLatch(Arc<AtomicBool>);

impl CloseLatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn close(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_closed(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Write half of a split buffer.
pub(crate) struct BufferWriter<T> {
    tx: Sender<T>,
    owner: ElementId,
    limit: Option<usize>,
}

impl<T> BufferWriter<T> {
    /// Queue a frame. A dropped reader discards the frame; a full bounded
    /// buffer is an error.
    pub(crate) fn push(&self, frame: T) -> PipelineResult<()> {
        match self.tx.try_send(frame) {
            Ok(()) | Err(TrySendError::Disconnected(_)) => Ok(()),
            Err(TrySendError::Full(_)) => Err(PipelineError::BufferOverflow {
                element: self.owner,
                limit: self.limit.unwrap_or(0),
            }),
        }
    }
}

/// Create a split buffer owned by `owner`.
pub(crate) fn buffer<T>(owner: ElementId, limit: Option<usize>) -> (BufferWriter<T>, Receiver<T>) {
    let (tx, rx) = match limit {
        Some(n) => bounded(n),
        None => unbounded(),
    };
    (BufferWriter { tx, owner, limit }, rx)
}

/// Passthrough stage feeding a derived stream.
pub struct SplitTap<T> {
    id: ElementId,
    derived: ElementId,
    writer: BufferWriter<T>,
    duplicate: fn(&T) -> T,
}

impl<T: Frame> SplitTap<T> {
    pub(crate) fn new(
        id: ElementId,
        writer: BufferWriter<T>,
        derived: ElementId,
        duplicate: fn(&T) -> T,
    ) -> Self {
        Self {
            id,
            derived,
            writer,
            duplicate,
        }
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    /// Id of the stream this tap feeds.
    ///
    /// The derived stream is owned by whoever called `Stream::split`, not by
    /// the tap. Its [`StreamTopology`](crate::pipeline::topology::StreamTopology)
    /// carries the same id, which is how a snapshot of the origin is joined
    /// to a snapshot of the derived stream.
    pub fn derived_stream(&self) -> ElementId {
        self.derived
    }

    pub fn transform(&mut self, frame: T) -> PipelineResult<Option<T>> {
        self.writer.push((self.duplicate)(&frame))?;
        Ok(Some(frame))
    }

    pub fn snapshot(&self) -> NodeSnapshot {
        NodeSnapshot::bare(self.id, ElementKind::Split, "split").with_derived_stream(self.derived)
    }
}

/// Source of a derived stream; drains a split buffer.
pub struct SplitSource<T> {
    id: ElementId,
    rx: Receiver<T>,
    origin: CloseLatch,
    wait: Option<Duration>,
    disconnected: bool,
}

impl<T: Frame> SplitSource<T> {
    /// `wait` is the poll interval of a blocking pull; `None` never blocks.
    pub(crate) fn new(rx: Receiver<T>, origin: CloseLatch, wait: Option<Duration>) -> Self {
        Self {
            id: ElementId::next(),
            rx,
            origin,
            wait,
            disconnected: false,
        }
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    /// Frames waiting in the buffer.
    pub fn buffered(&self) -> usize {
        self.rx.len()
    }

    fn origin_dropped(&mut self) {
        tracing::debug!(source = %self.id, "Split origin dropped");
        self.disconnected = true;
    }
}

impl<T: Frame> Pullable<T> for SplitSource<T> {
    fn is_closed(&self) -> bool {
        // Latch first: a frame pushed before the latch closed is then visible.
        (self.disconnected || self.origin.is_closed()) && self.rx.is_empty()
    }

    /// Returns no frame while the buffer is empty, unless waiting is enabled:
    /// then blocks until a frame arrives or the origin closes.
    fn get_frame(&mut self) -> PipelineResult<Option<T>> {
        if self.is_closed() {
            return Err(PipelineError::SourceClosed { element: self.id });
        }

        let Some(interval) = self.wait else {
            return match self.rx.try_recv() {
                Ok(frame) => Ok(Some(frame)),
                Err(TryRecvError::Empty) => Ok(None),
                Err(TryRecvError::Disconnected) => {
                    self.origin_dropped();
                    Ok(None)
                }
            };
        };

        loop {
            match self.rx.recv_timeout(interval) {
                Ok(frame) => return Ok(Some(frame)),
                Err(RecvTimeoutError::Timeout) => {
                    if self.is_closed() {
                        return Ok(None);
                    }
                }
                Err(RecvTimeoutError::Disconnected) => {
                    self.origin_dropped();
                    return Ok(None);
                }
            }
        }
    }

    fn snapshot(&self) -> NodeSnapshot {
        NodeSnapshot::bare(self.id, ElementKind::Source, "split")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(limit: Option<usize>) -> (SplitTap<i64>, SplitSource<i64>, CloseLatch) {
        pair_with_wait(limit, None)
    }

    fn waiting_pair() -> (SplitTap<i64>, SplitSource<i64>, CloseLatch) {
        pair_with_wait(None, Some(Duration::from_millis(1)))
    }

    fn pair_with_wait(
        limit: Option<usize>,
        wait: Option<Duration>,
    ) -> (SplitTap<i64>, SplitSource<i64>, CloseLatch) {
        let latch = CloseLatch::new();
        let tap_id = ElementId::next();
        let (writer, rx) = buffer(tap_id, limit);
        let source = SplitSource::new(rx, latch.clone(), wait);
        let tap = SplitTap::new(tap_id, writer, ElementId::next(), i64::clone);
        (tap, source, latch)
    }

    #[test]
    fn test_tap_passes_frame_and_mirrors_it() {
        let (mut tap, mut source, _latch) = pair(None);
        assert_eq!(tap.transform(7).unwrap(), Some(7));
        assert_eq!(source.buffered(), 1);
        assert_eq!(source.get_frame().unwrap(), Some(7));
    }

    #[test]
    fn test_closed_only_when_origin_closed_and_drained() {
        let (mut tap, mut source, latch) = pair(None);
        tap.transform(1).unwrap();
        assert!(!source.is_closed());

        latch.close();
        assert!(!source.is_closed());
        assert_eq!(source.get_frame().unwrap(), Some(1));
        assert!(source.is_closed());
        assert!(source.get_frame().unwrap_err().is_source_closed());
    }

    #[test]
    fn test_empty_buffer_yields_no_frame_without_waiting() {
        let (mut tap, mut source, _latch) = pair(None);
        assert_eq!(source.get_frame().unwrap(), None);
        assert!(!source.is_closed());

        tap.transform(4).unwrap();
        assert_eq!(source.get_frame().unwrap(), Some(4));
    }

    #[test]
    fn test_wait_ends_when_origin_closes() {
        let (_tap, mut source, latch) = waiting_pair();
        let closer = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(20));
            latch.close();
        });
        assert_eq!(source.get_frame().unwrap(), None);
        assert!(source.is_closed());
        closer.join().unwrap();
    }

    #[test]
    fn test_dropped_origin_closes_source() {
        for (tap, mut source, _latch) in [pair(None), waiting_pair()] {
            drop(tap);
            assert_eq!(source.get_frame().unwrap(), None);
            assert!(source.is_closed());
        }
    }

    #[test]
    fn test_bounded_buffer_overflows() {
        let (mut tap, _source, _latch) = pair(Some(2));
        tap.transform(1).unwrap();
        tap.transform(2).unwrap();
        let err = tap.transform(3).unwrap_err();
        assert!(matches!(err, PipelineError::BufferOverflow { limit: 2, .. }));
    }

    #[test]
    fn test_dropped_reader_discards_frames() {
        let (mut tap, source, _latch) = pair(None);
        drop(source);
        assert_eq!(tap.transform(5).unwrap(), Some(5));
    }
}
