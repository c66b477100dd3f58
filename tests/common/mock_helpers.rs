//! Mock construction helpers

use mockall::mock;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use strom::pipeline::{ElementId, ElementKind, NodeSnapshot, PipelineResult, Pullable};

mock! {
    pub Upstream {}

    impl Pullable<i64> for Upstream {
        fn is_closed(&self) -> bool;
        fn get_frame(&mut self) -> PipelineResult<Option<i64>>;
        fn snapshot(&self) -> NodeSnapshot;
    }
}

fn mock_snapshot() -> NodeSnapshot {
    NodeSnapshot::bare(ElementId::INVALID, ElementKind::Source, "mock")
}

/// Mocked source replaying `frames`, closed once they are used up
pub fn scripted_upstream(frames: Vec<i64>) -> MockUpstream {
    let queue = Arc::new(Mutex::new(VecDeque::from(frames)));
    let remaining = queue.clone();

    let mut mock = MockUpstream::new();
    mock.expect_is_closed()
        .returning(move || remaining.lock().unwrap().is_empty());
    mock.expect_get_frame()
        .returning(move || Ok(queue.lock().unwrap().pop_front()));
    mock.expect_snapshot().returning(mock_snapshot);
    mock
}

/// Mocked source that never closes and yields no frame
pub fn silent_upstream() -> MockUpstream {
    let mut mock = MockUpstream::new();
    mock.expect_is_closed().return_const(false);
    mock.expect_get_frame().returning(|| Ok(None));
    mock.expect_snapshot().returning(mock_snapshot);
    mock
}
