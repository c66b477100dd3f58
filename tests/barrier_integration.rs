//! Barrier scenarios across split and independent streams

mod common;

use common::builders::{add_number, collecting_sink, frames_source, is_even, range_source};
use common::collected;
use std::collections::VecDeque;
use strom::pipeline::{
    Barrier, CapturedArgs, CombinedFrame, ElementConfig, ElementKind, PipelineError, Pullable,
    Stream,
};

fn pass_on(_: &mut VecDeque<CombinedFrame<i64>>, _: &CapturedArgs) -> anyhow::Result<bool> {
    Ok(true)
}

/// Drops the newest entry unless all of its streams agree on the value.
fn drop_mismatched(
    buffer: &mut VecDeque<CombinedFrame<i64>>,
    _: &CapturedArgs,
) -> anyhow::Result<bool> {
    let aligned = buffer.back().is_some_and(|frame| {
        let mut values = frame.values();
        let first = values.next().copied().flatten();
        values.all(|v| *v == first)
    });
    if !aligned {
        buffer.pop_back();
    }
    Ok(aligned)
}

#[test]
fn test_windowing_yields_aligned_frames_only() {
    let a = Stream::new(frames_source((0..10).collect::<Vec<i64>>()));
    let b = Stream::new(frames_source(
        (0..10).map(|i| if i < 5 { i - 100 } else { i }).collect::<Vec<i64>>(),
    ));
    let mut barrier = Barrier::builder(ElementConfig::new().named("align"), drop_mismatched)
        .stream("a", a)
        .stream("b", b)
        .build()
        .unwrap();

    let mut results = Vec::new();
    while !barrier.is_closed() {
        results.push(barrier.get_frame().unwrap());
    }

    assert_eq!(results.len(), 10);
    assert!(results[..5].iter().all(Option::is_none));
    for (offset, frame) in results[5..].iter().enumerate() {
        let frame = frame.as_ref().unwrap();
        assert_eq!(frame["a"], Some(5 + offset as i64));
        assert_eq!(frame["a"], frame["b"]);
    }
}

#[test]
fn test_hello_world_graph() {
    let mut initial = Stream::new(range_source(20)).named("all_numbers");
    initial.add(add_number(10));
    let mut even = initial.split().named("even_numbers");
    even.add(is_even());

    let barrier = Barrier::builder(ElementConfig::new().named("pass_on"), pass_on)
        .stream("all_numbers", initial)
        .stream("even_numbers", even)
        .build()
        .unwrap();

    let (sink, seen) = collecting_sink();
    let mut result = Stream::new(barrier).with_sink(sink);
    let summary = result.run().unwrap();
    assert_eq!(summary.delivered, 20);

    let frames: Vec<CombinedFrame<i64>> = collected(&seen);
    for (i, frame) in frames.iter().enumerate() {
        let value = 10 + i as i64;
        assert_eq!(frame["all_numbers"], Some(value));
        let expected_even = (value % 2 == 0).then_some(value);
        assert_eq!(frame["even_numbers"], expected_even);
    }

    let topology = result.topology();
    assert_eq!(topology.count(ElementKind::Barrier), 1);
    assert_eq!(topology.count(ElementKind::Split), 1);
    assert_eq!(topology.count(ElementKind::Gate), 1);
    assert_eq!(topology.source.upstream.len(), 2);
}

#[test]
fn test_derived_stream_listed_before_origin() {
    let mut initial = Stream::new(range_source(20)).named("all_numbers");
    initial.add(add_number(10));
    let mut even = initial.split().named("even_numbers");
    even.add(is_even());

    let barrier = Barrier::builder(ElementConfig::new().named("pass_on"), pass_on)
        .stream("even_numbers", even)
        .stream("all_numbers", initial)
        .build()
        .unwrap();

    let (sink, seen) = collecting_sink();
    let mut result = Stream::new(barrier).with_sink(sink);
    let summary = result.run().unwrap();
    assert_eq!(summary.delivered, 21);

    let frames: Vec<CombinedFrame<i64>> = collected(&seen);
    let all: Vec<i64> = frames.iter().filter_map(|f| f["all_numbers"]).collect();
    let evens: Vec<i64> = frames.iter().filter_map(|f| f["even_numbers"]).collect();
    assert_eq!(all, (10..30).collect::<Vec<_>>());
    assert_eq!(evens, (10..30).step_by(2).collect::<Vec<_>>());
    assert_eq!(frames[0]["even_numbers"], None);
    assert_eq!(frames[1]["even_numbers"], Some(10));
}

#[test]
fn test_guarded_constituent_cannot_be_run() {
    let (sink, _) = collecting_sink();
    let stream = Stream::new(range_source(3)).with_sink(sink);
    let barrier = Barrier::builder(ElementConfig::new(), pass_on)
        .stream("guarded", stream)
        .build()
        .unwrap();

    let (name, constituent) = barrier.streams().next().unwrap();
    assert_eq!(name, "guarded");
    let guard = constituent.sink().unwrap().snapshot();
    assert_eq!(guard.kind, ElementKind::Sink);
    assert_eq!(guard.name.as_deref(), Some("guard:guarded"));
}

#[test]
fn test_gate_failure_inside_constituent_propagates() {
    let mut failing = Stream::new(range_source(5));
    failing.add(
        strom::pipeline::Gate::new(ElementConfig::new(), |frame: &i64, _| Ok(*frame < 2))
            .fatal(true),
    );
    let mut barrier = Barrier::builder(ElementConfig::new(), pass_on)
        .stream("failing", failing)
        .build()
        .unwrap();

    assert!(barrier.get_frame().unwrap().is_some());
    assert!(barrier.get_frame().unwrap().is_some());
    let err = barrier.get_frame().unwrap_err();
    assert!(matches!(err, PipelineError::GateFailed { .. }));
    assert_eq!(err.failed_frame::<i64>(), Some(&2));
}
