//! Element and stream builders shared by the integration tests

use super::Collected;
use std::sync::{Arc, Mutex};
use strom::pipeline::{CapturedArgs, ElementConfig, Gate, Sink, Source, Stream, Transformer};
use strom::StreamSettings;

/// Batch source yielding `0..up_until`
pub fn range_source(up_until: i64) -> Source<i64> {
    Source::batch(
        ElementConfig::new().named("range_source").arg(up_until),
        |args: &CapturedArgs| Ok(0..args.int(0, "up_until")?),
    )
}

/// Batch source yielding the given frames in order
pub fn frames_source<T: Clone + Send + Sync + 'static>(frames: Vec<T>) -> Source<T> {
    Source::batch(ElementConfig::new().named("frames"), move |_: &CapturedArgs| {
        Ok(frames.clone())
    })
}

pub fn add_number(number: i64) -> Transformer<i64> {
    Transformer::map(
        ElementConfig::new().named("add_number").kwarg("number", number),
        |frame: i64, args| Ok(frame + args.int_or(0, "number", 0)?),
    )
}

/// Non-fatal gate keeping even frames
pub fn is_even() -> Gate<i64> {
    Gate::new(ElementConfig::new().named("is_even"), |frame: &i64, _| {
        Ok(frame % 2 == 0)
    })
}

/// Sink pushing every frame into a shared vector
pub fn collecting_sink<T: Send + Sync + 'static>() -> (Sink<T>, Collected<T>) {
    collecting_sink_with(|frame| frame)
}

/// Sink pushing `map(frame)` into a shared vector
pub fn collecting_sink_with<T, U, F>(mut map: F) -> (Sink<T>, Collected<U>)
where
    T: Send + Sync + 'static,
    U: Send + 'static,
    F: FnMut(T) -> U + Send + 'static,
{
    let seen: Collected<U> = Arc::new(Mutex::new(Vec::new()));
    let out = seen.clone();
    let sink = Sink::new(ElementConfig::new().named("collect"), move |frame: T, _| {
        out.lock().unwrap().push(map(frame));
        Ok(())
    });
    (sink, seen)
}

/// Stream over `0..up_until` with a collecting sink
pub fn range_stream(up_until: i64) -> (Stream<i64>, Collected<i64>) {
    let (sink, seen) = collecting_sink();
    (Stream::new(range_source(up_until)).with_sink(sink), seen)
}

/// Derived streams wait for frames, polling often; for threaded split tests
pub fn waiting_split_settings() -> StreamSettings {
    StreamSettings {
        split_wait: true,
        split_poll_interval_ms: 1,
        ..Default::default()
    }
}
