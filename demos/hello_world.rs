//! Hello world pipeline
//!
//! Numbers 0..20 get 10 added, then a split copies them into a second stream
//! that keeps only even values. A barrier joins both streams and a print sink
//! shows every combined frame.
//!
//! Run with `cargo run --example hello_world`. Set `RUST_LOG=strom=trace` to
//! see barrier decisions.

use std::collections::VecDeque;
use strom::config::EngineConfig;
use strom::pipeline::{
    Barrier, CapturedArgs, CombinedFrame, ElementConfig, Gate, Sink, Source, Stream, Transformer,
};

fn range_source(up_until: i64) -> Source<i64> {
    Source::batch(
        ElementConfig::new().named("range_source").kwarg("up_until", up_until),
        |args: &CapturedArgs| Ok(0..args.int_or(0, "up_until", 20)?),
    )
}

fn add_number(number: i64) -> Transformer<i64> {
    Transformer::map(
        ElementConfig::new().named("add_number").kwarg("number", number),
        |frame: i64, args| Ok(frame + args.int_or(0, "number", 0)?),
    )
}

fn is_even() -> Gate<i64> {
    Gate::new(ElementConfig::new().named("is_even"), |frame: &i64, _| {
        Ok(frame % 2 == 0)
    })
    .fatal(false)
}

fn pass_on_barrier(
    _frames: &mut VecDeque<CombinedFrame<i64>>,
    _: &CapturedArgs,
) -> anyhow::Result<bool> {
    Ok(true)
}

fn print_sink() -> Sink<CombinedFrame<i64>> {
    Sink::new(
        ElementConfig::new().named("print_sink"),
        |frame: CombinedFrame<i64>, _| {
            println!("{:?}", frame);
            Ok(())
        },
    )
}

fn main() -> strom::Result<()> {
    let config = EngineConfig::load_or_default();
    strom::logging::init(&config.logging)?;

    let mut initial_stream = Stream::with_settings(range_source(20), config.stream.clone())
        .named("all_numbers");
    initial_stream.add(add_number(10));

    let mut even_stream = initial_stream.split().named("even_numbers");
    even_stream.add(is_even());

    let all_streams_barrier = Barrier::builder(
        ElementConfig::new().named("pass_on_barrier"),
        pass_on_barrier,
    )
    .stream("all_numbers", initial_stream)
    .stream("even_numbers", even_stream)
    .settings(config.barrier.clone())
    .build()?;

    let mut result_stream = Stream::with_settings(all_streams_barrier, config.stream)
        .named("result")
        .with_sink(print_sink());

    tracing::info!(
        topology = %result_stream.topology().to_json().unwrap_or_default(),
        "Running hello world pipeline"
    );
    let summary = result_stream.run()?;
    tracing::info!(delivered = summary.delivered, "Done");
    Ok(())
}
