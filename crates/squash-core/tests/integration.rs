//! Integration tests for squash-core.
//!
//! Cross-module behavior: topology wiring against the live graph, the
//! compression toggle invariant of the realtime session, and visualizer
//! lifecycle against shared canvases and the frame scheduler.

use squash_core::display::{
    CanvasTarget, FrameScheduler, LoudnessVisualizer, ManualClock, PixelSurface, PlayState, Rgba,
    Tick,
};
use squash_core::graph::{AnalysisTap, AudioGraph, GraphError, NodeId, StereoSamples};
use squash_core::session::{RealtimeSession, SessionError, SessionOptions};
use squash_core::{
    CompressionGraph, CompressorParams, GraphKind, PassthroughGraph, SignalGraph,
};

const SAMPLE_RATE: f32 = 44100.0;
const TAU: f32 = core::f32::consts::TAU;

fn sine(freq_hz: f32, amplitude: f32, frames: usize) -> Vec<f32> {
    (0..frames)
        .map(|n| amplitude * libm::sinf(TAU * freq_hz * n as f32 / SAMPLE_RATE))
        .collect()
}

fn peak(signal: &[f32]) -> f32 {
    signal.iter().fold(0.0f32, |m, s| m.max(s.abs()))
}

// ============================================================================
// 1. Topology wiring
// ============================================================================

#[test]
fn connect_output_replaces_previous_sink() {
    let mut graph = AudioGraph::new(SAMPLE_RATE);
    let mut raw = PassthroughGraph::new(&mut graph);
    let other = graph.add_gain(squash_core::ParamCell::new(1.0));
    let dest = graph.destination();

    raw.connect_output(&mut graph, other).unwrap();
    raw.connect_output(&mut graph, dest).unwrap();
    assert_eq!(graph.outgoing(raw.exit()), vec![dest]);
    assert_eq!(raw.output(), Some(dest));
}

#[test]
fn disconnects_are_idempotent() {
    let mut graph = AudioGraph::new(SAMPLE_RATE);
    let mut comp = CompressionGraph::new(&mut graph, &CompressorParams::default()).unwrap();
    let edges = graph.edge_count();

    comp.disconnect_input(&mut graph);
    comp.disconnect_output(&mut graph);
    comp.disconnect_input(&mut graph);
    comp.disconnect_output(&mut graph);
    assert_eq!(graph.edge_count(), edges);
}

#[test]
fn connect_input_takes_over_source_fanout() {
    let mut graph = AudioGraph::new(SAMPLE_RATE);
    let src = graph.add_buffer_source(StereoSamples::silence(64));
    let dest = graph.destination();
    graph.connect(src, dest).unwrap();

    let mut raw = PassthroughGraph::new(&mut graph);
    raw.connect_input(&mut graph, src).unwrap();
    assert_eq!(graph.outgoing(src), vec![raw.entry()]);
}

#[test]
fn connect_input_rejects_unknown_source_without_severing() {
    let mut graph = AudioGraph::new(SAMPLE_RATE);
    let src = graph.add_buffer_source(StereoSamples::silence(64));
    let mut raw = PassthroughGraph::new(&mut graph);
    raw.connect_input(&mut graph, src).unwrap();

    let ghost = {
        let mut other = AudioGraph::new(SAMPLE_RATE);
        for _ in 0..10 {
            other.add_buffer_source(StereoSamples::silence(1));
        }
        other.add_buffer_source(StereoSamples::silence(1))
    };
    assert!(raw.connect_input(&mut graph, ghost).is_err());
    assert_eq!(raw.input(), Some(src));
    assert_eq!(graph.outgoing(src), vec![raw.entry()]);
}

#[test]
fn cyclic_input_is_rejected_before_rewiring() {
    let mut graph = AudioGraph::new(SAMPLE_RATE);
    let src = graph.add_buffer_source(StereoSamples::silence(64));
    let dest = graph.destination();
    let mut comp = CompressionGraph::new(&mut graph, &CompressorParams::default()).unwrap();
    comp.connect_input(&mut graph, src).unwrap();
    comp.connect_output(&mut graph, dest).unwrap();
    let edges = graph.edge_count();

    // the chain's own exit would feed back into its entry
    let exit = comp.exit();
    assert_eq!(
        comp.connect_input(&mut graph, exit),
        Err(GraphError::CycleDetected)
    );
    assert_eq!(comp.input(), Some(src));
    assert_eq!(comp.output(), Some(dest));
    assert_eq!(graph.outgoing(src), vec![comp.entry()]);
    assert_eq!(graph.outgoing(exit), vec![dest]);
    assert_eq!(graph.edge_count(), edges);
}

#[test]
fn invalid_output_keeps_previous_sink() {
    let mut graph = AudioGraph::new(SAMPLE_RATE);
    let src = graph.add_buffer_source(StereoSamples::silence(64));
    let dest = graph.destination();
    let mut raw = PassthroughGraph::new(&mut graph);
    raw.connect_output(&mut graph, dest).unwrap();

    assert!(matches!(
        raw.connect_output(&mut graph, src),
        Err(GraphError::InvalidConnection(_))
    ));
    assert_eq!(raw.output(), Some(dest));
    assert_eq!(graph.outgoing(raw.exit()), vec![dest]);
}

#[test]
fn compression_reduces_loud_sine() {
    let mut graph = AudioGraph::new(SAMPLE_RATE);
    let input = sine(440.0, 0.9, 22050);
    let src = graph.add_buffer_source(StereoSamples::from_mono(input.clone()));
    graph.start_source(src).unwrap();
    let dest = graph.destination();

    let mut comp = CompressionGraph::new(&mut graph, &CompressorParams::default()).unwrap();
    comp.connect_input(&mut graph, src).unwrap();
    comp.connect_output(&mut graph, dest).unwrap();

    let out = graph.render(input.len());
    let tail = input.len() / 2..;
    assert!(peak(&out.left[tail.clone()]) < peak(&input[tail]) * 0.5);
}

// ============================================================================
// 2. Realtime session
// ============================================================================

struct Rig {
    session: RealtimeSession,
    source: NodeId,
    clock: ManualClock,
    output_canvas: CanvasTarget,
}

fn rig() -> Rig {
    let mut graph = AudioGraph::new(SAMPLE_RATE);
    let source = graph.add_buffer_source(StereoSamples::from_mono(sine(220.0, 0.7, 44100)));
    graph.start_source(source).unwrap();

    let clock = ManualClock::new(0.0);
    let output_canvas = CanvasTarget::with(PixelSurface::new(48, 64));
    let session = RealtimeSession::new(
        graph,
        CanvasTarget::with(PixelSurface::new(48, 64)),
        output_canvas.clone(),
        FrameScheduler::new(clock.clone()),
        SessionOptions::default(),
    )
    .unwrap();
    Rig {
        session,
        source,
        clock,
        output_canvas,
    }
}

fn assert_exactly_one_variant(session: &RealtimeSession, source: NodeId) {
    let graph = session.graph();
    let dest = graph.destination();
    let comp = session.compression();
    let raw = session.passthrough();

    let comp_on = graph.is_connected(source, comp.entry()) && graph.is_connected(comp.exit(), dest);
    let raw_on = graph.is_connected(source, raw.entry()) && graph.is_connected(raw.exit(), dest);
    let comp_off = !graph.is_connected(source, comp.entry()) && graph.outgoing(comp.exit()).is_empty();
    let raw_off = !graph.is_connected(source, raw.entry()) && graph.outgoing(raw.exit()).is_empty();

    match session.active() {
        GraphKind::Compression => assert!(comp_on && raw_off),
        GraphKind::Passthrough => assert!(raw_on && comp_off),
    }
    assert_eq!(graph.outgoing(source).len(), 1);
    assert_eq!(graph.incoming(dest).len(), 1);
}

#[test]
fn toggle_sequence_keeps_one_variant_connected() {
    let Rig {
        mut session,
        source,
        ..
    } = rig();
    session.attach_source(source).unwrap();
    assert_exactly_one_variant(&session, source);

    for on in [true, false, true, false, false, true] {
        session.set_compression(on).unwrap();
        assert_eq!(session.is_compression_on(), on);
        assert_exactly_one_variant(&session, source);
    }
}

#[test]
fn failed_toggle_leaves_wiring_untouched() {
    let Rig { mut session, .. } = rig();
    let edges = session.graph().edge_count();
    assert_eq!(
        session.set_compression(false),
        Err(SessionError::Precondition(
            "compression toggled before a source was attached"
        ))
    );
    assert_eq!(session.graph().edge_count(), edges);
    assert_eq!(session.active(), GraphKind::Compression);
}

#[test]
fn displays_follow_active_taps() {
    let Rig {
        mut session,
        source,
        clock,
        output_canvas,
    } = rig();
    session.attach_source(source).unwrap();

    let mut left = vec![0.0; 4096];
    let mut right = vec![0.0; 4096];
    session.process_block(&mut left, &mut right);
    clock.advance(16.0);
    session.on_frame();
    assert_eq!(output_canvas.with_pixels(PixelSurface::is_blank), Some(false));

    session.set_compression(false).unwrap();
    assert!(session.output_display().is_none());
    clock.advance(16.0);
    session.on_frame();
    // the stopped output display's clear ran and nothing redrew it
    assert_eq!(output_canvas.with_pixels(PixelSurface::is_blank), Some(true));

    session.set_compression(true).unwrap();
    let display = session.output_display().unwrap();
    assert!(display.tap().ptr_eq(session.compression().output_tap().unwrap()));
    assert_eq!(display.state(), PlayState::Running);
}

#[test]
fn parameter_setters_reach_the_live_graph() {
    let Rig {
        mut session,
        source,
        ..
    } = rig();
    session.attach_source(source).unwrap();
    session.compression().set_output_gain(0.0);

    let mut left = vec![1.0; 512];
    let mut right = vec![1.0; 512];
    session.process_block(&mut left, &mut right);
    assert!(left.iter().chain(right.iter()).all(|&s| s == 0.0));
}

// ============================================================================
// 3. Visualizer lifecycle
// ============================================================================

#[test]
fn history_sized_from_canvas_at_first_sample() {
    let canvas = CanvasTarget::new();
    let mut vis = LoudnessVisualizer::new(AnalysisTap::new(), canvas.clone(), Rgba::rgb(9, 9, 9));
    vis.play(0.0);
    assert!(vis.history().is_none());

    canvas.mount(PixelSurface::new(37, 5));
    vis.tick(20.0);
    assert_eq!(vis.history().map(|h| h.len()), Some(37));

    // later resizes are not reconciled
    canvas.mount(PixelSurface::new(80, 5));
    vis.tick(40.0);
    assert_eq!(vis.history().map(|h| h.len()), Some(37));
}

#[test]
fn stop_without_canvas_is_silent() {
    let canvas = CanvasTarget::with(PixelSurface::new(4, 4));
    let mut vis = LoudnessVisualizer::new(AnalysisTap::new(), canvas.clone(), Rgba::rgb(1, 1, 1));
    vis.play(0.0);
    let before = vis.history().unwrap().to_vec();

    canvas.unmount();
    assert!(vis.stop().is_none());
    assert_eq!(vis.history().unwrap().to_vec(), before);
    assert_eq!(vis.tick(100.0), Tick::Idle);
}

#[test]
fn never_mounted_canvas_stop_is_silent() {
    let mut vis = LoudnessVisualizer::new(AnalysisTap::new(), CanvasTarget::new(), Rgba::default());
    assert!(vis.stop().is_none());
    assert!(vis.history().is_none());
    assert_eq!(vis.state(), PlayState::Stopped);
}
