//! Squash Core - audio graph, compression topologies and loudness display
//!
//! This crate holds everything between an audio source and the screen: a small
//! node graph that renders stereo audio in fixed quanta, the two swappable
//! topologies a source can be routed through, and the throttled bar-chart
//! display fed by the topologies' analysis taps.
//!
//! # Core Abstractions
//!
//! ## Audio Graph
//!
//! - [`AudioGraph`] - Nodes, edges, cycle checks and quantum rendering
//! - [`OfflineContext`] - Fixed-length, faster-than-real-time rendering
//! - [`AnalysisTap`] - Shared 2048-sample window behind an analyser node
//!
//! ## Signal Topologies
//!
//! - [`SignalGraph`] - Pluggable input/output contract
//! - [`PassthroughGraph`] - Analysis only
//! - [`CompressionGraph`] - Gain → tap → compressor → gain → tap
//!
//! ## DSP Stages
//!
//! - [`DynamicsCompressor`] - Soft-knee, linked-stereo compressor
//! - [`GainStage`] - Linear gain
//! - [`ParamCell`] - Atomic parameter shared between owner and stage
//!
//! ## Display
//!
//! - [`LoudnessVisualizer`](display::LoudnessVisualizer) - Scrolling loudness bars
//! - [`FrameScheduler`](display::FrameScheduler) - Frame clock and deferred clears
//!
//! ## Session
//!
//! - [`RealtimeSession`] - Live source, compression toggle, display rebinding
//!
//! # Features
//!
//! - `serde`: derive `Serialize`/`Deserialize` for [`CompressorParams`]
//! - `tracing`: debug events for graph mutations, info events for session rewiring
//!
//! # Example
//!
//! ```rust
//! use squash_core::graph::{OfflineContext, StereoSamples};
//! use squash_core::{CompressionGraph, CompressorParams, SignalGraph};
//!
//! let mut ctx = OfflineContext::new(4410, 44100.0);
//! let graph = ctx.graph_mut();
//! let source = graph.add_buffer_source(StereoSamples::from_mono(vec![0.8; 4410]));
//! let dest = graph.destination();
//!
//! let mut comp = CompressionGraph::new(graph, &CompressorParams::default()).unwrap();
//! comp.connect_input(graph, source).unwrap();
//! comp.connect_output(graph, dest).unwrap();
//! graph.start_source(source).unwrap();
//!
//! let out = ctx.start_rendering();
//! assert!(out.left[4409].abs() < 0.8);
//! ```

pub mod compressor;
pub mod display;
pub mod effect;
pub mod envelope;
pub mod gain;
pub mod graph;
pub mod math;
pub mod param;
pub mod session;
pub mod signal_graph;

pub use compressor::{CompressorControls, DynamicsCompressor};
pub use effect::Effect;
pub use envelope::EnvelopeFollower;
pub use gain::GainStage;
pub use graph::{
    AnalysisTap, AudioGraph, EdgeId, GraphError, NodeId, NodeKind, OfflineContext,
    RENDER_QUANTUM, StereoSamples,
};
pub use math::{db_to_linear, flush_denormal, linear_to_db};
pub use param::ParamCell;
pub use session::{RealtimeSession, SessionError, SessionOptions};
pub use signal_graph::{
    CompressionGraph, CompressorParams, GraphKind, PassthroughGraph, SignalGraph,
};
