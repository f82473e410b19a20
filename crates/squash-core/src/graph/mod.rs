//! Audio node graph.
//!
//! The graph is the host the signal topologies are wired into: a set of nodes
//! (sources, gain, compressor, analysers, one destination) joined by directed
//! edges, rendered block by block in topological order.
//!
//! # Architecture
//!
//! - [`AudioGraph`] owns topology and per-node buffers. Mutations go through
//!   `&mut self`; the cached render order is invalidated on every topology
//!   change and rebuilt at the next quantum.
//! - Parameters live outside the graph in shared [`ParamCell`](crate::ParamCell)s
//!   that each stage reads at the start of a quantum.
//! - [`AnalysisTap`] handles are shared with the loudness display.
//! - [`OfflineContext`] renders a fixed length as fast as possible.
//!
//! # Example
//!
//! ```rust
//! use squash_core::graph::{AnalysisTap, AudioGraph, StereoSamples};
//!
//! let mut graph = AudioGraph::new(48000.0);
//! let tap = AnalysisTap::new();
//! let src = graph.add_buffer_source(StereoSamples::from_mono(vec![0.5; 512]));
//! let analyser = graph.add_analyser(tap.clone());
//! graph.connect(src, analyser).unwrap();
//! graph.connect(analyser, graph.destination()).unwrap();
//! graph.start_source(src).unwrap();
//!
//! let mut left = vec![0.0; 512];
//! let mut right = vec![0.0; 512];
//! graph.process_block(&mut left, &mut right);
//! assert_eq!(left[511], 0.5);
//! ```

pub mod analyser;
pub mod buffer;
pub mod edge;
pub mod node;
pub mod offline;
mod processing;
pub mod stereo_samples;

pub use analyser::{AnalysisTap, BYTE_MIDPOINT, FFT_SIZE, sample_to_byte};
pub use buffer::QuantumBuffer;
pub use edge::EdgeId;
pub use node::{NodeId, NodeKind};
pub use offline::{CHANNELS, OfflineContext};
pub use processing::{AudioGraph, GraphError, RENDER_QUANTUM};
pub use stereo_samples::StereoSamples;
