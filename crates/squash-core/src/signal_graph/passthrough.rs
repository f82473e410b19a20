//! Analysis-only topology.

use crate::graph::{AnalysisTap, AudioGraph};

use super::{Endpoints, GraphKind, SignalGraph};

/// A single analyser node that is both entry and exit.
///
/// # Example
///
/// ```rust
/// use squash_core::graph::{AudioGraph, StereoSamples};
/// use squash_core::{PassthroughGraph, SignalGraph};
///
/// let mut graph = AudioGraph::new(48000.0);
/// let src = graph.add_buffer_source(StereoSamples::silence(128));
/// let mut raw = PassthroughGraph::new(&mut graph);
/// raw.connect_input(&mut graph, src).unwrap();
/// let dest = graph.destination();
/// raw.connect_output(&mut graph, dest).unwrap();
/// assert!(raw.output_tap().is_none());
/// ```
#[derive(Debug)]
pub struct PassthroughGraph {
    endpoints: Endpoints,
    tap: AnalysisTap,
}

impl PassthroughGraph {
    /// Add the analyser node to `graph`.
    pub fn new(graph: &mut AudioGraph) -> Self {
        let tap = AnalysisTap::new();
        let node = graph.add_analyser(tap.clone());
        Self {
            endpoints: Endpoints::new(node, node),
            tap,
        }
    }
}

impl SignalGraph for PassthroughGraph {
    fn kind(&self) -> GraphKind {
        GraphKind::Passthrough
    }

    fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    fn endpoints_mut(&mut self) -> &mut Endpoints {
        &mut self.endpoints
    }

    fn input_tap(&self) -> &AnalysisTap {
        &self.tap
    }
}
