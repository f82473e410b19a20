//! Swappable signal topologies.
//!
//! A [`SignalGraph`] is a fixed chain of nodes inside an [`AudioGraph`] with
//! one entry and one exit. A consumer plugs a source into the entry and a sink
//! onto the exit, and can move both endpoints to another topology without
//! touching the chain itself.
//!
//! Two topologies exist:
//!
//! - [`PassthroughGraph`]: a single analyser, entry and exit at once.
//! - [`CompressionGraph`]: input gain → input tap → compressor → output gain → output tap.
//!
//! # Wiring rules
//!
//! - `connect_input` first severs the previous input's outgoing edges, then
//!   every outgoing edge of the new source, so a source feeds one topology at
//!   a time.
//! - `connect_output` first severs every outgoing edge of the exit.
//! - Both disconnects are idempotent.

mod compression;
mod params;
mod passthrough;

pub use compression::CompressionGraph;
pub use params::CompressorParams;
pub use passthrough::PassthroughGraph;

use crate::graph::{AnalysisTap, AudioGraph, GraphError, NodeId, NodeKind};

/// Which topology a [`SignalGraph`] implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GraphKind {
    /// Analysis only, no processing.
    Passthrough,
    /// Gain, compression and two analysis taps.
    Compression,
}

impl GraphKind {
    /// The other variant.
    pub fn toggled(self) -> Self {
        match self {
            Self::Passthrough => Self::Compression,
            Self::Compression => Self::Passthrough,
        }
    }
}

impl std::fmt::Display for GraphKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Passthrough => write!(f, "passthrough"),
            Self::Compression => write!(f, "compression"),
        }
    }
}

/// Entry/exit nodes of a topology and what is currently plugged into them.
#[derive(Debug, Clone)]
pub struct Endpoints {
    entry: NodeId,
    exit: NodeId,
    input: Option<NodeId>,
    output: Option<NodeId>,
}

impl Endpoints {
    /// Endpoints for a chain running from `entry` to `exit`, nothing attached.
    pub fn new(entry: NodeId, exit: NodeId) -> Self {
        Self {
            entry,
            exit,
            input: None,
            output: None,
        }
    }
}

/// A processing topology with a pluggable input and output.
///
/// Implementors provide their [`Endpoints`] and taps; the wiring contract is
/// implemented once here.
pub trait SignalGraph {
    /// Which variant this is.
    fn kind(&self) -> GraphKind;

    /// Entry/exit bookkeeping.
    fn endpoints(&self) -> &Endpoints;

    /// Mutable entry/exit bookkeeping.
    fn endpoints_mut(&mut self) -> &mut Endpoints;

    /// Tap placed right after the entry stage, before any processing.
    fn input_tap(&self) -> &AnalysisTap;

    /// Tap after the last stage, for variants that have one.
    fn output_tap(&self) -> Option<&AnalysisTap> {
        None
    }

    /// First node of the chain.
    fn entry(&self) -> NodeId {
        self.endpoints().entry
    }

    /// Last node of the chain.
    fn exit(&self) -> NodeId {
        self.endpoints().exit
    }

    /// Currently attached source.
    fn input(&self) -> Option<NodeId> {
        self.endpoints().input
    }

    /// Currently attached sink.
    fn output(&self) -> Option<NodeId> {
        self.endpoints().output
    }

    /// Wire `source` into the entry, taking over all of its outputs.
    ///
    /// The source is validated, cycle check included, before anything is
    /// severed. On error the graph and the endpoints are left as they were.
    fn connect_input(&mut self, graph: &mut AudioGraph, source: NodeId) -> Result<(), GraphError> {
        match graph.kind(source) {
            None => return Err(GraphError::NodeNotFound(source)),
            Some(NodeKind::Destination) => {
                return Err(GraphError::InvalidConnection(format!(
                    "destination {source} cannot be an input"
                )));
            }
            Some(_) => {}
        }
        graph.check_connection(source, self.entry())?;

        self.disconnect_input(graph);
        graph.disconnect(source)?;
        graph.connect(source, self.entry())?;
        self.endpoints_mut().input = Some(source);

        #[cfg(feature = "tracing")]
        tracing::debug!(kind = %self.kind(), "signal_graph_input: {source} → {}", self.entry());
        Ok(())
    }

    /// Wire the exit into `sink`, replacing any previous output.
    ///
    /// On error the previous output stays wired.
    fn connect_output(&mut self, graph: &mut AudioGraph, sink: NodeId) -> Result<(), GraphError> {
        graph.check_connection(self.exit(), sink)?;

        self.disconnect_output(graph);
        graph.connect(self.exit(), sink)?;
        self.endpoints_mut().output = Some(sink);

        #[cfg(feature = "tracing")]
        tracing::debug!(kind = %self.kind(), "signal_graph_output: {} → {sink}", self.exit());
        Ok(())
    }

    /// Sever every outgoing edge of the current input. No-op without one.
    fn disconnect_input(&mut self, graph: &mut AudioGraph) {
        if let Some(previous) = self.endpoints_mut().input.take() {
            // previous was validated when it was connected
            let _ = graph.disconnect(previous);
        }
    }

    /// Sever every outgoing edge of the exit. No-op without any.
    fn disconnect_output(&mut self, graph: &mut AudioGraph) {
        let exit = self.exit();
        let _ = graph.disconnect(exit);
        self.endpoints_mut().output = None;
    }
}
