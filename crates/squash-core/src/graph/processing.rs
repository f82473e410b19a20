//! Audio graph: mutation API, cycle detection, and block rendering.
//!
//! [`AudioGraph`] owns the nodes and edges, provides mutation methods (add,
//! connect, disconnect) and renders audio one quantum at a time in topological
//! order. A node's input is the sum of its predecessors' outputs; the
//! destination's summed input is the graph output.
//!
//! The topological order is cached and rebuilt lazily after any topology
//! change.

use crate::compressor::{CompressorControls, DynamicsCompressor};
use crate::gain::GainStage;
use crate::param::ParamCell;

use super::analyser::AnalysisTap;
use super::buffer::QuantumBuffer;
use super::edge::{Edge, EdgeId};
use super::node::{NodeData, NodeId, NodeKind, Processor};
use super::stereo_samples::StereoSamples;

/// Maximum number of frames rendered per quantum.
pub const RENDER_QUANTUM: usize = 128;

/// Errors that can occur during graph operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// The specified node was not found in the graph.
    NodeNotFound(NodeId),
    /// Adding this edge would create a cycle (including a self-loop).
    CycleDetected,
    /// A connection violates a node's role (e.g., an edge into a source).
    InvalidConnection(String),
    /// The node cannot be started because it is not a buffer source.
    NotASource(NodeId),
}

impl std::fmt::Display for GraphError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NodeNotFound(id) => write!(f, "{id} not found"),
            Self::CycleDetected => write!(f, "adding this edge would create a cycle"),
            Self::InvalidConnection(msg) => write!(f, "invalid connection: {msg}"),
            Self::NotASource(id) => write!(f, "{id} is not a buffer source"),
        }
    }
}

impl std::error::Error for GraphError {}

/// Directed acyclic graph of audio nodes ending in a single destination.
///
/// # Usage
///
/// 1. Create a graph with [`new()`](Self::new); the destination node exists from the start
/// 2. Add nodes: [`add_buffer_source()`](Self::add_buffer_source),
///    [`add_gain()`](Self::add_gain), [`add_compressor()`](Self::add_compressor),
///    [`add_analyser()`](Self::add_analyser)
/// 3. Connect nodes: [`connect()`](Self::connect)
/// 4. Render: [`process_block()`](Self::process_block) or [`render()`](Self::render)
///
/// # Example
///
/// ```rust
/// use squash_core::ParamCell;
/// use squash_core::graph::{AudioGraph, StereoSamples};
///
/// let mut graph = AudioGraph::new(44100.0);
/// let source = graph.add_buffer_source(StereoSamples::from_mono(vec![0.5; 256]));
/// let gain = graph.add_gain(ParamCell::new(2.0));
/// graph.connect(source, gain).unwrap();
/// graph.connect(gain, graph.destination()).unwrap();
/// graph.start_source(source).unwrap();
///
/// let out = graph.render(256);
/// assert_eq!(out.left[0], 1.0);
/// ```
pub struct AudioGraph {
    nodes: Vec<NodeData>,
    edges: Vec<Option<Edge>>,
    destination: NodeId,
    sample_rate: f32,
    /// Cached topological order; `None` after a topology change.
    schedule: Option<Vec<usize>>,
    /// Scratch buffer holding the summed input of the node being rendered.
    mix: QuantumBuffer,
    frames_rendered: u64,
}

impl AudioGraph {
    /// Creates a graph holding only its destination node.
    pub fn new(sample_rate: f32) -> Self {
        let mut graph = Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            destination: NodeId(0),
            sample_rate,
            schedule: None,
            mix: QuantumBuffer::new(RENDER_QUANTUM),
            frames_rendered: 0,
        };
        graph.destination = graph.add_node(Processor::Destination);
        graph
    }

    // --- Node mutations ---

    /// Adds a source that plays `samples` once after [`start_source`](Self::start_source).
    pub fn add_buffer_source(&mut self, samples: StereoSamples) -> NodeId {
        self.add_node(Processor::BufferSource {
            samples,
            position: 0,
            started: false,
        })
    }

    /// Adds a gain node reading its factor from `gain`.
    pub fn add_gain(&mut self, gain: ParamCell) -> NodeId {
        self.add_node(Processor::Gain(GainStage::new(gain)))
    }

    /// Adds a compressor node reading its parameters from `controls`.
    pub fn add_compressor(&mut self, controls: CompressorControls) -> NodeId {
        let stage = DynamicsCompressor::new(self.sample_rate, controls);
        self.add_node(Processor::Compressor(stage))
    }

    /// Adds a pass-through node that records into `tap`.
    pub fn add_analyser(&mut self, tap: AnalysisTap) -> NodeId {
        self.add_node(Processor::Analyser(tap))
    }

    /// Starts playback of a buffer source at the next rendered quantum.
    pub fn start_source(&mut self, id: NodeId) -> Result<(), GraphError> {
        let node = self.get_node_mut(id)?;
        match &mut node.processor {
            Processor::BufferSource { started, .. } => {
                *started = true;
                Ok(())
            }
            _ => Err(GraphError::NotASource(id)),
        }
    }

    // --- Edge mutations ---

    /// Connects two nodes with a directed edge.
    ///
    /// Connecting an already connected pair returns the existing edge. Fails if:
    /// - Either node doesn't exist
    /// - The edge would create a cycle (including `from == to`)
    /// - The edge enters a buffer source or leaves the destination
    pub fn connect(&mut self, from: NodeId, to: NodeId) -> Result<EdgeId, GraphError> {
        self.check_connection(from, to)?;
        if let Some(existing) = self.find_edge(from, to) {
            return Ok(existing);
        }

        let edge_id = EdgeId(self.edges.len() as u32);
        self.edges.push(Some(Edge { from, to }));
        self.nodes[from.0 as usize].outgoing.push(edge_id);
        self.nodes[to.0 as usize].incoming.push(edge_id);
        self.schedule = None;

        #[cfg(feature = "tracing")]
        tracing::debug!("graph_connect: {from} → {to}");
        Ok(edge_id)
    }

    /// Runs every check [`connect`](Self::connect) makes without adding the edge.
    ///
    /// Severing outgoing edges of `from` never turns a rejected pair into an
    /// accepted one, so callers can validate first and rewire after.
    pub fn check_connection(&self, from: NodeId, to: NodeId) -> Result<(), GraphError> {
        self.validate_connection(from, to)?;
        // a cycle exists if `to` can already reach `from`
        if self.find_edge(from, to).is_none() && self.can_reach(to, from) {
            return Err(GraphError::CycleDetected);
        }
        Ok(())
    }

    /// Removes every outgoing edge of `node`. Idempotent.
    pub fn disconnect(&mut self, node: NodeId) -> Result<(), GraphError> {
        let outgoing = std::mem::take(&mut self.get_node_mut(node)?.outgoing);
        if outgoing.is_empty() {
            return Ok(());
        }
        for edge_id in outgoing {
            self.remove_edge(edge_id);
        }
        self.schedule = None;

        #[cfg(feature = "tracing")]
        tracing::debug!("graph_disconnect: {node} (all outputs)");
        Ok(())
    }

    /// Removes the edge `from → to` if present. Returns whether an edge was removed.
    pub fn disconnect_between(&mut self, from: NodeId, to: NodeId) -> bool {
        let Some(edge_id) = self.find_edge(from, to) else {
            return false;
        };
        self.nodes[from.0 as usize].outgoing.retain(|e| *e != edge_id);
        self.remove_edge(edge_id);
        self.schedule = None;

        #[cfg(feature = "tracing")]
        tracing::debug!("graph_disconnect: {from} → {to}");
        true
    }

    // --- Introspection ---

    /// The graph's single destination node.
    pub fn destination(&self) -> NodeId {
        self.destination
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Whether `id` names a node of this graph.
    pub fn contains(&self, id: NodeId) -> bool {
        (id.0 as usize) < self.nodes.len()
    }

    /// The role of node `id`.
    pub fn kind(&self, id: NodeId) -> Option<NodeKind> {
        self.nodes.get(id.0 as usize).map(|n| n.processor.kind())
    }

    /// True when an edge `from → to` exists.
    pub fn is_connected(&self, from: NodeId, to: NodeId) -> bool {
        self.find_edge(from, to).is_some()
    }

    /// Finds the edge ID connecting `from` to `to`, if one exists.
    pub fn find_edge(&self, from: NodeId, to: NodeId) -> Option<EdgeId> {
        let node = self.nodes.get(from.0 as usize)?;
        node.outgoing.iter().copied().find(|edge_id| {
            self.edges[edge_id.0 as usize]
                .as_ref()
                .is_some_and(|edge| edge.to == to)
        })
    }

    /// Nodes that `id` feeds, in connection order.
    pub fn outgoing(&self, id: NodeId) -> Vec<NodeId> {
        self.nodes.get(id.0 as usize).map_or_else(Vec::new, |node| {
            node.outgoing
                .iter()
                .filter_map(|e| self.edges[e.0 as usize].map(|edge| edge.to))
                .collect()
        })
    }

    /// Nodes feeding `id`, in connection order.
    pub fn incoming(&self, id: NodeId) -> Vec<NodeId> {
        self.nodes.get(id.0 as usize).map_or_else(Vec::new, |node| {
            node.incoming
                .iter()
                .filter_map(|e| self.edges[e.0 as usize].map(|edge| edge.from))
                .collect()
        })
    }

    /// Returns the number of nodes, including the destination.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of live edges.
    pub fn edge_count(&self) -> usize {
        self.edges.iter().filter(|e| e.is_some()).count()
    }

    /// Total frames rendered since creation.
    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    /// Last gain reduction of a compressor node in dB, if `id` is one.
    pub fn compressor_reduction_db(&self, id: NodeId) -> Option<f32> {
        match &self.nodes.get(id.0 as usize)?.processor {
            Processor::Compressor(stage) => Some(stage.reduction_db()),
            _ => None,
        }
    }

    // --- Rendering ---

    /// Renders one quantum into `left`/`right`.
    ///
    /// Both slices must have the same length, at most [`RENDER_QUANTUM`].
    pub fn render_quantum(&mut self, left: &mut [f32], right: &mut [f32]) {
        debug_assert_eq!(left.len(), right.len());
        debug_assert!(left.len() <= RENDER_QUANTUM);
        let frames = left.len().min(right.len()).min(RENDER_QUANTUM);

        let order = match self.schedule.take() {
            Some(order) => order,
            None => self.kahn_sort(),
        };

        let Self {
            nodes, edges, mix, ..
        } = self;
        for &idx in &order {
            mix.silence();
            for edge_id in &nodes[idx].incoming {
                if let Some(edge) = &edges[edge_id.0 as usize] {
                    mix.mix_in(&nodes[edge.from.0 as usize].output);
                }
            }
            nodes[idx].render(mix, frames);
        }

        let (out_l, out_r) = self.nodes[self.destination.0 as usize].output.split(frames);
        left[..frames].copy_from_slice(out_l);
        right[..frames].copy_from_slice(out_r);

        self.schedule = Some(order);
        self.frames_rendered += frames as u64;
    }

    /// Renders a block of any length, splitting it into quanta.
    pub fn process_block(&mut self, left: &mut [f32], right: &mut [f32]) {
        debug_assert_eq!(left.len(), right.len());
        for (l, r) in left
            .chunks_mut(RENDER_QUANTUM)
            .zip(right.chunks_mut(RENDER_QUANTUM))
        {
            self.render_quantum(l, r);
        }
    }

    /// Renders `frames` frames as fast as possible.
    pub fn render(&mut self, frames: usize) -> StereoSamples {
        self.render_with_progress(frames, frames.max(1), |_| {})
    }

    /// Renders `frames` frames, calling `progress` with the running frame
    /// count after every `block` frames and once at the end.
    pub fn render_with_progress(
        &mut self,
        frames: usize,
        block: usize,
        mut progress: impl FnMut(usize),
    ) -> StereoSamples {
        let mut out = StereoSamples::silence(frames);
        let block = block.max(1);
        let mut done = 0;
        while done < frames {
            let end = (done + block).min(frames);
            self.process_block(&mut out.left[done..end], &mut out.right[done..end]);
            done = end;
            progress(done);
        }
        out
    }

    // --- Internal helpers ---

    fn add_node(&mut self, processor: Processor) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        #[cfg(feature = "tracing")]
        let kind = processor.kind();
        self.nodes.push(NodeData::new(processor, RENDER_QUANTUM));
        self.schedule = None;

        #[cfg(feature = "tracing")]
        tracing::debug!("graph_add: {id} {kind:?}");
        id
    }

    fn get_node(&self, id: NodeId) -> Result<&NodeData, GraphError> {
        self.nodes
            .get(id.0 as usize)
            .ok_or(GraphError::NodeNotFound(id))
    }

    fn get_node_mut(&mut self, id: NodeId) -> Result<&mut NodeData, GraphError> {
        self.nodes
            .get_mut(id.0 as usize)
            .ok_or(GraphError::NodeNotFound(id))
    }

    /// Validates node existence and role constraints for a connection.
    fn validate_connection(&self, from: NodeId, to: NodeId) -> Result<(), GraphError> {
        let from_node = self.get_node(from)?;
        let to_node = self.get_node(to)?;

        if to_node.processor.kind() == NodeKind::BufferSource {
            return Err(GraphError::InvalidConnection(format!(
                "cannot connect into source node {from}→{to}"
            )));
        }
        if from_node.processor.kind() == NodeKind::Destination {
            return Err(GraphError::InvalidConnection(format!(
                "cannot connect from destination node {from}→{to}"
            )));
        }
        Ok(())
    }

    /// DFS reachability check: can `from` reach `to` via existing edges?
    fn can_reach(&self, from: NodeId, to: NodeId) -> bool {
        let mut visited = vec![false; self.nodes.len()];
        let mut stack = vec![from];

        while let Some(current) = stack.pop() {
            if current == to {
                return true;
            }
            let idx = current.0 as usize;
            if idx >= visited.len() || visited[idx] {
                continue;
            }
            visited[idx] = true;

            for edge_id in &self.nodes[idx].outgoing {
                if let Some(edge) = &self.edges[edge_id.0 as usize] {
                    stack.push(edge.to);
                }
            }
        }
        false
    }

    /// Drops an edge and unlinks it from its destination's incoming list.
    /// The caller is responsible for the source's outgoing list.
    fn remove_edge(&mut self, id: EdgeId) {
        if let Some(edge) = self.edges[id.0 as usize].take() {
            self.nodes[edge.to.0 as usize].incoming.retain(|e| *e != id);
        }
    }

    /// Kahn's algorithm over every node. `connect` rejects cycles, so the
    /// result always contains every node.
    fn kahn_sort(&self) -> Vec<usize> {
        let n = self.nodes.len();
        let mut in_degree: Vec<usize> = self
            .nodes
            .iter()
            .map(|node| {
                node.incoming
                    .iter()
                    .filter(|e| self.edges[e.0 as usize].is_some())
                    .count()
            })
            .collect();

        let mut queue: Vec<usize> = (0..n).filter(|&i| in_degree[i] == 0).collect();
        let mut sorted = Vec::with_capacity(n);

        while let Some(idx) = queue.pop() {
            sorted.push(idx);
            for edge_id in &self.nodes[idx].outgoing {
                if let Some(edge) = &self.edges[edge_id.0 as usize] {
                    let to_idx = edge.to.0 as usize;
                    in_degree[to_idx] -= 1;
                    if in_degree[to_idx] == 0 {
                        queue.push(to_idx);
                    }
                }
            }
        }

        #[cfg(feature = "tracing")]
        tracing::debug!("graph_schedule: {} nodes", sorted.len());
        sorted
    }
}

impl std::fmt::Debug for AudioGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioGraph")
            .field("sample_rate", &self.sample_rate)
            .field("nodes", &self.node_count())
            .field("edges", &self.edge_count())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(graph: &mut AudioGraph, value: f32, frames: usize) -> NodeId {
        let id = graph.add_buffer_source(StereoSamples::from_mono(vec![value; frames]));
        graph.start_source(id).unwrap();
        id
    }

    #[test]
    fn new_graph_has_destination() {
        let graph = AudioGraph::new(48000.0);
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.kind(graph.destination()), Some(NodeKind::Destination));
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn connect_existing_pair_returns_same_edge() {
        let mut graph = AudioGraph::new(48000.0);
        let g = graph.add_gain(ParamCell::new(1.0));
        let dest = graph.destination();
        let a = graph.connect(g, dest).unwrap();
        let b = graph.connect(g, dest).unwrap();
        assert_eq!(a, b);
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn rejects_cycles_and_self_loops() {
        let mut graph = AudioGraph::new(48000.0);
        let a = graph.add_gain(ParamCell::new(1.0));
        let b = graph.add_gain(ParamCell::new(1.0));
        graph.connect(a, b).unwrap();
        assert_eq!(graph.connect(b, a), Err(GraphError::CycleDetected));
        assert_eq!(graph.connect(a, a), Err(GraphError::CycleDetected));
    }

    #[test]
    fn check_connection_leaves_graph_untouched() {
        let mut graph = AudioGraph::new(44100.0);
        let a = graph.add_gain(ParamCell::new(1.0));
        let b = graph.add_gain(ParamCell::new(1.0));
        graph.connect(a, b).unwrap();

        assert_eq!(graph.check_connection(b, a), Err(GraphError::CycleDetected));
        assert_eq!(graph.check_connection(a, b), Ok(()));
        assert_eq!(graph.check_connection(b, graph.destination()), Ok(()));
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn rejects_invalid_endpoints() {
        let mut graph = AudioGraph::new(48000.0);
        let src = graph.add_buffer_source(StereoSamples::silence(4));
        let g = graph.add_gain(ParamCell::new(1.0));
        let dest = graph.destination();

        assert!(matches!(
            graph.connect(g, src),
            Err(GraphError::InvalidConnection(_))
        ));
        assert!(matches!(
            graph.connect(dest, g),
            Err(GraphError::InvalidConnection(_))
        ));
        let ghost = NodeId(99);
        assert_eq!(graph.connect(g, ghost), Err(GraphError::NodeNotFound(ghost)));
        assert_eq!(graph.start_source(g), Err(GraphError::NotASource(g)));
    }

    #[test]
    fn disconnect_removes_all_outgoing() {
        let mut graph = AudioGraph::new(48000.0);
        let src = graph.add_buffer_source(StereoSamples::silence(4));
        let a = graph.add_gain(ParamCell::new(1.0));
        let b = graph.add_gain(ParamCell::new(1.0));
        graph.connect(src, a).unwrap();
        graph.connect(src, b).unwrap();
        graph.connect(a, graph.destination()).unwrap();

        graph.disconnect(src).unwrap();
        assert!(graph.outgoing(src).is_empty());
        assert!(graph.incoming(a).is_empty());
        assert!(graph.incoming(b).is_empty());
        assert!(graph.is_connected(a, graph.destination()));

        // Idempotent
        graph.disconnect(src).unwrap();
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn disconnect_between_removes_one_edge() {
        let mut graph = AudioGraph::new(48000.0);
        let a = graph.add_gain(ParamCell::new(1.0));
        let b = graph.add_gain(ParamCell::new(1.0));
        graph.connect(a, b).unwrap();
        graph.connect(a, graph.destination()).unwrap();

        assert!(graph.disconnect_between(a, b));
        assert!(!graph.disconnect_between(a, b));
        assert_eq!(graph.outgoing(a), vec![graph.destination()]);
    }

    #[test]
    fn unstarted_source_is_silent() {
        let mut graph = AudioGraph::new(48000.0);
        let src = graph.add_buffer_source(StereoSamples::from_mono(vec![1.0; 64]));
        graph.connect(src, graph.destination()).unwrap();
        let out = graph.render(64);
        assert!(out.left.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn fan_in_sums_inputs() {
        let mut graph = AudioGraph::new(48000.0);
        let a = source(&mut graph, 0.25, 300);
        let b = source(&mut graph, 0.5, 300);
        let dest = graph.destination();
        graph.connect(a, dest).unwrap();
        graph.connect(b, dest).unwrap();

        let out = graph.render(300);
        assert!(out.left.iter().all(|&s| (s - 0.75).abs() < 1e-6));
        assert_eq!(graph.frames_rendered(), 300);
    }

    #[test]
    fn source_plays_once_then_silence() {
        let mut graph = AudioGraph::new(48000.0);
        let src = source(&mut graph, 1.0, 100);
        graph.connect(src, graph.destination()).unwrap();

        let out = graph.render(200);
        assert_eq!(out.left[99], 1.0);
        assert_eq!(out.left[100], 0.0);
        assert_eq!(out.right[199], 0.0);
    }

    #[test]
    fn topology_change_takes_effect_next_quantum() {
        let mut graph = AudioGraph::new(48000.0);
        let src = source(&mut graph, 1.0, 1024);
        let gain = ParamCell::new(0.5);
        let g = graph.add_gain(gain.clone());
        graph.connect(src, graph.destination()).unwrap();

        let mut l = [0.0; RENDER_QUANTUM];
        let mut r = [0.0; RENDER_QUANTUM];
        graph.render_quantum(&mut l, &mut r);
        assert_eq!(l[0], 1.0);

        graph.disconnect(src).unwrap();
        graph.connect(src, g).unwrap();
        graph.connect(g, graph.destination()).unwrap();
        graph.render_quantum(&mut l, &mut r);
        assert_eq!(l[0], 0.5);

        gain.set(0.25);
        graph.render_quantum(&mut l, &mut r);
        assert_eq!(r[0], 0.25);
    }

    #[test]
    fn progress_reports_running_total() {
        let mut graph = AudioGraph::new(48000.0);
        let mut reports = Vec::new();
        let out = graph.render_with_progress(1000, 400, |n| reports.push(n));
        assert_eq!(out.len(), 1000);
        assert_eq!(reports, vec![400, 800, 1000]);
    }

    #[test]
    fn render_zero_frames() {
        let mut graph = AudioGraph::new(48000.0);
        assert!(graph.render(0).is_empty());
    }
}
