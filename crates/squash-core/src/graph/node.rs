//! Nodes: what they are and what they hold.

use crate::compressor::DynamicsCompressor;
use crate::effect::Effect;
use crate::gain::GainStage;

use super::analyser::AnalysisTap;
use super::buffer::QuantumBuffer;
use super::edge::EdgeId;
use super::stereo_samples::StereoSamples;

/// Handle to a node of one [`AudioGraph`](super::AudioGraph).
///
/// Handles are issued in insertion order; the destination is always the
/// first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Insertion position.
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// The role of a node in the audio graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    /// Plays a stereo buffer once after being started. No inputs.
    BufferSource,
    /// Linear gain.
    Gain,
    /// Dynamics compressor.
    Compressor,
    /// Pass-through that records into an [`AnalysisTap`].
    Analyser,
    /// Final output. Exactly one per graph, no outputs.
    Destination,
}

pub(crate) enum Processor {
    BufferSource {
        samples: StereoSamples,
        position: usize,
        started: bool,
    },
    Gain(GainStage),
    Compressor(DynamicsCompressor),
    Analyser(AnalysisTap),
    Destination,
}

impl Processor {
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::BufferSource { .. } => NodeKind::BufferSource,
            Self::Gain(_) => NodeKind::Gain,
            Self::Compressor(_) => NodeKind::Compressor,
            Self::Analyser(_) => NodeKind::Analyser,
            Self::Destination => NodeKind::Destination,
        }
    }
}

/// Internal bookkeeping for a node in the graph.
pub(crate) struct NodeData {
    pub processor: Processor,
    /// Edges arriving at this node.
    pub incoming: Vec<EdgeId>,
    /// Edges leaving this node.
    pub outgoing: Vec<EdgeId>,
    /// Output of the last rendered quantum.
    pub output: QuantumBuffer,
}

impl NodeData {
    pub fn new(processor: Processor, block_size: usize) -> Self {
        Self {
            processor,
            incoming: Vec::new(),
            outgoing: Vec::new(),
            output: QuantumBuffer::new(block_size),
        }
    }

    /// Render `frames` frames from the summed `input` into `self.output`.
    pub fn render(&mut self, input: &QuantumBuffer, frames: usize) {
        let out = &mut self.output;
        match &mut self.processor {
            Processor::BufferSource {
                samples,
                position,
                started,
            } => {
                out.silence();
                let remaining = samples.len().saturating_sub(*position);
                if *started && remaining > 0 {
                    let n = frames.min(remaining);
                    let (l, r) = out.split_mut(n);
                    l.copy_from_slice(&samples.left[*position..*position + n]);
                    r.copy_from_slice(&samples.right[*position..*position + n]);
                    *position += n;
                }
            }
            Processor::Gain(stage) => {
                let (in_l, in_r) = input.split(frames);
                let (out_l, out_r) = out.split_mut(frames);
                stage.process_block_stereo(in_l, in_r, out_l, out_r);
            }
            Processor::Compressor(stage) => {
                let (in_l, in_r) = input.split(frames);
                let (out_l, out_r) = out.split_mut(frames);
                stage.process_block_stereo(in_l, in_r, out_l, out_r);
            }
            Processor::Analyser(tap) => {
                out.assign(input);
                let (l, r) = input.split(frames);
                tap.push_block(l, r);
            }
            Processor::Destination => out.assign(input),
        }
    }
}
