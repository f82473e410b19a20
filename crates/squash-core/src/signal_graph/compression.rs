//! Gain + compressor topology with input and output taps.

use crate::compressor::CompressorControls;
use crate::graph::{AnalysisTap, AudioGraph, GraphError, NodeId};
use crate::param::ParamCell;

use super::{CompressorParams, Endpoints, GraphKind, SignalGraph};

/// Input gain → input tap → compressor → output gain → output tap.
///
/// Setters write shared parameter cells, so they need no graph borrow and
/// take effect at the next render quantum.
///
/// # Example
///
/// ```rust
/// use squash_core::graph::AudioGraph;
/// use squash_core::{CompressionGraph, CompressorParams, SignalGraph};
///
/// let mut graph = AudioGraph::new(44100.0);
/// let comp = CompressionGraph::new(&mut graph, &CompressorParams::default()).unwrap();
/// comp.set_threshold(-30.0);
/// assert_eq!(comp.params().threshold, -30.0);
/// assert!(comp.output_tap().is_some());
/// ```
#[derive(Debug)]
pub struct CompressionGraph {
    endpoints: Endpoints,
    input_gain: ParamCell,
    output_gain: ParamCell,
    controls: CompressorControls,
    input_tap: AnalysisTap,
    output_tap: AnalysisTap,
    compressor: NodeId,
}

impl CompressionGraph {
    /// Add and chain the five stages inside `graph`.
    pub fn new(graph: &mut AudioGraph, params: &CompressorParams) -> Result<Self, GraphError> {
        let input_gain = ParamCell::new(params.input_gain);
        let output_gain = ParamCell::new(params.output_gain);
        let controls = CompressorControls::new(
            params.threshold,
            params.knee,
            params.ratio,
            params.attack,
            params.release,
        );
        let input_tap = AnalysisTap::new();
        let output_tap = AnalysisTap::new();

        let gain_in = graph.add_gain(input_gain.clone());
        let analyser_in = graph.add_analyser(input_tap.clone());
        let compressor = graph.add_compressor(controls.clone());
        let gain_out = graph.add_gain(output_gain.clone());
        let analyser_out = graph.add_analyser(output_tap.clone());

        graph.connect(gain_in, analyser_in)?;
        graph.connect(analyser_in, compressor)?;
        graph.connect(compressor, gain_out)?;
        graph.connect(gain_out, analyser_out)?;

        Ok(Self {
            endpoints: Endpoints::new(gain_in, analyser_out),
            input_gain,
            output_gain,
            controls,
            input_tap,
            output_tap,
            compressor,
        })
    }

    /// Set the linear gain before the input tap.
    pub fn set_input_gain(&self, value: f32) {
        self.input_gain.set(value);
    }

    /// Set the linear gain after the compressor.
    pub fn set_output_gain(&self, value: f32) {
        self.output_gain.set(value);
    }

    /// Set the threshold in dB.
    pub fn set_threshold(&self, value: f32) {
        self.controls.threshold.set(value);
    }

    /// Set the knee width in dB.
    pub fn set_knee(&self, value: f32) {
        self.controls.knee.set(value);
    }

    /// Set the ratio.
    pub fn set_ratio(&self, value: f32) {
        self.controls.ratio.set(value);
    }

    /// Set the attack time in seconds.
    pub fn set_attack(&self, value: f32) {
        self.controls.attack.set(value);
    }

    /// Set the release time in seconds.
    pub fn set_release(&self, value: f32) {
        self.controls.release.set(value);
    }

    /// Apply every field of `params`.
    pub fn apply(&self, params: &CompressorParams) {
        self.set_input_gain(params.input_gain);
        self.set_output_gain(params.output_gain);
        self.set_threshold(params.threshold);
        self.set_knee(params.knee);
        self.set_ratio(params.ratio);
        self.set_attack(params.attack);
        self.set_release(params.release);
    }

    /// Current values as last set, before the stage's clamping.
    pub fn params(&self) -> CompressorParams {
        CompressorParams {
            threshold: self.controls.threshold.get(),
            knee: self.controls.knee.get(),
            ratio: self.controls.ratio.get(),
            attack: self.controls.attack.get(),
            release: self.controls.release.get(),
            input_gain: self.input_gain.get(),
            output_gain: self.output_gain.get(),
        }
    }

    /// The compressor node, for reading its gain reduction.
    pub fn compressor_node(&self) -> NodeId {
        self.compressor
    }
}

impl SignalGraph for CompressionGraph {
    fn kind(&self) -> GraphKind {
        GraphKind::Compression
    }

    fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    fn endpoints_mut(&mut self) -> &mut Endpoints {
        &mut self.endpoints
    }

    fn input_tap(&self) -> &AnalysisTap {
        &self.input_tap
    }

    fn output_tap(&self) -> Option<&AnalysisTap> {
        Some(&self.output_tap)
    }
}
