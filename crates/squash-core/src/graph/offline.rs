//! Offline rendering context.

use super::processing::AudioGraph;
use super::stereo_samples::StereoSamples;

/// Channel count of every graph in this crate.
pub const CHANNELS: usize = 2;

/// An [`AudioGraph`] with a fixed render length, rendered faster than real time.
///
/// # Example
///
/// ```rust
/// use squash_core::graph::{OfflineContext, StereoSamples};
///
/// let mut ctx = OfflineContext::new(44100, 44100.0);
/// let graph = ctx.graph_mut();
/// let src = graph.add_buffer_source(StereoSamples::from_mono(vec![0.1; 44100]));
/// graph.connect(src, graph.destination()).unwrap();
/// graph.start_source(src).unwrap();
///
/// let rendered = ctx.start_rendering();
/// assert_eq!(rendered.len(), 44100);
/// ```
#[derive(Debug)]
pub struct OfflineContext {
    graph: AudioGraph,
    length: usize,
}

impl OfflineContext {
    /// Create a stereo context that renders `length` frames at `sample_rate`.
    pub fn new(length: usize, sample_rate: f32) -> Self {
        Self {
            graph: AudioGraph::new(sample_rate),
            length,
        }
    }

    /// Number of frames a render produces.
    pub fn length(&self) -> usize {
        self.length
    }

    /// Channel count of the rendered buffer.
    pub fn channels(&self) -> usize {
        CHANNELS
    }

    /// The graph to build before rendering.
    pub fn graph(&self) -> &AudioGraph {
        &self.graph
    }

    /// Mutable access to the graph.
    pub fn graph_mut(&mut self) -> &mut AudioGraph {
        &mut self.graph
    }

    /// Render the whole length.
    pub fn start_rendering(&mut self) -> StereoSamples {
        self.graph.render(self.length)
    }

    /// Render the whole length, reporting progress every `block` frames.
    pub fn start_rendering_with_progress(
        &mut self,
        block: usize,
        progress: impl FnMut(usize),
    ) -> StereoSamples {
        self.graph.render_with_progress(self.length, block, progress)
    }
}
