//! Live session: one source, two topologies, two loudness displays.
//!
//! [`RealtimeSession`] owns the live [`AudioGraph`] with a [`PassthroughGraph`]
//! and a [`CompressionGraph`] built into it. Exactly one of them sits between
//! the attached source and the destination; the other is fully disconnected.
//! Toggling compression moves the source and the destination to the other
//! topology and rebinds the displays to its taps.

use crate::display::{CanvasTarget, FrameScheduler, LoudnessVisualizer, Rgba};
use crate::graph::{AnalysisTap, AudioGraph, GraphError, NodeId, NodeKind};
use crate::signal_graph::{
    CompressionGraph, CompressorParams, GraphKind, PassthroughGraph, SignalGraph,
};

/// Errors from session operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The operation needs state that is not there yet.
    Precondition(&'static str),
    /// Graph wiring failed.
    Graph(GraphError),
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Precondition(msg) => write!(f, "precondition failed: {msg}"),
            Self::Graph(e) => write!(f, "graph error: {e}"),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Graph(e) => Some(e),
            Self::Precondition(_) => None,
        }
    }
}

impl From<GraphError> for SessionError {
    fn from(e: GraphError) -> Self {
        Self::Graph(e)
    }
}

/// Construction options for a [`RealtimeSession`].
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Initial compressor settings.
    pub params: CompressorParams,
    /// Bar color of the input display.
    pub input_color: Rgba,
    /// Bar color of the output display.
    pub output_color: Rgba,
    /// Start with compression on.
    pub compression: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            params: CompressorParams::default(),
            input_color: Rgba::rgb(0x4a, 0x90, 0xd9),
            output_color: Rgba::rgb(0xe9, 0x45, 0x60),
            compression: true,
        }
    }
}

/// Realtime orchestration of source, topologies and displays.
///
/// # Example
///
/// ```rust
/// use squash_core::display::{CanvasTarget, FrameScheduler, ManualClock, PixelSurface};
/// use squash_core::graph::{AudioGraph, StereoSamples};
/// use squash_core::session::{RealtimeSession, SessionOptions};
/// use squash_core::GraphKind;
///
/// let mut graph = AudioGraph::new(44100.0);
/// let source = graph.add_buffer_source(StereoSamples::silence(44100));
/// let mut session = RealtimeSession::new(
///     graph,
///     CanvasTarget::with(PixelSurface::new(64, 16)),
///     CanvasTarget::with(PixelSurface::new(64, 16)),
///     FrameScheduler::new(ManualClock::new(0.0)),
///     SessionOptions::default(),
/// )
/// .unwrap();
///
/// session.attach_source(source).unwrap();
/// assert_eq!(session.active(), GraphKind::Compression);
/// session.set_compression(false).unwrap();
/// assert!(session.output_display().is_none());
/// ```
pub struct RealtimeSession {
    graph: AudioGraph,
    source: Option<NodeId>,
    passthrough: PassthroughGraph,
    compression: CompressionGraph,
    active: GraphKind,
    scheduler: FrameScheduler,
    input_canvas: CanvasTarget,
    output_canvas: CanvasTarget,
    input_color: Rgba,
    output_color: Rgba,
    input_display: Option<LoudnessVisualizer>,
    output_display: Option<LoudnessVisualizer>,
}

impl RealtimeSession {
    /// Build both topologies inside `graph`. Nothing is wired until a source
    /// is attached.
    pub fn new(
        mut graph: AudioGraph,
        input_canvas: CanvasTarget,
        output_canvas: CanvasTarget,
        scheduler: FrameScheduler,
        options: SessionOptions,
    ) -> Result<Self, SessionError> {
        let passthrough = PassthroughGraph::new(&mut graph);
        let compression = CompressionGraph::new(&mut graph, &options.params)?;
        let active = if options.compression {
            GraphKind::Compression
        } else {
            GraphKind::Passthrough
        };

        Ok(Self {
            graph,
            source: None,
            passthrough,
            compression,
            active,
            scheduler,
            input_canvas,
            output_canvas,
            input_color: options.input_color,
            output_color: options.output_color,
            input_display: None,
            output_display: None,
        })
    }

    /// Wire `source` through the active topology to the destination and
    /// start the displays.
    ///
    /// `source` must be a buffer source of the session graph. On error the
    /// previous wiring is left untouched.
    pub fn attach_source(&mut self, source: NodeId) -> Result<(), SessionError> {
        match self.graph.kind(source) {
            Some(NodeKind::BufferSource) => {}
            Some(_) => {
                return Err(GraphError::InvalidConnection(format!(
                    "{source} is not a buffer source"
                ))
                .into());
            }
            None => return Err(GraphError::NodeNotFound(source).into()),
        }

        self.rewire(self.active, source)?;
        self.source = Some(source);
        self.rebuild_displays();
        Ok(())
    }

    /// Switch between the compression and passthrough topologies.
    ///
    /// Fails with [`SessionError::Precondition`] before a source is attached.
    pub fn set_compression(&mut self, on: bool) -> Result<(), SessionError> {
        let Some(source) = self.source else {
            return Err(SessionError::Precondition(
                "compression toggled before a source was attached",
            ));
        };
        let kind = if on {
            GraphKind::Compression
        } else {
            GraphKind::Passthrough
        };

        self.rewire(kind, source)?;
        self.active = kind;
        self.rebuild_displays();

        #[cfg(feature = "tracing")]
        tracing::info!(active = %kind, "session rewired");
        Ok(())
    }

    /// Begin a display frame: run deferred clears, then tick the displays.
    ///
    /// Returns the frame timestamp.
    pub fn on_frame(&mut self) -> f64 {
        let t = self.scheduler.begin_frame();
        for display in [&mut self.input_display, &mut self.output_display]
            .into_iter()
            .flatten()
        {
            display.tick(t);
        }
        t
    }

    /// Render one block of the live graph.
    pub fn process_block(&mut self, left: &mut [f32], right: &mut [f32]) {
        self.graph.process_block(left, right);
    }

    /// Active topology.
    pub fn active(&self) -> GraphKind {
        self.active
    }

    /// True when the compression topology is active.
    pub fn is_compression_on(&self) -> bool {
        self.active == GraphKind::Compression
    }

    /// The attached source.
    pub fn source(&self) -> Option<NodeId> {
        self.source
    }

    /// The active topology as a trait object.
    pub fn active_graph(&self) -> &dyn SignalGraph {
        match self.active {
            GraphKind::Compression => &self.compression,
            GraphKind::Passthrough => &self.passthrough,
        }
    }

    /// The compression topology, for parameter setters.
    pub fn compression(&self) -> &CompressionGraph {
        &self.compression
    }

    /// The passthrough topology.
    pub fn passthrough(&self) -> &PassthroughGraph {
        &self.passthrough
    }

    /// The live graph.
    pub fn graph(&self) -> &AudioGraph {
        &self.graph
    }

    /// Mutable access to the live graph, e.g. to add and start sources.
    pub fn graph_mut(&mut self) -> &mut AudioGraph {
        &mut self.graph
    }

    /// Display bound to the active input tap.
    pub fn input_display(&self) -> Option<&LoudnessVisualizer> {
        self.input_display.as_ref()
    }

    /// Display bound to the compression output tap, absent while compression is off.
    pub fn output_display(&self) -> Option<&LoudnessVisualizer> {
        self.output_display.as_ref()
    }

    /// The frame scheduler.
    pub fn scheduler(&self) -> &FrameScheduler {
        &self.scheduler
    }

    /// Last gain reduction of the compressor in dB.
    pub fn reduction_db(&self) -> f32 {
        self.graph
            .compressor_reduction_db(self.compression.compressor_node())
            .unwrap_or(0.0)
    }

    /// Disconnect the inactive variant, then connect `kind` between `source`
    /// and the destination.
    fn rewire(&mut self, kind: GraphKind, source: NodeId) -> Result<(), GraphError> {
        let destination = self.graph.destination();
        let Self {
            graph,
            passthrough,
            compression,
            ..
        } = self;
        let (on, off): (&mut dyn SignalGraph, &mut dyn SignalGraph) = match kind {
            GraphKind::Compression => (compression as &mut dyn SignalGraph, passthrough),
            GraphKind::Passthrough => (passthrough as &mut dyn SignalGraph, compression),
        };

        off.disconnect_input(graph);
        off.disconnect_output(graph);
        on.connect_input(graph, source)?;
        on.connect_output(graph, destination)?;
        Ok(())
    }

    /// Stop the current displays, queue their clears and bind new ones to the
    /// active taps.
    fn rebuild_displays(&mut self) {
        for display in [self.input_display.take(), self.output_display.take()]
            .into_iter()
            .flatten()
        {
            let mut display = display;
            if let Some(clear) = display.stop() {
                self.scheduler.defer(clear);
            }
        }

        let active = self.active_graph();
        let input_tap: AnalysisTap = active.input_tap().clone();
        let output_tap: Option<AnalysisTap> = active.output_tap().cloned();

        let mut input = LoudnessVisualizer::new(input_tap, self.input_canvas.clone(), self.input_color);
        let mut output = output_tap.map(|tap| {
            LoudnessVisualizer::new(tap, self.output_canvas.clone(), self.output_color)
        });

        let now = self.scheduler.now_ms();
        input.play(now);
        if let Some(output) = output.as_mut() {
            output.play(now);
        }
        self.input_display = Some(input);
        self.output_display = output;
    }
}

impl std::fmt::Debug for RealtimeSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeSession")
            .field("active", &self.active)
            .field("source", &self.source)
            .field("graph", &self.graph)
            .finish_non_exhaustive()
    }
}
