//! Decode, compress, encode, deliver.

use std::path::Path;

use squash_core::graph::{CHANNELS, OfflineContext};
use squash_core::{CompressionGraph, CompressorParams, SignalGraph, StereoSamples};

use crate::decode::{DecodedAudio, Decoder};
use crate::sink::DownloadSink;
use crate::wav::{encode_wav, interleave};
use crate::{RenderError, Result};

/// Frames rendered between two progress reports.
pub const DEFAULT_BLOCK_SIZE: usize = 4096;

/// Name a rendered file after its source: the extension is replaced by `.wav`.
///
/// Only the last extension is stripped. A path without a usable stem becomes
/// `output.wav`.
///
/// ```rust
/// use squash_io::output_file_name;
///
/// assert_eq!(output_file_name("music/loop.120bpm.mp3"), "loop.120bpm.wav");
/// assert_eq!(output_file_name("take"), "take.wav");
/// assert_eq!(output_file_name(""), "output.wav");
/// ```
pub fn output_file_name(source: impl AsRef<Path>) -> String {
    let stem = source
        .as_ref()
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("output");
    format!("{stem}.wav")
}

/// Runs whole files through a fresh [`CompressionGraph`] faster than real
/// time and hands the result to a [`DownloadSink`] as a stereo float WAV.
///
/// Every render builds its own graph, so nothing carries over between files.
/// Any failure before delivery aborts the render and nothing is delivered.
#[derive(Debug)]
pub struct OfflineRenderPipeline<D, S> {
    params: CompressorParams,
    decoder: D,
    sink: S,
    block_size: usize,
}

impl<D: Decoder, S: DownloadSink> OfflineRenderPipeline<D, S> {
    /// Pipeline rendering with `params`.
    pub fn new(params: CompressorParams, decoder: D, sink: S) -> Self {
        Self {
            params,
            decoder,
            sink,
            block_size: DEFAULT_BLOCK_SIZE,
        }
    }

    /// Report progress every `frames` frames instead of [`DEFAULT_BLOCK_SIZE`].
    pub fn with_block_size(mut self, frames: usize) -> Self {
        self.block_size = frames.max(1);
        self
    }

    /// Parameters the next render uses.
    pub fn params(&self) -> &CompressorParams {
        &self.params
    }

    /// Replace the parameters for later renders.
    pub fn set_params(&mut self, params: CompressorParams) {
        self.params = params;
    }

    /// Progress granularity in frames.
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// The sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Give the sink back.
    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Render the file at `path`. Returns the delivered file name.
    pub fn render_file(&mut self, path: impl AsRef<Path>) -> Result<String> {
        self.render_file_with_progress(path, |_, _| {})
    }

    /// [`render_file`](Self::render_file) with a `(rendered, total)` frame
    /// callback.
    pub fn render_file_with_progress(
        &mut self,
        path: impl AsRef<Path>,
        progress: impl FnMut(usize, usize),
    ) -> Result<String> {
        let path = path.as_ref();
        tracing::info!(path = %path.display(), "reading source");
        let bytes = std::fs::read(path)?;
        self.render_bytes(path, &bytes, progress)
    }

    /// Render a file already in memory. `source_name` supplies the output
    /// name and the decoder's extension hint.
    pub fn render_bytes(
        &mut self,
        source_name: impl AsRef<Path>,
        bytes: &[u8],
        progress: impl FnMut(usize, usize),
    ) -> Result<String> {
        let source_name = source_name.as_ref();
        let hint = source_name.extension().and_then(|e| e.to_str());
        let audio = self.decoder.decode(bytes, hint)?;
        tracing::info!(
            channels = audio.channel_count(),
            frames = audio.frames(),
            sample_rate = audio.sample_rate,
            "decoded source"
        );
        if audio.channel_count() > CHANNELS {
            tracing::warn!(
                "keeping the first {CHANNELS} of {} channels",
                audio.channel_count()
            );
        }

        let sample_rate = audio.sample_rate;
        let rendered = self.render(audio, progress)?;
        let wav = encode_wav(
            &interleave(&rendered.left, &rendered.right),
            CHANNELS as u16,
            sample_rate,
        );

        let file_name = output_file_name(source_name);
        tracing::info!(file = %file_name, bytes = wav.len(), "delivering");
        self.sink
            .deliver(&file_name, wav)
            .map_err(|source| RenderError::Deliver {
                file_name: file_name.clone(),
                source,
            })?;
        Ok(file_name)
    }

    /// Push decoded audio through a new compression graph and return the
    /// rendered stereo buffer at the input's sample rate.
    pub fn render(
        &self,
        audio: DecodedAudio,
        mut progress: impl FnMut(usize, usize),
    ) -> Result<StereoSamples> {
        let sample_rate = audio.sample_rate;
        let input = audio.into_stereo();
        let frames = input.len();

        let mut ctx = OfflineContext::new(frames, sample_rate as f32);
        let graph = ctx.graph_mut();
        let source = graph.add_buffer_source(input);
        let destination = graph.destination();

        let mut compression = CompressionGraph::new(graph, &self.params)?;
        compression.connect_input(graph, source)?;
        compression.connect_output(graph, destination)?;
        graph.start_source(source)?;

        tracing::info!(frames, sample_rate, "rendering");
        let rendered =
            ctx.start_rendering_with_progress(self.block_size, |done| progress(done, frames));
        Ok(rendered)
    }
}
