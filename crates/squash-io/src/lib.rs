//! File-facing half of squash.
//!
//! This crate provides:
//!
//! - **WAV encoding**: [`encode_wav`] serializes interleaved `f32` samples
//!   behind a 44-byte IEEE-float header, [`WavHeader`] parses it back
//! - **Decoding**: the [`Decoder`] trait, with [`WavDecoder`] built in and
//!   `SymphoniaDecoder` behind the `symphonia` feature
//! - **Delivery**: the [`DownloadSink`] trait, with [`DirectorySink`] and
//!   [`MemorySink`]
//! - **Offline rendering**: [`OfflineRenderPipeline`] runs a file through a
//!   compression graph and delivers the result as a WAV file
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use squash_core::CompressorParams;
//! use squash_io::{DirectorySink, OfflineRenderPipeline, WavDecoder};
//!
//! let mut pipeline = OfflineRenderPipeline::new(
//!     CompressorParams::default(),
//!     WavDecoder,
//!     DirectorySink::new("out"),
//! );
//! let name = pipeline.render_file("drums.wav")?;
//! println!("wrote out/{name}");
//! ```

mod decode;
mod offline;
mod sink;
mod wav;

#[cfg(feature = "symphonia")]
pub use decode::SymphoniaDecoder;
pub use decode::{DecodedAudio, Decoder, WavDecoder};
pub use offline::{DEFAULT_BLOCK_SIZE, OfflineRenderPipeline, output_file_name};
pub use sink::{DirectorySink, DownloadSink, MemorySink};
pub use wav::{
    BITS_PER_SAMPLE, FORMAT_IEEE_FLOAT, HEADER_LEN, WavHeader, encode_wav, interleave,
};

/// Failure to turn file bytes into samples.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// No decoder recognises the container or codec.
    #[error("Unsupported format: {0}")]
    Unsupported(String),

    /// The container was recognised but its contents are broken.
    #[error("Corrupt audio data: {0}")]
    Corrupt(String),

    /// Decoding succeeded but produced no channels or no sample rate.
    #[error("Decoded audio is empty")]
    Empty,
}

impl From<hound::Error> for DecodeError {
    fn from(err: hound::Error) -> Self {
        match err {
            hound::Error::FormatError(msg) => Self::Corrupt(msg.to_string()),
            hound::Error::Unsupported => Self::Unsupported("WAV sample format".to_string()),
            other => Self::Corrupt(other.to_string()),
        }
    }
}

/// Failure to parse a 44-byte WAV header.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum HeaderError {
    /// Fewer than [`HEADER_LEN`] bytes.
    #[error("WAV header needs {HEADER_LEN} bytes, got {0}")]
    TooShort(usize),

    /// A chunk tag did not match.
    #[error("Bad magic at byte {offset}: expected {expected:?}")]
    BadMagic {
        /// Byte offset of the tag.
        offset: usize,
        /// The tag that should be there.
        expected: &'static str,
    },
}

/// Error types for the offline render pipeline.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// Reading the source file failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The source could not be decoded.
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Wiring the render graph failed.
    #[error("Graph error: {0}")]
    Graph(#[from] squash_core::GraphError),

    /// The sink refused the encoded file.
    #[error("Delivery of {file_name} failed: {source}")]
    Deliver {
        /// Name the file was offered under.
        file_name: String,
        /// Underlying sink error.
        source: std::io::Error,
    },
}

/// Result type for rendering operations.
pub type Result<T> = std::result::Result<T, RenderError>;
