//! Turning file bytes into channel-separated samples.

use std::io::Cursor;

use hound::{SampleFormat, WavReader};
use squash_core::StereoSamples;

use crate::DecodeError;

/// Channel-separated audio at one sample rate.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    /// One buffer per channel, all the same length.
    pub channels: Vec<Vec<f32>>,
    /// Frames per second.
    pub sample_rate: u32,
}

impl DecodedAudio {
    /// Frames per channel.
    pub fn frames(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    /// Number of channels.
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Fold into a stereo pair.
    ///
    /// Mono is duplicated to both sides. With more than two channels only the
    /// first two are kept.
    pub fn into_stereo(self) -> StereoSamples {
        let mut channels = self.channels.into_iter();
        match (channels.next(), channels.next()) {
            (Some(left), Some(right)) => StereoSamples::new(left, right),
            (Some(mono), None) => StereoSamples::from_mono(mono),
            _ => StereoSamples::default(),
        }
    }

    fn from_interleaved(interleaved: &[f32], channel_count: usize, sample_rate: u32) -> Self {
        let frames = interleaved.len() / channel_count.max(1);
        let mut channels = vec![Vec::with_capacity(frames); channel_count];
        for frame in interleaved.chunks_exact(channel_count.max(1)) {
            for (ch, &sample) in channels.iter_mut().zip(frame) {
                ch.push(sample);
            }
        }
        Self {
            channels,
            sample_rate,
        }
    }

    fn check(self) -> Result<Self, DecodeError> {
        if self.channels.is_empty() || self.sample_rate == 0 || self.frames() == 0 {
            Err(DecodeError::Empty)
        } else {
            Ok(self)
        }
    }
}

/// Decodes a whole file held in memory.
pub trait Decoder {
    /// Decode `bytes`. `hint` is the file extension, if known.
    fn decode(&self, bytes: &[u8], hint: Option<&str>) -> Result<DecodedAudio, DecodeError>;
}

/// RIFF/WAVE decoder backed by `hound`. Accepts integer PCM and 32-bit float.
#[derive(Debug, Clone, Copy, Default)]
pub struct WavDecoder;

impl Decoder for WavDecoder {
    fn decode(&self, bytes: &[u8], hint: Option<&str>) -> Result<DecodedAudio, DecodeError> {
        if !bytes.starts_with(b"RIFF") {
            let what = hint.map_or_else(|| "not a RIFF file".to_string(), |ext| format!(".{ext}"));
            return Err(DecodeError::Unsupported(what));
        }

        let reader = WavReader::new(Cursor::new(bytes))?;
        let spec = reader.spec();
        let interleaved: Vec<f32> = match spec.sample_format {
            SampleFormat::Float => reader
                .into_samples::<f32>()
                .collect::<Result<Vec<_>, _>>()?,
            SampleFormat::Int => {
                let max_val = (1i64 << (spec.bits_per_sample.max(1) - 1)) as f32;
                reader
                    .into_samples::<i32>()
                    .map(|s| s.map(|v| v as f32 / max_val))
                    .collect::<Result<Vec<_>, _>>()?
            }
        };

        tracing::debug!(
            channels = spec.channels,
            sample_rate = spec.sample_rate,
            bits = spec.bits_per_sample,
            "decoded WAV"
        );
        DecodedAudio::from_interleaved(&interleaved, usize::from(spec.channels), spec.sample_rate)
            .check()
    }
}

/// Decoder for everything `symphonia` is built with here (MP3, FLAC,
/// Ogg Vorbis, WAV).
#[cfg(feature = "symphonia")]
#[derive(Debug, Clone, Copy, Default)]
pub struct SymphoniaDecoder;

#[cfg(feature = "symphonia")]
impl Decoder for SymphoniaDecoder {
    fn decode(&self, bytes: &[u8], hint: Option<&str>) -> Result<DecodedAudio, DecodeError> {
        use symphonia::core::audio::SampleBuffer;
        use symphonia::core::codecs::{CODEC_TYPE_NULL, DecoderOptions};
        use symphonia::core::errors::Error;
        use symphonia::core::formats::FormatOptions;
        use symphonia::core::io::MediaSourceStream;
        use symphonia::core::meta::MetadataOptions;
        use symphonia::core::probe::Hint;

        let mss = MediaSourceStream::new(Box::new(Cursor::new(bytes.to_vec())), Default::default());
        let mut probe_hint = Hint::new();
        if let Some(ext) = hint {
            probe_hint.with_extension(ext);
        }

        let probed = symphonia::default::get_probe()
            .format(
                &probe_hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| DecodeError::Unsupported(e.to_string()))?;
        let mut format = probed.format;

        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| DecodeError::Unsupported("no decodable audio track".to_string()))?;
        let track_id = track.id;
        let mut sample_rate = track.codec_params.sample_rate.unwrap_or(0);
        let mut channel_count = track.codec_params.channels.map_or(0, |c| c.count());

        let mut decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| DecodeError::Unsupported(e.to_string()))?;

        let mut interleaved = Vec::new();
        let mut scratch: Option<SampleBuffer<f32>> = None;
        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                // End of stream, or a chained stream we do not follow.
                Err(Error::IoError(_) | Error::ResetRequired) => break,
                Err(e) => return Err(DecodeError::Corrupt(e.to_string())),
            };
            if packet.track_id() != track_id {
                continue;
            }

            let decoded = match decoder.decode(&packet) {
                Ok(decoded) => decoded,
                Err(Error::DecodeError(msg)) => {
                    tracing::warn!("skipping undecodable packet: {msg}");
                    continue;
                }
                Err(e) => return Err(DecodeError::Corrupt(e.to_string())),
            };

            let spec = *decoded.spec();
            sample_rate = spec.rate;
            channel_count = spec.channels.count();
            let buf = scratch.get_or_insert_with(|| {
                SampleBuffer::<f32>::new(decoded.capacity() as u64, spec)
            });
            if buf.capacity() < decoded.capacity() * channel_count {
                *buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
            }
            buf.copy_interleaved_ref(decoded);
            interleaved.extend_from_slice(buf.samples());
        }

        tracing::debug!(channels = channel_count, sample_rate, "decoded with symphonia");
        DecodedAudio::from_interleaved(&interleaved, channel_count, sample_rate).check()
    }
}
