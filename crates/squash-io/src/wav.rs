//! IEEE-float WAV serialization.

use crate::HeaderError;

/// Size of the fixed header in bytes.
pub const HEADER_LEN: usize = 44;

/// `WAVE_FORMAT_IEEE_FLOAT`.
pub const FORMAT_IEEE_FLOAT: u16 = 3;

/// Every encoded sample is a 32-bit float.
pub const BITS_PER_SAMPLE: u16 = 32;

const BYTES_PER_SAMPLE: u16 = BITS_PER_SAMPLE / 8;
const FMT_CHUNK_LEN: u32 = 16;
/// RIFF size is the data size plus everything after the RIFF size field.
const RIFF_OVERHEAD: u32 = 36;

/// The canonical 44-byte RIFF/WAVE header.
///
/// Field order matches the byte layout. `riff_size` is not stored; it is
/// always `data_size + 36`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavHeader {
    /// Format tag, [`FORMAT_IEEE_FLOAT`] for everything this crate writes.
    pub format_tag: u16,
    /// Interleaved channel count.
    pub channels: u16,
    /// Frames per second.
    pub sample_rate: u32,
    /// `sample_rate * block_align`.
    pub byte_rate: u32,
    /// Bytes per frame, `channels * 4`.
    pub block_align: u16,
    /// Bits per sample.
    pub bits_per_sample: u16,
    /// Body length in bytes.
    pub data_size: u32,
}

impl WavHeader {
    /// Header for `frames` frames of 32-bit float audio.
    ///
    /// Size fields saturate at `u32::MAX` instead of wrapping.
    pub fn float32(channels: u16, sample_rate: u32, frames: u32) -> Self {
        let block_align = channels.saturating_mul(BYTES_PER_SAMPLE);
        Self {
            format_tag: FORMAT_IEEE_FLOAT,
            channels,
            sample_rate,
            byte_rate: sample_rate.saturating_mul(u32::from(block_align)),
            block_align,
            bits_per_sample: BITS_PER_SAMPLE,
            data_size: frames.saturating_mul(u32::from(block_align)),
        }
    }

    /// Value of the RIFF chunk size field.
    pub fn riff_size(&self) -> u32 {
        self.data_size.saturating_add(RIFF_OVERHEAD)
    }

    /// Number of whole frames in the body, 0 when `block_align` is 0.
    pub fn frames(&self) -> u32 {
        self.data_size
            .checked_div(u32::from(self.block_align))
            .unwrap_or(0)
    }

    /// Serialize to the on-disk layout, little-endian.
    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let mut out = [0u8; HEADER_LEN];
        let mut w = Writer {
            buf: &mut out,
            pos: 0,
        };
        w.tag(b"RIFF");
        w.u32(self.riff_size());
        w.tag(b"WAVE");
        w.tag(b"fmt ");
        w.u32(FMT_CHUNK_LEN);
        w.u16(self.format_tag);
        w.u16(self.channels);
        w.u32(self.sample_rate);
        w.u32(self.byte_rate);
        w.u16(self.block_align);
        w.u16(self.bits_per_sample);
        w.tag(b"data");
        w.u32(self.data_size);
        out
    }

    /// Parse the first [`HEADER_LEN`] bytes of `bytes`.
    ///
    /// Only the four chunk tags are checked; the numeric fields are taken as
    /// written.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, HeaderError> {
        let Some(bytes) = bytes.first_chunk::<HEADER_LEN>() else {
            return Err(HeaderError::TooShort(bytes.len()));
        };
        let mut r = Reader { buf: bytes, pos: 0 };
        r.tag("RIFF")?;
        let _riff_size = r.u32();
        r.tag("WAVE")?;
        r.tag("fmt ")?;
        let _fmt_len = r.u32();
        let format_tag = r.u16();
        let channels = r.u16();
        let sample_rate = r.u32();
        let byte_rate = r.u32();
        let block_align = r.u16();
        let bits_per_sample = r.u16();
        r.tag("data")?;
        let data_size = r.u32();
        Ok(Self {
            format_tag,
            channels,
            sample_rate,
            byte_rate,
            block_align,
            bits_per_sample,
            data_size,
        })
    }
}

struct Writer<'a> {
    buf: &'a mut [u8; HEADER_LEN],
    pos: usize,
}

impl Writer<'_> {
    fn put(&mut self, bytes: &[u8]) {
        self.buf[self.pos..self.pos + bytes.len()].copy_from_slice(bytes);
        self.pos += bytes.len();
    }

    fn tag(&mut self, tag: &[u8; 4]) {
        self.put(tag);
    }

    fn u16(&mut self, v: u16) {
        self.put(&v.to_le_bytes());
    }

    fn u32(&mut self, v: u32) {
        self.put(&v.to_le_bytes());
    }
}

struct Reader<'a> {
    buf: &'a [u8; HEADER_LEN],
    pos: usize,
}

impl Reader<'_> {
    fn take<const N: usize>(&mut self) -> [u8; N] {
        let mut out = [0u8; N];
        out.copy_from_slice(&self.buf[self.pos..self.pos + N]);
        self.pos += N;
        out
    }

    fn tag(&mut self, expected: &'static str) -> Result<(), HeaderError> {
        let offset = self.pos;
        if self.take::<4>() == expected.as_bytes() {
            Ok(())
        } else {
            Err(HeaderError::BadMagic { offset, expected })
        }
    }

    fn u16(&mut self) -> u16 {
        u16::from_le_bytes(self.take())
    }

    fn u32(&mut self) -> u32 {
        u32::from_le_bytes(self.take())
    }
}

/// Encode interleaved samples as a 32-bit float WAV file.
///
/// Pure and deterministic. The body holds every whole frame of `samples`
/// (`samples.len() / channels` of them) as little-endian `f32`; a trailing
/// partial frame is dropped. With `channels == 0` the body is empty.
///
/// ```rust
/// use squash_io::{HEADER_LEN, WavHeader, encode_wav};
///
/// let bytes = encode_wav(&[0.0, 0.0, 0.5, -0.5], 2, 44100);
/// assert_eq!(bytes.len(), HEADER_LEN + 4 * 4);
///
/// let header = WavHeader::from_bytes(&bytes).unwrap();
/// assert_eq!(header.channels, 2);
/// assert_eq!(header.sample_rate, 44100);
/// assert_eq!(header.frames(), 2);
/// ```
pub fn encode_wav(samples: &[f32], channels: u16, sample_rate: u32) -> Vec<u8> {
    let block_align = u32::from(channels) * u32::from(BYTES_PER_SAMPLE);
    let max_frames = (u32::MAX - RIFF_OVERHEAD)
        .checked_div(block_align)
        .unwrap_or(0);
    let frames = samples
        .len()
        .checked_div(usize::from(channels))
        .unwrap_or(0)
        .min(max_frames as usize);

    let header = WavHeader::float32(channels, sample_rate, frames as u32);
    let body = &samples[..frames * usize::from(channels)];

    let mut out = Vec::with_capacity(HEADER_LEN + header.data_size as usize);
    out.extend_from_slice(&header.to_bytes());
    for sample in body {
        out.extend_from_slice(&sample.to_le_bytes());
    }
    out
}

/// Interleave two channels as L, R, L, R.
///
/// The shorter channel sets the length.
pub fn interleave(left: &[f32], right: &[f32]) -> Vec<f32> {
    left.iter()
        .zip(right)
        .flat_map(|(&l, &r)| [l, r])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_layout_is_canonical() {
        let bytes = encode_wav(&[0.25; 8], 2, 48000);
        let h = &bytes[..HEADER_LEN];

        assert_eq!(&h[0..4], b"RIFF");
        assert_eq!(u32::from_le_bytes(h[4..8].try_into().unwrap()), 32 + 36);
        assert_eq!(&h[8..12], b"WAVE");
        assert_eq!(&h[12..16], b"fmt ");
        assert_eq!(u32::from_le_bytes(h[16..20].try_into().unwrap()), 16);
        assert_eq!(u16::from_le_bytes([h[20], h[21]]), 3);
        assert_eq!(u16::from_le_bytes([h[22], h[23]]), 2);
        assert_eq!(u32::from_le_bytes(h[24..28].try_into().unwrap()), 48000);
        assert_eq!(u32::from_le_bytes(h[28..32].try_into().unwrap()), 48000 * 8);
        assert_eq!(u16::from_le_bytes([h[32], h[33]]), 8);
        assert_eq!(u16::from_le_bytes([h[34], h[35]]), 32);
        assert_eq!(&h[36..40], b"data");
        assert_eq!(u32::from_le_bytes(h[40..44].try_into().unwrap()), 32);
    }

    #[test]
    fn body_is_little_endian_floats() {
        let bytes = encode_wav(&[1.0, -0.5], 2, 44100);
        assert_eq!(&bytes[44..48], &1.0f32.to_le_bytes());
        assert_eq!(&bytes[48..52], &(-0.5f32).to_le_bytes());
    }

    #[test]
    fn deterministic() {
        let samples: Vec<f32> = (0..64).map(|i| i as f32 / 64.0).collect();
        assert_eq!(encode_wav(&samples, 2, 44100), encode_wav(&samples, 2, 44100));
    }

    #[test]
    fn empty_input_is_header_only() {
        let bytes = encode_wav(&[], 2, 44100);
        assert_eq!(bytes.len(), HEADER_LEN);
        assert_eq!(WavHeader::from_bytes(&bytes).unwrap().data_size, 0);
    }

    #[test]
    fn partial_frame_is_dropped() {
        let bytes = encode_wav(&[0.1, 0.2, 0.3], 2, 44100);
        assert_eq!(bytes.len(), HEADER_LEN + 8);
        assert_eq!(WavHeader::from_bytes(&bytes).unwrap().frames(), 1);
    }

    #[test]
    fn zero_channels_has_no_body() {
        let bytes = encode_wav(&[0.1, 0.2], 0, 44100);
        assert_eq!(bytes.len(), HEADER_LEN);
        let header = WavHeader::from_bytes(&bytes).unwrap();
        assert_eq!(header.block_align, 0);
        assert_eq!(header.frames(), 0);
    }

    #[test]
    fn from_bytes_rejects_bad_input() {
        assert_eq!(
            WavHeader::from_bytes(&[0; 10]),
            Err(HeaderError::TooShort(10))
        );

        let mut bytes = encode_wav(&[0.0; 2], 2, 44100);
        bytes[8..12].copy_from_slice(b"AVI ");
        assert_eq!(
            WavHeader::from_bytes(&bytes),
            Err(HeaderError::BadMagic {
                offset: 8,
                expected: "WAVE"
            })
        );
    }

    #[test]
    fn header_round_trip() {
        let header = WavHeader::float32(2, 22050, 1000);
        assert_eq!(WavHeader::from_bytes(&header.to_bytes()), Ok(header));
        assert_eq!(header.riff_size(), 8000 + 36);
    }

    #[test]
    fn oversized_fields_saturate() {
        let header = WavHeader::float32(2, u32::MAX / 2, u32::MAX);
        assert_eq!(header.byte_rate, u32::MAX);
        assert_eq!(header.data_size, u32::MAX);
        assert_eq!(header.riff_size(), u32::MAX);
    }

    #[test]
    fn interleave_alternates() {
        assert_eq!(
            interleave(&[1.0, 2.0, 3.0], &[-1.0, -2.0]),
            vec![1.0, -1.0, 2.0, -2.0]
        );
    }
}
