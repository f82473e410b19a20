//! Read-only analysis taps.
//!
//! An [`AnalysisTap`] records the most recent [`FFT_SIZE`] samples that pass
//! through an analyser node, down-mixed to mono, and hands them out as
//! unsigned bytes centred on 128. The analyser node itself is a pass-through.
//!
//! The tap is a cheap cloneable handle: the graph node keeps one clone and the
//! loudness display keeps another.

use std::sync::Arc;

use parking_lot::Mutex;

/// Number of samples in the analysis window.
pub const FFT_SIZE: usize = 2048;

/// Byte value representing silence in the time-domain data.
pub const BYTE_MIDPOINT: u8 = 128;

struct TapState {
    window: Box<[f32; FFT_SIZE]>,
    write_pos: usize,
}

/// Shared handle to an analyser node's sample window.
///
/// # Example
///
/// ```rust
/// use squash_core::graph::AnalysisTap;
///
/// let tap = AnalysisTap::new();
/// tap.push_block(&[1.0, -1.0], &[1.0, -1.0]);
///
/// let mut bytes = vec![0u8; tap.fft_size()];
/// tap.byte_time_domain_data(&mut bytes);
/// assert_eq!(bytes[bytes.len() - 1], 0);
/// assert_eq!(bytes[bytes.len() - 2], 255);
/// ```
#[derive(Clone)]
pub struct AnalysisTap {
    state: Arc<Mutex<TapState>>,
}

impl AnalysisTap {
    /// Create a tap holding a silent window.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(TapState {
                window: Box::new([0.0; FFT_SIZE]),
                write_pos: 0,
            })),
        }
    }

    /// Window length in samples.
    pub fn fft_size(&self) -> usize {
        FFT_SIZE
    }

    /// Half the window length, the number of bytes the display reads.
    pub fn frequency_bin_count(&self) -> usize {
        FFT_SIZE / 2
    }

    /// Record a block of stereo samples, down-mixed as `(l + r) / 2`.
    pub fn push_block(&self, left: &[f32], right: &[f32]) {
        let mut state = self.state.lock();
        for (l, r) in left.iter().zip(right.iter()) {
            let pos = state.write_pos;
            state.window[pos] = (l + r) * 0.5;
            state.write_pos = (pos + 1) % FFT_SIZE;
        }
    }

    /// Copy the window into `out` as bytes, oldest sample first.
    ///
    /// Each sample maps to `clamp(floor(128 * (1 + x)), 0, 255)`. If `out` is
    /// shorter than the window, only its length is filled, starting from the
    /// oldest sample. Entries past the window length are left untouched.
    pub fn byte_time_domain_data(&self, out: &mut [u8]) {
        let state = self.state.lock();
        let n = out.len().min(FFT_SIZE);
        for (i, byte) in out.iter_mut().take(n).enumerate() {
            let sample = state.window[(state.write_pos + i) % FFT_SIZE];
            *byte = sample_to_byte(sample);
        }
    }

    /// Copy the window as `f32` samples, oldest first.
    pub fn float_time_domain_data(&self, out: &mut [f32]) {
        let state = self.state.lock();
        let n = out.len().min(FFT_SIZE);
        for (i, sample) in out.iter_mut().take(n).enumerate() {
            *sample = state.window[(state.write_pos + i) % FFT_SIZE];
        }
    }

    /// True when both handles point at the same window.
    pub fn ptr_eq(&self, other: &AnalysisTap) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }
}

impl Default for AnalysisTap {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for AnalysisTap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisTap")
            .field("fft_size", &FFT_SIZE)
            .finish_non_exhaustive()
    }
}

/// Map a sample in [-1, 1] to the byte domain.
#[inline]
pub fn sample_to_byte(sample: f32) -> u8 {
    let scaled = libm::floorf(128.0 * (1.0 + sample));
    if scaled.is_nan() {
        BYTE_MIDPOINT
    } else {
        scaled.clamp(0.0, 255.0) as u8
    }
}
