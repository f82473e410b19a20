//! Whole-file stereo audio.

/// Two equal-length channels of `f32` samples.
///
/// A buffer source plays one of these, and an offline render returns one.
///
/// ```rust
/// use squash_core::graph::StereoSamples;
///
/// let s = StereoSamples::from_mono(vec![0.5; 1024]);
/// assert_eq!(s.len(), 1024);
/// assert_eq!(s.left, s.right);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StereoSamples {
    /// Channel 0.
    pub left: Vec<f32>,
    /// Channel 1.
    pub right: Vec<f32>,
}

impl StereoSamples {
    /// Pair two channels. A longer channel is cut to the shorter one's length.
    pub fn new(mut left: Vec<f32>, mut right: Vec<f32>) -> Self {
        let frames = left.len().min(right.len());
        left.truncate(frames);
        right.truncate(frames);
        Self { left, right }
    }

    /// `frames` frames of silence.
    pub fn silence(frames: usize) -> Self {
        Self::from_mono(vec![0.0; frames])
    }

    /// The same channel on both sides.
    pub fn from_mono(mono: Vec<f32>) -> Self {
        Self {
            left: mono.clone(),
            right: mono,
        }
    }

    /// Frames per channel.
    pub fn len(&self) -> usize {
        self.left.len()
    }

    /// True when there are no frames.
    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }
}
