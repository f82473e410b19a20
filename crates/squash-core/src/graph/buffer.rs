//! Scratch storage for one render quantum.

/// Left and right sample slots for one render quantum.
///
/// Every node owns one for its output, and the graph owns one more to sum a
/// node's inputs into.
#[derive(Debug, Clone)]
pub struct QuantumBuffer {
    /// Left channel.
    pub left: Box<[f32]>,
    /// Right channel.
    pub right: Box<[f32]>,
}

impl QuantumBuffer {
    /// A silent buffer of `frames` frames.
    pub fn new(frames: usize) -> Self {
        Self {
            left: vec![0.0; frames].into_boxed_slice(),
            right: vec![0.0; frames].into_boxed_slice(),
        }
    }

    /// Zero both channels.
    pub fn silence(&mut self) {
        self.left.fill(0.0);
        self.right.fill(0.0);
    }

    /// Capacity in frames.
    pub fn frames(&self) -> usize {
        self.left.len()
    }

    /// The first `frames` frames of each channel.
    pub fn split(&self, frames: usize) -> (&[f32], &[f32]) {
        (&self.left[..frames], &self.right[..frames])
    }

    /// Mutable view of the first `frames` frames of each channel.
    pub fn split_mut(&mut self, frames: usize) -> (&mut [f32], &mut [f32]) {
        (&mut self.left[..frames], &mut self.right[..frames])
    }

    /// Overwrite with `other`, which must have the same capacity.
    pub fn assign(&mut self, other: &QuantumBuffer) {
        self.left.copy_from_slice(&other.left);
        self.right.copy_from_slice(&other.right);
    }

    /// Add `other` into this buffer frame by frame.
    pub fn mix_in(&mut self, other: &QuantumBuffer) {
        let pairs = self
            .left
            .iter_mut()
            .zip(other.left.iter())
            .chain(self.right.iter_mut().zip(other.right.iter()));
        for (dst, src) in pairs {
            *dst += src;
        }
    }
}
