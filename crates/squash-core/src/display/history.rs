//! Fixed-length loudness history.

/// Ring buffer of loudness ratios, one slot per canvas column.
///
/// The length is fixed at creation. Each push evicts the oldest value, and
/// iteration runs oldest to newest.
#[derive(Debug, Clone)]
pub struct LoudnessHistory {
    slots: Vec<f32>,
    /// Index of the oldest slot.
    head: usize,
}

impl LoudnessHistory {
    /// A history of `len` zero-height slots.
    pub fn new(len: usize) -> Self {
        Self {
            slots: vec![0.0; len],
            head: 0,
        }
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// True for a zero-width history.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Append `ratio`, dropping the oldest value.
    pub fn push(&mut self, ratio: f32) {
        if self.slots.is_empty() {
            return;
        }
        self.slots[self.head] = ratio;
        self.head = (self.head + 1) % self.slots.len();
    }

    /// Values in chronological order.
    pub fn iter(&self) -> impl Iterator<Item = f32> + '_ {
        let (newer, older) = self.slots.split_at(self.head);
        older.iter().chain(newer.iter()).copied()
    }

    /// Chronological copy of the values.
    pub fn to_vec(&self) -> Vec<f32> {
        self.iter().collect()
    }
}
