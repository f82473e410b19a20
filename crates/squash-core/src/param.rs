//! Shared parameter cells for immediate, lock-free parameter changes.
//!
//! A [`ParamCell`] stores an `f32` in an atomic so the control side can write
//! a new value while the render side reads it at the start of every render
//! quantum. Clones share the same storage: the graph stage keeps one clone, the
//! owning topology keeps another for its setters.
//!
//! Changes are immediate. There is no ramp or smoothing; the next quantum sees
//! the new value.
//!
//! ```rust
//! use squash_core::ParamCell;
//!
//! let gain = ParamCell::new(1.0);
//! let stage_view = gain.clone();
//! gain.set(0.5);
//! assert_eq!(stage_view.get(), 0.5);
//! ```

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

/// An atomic `f32` shared between a parameter owner and a graph stage.
#[derive(Clone)]
pub struct ParamCell {
    bits: Arc<AtomicU32>,
}

impl ParamCell {
    /// Create a cell holding `value`.
    pub fn new(value: f32) -> Self {
        Self {
            bits: Arc::new(AtomicU32::new(value.to_bits())),
        }
    }

    /// Read the current value.
    #[inline]
    pub fn get(&self) -> f32 {
        f32::from_bits(self.bits.load(Ordering::Relaxed))
    }

    /// Store a new value. Takes effect on the next render quantum.
    #[inline]
    pub fn set(&self, value: f32) {
        self.bits.store(value.to_bits(), Ordering::Relaxed);
    }
}

impl fmt::Debug for ParamCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ParamCell").field(&self.get()).finish()
    }
}

impl Default for ParamCell {
    fn default() -> Self {
        Self::new(0.0)
    }
}
