//! Linear gain stage.

use crate::{Effect, ParamCell};

/// Multiplies both channels by a shared linear gain.
///
/// The factor is read once per block. Negative and non-finite values pass
/// through unvalidated, matching the graph's immediate-parameter model.
#[derive(Debug, Clone)]
pub struct GainStage {
    gain: ParamCell,
    current: f32,
}

impl GainStage {
    /// Create a stage that reads its factor from `gain`.
    pub fn new(gain: ParamCell) -> Self {
        let current = gain.get();
        Self { gain, current }
    }

    /// The shared gain cell.
    pub fn gain(&self) -> &ParamCell {
        &self.gain
    }
}

impl Effect for GainStage {
    #[inline]
    fn process_stereo(&mut self, left: f32, right: f32) -> (f32, f32) {
        (left * self.current, right * self.current)
    }

    fn begin_block(&mut self) {
        self.current = self.gain.get();
    }

    fn set_sample_rate(&mut self, _sample_rate: f32) {}

    fn reset(&mut self) {}
}
