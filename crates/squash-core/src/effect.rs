//! Core stereo stage trait.
//!
//! Every processing node in an [`AudioGraph`](crate::AudioGraph) that transforms
//! audio (gain, compression) implements [`Effect`]. The graph hands each stage
//! the summed input of its predecessors and a destination buffer for one render
//! quantum.
//!
//! ## Design Decisions
//!
//! - **Stereo only**: the graph carries exactly two channels end to end.
//!
//! - **Per-block parameters**: [`Effect::begin_block`] is where a stage pulls
//!   shared parameter values, so a change lands on a quantum boundary.
//!
//! - **No allocations**: all methods are called once per render quantum and
//!   must not allocate.

/// Core trait for stereo processing stages.
///
/// # Example
///
/// ```rust
/// use squash_core::Effect;
///
/// struct Invert;
///
/// impl Effect for Invert {
///     fn process_stereo(&mut self, left: f32, right: f32) -> (f32, f32) {
///         (-left, -right)
///     }
///
///     fn set_sample_rate(&mut self, _sample_rate: f32) {}
///
///     fn reset(&mut self) {}
/// }
/// ```
pub trait Effect {
    /// Process one stereo frame.
    fn process_stereo(&mut self, left: f32, right: f32) -> (f32, f32);

    /// Process a block of stereo frames.
    ///
    /// Default implementation calls [`begin_block`](Self::begin_block) once
    /// and then [`process_stereo`](Self::process_stereo) for each frame.
    /// All four slices must have the same length.
    fn process_block_stereo(
        &mut self,
        left_in: &[f32],
        right_in: &[f32],
        left_out: &mut [f32],
        right_out: &mut [f32],
    ) {
        debug_assert_eq!(left_in.len(), right_in.len());
        debug_assert_eq!(left_in.len(), left_out.len());
        debug_assert_eq!(left_out.len(), right_out.len());

        self.begin_block();
        for i in 0..left_in.len() {
            let (l, r) = self.process_stereo(left_in[i], right_in[i]);
            left_out[i] = l;
            right_out[i] = r;
        }
    }

    /// Called once before each block. Stages with shared parameter cells
    /// pull the latest values here.
    fn begin_block(&mut self) {}

    /// Update the sample rate.
    fn set_sample_rate(&mut self, sample_rate: f32);

    /// Clear internal state (envelopes, history) without touching parameters.
    fn reset(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Scale(f32);

    impl Effect for Scale {
        fn process_stereo(&mut self, left: f32, right: f32) -> (f32, f32) {
            (left * self.0, right * self.0)
        }
        fn set_sample_rate(&mut self, _: f32) {}
        fn reset(&mut self) {}
    }

    #[test]
    fn default_block_matches_per_frame() {
        let mut stage = Scale(0.5);
        let left = [1.0, 2.0, 3.0];
        let right = [-1.0, -2.0, -3.0];
        let mut out_l = [0.0; 3];
        let mut out_r = [0.0; 3];
        stage.process_block_stereo(&left, &right, &mut out_l, &mut out_r);
        assert_eq!(out_l, [0.5, 1.0, 1.5]);
        assert_eq!(out_r, [-0.5, -1.0, -1.5]);
    }
}
