//! Dynamics compressor with soft-knee characteristics.
//!
//! A feed-forward compressor that reduces dynamic range by attenuating
//! signals above a threshold.
//!
//! # Signal Flow
//!
//! ```text
//! Input → Envelope Follower → Gain Computer → Gain Reduction → Output
//! ```
//!
//! # Parameters
//!
//! | Parameter | Range | Default | Description |
//! |-----------|-------|---------|-------------|
//! | Threshold | -100 to 0 dB | -24 | Level where compression begins |
//! | Knee | 0 to 40 dB | 30 | Width of the soft transition around threshold |
//! | Ratio | 1:1 to 20:1 | 12 | Compression strength |
//! | Attack | 0 to 1 s | 0.003 | How fast gain reduction engages |
//! | Release | 0 to 1 s | 0.25 | How fast gain reduction releases |
//!
//! Parameters live in [`CompressorControls`], a set of shared [`ParamCell`]s.
//! The stage reads them once per block, clamps them to the ranges above, and
//! ignores non-finite values (the previous value stays in effect).
//!
//! There is no automatic makeup gain. The output gain stage that follows it
//! in [`CompressionGraph`](crate::CompressionGraph) is the only makeup path.

use crate::{Effect, EnvelopeFollower, ParamCell, db_to_linear, linear_to_db};

/// Threshold range in dB.
pub const THRESHOLD_RANGE: (f32, f32) = (-100.0, 0.0);
/// Knee range in dB.
pub const KNEE_RANGE: (f32, f32) = (0.0, 40.0);
/// Ratio range.
pub const RATIO_RANGE: (f32, f32) = (1.0, 20.0);
/// Attack range in seconds.
pub const ATTACK_RANGE: (f32, f32) = (0.0, 1.0);
/// Release range in seconds.
pub const RELEASE_RANGE: (f32, f32) = (0.0, 1.0);

/// Shared parameter cells for one compressor stage.
///
/// Cloning shares the cells, so a clone handed to the graph sees every
/// later `set` made through the original.
#[derive(Debug, Clone)]
pub struct CompressorControls {
    /// Threshold in dB.
    pub threshold: ParamCell,
    /// Knee width in dB.
    pub knee: ParamCell,
    /// Compression ratio.
    pub ratio: ParamCell,
    /// Attack time in seconds.
    pub attack: ParamCell,
    /// Release time in seconds.
    pub release: ParamCell,
}

impl CompressorControls {
    /// Create controls holding the given raw values.
    pub fn new(threshold: f32, knee: f32, ratio: f32, attack: f32, release: f32) -> Self {
        Self {
            threshold: ParamCell::new(threshold),
            knee: ParamCell::new(knee),
            ratio: ParamCell::new(ratio),
            attack: ParamCell::new(attack),
            release: ParamCell::new(release),
        }
    }
}

impl Default for CompressorControls {
    fn default() -> Self {
        Self::new(-24.0, 30.0, 12.0, 0.003, 0.25)
    }
}

/// Gain computer for calculating compression curve.
#[derive(Debug, Clone)]
struct GainComputer {
    threshold_db: f32,
    ratio: f32,
    knee_db: f32,
}

impl GainComputer {
    #[inline]
    fn compute_gain_db(&self, input_db: f32) -> f32 {
        let overshoot = input_db - self.threshold_db;
        let half_knee = self.knee_db / 2.0;
        let slope = 1.0 - 1.0 / self.ratio;

        if overshoot <= -half_knee {
            0.0
        } else if overshoot > half_knee {
            -(overshoot * slope)
        } else {
            let knee_factor = (overshoot + half_knee) / self.knee_db;
            -(knee_factor * knee_factor * overshoot * slope)
        }
    }
}

/// Linked-stereo dynamics compressor driven by shared parameter cells.
///
/// # Example
///
/// ```rust
/// use squash_core::{CompressorControls, DynamicsCompressor, Effect};
///
/// let controls = CompressorControls::default();
/// let mut comp = DynamicsCompressor::new(44100.0, controls.clone());
/// controls.threshold.set(-40.0);
///
/// let left = [0.5; 64];
/// let right = [0.5; 64];
/// let mut out_l = [0.0; 64];
/// let mut out_r = [0.0; 64];
/// comp.process_block_stereo(&left, &right, &mut out_l, &mut out_r);
/// assert!(out_l[63] < 0.5);
/// ```
#[derive(Debug, Clone)]
pub struct DynamicsCompressor {
    controls: CompressorControls,
    envelope_follower: EnvelopeFollower,
    gain_computer: GainComputer,
    /// Last computed gain reduction in dB (always non-positive).
    last_reduction_db: f32,
}

impl DynamicsCompressor {
    /// Create a compressor reading from `controls`.
    pub fn new(sample_rate: f32, controls: CompressorControls) -> Self {
        let mut comp = Self {
            controls,
            envelope_follower: EnvelopeFollower::new(sample_rate),
            gain_computer: GainComputer {
                threshold_db: -24.0,
                ratio: 12.0,
                knee_db: 30.0,
            },
            last_reduction_db: 0.0,
        };
        comp.sync_params();
        comp
    }

    /// The shared controls this stage reads.
    pub fn controls(&self) -> &CompressorControls {
        &self.controls
    }

    /// Returns the last computed gain reduction in dB (always non-positive).
    ///
    /// A value of 0.0 means no compression is occurring.
    pub fn reduction_db(&self) -> f32 {
        self.last_reduction_db
    }

    /// Effective threshold after clamping.
    pub fn threshold_db(&self) -> f32 {
        self.gain_computer.threshold_db
    }

    /// Effective knee after clamping.
    pub fn knee_db(&self) -> f32 {
        self.gain_computer.knee_db
    }

    /// Effective ratio after clamping.
    pub fn ratio(&self) -> f32 {
        self.gain_computer.ratio
    }

    /// Pull the latest control values into the processing state.
    fn sync_params(&mut self) {
        let gc = &mut self.gain_computer;
        gc.threshold_db = clamp_or_keep(self.controls.threshold.get(), THRESHOLD_RANGE, gc.threshold_db);
        gc.knee_db = clamp_or_keep(self.controls.knee.get(), KNEE_RANGE, gc.knee_db);
        gc.ratio = clamp_or_keep(self.controls.ratio.get(), RATIO_RANGE, gc.ratio);

        let env = &mut self.envelope_follower;
        env.set_attack(clamp_or_keep(self.controls.attack.get(), ATTACK_RANGE, env.attack()));
        env.set_release(clamp_or_keep(self.controls.release.get(), RELEASE_RANGE, env.release()));
    }
}

#[inline]
fn clamp_or_keep(value: f32, (min, max): (f32, f32), previous: f32) -> f32 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        previous
    }
}

impl Effect for DynamicsCompressor {
    #[inline]
    fn process_stereo(&mut self, left: f32, right: f32) -> (f32, f32) {
        // Linked stereo: detect on the mid signal, apply the same gain to both
        let mid = (left + right) * 0.5;
        let envelope = self.envelope_follower.process(mid);
        let reduction_db = self.gain_computer.compute_gain_db(linear_to_db(envelope));
        self.last_reduction_db = reduction_db;

        let gain = db_to_linear(reduction_db);
        (left * gain, right * gain)
    }

    fn begin_block(&mut self) {
        self.sync_params();
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.envelope_follower.set_sample_rate(sample_rate);
    }

    fn reset(&mut self) {
        self.envelope_follower.reset();
        self.last_reduction_db = 0.0;
    }
}
