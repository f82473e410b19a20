//! Compressor parameter snapshot.

/// Settings for a [`CompressionGraph`](super::CompressionGraph).
///
/// This layer passes values through as given; the compressor stage clamps
/// them to its ranges. With the `serde` feature every field falls back to its
/// default independently when missing from the source document.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CompressorParams {
    /// Threshold in dB, [-100, 0].
    pub threshold: f32,
    /// Knee width in dB, [0, 40].
    pub knee: f32,
    /// Ratio, [1, 20].
    pub ratio: f32,
    /// Attack in seconds, [0, 1].
    pub attack: f32,
    /// Release in seconds, [0, 1].
    pub release: f32,
    /// Linear gain before the input tap.
    pub input_gain: f32,
    /// Linear gain after the compressor.
    pub output_gain: f32,
}

impl Default for CompressorParams {
    fn default() -> Self {
        Self {
            threshold: -24.0,
            knee: 30.0,
            ratio: 12.0,
            attack: 0.003,
            release: 0.25,
            input_gain: 1.0,
            output_gain: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let p = CompressorParams::default();
        assert_eq!(p.threshold, -24.0);
        assert_eq!(p.knee, 30.0);
        assert_eq!(p.ratio, 12.0);
        assert_eq!(p.attack, 0.003);
        assert_eq!(p.release, 0.25);
        assert_eq!(p.input_gain, 1.0);
        assert_eq!(p.output_gain, 1.0);
    }
}
