//! Shared CLI helpers used across multiple commands.

use std::path::Path;

use clap::Args;
use squash_config::Settings;
use squash_core::CompressorParams;

/// Decoder used for input files.
#[cfg(feature = "symphonia")]
pub type FileDecoder = squash_io::SymphoniaDecoder;
/// Decoder used for input files.
#[cfg(not(feature = "symphonia"))]
pub type FileDecoder = squash_io::WavDecoder;

/// Compressor flags that override the settings file.
#[derive(Args, Debug, Default, Clone)]
pub struct CompressorArgs {
    /// Threshold in dB (-100 to 0)
    #[arg(long, allow_negative_numbers = true)]
    pub threshold: Option<f32>,

    /// Knee width in dB (0 to 40)
    #[arg(long)]
    pub knee: Option<f32>,

    /// Compression ratio (1 to 20)
    #[arg(long)]
    pub ratio: Option<f32>,

    /// Attack time in seconds (0 to 1)
    #[arg(long)]
    pub attack: Option<f32>,

    /// Release time in seconds (0 to 1)
    #[arg(long)]
    pub release: Option<f32>,

    /// Linear gain before the compressor
    #[arg(long)]
    pub input_gain: Option<f32>,

    /// Linear gain after the compressor
    #[arg(long)]
    pub output_gain: Option<f32>,
}

impl CompressorArgs {
    /// `base` with every given flag applied.
    pub fn apply(&self, base: CompressorParams) -> CompressorParams {
        CompressorParams {
            threshold: self.threshold.unwrap_or(base.threshold),
            knee: self.knee.unwrap_or(base.knee),
            ratio: self.ratio.unwrap_or(base.ratio),
            attack: self.attack.unwrap_or(base.attack),
            release: self.release.unwrap_or(base.release),
            input_gain: self.input_gain.unwrap_or(base.input_gain),
            output_gain: self.output_gain.unwrap_or(base.output_gain),
        }
    }
}

/// Settings from `--config` when given (the file must exist), otherwise the
/// user settings or defaults.
pub fn load_settings(config: Option<&Path>) -> anyhow::Result<Settings> {
    let settings = match config {
        Some(path) => Settings::load(path)?,
        None => Settings::load_user()?,
    };
    Ok(settings)
}

/// Format seconds as `h:mm:ss`. Fractions are truncated; negative and
/// non-finite input formats as zero.
pub fn format_duration(secs: f64) -> String {
    let total = if secs.is_finite() && secs > 0.0 {
        secs as u64
    } else {
        0
    };
    let (hours, minutes, seconds) = (total / 3600, (total / 60) % 60, total % 60);
    format!("{hours}:{minutes:02}:{seconds:02}")
}

/// Format a dB value for status lines.
pub fn format_db(db: f32) -> String {
    if db.is_finite() {
        format!("{db:.1} dB")
    } else {
        "-inf dB".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn durations() {
        assert_eq!(format_duration(0.0), "0:00:00");
        assert_eq!(format_duration(59.9), "0:00:59");
        assert_eq!(format_duration(61.0), "0:01:01");
        assert_eq!(format_duration(3725.0), "1:02:05");
        assert_eq!(format_duration(36_000.0), "10:00:00");
        assert_eq!(format_duration(-5.0), "0:00:00");
        assert_eq!(format_duration(f64::NAN), "0:00:00");
    }

    #[test]
    fn flags_override_only_what_is_given() {
        let args = CompressorArgs {
            ratio: Some(4.0),
            output_gain: Some(0.5),
            ..CompressorArgs::default()
        };
        let p = args.apply(CompressorParams::default());
        assert_eq!(p.ratio, 4.0);
        assert_eq!(p.output_gain, 0.5);
        assert_eq!(p.threshold, -24.0);
        assert_eq!(p.knee, 30.0);
    }

    #[test]
    fn db_formatting() {
        assert_eq!(format_db(-3.04), "-3.0 dB");
        assert_eq!(format_db(f32::NEG_INFINITY), "-inf dB");
    }
}
