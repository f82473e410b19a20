//! The settings document.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use squash_core::display::Rgba;
use squash_core::{CompressorParams, SessionOptions};

use crate::ConfigError;
use crate::paths::settings_path;

/// Everything in `settings.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Compressor and gain values a render or session starts from.
    pub compressor: CompressorParams,
    /// Monitor display.
    pub display: DisplaySettings,
    /// Offline render options.
    pub render: RenderSettings,
}

/// `[display]` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    /// Bar color of the input meter, `#rrggbb` or `#rrggbbaa`.
    pub input_color: String,
    /// Bar color of the output meter.
    pub output_color: String,
    /// Meter width in terminal columns, one history slot each.
    pub width: u32,
    /// Meter height in terminal rows.
    pub height: u32,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            input_color: "#4a90d9".to_string(),
            output_color: "#e94560".to_string(),
            width: 64,
            height: 8,
        }
    }
}

impl DisplaySettings {
    /// Parsed input color.
    pub fn input_rgba(&self) -> Result<Rgba, ConfigError> {
        parse_color("display.input_color", &self.input_color)
    }

    /// Parsed output color.
    pub fn output_rgba(&self) -> Result<Rgba, ConfigError> {
        parse_color("display.output_color", &self.output_color)
    }
}

/// `[render]` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Frames between progress updates.
    pub block_size: usize,
    /// Where rendered files go. Unset means the current directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            block_size: 4096,
            output_dir: None,
        }
    }
}

fn parse_color(key: &'static str, value: &str) -> Result<Rgba, ConfigError> {
    value
        .parse()
        .map_err(|source| ConfigError::InvalidColor { key, source })
}

impl Settings {
    /// Load and validate settings from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml(&content)
    }

    /// Like [`load`](Self::load), but a missing file yields the defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        match Self::load(path) {
            Err(e) if e.is_missing_file() => Ok(Self::default()),
            other => other,
        }
    }

    /// Settings from the user's settings file, or defaults when there is none.
    pub fn load_user() -> Result<Self, ConfigError> {
        Self::load_or_default(settings_path())
    }

    /// Parse and validate settings from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let settings: Settings = toml::from_str(toml_str)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Save the settings to a TOML file, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }

        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }

    /// Convert the settings to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check the values the compressor does not clamp itself.
    ///
    /// Compressor ranges are left alone; the stage clamps them.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.display.input_rgba()?;
        self.display.output_rgba()?;
        for (key, value) in [
            ("display.width", self.display.width),
            ("display.height", self.display.height),
        ] {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    key,
                    reason: "must be at least 1".to_string(),
                });
            }
        }
        if self.render.block_size == 0 {
            return Err(ConfigError::InvalidValue {
                key: "render.block_size",
                reason: "must be at least 1".to_string(),
            });
        }
        for (key, gain) in [
            ("compressor.input_gain", self.compressor.input_gain),
            ("compressor.output_gain", self.compressor.output_gain),
        ] {
            if !(gain >= 0.0 && gain.is_finite()) {
                return Err(ConfigError::InvalidValue {
                    key,
                    reason: format!("{gain} is not a finite gain >= 0"),
                });
            }
        }
        Ok(())
    }

    /// Options for a realtime session started from these settings.
    pub fn session_options(&self) -> Result<SessionOptions, ConfigError> {
        Ok(SessionOptions {
            params: self.compressor,
            input_color: self.display.input_rgba()?,
            output_color: self.display.output_rgba()?,
            ..SessionOptions::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_default() {
        assert_eq!(Settings::from_toml("").unwrap(), Settings::default());
    }

    #[test]
    fn fields_default_independently() {
        let s = Settings::from_toml(
            r##"
            [compressor]
            knee = 6.0
            output_gain = 0.0

            [render]
            output_dir = "renders"
            "##,
        )
        .unwrap();
        assert_eq!(s.compressor.knee, 6.0);
        assert_eq!(s.compressor.output_gain, 0.0);
        assert_eq!(s.compressor.threshold, -24.0);
        assert_eq!(s.render.block_size, 4096);
        assert_eq!(s.render.output_dir, Some(PathBuf::from("renders")));
        assert_eq!(s.display, DisplaySettings::default());
    }

    #[test]
    fn bad_color_names_key() {
        let err = Settings::from_toml("[display]\ninput_color = \"blue\"").unwrap_err();
        assert!(
            matches!(err, ConfigError::InvalidColor { key, .. } if key == "display.input_color")
        );
    }

    #[test]
    fn zero_block_size_rejected() {
        let err = Settings::from_toml("[render]\nblock_size = 0").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "render.block_size", .. }));
    }

    #[test]
    fn negative_gain_rejected() {
        let err = Settings::from_toml("[compressor]\ninput_gain = -1.0").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "compressor.input_gain", .. }));
    }

    #[test]
    fn out_of_range_compressor_values_pass() {
        let s = Settings::from_toml("[compressor]\nthreshold = -500.0\nratio = 100.0").unwrap();
        assert_eq!(s.compressor.threshold, -500.0);
    }

    #[test]
    fn wrong_type_is_parse_error() {
        let err = Settings::from_toml("[compressor]\nratio = \"high\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn session_options_carry_colors_and_params() {
        let mut s = Settings::default();
        s.display.output_color = "#00ff00".to_string();
        s.compressor.ratio = 4.0;
        let opts = s.session_options().unwrap();
        assert_eq!(opts.output_color, Rgba::rgb(0, 255, 0));
        assert_eq!(opts.input_color, Rgba::rgb(0x4a, 0x90, 0xd9));
        assert_eq!(opts.params.ratio, 4.0);
        assert!(opts.compression);
    }
}
