//! Settings for the squash tools.
//!
//! One TOML file holds the compressor defaults a render or monitor session
//! starts from, the display colors and canvas size of the terminal monitor,
//! and render options. Every key is optional; a missing file means defaults.
//!
//! # Example
//!
//! ```rust
//! use squash_config::Settings;
//!
//! let settings = Settings::from_toml(
//!     r##"
//!     [compressor]
//!     threshold = -30.0
//!
//!     [display]
//!     output_color = "#ff8800"
//!     "##,
//! )
//! .unwrap();
//!
//! assert_eq!(settings.compressor.threshold, -30.0);
//! assert_eq!(settings.compressor.ratio, 12.0);
//! assert_eq!(settings.display.output_rgba().unwrap().to_string(), "#ff8800");
//! ```

mod error;
mod settings;

/// Platform-specific locations of the settings file.
pub mod paths;

pub use error::{ConfigError, IoAction};
pub use paths::{settings_path, user_config_dir};
pub use settings::{DisplaySettings, RenderSettings, Settings};
