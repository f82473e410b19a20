//! Loudness display: visualizer, drawing surfaces and the frame scheduler.
//!
//! ```rust
//! use squash_core::display::{
//!     CanvasTarget, FrameScheduler, LoudnessVisualizer, ManualClock, PixelSurface, Rgba, Tick,
//! };
//! use squash_core::graph::AnalysisTap;
//!
//! let clock = ManualClock::new(0.0);
//! let mut scheduler = FrameScheduler::new(clock.clone());
//! let canvas = CanvasTarget::with(PixelSurface::new(64, 16));
//! let mut vis = LoudnessVisualizer::new(AnalysisTap::new(), canvas, Rgba::rgb(0, 200, 80));
//!
//! vis.play(scheduler.now_ms());
//! clock.advance(16.0);
//! let t = scheduler.begin_frame();
//! assert_eq!(vis.tick(t), Tick::Continue);
//!
//! if let Some(clear) = vis.stop() {
//!     scheduler.defer(clear);
//! }
//! ```

pub mod canvas;
pub mod color;
pub mod history;
pub mod scheduler;
pub mod visualizer;

pub use canvas::{CanvasTarget, DrawContext, PixelSurface, Surface};
pub use color::{ParseColorError, Rgba};
pub use history::LoudnessHistory;
pub use scheduler::{DeferredClear, FrameClock, FrameScheduler, ManualClock, SystemClock};
pub use visualizer::{LoudnessVisualizer, PlayState, THROTTLE_MS, Tick, loudness_ratio};
