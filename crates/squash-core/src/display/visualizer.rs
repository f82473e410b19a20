//! Scrolling loudness bar chart.
//!
//! A [`LoudnessVisualizer`] samples one [`AnalysisTap`] at most every
//! [`THROTTLE_MS`] milliseconds and draws the recent history as 1-pixel-wide
//! bottom-aligned bars, newest on the right.
//!
//! # State machine
//!
//! ```text
//! Stopped ──play──▶ Running ──pause──▶ Paused
//!    ▲                 ▲ ◀────play──────┘ │
//!    └──────stop───────┴──────stop────────┘
//! ```
//!
//! The visualizer never owns a timer. The host calls [`tick`](LoudnessVisualizer::tick)
//! once per display frame; a `Tick::Continue` result means "call me again
//! next frame".

use crate::graph::AnalysisTap;

use super::canvas::{CanvasTarget, Surface};
use super::color::Rgba;
use super::history::LoudnessHistory;
use super::scheduler::DeferredClear;

/// Minimum spacing between two samples.
pub const THROTTLE_MS: f64 = 10.0;

/// Playback state of a visualizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayState {
    /// Not sampling. Initial state.
    Stopped,
    /// Sampling on every tick, subject to the throttle.
    Running,
    /// Not sampling, history preserved.
    Paused,
}

/// Result of a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Still running, tick again next frame.
    Continue,
    /// Not running, no further ticks needed.
    Idle,
}

/// `(max - min) / 256` over byte-domain samples, 0 for empty input.
///
/// Always in `[0, 1)`.
///
/// ```rust
/// use squash_core::display::loudness_ratio;
///
/// assert_eq!(loudness_ratio(&[128; 16]), 0.0);
/// assert_eq!(loudness_ratio(&[0, 128, 255]), 255.0 / 256.0);
/// ```
pub fn loudness_ratio(bytes: &[u8]) -> f32 {
    let Some(&first) = bytes.first() else {
        return 0.0;
    };
    let (min, max) = bytes
        .iter()
        .fold((first, first), |(lo, hi), &b| (lo.min(b), hi.max(b)));
    f32::from(max - min) / 256.0
}

/// Samples a tap on each tick and renders a scrolling bar chart.
pub struct LoudnessVisualizer {
    tap: AnalysisTap,
    canvas: CanvasTarget,
    color: Rgba,
    state: PlayState,
    last_sample_ms: f64,
    /// Sized from the canvas width at the first sample.
    history: Option<LoudnessHistory>,
    scratch: Vec<u8>,
}

impl LoudnessVisualizer {
    /// Bind a stopped visualizer to a tap, a canvas and a bar color.
    pub fn new(tap: AnalysisTap, canvas: CanvasTarget, color: Rgba) -> Self {
        let scratch = vec![0; tap.frequency_bin_count()];
        Self {
            tap,
            canvas,
            color,
            state: PlayState::Stopped,
            last_sample_ms: f64::NEG_INFINITY,
            history: None,
            scratch,
        }
    }

    /// Start or resume. A no-op while running, otherwise ticks once at `now_ms`.
    pub fn play(&mut self, now_ms: f64) {
        if self.state == PlayState::Running {
            return;
        }
        self.state = PlayState::Running;
        self.tick(now_ms);
    }

    /// Halt sampling and keep the history.
    pub fn pause(&mut self) {
        self.state = PlayState::Paused;
    }

    /// Halt sampling and hand back a clear for the next frame.
    ///
    /// Returns `None` when there is no canvas or no drawing context to clear.
    /// The history is left as is.
    pub fn stop(&mut self) -> Option<DeferredClear> {
        self.state = PlayState::Stopped;
        let drawable = self
            .canvas
            .with_surface(|surface| surface.context().is_some())
            .unwrap_or(false);
        drawable.then(|| DeferredClear::new(self.canvas.clone()))
    }

    /// Advance to frame time `t_ms`.
    pub fn tick(&mut self, t_ms: f64) -> Tick {
        if self.state != PlayState::Running {
            return Tick::Idle;
        }
        if t_ms - self.last_sample_ms < THROTTLE_MS {
            return Tick::Continue;
        }
        self.last_sample_ms = t_ms;

        let Some(width) = self.canvas.width() else {
            return Tick::Continue;
        };
        let ratio = self.sample();
        let history = self
            .history
            .get_or_insert_with(|| LoudnessHistory::new(width as usize));
        history.push(ratio);

        let color = self.color;
        let history = &*history;
        self.canvas
            .with_surface(|surface| draw_bars(surface, history, color));
        Tick::Continue
    }

    /// Current loudness ratio of the bound tap.
    pub fn sample(&mut self) -> f32 {
        self.tap.byte_time_domain_data(&mut self.scratch);
        loudness_ratio(&self.scratch)
    }

    /// Playback state.
    pub fn state(&self) -> PlayState {
        self.state
    }

    /// Time of the last sample, `-inf` before the first.
    pub fn last_sample_ms(&self) -> f64 {
        self.last_sample_ms
    }

    /// The history, once the first sample allocated it.
    pub fn history(&self) -> Option<&LoudnessHistory> {
        self.history.as_ref()
    }

    /// The bound tap.
    pub fn tap(&self) -> &AnalysisTap {
        &self.tap
    }

    /// The bound canvas.
    pub fn canvas(&self) -> &CanvasTarget {
        &self.canvas
    }

    /// Bar color.
    pub fn color(&self) -> Rgba {
        self.color
    }
}

impl std::fmt::Debug for LoudnessVisualizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoudnessVisualizer")
            .field("state", &self.state)
            .field("color", &self.color)
            .field("last_sample_ms", &self.last_sample_ms)
            .field("history_len", &self.history.as_ref().map(LoudnessHistory::len))
            .finish_non_exhaustive()
    }
}

fn draw_bars(surface: &mut dyn Surface, history: &LoudnessHistory, color: Rgba) {
    let (width, height) = (surface.width() as f32, surface.height() as f32);
    let Some(ctx) = surface.context() else {
        return;
    };
    ctx.clear_rect(0.0, 0.0, width, height);
    for (i, ratio) in history.iter().enumerate() {
        let bar = height * ratio;
        ctx.fill_rect(i as f32, height - bar, 1.0, bar, color);
    }
}
