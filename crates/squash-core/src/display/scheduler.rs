//! Frame clock and deferred one-shot tasks.
//!
//! The display loop is driven externally: the host calls
//! [`FrameScheduler::begin_frame`] once per display frame, then ticks each
//! visualizer with the returned timestamp. Work that must happen "on the next
//! frame" (the canvas clear after a stop) is queued with
//! [`defer`](FrameScheduler::defer) and runs at the start of the following
//! frame.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use super::canvas::CanvasTarget;

/// Source of frame timestamps in milliseconds.
pub trait FrameClock: Send {
    /// Current time in milliseconds since an arbitrary origin.
    fn now_ms(&self) -> f64;
}

/// Wall clock measured from construction.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Start counting from now.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock for SystemClock {
    fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

/// Hand-driven clock. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    bits: Arc<AtomicU64>,
}

impl ManualClock {
    /// A clock reading `start_ms`.
    pub fn new(start_ms: f64) -> Self {
        Self {
            bits: Arc::new(AtomicU64::new(start_ms.to_bits())),
        }
    }

    /// Jump to `ms`.
    pub fn set(&self, ms: f64) {
        self.bits.store(ms.to_bits(), Ordering::Relaxed);
    }

    /// Move forward by `ms`.
    pub fn advance(&self, ms: f64) {
        self.set(self.now_ms() + ms);
    }
}

impl FrameClock for ManualClock {
    fn now_ms(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Relaxed))
    }
}

/// One-shot clear of a whole canvas.
///
/// The slot is read when the task runs, not when it is created, so a surface
/// unmounted in between is skipped.
#[derive(Debug, Clone)]
pub struct DeferredClear {
    target: CanvasTarget,
}

impl DeferredClear {
    /// A clear of whatever `target` holds at run time.
    pub fn new(target: CanvasTarget) -> Self {
        Self { target }
    }

    /// The canvas this task clears.
    pub fn target(&self) -> &CanvasTarget {
        &self.target
    }

    /// Clear the surface if it and its context are still present.
    pub fn run(self) {
        self.target.with_surface(|surface| {
            let (w, h) = (surface.width() as f32, surface.height() as f32);
            if let Some(ctx) = surface.context() {
                ctx.clear_rect(0.0, 0.0, w, h);
            }
        });
    }
}

/// Per-frame driver owning the clock and the deferred task queue.
pub struct FrameScheduler {
    clock: Box<dyn FrameClock>,
    pending: Vec<DeferredClear>,
    frames: u64,
}

impl FrameScheduler {
    /// A scheduler reading time from `clock`.
    pub fn new(clock: impl FrameClock + 'static) -> Self {
        Self {
            clock: Box::new(clock),
            pending: Vec::new(),
            frames: 0,
        }
    }

    /// Current clock time.
    pub fn now_ms(&self) -> f64 {
        self.clock.now_ms()
    }

    /// Queue `task` for the start of the next frame.
    pub fn defer(&mut self, task: DeferredClear) {
        self.pending.push(task);
    }

    /// Number of queued tasks.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Frames begun so far.
    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    /// Sample the clock, run every queued task and return the frame time.
    pub fn begin_frame(&mut self) -> f64 {
        let t = self.clock.now_ms();
        for task in self.pending.drain(..) {
            task.run();
        }
        self.frames += 1;
        t
    }
}

impl std::fmt::Debug for FrameScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameScheduler")
            .field("now_ms", &self.now_ms())
            .field("pending", &self.pending.len())
            .field("frames", &self.frames)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::{DrawContext, PixelSurface, Rgba};

    #[test]
    fn manual_clock_is_shared() {
        let clock = ManualClock::new(5.0);
        let scheduler = FrameScheduler::new(clock.clone());
        clock.advance(10.0);
        assert_eq!(scheduler.now_ms(), 15.0);
    }

    #[test]
    fn deferred_clear_runs_next_frame() {
        let mut surface = PixelSurface::new(4, 4);
        surface.fill_rect(0.0, 0.0, 4.0, 4.0, Rgba::rgb(1, 2, 3));
        let target = CanvasTarget::with(surface);

        let mut scheduler = FrameScheduler::new(ManualClock::new(0.0));
        scheduler.defer(DeferredClear::new(target.clone()));
        assert_eq!(scheduler.pending_count(), 1);
        assert_eq!(target.with_pixels(PixelSurface::is_blank), Some(false));

        scheduler.begin_frame();
        assert_eq!(scheduler.pending_count(), 0);
        assert_eq!(target.with_pixels(PixelSurface::is_blank), Some(true));
    }

    #[test]
    fn deferred_clear_skips_unmounted_canvas() {
        let target = CanvasTarget::with(PixelSurface::new(2, 2));
        let task = DeferredClear::new(target.clone());
        target.unmount();
        task.run();
        assert!(!target.is_mounted());
    }
}
