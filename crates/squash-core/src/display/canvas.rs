//! Drawing surfaces the loudness display renders into.
//!
//! A [`CanvasTarget`] is a shared slot that may or may not hold a [`Surface`]
//! at any moment (a window that is not mapped yet, a terminal that was
//! detached). Every drawing path treats an empty slot, or a surface without a
//! drawing context, as a silent no-op.

use std::any::Any;
use std::sync::Arc;

use parking_lot::Mutex;

use super::color::Rgba;

/// 2D drawing operations used by the display.
pub trait DrawContext {
    /// Reset a rectangle to transparent.
    fn clear_rect(&mut self, x: f32, y: f32, width: f32, height: f32);

    /// Fill a rectangle with `color`.
    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Rgba);
}

/// A drawable surface with a pixel size.
pub trait Surface: Send {
    /// Width in pixels.
    fn width(&self) -> u32;

    /// Height in pixels.
    fn height(&self) -> u32;

    /// The drawing context, if one can be obtained.
    fn context(&mut self) -> Option<&mut dyn DrawContext>;

    /// Downcast support for concrete surface inspection.
    fn as_any(&self) -> &dyn Any;
}

/// Shared, optionally empty slot for a [`Surface`].
///
/// Clones share the slot.
#[derive(Clone, Default)]
pub struct CanvasTarget {
    slot: Arc<Mutex<Option<Box<dyn Surface>>>>,
}

impl CanvasTarget {
    /// An empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// A slot already holding `surface`.
    pub fn with(surface: impl Surface + 'static) -> Self {
        let target = Self::new();
        target.mount(surface);
        target
    }

    /// Put `surface` in the slot, replacing any previous one.
    pub fn mount(&self, surface: impl Surface + 'static) {
        *self.slot.lock() = Some(Box::new(surface));
    }

    /// Empty the slot, returning what it held.
    pub fn unmount(&self) -> Option<Box<dyn Surface>> {
        self.slot.lock().take()
    }

    /// True when a surface is present.
    pub fn is_mounted(&self) -> bool {
        self.slot.lock().is_some()
    }

    /// Current surface width, if mounted.
    pub fn width(&self) -> Option<u32> {
        self.slot.lock().as_ref().map(|s| s.width())
    }

    /// Run `f` against the mounted surface.
    pub fn with_surface<R>(&self, f: impl FnOnce(&mut dyn Surface) -> R) -> Option<R> {
        let mut slot = self.slot.lock();
        slot.as_mut().map(|surface| f(surface.as_mut()))
    }

    /// Run `f` against the mounted surface if it is a [`PixelSurface`].
    pub fn with_pixels<R>(&self, f: impl FnOnce(&PixelSurface) -> R) -> Option<R> {
        let slot = self.slot.lock();
        let pixels = slot.as_ref()?.as_any().downcast_ref::<PixelSurface>()?;
        Some(f(pixels))
    }

    /// True when both handles share the same slot.
    pub fn ptr_eq(&self, other: &CanvasTarget) -> bool {
        Arc::ptr_eq(&self.slot, &other.slot)
    }
}

impl std::fmt::Debug for CanvasTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CanvasTarget")
            .field("mounted", &self.is_mounted())
            .finish()
    }
}

/// In-memory RGBA surface.
///
/// Rectangles are rasterized by rounding their edges to the nearest pixel
/// boundary and clipping to the surface.
#[derive(Debug, Clone)]
pub struct PixelSurface {
    width: u32,
    height: u32,
    pixels: Vec<Rgba>,
    has_context: bool,
}

impl PixelSurface {
    /// A transparent surface with a drawing context.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Rgba::TRANSPARENT; width as usize * height as usize],
            has_context: true,
        }
    }

    /// A surface that refuses to hand out a drawing context.
    pub fn without_context(width: u32, height: u32) -> Self {
        Self {
            has_context: false,
            ..Self::new(width, height)
        }
    }

    /// Color at `(x, y)`, transparent when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Rgba {
        if x >= self.width || y >= self.height {
            return Rgba::TRANSPARENT;
        }
        self.pixels[(y * self.width + x) as usize]
    }

    /// Number of painted pixels in column `x`.
    pub fn column_height(&self, x: u32) -> u32 {
        (0..self.height)
            .filter(|&y| !self.pixel(x, y).is_transparent())
            .count() as u32
    }

    /// True when no pixel is painted.
    pub fn is_blank(&self) -> bool {
        self.pixels.iter().all(|p| p.is_transparent())
    }

    fn span(start: f32, len: f32, limit: u32) -> Option<(u32, u32)> {
        if !(start.is_finite() && len.is_finite()) || len <= 0.0 {
            return None;
        }
        let lo = libm::roundf(start).clamp(0.0, limit as f32) as u32;
        let hi = libm::roundf(start + len).clamp(0.0, limit as f32) as u32;
        (lo < hi).then_some((lo, hi))
    }

    fn paint(&mut self, x: f32, y: f32, width: f32, height: f32, color: Rgba) {
        let Some((x0, x1)) = Self::span(x, width, self.width) else {
            return;
        };
        let Some((y0, y1)) = Self::span(y, height, self.height) else {
            return;
        };
        for row in y0..y1 {
            let base = (row * self.width) as usize;
            self.pixels[base + x0 as usize..base + x1 as usize].fill(color);
        }
    }
}

impl DrawContext for PixelSurface {
    fn clear_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.paint(x, y, width, height, Rgba::TRANSPARENT);
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Rgba) {
        self.paint(x, y, width, height, color);
    }
}

impl Surface for PixelSurface {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn context(&mut self) -> Option<&mut dyn DrawContext> {
        if self.has_context {
            Some(self as &mut dyn DrawContext)
        } else {
            None
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgba = Rgba::rgb(255, 0, 0);

    #[test]
    fn fill_and_clear() {
        let mut s = PixelSurface::new(4, 4);
        s.fill_rect(1.0, 2.0, 1.0, 2.0, RED);
        assert_eq!(s.pixel(1, 2), RED);
        assert_eq!(s.pixel(1, 3), RED);
        assert_eq!(s.column_height(1), 2);
        assert_eq!(s.column_height(0), 0);

        s.clear_rect(0.0, 0.0, 4.0, 4.0);
        assert!(s.is_blank());
    }

    #[test]
    fn clips_and_ignores_degenerate_rects() {
        let mut s = PixelSurface::new(2, 2);
        s.fill_rect(-5.0, -5.0, 100.0, 100.0, RED);
        assert_eq!(s.column_height(0), 2);
        s.clear_rect(0.0, 0.0, 2.0, 2.0);

        s.fill_rect(0.0, 0.0, 1.0, 0.0, RED);
        s.fill_rect(0.0, 0.0, 1.0, f32::NAN, RED);
        s.fill_rect(0.0, 0.0, 1.0, -1.0, RED);
        assert!(s.is_blank());
    }

    #[test]
    fn target_slot_is_optional() {
        let target = CanvasTarget::new();
        assert!(!target.is_mounted());
        assert_eq!(target.with_surface(|s| s.width()), None);

        target.mount(PixelSurface::new(8, 2));
        assert_eq!(target.width(), Some(8));
        assert_eq!(target.with_pixels(PixelSurface::is_blank), Some(true));

        let clone = target.clone();
        assert!(clone.ptr_eq(&target));
        assert!(target.unmount().is_some());
        assert!(!clone.is_mounted());
    }

    #[test]
    fn context_can_be_missing() {
        let mut s = PixelSurface::without_context(2, 2);
        assert!(s.context().is_none());
    }
}
