//! Crop rectangle collaborators

use painting::{PixelRect, PixelSurface};

/// Chooses the part of an imported image that becomes the layer.
///
/// Returning `None` cancels the import and leaves the document untouched.
pub trait CropProvider {
    fn choose(&mut self, surface: &PixelSurface) -> Option<PixelRect>;
}

/// Keep the whole image
#[derive(Debug, Clone, Copy, Default)]
pub struct FullFrame;

impl CropProvider for FullFrame {
    fn choose(&mut self, surface: &PixelSurface) -> Option<PixelRect> {
        Some(surface.bounds())
    }
}

/// A rectangle decided up front, e.g. from the command line
#[derive(Debug, Clone, Copy)]
pub struct FixedCrop(pub PixelRect);

impl CropProvider for FixedCrop {
    fn choose(&mut self, surface: &PixelSurface) -> Option<PixelRect> {
        Some(clamp_crop(self.0, surface.width, surface.height))
    }
}

/// Clamp `rect` into a `width`x`height` image, keeping at least one pixel
pub fn clamp_crop(rect: PixelRect, width: u32, height: u32) -> PixelRect {
    let width = width.max(1);
    let height = height.max(1);
    let x = rect.x.min(width - 1);
    let y = rect.y.min(height - 1);
    PixelRect::new(
        x,
        y,
        rect.width.clamp(1, width - x),
        rect.height.clamp(1, height - y),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_frame() {
        let surface = PixelSurface::new(30, 20);
        assert_eq!(FullFrame.choose(&surface), Some(PixelRect::new(0, 0, 30, 20)));
    }

    #[test]
    fn test_clamp_crop_inside() {
        assert_eq!(clamp_crop(PixelRect::new(2, 3, 5, 6), 10, 10), PixelRect::new(2, 3, 5, 6));
    }

    #[test]
    fn test_clamp_crop_overhang() {
        assert_eq!(clamp_crop(PixelRect::new(8, 8, 50, 50), 10, 10), PixelRect::new(8, 8, 2, 2));
    }

    #[test]
    fn test_clamp_crop_keeps_one_pixel() {
        assert_eq!(clamp_crop(PixelRect::new(40, 40, 0, 0), 10, 10), PixelRect::new(9, 9, 1, 1));
    }
}
