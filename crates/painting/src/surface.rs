//! CPU pixel surface - 8-bit RGBA storage with rectangle read/write

use crate::validation::{validate_rgba, SurfaceError};

/// Integer pixel rectangle, half-open: `[x, x + width) x [y, y + height)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Build a rectangle from signed edges, clamped to `[0, max_w) x [0, max_h)`
    pub fn from_edges_clamped(x0: i64, y0: i64, x1: i64, y1: i64, max_w: u32, max_h: u32) -> Self {
        let x0 = x0.clamp(0, max_w as i64) as u32;
        let y0 = y0.clamp(0, max_h as i64) as u32;
        let x1 = x1.clamp(0, max_w as i64) as u32;
        let y1 = y1.clamp(0, max_h as i64) as u32;
        Self {
            x: x0,
            y: y0,
            width: x1.saturating_sub(x0),
            height: y1.saturating_sub(y0),
        }
    }

    #[inline]
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    #[inline]
    pub fn area(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Whether `other` lies fully inside this rectangle
    pub fn contains_rect(&self, other: &PixelRect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Smallest rectangle covering both. Empty rectangles are ignored.
    pub fn union(&self, other: &PixelRect) -> PixelRect {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        let x0 = self.x.min(other.x);
        let y0 = self.y.min(other.y);
        let x1 = self.right().max(other.right());
        let y1 = self.bottom().max(other.bottom());
        PixelRect::new(x0, y0, x1 - x0, y1 - y0)
    }

    pub fn intersect(&self, other: &PixelRect) -> PixelRect {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = self.right().min(other.right());
        let y1 = self.bottom().min(other.bottom());
        PixelRect::new(x0, y0, x1.saturating_sub(x0), y1.saturating_sub(y0))
    }
}

/// A detached copy of a rectangular block of pixels
#[derive(Debug, Clone, PartialEq)]
pub struct PixelPatch {
    rect: PixelRect,
    pixels: Vec<[u8; 4]>,
}

impl PixelPatch {
    /// A zero-filled patch covering `rect`
    pub fn blank(rect: PixelRect) -> Self {
        Self {
            rect,
            pixels: vec![[0; 4]; rect.area()],
        }
    }

    #[inline]
    pub fn rect(&self) -> PixelRect {
        self.rect
    }

    #[inline]
    pub fn pixels(&self) -> &[[u8; 4]] {
        &self.pixels
    }

    /// Pixel at surface coordinates, None outside the patch
    pub fn get(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x < self.rect.x || y < self.rect.y || x >= self.rect.right() || y >= self.rect.bottom() {
            return None;
        }
        let index = ((y - self.rect.y) as usize) * (self.rect.width as usize) + (x - self.rect.x) as usize;
        Some(self.pixels[index])
    }

    /// Copy `src` into this patch at its surface position. Only the overlap is copied.
    pub fn blit(&mut self, src: &PixelPatch) {
        let overlap = self.rect.intersect(&src.rect);
        if overlap.is_empty() {
            return;
        }
        let row_len = overlap.width as usize;
        for row in overlap.y..overlap.bottom() {
            let src_start = ((row - src.rect.y) as usize) * (src.rect.width as usize)
                + (overlap.x - src.rect.x) as usize;
            let dst_start = ((row - self.rect.y) as usize) * (self.rect.width as usize)
                + (overlap.x - self.rect.x) as usize;
            self.pixels[dst_start..dst_start + row_len]
                .copy_from_slice(&src.pixels[src_start..src_start + row_len]);
        }
    }

    /// Bytes held by the pixel data
    pub fn memory_size(&self) -> usize {
        self.pixels.len() * 4
    }
}

/// An 8-bit RGBA CPU surface
///
/// Colors are stored straight (not premultiplied), row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelSurface {
    /// Surface dimensions
    pub width: u32,
    pub height: u32,
    pixels: Vec<[u8; 4]>,
}

impl PixelSurface {
    /// Create a new surface with the given dimensions, initialized to transparent black
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, [0, 0, 0, 0])
    }

    /// Create a surface filled with a single color
    pub fn filled(width: u32, height: u32, color: [u8; 4]) -> Self {
        let pixel_count = (width as usize) * (height as usize);
        Self {
            width,
            height,
            pixels: vec![color; pixel_count],
        }
    }

    /// Wrap a tightly packed RGBA byte buffer
    pub fn from_rgba(width: u32, height: u32, bytes: &[u8]) -> Result<Self, SurfaceError> {
        validate_rgba(width, height, bytes)?;
        let pixels = bytes
            .chunks_exact(4)
            .map(|c| [c[0], c[1], c[2], c[3]])
            .collect();
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Clear the surface to a solid color
    pub fn clear(&mut self, color: [u8; 4]) {
        self.pixels.fill(color);
    }

    /// The full surface rectangle
    #[inline]
    pub fn bounds(&self) -> PixelRect {
        PixelRect::new(0, 0, self.width, self.height)
    }

    /// Clamp a rectangle to the surface
    #[inline]
    pub fn clamp_rect(&self, rect: PixelRect) -> PixelRect {
        self.bounds().intersect(&rect)
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        (y as usize) * (self.width as usize) + (x as usize)
    }

    /// Get a pixel at the given coordinates
    /// Returns None if coordinates are out of bounds
    #[inline]
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[self.index(x, y)])
    }

    /// Set a pixel at the given coordinates
    /// Does nothing if coordinates are out of bounds
    #[inline]
    pub fn set_pixel(&mut self, x: u32, y: u32, color: [u8; 4]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let index = self.index(x, y);
        self.pixels[index] = color;
    }

    /// Alpha channel at the given coordinates, 0 outside the surface
    #[inline]
    pub fn alpha(&self, x: u32, y: u32) -> u8 {
        self.get_pixel(x, y).map_or(0, |p| p[3])
    }

    /// Copy a rectangle out of the surface. The rectangle is clamped first.
    pub fn read_rect(&self, rect: PixelRect) -> PixelPatch {
        let rect = self.clamp_rect(rect);
        let mut pixels = Vec::with_capacity(rect.area());
        for row in rect.y..rect.bottom() {
            let start = self.index(rect.x, row);
            pixels.extend_from_slice(&self.pixels[start..start + rect.width as usize]);
        }
        PixelPatch { rect, pixels }
    }

    /// Write a patch back at its stored rectangle. Parts outside the surface are dropped.
    pub fn write_patch(&mut self, patch: &PixelPatch) {
        let rect = self.clamp_rect(patch.rect);
        if rect.is_empty() {
            return;
        }
        let row_len = rect.width as usize;
        for row in rect.y..rect.bottom() {
            let src_start = ((row - patch.rect.y) as usize) * (patch.rect.width as usize)
                + (rect.x - patch.rect.x) as usize;
            let dst_start = self.index(rect.x, row);
            self.pixels[dst_start..dst_start + row_len]
                .copy_from_slice(&patch.pixels[src_start..src_start + row_len]);
        }
    }

    /// Copy a rectangle into a new standalone surface
    pub fn crop(&self, rect: PixelRect) -> PixelSurface {
        let patch = self.read_rect(rect);
        PixelSurface {
            width: patch.rect.width,
            height: patch.rect.height,
            pixels: patch.pixels,
        }
    }

    /// Raw RGBA bytes
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    /// Get the total number of pixels
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.pixels.len()
    }

    /// Get direct access to pixel data
    #[inline]
    pub fn pixels(&self) -> &[[u8; 4]] {
        &self.pixels
    }

    /// Get mutable access to pixel data
    #[inline]
    pub fn pixels_mut(&mut self) -> &mut [[u8; 4]] {
        &mut self.pixels
    }
}
