//! Screen-space types and the mapping between pixels and the complex plane.

use bytemuck::{Pod, Zeroable};

use crate::complex::Complex;

#[repr(C)]
#[derive(Pod, Zeroable, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl From<winit::dpi::PhysicalSize<u32>> for Size {
    fn from(size: winit::dpi::PhysicalSize<u32>) -> Self {
        Self::new(size.width, size.height)
    }
}

/// A position on the window, possibly outside of it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<winit::dpi::PhysicalPosition<f64>> for Point {
    fn from(position: winit::dpi::PhysicalPosition<f64>) -> Self {
        Self::new(position.x.floor() as i32, position.y.floor() as i32)
    }
}

/// A rectangle of pixels in destination-surface coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// Inclusive of the origin, exclusive of `origin + size`.
    pub fn contains(&self, point: Point) -> bool {
        let (x, y) = (i64::from(point.x), i64::from(point.y));
        let (left, top) = (i64::from(self.x), i64::from(self.y));
        x >= left
            && y >= top
            && x < left + i64::from(self.width)
            && y < top + i64::from(self.height)
    }

    /// Whether the whole rectangle lies on a surface of `size`.
    pub fn fits_within(&self, size: Size) -> bool {
        u64::from(self.x) + u64::from(self.width) <= u64::from(size.width)
            && u64::from(self.y) + u64::from(self.height) <= u64::from(size.height)
    }
}

/// An axis-aligned rectangle of the complex plane.
///
/// `top_left.imaginary > bottom_right.imaginary` and `top_left.real < bottom_right.real`
/// give the usual orientation. Other orientations are not rejected; they mirror the image.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ComplexRegion {
    pub top_left: Complex,
    pub bottom_right: Complex,
}

impl ComplexRegion {
    pub const MANDELBROT: Self = ComplexRegion::new(Complex::new(-2.0, 1.5), Complex::new(1.0, -1.5));

    pub const JULIA: Self = ComplexRegion::new(Complex::new(-2.0, 2.0), Complex::new(2.0, -2.0));

    pub const fn new(top_left: Complex, bottom_right: Complex) -> Self {
        Self {
            top_left,
            bottom_right,
        }
    }

    /// Real coordinate of pixel column `column` out of `width`.
    pub fn real_at(&self, column: f64, width: f64) -> f64 {
        self.top_left.real + (self.bottom_right.real - self.top_left.real) * column / width
    }

    /// Imaginary coordinate of pixel row `row` out of `height`.
    pub fn imaginary_at(&self, row: f64, height: f64) -> f64 {
        self.top_left.imaginary
            + (self.bottom_right.imaginary - self.top_left.imaginary) * row / height
    }
}

impl Default for ComplexRegion {
    fn default() -> Self {
        Self::MANDELBROT
    }
}

/**
The complex value under `point`, given that `screen_rect` shows `region`.

Uses the same interpolation as the rasterizer, so the origin of `screen_rect`
maps to `region.top_left`. Callers check [`PixelRect::contains`] first; a
rectangle with zero width or height yields non-finite components.
*/
pub fn screen_to_complex(point: Point, screen_rect: PixelRect, region: &ComplexRegion) -> Complex {
    let column = f64::from(point.x) - f64::from(screen_rect.x);
    let row = f64::from(point.y) - f64::from(screen_rect.y);
    Complex::new(
        region.real_at(column, f64::from(screen_rect.width)),
        region.imaginary_at(row, f64::from(screen_rect.height)),
    )
}
