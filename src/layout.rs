/*!
How the Mandelbrot and Julia panes share the window.

[`Layout::SideBySide`] splits the window in two and draws both planes straight
into it. [`Layout::Overlay`] draws both planes into off-screen buffers covering
the same square, then composites the Mandelbrot layer over the Julia layer
with a fixed opacity.
*/

use clap::ValueEnum;

use crate::{
    error::Error,
    screen::{PixelRect, Size},
    surface::{self, PixelBuffer, Surface, SurfaceExt},
};

/// Opacity of the Mandelbrot layer in the overlay layout.
pub const DEFAULT_OVERLAY_ALPHA: u8 = 64;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LayoutKind {
    SideBySide,
    Overlay,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Layout {
    SideBySide,
    Overlay { alpha: u8 },
}

impl Layout {
    pub fn new(kind: LayoutKind, alpha: u8) -> Self {
        match kind {
            LayoutKind::SideBySide => Layout::SideBySide,
            LayoutKind::Overlay => Layout::Overlay { alpha },
        }
    }

    /// Initial window size.
    pub fn default_size(&self) -> Size {
        match self {
            Layout::SideBySide => Size::new(700, 350),
            Layout::Overlay { .. } => Size::new(350, 350),
        }
    }

    pub fn panes(&self, size: Size) -> Panes {
        match self {
            Layout::SideBySide => {
                let half = size.width / 2;
                Panes {
                    julia: PixelRect::new(0, 0, half, size.height),
                    mandelbrot: PixelRect::new(half, 0, size.width - half, size.height),
                }
            }
            Layout::Overlay { .. } => {
                let side = size.width.min(size.height);
                let square = PixelRect::new(0, 0, side, side);
                Panes {
                    julia: square,
                    mandelbrot: square,
                }
            }
        }
    }

    pub fn is_overlay(&self) -> bool {
        matches!(self, Layout::Overlay { .. })
    }
}

/// Where each plane is drawn, in window coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Panes {
    pub mandelbrot: PixelRect,
    pub julia: PixelRect,
}

/// Copy `rect` of `solid` to `display`, then blend `rect` of `overlay` on top, and present it.
pub fn composite<S: Surface + ?Sized>(
    display: &mut S,
    solid: &PixelBuffer,
    overlay: &PixelBuffer,
    rect: PixelRect,
    alpha: u8,
) -> Result<(), Error> {
    if rect.is_empty() {
        return Ok(());
    }
    for size in [display.size(), solid.size(), overlay.size()] {
        if !rect.fits_within(size) {
            return Err(Error::RectOutOfBounds { rect, size });
        }
    }

    display.with_lock(|display| {
        for y in rect.y..rect.y + rect.height {
            for x in rect.x..rect.x + rect.width {
                // Both lookups are in bounds after the checks above.
                let under = solid.get(x, y).unwrap_or_default();
                let over = overlay.get(x, y).unwrap_or_default();
                display.set_pixel(x, y, surface::blend(over, under, alpha))?;
            }
        }
        Ok(())
    })?;
    display.present(rect)
}
