/*!
Destination surfaces.

A [`Surface`] is a fixed-size grid of pixels that the rasterizer writes into.
Writes happen inside a lock bracket ([`SurfaceExt::with_lock`]); a finished
batch is made visible with [`Surface::present`]. Pixels are never read back
through this trait.

[`PixelBuffer`] is the in-memory implementation. It backs the window's frame,
the off-screen layers of the overlay layout, and the tests.
*/

use log::trace;

use crate::{
    colour::Colour,
    error::Error,
    screen::{PixelRect, Size},
};

pub trait Surface {
    fn size(&self) -> Size;

    fn lock(&mut self) -> Result<(), Error>;

    fn unlock(&mut self);

    /// Fails without writing if `(x, y)` is off the surface or the surface isn't locked.
    fn set_pixel(&mut self, x: u32, y: u32, colour: Colour) -> Result<(), Error>;

    /// Make the pixels in `rect` visible. Called outside of a lock.
    fn present(&mut self, rect: PixelRect) -> Result<(), Error>;
}

pub trait SurfaceExt: Surface {
    /// Run `function` with the surface locked. The lock is released whatever `function` returns.
    fn with_lock<A>(
        &mut self,
        function: impl FnOnce(&mut Self) -> Result<A, Error>,
    ) -> Result<A, Error> {
        self.lock()?;
        let result = function(self);
        self.unlock();
        result
    }
}

impl<S: Surface + ?Sized> SurfaceExt for S {}

/// Blend one channel of `over` onto `under` with opacity `alpha / 255`.
#[inline]
fn blend_channel(over: u8, under: u8, alpha: u8) -> u8 {
    let alpha = u16::from(alpha);
    let result = u16::from(over) * alpha + u16::from(under) * (255 - alpha);
    ((result + 1 + (result >> 8)) >> 8) as u8
}

/// `over` drawn on top of `under` with opacity `alpha / 255`. The result is opaque.
pub fn blend(over: Colour, under: Colour, alpha: u8) -> Colour {
    Colour::rgb(
        blend_channel(over.r, under.r, alpha),
        blend_channel(over.g, under.g, alpha),
        blend_channel(over.b, under.b, alpha),
    )
}

/// Row-major RGBA pixels.
#[derive(Clone, Debug)]
pub struct PixelBuffer {
    size: Size,
    pixels: Vec<Colour>,
    locked: bool,
    presented: Vec<PixelRect>,
}

impl PixelBuffer {
    pub fn new(size: Size) -> Self {
        Self {
            size,
            pixels: vec![Colour::INTERIOR; size.width as usize * size.height as usize],
            locked: false,
            presented: Vec::new(),
        }
    }

    /// Reallocate for a new size. Contents are cleared.
    pub fn resize(&mut self, size: Size) {
        self.size = size;
        self.pixels.clear();
        self.pixels
            .resize(size.width as usize * size.height as usize, Colour::INTERIOR);
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn get(&self, x: u32, y: u32) -> Option<Colour> {
        if x < self.size.width && y < self.size.height {
            Some(self.pixels[self.index(x, y)])
        } else {
            None
        }
    }

    pub fn pixels(&self) -> &[Colour] {
        &self.pixels
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    /// Rectangles passed to [`Surface::present`] since the last [`PixelBuffer::take_presented`].
    pub fn take_presented(&mut self) -> Vec<PixelRect> {
        std::mem::take(&mut self.presented)
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.size.width as usize + x as usize
    }
}

impl Surface for PixelBuffer {
    fn size(&self) -> Size {
        self.size
    }

    fn lock(&mut self) -> Result<(), Error> {
        if self.locked {
            return Err(Error::AlreadyLocked);
        }
        self.locked = true;
        Ok(())
    }

    fn unlock(&mut self) {
        self.locked = false;
    }

    fn set_pixel(&mut self, x: u32, y: u32, colour: Colour) -> Result<(), Error> {
        if !self.locked {
            return Err(Error::NotLocked);
        }
        if x >= self.size.width || y >= self.size.height {
            return Err(Error::PixelOutOfBounds {
                x,
                y,
                size: self.size,
            });
        }
        let index = self.index(x, y);
        self.pixels[index] = colour;
        Ok(())
    }

    fn present(&mut self, rect: PixelRect) -> Result<(), Error> {
        trace!("present {:?}", rect);
        self.presented.push(rect);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_buffer_is_interior() {
        let buffer = PixelBuffer::new(Size::new(4, 3));
        assert_eq!(buffer.pixels().len(), 12);
        assert!(buffer.pixels().iter().all(|pixel| *pixel == Colour::INTERIOR));
        assert_eq!(buffer.as_bytes().len(), 48);
    }

    #[test]
    fn writes_need_a_lock() {
        let mut buffer = PixelBuffer::new(Size::new(2, 2));
        assert!(matches!(
            buffer.set_pixel(0, 0, Colour::rgb(1, 2, 3)),
            Err(Error::NotLocked)
        ));

        buffer
            .with_lock(|buffer| buffer.set_pixel(1, 0, Colour::rgb(1, 2, 3)))
            .unwrap();
        assert!(!buffer.is_locked());
        assert_eq!(buffer.get(1, 0), Some(Colour::rgb(1, 2, 3)));
        assert_eq!(buffer.pixels()[1], Colour::rgb(1, 2, 3));
    }

    #[test]
    fn lock_is_not_reentrant() {
        let mut buffer = PixelBuffer::new(Size::new(2, 2));
        let result = buffer.with_lock(|buffer| buffer.lock());
        assert!(matches!(result, Err(Error::AlreadyLocked)));
        assert!(!buffer.is_locked());
    }

    #[test]
    fn lock_is_released_when_a_write_fails() {
        let mut buffer = PixelBuffer::new(Size::new(2, 2));
        let result = buffer.with_lock(|buffer| {
            buffer.set_pixel(0, 0, Colour::rgb(9, 9, 9))?;
            buffer.set_pixel(2, 0, Colour::rgb(1, 1, 1))
        });
        assert!(matches!(
            result,
            Err(Error::PixelOutOfBounds { x: 2, y: 0, .. })
        ));
        assert!(!buffer.is_locked());
        assert_eq!(buffer.get(0, 0), Some(Colour::rgb(9, 9, 9)));
        assert_eq!(buffer.get(2, 0), None);
    }

    #[test]
    fn present_records_rects() {
        let mut buffer = PixelBuffer::new(Size::new(8, 8));
        buffer.present(PixelRect::new(0, 0, 4, 8)).unwrap();
        buffer.present(PixelRect::new(4, 0, 4, 8)).unwrap();
        assert_eq!(
            buffer.take_presented(),
            vec![PixelRect::new(0, 0, 4, 8), PixelRect::new(4, 0, 4, 8)]
        );
        assert!(buffer.take_presented().is_empty());
    }

    #[test]
    fn resize_reallocates() {
        let mut buffer = PixelBuffer::new(Size::new(2, 2));
        buffer.resize(Size::new(5, 0));
        assert_eq!(buffer.size(), Size::new(5, 0));
        assert!(buffer.pixels().is_empty());
        buffer.resize(Size::new(3, 3));
        assert_eq!(buffer.pixels().len(), 9);
    }

    #[test]
    fn blend_endpoints() {
        let over = Colour::rgb(255, 0, 100);
        let under = Colour::rgb(0, 255, 50);
        assert_eq!(blend(over, under, 255), over);
        assert_eq!(blend(over, under, 0), under);
    }

    #[test]
    fn blend_quarter_opacity() {
        let blended = blend(Colour::rgb(255, 255, 255), Colour::INTERIOR, 64);
        assert_eq!(blended, Colour::rgb(64, 64, 64));
        assert_eq!(blended.a, 255);
    }
}
