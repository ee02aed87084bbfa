//! Region rasterizer shared by the Mandelbrot and Julia planes.

use log::trace;

use crate::{
    colour::Colourmap,
    complex::Complex,
    error::Error,
    escape,
    screen::{ComplexRegion, PixelRect},
    surface::{Surface, SurfaceExt},
};

/// Which plane to draw, and with what `(z0, c)` assignment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Mode {
    /// `z0 = 0`, `c = pixel`.
    Mandelbrot,
    /// `z0 = pixel`, `c` fixed.
    Julia { c: Complex, escape_radius: f64 },
}

impl Mode {
    pub fn julia(c: Complex) -> Self {
        Mode::Julia {
            c,
            escape_radius: escape::DEFAULT_JULIA_ESCAPE_RADIUS,
        }
    }

    /// Escape time of `point` in this plane. Non-escaping points return `max_iters`.
    pub fn escape_time(&self, point: Complex, max_iters: u32) -> u32 {
        // One more than the table's interior index, so a point that stays bounded lands on it.
        let cap = max_iters.saturating_add(1);
        match *self {
            Mode::Mandelbrot => escape::mandelbrot_iterate(point, cap),
            Mode::Julia { c, escape_radius } => escape::julia_iterate(point, c, escape_radius, cap),
        }
    }
}

/**
Draw `region` into `rect` on `surface`.

Every pixel of `rect` is written exactly once, row by row from the top, left to
right. The rectangle is checked against the surface before locking, so a
rejected render leaves the surface untouched. An empty `rect` is a no-op.
Presenting is left to the caller.
*/
pub fn render<S: Surface + ?Sized>(
    surface: &mut S,
    region: &ComplexRegion,
    rect: PixelRect,
    colours: &Colourmap,
    max_iters: u32,
    mode: Mode,
) -> Result<(), Error> {
    if rect.is_empty() {
        return Ok(());
    }
    let size = surface.size();
    if !rect.fits_within(size) {
        return Err(Error::RectOutOfBounds { rect, size });
    }

    trace!("begin render {:?} into {:?}", mode, rect);

    let width = f64::from(rect.width);
    let height = f64::from(rect.height);
    surface.with_lock(|surface| {
        for j in 0..rect.height {
            let imaginary = region.imaginary_at(f64::from(j), height);
            for i in 0..rect.width {
                let point = Complex::new(region.real_at(f64::from(i), width), imaginary);
                let colour = colours.get(mode.escape_time(point, max_iters));
                surface.set_pixel(rect.x + i, rect.y + j, colour)?;
            }
        }
        Ok(())
    })?;

    trace!("end render");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroU32;

    use super::*;
    use crate::{
        colour::Colour,
        screen::{Point, Size},
        surface::PixelBuffer,
    };

    fn colourmap(max_iters: u32) -> Colourmap {
        Colourmap::new(NonZeroU32::new(10).unwrap(), max_iters)
    }

    /// Records the order pixels arrive in.
    struct Recorder {
        size: Size,
        writes: Vec<(u32, u32)>,
        fail_at: Option<usize>,
        locks: usize,
        unlocks: usize,
    }

    impl Recorder {
        fn new(size: Size) -> Self {
            Self {
                size,
                writes: Vec::new(),
                fail_at: None,
                locks: 0,
                unlocks: 0,
            }
        }
    }

    impl Surface for Recorder {
        fn size(&self) -> Size {
            self.size
        }

        fn lock(&mut self) -> Result<(), Error> {
            self.locks += 1;
            Ok(())
        }

        fn unlock(&mut self) {
            self.unlocks += 1;
        }

        fn set_pixel(&mut self, x: u32, y: u32, _colour: Colour) -> Result<(), Error> {
            if self.fail_at == Some(self.writes.len()) {
                return Err(Error::NotLocked);
            }
            self.writes.push((x, y));
            Ok(())
        }

        fn present(&mut self, _rect: PixelRect) -> Result<(), Error> {
            Ok(())
        }
    }

    #[test]
    fn visits_every_pixel_once_in_row_major_order() {
        let mut recorder = Recorder::new(Size::new(10, 10));
        let rect = PixelRect::new(2, 3, 3, 2);
        render(
            &mut recorder,
            &ComplexRegion::MANDELBROT,
            rect,
            &colourmap(20),
            20,
            Mode::Mandelbrot,
        )
        .unwrap();
        assert_eq!(
            recorder.writes,
            vec![(2, 3), (3, 3), (4, 3), (2, 4), (3, 4), (4, 4)]
        );
        assert_eq!((recorder.locks, recorder.unlocks), (1, 1));
    }

    #[test]
    fn empty_rect_is_a_no_op() {
        let mut recorder = Recorder::new(Size::new(10, 10));
        for rect in [PixelRect::new(0, 0, 0, 5), PixelRect::new(0, 0, 5, 0)] {
            render(
                &mut recorder,
                &ComplexRegion::MANDELBROT,
                rect,
                &colourmap(20),
                20,
                Mode::Mandelbrot,
            )
            .unwrap();
        }
        assert!(recorder.writes.is_empty());
        assert_eq!(recorder.locks, 0);
    }

    #[test]
    fn oversized_rect_is_rejected_before_writing() {
        let mut buffer = PixelBuffer::new(Size::new(8, 8));
        let result = render(
            &mut buffer,
            &ComplexRegion::MANDELBROT,
            PixelRect::new(4, 0, 5, 8),
            &colourmap(20),
            20,
            Mode::julia(Complex::ZERO),
        );
        assert!(matches!(result, Err(Error::RectOutOfBounds { .. })));
        assert!(!buffer.is_locked());
        assert!(buffer.pixels().iter().all(|pixel| *pixel == Colour::INTERIOR));
    }

    #[test]
    fn failed_write_still_unlocks() {
        let mut recorder = Recorder::new(Size::new(4, 4));
        recorder.fail_at = Some(5);
        let result = render(
            &mut recorder,
            &ComplexRegion::JULIA,
            PixelRect::new(0, 0, 4, 4),
            &colourmap(20),
            20,
            Mode::Mandelbrot,
        );
        assert!(result.is_err());
        assert_eq!(recorder.writes.len(), 5);
        assert_eq!((recorder.locks, recorder.unlocks), (1, 1));
    }

    #[test]
    fn bounded_points_use_the_interior_colour() {
        let max_iters = 50;
        assert_eq!(Mode::Mandelbrot.escape_time(Complex::ZERO, max_iters), max_iters);
        assert_eq!(
            Mode::julia(Complex::ZERO).escape_time(Complex::new(0.5, 0.0), max_iters),
            max_iters
        );
        assert_eq!(Mode::Mandelbrot.escape_time(Complex::new(-2.0, 1.5), max_iters), 2);
        // Escaping on the last allowed check is indistinguishable from staying bounded.
        assert_eq!(
            Mode::julia(Complex::ZERO).escape_time(Complex::new(3.0, 0.0), 1),
            1
        );
    }

    #[test]
    fn zero_iterations_render_interior() {
        let mut buffer = PixelBuffer::new(Size::new(6, 6));
        render(
            &mut buffer,
            &ComplexRegion::MANDELBROT,
            PixelRect::new(0, 0, 6, 6),
            &colourmap(0),
            0,
            Mode::Mandelbrot,
        )
        .unwrap();
        assert!(buffer.pixels().iter().all(|pixel| *pixel == Colour::INTERIOR));
    }

    #[test]
    fn pixel_matches_screen_to_complex() {
        let region = ComplexRegion::MANDELBROT;
        let rect = PixelRect::new(5, 7, 40, 30);
        let colours = colourmap(30);
        let mut buffer = PixelBuffer::new(Size::new(50, 40));
        render(&mut buffer, &region, rect, &colours, 30, Mode::Mandelbrot).unwrap();

        for (x, y) in [(5, 7), (20, 20), (44, 36), (30, 10)] {
            let point = crate::screen::screen_to_complex(Point::new(x, y), rect, &region);
            let expected = colours.get(Mode::Mandelbrot.escape_time(point, 30));
            assert_eq!(buffer.get(x as u32, y as u32), Some(expected), "({}, {})", x, y);
        }
    }
}
