/*!
Render session: everything a redraw reads, owned in one place.

The event loop feeds window sizes, pointer state and key presses into the
session, and the session re-renders into whatever [`Surface`] it is handed.
Pointer input follows a held-button model: while the left button is down over
the Mandelbrot pane, every cursor move picks a new Julia parameter and redraws
the Julia pane.
*/

use std::{num::NonZeroU32, rc::Rc, time::Instant};

use log::{debug, info};

use crate::{
    colour::{self, Colourmap},
    complex::Complex,
    config::Config,
    error::Error,
    layout::{self, Layout, Panes},
    render::{self, Mode},
    screen::{self, ComplexRegion, Point, Size},
    surface::{PixelBuffer, Surface},
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Pointer {
    pub position: Option<Point>,
    pub held: bool,
}

/// Off-screen targets for [`Layout::Overlay`].
struct Layers {
    mandelbrot: PixelBuffer,
    julia: PixelBuffer,
}

pub struct Session {
    max_iters: u32,
    escape_radius: f64,
    colourmaps: colour::Cache,
    colourmap: Rc<Colourmap>,
    mandelbrot_region: ComplexRegion,
    julia_region: ComplexRegion,
    julia_parameter: Complex,
    layout: Layout,
    panes: Panes,
    layers: Option<Layers>,
    pointer: Pointer,
}

impl Session {
    pub fn new(config: &Config, size: Size) -> Self {
        let mut colourmaps = colour::Cache::new();
        let colourmap = colourmaps.get(config.period, config.max_iters);
        let layout = config.layout();
        let mut session = Self {
            max_iters: config.max_iters,
            escape_radius: config.escape_radius,
            colourmaps,
            colourmap,
            mandelbrot_region: config.mandelbrot_region(),
            julia_region: ComplexRegion::JULIA,
            julia_parameter: config.julia_parameter(),
            layout,
            panes: Panes::default(),
            layers: None,
            pointer: Pointer::default(),
        };
        session.resize(size);
        session
    }

    pub fn julia_parameter(&self) -> Complex {
        self.julia_parameter
    }

    pub fn panes(&self) -> Panes {
        self.panes
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn colourmap(&self) -> &Colourmap {
        &self.colourmap
    }

    pub fn pointer(&self) -> Pointer {
        self.pointer
    }

    /// Recompute the panes for a new window size. Call [`Session::redraw`] afterwards.
    pub fn resize(&mut self, size: Size) {
        debug!("resizing session to {:?}", size);
        self.panes = self.layout.panes(size);
        if self.layout.is_overlay() {
            match &mut self.layers {
                Some(layers) => {
                    layers.mandelbrot.resize(size);
                    layers.julia.resize(size);
                }
                None => {
                    self.layers = Some(Layers {
                        mandelbrot: PixelBuffer::new(size),
                        julia: PixelBuffer::new(size),
                    })
                }
            }
        }
    }

    /// Switch colour period. Returns whether anything changed; the caller redraws if so.
    pub fn set_period(&mut self, period: NonZeroU32) -> bool {
        if period == self.colourmap.period() {
            return false;
        }
        info!("colour period is now {}", period);
        self.colourmap = self.colourmaps.get(period, self.max_iters);
        true
    }

    /// Step the colour period up or down, never below one.
    pub fn adjust_period(&mut self, delta: i32) -> bool {
        let current = self.colourmap.period().get();
        let next = if delta.is_negative() {
            current.saturating_sub(delta.unsigned_abs())
        } else {
            current.saturating_add(delta.unsigned_abs())
        };
        match NonZeroU32::new(next) {
            Some(period) => self.set_period(period),
            None => false,
        }
    }

    /// Draw both planes.
    pub fn redraw<S: Surface + ?Sized>(&mut self, surface: &mut S) -> Result<(), Error> {
        info!("rendering mandelbrot");
        let start = Instant::now();
        let mandelbrot = self.panes.mandelbrot;
        let region = self.mandelbrot_region;
        let (colourmap, max_iters) = (Rc::clone(&self.colourmap), self.max_iters);
        match &mut self.layers {
            Some(layers) => render::render(
                &mut layers.mandelbrot,
                &region,
                mandelbrot,
                &colourmap,
                max_iters,
                Mode::Mandelbrot,
            )?,
            None => {
                render::render(
                    surface,
                    &region,
                    mandelbrot,
                    &colourmap,
                    max_iters,
                    Mode::Mandelbrot,
                )?;
                surface.present(mandelbrot)?;
            }
        }
        info!("mandelbrot took {:?}", start.elapsed());

        self.redraw_julia(surface)
    }

    /// Draw the Julia plane for the current parameter.
    pub fn redraw_julia<S: Surface + ?Sized>(&mut self, surface: &mut S) -> Result<(), Error> {
        debug!(
            "rendering julia for c = ({}, {})",
            self.julia_parameter.real, self.julia_parameter.imaginary
        );
        let start = Instant::now();
        let julia = self.panes.julia;
        let mode = Mode::Julia {
            c: self.julia_parameter,
            escape_radius: self.escape_radius,
        };
        match (&mut self.layers, self.layout) {
            (Some(layers), Layout::Overlay { alpha }) => {
                render::render(
                    &mut layers.julia,
                    &self.julia_region,
                    julia,
                    &self.colourmap,
                    self.max_iters,
                    mode,
                )?;
                layout::composite(surface, &layers.julia, &layers.mandelbrot, julia, alpha)?;
            }
            _ => {
                render::render(
                    surface,
                    &self.julia_region,
                    julia,
                    &self.colourmap,
                    self.max_iters,
                    mode,
                )?;
                surface.present(julia)?;
            }
        }
        debug!("julia took {:?}", start.elapsed());
        Ok(())
    }

    /// Pick the Julia parameter under `point`, if it is over the Mandelbrot pane.
    pub fn select(&mut self, point: Point) -> Option<Complex> {
        let pane = self.panes.mandelbrot;
        if !pane.contains(point) {
            return None;
        }
        self.julia_parameter = screen::screen_to_complex(point, pane, &self.mandelbrot_region);
        Some(self.julia_parameter)
    }

    pub fn pointer_moved<S: Surface + ?Sized>(
        &mut self,
        point: Point,
        surface: &mut S,
    ) -> Result<bool, Error> {
        self.pointer.position = Some(point);
        self.poll_pointer(surface)
    }

    pub fn pointer_left(&mut self) {
        self.pointer.position = None;
    }

    pub fn pointer_button<S: Surface + ?Sized>(
        &mut self,
        held: bool,
        surface: &mut S,
    ) -> Result<bool, Error> {
        self.pointer.held = held;
        self.poll_pointer(surface)
    }

    /// Redraw the Julia pane if the button is held over the Mandelbrot pane. Returns whether it did.
    fn poll_pointer<S: Surface + ?Sized>(&mut self, surface: &mut S) -> Result<bool, Error> {
        if !self.pointer.held {
            return Ok(false);
        }
        let selected = self.pointer.position.and_then(|point| self.select(point));
        match selected {
            Some(_) => {
                self.redraw_julia(surface)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
