//! Startup parameters.

use std::num::NonZeroU32;

use clap::Parser;

use crate::{
    complex::Complex,
    escape,
    layout::{Layout, LayoutKind, DEFAULT_OVERLAY_ALPHA},
    screen::{ComplexRegion, Size},
};

pub const DEFAULT_MAX_ITERS: u32 = 255;

pub const DEFAULT_PERIOD: NonZeroU32 = match NonZeroU32::new(10) {
    Some(period) => period,
    None => panic!("period must be non-zero"),
};

pub const DEFAULT_JULIA_PARAMETER: Complex = Complex::new(0.233, 0.5378);

/// Mandelbrot and Julia set viewer. Hold the left mouse button over the
/// Mandelbrot set to preview the Julia set of the point under the cursor.
#[derive(Parser, Clone, Debug, PartialEq)]
#[command(name = "julia-preview", version, about)]
pub struct Config {
    /// Mandelbrot region to show, as the top-left and bottom-right corners
    #[arg(
        num_args = 4,
        value_names = ["LEFT_REAL", "TOP_IMAG", "RIGHT_REAL", "BOTTOM_IMAG"],
        allow_negative_numbers = true
    )]
    pub region: Option<Vec<f64>>,

    /// Iteration cap
    #[arg(
        long,
        default_value_t = DEFAULT_MAX_ITERS,
        value_parser = clap::value_parser!(u32).range(0..=1_000_000)
    )]
    pub max_iters: u32,

    /// Iterations per colour channel in the blue, green, red cycle
    #[arg(long, default_value_t = DEFAULT_PERIOD)]
    pub period: NonZeroU32,

    /// Escape radius for the Julia set
    #[arg(long, default_value_t = escape::DEFAULT_JULIA_ESCAPE_RADIUS)]
    pub escape_radius: f64,

    /// Real part of the initial Julia parameter
    #[arg(long, default_value_t = DEFAULT_JULIA_PARAMETER.real, allow_negative_numbers = true)]
    pub julia_real: f64,

    /// Imaginary part of the initial Julia parameter
    #[arg(long, default_value_t = DEFAULT_JULIA_PARAMETER.imaginary, allow_negative_numbers = true)]
    pub julia_imag: f64,

    /// How the two planes share the window
    #[arg(long, value_enum, default_value_t = LayoutKind::SideBySide)]
    pub layout: LayoutKind,

    /// Opacity of the Mandelbrot layer in the overlay layout
    #[arg(long, default_value_t = DEFAULT_OVERLAY_ALPHA)]
    pub overlay_alpha: u8,

    /// Initial window width
    #[arg(long)]
    pub width: Option<u32>,

    /// Initial window height
    #[arg(long)]
    pub height: Option<u32>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            region: None,
            max_iters: DEFAULT_MAX_ITERS,
            period: DEFAULT_PERIOD,
            escape_radius: escape::DEFAULT_JULIA_ESCAPE_RADIUS,
            julia_real: DEFAULT_JULIA_PARAMETER.real,
            julia_imag: DEFAULT_JULIA_PARAMETER.imaginary,
            layout: LayoutKind::SideBySide,
            overlay_alpha: DEFAULT_OVERLAY_ALPHA,
            width: None,
            height: None,
        }
    }
}

impl Config {
    /// The four positional values go straight into the corners.
    pub fn mandelbrot_region(&self) -> ComplexRegion {
        match self.region.as_deref() {
            Some(&[left, top, right, bottom]) => {
                ComplexRegion::new(Complex::new(left, top), Complex::new(right, bottom))
            }
            _ => ComplexRegion::MANDELBROT,
        }
    }

    pub fn julia_parameter(&self) -> Complex {
        Complex::new(self.julia_real, self.julia_imag)
    }

    pub fn layout(&self) -> Layout {
        Layout::new(self.layout, self.overlay_alpha)
    }

    pub fn window_size(&self) -> Size {
        let default = self.layout().default_size();
        Size::new(
            self.width.unwrap_or(default.width),
            self.height.unwrap_or(default.height),
        )
    }
}
