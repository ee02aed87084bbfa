//! Escape-time iteration of `z ← z² + c`.

use crate::complex::{self, Complex};

/// Escape radius used for every Mandelbrot render.
pub const MANDELBROT_ESCAPE_RADIUS: f64 = 2.0;

/// Default escape radius for Julia renders.
pub const DEFAULT_JULIA_ESCAPE_RADIUS: f64 = 2.0;

/**
Count iterations of `z ← z² + c` starting from `z0`.

Each pass counts itself before testing `|z|`, so an escape after `k` updates
returns `k + 1`:

* `max_iters == 0` (or `1`) returns `0` without touching `z`,
* a point that never escapes returns exactly `max_iters - 1`,
* a point already outside the radius returns `1`.

NaN and infinite values never satisfy the radius test, so they count as escaped.
*/
pub fn iterate(z0: Complex, c: Complex, escape_radius: f64, max_iters: u32) -> u32 {
    let threshold_squared = escape_radius * escape_radius;
    let mut z = z0;
    let mut count = 0;
    while count + 1 < max_iters {
        count += 1;
        let inside = complex::squared_magnitude(z) <= threshold_squared;
        if !inside {
            break;
        }
        z = complex::add(complex::multiply(z, z), c);
    }
    count
}

pub fn mandelbrot_iterate(c: Complex, max_iters: u32) -> u32 {
    iterate(Complex::ZERO, c, MANDELBROT_ESCAPE_RADIUS, max_iters)
}

pub fn julia_iterate(z: Complex, c: Complex, escape_radius: f64, max_iters: u32) -> u32 {
    iterate(z, c, escape_radius, max_iters)
}
