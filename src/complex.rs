use std::ops::{Add, Mul};

use bytemuck::{Pod, Zeroable};

#[repr(C)]
#[derive(Pod, Zeroable, Clone, Copy, Debug, PartialEq, Default)]
pub struct Complex {
    pub real: f64,
    pub imaginary: f64,
}

impl Complex {
    pub const ZERO: Self = Complex {
        real: 0.0,
        imaginary: 0.0,
    };

    pub const ONE: Self = Complex {
        real: 1.0,
        imaginary: 0.0,
    };

    pub const fn new(real: f64, imaginary: f64) -> Self {
        Self { real, imaginary }
    }

    /// `|self|²`. Escape tests compare this against the *square* of the radius.
    pub fn squared_magnitude(self) -> f64 {
        squared_magnitude(self)
    }
}

pub fn add(a: Complex, b: Complex) -> Complex {
    Complex {
        real: a.real + b.real,
        imaginary: a.imaginary + b.imaginary,
    }
}

pub fn multiply(a: Complex, b: Complex) -> Complex {
    Complex {
        real: a.real * b.real - a.imaginary * b.imaginary,
        imaginary: a.real * b.imaginary + a.imaginary * b.real,
    }
}

pub fn squared_magnitude(a: Complex) -> f64 {
    a.real * a.real + a.imaginary * a.imaginary
}

impl Add for Complex {
    type Output = Complex;

    fn add(self, rhs: Self) -> Self::Output {
        add(self, rhs)
    }
}

impl Mul for Complex {
    type Output = Complex;

    fn mul(self, rhs: Self) -> Self::Output {
        multiply(self, rhs)
    }
}
