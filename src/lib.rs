//! Mandelbrot viewer with a live Julia set preview.
//!
//! The numeric core ([`complex`], [`escape`], [`colour`], [`screen`], [`render`]) is
//! independent of the window: it writes into any [`surface::Surface`]. [`display`]
//! is the window-backed surface, [`session`] holds the state the event loop updates.

pub mod colour;
pub mod complex;
pub mod config;
pub mod display;
pub mod error;
pub mod escape;
pub mod layout;
pub mod render;
pub mod screen;
pub mod session;
pub mod surface;

pub use error::Error;
