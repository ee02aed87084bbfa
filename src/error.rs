//! Errors raised at the display boundary. The numeric core cannot fail.

use thiserror::Error;

use crate::screen::{PixelRect, Size};

#[derive(Debug, Error)]
pub enum Error {
    #[error("surface is already locked")]
    AlreadyLocked,

    #[error("surface must be locked before writing pixels")]
    NotLocked,

    #[error("pixel ({x}, {y}) is outside the {}x{} surface", .size.width, .size.height)]
    PixelOutOfBounds { x: u32, y: u32, size: Size },

    #[error("{rect:?} does not fit on the {}x{} surface", .size.width, .size.height)]
    RectOutOfBounds { rect: PixelRect, size: Size },

    #[error("no GPU adapter found")]
    NoAdapter,

    #[error("the window surface supports no texture formats on this adapter")]
    NoSurfaceFormat,

    #[error("failed to create device: {0}")]
    DeviceCreation(#[from] wgpu::RequestDeviceError),

    #[error("failed to acquire the next frame: {0}")]
    Frame(#[from] wgpu::SurfaceError),
}
