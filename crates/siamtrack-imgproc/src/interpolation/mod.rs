//! Pixel interpolation methods for image resampling.
//!
//! - **Bilinear**: linear interpolation between the four adjacent pixels
//! - **Bicubic**: Keys cubic convolution over the 4x4 neighbourhood

mod bicubic;
mod bilinear;
mod interpolate;

pub use interpolate::{interpolate_pixel, InterpolationMode};
