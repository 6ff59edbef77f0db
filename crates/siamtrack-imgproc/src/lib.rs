#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// cropping with out-of-image fill.
pub mod crop;

/// utilities for interpolation.
pub mod interpolation;

/// utility functions for resizing images.
pub mod resize;

/// window functions used as spatial priors.
pub mod window;
