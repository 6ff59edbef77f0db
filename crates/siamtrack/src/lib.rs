//! Single-target Siamese visual tracking with active camera control.
//!
//! This crate re-exports the building blocks of the workspace:
//!
//! - [`image`]: the interleaved image container.
//! - [`imgproc`]: resampling, cropping, padding and window functions.
//! - [`tracker`]: the tracker, the camera policy and the evaluation loop.

#[doc(inline)]
pub use siamtrack_image as image;

#[doc(inline)]
pub use siamtrack_imgproc as imgproc;

#[doc(inline)]
pub use siamtrack_tracker as tracker;
