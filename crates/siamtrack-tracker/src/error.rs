/// Errors that can occur while configuring or running the tracker.
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    /// Error related to image containers or image processing.
    #[error(transparent)]
    ImageError(#[from] siamtrack_image::ImageError),

    /// A crop or output size is not strictly positive.
    #[error("Invalid sampling geometry: size {size}, output size {out_size}")]
    InvalidGeometry {
        /// Requested crop side in source pixels.
        size: f32,
        /// Requested output side in pixels.
        out_size: usize,
    },

    /// The initial bounding box has a non-positive extent.
    #[error("Invalid bounding box: width {width}, height {height}")]
    InvalidBoundingBox {
        /// Width of the rejected box.
        width: f32,
        /// Height of the rejected box.
        height: f32,
    },

    /// `track` was called before `init`.
    #[error("The tracker must be initialized before tracking")]
    NotInitialized,

    /// A configuration value is out of its valid range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The configuration could not be parsed.
    #[error(transparent)]
    ConfigParse(#[from] serde_json::Error),

    /// Two buffers that must agree in shape do not.
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    /// The environment refused an operation.
    #[error("Environment error: {0}")]
    Environment(String),
}
