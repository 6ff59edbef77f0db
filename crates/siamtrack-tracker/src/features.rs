use crate::error::TrackerError;

/// A dense `f32` feature map stored channel-first, `[channels, height, width]`.
///
/// Used both for the normalized patches fed to an [`crate::Embedding`] and for the
/// embeddings it produces.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMap {
    shape: [usize; 3],
    data: Vec<f32>,
}

impl FeatureMap {
    /// Create a feature map from its `[channels, height, width]` shape and data.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::ShapeMismatch`] if the data length does not match the shape.
    pub fn new(shape: [usize; 3], data: Vec<f32>) -> Result<Self, TrackerError> {
        let numel = shape.iter().product::<usize>();
        if data.len() != numel {
            return Err(TrackerError::ShapeMismatch(format!(
                "feature map of shape {shape:?} needs {numel} values, got {}",
                data.len()
            )));
        }
        Ok(Self { shape, data })
    }

    /// Create a zero-filled feature map.
    pub fn zeros(shape: [usize; 3]) -> Self {
        Self {
            shape,
            data: vec![0.0; shape.iter().product()],
        }
    }

    /// The `[channels, height, width]` shape.
    pub fn shape(&self) -> [usize; 3] {
        self.shape
    }

    /// Number of channels.
    pub fn channels(&self) -> usize {
        self.shape[0]
    }

    /// Number of rows per channel.
    pub fn height(&self) -> usize {
        self.shape[1]
    }

    /// Number of columns per channel.
    pub fn width(&self) -> usize {
        self.shape[2]
    }

    /// The contiguous channel-first data.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// One channel plane as a row-major slice.
    pub fn plane(&self, channel: usize) -> &[f32] {
        let plane = self.shape[1] * self.shape[2];
        &self.data[channel * plane..(channel + 1) * plane]
    }
}
