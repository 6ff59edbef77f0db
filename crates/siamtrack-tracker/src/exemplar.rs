use siamtrack_image::Image;

use crate::{bbox::BoundingBox, error::TrackerError, features::FeatureMap};

/// Side of the square region around the target that maps to the exemplar patch.
///
/// A margin of `context * (w + h)` is added to both sides of the box and the geometric
/// mean of the padded extents is returned. With a zero context this is `sqrt(w * h)`.
///
/// ```
/// use siamtrack_tracker::{exemplar::reference_size, BoundingBox};
///
/// let bbox = BoundingBox::new(0.0, 0.0, 20.0, 20.0);
/// assert_eq!(reference_size(&bbox, 0.5), 40.0);
/// assert_eq!(reference_size(&bbox, 0.0), 20.0);
/// ```
pub fn reference_size(bbox: &BoundingBox, context: f32) -> f32 {
    let margin = context * (bbox.w + bbox.h);
    ((bbox.w + margin) * (bbox.h + margin)).sqrt()
}

/// Side of the search region, the reference side scaled by `instance / exemplar`.
pub fn search_size(reference_size: f32, exemplar_size: usize, instance_size: usize) -> f32 {
    reference_size / exemplar_size as f32 * instance_size as f32
}

/// Reorder an interleaved patch into a channel-first [`FeatureMap`].
///
/// Values are copied unchanged.
pub fn to_tensor<const C: usize>(patch: &Image<f32, C>) -> Result<FeatureMap, TrackerError> {
    let (rows, cols) = (patch.rows(), patch.cols());
    let plane = rows * cols;
    let mut data = vec![0f32; C * plane];

    for (i, pixel) in patch.as_slice().chunks_exact(C).enumerate() {
        for (c, &val) in pixel.iter().enumerate() {
            data[c * plane + i] = val;
        }
    }

    FeatureMap::new([C, rows, cols], data)
}

/// The ordered set of scale hypotheses searched on every frame.
///
/// Entry `i` is `step^(i - (n - 1) / 2)`; the middle entry is exactly `1.0`.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleFactors(Vec<f32>);

impl ScaleFactors {
    /// Build `num` factors around `1.0`.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::InvalidConfig`] if `num` is even or zero, or `step` is not
    /// strictly positive.
    ///
    /// ```
    /// use siamtrack_tracker::exemplar::ScaleFactors;
    ///
    /// let scales = ScaleFactors::new(3, 1.0375).unwrap();
    /// assert_eq!(scales.len(), 3);
    /// assert_eq!(scales.get(1), Some(1.0));
    /// assert!(scales.get(0).unwrap() < 1.0 && scales.get(2).unwrap() > 1.0);
    /// ```
    pub fn new(num: usize, step: f32) -> Result<Self, TrackerError> {
        if num % 2 == 0 {
            return Err(TrackerError::InvalidConfig(format!(
                "the number of scales must be odd, got {num}"
            )));
        }
        if !(step > 0.0 && step.is_finite()) {
            return Err(TrackerError::InvalidConfig(format!(
                "the scale step must be positive, got {step}"
            )));
        }

        let mid = (num / 2) as i32;
        let factors = (0..num as i32)
            .map(|i| if i == mid { 1.0 } else { step.powi(i - mid) })
            .collect();

        Ok(Self(factors))
    }

    /// Number of scale hypotheses.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false for a successfully built set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Index of the unscaled hypothesis.
    pub fn middle_index(&self) -> usize {
        self.0.len() / 2
    }

    /// The factor at `index`.
    pub fn get(&self, index: usize) -> Option<f32> {
        self.0.get(index).copied()
    }

    /// The factors in ascending order.
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    /// Iterate over the factors in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = &f32> {
        self.0.iter()
    }
}
