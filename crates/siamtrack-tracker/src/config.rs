use serde::{Deserialize, Serialize};

use crate::error::TrackerError;

/// Configuration of the Siamese tracker.
///
/// The defaults are the constants the embedding was trained with. Every field can be
/// overridden from JSON; missing fields keep their default value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Side of the reference (exemplar) patch fed to the embedding.
    pub exemplar_size: usize,
    /// Side of each search (instance) patch fed to the embedding.
    pub instance_size: usize,
    /// Total stride of the embedding function.
    pub stride: usize,
    /// Context margin added around the target, as a fraction of `w + h`.
    pub context_amount: f32,
    /// Side of the upsampled response maps.
    pub upscale_size: usize,
    /// Number of scale hypotheses, must be odd.
    pub scale_num: usize,
    /// Ratio between consecutive scale hypotheses.
    pub scale_step: f32,
    /// Smoothing factor of the scale update.
    pub scale_lr: f32,
    /// Discount applied to the non-identity scale hypotheses.
    pub scale_penalty: f32,
    /// Weight of the cosine window in the final response.
    pub window_influence: f32,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            exemplar_size: 127,
            instance_size: 255,
            stride: 8,
            context_amount: 0.5,
            upscale_size: 272,
            scale_num: 3,
            scale_step: 1.0375,
            scale_lr: 0.59,
            scale_penalty: 0.9745,
            window_influence: 0.176,
        }
    }
}

impl TrackerConfig {
    /// Parse a configuration from a JSON document and validate it.
    ///
    /// ```
    /// use siamtrack_tracker::TrackerConfig;
    ///
    /// let config = TrackerConfig::from_json_str(r#"{ "scale_num": 5 }"#).unwrap();
    /// assert_eq!(config.scale_num, 5);
    /// assert_eq!(config.exemplar_size, 127);
    /// ```
    pub fn from_json_str(json: &str) -> Result<Self, TrackerError> {
        let config: TrackerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Side of the raw response maps, `(instance - exemplar) / stride + 1`.
    pub fn score_size(&self) -> usize {
        self.instance_size.saturating_sub(self.exemplar_size) / self.stride.max(1) + 1
    }

    /// Check that every value is inside its valid range.
    pub fn validate(&self) -> Result<(), TrackerError> {
        let invalid = |msg: String| Err(TrackerError::InvalidConfig(msg));

        if self.exemplar_size == 0 || self.stride == 0 {
            return invalid(format!(
                "exemplar_size ({}) and stride ({}) must be positive",
                self.exemplar_size, self.stride
            ));
        }
        if self.instance_size < self.exemplar_size {
            return invalid(format!(
                "instance_size ({}) must not be smaller than exemplar_size ({})",
                self.instance_size, self.exemplar_size
            ));
        }
        if self.upscale_size < 2 {
            return invalid(format!("upscale_size ({}) must be at least 2", self.upscale_size));
        }
        if self.scale_num % 2 == 0 {
            return invalid(format!("scale_num ({}) must be odd", self.scale_num));
        }
        if !(self.scale_step > 1.0 && self.scale_step.is_finite()) {
            return invalid(format!("scale_step ({}) must be > 1", self.scale_step));
        }
        if !(0.0..=1.0).contains(&self.scale_lr) {
            return invalid(format!("scale_lr ({}) must be in [0, 1]", self.scale_lr));
        }
        if !(self.scale_penalty > 0.0 && self.scale_penalty <= 1.0) {
            return invalid(format!(
                "scale_penalty ({}) must be in (0, 1]",
                self.scale_penalty
            ));
        }
        if !(0.0..=1.0).contains(&self.window_influence) {
            return invalid(format!(
                "window_influence ({}) must be in [0, 1]",
                self.window_influence
            ));
        }
        if !(self.context_amount >= 0.0 && self.context_amount.is_finite()) {
            return invalid(format!(
                "context_amount ({}) must be non-negative",
                self.context_amount
            ));
        }

        Ok(())
    }
}
