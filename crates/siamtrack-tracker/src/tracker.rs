use rayon::prelude::*;
use siamtrack_image::Image;

use crate::{
    bbox::{BoundingBox, Center},
    config::TrackerConfig,
    correlation::correlate,
    embedding::Embedding,
    error::TrackerError,
    exemplar::{reference_size, search_size, to_tensor, ScaleFactors},
    features::FeatureMap,
    response::{cosine_window, resolve},
    sampler::sample,
};

/// Everything the tracker carries from one frame to the next.
#[derive(Debug, Clone)]
pub struct TrackerState {
    /// Current target centre in frame pixels.
    pub center: Center,
    /// Current target `[width, height]`.
    pub target_size: [f32; 2],
    /// Side of the region mapped to the exemplar patch.
    pub reference_size: f32,
    /// Side of the region mapped to the search patch at unit scale.
    pub search_size: f32,
    /// Embedding of the exemplar taken at initialization.
    pub reference_embedding: FeatureMap,
    /// Normalized Hann window over the upsampled response grid.
    pub cosine_window: Image<f32, 1>,
    /// Scale hypotheses searched on every frame.
    pub scale_factors: ScaleFactors,
}

/// Single-target Siamese tracker.
///
/// The tracker is created uninitialized. [`SiamTracker::init`] embeds the target once and
/// every call to [`SiamTracker::track`] searches the next frame around the previous
/// position over all scale hypotheses.
///
/// # Example
///
/// ```
/// use siamtrack_image::{Image, ImageSize};
/// use siamtrack_tracker::{BoundingBox, PooledEmbedding, SiamTracker, TrackerConfig};
///
/// let frame = Image::<f32, 3>::from_size_val(ImageSize { width: 64, height: 64 }, 0.5).unwrap();
/// let mut tracker = SiamTracker::new(TrackerConfig::default(), PooledEmbedding::new(8)).unwrap();
///
/// tracker.init(&frame, &BoundingBox::new(24.0, 24.0, 16.0, 16.0)).unwrap();
/// let bbox = tracker.track(&frame).unwrap();
///
/// assert!(bbox.is_valid());
/// ```
#[derive(Debug)]
pub struct SiamTracker<E: Embedding> {
    config: TrackerConfig,
    embedding: E,
    state: Option<TrackerState>,
}

impl<E: Embedding> SiamTracker<E> {
    /// Create an uninitialized tracker.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::InvalidConfig`] if the configuration is out of range.
    pub fn new(config: TrackerConfig, embedding: E) -> Result<Self, TrackerError> {
        config.validate()?;
        Ok(Self {
            config,
            embedding,
            state: None,
        })
    }

    /// The tracker configuration.
    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// The embedding function.
    pub fn embedding(&self) -> &E {
        &self.embedding
    }

    /// True once [`SiamTracker::init`] has succeeded.
    pub fn is_initialized(&self) -> bool {
        self.state.is_some()
    }

    /// The current state, if initialized.
    pub fn state(&self) -> Option<&TrackerState> {
        self.state.as_ref()
    }

    /// Drop the current target and return to the uninitialized state.
    pub fn reset(&mut self) {
        self.state = None;
    }

    /// Start tracking the target inside `bbox` on `image`.
    ///
    /// Re-initializing replaces the previous target.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::InvalidBoundingBox`] if the box has a non-positive side, or
    /// any error raised while sampling or embedding the exemplar.
    pub fn init<const C: usize>(
        &mut self,
        image: &Image<f32, C>,
        bbox: &BoundingBox,
    ) -> Result<(), TrackerError> {
        if !bbox.is_valid() {
            return Err(TrackerError::InvalidBoundingBox {
                width: bbox.w,
                height: bbox.h,
            });
        }

        let center = bbox.center();
        let z_size = reference_size(bbox, self.config.context_amount);
        let x_size = search_size(z_size, self.config.exemplar_size, self.config.instance_size);

        let exemplar = sample(image, center, z_size, self.config.exemplar_size)?;
        let reference_embedding = self.embedding.embed(&to_tensor(&exemplar)?)?;

        let state = TrackerState {
            center,
            target_size: bbox.size(),
            reference_size: z_size,
            search_size: x_size,
            reference_embedding,
            cosine_window: cosine_window(self.config.upscale_size)?,
            scale_factors: ScaleFactors::new(self.config.scale_num, self.config.scale_step)?,
        };

        log::info!(
            "tracker initialized at ({:.1}, {:.1}), target {:.1}x{:.1}, exemplar region {:.1}, search region {:.1}",
            center.x,
            center.y,
            bbox.w,
            bbox.h,
            z_size,
            x_size
        );

        self.state = Some(state);
        Ok(())
    }

    /// Locate the target in the next frame and return its box.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::NotInitialized`] before [`SiamTracker::init`], or any error
    /// raised by the embedding.
    pub fn track<const C: usize>(
        &mut self,
        image: &Image<f32, C>,
    ) -> Result<BoundingBox, TrackerError> {
        let state = self.state.as_mut().ok_or(TrackerError::NotInitialized)?;
        let config = &self.config;
        let (center, x_size) = (state.center, state.search_size);

        let tensors = state
            .scale_factors
            .as_slice()
            .par_iter()
            .map(|&s| {
                let patch = sample(image, center, x_size * s, config.instance_size)?;
                to_tensor(&patch)
            })
            .collect::<Result<Vec<_>, TrackerError>>()?;

        let embeddings = self.embedding.embed_batch(&tensors)?;
        let responses = correlate(&state.reference_embedding, &embeddings)?;
        let resolution = resolve(
            &responses,
            &state.scale_factors,
            &state.cosine_window,
            config,
            state.search_size,
        )?;

        let [dx, dy] = resolution.displacement;
        state.center.x += dx;
        state.center.y += dy;

        let chosen = state
            .scale_factors
            .get(resolution.scale_index)
            .unwrap_or(1.0);
        let scale = (1.0 - config.scale_lr) + config.scale_lr * chosen;
        state.reference_size *= scale;
        state.search_size *= scale;
        state.target_size[0] *= scale;
        state.target_size[1] *= scale;

        log::debug!(
            "scale {} ({:.4}), peak {:?}, displacement ({:.2}, {:.2}), centre ({:.1}, {:.1})",
            resolution.scale_index,
            chosen,
            resolution.peak,
            dx,
            dy,
            state.center.x,
            state.center.y
        );

        Ok(BoundingBox::from_center_size(
            state.center,
            state.target_size,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::SiamTracker;
    use crate::{
        bbox::BoundingBox, config::TrackerConfig, embedding::PooledEmbedding,
        error::TrackerError,
    };
    use siamtrack_image::{Image, ImageSize};

    fn tracker() -> Result<SiamTracker<PooledEmbedding>, TrackerError> {
        SiamTracker::new(TrackerConfig::default(), PooledEmbedding::new(8))
    }

    fn frame() -> Result<Image<f32, 3>, TrackerError> {
        Ok(Image::from_size_val(
            ImageSize {
                width: 48,
                height: 48,
            },
            0.25,
        )?)
    }

    #[test]
    fn track_before_init_fails() -> Result<(), TrackerError> {
        let mut tracker = tracker()?;
        assert!(!tracker.is_initialized());
        assert!(matches!(
            tracker.track(&frame()?),
            Err(TrackerError::NotInitialized)
        ));
        Ok(())
    }

    #[test]
    fn init_rejects_empty_box() -> Result<(), TrackerError> {
        let mut tracker = tracker()?;
        for bbox in [
            BoundingBox::new(10.0, 10.0, 0.0, 5.0),
            BoundingBox::new(10.0, 10.0, 5.0, -1.0),
        ] {
            assert!(matches!(
                tracker.init(&frame()?, &bbox),
                Err(TrackerError::InvalidBoundingBox { .. })
            ));
        }
        assert!(!tracker.is_initialized());
        Ok(())
    }

    #[test]
    fn init_builds_state() -> Result<(), TrackerError> {
        let mut tracker = tracker()?;
        tracker.init(&frame()?, &BoundingBox::new(14.0, 14.0, 20.0, 20.0))?;

        let state = tracker.state().ok_or(TrackerError::NotInitialized)?;
        approx::assert_relative_eq!(state.reference_size, 40.0);
        approx::assert_relative_eq!(state.search_size, 40.0 * 255.0 / 127.0);
        assert_eq!(state.reference_embedding.shape(), [3, 15, 15]);
        assert_eq!(state.scale_factors.len(), 3);
        assert_eq!(state.cosine_window.width(), 272);

        tracker.reset();
        assert!(tracker.state().is_none());
        Ok(())
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = TrackerConfig {
            scale_num: 2,
            ..Default::default()
        };
        assert!(SiamTracker::new(config, PooledEmbedding::new(8)).is_err());
    }

    #[test]
    fn track_on_constant_frame_keeps_size_bounded() -> Result<(), TrackerError> {
        let mut tracker = tracker()?;
        let image = frame()?;
        tracker.init(&image, &BoundingBox::new(14.0, 14.0, 20.0, 20.0))?;

        for _ in 0..3 {
            let bbox = tracker.track(&image)?;
            assert!(bbox.is_valid());
            assert!(bbox.w > 15.0 && bbox.w < 25.0);
        }
        Ok(())
    }
}
