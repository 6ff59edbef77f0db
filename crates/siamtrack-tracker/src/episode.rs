use serde::{Deserialize, Serialize};
use siamtrack_image::ImageSize;

use crate::{
    bbox::BoundingBox,
    camera::DiscreteCamera,
    embedding::Embedding,
    env::Environment,
    error::TrackerError,
    tracker::SiamTracker,
};

/// Summary of one evaluation episode.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EpisodeStats {
    /// Sum of the rewards of all steps.
    pub accumulated_reward: f32,
    /// Number of steps taken before the episode ended.
    pub episode_length: usize,
}

/// A square box of side `side` centred in a frame of `frame_size`.
///
/// ```
/// use siamtrack_image::ImageSize;
/// use siamtrack_tracker::{episode::centered_bbox, BoundingBox};
///
/// let bbox = centered_bbox(ImageSize { width: 224, height: 224 }, 36.0);
/// assert_eq!(bbox, BoundingBox::new(94.0, 94.0, 36.0, 36.0));
/// ```
pub fn centered_bbox(frame_size: ImageSize, side: f32) -> BoundingBox {
    BoundingBox::new(
        frame_size.width as f32 / 2.0 - side / 2.0,
        frame_size.height as f32 / 2.0 - side / 2.0,
        side,
        side,
    )
}

/// Run one closed-loop episode: track the target and steer the camera towards it.
///
/// The environment is reset, the tracker initialized on the first frame with
/// `initial_bbox`, then up to `max_steps` track/decide/step iterations are run until the
/// environment reports the end of the episode. The environment is closed on every exit
/// path, including errors.
///
/// # Errors
///
/// Returns the first error raised by the environment or the tracker.
pub fn run_episode<Env, E>(
    env: &mut Env,
    tracker: &mut SiamTracker<E>,
    camera: &DiscreteCamera,
    initial_bbox: &BoundingBox,
    max_steps: usize,
) -> Result<EpisodeStats, TrackerError>
where
    Env: Environment + ?Sized,
    E: Embedding,
{
    let result = episode_loop(env, tracker, camera, initial_bbox, max_steps);
    env.close();

    if let Err(err) = &result {
        log::warn!("episode aborted: {err}");
    }

    result
}

fn episode_loop<Env, E>(
    env: &mut Env,
    tracker: &mut SiamTracker<E>,
    camera: &DiscreteCamera,
    initial_bbox: &BoundingBox,
    max_steps: usize,
) -> Result<EpisodeStats, TrackerError>
where
    Env: Environment + ?Sized,
    E: Embedding,
{
    let mut stats = EpisodeStats::default();

    let mut frame = env.reset()?;
    tracker.init(&frame, initial_bbox)?;
    env.start()?;

    for _ in 0..max_steps {
        let bbox = tracker.track(&frame)?;
        let command = camera.move_towards(frame.size(), &bbox);
        let step = env.step(command)?;

        stats.accumulated_reward += step.reward;
        stats.episode_length += 1;
        frame = step.frame;

        if step.done {
            break;
        }
    }

    log::info!(
        "episode finished after {} steps, accumulated reward {:.3}",
        stats.episode_length,
        stats.accumulated_reward
    );

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        camera::CameraCommand,
        embedding::PooledEmbedding,
        env::{Frame, Step},
        TrackerConfig,
    };
    use siamtrack_image::Image;

    /// Environment that fails after a fixed number of steps and records whether it was closed.
    struct Failing {
        remaining: usize,
        closed: bool,
    }

    impl Environment for Failing {
        fn frame_size(&self) -> ImageSize {
            ImageSize {
                width: 32,
                height: 32,
            }
        }

        fn reset(&mut self) -> Result<Frame, TrackerError> {
            Ok(Image::from_size_val(self.frame_size(), 0.5)?)
        }

        fn step(&mut self, _command: CameraCommand) -> Result<Step, TrackerError> {
            if self.remaining == 0 {
                return Err(TrackerError::Environment("link lost".into()));
            }
            self.remaining -= 1;
            Ok(Step {
                frame: Image::from_size_val(self.frame_size(), 0.5)?,
                reward: 0.5,
                done: false,
            })
        }

        fn close(&mut self) {
            self.closed = true;
        }
    }

    #[test]
    fn centered_box_is_centred() {
        let bbox = centered_bbox(ImageSize { width: 100, height: 60 }, 20.0);
        assert_eq!(bbox.center().x, 50.0);
        assert_eq!(bbox.center().y, 30.0);
    }

    #[test]
    fn env_closed_on_error() -> Result<(), TrackerError> {
        let mut env = Failing {
            remaining: 2,
            closed: false,
        };
        let mut tracker = SiamTracker::new(TrackerConfig::default(), PooledEmbedding::new(8))?;
        let bbox = centered_bbox(env.frame_size(), 12.0);

        let result = run_episode(&mut env, &mut tracker, &DiscreteCamera::new(0.2), &bbox, 10);
        assert!(matches!(result, Err(TrackerError::Environment(_))));
        assert!(env.closed);
        Ok(())
    }

    #[test]
    fn episode_respects_max_steps() -> Result<(), TrackerError> {
        let mut env = Failing {
            remaining: 100,
            closed: false,
        };
        let mut tracker = SiamTracker::new(TrackerConfig::default(), PooledEmbedding::new(8))?;
        let bbox = centered_bbox(env.frame_size(), 12.0);

        let stats = run_episode(&mut env, &mut tracker, &DiscreteCamera::new(0.2), &bbox, 3)?;
        assert_eq!(stats.episode_length, 3);
        approx::assert_relative_eq!(stats.accumulated_reward, 1.5);
        assert!(env.closed);
        Ok(())
    }
}
