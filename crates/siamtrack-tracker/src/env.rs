use rand::{rngs::StdRng, Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use siamtrack_image::{Image, ImageSize};

use crate::{bbox::Center, camera::CameraCommand, error::TrackerError};

/// An RGB observation with values in `[0, 1]`.
pub type Frame = Image<f32, 3>;

/// Result of advancing an environment by one command.
#[derive(Debug, Clone)]
pub struct Step {
    /// The observation after the command.
    pub frame: Frame,
    /// Reward for this step.
    pub reward: f32,
    /// True when the episode is over.
    pub done: bool,
}

/// An interactive scene observed through a steerable camera.
pub trait Environment {
    /// Size of the frames the environment renders.
    fn frame_size(&self) -> ImageSize;

    /// Start a new episode and return the first observation.
    fn reset(&mut self) -> Result<Frame, TrackerError>;

    /// Begin target motion. Called once the tracker has been initialized.
    fn start(&mut self) -> Result<(), TrackerError> {
        Ok(())
    }

    /// Apply a camera command and advance the scene.
    fn step(&mut self, command: CameraCommand) -> Result<Step, TrackerError>;

    /// Release the environment. Further steps fail.
    fn close(&mut self);
}

/// Parameters of [`SyntheticEnvironment`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntheticConfig {
    /// Side of the square frames.
    pub frame_size: usize,
    /// Side of the square target.
    pub target_side: f32,
    /// Image shift produced by one degree of pan or tilt.
    pub pixels_per_degree: f32,
    /// Camera step applied per command, in degrees.
    pub step_degrees: f32,
    /// Largest per-step target motion along each axis, in pixels.
    pub drift: f32,
    /// Steps after which the episode ends.
    pub max_steps: usize,
    /// Seed of the target motion.
    pub seed: u64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            frame_size: 224,
            target_side: 36.0,
            pixels_per_degree: 1.0,
            step_degrees: 10.0,
            drift: 3.0,
            max_steps: 500,
            seed: 1,
        }
    }
}

/// A bright square moving over a textured plane, seen by a pan/tilt camera.
///
/// World coordinates are pixels at the default orientation with the origin at the frame
/// centre. A yaw of one degree shifts the view right by `pixels_per_degree`; a positive
/// pitch shifts it up. After [`Environment::start`] the target performs a seeded random
/// walk. The reward is one minus the distance of the target from the frame centre
/// relative to half the frame side, clamped to `[-1, 1]`.
#[derive(Debug)]
pub struct SyntheticEnvironment {
    config: SyntheticConfig,
    rng: StdRng,
    target: Center,
    yaw: f32,
    pitch: f32,
    steps: usize,
    moving: bool,
    closed: bool,
}

impl SyntheticEnvironment {
    /// Create an environment. Call [`Environment::reset`] before stepping.
    pub fn new(config: SyntheticConfig) -> Self {
        Self {
            config,
            rng: StdRng::seed_from_u64(config.seed),
            target: Center::default(),
            yaw: 0.0,
            pitch: 0.0,
            steps: 0,
            moving: false,
            closed: false,
        }
    }

    /// The environment parameters.
    pub fn config(&self) -> &SyntheticConfig {
        &self.config
    }

    /// True once [`Environment::close`] has been called.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Current target centre in frame pixels.
    pub fn target_position(&self) -> Center {
        let half = self.config.frame_size as f32 / 2.0;
        let ppd = self.config.pixels_per_degree;
        Center::new(
            half + self.target.x - self.yaw * ppd,
            half + self.target.y + self.pitch * ppd,
        )
    }

    fn reward(&self) -> f32 {
        let half = self.config.frame_size as f32 / 2.0;
        let pos = self.target_position();
        let dist = (pos.x - half).hypot(pos.y - half);
        (1.0 - dist / half).clamp(-1.0, 1.0)
    }

    fn target_visible(&self) -> bool {
        let side = self.config.frame_size as f32;
        let pos = self.target_position();
        (0.0..side).contains(&pos.x) && (0.0..side).contains(&pos.y)
    }

    fn render(&self) -> Result<Frame, TrackerError> {
        let side = self.config.frame_size;
        let half = side as f32 / 2.0;
        let ppd = self.config.pixels_per_degree;
        let (view_x, view_y) = (self.yaw * ppd, -self.pitch * ppd);
        let target = self.target_position();
        let target_half = self.config.target_side / 2.0;

        let mut frame = Image::<f32, 3>::from_size_val(
            ImageSize {
                width: side,
                height: side,
            },
            0.0f32,
        )?;

        frame
            .as_slice_mut()
            .par_chunks_exact_mut(side * 3)
            .enumerate()
            .for_each(|(y, row)| {
                let py = y as f32 + 0.5;
                for (x, px) in row.chunks_exact_mut(3).enumerate() {
                    let px_x = x as f32 + 0.5;
                    if (px_x - target.x).abs() <= target_half && (py - target.y).abs() <= target_half
                    {
                        px.copy_from_slice(&[0.95, 0.25, 0.2]);
                        continue;
                    }
                    // world-anchored texture so camera motion is visible
                    let wx = px_x - half + view_x;
                    let wy = py - half + view_y;
                    let t = 0.35 + 0.1 * (wx * 0.13).sin() * (wy * 0.09).cos();
                    px.copy_from_slice(&[t, t + 0.05, t - 0.05]);
                }
            });

        Ok(frame)
    }
}

impl Environment for SyntheticEnvironment {
    fn frame_size(&self) -> ImageSize {
        ImageSize {
            width: self.config.frame_size,
            height: self.config.frame_size,
        }
    }

    fn reset(&mut self) -> Result<Frame, TrackerError> {
        self.rng = StdRng::seed_from_u64(self.config.seed);
        self.target = Center::default();
        self.yaw = 0.0;
        self.pitch = 0.0;
        self.steps = 0;
        self.moving = false;
        self.closed = false;
        self.render()
    }

    fn start(&mut self) -> Result<(), TrackerError> {
        if self.closed {
            return Err(TrackerError::Environment("environment is closed".into()));
        }
        self.moving = true;
        Ok(())
    }

    fn step(&mut self, command: CameraCommand) -> Result<Step, TrackerError> {
        if self.closed {
            return Err(TrackerError::Environment("environment is closed".into()));
        }

        let (yaw, pitch) = command.delta(self.config.step_degrees);
        self.yaw += yaw;
        self.pitch += pitch;

        let drift = self.config.drift;
        if self.moving && drift > 0.0 {
            self.target.x += self.rng.random_range(-drift..=drift);
            self.target.y += self.rng.random_range(-drift..=drift);
        }
        self.steps += 1;

        let done = !self.target_visible() || self.steps >= self.config.max_steps;

        Ok(Step {
            frame: self.render()?,
            reward: self.reward(),
            done,
        })
    }

    fn close(&mut self) {
        self.closed = true;
    }
}
