use serde::{Deserialize, Serialize};
use siamtrack_image::ImageSize;

use crate::bbox::BoundingBox;

/// A discrete pan/tilt command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CameraCommand {
    /// Keep the current orientation.
    Noop,
    /// Tilt up.
    Up,
    /// Tilt down.
    Down,
    /// Pan left.
    Left,
    /// Pan right.
    Right,
}

impl CameraCommand {
    /// The command as a `(yaw, pitch)` change in degrees for a step of `step_degrees`.
    ///
    /// ```
    /// use siamtrack_tracker::CameraCommand;
    ///
    /// assert_eq!(CameraCommand::Up.delta(10.0), (0.0, 10.0));
    /// assert_eq!(CameraCommand::Left.delta(10.0), (-10.0, 0.0));
    /// ```
    pub fn delta(&self, step_degrees: f32) -> (f32, f32) {
        match self {
            CameraCommand::Noop => (0.0, 0.0),
            CameraCommand::Up => (0.0, step_degrees),
            CameraCommand::Down => (0.0, -step_degrees),
            CameraCommand::Left => (-step_degrees, 0.0),
            CameraCommand::Right => (step_degrees, 0.0),
        }
    }
}

/// Choose the command that brings the centre of `bbox` back towards the frame centre.
///
/// The target offset is measured from the frame centre with the vertical axis pointing
/// up. Inside a dead zone of radius `deadzone_ratio * min(width, height)` nothing is done;
/// otherwise the frame is split into four sectors by its diagonals. Points on a diagonal
/// belong to the vertical sector.
pub fn decide(frame_size: ImageSize, bbox: &BoundingBox, deadzone_ratio: f32) -> CameraCommand {
    let (w, h) = (frame_size.width as f32, frame_size.height as f32);
    let center = bbox.center();

    let cx = center.x - w / 2.0;
    let cy = -(center.y - h / 2.0);
    let radius = deadzone_ratio * w.min(h);
    let k = h / w;

    if cx.hypot(cy) < radius {
        CameraCommand::Noop
    } else if cy >= (k * cx).abs() {
        CameraCommand::Up
    } else if cy <= -(k * cx).abs() {
        CameraCommand::Down
    } else if cx < 0.0 {
        CameraCommand::Left
    } else {
        CameraCommand::Right
    }
}

/// Camera that performs fixed-size discrete moves towards the tracked target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiscreteCamera {
    /// Dead-zone radius as a fraction of the shorter frame side.
    pub deadzone_ratio: f32,
    /// Size of a single move in degrees.
    pub step_degrees: f32,
}

impl Default for DiscreteCamera {
    fn default() -> Self {
        Self {
            deadzone_ratio: 0.25,
            step_degrees: 10.0,
        }
    }
}

impl DiscreteCamera {
    /// Create a camera with the given dead zone and the default step.
    pub fn new(deadzone_ratio: f32) -> Self {
        Self {
            deadzone_ratio,
            ..Default::default()
        }
    }

    /// The command for the current target box.
    pub fn move_towards(&self, frame_size: ImageSize, bbox: &BoundingBox) -> CameraCommand {
        decide(frame_size, bbox, self.deadzone_ratio)
    }

    /// The `(yaw, pitch)` change in degrees for the current target box.
    pub fn move_delta(&self, frame_size: ImageSize, bbox: &BoundingBox) -> (f32, f32) {
        self.move_towards(frame_size, bbox).delta(self.step_degrees)
    }
}
