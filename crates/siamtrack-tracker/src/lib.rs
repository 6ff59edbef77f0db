#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]
//! The crate tracks one target per tracker instance: an exemplar patch is embedded once at
//! initialization and every new frame is searched over position and scale around the last
//! known centre. A discrete camera policy turns the tracked box into a pan/tilt command.

/// Bounding box and centre types.
pub mod bbox;

/// Discrete camera control policy.
pub mod camera;

/// Tracker configuration.
pub mod config;

/// Cross-correlation of reference and search embeddings.
pub mod correlation;

/// Embedding function contract and a fixed-function implementation.
pub mod embedding;

/// Environment contract and a synthetic environment.
pub mod env;

/// Episode evaluation loop.
pub mod episode;

/// Error types for the tracker crate.
pub mod error;

/// Exemplar and instance patch geometry.
pub mod exemplar;

/// Channel-first feature maps.
pub mod features;

/// Response map post-processing.
pub mod response;

/// Geometric sampler for fixed-size square patches.
pub mod sampler;

/// Tracker state machine.
pub mod tracker;

pub use bbox::{BoundingBox, Center};
pub use camera::{CameraCommand, DiscreteCamera};
pub use config::TrackerConfig;
pub use embedding::{Embedding, PooledEmbedding};
pub use env::{Environment, SyntheticConfig, SyntheticEnvironment};
pub use episode::{run_episode, EpisodeStats};
pub use error::TrackerError;
pub use features::FeatureMap;
pub use tracker::{SiamTracker, TrackerState};
