//! Error types for terrain configuration and startup.
//!
//! Runtime invariant violations (non-finite density samples, malformed
//! buffers) panic instead; nothing downstream could recover from them.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
  #[error("voxels_per_axis must be at least 1")]
  ZeroVoxelsPerAxis,

  #[error("voxel_size must be positive and finite, got {0}")]
  InvalidVoxelSize(f32),

  #[error("load_radius must be positive and finite, got {0}")]
  InvalidLoadRadius(f32),

  #[error("max_primary_tasks must be at least 1")]
  ZeroPrimaryTasks,

  #[error("mesher iter_strength must be non-negative and finite, got {0}")]
  InvalidIterStrength(f32),
}

/// Failure to construct a [`Terrain`](crate::terrain::Terrain).
#[derive(Debug, Error)]
pub enum TerrainError {
  #[error("invalid terrain config: {0}")]
  Config(#[from] ConfigError),

  #[error("failed to build worker pool: {0}")]
  WorkerPool(#[from] rayon::ThreadPoolBuildError),
}
