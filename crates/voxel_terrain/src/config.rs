//! TerrainConfig - chunk sizing, streaming radius and scheduler budget.

use serde::Deserialize;

use crate::error::ConfigError;
use crate::layout::{ChunkLayout, DEFAULT_VOXELS_PER_AXIS};
use crate::types::MesherConfig;

/// Configuration for chunk streaming, scheduling and meshing.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
  /// Voxels per chunk axis (N). Buffers hold (N + 2)³ samples.
  pub voxels_per_axis: usize,

  /// Distance between adjacent samples in world units.
  pub voxel_size: f32,

  /// Chunks whose bounds come within this distance of the viewer are loaded.
  pub load_radius: f32,

  /// Chunks allowed in the generation → mesh pipeline at once.
  pub max_primary_tasks: usize,

  /// Worker threads for generation and meshing (0 = one per CPU).
  pub worker_threads: usize,

  /// Vertex solve settings.
  pub mesher: MesherConfig,
}

impl Default for TerrainConfig {
  fn default() -> Self {
    Self {
      voxels_per_axis: DEFAULT_VOXELS_PER_AXIS,
      voxel_size: 1.0,
      load_radius: 48.0,
      max_primary_tasks: 1,
      worker_threads: 0,
      mesher: MesherConfig::default(),
    }
  }
}

impl TerrainConfig {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_voxels_per_axis(mut self, voxels_per_axis: usize) -> Self {
    self.voxels_per_axis = voxels_per_axis;
    self
  }

  pub fn with_voxel_size(mut self, size: f32) -> Self {
    self.voxel_size = size;
    self
  }

  pub fn with_load_radius(mut self, radius: f32) -> Self {
    self.load_radius = radius;
    self
  }

  pub fn with_max_primary_tasks(mut self, tasks: usize) -> Self {
    self.max_primary_tasks = tasks;
    self
  }

  pub fn with_worker_threads(mut self, threads: usize) -> Self {
    self.worker_threads = threads;
    self
  }

  pub fn with_mesher(mut self, mesher: MesherConfig) -> Self {
    self.mesher = mesher;
    self
  }

  /// Edge length of one chunk in world units (N × voxel_size).
  #[inline]
  pub fn chunk_size(&self) -> f32 {
    self.voxels_per_axis as f32 * self.voxel_size
  }

  /// Buffer layout derived from `voxels_per_axis`.
  ///
  /// # Panics
  /// If `voxels_per_axis` is zero; call [`validate`](Self::validate) first.
  #[inline]
  pub fn layout(&self) -> ChunkLayout {
    ChunkLayout::new(self.voxels_per_axis)
  }

  /// Check every option for values the terrain cannot run with.
  pub fn validate(&self) -> Result<(), ConfigError> {
    if self.voxels_per_axis == 0 {
      return Err(ConfigError::ZeroVoxelsPerAxis);
    }
    if !(self.voxel_size.is_finite() && self.voxel_size > 0.0) {
      return Err(ConfigError::InvalidVoxelSize(self.voxel_size));
    }
    if !(self.load_radius.is_finite() && self.load_radius > 0.0) {
      return Err(ConfigError::InvalidLoadRadius(self.load_radius));
    }
    if self.max_primary_tasks == 0 {
      return Err(ConfigError::ZeroPrimaryTasks);
    }
    let strength = self.mesher.iter_strength;
    if !(strength.is_finite() && strength >= 0.0) {
      return Err(ConfigError::InvalidIterStrength(strength));
    }
    Ok(())
  }
}
