//! Per-chunk voxel storage and the shared handle passed to mesh tasks.
//!
//! ```text
//! ┌──────────────┐   clone (+1)   ┌─────────────┐
//! │    Chunk     ├───────────────►│  mesh task  │  read guard for the whole run
//! │ SharedVoxels │                └──────┬──────┘
//! └──────┬───────┘                       │ drop (-1)
//!        │ try_write (editor)            ▼
//!        ▼                         freed when the last handle drops
//!   carve in place
//! ```

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard, TryLockError, Weak};

use glam::Vec3;
use rayon::prelude::*;

use crate::density::DensityField;
use crate::layout::ChunkLayout;
use crate::types::Voxel;

/// Dense `(N + 2)³` array of samples for one chunk.
#[derive(Clone, Debug)]
pub struct VoxelBuffer {
  layout: ChunkLayout,
  /// World position of local lattice point (0, 0, 0), i.e. sample (1, 1, 1).
  origin: Vec3,
  voxel_size: f32,
  voxels: Vec<Voxel>,
}

impl VoxelBuffer {
  /// Wrap an existing sample array.
  ///
  /// # Panics
  /// If `voxels.len()` does not match the layout.
  pub fn from_voxels(layout: ChunkLayout, origin: Vec3, voxel_size: f32, voxels: Vec<Voxel>) -> Self {
    assert_eq!(
      voxels.len(),
      layout.sample_count(),
      "voxel buffer size does not match a {}³ chunk layout",
      layout.voxels_per_axis()
    );
    Self {
      layout,
      origin,
      voxel_size,
      voxels,
    }
  }

  /// Sample `field` at every lattice point of the chunk, apron included.
  ///
  /// Samples are independent, so the fill runs in parallel.
  ///
  /// # Panics
  /// If the field returns a non-finite value or gradient.
  pub fn generate<F: DensityField + ?Sized>(
    field: &F,
    layout: ChunkLayout,
    origin: Vec3,
    voxel_size: f32,
  ) -> Self {
    let mut voxels = vec![Voxel::default(); layout.sample_count()];

    voxels.par_iter_mut().enumerate().for_each(|(idx, voxel)| {
      let (x, y, z) = layout.sample_coord(idx);
      let world_pos = origin + layout.sample_local_position(x, y, z) * voxel_size;
      let sample = field.sample(world_pos);
      assert!(
        sample.is_finite(),
        "density field returned a non-finite sample at {world_pos}: {sample:?}"
      );
      *voxel = sample;
    });

    Self {
      layout,
      origin,
      voxel_size,
      voxels,
    }
  }

  #[inline]
  pub fn layout(&self) -> ChunkLayout {
    self.layout
  }

  #[inline]
  pub fn origin(&self) -> Vec3 {
    self.origin
  }

  #[inline]
  pub fn voxel_size(&self) -> f32 {
    self.voxel_size
  }

  #[inline]
  pub fn voxels(&self) -> &[Voxel] {
    &self.voxels
  }

  #[inline]
  pub fn voxels_mut(&mut self) -> &mut [Voxel] {
    &mut self.voxels
  }

  #[inline(always)]
  pub fn get(&self, x: usize, y: usize, z: usize) -> &Voxel {
    &self.voxels[self.layout.sample_index(x, y, z)]
  }

  #[inline(always)]
  pub fn get_mut(&mut self, x: usize, y: usize, z: usize) -> &mut Voxel {
    let idx = self.layout.sample_index(x, y, z);
    &mut self.voxels[idx]
  }

  /// World position of a sample.
  #[inline]
  pub fn sample_world_position(&self, x: usize, y: usize, z: usize) -> Vec3 {
    self.origin + self.layout.sample_local_position(x, y, z) * self.voxel_size
  }

  /// Convert a world position into sample-index space (fractional).
  #[inline]
  pub fn world_to_sample_space(&self, world_pos: Vec3) -> Vec3 {
    (world_pos - self.origin) / self.voxel_size + Vec3::splat(crate::layout::APRON as f32)
  }

  /// True when the buffer holds both solid and empty samples.
  pub fn has_surface_crossing(&self) -> bool {
    let first = self.voxels[0].is_solid();
    self.voxels.iter().any(|v| v.is_solid() != first)
  }
}

/// Reference-counted handle to a chunk's voxel buffer.
///
/// The owning chunk holds one handle; every in-flight mesh task holds
/// another. The buffer is freed when the last handle drops.
#[derive(Clone, Debug)]
pub struct SharedVoxels(Arc<RwLock<VoxelBuffer>>);

impl SharedVoxels {
  pub fn new(buffer: VoxelBuffer) -> Self {
    Self(Arc::new(RwLock::new(buffer)))
  }

  /// Shared read access. Blocks only while a carve is being applied.
  pub fn read(&self) -> RwLockReadGuard<'_, VoxelBuffer> {
    self.0.read().unwrap_or_else(|poisoned| poisoned.into_inner())
  }

  /// Exclusive access, or `None` while any reader is active.
  pub fn try_write(&self) -> Option<RwLockWriteGuard<'_, VoxelBuffer>> {
    match self.0.try_write() {
      Ok(guard) => Some(guard),
      Err(TryLockError::WouldBlock) => None,
      Err(TryLockError::Poisoned(err)) => panic!("voxel buffer lock poisoned: {err}"),
    }
  }

  /// Number of live handles (chunk + in-flight tasks).
  pub fn ref_count(&self) -> usize {
    Arc::strong_count(&self.0)
  }

  /// Weak observer, used to check that a buffer has been freed.
  pub fn downgrade(&self) -> Weak<RwLock<VoxelBuffer>> {
    Arc::downgrade(&self.0)
  }
}

#[cfg(test)]
#[path = "voxel_buffer_test.rs"]
mod voxel_buffer_test;
