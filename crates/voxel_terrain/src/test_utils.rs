//! Fixtures shared by unit tests across modules.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use glam::Vec3;

use crate::density::{DensityField, NoiseTerrain, PlaneField, SphereField};
use crate::layout::ChunkLayout;
use crate::types::Voxel;
use crate::voxel_buffer::VoxelBuffer;

// =============================================================================
// Buffers
// =============================================================================

/// Flat ground at world y = 0, with the chunk origin shifted down so the
/// surface sits at local height `surface_local` (keep it off the lattice).
pub fn flat_buffer(voxels_per_axis: usize, surface_local: f32) -> VoxelBuffer {
  let origin = Vec3::new(0.0, -surface_local, 0.0);
  VoxelBuffer::generate(&PlaneField::new(0.0), ChunkLayout::new(voxels_per_axis), origin, 1.0)
}

/// Ball of `radius` voxels centred at local position `center`.
pub fn sphere_buffer(voxels_per_axis: usize, center: Vec3, radius: f32) -> VoxelBuffer {
  VoxelBuffer::generate(
    &SphereField::new(center, radius),
    ChunkLayout::new(voxels_per_axis),
    Vec3::ZERO,
    1.0,
  )
}

/// Rolling terrain whose surface passes through the middle of the chunk.
pub fn noise_buffer(voxels_per_axis: usize, seed: u32) -> VoxelBuffer {
  let n = voxels_per_axis as f32;
  let field = NoiseTerrain::with_shape(seed, 0.08, 3)
    .with_base_height(n * 0.5)
    .with_amplitude(n * 0.25)
    .with_overhang(2.0);
  VoxelBuffer::generate(&field, ChunkLayout::new(voxels_per_axis), Vec3::ZERO, 1.0)
}

/// Buffer of uniform samples.
pub fn uniform_buffer(voxels_per_axis: usize, value: f32) -> VoxelBuffer {
  let layout = ChunkLayout::new(voxels_per_axis);
  let voxels = vec![Voxel::new(value, Vec3::Y, 0); layout.sample_count()];
  VoxelBuffer::from_voxels(layout, Vec3::ZERO, 1.0, voxels)
}

// =============================================================================
// Fields
// =============================================================================

/// Field that blocks every sample until its gate opens.
///
/// Lets tests hold a chunk in the `Voxelizing` state for as long as needed.
pub struct GatedField<F> {
  inner: F,
  open: Arc<AtomicBool>,
  calls: Arc<AtomicUsize>,
}

/// Test-side handle for a [`GatedField`].
#[derive(Clone)]
pub struct Gate {
  open: Arc<AtomicBool>,
  calls: Arc<AtomicUsize>,
}

impl Gate {
  pub fn open(&self) {
    self.open.store(true, Ordering::Release);
  }

  pub fn close(&self) {
    self.open.store(false, Ordering::Release);
  }

  /// Samples requested so far (including blocked ones).
  pub fn calls(&self) -> usize {
    self.calls.load(Ordering::Acquire)
  }
}

impl<F: DensityField> GatedField<F> {
  /// Wrap `inner` behind a closed gate.
  pub fn new(inner: F) -> (Self, Gate) {
    let open = Arc::new(AtomicBool::new(false));
    let calls = Arc::new(AtomicUsize::new(0));
    let gate = Gate {
      open: open.clone(),
      calls: calls.clone(),
    };
    (Self { inner, open, calls }, gate)
  }
}

impl<F: DensityField> DensityField for GatedField<F> {
  fn sample(&self, world_pos: Vec3) -> Voxel {
    self.calls.fetch_add(1, Ordering::AcqRel);
    while !self.open.load(Ordering::Acquire) {
      std::thread::sleep(Duration::from_millis(1));
    }
    self.inner.sample(world_pos)
  }
}

// =============================================================================
// Polling
// =============================================================================

/// Call `step` until it returns true, sleeping 1ms between attempts.
///
/// # Panics
/// After `max_iterations` attempts.
pub fn poll_until(max_iterations: usize, mut step: impl FnMut() -> bool) {
  for _ in 0..max_iterations {
    if step() {
      return;
    }
    std::thread::sleep(Duration::from_millis(1));
  }
  panic!("condition not reached after {max_iterations} polls");
}
