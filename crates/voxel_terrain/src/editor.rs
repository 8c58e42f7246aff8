//! VoxelEditor - sphere carving.
//!
//! A carve raises sample values inside the sphere toward a carved field that
//! is positive (empty) at the centre and zero at the rim:
//!
//! ```text
//! d       = |center - sample|          (voxel units)
//! carved  = (r - d) * voxel_size
//! t       = saturate((r - d) / r)
//! value'  = max(value, lerp(value, carved, t))
//! grad'   = lerp(grad, normalize(center - sample), t)   where value' > value
//! ```
//!
//! Values only ever go up, so carving removes solid and never adds it.
//!
//! Buffers are carved in place only when no mesh task is reading them.
//! Otherwise the carve waits on the chunk and the scheduler applies it when
//! the task completes.

use glam::Vec3;
use tracing::debug;

use crate::chunk::{Chunk, ChunkCoord};
use crate::chunk_store::ChunkStore;
use crate::hooks::DebrisSink;
use crate::types::MinMaxAABB;
use crate::voxel_buffer::VoxelBuffer;

/// Sphere subtraction request in world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SphereCarve {
  pub center: Vec3,
  pub radius: f32,
}

impl SphereCarve {
  pub fn new(center: Vec3, radius: f32) -> Self {
    Self { center, radius }
  }

  /// Zero, negative and NaN radii carve nothing.
  #[inline]
  pub fn is_noop(&self) -> bool {
    !(self.radius > 0.0)
  }

  /// True when the sphere reaches any sample of the chunk.
  ///
  /// The sampled region runs one voxel past the chunk's minimum corner: the
  /// mesher reads that apron to close the seam with the lower neighbour.
  pub fn touches(&self, coord: ChunkCoord, chunk_size: f32, voxel_size: f32) -> bool {
    if self.is_noop() {
      return false;
    }
    let bounds = coord.aabb(chunk_size);
    let min = Vec3::from_array(bounds.min) - Vec3::splat(voxel_size);
    MinMaxAABB::new(min.to_array(), bounds.max).distance_to_point(self.center) < self.radius
  }
}

/// Per-buffer carve statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BufferCarve {
  /// Samples inside the clamped bounding box.
  pub visited: usize,
  /// Samples whose value increased.
  pub changed: usize,
  /// Owned samples that went from solid to empty.
  pub debris: usize,
}

/// Result of one [`subtract_sphere`] call.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CarveReport {
  /// Chunks carved immediately, ascending.
  pub carved: Vec<ChunkCoord>,
  /// Chunks whose buffer was busy; the carve is queued on them.
  pub deferred: Vec<ChunkCoord>,
  pub voxels_changed: usize,
  pub debris: usize,
}

/// Carve one buffer in place.
pub fn carve_buffer<D: DebrisSink + ?Sized>(
  buffer: &mut VoxelBuffer,
  carve: &SphereCarve,
  debris: &mut D,
) -> BufferCarve {
  let mut outcome = BufferCarve::default();
  if carve.is_noop() {
    return outcome;
  }

  let layout = buffer.layout();
  let voxel_size = buffer.voxel_size();
  let center = buffer.world_to_sample_space(carve.center);
  let radius = carve.radius / voxel_size;

  let max = Vec3::splat((layout.samples_per_axis() - 1) as f32);
  let lo = (center - radius).floor().clamp(Vec3::ZERO, max).as_uvec3();
  let hi = (center + radius).ceil().clamp(Vec3::ZERO, max).as_uvec3();

  for x in lo.x as usize..=hi.x as usize {
    for y in lo.y as usize..=hi.y as usize {
      for z in lo.z as usize..=hi.z as usize {
        outcome.visited += 1;

        let dir_to = center - Vec3::new(x as f32, y as f32, z as f32);
        let inside = radius - dir_to.length();
        if inside <= 0.0 {
          continue;
        }

        let t = (inside / radius).clamp(0.0, 1.0);
        let carved = inside * voxel_size;
        let voxel = buffer.get_mut(x, y, z);
        let old = voxel.value;
        let new = old.max(old + (carved - old) * t);
        if new <= old {
          continue;
        }

        voxel.value = new;
        voxel.gradient = voxel.gradient.lerp(dir_to.normalize_or_zero(), t);
        let material = voxel.material;
        outcome.changed += 1;

        if old < 0.0 && new >= 0.0 && layout.is_owned_sample(x, y, z) {
          outcome.debris += 1;
          debris.on_debris(buffer.sample_world_position(x, y, z), material);
        }
      }
    }
  }

  outcome
}

/// Carve a chunk's buffer now if nothing is reading it, else queue the carve.
///
/// Returns `None` when deferred. Chunks with no buffer and no generation in
/// flight are skipped (`Some` with zero counts).
pub fn carve_chunk<D: DebrisSink + ?Sized>(
  chunk: &mut Chunk,
  carve: &SphereCarve,
  debris: &mut D,
) -> Option<BufferCarve> {
  if chunk.is_busy() {
    chunk.pending_carves.push(*carve);
    return None;
  }
  let Some(voxels) = &chunk.voxels else {
    return Some(BufferCarve::default());
  };
  let Some(mut buffer) = voxels.try_write() else {
    chunk.pending_carves.push(*carve);
    return None;
  };

  let outcome = carve_buffer(&mut buffer, carve, debris);
  drop(buffer);
  if outcome.changed > 0 {
    chunk.needs_remesh = true;
  }
  Some(outcome)
}

/// Apply queued carves to an idle chunk, in arrival order.
///
/// Returns how many carves were applied. Leaves the queue untouched while a
/// task still holds the chunk.
pub fn apply_pending<D: DebrisSink + ?Sized>(chunk: &mut Chunk, debris: &mut D) -> usize {
  if chunk.is_busy() || chunk.pending_carves.is_empty() || chunk.voxels.is_none() {
    return 0;
  }

  let carves = std::mem::take(&mut chunk.pending_carves);
  let mut applied = 0;
  for (i, carve) in carves.iter().enumerate() {
    if carve_chunk(chunk, carve, debris).is_none() {
      // Buffer still locked elsewhere: keep the rest for the next attempt.
      chunk.pending_carves.extend_from_slice(&carves[i + 1..]);
      break;
    }
    applied += 1;
  }
  applied
}

/// Subtract a sphere from every chunk it reaches.
///
/// Chunks outside the sphere are never flagged for remeshing. A chunk is only
/// flagged when at least one of its samples changed.
pub fn subtract_sphere<D: DebrisSink + ?Sized>(
  store: &mut ChunkStore,
  carve: SphereCarve,
  voxel_size: f32,
  debris: &mut D,
) -> CarveReport {
  let mut report = CarveReport::default();
  if carve.is_noop() {
    return report;
  }

  let size = store.chunk_size();
  let min = ChunkCoord::from_world(carve.center - Vec3::splat(carve.radius), size);
  // Reaching one voxel into the next chunk up lands in its apron.
  let max = ChunkCoord::from_world(carve.center + Vec3::splat(carve.radius + voxel_size), size);

  for x in min.x..=max.x {
    for y in min.y..=max.y {
      for z in min.z..=max.z {
        let coord = ChunkCoord::new(x, y, z);
        if !carve.touches(coord, size, voxel_size) {
          continue;
        }
        let Some(chunk) = store.get_mut(coord) else {
          continue;
        };

        match carve_chunk(chunk, &carve, debris) {
          Some(outcome) if outcome.changed > 0 => {
            report.carved.push(coord);
            report.voxels_changed += outcome.changed;
            report.debris += outcome.debris;
          }
          Some(_) => {}
          None => {
            debug!(%coord, "carve deferred: buffer busy");
            report.deferred.push(coord);
          }
        }
      }
    }
  }

  report
}

#[cfg(test)]
#[path = "editor_test.rs"]
mod editor_test;
