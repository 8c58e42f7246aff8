//! Surface edge detection.
//!
//! An edge joins two samples adjacent along one axis. It is a surface edge
//! when exactly one end is solid. Every candidate pair is tested
//! independently, so detection is a parallel filter.
//!
//! ```text
//!   axis X: (N+1) × (N+2) × (N+2) candidates     grid = lower sample
//!   axis Y: (N+2) × (N+1) × (N+2) candidates     A = grid, B = grid + e_axis
//!   axis Z: (N+2) × (N+2) × (N+1) candidates
//! ```
//!
//! Output order is ascending: axis first, then grid index with Z innermost.

use glam::{UVec3, Vec3};
use rayon::prelude::*;

use super::AXIS_FLIP;
use crate::voxel_buffer::VoxelBuffer;

/// A lattice edge crossed by the iso surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Edge {
  /// 0 = X, 1 = Y, 2 = Z.
  pub axis: u8,
  /// Sample coordinate of the lower end.
  pub grid: UVec3,
  /// Interpolation factor of the crossing along the edge, in [0, 1].
  pub t: f32,
  /// Crossing position in sample space.
  pub position: Vec3,
  /// Unit normal interpolated from the end gradients.
  pub normal: Vec3,
  /// Winding selector for the quad emitted around this edge.
  pub flip: bool,
}

/// The two axes perpendicular to `axis`, in ascending order.
#[inline]
pub const fn perpendicular_axes(axis: usize) -> (usize, usize) {
  match axis {
    0 => (1, 2),
    1 => (0, 2),
    _ => (0, 1),
  }
}

/// Candidate grid extent along each axis for edges along `axis`.
#[inline]
fn candidate_dims(samples_per_axis: usize, axis: usize) -> [usize; 3] {
  let mut dims = [samples_per_axis; 3];
  dims[axis] -= 1;
  dims
}

/// Detect every surface edge in `buffer`, replacing the contents of `out`.
pub fn detect(buffer: &VoxelBuffer, out: &mut Vec<Edge>) {
  out.clear();
  let s = buffer.layout().samples_per_axis();

  for axis in 0..3 {
    let dims = candidate_dims(s, axis);
    let count = dims[0] * dims[1] * dims[2];

    out.par_extend((0..count).into_par_iter().filter_map(|i| {
      let grid = [i / (dims[1] * dims[2]), (i / dims[2]) % dims[1], i % dims[2]];
      edge_between(buffer, axis, grid)
    }));
  }
}

/// Build the edge from `grid` to `grid + e_axis`, or `None` if both ends
/// are on the same side of the surface.
#[inline]
pub fn edge_between(buffer: &VoxelBuffer, axis: usize, grid: [usize; 3]) -> Option<Edge> {
  let [x, y, z] = grid;
  let mut far = grid;
  far[axis] += 1;

  let a = buffer.get(x, y, z);
  let b = buffer.get(far[0], far[1], far[2]);
  if a.is_solid() == b.is_solid() {
    return None;
  }

  let t = ((0.0 - a.value) / (b.value - a.value)).clamp(0.0, 1.0);
  let pos_a = Vec3::new(x as f32, y as f32, z as f32);
  let mut pos_b = pos_a;
  pos_b[axis] += 1.0;

  Some(Edge {
    axis: axis as u8,
    grid: UVec3::new(x as u32, y as u32, z as u32),
    t,
    position: pos_a.lerp(pos_b, t),
    normal: a.gradient.lerp(b.gradient, t).normalize_or(Vec3::Y),
    flip: (a.value - b.value > 0.0) ^ AXIS_FLIP[axis],
  })
}

#[cfg(test)]
#[path = "edges_test.rs"]
mod edges_test;
