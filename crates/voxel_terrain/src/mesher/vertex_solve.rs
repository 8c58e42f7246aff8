//! Per-cell vertex placement.
//!
//! Each crossing edge contributes a plane (crossing position, crossing
//! normal). The vertex starts at the mass point and is pushed toward the
//! planes by fixed-step gradient descent:
//!
//! ```text
//! for each iteration:
//!   force = mean over edges of  -n · d·|d|      d = n · (p - edge.position)
//!   p     = clamp(p + force · strength, cell_min, cell_min + 1)
//! ```
//!
//! Far planes pull harder than near ones. The clamp bounds the particle to its
//! cell's closed unit cube.

use glam::{UVec3, Vec3};
use rayon::prelude::*;

use super::cells::Cell;
use super::edges::Edge;
use crate::layout::ChunkLayout;
use crate::types::{MaterialId, MesherConfig};
use crate::voxel_buffer::VoxelBuffer;

/// Avoids division by zero when the vertex sits on a crossing.
const NORMAL_WEIGHT_EPSILON: f32 = 1e-4;

/// Solve vertex, normal and material for every active cell in parallel.
pub fn solve_cells(buffer: &VoxelBuffer, edges: &[Edge], cells: &mut [Cell], config: &MesherConfig) {
  let layout = buffer.layout();

  cells
    .par_iter_mut()
    .enumerate()
    .filter(|(_, cell)| cell.is_active())
    .for_each(|(index, cell)| {
      let cell_min = layout.cell_coord(index).as_vec3();
      let vertex = solve_vertex(cell, edges, cell_min, config);
      cell.vertex = vertex;
      cell.normal = interpolate_normal(cell, edges, vertex);
      cell.material = nearest_material(buffer, &layout, vertex);
    });
}

/// Iterate from the mass point toward the edge planes, staying in the cell.
pub fn solve_vertex(cell: &Cell, edges: &[Edge], cell_min: Vec3, config: &MesherConfig) -> Vec3 {
  let cell_max = cell_min + Vec3::ONE;
  let mut particle = cell.mass_point(edges).clamp(cell_min, cell_max);
  let inv_count = 1.0 / cell.edges.len().max(1) as f32;

  for _ in 0..config.max_iterations {
    let mut force = Vec3::ZERO;
    for &e in &cell.edges {
      let edge = &edges[e as usize];
      let distance = edge.normal.dot(particle - edge.position);
      force -= edge.normal * (distance * distance.abs());
    }
    particle = (particle + force * inv_count * config.iter_strength).clamp(cell_min, cell_max);
  }

  particle
}

/// Edge normals weighted by inverse distance to the solved vertex.
pub fn interpolate_normal(cell: &Cell, edges: &[Edge], vertex: Vec3) -> Vec3 {
  let sum: Vec3 = cell
    .edges
    .iter()
    .map(|&e| {
      let edge = &edges[e as usize];
      edge.normal / (vertex.distance(edge.position) + NORMAL_WEIGHT_EPSILON)
    })
    .sum();
  sum.normalize_or(Vec3::Y)
}

/// Material of the sample closest to `vertex`.
pub fn nearest_material(buffer: &VoxelBuffer, layout: &ChunkLayout, vertex: Vec3) -> MaterialId {
  let max = (layout.samples_per_axis() - 1) as f32;
  let sample: UVec3 = vertex.round().clamp(Vec3::ZERO, Vec3::splat(max)).as_uvec3();
  buffer.get(sample.x as usize, sample.y as usize, sample.z as usize).material
}

#[cfg(test)]
#[path = "vertex_solve_test.rs"]
mod vertex_solve_test;
