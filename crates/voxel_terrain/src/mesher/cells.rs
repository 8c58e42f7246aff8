//! Cell assembly: register each surface edge with the four cells around it.
//!
//! ```text
//!   looking down the edge axis (u, v = perpendicular axes, ascending)
//!
//!        v
//!        ▲
//!        │  (g-u)   │   (g)
//!        │──────────●──────────    ● = edge at grid g
//!        │ (g-u-v)  │  (g-v)
//!        └──────────────────► u
//! ```
//!
//! Runs serially: neighbouring edges write to the same cells.

use glam::Vec3;
use smallvec::SmallVec;

use super::edges::{perpendicular_axes, Edge};
use crate::layout::ChunkLayout;
use crate::types::MaterialId;

/// A cube has 12 edges.
pub const MAX_CELL_EDGES: usize = 12;

/// Per-pass dual cell.
#[derive(Clone, Debug)]
pub struct Cell {
  /// Indices into the pass edge list.
  pub edges: SmallVec<[u32; MAX_CELL_EDGES]>,
  /// Solved vertex in sample space.
  pub vertex: Vec3,
  pub normal: Vec3,
  pub material: MaterialId,
}

impl Default for Cell {
  fn default() -> Self {
    Self {
      edges: SmallVec::new(),
      vertex: Vec3::ZERO,
      normal: Vec3::Y,
      material: 0,
    }
  }
}

impl Cell {
  #[inline]
  pub fn is_active(&self) -> bool {
    !self.edges.is_empty()
  }

  /// Reset for a new pass, keeping the edge list allocation.
  #[inline]
  pub fn reset(&mut self) {
    self.edges.clear();
    self.vertex = Vec3::ZERO;
    self.normal = Vec3::Y;
    self.material = 0;
  }

  /// Mean of the registered crossing positions.
  pub fn mass_point(&self, edges: &[Edge]) -> Vec3 {
    let sum: Vec3 = self.edges.iter().map(|&e| edges[e as usize].position).sum();
    sum / self.edges.len().max(1) as f32
  }
}

/// Cells touching an edge, in registration order: g, g-u, g-v, g-u-v.
///
/// Coordinates may fall outside the cell grid; callers filter.
#[inline]
pub fn neighbour_cells(edge: &Edge) -> [[i64; 3]; 4] {
  let (u, v) = perpendicular_axes(edge.axis as usize);
  let g = [edge.grid.x as i64, edge.grid.y as i64, edge.grid.z as i64];

  let mut minus_u = g;
  minus_u[u] -= 1;
  let mut minus_v = g;
  minus_v[v] -= 1;
  let mut minus_uv = minus_u;
  minus_uv[v] -= 1;

  [g, minus_u, minus_v, minus_uv]
}

#[inline]
fn cell_in_grid(layout: &ChunkLayout, cell: [i64; 3]) -> Option<usize> {
  let c = layout.cells_per_axis() as i64;
  if cell.iter().all(|&i| (0..c).contains(&i)) {
    Some(layout.cell_index(cell[0] as usize, cell[1] as usize, cell[2] as usize))
  } else {
    None
  }
}

/// Reset `cells` to the layout's cell grid and register every edge.
///
/// Returns the number of active cells.
pub fn assemble(layout: &ChunkLayout, edges: &[Edge], cells: &mut Vec<Cell>) -> usize {
  cells.resize_with(layout.cell_count(), Cell::default);
  cells.iter_mut().for_each(Cell::reset);

  let mut active = 0;
  for (edge_index, edge) in edges.iter().enumerate() {
    for cell in neighbour_cells(edge) {
      let Some(idx) = cell_in_grid(layout, cell) else {
        continue;
      };
      let target = &mut cells[idx];
      if target.edges.is_empty() {
        active += 1;
      }
      debug_assert!(target.edges.len() < MAX_CELL_EDGES, "cell {cell:?} has more than 12 edges");
      target.edges.push(edge_index as u32);
    }
  }
  active
}

#[cfg(test)]
#[path = "cells_test.rs"]
mod cells_test;
