//! Quad emission around surface edges.
//!
//! Every surface edge is shared by four cells. Walking them in a fixed
//! rotation gives a quad that is split into two triangles:
//!
//! ```text
//!   c3 (g-u) ───── c2 (g)          flip = false:  [c0 c1 c2] [c0 c2 c3]
//!      │        ╱    │             flip = true:   [c0 c3 c1] [c3 c2 c1]
//!      │      ╱      │
//!   c0 (g-u-v) ─── c1 (g-v)
//! ```
//!
//! The split is fixed per flip value and never adjusted for quad shape. A
//! chunk emits the quads of edges whose lower sample it owns, so the quads on
//! its minimum planes reach into apron cell 0 and meet the lower neighbour.

use glam::Vec3;

use super::cells::{neighbour_cells, Cell};
use super::edges::Edge;
use crate::layout::{ChunkLayout, APRON};
use crate::types::{MeshOutput, Vertex};

/// Emit triangles for every surface edge, in edge order.
///
/// Returns the number of triangles skipped as degenerate.
pub fn emit(
  layout: &ChunkLayout,
  voxel_size: f32,
  edges: &[Edge],
  cells: &[Cell],
  output: &mut MeshOutput,
) -> usize {
  let mut degenerate = 0;

  for edge in edges {
    if !layout.owns_edge(edge.grid) {
      continue;
    }
    let [g, minus_u, minus_v, minus_uv] = neighbour_cells(edge);
    let quad = [minus_uv, minus_v, g, minus_u];

    let [c0, c1, c2, c3] = quad.map(|c| {
      let coord = [c[0] as usize, c[1] as usize, c[2] as usize];
      cell_vertex(layout, voxel_size, cells, coord)
    });

    let triangles = if edge.flip {
      [[c0, c3, c1], [c3, c2, c1]]
    } else {
      [[c0, c1, c2], [c0, c2, c3]]
    };

    for triangle in triangles {
      if is_degenerate(&triangle) {
        degenerate += 1;
        continue;
      }
      output.push_triangle(triangle);
    }
  }

  degenerate
}

/// Output vertex for a solved cell, in chunk-local world units.
#[inline]
fn cell_vertex(layout: &ChunkLayout, voxel_size: f32, cells: &[Cell], coord: [usize; 3]) -> Vertex {
  let cell = &cells[layout.cell_index(coord[0], coord[1], coord[2])];
  debug_assert!(cell.is_active(), "quad references inactive cell {coord:?}");
  let local = (cell.vertex - Vec3::splat(APRON as f32)) * voxel_size;

  Vertex {
    position: local.to_array(),
    normal: cell.normal.to_array(),
    material: cell.material,
    cell_position: coord.map(|c| c as u32),
  }
}

/// True when any two corners share a position.
#[inline]
pub fn is_degenerate(triangle: &[Vertex; 3]) -> bool {
  let [a, b, c] = triangle;
  a.position == b.position || b.position == c.position || a.position == c.position
}

#[cfg(test)]
#[path = "emission_test.rs"]
mod emission_test;
