use glam::UVec3;

use super::*;
use crate::mesher::edges;
use crate::test_utils::*;

fn edge_at(axis: u8, grid: [u32; 3]) -> Edge {
  Edge {
    axis,
    grid: UVec3::from_array(grid),
    t: 0.5,
    position: Vec3::ZERO,
    normal: Vec3::Y,
    flip: false,
  }
}

#[test]
fn test_neighbour_cells_rotate_around_axis() {
  // Y edge: u = X, v = Z.
  let cells = neighbour_cells(&edge_at(1, [3, 2, 5]));
  assert_eq!(cells, [[3, 2, 5], [2, 2, 5], [3, 2, 4], [2, 2, 4]]);

  // X edge: u = Y, v = Z.
  let cells = neighbour_cells(&edge_at(0, [1, 1, 1]));
  assert_eq!(cells, [[1, 1, 1], [1, 0, 1], [1, 1, 0], [1, 0, 0]]);
}

#[test]
fn test_edge_registers_in_four_cells() {
  let layout = ChunkLayout::new(4);
  let edges = vec![edge_at(2, [2, 2, 1])];
  let mut cells = Vec::new();

  let active = assemble(&layout, &edges, &mut cells);

  assert_eq!(active, 4);
  assert_eq!(cells.len(), layout.cell_count());
  for [x, y] in [[2, 2], [1, 2], [2, 1], [1, 1]] {
    let cell = &cells[layout.cell_index(x, y, 1)];
    assert_eq!(cell.edges.as_slice(), &[0]);
  }
}

#[test]
fn test_cells_outside_grid_are_skipped() {
  let layout = ChunkLayout::new(4);
  // Corner edge of the padded volume: only one neighbour lies in the grid.
  let edges = vec![edge_at(0, [0, 0, 0])];
  let mut cells = Vec::new();

  assert_eq!(assemble(&layout, &edges, &mut cells), 1);
  assert!(cells[layout.cell_index(0, 0, 0)].is_active());
}

#[test]
fn test_assemble_resets_previous_pass() {
  let layout = ChunkLayout::new(4);
  let mut cells = Vec::new();
  assemble(&layout, &[edge_at(1, [2, 2, 2])], &mut cells);

  let active = assemble(&layout, &[], &mut cells);
  assert_eq!(active, 0);
  assert!(cells.iter().all(|c| !c.is_active()));
}

#[test]
fn test_sphere_cells_stay_within_capacity() {
  let buffer = sphere_buffer(10, Vec3::splat(5.0), 3.7);
  let mut found = Vec::new();
  edges::detect(&buffer, &mut found);
  let mut cells = Vec::new();

  let active = assemble(&buffer.layout(), &found, &mut cells);

  assert!(active > 0);
  for cell in cells.iter().filter(|c| c.is_active()) {
    assert!(cell.edges.len() <= MAX_CELL_EDGES);
    // A closed surface crosses each active cell at least three times.
    assert!(cell.edges.len() >= 3, "cell with {} edges", cell.edges.len());
  }
}

#[test]
fn test_mass_point_averages_crossings() {
  let mut a = edge_at(0, [1, 1, 1]);
  a.position = Vec3::new(1.0, 1.0, 1.0);
  let mut b = edge_at(1, [1, 1, 1]);
  b.position = Vec3::new(2.0, 3.0, 1.0);

  let mut cell = Cell::default();
  cell.edges.push(0);
  cell.edges.push(1);

  assert_eq!(cell.mass_point(&[a, b]), Vec3::new(1.5, 2.0, 1.0));
}
