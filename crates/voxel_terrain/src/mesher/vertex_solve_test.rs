use glam::UVec3;

use super::*;
use crate::mesher::{cells, edges};
use crate::test_utils::*;
use crate::types::Voxel;

fn plane_edge(position: Vec3, normal: Vec3) -> Edge {
  Edge {
    axis: 0,
    grid: UVec3::ZERO,
    t: 0.5,
    position,
    normal,
    flip: false,
  }
}

fn cell_with(count: usize) -> Cell {
  let mut cell = Cell::default();
  for i in 0..count {
    cell.edges.push(i as u32);
  }
  cell
}

fn plane_error(edges: &[Edge], p: Vec3) -> f32 {
  edges.iter().map(|e| e.normal.dot(p - e.position).powi(2)).sum()
}

#[test]
fn test_zero_iterations_returns_mass_point() {
  let edges = [
    plane_edge(Vec3::new(2.0, 2.5, 2.0), Vec3::Y),
    plane_edge(Vec3::new(3.0, 2.5, 3.0), Vec3::Y),
  ];
  let config = MesherConfig::new().with_max_iterations(0);

  let vertex = solve_vertex(&cell_with(2), &edges, Vec3::splat(2.0), &config);
  assert_eq!(vertex, Vec3::new(2.5, 2.5, 2.5));
}

#[test]
fn test_flat_planes_are_a_fixed_point() {
  let edges = [
    plane_edge(Vec3::new(2.0, 2.3, 2.0), Vec3::Y),
    plane_edge(Vec3::new(3.0, 2.3, 2.0), Vec3::Y),
    plane_edge(Vec3::new(2.0, 2.3, 3.0), Vec3::Y),
    plane_edge(Vec3::new(3.0, 2.3, 3.0), Vec3::Y),
  ];

  let vertex = solve_vertex(&cell_with(4), &edges, Vec3::splat(2.0), &MesherConfig::default());
  assert!((vertex - Vec3::new(2.5, 2.3, 2.5)).length() < 1e-5);
}

/// Two perpendicular planes: descent moves toward the crease.
#[test]
fn test_solve_reduces_plane_error() {
  let edges = [
    plane_edge(Vec3::new(2.0, 2.8, 2.0), Vec3::Y),
    plane_edge(Vec3::new(2.0, 2.8, 3.0), Vec3::Y),
    plane_edge(Vec3::new(2.8, 2.0, 2.0), Vec3::X),
    plane_edge(Vec3::new(2.8, 2.0, 3.0), Vec3::X),
  ];
  let cell = cell_with(4);
  let mass = cell.mass_point(&edges);

  let vertex = solve_vertex(&cell, &edges, Vec3::splat(2.0), &MesherConfig::default());

  assert!(plane_error(&edges, vertex) < plane_error(&edges, mass));
  assert!(vertex.x > mass.x && vertex.y > mass.y);
}

/// Whatever the step size, the vertex never leaves its cell.
#[test]
fn test_vertex_clamped_to_cell() {
  let edges = [
    plane_edge(Vec3::new(4.0, 4.1, 4.0), Vec3::new(1.0, 1.0, 0.0).normalize()),
    plane_edge(Vec3::new(4.9, 4.0, 4.5), -Vec3::Y),
    plane_edge(Vec3::new(4.5, 5.0, 4.9), Vec3::Z),
  ];
  let config = MesherConfig::new().with_iter_strength(250.0).with_max_iterations(32);
  let cell_min = Vec3::splat(4.0);

  let vertex = solve_vertex(&cell_with(3), &edges, cell_min, &config);

  assert!(vertex.cmpge(cell_min).all() && vertex.cmple(cell_min + Vec3::ONE).all(), "{vertex}");
}

#[test]
fn test_nearer_edge_dominates_normal() {
  let edges = [
    plane_edge(Vec3::new(1.0, 1.0, 1.0), Vec3::X),
    plane_edge(Vec3::new(2.0, 2.0, 2.0), Vec3::Y),
  ];
  let normal = interpolate_normal(&cell_with(2), &edges, Vec3::new(1.1, 1.0, 1.0));

  assert!((normal.length() - 1.0).abs() < 1e-5);
  assert!(normal.x > normal.y);
}

#[test]
fn test_opposing_normals_fall_back_to_up() {
  let edges = [
    plane_edge(Vec3::new(1.0, 1.0, 1.0), Vec3::X),
    plane_edge(Vec3::new(2.0, 1.0, 1.0), -Vec3::X),
  ];
  let normal = interpolate_normal(&cell_with(2), &edges, Vec3::new(1.5, 1.0, 1.0));
  assert_eq!(normal, Vec3::Y);
}

#[test]
fn test_nearest_material_rounds_to_sample() {
  let mut buffer = uniform_buffer(4, 1.0);
  *buffer.get_mut(2, 3, 1) = Voxel::new(1.0, Vec3::Y, 7);
  let layout = buffer.layout();

  assert_eq!(nearest_material(&buffer, &layout, Vec3::new(2.2, 2.6, 0.9)), 7);
  assert_eq!(nearest_material(&buffer, &layout, Vec3::new(2.6, 2.6, 0.9)), 0);
  // Out-of-range positions clamp to the buffer.
  assert_eq!(nearest_material(&buffer, &layout, Vec3::splat(-3.0)), 0);
}

#[test]
fn test_solved_vertices_stay_in_cells() {
  let buffer = noise_buffer(10, 5);
  let mut found = Vec::new();
  edges::detect(&buffer, &mut found);
  let mut grid = Vec::new();
  cells::assemble(&buffer.layout(), &found, &mut grid);

  solve_cells(&buffer, &found, &mut grid, &MesherConfig::default());

  let layout = buffer.layout();
  let mut checked = 0;
  for (index, cell) in grid.iter().enumerate().filter(|(_, c)| c.is_active()) {
    let min = layout.cell_coord(index).as_vec3();
    assert!(
      cell.vertex.cmpge(min).all() && cell.vertex.cmple(min + Vec3::ONE).all(),
      "vertex {} outside cell {}",
      cell.vertex,
      min
    );
    assert!((cell.normal.length() - 1.0).abs() < 1e-4);
    checked += 1;
  }
  assert!(checked > 0);
}
