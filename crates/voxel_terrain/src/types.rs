//! Core data types shared by generation, meshing and editing.

use glam::Vec3;
use serde::Deserialize;

/// Material identifier carried by each voxel.
pub type MaterialId = u8;

/// One density sample.
///
/// Negative `value` = solid, zero or positive = empty. `gradient` is the
/// unnormalized derivative of `value` with respect to world position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Voxel {
  pub value: f32,
  pub gradient: Vec3,
  pub material: MaterialId,
}

impl Voxel {
  pub const fn new(value: f32, gradient: Vec3, material: MaterialId) -> Self {
    Self {
      value,
      gradient,
      material,
    }
  }

  /// True when the sample is inside solid material.
  #[inline(always)]
  pub fn is_solid(&self) -> bool {
    self.value < 0.0
  }

  /// True when value and gradient are both finite.
  #[inline]
  pub fn is_finite(&self) -> bool {
    self.value.is_finite() && self.gradient.is_finite()
  }
}

impl Default for Voxel {
  fn default() -> Self {
    Self {
      value: 1.0,
      gradient: Vec3::Y,
      material: 0,
    }
  }
}

/// Output vertex with all mesh attributes.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vertex {
  /// Vertex position in chunk-local world units.
  pub position: [f32; 3],

  /// Surface normal (unit vector).
  pub normal: [f32; 3],

  /// Material of the voxel nearest to the solved cell vertex.
  pub material: MaterialId,

  /// Cell that produced this vertex, for debugging.
  pub cell_position: [u32; 3],
}

impl Default for Vertex {
  fn default() -> Self {
    Self {
      position: [0.0; 3],
      normal: [0.0, 1.0, 0.0],
      material: 0,
      cell_position: [0; 3],
    }
  }
}

/// Axis-aligned bounding box.
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct MinMaxAABB {
  pub min: [f32; 3],
  pub max: [f32; 3],
}

impl MinMaxAABB {
  /// Create AABB with inverted extents (ready for encapsulation).
  pub fn empty() -> Self {
    Self {
      min: [f32::INFINITY; 3],
      max: [f32::NEG_INFINITY; 3],
    }
  }

  /// Create AABB from min/max corners.
  pub fn new(min: [f32; 3], max: [f32; 3]) -> Self {
    Self { min, max }
  }

  /// Expand AABB to include a point.
  #[inline]
  pub fn encapsulate(&mut self, point: [f32; 3]) {
    for i in 0..3 {
      self.min[i] = self.min[i].min(point[i]);
      self.max[i] = self.max[i].max(point[i]);
    }
  }

  /// Check if AABB is valid (min <= max on all axes).
  pub fn is_valid(&self) -> bool {
    self.min[0] <= self.max[0] && self.min[1] <= self.max[1] && self.min[2] <= self.max[2]
  }

  /// Euclidean distance from a point to the box (0 inside).
  pub fn distance_to_point(&self, point: Vec3) -> f32 {
    let min = Vec3::from_array(self.min);
    let max = Vec3::from_array(self.max);
    (min - point).max(point - max).max(Vec3::ZERO).length()
  }
}

impl Default for MinMaxAABB {
  fn default() -> Self {
    Self::empty()
  }
}

/// Mesh generation result.
///
/// Triangle soup: every triangle owns three vertices and `indices` lists them
/// in emission order.
#[derive(Debug, Default, Clone)]
pub struct MeshOutput {
  pub vertices: Vec<Vertex>,

  /// Triangle indices (3 indices per triangle).
  pub indices: Vec<u32>,

  /// Bounding box encompassing all vertices.
  pub bounds: MinMaxAABB,
}

impl MeshOutput {
  pub fn new() -> Self {
    Self::default()
  }

  /// Clear all buffers, preserving capacity.
  pub fn clear(&mut self) {
    self.vertices.clear();
    self.indices.clear();
    self.bounds = MinMaxAABB::empty();
  }

  /// Returns true if no geometry was generated.
  pub fn is_empty(&self) -> bool {
    self.vertices.is_empty()
  }

  /// Number of triangles in the mesh.
  pub fn triangle_count(&self) -> usize {
    self.indices.len() / 3
  }

  /// Append one triangle.
  pub fn push_triangle(&mut self, corners: [Vertex; 3]) {
    for vertex in corners {
      let index = self.vertices.len() as u32;
      self.bounds.encapsulate(vertex.position);
      self.vertices.push(vertex);
      self.indices.push(index);
    }
  }

  /// Vertex positions as a flat list (renderer upload helper).
  pub fn positions(&self) -> impl Iterator<Item = [f32; 3]> + '_ {
    self.vertices.iter().map(|v| v.position)
  }

  /// Vertex normals as a flat list (renderer upload helper).
  pub fn normals(&self) -> impl Iterator<Item = [f32; 3]> + '_ {
    self.vertices.iter().map(|v| v.normal)
  }

  /// Vertex material ids as a flat list (renderer upload helper).
  pub fn materials(&self) -> impl Iterator<Item = MaterialId> + '_ {
    self.vertices.iter().map(|v| v.material)
  }
}

/// Configuration for the dual contouring vertex solve.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct MesherConfig {
  /// Upper bound on gradient-descent steps per cell.
  pub max_iterations: u32,

  /// Step size applied to the averaged plane force each iteration.
  pub iter_strength: f32,
}

impl Default for MesherConfig {
  fn default() -> Self {
    Self {
      max_iterations: 8,
      iter_strength: 0.5,
    }
  }
}

impl MesherConfig {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_max_iterations(mut self, iterations: u32) -> Self {
    self.max_iterations = iterations;
    self
  }

  pub fn with_iter_strength(mut self, strength: f32) -> Self {
    self.iter_strength = strength;
    self
  }
}

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;
