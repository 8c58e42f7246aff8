//! Collaborator hooks: the terrain's only outputs besides [`TickReport`].
//!
//! Both traits have no-op defaults and are implemented for `()`, so callers
//! that only want the tick report can pass `&mut ()`.
//!
//! [`TickReport`]: crate::terrain::TickReport

use glam::Vec3;

use crate::chunk::ChunkCoord;
use crate::types::{MaterialId, MeshOutput};

/// Host-side chunk objects (scene nodes, render entities, ...).
pub trait ChunkVisuals {
  /// A chunk entered the store. `origin` is its world-space minimum corner;
  /// mesh positions are relative to it.
  fn create_chunk(&mut self, _coord: ChunkCoord, _origin: Vec3) {}

  /// A chunk left the store.
  fn destroy_chunk(&mut self, _coord: ChunkCoord) {}

  /// A chunk's mesh was (re)built.
  fn assign_mesh(&mut self, _coord: ChunkCoord, _mesh: &MeshOutput) {}
}

impl ChunkVisuals for () {}

/// Receives a world-space event for every sample a carve turns from solid to
/// empty.
pub trait DebrisSink {
  fn on_debris(&mut self, _position: Vec3, _material: MaterialId) {}
}

impl DebrisSink for () {}

impl DebrisSink for Vec<(Vec3, MaterialId)> {
  fn on_debris(&mut self, position: Vec3, material: MaterialId) {
    self.push((position, material));
  }
}
