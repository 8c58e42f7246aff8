//! ChunkStore - coordinate → chunk map and the streaming policy.
//!
//! # Streaming
//!
//! ```text
//!   load sphere (radius R around viewer)      candidate box = floor((v ± R) / size)
//!  ┌───┬───┬───┬───┐
//!  │   │ ● │ ● │   │   ● loaded: distance(viewer, chunk AABB) <= R
//!  ├───┼───┼───┼───┤
//!  │ ● │ ● │ ● │ ● │   chunks outside the sphere are removed, unless the
//!  ├───┼───┼───┼───┤   scheduler has claimed them for a primary task
//!  │ ● │ ● │ ● │ ● │
//!  └───┴───┴───┴───┘
//! ```

use std::collections::{HashMap, HashSet};

use glam::Vec3;
use tracing::debug;

use crate::chunk::{Chunk, ChunkCoord};

/// Chunks created and removed by one streaming pass.
#[derive(Debug, Default)]
pub struct StreamingChanges {
  /// Newly created coordinates, in ascending order.
  pub created: Vec<ChunkCoord>,
  /// Chunks taken out of the store. Dropping them releases their buffers.
  pub removed: Vec<Chunk>,
}

/// Spatial map of live chunks.
#[derive(Debug)]
pub struct ChunkStore {
  chunks: HashMap<ChunkCoord, Chunk>,
  chunk_size: f32,
}

impl ChunkStore {
  pub fn new(chunk_size: f32) -> Self {
    Self {
      chunks: HashMap::new(),
      chunk_size,
    }
  }

  #[inline]
  pub fn chunk_size(&self) -> f32 {
    self.chunk_size
  }

  /// True when a chunk at `coord` lies within `load_radius` of `viewer`.
  #[inline]
  pub fn should_load(&self, coord: ChunkCoord, viewer: Vec3, load_radius: f32) -> bool {
    coord.aabb(self.chunk_size).distance_to_point(viewer) <= load_radius
  }

  /// Every coordinate that should be loaded for `viewer`, ascending.
  pub fn desired_coords(&self, viewer: Vec3, load_radius: f32) -> Vec<ChunkCoord> {
    let min = ChunkCoord::from_world(viewer - Vec3::splat(load_radius), self.chunk_size);
    let max = ChunkCoord::from_world(viewer + Vec3::splat(load_radius), self.chunk_size);

    let mut coords = Vec::new();
    for x in min.x..=max.x {
      for y in min.y..=max.y {
        for z in min.z..=max.z {
          let coord = ChunkCoord::new(x, y, z);
          if self.should_load(coord, viewer, load_radius) {
            coords.push(coord);
          }
        }
      }
    }
    coords
  }

  /// Create missing chunks inside the load sphere and remove chunks outside
  /// it. Coordinates in `claimed` are never removed.
  pub fn update_streaming(
    &mut self,
    viewer: Vec3,
    load_radius: f32,
    claimed: &HashSet<ChunkCoord>,
  ) -> StreamingChanges {
    let mut changes = StreamingChanges::default();

    for coord in self.desired_coords(viewer, load_radius) {
      if !self.chunks.contains_key(&coord) {
        self.chunks.insert(coord, Chunk::new(coord));
        changes.created.push(coord);
      }
    }

    let mut stale: Vec<ChunkCoord> = self
      .chunks
      .keys()
      .copied()
      .filter(|&coord| !self.should_load(coord, viewer, load_radius))
      .collect();
    stale.sort_unstable();

    for coord in stale {
      if claimed.contains(&coord) {
        debug!(%coord, "removal deferred: chunk claimed by primary task");
        continue;
      }
      if let Some(chunk) = self.chunks.remove(&coord) {
        changes.removed.push(chunk);
      }
    }

    if !changes.created.is_empty() || !changes.removed.is_empty() {
      debug!(
        created = changes.created.len(),
        removed = changes.removed.len(),
        live = self.chunks.len(),
        "streaming update"
      );
    }

    changes
  }

  /// Refresh `distance_to_viewer` on every chunk.
  pub fn update_distances(&mut self, viewer: Vec3) {
    let size = self.chunk_size;
    for chunk in self.chunks.values_mut() {
      chunk.distance_to_viewer = chunk.coord.center(size).distance(viewer);
    }
  }

  /// Closest chunk that still needs generation and has no task.
  ///
  /// Ties break on coordinate so the choice is deterministic.
  pub fn nearest_needing_voxelize(&self) -> Option<ChunkCoord> {
    self
      .chunks
      .values()
      .filter(|c| c.needs_voxelize && !c.is_busy())
      .min_by(|a, b| {
        a.distance_to_viewer
          .total_cmp(&b.distance_to_viewer)
          .then_with(|| a.coord.cmp(&b.coord))
      })
      .map(|c| c.coord)
  }

  #[inline]
  pub fn get(&self, coord: ChunkCoord) -> Option<&Chunk> {
    self.chunks.get(&coord)
  }

  #[inline]
  pub fn get_mut(&mut self, coord: ChunkCoord) -> Option<&mut Chunk> {
    self.chunks.get_mut(&coord)
  }

  /// Insert a chunk, replacing and returning any chunk at the same coordinate.
  pub fn insert(&mut self, chunk: Chunk) -> Option<Chunk> {
    self.chunks.insert(chunk.coord, chunk)
  }

  pub fn remove(&mut self, coord: ChunkCoord) -> Option<Chunk> {
    self.chunks.remove(&coord)
  }

  #[inline]
  pub fn contains(&self, coord: ChunkCoord) -> bool {
    self.chunks.contains_key(&coord)
  }

  #[inline]
  pub fn len(&self) -> usize {
    self.chunks.len()
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.chunks.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = &Chunk> {
    self.chunks.values()
  }

  pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Chunk> {
    self.chunks.values_mut()
  }

  /// Remove every chunk.
  pub fn drain(&mut self) -> impl Iterator<Item = Chunk> + '_ {
    self.chunks.drain().map(|(_, chunk)| chunk)
  }

  /// Live coordinates in ascending order.
  pub fn coords(&self) -> Vec<ChunkCoord> {
    let mut coords: Vec<_> = self.chunks.keys().copied().collect();
    coords.sort_unstable();
    coords
  }
}

#[cfg(test)]
#[path = "chunk_store_test.rs"]
mod chunk_store_test;
