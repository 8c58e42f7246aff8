//! Voxel buffer layout for one chunk.
//!
//! A chunk with `N` voxels per axis stores `(N + 2)³` samples: the `N + 1`
//! lattice points spanning the chunk plus a one-sample apron on the negative
//! side, and the far lattice point shared with the positive neighbour.
//!
//! # Sample Layout (one axis)
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Sample index:   0      1      2     ...     N      N+1           │
//! │                  │      │                    │       │            │
//! │  Local lattice: -1      0      1     ...    N-1      N            │
//! │                  │      └──── owned by this chunk ───┘ │          │
//! │                  └─ negative apron          shared with +neighbour │
//! ├───────────────────────────────────────────────────────────────────┤
//! │  Cells sit between samples c and c+1:  c ∈ [0, N]  (N + 1 cells)  │
//! │  A chunk meshes the edges whose lower sample it owns. Cell 0      │
//! │  straddles the apron and matches cell N of the -neighbour.        │
//! └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Memory Layout
//!
//! Row-major with Z innermost, matching the volume layout used by the mesher:
//!
//! ```text
//! index = (x * S + y) * S + z        where S = N + 2
//! ```
//!
//! # Coordinate System
//!
//! ```text
//!         +Y
//!          │
//!          │
//!          └───────── +X
//!         /
//!        /
//!       +Z
//! ```

use glam::{UVec3, Vec3};

/// Apron width in samples on the negative side of every axis.
pub const APRON: usize = 1;

/// Default voxels per chunk axis.
pub const DEFAULT_VOXELS_PER_AXIS: usize = 16;

/// Sample/cell index arithmetic for a chunk with `N` voxels per axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChunkLayout {
  voxels_per_axis: usize,
}

impl ChunkLayout {
  /// Create a layout for `voxels_per_axis` voxels per axis.
  ///
  /// # Panics
  /// If `voxels_per_axis` is zero.
  pub fn new(voxels_per_axis: usize) -> Self {
    assert!(voxels_per_axis > 0, "chunk layout needs at least one voxel per axis");
    Self { voxels_per_axis }
  }

  /// N
  #[inline]
  pub const fn voxels_per_axis(&self) -> usize {
    self.voxels_per_axis
  }

  /// Samples per axis including the apron (N + 2).
  #[inline]
  pub const fn samples_per_axis(&self) -> usize {
    self.voxels_per_axis + 2
  }

  /// Total samples in a buffer ((N + 2)³).
  #[inline]
  pub const fn sample_count(&self) -> usize {
    let s = self.samples_per_axis();
    s * s * s
  }

  /// Cells per axis including the apron cell (N + 1).
  #[inline]
  pub const fn cells_per_axis(&self) -> usize {
    self.voxels_per_axis + 1
  }

  /// Total cells in one meshing pass ((N + 1)³).
  #[inline]
  pub const fn cell_count(&self) -> usize {
    let c = self.cells_per_axis();
    c * c * c
  }

  /// Linear sample index for sample coordinates.
  #[inline(always)]
  pub const fn sample_index(&self, x: usize, y: usize, z: usize) -> usize {
    let s = self.samples_per_axis();
    (x * s + y) * s + z
  }

  /// Sample coordinates for a linear sample index.
  #[inline(always)]
  pub const fn sample_coord(&self, idx: usize) -> (usize, usize, usize) {
    let s = self.samples_per_axis();
    (idx / (s * s), (idx / s) % s, idx % s)
  }

  /// Linear cell index for cell coordinates.
  #[inline(always)]
  pub const fn cell_index(&self, x: usize, y: usize, z: usize) -> usize {
    let c = self.cells_per_axis();
    (x * c + y) * c + z
  }

  /// Cell coordinates for a linear cell index.
  #[inline(always)]
  pub fn cell_coord(&self, idx: usize) -> UVec3 {
    let c = self.cells_per_axis();
    UVec3::new((idx / (c * c)) as u32, ((idx / c) % c) as u32, (idx % c) as u32)
  }

  /// True when this chunk emits the quad around the edge whose lower sample
  /// is `grid`.
  ///
  /// Edges belong to the chunk owning their lower sample, so neighbours tile
  /// without gaps or overlap. The four cells of an owned edge lie in [0, N].
  #[inline]
  pub fn owns_edge(&self, grid: UVec3) -> bool {
    self.is_owned_sample(grid.x as usize, grid.y as usize, grid.z as usize)
  }

  /// True when a sample is owned by this chunk (local lattice [0, N-1]).
  ///
  /// Apron samples and the far shared plane belong to neighbours.
  #[inline]
  pub fn is_owned_sample(&self, x: usize, y: usize, z: usize) -> bool {
    let owned = APRON..APRON + self.voxels_per_axis;
    owned.contains(&x) && owned.contains(&y) && owned.contains(&z)
  }

  /// Chunk-local lattice position (in voxel units) of a sample.
  #[inline]
  pub fn sample_local_position(&self, x: usize, y: usize, z: usize) -> Vec3 {
    Vec3::new(x as f32, y as f32, z as f32) - Vec3::splat(APRON as f32)
  }
}

impl Default for ChunkLayout {
  fn default() -> Self {
    Self::new(DEFAULT_VOXELS_PER_AXIS)
  }
}

#[cfg(test)]
#[path = "layout_test.rs"]
mod layout_test;
