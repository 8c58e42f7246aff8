//! Chunk - one streamed cube of terrain.
//!
//! # Lifecycle
//!
//! ```text
//!            generate            mesh (primary)
//! Unloaded ───────────► Voxelizing ───► Voxelized ───► Meshing ───► Meshed
//!                                                         ▲            │
//!                                                         │   carve    │
//!                                                         └─ DirtyMeshed ◄┘
//! ```
//!
//! Edits never send a chunk back through `Voxelizing`.

use std::sync::atomic::{AtomicU64, Ordering};

use glam::{IVec3, Vec3};

use crate::editor::SphereCarve;
use crate::types::{MeshOutput, MinMaxAABB};
use crate::voxel_buffer::SharedVoxels;

// =============================================================================
// ChunkCoord - grid position
// =============================================================================

/// Integer chunk grid position. Chunk `c` spans `[c, c + 1) * chunk_size`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkCoord {
  pub x: i32,
  pub y: i32,
  pub z: i32,
}

impl ChunkCoord {
  pub const fn new(x: i32, y: i32, z: i32) -> Self {
    Self { x, y, z }
  }

  /// Chunk containing a world position.
  pub fn from_world(pos: Vec3, chunk_size: f32) -> Self {
    (pos / chunk_size).floor().as_ivec3().into()
  }

  /// World position of the chunk's minimum corner.
  #[inline]
  pub fn origin(&self, chunk_size: f32) -> Vec3 {
    IVec3::from(*self).as_vec3() * chunk_size
  }

  #[inline]
  pub fn center(&self, chunk_size: f32) -> Vec3 {
    self.origin(chunk_size) + Vec3::splat(chunk_size * 0.5)
  }

  /// World-space bounds of the chunk (apron excluded).
  pub fn aabb(&self, chunk_size: f32) -> MinMaxAABB {
    let min = self.origin(chunk_size);
    MinMaxAABB::new(min.to_array(), (min + Vec3::splat(chunk_size)).to_array())
  }
}

impl From<IVec3> for ChunkCoord {
  fn from(v: IVec3) -> Self {
    Self::new(v.x, v.y, v.z)
  }
}

impl From<ChunkCoord> for IVec3 {
  fn from(c: ChunkCoord) -> Self {
    IVec3::new(c.x, c.y, c.z)
  }
}

impl std::fmt::Display for ChunkCoord {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "({}, {}, {})", self.x, self.y, self.z)
  }
}

// =============================================================================
// ChunkId - identity epoch
// =============================================================================

/// Atomic counter for generating unique ChunkIds.
static CHUNK_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Identity of one chunk instance.
///
/// A chunk unloaded and re-created at the same coordinate gets a new id, so
/// task results addressed to the old instance are recognised as stale.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ChunkId(u64);

impl ChunkId {
  /// Generate a new unique ChunkId.
  pub fn new() -> Self {
    Self(CHUNK_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
  }

  /// Get the raw ID value.
  pub fn raw(&self) -> u64 {
    self.0
  }
}

impl Default for ChunkId {
  fn default() -> Self {
    Self::new()
  }
}

// =============================================================================
// Chunk
// =============================================================================

/// Lifecycle state derived from a chunk's flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChunkState {
  /// Waiting for generation.
  Unloaded,
  /// Generation task in flight.
  Voxelizing,
  /// Voxels present, no mesh yet and none in flight.
  Voxelized,
  /// Mesh task in flight.
  Meshing,
  /// Mesh up to date.
  Meshed,
  /// Mesh present but stale after an edit.
  DirtyMeshed,
}

/// One streamed chunk.
#[derive(Debug)]
pub struct Chunk {
  pub coord: ChunkCoord,
  pub id: ChunkId,

  /// Voxel samples. `None` until generation completes.
  pub voxels: Option<SharedVoxels>,

  /// Latest installed mesh. `None` until the first mesh completes.
  pub mesh: Option<MeshOutput>,

  /// Distance from the viewer to the chunk centre, refreshed every tick.
  pub distance_to_viewer: f32,

  pub needs_voxelize: bool,
  pub needs_remesh: bool,

  /// A generation task owns this chunk's future buffer.
  pub generating: bool,
  /// A mesh task holds a read handle to the buffer.
  pub mesh_in_flight: bool,

  /// Carves that arrived while the buffer was busy, applied in order.
  pub pending_carves: Vec<SphereCarve>,
}

impl Chunk {
  pub fn new(coord: ChunkCoord) -> Self {
    Self {
      coord,
      id: ChunkId::new(),
      voxels: None,
      mesh: None,
      distance_to_viewer: f32::INFINITY,
      needs_voxelize: true,
      needs_remesh: false,
      generating: false,
      mesh_in_flight: false,
      pending_carves: Vec::new(),
    }
  }

  pub fn state(&self) -> ChunkState {
    if self.generating {
      ChunkState::Voxelizing
    } else if self.voxels.is_none() {
      ChunkState::Unloaded
    } else if self.mesh_in_flight {
      ChunkState::Meshing
    } else if self.mesh.is_none() {
      ChunkState::Voxelized
    } else if self.needs_remesh {
      ChunkState::DirtyMeshed
    } else {
      ChunkState::Meshed
    }
  }

  /// True while any task references this chunk.
  #[inline]
  pub fn is_busy(&self) -> bool {
    self.generating || self.mesh_in_flight
  }
}
