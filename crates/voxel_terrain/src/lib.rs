//! voxel_terrain - streamed, editable dual contouring terrain
//!
//! Engine independent chunk streaming, generation, meshing and editing for
//! smooth voxel terrain. Chunks of `N³` voxels are sampled from a
//! [`DensityField`] into `(N + 2)³` buffers (one sample of apron per side),
//! meshed with dual contouring on a worker pool, and carved by sphere
//! subtraction.
//!
//! # Features
//!
//! - **Streaming**: chunks load inside a sphere around the viewer and unload
//!   outside it
//! - **Admission control**: one chunk at a time in the generate → mesh
//!   pipeline, remeshes after edits run alongside it
//! - **Dual contouring**: edge intersections with Hermite normals, iterative
//!   vertex solve clamped to each cell
//! - **Sphere carving**: monotonic, never blocks on in-flight meshing
//! - **Metrics** (feature `metrics`): task timings and streaming counters
//!
//! # Example
//!
//! ```ignore
//! use voxel_terrain::{NoiseTerrain, Terrain, TerrainConfig};
//!
//! let mut terrain = Terrain::new(TerrainConfig::default(), NoiseTerrain::new(7))?;
//!
//! loop {
//!     let report = terrain.tick(camera_position, &mut visuals, &mut debris);
//!     if fire_pressed {
//!         terrain.subtract_sphere(hit_point, 3.0, &mut debris);
//!     }
//! }
//! ```

pub mod chunk;
pub mod chunk_store;
pub mod config;
pub mod density;
pub mod editor;
pub mod error;
pub mod hooks;
pub mod layout;
pub mod mesher;
pub mod metrics;
pub mod scheduler;
pub mod terrain;
pub mod threading;
pub mod types;
pub mod voxel_buffer;

#[cfg(test)]
pub(crate) mod test_utils;

// Re-export commonly used items
pub use chunk::{Chunk, ChunkCoord, ChunkId, ChunkState};
pub use chunk_store::ChunkStore;
pub use config::TerrainConfig;
pub use density::{DensityField, NoiseTerrain, PlaneField, SphereField};
pub use editor::{CarveReport, SphereCarve};
pub use error::{ConfigError, TerrainError};
pub use hooks::{ChunkVisuals, DebrisSink};
pub use layout::ChunkLayout;
pub use mesher::Mesher;
pub use metrics::TerrainMetrics;
pub use terrain::{Terrain, TickReport};
pub use threading::{TaskExecutor, TaskId};
pub use types::{MaterialId, MeshOutput, MesherConfig, MinMaxAABB, Vertex, Voxel};
pub use voxel_buffer::{SharedVoxels, VoxelBuffer};
