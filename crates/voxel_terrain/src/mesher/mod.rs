//! Dual contouring mesher.
//!
//! Converts one chunk's [`VoxelBuffer`] into a triangle soup. One vertex is
//! placed per active cell by iterative plane fitting, and one quad is emitted
//! per surface edge.
//!
//! # Processing Pipeline
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        INPUT                                    │
//! │  VoxelBuffer: (N+2)³ samples (value, gradient, material)        │
//! │  MesherConfig: max_iterations, iter_strength                    │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                PHASE 1: Edge Detection (parallel)               │
//! │  For each adjacent sample pair on each axis:                    │
//! │    sign change → crossing t, position, normal, flip             │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                PHASE 2: Cell Assembly (serial)                  │
//! │  Register each edge in the 4 cells around it (max 12 per cell)  │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                PHASE 3: Vertex Solve (parallel)                 │
//! │  Mass point → gradient descent toward edge planes → clamp       │
//! │  Inverse-distance normal, nearest-sample material               │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                PHASE 4: Emission (serial, edge order)           │
//! │  Quad of 4 cells per owned edge → 2 triangles, flip winding     │
//! │  Degenerate triangles skipped                                   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Winding
//!
//! Walking the four cells around an edge in the order (g-u-v, g-v, g, g-u)
//! with u < v winds counter-clockwise about +X and +Z but clockwise about +Y
//! (X × Z = -Y). [`AXIS_FLIP`] corrects the Y axis so front faces always point
//! from solid toward empty.

pub mod cells;
pub mod edges;
pub mod emission;
pub mod vertex_solve;

pub use cells::Cell;
pub use edges::Edge;

use tracing::trace;

use crate::types::{MeshOutput, MesherConfig};
use crate::voxel_buffer::VoxelBuffer;

/// Per-axis winding correction applied to each edge's flip flag.
pub const AXIS_FLIP: [bool; 3] = [false, true, false];

/// Reusable dual contouring state.
///
/// Edge and cell scratch buffers are kept between passes so a long-lived
/// mesher stops allocating once it has seen its largest chunk.
#[derive(Debug, Default)]
pub struct Mesher {
  config: MesherConfig,
  edges: Vec<Edge>,
  cells: Vec<Cell>,
}

impl Mesher {
  pub fn new(config: MesherConfig) -> Self {
    Self {
      config,
      edges: Vec::new(),
      cells: Vec::new(),
    }
  }

  pub fn config(&self) -> &MesherConfig {
    &self.config
  }

  /// Mesh one buffer. Positions are chunk-local world units.
  pub fn generate(&mut self, buffer: &VoxelBuffer) -> MeshOutput {
    let mut output = MeshOutput::new();

    // Uniform volumes have no crossings; skip the cell grid entirely.
    if !buffer.has_surface_crossing() {
      self.edges.clear();
      return output;
    }

    let layout = buffer.layout();

    edges::detect(buffer, &mut self.edges);
    let active = cells::assemble(&layout, &self.edges, &mut self.cells);
    vertex_solve::solve_cells(buffer, &self.edges, &mut self.cells, &self.config);
    let degenerate = emission::emit(
      &layout,
      buffer.voxel_size(),
      &self.edges,
      &self.cells,
      &mut output,
    );

    trace!(
      edges = self.edges.len(),
      active_cells = active,
      triangles = output.triangle_count(),
      degenerate,
      "dual contouring pass"
    );

    output
  }
}

/// Mesh `buffer` with a throwaway [`Mesher`].
pub fn generate(buffer: &VoxelBuffer, config: &MesherConfig) -> MeshOutput {
  Mesher::new(config.clone()).generate(buffer)
}
