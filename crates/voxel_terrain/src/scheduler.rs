//! Scheduler - admission-controlled generation and meshing.
//!
//! Two kinds of work share one worker pool:
//!
//! ```text
//! primary:  generate ──► mesh          (at most max_primary_tasks chunks)
//!              │           │
//!              ▼           ▼
//!           Voxelizing   Meshing ──► Meshed
//!
//! remesh:   DirtyMeshed ──► Meshing ──► Meshed    (unbounded, one per chunk)
//! ```
//!
//! A primary chunk stays *claimed* from the moment its generation task is
//! spawned until its first mesh is collected. Claimed chunks are exempt from
//! streaming removal.
//!
//! Every task result is tagged with the `(coord, id)` of the chunk it was
//! spawned for. Results whose chunk is gone or was replaced are dropped.

use std::collections::HashSet;
use std::sync::Arc;

use rayon::ThreadPoolBuildError;
use tracing::{debug, info_span, trace};
use web_time::Instant;

use crate::chunk::{Chunk, ChunkCoord, ChunkId};
use crate::chunk_store::ChunkStore;
use crate::config::TerrainConfig;
use crate::density::DensityField;
use crate::editor;
use crate::hooks::{ChunkVisuals, DebrisSink};
use crate::layout::ChunkLayout;
use crate::mesher;
use crate::metrics::TerrainMetrics;
use crate::terrain::TickReport;
use crate::threading::TaskExecutor;
use crate::types::{MeshOutput, MesherConfig};
use crate::voxel_buffer::{SharedVoxels, VoxelBuffer};

/// Result of one worker task.
#[derive(Debug)]
pub enum TaskOutput {
  Generated {
    coord: ChunkCoord,
    id: ChunkId,
    buffer: VoxelBuffer,
    elapsed_us: u64,
  },
  Meshed {
    coord: ChunkCoord,
    id: ChunkId,
    mesh: MeshOutput,
    /// Final stage of the primary pipeline (as opposed to a remesh).
    primary: bool,
    elapsed_us: u64,
  },
}

/// Runs generation and mesh tasks for chunks in a [`ChunkStore`].
pub struct Scheduler<F> {
  field: Arc<F>,
  layout: ChunkLayout,
  voxel_size: f32,
  chunk_size: f32,
  mesher: MesherConfig,
  max_primary_tasks: usize,

  executor: TaskExecutor<TaskOutput>,
  /// Chunks in the primary pipeline.
  claimed: HashSet<ChunkCoord>,
  remeshes_in_flight: usize,

  metrics: TerrainMetrics,
}

impl<F: DensityField + 'static> Scheduler<F> {
  /// Create a scheduler with its own worker pool.
  ///
  /// `config` is expected to be validated.
  pub fn new(config: &TerrainConfig, field: Arc<F>) -> Result<Self, ThreadPoolBuildError> {
    Ok(Self {
      field,
      layout: config.layout(),
      voxel_size: config.voxel_size,
      chunk_size: config.chunk_size(),
      mesher: config.mesher.clone(),
      max_primary_tasks: config.max_primary_tasks,
      executor: TaskExecutor::new(config.worker_threads)?,
      claimed: HashSet::new(),
      remeshes_in_flight: 0,
      metrics: TerrainMetrics::default(),
    })
  }

  /// Chunks that must not be unloaded this tick.
  pub fn claimed(&self) -> &HashSet<ChunkCoord> {
    &self.claimed
  }

  /// Chunks currently in the primary pipeline.
  pub fn primary_in_flight(&self) -> usize {
    self.claimed.len()
  }

  pub fn remeshes_in_flight(&self) -> usize {
    self.remeshes_in_flight
  }

  /// Tasks spawned but not yet collected.
  pub fn pending_tasks(&self) -> usize {
    self.executor.pending_count()
  }

  pub fn worker_threads(&self) -> usize {
    self.executor.num_threads()
  }

  pub fn metrics(&self) -> &TerrainMetrics {
    &self.metrics
  }

  pub fn metrics_mut(&mut self) -> &mut TerrainMetrics {
    &mut self.metrics
  }

  // ===========================================================================
  // Completions
  // ===========================================================================

  /// Collect finished tasks and install their results (never blocks).
  pub fn poll<V, D>(&mut self, store: &mut ChunkStore, visuals: &mut V, debris: &mut D, report: &mut TickReport)
  where
    V: ChunkVisuals + ?Sized,
    D: DebrisSink + ?Sized,
  {
    for (_, output) in self.executor.drain_completed() {
      match output {
        TaskOutput::Generated {
          coord,
          id,
          buffer,
          elapsed_us,
        } => {
          self.metrics.record_generate_timing(elapsed_us);
          self.finish_generation(store, coord, id, buffer, debris, report);
        }
        TaskOutput::Meshed {
          coord,
          id,
          mesh,
          primary,
          elapsed_us,
        } => {
          self.metrics.record_mesh_timing(elapsed_us);
          self.finish_mesh(store, coord, id, mesh, primary, visuals, debris, report);
        }
      }
    }
  }

  fn finish_generation<D: DebrisSink + ?Sized>(
    &mut self,
    store: &mut ChunkStore,
    coord: ChunkCoord,
    id: ChunkId,
    buffer: VoxelBuffer,
    debris: &mut D,
    report: &mut TickReport,
  ) {
    let Some(chunk) = store.get_mut(coord).filter(|chunk| chunk.id == id) else {
      debug!(%coord, "discarding stale generation result");
      self.claimed.remove(&coord);
      self.metrics.record_stale();
      report.stale_discarded += 1;
      return;
    };

    trace!(%coord, "generation complete");
    chunk.generating = false;
    chunk.needs_voxelize = false;
    chunk.voxels = Some(SharedVoxels::new(buffer));

    // Carves that arrived while voxelizing land before the first mesh.
    let applied = editor::apply_pending(chunk, debris);
    report.carves_applied += applied;
    self.metrics.record_carves(applied, 0);

    self.spawn_mesh(chunk, true);
  }

  #[allow(clippy::too_many_arguments)]
  fn finish_mesh<V, D>(
    &mut self,
    store: &mut ChunkStore,
    coord: ChunkCoord,
    id: ChunkId,
    mesh: MeshOutput,
    primary: bool,
    visuals: &mut V,
    debris: &mut D,
    report: &mut TickReport,
  ) where
    V: ChunkVisuals + ?Sized,
    D: DebrisSink + ?Sized,
  {
    if primary {
      self.claimed.remove(&coord);
    } else {
      self.remeshes_in_flight = self.remeshes_in_flight.saturating_sub(1);
    }

    let Some(chunk) = store.get_mut(coord).filter(|chunk| chunk.id == id) else {
      debug!(%coord, primary, "discarding stale mesh result");
      self.metrics.record_stale();
      report.stale_discarded += 1;
      return;
    };

    trace!(%coord, primary, triangles = mesh.triangle_count(), "mesh complete");
    chunk.mesh_in_flight = false;
    visuals.assign_mesh(coord, &mesh);
    let previous = chunk.mesh.replace(mesh).map_or(0, |old| old.triangle_count());
    let installed = chunk.mesh.as_ref().map_or(0, MeshOutput::triangle_count);
    self.metrics.record_mesh_installed(installed, previous);
    report.meshes_installed.push(coord);

    let applied = editor::apply_pending(chunk, debris);
    report.carves_applied += applied;
    self.metrics.record_carves(applied, 0);
  }

  // ===========================================================================
  // Spawning
  // ===========================================================================

  /// Start a remesh for every idle chunk flagged `needs_remesh`.
  ///
  /// Remeshes are not limited by the primary budget.
  pub fn start_remeshes(&mut self, store: &mut ChunkStore, report: &mut TickReport) {
    for chunk in store.iter_mut() {
      if chunk.needs_remesh && !chunk.is_busy() && self.spawn_mesh(chunk, false) {
        report.remeshes_started += 1;
      }
    }
  }

  /// Admit the nearest chunks still needing voxels into the primary pipeline,
  /// up to the configured budget.
  pub fn start_primary(&mut self, store: &mut ChunkStore, report: &mut TickReport) {
    while self.claimed.len() < self.max_primary_tasks {
      let Some(chunk) = store.nearest_needing_voxelize().and_then(|coord| store.get_mut(coord)) else {
        break;
      };
      self.spawn_generation(chunk);
      report.primary_started += 1;
    }
  }

  fn spawn_generation(&mut self, chunk: &mut Chunk) {
    let (coord, id) = (chunk.coord, chunk.id);
    chunk.generating = true;
    self.claimed.insert(coord);

    let field = Arc::clone(&self.field);
    let layout = self.layout;
    let voxel_size = self.voxel_size;
    let origin = coord.origin(self.chunk_size);

    trace!(%coord, "spawning generation");
    self.executor.spawn(move || {
      let _span = info_span!("generate_chunk", %coord).entered();
      let start = Instant::now();
      let buffer = VoxelBuffer::generate(field.as_ref(), layout, origin, voxel_size);
      TaskOutput::Generated {
        coord,
        id,
        buffer,
        elapsed_us: start.elapsed().as_micros() as u64,
      }
    });
  }

  /// Returns false when the chunk has no voxels to mesh.
  fn spawn_mesh(&mut self, chunk: &mut Chunk, primary: bool) -> bool {
    let Some(voxels) = chunk.voxels.clone() else {
      return false;
    };
    let (coord, id) = (chunk.coord, chunk.id);
    chunk.mesh_in_flight = true;
    chunk.needs_remesh = false;
    if !primary {
      self.remeshes_in_flight += 1;
    }

    let config = self.mesher.clone();
    trace!(%coord, primary, "spawning mesh");
    self.executor.spawn(move || {
      let _span = info_span!("mesh_chunk", %coord, primary).entered();
      let start = Instant::now();
      let mesh = {
        let buffer = voxels.read();
        mesher::generate(&buffer, &config)
      };
      drop(voxels);
      TaskOutput::Meshed {
        coord,
        id,
        mesh,
        primary,
        elapsed_us: start.elapsed().as_micros() as u64,
      }
    });
    true
  }

  // ===========================================================================
  // Shutdown
  // ===========================================================================

  /// Wait for every outstanding task and discard the results.
  ///
  /// Returns how many results were dropped.
  pub fn shutdown(&mut self) -> usize {
    let discarded = self.executor.wait_all().len();
    self.claimed.clear();
    self.remeshes_in_flight = 0;
    discarded
  }
}

#[cfg(test)]
#[path = "scheduler_test.rs"]
mod scheduler_test;
