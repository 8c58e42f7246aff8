//! Terrain - per-tick orchestration of streaming, scheduling and edits.
//!
//! # Tick order
//!
//! ```text
//! poll completions ─► stream chunks ─► refresh distances ─► start remeshes ─► admit primary
//! ```
//!
//! Completions are installed before streaming so a primary chunk whose mesh
//! just landed is released from its claim and can be unloaded the same tick.

use std::sync::Arc;

use glam::Vec3;
use tracing::{info, info_span};

use crate::chunk::{Chunk, ChunkCoord};
use crate::chunk_store::ChunkStore;
use crate::config::TerrainConfig;
use crate::density::DensityField;
use crate::editor::{self, CarveReport, SphereCarve};
use crate::error::TerrainError;
use crate::hooks::{ChunkVisuals, DebrisSink};
use crate::metrics::TerrainMetrics;
use crate::scheduler::Scheduler;

/// What happened during one [`Terrain::tick`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
  /// Chunks that entered the store, ascending.
  pub created: Vec<ChunkCoord>,
  /// Chunks that left the store, ascending.
  pub removed: Vec<ChunkCoord>,
  /// Chunks whose mesh was installed this tick.
  pub meshes_installed: Vec<ChunkCoord>,
  /// Completions dropped because their chunk was gone or replaced.
  pub stale_discarded: usize,
  pub remeshes_started: usize,
  pub primary_started: usize,
  /// Queued carves applied after their chunk became idle.
  pub carves_applied: usize,
}

/// Streamed, editable voxel terrain around a single viewer.
pub struct Terrain<F> {
  config: TerrainConfig,
  store: ChunkStore,
  scheduler: Scheduler<F>,
}

impl<F: DensityField + 'static> Terrain<F> {
  pub fn new(config: TerrainConfig, field: F) -> Result<Self, TerrainError> {
    Self::with_shared_field(config, Arc::new(field))
  }

  /// Build a terrain around a field shared with other owners.
  pub fn with_shared_field(config: TerrainConfig, field: Arc<F>) -> Result<Self, TerrainError> {
    config.validate()?;
    let scheduler = Scheduler::new(&config, field)?;
    Ok(Self {
      store: ChunkStore::new(config.chunk_size()),
      config,
      scheduler,
    })
  }

  /// Advance the terrain by one frame.
  ///
  /// Never blocks on worker tasks.
  pub fn tick<V, D>(&mut self, viewer: Vec3, visuals: &mut V, debris: &mut D) -> TickReport
  where
    V: ChunkVisuals + ?Sized,
    D: DebrisSink + ?Sized,
  {
    let _span = info_span!("terrain_tick").entered();
    let mut report = TickReport::default();

    self.scheduler.poll(&mut self.store, visuals, debris, &mut report);

    let changes = self
      .store
      .update_streaming(viewer, self.config.load_radius, self.scheduler.claimed());
    let chunk_size = self.store.chunk_size();
    for &coord in &changes.created {
      visuals.create_chunk(coord, coord.origin(chunk_size));
    }
    for chunk in &changes.removed {
      self.release(chunk, visuals);
      report.removed.push(chunk.coord);
    }
    self
      .scheduler
      .metrics_mut()
      .record_streaming(changes.created.len(), changes.removed.len());
    report.created = changes.created;

    self.store.update_distances(viewer);
    self.scheduler.start_remeshes(&mut self.store, &mut report);
    self.scheduler.start_primary(&mut self.store, &mut report);

    report
  }

  /// Carve a sphere out of every loaded chunk it touches.
  ///
  /// Chunks with a task in flight receive the carve once the task completes.
  pub fn subtract_sphere<D: DebrisSink + ?Sized>(&mut self, center: Vec3, radius: f32, debris: &mut D) -> CarveReport {
    let carve = SphereCarve::new(center, radius);
    let report = editor::subtract_sphere(&mut self.store, carve, self.config.voxel_size, debris);
    self
      .scheduler
      .metrics_mut()
      .record_carves(report.carved.len(), report.deferred.len());
    report
  }

  /// Wait for all outstanding tasks, discard their results and unload every
  /// chunk. Returns the number of discarded results.
  pub fn shutdown<V: ChunkVisuals + ?Sized>(&mut self, visuals: &mut V) -> usize {
    let discarded = self.scheduler.shutdown();
    let chunks: Vec<Chunk> = self.store.drain().collect();
    for chunk in &chunks {
      self.release(chunk, visuals);
    }
    info!(discarded, unloaded = chunks.len(), "terrain shut down");
    discarded
  }

  fn release<V: ChunkVisuals + ?Sized>(&mut self, chunk: &Chunk, visuals: &mut V) {
    if let Some(mesh) = &chunk.mesh {
      self.scheduler.metrics_mut().remove_triangles(mesh.triangle_count());
    }
    visuals.destroy_chunk(chunk.coord);
  }

  pub fn config(&self) -> &TerrainConfig {
    &self.config
  }

  pub fn store(&self) -> &ChunkStore {
    &self.store
  }

  pub fn chunk(&self, coord: ChunkCoord) -> Option<&Chunk> {
    self.store.get(coord)
  }

  pub fn metrics(&self) -> &TerrainMetrics {
    self.scheduler.metrics()
  }

  /// Chunks in the generation → first mesh pipeline.
  pub fn primary_in_flight(&self) -> usize {
    self.scheduler.primary_in_flight()
  }

  /// Tasks spawned but not yet collected.
  pub fn pending_tasks(&self) -> usize {
    self.scheduler.pending_tasks()
  }
}

#[cfg(test)]
#[path = "terrain_test.rs"]
mod terrain_test;
