//! Engine-agnostic metrics collection for terrain streaming statistics.
//!
//! Feature-gated and runtime-toggled to ensure zero overhead when disabled.
//!
//! # Usage
//!
//! ```ignore
//! use voxel_terrain::metrics::{TerrainMetrics, COLLECT_METRICS};
//!
//! // Compile with --features metrics
//! // Runtime toggle:
//! COLLECT_METRICS.store(false, Ordering::Relaxed);
//!
//! // Read after some ticks:
//! let avg = terrain.metrics().avg_mesh_timing_us();
//! ```

use std::collections::VecDeque;
use std::sync::atomic::AtomicBool;
#[cfg(feature = "metrics")]
use std::sync::atomic::Ordering;

/// Runtime toggle for metrics collection.
/// Set to false to disable metrics gathering at runtime.
pub static COLLECT_METRICS: AtomicBool = AtomicBool::new(true);

/// Check if metrics collection is enabled (both compile-time and runtime).
#[inline]
pub fn is_enabled() -> bool {
  #[cfg(feature = "metrics")]
  {
    COLLECT_METRICS.load(Ordering::Relaxed)
  }
  #[cfg(not(feature = "metrics"))]
  {
    false
  }
}

/// Most recent task timings in microseconds, with a running total.
#[derive(Debug, Clone)]
pub struct TimingWindow {
  samples: VecDeque<u64>,
  capacity: usize,
  total: u64,
}

impl TimingWindow {
  pub fn new(capacity: usize) -> Self {
    Self {
      samples: VecDeque::with_capacity(capacity),
      capacity,
      total: 0,
    }
  }

  /// Record a timing, evicting the oldest once full.
  pub fn push(&mut self, timing_us: u64) {
    if self.capacity == 0 {
      return;
    }
    if self.samples.len() == self.capacity {
      if let Some(oldest) = self.samples.pop_front() {
        self.total -= oldest;
      }
    }
    self.samples.push_back(timing_us);
    self.total += timing_us;
  }

  pub fn len(&self) -> usize {
    self.samples.len()
  }

  pub fn is_empty(&self) -> bool {
    self.samples.is_empty()
  }

  pub fn clear(&mut self) {
    self.samples.clear();
    self.total = 0;
  }

  pub fn total(&self) -> u64 {
    self.total
  }

  /// Mean of the window, 0 when empty.
  pub fn average(&self) -> f64 {
    if self.samples.is_empty() {
      0.0
    } else {
      self.total as f64 / self.samples.len() as f64
    }
  }
}

impl Default for TimingWindow {
  fn default() -> Self {
    Self::new(128)
  }
}

/// Terrain statistics, updated by the scheduler and editor.
#[derive(Debug, Clone, Default)]
pub struct TerrainMetrics {
  // Timing
  /// Recent generation task times.
  pub generate_timings: TimingWindow,
  /// Recent mesh task times.
  pub mesh_timings: TimingWindow,

  // Streaming
  pub chunks_loaded: u64,
  pub chunks_unloaded: u64,

  // Results
  pub meshes_installed: u64,
  /// Completions discarded because their chunk was gone or replaced.
  pub stale_discarded: u64,
  /// Triangles across all currently installed meshes.
  pub live_triangles: u64,

  // Edits
  pub carves_applied: u64,
  pub carves_deferred: u64,
}

impl TerrainMetrics {
  pub fn new() -> Self {
    Self::default()
  }

  /// Reset timings, keeping cumulative counters.
  pub fn reset_timings(&mut self) {
    self.generate_timings.clear();
    self.mesh_timings.clear();
  }

  pub fn record_generate_timing(&mut self, timing_us: u64) {
    if is_enabled() {
      self.generate_timings.push(timing_us);
    }
  }

  pub fn record_mesh_timing(&mut self, timing_us: u64) {
    if is_enabled() {
      self.mesh_timings.push(timing_us);
    }
  }

  pub fn record_streaming(&mut self, loaded: usize, unloaded: usize) {
    if is_enabled() {
      self.chunks_loaded += loaded as u64;
      self.chunks_unloaded += unloaded as u64;
    }
  }

  /// A mesh replaced `previous_triangles` worth of geometry.
  pub fn record_mesh_installed(&mut self, triangles: usize, previous_triangles: usize) {
    if is_enabled() {
      self.meshes_installed += 1;
      self.live_triangles = (self.live_triangles + triangles as u64).saturating_sub(previous_triangles as u64);
    }
  }

  /// A meshed chunk was unloaded.
  pub fn remove_triangles(&mut self, triangles: usize) {
    if is_enabled() {
      self.live_triangles = self.live_triangles.saturating_sub(triangles as u64);
    }
  }

  pub fn record_stale(&mut self) {
    if is_enabled() {
      self.stale_discarded += 1;
    }
  }

  pub fn record_carves(&mut self, applied: usize, deferred: usize) {
    if is_enabled() {
      self.carves_applied += applied as u64;
      self.carves_deferred += deferred as u64;
    }
  }

  pub fn avg_generate_timing_us(&self) -> f64 {
    self.generate_timings.average()
  }

  pub fn avg_mesh_timing_us(&self) -> f64 {
    self.mesh_timings.average()
  }
}

#[cfg(all(test, feature = "metrics"))]
mod tests {
  use super::*;

  #[test]
  fn test_timing_window_evicts_oldest() {
    let mut window = TimingWindow::new(3);
    assert!(window.is_empty());

    for timing in [10, 20, 30] {
      window.push(timing);
    }
    assert_eq!(window.total(), 60);
    assert_eq!(window.average(), 20.0);

    window.push(40);
    assert_eq!(window.len(), 3);
    assert_eq!(window.total(), 90);
    assert_eq!(window.average(), 30.0);

    window.clear();
    assert_eq!(window.total(), 0);
    assert_eq!(window.average(), 0.0);
  }

  #[test]
  fn test_zero_capacity_window_stays_empty() {
    let mut window = TimingWindow::new(0);
    window.push(5);
    assert!(window.is_empty());
    assert_eq!(window.total(), 0);
  }

  #[test]
  fn test_triangle_accounting() {
    let mut metrics = TerrainMetrics::new();

    metrics.record_mesh_installed(100, 0);
    metrics.record_mesh_installed(50, 0);
    // Remesh of the first chunk.
    metrics.record_mesh_installed(80, 100);
    assert_eq!(metrics.meshes_installed, 3);
    assert_eq!(metrics.live_triangles, 130);

    metrics.remove_triangles(50);
    assert_eq!(metrics.live_triangles, 80);
    metrics.remove_triangles(500);
    assert_eq!(metrics.live_triangles, 0);
  }

  #[test]
  fn test_timing_recording() {
    let mut metrics = TerrainMetrics::new();

    metrics.record_mesh_timing(1000);
    metrics.record_mesh_timing(2000);
    metrics.record_mesh_timing(3000);
    metrics.record_generate_timing(10);

    assert_eq!(metrics.mesh_timings.len(), 3);
    assert_eq!(metrics.avg_mesh_timing_us(), 2000.0);
    assert_eq!(metrics.avg_generate_timing_us(), 10.0);

    metrics.reset_timings();
    assert!(metrics.mesh_timings.is_empty());
  }

  #[test]
  fn test_counters() {
    let mut metrics = TerrainMetrics::new();
    metrics.record_streaming(5, 2);
    metrics.record_stale();
    metrics.record_carves(3, 1);

    assert_eq!((metrics.chunks_loaded, metrics.chunks_unloaded), (5, 2));
    assert_eq!(metrics.stale_discarded, 1);
    assert_eq!((metrics.carves_applied, metrics.carves_deferred), (3, 1));
  }
}
