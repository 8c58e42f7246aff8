//! Headless terrain flythrough.
//!
//! Streams noise terrain around a viewer that flies along +X, carving a
//! crater into the ground below it every few ticks. Stands in for a game
//! loop: chunk visuals and debris are counted instead of rendered.

mod config;

use anyhow::{Context, Result};
use clap::Parser;
use glam::Vec3;
use log::{debug, info};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use voxel_terrain::{ChunkCoord, ChunkVisuals, DebrisSink, MaterialId, MeshOutput, Terrain};

use config::Config;

/// Headless flythrough driver for voxel terrain.
#[derive(Parser, Debug)]
#[command(name = "terrain_flythrough")]
#[command(about = "Streams and carves voxel terrain around a moving viewer")]
struct Args {
	/// Path to configuration TOML file (defaults when omitted).
	#[arg(short, long)]
	config: Option<PathBuf>,

	/// Number of ticks to simulate.
	#[arg(short, long, default_value_t = 600)]
	ticks: u32,

	/// Viewer speed in world units per tick.
	#[arg(short, long, default_value_t = 0.5)]
	speed: f32,

	/// Carve every N ticks (0 disables carving).
	#[arg(long, default_value_t = 60)]
	carve_every: u32,

	/// Radius of each carved sphere.
	#[arg(long, default_value_t = 4.0)]
	carve_radius: f32,

	/// Override the noise seed from the config file.
	#[arg(long)]
	seed: Option<u32>,

	/// Sleep between ticks in milliseconds.
	#[arg(long, default_value_t = 16)]
	frame_ms: u64,
}

/// Height of the viewer above the ground.
const EYE_HEIGHT: f32 = 12.0;

/// Counts host-side chunk objects.
#[derive(Default)]
struct CountingVisuals {
	live: usize,
	meshes_assigned: usize,
	triangles_assigned: usize,
}

impl ChunkVisuals for CountingVisuals {
	fn create_chunk(&mut self, _coord: ChunkCoord, _origin: Vec3) {
		self.live += 1;
	}

	fn destroy_chunk(&mut self, _coord: ChunkCoord) {
		self.live = self.live.saturating_sub(1);
	}

	fn assign_mesh(&mut self, _coord: ChunkCoord, mesh: &MeshOutput) {
		self.meshes_assigned += 1;
		self.triangles_assigned += mesh.triangle_count();
	}
}

/// Tallies debris events per material.
#[derive(Default)]
struct DebrisTally {
	per_material: BTreeMap<MaterialId, usize>,
}

impl DebrisSink for DebrisTally {
	fn on_debris(&mut self, _position: Vec3, material: MaterialId) {
		*self.per_material.entry(material).or_default() += 1;
	}
}

impl DebrisTally {
	fn total(&self) -> usize {
		self.per_material.values().sum()
	}
}

fn main() -> Result<()> {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
	let args = Args::parse();

	if let Some(path) = &args.config {
		info!("Loading config from: {}", path.display());
	}
	let mut config = Config::load(args.config.as_deref())?;
	if let Some(seed) = args.seed {
		config.noise.seed = seed;
	}

	let field = Arc::new(config.noise.build());
	let mut terrain = Terrain::with_shared_field(config.terrain.clone(), Arc::clone(&field))
		.context("Failed to start terrain")?;

	info!(
		"Flying {} ticks at {} units/tick (chunk size {}, load radius {})",
		args.ticks,
		args.speed,
		config.terrain.chunk_size(),
		config.terrain.load_radius
	);

	let mut visuals = CountingVisuals::default();
	let mut debris = DebrisTally::default();
	let started = Instant::now();

	for tick in 0..args.ticks {
		let x = tick as f32 * args.speed;
		let ground = field.surface_height(x, 0.0);
		let viewer = Vec3::new(x, ground + EYE_HEIGHT, 0.0);

		let report = terrain.tick(viewer, &mut visuals, &mut debris);
		if !report.created.is_empty() || !report.removed.is_empty() || !report.meshes_installed.is_empty() {
			debug!(
				"tick {tick}: +{} -{} chunks, {} meshes, {} remeshes, {} stale",
				report.created.len(),
				report.removed.len(),
				report.meshes_installed.len(),
				report.remeshes_started,
				report.stale_discarded
			);
		}

		if args.carve_every > 0 && tick > 0 && tick % args.carve_every == 0 {
			let carve = terrain.subtract_sphere(Vec3::new(x, ground, 0.0), args.carve_radius, &mut debris);
			info!(
				"tick {tick}: carved {} chunks ({} deferred), {} voxels changed, {} debris",
				carve.carved.len(),
				carve.deferred.len(),
				carve.voxels_changed,
				carve.debris
			);
		}

		if args.frame_ms > 0 {
			std::thread::sleep(Duration::from_millis(args.frame_ms));
		}
	}

	let elapsed = started.elapsed();
	let metrics = terrain.metrics().clone();
	let live_chunks = terrain.store().len();
	let discarded = terrain.shutdown(&mut visuals);

	info!("Done in {:.2}s", elapsed.as_secs_f64());
	info!(
		"Chunks: {} live at exit, {} loaded, {} unloaded",
		live_chunks, metrics.chunks_loaded, metrics.chunks_unloaded
	);
	info!(
		"Meshes: {} installed ({} assigned, {} triangles), {} stale discarded, {} discarded at shutdown",
		metrics.meshes_installed,
		visuals.meshes_assigned,
		visuals.triangles_assigned,
		metrics.stale_discarded,
		discarded
	);
	info!(
		"Timings: generate avg {:.0}us, mesh avg {:.0}us",
		metrics.avg_generate_timing_us(),
		metrics.avg_mesh_timing_us()
	);
	info!(
		"Carves: {} applied, {} deferred, {} debris",
		metrics.carves_applied,
		metrics.carves_deferred,
		debris.total()
	);
	for (material, count) in &debris.per_material {
		debug!("  material {material}: {count} debris");
	}
	debug!("Visual objects left alive: {}", visuals.live);

	Ok(())
}
