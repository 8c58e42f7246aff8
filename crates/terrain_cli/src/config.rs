//! Configuration parsing for the terrain flythrough.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use voxel_terrain::{NoiseTerrain, TerrainConfig};

/// Root configuration: a `[terrain]` table and a `[noise]` table.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
	/// Chunk sizing, streaming radius and scheduler budget.
	pub terrain: TerrainConfig,
	/// Shape of the generated terrain.
	pub noise: NoiseConfig,
}

/// Parameters for [`NoiseTerrain`].
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct NoiseConfig {
	pub seed: u32,
	/// Horizontal frequency of the heightfield (smaller = broader hills).
	pub frequency: f64,
	pub octaves: usize,
	/// Mean surface height in world units.
	pub base_height: f32,
	/// Peak deviation from `base_height`.
	pub amplitude: f32,
	/// Weight of the 3D noise term (0 = pure heightfield).
	pub overhang: f32,
}

impl Default for NoiseConfig {
	fn default() -> Self {
		Self {
			seed: 1337,
			frequency: 0.01,
			octaves: 4,
			base_height: 0.0,
			amplitude: 16.0,
			overhang: 0.0,
		}
	}
}

impl NoiseConfig {
	/// Build the density field described by this table.
	pub fn build(&self) -> NoiseTerrain {
		NoiseTerrain::with_shape(self.seed, self.frequency, self.octaves)
			.with_base_height(self.base_height)
			.with_amplitude(self.amplitude)
			.with_overhang(self.overhang)
	}
}

impl Config {
	/// Load configuration from a TOML file, or use defaults when no path is given.
	pub fn load(path: Option<&Path>) -> Result<Self> {
		let config = match path {
			Some(path) => {
				let content = std::fs::read_to_string(path)
					.with_context(|| format!("Failed to read config file: {}", path.display()))?;
				toml::from_str(&content).with_context(|| "Failed to parse config TOML")?
			}
			None => Config::default(),
		};

		config.validate()?;
		Ok(config)
	}

	fn validate(&self) -> Result<()> {
		self.terrain
			.validate()
			.context("Invalid [terrain] table")?;

		if self.noise.octaves == 0 {
			anyhow::bail!("noise.octaves must be at least 1");
		}
		if !(self.noise.frequency.is_finite() && self.noise.frequency > 0.0) {
			anyhow::bail!(
				"noise.frequency must be positive, got {}",
				self.noise.frequency
			);
		}

		Ok(())
	}
}
