//! Density fields: pure `world position → Voxel` functions.
//!
//! A field must be deterministic and total: every finite input yields a
//! finite value and a finite gradient. Generation asserts this.
//!
//! Three fields ship with the crate:
//! - [`PlaneField`]: half-space, handy for checking chunk alignment
//! - [`SphereField`]: radial SDF
//! - [`NoiseTerrain`]: fractal Perlin heightfield with optional overhangs

use std::sync::Arc;

use glam::{DVec2, Vec3};
use noise::{Fbm, MultiFractal, NoiseFn, Perlin};

use crate::types::{MaterialId, Voxel};

/// Scalar field sampled at chunk lattice points.
///
/// Implementations are shared across worker threads and called concurrently
/// for different positions.
pub trait DensityField: Send + Sync {
  /// Sample value, gradient and material at a world position.
  fn sample(&self, world_pos: Vec3) -> Voxel;
}

impl<F: DensityField + ?Sized> DensityField for Arc<F> {
  #[inline]
  fn sample(&self, world_pos: Vec3) -> Voxel {
    (**self).sample(world_pos)
  }
}

impl<F: DensityField + ?Sized> DensityField for Box<F> {
  #[inline]
  fn sample(&self, world_pos: Vec3) -> Voxel {
    (**self).sample(world_pos)
  }
}

/// Horizontal half-space: solid below `height`, empty above.
///
/// `value = y - height`, gradient `(0, 1, 0)`.
#[derive(Clone, Debug, Default)]
pub struct PlaneField {
  pub height: f32,
  pub material: MaterialId,
}

impl PlaneField {
  pub fn new(height: f32) -> Self {
    Self {
      height,
      material: 0,
    }
  }

  pub fn with_material(mut self, material: MaterialId) -> Self {
    self.material = material;
    self
  }
}

impl DensityField for PlaneField {
  fn sample(&self, world_pos: Vec3) -> Voxel {
    Voxel::new(world_pos.y - self.height, Vec3::Y, self.material)
  }
}

/// Solid ball: `value = |p - center| - radius`.
#[derive(Clone, Debug)]
pub struct SphereField {
  pub center: Vec3,
  pub radius: f32,
  pub material: MaterialId,
}

impl SphereField {
  pub fn new(center: Vec3, radius: f32) -> Self {
    Self {
      center,
      radius,
      material: 0,
    }
  }
}

impl DensityField for SphereField {
  fn sample(&self, world_pos: Vec3) -> Voxel {
    let offset = world_pos - self.center;
    let distance = offset.length();
    // The gradient is undefined at the exact center; any unit vector works.
    let gradient = if distance > f32::EPSILON {
      offset / distance
    } else {
      Vec3::Y
    };
    Voxel::new(distance - self.radius, gradient, self.material)
  }
}

/// Material bands below the terrain surface.
pub mod materials {
  use crate::types::MaterialId;

  pub const TOPSOIL: MaterialId = 0;
  pub const DIRT: MaterialId = 1;
  pub const STONE: MaterialId = 2;
}

/// Fractal Perlin terrain.
///
/// `value = y - (base_height + amplitude * fbm2(x, z)) + overhang * fbm3(p)`
///
/// The gradient is a central difference of the same expression, so it stays
/// consistent with `value` everywhere (including after the overhang term).
#[derive(Clone)]
pub struct NoiseTerrain {
  surface: Fbm<Perlin>,
  caves: Fbm<Perlin>,
  /// Mean surface height in world units.
  pub base_height: f32,
  /// Peak deviation of the heightfield from `base_height`.
  pub amplitude: f32,
  /// Weight of the 3D noise term (0 disables overhangs).
  pub overhang: f32,
  /// Step used for the finite-difference gradient.
  pub gradient_step: f32,
  /// Depth below the surface where dirt gives way to stone.
  pub stone_depth: f32,
}

impl NoiseTerrain {
  /// Create terrain with default shape for the given seed.
  pub fn new(seed: u32) -> Self {
    Self::with_shape(seed, 0.01, 4)
  }

  /// Create terrain with a custom horizontal frequency and octave count.
  ///
  /// Smaller frequencies give larger terrain features.
  pub fn with_shape(seed: u32, frequency: f64, octaves: usize) -> Self {
    let surface = Fbm::<Perlin>::new(seed)
      .set_octaves(octaves)
      .set_frequency(frequency)
      .set_lacunarity(2.0)
      .set_persistence(0.5);
    let caves = Fbm::<Perlin>::new(seed.wrapping_add(1))
      .set_octaves(2)
      .set_frequency(frequency * 3.0);

    Self {
      surface,
      caves,
      base_height: 0.0,
      amplitude: 16.0,
      overhang: 0.0,
      gradient_step: 0.05,
      stone_depth: 6.0,
    }
  }

  pub fn with_base_height(mut self, height: f32) -> Self {
    self.base_height = height;
    self
  }

  pub fn with_amplitude(mut self, amplitude: f32) -> Self {
    self.amplitude = amplitude;
    self
  }

  pub fn with_overhang(mut self, overhang: f32) -> Self {
    self.overhang = overhang;
    self
  }

  /// Surface height of the 2D heightfield at (x, z).
  pub fn surface_height(&self, x: f32, z: f32) -> f32 {
    let n = self.surface.get(DVec2::new(x as f64, z as f64).to_array()) as f32;
    self.base_height + n * self.amplitude
  }

  fn value(&self, p: Vec3) -> f32 {
    let mut value = p.y - self.surface_height(p.x, p.z);
    if self.overhang != 0.0 {
      let n = self.caves.get(p.as_dvec3().to_array()) as f32;
      value += n * self.overhang;
    }
    value
  }

  fn material_at(&self, p: Vec3) -> MaterialId {
    let depth = self.surface_height(p.x, p.z) - p.y;
    if depth < 1.5 {
      materials::TOPSOIL
    } else if depth < self.stone_depth {
      materials::DIRT
    } else {
      materials::STONE
    }
  }
}

impl DensityField for NoiseTerrain {
  fn sample(&self, world_pos: Vec3) -> Voxel {
    let h = self.gradient_step;
    let gradient = central_gradient(|p| self.value(p), world_pos, h);
    Voxel::new(self.value(world_pos), gradient, self.material_at(world_pos))
  }
}

/// Central-difference gradient of `f` at `p` with step `h`.
pub fn central_gradient(f: impl Fn(Vec3) -> f32, p: Vec3, h: f32) -> Vec3 {
  let inv = 1.0 / (2.0 * h);
  let dx = f(p + Vec3::X * h) - f(p - Vec3::X * h);
  let dy = f(p + Vec3::Y * h) - f(p - Vec3::Y * h);
  let dz = f(p + Vec3::Z * h) - f(p - Vec3::Z * h);
  Vec3::new(dx, dy, dz) * inv
}

#[cfg(test)]
#[path = "density_test.rs"]
mod density_test;
