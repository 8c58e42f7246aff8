use super::*;

#[test]
fn test_plane_value_and_gradient() {
  let field = PlaneField::new(2.0).with_material(3);
  let v = field.sample(Vec3::new(10.0, 5.0, -4.0));

  assert_eq!(v.value, 3.0);
  assert_eq!(v.gradient, Vec3::Y);
  assert_eq!(v.material, 3);
  assert!(field.sample(Vec3::new(0.0, 1.0, 0.0)).is_solid());
}

#[test]
fn test_sphere_gradient_points_outward() {
  let field = SphereField::new(Vec3::new(1.0, 1.0, 1.0), 4.0);

  let inside = field.sample(Vec3::new(1.0, 2.0, 1.0));
  assert_eq!(inside.value, -3.0);
  assert!((inside.gradient - Vec3::Y).length() < 1e-6);

  let outside = field.sample(Vec3::new(7.0, 1.0, 1.0));
  assert_eq!(outside.value, 2.0);
  assert!((outside.gradient - Vec3::X).length() < 1e-6);
}

#[test]
fn test_sphere_center_is_finite() {
  let field = SphereField::new(Vec3::ZERO, 1.0);
  let v = field.sample(Vec3::ZERO);
  assert!(v.is_finite());
  assert_eq!(v.value, -1.0);
}

#[test]
fn test_noise_terrain_is_deterministic() {
  let a = NoiseTerrain::new(7);
  let b = NoiseTerrain::new(7);
  let p = Vec3::new(12.3, -4.0, 98.1);

  assert_eq!(a.sample(p), b.sample(p));
}

#[test]
fn test_noise_terrain_is_finite() {
  let field = NoiseTerrain::new(42).with_overhang(4.0);
  for i in 0..200 {
    let p = Vec3::new(i as f32 * 7.13 - 500.0, i as f32 * 0.37 - 30.0, i as f32 * -3.9);
    assert!(field.sample(p).is_finite(), "non-finite sample at {p}");
  }
}

#[test]
fn test_noise_terrain_solid_below_surface() {
  let field = NoiseTerrain::new(1).with_amplitude(8.0);
  let h = field.surface_height(3.0, 5.0);

  assert!(field.sample(Vec3::new(3.0, h - 2.0, 5.0)).is_solid());
  assert!(!field.sample(Vec3::new(3.0, h + 2.0, 5.0)).is_solid());
}

/// The gradient must track the slope of `value`.
#[test]
fn test_noise_gradient_matches_slope() {
  let field = NoiseTerrain::new(9).with_overhang(2.0);
  let p = Vec3::new(20.0, 3.0, -11.0);
  let step = 0.01;

  let v = field.sample(p);
  let ahead = field.sample(p + v.gradient.normalize() * step);
  assert!(ahead.value > v.value, "value should increase along the gradient");
}

#[test]
fn test_noise_material_bands() {
  let field = NoiseTerrain::new(3);
  let h = field.surface_height(0.0, 0.0);

  assert_eq!(field.sample(Vec3::new(0.0, h - 0.5, 0.0)).material, materials::TOPSOIL);
  assert_eq!(field.sample(Vec3::new(0.0, h - 3.0, 0.0)).material, materials::DIRT);
  assert_eq!(field.sample(Vec3::new(0.0, h - 20.0, 0.0)).material, materials::STONE);
}

#[test]
fn test_central_gradient_of_linear_function() {
  let g = central_gradient(|p| 2.0 * p.x - p.y + 0.5 * p.z, Vec3::new(3.0, 1.0, -2.0), 0.1);
  assert!((g - Vec3::new(2.0, -1.0, 0.5)).length() < 1e-4);
}

#[test]
fn test_boxed_and_shared_fields_forward() {
  let boxed: Box<dyn DensityField> = Box::new(PlaneField::new(0.0));
  let shared: Arc<dyn DensityField> = Arc::new(PlaneField::new(0.0));
  let p = Vec3::new(0.0, 1.5, 0.0);

  assert_eq!(boxed.sample(p).value, 1.5);
  assert_eq!(shared.sample(p).value, 1.5);
}
