use super::*;

const SIZE: f32 = 16.0;

fn brute_force(viewer: Vec3, radius: f32, span: i32) -> Vec<ChunkCoord> {
  let mut coords = Vec::new();
  for x in -span..=span {
    for y in -span..=span {
      for z in -span..=span {
        let coord = ChunkCoord::new(x, y, z);
        if coord.aabb(SIZE).distance_to_point(viewer) <= radius {
          coords.push(coord);
        }
      }
    }
  }
  coords
}

/// Viewer at the origin with a radius of 1.5 chunks loads exactly the chunks
/// whose bounds come within that radius.
#[test]
fn test_load_sphere_matches_brute_force() {
  let mut store = ChunkStore::new(SIZE);
  let radius = 1.5 * SIZE;

  let changes = store.update_streaming(Vec3::ZERO, radius, &HashSet::new());

  let expected = brute_force(Vec3::ZERO, radius, 5);
  assert_eq!(store.coords(), expected);
  assert_eq!(changes.created, expected);
  assert!(changes.removed.is_empty());
  // 4³ candidates minus the 8 corner chunks (sqrt(3) * 16 > 24).
  assert_eq!(store.len(), 56);
}

#[test]
fn test_off_grid_viewer_matches_brute_force() {
  let mut store = ChunkStore::new(SIZE);
  let viewer = Vec3::new(37.2, -5.5, 100.1);

  store.update_streaming(viewer, 30.0, &HashSet::new());

  let expected: Vec<_> = brute_force(viewer, 30.0, 12);
  assert_eq!(store.coords(), expected);
}

#[test]
fn test_streaming_is_idempotent() {
  let mut store = ChunkStore::new(SIZE);
  store.update_streaming(Vec3::ZERO, 20.0, &HashSet::new());
  let before = store.len();

  let changes = store.update_streaming(Vec3::ZERO, 20.0, &HashSet::new());

  assert!(changes.created.is_empty());
  assert!(changes.removed.is_empty());
  assert_eq!(store.len(), before);
}

#[test]
fn test_moving_viewer_removes_far_chunks() {
  let mut store = ChunkStore::new(SIZE);
  store.update_streaming(Vec3::ZERO, 8.0, &HashSet::new());
  assert!(store.contains(ChunkCoord::new(0, 0, 0)));

  let viewer = Vec3::new(200.0, 0.0, 0.0);
  let changes = store.update_streaming(viewer, 8.0, &HashSet::new());

  assert!(!store.contains(ChunkCoord::new(0, 0, 0)));
  assert!(changes.removed.iter().any(|c| c.coord == ChunkCoord::new(0, 0, 0)));
  assert!(store.iter().all(|c| store.should_load(c.coord, viewer, 8.0)));
}

#[test]
fn test_claimed_chunk_survives_removal() {
  let mut store = ChunkStore::new(SIZE);
  store.update_streaming(Vec3::ZERO, 8.0, &HashSet::new());
  let claimed_coord = ChunkCoord::new(-1, -1, -1);
  let claimed: HashSet<_> = [claimed_coord].into_iter().collect();

  let far = Vec3::splat(500.0);
  let changes = store.update_streaming(far, 8.0, &claimed);

  assert!(store.contains(claimed_coord));
  assert!(changes.removed.iter().all(|c| c.coord != claimed_coord));

  // Released on the next pass once unclaimed.
  let changes = store.update_streaming(far, 8.0, &HashSet::new());
  assert!(!store.contains(claimed_coord));
  assert_eq!(changes.removed.len(), 1);
}

#[test]
fn test_nearest_needing_voxelize() {
  let mut store = ChunkStore::new(SIZE);
  let viewer = Vec3::new(40.0, 8.0, 8.0);
  store.update_streaming(viewer, 40.0, &HashSet::new());
  store.update_distances(viewer);

  // Viewer sits inside chunk (2, 0, 0).
  assert_eq!(store.nearest_needing_voxelize(), Some(ChunkCoord::new(2, 0, 0)));

  store.get_mut(ChunkCoord::new(2, 0, 0)).unwrap().generating = true;
  let next = store.nearest_needing_voxelize().unwrap();
  assert_ne!(next, ChunkCoord::new(2, 0, 0));
  let next_distance = store.get(next).unwrap().distance_to_viewer;
  assert!((next_distance - SIZE).abs() < 1e-4);

  for chunk in store.iter_mut() {
    chunk.needs_voxelize = false;
  }
  assert_eq!(store.nearest_needing_voxelize(), None);
}

#[test]
fn test_distances_use_chunk_centre() {
  let mut store = ChunkStore::new(SIZE);
  store.insert(Chunk::new(ChunkCoord::new(1, 0, 0)));

  store.update_distances(Vec3::new(8.0, 8.0, 8.0));

  assert_eq!(store.get(ChunkCoord::new(1, 0, 0)).unwrap().distance_to_viewer, 16.0);
}
