use cube_particles::{ParticleGrid, PositionStore, Rgb};
use rand::{rngs::StdRng, SeedableRng};

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-5
}

fn approx_rgb(a: Rgb, b: Rgb) -> bool {
    approx(a.r, b.r) && approx(a.g, b.g) && approx(a.b, b.b)
}

#[test]
fn hsv_primary_hues() {
    assert!(approx_rgb(Rgb::from_hsv(0.0, 1.0, 1.0), Rgb::new(1.0, 0.0, 0.0)));
    assert!(approx_rgb(Rgb::from_hsv(0.5, 1.0, 1.0), Rgb::new(0.0, 1.0, 1.0)));
    assert!(approx_rgb(Rgb::from_hsv(0.25, 1.0, 1.0), Rgb::new(0.5, 1.0, 0.0)));
    assert!(approx_rgb(Rgb::from_hsv(0.75, 1.0, 1.0), Rgb::new(0.5, 0.0, 1.0)));
}

#[test]
fn hsv_without_saturation_is_gray() {
    for v in [0.0, 0.3, 1.0] {
        assert!(approx_rgb(Rgb::from_hsv(0.4, 0.0, v), Rgb::new(v, v, v)));
    }
}

#[test]
fn grid_placement_and_colors() {
    let grid = ParticleGrid::new(2).unwrap();
    let mut rng = StdRng::seed_from_u64(1);
    let store = PositionStore::new(&grid, 2.0, false, &mut rng).unwrap();

    assert_eq!(store.len(), 8);
    assert_eq!(store.colors().len(), 8);

    let first = store.initial()[0];
    assert_eq!((first.x, first.y, first.z, first.w), (-1.0, -1.0, -1.0, 1.0));

    let last = store.initial()[7];
    assert_eq!((last.x, last.y, last.z, last.w), (0.0, 0.0, 0.0, 1.0));

    // h = 0, s = 1, v = 0
    assert!(approx_rgb(store.color(0).unwrap(), Rgb::new(0.0, 0.0, 0.0)));
    // h = 0.5, s = 0.5, v = 0.5
    assert!(approx_rgb(store.color(7).unwrap(), Rgb::new(0.25, 0.5, 0.5)));
    assert!(store.color(8).is_err());
}

#[test]
fn buffers_start_identical() {
    let grid = ParticleGrid::new(3).unwrap();
    let mut rng = StdRng::seed_from_u64(7);
    let store = PositionStore::new(&grid, 1.0, true, &mut rng).unwrap();

    assert_eq!(store.initial(), store.from());
    assert_eq!(store.initial(), store.to());
}

#[test]
fn random_placement_stays_inside_cube() {
    let grid = ParticleGrid::new(5).unwrap();
    let mut rng = StdRng::seed_from_u64(42);
    let store = PositionStore::new(&grid, 4.0, true, &mut rng).unwrap();

    for p in store.initial() {
        for c in [p.x, p.y, p.z] {
            assert!((-2.0..2.0).contains(&c), "{c} outside cube");
        }
        assert_eq!(p.w, 1.0);
    }
}

#[test]
fn colors_depend_only_on_grid() {
    let grid = ParticleGrid::new(4).unwrap();
    let a = PositionStore::new(&grid, 1.0, false, &mut StdRng::seed_from_u64(1)).unwrap();
    let b = PositionStore::new(&grid, 1.0, false, &mut StdRng::seed_from_u64(2)).unwrap();
    let random = PositionStore::new(&grid, 1.0, true, &mut StdRng::seed_from_u64(3)).unwrap();

    assert_eq!(a.colors(), b.colors());
    assert_eq!(a.initial(), b.initial());
    // Randomized placement keeps grid colors
    assert_eq!(a.colors(), random.colors());
    assert_ne!(a.initial(), random.initial());
}
