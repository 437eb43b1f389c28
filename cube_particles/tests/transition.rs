use cube_particles::{
    BlendStep, CpuBlend, ParticleError, ParticleGrid, Position, PositionStore, TransitionEngine,
    TransitionPhase, TransitionState,
};
use rand::{rngs::StdRng, SeedableRng};

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-5
}

fn store(row_count: u32) -> PositionStore {
    let grid = ParticleGrid::new(row_count).unwrap();
    PositionStore::new(&grid, 1.0, false, &mut StdRng::seed_from_u64(0)).unwrap()
}

fn shifted(positions: &[Position], dy: f32) -> Vec<Position> {
    positions
        .iter()
        .map(|p| Position { y: p.y + dy, ..*p })
        .collect()
}

#[test]
fn state_starts_idle() {
    let state = TransitionState::default();
    assert!(state.is_idle());
    assert_eq!(state.phase(), TransitionPhase::Idle);
    assert_eq!(state.progress(), 1.0);
    assert_eq!(state.step(), 0.01);
}

#[test]
fn state_advances_and_saturates() {
    let mut state = TransitionState::new(0.25);
    state.restart();
    assert_eq!(state.phase(), TransitionPhase::Transitioning);

    let steps = (0..6).map(|_| state.advance()).collect::<Vec<_>>();
    assert_eq!(steps, vec![0.25, 0.5, 0.75, 1.0, 1.0, 1.0]);
    assert!(state.is_idle());
}

#[test]
fn default_step_settles_in_about_a_hundred_ticks() {
    let mut state = TransitionState::default();
    state.restart();
    let mut ticks = 0;
    while !state.is_idle() {
        state.advance();
        ticks += 1;
        assert!(ticks <= 101);
    }
    assert!(ticks >= 100);
    assert_eq!(state.progress(), 1.0);
}

#[test]
fn engine_blends_towards_target() {
    let mut store = store(2);
    let mut engine = TransitionEngine::new(CpuBlend, 0.5, store.initial());
    let target = shifted(store.initial(), 2.0);

    engine.begin_transition(&mut store, target.clone()).unwrap();
    assert!(!engine.is_idle());
    assert_eq!(store.from(), store.initial());
    assert_eq!(store.to(), &target[..]);

    let half = engine.advance(&store).unwrap().to_vec();
    for (p, base) in half.iter().zip(store.initial()) {
        assert!(approx(p.y, base.y + 1.0));
        assert_eq!(p.x, base.x);
    }

    engine.advance(&store).unwrap();
    assert!(engine.is_idle());
    assert_eq!(engine.current(), &target[..]);

    // Further ticks hold the settled layout
    engine.advance(&store).unwrap();
    assert_eq!(engine.state().progress(), 1.0);
    assert_eq!(engine.current(), &target[..]);
}

#[test]
fn retargeting_mid_transition_starts_from_displayed_positions() {
    let mut store = store(2);
    let mut engine = TransitionEngine::new(CpuBlend, 0.25, store.initial());

    let first = shifted(store.initial(), 4.0);
    engine.begin_transition(&mut store, first).unwrap();
    engine.advance(&store).unwrap();
    let displayed = engine.current().to_vec();

    let second = shifted(store.initial(), -4.0);
    engine.begin_transition(&mut store, second.clone()).unwrap();

    assert_eq!(store.from(), &displayed[..]);
    assert_eq!(store.to(), &second[..]);
    assert_eq!(engine.state().progress(), 0.0);

    // First frame of the new transition moves one step away from the snapshot
    let next = engine.advance(&store).unwrap();
    for (p, d) in next.iter().zip(&displayed) {
        assert!((p.y - d.y).abs() <= 0.25 * 8.0 + 1e-5);
    }
}

#[test]
fn mismatched_target_changes_nothing() {
    let mut store = store(2);
    let mut engine = TransitionEngine::new(CpuBlend, 0.1, store.initial());
    let before = store.clone();

    let err = engine
        .begin_transition(&mut store, vec![Position::default(); 3])
        .unwrap_err();
    assert!(matches!(
        err,
        ParticleError::BufferLengthMismatch {
            expected: 8,
            actual: 3
        }
    ));
    assert_eq!(store.to(), before.to());
    assert_eq!(store.from(), before.from());
    assert!(engine.is_idle());
}

struct FailingBlend;

impl BlendStep for FailingBlend {
    fn blend(&mut self, _: &[Position], _: &[Position], _: f32) -> cube_particles::Result<Vec<Position>> {
        Err(ParticleError::NoAdapter)
    }
}

#[test]
fn failed_blend_keeps_progress() {
    let mut store = store(2);
    let mut engine = TransitionEngine::new(FailingBlend, 0.1, store.initial());
    let target = shifted(store.initial(), 1.0);
    engine.begin_transition(&mut store, target).unwrap();

    assert!(engine.advance(&store).is_err());
    assert_eq!(engine.state().progress(), 0.0);
    assert_eq!(engine.current(), store.initial());
}

#[test]
fn cpu_blend_checks_lengths() {
    let a = vec![Position::new(0.0, 0.0, 0.0); 2];
    let b = vec![Position::new(1.0, 1.0, 1.0); 3];
    assert!(CpuBlend.blend(&a, &b, 0.5).is_err());

    let b = vec![Position::new(2.0, 4.0, -2.0); 2];
    let out = CpuBlend.blend(&a, &b, 0.25).unwrap();
    assert!(approx(out[1].x, 0.5) && approx(out[1].y, 1.0) && approx(out[1].z, -0.5));
    assert_eq!(out[1].w, 1.0);
}
