use rand::{rngs::StdRng, RngCore, SeedableRng};

use crate::{
    blend::BlendStep,
    config::ParticleSetOptions,
    error::Result,
    grid::ParticleGrid,
    layout::Layout,
    particles::{Position, Rgb},
    store::PositionStore,
    transition::{TransitionEngine, TransitionState},
    vertex_data::{ParticleMesh, Scene},
};

/// A cube of `row_count³` particles animated between layouts.
///
/// Call [`tick`](Self::tick) once per frame and hand the returned positions
/// to the renderer. Layout requests are accepted at any time; poll
/// [`is_idle`](Self::is_idle) first to let the previous one settle.
pub struct ParticleSet<B> {
    options: ParticleSetOptions,
    grid: ParticleGrid,
    store: PositionStore,
    engine: TransitionEngine<B>,
    mesh: ParticleMesh,
    rng: StdRng,
}

impl<B: BlendStep> ParticleSet<B> {
    pub fn new(blender: B, options: ParticleSetOptions) -> Result<Self> {
        options.validate()?;

        let grid = ParticleGrid::new(options.row_count)?;
        let mut rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let store = PositionStore::new(
            &grid,
            options.cube_width,
            options.is_random_position,
            &mut rng,
        )?;
        let engine = TransitionEngine::new(blender, options.progress_step, store.initial());
        let mesh = ParticleMesh::new(&grid, options.particle_width)?;

        log::debug!(
            "particle set: {} particles, texture side {}",
            grid.particle_count(),
            grid.texture_side()
        );

        Ok(Self {
            options,
            grid,
            store,
            engine,
            mesh,
            rng,
        })
    }

    pub fn attach<S: Scene + ?Sized>(&self, scene: &mut S) {
        scene.add_mesh(&self.mesh);
    }

    /// Advances the running transition by one step and returns the positions
    /// to display. `time` is only used for tracing; pacing is per frame.
    pub fn tick(&mut self, time: f32) -> Result<&[Position]> {
        self.engine.advance(&self.store)?;
        log::trace!(
            "tick at {time:.3}s, progress {:.2}",
            self.engine.state().progress()
        );
        Ok(self.engine.current())
    }

    pub fn is_idle(&self) -> bool {
        self.engine.is_idle()
    }

    pub fn transition(&self) -> TransitionState {
        self.engine.state()
    }

    /// Moves each particle up or down by how far its value sits from 0.5.
    pub fn update_with_predict_values(&mut self, ys: &[f32]) -> Result<()> {
        self.update_with_layout(Layout::Offset, ys)
    }

    /// Sorts every column by value into a high and a low stack.
    pub fn update_with_cube_shape(&mut self, ys: &[f32]) -> Result<()> {
        self.update_with_layout(Layout::Stacking, ys)
    }

    pub fn update_with_layout(&mut self, layout: Layout, ys: &[f32]) -> Result<()> {
        let jitter = if self.options.is_random_position {
            Some(&mut self.rng as &mut dyn RngCore)
        } else {
            None
        };

        let to = layout.compute(
            &self.grid,
            self.store.initial(),
            self.options.cube_width,
            ys,
            jitter,
        )?;
        self.engine.begin_transition(&mut self.store, to)?;

        log::debug!("started {:?} transition", layout);
        Ok(())
    }

    pub fn colors(&self) -> &[Rgb] {
        self.store.colors()
    }

    /// Positions produced by the last tick.
    pub fn positions(&self) -> &[Position] {
        self.engine.current()
    }

    pub fn store(&self) -> &PositionStore {
        &self.store
    }

    pub fn grid(&self) -> &ParticleGrid {
        &self.grid
    }

    pub fn mesh(&self) -> &ParticleMesh {
        &self.mesh
    }

    pub fn options(&self) -> &ParticleSetOptions {
        &self.options
    }

    pub fn blender(&self) -> &B {
        self.engine.blender()
    }
}
