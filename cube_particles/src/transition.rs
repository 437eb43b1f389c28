use crate::{
    blend::BlendStep,
    config::DEFAULT_PROGRESS_STEP,
    error::{ParticleError, Result},
    particles::Position,
    store::PositionStore,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionPhase {
    Idle,
    Transitioning,
}

/// Global blend progress of the particle set.
///
/// `progress` stays in `[0, 1]`; `1` means the last transition has settled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionState {
    progress: f32,
    step: f32,
}

impl Default for TransitionState {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRESS_STEP)
    }
}

impl TransitionState {
    /// Starts settled; there is nothing to animate until the first restart.
    pub fn new(step: f32) -> Self {
        Self {
            progress: 1.0,
            step: step.clamp(f32::MIN_POSITIVE, 1.0),
        }
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn step(&self) -> f32 {
        self.step
    }

    pub fn phase(&self) -> TransitionPhase {
        if self.is_idle() {
            TransitionPhase::Idle
        } else {
            TransitionPhase::Transitioning
        }
    }

    pub fn is_idle(&self) -> bool {
        self.progress >= 1.0
    }

    pub fn restart(&mut self) {
        self.progress = 0.0;
    }

    /// Moves one step forward, saturating at 1.
    pub fn advance(&mut self) -> f32 {
        self.progress = (self.progress + self.step).min(1.0);
        self.progress
    }
}

/// Drives the `from -> to` interpolation through a [`BlendStep`].
///
/// Keeps the last blended buffer so a new transition can start from what is
/// currently displayed rather than from the previous `from`.
pub struct TransitionEngine<B> {
    state: TransitionState,
    blender: B,
    current: Vec<Position>,
}

impl<B: BlendStep> TransitionEngine<B> {
    pub fn new(blender: B, step: f32, displayed: &[Position]) -> Self {
        Self {
            state: TransitionState::new(step),
            blender,
            current: displayed.to_vec(),
        }
    }

    pub fn state(&self) -> TransitionState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state.is_idle()
    }

    /// Last blended buffer, i.e. what the renderer currently shows.
    pub fn current(&self) -> &[Position] {
        &self.current
    }

    pub fn blender(&self) -> &B {
        &self.blender
    }

    /// Snapshots the displayed positions as `from`, installs `new_to` and
    /// restarts progress. Legal mid-transition; the running one is cut short.
    pub fn begin_transition(
        &mut self,
        store: &mut PositionStore,
        new_to: Vec<Position>,
    ) -> Result<()> {
        if new_to.len() != store.len() {
            return Err(ParticleError::BufferLengthMismatch {
                expected: store.len(),
                actual: new_to.len(),
            });
        }

        if !self.state.is_idle() {
            log::debug!(
                "truncating transition at progress {:.3}",
                self.state.progress()
            );
        }

        store.set_from(&self.current)?;
        store.set_to(new_to)?;
        self.state.restart();
        Ok(())
    }

    /// Advances progress one step and blends. Progress is only committed if
    /// the blend succeeds.
    pub fn advance(&mut self, store: &PositionStore) -> Result<&[Position]> {
        let mut next = self.state;
        let progress = next.advance();

        let blended = self.blender.blend(store.from(), store.to(), progress)?;
        if blended.len() != store.len() {
            return Err(ParticleError::BufferLengthMismatch {
                expected: store.len(),
                actual: blended.len(),
            });
        }

        self.state = next;
        self.current = blended;
        Ok(&self.current)
    }
}
