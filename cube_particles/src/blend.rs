//! The per-tick interpolation step between the `from` and `to` buffers.

use crate::{
    error::{ParticleError, Result},
    particles::Position,
};

/// Produces `lerp(from, to, progress)` for every particle.
///
/// Implementations may run anywhere (CPU, a compute queue); the engine only
/// relies on the returned buffer having one position per particle.
pub trait BlendStep {
    fn blend(&mut self, from: &[Position], to: &[Position], progress: f32) -> Result<Vec<Position>>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct CpuBlend;

impl BlendStep for CpuBlend {
    fn blend(&mut self, from: &[Position], to: &[Position], progress: f32) -> Result<Vec<Position>> {
        check_lengths(from, to)?;
        Ok(from
            .iter()
            .zip(to)
            .map(|(a, b)| a.lerp(b, progress))
            .collect())
    }
}

impl<B: BlendStep + ?Sized> BlendStep for Box<B> {
    fn blend(&mut self, from: &[Position], to: &[Position], progress: f32) -> Result<Vec<Position>> {
        (**self).blend(from, to, progress)
    }
}

pub(crate) fn check_lengths(from: &[Position], to: &[Position]) -> Result<()> {
    if from.len() != to.len() {
        return Err(ParticleError::BufferLengthMismatch {
            expected: from.len(),
            actual: to.len(),
        });
    }
    Ok(())
}
