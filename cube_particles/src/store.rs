use cgmath::Vector3;
use rand::Rng;

use crate::{
    error::{ParticleError, Result},
    grid::ParticleGrid,
    particles::{Position, Rgb},
};

/// The three position buffers plus per-particle colors, all indexed by
/// particle index.
#[derive(Debug, Clone)]
pub struct PositionStore {
    initial: Vec<Position>,
    from: Vec<Position>,
    to: Vec<Position>,
    colors: Vec<Rgb>,
}

impl PositionStore {
    pub fn new<R: Rng>(
        grid: &ParticleGrid,
        cube_width: f32,
        is_random_position: bool,
        rng: &mut R,
    ) -> Result<Self> {
        let count = grid.particle_count();
        let mut initial = Vec::with_capacity(count);
        let mut colors = Vec::with_capacity(count);

        for i in 0..count {
            let fraction = grid.grid_fraction(i)?;

            // Randomized placement still colors by grid fraction
            let placement = if is_random_position {
                Vector3::new(rng.gen::<f32>(), rng.gen::<f32>(), rng.gen::<f32>())
            } else {
                fraction
            };

            initial.push(Position::from(
                (placement - Vector3::new(0.5, 0.5, 0.5)) * cube_width,
            ));
            colors.push(Rgb::from_hsv(fraction.x, 1.0 - fraction.y, fraction.z));
        }

        log::debug!(
            "initialized {} particles (cube width {}, random: {})",
            count,
            cube_width,
            is_random_position
        );

        Ok(Self {
            from: initial.clone(),
            to: initial.clone(),
            initial,
            colors,
        })
    }

    pub fn len(&self) -> usize {
        self.initial.len()
    }

    pub fn is_empty(&self) -> bool {
        self.initial.is_empty()
    }

    pub fn initial(&self) -> &[Position] {
        &self.initial
    }

    pub fn from(&self) -> &[Position] {
        &self.from
    }

    pub fn to(&self) -> &[Position] {
        &self.to
    }

    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }

    pub fn color(&self, index: usize) -> Result<Rgb> {
        self.colors
            .get(index)
            .copied()
            .ok_or(ParticleError::IndexOutOfRange {
                index,
                count: self.colors.len(),
            })
    }

    pub(crate) fn set_from(&mut self, from: &[Position]) -> Result<()> {
        self.check_len(from.len())?;
        self.from.copy_from_slice(from);
        Ok(())
    }

    pub(crate) fn set_to(&mut self, to: Vec<Position>) -> Result<()> {
        self.check_len(to.len())?;
        self.to = to;
        Ok(())
    }

    fn check_len(&self, actual: usize) -> Result<()> {
        if actual != self.len() {
            return Err(ParticleError::BufferLengthMismatch {
                expected: self.len(),
                actual,
            });
        }
        Ok(())
    }
}
