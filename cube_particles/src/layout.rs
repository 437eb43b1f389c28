//! Target layouts computed from per-particle scalars.
//!
//! Both layouts read `ys` in particle-index order, start from the `initial`
//! buffer and return a complete `to` buffer. Inputs are validated before any
//! output is built, so a rejected call never yields a partial layout.

use std::cmp::Ordering;

use rand::{Rng, RngCore};

use crate::{
    error::{ParticleError, Result},
    grid::ParticleGrid,
    particles::Position,
};

/// Values above this go to the upper band / high stack.
pub const THRESHOLD: f32 = 0.5;

/// Half-height of the empty band around `y = 0` in the offset layout, as a
/// fraction of the cube width.
pub const OFFSET_PADDING: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Move each particle vertically by its value
    Offset,
    /// Sort each column and stack it into a high and a low pile
    Stacking,
}

impl Layout {
    pub fn compute(
        &self,
        grid: &ParticleGrid,
        initial: &[Position],
        cube_width: f32,
        ys: &[f32],
        jitter: Option<&mut dyn RngCore>,
    ) -> Result<Vec<Position>> {
        match self {
            Layout::Offset => offset_layout(grid, initial, cube_width, ys),
            Layout::Stacking => stacking_layout(grid, initial, cube_width, ys, jitter),
        }
    }
}

pub fn offset_layout(
    grid: &ParticleGrid,
    initial: &[Position],
    cube_width: f32,
    ys: &[f32],
) -> Result<Vec<Position>> {
    validate_inputs(grid, initial, ys)?;

    Ok(initial
        .iter()
        .zip(ys)
        .map(|(p, &v)| Position {
            y: offset_height(v, cube_width),
            ..*p
        })
        .collect())
}

/// Height of a particle with value `v` in the offset layout.
pub fn offset_height(v: f32, cube_width: f32) -> f32 {
    let diff = v - THRESHOLD;
    if diff < 0.0 {
        (diff - OFFSET_PADDING) * cube_width
    } else {
        (diff + OFFSET_PADDING) * cube_width
    }
}

#[derive(Debug, Clone, Copy)]
struct ColumnEntry {
    index: usize,
    grid_y: usize,
    value: f32,
}

fn by_value(a: &ColumnEntry, b: &ColumnEntry) -> Ordering {
    // Values are finite here; ties keep bottom-to-top order
    a.value
        .partial_cmp(&b.value)
        .unwrap_or(Ordering::Equal)
        .then(a.grid_y.cmp(&b.grid_y))
}

pub fn stacking_layout(
    grid: &ParticleGrid,
    initial: &[Position],
    cube_width: f32,
    ys: &[f32],
    mut jitter: Option<&mut dyn RngCore>,
) -> Result<Vec<Position>> {
    validate_inputs(grid, initial, ys)?;

    let row_count = grid.row_count();
    let interval = cube_width / row_count as f32;
    let mut to = initial.to_vec();

    let mut high = Vec::with_capacity(row_count);
    let mut low = Vec::with_capacity(row_count);

    for z in 0..row_count {
        for x in 0..row_count {
            high.clear();
            low.clear();

            for (grid_y, index) in grid.column_indices(x, z)?.enumerate() {
                let entry = ColumnEntry {
                    index,
                    grid_y,
                    value: ys[index],
                };
                if entry.value > THRESHOLD {
                    high.push(entry);
                } else {
                    low.push(entry);
                }
            }

            high.sort_by(by_value);
            low.sort_by(by_value);

            for (i, entry) in high.iter().enumerate() {
                let base = initial[entry.index];
                let y = cube_width - interval - interval * i as f32;
                to[entry.index].y = y + jitter_offset(&mut jitter, interval);
                to[entry.index].z = base.z - cube_width;
            }

            for (i, entry) in low.iter().enumerate() {
                let base = initial[entry.index];
                let y = interval * i as f32;
                to[entry.index].y = y + jitter_offset(&mut jitter, interval);
                to[entry.index].z = base.z;
            }
        }
    }

    Ok(to)
}

fn jitter_offset(jitter: &mut Option<&mut dyn RngCore>, interval: f32) -> f32 {
    match jitter {
        Some(rng) => interval * rng.gen::<f32>(),
        None => 0.0,
    }
}

fn validate_inputs(grid: &ParticleGrid, initial: &[Position], ys: &[f32]) -> Result<()> {
    let expected = grid.particle_count();
    if ys.len() != expected {
        log::warn!(
            "rejecting layout: {} scalar values for {} particles",
            ys.len(),
            expected
        );
        return Err(ParticleError::InvalidScalarArrayLength {
            expected,
            actual: ys.len(),
        });
    }
    if initial.len() != expected {
        return Err(ParticleError::BufferLengthMismatch {
            expected,
            actual: initial.len(),
        });
    }
    if let Some(index) = ys.iter().position(|v| !v.is_finite()) {
        log::warn!(
            "rejecting layout: non-finite value {} at index {}",
            ys[index],
            index
        );
        return Err(ParticleError::NonFiniteScalar {
            index,
            value: ys[index],
        });
    }
    Ok(())
}
