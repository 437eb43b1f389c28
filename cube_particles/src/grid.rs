use cgmath::Vector3;

use crate::error::{ParticleError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridCoord {
    pub x: usize,
    pub y: usize,
    pub z: usize,
}

/// Position of a particle's slot in the square position texture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TexelCoord {
    pub u: usize,
    pub v: usize,
}

/// Addressing for `row_count³` particles laid out on a cube.
///
/// Index `i` maps to `x = i % R`, `y = (i / R) % R`, `z = i / R²`. The texel
/// square has side `ceil(sqrt(N))` and is filled row by row; texels past `N`
/// are unused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParticleGrid {
    row_count: usize,
    particle_count: usize,
    texture_side: usize,
}

impl ParticleGrid {
    pub fn new(row_count: u32) -> Result<Self> {
        let r = row_count as usize;
        if r == 0 {
            return Err(ParticleError::InvalidGridSize(row_count));
        }
        // instanced draws count in u32
        let particle_count = r
            .checked_mul(r)
            .and_then(|r2| r2.checked_mul(r))
            .filter(|&n| u32::try_from(n).is_ok())
            .ok_or(ParticleError::InvalidGridSize(row_count))?;

        Ok(Self {
            row_count: r,
            particle_count,
            texture_side: ceil_sqrt(particle_count),
        })
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn particle_count(&self) -> usize {
        self.particle_count
    }

    pub fn texture_side(&self) -> usize {
        self.texture_side
    }

    /// Number of vertical `(x, z)` columns
    pub fn column_count(&self) -> usize {
        self.row_count * self.row_count
    }

    pub fn index_to_grid(&self, index: usize) -> Result<GridCoord> {
        self.check_index(index)?;
        let r = self.row_count;
        Ok(GridCoord {
            x: index % r,
            y: (index / r) % r,
            z: index / (r * r),
        })
    }

    pub fn grid_to_index(&self, coord: GridCoord) -> Result<usize> {
        let r = self.row_count;
        if coord.x >= r || coord.y >= r || coord.z >= r {
            return Err(ParticleError::IndexOutOfRange {
                index: coord.x.max(coord.y).max(coord.z),
                count: r,
            });
        }
        Ok(coord.x + coord.y * r + coord.z * r * r)
    }

    pub fn index_to_texel(&self, index: usize) -> Result<TexelCoord> {
        self.check_index(index)?;
        Ok(TexelCoord {
            u: index % self.texture_side,
            v: index / self.texture_side,
        })
    }

    /// `None` for texels outside the square or past the last particle.
    pub fn texel_to_index(&self, texel: TexelCoord) -> Option<usize> {
        if texel.u >= self.texture_side || texel.v >= self.texture_side {
            return None;
        }
        let index = texel.v * self.texture_side + texel.u;
        (index < self.particle_count).then_some(index)
    }

    /// Normalized grid position `(x/R, y/R, z/R)`, each in `[0, 1)`.
    pub fn grid_fraction(&self, index: usize) -> Result<Vector3<f32>> {
        let coord = self.index_to_grid(index)?;
        let r = self.row_count as f32;
        Ok(Vector3::new(
            coord.x as f32 / r,
            coord.y as f32 / r,
            coord.z as f32 / r,
        ))
    }

    /// Indices of the column at `(x, z)`, ordered bottom to top.
    pub fn column_indices(&self, x: usize, z: usize) -> Result<impl Iterator<Item = usize>> {
        let r = self.row_count;
        let base = self.grid_to_index(GridCoord { x, y: 0, z })?;
        Ok((0..r).map(move |y| base + y * r))
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.particle_count {
            return Err(ParticleError::IndexOutOfRange {
                index,
                count: self.particle_count,
            });
        }
        Ok(())
    }
}

fn ceil_sqrt(n: usize) -> usize {
    let mut side = (n as f64).sqrt().ceil() as usize;
    while side * side < n {
        side += 1;
    }
    while side > 0 && (side - 1) * (side - 1) >= n {
        side -= 1;
    }
    side
}
