use crate::{
    error::{ParticleError, Result},
    grid::ParticleGrid,
};

/// Also used as `@location` in the particle vertex stage
pub enum InstanceDataLocation {
    BoxIndex = 0,
}

pub trait ShaderVertexData {
    type RawType;
    fn to_raw(&self) -> Self::RawType;

    fn desc() -> wgpu::VertexBufferLayout<'static>;
}

/// Per-instance lookup coordinate into the position texture, `(u, v) / side`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxIndex {
    pub u: f32,
    pub v: f32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct BoxIndexRaw {
    uv: [f32; 2],
}

impl ShaderVertexData for BoxIndex {
    type RawType = BoxIndexRaw;
    fn to_raw(&self) -> BoxIndexRaw {
        BoxIndexRaw {
            uv: [self.u, self.v],
        }
    }

    fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<BoxIndexRaw>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &[wgpu::VertexAttribute {
                format: wgpu::VertexFormat::Float32x2,
                offset: 0,
                shader_location: InstanceDataLocation::BoxIndex as u32,
            }],
        }
    }
}

/// What the scene needs to draw the set: one box instanced per particle.
#[derive(Debug, Clone)]
pub struct ParticleMesh {
    pub particle_width: f32,
    pub box_indexes: Vec<BoxIndex>,
    instance_count: u32,
}

impl ParticleMesh {
    pub fn new(grid: &ParticleGrid, particle_width: f32) -> Result<Self> {
        let instance_count = u32::try_from(grid.particle_count())
            .map_err(|_| ParticleError::InvalidGridSize(grid.row_count() as u32))?;
        let side = grid.texture_side() as f32;
        let box_indexes = (0..grid.particle_count())
            .map(|i| {
                let texel = grid.index_to_texel(i)?;
                Ok(BoxIndex {
                    u: texel.u as f32 / side,
                    v: texel.v as f32 / side,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            particle_width,
            box_indexes,
            instance_count,
        })
    }

    pub fn instance_count(&self) -> u32 {
        self.instance_count
    }

    pub fn instance_data(&self) -> Vec<BoxIndexRaw> {
        self.box_indexes
            .iter()
            .map(BoxIndex::to_raw)
            .collect::<Vec<_>>()
    }
}

/// Receives the particle mesh for display.
pub trait Scene {
    fn add_mesh(&mut self, mesh: &ParticleMesh);
}
