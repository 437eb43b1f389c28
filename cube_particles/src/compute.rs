//! Blend step running on a wgpu compute queue.

use wgpu::util::DeviceExt;

use crate::{
    blend::{check_lengths, BlendStep},
    error::{ParticleError, Result},
    particles::Position,
};

const WORKGROUP_SIZE: u32 = 64;

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct BlendUniforms {
    progress: f32,
    count: u32,
    _pad: [u32; 2],
}

/// Buffers sized for one particle count; rebuilt if the count changes.
struct BlendBuffers {
    count: usize,
    from_buffer: wgpu::Buffer,
    to_buffer: wgpu::Buffer,
    output_buffer: wgpu::Buffer,
    staging_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

pub struct GpuBlend {
    device: wgpu::Device,
    queue: wgpu::Queue,
    pipeline: wgpu::ComputePipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    uniform_buffer: wgpu::Buffer,
    buffers: Option<BlendBuffers>,
}

impl GpuBlend {
    /// Requests the default adapter and a device with downlevel limits.
    pub async fn new() -> Result<Self> {
        let instance = wgpu::Instance::default();
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions::default())
            .await
            .ok_or(ParticleError::NoAdapter)?;

        log::info!("blend adapter: {:?}", adapter.get_info());

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Blend Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::downlevel_defaults(),
                },
                None,
            )
            .await?;

        Ok(Self::from_device(device, queue))
    }

    pub fn from_device(device: wgpu::Device, queue: wgpu::Queue) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Blend Shader"),
            source: wgpu::ShaderSource::Wgsl(std::borrow::Cow::Borrowed(include_str!(
                "blend.wgsl"
            ))),
        });

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Blend Uniform Buffer"),
            contents: bytemuck::cast_slice(&[BlendUniforms {
                progress: 0.0,
                count: 0,
                _pad: [0; 2],
            }]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let storage_entry = |binding: u32, read_only: bool| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::COMPUTE,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Storage { read_only },
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Blend Bind Group Layout"),
            entries: &[
                storage_entry(0, true),
                storage_entry(1, true),
                storage_entry(2, false),
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Blend Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("Blend Pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: "main",
        });

        Self {
            device,
            queue,
            pipeline,
            bind_group_layout,
            uniform_buffer,
            buffers: None,
        }
    }

    fn create_buffers(&self, count: usize) -> BlendBuffers {
        log::debug!("allocating blend buffers for {count} particles");
        let size = (std::mem::size_of::<Position>() * count) as wgpu::BufferAddress;

        let storage = |label: &str, usage: wgpu::BufferUsages| {
            self.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(label),
                size,
                usage,
                mapped_at_creation: false,
            })
        };

        let from_buffer = storage(
            "Blend From Buffer",
            wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
        );
        let to_buffer = storage(
            "Blend To Buffer",
            wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
        );
        let output_buffer = storage(
            "Blend Output Buffer",
            wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
        );
        let staging_buffer = storage(
            "Blend Staging Buffer",
            wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        );

        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Blend Bind Group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: from_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: to_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: output_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: self.uniform_buffer.as_entire_binding(),
                },
            ],
        });

        BlendBuffers {
            count,
            from_buffer,
            to_buffer,
            output_buffer,
            staging_buffer,
            bind_group,
        }
    }

    pub async fn blend_async(
        &mut self,
        from: &[Position],
        to: &[Position],
        progress: f32,
    ) -> Result<Vec<Position>> {
        check_lengths(from, to)?;
        let count = from.len();
        if count == 0 {
            return Ok(Vec::new());
        }

        let limit = self.device.limits().max_compute_workgroups_per_dimension;
        let workgroups = u32::try_from(count.div_ceil(WORKGROUP_SIZE as usize)).unwrap_or(u32::MAX);
        if workgroups > limit {
            return Err(ParticleError::WorkgroupLimit {
                required: workgroups,
                limit,
            });
        }

        let uniforms = BlendUniforms {
            progress,
            count: count as u32,
            _pad: [0; 2],
        };
        self.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[uniforms]));

        let buffers = match self.buffers.take() {
            Some(buffers) if buffers.count == count => buffers,
            _ => self.create_buffers(count),
        };
        let (device, queue, pipeline) = (&self.device, &self.queue, &self.pipeline);

        queue.write_buffer(&buffers.from_buffer, 0, bytemuck::cast_slice(from));
        queue.write_buffer(&buffers.to_buffer, 0, bytemuck::cast_slice(to));

        let mut command_encoder =
            device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Blend Encoder"),
            });
        {
            let mut compute_pass =
                command_encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                    label: Some("Blend Pass"),
                    timestamp_writes: None,
                });
            compute_pass.set_pipeline(pipeline);
            compute_pass.set_bind_group(0, &buffers.bind_group, &[]);
            compute_pass.dispatch_workgroups(workgroups, 1, 1);
        }
        command_encoder.copy_buffer_to_buffer(
            &buffers.output_buffer,
            0,
            &buffers.staging_buffer,
            0,
            (std::mem::size_of::<Position>() * count) as wgpu::BufferAddress,
        );
        queue.submit(Some(command_encoder.finish()));

        let positions = read_back(device, &buffers.staging_buffer).await;
        self.buffers = Some(buffers);
        positions
    }
}

async fn read_back(device: &wgpu::Device, staging_buffer: &wgpu::Buffer) -> Result<Vec<Position>> {
    let buffer_slice = staging_buffer.slice(..);
    let (sender, receiver) = futures_intrusive::channel::shared::oneshot_channel();
    buffer_slice.map_async(wgpu::MapMode::Read, move |r| {
        let _ = sender.send(r);
    });
    device.poll(wgpu::Maintain::Wait);
    receiver
        .receive()
        .await
        .ok_or(ParticleError::BufferMap(wgpu::BufferAsyncError))??;

    let positions = bytemuck::cast_slice::<u8, Position>(&buffer_slice.get_mapped_range()).to_vec();
    staging_buffer.unmap();
    Ok(positions)
}

impl BlendStep for GpuBlend {
    fn blend(&mut self, from: &[Position], to: &[Position], progress: f32) -> Result<Vec<Position>> {
        pollster::block_on(self.blend_async(from, to, progress))
    }
}
