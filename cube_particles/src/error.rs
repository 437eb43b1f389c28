//! Error types for the particle engine.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ParticleError>;

#[derive(Debug, Error)]
pub enum ParticleError {
    /// Row count is zero or its cube does not fit in `usize`
    #[error("invalid grid size: row count {0}")]
    InvalidGridSize(u32),

    #[error("particle index {index} out of range for {count} particles")]
    IndexOutOfRange { index: usize, count: usize },

    /// A scalar array does not carry exactly one value per particle
    #[error("expected {expected} scalar values (one per particle), got {actual}")]
    InvalidScalarArrayLength { expected: usize, actual: usize },

    #[error("scalar value at index {index} is not finite: {value}")]
    NonFiniteScalar { index: usize, value: f32 },

    #[error("invalid option: {0}")]
    InvalidOption(String),

    #[error("buffer length mismatch: expected {expected}, got {actual}")]
    BufferLengthMismatch { expected: usize, actual: usize },

    #[error("no suitable wgpu adapter found")]
    NoAdapter,

    #[error("failed to request device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),

    #[error("failed to map staging buffer: {0}")]
    BufferMap(#[from] wgpu::BufferAsyncError),

    /// Dispatch needs more workgroups than the device allows in one dimension
    #[error("dispatch needs {required} workgroups, device limit is {limit}")]
    WorkgroupLimit { required: u32, limit: u32 },
}
