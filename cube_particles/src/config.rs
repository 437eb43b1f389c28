use std::str::FromStr;

use anyhow::Context;

use crate::error::{ParticleError, Result};

/// Progress added per tick; a transition settles after 100 ticks.
pub const DEFAULT_PROGRESS_STEP: f32 = 0.01;

#[derive(Debug, Clone, PartialEq)]
pub struct ParticleSetOptions {
    /// Particles per cube edge; the set holds `row_count³` particles
    pub row_count: u32,
    /// Edge length of one rendered cube particle
    pub particle_width: f32,
    /// Edge length of the whole particle cube
    pub cube_width: f32,
    /// Scatter initial positions randomly and jitter stacked layouts
    pub is_random_position: bool,
    pub progress_step: f32,
    /// Fixed seed for reproducible placement and jitter
    pub seed: Option<u64>,
}

impl Default for ParticleSetOptions {
    fn default() -> Self {
        Self {
            row_count: 16,
            particle_width: 0.05,
            cube_width: 1.0,
            is_random_position: false,
            progress_step: DEFAULT_PROGRESS_STEP,
            seed: None,
        }
    }
}

impl ParticleSetOptions {
    pub fn validate(&self) -> Result<()> {
        if !(self.cube_width.is_finite() && self.cube_width > 0.0) {
            return Err(ParticleError::InvalidOption(format!(
                "cube_width must be positive, got {}",
                self.cube_width
            )));
        }
        if !(self.particle_width.is_finite() && self.particle_width > 0.0) {
            return Err(ParticleError::InvalidOption(format!(
                "particle_width must be positive, got {}",
                self.particle_width
            )));
        }
        if !(self.progress_step > 0.0 && self.progress_step <= 1.0) {
            return Err(ParticleError::InvalidOption(format!(
                "progress_step must be in (0, 1], got {}",
                self.progress_step
            )));
        }
        Ok(())
    }

    /// Defaults overlaid with `CUBE_*` environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut options = Self::default();

        if let Some(v) = parse_var(&lookup, "CUBE_ROW_COUNT")? {
            options.row_count = v;
        }
        if let Some(v) = parse_var(&lookup, "CUBE_PARTICLE_WIDTH")? {
            options.particle_width = v;
        }
        if let Some(v) = parse_var(&lookup, "CUBE_WIDTH")? {
            options.cube_width = v;
        }
        if let Some(v) = parse_var(&lookup, "CUBE_RANDOM_POSITION")? {
            options.is_random_position = v;
        }
        if let Some(v) = parse_var(&lookup, "CUBE_PROGRESS_STEP")? {
            options.progress_step = v;
        }
        if let Some(v) = parse_var(&lookup, "CUBE_SEED")? {
            options.seed = Some(v);
        }

        options.validate()?;
        Ok(options)
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => {
            let value = raw
                .trim()
                .parse::<T>()
                .with_context(|| format!("cannot parse {key}={raw:?}"))?;
            Ok(Some(value))
        }
        None => Ok(None),
    }
}
