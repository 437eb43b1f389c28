//! Cube particles arranged on a regular grid, animated between layouts that
//! are computed from one scalar per particle.
//!
//! [`ParticleSet`] ties the pieces together: [`ParticleGrid`] addressing, the
//! [`PositionStore`] buffers, the [`TransitionEngine`] and the layouts in
//! [`layout`]. Blending runs through a [`BlendStep`], either [`CpuBlend`] or
//! the wgpu backed [`GpuBlend`].

pub mod blend;
pub mod compute;
pub mod config;
pub mod error;
pub mod grid;
pub mod layout;
pub mod particle_set;
pub mod particles;
pub mod store;
pub mod transition;
pub mod vertex_data;

use instant::Instant;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

pub use blend::{BlendStep, CpuBlend};
pub use compute::GpuBlend;
pub use config::ParticleSetOptions;
pub use error::{ParticleError, Result};
pub use grid::{GridCoord, ParticleGrid, TexelCoord};
pub use layout::Layout;
pub use particle_set::ParticleSet;
pub use particles::{Position, Rgb};
pub use store::PositionStore;
pub use transition::{TransitionEngine, TransitionPhase, TransitionState};
pub use vertex_data::{ParticleMesh, Scene};

/// Upper bound on ticks per demo transition, in case a step never settles.
const MAX_DEMO_TICKS: usize = 100_000;

#[derive(Debug, Clone, PartialEq)]
pub struct DemoReport {
    pub particle_count: usize,
    pub offset_ticks: usize,
    pub stacking_ticks: usize,
    /// Particles whose value landed above the threshold
    pub high_count: usize,
}

struct LogScene;

impl Scene for LogScene {
    fn add_mesh(&mut self, mesh: &ParticleMesh) {
        log::info!(
            "scene: {} cube instances of width {}",
            mesh.instance_count(),
            mesh.particle_width
        );
    }
}

/// Stand-in for a trained predictor: how light each particle's color is.
pub fn luminance_scores(colors: &[Rgb]) -> Vec<f32> {
    colors.iter().map(|c| c.luminance().clamp(0.0, 1.0)).collect()
}

/// Runs an offset transition then a stacking transition to completion.
pub fn run_demo<B: BlendStep>(blender: B, options: ParticleSetOptions) -> anyhow::Result<DemoReport> {
    let mut particles = ParticleSet::new(blender, options)?;
    particles.attach(&mut LogScene);

    let ys = luminance_scores(particles.colors());
    let high_count = ys.iter().filter(|&&v| v > layout::THRESHOLD).count();

    let timer = Instant::now();
    particles.update_with_predict_values(&ys)?;
    let offset_ticks = settle(&mut particles)?;
    log::info!(
        "offset layout settled after {} ticks ({:?})",
        offset_ticks,
        timer.elapsed()
    );

    let timer = Instant::now();
    particles.update_with_cube_shape(&ys)?;
    let stacking_ticks = settle(&mut particles)?;
    log::info!(
        "stacking layout settled after {} ticks ({:?})",
        stacking_ticks,
        timer.elapsed()
    );

    Ok(DemoReport {
        particle_count: particles.grid().particle_count(),
        offset_ticks,
        stacking_ticks,
        high_count,
    })
}

fn settle<B: BlendStep>(particles: &mut ParticleSet<B>) -> anyhow::Result<usize> {
    let frame = 1.0 / 60.0;
    let mut ticks = 0;
    while !particles.is_idle() {
        if ticks >= MAX_DEMO_TICKS {
            anyhow::bail!("transition did not settle within {MAX_DEMO_TICKS} ticks");
        }
        particles.tick(ticks as f32 * frame)?;
        ticks += 1;
    }
    Ok(ticks)
}

#[cfg_attr(target_arch = "wasm32", wasm_bindgen(start))]
pub async fn run() {
    #[cfg(target_arch = "wasm32")]
    {
        std::panic::set_hook(Box::new(console_error_panic_hook::hook));
        console_log::init_with_level(log::Level::Debug).expect("Couldn't initialize logger");
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        let env = env_logger::Env::default()
            .filter_or("MY_LOG_LEVEL", "info")
            .write_style_or("MY_LOG_STYLE", "always");
        env_logger::init_from_env(env);
    }

    let options = match ParticleSetOptions::from_env() {
        Ok(options) => options,
        Err(e) => {
            log::error!("invalid configuration: {e:#}");
            return;
        }
    };

    let report = run_demo(select_blender().await, options);
    match report {
        Ok(report) => log::info!("{report:?}"),
        Err(e) => log::error!("demo failed: {e:#}"),
    }
}

#[cfg(not(target_arch = "wasm32"))]
async fn select_blender() -> Box<dyn BlendStep> {
    if std::env::var("CUBE_BLEND").as_deref() == Ok("gpu") {
        match GpuBlend::new().await {
            Ok(gpu) => return Box::new(gpu),
            Err(e) => log::warn!("falling back to cpu blend: {e}"),
        }
    }
    Box::new(CpuBlend)
}

#[cfg(target_arch = "wasm32")]
async fn select_blender() -> Box<dyn BlendStep> {
    Box::new(CpuBlend)
}
