//! Simulation variant contract
//!
//! This module defines the [`Simulation`] trait implemented by every PDE
//! variant, the per-variant [`Backend`] (GPU kernel dispatch or CPU
//! reference stepper), and the shared helpers the CPU steppers are built
//! from. Exactly one variant is active at a time; the sandbox controller
//! drives whichever is active through the same `advance` protocol.

mod gray_scott;
mod heat;
mod navier_stokes;
mod wave;

pub use gray_scott::GrayScott;
pub use heat::Heat;
pub use navier_stokes::{NavierStokes, BRUSH_TARGETS};
pub use wave::Wave;

use crate::brush::BrushState;
use crate::colormap::{self, ColorMap};
use crate::field::{FieldData, FieldStore};
use crate::settings::{BoundaryCondition, SolverSettings};
use rayon::prelude::*;
use std::any::Any;

/// Per-frame inputs every variant's `advance` consumes
#[derive(Debug, Clone, Copy)]
pub struct FrameParams<'a> {
    /// Active color map coefficients
    pub color_map: &'a ColorMap,
    /// Boundary condition for this frame
    pub boundary: BoundaryCondition,
    /// Paused frames still dispatch the kernel; it leaves field contents
    /// unchanged but keeps writing the composite buffer so visual edits
    /// (color map changes) stay live
    pub paused: bool,
    /// Space step (dx)
    pub space_step: f32,
    /// Time step (dt)
    pub time_step: f32,
    /// Brush state, forwarded to the kernel uniforms
    pub brush: BrushState,
}

/// Compute backend owned by one variant
pub enum Backend {
    /// Reference stepper on the host, always available
    Cpu,
    /// wgpu compute kernel dispatch
    #[cfg(feature = "gpu")]
    Gpu(crate::gpu::KernelDispatch),
}

impl Backend {
    /// True if this backend dispatches to the GPU
    #[must_use]
    pub fn is_gpu(&self) -> bool {
        match self {
            Self::Cpu => false,
            #[cfg(feature = "gpu")]
            Self::Gpu(_) => true,
        }
    }
}

/// One PDE model: owns a field store, model parameters, and a backend
///
/// All variants are constructed eagerly at session start and live until
/// session end. `reset_settings` restores default parameters without
/// touching field contents; clearing the store restores field contents
/// without touching parameters. The two resets are independent.
pub trait Simulation {
    /// Display name of this model
    fn label(&self) -> &'static str;

    /// Borrow the owned field store
    fn store(&self) -> &FieldStore;

    /// Mutably borrow the owned field store
    fn store_mut(&mut self) -> &mut FieldStore;

    /// Display names of the store's layers, in layer order
    fn layer_labels(&self) -> &'static [&'static str];

    /// Layer shown by the composite renderer
    fn visible_layer(&self) -> usize {
        0
    }

    /// Layer brush strokes write to
    fn brush_layer(&self) -> usize {
        0
    }

    /// Restore all model parameters to hard-coded defaults
    ///
    /// Never alters field contents.
    fn reset_settings(&mut self);

    /// Stability-appropriate solver settings for this model
    ///
    /// Pure: returns a value for the controller to apply, never mutates
    /// session state through a back-reference.
    fn recommended_settings(&self) -> SolverSettings;

    /// Model-specific scalars in kernel uniform order
    fn model_params(&self) -> [f32; 4];

    /// Advance the simulation by one time step
    ///
    /// Uploads parameters and brush state, runs one kernel dispatch (or one
    /// CPU step), and leaves the result in the field store, composite
    /// buffer included.
    fn advance(&mut self, frame: &FrameParams<'_>);

    /// Compute shader for this model's GPU kernel
    #[cfg(feature = "gpu")]
    fn shader(&self) -> wgpu::ShaderModuleDescriptor<'static>;

    /// Replace this variant's compute backend
    fn set_backend(&mut self, backend: Backend);

    /// Concrete-type access for variant-specific controls
    ///
    /// The session owns variants as trait objects, but some controls only
    /// exist on one model (Gray-Scott presets, the fluid brush target). UI
    /// code downcasts through here to reach them.
    fn as_any(&self) -> &dyn Any;

    /// Mutable concrete-type access, see [`Simulation::as_any`]
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Shared advance path: CPU step + composite render, or GPU round trip
#[cfg_attr(not(feature = "gpu"), allow(unused_variables))]
pub(crate) fn run_advance<F>(
    store: &mut FieldStore,
    backend: &mut Backend,
    frame: &FrameParams<'_>,
    model: [f32; 4],
    visible_layer: usize,
    brush_layer: usize,
    step_cpu: F,
) where
    F: FnOnce(&mut FieldStore, &FrameParams<'_>),
{
    match backend {
        Backend::Cpu => {
            if !frame.paused {
                step_cpu(store, frame);
            }
            render_composite(store, visible_layer, frame.color_map);
        }
        #[cfg(feature = "gpu")]
        Backend::Gpu(kernel) => {
            let params = crate::gpu::KernelParams::new(
                store,
                frame,
                model,
                visible_layer as u32,
                brush_layer as u32,
            );
            kernel.advance(store, &params);
        }
    }
}

/// Map every cell of `layer` through `f(x, y, value)` in parallel rows
pub(crate) fn map_cells<F>(layer: &FieldData, f: F) -> Vec<f32>
where
    F: Fn(i32, i32, f32) -> f32 + Sync,
{
    let width = layer.width();
    let mut out = vec![0.0; width * layer.height()];
    out.par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, cell) in row.iter_mut().enumerate() {
                *cell = f(x as i32, y as i32, layer.get(x, y));
            }
        });
    out
}

/// Five-point Laplacian at `(x, y)` under the given boundary condition
pub(crate) fn laplacian(layer: &FieldData, x: i32, y: i32, boundary: BoundaryCondition) -> f32 {
    layer.sample(x - 1, y, boundary)
        + layer.sample(x + 1, y, boundary)
        + layer.sample(x, y - 1, boundary)
        + layer.sample(x, y + 1, boundary)
        - 4.0 * layer.sample(x, y, boundary)
}

/// Bilinear sample at fractional coordinates
pub(crate) fn sample_bilinear(
    layer: &FieldData,
    x: f32,
    y: f32,
    boundary: BoundaryCondition,
) -> f32 {
    let x0 = x.floor();
    let y0 = y.floor();
    let tx = x - x0;
    let ty = y - y0;
    let x0 = x0 as i32;
    let y0 = y0 as i32;

    let v00 = layer.sample(x0, y0, boundary);
    let v10 = layer.sample(x0 + 1, y0, boundary);
    let v01 = layer.sample(x0, y0 + 1, boundary);
    let v11 = layer.sample(x0 + 1, y0 + 1, boundary);

    let top = v00 + (v10 - v00) * tx;
    let bottom = v01 + (v11 - v01) * tx;
    top + (bottom - top) * ty
}

/// Write the RGBA composite buffer from one layer through a color map
pub(crate) fn render_composite(store: &mut FieldStore, layer: usize, map: &ColorMap) {
    let (source, composite) = store.layer_and_composite_mut(layer);
    composite
        .par_chunks_mut(4)
        .zip(source.as_slice().par_iter())
        .for_each(|(pixel, &value)| {
            let rgb = colormap::eval(map, value);
            pixel[0] = rgb[0];
            pixel[1] = rgb[1];
            pixel[2] = rgb[2];
            pixel[3] = 1.0;
        });
}
