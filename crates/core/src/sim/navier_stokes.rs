//! Incompressible fluid flow (simplified)
//!
//! Four layers: velocity x, velocity y, velocity magnitude, dye. The CPU
//! reference stepper applies viscous diffusion to the velocity components
//! and semi-Lagrangian advection to the dye; the magnitude layer is derived
//! each step for display.

use super::{
    laplacian, map_cells, run_advance, sample_bilinear, Backend, FrameParams, Simulation,
};
use crate::field::{FieldData, FieldStore};
use crate::settings::{BoundaryCondition, SolverSettings};

const DEFAULT_VISCOSITY: f32 = 1.0;
const LAYER_VELOCITY_X: usize = 0;
const LAYER_VELOCITY_Y: usize = 1;
const LAYER_MAGNITUDE: usize = 2;
const LAYER_DYE: usize = 3;

/// Brush target choices exposed to the UI
pub const BRUSH_TARGETS: [&str; 2] = ["Velocity", "Dye"];

/// Navier-Stokes flow over velocity, magnitude, and dye layers
pub struct NavierStokes {
    store: FieldStore,
    backend: Backend,
    /// Kinematic viscosity (v)
    pub viscosity: f32,
    /// Layer shown by the composite renderer
    pub visible_layer: usize,
    /// Index into [`BRUSH_TARGETS`]
    pub brush_target: usize,
}

impl NavierStokes {
    /// Construct with a CPU backend
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            store: FieldStore::new(width, height, &[0.0, 0.0, 0.0, 0.0]),
            backend: Backend::Cpu,
            viscosity: DEFAULT_VISCOSITY,
            visible_layer: LAYER_DYE,
            brush_target: 0,
        }
    }

    fn step_cpu(store: &mut FieldStore, frame: &FrameParams<'_>, viscosity: f32) {
        let dx_sq = frame.space_step * frame.space_step;
        let dt = frame.time_step;
        let boundary = frame.boundary;
        let width = store.width();
        let height = store.height();

        // Viscous diffusion of both velocity components
        let vx_src = store.layer(LAYER_VELOCITY_X);
        let vx = FieldData::from_raw(
            width,
            height,
            map_cells(vx_src, |x, y, v| {
                v + dt * viscosity * laplacian(vx_src, x, y, boundary) / dx_sq
            }),
        );
        let vy_src = store.layer(LAYER_VELOCITY_Y);
        let vy = FieldData::from_raw(
            width,
            height,
            map_cells(vy_src, |x, y, v| {
                v + dt * viscosity * laplacian(vy_src, x, y, boundary) / dx_sq
            }),
        );

        // Semi-Lagrangian advection of the dye through the new velocities
        let dye_src = store.layer(LAYER_DYE);
        let dye = map_cells(dye_src, |x, y, _| {
            let px = x as f32 - vx.get(x as usize, y as usize) * dt;
            let py = y as f32 - vy.get(x as usize, y as usize) * dt;
            sample_bilinear(dye_src, px, py, boundary)
        });

        let magnitude = map_cells(store.layer(LAYER_MAGNITUDE), |x, y, _| {
            let u = vx.get(x as usize, y as usize);
            let v = vy.get(x as usize, y as usize);
            (u * u + v * v).sqrt()
        });

        store
            .layer_mut(LAYER_VELOCITY_X)
            .as_mut_slice()
            .copy_from_slice(vx.as_slice());
        store
            .layer_mut(LAYER_VELOCITY_Y)
            .as_mut_slice()
            .copy_from_slice(vy.as_slice());
        store
            .layer_mut(LAYER_MAGNITUDE)
            .as_mut_slice()
            .copy_from_slice(&magnitude);
        store
            .layer_mut(LAYER_DYE)
            .as_mut_slice()
            .copy_from_slice(&dye);
    }
}

impl Simulation for NavierStokes {
    fn label(&self) -> &'static str {
        "Navier Stokes Fluid Flow"
    }

    fn store(&self) -> &FieldStore {
        &self.store
    }

    fn store_mut(&mut self) -> &mut FieldStore {
        &mut self.store
    }

    fn layer_labels(&self) -> &'static [&'static str] {
        &[
            "Velocity (x)",
            "Velocity (y)",
            "Velocity (Magnitude)",
            "Dye",
        ]
    }

    fn visible_layer(&self) -> usize {
        self.visible_layer
    }

    fn brush_layer(&self) -> usize {
        match self.brush_target {
            0 => LAYER_VELOCITY_X,
            _ => LAYER_DYE,
        }
    }

    fn reset_settings(&mut self) {
        self.viscosity = DEFAULT_VISCOSITY;
        self.visible_layer = LAYER_DYE;
        self.brush_target = 0;
    }

    fn recommended_settings(&self) -> SolverSettings {
        SolverSettings {
            space_step: 1.0,
            time_step: 0.1,
            boundary: BoundaryCondition::Dirichlet,
        }
    }

    fn model_params(&self) -> [f32; 4] {
        [self.viscosity, 0.0, 0.0, 0.0]
    }

    fn advance(&mut self, frame: &FrameParams<'_>) {
        let viscosity = self.viscosity;
        let visible = self.visible_layer;
        let brush_layer = self.brush_layer();
        run_advance(
            &mut self.store,
            &mut self.backend,
            frame,
            [viscosity, 0.0, 0.0, 0.0],
            visible,
            brush_layer,
            |store, frame| Self::step_cpu(store, frame, viscosity),
        );
    }

    #[cfg(feature = "gpu")]
    fn shader(&self) -> wgpu::ShaderModuleDescriptor<'static> {
        wgpu::include_wgsl!("../gpu/shaders/navier_stokes.wgsl")
    }

    fn set_backend(&mut self, backend: Backend) {
        self.backend = backend;
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brush::{apply_stroke, BrushKind, BrushState};
    use crate::colormap;

    fn frame() -> FrameParams<'static> {
        FrameParams {
            color_map: colormap::by_index(0),
            boundary: BoundaryCondition::Dirichlet,
            paused: false,
            space_step: 1.0,
            time_step: 0.1,
            brush: BrushState::default(),
        }
    }

    #[test]
    fn test_magnitude_layer_tracks_velocity() {
        let mut sim = NavierStokes::new(16, 16);
        apply_stroke(sim.store_mut(), LAYER_VELOCITY_X, 8, 8, 2, 2.0, BrushKind::Circle);

        sim.advance(&frame());

        let u = sim.store().layer(LAYER_VELOCITY_X).get(8, 8);
        let mag = sim.store().layer(LAYER_MAGNITUDE).get(8, 8);
        assert!(u > 0.0);
        assert!((mag - u.abs()).abs() < 1e-6);
    }

    #[test]
    fn test_dye_advects_against_velocity_sampling() {
        let mut sim = NavierStokes::new(16, 16);
        // Uniform rightward flow and a dye blob left of center
        sim.store_mut().layer_mut(LAYER_VELOCITY_X).fill(1.0);
        apply_stroke(sim.store_mut(), LAYER_DYE, 6, 8, 1, 1.0, BrushKind::Circle);

        for _ in 0..20 {
            sim.advance(&frame());
        }

        let upstream = sim.store().layer(LAYER_DYE).get(4, 8);
        let downstream = sim.store().layer(LAYER_DYE).get(8, 8);
        assert!(downstream > upstream, "dye should drift with the flow");
    }

    #[test]
    fn test_brush_target_selects_layer() {
        let mut sim = NavierStokes::new(8, 8);
        assert_eq!(sim.brush_layer(), LAYER_VELOCITY_X);
        sim.brush_target = 1;
        assert_eq!(sim.brush_layer(), LAYER_DYE);
    }
}
