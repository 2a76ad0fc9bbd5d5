//! Wave equation, split into displacement and velocity layers:
//!
//! `v' = v + dt * c^2 * laplacian(u) / dx^2`
//! `u' = u + dt * v'`

use super::{laplacian, map_cells, run_advance, Backend, FrameParams, Simulation};
use crate::field::{FieldData, FieldStore};
use crate::settings::{BoundaryCondition, SolverSettings};

const DEFAULT_WAVE_SPEED: f32 = 1.0;

/// Wave propagation over displacement and velocity layers
pub struct Wave {
    store: FieldStore,
    backend: Backend,
    /// Propagation speed (c)
    pub wave_speed: f32,
}

impl Wave {
    /// Construct with a CPU backend
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            store: FieldStore::new(width, height, &[0.0, 0.0]),
            backend: Backend::Cpu,
            wave_speed: DEFAULT_WAVE_SPEED,
        }
    }

    fn step_cpu(store: &mut FieldStore, frame: &FrameParams<'_>, speed: f32) {
        let c_sq = speed * speed;
        let dx_sq = frame.space_step * frame.space_step;
        let dt = frame.time_step;
        let boundary = frame.boundary;

        let displacement = store.layer(0);
        let next_velocity = map_cells(store.layer(1), |x, y, v| {
            v + dt * c_sq * laplacian(displacement, x, y, boundary) / dx_sq
        });
        let velocity =
            FieldData::from_raw(store.width(), store.height(), next_velocity);
        let next_displacement = map_cells(displacement, |x, y, u| {
            u + dt * velocity.get(x as usize, y as usize)
        });

        store
            .layer_mut(0)
            .as_mut_slice()
            .copy_from_slice(&next_displacement);
        store
            .layer_mut(1)
            .as_mut_slice()
            .copy_from_slice(velocity.as_slice());
    }
}

impl Simulation for Wave {
    fn label(&self) -> &'static str {
        "Wave Equation"
    }

    fn store(&self) -> &FieldStore {
        &self.store
    }

    fn store_mut(&mut self) -> &mut FieldStore {
        &mut self.store
    }

    fn layer_labels(&self) -> &'static [&'static str] {
        &["Displacement", "Velocity"]
    }

    fn reset_settings(&mut self) {
        self.wave_speed = DEFAULT_WAVE_SPEED;
    }

    fn recommended_settings(&self) -> SolverSettings {
        // A semi-implicit step still needs a far smaller dt than heat
        // diffusion to stay stable
        SolverSettings {
            space_step: 1.0,
            time_step: 0.05,
            boundary: BoundaryCondition::Dirichlet,
        }
    }

    fn model_params(&self) -> [f32; 4] {
        [self.wave_speed, 0.0, 0.0, 0.0]
    }

    fn advance(&mut self, frame: &FrameParams<'_>) {
        let speed = self.wave_speed;
        run_advance(
            &mut self.store,
            &mut self.backend,
            frame,
            [speed, 0.0, 0.0, 0.0],
            0,
            0,
            |store, frame| Self::step_cpu(store, frame, speed),
        );
    }

    #[cfg(feature = "gpu")]
    fn shader(&self) -> wgpu::ShaderModuleDescriptor<'static> {
        wgpu::include_wgsl!("../gpu/shaders/wave.wgsl")
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
            time_step: 0.05,
            brush: BrushState::default(),
        }
    }

    #[test]
    fn test_displacement_pulse_propagates() {
        let mut sim = Wave::new(33, 33);
        apply_stroke(sim.store_mut(), 0, 16, 16, 2, 1.0, BrushKind::Gaussian);
        let initial_center = sim.store().layer(0).get(16, 16);

        for _ in 0..40 {
            sim.advance(&frame());
        }

        let center = sim.store().layer(0).get(16, 16);
        let ring = sim.store().layer(0).get(20, 16);
        assert!(center < initial_center, "pulse should collapse at center");
        assert!(ring.abs() > 1e-6, "wavefront should reach nearby cells");
    }

    #[test]
    fn test_recommended_time_step_smaller_than_heat() {
        let wave = Wave::new(8, 8).recommended_settings();
        let heat = super::super::Heat::new(8, 8).recommended_settings();
        assert!(wave.time_step < heat.time_step);
    }
}
