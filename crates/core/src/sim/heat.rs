//! Heat equation: `u' = u + dt * alpha * laplacian(u) / dx^2`

use super::{laplacian, map_cells, run_advance, Backend, FrameParams, Simulation};
use crate::field::FieldStore;
use crate::settings::{BoundaryCondition, SolverSettings};

const DEFAULT_DIFFUSION: f32 = 1.0;

/// Heat diffusion over one temperature layer
pub struct Heat {
    store: FieldStore,
    backend: Backend,
    /// Diffusion coefficient (alpha)
    pub diffusion: f32,
}

impl Heat {
    /// Construct with a CPU backend
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            store: FieldStore::new(width, height, &[0.0]),
            backend: Backend::Cpu,
            diffusion: DEFAULT_DIFFUSION,
        }
    }

    fn step_cpu(store: &mut FieldStore, frame: &FrameParams<'_>, alpha: f32) {
        let dx_sq = frame.space_step * frame.space_step;
        let dt = frame.time_step;
        let boundary = frame.boundary;
        let temperature = store.layer(0);
        let next = map_cells(temperature, |x, y, u| {
            u + dt * alpha * laplacian(temperature, x, y, boundary) / dx_sq
        });
        store.layer_mut(0).as_mut_slice().copy_from_slice(&next);
    }
}

impl Simulation for Heat {
    fn label(&self) -> &'static str {
        "Heat Equation"
    }

    fn store(&self) -> &FieldStore {
        &self.store
    }

    fn store_mut(&mut self) -> &mut FieldStore {
        &mut self.store
    }

    fn layer_labels(&self) -> &'static [&'static str] {
        &["Temperature"]
    }

    fn reset_settings(&mut self) {
        self.diffusion = DEFAULT_DIFFUSION;
    }

    fn recommended_settings(&self) -> SolverSettings {
        SolverSettings {
            space_step: 3.0,
            time_step: 0.1,
            boundary: BoundaryCondition::Dirichlet,
        }
    }

    fn model_params(&self) -> [f32; 4] {
        [self.diffusion, 0.0, 0.0, 0.0]
    }

    fn advance(&mut self, frame: &FrameParams<'_>) {
        let alpha = self.diffusion;
        run_advance(
            &mut self.store,
            &mut self.backend,
            frame,
            [alpha, 0.0, 0.0, 0.0],
            0,
            0,
            |store, frame| Self::step_cpu(store, frame, alpha),
        );
    }

    #[cfg(feature = "gpu")]
    fn shader(&self) -> wgpu::ShaderModuleDescriptor<'static> {
        wgpu::include_wgsl!("../gpu/shaders/heat.wgsl")
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

    fn frame(paused: bool) -> FrameParams<'static> {
        FrameParams {
            color_map: colormap::by_index(0),
            boundary: BoundaryCondition::Dirichlet,
            paused,
            space_step: 1.0,
            time_step: 0.1,
            brush: BrushState::default(),
        }
    }

    #[test]
    fn test_hot_spot_diffuses_outward() {
        let mut sim = Heat::new(21, 21);
        sim.store_mut().layer_mut(0).set(10, 10, 1.0);

        sim.advance(&frame(false));

        let center = sim.store().layer(0).get(10, 10);
        let neighbor = sim.store().layer(0).get(11, 10);
        assert!(center < 1.0, "center should cool, got {center}");
        assert!(neighbor > 0.0, "neighbor should warm, got {neighbor}");
    }

    #[test]
    fn test_paused_advance_leaves_layers_untouched_but_renders() {
        let mut sim = Heat::new(16, 16);
        apply_stroke(sim.store_mut(), 0, 8, 8, 3, 1.0, BrushKind::Circle);
        let before = sim.store().layer(0).as_slice().to_vec();

        sim.advance(&frame(true));

        assert_eq!(sim.store().layer(0).as_slice(), before.as_slice());
        // Composite is still written while paused
        assert!(sim.store().composite().chunks(4).all(|px| px[3] == 1.0));
    }

    #[test]
    fn test_reset_settings_restores_defaults_without_touching_grid() {
        let mut sim = Heat::new(8, 8);
        sim.diffusion = 2.5;
        sim.store_mut().layer_mut(0).set(4, 4, 0.7);

        sim.reset_settings();

        assert_eq!(sim.diffusion, DEFAULT_DIFFUSION);
        assert_eq!(sim.store().layer(0).get(4, 4), 0.7);
    }
}
