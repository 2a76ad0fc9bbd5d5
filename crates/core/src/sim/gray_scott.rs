//! Gray-Scott reaction-diffusion
//!
//! Two chemical layers: A (substrate, base concentration 1.0) and B
//! (catalyst, seeded by the brush). Reaction term `r = A * B^2`:
//!
//! `A' = A + dt * (D * lapA - r + feed * (1 - A))`
//! `B' = B + dt * (D/2 * lapB + r - (feed + kill) * B)`

use super::{laplacian, map_cells, run_advance, Backend, FrameParams, Simulation};
use crate::field::FieldStore;
use crate::settings::{BoundaryCondition, SolverSettings};

const DEFAULT_FEED: f32 = 0.037;
const DEFAULT_KILL: f32 = 0.06;
const DEFAULT_DIFFUSION: f32 = 2.0;

/// Named parameter presets: label to `(feed, kill)`
pub const PRESETS: [(&str, (f32, f32)); 5] = [
    ("Worms", (DEFAULT_FEED, DEFAULT_KILL)),
    ("Mitosis", (0.0367, 0.0649)),
    ("Coral Growth", (0.0545, 0.062)),
    ("Solitons", (0.03, 0.062)),
    ("Waves", (0.014, 0.045)),
];

/// Gray-Scott reaction-diffusion over two concentration layers
pub struct GrayScott {
    store: FieldStore,
    backend: Backend,
    /// Feed rate (a)
    pub feed: f32,
    /// Kill rate (b)
    pub kill: f32,
    /// Diffusion of chemical A; B diffuses at half this rate
    pub diffusion: f32,
    /// Index into [`PRESETS`]
    pub preset: usize,
    /// Layer shown by the composite renderer
    pub visible_layer: usize,
}

impl GrayScott {
    /// Construct with a CPU backend
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            store: FieldStore::new(width, height, &[1.0, 0.0]),
            backend: Backend::Cpu,
            feed: DEFAULT_FEED,
            kill: DEFAULT_KILL,
            diffusion: DEFAULT_DIFFUSION,
            preset: 0,
            visible_layer: 1,
        }
    }

    /// Overwrite `feed`/`kill` from a preset, immediately and independently
    /// of `reset_settings`
    pub fn select_preset(&mut self, index: usize) {
        if let Some(&(_, (feed, kill))) = PRESETS.get(index) {
            self.preset = index;
            self.feed = feed;
            self.kill = kill;
        }
    }

    fn step_cpu(store: &mut FieldStore, frame: &FrameParams<'_>, params: [f32; 4]) {
        let [feed, kill, diffusion, _] = params;
        let dx_sq = frame.space_step * frame.space_step;
        let dt = frame.time_step;
        let boundary = frame.boundary;

        let (a, b) = (store.layer(0), store.layer(1));
        let next_a = map_cells(a, |x, y, va| {
            let vb = b.get(x as usize, y as usize);
            let reaction = va * vb * vb;
            let lap = laplacian(a, x, y, boundary) / dx_sq;
            va + dt * (diffusion * lap - reaction + feed * (1.0 - va))
        });
        let next_b = map_cells(b, |x, y, vb| {
            let va = a.get(x as usize, y as usize);
            let reaction = va * vb * vb;
            let lap = laplacian(b, x, y, boundary) / dx_sq;
            vb + dt * (0.5 * diffusion * lap + reaction - (feed + kill) * vb)
        });

        store.layer_mut(0).as_mut_slice().copy_from_slice(&next_a);
        store.layer_mut(1).as_mut_slice().copy_from_slice(&next_b);
    }
}

impl Simulation for GrayScott {
    fn label(&self) -> &'static str {
        "Gray Scott Reaction Diffusion"
    }

    fn store(&self) -> &FieldStore {
        &self.store
    }

    fn store_mut(&mut self) -> &mut FieldStore {
        &mut self.store
    }

    fn layer_labels(&self) -> &'static [&'static str] {
        &["Chemical A", "Chemical B"]
    }

    fn visible_layer(&self) -> usize {
        self.visible_layer
    }

    fn brush_layer(&self) -> usize {
        1
    }

    fn reset_settings(&mut self) {
        self.feed = DEFAULT_FEED;
        self.kill = DEFAULT_KILL;
        self.diffusion = DEFAULT_DIFFUSION;
        self.preset = 0;
        self.visible_layer = 1;
    }

    fn recommended_settings(&self) -> SolverSettings {
        SolverSettings {
            space_step: 1.0,
            time_step: 0.1,
            boundary: BoundaryCondition::Periodic,
        }
    }

    fn model_params(&self) -> [f32; 4] {
        [self.feed, self.kill, self.diffusion, 0.0]
    }

    fn advance(&mut self, frame: &FrameParams<'_>) {
        let params = self.model_params();
        let visible = self.visible_layer;
        run_advance(
            &mut self.store,
            &mut self.backend,
            frame,
            params,
            visible,
            1,
            |store, frame| Self::step_cpu(store, frame, params),
        );
    }

    #[cfg(feature = "gpu")]
    fn shader(&self) -> wgpu::ShaderModuleDescriptor<'static> {
        wgpu::include_wgsl!("../gpu/shaders/gray_scott.wgsl")
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
            boundary: BoundaryCondition::Periodic,
            paused: false,
            space_step: 1.0,
            time_step: 0.1,
            brush: BrushState::default(),
        }
    }

    #[test]
    fn test_defaults_match_worms_preset() {
        let sim = GrayScott::new(8, 8);
        assert_eq!(sim.feed, PRESETS[0].1 .0);
        assert_eq!(sim.kill, PRESETS[0].1 .1);
        assert_eq!(PRESETS[0].0, "Worms");
    }

    #[test]
    fn test_preset_selection_overwrites_parameters() {
        let mut sim = GrayScott::new(8, 8);
        sim.select_preset(1);
        assert_eq!(sim.preset, 1);
        assert_eq!(sim.feed, 0.0367);
        assert_eq!(sim.kill, 0.0649);

        // Out-of-range selection is ignored
        sim.select_preset(99);
        assert_eq!(sim.preset, 1);
    }

    #[test]
    fn test_clear_restores_base_concentration() {
        let mut sim = GrayScott::new(16, 16);
        apply_stroke(sim.store_mut(), 1, 8, 8, 3, 1.0, BrushKind::Circle);
        sim.store_mut().clear();

        assert!(sim.store().layer(0).as_slice().iter().all(|&v| v == 1.0));
        assert!(sim.store().layer(1).as_slice().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_seeded_catalyst_reacts() {
        let mut sim = GrayScott::new(32, 32);
        apply_stroke(sim.store_mut(), 1, 16, 16, 2, 1.0, BrushKind::Circle);

        for _ in 0..20 {
            sim.advance(&frame());
        }

        // Substrate is consumed where the catalyst was seeded
        assert!(sim.store().layer(0).get(16, 16) < 1.0);
        // Untouched far corner keeps its base concentration (nothing fed in)
        assert!((sim.store().layer(0).get(0, 0) - 1.0).abs() < 1e-3);
    }
}
