//! Interactive session controller
//!
//! Owns one instance of every simulation variant, the shared brush and
//! solver settings, and the window-to-grid coordinate mapping. Exactly one
//! variant is active at a time; switching never copies state between
//! variants, so each keeps its own fields and parameters across switches.

use crate::brush::{apply_stroke, BrushState};
use crate::colormap;
use crate::settings::{BoundaryCondition, SolverSettings};
use crate::sim::{FrameParams, GrayScott, Heat, NavierStokes, Simulation, Wave};
use tracing::info;

/// Width in pixels of the settings sidebar, excluded from the grid viewport
pub const SIDEBAR_WIDTH: u32 = 320;

const DEFAULT_RESOLUTION: u32 = 8;
const DEFAULT_BRUSH_RADIUS: i32 = 10;

/// Sandbox session: all variants, shared settings, and the active selection
pub struct Sandbox {
    window_width: u32,
    window_height: u32,
    resolution: u32,
    /// Shared brush state, applied to whichever variant is active
    pub brush: BrushState,
    /// Shared numerical settings, applied to whichever variant is active
    pub solver: SolverSettings,
    /// Index into [`colormap::NAMES`]
    pub color_map: usize,
    /// Nearest-neighbor upscaling hint for the renderer
    pub pixelated: bool,
    /// Paused sessions stop time stepping but keep compositing
    pub paused: bool,
    simulations: Vec<Box<dyn Simulation>>,
    active: usize,
}

impl Sandbox {
    /// Build a session for a window, probing for a GPU backend
    ///
    /// Falls back to the CPU reference steppers when no usable GPU is
    /// found; the session behaves identically either way.
    #[must_use]
    pub fn new(window_width: u32, window_height: u32) -> Self {
        #[allow(unused_mut)]
        let mut sandbox = Self::without_gpu(window_width, window_height);
        #[cfg(feature = "gpu")]
        sandbox.attach_gpu();
        sandbox
    }

    /// Build a session that only uses the CPU reference steppers
    #[must_use]
    pub fn without_gpu(window_width: u32, window_height: u32) -> Self {
        let (grid_width, grid_height) =
            grid_dimensions(window_width, window_height, DEFAULT_RESOLUTION);
        let simulations: Vec<Box<dyn Simulation>> = vec![
            Box::new(Heat::new(grid_width, grid_height)),
            Box::new(GrayScott::new(grid_width, grid_height)),
            Box::new(Wave::new(grid_width, grid_height)),
            Box::new(NavierStokes::new(grid_width, grid_height)),
        ];
        Self {
            window_width,
            window_height,
            resolution: DEFAULT_RESOLUTION,
            brush: BrushState::default(),
            solver: SolverSettings {
                space_step: 3.0,
                time_step: 0.1,
                boundary: BoundaryCondition::Dirichlet,
            },
            color_map: 0,
            pixelated: true,
            paused: false,
            simulations,
            active: 0,
        }
    }

    /// Give every variant a GPU kernel backend, if a device is available
    #[cfg(feature = "gpu")]
    fn attach_gpu(&mut self) {
        use crate::gpu::{GpuContext, GpuInitResult, KernelDispatch};
        use crate::sim::Backend;
        use std::sync::Arc;
        use tracing::warn;

        let context = match GpuContext::new() {
            GpuInitResult::Success(context) => Arc::new(context),
            GpuInitResult::NoGpuFound => {
                info!("No GPU adapter found, using CPU steppers");
                return;
            }
            GpuInitResult::InitFailed {
                adapter_name,
                error,
            } => {
                warn!("GPU {adapter_name} failed to initialize ({error}), using CPU steppers");
                return;
            }
        };

        for sim in &mut self.simulations {
            let store = sim.store();
            let width = store.width() as u32;
            let height = store.height() as u32;
            let layers = store.layer_count() as u32;
            match KernelDispatch::new(Arc::clone(&context), sim.shader(), width, height, layers) {
                Ok(kernel) => sim.set_backend(Backend::Gpu(kernel)),
                Err(e) => warn!("{}: {e}, keeping CPU stepper", sim.label()),
            }
        }
        info!("GPU backend active: {}", context.adapter_name());
    }

    /// Labels of all variants, in selection order
    #[must_use]
    pub fn labels(&self) -> Vec<&'static str> {
        self.simulations.iter().map(|s| s.label()).collect()
    }

    /// Index of the active variant
    #[must_use]
    pub fn active_index(&self) -> usize {
        self.active
    }

    /// Borrow the active variant
    #[must_use]
    pub fn active(&self) -> &dyn Simulation {
        self.simulations[self.active].as_ref()
    }

    /// Mutably borrow the active variant
    pub fn active_mut(&mut self) -> &mut dyn Simulation {
        self.simulations[self.active].as_mut()
    }

    /// Switch the active variant; out-of-range indices are ignored
    ///
    /// Inactive variants keep their fields and parameters untouched.
    pub fn select(&mut self, index: usize) {
        if index < self.simulations.len() {
            self.active = index;
        }
    }

    /// Report a pointer position in window space and stroke the grid
    ///
    /// The grid viewport spans the window minus the sidebar; positions over
    /// the sidebar or outside the window map outside the grid and disable
    /// the brush instead of painting.
    pub fn brush(&mut self, window_x: f64, window_y: f64) {
        let (grid_x, grid_y) = self.window_to_grid(window_x, window_y);
        let sim = self.simulations[self.active].as_mut();
        let (width, height) = {
            let store = sim.store();
            (store.width(), store.height())
        };
        self.brush.set_position(grid_x, grid_y, width, height);
        self.brush.target_layer = sim.brush_layer();
        if self.brush.enabled {
            apply_stroke(
                sim.store_mut(),
                self.brush.target_layer,
                self.brush.x,
                self.brush.y,
                self.brush.radius,
                self.brush.value,
                self.brush.kind,
            );
        }
    }

    /// Pointer left the viewport; stop painting until the next position
    ///
    /// Records an out-of-grid position so `enabled` stays derived from the
    /// last reported position rather than being toggled independently.
    pub fn release_brush(&mut self) {
        let store = self.simulations[self.active].store();
        let (width, height) = (store.width(), store.height());
        self.brush.set_position(-1, -1, width, height);
    }

    /// Map a window-space position to grid coordinates
    ///
    /// The mapping scales the viewport (window minus sidebar) onto the grid
    /// and truncates toward zero; coordinates past either edge land outside
    /// `[0, width) x [0, height)` and are handled by the brush.
    fn window_to_grid(&self, window_x: f64, window_y: f64) -> (i32, i32) {
        let store = self.simulations[self.active].store();
        let viewport_width = f64::from(self.window_width.saturating_sub(SIDEBAR_WIDTH)).max(1.0);
        let viewport_height = f64::from(self.window_height).max(1.0);
        let grid_x = window_x / viewport_width * store.width() as f64;
        let grid_y = window_y / viewport_height * store.height() as f64;
        (grid_x.floor() as i32, grid_y.floor() as i32)
    }

    /// Advance the active variant by one frame
    ///
    /// Paused sessions still run the frame so the composite reflects color
    /// map changes immediately; the variant leaves its layers untouched.
    pub fn advance_frame(&mut self) {
        let frame = FrameParams {
            color_map: colormap::by_index(self.color_map),
            boundary: self.solver.boundary,
            paused: self.paused,
            space_step: self.solver.space_step,
            time_step: self.solver.time_step,
            brush: self.brush,
        };
        self.simulations[self.active].advance(&frame);
    }

    /// Handle a window resize; every variant's grid is rebuilt and zeroed
    pub fn resize(&mut self, window_width: u32, window_height: u32) {
        self.window_width = window_width;
        self.window_height = window_height;
        self.resize_grids();
    }

    /// Change the cells-per-pixel scale; every variant's grid is rebuilt
    pub fn set_resolution(&mut self, resolution: u32) {
        self.resolution = resolution.max(1);
        self.resize_grids();
    }

    /// Current cells-per-pixel scale
    #[must_use]
    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    fn resize_grids(&mut self) {
        let (grid_width, grid_height) =
            grid_dimensions(self.window_width, self.window_height, self.resolution);
        info!("Resizing grids to {grid_width}x{grid_height}");
        for sim in &mut self.simulations {
            sim.store_mut().resize(grid_width, grid_height);
        }
    }

    /// Restore the active variant's parameters and the shared settings
    ///
    /// Applies the variant's recommended solver settings and the default
    /// brush radius. Field contents are not touched; use
    /// [`Sandbox::reset_grid`] for that.
    pub fn reset_settings(&mut self) {
        let sim = self.simulations[self.active].as_mut();
        sim.reset_settings();
        self.solver = sim.recommended_settings();
        self.brush.radius = DEFAULT_BRUSH_RADIUS;
    }

    /// Restore the active variant's field contents to their initial values
    ///
    /// Parameters and settings are not touched; only the active variant's
    /// store is cleared.
    pub fn reset_grid(&mut self) {
        self.simulations[self.active].store_mut().clear();
    }
}

/// Grid dimensions for a window at a given resolution
fn grid_dimensions(window_width: u32, window_height: u32, resolution: u32) -> (usize, usize) {
    let viewport_width = window_width.saturating_sub(SIDEBAR_WIDTH);
    let grid_width = (viewport_width / resolution).max(1);
    let grid_height = (window_height / resolution).max(1);
    (grid_width as usize, grid_height as usize)
}
