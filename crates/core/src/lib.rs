//! PDE Sandbox Core Library
//!
//! An interactive partial differential equation playground: heat diffusion,
//! Gray-Scott reaction-diffusion, wave propagation, and simplified
//! Navier-Stokes flow over a shared layered field store. Fields are painted
//! with a pointer-driven brush and rendered through polynomial color maps.
//!
//! Simulations advance on wgpu compute kernels when a GPU is available
//! (default `gpu` feature) and on parallel CPU reference steppers otherwise;
//! both backends produce the same field store contents.

pub mod brush;
pub mod colormap;
pub mod field;
pub mod sandbox;
pub mod settings;
pub mod sim;

#[cfg(feature = "gpu")]
pub mod gpu;

// Re-export the session-facing types
pub use brush::{BrushKind, BrushState};
pub use field::{FieldData, FieldStore};
pub use sandbox::{Sandbox, SIDEBAR_WIDTH};
pub use settings::{BoundaryCondition, SolverSettings};
pub use sim::{FrameParams, GrayScott, Heat, NavierStokes, Simulation, Wave};
