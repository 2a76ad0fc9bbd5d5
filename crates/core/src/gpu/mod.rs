//! GPU compute backend
//!
//! Each simulation variant's update rule runs as a wgpu compute kernel.
//! The host stays authoritative: every `advance` uploads the field store's
//! layers, dispatches one kernel step, and reads the results (layers plus
//! the RGBA composite) back into the store. Enabled by the default `gpu`
//! feature; without it the variants fall back to their CPU steppers.

pub mod context;
pub mod kernel;

pub use context::{GpuContext, GpuInitResult};
pub use kernel::{KernelDispatch, KernelParams};
