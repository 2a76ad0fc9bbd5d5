//! GPU device initialization and capability detection
//!
//! Distinguishes between "no GPU found" (expected on some systems, silent
//! fallback to CPU) and "GPU found but failed to initialize" (potential
//! driver issue worth logging).

use tracing::{debug, info};

/// Result of a GPU initialization attempt
#[derive(Debug)]
pub enum GpuInitResult {
    /// GPU initialized successfully
    Success(GpuContext),
    /// No GPU adapter found (silent fallback to CPU)
    NoGpuFound,
    /// GPU found but initialization failed (log warning, fallback to CPU)
    InitFailed {
        /// Name of the adapter that failed
        adapter_name: String,
        /// Error message
        error: String,
    },
}

/// GPU context managing device and queue
#[derive(Debug)]
pub struct GpuContext {
    device: wgpu::Device,
    queue: wgpu::Queue,
    adapter_info: wgpu::AdapterInfo,
}

impl GpuContext {
    /// Initialize a GPU context
    ///
    /// Blocks on adapter and device acquisition; suitable for session
    /// startup where no async runtime is available.
    #[allow(clippy::new_ret_no_self)]
    pub fn new() -> GpuInitResult {
        info!("Attempting to initialize GPU context");

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = if let Some(a) =
            pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })) {
            debug!("Found GPU adapter: {}", a.get_info().name);
            a
        } else {
            debug!("No GPU adapter found");
            return GpuInitResult::NoGpuFound;
        };

        let adapter_info = adapter.get_info();
        let adapter_name = adapter_info.name.clone();

        // Device creation can fail even with a valid adapter
        match pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("PDE Sandbox GPU"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::Performance,
            },
            None,
        )) {
            Ok((device, queue)) => {
                info!("GPU context initialized successfully: {}", adapter_name);
                GpuInitResult::Success(Self {
                    device,
                    queue,
                    adapter_info,
                })
            }
            Err(e) => {
                debug!("Failed to create GPU device: {}", e);
                GpuInitResult::InitFailed {
                    adapter_name,
                    error: e.to_string(),
                }
            }
        }
    }

    /// Adapter name for logging
    #[must_use]
    pub fn adapter_name(&self) -> &str {
        &self.adapter_info.name
    }

    /// Check if the device can likely allocate buffers for a grid
    ///
    /// Estimates layer and composite storage plus readback staging and
    /// compares against the device buffer limit with headroom for other
    /// GPU work.
    #[must_use]
    pub fn can_allocate(&self, width: u32, height: u32, layer_count: u32) -> bool {
        // layers in + out + staging, plus the RGBA composite twice over
        let cell_bytes = 4 * u64::from(width) * u64::from(height);
        let estimated_bytes = cell_bytes * (3 * u64::from(layer_count) + 2 * 4);

        let limits = self.device.limits();
        if width > limits.max_texture_dimension_2d || height > limits.max_texture_dimension_2d {
            return false;
        }
        estimated_bytes < limits.max_buffer_size / 2
    }

    /// Reference to the wgpu device
    #[must_use]
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    /// Reference to the wgpu queue
    #[must_use]
    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gpu_init_returns_valid_result() {
        // Which variant we get depends on hardware availability
        match GpuContext::new() {
            GpuInitResult::Success(ctx) => {
                assert!(!ctx.adapter_name().is_empty());
                assert!(ctx.can_allocate(128, 128, 4));
            }
            GpuInitResult::NoGpuFound => {}
            GpuInitResult::InitFailed {
                adapter_name,
                error,
            } => {
                assert!(!adapter_name.is_empty());
                assert!(!error.is_empty());
            }
        }
    }
}
