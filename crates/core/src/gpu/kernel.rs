//! Generic compute kernel dispatch
//!
//! One [`KernelDispatch`] drives any variant's compute shader. The bind
//! group layout is derived from the layer count alone, so every shader
//! follows the same binding order: input layers `0..n`, output layers
//! `n..2n`, the RGBA composite at `2n`, and the parameter uniform at
//! `2n + 1`.

use super::GpuContext;
use crate::field::FieldStore;
use crate::sim::FrameParams;
use bytemuck::{Pod, Zeroable};
use std::sync::Arc;
use tracing::debug;

const WORKGROUP_SIZE: u32 = 16;

/// Uniform block shared by every variant shader
///
/// Field order and padding must match the WGSL `Params` struct exactly:
/// scalars in the first 64 bytes, model parameters as one vec4, then the
/// color map coefficients as seven vec4 rows.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct KernelParams {
    width: u32,
    height: u32,
    boundary_condition: u32,
    paused: u32,
    dx: f32,
    dt: f32,
    visible_layer: u32,
    brush_layer: u32,
    brush_enabled: u32,
    brush_kind: u32,
    brush_x: i32,
    brush_y: i32,
    brush_radius: i32,
    brush_value: f32,
    pad0: f32,
    pad1: f32,
    model: [f32; 4],
    cmap: [[f32; 4]; 7],
}

impl KernelParams {
    /// Assemble the uniform block for one frame
    #[must_use]
    pub fn new(
        store: &FieldStore,
        frame: &FrameParams<'_>,
        model: [f32; 4],
        visible_layer: u32,
        brush_layer: u32,
    ) -> Self {
        let mut cmap = [[0.0_f32; 4]; 7];
        for (row, coeff) in cmap.iter_mut().zip(frame.color_map.iter()) {
            row[..3].copy_from_slice(coeff);
        }
        Self {
            width: store.width() as u32,
            height: store.height() as u32,
            boundary_condition: frame.boundary.index(),
            paused: u32::from(frame.paused),
            dx: frame.space_step,
            dt: frame.time_step,
            visible_layer,
            brush_layer,
            brush_enabled: u32::from(frame.brush.enabled),
            brush_kind: frame.brush.kind.index(),
            brush_x: frame.brush.x,
            brush_y: frame.brush.y,
            brush_radius: frame.brush.radius,
            brush_value: frame.brush.value,
            pad0: 0.0,
            pad1: 0.0,
            model,
            cmap,
        }
    }
}

/// Per-grid GPU buffers for one layer set
struct KernelBuffers {
    layer_in: Vec<wgpu::Buffer>,
    layer_out: Vec<wgpu::Buffer>,
    layer_staging: Vec<wgpu::Buffer>,
    composite: wgpu::Buffer,
    composite_staging: wgpu::Buffer,
    width: u32,
    height: u32,
}

impl KernelBuffers {
    fn new(device: &wgpu::Device, width: u32, height: u32, layer_count: u32) -> Self {
        let layer_bytes = u64::from(width) * u64::from(height) * 4;
        let composite_bytes = layer_bytes * 4;

        let storage = |label: &str, size: u64| {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(label),
                size,
                usage: wgpu::BufferUsages::STORAGE
                    | wgpu::BufferUsages::COPY_DST
                    | wgpu::BufferUsages::COPY_SRC,
                mapped_at_creation: false,
            })
        };
        let staging = |label: &str, size: u64| {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(label),
                size,
                usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            })
        };

        let layer_in = (0..layer_count)
            .map(|i| storage(&format!("Layer In {i}"), layer_bytes))
            .collect();
        let layer_out = (0..layer_count)
            .map(|i| storage(&format!("Layer Out {i}"), layer_bytes))
            .collect();
        let layer_staging = (0..layer_count)
            .map(|i| staging(&format!("Layer Staging {i}"), layer_bytes))
            .collect();
        let composite = storage("Composite", composite_bytes);
        let composite_staging = staging("Composite Staging", composite_bytes);

        Self {
            layer_in,
            layer_out,
            layer_staging,
            composite,
            composite_staging,
            width,
            height,
        }
    }
}

/// Compute pipeline plus buffers for one simulation variant
pub struct KernelDispatch {
    context: Arc<GpuContext>,
    pipeline: wgpu::ComputePipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    params_buffer: wgpu::Buffer,
    buffers: KernelBuffers,
    layer_count: u32,
}

impl KernelDispatch {
    /// Build the pipeline for one variant's shader
    ///
    /// # Errors
    /// Returns an error if the device cannot allocate the grid buffers.
    pub fn new(
        context: Arc<GpuContext>,
        shader: wgpu::ShaderModuleDescriptor<'_>,
        width: u32,
        height: u32,
        layer_count: u32,
    ) -> Result<Self, String> {
        if !context.can_allocate(width, height, layer_count) {
            return Err(format!(
                "Insufficient GPU memory for {width}x{height} grid with {layer_count} layers"
            ));
        }

        let device = context.device();
        let module = device.create_shader_module(shader);

        // input layers, output layers, composite, params
        let mut entries = Vec::new();
        for binding in 0..layer_count {
            entries.push(storage_entry(binding, true));
        }
        for binding in layer_count..2 * layer_count {
            entries.push(storage_entry(binding, false));
        }
        entries.push(storage_entry(2 * layer_count, false));
        entries.push(wgpu::BindGroupLayoutEntry {
            binding: 2 * layer_count + 1,
            visibility: wgpu::ShaderStages::COMPUTE,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        });

        let bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Kernel Bind Group Layout"),
                entries: &entries,
            });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Kernel Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("Kernel Compute Pipeline"),
            layout: Some(&pipeline_layout),
            module: &module,
            entry_point: "main",
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            cache: None,
        });

        let params_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Kernel Params"),
            size: std::mem::size_of::<KernelParams>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let buffers = KernelBuffers::new(device, width, height, layer_count);

        Ok(Self {
            context,
            pipeline,
            bind_group_layout,
            params_buffer,
            buffers,
            layer_count,
        })
    }

    /// Recreate grid buffers if the store was resized since the last frame
    fn ensure_dimensions(&mut self, store: &FieldStore) {
        let width = store.width() as u32;
        let height = store.height() as u32;
        if width != self.buffers.width || height != self.buffers.height {
            debug!("Reallocating kernel buffers for {width}x{height} grid");
            self.buffers =
                KernelBuffers::new(self.context.device(), width, height, self.layer_count);
        }
    }

    /// Upload the store's layer contents into the input buffers
    pub fn bind(&self, store: &FieldStore) {
        let queue = self.context.queue();
        for (index, buffer) in self.buffers.layer_in.iter().enumerate() {
            queue.write_buffer(buffer, 0, bytemuck::cast_slice(store.layer(index).as_slice()));
        }
    }

    /// Record and submit one kernel dispatch
    fn dispatch(&self, params: &KernelParams) {
        let device = self.context.device();
        let queue = self.context.queue();

        queue.write_buffer(&self.params_buffer, 0, bytemuck::bytes_of(params));

        let mut entries = Vec::new();
        let layer_buffers = self
            .buffers
            .layer_in
            .iter()
            .chain(self.buffers.layer_out.iter());
        for (binding, buffer) in (0_u32..).zip(layer_buffers) {
            entries.push(wgpu::BindGroupEntry {
                binding,
                resource: buffer.as_entire_binding(),
            });
        }
        entries.push(wgpu::BindGroupEntry {
            binding: 2 * self.layer_count,
            resource: self.buffers.composite.as_entire_binding(),
        });
        entries.push(wgpu::BindGroupEntry {
            binding: 2 * self.layer_count + 1,
            resource: self.params_buffer.as_entire_binding(),
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Kernel Bind Group"),
            layout: &self.bind_group_layout,
            entries: &entries,
        });

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Kernel Encoder"),
        });
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("Kernel Pass"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &bind_group, &[]);
            pass.dispatch_workgroups(
                self.buffers.width.div_ceil(WORKGROUP_SIZE),
                self.buffers.height.div_ceil(WORKGROUP_SIZE),
                1,
            );
        }
        queue.submit(Some(encoder.finish()));
    }

    /// Copy output layers and the composite back into the store (blocking)
    fn readback(&self, store: &mut FieldStore) {
        let device = self.context.device();
        let layer_bytes = u64::from(self.buffers.width) * u64::from(self.buffers.height) * 4;

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Readback Encoder"),
        });
        for (out, staging) in self
            .buffers
            .layer_out
            .iter()
            .zip(&self.buffers.layer_staging)
        {
            encoder.copy_buffer_to_buffer(out, 0, staging, 0, layer_bytes);
        }
        encoder.copy_buffer_to_buffer(
            &self.buffers.composite,
            0,
            &self.buffers.composite_staging,
            0,
            layer_bytes * 4,
        );
        self.context.queue().submit(Some(encoder.finish()));

        for (index, staging) in self.buffers.layer_staging.iter().enumerate() {
            read_mapped(device, staging, store.layer_mut(index).as_mut_slice());
        }
        read_mapped(device, &self.buffers.composite_staging, store.composite_mut());
    }

    /// One full frame: upload, dispatch, and read the results back
    ///
    /// Leaves the field store and composite buffer holding exactly what the
    /// kernel produced, including paused frames where the layers pass
    /// through unchanged but the composite is reshaded.
    pub fn advance(&mut self, store: &mut FieldStore, params: &KernelParams) {
        self.ensure_dimensions(store);
        self.bind(store);
        self.dispatch(params);
        self.readback(store);
    }
}

/// Map a staging buffer and copy its contents into `target` (blocking)
fn read_mapped(device: &wgpu::Device, staging: &wgpu::Buffer, target: &mut [f32]) {
    let slice = staging.slice(..);
    let (sender, receiver) = std::sync::mpsc::channel();
    slice.map_async(wgpu::MapMode::Read, move |result| {
        sender.send(result).ok();
    });
    let _ = device.poll(wgpu::Maintain::Wait);
    receiver.recv().ok();

    {
        let data = slice.get_mapped_range();
        target.copy_from_slice(bytemuck::cast_slice(&data));
    }
    staging.unmap();
}

fn storage_entry(binding: u32, read_only: bool) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only },
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brush::BrushState;
    use crate::colormap;
    use crate::settings::BoundaryCondition;

    #[test]
    fn test_params_layout_matches_wgsl_uniform() {
        // 16 scalars, one model vec4, seven cmap vec4 rows
        assert_eq!(std::mem::size_of::<KernelParams>(), 192);
    }

    #[test]
    fn test_params_capture_frame_state() {
        let store = FieldStore::new(12, 7, &[0.0]);
        let frame = FrameParams {
            color_map: colormap::by_index(1),
            boundary: BoundaryCondition::Periodic,
            paused: true,
            space_step: 3.0,
            time_step: 0.1,
            brush: BrushState::default(),
        };
        let params = KernelParams::new(&store, &frame, [1.5, 0.0, 0.0, 0.0], 0, 0);

        assert_eq!(params.width, 12);
        assert_eq!(params.height, 7);
        assert_eq!(params.boundary_condition, 2);
        assert_eq!(params.paused, 1);
        assert_eq!(params.model[0], 1.5);
        // vec4 rows carry the rgb coefficients with zero padding
        assert_eq!(params.cmap[0][3], 0.0);
    }
}
