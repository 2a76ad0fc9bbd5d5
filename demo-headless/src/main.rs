//! Headless driver for the PDE sandbox
//!
//! Runs a session without a window: paints one stroke at the viewport
//! center, advances a fixed number of frames, and reports per-layer
//! statistics. Useful for smoke-testing the kernels and profiling.

use clap::Parser;
use pde_sandbox_core::{Sandbox, SIDEBAR_WIDTH};
use tracing::info;

#[derive(Parser, Debug)]
#[command(about = "Headless PDE sandbox session")]
struct Args {
    /// Window width in pixels (the sidebar is excluded from the grid)
    #[arg(long, default_value_t = 1000)]
    width: u32,

    /// Window height in pixels
    #[arg(long, default_value_t = 800)]
    height: u32,

    /// Number of frames to advance
    #[arg(long, default_value_t = 120)]
    frames: u32,

    /// Variant index: 0 heat, 1 Gray-Scott, 2 wave, 3 fluid
    #[arg(long, default_value_t = 0)]
    sim: usize,

    /// Window pixels per grid cell
    #[arg(long)]
    resolution: Option<u32>,

    /// Skip the GPU probe and use the CPU steppers
    #[arg(long)]
    cpu: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let mut sandbox = if args.cpu {
        Sandbox::without_gpu(args.width, args.height)
    } else {
        Sandbox::new(args.width, args.height)
    };
    if let Some(resolution) = args.resolution {
        sandbox.set_resolution(resolution);
    }
    sandbox.select(args.sim);
    sandbox.reset_settings();

    info!(
        "Running {} for {} frames on a {}x{} grid",
        sandbox.active().label(),
        args.frames,
        sandbox.active().store().width(),
        sandbox.active().store().height()
    );

    // One stroke at the center of the grid viewport
    let center_x = f64::from(args.width.saturating_sub(SIDEBAR_WIDTH)) / 2.0;
    let center_y = f64::from(args.height) / 2.0;
    sandbox.brush(center_x, center_y);
    sandbox.release_brush();

    for _ in 0..args.frames {
        sandbox.advance_frame();
    }

    let store = sandbox.active().store();
    for (index, label) in sandbox.active().layer_labels().iter().enumerate() {
        let cells = store.layer(index).as_slice();
        let min = cells.iter().copied().fold(f32::INFINITY, f32::min);
        let max = cells.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let mean = cells.iter().sum::<f32>() / cells.len() as f32;
        info!("{label}: min {min:.4} max {max:.4} mean {mean:.4}");
    }
}
