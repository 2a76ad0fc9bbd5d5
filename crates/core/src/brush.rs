//! Pointer-driven brush strokes
//!
//! A stroke is a localized, immediate edit to one layer of a
//! [`FieldStore`]: either a hard-edged circle that overwrites cell values,
//! or a soft Gaussian pulse that merges with existing values via `max` so
//! overlapping strokes accumulate toward the brighter value instead of
//! blowing up additively.

use crate::field::FieldStore;

/// Stroke kernel selection
///
/// The discriminant matches the `brush_kind` value uploaded to the compute
/// kernels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BrushKind {
    /// Hard-edged circle, overwrites cell values
    #[default]
    Circle,
    /// Soft Gaussian pulse, max-merged with existing values
    Gaussian,
}

impl BrushKind {
    /// Human-readable labels in kernel-index order, for dropdown UIs
    pub const LABELS: [&str; 2] = ["Circle", "Gaussian"];

    /// Kernel-side discriminant
    #[must_use]
    pub fn index(self) -> u32 {
        match self {
            Self::Circle => 0,
            Self::Gaussian => 1,
        }
    }
}

/// Peak multiplier for the Gaussian kernel, chosen so a stroke visibly
/// raises the field without per-radius re-tuning.
pub const GAUSSIAN_PEAK_SCALE: f32 = 2.5;

/// 1 / sqrt(2 * pi)
const INV_SQRT_TAU: f32 = 0.398_942_28;

/// Standard normal density at `z`
fn gaussian_density(z: f32) -> f32 {
    INV_SQRT_TAU * (-0.5 * z * z).exp()
}

/// Current brush state, as consumed by the kernels' uniform upload
///
/// `enabled` is derived purely from whether the last reported position lies
/// within the grid; it is recomputed on every pointer update via
/// [`BrushState::set_position`] and never set independently.
#[derive(Debug, Clone, Copy)]
pub struct BrushState {
    /// Pointer currently within grid bounds
    pub enabled: bool,
    /// Last grid-space x position
    pub x: i32,
    /// Last grid-space y position
    pub y: i32,
    /// Stroke radius in cells
    pub radius: i32,
    /// Value written (circle) or peak-scaled (Gaussian)
    pub value: f32,
    /// Active stroke kernel
    pub kind: BrushKind,
    /// Index of the layer strokes write to
    pub target_layer: usize,
}

impl Default for BrushState {
    fn default() -> Self {
        Self {
            enabled: false,
            x: 0,
            y: 0,
            radius: 10,
            value: 1.0,
            kind: BrushKind::Circle,
            target_layer: 0,
        }
    }
}

impl BrushState {
    /// Record a pointer position in grid space and rederive `enabled` from
    /// whether it falls inside `[0, width) x [0, height)`
    pub fn set_position(&mut self, x: i32, y: i32, width: usize, height: usize) {
        self.x = x;
        self.y = y;
        self.enabled = x >= 0 && (x as usize) < width && y >= 0 && (y as usize) < height;
    }
}

/// Rasterize one stroke into a layer of `store`
///
/// A center outside the grid is a silent no-op, not an error. Cells exactly
/// on the circle boundary (`dist == radius`) are included. The flattened
/// 2D-to-1D index is re-checked before every write; with the symmetric
/// row/column clipping above it can never trip, but it guards the mapping
/// against the off-by-one a shifted row index can produce near the edges.
///
/// # Panics
///
/// Panics if `layer` is out of range for the store.
pub fn apply_stroke(
    store: &mut FieldStore,
    layer: usize,
    x: i32,
    y: i32,
    radius: i32,
    value: f32,
    kind: BrushKind,
) {
    if !store.contains(x, y) {
        return;
    }

    let width = store.width() as i32;
    let height = store.height() as i32;
    let cells = store.layer_mut(layer).as_mut_slice();

    for dy in -radius..=radius {
        let yy = y + dy;
        if yy < 0 || yy >= height {
            continue;
        }
        for dx in -radius..=radius {
            let xx = x + dx;
            if xx < 0 || xx >= width {
                continue;
            }
            let dist_sq = dx * dx + dy * dy;
            if dist_sq > radius * radius {
                continue;
            }
            let index = (yy * width + xx) as usize;
            if index >= cells.len() {
                continue;
            }
            match kind {
                BrushKind::Circle => cells[index] = value,
                BrushKind::Gaussian => {
                    let dist = (dist_sq as f32).sqrt();
                    let peak = GAUSSIAN_PEAK_SCALE
                        * value
                        * gaussian_density(dist / (2.0 * radius as f32));
                    cells[index] = cells[index].max(peak);
                }
            }
        }
    }
}
