//! Field storage for the simulation grid
//!
//! This module defines [`FieldData`], a flat row-major scalar buffer, and
//! [`FieldStore`], which owns the per-simulation layer buffers plus the RGBA
//! composite buffer written by the compute kernels.

use crate::settings::BoundaryCondition;

/// One scalar field layer
///
/// Stores 2D field data as a flat `Vec<f32>` in row-major order.
#[derive(Debug, Clone)]
pub struct FieldData {
    /// Field values in row-major order (y * width + x)
    data: Vec<f32>,
    /// Grid width in cells
    width: usize,
    /// Grid height in cells
    height: usize,
}

impl FieldData {
    /// Create a new field with given dimensions, initialized to a value
    #[must_use]
    pub fn with_value(width: usize, height: usize, value: f32) -> Self {
        Self {
            data: vec![value; width * height],
            width,
            height,
        }
    }

    /// Wrap an existing buffer
    ///
    /// # Panics
    ///
    /// Panics if `data.len() != width * height`
    #[must_use]
    pub fn from_raw(width: usize, height: usize, data: Vec<f32>) -> Self {
        assert_eq!(data.len(), width * height, "Buffer length mismatch");
        Self {
            data,
            width,
            height,
        }
    }

    /// Grid width in cells
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Grid height in cells
    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Get reference to field data
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Get mutable reference to field data
    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Get value at grid position
    ///
    /// # Panics
    ///
    /// Panics if coordinates are out of bounds
    #[must_use]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        assert!(
            x < self.width && y < self.height,
            "Coordinates out of bounds"
        );
        self.data[y * self.width + x]
    }

    /// Set value at grid position
    ///
    /// # Panics
    ///
    /// Panics if coordinates are out of bounds
    pub fn set(&mut self, x: usize, y: usize, value: f32) {
        assert!(
            x < self.width && y < self.height,
            "Coordinates out of bounds"
        );
        self.data[y * self.width + x] = value;
    }

    /// Fill entire field with a value
    pub fn fill(&mut self, value: f32) {
        self.data.fill(value);
    }

    /// Sample at signed coordinates, applying the boundary condition for
    /// positions outside the grid
    #[must_use]
    pub fn sample(&self, x: i32, y: i32, boundary: BoundaryCondition) -> f32 {
        let w = self.width as i32;
        let h = self.height as i32;
        match boundary {
            BoundaryCondition::Dirichlet => {
                if x < 0 || x >= w || y < 0 || y >= h {
                    0.0
                } else {
                    self.data[(y * w + x) as usize]
                }
            }
            BoundaryCondition::Neumann => {
                let xc = x.clamp(0, w - 1);
                let yc = y.clamp(0, h - 1);
                self.data[(yc * w + xc) as usize]
            }
            BoundaryCondition::Periodic => {
                let xw = x.rem_euclid(w);
                let yw = y.rem_euclid(h);
                self.data[(yw * w + xw) as usize]
            }
        }
    }
}

/// Per-simulation field storage
///
/// Owns an ordered sequence of scalar layers (each `width * height` cells)
/// and one RGBA composite buffer (`width * height * 4` components) written
/// by the compute kernel for display. The layer count and per-layer initial
/// values are fixed at construction and never change over the store's
/// lifetime.
#[derive(Debug, Clone)]
pub struct FieldStore {
    width: usize,
    height: usize,
    layers: Vec<FieldData>,
    /// Initial value each layer is restored to on `clear`
    layer_init: Vec<f32>,
    /// RGBA display buffer, written by the kernel
    composite: Vec<f32>,
}

impl FieldStore {
    /// Allocate a store with one layer per entry of `layer_init`, each
    /// filled with its initial value, plus an empty composite buffer
    ///
    /// # Panics
    ///
    /// Panics on zero dimensions or an empty layer list
    #[must_use]
    pub fn new(width: usize, height: usize, layer_init: &[f32]) -> Self {
        assert!(width > 0 && height > 0, "Grid dimensions must be non-zero");
        assert!(!layer_init.is_empty(), "A store needs at least one layer");
        let layers = layer_init
            .iter()
            .map(|&value| FieldData::with_value(width, height, value))
            .collect();
        Self {
            width,
            height,
            layers,
            layer_init: layer_init.to_vec(),
            composite: vec![0.0; width * height * 4],
        }
    }

    /// Grid width in cells
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Grid height in cells
    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of layers (fixed at construction)
    #[must_use]
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Borrow one layer
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range
    #[must_use]
    pub fn layer(&self, index: usize) -> &FieldData {
        &self.layers[index]
    }

    /// Mutably borrow one layer
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range
    pub fn layer_mut(&mut self, index: usize) -> &mut FieldData {
        &mut self.layers[index]
    }

    /// Borrow the RGBA composite buffer
    #[must_use]
    pub fn composite(&self) -> &[f32] {
        &self.composite
    }

    /// Mutably borrow the RGBA composite buffer
    pub fn composite_mut(&mut self) -> &mut [f32] {
        &mut self.composite
    }

    /// Borrow one layer and the composite buffer at the same time
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range
    pub fn layer_and_composite_mut(&mut self, index: usize) -> (&FieldData, &mut [f32]) {
        (&self.layers[index], &mut self.composite)
    }

    /// True if the signed coordinates fall inside `[0, width) x [0, height)`
    #[must_use]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && (x as usize) < self.width && y >= 0 && (y as usize) < self.height
    }

    /// Destructively reallocate all buffers for new dimensions
    ///
    /// Every layer is reinitialized to zero and the composite buffer is
    /// emptied. Nothing is preserved: cell correspondence across different
    /// resolutions is undefined, so carrying old data over would be
    /// meaningless. There is no observable partial-resize state.
    ///
    /// # Panics
    ///
    /// Panics on zero dimensions
    pub fn resize(&mut self, width: usize, height: usize) {
        assert!(width > 0 && height > 0, "Grid dimensions must be non-zero");
        self.width = width;
        self.height = height;
        for layer in &mut self.layers {
            *layer = FieldData::with_value(width, height, 0.0);
        }
        self.composite = vec![0.0; width * height * 4];
    }

    /// Reinitialize every layer to its configured initial value and empty
    /// the composite buffer, keeping dimensions unchanged
    pub fn clear(&mut self) {
        for (layer, &value) in self.layers.iter_mut().zip(&self.layer_init) {
            layer.fill(value);
        }
        self.composite.fill(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_creation() {
        let field = FieldData::with_value(10, 20, 0.0);
        assert_eq!(field.width(), 10);
        assert_eq!(field.height(), 20);
        assert_eq!(field.as_slice().len(), 200);
        assert!(field.as_slice().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_field_get_set() {
        let mut field = FieldData::with_value(10, 10, 0.0);
        field.set(3, 4, 123.45);
        assert_eq!(field.get(3, 4), 123.45);

        // Verify row-major indexing
        assert_eq!(field.as_slice()[4 * 10 + 3], 123.45);
    }

    #[test]
    fn test_field_sample_boundaries() {
        let mut field = FieldData::with_value(4, 4, 0.0);
        field.set(0, 0, 7.0);
        field.set(3, 3, 9.0);

        assert_eq!(field.sample(-1, 0, BoundaryCondition::Dirichlet), 0.0);
        assert_eq!(field.sample(-1, 0, BoundaryCondition::Neumann), 7.0);
        assert_eq!(field.sample(-1, -1, BoundaryCondition::Periodic), 9.0);
        assert_eq!(field.sample(4, 4, BoundaryCondition::Periodic), 7.0);
    }

    #[test]
    #[should_panic(expected = "Coordinates out of bounds")]
    fn test_field_bounds_check() {
        let field = FieldData::with_value(10, 10, 0.0);
        let _ = field.get(10, 5);
    }

    #[test]
    fn test_store_allocation() {
        let store = FieldStore::new(8, 6, &[1.0, 0.0]);
        assert_eq!(store.layer_count(), 2);
        assert_eq!(store.layer(0).as_slice().len(), 48);
        assert!(store.layer(0).as_slice().iter().all(|&v| v == 1.0));
        assert!(store.layer(1).as_slice().iter().all(|&v| v == 0.0));
        assert_eq!(store.composite().len(), 48 * 4);
    }

    #[test]
    fn test_resize_is_destructive() {
        let mut store = FieldStore::new(4, 4, &[1.0]);
        store.layer_mut(0).set(2, 2, 5.0);
        store.resize(6, 3);

        assert_eq!(store.width(), 6);
        assert_eq!(store.height(), 3);
        assert_eq!(store.layer_count(), 1);
        // Resize reinitializes layers to zero, not to the construction value
        assert!(store.layer(0).as_slice().iter().all(|&v| v == 0.0));
        assert_eq!(store.composite().len(), 6 * 3 * 4);
    }

    #[test]
    fn test_clear_restores_initial_values() {
        let mut store = FieldStore::new(4, 4, &[1.0, 0.25]);
        store.layer_mut(0).fill(9.0);
        store.layer_mut(1).fill(9.0);
        store.composite_mut().fill(0.5);

        store.clear();
        assert!(store.layer(0).as_slice().iter().all(|&v| v == 1.0));
        assert!(store.layer(1).as_slice().iter().all(|&v| v == 0.25));
        assert!(store.composite().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_clear_is_idempotent() {
        let mut store = FieldStore::new(5, 5, &[0.75]);
        store.resize(7, 7);
        store.clear();
        let first = store.layer(0).as_slice().to_vec();
        store.clear();
        assert_eq!(store.layer(0).as_slice(), first.as_slice());
    }

    #[test]
    fn test_contains() {
        let store = FieldStore::new(10, 5, &[0.0]);
        assert!(store.contains(0, 0));
        assert!(store.contains(9, 4));
        assert!(!store.contains(10, 0));
        assert!(!store.contains(0, 5));
        assert!(!store.contains(-1, 2));
    }
}
