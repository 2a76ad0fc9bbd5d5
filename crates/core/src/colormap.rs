//! Color map lookup tables
//!
//! Each map is a degree-6 polynomial fit of a matplotlib color map: exactly
//! 7 RGB control points, evaluated with Horner's rule over the normalized
//! field value. The table is consumed by uniform upload and by the CPU
//! composite renderer; the coefficients come from the shadertoy MPL fits.

use rustc_hash::FxHashMap;
use std::sync::LazyLock;

/// Polynomial coefficients for one color map: 7 RGB control points
pub type ColorMap = [[f32; 3]; 7];

/// Available color map names, in stable dropdown order
pub const NAMES: [&str; 2] = ["Viridis", "Blues_r"];

static VIRIDIS: ColorMap = [
    [0.274344, 0.004462, 0.331359],
    [0.108915, 1.397291, 1.388110],
    [-0.319631, 0.243490, 0.156419],
    [-4.629188, -5.882803, -19.646115],
    [6.181719, 14.388598, 57.442181],
    [4.876952, -13.955112, -66.125783],
    [-5.513165, 4.709245, 26.582180],
];

static BLUES_R: ColorMap = [
    [0.042660, 0.186181, 0.409512],
    [-0.703712, 1.094974, 2.049478],
    [7.995725, -0.686110, -4.998203],
    [-24.421963, 2.680736, 7.532937],
    [47.519089, -4.615112, -5.126531],
    [-46.038418, 2.606781, 0.685560],
    [16.586546, -0.279280, 0.447047],
];

static REGISTRY: LazyLock<FxHashMap<&'static str, &'static ColorMap>> = LazyLock::new(|| {
    let mut maps = FxHashMap::default();
    maps.insert("Viridis", &VIRIDIS);
    maps.insert("Blues_r", &BLUES_R);
    maps
});

/// Look up a color map's coefficients by name
#[must_use]
pub fn coefficients(name: &str) -> Option<&'static ColorMap> {
    REGISTRY.get(name).copied()
}

/// Look up by dropdown index, falling back to the first map
#[must_use]
pub fn by_index(index: usize) -> &'static ColorMap {
    NAMES
        .get(index)
        .and_then(|name| coefficients(name))
        .unwrap_or(&VIRIDIS)
}

/// Evaluate a color map at `t` in `[0, 1]`
#[must_use]
pub fn eval(map: &ColorMap, t: f32) -> [f32; 3] {
    let t = t.clamp(0.0, 1.0);
    let mut rgb = map[6];
    for i in (0..6).rev() {
        for (channel, &coefficient) in rgb.iter_mut().zip(&map[i]) {
            *channel = *channel * t + coefficient;
        }
    }
    [
        rgb[0].clamp(0.0, 1.0),
        rgb[1].clamp(0.0, 1.0),
        rgb[2].clamp(0.0, 1.0),
    ]
}
