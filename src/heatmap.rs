// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Heat-map decoding: cubic upsampling and peak extraction.
//!
//! A heat map is a 46x46 grid of activations for one body joint. Decoding
//! upsamples it 8x with cubic interpolation and returns the location of the
//! global maximum in upsampled-grid units.

use ndarray::{Array2, ArrayView2};

/// Logical side length of one heat map.
pub const HEAT_MAP_SIZE: usize = 46;

/// Upsampling factor from heat-map cells to input-frame pixels.
pub const UPSAMPLE_FACTOR: usize = 8;

/// Cubic convolution kernel weight (a = -0.75).
fn cubic_weight(x: f32) -> f32 {
    const A: f32 = -0.75;
    let x = x.abs();
    if x <= 1.0 {
        ((A + 2.0) * x - (A + 3.0)) * x * x + 1.0
    } else if x < 2.0 {
        ((A * x - 5.0 * A) * x + 8.0 * A) * x - 4.0 * A
    } else {
        0.0
    }
}

/// Per-axis sampling table: for each output coordinate, the base source
/// index of the 4-tap window and the kernel weights.
fn sample_lut(src_len: usize, factor: usize) -> Vec<(isize, [f32; 4])> {
    #[allow(clippy::cast_precision_loss)]
    (0..src_len * factor)
        .map(|dst| {
            // Half-pixel-centre mapping between grids.
            let src = (dst as f32 + 0.5) / factor as f32 - 0.5;
            let base = src.floor();
            let t = src - base;
            let weights = [
                cubic_weight(t + 1.0),
                cubic_weight(t),
                cubic_weight(1.0 - t),
                cubic_weight(2.0 - t),
            ];
            #[allow(clippy::cast_possible_truncation)]
            (base as isize - 1, weights)
        })
        .collect()
}

#[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
fn clamp_index(i: isize, len: usize) -> usize {
    i.clamp(0, len as isize - 1) as usize
}

/// Upsample `map` by an integer `factor` with cubic interpolation.
///
/// Borders are replicated; interpolation is separable (rows, then columns).
#[must_use]
pub fn upsample_cubic(map: ArrayView2<'_, f32>, factor: usize) -> Array2<f32> {
    let (h, w) = map.dim();
    let x_lut = sample_lut(w, factor);
    let y_lut = sample_lut(h, factor);

    // Horizontal pass: (h, w) -> (h, w * factor).
    let mut rows = Array2::zeros((h, w * factor));
    for y in 0..h {
        for (ox, &(base, weights)) in x_lut.iter().enumerate() {
            let mut acc = 0.0;
            for (k, &wk) in weights.iter().enumerate() {
                #[allow(clippy::cast_possible_wrap)]
                let sx = clamp_index(base + k as isize, w);
                acc += wk * map[[y, sx]];
            }
            rows[[y, ox]] = acc;
        }
    }

    // Vertical pass: (h, w * factor) -> (h * factor, w * factor).
    let mut out = Array2::zeros((h * factor, w * factor));
    for (oy, &(base, weights)) in y_lut.iter().enumerate() {
        for ox in 0..w * factor {
            let mut acc = 0.0;
            for (k, &wk) in weights.iter().enumerate() {
                #[allow(clippy::cast_possible_wrap)]
                let sy = clamp_index(base + k as isize, h);
                acc += wk * rows[[sy, ox]];
            }
            out[[oy, ox]] = acc;
        }
    }
    out
}

/// Location of the global maximum, (row, col), in row-major scan order.
///
/// Ties resolve to the first occurrence. Non-finite cells never win, so a
/// degenerate map (all zero, or all NaN) returns (0, 0).
#[must_use]
pub fn argmax(map: ArrayView2<'_, f32>) -> (usize, usize) {
    let mut best = f32::NEG_INFINITY;
    let mut location = (0, 0);
    for ((row, col), &value) in map.indexed_iter() {
        if value > best {
            best = value;
            location = (row, col);
        }
    }
    location
}

/// Decode one heat map into the (row, col) of its peak after 8x cubic
/// upsampling. Pure and total: every input yields a deterministic location.
#[must_use]
pub fn decode(map: ArrayView2<'_, f32>) -> (usize, usize) {
    let upsampled = upsample_cubic(map, UPSAMPLE_FACTOR);
    argmax(upsampled.view())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zero_map() -> Array2<f32> {
        Array2::zeros((HEAT_MAP_SIZE, HEAT_MAP_SIZE))
    }

    #[test]
    fn test_all_zero_map_decodes_to_origin() {
        assert_eq!(decode(zero_map().view()), (0, 0));
    }

    #[test]
    fn test_upsample_dimensions() {
        let up = upsample_cubic(zero_map().view(), UPSAMPLE_FACTOR);
        assert_eq!(up.dim(), (368, 368));
    }

    #[test]
    fn test_peak_maps_to_upsampled_neighborhood() {
        let mut map = zero_map();
        map[[10, 20]] = 1.0;
        let (row, col) = decode(map.view());
        assert!(row.abs_diff(10 * UPSAMPLE_FACTOR) <= UPSAMPLE_FACTOR);
        assert!(col.abs_diff(20 * UPSAMPLE_FACTOR) <= UPSAMPLE_FACTOR);
    }

    #[test]
    fn test_corner_peak_stays_in_corner_region() {
        let mut map = zero_map();
        map[[0, 0]] = 1.0;
        let (row, col) = decode(map.view());
        assert!(row <= UPSAMPLE_FACTOR);
        assert!(col <= UPSAMPLE_FACTOR);
    }

    #[test]
    fn test_argmax_tie_breaks_first_in_scan_order() {
        let mut map = zero_map();
        map[[5, 5]] = 2.0;
        map[[5, 6]] = 2.0;
        map[[9, 1]] = 2.0;
        assert_eq!(argmax(map.view()), (5, 5));
    }

    #[test]
    fn test_argmax_ignores_non_finite_cells() {
        let mut map = zero_map();
        map[[3, 3]] = f32::NAN;
        map[[7, 7]] = 1.0;
        assert_eq!(argmax(map.view()), (7, 7));
    }

    #[test]
    fn test_upsample_preserves_constant_surface() {
        let map = Array2::from_elem((HEAT_MAP_SIZE, HEAT_MAP_SIZE), 0.25f32);
        let up = upsample_cubic(map.view(), UPSAMPLE_FACTOR);
        // Kernel weights sum to 1, so a constant map stays constant.
        for &v in &up {
            assert!((v - 0.25).abs() < 1e-5);
        }
    }
}
