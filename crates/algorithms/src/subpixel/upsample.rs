//! Cubic convolution upsampling of a kernel window
//!
//! Keys' cubic kernel with a = -0.5, applied separably. Output sample `k`
//! along an axis sits at source coordinate `(k + 0.5) / factor - 0.5`, so the
//! upsampled cells subdivide the source pixels. Taps falling outside the
//! window repeat the nearest edge value.

use ndarray::{Array2, ArrayView2};

const A: f64 = -0.5;

fn keys(t: f64) -> f64 {
    let t = t.abs();
    if t <= 1.0 {
        (A + 2.0) * t * t * t - (A + 3.0) * t * t + 1.0
    } else if t < 2.0 {
        A * t * t * t - 5.0 * A * t * t + 8.0 * A * t - 4.0 * A
    } else {
        0.0
    }
}

/// Source indices and weights of the four taps for every output sample
fn taps(len: usize, factor: usize) -> Vec<[(usize, f64); 4]> {
    let last = len as isize - 1;
    (0..len * factor)
        .map(|k| {
            let s = (k as f64 + 0.5) / factor as f64 - 0.5;
            let base = s.floor();
            let t = s - base;
            let base = base as isize;
            let weights = [keys(t + 1.0), keys(t), keys(1.0 - t), keys(2.0 - t)];
            let mut out = [(0usize, 0.0); 4];
            for (m, w) in weights.into_iter().enumerate() {
                let idx = (base - 1 + m as isize).clamp(0, last) as usize;
                out[m] = (idx, w);
            }
            out
        })
        .collect()
}

/// Upsample `window` by an integer `factor` along both axes
pub fn upsample_cubic(window: ArrayView2<'_, f64>, factor: usize) -> Array2<f64> {
    let (rows, cols) = window.dim();
    if factor <= 1 || rows == 0 || cols == 0 {
        return window.to_owned();
    }

    let row_taps = taps(rows, factor);
    let col_taps = taps(cols, factor);

    // Columns first, then rows
    let mut horizontal = Array2::<f64>::zeros((rows, cols * factor));
    for r in 0..rows {
        for (c, tap) in col_taps.iter().enumerate() {
            horizontal[[r, c]] = tap.iter().map(|&(i, w)| w * window[[r, i]]).sum();
        }
    }

    let mut out = Array2::<f64>::zeros((rows * factor, cols * factor));
    for (r, tap) in row_taps.iter().enumerate() {
        for c in 0..cols * factor {
            out[[r, c]] = tap.iter().map(|&(i, w)| w * horizontal[[i, c]]).sum();
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::Array2;

    #[test]
    fn test_kernel_partition_of_unity() {
        for t in [0.0, 0.125, 0.375, 0.5, 0.875] {
            let s = keys(t + 1.0) + keys(t) + keys(1.0 - t) + keys(2.0 - t);
            assert_relative_eq!(s, 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_constant_window_stays_constant() {
        let w = Array2::from_elem((3, 3), 0.7);
        let up = upsample_cubic(w.view(), 4);
        assert_eq!(up.dim(), (12, 12));
        for &v in up.iter() {
            assert_relative_eq!(v, 0.7, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_interior_ramp_is_linear() {
        let w = Array2::from_shape_fn((5, 5), |(_, c)| c as f64);
        let up = upsample_cubic(w.view(), 4);
        // samples whose four taps all fall inside the window
        for k in 6..10 {
            let s = (k as f64 + 0.5) / 4.0 - 0.5;
            assert_relative_eq!(up[[0, k]], s, epsilon = 1e-12);
            assert_relative_eq!(up[[19, k]], s, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_factor_one_is_copy() {
        let w = Array2::from_shape_fn((3, 3), |(r, c)| (r * 3 + c) as f64);
        assert_eq!(upsample_cubic(w.view(), 1), w);
    }
}
